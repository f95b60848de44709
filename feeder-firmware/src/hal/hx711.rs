// HX711 Wägezellen-ADC (Bit-Banging über zwei GPIOs)
//
// Protokoll: DOUT geht auf LOW sobald ein Wert bereit ist. Dann 24 Takte an SCK,
// MSB zuerst, plus 1-3 Zusatztakte für Kanal/Verstärkung der nächsten Messung.
// SCK länger als 60 µs HIGH versetzt den Chip in Power-Down.

use esp_hal::delay::Delay;
use esp_hal::gpio::{Input, Output};
use esp_hal::time::{Duration, Instant};
use feeder_core::{LoadCell, ScaleError};

use crate::config::{LOADCELL_CLOCK_HALF_PERIOD_US, LOADCELL_READY_TIMEOUT_MS};

/// Kanal A mit Verstärkung 128 = 1 Zusatztakt
const GAIN_128_PULSES: u8 = 1;

/// SCK HIGH-Zeit für sicheren Power-Down (Datenblatt: > 60 µs)
const POWER_DOWN_US: u32 = 100;

/// Poll-Abstand beim Warten auf DOUT LOW
const READY_POLL_US: u32 = 100;

pub struct Hx711<'d> {
    dout: Input<'d>,
    sck: Output<'d>,
    delay: Delay,
}

impl<'d> Hx711<'d> {
    /// Erstellt den Treiber; SCK wird auf LOW gezogen (Chip aktiv)
    pub fn new(dout: Input<'d>, mut sck: Output<'d>) -> Self {
        sck.set_low();
        Self {
            dout,
            sck,
            delay: Delay::new(),
        }
    }

    pub fn is_ready(&self) -> bool {
        self.dout.is_low()
    }

    fn wait_ready(&self) -> Result<(), ScaleError> {
        let start = Instant::now();
        let timeout = Duration::from_millis(u64::from(LOADCELL_READY_TIMEOUT_MS));
        while !self.is_ready() {
            if start.elapsed() > timeout {
                return Err(ScaleError::NotReady);
            }
            self.delay.delay_micros(READY_POLL_US);
        }
        Ok(())
    }

    /// Taktet 24 Datenbits plus Verstärkungs-Pulse heraus
    fn shift_in(&mut self) -> u32 {
        let half = LOADCELL_CLOCK_HALF_PERIOD_US;

        // Ohne Unterbrechung takten: ein Interrupt mit SCK HIGH > 60 µs
        // würde den Chip mitten in der Übertragung abschalten
        critical_section::with(|_| {
            let mut value: u32 = 0;
            for _ in 0..24 {
                self.sck.set_high();
                self.delay.delay_micros(half);
                value = (value << 1) | u32::from(self.dout.is_high());
                self.sck.set_low();
                self.delay.delay_micros(half);
            }
            for _ in 0..GAIN_128_PULSES {
                self.sck.set_high();
                self.delay.delay_micros(half);
                self.sck.set_low();
                self.delay.delay_micros(half);
            }
            value
        })
    }
}

impl<'d> LoadCell for Hx711<'d> {
    fn read_raw(&mut self) -> Result<i32, ScaleError> {
        self.wait_ready()?;
        let raw = self.shift_in();
        // 24-Bit Zweierkomplement auf i32 erweitern
        Ok(((raw << 8) as i32) >> 8)
    }

    fn power_down(&mut self) {
        self.sck.set_low();
        self.sck.set_high();
        self.delay.delay_micros(POWER_DOWN_US);
    }

    fn power_up(&mut self) {
        self.sck.set_low();
    }
}
