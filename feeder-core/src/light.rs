//! Lichtsensor-Kalibrierung und LED-Helligkeit
//!
//! Beim Start wird der Sensor einige Sekunden abgetastet und Minimum/Maximum
//! gemerkt. Danach wird jeder Messwert linear auf die LED-Helligkeit abgebildet.

use embedded_hal_async::delay::DelayNs;
use rgb::RGB8;

use crate::traits::LightSensor;

/// Höchster 12-Bit ADC-Wert
pub const ADC_MAX: u16 = 4095;

/// Dauer der Kalibrierphase beim Start
pub const CALIBRATION_WINDOW_MS: u32 = 5000;

/// Abtastabstand während der Kalibrierung
pub const CALIBRATION_SAMPLE_MS: u32 = 50;

/// Helligkeitsbereich der LED (0-255, gedimmt für Augenschonung)
pub const LED_MIN_BRIGHTNESS: u8 = 8;
pub const LED_MAX_BRIGHTNESS: u8 = 64;

/// LED aus
pub const LED_OFF: RGB8 = RGB8 { r: 0, g: 0, b: 0 };

/// LED-Farbe während der Kalibrierung (gedimmtes Blau)
pub const CALIBRATING_COLOR: RGB8 = RGB8 { r: 0, g: 0, b: 16 };

/// Lineare Abbildung mit Ganzzahl-Arithmetik (wie Arduino `map()`)
///
/// Der Eingang wird auf `in_min..=in_max` begrenzt, das Ergebnis liegt also
/// immer zwischen `out_min` und `out_max`. Bei `in_min == in_max` wird
/// `out_min` geliefert.
///
/// ```
/// # use feeder_core::map_range;
/// assert_eq!(map_range(512, 0, 1024, 0, 100), 50);
/// assert_eq!(map_range(2000, 0, 1024, 0, 100), 100);
/// ```
pub fn map_range(x: i32, in_min: i32, in_max: i32, out_min: i32, out_max: i32) -> i32 {
    if in_max == in_min {
        return out_min;
    }
    let x = x.clamp(in_min.min(in_max), in_min.max(in_max));
    // i64: Produkt zweier i32-Spannen läuft sonst über
    let scaled = (i64::from(x) - i64::from(in_min)) * (i64::from(out_max) - i64::from(out_min))
        / (i64::from(in_max) - i64::from(in_min));
    (scaled + i64::from(out_min)) as i32
}

/// Min/Max eines Lichtsensors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LightCalibration {
    min: u16,
    max: u16,
}

impl LightCalibration {
    /// Leere Kalibrierung: Min startet oben, Max unten
    pub const fn new() -> Self {
        Self {
            min: ADC_MAX,
            max: 0,
        }
    }

    /// Voller ADC-Bereich (Fallback bei unbrauchbarer Kalibrierung)
    pub const fn full_range() -> Self {
        Self {
            min: 0,
            max: ADC_MAX,
        }
    }

    /// Nimmt einen Messwert in die Kalibrierung auf
    pub fn observe(&mut self, reading: u16) {
        let reading = reading.min(ADC_MAX);
        self.min = self.min.min(reading);
        self.max = self.max.max(reading);
    }

    pub fn is_valid(&self) -> bool {
        self.max > self.min
    }

    /// Schließt die Kalibrierung ab (Fallback auf vollen Bereich wenn max <= min)
    pub fn finish(self) -> Self {
        if self.is_valid() {
            self
        } else {
            Self::full_range()
        }
    }

    pub fn min(&self) -> u16 {
        self.min
    }

    pub fn max(&self) -> u16 {
        self.max
    }

    /// Bildet einen Messwert auf die LED-Helligkeit ab (heller Raum → hellere LED)
    pub fn brightness(&self, reading: u16) -> u8 {
        let level = map_range(
            i32::from(reading),
            i32::from(self.min),
            i32::from(self.max),
            i32::from(LED_MIN_BRIGHTNESS),
            i32::from(LED_MAX_BRIGHTNESS),
        );
        level.clamp(
            i32::from(LED_MIN_BRIGHTNESS),
            i32::from(LED_MAX_BRIGHTNESS),
        ) as u8
    }

    /// Grün in der zum Raumlicht passenden Helligkeit
    pub fn gate_color(&self, reading: u16) -> RGB8 {
        RGB8 {
            r: 0,
            g: self.brightness(reading),
            b: 0,
        }
    }
}

impl Default for LightCalibration {
    fn default() -> Self {
        Self::new()
    }
}

/// Tastet den Sensor über das Kalibrierfenster ab
///
/// Fehlerhafte Messungen werden übersprungen. Das Ergebnis ist bereits
/// abgeschlossen (`finish`), also immer gültig.
pub async fn calibrate<S: LightSensor, D: DelayNs>(
    sensor: &mut S,
    delay: &mut D,
) -> LightCalibration {
    let mut calibration = LightCalibration::new();
    for _ in 0..CALIBRATION_WINDOW_MS / CALIBRATION_SAMPLE_MS {
        if let Ok(reading) = sensor.read() {
            calibration.observe(reading);
        }
        delay.delay_ms(CALIBRATION_SAMPLE_MS).await;
    }
    calibration.finish()
}
