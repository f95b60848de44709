// RFID Station Task - Marken-Scans melden, LED-Helligkeit nach Raumlicht
use defmt::{Debug2Format, error, info, warn};
use embassy_time::{Delay, Duration, Instant, Timer};
use esp_hal::gpio::{Level, Output, OutputConfig};
use esp_hal::peripherals::{ADC1, GPIO1, GPIO4, GPIO5, GPIO6, GPIO7, GPIO8, GPIO15, RMT, SPI2};
use esp_hal::spi::Mode;
use esp_hal::spi::master::{Config as SpiConfig, Spi};
use esp_hal::time::Rate;
use esp_hal_smartled::smart_led_buffer;
use feeder_core::light::{CALIBRATING_COLOR, calibrate};
use feeder_core::rfid::RFID_POLL_MS;
use feeder_core::{CardReader, LightSensor, RfidStation, SmartLedWriter};

use crate::SharedStationState;
use crate::config::{RFID_SPI_MHZ, RMT_CLOCK_MHZ};
use crate::hal::{AdcLightSensor, Mfrc522Reader, RmtLedWriter};
use crate::tasks::report::ChannelNotifier;

/// Peripherals der RFID-Station
pub struct StationPeripherals {
    pub spi: SPI2<'static>,
    pub sck: GPIO6<'static>,
    pub mosi: GPIO7<'static>,
    pub miso: GPIO5<'static>,
    pub cs: GPIO4<'static>,
    pub rst: GPIO15<'static>,
    pub adc: ADC1<'static>,
    pub light_pin: GPIO1<'static>,
    pub led_pin: GPIO8<'static>,
    pub rmt: RMT<'static>,
}

/// RFID Station Logic - kalibriert und ruft dann zyklisch `RfidStation::tick` auf
///
/// - Kalibriert den Lichtsensor (LED blau)
/// - Pollt den Leser alle 100 ms
/// - Meldet akzeptierte Scans und schaltet die LED für einige Sekunden grün
pub async fn station_logic<R, S, L>(
    mut reader: R,
    mut sensor: S,
    mut led: L,
    mut notifier: ChannelNotifier,
    state: &SharedStationState,
) where
    R: CardReader,
    S: LightSensor,
    L: SmartLedWriter,
{
    info!("RFID: Calibrating light sensor...");
    if led.write(CALIBRATING_COLOR).is_err() {
        error!("RFID: Failed to write to LED");
    }
    let calibration = calibrate(&mut sensor, &mut Delay).await;
    info!(
        "RFID: Light calibration min {} max {}",
        calibration.min(),
        calibration.max()
    );
    state.lock(|s| s.borrow_mut().calibration = Some(calibration));

    let mut station = RfidStation::new(calibration);

    loop {
        let now_ms = Instant::now().as_millis();
        let tick = station.tick(now_ms, &mut reader, &mut sensor, &mut notifier);

        if let Some(e) = tick.reader_error {
            warn!("RFID: Poll failed: {}", e);
        }
        if let Some(e) = tick.sensor_error {
            warn!("RFID: Light sensor read failed: {}", e);
        }
        if let Some(event) = tick.scan {
            info!(
                "RFID: Scanned pet {} (reported: {})",
                event.pet_id.as_str(),
                event.reported
            );
            state.lock(|s| s.borrow_mut().events.push(event));
        }
        if led.write(tick.color).is_err() {
            error!("RFID: Failed to write to LED");
        }

        Timer::after(Duration::from_millis(RFID_POLL_MS)).await;
    }
}

/// RFID Station Task - Embassy Task für parallele Ausführung
///
/// Übernimmt die Hardware-Initialisierung und ruft dann `station_logic()` auf.
#[embassy_executor::task]
pub async fn station_task(
    p: StationPeripherals,
    notifier: ChannelNotifier,
    state: &'static SharedStationState,
) {
    info!("RFID: Task started");

    // MFRC522 aus dem Reset holen (RST HIGH = aktiv)
    let _rst = Output::new(p.rst, Level::High, OutputConfig::default());
    Timer::after(Duration::from_millis(50)).await;

    let spi_config = SpiConfig::default()
        .with_frequency(Rate::from_mhz(RFID_SPI_MHZ))
        .with_mode(Mode::_0);
    let spi = match Spi::new(p.spi, spi_config) {
        Ok(spi) => spi.with_sck(p.sck).with_mosi(p.mosi).with_miso(p.miso),
        Err(e) => {
            error!("RFID: SPI setup failed: {}", Debug2Format(&e));
            return;
        }
    };
    let cs = Output::new(p.cs, Level::High, OutputConfig::default());

    let mut reader = match Mfrc522Reader::new(spi, cs) {
        Ok(reader) => reader,
        Err(e) => {
            error!("RFID: Reader init failed: {}", e);
            return;
        }
    };
    match reader.version() {
        Ok(version) => info!("RFID: MFRC522 version {=u8:#x}", version),
        Err(e) => warn!("RFID: Could not read version: {}", e),
    }

    let sensor = AdcLightSensor::new(p.adc, p.light_pin);

    // Buffer für SmartLED Daten erstellen (1 LED)
    let mut rmt_buffer = smart_led_buffer!(1);
    let led = match RmtLedWriter::new(p.led_pin, p.rmt, RMT_CLOCK_MHZ, &mut rmt_buffer) {
        Ok(led) => led,
        Err(e) => {
            error!("RFID: LED init failed: {}", e);
            return;
        }
    };

    station_logic(reader, sensor, led, notifier, state).await;
}
