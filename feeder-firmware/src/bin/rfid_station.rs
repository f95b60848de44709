// RFID-Station: meldet Marken-Scans, LED-Helligkeit folgt dem Raumlicht
// Keine Standard-Bibliothek verwenden (Embedded System)
#![no_std]
// Kein normaler main() Einstiegspunkt (wird von esp_rtos bereitgestellt)
#![no_main]
// Verbiete mem::forget - gefährlich bei ESP HAL Types mit DMA-Buffern
#![deny(
    clippy::mem_forget,
    reason = "mem::forget is generally not safe to do with esp_hal types, especially those \
    holding buffers for the duration of a data transfer."
)]
// Verbiete große Stack-Frames (Stack ist auf Embedded Systemen begrenzt)
#![deny(clippy::large_stack_frames)]

// Heap Allocator (WiFi und HTTP-Antworten benötigen dynamischen Speicher)
extern crate alloc;

use core::cell::RefCell;

// Embassy Async Runtime
use embassy_executor::Spawner;
use embassy_sync::blocking_mutex::NoopMutex;
use embassy_time::{Duration, Timer};

// ESP32-C6 HAL
use esp_hal::clock::CpuClock;
use esp_hal::timer::timg::TimerGroup;

// Backtrace bei Panic und println!() Support
use {esp_backtrace as _, esp_println as _};

use defmt::{info, warn};
use static_cell::StaticCell;

// Projekt-Module und Konfiguration
use pet_feeder::config::{EXTRA_HEAP_SIZE, HTTP_TASK_POOL, WIFI_HEAP_SIZE};
use pet_feeder::hal::load_credentials;
use pet_feeder::tasks::{
    ChannelNotifier, StationPeripherals, report_task, start_wifi, station_http_task, station_task,
};
use pet_feeder::{ReportChannel, SharedStationState, StationState};

// ESP-IDF App Descriptor - erforderlich für den Bootloader!
esp_bootloader_esp_idf::esp_app_desc!();

/// Main Entry Point
///
/// Initialisiert Hardware und WiFi, spawnt Station-, Report- und HTTP-Tasks.
#[esp_rtos::main]
async fn main(spawner: Spawner) -> ! {
    // ESP32-C6 Konfiguration: CPU auf maximale Taktfrequenz (160 MHz)
    let config = esp_hal::Config::default().with_cpu_clock(CpuClock::max());
    let peripherals = esp_hal::init(config);

    // Heap Allocator initialisieren (WiFi braucht dynamischen Speicher!)
    esp_alloc::heap_allocator!(
        #[esp_hal::ram(reclaimed)]
        size: WIFI_HEAP_SIZE
    );
    esp_alloc::heap_allocator!(size: EXTRA_HEAP_SIZE);

    // Embassy Runtime initialisieren (Timer + Software Interrupt)
    let timg0 = TimerGroup::new(peripherals.TIMG0);
    let sw_interrupt =
        esp_hal::interrupt::software::SoftwareInterruptControl::new(peripherals.SW_INTERRUPT);
    esp_rtos::start(timg0.timer0, sw_interrupt.software_interrupt0);

    info!("RFID: Booting");

    // Geteilter Zustand (Station-Task schreibt, HTTP-Tasks lesen)
    static STATE: StaticCell<SharedStationState> = StaticCell::new();
    let state = &*STATE.init(NoopMutex::new(RefCell::new(StationState::new())));

    // Report-Channel erstellen (Station → Report-Task)
    static REPORTS: StaticCell<ReportChannel> = StaticCell::new();
    let reports = &*REPORTS.init(ReportChannel::new());

    // WiFi nur mit Zugangsdaten, sonst läuft die Station offline weiter
    let notifier = match load_credentials(peripherals.FLASH) {
        Some(credentials) => {
            let stack = start_wifi(spawner, peripherals.WIFI, credentials);

            spawner
                .spawn(report_task(stack, reports.receiver()))
                .unwrap();
            for task_id in 0..HTTP_TASK_POOL {
                spawner
                    .spawn(station_http_task(task_id, stack, state))
                    .unwrap();
            }
            ChannelNotifier::new(reports.sender())
        }
        None => {
            warn!("RFID: No WiFi credentials, running offline (no reports are sent)");
            ChannelNotifier::offline()
        }
    };

    // Spawn Station Task (Leser + Lichtsensor + LED)
    let station = StationPeripherals {
        spi: peripherals.SPI2,
        sck: peripherals.GPIO6,
        mosi: peripherals.GPIO7,
        miso: peripherals.GPIO5,
        cs: peripherals.GPIO4,
        rst: peripherals.GPIO15,
        adc: peripherals.ADC1,
        light_pin: peripherals.GPIO1,
        led_pin: peripherals.GPIO8,
        rmt: peripherals.RMT,
    };
    spawner
        .spawn(station_task(
            station,
            notifier,
            state,
        ))
        .unwrap();

    // Main-Loop: schläft (alle Arbeit läuft in Tasks)
    loop {
        Timer::after(Duration::from_secs(3600)).await;
    }
}
