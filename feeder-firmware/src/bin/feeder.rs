// Futterautomat: Wägezelle + Servo, meldet Fütterungen an den Server
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
use pet_feeder::tasks::report::wait_for_network;
use pet_feeder::tasks::{ChannelNotifier, feeder_http_task, feeder_task, report_task, start_wifi};
use pet_feeder::{FeederState, ReportChannel, SharedFeederState};

// ESP-IDF App Descriptor - erforderlich für den Bootloader!
// Ohne diesen schlägt das Flashen mit "ESP-IDF App Descriptor missing" fehl
esp_bootloader_esp_idf::esp_app_desc!();

/// Main Entry Point
///
/// Initialisiert Hardware, lädt die WiFi-Zugangsdaten, verbindet sich und
/// spawnt danach den Feeder-Task. Danach schläft main() - alle Arbeit läuft in Tasks.
#[esp_rtos::main]
async fn main(spawner: Spawner) -> ! {
    // ESP32-C6 Konfiguration: CPU auf maximale Taktfrequenz (160 MHz)
    let config = esp_hal::Config::default().with_cpu_clock(CpuClock::max());
    let peripherals = esp_hal::init(config);

    // Heap Allocator initialisieren (WiFi braucht dynamischen Speicher!)
    // Zwei Bereiche: reclaimed RAM (64 KB) + extra (36 KB) = 100 KB total
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

    info!("Feeder: Booting");

    // Geteilter Zustand (Feeder-Task schreibt, HTTP-Tasks lesen)
    static STATE: StaticCell<SharedFeederState> = StaticCell::new();
    let state = &*STATE.init(NoopMutex::new(RefCell::new(FeederState::new())));

    // Report-Channel erstellen (Feeder → Report-Task)
    static REPORTS: StaticCell<ReportChannel> = StaticCell::new();
    let reports = &*REPORTS.init(ReportChannel::new());

    // WiFi nur mit Zugangsdaten, sonst läuft das Gerät offline weiter
    let notifier = match load_credentials(peripherals.FLASH) {
        Some(credentials) => {
            let stack = start_wifi(spawner, peripherals.WIFI, credentials);

            spawner
                .spawn(report_task(stack, reports.receiver()))
                .unwrap();
            for task_id in 0..HTTP_TASK_POOL {
                spawner.spawn(feeder_http_task(task_id, stack, state)).unwrap();
            }

            // Erst verbinden, dann kalibrieren, damit die erste Meldung rausgeht
            info!("Feeder: Waiting for network before calibration...");
            wait_for_network(stack).await;
            ChannelNotifier::new(reports.sender())
        }
        None => {
            warn!("Feeder: No WiFi credentials, running offline (no reports are sent)");
            ChannelNotifier::offline()
        }
    };

    // Spawn Feeder Task (Waage + Servo)
    spawner
        .spawn(feeder_task(
            peripherals.GPIO22,
            peripherals.GPIO21,
            peripherals.GPIO20,
            peripherals.LEDC,
            notifier,
            state,
        ))
        .unwrap();

    // Main-Loop: schläft (alle Arbeit läuft in Tasks)
    loop {
        Timer::after(Duration::from_secs(3600)).await;
    }
}
