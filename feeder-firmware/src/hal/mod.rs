// Hardware Abstraction Layer (HAL) Module
//
// Dieses Modul implementiert die Traits aus feeder-core für die
// ESP32-C6 Peripherals. Die Geräte-Logik kennt nur die Traits.

pub mod credential_store;
pub mod hx711;
pub mod led_writer;
pub mod light_sensor;
pub mod rfid_reader;
pub mod servo;

pub use credential_store::load_credentials;
pub use hx711::Hx711;
pub use led_writer::RmtLedWriter;
pub use light_sensor::AdcLightSensor;
pub use rfid_reader::Mfrc522Reader;
pub use servo::{LedcServo, servo_timer};
