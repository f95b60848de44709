//! Feeder Core - Platform-agnostic Logic and Traits
//!
//! Diese Crate enthält KEINE Hardware-Dependencies.
//! Sie definiert nur Traits, Kalibrier-Mathematik und Pure Functions
//! für den Futterautomaten und die RFID-Station.

#![no_std]

pub mod credentials;
pub mod events;
pub mod feeding;
pub mod http;
pub mod light;
pub mod rfid;
pub mod scale;
pub mod schedule;
pub mod servo;
pub mod traits;
pub mod types;

// Re-exports für einfachen Zugriff
pub use credentials::{CredentialError, WifiCredentials};
pub use events::{EVENT_LOG_CAPACITY, EventLog};
pub use feeding::{DispensePlan, FeedError, FeedOutcome, FeedSession, FeedStep, attempt_feed};
pub use http::{HttpError, ResponseHead};
pub use light::{LightCalibration, map_range};
pub use rfid::{RfidStation, ScanGate, StationTick};
pub use scale::Scale;
pub use schedule::FeedSchedule;
pub use traits::{
    CardReader, Dispenser, FeedNotifier, LedError, LightSensor, LoadCell, RfidError, ScaleError,
    ScanNotifier, SensorError, ServoError, SmartLedWriter,
};
pub use types::{FeedingEvent, PetId, Report, ScanEvent};
