// Library-Root: Wiederverwendbare Logik und Module für beide Geräte
// Keine Standard-Bibliothek (Embedded System)
#![no_std]

// Heap für picoserve Responses (alloc feature)
extern crate alloc;

// Module
pub mod config;
pub mod hal;
pub mod tasks;
pub mod web;

use core::cell::RefCell;

// Re-exports von feeder-core
pub use feeder_core::{
    EVENT_LOG_CAPACITY, EventLog, FeedingEvent, LightCalibration, PetId, Report, ScanEvent,
};

// Embassy Channel- und Mutex-Typen
use embassy_sync::blocking_mutex::NoopMutex;
use embassy_sync::blocking_mutex::raw::NoopRawMutex;
use embassy_sync::channel::{Channel, Receiver, Sender};

use crate::config::REPORT_QUEUE_LEN;

// ============================================================================
// Geteilter Geräte-Zustand (Geräte-Task schreibt, HTTP-Tasks lesen)
// ============================================================================

/// Zustand des Futterautomaten
pub struct FeederState {
    /// Kalibrierte Soll-Portion in Gramm (None bis zur ersten Messung)
    pub desired_g: Option<f32>,
    pub events: EventLog<FeedingEvent, EVENT_LOG_CAPACITY>,
}

impl FeederState {
    pub const fn new() -> Self {
        Self {
            desired_g: None,
            events: EventLog::new(),
        }
    }
}

/// Zustand der RFID-Station
pub struct StationState {
    /// Lichtsensor-Kalibrierung (None während der Kalibrierphase)
    pub calibration: Option<LightCalibration>,
    pub events: EventLog<ScanEvent, EVENT_LOG_CAPACITY>,
}

impl StationState {
    pub const fn new() -> Self {
        Self {
            calibration: None,
            events: EventLog::new(),
        }
    }
}

/// Mutex-geschützter Zustand (Single-Core Executor, daher NoopRawMutex)
pub type SharedFeederState = NoopMutex<RefCell<FeederState>>;
pub type SharedStationState = NoopMutex<RefCell<StationState>>;

// ============================================================================
// Type-Aliase für Channel-Typen
// ============================================================================
//
// Statt:  Sender<'static, NoopRawMutex, Report, REPORT_QUEUE_LEN>
// Nutze:  ReportSender

/// Channel für Server-Meldungen (Geräte-Task → Report-Task)
/// - REPORT_QUEUE_LEN: Nachrichten-Kapazität, volle Queue verwirft neue Meldungen
pub type ReportChannel = Channel<NoopRawMutex, Report, REPORT_QUEUE_LEN>;

/// Sender für Server-Meldungen
pub type ReportSender = Sender<'static, NoopRawMutex, Report, REPORT_QUEUE_LEN>;

/// Receiver für Server-Meldungen (Report-Task empfängt)
pub type ReportReceiver = Receiver<'static, NoopRawMutex, Report, REPORT_QUEUE_LEN>;
