// JSON-Antworten des Geräte-Webservers
// Serialisierung mit serde-json-core (kein std)

use feeder_core::EventLog;
use serde::{Serialize, Serializer};

/// Welches Gerät antwortet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceKind {
    Feeder,
    RfidStation,
}

/// Antwort auf `GET /status` beim Futterautomaten
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FeederStatus {
    pub device: DeviceKind,
    pub uptime_ms: u64,
    /// None solange die Portion noch nicht gemessen wurde
    pub desired_g: Option<f32>,
    /// Anzahl Fütterungen seit dem Start (auch bereits aus dem Log gefallene)
    pub feedings: u32,
}

/// Antwort auf `GET /status` bei der RFID-Station
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StationStatus {
    pub device: DeviceKind,
    pub uptime_ms: u64,
    /// false während der Lichtsensor-Kalibrierung
    pub calibrated: bool,
    pub light_min: Option<u16>,
    pub light_max: Option<u16>,
    pub scans: u32,
}

/// Serialisiert ein Event-Log als JSON-Array (älteste zuerst)
pub struct EventsJson<'a, T, const N: usize>(pub &'a EventLog<T, N>);

impl<T: Serialize, const N: usize> Serialize for EventsJson<'_, T, N> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.0.iter())
    }
}
