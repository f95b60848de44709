//! Core Types für Futterautomat und RFID-Station
//!
//! Datenstrukturen ohne Hardware-Dependencies

use core::fmt::Write;

use heapless::String;

/// Maximale UID-Länge (Triple-Size UID nach ISO 14443-3)
pub const MAX_UID_LEN: usize = 10;

/// Haustier-Kennung: UID der RFID-Marke als Hex-String (z.B. "04A1B2C3")
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct PetId(String<{ MAX_UID_LEN * 2 }>);

impl PetId {
    /// Erstellt eine PetId aus den UID-Bytes
    ///
    /// Gültig sind nur Single (4), Double (7) und Triple (10) Size UIDs.
    ///
    /// ```
    /// # use feeder_core::PetId;
    /// let id = PetId::from_uid(&[0x04, 0xa1, 0xb2, 0xc3]).unwrap();
    /// assert_eq!(id.as_str(), "04A1B2C3");
    /// ```
    pub fn from_uid(uid: &[u8]) -> Option<Self> {
        if !matches!(uid.len(), 4 | 7 | 10) {
            return None;
        }
        let mut hex = String::new();
        for byte in uid {
            // Kapazität reicht immer: 2 Zeichen pro Byte
            write!(hex, "{:02X}", byte).ok()?;
        }
        Some(Self(hex))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Eine abgeschlossene Fütterung (für das Event-Log des Futterautomaten)
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct FeedingEvent {
    /// Uptime beim Ende der Fütterung
    pub uptime_ms: u64,
    /// Anzahl der Servo-Pulse
    pub pulses: u16,
    /// Letzter Messwert der Waage in Gramm
    pub final_weight_g: f32,
    /// Wurde eine Meldung an den Server eingereiht?
    pub reported: bool,
    /// Abbruch weil der Vorratsbehälter leer/blockiert ist
    pub hopper_empty: bool,
    /// Abbruch durch einen Waagen- oder Servo-Fehler
    pub aborted: bool,
}

/// Ein RFID-Scan (für das Event-Log der RFID-Station)
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ScanEvent {
    pub uptime_ms: u64,
    pub pet_id: PetId,
    pub reported: bool,
}

/// Meldung an den Server (Geräte-Logik → Report-Task)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Report {
    /// `GET /feeding`
    Feeding,
    /// `GET /rfid_scan?pet_id=<id>`
    RfidScan { pet_id: PetId },
}

impl Report {
    /// Pfad des Server-Endpoints
    pub fn path(&self) -> &'static str {
        match self {
            Report::Feeding => "/feeding",
            Report::RfidScan { .. } => "/rfid_scan",
        }
    }
}

// ============================================================================
// defmt::Format Implementations (optional feature)
// ============================================================================

#[cfg(feature = "defmt")]
impl defmt::Format for PetId {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "{}", self.as_str())
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for FeedingEvent {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(
            fmt,
            "FeedingEvent {{ t: {}ms, pulses: {}, weight: {}g, reported: {}, \
             hopper_empty: {}, aborted: {} }}",
            self.uptime_ms,
            self.pulses,
            self.final_weight_g,
            self.reported,
            self.hopper_empty,
            self.aborted
        )
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for ScanEvent {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(
            fmt,
            "ScanEvent {{ t: {}ms, pet_id: {}, reported: {} }}",
            self.uptime_ms,
            self.pet_id,
            self.reported
        )
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Report {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Report::Feeding => defmt::write!(fmt, "Feeding"),
            Report::RfidScan { pet_id } => defmt::write!(fmt, "RfidScan {{ pet_id: {} }}", pet_id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pet_id_double_size_uid() {
        let id = PetId::from_uid(&[0x88, 0x04, 0x1f, 0x2a, 0x3b, 0x4c, 0x5d]).unwrap();
        assert_eq!(id.as_str(), "88041F2A3B4C5D");
    }

    #[test]
    fn test_pet_id_rejects_odd_lengths() {
        assert!(PetId::from_uid(&[]).is_none());
        assert!(PetId::from_uid(&[1, 2, 3]).is_none());
        assert!(PetId::from_uid(&[0; 11]).is_none());
    }

    #[test]
    fn test_report_paths() {
        assert_eq!(Report::Feeding.path(), "/feeding");
        let pet_id = PetId::from_uid(&[1, 2, 3, 4]).unwrap();
        assert_eq!(Report::RfidScan { pet_id }.path(), "/rfid_scan");
    }
}
