//! RFID-Gate: entscheidet welche Scans gemeldet werden und wann die LED leuchtet

use heapless::LinearMap;
use rgb::RGB8;

use crate::light::{LED_OFF, LightCalibration};
use crate::traits::{CardReader, LightSensor, RfidError, ScanNotifier, SensorError};
use crate::types::{PetId, ScanEvent};

/// Abstand der Poll-Zyklen der RFID-Station
pub const RFID_POLL_MS: u64 = 100;

/// Gleiche Marke innerhalb dieser Zeit wird nicht erneut gemeldet
pub const RESCAN_HOLDOFF_MS: u64 = 3000;

/// Leuchtdauer der LED nach einem akzeptierten Scan
pub const LED_HOLD_MS: u64 = 5000;

/// Anzahl Tiere, deren letzter Scan gemerkt wird
pub const TRACKED_PETS: usize = 8;

/// Zustand der RFID-Station
///
/// Solange eine Marke im Feld liegt, liefert der Leser sie bei jedem Poll
/// erneut. Das Gate filtert diese Wiederholungen pro Tier heraus, auch wenn
/// sich mehrere Tiere am Leser abwechseln.
#[derive(Debug, Clone, Default)]
pub struct ScanGate {
    last_seen: LinearMap<PetId, u64, TRACKED_PETS>,
    led_until_ms: Option<u64>,
}

impl ScanGate {
    pub const fn new() -> Self {
        Self {
            last_seen: LinearMap::new(),
            led_until_ms: None,
        }
    }

    /// Verarbeitet einen Scan. Gibt `true` zurück wenn er gemeldet werden soll.
    pub fn on_scan(&mut self, pet_id: &PetId, now_ms: u64) -> bool {
        let repeat = matches!(
            self.last_seen.get(pet_id),
            Some(&seen_ms) if now_ms.saturating_sub(seen_ms) < RESCAN_HOLDOFF_MS
        );

        // Zeitstempel auch bei Wiederholungen nachziehen: liegt die Marke
        // dauerhaft auf, wird sie nur einmal gemeldet.
        self.remember(pet_id, now_ms);

        if repeat {
            return false;
        }
        self.led_until_ms = Some(now_ms + LED_HOLD_MS);
        true
    }

    /// Soll die LED gerade leuchten?
    pub fn led_active(&self, now_ms: u64) -> bool {
        matches!(self.led_until_ms, Some(until) if now_ms < until)
    }

    fn remember(&mut self, pet_id: &PetId, now_ms: u64) {
        if let Some(seen_ms) = self.last_seen.get_mut(pet_id) {
            *seen_ms = now_ms;
            return;
        }
        if self.last_seen.len() == TRACKED_PETS {
            // Tier mit dem ältesten Scan verdrängen
            let oldest = self
                .last_seen
                .iter()
                .min_by_key(|(_, seen_ms)| **seen_ms)
                .map(|(id, _)| id.clone());
            if let Some(oldest) = oldest {
                self.last_seen.remove(&oldest);
            }
        }
        // nach dem Verdrängen ist immer ein Platz frei
        let _ = self.last_seen.insert(pet_id.clone(), now_ms);
    }
}

/// Ergebnis eines Poll-Zyklus der Station
#[derive(Debug, Clone, PartialEq)]
pub struct StationTick {
    /// Farbe, die jetzt auf die LED geschrieben wird
    pub color: RGB8,
    /// Akzeptierter Scan (für das Event-Log)
    pub scan: Option<ScanEvent>,
    pub reader_error: Option<RfidError>,
    pub sensor_error: Option<SensorError>,
}

/// Laufzeit-Logik der RFID-Station nach der Lichtkalibrierung
///
/// Ein `tick` entspricht einem Poll-Zyklus: Leser abfragen, akzeptierte Scans
/// melden, LED-Farbe bestimmen. Warten und LED schreiben übernimmt der Aufrufer.
#[derive(Debug, Clone)]
pub struct RfidStation {
    gate: ScanGate,
    calibration: LightCalibration,
}

impl RfidStation {
    pub const fn new(calibration: LightCalibration) -> Self {
        Self {
            gate: ScanGate::new(),
            calibration,
        }
    }

    pub fn calibration(&self) -> LightCalibration {
        self.calibration
    }

    pub fn tick<R, S, N>(
        &mut self,
        now_ms: u64,
        reader: &mut R,
        sensor: &mut S,
        notifier: &mut N,
    ) -> StationTick
    where
        R: CardReader,
        S: LightSensor,
        N: ScanNotifier,
    {
        let mut tick = StationTick {
            color: LED_OFF,
            scan: None,
            reader_error: None,
            sensor_error: None,
        };

        match reader.poll() {
            Ok(Some(pet_id)) if self.gate.on_scan(&pet_id, now_ms) => {
                let reported = notifier.notify_scan(&pet_id);
                tick.scan = Some(ScanEvent {
                    uptime_ms: now_ms,
                    pet_id,
                    reported,
                });
            }
            Ok(_) => {}
            Err(e) => tick.reader_error = Some(e),
        }

        if self.gate.led_active(now_ms) {
            // ohne Messwert volle Helligkeit
            let reading = sensor.read().unwrap_or_else(|e| {
                tick.sensor_error = Some(e);
                self.calibration.max()
            });
            tick.color = self.calibration.gate_color(reading);
        }
        tick
    }
}
