//! Fütterungs-Takt

/// Abstand zwischen zwei Fütterungen (für die Demo verkürzt)
pub const FEED_INTERVAL_MS: u32 = 20 * 1000;

/// Takt der Hauptschleife
pub const POLL_INTERVAL_MS: u32 = 1000;

/// Periodischer Fütterungs-Zeitplan auf Basis der Uptime
///
/// Rechnet mit `u32` Millisekunden und wrapping Subtraktion, damit der
/// Überlauf nach ~49 Tagen keinen Fehlalarm auslöst.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedSchedule {
    interval_ms: u32,
    last_feed_ms: u32,
}

impl FeedSchedule {
    /// Neuer Zeitplan; die erste Fütterung ist fällig sobald `now >= interval`.
    pub const fn new(interval_ms: u32) -> Self {
        Self {
            interval_ms,
            last_feed_ms: 0,
        }
    }

    pub fn is_due(&self, now_ms: u32) -> bool {
        now_ms.wrapping_sub(self.last_feed_ms) >= self.interval_ms
    }

    /// Merkt sich den Zeitpunkt der letzten Fütterung
    pub fn mark_fed(&mut self, now_ms: u32) {
        self.last_feed_ms = now_ms;
    }

    pub fn last_feed_ms(&self) -> u32 {
        self.last_feed_ms
    }
}

impl Default for FeedSchedule {
    fn default() -> Self {
        Self::new(FEED_INTERVAL_MS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_feed_after_interval() {
        let schedule = FeedSchedule::default();
        assert!(!schedule.is_due(0));
        assert!(!schedule.is_due(19_999));
        assert!(schedule.is_due(20_000));
    }

    #[test]
    fn test_mark_fed_resets_timer() {
        let mut schedule = FeedSchedule::new(1000);
        schedule.mark_fed(5000);
        assert!(!schedule.is_due(5999));
        assert!(schedule.is_due(6000));
    }

    #[test]
    fn test_wraparound() {
        let mut schedule = FeedSchedule::new(1000);
        schedule.mark_fed(u32::MAX - 200);
        assert!(!schedule.is_due(500));
        assert!(schedule.is_due(800));
    }
}
