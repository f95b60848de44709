//! Event-Log der letzten Fütterungen bzw. Scans (nur im RAM)

use heapless::Deque;

/// Anzahl gespeicherter Events pro Gerät
pub const EVENT_LOG_CAPACITY: usize = 16;

/// Begrenzter FIFO: ist er voll, fällt das älteste Event heraus
#[derive(Debug, Clone)]
pub struct EventLog<T, const N: usize> {
    events: Deque<T, N>,
    total: u32,
}

impl<T, const N: usize> EventLog<T, N> {
    pub const fn new() -> Self {
        Self {
            events: Deque::new(),
            total: 0,
        }
    }

    /// Hängt ein Event an (verdrängt ggf. das älteste)
    pub fn push(&mut self, event: T) {
        if self.events.is_full() {
            self.events.pop_front();
        }
        // Nach pop_front ist immer Platz
        let _ = self.events.push_back(event);
        self.total = self.total.wrapping_add(1);
    }

    /// Events vom ältesten zum neuesten
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.events.iter()
    }

    pub fn latest(&self) -> Option<&T> {
        self.events.back()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Anzahl aller jemals aufgenommenen Events (auch verdrängte)
    pub fn total(&self) -> u32 {
        self.total
    }
}

impl<T, const N: usize> Default for EventLog<T, N> {
    fn default() -> Self {
        Self::new()
    }
}
