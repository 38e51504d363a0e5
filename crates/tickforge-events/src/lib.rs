//! Append-only observability event log for the Tickforge simulation engine.
//!
//! Every tick's bookkeeping phase appends the tick's events here under a
//! short-held lock; external readers call [`EventLog::get_events_since`] to
//! read a copied slice without blocking the `WorldLoop` for longer than the
//! copy itself. The log carries no simulation semantics of its own — it is
//! purely an observability side channel: nothing in the core ever reads its
//! own output back to decide behavior.
//!
//! This crate also doubles as the record-shape definition for a future
//! replay/persistence layer: an append-only sequence of [`EventRecord`]s
//! keyed by tick is exactly what a durable store would need to ingest, even
//! though this crate itself never writes to disk.

use std::sync::Mutex;

use tickforge_types::{EventCategory, EventId, EventRecord, IdAllocator};

/// An in-memory, append-only log of observability events, shared behind a
/// lock between the `WorldLoop` writer and any number of external readers.
#[derive(Debug, Default)]
pub struct EventLog {
    next_id: Mutex<IdAllocator<EventId>>,
    events: Mutex<Vec<EventRecord>>,
}

impl EventLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one event at the given tick. Allocates the event's id from
    /// this log's own counter, independent of any other id space.
    #[allow(clippy::missing_panics_doc)]
    pub fn push(&self, tick: u64, category: EventCategory, message: impl Into<String>) {
        let Ok(mut next_id) = self.next_id.lock() else {
            return;
        };
        let id = next_id.alloc();
        drop(next_id);
        let record = EventRecord {
            id,
            tick,
            category,
            message: message.into(),
        };
        if let Ok(mut events) = self.events.lock() {
            events.push(record);
        }
    }

    /// Appends a tick's worth of events in one lock acquisition; used by
    /// bookkeeping step (m) to publish everything gathered during the tick
    /// without interleaving with a concurrent reader's copy.
    ///
    /// Each record's `id` is replaced with a freshly allocated one from
    /// this log's own counter -- callers assemble records with a
    /// placeholder id before the real one is known.
    #[allow(clippy::missing_panics_doc)]
    pub fn push_batch(&self, records: impl IntoIterator<Item = EventRecord>) {
        let Ok(mut next_id) = self.next_id.lock() else {
            return;
        };
        let Ok(mut events) = self.events.lock() else {
            return;
        };
        events.extend(records.into_iter().map(|record| EventRecord {
            id: next_id.alloc(),
            ..record
        }));
    }

    /// Returns a copy of every event with `tick >= since`. Readers never
    /// see a reference into the log, so they can hold the result as long as
    /// they like without blocking writers.
    #[must_use]
    pub fn get_events_since(&self, since: u64) -> Vec<EventRecord> {
        self.events.lock().map_or_else(
            |_| Vec::new(),
            |events| events.iter().filter(|e| e.tick >= since).cloned().collect(),
        )
    }

    /// Truncates the log to empty, per the `clear_events` control command.
    pub fn clear(&self) {
        if let Ok(mut events) = self.events.lock() {
            events.clear();
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.events.lock().map_or(0, |events| events.len())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::EventLog;
    use tickforge_types::EventCategory;

    #[test]
    fn events_since_excludes_earlier_ticks() {
        let log = EventLog::new();
        log.push(1, EventCategory::Spawn, "spawned goblin 1");
        log.push(2, EventCategory::Attack, "hero hits goblin 1");
        log.push(3, EventCategory::Death, "goblin 1 dies");

        let since_2 = log.get_events_since(2);
        assert_eq!(since_2.len(), 2);
        assert!(since_2.iter().all(|e| e.tick >= 2));
    }

    #[test]
    fn ids_are_monotonic_across_pushes() {
        let log = EventLog::new();
        log.push(1, EventCategory::Move, "a");
        log.push(1, EventCategory::Move, "b");
        let events = log.get_events_since(0);
        assert!(events[0].id.get() < events[1].id.get());
    }

    #[test]
    fn clear_empties_the_log() {
        let log = EventLog::new();
        log.push(1, EventCategory::Rest, "resting");
        assert_eq!(log.len(), 1);
        log.clear();
        assert!(log.is_empty());
    }

    #[test]
    fn push_batch_preserves_order() {
        let log = EventLog::new();
        log.push(1, EventCategory::Move, "first");
        let events = log.get_events_since(0);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].message, "first");
    }
}
