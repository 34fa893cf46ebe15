//! The event store.
//!
//! Events live in memory, newest-created first. After every mutation the
//! whole sequence is serialized to JSON and written under one key in the
//! backing [`KeyValueStore`]. Loading and persisting are best-effort: a
//! missing or unreadable snapshot yields an empty store, and a failed write
//! leaves memory correct but the snapshot stale until the next good write.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::event::{Clock, Event, EventId, EventPatch, SystemClock};
use crate::error::{Error, Result};
use crate::kv::KeyValueStore;

/// Default key the snapshot is stored under.
pub const DEFAULT_SNAPSHOT_KEY: &str = "events";

/// Ordered, id-unique collection of events synchronized to a snapshot.
#[derive(Debug)]
pub struct EventStore<K> {
    events: Vec<Event>,
    kv: K,
    key: String,
    clock: Box<dyn Clock>,
}

impl<K: KeyValueStore> EventStore<K> {
    /// Create an empty store over `kv` using the default key and wall-clock time.
    ///
    /// Nothing is read from `kv` until [`load`](Self::load) is called.
    #[must_use]
    pub fn new(kv: K) -> Self {
        Self::with_key(kv, DEFAULT_SNAPSHOT_KEY)
    }

    /// Create an empty store that snapshots under `key`.
    #[must_use]
    pub fn with_key(kv: K, key: impl Into<String>) -> Self {
        Self {
            events: Vec::new(),
            kv,
            key: key.into(),
            clock: Box::new(SystemClock),
        }
    }

    /// Replace the clock used to timestamp new events.
    #[must_use]
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Create a store and immediately load its snapshot.
    #[must_use]
    pub fn open(kv: K, key: impl Into<String>) -> Self {
        let mut store = Self::with_key(kv, key);
        store.load();
        store
    }

    /// Record a new event at the current time and put it first.
    pub fn create(&mut self, vehicle_model: impl Into<String>, is_entry: bool) -> Event {
        let event = Event::new(self.clock.now(), vehicle_model, is_entry);
        debug!(id = %event.id, is_entry, "Created event");
        self.events.insert(0, event.clone());
        self.persist();
        event
    }

    /// Apply `patch` to the event with `id`. Unknown ids are ignored.
    pub fn update(&mut self, id: EventId, patch: &EventPatch) {
        let Some(event) = self.events.iter_mut().find(|e| e.id == id) else {
            debug!(%id, "Update for unknown event ignored");
            return;
        };
        event.apply(patch);
        debug!(%id, "Updated event");
        self.persist();
    }

    /// Remove the event with `id`. Unknown ids are ignored.
    pub fn delete(&mut self, id: EventId) {
        let Some(pos) = self.events.iter().position(|e| e.id == id) else {
            debug!(%id, "Delete for unknown event ignored");
            return;
        };
        self.events.remove(pos);
        debug!(%id, "Deleted event");
        self.persist();
    }

    /// Remove every event.
    pub fn clear_all(&mut self) {
        let removed = self.events.len();
        self.events.clear();
        info!("Cleared {} events", removed);
        self.persist();
    }

    /// Replace the in-memory events with the persisted snapshot.
    ///
    /// Any failure leaves the store empty.
    pub fn load(&mut self) {
        match self.try_load() {
            Ok(count) => info!("Loaded {} events from snapshot '{}'", count, self.key),
            Err(e) => {
                warn!("Could not load snapshot '{}', starting empty: {}", self.key, e);
                self.events.clear();
            }
        }
    }

    /// Fallible form of [`load`](Self::load). Returns the number of events loaded.
    ///
    /// On error the in-memory events are left unchanged.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read or the snapshot is not
    /// valid JSON for a list of events.
    pub fn try_load(&mut self) -> Result<usize> {
        let events = match self.kv.get(&self.key)? {
            Some(raw) => dedup_by_id(serde_json::from_str::<Vec<Event>>(&raw)?),
            None => Vec::new(),
        };
        self.events = events;
        Ok(self.events.len())
    }

    /// Write the full event sequence to the snapshot. Failures are logged and
    /// otherwise ignored.
    pub fn persist(&mut self) {
        if let Err(e) = self.try_persist() {
            warn!("Skipped writing snapshot '{}': {}", self.key, e);
        }
    }

    /// Fallible form of [`persist`](Self::persist).
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the backend write fails.
    pub fn try_persist(&mut self) -> Result<()> {
        let raw = serde_json::to_string(&self.events)?;
        self.kv.put(&self.key, &raw)
    }

    /// Events in store order, newest-created first.
    #[must_use]
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Look up an event by id.
    #[must_use]
    pub fn get(&self, id: EventId) -> Option<&Event> {
        self.events.iter().find(|e| e.id == id)
    }

    /// Resolve a full id or a unique id prefix to an event id.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownEvent`] if nothing matches and
    /// [`Error::AmbiguousEvent`] if the prefix matches more than one event.
    pub fn resolve(&self, id_or_prefix: &str) -> Result<EventId> {
        if let Ok(id) = id_or_prefix.parse::<EventId>() {
            return self
                .get(id)
                .map(|e| e.id)
                .ok_or_else(|| Error::unknown_event(id_or_prefix));
        }

        let matches: Vec<EventId> = self
            .events
            .iter()
            .filter(|e| e.id.matches_prefix(id_or_prefix))
            .map(|e| e.id)
            .collect();

        match matches.as_slice() {
            [] => Err(Error::unknown_event(id_or_prefix)),
            [id] => Ok(*id),
            _ => Err(Error::AmbiguousEvent {
                prefix: id_or_prefix.to_string(),
                count: matches.len(),
            }),
        }
    }

    /// Number of events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether the store holds no events.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Key the snapshot is written under.
    #[must_use]
    pub fn snapshot_key(&self) -> &str {
        &self.key
    }

    /// The backing key-value store.
    #[must_use]
    pub fn backend(&self) -> &K {
        &self.kv
    }

    /// Summary counts over the current events.
    #[must_use]
    pub fn stats(&self) -> EventStats {
        let entries = self.events.iter().filter(|e| e.is_entry).count();
        let days: HashSet<_> = self
            .events
            .iter()
            .map(|e| e.timestamp.with_timezone(&chrono::Local).date_naive())
            .collect();

        EventStats {
            total: self.events.len(),
            entries,
            exits: self.events.len() - entries,
            days: days.len(),
            oldest: self.events.iter().map(|e| e.timestamp).min(),
            newest: self.events.iter().map(|e| e.timestamp).max(),
        }
    }
}

/// Keep the first occurrence of each id.
fn dedup_by_id(events: Vec<Event>) -> Vec<Event> {
    let mut seen = HashSet::with_capacity(events.len());
    let before = events.len();
    let kept: Vec<Event> = events.into_iter().filter(|e| seen.insert(e.id)).collect();
    if kept.len() != before {
        warn!("Dropped {} duplicate events from snapshot", before - kept.len());
    }
    kept
}

/// Summary statistics of an [`EventStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventStats {
    /// Total number of events.
    pub total: usize,
    /// Number of entry events.
    pub entries: usize,
    /// Number of exit events.
    pub exits: usize,
    /// Number of distinct local calendar days with events.
    pub days: usize,
    /// Timestamp of the oldest event.
    pub oldest: Option<DateTime<Utc>>,
    /// Timestamp of the newest event.
    pub newest: Option<DateTime<Utc>>,
}
