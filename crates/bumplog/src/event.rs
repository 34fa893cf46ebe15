//! Core event types for bumplog.
//!
//! This module defines the record written for every vehicle that crosses the
//! logging point, along with the partial update applied when a user edits one.

use std::cell::Cell;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};

/// Opaque unique identifier of an event.
///
/// Renders as a hyphenated UUID string, which is also its snapshot encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(Uuid);

impl EventId {
    /// Generate a fresh random id.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Check whether the rendered id starts with `prefix` (case-insensitive).
    #[must_use]
    pub fn matches_prefix(&self, prefix: &str) -> bool {
        !prefix.is_empty()
            && self
                .0
                .hyphenated()
                .to_string()
                .starts_with(&prefix.to_ascii_lowercase())
    }

    /// First eight characters of the id, for compact listings.
    #[must_use]
    pub fn short(&self) -> String {
        self.0.simple().to_string()[..8].to_string()
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl FromStr for EventId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|_| Error::invalid_event_id(s))
    }
}

/// Whether a vehicle was entering or leaving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// The vehicle entered.
    Entry,
    /// The vehicle left.
    Exit,
}

impl Direction {
    /// Map the stored flag onto a direction.
    #[must_use]
    pub fn from_is_entry(is_entry: bool) -> Self {
        if is_entry {
            Self::Entry
        } else {
            Self::Exit
        }
    }

    /// Whether this is an entry.
    #[must_use]
    pub fn is_entry(self) -> bool {
        matches!(self, Self::Entry)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Entry => write!(f, "entry"),
            Self::Exit => write!(f, "exit"),
        }
    }
}

/// A single recorded vehicle crossing.
///
/// The id and timestamp are fixed at creation; the vehicle model and the
/// entry/exit flag can be edited afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    /// Identity of the event.
    pub id: EventId,

    /// When the vehicle was logged.
    pub timestamp: DateTime<Utc>,

    /// Free-text vehicle description, possibly empty.
    pub vehicle_model: String,

    /// `true` for an entry, `false` for an exit.
    pub is_entry: bool,
}

impl Event {
    /// Create a new event with a fresh id at the given instant.
    #[must_use]
    pub fn new(timestamp: DateTime<Utc>, vehicle_model: impl Into<String>, is_entry: bool) -> Self {
        Self {
            id: EventId::new(),
            timestamp,
            vehicle_model: vehicle_model.into(),
            is_entry,
        }
    }

    /// Direction of travel.
    #[must_use]
    pub fn direction(&self) -> Direction {
        Direction::from_is_entry(self.is_entry)
    }

    /// Apply a partial update.
    pub fn apply(&mut self, patch: &EventPatch) {
        if let Some(model) = &patch.vehicle_model {
            self.vehicle_model.clone_from(model);
        }
        if let Some(is_entry) = patch.is_entry {
            self.is_entry = is_entry;
        }
    }
}

/// The user-editable fields of an [`Event`]; `None` leaves a field alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventPatch {
    /// New vehicle model text.
    pub vehicle_model: Option<String>,
    /// New entry/exit flag.
    pub is_entry: Option<bool>,
}

impl EventPatch {
    /// Patch that only changes the vehicle model.
    #[must_use]
    pub fn vehicle_model(model: impl Into<String>) -> Self {
        Self {
            vehicle_model: Some(model.into()),
            is_entry: None,
        }
    }

    /// Patch that only changes the entry/exit flag.
    #[must_use]
    pub fn is_entry(is_entry: bool) -> Self {
        Self {
            vehicle_model: None,
            is_entry: Some(is_entry),
        }
    }

    /// Whether the patch changes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vehicle_model.is_none() && self.is_entry.is_none()
    }
}

/// Source of "now" for newly created events.
pub trait Clock: fmt::Debug {
    /// The current instant.
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Cell<DateTime<Utc>>,
}

impl ManualClock {
    /// Start the clock at `start`.
    #[must_use]
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Cell::new(start),
        }
    }

    /// Jump to `instant`.
    pub fn set(&self, instant: DateTime<Utc>) {
        self.now.set(instant);
    }

    /// Move forward by `by`.
    pub fn advance(&self, by: chrono::Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        self.now.get()
    }
}

impl<C: Clock + ?Sized> Clock for std::rc::Rc<C> {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 17, h, 30, 0).unwrap()
    }

    #[test]
    fn test_event_new() {
        let event = Event::new(at(9), "Volvo V70", true);
        assert_eq!(event.vehicle_model, "Volvo V70");
        assert!(event.is_entry);
        assert_eq!(event.timestamp, at(9));
        assert_eq!(event.direction(), Direction::Entry);
    }

    #[test]
    fn test_event_ids_are_unique() {
        let a = Event::new(at(9), "", true);
        let b = Event::new(at(9), "", true);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_event_id_parse_and_display() {
        let id = EventId::new();
        let parsed: EventId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
        assert!("not-a-uuid".parse::<EventId>().is_err());
    }

    #[test]
    fn test_event_id_prefix() {
        let id: EventId = "5d8a1c2e-0000-4000-8000-000000000000".parse().unwrap();
        assert!(id.matches_prefix("5d8a"));
        assert!(id.matches_prefix("5D8A1C2E-"));
        assert!(!id.matches_prefix("5d8b"));
        assert!(!id.matches_prefix(""));
        assert_eq!(id.short(), "5d8a1c2e");
    }

    #[test]
    fn test_direction_display() {
        assert_eq!(Direction::Entry.to_string(), "entry");
        assert_eq!(Direction::Exit.to_string(), "exit");
        assert!(!Direction::from_is_entry(false).is_entry());
    }

    #[test]
    fn test_apply_only_touches_given_fields() {
        let mut event = Event::new(at(9), "Saab 900", true);
        let before = event.clone();

        event.apply(&EventPatch::vehicle_model("Tesla Model 3"));
        assert_eq!(event.vehicle_model, "Tesla Model 3");
        assert_eq!(event.is_entry, before.is_entry);
        assert_eq!(event.id, before.id);
        assert_eq!(event.timestamp, before.timestamp);

        event.apply(&EventPatch::is_entry(false));
        assert!(!event.is_entry);
        assert_eq!(event.vehicle_model, "Tesla Model 3");
    }

    #[test]
    fn test_apply_empty_patch() {
        let mut event = Event::new(at(9), "Fiat Panda", false);
        let before = event.clone();
        event.apply(&EventPatch::default());
        assert_eq!(event, before);
    }

    #[test]
    fn test_serialized_field_names() {
        let event = Event::new(at(9), "Golf", false);
        let json = serde_json::to_value(&event).unwrap();

        assert_eq!(json["id"], event.id.to_string());
        assert_eq!(json["vehicleModel"], "Golf");
        assert_eq!(json["isEntry"], false);
        assert_eq!(json["timestamp"], "2024-05-17T09:30:00Z");
    }

    #[test]
    fn test_manual_clock() {
        let clock = ManualClock::new(at(9));
        assert_eq!(clock.now(), at(9));
        clock.advance(chrono::Duration::hours(2));
        assert_eq!(clock.now(), at(11));
        clock.set(at(1));
        assert_eq!(clock.now(), at(1));
    }
}
