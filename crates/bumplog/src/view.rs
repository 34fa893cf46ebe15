//! Day-grouped view over the event store.
//!
//! Events are bucketed by calendar day in a chosen timezone and shown one
//! day ("page") at a time, most recent day first. Nothing here is stored:
//! groups are rebuilt from the current events on every read.

use std::collections::BTreeMap;

use chrono::{NaiveDate, TimeZone};
use serde::Serialize;

use crate::event::Event;

/// All events that fall on one calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayGroup {
    /// The calendar day.
    pub day: NaiveDate,
    /// Events of that day, in store order.
    pub events: Vec<Event>,
}

impl DayGroup {
    /// Number of entry events on this day.
    #[must_use]
    pub fn entries(&self) -> usize {
        self.events.iter().filter(|e| e.is_entry).count()
    }

    /// Number of exit events on this day.
    #[must_use]
    pub fn exits(&self) -> usize {
        self.events.len() - self.entries()
    }
}

/// Group `events` by calendar day in `tz`, most recent day first.
///
/// Within a day the input order is kept.
pub fn group_by_day<Tz: TimeZone>(events: &[Event], tz: &Tz) -> Vec<DayGroup> {
    let mut days: BTreeMap<NaiveDate, Vec<Event>> = BTreeMap::new();
    for event in events {
        let day = event.timestamp.with_timezone(tz).date_naive();
        days.entry(day).or_default().push(event.clone());
    }

    days.into_iter()
        .rev()
        .map(|(day, events)| DayGroup { day, events })
        .collect()
}

/// The group at `index`, or `None` when out of range.
#[must_use]
pub fn current_page(groups: &[DayGroup], index: usize) -> Option<&DayGroup> {
    groups.get(index)
}

/// Position within the day groups. Index 0 is the most recent day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Pager {
    index: usize,
}

impl Pager {
    /// Pager at the most recent day.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current index.
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Move one day back in time, stopping at the last group.
    pub fn older(&mut self, page_count: usize) {
        if self.index + 1 < page_count {
            self.index += 1;
        }
    }

    /// Move one day forward in time, stopping at 0.
    pub fn newer(&mut self) {
        self.index = self.index.saturating_sub(1);
    }

    /// Jump to `index`, clamped to the available groups.
    pub fn go_to(&mut self, index: usize, page_count: usize) {
        self.index = index;
        self.clamp(page_count);
    }

    /// Back to the most recent day.
    pub fn reset(&mut self) {
        self.index = 0;
    }

    /// Pull the index back into `0..page_count` (0 when there are no pages).
    pub fn clamp(&mut self, page_count: usize) {
        self.index = self.index.min(page_count.saturating_sub(1));
    }

    /// Whether a newer page exists.
    #[must_use]
    pub fn has_newer(&self) -> bool {
        self.index > 0
    }

    /// Whether an older page exists.
    #[must_use]
    pub fn has_older(&self, page_count: usize) -> bool {
        self.index + 1 < page_count
    }
}
