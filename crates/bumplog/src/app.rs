//! Application state and commands.
//!
//! The front end never touches the store or the page index directly. It
//! sends a [`Command`] to [`AppState::dispatch`] and renders the returned
//! [`ViewState`].

use chrono::{Local, TimeZone};
use serde::Serialize;
use tracing::trace;

use crate::event::{Event, EventId, EventPatch};
use crate::kv::KeyValueStore;
use crate::store::EventStore;
use crate::view::{current_page, group_by_day, DayGroup, Pager};

/// Something the user asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Log a new vehicle.
    Create {
        /// Vehicle model text.
        vehicle_model: String,
        /// Entry (`true`) or exit (`false`).
        is_entry: bool,
    },
    /// Edit an existing event.
    Update {
        /// Event to edit.
        id: EventId,
        /// Fields to change.
        patch: EventPatch,
    },
    /// Remove an event.
    Delete {
        /// Event to remove.
        id: EventId,
    },
    /// Remove all events.
    ClearAll,
    /// Show the previous (older) day.
    Older,
    /// Show the next (more recent) day.
    Newer,
    /// Show the day at the given index.
    GoTo(usize),
    /// Re-render without changing anything.
    Refresh,
}

impl Command {
    /// A create command with default fields (empty model, entry).
    #[must_use]
    pub fn create() -> Self {
        Self::Create {
            vehicle_model: String::new(),
            is_entry: true,
        }
    }
}

/// What the front end should show after a command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewState {
    /// Index of the shown day.
    pub page_index: usize,
    /// Number of days with events.
    pub page_count: usize,
    /// The shown day, if there is one.
    pub page: Option<DayGroup>,
    /// Whether a more recent day exists.
    pub has_newer: bool,
    /// Whether an older day exists.
    pub has_older: bool,
}

/// The event store plus the current page.
#[derive(Debug)]
pub struct AppState<K, Tz: TimeZone = Local> {
    store: EventStore<K>,
    pager: Pager,
    tz: Tz,
}

impl<K: KeyValueStore> AppState<K, Local> {
    /// Wrap `store`, grouping days in the local timezone.
    #[must_use]
    pub fn new(store: EventStore<K>) -> Self {
        Self::with_timezone(store, Local)
    }
}

impl<K: KeyValueStore, Tz: TimeZone> AppState<K, Tz> {
    /// Wrap `store`, grouping days in `tz`.
    #[must_use]
    pub fn with_timezone(store: EventStore<K>, tz: Tz) -> Self {
        Self {
            store,
            pager: Pager::new(),
            tz,
        }
    }

    /// Apply `command` and return the resulting view.
    pub fn dispatch(&mut self, command: Command) -> ViewState {
        trace!(?command, "Dispatching");
        match command {
            Command::Create {
                vehicle_model,
                is_entry,
            } => {
                self.store.create(vehicle_model, is_entry);
                self.pager.reset();
            }
            Command::Update { id, patch } => self.store.update(id, &patch),
            Command::Delete { id } => {
                self.store.delete(id);
                let pages = self.page_count();
                self.pager.clamp(pages);
            }
            Command::ClearAll => {
                self.store.clear_all();
                self.pager.reset();
            }
            Command::Older => {
                let pages = self.page_count();
                self.pager.older(pages);
            }
            Command::Newer => self.pager.newer(),
            Command::GoTo(index) => {
                let pages = self.page_count();
                self.pager.go_to(index, pages);
            }
            Command::Refresh => {}
        }
        self.view()
    }

    /// Log a new vehicle and return the created event.
    ///
    /// Same as dispatching [`Command::Create`], for callers that need the id.
    pub fn create(&mut self, vehicle_model: impl Into<String>, is_entry: bool) -> Event {
        let event = self.store.create(vehicle_model, is_entry);
        self.pager.reset();
        event
    }

    /// Current view.
    #[must_use]
    pub fn view(&self) -> ViewState {
        let groups = self.grouped_events();
        ViewState {
            page_index: self.pager.index(),
            page_count: groups.len(),
            page: current_page(&groups, self.pager.index()).cloned(),
            has_newer: self.pager.has_newer(),
            has_older: self.pager.has_older(groups.len()),
        }
    }

    /// All events grouped by day, most recent first.
    #[must_use]
    pub fn grouped_events(&self) -> Vec<DayGroup> {
        group_by_day(self.store.events(), &self.tz)
    }

    /// Number of distinct days with events.
    #[must_use]
    pub fn page_count(&self) -> usize {
        self.grouped_events().len()
    }

    /// Current page index.
    #[must_use]
    pub fn page_index(&self) -> usize {
        self.pager.index()
    }

    /// The underlying store.
    #[must_use]
    pub fn store(&self) -> &EventStore<K> {
        &self.store
    }

    /// Reload events from the snapshot and return to the most recent day.
    pub fn reload(&mut self) -> ViewState {
        self.store.load();
        self.pager.reset();
        self.view()
    }
}
