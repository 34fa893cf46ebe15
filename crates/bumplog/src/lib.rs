//! `bumplog` - A logbook of vehicles entering and leaving a location
//!
//! This library keeps an ordered list of entry/exit events, snapshots it to a
//! local key-value store after every change, and presents it grouped by
//! calendar day, one day at a time.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod event;
pub mod kv;
pub mod logging;
pub mod storage;
pub mod store;
pub mod view;

pub use app::{AppState, Command, ViewState};
pub use config::Config;
pub use error::{Error, Result};
pub use event::{Clock, Direction, Event, EventId, EventPatch, ManualClock, SystemClock};
pub use kv::{KeyValueStore, MemoryKv};
pub use logging::init_logging;
pub use storage::SqliteKv;
pub use store::{EventStats, EventStore};
pub use view::{current_page, group_by_day, DayGroup, Pager};
