//! Core library for the pingme reminder tool.
//!
//! Provides:
//! - Time expression parsing (durations like `1h30m`, clock times like `5:30pm`)
//! - A JSON-file reminder store with exclusive advisory locking
//! - Reconciliation of elapsed one-shot and recurring reminders
//! - Selector resolution for cancellation (id, id prefix, clock time, substring)
//! - Pluggable notification and deferred-execution backends
//!
//! The CLI crate wires these together; everything here is synchronous and
//! takes `now` explicitly so behavior is testable at fixed instants.

pub mod config;
pub mod error;
pub mod executor;
pub mod notify;
pub mod reconcile;
pub mod reminder;
pub mod scheduler;
pub mod selector;
pub mod store;
pub mod timeparse;

pub use config::Settings;
pub use error::{PingmeError, Result};
pub use executor::{DeferredExecutor, DetachedShellExecutor};
pub use notify::{CommandNotifier, Notifier};
pub use reconcile::{reconcile, Reconciliation};
pub use reminder::{short_id, unique_short_id, Reminder};
pub use scheduler::{
    FireOutcome, ScheduleOutcome, Scheduler, MIN_RECURRENCE_SECS, ONE_SHOT_TITLE, RECURRING_TITLE,
};
pub use selector::find_match;
pub use store::{ReminderStore, StoreLock, COLLECTION_FILE};
pub use timeparse::{parse_clock_time, parse_duration};
