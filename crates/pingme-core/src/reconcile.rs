//! Reconciliation of the collection with elapsed time.
//!
//! Runs at the start of every operation that reads or mutates the store:
//! elapsed one-shot records are dropped, elapsed recurring records advance
//! by whole intervals until their fire time is strictly in the future. The
//! caller persists the result and re-arms deferred fires for everything in
//! [`Reconciliation::rearmed`].

use chrono::{DateTime, Duration, Local};
use tracing::{debug, warn};

use crate::reminder::Reminder;

/// What a reconciliation pass changed.
#[derive(Debug, Default)]
pub struct Reconciliation {
    /// Elapsed one-shot records (and unusable recurring ones) removed
    pub dropped: Vec<Reminder>,
    /// Recurring records whose fire time advanced; a deferred fire must be
    /// re-armed for each, at its new fire time
    pub rearmed: Vec<Reminder>,
}

impl Reconciliation {
    /// True when the pass changed nothing.
    pub fn is_noop(&self) -> bool {
        self.dropped.is_empty() && self.rearmed.is_empty()
    }
}

/// Bring `records` up to date with `now`.
///
/// A recurring record that slept through several intervals advances
/// straight past the backlog: repeated `+recurrence` until strictly future,
/// one re-arm, no burst of missed notifications. A persisted recurrence of
/// zero or less can never advance and is dropped as corrupt.
pub fn reconcile(records: &mut Vec<Reminder>, now: DateTime<Local>) -> Reconciliation {
    let mut outcome = Reconciliation::default();

    records.retain_mut(|r| {
        if !r.is_due(now) {
            return true;
        }
        match r.recurrence {
            None => {
                debug!(id = %r.id, "dropping elapsed one-shot reminder");
                outcome.dropped.push(r.clone());
                false
            }
            Some(interval) if interval <= 0 => {
                warn!(id = %r.id, interval, "dropping reminder with unusable recurrence");
                outcome.dropped.push(r.clone());
                false
            }
            Some(interval) => match advance_past(r.fire_at, interval, now) {
                Some(next) => {
                    r.fire_at = next;
                    debug!(id = %r.id, fire_at = %r.fire_at, "advanced recurring reminder");
                    outcome.rearmed.push(r.clone());
                    true
                }
                None => {
                    warn!(id = %r.id, interval, "dropping reminder with unusable recurrence");
                    outcome.dropped.push(r.clone());
                    false
                }
            },
        }
    });

    outcome
}

/// Advance `fire_at` by whole `interval_secs` steps until strictly after
/// `now`. `None` when the arithmetic leaves chrono's representable range,
/// which only a hand-edited store can produce.
pub(crate) fn advance_past(
    fire_at: DateTime<Local>,
    interval_secs: i64,
    now: DateTime<Local>,
) -> Option<DateTime<Local>> {
    let step = Duration::try_seconds(interval_secs)?;
    let mut next = fire_at;
    while next <= now {
        next = next.checked_add_signed(step)?;
    }
    Some(next)
}
