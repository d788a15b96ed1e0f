//! Reminder scheduling operations.
//!
//! [`Scheduler`] owns the store plus the two capability backends and
//! implements the command surface: schedule now/in/at/every, list, cancel,
//! clear, and the hidden fire entry point the deferred executor re-enters
//! through. Every operation takes `now` explicitly so tests can pin the
//! clock; callers pass `Local::now()`.

use std::sync::Arc;

use chrono::{DateTime, Days, Duration, Local};
use tracing::{debug, info, warn};

use crate::error::{PingmeError, Result};
use crate::executor::DeferredExecutor;
use crate::notify::Notifier;
use crate::reconcile::{advance_past, reconcile};
use crate::reminder::{unique_short_id, Reminder};
use crate::selector::find_match;
use crate::store::ReminderStore;
use crate::timeparse::{parse_clock_time, parse_duration};

/// Notification title for one-shot reminders.
pub const ONE_SHOT_TITLE: &str = "⏰ Ping";

/// Notification title for recurring reminders.
pub const RECURRING_TITLE: &str = "🔁 Ping";

/// Smallest accepted recurrence interval in seconds.
pub const MIN_RECURRENCE_SECS: i64 = 60;

/// What a schedule operation did.
#[derive(Debug)]
pub enum ScheduleOutcome {
    /// A record was persisted and a deferred fire registered
    Scheduled(Reminder),
    /// The resolved time was not in the future: the notification fired on
    /// the spot and nothing was persisted
    FiredImmediately,
}

/// What a fire callback did.
#[derive(Debug, PartialEq, Eq)]
pub enum FireOutcome {
    /// The record was found and its notification dispatched
    Fired,
    /// No record with that id; it was cancelled or cleared after the timer
    /// was armed
    Skipped,
}

/// The reminder engine: store plus capabilities.
pub struct Scheduler {
    store: ReminderStore,
    notifier: Arc<dyn Notifier>,
    executor: Arc<dyn DeferredExecutor>,
}

impl Scheduler {
    pub fn new(
        store: ReminderStore,
        notifier: Arc<dyn Notifier>,
        executor: Arc<dyn DeferredExecutor>,
    ) -> Self {
        Self {
            store,
            notifier,
            executor,
        }
    }

    pub fn store(&self) -> &ReminderStore {
        &self.store
    }

    /// Notify immediately. Nothing is persisted, so a delivery failure is
    /// the operation's result.
    pub fn schedule_now(&self, message: &str) -> Result<()> {
        self.notifier.notify(ONE_SHOT_TITLE, message)?;
        info!(backend = self.notifier.name(), "immediate notification sent");
        Ok(())
    }

    /// Schedule a one-shot reminder `duration_text` from now.
    pub fn schedule_in(
        &self,
        duration_text: &str,
        message: &str,
        now: DateTime<Local>,
    ) -> Result<ScheduleOutcome> {
        let secs = parse_duration(duration_text)?;
        let fire_at = future_time(now, secs)
            .ok_or_else(|| PingmeError::invalid_format(duration_text, "duration too large"))?;
        self.schedule_one_shot(fire_at, message, now)
    }

    /// Schedule a one-shot reminder at a clock time, rolling a time that
    /// has already passed today forward to the same time tomorrow.
    pub fn schedule_at(
        &self,
        time_text: &str,
        message: &str,
        now: DateTime<Local>,
    ) -> Result<ScheduleOutcome> {
        let mut fire_at = parse_clock_time(time_text, now)?;
        if fire_at <= now {
            fire_at = fire_at.checked_add_days(Days::new(1)).ok_or_else(|| {
                PingmeError::invalid_format(time_text, "cannot move that time to tomorrow")
            })?;
        }
        self.schedule_one_shot(fire_at, message, now)
    }

    /// Schedule a recurring reminder; first fire is one interval from now.
    pub fn schedule_every(
        &self,
        interval_text: &str,
        message: &str,
        now: DateTime<Local>,
    ) -> Result<Reminder> {
        let secs = parse_duration(interval_text)?;
        if secs < MIN_RECURRENCE_SECS {
            return Err(PingmeError::IntervalTooShort {
                got_secs: secs,
                minimum_secs: MIN_RECURRENCE_SECS,
            });
        }

        let fire_at = future_time(now, secs)
            .ok_or_else(|| PingmeError::invalid_format(interval_text, "interval too large"))?;
        let record = self.persist_new(fire_at, message, Some(secs), now)?;
        self.arm(&record, now);
        info!(id = %record.id, interval_secs = secs, "recurring reminder scheduled");
        Ok(record)
    }

    /// All pending reminders, reconciled and sorted ascending by fire time.
    pub fn list(&self, now: DateTime<Local>) -> Result<Vec<Reminder>> {
        let mut to_rearm = Vec::new();
        let mut records = self.store.transaction(|records| {
            to_rearm = reconcile(records, now).rearmed;
            Ok(records.clone())
        })?;
        self.rearm_all(&to_rearm, now);

        records.sort_by_key(|r| r.fire_at);
        Ok(records)
    }

    /// Remove the single reminder the selector refers to.
    pub fn cancel(&self, selector: &str, now: DateTime<Local>) -> Result<Reminder> {
        let mut to_rearm = Vec::new();
        let removed = self.store.transaction(|records| {
            to_rearm = reconcile(records, now).rearmed;
            Ok(find_match(records, selector).map(|idx| records.remove(idx)))
        })?;
        // An elapsed recurring record being cancelled right now must not
        // get a fresh timer on its way out.
        if let Some(gone) = &removed {
            to_rearm.retain(|r| r.id != gone.id);
        }
        self.rearm_all(&to_rearm, now);

        match removed {
            Some(record) => {
                info!(id = %record.id, "reminder cancelled");
                Ok(record)
            }
            None => Err(PingmeError::NotFound(selector.to_string())),
        }
    }

    /// Drop every record. Returns how many were dropped. Already-armed
    /// deferred fires stay armed; the caller surfaces that warning.
    pub fn clear(&self) -> Result<usize> {
        let count = self.store.transaction(|records| {
            let count = records.len();
            records.clear();
            Ok(count)
        })?;
        info!(count, "reminder collection cleared");
        Ok(count)
    }

    /// Deferred-fire callback: deliver the notification for `id` and
    /// settle the record (remove a one-shot, advance a recurring).
    ///
    /// A missing id is a quiet success: the record was cancelled or cleared
    /// after its timer was armed, so the timer has nothing to say.
    pub fn fire(&self, id: &str, now: DateTime<Local>) -> Result<FireOutcome> {
        let mut rearm: Option<Reminder> = None;
        let found = self.store.transaction(|records| {
            let Some(idx) = records.iter().position(|r| r.id == id) else {
                return Ok(None);
            };
            let snapshot = records[idx].clone();

            match snapshot.recurrence {
                None => {
                    records.remove(idx);
                }
                Some(interval) if interval <= 0 => {
                    records.remove(idx);
                }
                Some(interval) => {
                    if records[idx].fire_at <= now {
                        match advance_past(records[idx].fire_at, interval, now) {
                            Some(next) => {
                                records[idx].fire_at = next;
                                rearm = Some(records[idx].clone());
                            }
                            None => {
                                records.remove(idx);
                            }
                        }
                    }
                    // Already future: a concurrent reconcile advanced and
                    // re-armed it, so arming again would double the timers.
                }
            }
            Ok(Some(snapshot))
        })?;

        let Some(record) = found else {
            debug!(id, "fire for unknown record, likely cancelled");
            return Ok(FireOutcome::Skipped);
        };

        let title = if record.is_recurring() {
            RECURRING_TITLE
        } else {
            ONE_SHOT_TITLE
        };
        if let Err(e) = self.notifier.notify(title, &record.message) {
            warn!(id = %record.id, error = %e, "notification delivery failed");
        }
        if let Some(next) = rearm {
            self.arm(&next, now);
        }
        info!(id = %record.id, recurring = record.is_recurring(), "reminder fired");
        Ok(FireOutcome::Fired)
    }

    fn schedule_one_shot(
        &self,
        fire_at: DateTime<Local>,
        message: &str,
        now: DateTime<Local>,
    ) -> Result<ScheduleOutcome> {
        if fire_at <= now {
            self.notifier.notify(ONE_SHOT_TITLE, message)?;
            info!("fire time not in the future; notified immediately");
            return Ok(ScheduleOutcome::FiredImmediately);
        }

        let record = self.persist_new(fire_at, message, None, now)?;
        self.arm(&record, now);
        info!(id = %record.id, fire_at = %record.fire_at, "reminder scheduled");
        Ok(ScheduleOutcome::Scheduled(record))
    }

    /// Reconcile-and-append under one store lock.
    fn persist_new(
        &self,
        fire_at: DateTime<Local>,
        message: &str,
        recurrence: Option<i64>,
        now: DateTime<Local>,
    ) -> Result<Reminder> {
        let mut to_rearm = Vec::new();
        let record = self.store.transaction(|records| {
            to_rearm = reconcile(records, now).rearmed;

            let id = unique_short_id(records);
            let mut record = Reminder::new(id, fire_at, message.to_string(), now);
            if let Some(secs) = recurrence {
                record = record.with_recurrence(secs);
            }
            records.push(record.clone());
            Ok(record)
        })?;
        self.rearm_all(&to_rearm, now);
        Ok(record)
    }

    /// Register a deferred fire. The record is already persisted, so a
    /// registration failure downgrades to a warning; a recurring record
    /// will be re-armed by a later reconciliation anyway.
    fn arm(&self, record: &Reminder, now: DateTime<Local>) {
        let delay = record.fire_at.signed_duration_since(now).num_seconds();
        if let Err(e) = self.executor.register(delay, record) {
            warn!(
                id = %record.id,
                error = %e,
                "could not arm deferred fire; reminder stays tracked"
            );
        }
    }

    fn rearm_all(&self, records: &[Reminder], now: DateTime<Local>) {
        for record in records {
            self.arm(record, now);
        }
    }
}

/// `now + secs`, or `None` when the delta leaves chrono's representable
/// range. Grammar-valid but absurd durations become usage errors instead
/// of arithmetic panics.
fn future_time(now: DateTime<Local>, secs: i64) -> Option<DateTime<Local>> {
    now.checked_add_signed(Duration::try_seconds(secs)?)
}
