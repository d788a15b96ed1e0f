//! Command implementations for pingme.
//!
//! Handles:
//! - now/in/at/every: schedule notifications through the core scheduler
//! - list/cancel/clear: inspect and prune the reminder collection
//! - fire: deliver a due notification (invoked by armed timers)
//!
//! Handlers print the user-facing lines; formatting is split into plain
//! functions so output stays testable without capturing stdout.

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Local};

use pingme_core::{
    CommandNotifier, DetachedShellExecutor, Reminder, ReminderStore, ScheduleOutcome, Scheduler,
    Settings,
};

/// Wire the scheduler against the real platform backends.
///
/// The deferred executor re-enters this same binary with `fire <id>`, so
/// the callback path is our own executable.
pub fn build_scheduler(settings: &Settings) -> Result<Scheduler> {
    let store = ReminderStore::new(settings.expanded_state_dir());
    let notifier = Arc::new(CommandNotifier::new(&settings.notify.sound));
    let exe = std::env::current_exe().context("cannot resolve own executable path")?;
    let executor = Arc::new(DetachedShellExecutor::new(exe));
    Ok(Scheduler::new(store, notifier, executor))
}

/// `pingme now "message"`
pub fn handle_now(scheduler: &Scheduler, message: &str) -> Result<()> {
    scheduler.schedule_now(message)?;
    println!("✅ Notification sent");
    Ok(())
}

/// `pingme in 30m "message"`
pub fn handle_in(
    scheduler: &Scheduler,
    duration: &str,
    message: &str,
    now: DateTime<Local>,
) -> Result<()> {
    let outcome = scheduler.schedule_in(duration, message, now)?;
    print_schedule_outcome(&outcome, now);
    Ok(())
}

/// `pingme at 17:30 "message"`
pub fn handle_at(
    scheduler: &Scheduler,
    time: &str,
    message: &str,
    now: DateTime<Local>,
) -> Result<()> {
    let outcome = scheduler.schedule_at(time, message, now)?;
    print_schedule_outcome(&outcome, now);
    Ok(())
}

/// `pingme every 90m "message"`
pub fn handle_every(
    scheduler: &Scheduler,
    interval: &str,
    message: &str,
    now: DateTime<Local>,
) -> Result<()> {
    let record = scheduler.schedule_every(interval, message, now)?;
    println!("{}", recurring_confirmation(&record));
    Ok(())
}

/// `pingme list`
pub fn handle_list(scheduler: &Scheduler, now: DateTime<Local>) -> Result<()> {
    let records = scheduler.list(now)?;
    println!("{}", render_list(&records, now));
    Ok(())
}

/// `pingme cancel <selector>`
pub fn handle_cancel(scheduler: &Scheduler, selector: &str, now: DateTime<Local>) -> Result<()> {
    let removed = scheduler.cancel(selector, now)?;
    println!("{}", cancelled_confirmation(&removed));
    Ok(())
}

/// `pingme clear`
pub fn handle_clear(scheduler: &Scheduler) -> Result<()> {
    let count = scheduler.clear()?;
    println!("✅ Cleared {count} reminder(s)");
    if count > 0 {
        println!("⚠️  Timers already armed may still fire once");
    }
    Ok(())
}

/// `pingme fire <id>` (hidden; runs detached with no terminal attached,
/// so it prints nothing)
pub fn handle_fire(scheduler: &Scheduler, id: &str, now: DateTime<Local>) -> Result<()> {
    scheduler.fire(id, now)?;
    Ok(())
}

fn print_schedule_outcome(outcome: &ScheduleOutcome, now: DateTime<Local>) {
    match outcome {
        ScheduleOutcome::FiredImmediately => {
            println!("✅ Notification sent (time was now/past)");
        }
        ScheduleOutcome::Scheduled(record) => {
            println!("{}", scheduled_confirmation(record, now));
        }
    }
}

/// Confirmation line for a one-shot, e.g.
/// `✅ [ab12cd34] Scheduled for 14:30 (90m from now)`.
fn scheduled_confirmation(record: &Reminder, now: DateTime<Local>) -> String {
    let mut time_str = record.clock_label();
    if record.fires_on_later_date(now) {
        time_str.push_str(" tomorrow");
    }
    let mins = record.minutes_remaining(now).max(0);
    format!(
        "✅ [{}] Scheduled for {} ({}m from now)",
        record.id, time_str, mins
    )
}

/// Confirmation line for a recurring reminder, e.g.
/// `✅ [ab12cd34] Recurring every 90m: "hydrate"`.
fn recurring_confirmation(record: &Reminder) -> String {
    let mins = record.recurrence.unwrap_or(0) / 60;
    format!(
        "✅ [{}] Recurring every {}m: \"{}\"",
        record.id, mins, record.message
    )
}

fn cancelled_confirmation(record: &Reminder) -> String {
    let preview: String = record.message.chars().take(30).collect();
    if record.is_recurring() {
        format!("✅ Cancelled recurring [{}]: {}", record.id, preview)
    } else {
        format!("✅ Cancelled [{}]: {}", record.id, preview)
    }
}

/// Render the pending collection, one row per reminder in fire order.
fn render_list(records: &[Reminder], now: DateTime<Local>) -> String {
    if records.is_empty() {
        return "No pending reminders".to_string();
    }

    let mut out = String::from("Pending reminders:\n");
    for record in records {
        let mut time_str = record.clock_label();
        if record.fires_on_later_date(now) {
            time_str.push_str(" tmrw");
        }
        let mins = record.minutes_remaining(now).max(0);
        out.push_str(&format!(
            "  [{}]  {}  ({}m)  {}",
            record.id, time_str, mins, record.message
        ));
        if let Some(interval) = record.recurrence {
            out.push_str(&format!("  (every {}m)", interval / 60));
        }
        out.push('\n');
    }
    out.push_str("\nCancel: pingme cancel <id>");
    out
}
