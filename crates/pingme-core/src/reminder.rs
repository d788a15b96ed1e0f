//! Reminder record type and its read-time views.
//!
//! Records are the unit of persisted state. Everything beyond the five
//! stored fields (expiry, minutes remaining, date markers) is computed at
//! read time against a caller-supplied clock.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A pending reminder.
///
/// Persisted as one JSON object per record. The on-disk field names `time`
/// and `created` are part of the store layout and must not change; unknown
/// fields are ignored on read and a missing `recurrence` means one-shot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reminder {
    /// Short unique identifier, assigned at creation
    pub id: String,

    /// Next absolute fire time, local timezone
    #[serde(rename = "time")]
    pub fire_at: DateTime<Local>,

    /// Free-text payload shown in the notification
    pub message: String,

    /// When the record was created; informational only
    #[serde(rename = "created")]
    pub created_at: DateTime<Local>,

    /// Recurrence interval in seconds; absent for one-shot reminders
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurrence: Option<i64>,
}

impl Reminder {
    /// Create a one-shot reminder with the given id.
    pub fn new(
        id: String,
        fire_at: DateTime<Local>,
        message: String,
        created_at: DateTime<Local>,
    ) -> Self {
        Self {
            id,
            fire_at,
            message,
            created_at,
            recurrence: None,
        }
    }

    /// Mark the reminder as recurring with the given interval in seconds.
    pub fn with_recurrence(mut self, interval_secs: i64) -> Self {
        self.recurrence = Some(interval_secs);
        self
    }

    /// Whether the reminder repeats.
    pub fn is_recurring(&self) -> bool {
        self.recurrence.is_some()
    }

    /// Whether the fire time has been reached.
    pub fn is_due(&self, now: DateTime<Local>) -> bool {
        self.fire_at <= now
    }

    /// Whole minutes until the fire time, truncated toward zero.
    ///
    /// Negative for already-elapsed records; callers normally reconcile
    /// before presenting this.
    pub fn minutes_remaining(&self, now: DateTime<Local>) -> i64 {
        self.fire_at.signed_duration_since(now).num_minutes()
    }

    /// Whether the fire time falls on a later calendar date than `now`.
    ///
    /// Drives the "tmrw" marker in listings.
    pub fn fires_on_later_date(&self, now: DateTime<Local>) -> bool {
        self.fire_at.date_naive() > now.date_naive()
    }

    /// The fire time as an `HH:MM` clock label.
    ///
    /// Used both for display and for clock-value cancellation matching.
    pub fn clock_label(&self) -> String {
        self.fire_at.format("%H:%M").to_string()
    }
}

/// Generate a short record id: the first 8 hex characters of a v4 UUID.
pub fn short_id() -> String {
    let hex = Uuid::new_v4().simple().to_string();
    hex[..8].to_string()
}

/// Generate a short id not already present in `existing`.
///
/// Eight hex characters give 32 bits, so collisions are improbable but not
/// impossible; the store-level uniqueness invariant is enforced here.
pub fn unique_short_id(existing: &[Reminder]) -> String {
    loop {
        let id = short_id();
        if !existing.iter().any(|r| r.id == id) {
            return id;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn local(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
    }

    #[test]
    fn test_serialized_field_names() {
        let r = Reminder::new(
            "a1b2c3d4".to_string(),
            local(2026, 3, 1, 17, 30, 0),
            "stand up".to_string(),
            local(2026, 3, 1, 9, 0, 0),
        );

        let json = serde_json::to_value(&r).unwrap();
        assert!(json.get("id").is_some());
        assert!(json.get("time").is_some());
        assert!(json.get("message").is_some());
        assert!(json.get("created").is_some());
        // One-shot records omit the recurrence field entirely.
        assert!(json.get("recurrence").is_none());

        let recurring = r.with_recurrence(300);
        let json = serde_json::to_value(&recurring).unwrap();
        assert_eq!(json["recurrence"], 300);
    }

    #[test]
    fn test_roundtrip_preserves_fields() {
        let r = Reminder::new(
            "deadbeef".to_string(),
            local(2026, 3, 1, 8, 15, 0),
            "water the plants".to_string(),
            local(2026, 2, 28, 22, 0, 0),
        )
        .with_recurrence(3600);

        let json = serde_json::to_string(&r).unwrap();
        let decoded: Reminder = serde_json::from_str(&json).unwrap();

        assert_eq!(decoded.id, r.id);
        assert_eq!(decoded.fire_at, r.fire_at);
        assert_eq!(decoded.message, r.message);
        assert_eq!(decoded.created_at, r.created_at);
        assert_eq!(decoded.recurrence, Some(3600));
    }

    #[test]
    fn test_unknown_fields_ignored_on_read() {
        let json = r#"{
            "id": "cafe0001",
            "time": "2026-03-01T17:30:00+00:00",
            "message": "call home",
            "created": "2026-03-01T09:00:00+00:00",
            "snooze_count": 2,
            "label": "family"
        }"#;

        let decoded: Reminder = serde_json::from_str(json).unwrap();
        assert_eq!(decoded.id, "cafe0001");
        assert_eq!(decoded.message, "call home");
        assert!(decoded.recurrence.is_none());
    }

    #[test]
    fn test_read_time_views() {
        let now = local(2026, 3, 1, 12, 0, 0);
        let r = Reminder::new(
            "00000001".to_string(),
            local(2026, 3, 1, 12, 45, 30),
            "tea".to_string(),
            now,
        );

        assert!(!r.is_due(now));
        assert!(r.is_due(local(2026, 3, 1, 12, 45, 30)));
        assert_eq!(r.minutes_remaining(now), 45);
        assert!(!r.fires_on_later_date(now));
        assert_eq!(r.clock_label(), "12:45");

        let tomorrow = Reminder::new(
            "00000002".to_string(),
            local(2026, 3, 2, 0, 10, 0),
            "midnight check".to_string(),
            now,
        );
        assert!(tomorrow.fires_on_later_date(now));
    }

    #[test]
    fn test_short_id_shape() {
        let id = short_id();
        assert_eq!(id.len(), 8);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_unique_short_id_avoids_existing() {
        let now = Local::now();
        let existing: Vec<Reminder> = (0..4)
            .map(|i| Reminder::new(format!("{:08x}", i), now, "x".to_string(), now))
            .collect();

        let id = unique_short_id(&existing);
        assert_eq!(id.len(), 8);
        assert!(!existing.iter().any(|r| r.id == id));
    }
}
