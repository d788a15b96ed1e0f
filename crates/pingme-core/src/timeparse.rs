//! Time expression grammars.
//!
//! Two entry points: [`parse_duration`] for relative expressions like
//! `"30m"` or `"1h30m"`, and [`parse_clock_time`] for absolute clock times
//! like `"17:30"` or `"5:30pm"`. The clock parser always anchors to the
//! date of the supplied `now`; rolling a past time forward to tomorrow is
//! scheduling policy, not grammar.

use chrono::{DateTime, Local, LocalResult, NaiveTime, TimeZone};

use crate::error::{PingmeError, Result};

/// Parse a duration expression into seconds.
///
/// Accepts one or more `<integer><unit>` tokens with unit `h`, `m`, or `s`
/// (case-insensitive, whitespace allowed between integer and unit), summed
/// in any order: `"1h30m"`, `"90m"`, and `"30m 1h"` are all fine. A string
/// with no unit token at all is read as a bare integer of seconds, which
/// may be zero or negative; what to do with a non-future result is the
/// scheduler's call.
pub fn parse_duration(text: &str) -> Result<i64> {
    let normalized = text.trim().to_lowercase();
    let mut total_seconds: i64 = 0;
    let mut current_number = String::new();
    let mut gap_after_number = false;
    let mut any_unit = false;

    for c in normalized.chars() {
        if c.is_ascii_digit() {
            // "1 2m" reads as 2 minutes; the orphaned 1 never finds a unit.
            if gap_after_number {
                current_number.clear();
            }
            current_number.push(c);
            gap_after_number = false;
        } else if c.is_whitespace() {
            gap_after_number = !current_number.is_empty();
        } else {
            if !current_number.is_empty() {
                let value: i64 = current_number.parse().map_err(|_| {
                    PingmeError::invalid_format(text, "number out of range")
                })?;
                current_number.clear();

                match c {
                    's' => {
                        total_seconds = total_seconds.saturating_add(value);
                        any_unit = true;
                    }
                    'm' => {
                        total_seconds = total_seconds.saturating_add(value.saturating_mul(60));
                        any_unit = true;
                    }
                    'h' => {
                        total_seconds = total_seconds.saturating_add(value.saturating_mul(3600));
                        any_unit = true;
                    }
                    _ => {}
                }
            }
            gap_after_number = false;
        }
    }

    if any_unit {
        return Ok(total_seconds);
    }

    normalized.parse::<i64>().map_err(|_| {
        PingmeError::invalid_format(
            text,
            "expected forms like 30m, 1h30m, or a bare number of seconds",
        )
    })
}

/// Parse an absolute clock time, anchored to the date of `now`.
///
/// Grammar attempts in order: 24-hour `HH:MM`, 12-hour `H:MM` with am/pm,
/// bare 12-hour hour with am/pm (minutes zero). The result is that clock
/// time on `now`'s date with seconds zeroed; it may already be in the past.
pub fn parse_clock_time(text: &str, now: DateTime<Local>) -> Result<DateTime<Local>> {
    let normalized = text.trim().to_lowercase();

    let time = NaiveTime::parse_from_str(&normalized, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(&normalized, "%I:%M%p"))
        .ok()
        .or_else(|| bare_hour_time(&normalized))
        .ok_or_else(|| {
            PingmeError::invalid_format(text, "expected HH:MM, H:MMam/pm, or Ham/pm")
        })?;

    let naive = now.date_naive().and_time(time);
    match Local.from_local_datetime(&naive) {
        LocalResult::Single(dt) => Ok(dt),
        // Fall-back transitions repeat an hour; take the earlier instant.
        LocalResult::Ambiguous(earlier, _) => Ok(earlier),
        LocalResult::None => Err(PingmeError::invalid_format(
            text,
            "that clock time does not exist today",
        )),
    }
}

/// The bare-hour grammar: digits followed by am/pm, minutes implied zero.
/// chrono's `%I%p` refuses to build a `NaiveTime` without a minute field,
/// so this form is assembled by hand.
fn bare_hour_time(normalized: &str) -> Option<NaiveTime> {
    let hour_part = normalized
        .strip_suffix("am")
        .or_else(|| normalized.strip_suffix("pm"))?
        .trim();
    let hour12: u32 = hour_part.parse().ok()?;
    if !(1..=12).contains(&hour12) {
        return None;
    }
    let is_pm = normalized.ends_with("pm");
    let hour24 = match (hour12, is_pm) {
        (12, false) => 0,
        (12, true) => 12,
        (h, false) => h,
        (h, true) => h + 12,
    };
    NaiveTime::from_hms_opt(hour24, 0, 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noon() -> DateTime<Local> {
        Local.with_ymd_and_hms(2026, 3, 2, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_duration_unit_tokens() {
        assert_eq!(parse_duration("30m").unwrap(), 1800);
        assert_eq!(parse_duration("2h").unwrap(), 7200);
        assert_eq!(parse_duration("45s").unwrap(), 45);
        assert_eq!(parse_duration("1h30m").unwrap(), 5400);
        assert_eq!(parse_duration("90m").unwrap(), 5400);
        assert_eq!(parse_duration("1h30m15s").unwrap(), 5415);
    }

    #[test]
    fn test_duration_token_order_is_free() {
        assert_eq!(parse_duration("30m1h").unwrap(), 5400);
        assert_eq!(
            parse_duration("15s1h").unwrap(),
            parse_duration("1h15s").unwrap()
        );
    }

    #[test]
    fn test_duration_tolerates_spacing_and_case() {
        assert_eq!(parse_duration(" 1h 30m ").unwrap(), 5400);
        assert_eq!(parse_duration("90 m").unwrap(), 5400);
        assert_eq!(parse_duration("2H").unwrap(), 7200);
    }

    #[test]
    fn test_duration_bare_integer_is_seconds() {
        assert_eq!(parse_duration("45").unwrap(), 45);
        assert_eq!(parse_duration("0").unwrap(), 0);
        assert_eq!(parse_duration("-10").unwrap(), -10);
    }

    #[test]
    fn test_duration_rejects_garbage() {
        assert!(matches!(
            parse_duration("later"),
            Err(PingmeError::InvalidFormat { .. })
        ));
        assert!(matches!(
            parse_duration(""),
            Err(PingmeError::InvalidFormat { .. })
        ));
        assert!(matches!(
            parse_duration("5x"),
            Err(PingmeError::InvalidFormat { .. })
        ));
    }

    #[test]
    fn test_clock_24_hour() {
        let dt = parse_clock_time("17:30", noon()).unwrap();
        assert_eq!(dt, Local.with_ymd_and_hms(2026, 3, 2, 17, 30, 0).unwrap());

        let dt = parse_clock_time("9:05", noon()).unwrap();
        assert_eq!(dt, Local.with_ymd_and_hms(2026, 3, 2, 9, 5, 0).unwrap());
    }

    #[test]
    fn test_clock_12_hour_variants() {
        let pm = parse_clock_time("5:30pm", noon()).unwrap();
        assert_eq!(pm, parse_clock_time("17:30", noon()).unwrap());

        let bare = parse_clock_time("5pm", noon()).unwrap();
        assert_eq!(bare, Local.with_ymd_and_hms(2026, 3, 2, 17, 0, 0).unwrap());

        let upper = parse_clock_time("5:30PM", noon()).unwrap();
        assert_eq!(upper, pm);

        let midnight = parse_clock_time("12am", noon()).unwrap();
        assert_eq!(midnight, Local.with_ymd_and_hms(2026, 3, 2, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_clock_anchors_to_today_without_roll_forward() {
        // Even when the clock time has already passed, the parser reports
        // today's occurrence.
        let late = Local.with_ymd_and_hms(2026, 3, 2, 23, 59, 0).unwrap();
        let dt = parse_clock_time("17:30", late).unwrap();
        assert_eq!(dt, Local.with_ymd_and_hms(2026, 3, 2, 17, 30, 0).unwrap());
        assert!(dt < late);
    }

    #[test]
    fn test_clock_rejects_bad_input() {
        for bad in ["25:00", "13:00pm", "5:30xm", "noonish", ""] {
            assert!(
                matches!(
                    parse_clock_time(bad, noon()),
                    Err(PingmeError::InvalidFormat { .. })
                ),
                "expected InvalidFormat for {bad:?}"
            );
        }
    }
}
