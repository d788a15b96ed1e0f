//! Cancel selector matching.
//!
//! One loosely-typed selector argument is tried against four typed
//! strategies in a fixed priority order: exact id, id prefix, fire-time
//! clock value, case-insensitive message substring. The first level with
//! any match wins; within a level the earliest-firing record is chosen, so
//! ambiguity is deterministic rather than an error.

use tracing::debug;

use crate::reminder::Reminder;

/// A matching strategy: a pure predicate over one record.
type Matcher = fn(&Reminder, &str) -> bool;

fn id_exact(r: &Reminder, selector: &str) -> bool {
    r.id == selector
}

fn id_prefix(r: &Reminder, selector: &str) -> bool {
    r.id.starts_with(selector)
}

fn clock_value(r: &Reminder, selector: &str) -> bool {
    r.clock_label() == selector
}

fn message_substring(r: &Reminder, selector: &str) -> bool {
    r.message.to_lowercase().contains(&selector.to_lowercase())
}

/// Strategies in priority order.
const MATCHERS: [(&str, Matcher); 4] = [
    ("exact id", id_exact),
    ("id prefix", id_prefix),
    ("fire time", clock_value),
    ("message substring", message_substring),
];

/// Find the record `selector` refers to, returning its index.
///
/// An empty selector would prefix- and substring-match everything, so it
/// matches nothing instead.
pub fn find_match(records: &[Reminder], selector: &str) -> Option<usize> {
    if selector.trim().is_empty() {
        return None;
    }

    for (kind, matches) in MATCHERS {
        let best = records
            .iter()
            .enumerate()
            .filter(|(_, r)| matches(r, selector))
            .min_by_key(|(_, r)| r.fire_at);
        if let Some((idx, r)) = best {
            debug!(id = %r.id, strategy = kind, "cancel selector matched");
            return Some(idx);
        }
    }
    None
}
