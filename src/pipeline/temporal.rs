//! Temporal evaluation: is a closure in effect at a given instant?
//!
//! All functions take `now` explicitly rather than reading the system clock,
//! so evaluation is deterministic in tests and during local re-evaluation.

use chrono::{DateTime, FixedOffset, Utc};

use crate::models::{ClosureStatus, ValidityState};

/// Parse an ISO-8601 timestamp with offset (e.g. `2026-03-01T20:00:00+00:00`).
///
/// Returns `None` for missing offsets or malformed text.
pub fn parse_timestamp(text: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(text.trim()).ok()
}

/// [`parse_timestamp`] normalised to UTC.
pub fn parse_utc(text: &str) -> Option<DateTime<Utc>> {
    parse_timestamp(text).map(|t| t.with_timezone(&Utc))
}

/// Whether a closure is active at `now`.
///
/// - `active` is always active, `suspended` never.
/// - `planned` is active strictly inside its start/end window, and only when
///   both bounds parse.
/// - Anything else is inactive.
pub fn is_active(
    validity: &ValidityState,
    start: Option<&str>,
    end: Option<&str>,
    now: DateTime<Utc>,
) -> bool {
    match validity {
        ValidityState::Active => true,
        ValidityState::Suspended => false,
        ValidityState::Planned => {
            let (Some(start), Some(end)) = (start.and_then(parse_utc), end.and_then(parse_utc)) else {
                return false;
            };
            now > start && now < end
        }
        ValidityState::Other(_) => false,
    }
}

/// Derived closure status at `now`.
pub fn closure_status(
    validity: &ValidityState,
    start: Option<&str>,
    end: Option<&str>,
    now: DateTime<Utc>,
) -> ClosureStatus {
    if is_active(validity, start, end, now) {
        ClosureStatus::Active
    } else {
        ClosureStatus::Planned
    }
}
