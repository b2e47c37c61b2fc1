//! UK local time formatting.

use chrono::{DateTime, Utc};
use chrono_tz::Europe::London;

use crate::pipeline::temporal;

/// Format an instant relative to `now` in UK local time.
///
/// `"HH:MM Today"`, `"HH:MM Tomorrow"` or `"HH:MM on dd Mon"`, where the day
/// comparison uses London calendar dates.
pub fn format_uk_time(instant: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let local = instant.with_timezone(&London);
    let today = now.with_timezone(&London).date_naive();
    let time = local.format("%H:%M");

    let day = local.date_naive();

    if day == today {
        format!("{time} Today")
    } else if today.succ_opt() == Some(day) {
        format!("{time} Tomorrow")
    } else {
        format!("{time} on {}", local.format("%d %b"))
    }
}

/// [`format_uk_time`] for a raw feed timestamp. Unparseable text is returned as-is.
pub fn format_feed_time(raw: &str, now: DateTime<Utc>) -> String {
    temporal::parse_utc(raw)
        .map(|t| format_uk_time(t, now))
        .unwrap_or_else(|| raw.to_string())
}

/// `HH:MM:SS` wall-clock time in London.
pub fn format_clock(instant: DateTime<Utc>) -> String {
    instant.with_timezone(&London).format("%H:%M:%S").to_string()
}
