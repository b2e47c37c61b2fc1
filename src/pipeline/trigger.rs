//! Re-evaluation trigger and closure countdowns.
//!
//! Planned closures flip to active when their start time passes. Nothing in
//! the feed changes at that moment, so the monitor's tick asks this module
//! whether a local re-evaluation is due.

use std::fmt;

use chrono::{DateTime, Duration, Utc};

use crate::models::{Bridge, BridgeData, Closure};

use super::temporal;

/// Default window after a start time during which a tick re-evaluates.
pub const DEFAULT_REEVALUATE_WINDOW_SECS: i64 = 5;

/// Default horizon for showing a countdown.
pub const DEFAULT_COUNTDOWN_WINDOW_SECS: i64 = 3600;

fn start_of(closure: &Closure) -> Option<DateTime<Utc>> {
    closure.start.as_deref().and_then(temporal::parse_utc)
}

/// Whether any inactive closure started within the last `window`.
///
/// True when `start <= now` and `now - start < window`.
pub fn should_reevaluate(data: &BridgeData, now: DateTime<Utc>, window: Duration) -> bool {
    data.closures()
        .filter(|c| !c.is_active())
        .filter_map(start_of)
        .any(|start| {
            let elapsed = now - start;
            elapsed >= Duration::zero() && elapsed < window
        })
}

/// Time remaining until a planned closure starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Countdown {
    pub remaining_secs: i64,
}

impl Countdown {
    pub fn minutes(&self) -> i64 {
        self.remaining_secs / 60
    }

    pub fn seconds(&self) -> i64 {
        self.remaining_secs % 60
    }
}

impl fmt::Display for Countdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Closing in: {:02}:{:02}", self.minutes(), self.seconds())
    }
}

/// Countdown to the first inactive closure on `bridge` that has a start.
///
/// Only the first such closure in list order is considered. Returns `None`
/// when it is already due or further away than `window`.
pub fn next_countdown(bridge: &Bridge, now: DateTime<Utc>, window: Duration) -> Option<Countdown> {
    let start = bridge
        .closures
        .iter()
        .filter(|c| !c.is_active())
        .find_map(start_of)?;

    let remaining = start - now;
    if remaining > Duration::zero() && remaining <= window {
        Some(Countdown {
            remaining_secs: remaining.num_seconds(),
        })
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ClosureRecord;
    use crate::pipeline::aggregate::evaluate;
    use chrono::{SecondsFormat, TimeZone};

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 19, 0, 0).unwrap()
    }

    fn iso(t: DateTime<Utc>) -> String {
        t.to_rfc3339_opts(SecondsFormat::Secs, true)
    }

    fn planned(start: DateTime<Utc>) -> ClosureRecord {
        ClosureRecord {
            road: "M48".into(),
            location: "M48 J1 to J2".into(),
            description: "Carriageway closure".into(),
            validity: "planned".into(),
            start: Some(iso(start)),
            end: Some(iso(start + Duration::hours(8))),
            direction: "eastBound".into(),
            ..ClosureRecord::default()
        }
    }

    fn window() -> Duration {
        Duration::seconds(DEFAULT_REEVALUATE_WINDOW_SECS)
    }

    #[test]
    fn test_trigger_fires_at_start() {
        let start = fixed_now();
        // Evaluated just before start: still inactive in the snapshot
        let data = evaluate(&[planned(start)], start - Duration::seconds(1));

        assert!(!should_reevaluate(&data, start - Duration::seconds(1), window()));
        assert!(should_reevaluate(&data, start, window()));
        assert!(should_reevaluate(&data, start + Duration::milliseconds(4999), window()));
        assert!(!should_reevaluate(&data, start + Duration::seconds(5), window()));
    }

    #[test]
    fn test_trigger_ignores_active_closures() {
        let start = fixed_now() - Duration::seconds(2);
        let data = evaluate(&[planned(start)], fixed_now());
        assert!(data.m48.closures[0].is_active());
        assert!(!should_reevaluate(&data, fixed_now(), window()));
    }

    #[test]
    fn test_trigger_ignores_unparseable_start() {
        let mut record = planned(fixed_now());
        record.start = Some("soon".into());
        let data = evaluate(&[record], fixed_now());
        assert!(!should_reevaluate(&data, fixed_now(), window()));
    }

    #[test]
    fn test_reevaluation_activates_closure() {
        let start = fixed_now();
        let records = [planned(start)];
        let before = evaluate(&records, start - Duration::seconds(1));
        assert_eq!(before.m48.eastbound.status, crate::models::BridgeStatus::Open);

        let tick = start + Duration::seconds(1);
        assert!(should_reevaluate(&before, tick, window()));
        let after = evaluate(&records, tick);
        assert_eq!(after.m48.eastbound.status, crate::models::BridgeStatus::Closed);
    }

    #[test]
    fn test_countdown_format() {
        assert_eq!(Countdown { remaining_secs: 754 }.to_string(), "Closing in: 12:34");
        assert_eq!(Countdown { remaining_secs: 5 }.to_string(), "Closing in: 00:05");
        assert_eq!(Countdown { remaining_secs: 3600 }.to_string(), "Closing in: 60:00");
    }

    #[test]
    fn test_next_countdown_within_window() {
        let now = fixed_now();
        let data = evaluate(&[planned(now + Duration::minutes(12) + Duration::seconds(34))], now);
        let countdown = next_countdown(&data.m48, now, Duration::seconds(DEFAULT_COUNTDOWN_WINDOW_SECS));
        assert_eq!(countdown, Some(Countdown { remaining_secs: 754 }));
    }

    #[test]
    fn test_next_countdown_outside_window() {
        let now = fixed_now();
        let horizon = Duration::seconds(DEFAULT_COUNTDOWN_WINDOW_SECS);

        let far = evaluate(&[planned(now + Duration::hours(2))], now);
        assert_eq!(next_countdown(&far.m48, now, horizon), None);

        let due = evaluate(&[planned(now)], now);
        assert_eq!(next_countdown(&due.m48, now, horizon), None);
    }

    #[test]
    fn test_next_countdown_uses_first_inactive_in_order() {
        let now = fixed_now();
        let records = [
            planned(now + Duration::hours(3)),
            planned(now + Duration::minutes(10)),
        ];
        let data = evaluate(&records, now);
        assert_eq!(
            next_countdown(&data.m48, now, Duration::seconds(DEFAULT_COUNTDOWN_WINDOW_SECS)),
            None
        );
    }
}
