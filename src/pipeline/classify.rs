//! Closure classification: severity, display text and direction.

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;

use crate::models::{BridgeId, Closure, ClosureRecord, Direction, Severity, ValidityState};

use super::temporal;

/// Mile-marker range such as `201/5-196/0`, with surrounding whitespace.
static MARKER_RANGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*\d+/\d+-\d+/\d+\s*").expect("valid marker range regex"));

/// Single trailing mile marker such as `201/5`.
static TRAILING_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*\d+/\d+\s*$").expect("valid trailing marker regex"));

/// Phrases that mean the whole carriageway is shut.
const FULL_CLOSURE_PHRASES: &[&str] = &["carriageway closure", "bridge closed"];

/// Severity implied by a description.
pub fn severity(description: &str) -> Severity {
    let lower = description.to_lowercase();
    if FULL_CLOSURE_PHRASES.iter().any(|p| lower.contains(p)) {
        Severity::FullClosure
    } else {
        Severity::LaneRestriction
    }
}

/// Strip mile-marker tokens and normalise whitespace.
///
/// The pass is repeated until the text stops changing, so cleaning is
/// idempotent even for inputs ending in several markers.
pub fn clean_description(text: &str) -> String {
    let mut current = clean_once(text);
    loop {
        let next = clean_once(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

fn clean_once(text: &str) -> String {
    let without_ranges = MARKER_RANGE.replace_all(text, " ");
    let without_trailing = TRAILING_MARKER.replace(&without_ranges, "");
    without_trailing.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Map feed direction text to a [`Direction`]. Unrecognised text is `Unknown`.
pub fn parse_direction(text: &str) -> Direction {
    match text.trim().to_lowercase().as_str() {
        "eastbound" => Direction::Eastbound,
        "westbound" => Direction::Westbound,
        "bothdirections" | "both" => Direction::Both,
        _ => Direction::Unknown,
    }
}

/// Build the retained closure for a relevant record.
pub fn classify(record: &ClosureRecord, bridge: BridgeId, now: DateTime<Utc>) -> Closure {
    let validity = ValidityState::parse(&record.validity);
    let status = temporal::closure_status(
        &validity,
        record.start.as_deref(),
        record.end.as_deref(),
        now,
    );
    let description = clean_description(&record.description);

    Closure {
        bridge,
        location: record.location.clone(),
        severity: severity(&description),
        description,
        status,
        validity,
        cause: record.cause.clone(),
        start: record.start.clone(),
        end: record.end.clone(),
        direction: parse_direction(&record.direction),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ClosureStatus;
    use chrono::TimeZone;

    #[test]
    fn test_full_closure_phrases() {
        assert_eq!(severity("Carriageway Closure for resurfacing"), Severity::FullClosure);
        assert_eq!(severity("M48 BRIDGE CLOSED due to high winds"), Severity::FullClosure);
        assert_eq!(severity("Lane closure"), Severity::LaneRestriction);
        assert_eq!(severity(""), Severity::LaneRestriction);
    }

    #[test]
    fn test_clean_description_markers() {
        assert_eq!(clean_description("M4 lane closure 201/5-196/0"), "M4 lane closure");
        assert_eq!(clean_description("Bridge work 150/3"), "Bridge work");
        assert_eq!(clean_description("ends with 1/2 3/4"), "ends with");
        assert_eq!(
            clean_description("Closure 201/5-196/0 between J23 and J24"),
            "Closure between J23 and J24"
        );
        assert_eq!(
            clean_description("M48 closed for maintenance"),
            "M48 closed for maintenance"
        );
    }

    #[test]
    fn test_clean_description_whitespace() {
        assert_eq!(clean_description("  lane \t closure \n "), "lane closure");
        assert_eq!(clean_description(""), "");
    }

    #[test]
    fn test_clean_description_is_idempotent() {
        let samples = [
            "M4 lane closure 201/5-196/0",
            "Bridge work 150/3",
            "a 1/2-3/4 b 5/6-7/8 9/10",
            "   spaced    out   ",
            "10/2 leading marker kept",
            "ends with 1/2 3/4",
            "",
        ];
        for sample in samples {
            let once = clean_description(sample);
            assert_eq!(clean_description(&once), once, "not idempotent for {sample:?}");
        }
    }

    #[test]
    fn test_parse_direction() {
        assert_eq!(parse_direction("eastBound"), Direction::Eastbound);
        assert_eq!(parse_direction("westBound"), Direction::Westbound);
        assert_eq!(parse_direction("bothDirections"), Direction::Both);
        assert_eq!(parse_direction("BOTH"), Direction::Both);
        assert_eq!(parse_direction("northBound"), Direction::Unknown);
        assert_eq!(parse_direction("unknown"), Direction::Unknown);
        assert_eq!(parse_direction(""), Direction::Unknown);
    }

    #[test]
    fn test_classify_builds_closure() {
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        let record = ClosureRecord {
            road: "M48".into(),
            location: "M48 J1 to J2".into(),
            description: "Carriageway closure  201/5-196/0".into(),
            validity: "Active".into(),
            cause: "roadMaintenance".into(),
            direction: "westBound".into(),
            ..ClosureRecord::default()
        };

        let closure = classify(&record, BridgeId::M48, now);
        assert_eq!(closure.description, "Carriageway closure");
        assert_eq!(closure.status, ClosureStatus::Active);
        assert_eq!(closure.severity, Severity::FullClosure);
        assert_eq!(closure.direction, Direction::Westbound);
        assert_eq!(closure.validity, ValidityState::Active);
        assert_eq!(closure.bridge, BridgeId::M48);
    }
}
