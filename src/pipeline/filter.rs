//! Relevance filtering of raw closure records.
//!
//! A record on an untracked road is never relevant. Otherwise it is relevant
//! when its road's location markers match, or when its geometry falls inside
//! the Severn estuary box. Records without a road identifier can only match
//! on geometry.

use crate::models::{BridgeId, ClosureRecord};

/// Latitude/longitude box around both crossings (inclusive).
pub const SEVERN_LAT_MIN: f64 = 51.55;
pub const SEVERN_LAT_MAX: f64 = 51.65;
pub const SEVERN_LON_MIN: f64 = -2.75;
pub const SEVERN_LON_MAX: f64 = -2.55;

/// Location markers for the M48 Severn Bridge (J1–J2).
const M48_MARKERS: &[&str] = &["j1", "j2", "junction 1", "junction 2", "severn"];

/// Location markers for the M4 Prince of Wales Bridge (J21–J24).
const M4_MARKERS: &[&str] = &[
    "j21",
    "j22",
    "j23",
    "j24",
    "junction 21",
    "junction 22",
    "junction 23",
    "junction 24",
    "severn",
    "wales",
];

/// Whether a record concerns either tracked crossing.
pub fn is_relevant(record: &ClosureRecord) -> bool {
    // A named but untracked road exits before any text check: unrelated
    // motorways often mention the same junction numbers.
    let road = record.road.trim();
    if !road.is_empty() {
        match BridgeId::from_road(road) {
            Some(bridge) if location_matches(bridge, &record.location) => return true,
            Some(_) => {}
            None => return false,
        }
    }

    parse_coordinates(&record.coordinates)
        .into_iter()
        .any(|(lat, lon)| in_severn_box(lat, lon))
}

/// Whether the location text carries one of the crossing's markers.
pub fn location_matches(bridge: BridgeId, location: &str) -> bool {
    let location = location.to_lowercase();
    let markers = match bridge {
        BridgeId::M48 => M48_MARKERS,
        BridgeId::M4 => M4_MARKERS,
    };
    markers.iter().any(|m| location.contains(m))
}

/// Parse a flat `lat lon lat lon ...` list.
///
/// A pair with an unparseable token is skipped; a trailing odd token is
/// ignored.
pub fn parse_coordinates(text: &str) -> Vec<(f64, f64)> {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    tokens
        .chunks_exact(2)
        .filter_map(|pair| {
            let lat = pair[0].parse::<f64>().ok()?;
            let lon = pair[1].parse::<f64>().ok()?;
            Some((lat, lon))
        })
        .collect()
}

/// Whether a point lies in the Severn crossing box.
pub fn in_severn_box(lat: f64, lon: f64) -> bool {
    (SEVERN_LAT_MIN..=SEVERN_LAT_MAX).contains(&lat)
        && (SEVERN_LON_MIN..=SEVERN_LON_MAX).contains(&lon)
}
