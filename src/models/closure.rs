//! Closure record structures, raw and classified.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::BridgeId;

/// A raw closure entry as surfaced by the roads feed, before filtering.
///
/// Every field is free text straight from the feed. Missing elements are
/// empty strings (or `None` for the timestamps), never errors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClosureRecord {
    /// Road identifier, e.g. "M4"
    pub road: String,

    /// Free-text location, e.g. "M4 westbound between J23 and J24"
    pub location: String,

    /// Operator comment describing the works
    pub description: String,

    /// Raw `validityStatus` text
    pub validity: String,

    /// `overallStartTime`, ISO-8601 with offset
    pub start: Option<String>,

    /// `overallEndTime`, ISO-8601 with offset
    pub end: Option<String>,

    /// `causeType`, e.g. "roadMaintenance" or "poorEnvironment"
    pub cause: String,

    /// `probabilityOfOccurrence`, informational only
    pub probability: String,

    /// `posList`: whitespace-separated latitude/longitude pairs
    pub coordinates: String,

    /// `directionOnLinearSection`
    pub direction: String,
}

/// Validity state declared by the feed operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidityState {
    Active,
    Planned,
    Suspended,
    Other(String),
}

impl ValidityState {
    /// Parse feed text case-insensitively.
    pub fn parse(text: &str) -> Self {
        let trimmed = text.trim();
        match trimmed.to_lowercase().as_str() {
            "active" => Self::Active,
            "planned" => Self::Planned,
            "suspended" => Self::Suspended,
            _ => Self::Other(trimmed.to_string()),
        }
    }

    /// Lower-case label for display.
    pub fn label(&self) -> &str {
        match self {
            Self::Active => "active",
            Self::Planned => "planned",
            Self::Suspended => "suspended",
            Self::Other(text) => text,
        }
    }
}

impl fmt::Display for ValidityState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Carriageway direction affected by a closure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Eastbound,
    Westbound,
    /// Counts towards both directional aggregates
    Both,
    Unknown,
}

impl Direction {
    /// Display label with an arrow, empty for `Unknown`.
    pub fn label(&self) -> &'static str {
        match self {
            Direction::Eastbound => "→ Eastbound",
            Direction::Westbound => "← Westbound",
            Direction::Both => "↔ Both directions",
            Direction::Unknown => "",
        }
    }

    /// Whether a closure tagged `self` counts towards `target`.
    pub fn affects(&self, target: Direction) -> bool {
        *self == target || *self == Direction::Both
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Direction::Eastbound => "eastbound",
            Direction::Westbound => "westbound",
            Direction::Both => "both",
            Direction::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

/// Derived activity state of a classified closure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClosureStatus {
    Active,
    Planned,
}

/// Severity class derived from the description text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    LaneRestriction,
    FullClosure,
}

/// A relevant closure after classification. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Closure {
    /// Crossing this closure was bucketed to
    pub bridge: BridgeId,

    /// Free-text location
    pub location: String,

    /// Description with mile-marker tokens removed
    pub description: String,

    /// Derived activity state
    pub status: ClosureStatus,

    /// Operator-declared validity
    pub validity: ValidityState,

    /// Full carriageway closure or lane-level restriction
    pub severity: Severity,

    /// Cause code
    pub cause: String,

    /// Raw start timestamp
    pub start: Option<String>,

    /// Raw end timestamp
    pub end: Option<String>,

    /// Affected direction
    pub direction: Direction,
}

impl Closure {
    /// Whether the closure is in effect right now.
    pub fn is_active(&self) -> bool {
        self.status == ClosureStatus::Active
    }

    /// Whether the closure closes the whole carriageway.
    pub fn is_full_closure(&self) -> bool {
        self.severity == Severity::FullClosure
    }

    /// Whether the closure is scheduled but not yet in effect.
    pub fn is_upcoming(&self) -> bool {
        !self.is_active() && self.validity == ValidityState::Planned
    }

    /// Identity used when comparing snapshots.
    pub fn key(&self) -> String {
        format!(
            "{}|{}|{}|{}|{:?}",
            self.location,
            self.description,
            self.start.as_deref().unwrap_or(""),
            self.end.as_deref().unwrap_or(""),
            self.direction
        )
    }
}
