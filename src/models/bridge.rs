//! Bridge status model: the snapshot handed to presentation.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Closure, Direction};

/// One of the two tracked crossings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BridgeId {
    /// Original Severn Bridge
    M48,
    /// Prince of Wales Bridge (Second Severn Crossing)
    M4,
}

impl BridgeId {
    /// Both crossings, in display order.
    pub const ALL: [BridgeId; 2] = [BridgeId::M48, BridgeId::M4];

    /// Road identifier as it appears in the feed.
    pub fn road(&self) -> &'static str {
        match self {
            BridgeId::M48 => "M48",
            BridgeId::M4 => "M4",
        }
    }

    /// Short display name.
    pub fn short_name(&self) -> &'static str {
        match self {
            BridgeId::M48 => "M48 Severn Bridge",
            BridgeId::M4 => "M4 Prince of Wales Bridge",
        }
    }

    /// Full display name.
    pub fn full_name(&self) -> &'static str {
        match self {
            BridgeId::M48 => "M48 Severn Bridge (Original Bridge, 1966)",
            BridgeId::M4 => "M4 Prince of Wales Bridge (Second Severn Crossing, 1996)",
        }
    }

    /// Look up a crossing by its exact road identifier.
    pub fn from_road(road: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|id| id.road() == road)
    }
}

impl fmt::Display for BridgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.road())
    }
}

/// Aggregate status, ordered by severity: `Open < Restricted < Closed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BridgeStatus {
    Open,
    Restricted,
    Closed,
}

impl fmt::Display for BridgeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BridgeStatus::Open => "OPEN",
            BridgeStatus::Restricted => "RESTRICTED",
            BridgeStatus::Closed => "CLOSED",
        };
        f.write_str(s)
    }
}

/// Status of one carriageway direction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectionalStatus {
    pub direction: Direction,
    pub status: BridgeStatus,
    /// Closures tagged with this direction or `Both`
    pub closures: Vec<Closure>,
}

/// Status of one crossing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bridge {
    pub id: BridgeId,
    pub name: String,
    pub status: BridgeStatus,
    pub message: String,
    pub closures: Vec<Closure>,
    pub eastbound: DirectionalStatus,
    pub westbound: DirectionalStatus,
}

impl Bridge {
    /// Number of closures currently in effect.
    pub fn active_count(&self) -> usize {
        self.closures.iter().filter(|c| c.is_active()).count()
    }

    /// Whether either direction is anything other than open.
    pub fn has_restrictions(&self) -> bool {
        self.eastbound.status != BridgeStatus::Open || self.westbound.status != BridgeStatus::Open
    }

    /// Directional status for a carriageway. `Both`/`Unknown` yield `None`.
    pub fn direction(&self, direction: Direction) -> Option<&DirectionalStatus> {
        match direction {
            Direction::Eastbound => Some(&self.eastbound),
            Direction::Westbound => Some(&self.westbound),
            Direction::Both | Direction::Unknown => None,
        }
    }
}

/// Snapshot of both crossings at one instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeData {
    pub m48: Bridge,
    pub m4: Bridge,
    pub last_updated: DateTime<Utc>,
    /// Relevant records seen, including any dropped by bucketing
    pub total_closures_found: usize,
    /// Relevant records that matched neither crossing by road or location
    pub unassigned_closures: usize,
}

impl BridgeData {
    /// Look up a crossing.
    pub fn bridge(&self, id: BridgeId) -> &Bridge {
        match id {
            BridgeId::M48 => &self.m48,
            BridgeId::M4 => &self.m4,
        }
    }

    /// Both crossings, in display order.
    pub fn bridges(&self) -> [&Bridge; 2] {
        [&self.m48, &self.m4]
    }

    /// All retained closures across both crossings.
    pub fn closures(&self) -> impl Iterator<Item = &Closure> {
        self.m48.closures.iter().chain(self.m4.closures.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_ordering() {
        assert!(BridgeStatus::Open < BridgeStatus::Restricted);
        assert!(BridgeStatus::Restricted < BridgeStatus::Closed);
    }

    #[test]
    fn test_from_road_is_exact() {
        assert_eq!(BridgeId::from_road("M48"), Some(BridgeId::M48));
        assert_eq!(BridgeId::from_road("M4"), Some(BridgeId::M4));
        assert_eq!(BridgeId::from_road("m4"), None);
        assert_eq!(BridgeId::from_road("M5"), None);
    }
}
