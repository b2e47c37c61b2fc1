//! Status aggregation: closures → per-direction and per-bridge status.
//!
//! Precedence is the same everywhere: any active full closure makes the
//! scope `Closed`, otherwise any active closure makes it `Restricted`,
//! otherwise it is `Open`.

use chrono::{DateTime, Utc};

use crate::models::{
    Bridge, BridgeData, BridgeId, BridgeStatus, Closure, ClosureRecord, Direction,
    DirectionalStatus,
};

use super::{classify, filter};

/// Status implied by a set of closures, considering only active ones.
fn status_of<'a>(closures: impl IntoIterator<Item = &'a Closure>) -> BridgeStatus {
    closures
        .into_iter()
        .filter(|c| c.is_active())
        .map(|c| {
            if c.is_full_closure() {
                BridgeStatus::Closed
            } else {
                BridgeStatus::Restricted
            }
        })
        .max()
        .unwrap_or(BridgeStatus::Open)
}

/// Status of one carriageway direction.
///
/// Closures tagged `Both` count towards either direction.
pub fn directional_status(closures: &[Closure], direction: Direction) -> DirectionalStatus {
    let selected: Vec<Closure> = closures
        .iter()
        .filter(|c| c.direction.affects(direction))
        .cloned()
        .collect();

    DirectionalStatus {
        direction,
        status: status_of(&selected),
        closures: selected,
    }
}

/// Overall status and message for a bridge's full closure list.
pub fn bridge_status(closures: &[Closure]) -> (BridgeStatus, String) {
    let active = closures.iter().filter(|c| c.is_active()).count();

    if active == 0 {
        let upcoming = closures.iter().filter(|c| c.is_upcoming()).count();
        let message = if upcoming > 0 {
            format!("Open - {upcoming} planned closure(s)")
        } else {
            "Open - No restrictions".to_string()
        };
        return (BridgeStatus::Open, message);
    }

    match status_of(closures) {
        BridgeStatus::Closed => (
            BridgeStatus::Closed,
            format!("CLOSED - {active} active closure(s)"),
        ),
        _ => (
            BridgeStatus::Restricted,
            format!("Restricted - {active} lane closure(s)"),
        ),
    }
}

/// Assign a record to a crossing.
///
/// Exact road identifier first, then a case-insensitive search for the road
/// name in the location text. `M48` is searched before `M4` since the latter
/// is a prefix of the former.
pub fn bucket(record: &ClosureRecord) -> Option<BridgeId> {
    if let Some(id) = BridgeId::from_road(record.road.trim()) {
        return Some(id);
    }

    let location = record.location.to_lowercase();
    BridgeId::ALL
        .into_iter()
        .find(|id| location.contains(&id.road().to_lowercase()))
}

/// Build a bridge entry from its bucketed closures.
pub fn build_bridge(id: BridgeId, closures: Vec<Closure>) -> Bridge {
    let (status, message) = bridge_status(&closures);
    let eastbound = directional_status(&closures, Direction::Eastbound);
    let westbound = directional_status(&closures, Direction::Westbound);

    Bridge {
        id,
        name: id.full_name().to_string(),
        status,
        message,
        closures,
        eastbound,
        westbound,
    }
}

/// Evaluate raw records at `now` into a status snapshot.
///
/// Pure: the same records and instant always give an equal result.
pub fn evaluate(records: &[ClosureRecord], now: DateTime<Utc>) -> BridgeData {
    let mut m48 = Vec::new();
    let mut m4 = Vec::new();
    let mut relevant = 0;
    let mut unassigned = 0;

    for record in records {
        if !filter::is_relevant(record) {
            log::debug!(
                "Ignoring closure on {} at {:?}: not near a tracked crossing",
                record.road,
                record.location
            );
            continue;
        }
        relevant += 1;

        match bucket(record) {
            Some(id) => {
                let closure = classify::classify(record, id, now);
                match id {
                    BridgeId::M48 => m48.push(closure),
                    BridgeId::M4 => m4.push(closure),
                }
            }
            None => {
                unassigned += 1;
                log::warn!(
                    "Relevant closure matched no crossing (road {:?}, location {:?}); dropped",
                    record.road,
                    record.location
                );
            }
        }
    }

    BridgeData {
        m48: build_bridge(BridgeId::M48, m48),
        m4: build_bridge(BridgeId::M4, m4),
        last_updated: now,
        total_closures_found: relevant,
        unassigned_closures: unassigned,
    }
}
