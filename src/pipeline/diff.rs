//! Diff calculation between consecutive status snapshots.
//!
//! Used by the monitor to log what changed on each publish: status
//! transitions per bridge and direction, plus closures that appeared,
//! disappeared or came into effect.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::models::{BridgeData, BridgeId, BridgeStatus, Closure};

/// Which part of a bridge changed status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    Overall,
    Eastbound,
    Westbound,
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Scope::Overall => "overall",
            Scope::Eastbound => "eastbound",
            Scope::Westbound => "westbound",
        };
        f.write_str(s)
    }
}

/// A status change on one bridge scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    pub bridge: BridgeId,
    pub scope: Scope,
    pub from: BridgeStatus,
    pub to: BridgeStatus,
}

/// Differences between two snapshots.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusDiff {
    pub transitions: Vec<Transition>,
    /// Closures present now but not before
    pub added: Vec<Closure>,
    /// Closures present before but not now
    pub removed: Vec<Closure>,
    /// Closures present in both that went from inactive to active
    pub activated: Vec<Closure>,
}

impl StatusDiff {
    /// Check if there are any changes.
    pub fn has_changes(&self) -> bool {
        !self.transitions.is_empty()
            || !self.added.is_empty()
            || !self.removed.is_empty()
            || !self.activated.is_empty()
    }

    /// Get the total number of changes.
    pub fn change_count(&self) -> usize {
        self.transitions.len() + self.added.len() + self.removed.len() + self.activated.len()
    }
}

fn transitions(previous: &BridgeData, current: &BridgeData) -> Vec<Transition> {
    let mut out = Vec::new();

    for id in BridgeId::ALL {
        let prev = previous.bridge(id);
        let curr = current.bridge(id);

        let pairs = [
            (Scope::Overall, prev.status, curr.status),
            (Scope::Eastbound, prev.eastbound.status, curr.eastbound.status),
            (Scope::Westbound, prev.westbound.status, curr.westbound.status),
        ];

        out.extend(
            pairs
                .into_iter()
                .filter(|(_, from, to)| from != to)
                .map(|(scope, from, to)| Transition {
                    bridge: id,
                    scope,
                    from,
                    to,
                }),
        );
    }

    out
}

/// Calculate the diff between previous and current snapshots.
pub fn diff(previous: &BridgeData, current: &BridgeData) -> StatusDiff {
    let prev_map: HashMap<(BridgeId, String), &Closure> = previous
        .closures()
        .map(|c| ((c.bridge, c.key()), c))
        .collect();
    let curr_map: HashMap<(BridgeId, String), &Closure> = current
        .closures()
        .map(|c| ((c.bridge, c.key()), c))
        .collect();

    // Iterate in snapshot order so output is stable
    let added = current
        .closures()
        .filter(|c| !prev_map.contains_key(&(c.bridge, c.key())))
        .cloned()
        .collect();

    let removed = previous
        .closures()
        .filter(|c| !curr_map.contains_key(&(c.bridge, c.key())))
        .cloned()
        .collect();

    let activated = current
        .closures()
        .filter(|c| c.is_active())
        .filter(|c| {
            prev_map
                .get(&(c.bridge, c.key()))
                .is_some_and(|prev| !prev.is_active())
        })
        .cloned()
        .collect();

    StatusDiff {
        transitions: transitions(previous, current),
        added,
        removed,
        activated,
    }
}
