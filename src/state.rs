use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

use crate::types::Position;

/// Why a snapshot was rejected. All of these resolve to an Idle move with a
/// diagnostic; none of them abort the session.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SnapshotError {
    #[error("grid dimensions {rows}x{cols} are not positive")]
    BadDimensions { rows: i32, cols: i32 },

    #[error("agent position {pos:?} is outside the grid")]
    AgentOutOfBounds { pos: Position },

    #[error("agent carries {carried} with capacity {capacity}")]
    AgentOverCapacity { carried: i32, capacity: i32 },

    #[error("item at {pos:?} is outside the grid")]
    ItemOutOfBounds { pos: Position },

    #[error("item at {pos:?} has negative value {value}")]
    NegativeItemValue { pos: Position, value: i32 },

    #[error("hazard at {pos:?} is outside the grid")]
    HazardOutOfBounds { pos: Position },

    #[error("teleporter endpoint {pos:?} is outside the grid")]
    TeleporterOutOfBounds { pos: Position },

    #[error("teleporter links {pos:?} to itself")]
    DegenerateTeleporter { pos: Position },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Agent {
    pub position: Position,
    /// Weight of everything currently carried.
    pub carried: i32,
    pub capacity: i32,
    /// Remaining round time, in ticks. A target whose path cost exceeds this
    /// cannot be collected before the round ends.
    pub ticks_left: i32,
}

impl Agent {
    pub fn remaining_capacity(&self) -> i32 {
        self.capacity - self.carried
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Item {
    pub position: Position,
    pub value: i32,
    #[serde(default)]
    pub weight: i32,
}

/// A red button / trap cell. Paths passing within `radius` (Chebyshev) of it
/// are penalized by the scorer.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Hazard {
    pub position: Position,
    pub radius: i32,
}

/// A shortcut edge between two non-adjacent cells. Stepping off the entry
/// costs one move, same as a lattice step.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Teleporter {
    pub entry: Position,
    pub exit: Position,
    #[serde(default = "default_true")]
    pub bidirectional: bool,
}

fn default_true() -> bool {
    true
}

/// One complete tick of game state. The engine only ever reads this; the
/// game server owns every lifecycle within it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub rows: i32,
    pub cols: i32,
    pub agent: Agent,
    pub items: Vec<Item>,
    #[serde(default)]
    pub hazards: Vec<Hazard>,
    #[serde(default)]
    pub teleporters: Vec<Teleporter>,
    /// Permanently impassable cells, if the level has any.
    #[serde(default)]
    pub blocked: HashSet<Position>,
}

impl Snapshot {
    pub fn in_bounds(&self, pos: &Position) -> bool {
        pos.row >= 0 && pos.row < self.rows && pos.col >= 0 && pos.col < self.cols
    }

    /// Longest possible shortest path on the lattice, used to normalize
    /// distances so weights stay comparable across grid sizes.
    pub fn diameter(&self) -> i32 {
        (self.rows + self.cols - 2).max(1)
    }

    /// Checks the snapshot is internally consistent before any scoring runs.
    /// Teleporter endpoints are checked here, at load, so the spatial model
    /// never has to report malformed links at query time.
    pub fn validate(&self) -> Result<(), SnapshotError> {
        if self.rows <= 0 || self.cols <= 0 {
            return Err(SnapshotError::BadDimensions {
                rows: self.rows,
                cols: self.cols,
            });
        }
        if !self.in_bounds(&self.agent.position) {
            return Err(SnapshotError::AgentOutOfBounds {
                pos: self.agent.position,
            });
        }
        if self.agent.carried > self.agent.capacity {
            return Err(SnapshotError::AgentOverCapacity {
                carried: self.agent.carried,
                capacity: self.agent.capacity,
            });
        }
        for item in &self.items {
            if !self.in_bounds(&item.position) {
                return Err(SnapshotError::ItemOutOfBounds {
                    pos: item.position,
                });
            }
            if item.value < 0 {
                return Err(SnapshotError::NegativeItemValue {
                    pos: item.position,
                    value: item.value,
                });
            }
        }
        for hazard in &self.hazards {
            if !self.in_bounds(&hazard.position) {
                return Err(SnapshotError::HazardOutOfBounds {
                    pos: hazard.position,
                });
            }
        }
        for link in &self.teleporters {
            for endpoint in [link.entry, link.exit] {
                if !self.in_bounds(&endpoint) {
                    return Err(SnapshotError::TeleporterOutOfBounds { pos: endpoint });
                }
            }
            if link.entry == link.exit {
                return Err(SnapshotError::DegenerateTeleporter { pos: link.entry });
            }
        }
        Ok(())
    }

    /// Highest item value on the board, for score normalization.
    pub fn max_item_value(&self) -> i32 {
        self.items.iter().map(|i| i.value).max().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_snapshot() -> Snapshot {
        Snapshot {
            rows: 10,
            cols: 10,
            agent: Agent {
                position: Position::new(0, 0),
                carried: 0,
                capacity: 10,
                ticks_left: 100,
            },
            items: vec![],
            hazards: vec![],
            teleporters: vec![],
            blocked: HashSet::new(),
        }
    }

    #[test]
    fn test_valid_snapshot_passes() {
        let mut snap = base_snapshot();
        snap.items.push(Item {
            position: Position::new(3, 4),
            value: 2,
            weight: 1,
        });
        assert_eq!(snap.validate(), Ok(()));
    }

    #[test]
    fn test_agent_out_of_bounds_rejected() {
        let mut snap = base_snapshot();
        snap.agent.position = Position::new(10, 0);
        assert_eq!(
            snap.validate(),
            Err(SnapshotError::AgentOutOfBounds {
                pos: Position::new(10, 0)
            })
        );
    }

    #[test]
    fn test_teleporter_endpoint_checked_at_load() {
        let mut snap = base_snapshot();
        snap.teleporters.push(Teleporter {
            entry: Position::new(1, 1),
            exit: Position::new(1, 42),
            bidirectional: true,
        });
        assert_eq!(
            snap.validate(),
            Err(SnapshotError::TeleporterOutOfBounds {
                pos: Position::new(1, 42)
            })
        );
    }

    #[test]
    fn test_over_capacity_agent_rejected() {
        let mut snap = base_snapshot();
        snap.agent.carried = 11;
        assert!(snap.validate().is_err());
    }

    #[test]
    fn test_snapshot_roundtrips_through_json() {
        let mut snap = base_snapshot();
        snap.items.push(Item {
            position: Position::new(2, 2),
            value: 5,
            weight: 2,
        });
        let encoded = serde_json::to_string(&snap).unwrap();
        let decoded: Snapshot = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded.items.len(), 1);
        assert_eq!(decoded.agent.position, snap.agent.position);
    }
}
