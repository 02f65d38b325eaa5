use std::collections::{HashMap, VecDeque};
use std::time::Instant;

use crate::state::Snapshot;
use crate::types::Position;

// How many expansions happen between deadline checks inside the flood.
const DEADLINE_CHECK_INTERVAL: usize = 1024;

/// Shortest-path costs from the agent to every reachable cell, computed once
/// per tick and queried by the scorer for every candidate.
///
/// The board is treated as a graph: the grid lattice contributes unit edges
/// between orthogonal neighbors, and each teleporter link contributes a unit
/// edge between its endpoints (both directions when bidirectional). All edges
/// are uniform cost, so a single BFS flood from the agent answers every
/// distance query for the tick.
pub struct DistanceField {
    source: Position,
    cost: HashMap<Position, i32>,
    came_from: HashMap<Position, Position>,
}

impl DistanceField {
    /// Floods from the agent's position. The snapshot must already have
    /// passed validation, so every teleporter endpoint is in bounds.
    ///
    /// The flood is bounded by `deadline`: every few expansions the clock is
    /// checked, and on overrun the remaining cells are left unreachable so a
    /// degenerate grid degrades the tick instead of missing it.
    #[tracing::instrument(level = "trace", skip(snapshot, deadline), fields(row = snapshot.agent.position.row, col = snapshot.agent.position.col))]
    pub fn build(snapshot: &Snapshot, deadline: Instant) -> Self {
        let source = snapshot.agent.position;

        // Teleporter jumps, keyed by the cell they depart from.
        let mut jumps: HashMap<Position, Vec<Position>> = HashMap::new();
        for link in &snapshot.teleporters {
            jumps.entry(link.entry).or_default().push(link.exit);
            if link.bidirectional {
                jumps.entry(link.exit).or_default().push(link.entry);
            }
        }

        let mut cost = HashMap::new();
        let mut came_from = HashMap::new();
        let mut queue = VecDeque::new();

        cost.insert(source, 0);
        queue.push_back(source);

        let mut expansions = 0usize;
        while let Some(current) = queue.pop_front() {
            expansions += 1;
            if expansions % DEADLINE_CHECK_INTERVAL == 0 && Instant::now() >= deadline {
                tracing::warn!(expansions, reached = cost.len(), "Deadline hit mid-flood, truncating");
                break;
            }

            let current_cost = cost[&current];

            let lattice = current.neighbors();
            let teleport = jumps.get(&current).map(Vec::as_slice).unwrap_or(&[]);

            for &next in lattice.iter().chain(teleport) {
                if !snapshot.in_bounds(&next) || snapshot.blocked.contains(&next) {
                    continue;
                }
                if cost.contains_key(&next) {
                    continue;
                }
                cost.insert(next, current_cost + 1);
                came_from.insert(next, current);
                queue.push_back(next);
            }
        }

        tracing::trace!(reached = cost.len(), "Distance field built");
        Self {
            source,
            cost,
            came_from,
        }
    }

    /// Path cost to `target`, or None when no route exists.
    pub fn cost(&self, target: &Position) -> Option<i32> {
        self.cost.get(target).copied()
    }

    /// Full shortest path from the agent to `target`, agent cell included.
    pub fn path_to(&self, target: &Position) -> Option<Vec<Position>> {
        self.cost.get(target)?;
        let mut path = vec![*target];
        let mut current = *target;
        while let Some(&prev) = self.came_from.get(&current) {
            path.push(prev);
            current = prev;
        }
        path.reverse();
        Some(path)
    }

    /// The cell the shortest path visits right after the agent's own.
    /// None when the target is the agent's cell or unreachable.
    pub fn first_step(&self, target: &Position) -> Option<Position> {
        let path = self.path_to(target)?;
        path.get(1).copied()
    }

    pub fn source(&self) -> Position {
        self.source
    }
}
