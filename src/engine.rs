use std::time::Instant;
use tracing::{debug, warn};

use crate::config::{ConfigError, EngineConfig};
use crate::grid::DistanceField;
use crate::policy;
use crate::scorer::{self, Target};
use crate::state::Snapshot;
use crate::types::{Move, Position};

/// The outcome of one tick: the move to send, what it was steering toward,
/// and whether the tick had to degrade to make the budget.
#[derive(Debug, Clone, PartialEq)]
pub struct Decision {
    pub action: Move,
    pub target: Option<Target>,
    pub degraded: bool,
}

impl Decision {
    fn fallback(degraded: bool) -> Self {
        Self {
            action: policy::fallback_move(),
            target: None,
            degraded,
        }
    }
}

/// The per-tick decision loop. Owns the validated configuration and the one
/// piece of state that crosses ticks: the previously chosen target, used as
/// a sticky bonus so two near-equal candidates cannot make the agent
/// oscillate.
pub struct Engine {
    config: EngineConfig,
    previous_target: Option<Position>,
}

impl Engine {
    /// Validates the configuration up front; this is the only place the
    /// crate can fail hard, and it happens before the first tick.
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            previous_target: None,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Runs one tick: validate, flood, score, select, derive. Always returns
    /// a move; every internal failure resolves to the Idle fallback with a
    /// diagnostic rather than surfacing to the session.
    #[tracing::instrument(level = "debug", skip(self, snapshot))]
    pub fn decide(&mut self, snapshot: &Snapshot) -> Decision {
        let started = Instant::now();
        let deadline = started + self.config.tick_budget;

        if let Err(error) = snapshot.validate() {
            warn!(%error, "Rejecting snapshot, emitting Idle");
            return Decision::fallback(false);
        }

        let field = DistanceField::build(snapshot, deadline);
        if Instant::now() >= deadline {
            warn!(elapsed_ms = started.elapsed().as_millis() as u64, "Degraded tick: budget spent on distance field");
            self.previous_target = None;
            return Decision::fallback(true);
        }

        let candidates =
            scorer::score_candidates(snapshot, &field, &self.config, self.previous_target);
        if Instant::now() >= deadline {
            warn!(
                elapsed_ms = started.elapsed().as_millis() as u64,
                candidates = candidates.len(),
                "Degraded tick: budget spent on scoring"
            );
            self.previous_target = None;
            return Decision::fallback(true);
        }

        let Some(chosen) = policy::select(&candidates) else {
            debug!("No viable candidate, emitting fallback");
            self.previous_target = None;
            return Decision::fallback(false);
        };

        let action = policy::derive_move(&field, chosen.target.position);
        debug!(
            target = ?chosen.target.position,
            score = chosen.score,
            cost = chosen.cost,
            ?action,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Tick decided"
        );
        self.previous_target = Some(chosen.target.position);
        Decision {
            action,
            target: Some(chosen.target),
            degraded: false,
        }
    }
}
