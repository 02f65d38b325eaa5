use std::env;
use std::time::Duration;
use thiserror::Error;

/// The only fatal error in the crate. Raised while building the engine,
/// never mid-tick.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("weight '{name}' must be non-negative, got {value}")]
    NegativeWeight { name: &'static str, value: f64 },

    #[error("tick budget must be positive")]
    ZeroTickBudget,

    #[error("cluster radius must be non-negative, got {0}")]
    NegativeClusterRadius(i32),

    #[error("candidate cap must be positive, got {0}")]
    ZeroCandidateCap(usize),

    #[error("could not parse {key}={value}")]
    BadEnvValue { key: String, value: String },
}

/// Tunable scoring coefficients. Immutable once the engine is built; every
/// candidate in a tick is scored with the same set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Weights {
    pub value: f64,
    pub distance: f64,
    pub risk: f64,
    pub density: f64,
    /// Bonus for re-selecting the previous tick's target, to stop the agent
    /// oscillating between two near-equal candidates. Zero disables it.
    pub stickiness: f64,
}

impl Default for Weights {
    fn default() -> Self {
        Self {
            value: 1.0,
            distance: 1.0,
            risk: 2.5,
            density: 2.0,
            stickiness: 0.05,
        }
    }
}

impl Weights {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("value", self.value),
            ("distance", self.distance),
            ("risk", self.risk),
            ("density", self.density),
            ("stickiness", self.stickiness),
        ] {
            if value < 0.0 || !value.is_finite() {
                return Err(ConfigError::NegativeWeight { name, value });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
    pub weights: Weights,
    /// Wall-clock budget for one decision.
    pub tick_budget: Duration,
    /// Chebyshev radius of the cluster bonus window.
    pub cluster_radius: i32,
    /// When more candidates than this survive the viability filters, only
    /// the nearest ones get fully scored so the tick stays inside budget.
    pub candidate_cap: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            weights: Weights::default(),
            tick_budget: Duration::from_millis(100),
            cluster_radius: 3,
            candidate_cap: 256,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.weights.validate()?;
        if self.tick_budget.is_zero() {
            return Err(ConfigError::ZeroTickBudget);
        }
        if self.cluster_radius < 0 {
            return Err(ConfigError::NegativeClusterRadius(self.cluster_radius));
        }
        if self.candidate_cap == 0 {
            return Err(ConfigError::ZeroCandidateCap(self.candidate_cap));
        }
        Ok(())
    }

    /// Reads overrides from GEMBOT_* environment variables, falling back to
    /// defaults for anything unset. `dotenv` has already been loaded by main.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(v) = get_env_f64("GEMBOT_VALUE_WEIGHT")? {
            config.weights.value = v;
        }
        if let Some(v) = get_env_f64("GEMBOT_DISTANCE_WEIGHT")? {
            config.weights.distance = v;
        }
        if let Some(v) = get_env_f64("GEMBOT_RISK_WEIGHT")? {
            config.weights.risk = v;
        }
        if let Some(v) = get_env_f64("GEMBOT_DENSITY_WEIGHT")? {
            config.weights.density = v;
        }
        if let Some(v) = get_env_f64("GEMBOT_STICKINESS_WEIGHT")? {
            config.weights.stickiness = v;
        }
        if let Some(v) = get_env_i64("GEMBOT_TICK_BUDGET_MS")? {
            config.tick_budget = Duration::from_millis(v.max(0) as u64);
        }
        if let Some(v) = get_env_i32("GEMBOT_CLUSTER_RADIUS")? {
            config.cluster_radius = v;
        }
        if let Some(v) = get_env_i64("GEMBOT_CANDIDATE_CAP")? {
            config.candidate_cap = v.max(0) as usize;
        }
        config.validate()?;
        Ok(config)
    }
}

fn get_env_f64(key: &str) -> Result<Option<f64>, ConfigError> {
    match env::var(key) {
        Ok(raw) => raw
            .parse::<f64>()
            .map(Some)
            .map_err(|_| ConfigError::BadEnvValue {
                key: key.to_string(),
                value: raw,
            }),
        Err(_) => Ok(None),
    }
}

fn get_env_i32(key: &str) -> Result<Option<i32>, ConfigError> {
    match env::var(key) {
        Ok(raw) => raw
            .parse::<i32>()
            .map(Some)
            .map_err(|_| ConfigError::BadEnvValue {
                key: key.to_string(),
                value: raw,
            }),
        Err(_) => Ok(None),
    }
}

fn get_env_i64(key: &str) -> Result<Option<i64>, ConfigError> {
    match env::var(key) {
        Ok(raw) => raw
            .parse::<i64>()
            .map(Some)
            .map_err(|_| ConfigError::BadEnvValue {
                key: key.to_string(),
                value: raw,
            }),
        Err(_) => Ok(None),
    }
}
