pub mod config;
pub mod engine;
pub mod grid;
pub mod policy;
pub mod scorer;
pub mod session;
pub mod state;
pub mod types;

// Re-export commonly used types for convenience
pub use config::{ConfigError, EngineConfig, Weights};
pub use engine::{Decision, Engine};
pub use grid::DistanceField;
pub use scorer::{ScoredCandidate, Target, TargetKind};
pub use state::{Agent, Hazard, Item, Snapshot, SnapshotError, Teleporter};
pub use types::{Move, Position};
