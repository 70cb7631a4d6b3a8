//! Enemy AI for the bomber combat core
//!
//! - **Perception**: radius check plus an obstacle-aware swept-circle line of sight
//! - **Enemy brain**: perceive, then move, then attack; optional minion summoning

pub mod enemy;
pub mod perception;

pub use enemy::*;
pub use perception::*;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::enemy::{EnemyBrain, EnemyConfig, EnemyDecision, MinionConfig};
    pub use crate::perception::{can_see, perceive, PerceptionResult, Perceiver, SightConfig};
}
