//! Physics configuration

use crate::error::{PhysicsError, Result};
use serde::{Deserialize, Serialize};

/// Physics tick and query configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Fixed timestep for position integration
    pub timestep: f32,

    /// Maximum number of substeps per frame
    pub max_substeps: u32,

    /// Upper bound on hits gathered by a single shape cast
    pub max_cast_hits: usize,

    /// Half extent of an actor's box collider
    pub actor_half_extent: f32,

    /// Half extent of a terrain tile collider
    pub tile_half_extent: f32,

    /// Half extent of a fire tile sensor; kept below half a cell so fire
    /// never reaches into the neighbouring cells
    pub fire_half_extent: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            timestep: 1.0 / 50.0,
            max_substeps: 4,
            max_cast_hits: 32,
            actor_half_extent: 0.35,
            tile_half_extent: 0.5,
            fire_half_extent: 0.4,
        }
    }
}

impl PhysicsConfig {
    /// Set timestep
    pub fn with_timestep(mut self, timestep: f32) -> Self {
        self.timestep = timestep;
        self
    }

    /// Set the substep cap
    pub fn with_max_substeps(mut self, max_substeps: u32) -> Self {
        self.max_substeps = max_substeps;
        self
    }

    /// Check the values are usable
    pub fn validate(&self) -> Result<()> {
        if self.timestep <= 0.0 {
            return Err(PhysicsError::InvalidConfig(format!(
                "timestep must be positive, got {}",
                self.timestep
            )));
        }
        if self.max_substeps == 0 {
            return Err(PhysicsError::InvalidConfig("max_substeps must be at least 1".into()));
        }
        if self.max_cast_hits == 0 {
            return Err(PhysicsError::InvalidConfig("max_cast_hits must be at least 1".into()));
        }
        Ok(())
    }
}
