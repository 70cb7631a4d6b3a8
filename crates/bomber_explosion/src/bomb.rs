//! Placed bombs

use crate::explosion::{explode, BlastPattern, ObstacleProbe};
use bomber_core::EntityId;
use bomber_math::{Cell, Vec2};
use serde::{Deserialize, Serialize};

/// Bomb configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BombConfig {
    /// Seconds between placement and explosion
    pub fuse: f32,
}

impl Default for BombConfig {
    fn default() -> Self {
        Self { fuse: 2.0 }
    }
}

/// A ticking bomb
#[derive(Debug, Clone, PartialEq)]
pub struct Bomb {
    /// Bomb entity
    pub entity: EntityId,
    /// Player that placed it; gets the charge back on explosion
    pub owner: EntityId,
    /// Grid cell the bomb sits on
    pub cell: Cell,
    /// Explosion power captured at placement
    pub power: u32,
    /// Explosion time
    pub explodes_at: f64,
}

impl Bomb {
    /// Place a bomb on the cell nearest to `owner_position`
    pub fn place(
        entity: EntityId,
        owner: EntityId,
        owner_position: Vec2,
        power: u32,
        now: f64,
        config: &BombConfig,
    ) -> Self {
        Self {
            entity,
            owner,
            cell: Cell::from_world(owner_position),
            power,
            explodes_at: now + f64::from(config.fuse),
        }
    }

    /// World position of the bomb
    pub fn position(&self) -> Vec2 {
        self.cell.center()
    }

    /// Whether the fuse has burnt down at `now`
    pub fn is_due(&self, now: f64) -> bool {
        now >= self.explodes_at
    }

    /// Blast pattern of this bomb
    pub fn detonate<P: ObstacleProbe + ?Sized>(&self, obstacles: &P) -> BlastPattern {
        log::debug!("Bomb {} explodes at {} with power {}", self.entity, self.cell, self.power);
        explode(self.cell, self.power, obstacles)
    }
}
