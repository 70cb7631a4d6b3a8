//! # bomber_explosion - Bombs, Blasts and Fire
//!
//! ## Features
//!
//! - **Blast propagation**: origin plus four cardinal rays, truncated by obstacles
//! - **Fire tiles**: staged lifetime, early collision shutdown, one hit per actor
//! - **Terrain**: shared destructible tile map and per-kind drop chances
//! - **Bombs**: grid placement, fuse and captured power
//! - **Flamethrower**: staggered spray pattern with obstacle checks
//!
//! ## Example
//!
//! ```ignore
//! use bomber_explosion::prelude::*;
//!
//! let bomb = Bomb::place(bomb_id, player, player_position, pouch.power, now, &BombConfig::default());
//! // ... two seconds later
//! let pattern = bomb.detonate(&PhysicsObstacles::new(&physics, LayerMask::obstacles()));
//! for tile in &pattern.tiles {
//!     let lifetime = explosion_config.lifetime(tile.step);
//!     // spawn a fire tile at tile.position() living `lifetime` seconds
//! }
//! ```

pub mod bomb;
pub mod explosion;
pub mod fire;
pub mod flamethrower;
pub mod terrain;

pub use bomb::*;
pub use explosion::*;
pub use fire::*;
pub use flamethrower::*;
pub use terrain::*;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::bomb::{Bomb, BombConfig};
    pub use crate::explosion::{
        explode, BlastPattern, BlastTile, ExplosionConfig, ObstacleProbe, PhysicsObstacles,
    };
    pub use crate::fire::{FirePhase, FireSource, FireTile};
    pub use crate::flamethrower::{flame_pattern, is_spawn_blocked, FlameConfig, FlameSpawn};
    pub use crate::terrain::{DropPolicy, SharedTerrain, TerrainKind, TerrainProvider, TileMap};
}
