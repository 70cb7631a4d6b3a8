//! # bomber_physics - Collision Queries for the Combat Core
//!
//! Collision layers, the [`PhysicsQuery`] contract used by perception and
//! explosions, and a Rapier 2D backed [`PhysicsWorld`] implementing it.
//!
//! ## Features
//!
//! - **Layers**: named collision layers, layer masks and collider tags
//! - **Shape casts**: swept circles returning every hit ordered by distance
//! - **Overlaps**: point and box overlap tests
//! - **Contact events**: sensor enter/exit diffing feeding a per-tick queue
//!
//! ## Example
//!
//! ```ignore
//! use bomber_physics::prelude::*;
//!
//! let mut world = PhysicsWorld::new(PhysicsConfig::default())?;
//! world.insert(wall, ColliderDesc::new(ColliderTag::Unbreakable, ColliderShape::tile(0.5), Vec2::new(2.0, 0.0)))?;
//!
//! let options = ShapeCastOptions::default()
//!     .with_max_distance(5.0)
//!     .with_filter(LayerMask::obstacles());
//! let hits = world.shape_cast(Vec2::ZERO, Vec2::X, &options);
//! ```

pub mod config;
pub mod error;
pub mod events;
pub mod layers;
pub mod query;
pub mod world;

pub use config::*;
pub use error::*;
pub use events::*;
pub use layers::*;
pub use query::*;
pub use world::*;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::config::PhysicsConfig;
    pub use crate::error::{PhysicsError, Result as PhysicsResult};
    pub use crate::events::{ContactEvent, ContactEventType, ContactTracker, EventQueue};
    pub use crate::layers::{ColliderTag, CollisionLayer, LayerMask};
    pub use crate::query::{OverlapHit, PhysicsQuery, ShapeCastHit, ShapeCastOptions};
    pub use crate::world::{ColliderDesc, ColliderShape, PhysicsWorld};
}
