//! # bomber_math - Plane Math and Grid Helpers
//!
//! The game plays on a unit grid: every bomb, fire tile and terrain block
//! sits on an integer [`Cell`], while actors and projectiles move freely in
//! world space with [`Vec2`].

pub mod grid;
pub mod vector;

pub use grid::*;
pub use vector::*;

/// Common math constants
pub mod consts {
    pub const EPSILON: f32 = 1e-6;
}
