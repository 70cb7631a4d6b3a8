//! Collision layers, masks and collider tags

use serde::{Deserialize, Serialize};
use std::ops::{BitOr, BitOrAssign};

/// A collision layer identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CollisionLayer(pub u32);

impl CollisionLayer {
    /// Default layer
    pub const DEFAULT: Self = Self(0);
    /// Player layer
    pub const PLAYER: Self = Self(1);
    /// Enemies and minions
    pub const ENEMIES: Self = Self(2);
    /// Bullets
    pub const PROJECTILES: Self = Self(3);
    /// Fire tiles (sensors)
    pub const FIRE: Self = Self(4);
    /// Terrain that blocks sight, blasts and flames
    pub const GROUND: Self = Self(5);
    /// Pickups (sensors)
    pub const PICKUPS: Self = Self(6);
    /// Placed bombs
    pub const BOMBS: Self = Self(7);

    /// Get the layer as a bitmask
    pub fn as_mask(&self) -> u32 {
        1 << self.0
    }
}

impl Default for CollisionLayer {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// A set of collision layers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LayerMask(pub u32);

impl LayerMask {
    /// Matches nothing
    pub const NONE: Self = Self(0);
    /// Matches every layer
    pub const ALL: Self = Self(u32::MAX);

    /// Build a mask from layers
    pub fn from_layers(layers: &[CollisionLayer]) -> Self {
        Self(layers.iter().fold(0u32, |acc, l| acc | l.as_mask()))
    }

    /// Mask of a single layer
    pub fn of(layer: CollisionLayer) -> Self {
        Self(layer.as_mask())
    }

    /// Whether `layer` is part of this mask
    pub fn contains(&self, layer: CollisionLayer) -> bool {
        self.0 & layer.as_mask() != 0
    }

    /// Whether the mask matches no layer at all
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Add a layer
    pub fn with(mut self, layer: CollisionLayer) -> Self {
        self.0 |= layer.as_mask();
        self
    }

    /// Remove a layer
    pub fn without(mut self, layer: CollisionLayer) -> Self {
        self.0 &= !layer.as_mask();
        self
    }

    /// Raw bits
    pub fn bits(&self) -> u32 {
        self.0
    }

    /// Terrain obstacles
    pub fn obstacles() -> Self {
        Self::of(CollisionLayer::GROUND)
    }

    /// Everything that can take damage
    pub fn actors() -> Self {
        Self::from_layers(&[CollisionLayer::PLAYER, CollisionLayer::ENEMIES])
    }
}

impl Default for LayerMask {
    fn default() -> Self {
        Self::ALL
    }
}

impl BitOr for LayerMask {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for LayerMask {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

/// What kind of game object a collider belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColliderTag {
    /// The player
    Player,
    /// A regular enemy
    Enemy,
    /// A minion spawned by an enemy
    Minion,
    /// Indestructible wall
    Unbreakable,
    /// Destructible block
    Breakable,
    /// Placed bomb
    Bomb,
    /// Fire tile
    Fire,
    /// Handgun projectile
    Bullet,
    /// Collectible pickup
    Pickup,
}

impl ColliderTag {
    /// Layer a collider with this tag lives on
    pub fn default_layer(&self) -> CollisionLayer {
        match self {
            Self::Player => CollisionLayer::PLAYER,
            Self::Enemy | Self::Minion => CollisionLayer::ENEMIES,
            Self::Unbreakable | Self::Breakable => CollisionLayer::GROUND,
            Self::Bomb => CollisionLayer::BOMBS,
            Self::Fire => CollisionLayer::FIRE,
            Self::Bullet => CollisionLayer::PROJECTILES,
            Self::Pickup => CollisionLayer::PICKUPS,
        }
    }

    /// Whether colliders with this tag are sensors (no collision response)
    pub fn is_sensor(&self) -> bool {
        matches!(self, Self::Fire | Self::Pickup | Self::Bullet)
    }

    /// Whether this is an actor that has health
    pub fn is_actor(&self) -> bool {
        matches!(self, Self::Player | Self::Enemy | Self::Minion)
    }

    /// Whether this is terrain
    pub fn is_terrain(&self) -> bool {
        matches!(self, Self::Unbreakable | Self::Breakable)
    }
}
