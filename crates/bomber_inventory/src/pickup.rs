//! Pickups dropped by destroyed terrain

use bomber_combat::WeaponKind;
use bomber_core::EntityId;
use bomber_math::Vec2;
use serde::{Deserialize, Serialize};

/// Kind of pickup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PickupKind {
    /// Faster movement
    ExtraSpeed,
    /// One more life
    ExtraLife,
    /// One more bomb charge
    ExtraBomb,
    /// Larger blasts
    ExtraPower,
    /// Flamethrower and its ammo
    FlameThrowerAmmo,
    /// Handgun and its ammo
    HandgunAmmo,
}

impl PickupKind {
    /// All pickup kinds
    pub const ALL: [PickupKind; 6] = [
        Self::ExtraSpeed,
        Self::ExtraLife,
        Self::ExtraBomb,
        Self::ExtraPower,
        Self::FlameThrowerAmmo,
        Self::HandgunAmmo,
    ];

    /// Name used for prefabs and sounds
    pub fn name(&self) -> &'static str {
        match self {
            Self::ExtraSpeed => "ExtraSpeed",
            Self::ExtraLife => "ExtraLife",
            Self::ExtraBomb => "ExtraBomb",
            Self::ExtraPower => "ExtraPower",
            Self::FlameThrowerAmmo => "FlameThrowerAmmo",
            Self::HandgunAmmo => "HandgunAmmo",
        }
    }
}

/// What collecting a pickup does to the player
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PickupEffect {
    /// Add to move speed
    Speed(f32),
    /// Add lives
    Lives(u32),
    /// Add a bomb charge
    BombCharge,
    /// Add explosion power
    Power,
    /// Grant a weapon; ammo comes from the weapon's stats
    Weapon(WeaponKind),
}

/// Tunable pickup values
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PickupConfig {
    /// Seconds after spawning during which fire cannot destroy a pickup
    pub immunity: f32,
    /// Speed added by `ExtraSpeed`
    pub speed_bonus: f32,
}

impl Default for PickupConfig {
    fn default() -> Self {
        Self {
            immunity: 1.0,
            speed_bonus: 0.5,
        }
    }
}

/// A pickup lying in the world
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PickupComponent {
    /// Pickup entity
    pub entity: EntityId,
    /// Kind
    pub kind: PickupKind,
    /// Position
    pub position: Vec2,
    /// Spawn time
    pub spawned_at: f64,
    /// Fire immunity window after spawning
    pub immunity: f32,
    collected: bool,
}

impl PickupComponent {
    /// Create a pickup spawned at `now`
    pub fn new(entity: EntityId, kind: PickupKind, position: Vec2, now: f64) -> Self {
        Self {
            entity,
            kind,
            position,
            spawned_at: now,
            immunity: PickupConfig::default().immunity,
            collected: false,
        }
    }

    /// Set the fire immunity window
    pub fn with_immunity(mut self, seconds: f32) -> Self {
        self.immunity = seconds;
        self
    }

    /// Whether fire cannot destroy it at `now`
    pub fn is_immune(&self, now: f64) -> bool {
        now < self.spawned_at + f64::from(self.immunity)
    }

    /// Whether fire touching it at `now` destroys it
    pub fn burns(&self, now: f64) -> bool {
        !self.collected && !self.is_immune(now)
    }

    /// Collect the pickup. Returns its effect the first time only.
    pub fn collect(&mut self, config: &PickupConfig) -> Option<PickupEffect> {
        if self.collected {
            return None;
        }
        self.collected = true;
        log::debug!("Picked up {} ({})", self.kind.name(), self.entity);
        Some(match self.kind {
            PickupKind::ExtraSpeed => PickupEffect::Speed(config.speed_bonus),
            PickupKind::ExtraLife => PickupEffect::Lives(1),
            PickupKind::ExtraBomb => PickupEffect::BombCharge,
            PickupKind::ExtraPower => PickupEffect::Power,
            PickupKind::FlameThrowerAmmo => PickupEffect::Weapon(WeaponKind::FlameThrower),
            PickupKind::HandgunAmmo => PickupEffect::Weapon(WeaponKind::Handgun),
        })
    }

    /// Whether it was already collected
    pub fn is_collected(&self) -> bool {
        self.collected
    }
}
