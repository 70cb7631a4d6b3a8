//! Bomber Combat - Health, Damage, and Weapons
//!
//! # Features
//!
//! - Health component with an explicit Alive / Stunned / Invulnerable / Dead
//!   state machine driven by the game clock
//! - Damage info tagged by source (bullet, fire, explosion, melee)
//! - Player arsenal: bomb pouch plus a cycled flamethrower/handgun slot
//! - Handgun projectiles with an owner grace period
//!
//! # Example
//!
//! ```ignore
//! use bomber_combat::prelude::*;
//!
//! let mut health = HealthComponent::new(enemy, 100.0)
//!     .with_reaction(HitReaction::Stun { duration: 0.5 });
//!
//! let damage = DamageInfo::new(10.0, DamageType::Bullet).with_source(player);
//! for event in health.apply_damage(&damage, clock.now()) {
//!     // forward to presentation, scoring, ...
//! }
//! ```

pub mod damage;
pub mod health;
pub mod projectile;
pub mod weapon;

pub mod prelude {
    pub use crate::damage::{DamageInfo, DamageType};
    pub use crate::health::{HealthComponent, HealthEvent, HitReaction, LifeState};
    pub use crate::projectile::{Projectile, ProjectileConfig};
    pub use crate::weapon::{
        ActiveWeapon, Arsenal, AttackAction, BombPouch, TriggerMode, TriggerState, WeaponKind,
        WeaponSlot, WeaponStats,
    };
}

pub use prelude::*;
