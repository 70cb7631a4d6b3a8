//! Handgun projectiles

use crate::damage::{DamageInfo, DamageType};
use bomber_core::EntityId;
use bomber_math::Vec2;
use serde::{Deserialize, Serialize};

/// Projectile configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectileConfig {
    /// Travel speed in units per second
    pub speed: f32,
    /// Seconds during which the shooter cannot be hit
    pub owner_grace: f32,
    /// Seconds before an unobstructed projectile disappears
    pub lifetime: f32,
    /// Collider radius
    pub radius: f32,
    /// How long the impact effect stays
    pub impact_effect_duration: f32,
}

impl Default for ProjectileConfig {
    fn default() -> Self {
        Self {
            speed: 15.0,
            owner_grace: 0.1,
            lifetime: 3.0,
            radius: 0.1,
            impact_effect_duration: 0.5,
        }
    }
}

/// A bullet in flight
#[derive(Debug, Clone)]
pub struct Projectile {
    /// Projectile entity
    pub entity: EntityId,
    /// Shooter
    pub owner: EntityId,
    /// Current position
    pub position: Vec2,
    /// Velocity
    pub velocity: Vec2,
    /// Damage dealt on hit
    pub damage: f32,
    spawned_at: f64,
    owner_grace: f32,
    expires_at: f64,
}

impl Projectile {
    /// Spawn a projectile moving along `direction`
    pub fn new(
        entity: EntityId,
        owner: EntityId,
        origin: Vec2,
        direction: Vec2,
        damage: f32,
        config: &ProjectileConfig,
        now: f64,
    ) -> Self {
        Self {
            entity,
            owner,
            position: origin,
            velocity: direction.normalize() * config.speed,
            damage,
            spawned_at: now,
            owner_grace: config.owner_grace,
            expires_at: now + f64::from(config.lifetime),
        }
    }

    /// Move by one step
    pub fn advance(&mut self, dt: f32) {
        self.position += self.velocity * dt;
    }

    /// Whether the lifetime is over
    pub fn is_expired(&self, now: f64) -> bool {
        now >= self.expires_at
    }

    /// Whether a contact with `other` should be ignored at `now`
    pub fn ignores(&self, other: EntityId, now: f64) -> bool {
        other == self.entity
            || (other == self.owner && now < self.spawned_at + f64::from(self.owner_grace))
    }

    /// Damage dealt to whatever it hits
    pub fn damage_info(&self) -> DamageInfo {
        DamageInfo::new(self.damage, DamageType::Bullet)
            .with_source(self.owner)
            .with_hit_point(self.position)
    }
}
