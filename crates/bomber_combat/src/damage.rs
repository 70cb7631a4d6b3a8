//! Damage types and information

use bomber_core::EntityId;
use bomber_math::Vec2;
use serde::{Deserialize, Serialize};

/// Types of damage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DamageType {
    /// Handgun projectile
    Bullet,
    /// Flamethrower fire
    Fire,
    /// Bomb blast fire
    Explosion,
    /// Enemy melee attack
    Melee,
}

impl Default for DamageType {
    fn default() -> Self {
        Self::Explosion
    }
}

/// Information about a damage instance
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DamageInfo {
    /// Damage amount
    pub amount: f32,
    /// Type of damage
    pub damage_type: DamageType,
    /// Entity that caused the damage (if any)
    pub source_entity: Option<EntityId>,
    /// World position where damage was applied
    pub hit_point: Option<Vec2>,
}

impl DamageInfo {
    /// Create new damage info
    pub fn new(amount: f32, damage_type: DamageType) -> Self {
        Self {
            amount,
            damage_type,
            source_entity: None,
            hit_point: None,
        }
    }

    /// Set the source entity
    pub fn with_source(mut self, entity: EntityId) -> Self {
        self.source_entity = Some(entity);
        self
    }

    /// Set the hit point
    pub fn with_hit_point(mut self, point: Vec2) -> Self {
        self.hit_point = Some(point);
        self
    }

    /// Damage amount, never negative
    pub fn final_amount(&self) -> f32 {
        self.amount.max(0.0)
    }
}

impl Default for DamageInfo {
    fn default() -> Self {
        Self::new(0.0, DamageType::Explosion)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_negative_damage_is_zero() {
        let damage = DamageInfo::new(-5.0, DamageType::Bullet);
        assert_eq!(damage.final_amount(), 0.0);
    }

    #[test]
    fn test_builder() {
        let source = EntityId::from_raw(3);
        let damage = DamageInfo::new(10.0, DamageType::Melee)
            .with_source(source)
            .with_hit_point(Vec2::new(1.0, 2.0));
        assert_eq!(damage.source_entity, Some(source));
        assert_eq!(damage.hit_point, Some(Vec2::new(1.0, 2.0)));
    }
}
