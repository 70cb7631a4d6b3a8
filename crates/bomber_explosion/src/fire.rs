//! Fire tile lifecycle
//!
//! A fire tile lives from `spawned_at` to `expires_at`. Its collider is
//! switched off `collision_lead` seconds before removal so nothing is hit by
//! a tile that is already fading out. Every actor is damaged at most once
//! per tile.

use bomber_combat::{DamageInfo, DamageType};
use bomber_core::EntityId;
use bomber_math::Vec2;
use std::collections::HashSet;

/// Who produced a fire tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FireSource {
    /// Bomb blast; hurts everyone including the bomber
    Bomb { owner: EntityId },
    /// Flamethrower; spares its owner
    FlameThrower { owner: EntityId },
}

impl FireSource {
    /// Entity that started the fire
    pub fn owner(&self) -> EntityId {
        match self {
            Self::Bomb { owner } | Self::FlameThrower { owner } => *owner,
        }
    }

    /// Damage type dealt by this fire
    pub fn damage_type(&self) -> DamageType {
        match self {
            Self::Bomb { .. } => DamageType::Explosion,
            Self::FlameThrower { .. } => DamageType::Fire,
        }
    }
}

/// Lifecycle phase of a fire tile
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FirePhase {
    /// Collider enabled
    Burning,
    /// Collider disabled, waiting for removal
    Fading,
    /// Due for removal
    Expired,
}

/// A fire tile in the world
#[derive(Debug, Clone)]
pub struct FireTile {
    /// Fire entity
    pub entity: EntityId,
    /// Centre of the tile
    pub position: Vec2,
    /// Origin of the fire
    pub source: FireSource,
    /// Damage per touched actor
    pub damage: f32,
    /// Spawn time
    pub spawned_at: f64,
    /// Removal time
    pub expires_at: f64,
    collision_off_at: f64,
    touched: HashSet<EntityId>,
}

impl FireTile {
    /// Create a fire tile living `lifetime` seconds from `now`
    pub fn new(
        entity: EntityId,
        position: Vec2,
        source: FireSource,
        damage: f32,
        now: f64,
        lifetime: f32,
        collision_lead: f32,
    ) -> Self {
        let expires_at = now + f64::from(lifetime.max(0.0));
        let collision_off_at = (expires_at - f64::from(collision_lead.max(0.0))).max(now);
        Self {
            entity,
            position,
            source,
            damage,
            spawned_at: now,
            expires_at,
            collision_off_at,
            touched: HashSet::new(),
        }
    }

    /// When the collider gets disabled
    pub fn collision_off_at(&self) -> f64 {
        self.collision_off_at
    }

    /// Phase at `now`
    pub fn phase(&self, now: f64) -> FirePhase {
        if now >= self.expires_at {
            FirePhase::Expired
        } else if now >= self.collision_off_at {
            FirePhase::Fading
        } else {
            FirePhase::Burning
        }
    }

    /// Whether contacts count at `now`
    pub fn is_burning(&self, now: f64) -> bool {
        self.phase(now) == FirePhase::Burning
    }

    /// Whether `actor` is immune to this fire (flamethrower owner)
    pub fn spares(&self, actor: EntityId) -> bool {
        matches!(self.source, FireSource::FlameThrower { owner } if owner == actor)
    }

    /// Damage for a contact with `actor`, at most once per actor.
    pub fn touch(&mut self, actor: EntityId, now: f64) -> Option<DamageInfo> {
        if !self.is_burning(now) || self.spares(actor) || !self.touched.insert(actor) {
            return None;
        }
        Some(
            DamageInfo::new(self.damage, self.source.damage_type())
                .with_source(self.source.owner())
                .with_hit_point(self.position),
        )
    }

    /// Whether `actor` was already damaged by this tile
    pub fn has_touched(&self, actor: EntityId) -> bool {
        self.touched.contains(&actor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tile(source: FireSource) -> FireTile {
        FireTile::new(EntityId::from_raw(100), Vec2::ZERO, source, 50.0, 1.0, 0.75, 0.25)
    }

    #[test]
    fn test_phases() {
        let fire = tile(FireSource::Bomb { owner: EntityId::from_raw(1) });
        assert_eq!(fire.phase(1.0), FirePhase::Burning);
        assert_eq!(fire.phase(1.5), FirePhase::Fading);
        assert_eq!(fire.phase(1.75), FirePhase::Expired);
    }

    #[test]
    fn test_damage_once_per_actor() {
        let mut fire = tile(FireSource::Bomb { owner: EntityId::from_raw(1) });
        let enemy = EntityId::from_raw(2);

        let damage = fire.touch(enemy, 1.0).unwrap();
        assert_eq!(damage.damage_type, DamageType::Explosion);
        assert_eq!(damage.source_entity, Some(EntityId::from_raw(1)));
        assert!(fire.touch(enemy, 1.1).is_none());
        assert!(fire.has_touched(enemy));

        // Bomb fire hurts its own bomber
        assert!(fire.touch(EntityId::from_raw(1), 1.1).is_some());
    }

    #[test]
    fn test_flamethrower_spares_owner() {
        let owner = EntityId::from_raw(1);
        let mut fire = tile(FireSource::FlameThrower { owner });
        assert!(fire.touch(owner, 1.0).is_none());
        assert!(fire.touch(EntityId::from_raw(3), 1.0).is_some());
    }

    #[test]
    fn test_fading_fire_does_not_hurt() {
        let mut fire = tile(FireSource::Bomb { owner: EntityId::from_raw(1) });
        assert!(fire.touch(EntityId::from_raw(2), 1.5).is_none());
        assert!(!fire.has_touched(EntityId::from_raw(2)));
    }
}
