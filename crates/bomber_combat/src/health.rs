//! Health component and the hit state machine
//!
//! ```text
//!            hit, health > 0                now > until
//!   Alive ─────────────────────▶ Stunned ─────────────▶ Alive
//!     │  └────────────────────▶ Invulnerable ─────────▶ Alive
//!     │ hit, health <= 0
//!     ▼
//!   Dead (terminal)
//! ```
//!
//! Time is the absolute game clock in seconds; every timed state carries
//! its own `until` instead of a countdown.

use crate::damage::{DamageInfo, DamageType};
use bomber_core::EntityId;
use serde::{Deserialize, Serialize};

/// Events emitted by the health system
#[derive(Debug, Clone, PartialEq)]
pub enum HealthEvent {
    /// Damage was taken
    DamageTaken {
        entity: EntityId,
        damage: DamageInfo,
        new_health: f32,
    },
    /// Entity was healed
    Healed {
        entity: EntityId,
        amount: f32,
        new_health: f32,
    },
    /// Entity died
    Death {
        entity: EntityId,
        killer: Option<EntityId>,
        damage_type: DamageType,
    },
    /// Entity came back with full health
    Revived { entity: EntityId, new_health: f32 },
    /// Stun started
    StunStarted { entity: EntityId, until: f64 },
    /// Stun ended
    StunEnded { entity: EntityId },
    /// Invulnerability started
    InvulnerabilityStarted { entity: EntityId, until: f64 },
    /// Invulnerability ended
    InvulnerabilityEnded { entity: EntityId },
}

/// Current state of an actor's life
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum LifeState {
    /// Normal state
    Alive,
    /// Movement and attacks suppressed until the given time
    Stunned { until: f64 },
    /// Hits ignored until the given time
    Invulnerable { until: f64 },
    /// Terminal
    Dead,
}

impl Default for LifeState {
    fn default() -> Self {
        Self::Alive
    }
}

/// What happens to an actor that survives a hit
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum HitReaction {
    /// Stay alive, nothing else
    None,
    /// Enemies: stunned for `duration` seconds
    Stun { duration: f32 },
    /// Player: invulnerable for `duration` seconds
    Invulnerable { duration: f32 },
}

impl Default for HitReaction {
    fn default() -> Self {
        Self::None
    }
}

/// Health component for actors
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthComponent {
    /// Owning actor
    pub entity: EntityId,
    current: f32,
    max: f32,
    /// Reaction to a survived hit
    pub reaction: HitReaction,
    state: LifeState,
}

impl HealthComponent {
    /// Create a new health component at full health
    pub fn new(entity: EntityId, max_health: f32) -> Self {
        let max = max_health.max(0.0);
        Self {
            entity,
            current: max,
            max,
            reaction: HitReaction::None,
            state: if max > 0.0 { LifeState::Alive } else { LifeState::Dead },
        }
    }

    /// Set the hit reaction
    pub fn with_reaction(mut self, reaction: HitReaction) -> Self {
        self.reaction = reaction;
        self
    }

    /// Current health
    pub fn current(&self) -> f32 {
        self.current
    }

    /// Maximum health
    pub fn max(&self) -> f32 {
        self.max
    }

    /// Stored state; timed states may already be past their end
    pub fn state(&self) -> LifeState {
        self.state
    }

    /// State as seen at `now`, with expired timed states reported as `Alive`
    pub fn state_at(&self, now: f64) -> LifeState {
        match self.state {
            LifeState::Stunned { until } | LifeState::Invulnerable { until } if now > until => {
                LifeState::Alive
            }
            state => state,
        }
    }

    /// Apply a hit. Returns the resulting events; an empty list means the hit
    /// was ignored.
    pub fn apply_damage(&mut self, damage: &DamageInfo, now: f64) -> Vec<HealthEvent> {
        match self.state_at(now) {
            LifeState::Dead | LifeState::Invulnerable { .. } => return Vec::new(),
            LifeState::Alive | LifeState::Stunned { .. } => {}
        }

        let mut events = Vec::with_capacity(2);
        self.current = (self.current - damage.final_amount()).max(0.0);
        events.push(HealthEvent::DamageTaken {
            entity: self.entity,
            damage: *damage,
            new_health: self.current,
        });

        if self.current <= 0.0 {
            self.state = LifeState::Dead;
            log::debug!("{} died ({:?})", self.entity, damage.damage_type);
            events.push(HealthEvent::Death {
                entity: self.entity,
                killer: damage.source_entity,
                damage_type: damage.damage_type,
            });
            return events;
        }

        match self.reaction {
            HitReaction::None => self.state = LifeState::Alive,
            HitReaction::Stun { duration } => {
                let until = now + f64::from(duration);
                self.state = LifeState::Stunned { until };
                events.push(HealthEvent::StunStarted {
                    entity: self.entity,
                    until,
                });
            }
            HitReaction::Invulnerable { duration } => {
                let until = now + f64::from(duration);
                self.state = LifeState::Invulnerable { until };
                events.push(HealthEvent::InvulnerabilityStarted {
                    entity: self.entity,
                    until,
                });
            }
        }
        events
    }

    /// Heal the entity, clamped to the maximum. `None` when nothing was
    /// restored.
    pub fn heal(&mut self, amount: f32) -> Option<HealthEvent> {
        if self.is_dead() || amount <= 0.0 {
            return None;
        }

        let old_health = self.current;
        self.current = (self.current + amount).min(self.max);
        let healed = self.current - old_health;
        if healed <= 0.0 {
            return None;
        }
        Some(HealthEvent::Healed {
            entity: self.entity,
            amount: healed,
            new_health: self.current,
        })
    }

    /// Set health directly (clamped to 0..max). Never revives or kills.
    pub fn set_health(&mut self, health: f32) {
        if self.is_dead() {
            return;
        }
        self.current = health.clamp(0.0, self.max);
    }

    /// Change the maximum, keeping the current health within bounds
    pub fn set_max(&mut self, max: f32) {
        self.max = max.max(0.0);
        self.current = self.current.min(self.max);
    }

    /// End timed states that are over (call once per tick)
    pub fn update(&mut self, now: f64) -> Vec<HealthEvent> {
        let mut events = Vec::new();
        match self.state {
            LifeState::Stunned { until } if now > until => {
                self.state = LifeState::Alive;
                events.push(HealthEvent::StunEnded { entity: self.entity });
            }
            LifeState::Invulnerable { until } if now > until => {
                self.state = LifeState::Alive;
                events.push(HealthEvent::InvulnerabilityEnded { entity: self.entity });
            }
            _ => {}
        }
        events
    }

    /// Bring the actor back with full health. Used by the respawn flow only.
    pub fn revive(&mut self, now: f64, invulnerable_for: f32) -> Vec<HealthEvent> {
        self.current = self.max;
        let mut events = vec![HealthEvent::Revived {
            entity: self.entity,
            new_health: self.current,
        }];
        if invulnerable_for > 0.0 {
            let until = now + f64::from(invulnerable_for);
            self.state = LifeState::Invulnerable { until };
            events.push(HealthEvent::InvulnerabilityStarted {
                entity: self.entity,
                until,
            });
        } else {
            self.state = LifeState::Alive;
        }
        events
    }

    /// Get health as a percentage (0.0 - 1.0)
    pub fn health_percent(&self) -> f32 {
        if self.max <= 0.0 {
            return 0.0;
        }
        self.current / self.max
    }

    /// Check if dead
    pub fn is_dead(&self) -> bool {
        self.state == LifeState::Dead
    }

    /// Check if alive
    pub fn is_alive(&self) -> bool {
        !self.is_dead()
    }

    /// Whether movement and attacks are suppressed at `now`
    pub fn is_stunned(&self, now: f64) -> bool {
        matches!(self.state_at(now), LifeState::Stunned { .. })
    }

    /// Whether hits are ignored at `now`
    pub fn is_invulnerable(&self, now: f64) -> bool {
        matches!(self.state_at(now), LifeState::Invulnerable { .. })
    }

    /// Whether the actor may move and attack at `now`
    pub fn can_act(&self, now: f64) -> bool {
        matches!(
            self.state_at(now),
            LifeState::Alive | LifeState::Invulnerable { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deaths(events: &[HealthEvent]) -> usize {
        events
            .iter()
            .filter(|e| matches!(e, HealthEvent::Death { .. }))
            .count()
    }

    fn enemy(max: f32) -> HealthComponent {
        HealthComponent::new(EntityId::from_raw(1), max)
            .with_reaction(HitReaction::Stun { duration: 0.5 })
    }

    #[test]
    fn test_two_hits_kill_and_third_is_ignored() {
        let mut health = HealthComponent::new(EntityId::from_raw(1), 20.0);
        let hit = DamageInfo::new(10.0, DamageType::Bullet);

        let mut events = health.apply_damage(&hit, 0.0);
        assert_eq!(health.current(), 10.0);
        events.extend(health.apply_damage(&hit, 0.1));
        assert_eq!(health.current(), 0.0);
        assert!(health.is_dead());

        let third = health.apply_damage(&hit, 0.2);
        assert!(third.is_empty());
        assert_eq!(health.current(), 0.0);
        assert_eq!(deaths(&events), 1);
    }

    #[test]
    fn test_stun_then_recover() {
        let mut health = enemy(100.0);
        let events = health.apply_damage(&DamageInfo::new(30.0, DamageType::Fire), 1.0);
        assert!(matches!(events[1], HealthEvent::StunStarted { until, .. } if until == 1.5));
        assert!(health.is_stunned(1.5));
        assert!(!health.can_act(1.25));

        assert!(health.update(1.5).is_empty());
        let events = health.update(1.75);
        assert_eq!(events, vec![HealthEvent::StunEnded { entity: EntityId::from_raw(1) }]);
        assert_eq!(health.state(), LifeState::Alive);
    }

    #[test]
    fn test_hit_while_stunned_refreshes_stun() {
        let mut health = enemy(100.0);
        health.apply_damage(&DamageInfo::new(10.0, DamageType::Bullet), 0.0);
        health.apply_damage(&DamageInfo::new(10.0, DamageType::Bullet), 0.25);
        assert_eq!(health.current(), 80.0);
        assert_eq!(health.state(), LifeState::Stunned { until: 0.75 });
    }

    #[test]
    fn test_invulnerable_ignores_hits_until_window_ends() {
        let mut health = HealthComponent::new(EntityId::from_raw(2), 3.0)
            .with_reaction(HitReaction::Invulnerable { duration: 1.0 });
        let hit = DamageInfo::new(1.0, DamageType::Melee);

        health.apply_damage(&hit, 0.0);
        assert_eq!(health.current(), 2.0);

        // now <= until: no health change at all
        assert!(health.apply_damage(&hit, 0.5).is_empty());
        assert!(health.apply_damage(&hit, 1.0).is_empty());
        assert_eq!(health.current(), 2.0);

        health.apply_damage(&hit, 1.25);
        assert_eq!(health.current(), 1.0);
    }

    #[test]
    fn test_health_bounds() {
        let mut health = enemy(50.0);
        health.apply_damage(&DamageInfo::new(500.0, DamageType::Explosion), 0.0);
        assert_eq!(health.current(), 0.0);
        assert_eq!(health.heal(10.0), None);
        assert_eq!(health.current(), 0.0);

        let mut health = enemy(100.0);
        health.set_health(40.0);
        assert_eq!(
            health.heal(30.0),
            Some(HealthEvent::Healed {
                entity: EntityId::from_raw(1),
                amount: 30.0,
                new_health: 70.0,
            })
        );
        assert!(matches!(
            health.heal(50.0),
            Some(HealthEvent::Healed { amount, .. }) if amount == 30.0
        ));
        assert_eq!(health.current(), 100.0);
        assert_eq!(health.heal(5.0), None);
        assert_eq!(health.heal(-5.0), None);
    }

    #[test]
    fn test_revive_grants_invulnerability() {
        let mut health = HealthComponent::new(EntityId::from_raw(3), 1.0);
        health.apply_damage(&DamageInfo::new(1.0, DamageType::Fire), 0.0);
        assert!(health.is_dead());

        let events = health.revive(2.0, 2.0);
        assert_eq!(events.len(), 2);
        assert_eq!(health.current(), 1.0);
        assert!(health.is_invulnerable(4.0));
        assert!(health.can_act(3.0));
        assert!(!health.is_invulnerable(4.5));
    }

    #[test]
    fn test_set_max_clamps_current() {
        let mut health = enemy(100.0);
        health.set_max(50.0);
        assert_eq!(health.current(), 50.0);
        assert_eq!(health.health_percent(), 1.0);
    }
}
