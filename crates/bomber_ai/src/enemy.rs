//! Enemy decision making
//!
//! Each tick an enemy perceives the player, decides how to move and then
//! resolves its attack, strictly in that order. The brain only decides;
//! the world applies velocities, damage and spawns.

use crate::perception::{PerceptionResult, Perceiver, SightConfig};
use bomber_combat::{DamageInfo, DamageType, HealthComponent};
use bomber_core::{CombatError, EntityId, Result};
use bomber_math::Vec2;
use bomber_physics::PhysicsQuery;
use serde::{Deserialize, Serialize};

/// Enemy statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyConfig {
    /// Maximum health
    pub max_health: f32,
    /// Movement speed
    pub speed: f32,
    /// Distance at which melee attacks land
    pub attack_range: f32,
    /// Seconds between attacks
    pub attack_cooldown: f32,
    /// Damage per attack
    pub attack_damage: f32,
    /// Stun after a survived hit
    pub stun_duration: f32,
    /// Line-of-sight settings
    pub sight: SightConfig,
    /// Minion spawning, if this enemy summons
    pub minions: Option<MinionConfig>,
}

impl Default for EnemyConfig {
    fn default() -> Self {
        Self {
            max_health: 100.0,
            speed: 5.0,
            attack_range: 1.0,
            attack_cooldown: 1.0,
            attack_damage: 1.0,
            stun_duration: 0.5,
            sight: SightConfig::default(),
            minions: None,
        }
    }
}

impl EnemyConfig {
    /// Enable minion spawning
    pub fn with_minions(mut self, minions: MinionConfig) -> Self {
        self.minions = Some(minions);
        self
    }

    /// Set the sight settings
    pub fn with_sight(mut self, sight: SightConfig) -> Self {
        self.sight = sight;
        self
    }
}

/// Minion spawning settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MinionConfig {
    /// Seconds between spawns while the player is visible
    pub interval: f32,
    /// Upper bound on living minions
    pub max_alive: usize,
    /// Minion max health relative to the parent's max health
    pub health_scale: f32,
}

impl Default for MinionConfig {
    fn default() -> Self {
        Self {
            interval: 3.0,
            max_alive: 2,
            health_scale: 0.5,
        }
    }
}

/// What an enemy wants to do this tick
#[derive(Debug, Clone, PartialEq)]
pub struct EnemyDecision {
    /// Desired velocity
    pub velocity: Vec2,
    /// Melee hit on the target, if the attack resolved
    pub attack: Option<DamageInfo>,
    /// Whether a minion should be spawned next to the enemy
    pub spawn_minion: bool,
    /// Perception used for the decision
    pub perception: Option<PerceptionResult>,
}

impl EnemyDecision {
    /// Stand still, do nothing
    pub fn idle() -> Self {
        Self {
            velocity: Vec2::ZERO,
            attack: None,
            spawn_minion: false,
            perception: None,
        }
    }

    /// Whether the enemy is moving
    pub fn is_moving(&self) -> bool {
        self.velocity != Vec2::ZERO
    }
}

/// AI state of one enemy
#[derive(Debug, Clone)]
pub struct EnemyBrain {
    /// Enemy entity
    pub entity: EntityId,
    /// Statistics
    pub config: EnemyConfig,
    perceiver: Perceiver,
    last_attack_at: Option<f64>,
    next_minion_at: Option<f64>,
    minions: Vec<EntityId>,
}

impl EnemyBrain {
    /// Create a brain; sight configuration warnings are logged here, once
    pub fn new(entity: EntityId, config: EnemyConfig) -> Self {
        let perceiver = Perceiver::new(entity, config.sight.clone());
        Self {
            entity,
            config,
            perceiver,
            last_attack_at: None,
            next_minion_at: None,
            minions: Vec::new(),
        }
    }

    /// Decide this tick's movement and attack.
    ///
    /// `target` is the player's id and position; `None` means the player is
    /// gone and yields `MissingReference`.
    pub fn think<Q: PhysicsQuery + ?Sized>(
        &mut self,
        query: &Q,
        position: Vec2,
        health: &HealthComponent,
        target: Option<(EntityId, Vec2)>,
        now: f64,
    ) -> Result<EnemyDecision> {
        if !health.can_act(now) {
            return Ok(EnemyDecision::idle());
        }
        let (target, target_position) = target.ok_or(CombatError::MissingReference {
            what: "player",
            entity: None,
        })?;

        // 1. perceive
        let perception = self.perceiver.evaluate(query, position, target, target_position);
        let mut decision = EnemyDecision {
            perception: Some(perception),
            ..EnemyDecision::idle()
        };
        if !perception.visible {
            return Ok(decision);
        }

        // 2. move
        if perception.distance > self.config.attack_range {
            decision.velocity = (target_position - position).normalize() * self.config.speed;
        }

        // 3. attack
        if perception.distance <= self.config.attack_range && self.attack_ready(now) {
            self.last_attack_at = Some(now);
            decision.attack = Some(
                DamageInfo::new(self.config.attack_damage, DamageType::Melee)
                    .with_source(self.entity)
                    .with_hit_point(target_position),
            );
        }

        decision.spawn_minion = self.minion_due(now);
        Ok(decision)
    }

    /// Whether the attack cooldown has elapsed at `now`
    pub fn attack_ready(&self, now: f64) -> bool {
        self.last_attack_at
            .map(|t| now - t >= f64::from(self.config.attack_cooldown))
            .unwrap_or(true)
    }

    fn minion_due(&mut self, now: f64) -> bool {
        let Some(minions) = &self.config.minions else {
            return false;
        };
        let interval = f64::from(minions.interval);
        let next = *self.next_minion_at.get_or_insert(now + interval);
        if now < next || self.minions.len() >= minions.max_alive {
            return false;
        }
        self.next_minion_at = Some(now + interval);
        true
    }

    /// Max health of a minion spawned by this enemy
    pub fn minion_health(&self) -> f32 {
        let scale = self
            .config
            .minions
            .as_ref()
            .map(|m| m.health_scale)
            .unwrap_or(1.0);
        self.config.max_health * scale
    }

    /// Track a spawned minion
    pub fn register_minion(&mut self, minion: EntityId) {
        self.minions.push(minion);
    }

    /// Forget a minion that died. Returns whether it was ours.
    pub fn minion_removed(&mut self, minion: EntityId) -> bool {
        let before = self.minions.len();
        self.minions.retain(|m| *m != minion);
        self.minions.len() != before
    }

    /// Living minions
    pub fn minions(&self) -> &[EntityId] {
        &self.minions
    }

    /// Last perception result
    pub fn last_perception(&self) -> Option<PerceptionResult> {
        self.perceiver.last()
    }
}
