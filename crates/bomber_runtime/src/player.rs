//! Player state: lives, movement and arsenal

use bomber_combat::{Arsenal, BombPouch, HealthComponent, HitReaction, WeaponStats};
use bomber_core::EntityId;
use bomber_math::{Direction, Vec2};
use serde::{Deserialize, Serialize};

/// Player statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Maximum health; the default of 1 makes every hit cost a life
    pub max_health: f32,
    /// Movement speed
    pub speed: f32,
    /// Lives at the start of the game
    pub lives: u32,
    /// Invulnerability after a survived hit
    pub hit_invulnerability: f32,
    /// Invulnerability after respawning
    pub respawn_invulnerability: f32,
    /// Seconds between death and respawn (death animation)
    pub death_delay: f32,
    /// Bomb charges at the start
    pub bombs: u32,
    /// Explosion power at the start
    pub power: u32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            max_health: 1.0,
            speed: 5.0,
            lives: 3,
            hit_invulnerability: 1.0,
            respawn_invulnerability: 2.0,
            death_delay: 1.0,
            bombs: 3,
            power: 1,
        }
    }
}

/// Both ammo weapons
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WeaponsConfig {
    /// Flamethrower statistics
    pub flamethrower: WeaponStats,
    /// Handgun statistics
    pub handgun: WeaponStats,
}

impl Default for WeaponsConfig {
    fn default() -> Self {
        Self {
            flamethrower: WeaponStats::flamethrower(),
            handgun: WeaponStats::handgun(),
        }
    }
}

/// The player
#[derive(Debug, Clone)]
pub struct Player {
    /// Player entity
    pub entity: EntityId,
    /// Where the player respawns
    pub spawn_point: Vec2,
    /// Current position
    pub position: Vec2,
    /// Current velocity
    pub velocity: Vec2,
    /// Last movement direction; aims the weapons
    pub facing: Direction,
    /// Movement speed
    pub speed: f32,
    /// Lives left
    pub lives: u32,
    /// Health state machine
    pub health: HealthComponent,
    /// Bombs and weapons
    pub arsenal: Arsenal,
}

impl Player {
    /// Create a player standing on its spawn point
    pub fn new(
        entity: EntityId,
        spawn_point: Vec2,
        config: &PlayerConfig,
        weapons: &WeaponsConfig,
    ) -> Self {
        let health = HealthComponent::new(entity, config.max_health).with_reaction(
            HitReaction::Invulnerable {
                duration: config.hit_invulnerability,
            },
        );
        Self {
            entity,
            spawn_point,
            position: spawn_point,
            velocity: Vec2::ZERO,
            facing: Direction::Right,
            speed: config.speed,
            lives: config.lives,
            health,
            arsenal: Arsenal::new(
                BombPouch::new(config.bombs, config.power),
                weapons.flamethrower.clone(),
                weapons.handgun.clone(),
            ),
        }
    }

    /// Set the velocity from the movement input; facing follows the
    /// dominant axis and is kept while standing still
    pub fn steer(&mut self, movement: Vec2) {
        self.velocity = movement.clamp_length(1.0) * self.speed;
        if movement.x == 0.0 && movement.y == 0.0 {
            return;
        }
        self.facing = if movement.x.abs() >= movement.y.abs() {
            Direction::horizontal(movement.x)
        } else if movement.y > 0.0 {
            Direction::Up
        } else {
            Direction::Down
        };
    }

    /// Take a life. Returns the lives left.
    pub fn lose_life(&mut self) -> u32 {
        self.lives = self.lives.saturating_sub(1);
        self.lives
    }

    /// Whether the game continues after the current death
    pub fn has_lives(&self) -> bool {
        self.lives > 0
    }

    /// Put the player back on its spawn point
    pub fn reset_position(&mut self) {
        self.position = self.spawn_point;
        self.velocity = Vec2::ZERO;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player() -> Player {
        Player::new(
            EntityId::from_raw(1),
            Vec2::new(1.0, 1.0),
            &PlayerConfig::default(),
            &WeaponsConfig::default(),
        )
    }

    #[test]
    fn test_steer_sets_facing() {
        let mut p = player();
        p.steer(Vec2::new(0.0, -1.0));
        assert_eq!(p.facing, Direction::Down);
        assert_eq!(p.velocity, Vec2::new(0.0, -5.0));

        p.steer(Vec2::new(-1.0, 0.5));
        assert_eq!(p.facing, Direction::Left);

        // Standing still keeps the last facing
        p.steer(Vec2::ZERO);
        assert_eq!(p.facing, Direction::Left);
        assert_eq!(p.velocity, Vec2::ZERO);
    }

    #[test]
    fn test_lives() {
        let mut p = player();
        assert_eq!(p.lose_life(), 2);
        assert_eq!(p.lose_life(), 1);
        assert_eq!(p.lose_life(), 0);
        assert!(!p.has_lives());
        assert_eq!(p.lose_life(), 0);
    }

    #[test]
    fn test_starting_arsenal() {
        let p = player();
        assert_eq!(p.arsenal.bombs.charges, 3);
        assert_eq!(p.arsenal.bombs.power, 1);
        assert_eq!(p.health.current(), 1.0);
    }
}
