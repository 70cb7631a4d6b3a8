//! Game Configuration
//!
//! Every tunable of the combat core in one serde tree. Missing sections and
//! fields fall back to their defaults, so a config file only lists what it
//! changes.
//!
//! # Configuration Sources (in priority order)
//!
//! 1. Environment variables: `BOMBER_SEED`, `BOMBER_LIVES`,
//!    `BOMBER_PLAYER_SPEED`, `BOMBER_BOMB_FUSE`, `BOMBER_SIGHT_RADIUS`
//! 2. Config file named by `BOMBER_CONFIG`
//! 3. `bomber.toml`, then `config/bomber.toml`
//! 4. Built-in defaults
//!
//! # Example Config File
//!
//! ```toml
//! seed = 7
//!
//! [player]
//! lives = 5
//! speed = 6.0
//!
//! [bomb]
//! fuse = 2.5
//!
//! [drops]
//! crate_chance = 0.5
//! ```

use crate::error::ConfigError;
use crate::player::{PlayerConfig, WeaponsConfig};
use bomber_ai::{EnemyConfig, MinionConfig};
use bomber_combat::ProjectileConfig;
use bomber_explosion::{BombConfig, DropPolicy, ExplosionConfig, FlameConfig};
use bomber_inventory::{DropTable, PickupConfig};
use bomber_physics::PhysicsConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Visual feedback timings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedbackConfig {
    /// Length of the damage flash
    pub flash: f32,
    /// Seconds a dead enemy stays before removal (death animation)
    pub enemy_death_delay: f32,
    /// Lifetime of the effect left by a destroyed terrain tile
    pub break_effect: f32,
}

impl Default for FeedbackConfig {
    fn default() -> Self {
        Self {
            flash: 0.1,
            enemy_death_delay: 1.0,
            break_effect: 1.0,
        }
    }
}

/// Complete game configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Seed of the drop rolls
    pub seed: u64,
    /// Physics tick and collider sizes
    pub physics: PhysicsConfig,
    /// Player statistics
    pub player: PlayerConfig,
    /// Flamethrower and handgun
    pub weapons: WeaponsConfig,
    /// Regular enemies
    pub enemy: EnemyConfig,
    /// Minion spawning of summoner enemies
    pub summoner: MinionConfig,
    /// Blast timing and damage
    pub explosion: ExplosionConfig,
    /// Bomb fuse
    pub bomb: BombConfig,
    /// Flamethrower pattern
    pub flame: FlameConfig,
    /// Handgun bullets
    pub projectile: ProjectileConfig,
    /// Pickup values
    pub pickups: PickupConfig,
    /// Drop chance per terrain kind
    pub drops: DropPolicy,
    /// Which pickup a drop is
    pub drop_table: DropTable,
    /// Visual feedback timings
    pub feedback: FeedbackConfig,
}

impl GameConfig {
    /// Load the configuration from the usual sources, falling back to the
    /// defaults when no file is found or the file is unusable
    pub fn load() -> Self {
        let mut candidates = Vec::new();
        if let Ok(path) = std::env::var("BOMBER_CONFIG") {
            candidates.push(path);
        }
        candidates.push("bomber.toml".to_string());
        candidates.push("config/bomber.toml".to_string());

        let mut config = Self::default();
        for path in &candidates {
            if !Path::new(path).exists() {
                continue;
            }
            match Self::load_from_file(path) {
                Ok(loaded) => {
                    log::info!("Loaded game config from {}", path);
                    config = loaded;
                    break;
                }
                Err(e) => {
                    log::warn!("Ignoring config {}: {}", path, e);
                }
            }
        }

        config.apply_env_overrides(|key| std::env::var(key).ok());
        config
    }

    /// Load and validate a TOML file
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate TOML text
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `BOMBER_*` overrides read through `lookup`
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(seed) = lookup("BOMBER_SEED").and_then(|v| v.parse().ok()) {
            self.seed = seed;
            log::info!("Seed from env: {}", seed);
        }
        if let Some(lives) = lookup("BOMBER_LIVES").and_then(|v| v.parse().ok()) {
            self.player.lives = lives;
        }
        if let Some(speed) = lookup("BOMBER_PLAYER_SPEED").and_then(|v| v.parse().ok()) {
            self.player.speed = speed;
        }
        if let Some(fuse) = lookup("BOMBER_BOMB_FUSE").and_then(|v| v.parse().ok()) {
            self.bomb.fuse = fuse;
        }
        if let Some(radius) = lookup("BOMBER_SIGHT_RADIUS").and_then(|v| v.parse().ok()) {
            self.enemy.sight.radius = radius;
        }
    }

    /// Reject values the world cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.physics
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        if self.player.max_health <= 0.0 {
            return Err(ConfigError::Invalid("player.max_health must be positive".into()));
        }
        if self.bomb.fuse < 0.0 {
            return Err(ConfigError::Invalid("bomb.fuse must not be negative".into()));
        }
        if let Some((field, chance)) = self.drops.non_finite() {
            return Err(ConfigError::Invalid(format!(
                "drops.{} must be a finite number, got {}",
                field, chance
            )));
        }
        Ok(())
    }

    /// Non-fatal problems, logged once when the world is built. Sight
    /// problems are reported by each enemy's perception instead.
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        if self.drop_table.entries.iter().all(|e| e.weight == 0) {
            warnings.push("drop table is empty, destroyed tiles never drop pickups".into());
        }
        if self.summoner.max_alive == 0 {
            warnings.push("summoner.max_alive is 0, summoners never spawn minions".into());
        }
        warnings
    }

    /// Print a configuration summary
    pub fn print_summary(&self) {
        log::info!("=== Game Configuration ===");
        log::info!("  Seed: {}", self.seed);
        log::info!(
            "  Player: {} lives, speed {}, {} bombs, power {}",
            self.player.lives,
            self.player.speed,
            self.player.bombs,
            self.player.power
        );
        log::info!(
            "  Enemy: health {}, sight {}, range {}",
            self.enemy.max_health,
            self.enemy.sight.radius,
            self.enemy.attack_range
        );
        log::info!("  Bomb fuse: {}s", self.bomb.fuse);
        log::info!("==========================");
    }
}
