//! HUD snapshot

use bomber_combat::ActiveWeapon;
use serde::{Deserialize, Serialize};

/// Outcome of the game so far
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameStatus {
    /// Still running
    #[default]
    Playing,
    /// The player ran out of lives
    Lost,
    /// Every enemy is dead
    Won,
}

impl GameStatus {
    /// Whether the game has ended
    pub fn is_over(&self) -> bool {
        !matches!(self, Self::Playing)
    }
}

/// What the HUD shows for one frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HudSnapshot {
    pub lives: u32,
    pub health: f32,
    pub max_health: f32,
    pub bombs: u32,
    pub power: u32,
    pub active_weapon: ActiveWeapon,
    /// Ammo of the active weapon; zero with bombs selected
    pub ammo: u32,
    pub enemies_left: usize,
    pub status: GameStatus,
}

impl HudSnapshot {
    /// One-line summary for logs
    pub fn summary(&self) -> String {
        format!(
            "lives {} | health {:.0}/{:.0} | bombs {} | power {} | {:?} ({}) | enemies {} | {:?}",
            self.lives,
            self.health,
            self.max_health,
            self.bombs,
            self.power,
            self.active_weapon,
            self.ammo,
            self.enemies_left,
            self.status
        )
    }
}
