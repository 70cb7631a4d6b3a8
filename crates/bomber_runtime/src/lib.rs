//! Bomber Runtime - Game World and Headless Runner
//!
//! # Features
//!
//! - `GameWorld`: owns every actor, bomb, fire tile, bullet and pickup and
//!   advances them in a fixed per-tick order
//! - Spawning, presentation and input behind traits, with headless and
//!   recording implementations
//! - Layered TOML configuration with `BOMBER_*` environment overrides
//! - Text level layouts
//!
//! # Example
//!
//! ```ignore
//! use bomber_runtime::prelude::*;
//!
//! let level = Level::parse(DEMO_LEVEL)?;
//! let mut world = GameWorld::from_level(
//!     GameConfig::load(),
//!     &level,
//!     HeadlessSpawner::new(),
//!     LogPresentation,
//! )?;
//!
//! world.update(1.0 / 60.0, &InputFrame::attack_pressed());
//! println!("{}", world.hud().summary());
//! ```

pub mod config;
pub mod context;
pub mod error;
pub mod hud;
pub mod level;
pub mod player;
pub mod world;

pub mod prelude {
    pub use crate::config::{FeedbackConfig, GameConfig};
    pub use crate::context::{
        HeadlessSpawner, InputFrame, InputProvider, LogPresentation, PresentationCall,
        PresentationSink, RecordingPresentation, SpawnProvider, Tint,
    };
    pub use crate::error::{ConfigError, RuntimeError, RuntimeResult};
    pub use crate::hud::{GameStatus, HudSnapshot};
    pub use crate::level::{EnemySpawn, Level, DEMO_LEVEL};
    pub use crate::player::{Player, PlayerConfig, WeaponsConfig};
    pub use crate::world::{Enemy, GameWorld};
}

pub use prelude::*;
