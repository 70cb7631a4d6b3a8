//! Runtime errors

use bomber_core::CombatError;
use bomber_physics::PhysicsError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors from loading the game configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Errors from building or driving the game world
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("Physics error: {0}")]
    Physics(#[from] PhysicsError),

    #[error("Combat error: {0}")]
    Combat(#[from] CombatError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Unknown tile '{ch}' at line {line}, column {column}")]
    UnknownTile { ch: char, line: usize, column: usize },

    #[error("Level has {0} player spawns, expected exactly one")]
    PlayerSpawns(usize),

    #[error("Player already spawned")]
    PlayerExists,
}

/// Result type for runtime operations
pub type RuntimeResult<T> = Result<T, RuntimeError>;
