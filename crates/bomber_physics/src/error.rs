//! Error types for the physics layer

use bomber_core::EntityId;
use thiserror::Error;

/// Physics errors
#[derive(Debug, Error)]
pub enum PhysicsError {
    /// Entity has no collider in the world
    #[error("Collider not found for entity {0:?}")]
    ColliderNotFound(EntityId),

    /// Entity already owns a collider
    #[error("Entity {0:?} already has a collider")]
    DuplicateEntity(EntityId),

    /// Invalid configuration
    #[error("Invalid physics configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for physics operations
pub type Result<T> = std::result::Result<T, PhysicsError>;
