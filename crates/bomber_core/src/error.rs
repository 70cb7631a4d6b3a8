//! Error taxonomy for per-tick combat operations
//!
//! None of these errors are fatal. The tick loop logs them and skips the
//! failing actor's action for the current tick.

use crate::id::EntityId;
use thiserror::Error;

/// Errors raised by combat operations
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CombatError {
    /// A required collaborator (target actor, owner, terrain) was not found
    #[error("Missing reference: {what} ({entity:?})")]
    MissingReference {
        /// What was being looked up
        what: &'static str,
        /// The entity that was looked up, if any
        entity: Option<EntityId>,
    },

    /// No bomb charges or ammo left, or the weapon is cooling down
    #[error("Out of resource: {0}")]
    OutOfResource(&'static str),

    /// A setting is missing or unusable (e.g. an empty layer mask)
    #[error("Configuration warning: {0}")]
    Configuration(String),
}

impl CombatError {
    /// Shorthand for a missing entity reference
    pub fn missing(what: &'static str, entity: EntityId) -> Self {
        Self::MissingReference {
            what,
            entity: Some(entity),
        }
    }

    /// Whether the error should be ignored without logging above trace level
    pub fn is_silent(&self) -> bool {
        matches!(self, Self::OutOfResource(_))
    }
}

/// Result type for combat operations
pub type Result<T> = std::result::Result<T, CombatError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = CombatError::missing("target", EntityId::from_raw(7));
        assert_eq!(err.to_string(), "Missing reference: target (Some(EntityId(7)))");

        let err = CombatError::OutOfResource("bomb charges");
        assert_eq!(err.to_string(), "Out of resource: bomb charges");
        assert!(err.is_silent());
    }
}
