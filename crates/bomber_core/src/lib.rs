//! # bomber_core - Combat Core Primitives
//!
//! Foundational types shared by every crate of the combat core:
//! - **Ids**: copyable entity identifiers and a monotonic generator
//! - **Errors**: the per-tick error taxonomy (missing reference, out of
//!   resource, configuration)
//! - **Clock**: the game clock advanced once per frame tick
//! - **Timers**: a cancellable timer queue replacing engine coroutines
//!
//! ## Example
//!
//! ```ignore
//! use bomber_core::prelude::*;
//!
//! let ids = IdGenerator::new();
//! let enemy = ids.next();
//!
//! let mut timers = TimerQueue::new();
//! timers.schedule(enemy, 0.1, "flash-end");
//!
//! // A new hit stops every pending feedback timer of the actor
//! timers.cancel_owner(enemy);
//! ```

pub mod clock;
pub mod error;
pub mod id;
pub mod timer;

pub use clock::*;
pub use error::*;
pub use id::*;
pub use timer::*;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::clock::GameClock;
    pub use crate::error::{CombatError, Result};
    pub use crate::id::{EntityId, IdGenerator};
    pub use crate::timer::{ExpiredTimer, TimerId, TimerQueue};
}
