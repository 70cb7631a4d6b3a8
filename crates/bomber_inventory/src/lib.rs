//! Pickups for the bomber combat core
//!
//! # Features
//!
//! - Pickup kinds and the effect each has on the player
//! - Fire immunity right after a pickup spawns
//! - Weighted drop table for destroyed terrain
//!
//! # Example
//!
//! ```ignore
//! use bomber_inventory::prelude::*;
//!
//! if let Some(kind) = DropTable::default().pick(&mut rng) {
//!     let pickup = PickupComponent::new(id, kind, cell.center(), now);
//! }
//! ```

pub mod drop_table;
pub mod pickup;

pub mod prelude {
    pub use crate::drop_table::{DropEntry, DropTable};
    pub use crate::pickup::{PickupComponent, PickupConfig, PickupEffect, PickupKind};
}

pub use prelude::*;
