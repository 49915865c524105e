//! # Furrow Gameplay
//!
//! Gameplay systems for Furrow.
//!
//! This crate drives the tile world from player input:
//! - The actor with four-way facing and collision-aware movement
//! - Item drops with bobbing animation and proximity pickup
//! - Tool interaction (facing or pointer targeting, cooldown, side-effect drops)
//! - The per-tick simulation and its render snapshots

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod actor;
pub mod drops;
pub mod interaction;
pub mod simulation;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::actor::*;
    pub use crate::drops::*;
    pub use crate::interaction::*;
    pub use crate::simulation::*;
}

pub use prelude::*;
