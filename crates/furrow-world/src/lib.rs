//! # Furrow World
//!
//! The tile world for Furrow.
//!
//! This crate handles:
//! - The fixed-size tile grid and world/tile coordinate conversion
//! - One-time procedural generation (river, stone, dirt, trees)
//! - Tile state transitions (till, plant, water, harvest, chop)
//! - Time-driven crop growth, watering expiry and soil reversion

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod generation;
pub mod grid;
pub mod growth;
pub mod tile;
pub mod transitions;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::generation::*;
    pub use crate::grid::*;
    pub use crate::growth::*;
    pub use crate::tile::*;
    pub use crate::transitions::*;
}

pub use prelude::*;
