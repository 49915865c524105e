//! # Furrow Common
//!
//! Common types, utilities, and shared abstractions for Furrow.
//!
//! This crate provides foundational types used across all Furrow subsystems:
//! - Coordinate types (world pixels, tile cells)
//! - ID types (EntityId, DropId)
//! - Crop and item kinds
//! - The injectable simulation clock
//! - Common error types
//! - Prelude for convenient imports

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod clock;
pub mod coords;
pub mod error;
pub mod ids;
pub mod items;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::clock::*;
    pub use crate::coords::*;
    pub use crate::error::*;
    pub use crate::ids::*;
    pub use crate::items::*;
}

pub use prelude::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tile_coord_conversion() {
        let world = Vec2::new(100.0, 200.0);
        let tile = TileCoord::from_world(world, 32.0);
        assert_eq!(tile, TileCoord::new(3, 6));
        assert_eq!(tile.to_world(32.0), Vec2::new(96.0, 192.0));
    }

    #[test]
    fn test_entity_id_generation() {
        let id1 = EntityId::new();
        let id2 = EntityId::new();
        assert_ne!(id1, id2);
        assert!(id1.is_valid());
        assert!(!EntityId::NULL.is_valid());
    }

    #[test]
    fn test_drop_ids_increase() {
        let first = DropId::FIRST;
        assert!(first.next() > first);
        assert_eq!(first.next().to_string(), "drop#2");
    }

    #[test]
    fn test_item_names() {
        assert_eq!(ItemKind::Crop(CropType::Wheat).display_name(), "Wheat");
        assert_eq!(ItemKind::Seed(CropType::Carrot).display_name(), "Carrot Seeds");
        assert_eq!(ItemKind::Wood.display_name(), "Wood");
    }
}
