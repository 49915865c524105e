//! Coordinate types for world positions and tile cells.

use serde::{Deserialize, Serialize};

pub use glam::Vec2;

/// Integer tile coordinate (column, row) in the world grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TileCoord {
    /// Column index
    pub col: i32,
    /// Row index
    pub row: i32,
}

impl TileCoord {
    /// Creates a new tile coordinate.
    #[must_use]
    pub const fn new(col: i32, row: i32) -> Self {
        Self { col, row }
    }

    /// Converts a world-pixel position to the tile containing it.
    ///
    /// Uses floor division, so positions left of or above the origin map to
    /// negative indices instead of collapsing onto column/row 0.
    #[must_use]
    pub fn from_world(pos: Vec2, tile_size: f32) -> Self {
        Self {
            col: (pos.x / tile_size).floor() as i32,
            row: (pos.y / tile_size).floor() as i32,
        }
    }

    /// World-pixel position of the top-left corner of this tile.
    #[must_use]
    pub fn to_world(self, tile_size: f32) -> Vec2 {
        Vec2::new(self.col as f32 * tile_size, self.row as f32 * tile_size)
    }

    /// World-pixel position of the center of this tile.
    #[must_use]
    pub fn center(self, tile_size: f32) -> Vec2 {
        self.to_world(tile_size) + Vec2::splat(tile_size * 0.5)
    }

    /// Converts to a linear row-major index, or `None` if outside `width` x `height`.
    #[must_use]
    pub fn to_index(self, width: u32, height: u32) -> Option<usize> {
        if self.col < 0 || self.row < 0 {
            return None;
        }
        let (col, row) = (self.col as u32, self.row as u32);
        if col >= width || row >= height {
            return None;
        }
        Some(row as usize * width as usize + col as usize)
    }

    /// Creates from a linear row-major index.
    #[must_use]
    pub const fn from_index(index: usize, width: u32) -> Self {
        let width = width as usize;
        Self {
            col: (index % width) as i32,
            row: (index / width) as i32,
        }
    }

    /// Returns this coordinate shifted by the given offsets.
    #[must_use]
    pub const fn offset(self, d_col: i32, d_row: i32) -> Self {
        Self {
            col: self.col + d_col,
            row: self.row + d_row,
        }
    }

    /// The eight surrounding coordinates (Moore neighbourhood).
    #[must_use]
    pub fn neighbors8(self) -> [Self; 8] {
        [
            self.offset(-1, -1),
            self.offset(0, -1),
            self.offset(1, -1),
            self.offset(-1, 0),
            self.offset(1, 0),
            self.offset(-1, 1),
            self.offset(0, 1),
            self.offset(1, 1),
        ]
    }
}

impl std::fmt::Display for TileCoord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.col, self.row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_from_world_floor_division() {
        assert_eq!(TileCoord::from_world(Vec2::new(0.0, 0.0), 32.0), TileCoord::new(0, 0));
        assert_eq!(TileCoord::from_world(Vec2::new(31.9, 32.0), 32.0), TileCoord::new(0, 1));
        assert_eq!(TileCoord::from_world(Vec2::new(-0.5, 70.0), 32.0), TileCoord::new(-1, 2));
    }

    #[test]
    fn test_index_round_trip_and_bounds() {
        let coord = TileCoord::new(3, 2);
        let index = coord.to_index(10, 5).expect("in bounds");
        assert_eq!(index, 23);
        assert_eq!(TileCoord::from_index(index, 10), coord);

        assert_eq!(TileCoord::new(10, 0).to_index(10, 5), None);
        assert_eq!(TileCoord::new(0, 5).to_index(10, 5), None);
        assert_eq!(TileCoord::new(-1, 0).to_index(10, 5), None);
    }

    #[test]
    fn test_center() {
        assert_eq!(TileCoord::new(2, 1).center(32.0), Vec2::new(80.0, 48.0));
    }

    proptest! {
        #[test]
        fn prop_point_inside_tile_maps_back(
            col in -500i32..500,
            row in -500i32..500,
            fx in 0.0f32..0.99,
            fy in 0.0f32..0.99,
            tile_size in prop::sample::select(vec![8.0f32, 16.0, 32.0, 48.0]),
        ) {
            let coord = TileCoord::new(col, row);
            let pos = coord.to_world(tile_size) + Vec2::new(fx, fy) * tile_size;
            prop_assert_eq!(TileCoord::from_world(pos, tile_size), coord);
        }
    }
}
