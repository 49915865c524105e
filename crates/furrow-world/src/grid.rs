//! The tile grid.

use std::collections::BTreeSet;

use furrow_common::{TileCoord, Vec2, WorldError, WorldResult};

use crate::tile::{Tile, TileView};

/// Read access to tile state at world positions.
///
/// Collision and targeting code is written against this trait so it can run
/// on a [`WorldGrid`] or on a hand-built test world.
pub trait WorldQuery {
    /// Edge length of a tile in world pixels.
    fn tile_size(&self) -> f32;

    /// Tile at a tile coordinate, or `None` outside the grid.
    fn tile(&self, coord: TileCoord) -> Option<&Tile>;

    /// Tile containing a world position, or `None` outside the grid.
    fn tile_at(&self, pos: Vec2) -> Option<&Tile> {
        self.tile(TileCoord::from_world(pos, self.tile_size()))
    }

    /// Whether a world position blocks movement.
    ///
    /// Positions outside the grid are solid, so the edges behave as walls.
    fn is_solid(&self, pos: Vec2) -> bool {
        self.tile_at(pos).map_or(true, Tile::is_solid)
    }
}

/// Fixed-size 2D grid of tiles.
///
/// The grid is created once and never resized. Tile fields are only changed
/// through the transition methods in [`crate::transitions`] and the growth
/// scheduler, which keep the set of active (tilled or planted) cells in sync.
#[derive(Debug, Clone)]
pub struct WorldGrid {
    width: u32,
    height: u32,
    tile_size: f32,
    tiles: Vec<Tile>,
    active: BTreeSet<usize>,
}

impl WorldGrid {
    /// Creates a grid with every cell set to `fill`.
    pub fn filled(width: u32, height: u32, tile_size: f32, fill: Tile) -> WorldResult<Self> {
        validate_dimensions(width, height, tile_size)?;
        let tiles = vec![fill; width as usize * height as usize];
        Self::from_tiles(width, height, tile_size, tiles)
    }

    /// Creates a grid from a row-major tile buffer.
    pub fn from_tiles(
        width: u32,
        height: u32,
        tile_size: f32,
        tiles: Vec<Tile>,
    ) -> WorldResult<Self> {
        validate_dimensions(width, height, tile_size)?;
        let expected = width as usize * height as usize;
        if tiles.len() != expected {
            return Err(WorldError::TileCountMismatch {
                expected,
                actual: tiles.len(),
            });
        }

        let active = tiles
            .iter()
            .enumerate()
            .filter(|(_, tile)| tile.is_active())
            .map(|(index, _)| index)
            .collect();

        Ok(Self {
            width,
            height,
            tile_size,
            tiles,
            active,
        })
    }

    /// Creates a grid from a text layout, one string per row.
    ///
    /// Glyphs: `.` grass, `d` dirt, `s` stone, `~` water, `T` tree, `x` stump.
    /// Whitespace is ignored.
    pub fn from_layout(tile_size: f32, rows: &[&str]) -> WorldResult<Self> {
        let mut tiles = Vec::new();
        let mut width = None;

        for (row, line) in rows.iter().enumerate() {
            let glyphs: Vec<char> = line.chars().filter(|c| !c.is_whitespace()).collect();
            let expected = *width.get_or_insert(glyphs.len());
            if glyphs.len() != expected {
                return Err(WorldError::RaggedLayout {
                    row,
                    expected,
                    actual: glyphs.len(),
                });
            }
            for (col, glyph) in glyphs.into_iter().enumerate() {
                let tile = match glyph {
                    '.' => Tile::Grass,
                    'd' => Tile::Dirt,
                    's' => Tile::Stone,
                    '~' => Tile::Water,
                    'T' => Tile::tree(),
                    'x' => Tile::Stump,
                    _ => return Err(WorldError::UnknownGlyph { glyph, col, row }),
                };
                tiles.push(tile);
            }
        }

        Self::from_tiles(width.unwrap_or(0) as u32, rows.len() as u32, tile_size, tiles)
    }

    /// Width in tiles.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height in tiles.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Total number of tiles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    /// Always false; grids have positive dimensions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Tile coordinate containing a world position.
    #[must_use]
    pub fn tile_coord(&self, pos: Vec2) -> TileCoord {
        TileCoord::from_world(pos, self.tile_size)
    }

    /// World position of a tile's center.
    #[must_use]
    pub fn tile_center(&self, coord: TileCoord) -> Vec2 {
        coord.center(self.tile_size)
    }

    /// Iterates over all tiles in row-major order.
    pub fn tiles(&self) -> impl Iterator<Item = (TileCoord, &Tile)> + '_ {
        let width = self.width;
        self.tiles
            .iter()
            .enumerate()
            .map(move |(index, tile)| (TileCoord::from_index(index, width), tile))
    }

    /// Renderer snapshot of every tile, row-major.
    #[must_use]
    pub fn views(&self) -> Vec<TileView> {
        self.tiles.iter().map(Tile::view).collect()
    }

    /// Number of tilled or planted cells.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// Number of tiles matching a predicate.
    pub fn count(&self, mut predicate: impl FnMut(&Tile) -> bool) -> usize {
        self.tiles.iter().filter(|tile| predicate(tile)).count()
    }

    pub(crate) fn index_of(&self, coord: TileCoord) -> Option<usize> {
        coord.to_index(self.width, self.height)
    }

    pub(crate) fn active_indices(&self) -> Vec<usize> {
        self.active.iter().copied().collect()
    }

    pub(crate) fn tile_by_index(&self, index: usize) -> Option<&Tile> {
        self.tiles.get(index)
    }

    pub(crate) fn tile_by_index_mut(&mut self, index: usize) -> Option<&mut Tile> {
        self.tiles.get_mut(index)
    }

    /// Replaces a tile and keeps the active set in sync.
    pub(crate) fn replace(&mut self, index: usize, tile: Tile) {
        if tile.is_active() {
            self.active.insert(index);
        } else {
            self.active.remove(&index);
        }
        self.tiles[index] = tile;
    }
}

impl WorldQuery for WorldGrid {
    fn tile_size(&self) -> f32 {
        self.tile_size
    }

    fn tile(&self, coord: TileCoord) -> Option<&Tile> {
        self.index_of(coord).map(|index| &self.tiles[index])
    }
}

/// Checks the construction-time grid invariants.
pub(crate) fn validate_dimensions(width: u32, height: u32, tile_size: f32) -> WorldResult<()> {
    if width == 0 || height == 0 {
        return Err(WorldError::InvalidDimensions { width, height });
    }
    if !tile_size.is_finite() || tile_size <= 0.0 {
        return Err(WorldError::InvalidTileSize(tile_size));
    }
    Ok(())
}
