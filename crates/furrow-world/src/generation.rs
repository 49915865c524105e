//! Procedural world generation.
//!
//! Passes run in a fixed order on a grass-filled grid:
//! 1. river: a sine-perturbed horizontal band of water, overwriting anything
//! 2. stone: an exact share of the remaining grass cells
//! 3. dirt: a few circular patches, converting grass only
//! 4. trees: an exact share of grass cells, never touching another tree
//!
//! Stone and tree placement shuffle the eligible cells with the seeded RNG and
//! accept candidates in order, so the placed count is exact whenever enough
//! eligible cells exist and the same seed always yields the same world.

use std::f32::consts::TAU;

use furrow_common::{TileCoord, WorldError, WorldResult};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::grid::{validate_dimensions, WorldGrid};
use crate::tile::Tile;

/// World generator configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Width in tiles
    pub width: u32,
    /// Height in tiles
    pub height: u32,
    /// Tile edge length in world pixels
    pub tile_size: f32,
    /// World seed
    pub seed: u64,
    /// Whether to carve a river
    pub river: bool,
    /// Rows of water on each side of the river's center line
    pub river_half_width: u32,
    /// Peak vertical displacement of the river, in tiles
    pub river_amplitude: f32,
    /// Angular frequency of the river meander, radians per column
    pub river_frequency: f32,
    /// Share of all cells turned to stone
    pub stone_fraction: f32,
    /// Number of dirt patches
    pub dirt_patches: u32,
    /// Smallest dirt patch radius, in tiles
    pub dirt_radius_min: u32,
    /// Largest dirt patch radius, in tiles
    pub dirt_radius_max: u32,
    /// Share of all cells planted with trees
    pub tree_fraction: f32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: 50,
            height: 40,
            tile_size: 32.0,
            seed: 12345,
            river: true,
            river_half_width: 1,
            river_amplitude: 3.0,
            river_frequency: 0.15,
            stone_fraction: 0.02,
            dirt_patches: 5,
            dirt_radius_min: 2,
            dirt_radius_max: 4,
            tree_fraction: 0.03,
        }
    }
}

impl WorldConfig {
    /// Validate and clamp values to sensible ranges.
    ///
    /// Dimensions and tile size are left alone: invalid ones are rejected at
    /// construction rather than silently fixed.
    pub fn validate(&mut self) {
        self.river_amplitude = self.river_amplitude.clamp(0.0, self.height as f32);
        self.river_frequency = self.river_frequency.clamp(0.0, TAU);
        self.stone_fraction = self.stone_fraction.clamp(0.0, 1.0);
        self.tree_fraction = self.tree_fraction.clamp(0.0, 1.0);
        self.dirt_radius_min = self.dirt_radius_min.clamp(1, 16);
        self.dirt_radius_max = self.dirt_radius_max.clamp(self.dirt_radius_min, 16);
    }
}

/// Counts of features placed by a generation run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GenerationStats {
    /// Water cells laid by the river pass
    pub water: usize,
    /// Stone cells placed
    pub stone: usize,
    /// Dirt patches stamped
    pub dirt_patches: usize,
    /// Cells converted to dirt
    pub dirt: usize,
    /// Trees placed
    pub trees: usize,
}

/// Procedural world generator.
#[derive(Debug, Clone)]
pub struct WorldGenerator {
    config: WorldConfig,
}

impl WorldGenerator {
    /// Creates a new generator with the given config.
    #[must_use]
    pub fn new(config: WorldConfig) -> Self {
        Self { config }
    }

    /// Creates a generator with default config and the given seed.
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self::new(WorldConfig {
            seed,
            ..Default::default()
        })
    }

    /// Returns the generator configuration.
    #[must_use]
    pub const fn config(&self) -> &WorldConfig {
        &self.config
    }

    /// Generates a world from the configured seed.
    pub fn generate(&self) -> WorldResult<WorldGrid> {
        let mut rng = fastrand::Rng::with_seed(self.config.seed);
        self.generate_with(&mut rng).map(|(grid, _)| grid)
    }

    /// Generates a world drawing randomness from `rng`.
    pub fn generate_with(&self, rng: &mut fastrand::Rng) -> WorldResult<(WorldGrid, GenerationStats)> {
        let (width, height, tile_size) =
            (self.config.width, self.config.height, self.config.tile_size);
        validate_dimensions(width, height, tile_size)?;
        let (min, max) = (self.config.dirt_radius_min, self.config.dirt_radius_max);
        if self.config.dirt_patches > 0 && min > max {
            return Err(WorldError::InvalidDirtRadius { min, max });
        }

        let mut layout = Layout {
            width,
            height,
            tiles: vec![Tile::Grass; width as usize * height as usize],
        };
        let mut stats = GenerationStats::default();

        if self.config.river {
            stats.water = self.carve_river(&mut layout, rng);
            debug!(water = stats.water, "River pass complete");
        }

        stats.stone = self.scatter_stone(&mut layout, rng);
        debug!(stone = stats.stone, "Stone pass complete");

        for _ in 0..self.config.dirt_patches {
            let converted = self.stamp_dirt_patch(&mut layout, rng);
            stats.dirt_patches += 1;
            stats.dirt += converted;
        }
        debug!(patches = stats.dirt_patches, dirt = stats.dirt, "Dirt pass complete");

        stats.trees = self.plant_trees(&mut layout, rng);
        debug!(trees = stats.trees, "Tree pass complete");

        info!(
            "Generated {}x{} world (seed {}): {} water, {} stone, {} dirt in {} patches, {} trees",
            width,
            height,
            self.config.seed,
            stats.water,
            stats.stone,
            stats.dirt,
            stats.dirt_patches,
            stats.trees
        );

        let grid = WorldGrid::from_tiles(width, height, tile_size, layout.tiles)?;
        Ok((grid, stats))
    }

    /// Lays a band of water along a sine-perturbed horizontal path.
    fn carve_river(&self, layout: &mut Layout, rng: &mut fastrand::Rng) -> usize {
        let phase = rng.f32() * TAU;
        let mid = layout.height as f32 / 2.0;
        let half = self.config.river_half_width as i32;
        let mut water = 0;

        for col in 0..layout.width as i32 {
            let center = mid
                + self.config.river_amplitude * (col as f32 * self.config.river_frequency + phase).sin();
            let center = center.floor() as i32;
            for row in (center - half)..=(center + half) {
                if let Some(index) = layout.index(TileCoord::new(col, row)) {
                    layout.tiles[index] = Tile::Water;
                    water += 1;
                }
            }
        }
        water
    }

    /// Turns an exact share of all cells into stone, chosen among grass.
    fn scatter_stone(&self, layout: &mut Layout, rng: &mut fastrand::Rng) -> usize {
        let target = layout.target_count(self.config.stone_fraction);
        let mut candidates = layout.grass_cells();
        rng.shuffle(&mut candidates);

        let mut placed = 0;
        for index in candidates.into_iter().take(target) {
            layout.tiles[index] = Tile::Stone;
            placed += 1;
        }
        placed
    }

    /// Converts grass inside a random circle to dirt.
    fn stamp_dirt_patch(&self, layout: &mut Layout, rng: &mut fastrand::Rng) -> usize {
        let center = TileCoord::new(
            rng.i32(0..layout.width as i32),
            rng.i32(0..layout.height as i32),
        );
        let radius = rng.u32(self.config.dirt_radius_min..=self.config.dirt_radius_max) as i32;
        let mut converted = 0;

        for d_row in -radius..=radius {
            for d_col in -radius..=radius {
                if d_col * d_col + d_row * d_row > radius * radius {
                    continue;
                }
                let Some(index) = layout.index(center.offset(d_col, d_row)) else {
                    continue;
                };
                if layout.tiles[index] == Tile::Grass {
                    layout.tiles[index] = Tile::Dirt;
                    converted += 1;
                }
            }
        }
        converted
    }

    /// Places trees on grass, rejecting cells next to an existing tree.
    fn plant_trees(&self, layout: &mut Layout, rng: &mut fastrand::Rng) -> usize {
        let target = layout.target_count(self.config.tree_fraction);
        let mut candidates = layout.grass_cells();
        rng.shuffle(&mut candidates);

        let mut placed = 0;
        for index in candidates {
            if placed == target {
                break;
            }
            let coord = TileCoord::from_index(index, layout.width);
            if layout.has_tree_neighbor(coord) {
                continue;
            }
            layout.tiles[index] = Tile::tree();
            placed += 1;
        }
        placed
    }
}

impl WorldGrid {
    /// Generates a new world from a configuration.
    pub fn new(config: &WorldConfig) -> WorldResult<Self> {
        WorldGenerator::new(config.clone()).generate()
    }
}

/// Tile buffer under construction.
struct Layout {
    width: u32,
    height: u32,
    tiles: Vec<Tile>,
}

impl Layout {
    fn index(&self, coord: TileCoord) -> Option<usize> {
        coord.to_index(self.width, self.height)
    }

    fn target_count(&self, fraction: f32) -> usize {
        (self.tiles.len() as f32 * fraction).round() as usize
    }

    fn grass_cells(&self) -> Vec<usize> {
        self.tiles
            .iter()
            .enumerate()
            .filter(|(_, tile)| **tile == Tile::Grass)
            .map(|(index, _)| index)
            .collect()
    }

    fn has_tree_neighbor(&self, coord: TileCoord) -> bool {
        coord
            .neighbors8()
            .into_iter()
            .filter_map(|n| self.index(n))
            .any(|index| matches!(self.tiles[index], Tile::Tree { .. }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::WorldQuery;
    use crate::tile::TileKind;

    fn no_river() -> WorldConfig {
        WorldConfig {
            river: false,
            ..Default::default()
        }
    }

    #[test]
    fn test_generation_deterministic() {
        let a = WorldGenerator::with_seed(42).generate().expect("generates");
        let b = WorldGenerator::with_seed(42).generate().expect("generates");
        assert_eq!(a.views(), b.views());
    }

    #[test]
    fn test_different_seeds_different_terrain() {
        let a = WorldGenerator::with_seed(42).generate().expect("generates");
        let b = WorldGenerator::with_seed(999).generate().expect("generates");
        assert_ne!(a.views(), b.views());
    }

    #[test]
    fn test_rejects_invalid_dimensions() {
        let config = WorldConfig {
            width: 0,
            ..Default::default()
        };
        assert!(WorldGrid::new(&config).is_err());
    }

    #[test]
    fn test_rejects_inverted_dirt_radius() {
        let config = WorldConfig {
            dirt_radius_min: 5,
            dirt_radius_max: 2,
            ..Default::default()
        };
        assert_eq!(
            WorldGrid::new(&config).err(),
            Some(WorldError::InvalidDirtRadius { min: 5, max: 2 })
        );

        let mut fixed = config;
        fixed.validate();
        assert!(WorldGrid::new(&fixed).is_ok());
    }

    #[test]
    fn test_exact_stone_count() {
        let config = WorldConfig {
            tree_fraction: 0.0,
            dirt_patches: 0,
            ..no_river()
        };
        let grid = WorldGrid::new(&config).expect("generates");
        let expected = (config.width * config.height) as f32 * config.stone_fraction;
        assert_eq!(
            grid.count(|t| t.kind() == TileKind::Stone),
            expected.round() as usize
        );
    }

    #[test]
    fn test_exact_tree_count() {
        let config = no_river();
        let mut rng = fastrand::Rng::with_seed(7);
        let (grid, stats) = WorldGenerator::new(config.clone())
            .generate_with(&mut rng)
            .expect("generates");
        let expected = ((config.width * config.height) as f32 * config.tree_fraction).round();
        assert_eq!(stats.trees, expected as usize);
        assert_eq!(grid.count(|t| t.kind() == TileKind::Tree), stats.trees);
    }

    #[test]
    fn test_trees_never_adjacent() {
        for seed in [1, 2, 3, 4, 5] {
            let config = WorldConfig {
                seed,
                tree_fraction: 0.2,
                ..Default::default()
            };
            let grid = WorldGrid::new(&config).expect("generates");
            for (coord, tile) in grid.tiles() {
                if tile.kind() != TileKind::Tree {
                    continue;
                }
                for n in coord.neighbors8() {
                    assert_ne!(
                        grid.tile(n).map(Tile::kind),
                        Some(TileKind::Tree),
                        "trees at {coord} and {n} touch"
                    );
                }
                assert_eq!(tile.tree_health(), Some(crate::tile::TREE_HEALTH));
            }
        }
    }

    #[test]
    fn test_river_spans_every_column() {
        let config = WorldConfig {
            stone_fraction: 0.0,
            tree_fraction: 0.0,
            dirt_patches: 0,
            ..Default::default()
        };
        let mut rng = fastrand::Rng::with_seed(3);
        let (grid, stats) = WorldGenerator::new(config.clone())
            .generate_with(&mut rng)
            .expect("generates");

        for col in 0..config.width as i32 {
            let water_rows = (0..config.height as i32)
                .filter(|&row| grid.tile(TileCoord::new(col, row)).map(Tile::kind) == Some(TileKind::Water))
                .count();
            assert_eq!(water_rows as u32, config.river_half_width * 2 + 1);
        }
        assert_eq!(stats.water, grid.count(|t| t.kind() == TileKind::Water));
    }

    #[test]
    fn test_later_passes_skip_water() {
        let config = WorldConfig {
            stone_fraction: 0.5,
            tree_fraction: 0.3,
            dirt_patches: 20,
            ..Default::default()
        };
        let mut rng = fastrand::Rng::with_seed(11);
        let (grid, stats) = WorldGenerator::new(config)
            .generate_with(&mut rng)
            .expect("generates");
        assert_eq!(stats.water, grid.count(|t| t.kind() == TileKind::Water));
    }

    #[test]
    fn test_dirt_only_replaces_grass() {
        let config = WorldConfig {
            width: 12,
            height: 12,
            river: false,
            stone_fraction: 0.0,
            tree_fraction: 0.0,
            dirt_patches: 3,
            ..Default::default()
        };
        let mut rng = fastrand::Rng::with_seed(5);
        let (grid, stats) = WorldGenerator::new(config)
            .generate_with(&mut rng)
            .expect("generates");
        assert_eq!(stats.dirt_patches, 3);
        assert!(stats.dirt > 0);
        assert_eq!(grid.count(|t| t.kind() == TileKind::Dirt), stats.dirt);
    }

    #[test]
    fn test_fresh_world_has_no_active_cells() {
        let grid = WorldGrid::new(&WorldConfig::default()).expect("generates");
        assert_eq!(grid.active_count(), 0);
    }

    #[test]
    fn test_config_validation() {
        let mut config = WorldConfig {
            stone_fraction: 3.0,
            dirt_radius_min: 6,
            dirt_radius_max: 2,
            ..Default::default()
        };
        config.validate();
        assert!((config.stone_fraction - 1.0).abs() < f32::EPSILON);
        assert_eq!(config.dirt_radius_max, 6);
    }
}
