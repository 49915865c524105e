//! Tile variants and their read-only views.
//!
//! Each tile kind carries only the fields that are meaningful for it, so
//! states such as "a watered tree" or "growth on grass" cannot be built.

use std::time::Duration;

use furrow_common::CropType;
use serde::{Deserialize, Serialize};

/// Hit points of a freshly grown tree.
pub const TREE_HEALTH: u8 = 3;

/// Crop growth at which a plant can be harvested.
pub const MATURE_GROWTH: f32 = 1.0;

/// Tilled, unplanted soil.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Soil {
    tilled_at: Duration,
    watered_at: Option<Duration>,
}

impl Soil {
    /// Soil tilled at `tilled_at`, not yet watered.
    #[must_use]
    pub const fn new(tilled_at: Duration) -> Self {
        Self {
            tilled_at,
            watered_at: None,
        }
    }

    /// When the soil was tilled.
    #[must_use]
    pub const fn tilled_at(&self) -> Duration {
        self.tilled_at
    }

    /// When the soil was last watered, if it still is.
    #[must_use]
    pub const fn watered_at(&self) -> Option<Duration> {
        self.watered_at
    }

    /// Whether the soil is currently watered.
    #[must_use]
    pub const fn is_watered(&self) -> bool {
        self.watered_at.is_some()
    }

    pub(crate) fn set_watered_at(&mut self, at: Option<Duration>) {
        self.watered_at = at;
    }
}

/// A crop growing in soil.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Crop {
    crop: CropType,
    growth: f32,
    watered_at: Option<Duration>,
    /// Start of the watering replaced by a rewater since the last growth pass
    earlier_watering: Option<Duration>,
}

impl Crop {
    /// A freshly planted, unwatered crop.
    #[must_use]
    pub const fn new(crop: CropType) -> Self {
        Self {
            crop,
            growth: 0.0,
            watered_at: None,
            earlier_watering: None,
        }
    }

    /// A crop at a given growth level, clamped to [0, 1].
    #[must_use]
    pub fn with_growth(crop: CropType, growth: f32) -> Self {
        Self {
            crop,
            growth: clamp_growth(growth),
            watered_at: None,
            earlier_watering: None,
        }
    }

    /// Kind of crop planted.
    #[must_use]
    pub const fn crop(&self) -> CropType {
        self.crop
    }

    /// Maturity in [0, 1].
    #[must_use]
    pub const fn growth(&self) -> f32 {
        self.growth
    }

    /// When the crop was last watered, if it still is.
    #[must_use]
    pub const fn watered_at(&self) -> Option<Duration> {
        self.watered_at
    }

    /// Whether the crop is currently watered.
    #[must_use]
    pub const fn is_watered(&self) -> bool {
        self.watered_at.is_some()
    }

    /// Whether the crop can be harvested.
    #[must_use]
    pub fn is_mature(&self) -> bool {
        self.growth >= MATURE_GROWTH
    }

    /// Starts a new watering window at `now`.
    ///
    /// The window being replaced is remembered until the next growth pass, so
    /// time it covered earlier in the same tick is still credited.
    pub(crate) fn water(&mut self, now: Duration) {
        if let Some(previous) = self.watered_at {
            if previous < now {
                self.earlier_watering = Some(previous);
            }
        }
        self.watered_at = Some(now);
    }

    pub(crate) fn dry(&mut self) {
        self.watered_at = None;
    }

    pub(crate) fn take_earlier_watering(&mut self) -> Option<Duration> {
        self.earlier_watering.take()
    }

    pub(crate) fn grow(&mut self, amount: f32) {
        self.growth = clamp_growth(self.growth + amount);
    }

    pub(crate) fn finish_growth(&mut self) {
        self.growth = MATURE_GROWTH;
    }
}

/// Clamps growth into [0, 1], mapping NaN to 0.
fn clamp_growth(growth: f32) -> f32 {
    if growth.is_nan() {
        0.0
    } else {
        growth.clamp(0.0, MATURE_GROWTH)
    }
}

/// A single cell of the world grid.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum Tile {
    /// Plain grass
    #[default]
    Grass,
    /// Bare dirt
    Dirt,
    /// Stone (blocks movement)
    Stone,
    /// Water (blocks movement)
    Water,
    /// Tilled soil, ready for seeds
    Tilled(Soil),
    /// Soil with a crop in it
    Planted(Crop),
    /// A standing tree (blocks movement)
    Tree {
        /// Remaining axe hits
        health: u8,
    },
    /// What is left after a tree is felled
    Stump,
}

impl Tile {
    /// A full-health tree.
    #[must_use]
    pub const fn tree() -> Self {
        Self::Tree {
            health: TREE_HEALTH,
        }
    }

    /// The flat kind of this tile.
    #[must_use]
    pub const fn kind(&self) -> TileKind {
        match self {
            Self::Grass => TileKind::Grass,
            Self::Dirt => TileKind::Dirt,
            Self::Stone => TileKind::Stone,
            Self::Water => TileKind::Water,
            Self::Tilled(_) => TileKind::TilledSoil,
            Self::Planted(_) => TileKind::PlantedSoil,
            Self::Tree { .. } => TileKind::Tree,
            Self::Stump => TileKind::Stump,
        }
    }

    /// Whether this tile blocks movement.
    #[must_use]
    pub const fn is_solid(&self) -> bool {
        self.kind().is_solid()
    }

    /// Whether the soil or crop on this tile is watered.
    #[must_use]
    pub const fn is_watered(&self) -> bool {
        match self {
            Self::Tilled(soil) => soil.is_watered(),
            Self::Planted(crop) => crop.is_watered(),
            _ => false,
        }
    }

    /// Crop growth, if a crop is planted.
    #[must_use]
    pub const fn growth(&self) -> Option<f32> {
        match self {
            Self::Planted(crop) => Some(crop.growth()),
            _ => None,
        }
    }

    /// Planted crop type, if any.
    #[must_use]
    pub const fn crop(&self) -> Option<CropType> {
        match self {
            Self::Planted(crop) => Some(crop.crop()),
            _ => None,
        }
    }

    /// Remaining tree health, if this is a tree.
    #[must_use]
    pub const fn tree_health(&self) -> Option<u8> {
        match self {
            Self::Tree { health } => Some(*health),
            _ => None,
        }
    }

    /// Whether the tile is tracked by the growth scheduler.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        matches!(self, Self::Tilled(_) | Self::Planted(_))
    }

    /// Read-only snapshot for renderers.
    #[must_use]
    pub fn view(&self) -> TileView {
        TileView {
            kind: self.kind(),
            solid: self.is_solid(),
            watered: self.is_watered(),
            growth: self.growth().unwrap_or(0.0),
            tree_health: self.tree_health(),
            crop: self.crop(),
        }
    }
}

/// Flat tile kind, as seen by renderers and the interaction layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileKind {
    /// Plain grass
    Grass,
    /// Bare dirt
    Dirt,
    /// Stone
    Stone,
    /// Water
    Water,
    /// Tilled soil
    TilledSoil,
    /// Soil with a crop
    PlantedSoil,
    /// Standing tree
    Tree,
    /// Felled tree stump
    Stump,
}

impl TileKind {
    /// Check if this kind blocks movement.
    #[must_use]
    pub const fn is_solid(self) -> bool {
        matches!(self, Self::Water | Self::Stone | Self::Tree)
    }
}

/// Renderer-facing snapshot of one tile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TileView {
    /// Tile kind
    pub kind: TileKind,
    /// Blocks movement
    pub solid: bool,
    /// Soil or crop is watered
    pub watered: bool,
    /// Crop growth (0 when nothing is planted)
    pub growth: f32,
    /// Remaining tree health (trees only)
    pub tree_health: Option<u8>,
    /// Planted crop (planted soil only)
    pub crop: Option<CropType>,
}
