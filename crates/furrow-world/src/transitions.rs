//! Tile state machine.
//!
//! ```text
//! Grass/Dirt --till--> TilledSoil --plant--> PlantedSoil --harvest(growth >= 1)--> TilledSoil
//! TilledSoil --timeout--> Grass
//! Tree --chop x3--> Stump --chop--> Grass
//! ```
//!
//! Every entry point takes a world position, resolves it to a tile and either
//! applies the transition and reports success, or leaves the tile untouched
//! and reports failure. Declined actions are ordinary outcomes, not errors.

use std::time::Duration;

use furrow_common::{CropType, Vec2};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::grid::WorldGrid;
use crate::growth::FarmingConfig;
use crate::tile::{Crop, Soil, Tile, MATURE_GROWTH};

/// Result of a successful axe hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChopOutcome {
    /// The tree took a hit and is still standing.
    Weakened {
        /// Hits left before it falls
        remaining: u8,
    },
    /// The tree fell and left a stump.
    Felled,
    /// A stump was pulled out, leaving grass.
    Uprooted,
}

impl ChopOutcome {
    /// Whether this hit brought the tree down.
    #[must_use]
    pub const fn is_felled(self) -> bool {
        matches!(self, Self::Felled)
    }
}

/// What the growth pass did to a single cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct CellUpdate {
    pub matured: bool,
    pub dried: bool,
    pub reverted: bool,
}

impl WorldGrid {
    /// Tills grass or dirt into soil.
    pub fn till(&mut self, pos: Vec2, now: Duration) -> bool {
        let Some(index) = self.index_of(self.tile_coord(pos)) else {
            return false;
        };
        match self.tile_by_index(index).copied() {
            Some(Tile::Grass | Tile::Dirt) => {
                self.replace(index, Tile::Tilled(Soil::new(now)));
                true
            },
            _ => false,
        }
    }

    /// Plants a seed in unplanted tilled soil.
    ///
    /// The new crop starts at zero growth and unwatered, even if the soil was
    /// watered before planting.
    pub fn plant_seed(&mut self, pos: Vec2, crop: CropType) -> bool {
        let Some(index) = self.index_of(self.tile_coord(pos)) else {
            return false;
        };
        match self.tile_by_index(index).copied() {
            Some(Tile::Tilled(_)) => {
                self.replace(index, Tile::Planted(Crop::new(crop)));
                true
            },
            _ => false,
        }
    }

    /// Waters tilled or planted soil.
    pub fn water(&mut self, pos: Vec2, now: Duration) -> bool {
        let Some(index) = self.index_of(self.tile_coord(pos)) else {
            return false;
        };
        match self.tile_by_index_mut(index) {
            Some(Tile::Tilled(soil)) => {
                soil.set_watered_at(Some(now));
                true
            },
            Some(Tile::Planted(crop)) => {
                crop.water(now);
                true
            },
            _ => false,
        }
    }

    /// Harvests a mature crop, returning its type.
    ///
    /// The cell goes back to unwatered tilled soil whose reversion timer
    /// starts at `now`.
    pub fn harvest(&mut self, pos: Vec2, now: Duration) -> Option<CropType> {
        let index = self.index_of(self.tile_coord(pos))?;
        match self.tile_by_index(index).copied() {
            Some(Tile::Planted(crop)) if crop.is_mature() => {
                let harvested = crop.crop();
                self.replace(index, Tile::Tilled(Soil::new(now)));
                Some(harvested)
            },
            _ => None,
        }
    }

    /// Hits a tree or stump with an axe.
    pub fn chop_tree(&mut self, pos: Vec2) -> Option<ChopOutcome> {
        let coord = self.tile_coord(pos);
        let index = self.index_of(coord)?;
        match self.tile_by_index(index).copied() {
            Some(Tile::Tree { health }) => {
                let remaining = health.saturating_sub(1);
                if remaining >= 1 {
                    self.replace(index, Tile::Tree { health: remaining });
                    Some(ChopOutcome::Weakened { remaining })
                } else {
                    self.replace(index, Tile::Stump);
                    debug!("Tree felled at {coord}");
                    Some(ChopOutcome::Felled)
                }
            },
            Some(Tile::Stump) => {
                self.replace(index, Tile::Grass);
                debug!("Stump uprooted at {coord}");
                Some(ChopOutcome::Uprooted)
            },
            _ => None,
        }
    }

    /// Advances one tilled or planted cell over the tick `[now - delta, now]`.
    ///
    /// A crop only grows for the part of the tick that falls inside its
    /// watering window, so one long tick gives the same growth as many short
    /// ones. The watering expiry is checked after growth is credited.
    pub(crate) fn advance_cell(
        &mut self,
        index: usize,
        now: Duration,
        delta: Duration,
        config: &FarmingConfig,
    ) -> CellUpdate {
        let mut update = CellUpdate::default();
        let mut revert = false;

        match self.tile_by_index_mut(index) {
            Some(Tile::Planted(crop)) => {
                let earlier = crop.take_earlier_watering();
                if let Some(watered_at) = crop.watered_at() {
                    let was_mature = crop.is_mature();
                    let watered = watered_time(
                        now.saturating_sub(delta),
                        now,
                        earlier,
                        watered_at,
                        config.water_duration(),
                    );
                    crop.grow(watered.as_secs_f32() * config.growth_rate);
                    if crop.growth() >= MATURE_GROWTH - config.growth_epsilon {
                        crop.finish_growth();
                    }
                    update.matured = !was_mature && crop.is_mature();

                    if now.saturating_sub(watered_at) >= config.water_duration() {
                        crop.dry();
                        update.dried = true;
                    }
                }
            },
            Some(Tile::Tilled(soil)) => {
                if let Some(watered_at) = soil.watered_at() {
                    if now.saturating_sub(watered_at) >= config.water_duration() {
                        soil.set_watered_at(None);
                        update.dried = true;
                    }
                }
                revert = now.saturating_sub(soil.tilled_at()) >= config.till_timeout();
            },
            _ => {},
        }

        if revert {
            self.replace(index, Tile::Grass);
            update.reverted = true;
            trace!("Tilled soil at index {index} reverted to grass");
        }
        update
    }
}

/// Watered time within the tick `[from, to]`.
///
/// `latest` starts the current watering window. `earlier` starts a window it
/// replaced during this tick; that window is cut off where `latest` begins so
/// no time is counted twice.
fn watered_time(
    from: Duration,
    to: Duration,
    earlier: Option<Duration>,
    latest: Duration,
    window: Duration,
) -> Duration {
    let current = span_overlap(from, to, latest, latest.saturating_add(window));
    match earlier {
        Some(earlier) => {
            let earlier_end = earlier.saturating_add(window).min(latest);
            current + span_overlap(from, to, earlier, earlier_end)
        },
        None => current,
    }
}

/// Length of the intersection of `[from, to]` and `[start, end]`.
fn span_overlap(from: Duration, to: Duration, start: Duration, end: Duration) -> Duration {
    end.min(to).saturating_sub(start.max(from))
}
