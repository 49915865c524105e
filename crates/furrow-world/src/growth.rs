//! Time-driven soil and crop updates.
//!
//! Runs once per tick after interactions. Only tilled and planted cells are
//! visited; the grid keeps that set up to date as tiles change kind.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::grid::WorldGrid;

/// Default crop growth per second of watered time (matures in ~10s).
pub const DEFAULT_GROWTH_RATE: f32 = 0.1;
/// Default time a watering lasts, in seconds.
pub const DEFAULT_WATER_DURATION: f32 = 5.0;
/// Default time before unplanted tilled soil reverts to grass, in seconds.
pub const DEFAULT_TILL_TIMEOUT: f32 = 30.0;

/// Timing parameters for farming.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FarmingConfig {
    /// Growth added per second while watered
    pub growth_rate: f32,
    /// Seconds a watering lasts
    pub water_duration_secs: f32,
    /// Seconds before unplanted tilled soil turns back into grass
    pub till_timeout_secs: f32,
    /// Growth this close to 1.0 is snapped to mature, absorbing float drift
    /// from many small ticks
    pub growth_epsilon: f32,
}

impl Default for FarmingConfig {
    fn default() -> Self {
        Self {
            growth_rate: DEFAULT_GROWTH_RATE,
            water_duration_secs: DEFAULT_WATER_DURATION,
            till_timeout_secs: DEFAULT_TILL_TIMEOUT,
            growth_epsilon: 1e-4,
        }
    }
}

impl FarmingConfig {
    /// How long a watering lasts.
    #[must_use]
    pub fn water_duration(&self) -> Duration {
        Duration::from_secs_f32(self.water_duration_secs.max(0.0))
    }

    /// How long unplanted tilled soil survives.
    #[must_use]
    pub fn till_timeout(&self) -> Duration {
        Duration::from_secs_f32(self.till_timeout_secs.max(0.0))
    }

    /// Validate and clamp values to sensible ranges.
    pub fn validate(&mut self) {
        self.growth_rate = self.growth_rate.clamp(0.001, 10.0);
        self.water_duration_secs = self.water_duration_secs.clamp(0.1, 3600.0);
        self.till_timeout_secs = self.till_timeout_secs.clamp(1.0, 86_400.0);
        self.growth_epsilon = self.growth_epsilon.clamp(0.0, 0.01);
    }
}

/// Summary of one growth pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GrowthReport {
    /// Cells visited
    pub visited: usize,
    /// Crops that reached maturity
    pub matured: usize,
    /// Cells whose watering expired
    pub dried: usize,
    /// Tilled cells that reverted to grass
    pub reverted: usize,
}

impl GrowthReport {
    /// Whether any cell changed state visibly.
    #[must_use]
    pub fn has_changes(&self) -> bool {
        self.matured + self.dried + self.reverted > 0
    }
}

/// Advances growth, watering expiry and soil reversion.
#[derive(Debug, Clone, Default)]
pub struct GrowthScheduler {
    config: FarmingConfig,
}

impl GrowthScheduler {
    /// Create a scheduler with default timings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with custom configuration.
    #[must_use]
    pub fn with_config(config: FarmingConfig) -> Self {
        Self { config }
    }

    /// Get the configuration.
    #[must_use]
    pub fn config(&self) -> &FarmingConfig {
        &self.config
    }

    /// Runs one pass.
    ///
    /// `now` is the tick's clock reading and `delta` the simulated time since
    /// the previous tick. A late tick simply passes a larger delta.
    pub fn tick(&self, world: &mut WorldGrid, now: Duration, delta: Duration) -> GrowthReport {
        let mut report = GrowthReport::default();

        for index in world.active_indices() {
            let update = world.advance_cell(index, now, delta, &self.config);
            report.visited += 1;
            report.matured += usize::from(update.matured);
            report.dried += usize::from(update.dried);
            report.reverted += usize::from(update.reverted);
        }

        if report.has_changes() {
            debug!(
                matured = report.matured,
                dried = report.dried,
                reverted = report.reverted,
                "Growth pass"
            );
        }
        report
    }
}
