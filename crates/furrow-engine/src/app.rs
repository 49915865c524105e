//! Headless run loop.
//!
//! Builds the simulation from configuration, then ticks it at a fixed rate
//! under a scripted farmhand, logging what happens.

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{debug, info};

use furrow_common::{Clock, MonotonicClock};
use furrow_gameplay::{Simulation, TickReport, TileEffect};
use furrow_world::{ChopOutcome, TileKind};

use crate::config::GameConfig;
use crate::farmhand::Farmhand;
use crate::timing::TickPacer;

/// Running totals over a session.
#[derive(Debug, Default)]
pub struct RunTotals {
    /// Ticks run
    pub ticks: u64,
    /// Actions that changed a tile
    pub actions: u64,
    /// Actions that were declined
    pub declined: u64,
    /// Crops harvested
    pub harvests: u64,
    /// Trees felled
    pub trees_felled: u64,
    /// Collected item counts by display name
    pub collected: BTreeMap<String, u32>,
}

impl RunTotals {
    /// Fold one tick into the totals.
    pub fn record(&mut self, report: &TickReport) {
        self.ticks += 1;
        for result in &report.interactions {
            match result {
                Ok(outcome) => {
                    self.actions += 1;
                    match outcome.effect {
                        TileEffect::Harvested(crop) => {
                            self.harvests += 1;
                            info!(crop = crop.display_name(), coord = %outcome.coord, "Harvested");
                        },
                        TileEffect::Chopped(ChopOutcome::Felled) => {
                            self.trees_felled += 1;
                            info!(coord = %outcome.coord, "Tree felled");
                        },
                        _ => {},
                    }
                },
                Err(e) => {
                    self.declined += 1;
                    debug!("Action declined: {e}");
                },
            }
        }
        for drop in &report.collected {
            *self
                .collected
                .entry(drop.item().display_name())
                .or_default() += drop.quantity();
        }
    }
}

/// Run the application.
pub fn run(config_path: Option<&Path>) -> Result<()> {
    let mut config = match config_path {
        Some(path) => GameConfig::load_from(path),
        None => GameConfig::load(),
    };
    config.validate();

    info!("Configuration loaded:");
    info!(
        "  World: {}x{} tiles of {}px, seed {}",
        config.world.width, config.world.height, config.world.tile_size, config.world.seed
    );
    info!("  Tick rate: {} Hz for {}s", config.tick_rate, config.run_secs);

    let mut sim = Simulation::new(config.simulation(), MonotonicClock::new())
        .context("failed to build the world")?;

    let totals = run_loop(&mut sim, &config);

    let planted = sim.world().count(|t| t.kind() == TileKind::PlantedSoil);
    info!(
        ticks = totals.ticks,
        actions = totals.actions,
        declined = totals.declined,
        harvests = totals.harvests,
        trees_felled = totals.trees_felled,
        planted,
        drops_left = sim.drops().len(),
        "Session finished"
    );
    for (item, count) in &totals.collected {
        info!("  Collected {count} x {item}");
    }
    Ok(())
}

/// Ticks the simulation until the configured run time has passed.
fn run_loop<C: Clock>(sim: &mut Simulation<C>, config: &GameConfig) -> RunTotals {
    let mut farmhand = Farmhand::new();
    let mut pacer = TickPacer::new(config.tick_rate);
    let mut totals = RunTotals::default();
    debug!(rate = pacer.tick_rate(), budget = ?pacer.tick_budget(), "Pacer ready");

    let run_for = Duration::from_secs_f32(config.run_secs);
    let status_every = Duration::from_secs_f32(config.status_interval_secs);
    let mut next_status = status_every;

    while sim.clock().now() < run_for {
        pacer.begin();
        let input = farmhand.plan(sim);
        let report = sim.tick(&input);
        totals.record(&report);

        if report.now >= next_status {
            let active = sim.world().active_count();
            info!(
                t = report.now.as_secs_f32(),
                active_cells = active,
                drops = sim.drops().len(),
                work_ms = pacer.average_work_ms(),
                "Status"
            );
            next_status += status_every;
        }
        pacer.finish();
    }
    totals
}
