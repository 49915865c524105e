//! Per-tick orchestration.
//!
//! One tick reads the clock once, then runs in a fixed order: actor
//! movement, tool dispatch, the growth sweep, and finally drop animation and
//! pickup. A harvest made in a tick is therefore never aged by that tick's
//! growth pass.

use std::time::Duration;

use furrow_common::{Clock, TileCoord, Vec2, WorldResult};
use furrow_world::{
    FarmingConfig, GenerationStats, GrowthReport, GrowthScheduler, TileView, WorldConfig,
    WorldGenerator, WorldGrid,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::actor::{Actor, ActorConfig, Direction};
use crate::drops::{DropConfig, DropView, ItemDrop, ItemDropRegistry};
use crate::interaction::{
    InteractionConfig, InteractionOutcome, InteractionResolver, InteractionResult, Target, Tool,
};

/// Settings for every simulation subsystem.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// World size and generation
    pub world: WorldConfig,
    /// Growth and soil timings
    pub farming: FarmingConfig,
    /// Tool use
    pub interaction: InteractionConfig,
    /// Item drops
    pub drops: DropConfig,
    /// Actor movement
    pub actor: ActorConfig,
}

impl SimulationConfig {
    /// Validate and clamp every section.
    pub fn validate(&mut self) {
        self.world.validate();
        self.farming.validate();
        self.interaction.validate();
        self.drops.validate();
        self.actor.validate();
    }
}

/// A tool use requested for this tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActionRequest {
    /// Tool to use
    pub tool: Tool,
    /// Where to use it
    pub target: Target,
}

/// Controller input for one tick.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickInput {
    /// Turn in place before moving
    pub face: Option<Direction>,
    /// Desired movement direction (need not be normalized)
    pub movement: Vec2,
    /// Tool uses, dispatched in order
    pub actions: Vec<ActionRequest>,
}

impl TickInput {
    /// No movement and no actions.
    #[must_use]
    pub fn idle() -> Self {
        Self::default()
    }

    /// Move in a direction.
    #[must_use]
    pub fn moving(movement: Vec2) -> Self {
        Self {
            movement,
            ..Self::default()
        }
    }

    /// Turn to face a direction without moving.
    #[must_use]
    pub fn turning(direction: Direction) -> Self {
        Self {
            face: Some(direction),
            ..Self::default()
        }
    }

    /// Add a tool use.
    #[must_use]
    pub fn with_action(mut self, tool: Tool, target: Target) -> Self {
        self.actions.push(ActionRequest { tool, target });
        self
    }
}

/// What happened during one tick.
#[derive(Debug, Clone)]
pub struct TickReport {
    /// Clock reading used for the whole tick
    pub now: Duration,
    /// Time since the previous tick
    pub delta: Duration,
    /// Whether the actor moved
    pub moved: bool,
    /// Result of each requested action, in request order
    pub interactions: Vec<InteractionResult<InteractionOutcome>>,
    /// Growth sweep summary
    pub growth: GrowthReport,
    /// Drops the actor picked up
    pub collected: Vec<ItemDrop>,
}

impl TickReport {
    /// Number of actions that succeeded.
    #[must_use]
    pub fn successful_actions(&self) -> usize {
        self.interactions.iter().filter(|r| r.is_ok()).count()
    }
}

/// The whole farming simulation, driven by a clock.
#[derive(Debug)]
pub struct Simulation<C: Clock> {
    world: WorldGrid,
    scheduler: GrowthScheduler,
    drops: ItemDropRegistry,
    resolver: InteractionResolver,
    actor: Actor,
    clock: C,
    last_tick: Duration,
    ticks: u64,
}

impl<C: Clock> Simulation<C> {
    /// Generates a world from `config.world` and places the actor on the
    /// walkable tile closest to the center.
    pub fn new(config: SimulationConfig, clock: C) -> WorldResult<Self> {
        let mut rng = fastrand::Rng::with_seed(config.world.seed);
        let (world, stats): (WorldGrid, GenerationStats) =
            WorldGenerator::new(config.world.clone()).generate_with(&mut rng)?;
        debug!(?stats, "World ready");
        let drops = ItemDropRegistry::with_rng(config.drops.clone(), rng.fork());
        Ok(Self::assemble(world, drops, config, clock))
    }

    /// Wraps an existing world.
    #[must_use]
    pub fn from_world(world: WorldGrid, config: SimulationConfig, clock: C) -> Self {
        let rng = fastrand::Rng::with_seed(config.world.seed);
        let drops = ItemDropRegistry::with_rng(config.drops.clone(), rng);
        Self::assemble(world, drops, config, clock)
    }

    fn assemble(
        world: WorldGrid,
        drops: ItemDropRegistry,
        config: SimulationConfig,
        clock: C,
    ) -> Self {
        let spawn = spawn_point(&world);
        info!(x = spawn.x, y = spawn.y, "Actor spawned");
        let last_tick = clock.now();
        Self {
            world,
            scheduler: GrowthScheduler::with_config(config.farming),
            drops,
            resolver: InteractionResolver::with_config(config.interaction),
            actor: Actor::with_config(spawn, config.actor),
            clock,
            last_tick,
            ticks: 0,
        }
    }

    /// Runs one tick.
    pub fn tick(&mut self, input: &TickInput) -> TickReport {
        let now = self.clock.now();
        let delta = now.saturating_sub(self.last_tick);
        self.last_tick = now;
        let dt = delta.as_secs_f32();

        if let Some(direction) = input.face {
            self.actor.set_facing(direction);
        }
        let moved = self.actor.step(input.movement, dt, &self.world);

        let interactions = input
            .actions
            .iter()
            .map(|action| {
                self.resolver.dispatch(
                    &mut self.world,
                    &mut self.drops,
                    &self.actor,
                    action.tool,
                    action.target,
                    now,
                )
            })
            .collect();

        let growth = self.scheduler.tick(&mut self.world, now, delta);

        self.drops.update(dt);
        let collected = self
            .drops
            .check_pickup(self.actor.position(), self.resolver.config().pickup_radius);

        self.ticks += 1;
        TickReport {
            now,
            delta,
            moved,
            interactions,
            growth,
            collected,
        }
    }

    /// The world grid.
    #[must_use]
    pub fn world(&self) -> &WorldGrid {
        &self.world
    }

    /// The actor.
    #[must_use]
    pub fn actor(&self) -> &Actor {
        &self.actor
    }

    /// Teleports the actor.
    pub fn place_actor(&mut self, position: Vec2) {
        self.actor.set_position(position);
    }

    /// The drop registry.
    #[must_use]
    pub fn drops(&self) -> &ItemDropRegistry {
        &self.drops
    }

    /// Mutable access to drops, for spawning items from outside the tile
    /// state machine.
    pub fn drops_mut(&mut self) -> &mut ItemDropRegistry {
        &mut self.drops
    }

    /// The interaction resolver.
    #[must_use]
    pub fn resolver(&self) -> &InteractionResolver {
        &self.resolver
    }

    /// Mark a blocking menu as open or closed.
    pub fn set_menu_open(&mut self, open: bool) {
        self.resolver.set_menu_open(open);
    }

    /// The clock.
    #[must_use]
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Mutable access to the clock (for manual clocks).
    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }

    /// Clock reading of the last tick.
    #[must_use]
    pub fn last_tick(&self) -> Duration {
        self.last_tick
    }

    /// Number of ticks run.
    #[must_use]
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Renderer snapshot of every tile, row-major.
    #[must_use]
    pub fn tile_views(&self) -> Vec<TileView> {
        self.world.views()
    }

    /// Renderer snapshot of every drop.
    #[must_use]
    pub fn drop_views(&self) -> Vec<DropView> {
        self.drops.views()
    }
}

/// Center of the walkable tile closest to the middle of the grid.
fn spawn_point(world: &WorldGrid) -> Vec2 {
    let middle = TileCoord::new(world.width() as i32 / 2, world.height() as i32 / 2);
    world
        .tiles()
        .filter(|(_, tile)| !tile.is_solid())
        .min_by_key(|(coord, _)| {
            let dc = coord.col - middle.col;
            let dr = coord.row - middle.row;
            (dc * dc + dr * dr, coord.row, coord.col)
        })
        .map_or_else(
            || world.tile_center(middle),
            |(coord, _)| world.tile_center(coord),
        )
}
