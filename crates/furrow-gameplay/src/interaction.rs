//! Tool use on tiles and proximity checks against entities.
//!
//! The resolver turns "use this tool there" into exactly one tile state
//! transition, spawns the drops that transition produces, and enforces a
//! short cooldown between actions.

use std::f32::consts::{FRAC_PI_2, PI, TAU};
use std::fmt;
use std::time::Duration;

use furrow_common::{CropType, DropId, EntityId, ItemKind, TileCoord, Vec2};
use furrow_world::{ChopOutcome, WorldGrid, WorldQuery};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, trace};

use crate::actor::Actor;
use crate::drops::ItemDropRegistry;

/// Reasons a tool use was declined.
///
/// None of these are faults; the world is left untouched.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InteractionError {
    /// A previous action is still cooling down
    #[error("still busy for {remaining:?}")]
    CoolingDown {
        /// Time left before the next action is accepted
        remaining: Duration,
    },

    /// A blocking menu is open
    #[error("a menu is open")]
    MenuOpen,

    /// Explicit target is too far from the actor
    #[error("target out of reach: distance {distance:.1} > max {max:.1}")]
    OutOfReach {
        /// Actual distance
        distance: f32,
        /// Maximum allowed distance
        max: f32,
    },

    /// The tool cannot be used on the targeted tile in its current state
    #[error("cannot use {tool} on tile {coord}")]
    IllegalTarget {
        /// Tool used
        tool: Tool,
        /// Targeted tile
        coord: TileCoord,
    },

    /// Target lies outside the world
    #[error("no tile at {coord}")]
    NoTile {
        /// Targeted tile coordinate
        coord: TileCoord,
    },
}

/// Result type for interaction operations.
pub type InteractionResult<T> = Result<T, InteractionError>;

/// A tool the actor can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tool {
    /// Tills grass or dirt
    Hoe,
    /// Plants a crop in tilled soil
    Seeds(CropType),
    /// Waters soil or crops
    WateringCan,
    /// Harvests mature crops
    Sickle,
    /// Chops trees and clears stumps
    Axe,
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tool::Hoe => write!(f, "Hoe"),
            Tool::Seeds(crop) => write!(f, "{} Seeds", crop.display_name()),
            Tool::WateringCan => write!(f, "Watering Can"),
            Tool::Sickle => write!(f, "Sickle"),
            Tool::Axe => write!(f, "Axe"),
        }
    }
}

/// Where a tool is aimed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Target {
    /// One interact distance in front of the actor
    Facing,
    /// An explicit world point, such as the pointer position
    Point(Vec2),
}

/// The tile transition an action performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TileEffect {
    /// Ground was tilled
    Tilled,
    /// A seed was planted
    Planted(CropType),
    /// Soil or crop was watered
    Watered,
    /// A mature crop was harvested
    Harvested(CropType),
    /// An axe hit landed on a tree or stump
    Chopped(ChopOutcome),
}

/// A successful action.
#[derive(Debug, Clone, PartialEq)]
pub struct InteractionOutcome {
    /// Tile acted on
    pub coord: TileCoord,
    /// What happened to it
    pub effect: TileEffect,
    /// Drops spawned as a side effect
    pub spawned: Vec<DropId>,
}

/// Configuration for interaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionConfig {
    /// Distance in front of the actor targeted in facing mode; one tile of
    /// the world being played when unset
    pub interact_distance: Option<f32>,
    /// Maximum distance to an explicit target point
    pub max_reach: f32,
    /// Busy window after an action, in seconds
    pub cooldown_secs: f32,
    /// Offset from the tile center of the seed dropped by a harvest
    pub seed_drop_offset: Vec2,
    /// Offsets from the tile center of the wood dropped by a felled tree
    pub wood_drop_offsets: [Vec2; 2],
    /// Radius within which entities can be interacted with
    pub entity_radius: f32,
    /// Radius within which the actor collects drops
    pub pickup_radius: f32,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            interact_distance: None,
            max_reach: 96.0,
            cooldown_secs: 0.3,
            seed_drop_offset: Vec2::new(8.0, 6.0),
            wood_drop_offsets: [Vec2::new(-8.0, 4.0), Vec2::new(8.0, -4.0)],
            entity_radius: 48.0,
            pickup_radius: 20.0,
        }
    }
}

impl InteractionConfig {
    /// Validate and clamp values to sensible ranges.
    pub fn validate(&mut self) {
        self.interact_distance = self.interact_distance.map(|d| d.clamp(1.0, 512.0));
        self.max_reach = self
            .max_reach
            .clamp(self.interact_distance.unwrap_or(1.0), 4096.0);
        self.cooldown_secs = self.cooldown_secs.clamp(0.0, 10.0);
        self.entity_radius = self.entity_radius.clamp(0.0, 1024.0);
        self.pickup_radius = self.pickup_radius.clamp(0.0, 512.0);
    }

    /// Facing-mode distance for tiles of `tile_size`.
    #[must_use]
    pub fn interact_distance(&self, tile_size: f32) -> f32 {
        self.interact_distance.unwrap_or(tile_size)
    }

    /// Busy window after an action.
    #[must_use]
    pub fn cooldown(&self) -> Duration {
        Duration::from_secs_f32(self.cooldown_secs.max(0.0))
    }
}

/// Something the actor can interact with that is not a tile.
pub trait Interactable {
    /// The entity's id.
    fn entity_id(&self) -> EntityId;

    /// The entity's world position.
    fn position(&self) -> Vec2;
}

/// Routes tool use to tile transitions.
#[derive(Debug, Clone, Default)]
pub struct InteractionResolver {
    config: InteractionConfig,
    busy_until: Option<Duration>,
    menu_open: bool,
}

impl InteractionResolver {
    /// Create a resolver with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with custom configuration.
    #[must_use]
    pub fn with_config(config: InteractionConfig) -> Self {
        Self {
            config,
            busy_until: None,
            menu_open: false,
        }
    }

    /// Get the configuration.
    #[must_use]
    pub fn config(&self) -> &InteractionConfig {
        &self.config
    }

    /// Mark a blocking menu as open or closed.
    pub fn set_menu_open(&mut self, open: bool) {
        self.menu_open = open;
    }

    /// Time left in the current busy window, if any.
    #[must_use]
    pub fn cooldown_remaining(&self, now: Duration) -> Option<Duration> {
        self.busy_until
            .filter(|&until| now < until)
            .map(|until| until - now)
    }

    /// World point one interact distance in front of the actor, on a grid
    /// of `tile_size` tiles.
    #[must_use]
    pub fn facing_target(&self, actor: &Actor, tile_size: f32) -> Vec2 {
        actor.position() + actor.facing().to_vec2() * self.config.interact_distance(tile_size)
    }

    /// Uses `tool` on the tile at `target`.
    ///
    /// Gates are checked in order: open menu (explicit points only),
    /// cooldown, reach (explicit points only), target inside the world. Once
    /// they pass the cooldown starts, even if the tile then declines the
    /// tool.
    pub fn dispatch(
        &mut self,
        world: &mut WorldGrid,
        drops: &mut ItemDropRegistry,
        actor: &Actor,
        tool: Tool,
        target: Target,
        now: Duration,
    ) -> InteractionResult<InteractionOutcome> {
        let point = match target {
            Target::Facing => self.facing_target(actor, world.tile_size()),
            Target::Point(point) => {
                if self.menu_open {
                    return Err(InteractionError::MenuOpen);
                }
                point
            },
        };

        if let Some(remaining) = self.cooldown_remaining(now) {
            trace!(?remaining, "Action suppressed by cooldown");
            return Err(InteractionError::CoolingDown { remaining });
        }

        if let Target::Point(point) = target {
            let distance = actor.position().distance(point);
            if distance > self.config.max_reach {
                return Err(InteractionError::OutOfReach {
                    distance,
                    max: self.config.max_reach,
                });
            }
        }

        let coord = world.tile_coord(point);
        if world.tile(coord).is_none() {
            return Err(InteractionError::NoTile { coord });
        }

        self.busy_until = Some(now + self.config.cooldown());

        let center = world.tile_center(coord);
        let illegal = InteractionError::IllegalTarget { tool, coord };
        let mut spawned = Vec::new();

        let effect = match tool {
            Tool::Hoe => world.till(point, now).then_some(TileEffect::Tilled),
            Tool::Seeds(crop) => world
                .plant_seed(point, crop)
                .then_some(TileEffect::Planted(crop)),
            Tool::WateringCan => world.water(point, now).then_some(TileEffect::Watered),
            Tool::Sickle => world.harvest(point, now).map(|crop| {
                spawned.push(drops.create_drop(center, ItemKind::Crop(crop), 1));
                spawned.push(drops.create_drop(
                    center + self.config.seed_drop_offset,
                    ItemKind::Seed(crop),
                    1,
                ));
                TileEffect::Harvested(crop)
            }),
            Tool::Axe => world.chop_tree(point).map(|outcome| {
                match outcome {
                    ChopOutcome::Weakened { .. } => {},
                    ChopOutcome::Felled => {
                        for offset in self.config.wood_drop_offsets {
                            spawned.push(drops.create_drop(center + offset, ItemKind::Wood, 1));
                        }
                    },
                    ChopOutcome::Uprooted => {
                        spawned.push(drops.create_drop(center, ItemKind::Wood, 1));
                    },
                }
                TileEffect::Chopped(outcome)
            }),
        };

        match effect {
            Some(effect) => {
                debug!(%tool, %coord, ?effect, spawned = spawned.len(), "Tool used");
                Ok(InteractionOutcome {
                    coord,
                    effect,
                    spawned,
                })
            },
            None => {
                trace!(%tool, %coord, "Tool declined by tile");
                Err(illegal)
            },
        }
    }

    /// Whether the actor can interact with something at `entity_pos`.
    ///
    /// The entity must be within the interaction radius and within 90° of
    /// the actor's facing on either side.
    #[must_use]
    pub fn can_interact_with(&self, actor: &Actor, entity_pos: Vec2) -> bool {
        let offset = entity_pos - actor.position();
        if offset.length() > self.config.entity_radius {
            return false;
        }
        if offset == Vec2::ZERO {
            return true;
        }
        let bearing = offset.y.atan2(offset.x);
        normalize_angle(bearing - actor.facing().angle()).abs() <= FRAC_PI_2
    }

    /// The closest entity the actor can interact with.
    pub fn nearest_interactable<'a, E: Interactable>(
        &self,
        actor: &Actor,
        entities: &'a [E],
    ) -> Option<&'a E> {
        entities
            .iter()
            .filter(|entity| self.can_interact_with(actor, entity.position()))
            .min_by(|a, b| {
                let da = a.position().distance_squared(actor.position());
                let db = b.position().distance_squared(actor.position());
                da.total_cmp(&db)
            })
    }
}

/// Wraps an angle into (−π, π].
fn normalize_angle(angle: f32) -> f32 {
    let wrapped = (angle + PI).rem_euclid(TAU) - PI;
    if wrapped <= -PI {
        wrapped + TAU
    } else {
        wrapped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::Direction;
    use furrow_world::{Tile, TileKind};

    const TILE: f32 = 32.0;

    struct Npc {
        id: EntityId,
        pos: Vec2,
    }

    impl Interactable for Npc {
        fn entity_id(&self) -> EntityId {
            self.id
        }

        fn position(&self) -> Vec2 {
            self.pos
        }
    }

    fn secs(s: f32) -> Duration {
        Duration::from_secs_f32(s)
    }

    fn setup(rows: &[&str]) -> (WorldGrid, ItemDropRegistry, InteractionResolver) {
        (
            WorldGrid::from_layout(TILE, rows).expect("valid layout"),
            ItemDropRegistry::with_rng(Default::default(), fastrand::Rng::with_seed(3)),
            InteractionResolver::new(),
        )
    }

    /// Actor standing on `coord`, facing `facing`.
    fn actor_at(world: &WorldGrid, col: i32, row: i32, facing: Direction) -> Actor {
        let mut actor = Actor::new(world.tile_center(TileCoord::new(col, row)));
        actor.set_facing(facing);
        actor
    }

    fn kind(world: &WorldGrid, col: i32, row: i32) -> TileKind {
        world
            .tile(TileCoord::new(col, row))
            .map(Tile::kind)
            .expect("in bounds")
    }

    #[test]
    fn test_facing_target_hits_adjacent_tile() {
        let (mut world, mut drops, mut resolver) = setup(&["...", "...", "..."]);
        let actor = actor_at(&world, 1, 1, Direction::Right);

        let outcome = resolver
            .dispatch(&mut world, &mut drops, &actor, Tool::Hoe, Target::Facing, secs(0.0))
            .expect("hoe on grass");
        assert_eq!(outcome.coord, TileCoord::new(2, 1));
        assert_eq!(outcome.effect, TileEffect::Tilled);
        assert_eq!(kind(&world, 2, 1), TileKind::TilledSoil);
    }

    #[test]
    fn test_facing_distance_follows_tile_size() {
        let mut world = WorldGrid::from_layout(16.0, &["....", "...."]).expect("valid layout");
        let mut drops = ItemDropRegistry::new();
        let mut resolver = InteractionResolver::new();
        let actor = actor_at(&world, 1, 0, Direction::Right);
        assert_eq!(resolver.facing_target(&actor, 16.0), world.tile_center(TileCoord::new(2, 0)));

        let outcome = resolver
            .dispatch(&mut world, &mut drops, &actor, Tool::Hoe, Target::Facing, secs(0.0))
            .expect("hoe on grass");
        assert_eq!(outcome.coord, TileCoord::new(2, 0));

        let mut resolver = InteractionResolver::with_config(InteractionConfig {
            interact_distance: Some(32.0),
            ..InteractionConfig::default()
        });
        let outcome = resolver
            .dispatch(&mut world, &mut drops, &actor, Tool::Hoe, Target::Facing, secs(0.0))
            .expect("hoe on grass");
        assert_eq!(outcome.coord, TileCoord::new(3, 0));
    }

    #[test]
    fn test_cooldown_blocks_then_expires() {
        let (mut world, mut drops, mut resolver) = setup(&["...", "...", "..."]);
        let actor = actor_at(&world, 1, 1, Direction::Down);

        assert!(resolver
            .dispatch(&mut world, &mut drops, &actor, Tool::Hoe, Target::Facing, secs(1.0))
            .is_ok());

        let seeds = Tool::Seeds(CropType::Carrot);
        let blocked =
            resolver.dispatch(&mut world, &mut drops, &actor, seeds, Target::Facing, secs(1.1));
        assert!(matches!(blocked, Err(InteractionError::CoolingDown { .. })));
        assert_eq!(kind(&world, 1, 2), TileKind::TilledSoil);

        assert!(resolver
            .dispatch(&mut world, &mut drops, &actor, seeds, Target::Facing, secs(1.4))
            .is_ok());
        assert_eq!(kind(&world, 1, 2), TileKind::PlantedSoil);
    }

    #[test]
    fn test_declined_action_still_starts_cooldown() {
        let (mut world, mut drops, mut resolver) = setup(&["s.."]);
        let actor = actor_at(&world, 1, 0, Direction::Left);

        let result =
            resolver.dispatch(&mut world, &mut drops, &actor, Tool::Hoe, Target::Facing, secs(0.0));
        assert_eq!(
            result,
            Err(InteractionError::IllegalTarget {
                tool: Tool::Hoe,
                coord: TileCoord::new(0, 0)
            })
        );
        assert!(resolver.cooldown_remaining(secs(0.1)).is_some());
        assert!(resolver.cooldown_remaining(secs(0.3)).is_none());
    }

    #[test]
    fn test_explicit_point_gates() {
        let (mut world, mut drops, mut resolver) = setup(&[".......", "......."]);
        let actor = actor_at(&world, 0, 0, Direction::Right);

        resolver.set_menu_open(true);
        let near = world.tile_center(TileCoord::new(1, 1));
        assert_eq!(
            resolver.dispatch(&mut world, &mut drops, &actor, Tool::Hoe, Target::Point(near), secs(0.0)),
            Err(InteractionError::MenuOpen)
        );
        resolver.set_menu_open(false);

        let far = world.tile_center(TileCoord::new(6, 0));
        assert!(matches!(
            resolver.dispatch(&mut world, &mut drops, &actor, Tool::Hoe, Target::Point(far), secs(0.0)),
            Err(InteractionError::OutOfReach { .. })
        ));
        assert!(resolver.cooldown_remaining(secs(0.0)).is_none(), "gates do not start cooldown");

        let outcome = resolver
            .dispatch(&mut world, &mut drops, &actor, Tool::Hoe, Target::Point(near), secs(0.0))
            .expect("within reach");
        assert_eq!(outcome.coord, TileCoord::new(1, 1));
    }

    #[test]
    fn test_menu_does_not_block_facing_mode() {
        let (mut world, mut drops, mut resolver) = setup(&["..", ".."]);
        let actor = actor_at(&world, 0, 0, Direction::Right);
        resolver.set_menu_open(true);
        assert!(resolver
            .dispatch(&mut world, &mut drops, &actor, Tool::Hoe, Target::Facing, secs(0.0))
            .is_ok());
    }

    #[test]
    fn test_target_outside_world() {
        let (mut world, mut drops, mut resolver) = setup(&[".."]);
        let actor = actor_at(&world, 0, 0, Direction::Up);
        assert_eq!(
            resolver.dispatch(&mut world, &mut drops, &actor, Tool::Hoe, Target::Facing, secs(0.0)),
            Err(InteractionError::NoTile {
                coord: TileCoord::new(0, -1)
            })
        );
    }

    #[test]
    fn test_harvest_spawns_crop_and_seed() {
        let (mut world, mut drops, mut resolver) = setup(&["...", "..."]);
        let actor = actor_at(&world, 0, 0, Direction::Right);
        let target = world.tile_center(TileCoord::new(1, 0));
        world.till(target, secs(0.0));
        world.plant_seed(target, CropType::Wheat);

        let mut now = secs(0.0);
        for _ in 0..2 {
            world.water(target, now);
            now += secs(5.0);
            furrow_world::GrowthScheduler::new().tick(&mut world, now, secs(5.0));
        }

        let outcome = resolver
            .dispatch(&mut world, &mut drops, &actor, Tool::Sickle, Target::Facing, now)
            .expect("mature crop");
        assert_eq!(outcome.effect, TileEffect::Harvested(CropType::Wheat));
        assert_eq!(outcome.spawned.len(), 2);

        let items: Vec<ItemKind> = drops.drops().map(|d| d.item()).collect();
        assert_eq!(
            items,
            vec![ItemKind::Crop(CropType::Wheat), ItemKind::Seed(CropType::Wheat)]
        );
        let crop = drops.get(outcome.spawned[0]).expect("crop drop");
        assert_eq!(crop.position(), target);
        let seed = drops.get(outcome.spawned[1]).expect("seed drop");
        assert_eq!(seed.position(), target + resolver.config().seed_drop_offset);
    }

    #[test]
    fn test_unripe_harvest_declined() {
        let (mut world, mut drops, mut resolver) = setup(&["..", ".."]);
        let actor = actor_at(&world, 0, 0, Direction::Down);
        let target = world.tile_center(TileCoord::new(0, 1));
        world.till(target, secs(0.0));
        world.plant_seed(target, CropType::Carrot);

        assert!(matches!(
            resolver.dispatch(&mut world, &mut drops, &actor, Tool::Sickle, Target::Facing, secs(0.0)),
            Err(InteractionError::IllegalTarget { tool: Tool::Sickle, .. })
        ));
        assert!(drops.is_empty());
    }

    #[test]
    fn test_felling_tree_spawns_two_wood() {
        let (mut world, mut drops, mut resolver) = setup(&[".T"]);
        let actor = actor_at(&world, 0, 0, Direction::Right);
        let cooldown = resolver.config().cooldown_secs;

        let mut effects = Vec::new();
        for i in 0..4 {
            let now = secs(i as f32 * (cooldown + 0.1));
            let outcome = resolver
                .dispatch(&mut world, &mut drops, &actor, Tool::Axe, Target::Facing, now)
                .expect("tree or stump");
            effects.push(outcome.effect);
        }

        assert_eq!(
            effects,
            vec![
                TileEffect::Chopped(ChopOutcome::Weakened { remaining: 2 }),
                TileEffect::Chopped(ChopOutcome::Weakened { remaining: 1 }),
                TileEffect::Chopped(ChopOutcome::Felled),
                TileEffect::Chopped(ChopOutcome::Uprooted),
            ]
        );
        assert_eq!(kind(&world, 1, 0), TileKind::Grass);
        assert_eq!(drops.drops().filter(|d| d.item() == ItemKind::Wood).count(), 3);
    }

    #[test]
    fn test_normalize_angle_range() {
        assert!((normalize_angle(PI) - PI).abs() < 1e-5);
        assert!((normalize_angle(-PI) - PI).abs() < 1e-5);
        assert!((normalize_angle(0.5) - 0.5).abs() < 1e-6);
        assert!((normalize_angle(-0.5 - TAU) + 0.5).abs() < 1e-5);
    }

    #[test]
    fn test_can_interact_with_cone_and_radius() {
        let resolver = InteractionResolver::new();
        let mut actor = Actor::new(Vec2::new(100.0, 100.0));
        actor.set_facing(Direction::Right);

        assert!(resolver.can_interact_with(&actor, Vec2::new(130.0, 100.0)));
        assert!(resolver.can_interact_with(&actor, Vec2::new(100.0, 130.0)), "90° is inside");
        assert!(!resolver.can_interact_with(&actor, Vec2::new(70.0, 100.0)), "behind");
        assert!(!resolver.can_interact_with(&actor, Vec2::new(200.0, 100.0)), "too far");
    }

    #[test]
    fn test_nearest_interactable() {
        let resolver = InteractionResolver::new();
        let mut actor = Actor::new(Vec2::new(0.0, 0.0));
        actor.set_facing(Direction::Down);

        let npcs = vec![
            Npc { id: EntityId::new(), pos: Vec2::new(0.0, 40.0) },
            Npc { id: EntityId::new(), pos: Vec2::new(5.0, 20.0) },
            Npc { id: EntityId::new(), pos: Vec2::new(0.0, -10.0) },
        ];

        let nearest = resolver.nearest_interactable(&actor, &npcs).expect("one in front");
        assert_eq!(nearest.entity_id(), npcs[1].id);

        actor.set_facing(Direction::Up);
        assert_eq!(
            resolver.nearest_interactable(&actor, &npcs).map(Interactable::entity_id),
            Some(npcs[2].id)
        );
    }
}
