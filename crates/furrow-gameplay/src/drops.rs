//! Item drops lying in the world.
//!
//! Drops are created by harvesting and chopping (or by any caller), bob in
//! place while they wait, and leave the registry only when picked up.

use std::collections::VecDeque;
use std::f32::consts::TAU;

use furrow_common::{DropId, ItemKind, Vec2};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Drop animation and capacity settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DropConfig {
    /// Bob phase advance in radians per second
    pub bob_speed: f32,
    /// Peak bob offset in world pixels
    pub bob_amplitude: f32,
    /// Maximum number of drops kept; the oldest is evicted past this.
    /// `None` keeps every drop until it is picked up.
    pub max_drops: Option<usize>,
}

impl Default for DropConfig {
    fn default() -> Self {
        Self {
            bob_speed: 4.0,
            bob_amplitude: 3.0,
            max_drops: None,
        }
    }
}

impl DropConfig {
    /// Validate and clamp values to sensible ranges.
    pub fn validate(&mut self) {
        self.bob_speed = self.bob_speed.clamp(0.0, 50.0);
        self.bob_amplitude = self.bob_amplitude.clamp(0.0, 32.0);
        if let Some(max) = self.max_drops.as_mut() {
            *max = (*max).max(1);
        }
    }
}

/// A pickable quantity of an item lying in the world.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemDrop {
    id: DropId,
    position: Vec2,
    item: ItemKind,
    quantity: u32,
    bob_phase: f32,
}

impl ItemDrop {
    /// Unique id, increasing with creation order.
    #[must_use]
    pub fn id(&self) -> DropId {
        self.id
    }

    /// World position.
    #[must_use]
    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Item carried.
    #[must_use]
    pub fn item(&self) -> ItemKind {
        self.item
    }

    /// How many of the item.
    #[must_use]
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Current bob phase in [0, 2π).
    #[must_use]
    pub fn bob_phase(&self) -> f32 {
        self.bob_phase
    }

    /// Vertical render offset for a given amplitude.
    #[must_use]
    pub fn bob_offset(&self, amplitude: f32) -> f32 {
        self.bob_phase.sin() * amplitude
    }
}

/// Renderer-facing snapshot of one drop.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DropView {
    /// Drop id
    pub id: DropId,
    /// World position
    pub position: Vec2,
    /// Vertical bob offset in world pixels
    pub bob_offset: f32,
    /// Item carried
    pub item: ItemKind,
    /// Quantity
    pub quantity: u32,
}

/// Owns every drop in the world.
#[derive(Debug)]
pub struct ItemDropRegistry {
    config: DropConfig,
    drops: VecDeque<ItemDrop>,
    next_id: DropId,
    rng: fastrand::Rng,
}

impl Default for ItemDropRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ItemDropRegistry {
    /// Create an empty registry with default settings and an entropy-seeded
    /// phase generator.
    #[must_use]
    pub fn new() -> Self {
        Self::with_rng(DropConfig::default(), fastrand::Rng::new())
    }

    /// Create with custom configuration.
    #[must_use]
    pub fn with_config(config: DropConfig) -> Self {
        Self::with_rng(config, fastrand::Rng::new())
    }

    /// Create with custom configuration and a given phase generator.
    #[must_use]
    pub fn with_rng(config: DropConfig, rng: fastrand::Rng) -> Self {
        Self {
            config,
            drops: VecDeque::new(),
            next_id: DropId::FIRST,
            rng,
        }
    }

    /// Get the configuration.
    #[must_use]
    pub fn config(&self) -> &DropConfig {
        &self.config
    }

    /// Number of drops in the world.
    #[must_use]
    pub fn len(&self) -> usize {
        self.drops.len()
    }

    /// Whether there are no drops.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.drops.is_empty()
    }

    /// Iterates drops from oldest to newest.
    pub fn drops(&self) -> impl Iterator<Item = &ItemDrop> + '_ {
        self.drops.iter()
    }

    /// Look up a drop by id.
    #[must_use]
    pub fn get(&self, id: DropId) -> Option<&ItemDrop> {
        self.drops.iter().find(|drop| drop.id == id)
    }

    /// Places a new drop with a random bob phase and returns its id.
    ///
    /// A quantity of zero is raised to one.
    pub fn create_drop(&mut self, position: Vec2, item: ItemKind, quantity: u32) -> DropId {
        let id = self.next_id;
        self.next_id = id.next();

        self.drops.push_back(ItemDrop {
            id,
            position,
            item,
            quantity: quantity.max(1),
            bob_phase: self.rng.f32() * TAU,
        });
        debug!(%id, item = %item.display_name(), quantity, "Drop created");

        if let Some(max) = self.config.max_drops {
            while self.drops.len() > max {
                if let Some(evicted) = self.drops.pop_front() {
                    warn!(
                        id = %evicted.id,
                        item = %evicted.item.display_name(),
                        max,
                        "Drop cap reached, evicting oldest drop"
                    );
                }
            }
        }
        id
    }

    /// Advances every drop's bob phase by `dt` seconds.
    pub fn update(&mut self, dt: f32) {
        let advance = self.config.bob_speed * dt.max(0.0);
        for drop in &mut self.drops {
            drop.bob_phase = (drop.bob_phase + advance).rem_euclid(TAU);
        }
    }

    /// Removes and returns every drop strictly closer than `radius` to
    /// `actor_pos`, oldest first.
    pub fn check_pickup(&mut self, actor_pos: Vec2, radius: f32) -> Vec<ItemDrop> {
        if self.drops.is_empty() {
            return Vec::new();
        }

        let (picked, kept): (Vec<ItemDrop>, Vec<ItemDrop>) = self
            .drops
            .drain(..)
            .partition(|drop| drop.position.distance(actor_pos) < radius);
        self.drops = kept.into();

        if !picked.is_empty() {
            debug!(count = picked.len(), "Drops picked up");
        }
        picked
    }

    /// Renderer snapshot of every drop, oldest first.
    #[must_use]
    pub fn views(&self) -> Vec<DropView> {
        let amplitude = self.config.bob_amplitude;
        self.drops
            .iter()
            .map(|drop| DropView {
                id: drop.id,
                position: drop.position,
                bob_offset: drop.bob_offset(amplitude),
                item: drop.item,
                quantity: drop.quantity,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use furrow_common::CropType;
    use proptest::prelude::*;

    fn registry() -> ItemDropRegistry {
        ItemDropRegistry::with_rng(DropConfig::default(), fastrand::Rng::with_seed(7))
    }

    #[test]
    fn test_create_assigns_increasing_ids() {
        let mut drops = registry();
        let a = drops.create_drop(Vec2::ZERO, ItemKind::Wood, 1);
        let b = drops.create_drop(Vec2::ZERO, ItemKind::Wood, 1);
        assert!(b > a);
        assert_eq!(drops.len(), 2);
        assert_eq!(drops.get(a).map(ItemDrop::quantity), Some(1));
    }

    #[test]
    fn test_zero_quantity_raised() {
        let mut drops = registry();
        let id = drops.create_drop(Vec2::ZERO, ItemKind::Wood, 0);
        assert_eq!(drops.get(id).map(ItemDrop::quantity), Some(1));
    }

    #[test]
    fn test_bob_phase_wraps_and_offset_bounded() {
        let mut drops = registry();
        drops.create_drop(Vec2::ZERO, ItemKind::Crop(CropType::Carrot), 1);
        for _ in 0..500 {
            drops.update(0.37);
        }
        let amplitude = drops.config().bob_amplitude;
        for drop in drops.drops() {
            assert!((0.0..TAU).contains(&drop.bob_phase()));
            assert!(drop.bob_offset(amplitude).abs() <= amplitude);
        }
    }

    #[test]
    fn test_phases_differ_between_drops() {
        let mut drops = registry();
        for _ in 0..8 {
            drops.create_drop(Vec2::ZERO, ItemKind::Wood, 1);
        }
        let first = drops.drops().next().map(ItemDrop::bob_phase);
        assert!(drops.drops().any(|d| Some(d.bob_phase()) != first));
    }

    #[test]
    fn test_pickup_radius_is_strict() {
        let mut drops = registry();
        let near = drops.create_drop(Vec2::new(5.0, 0.0), ItemKind::Wood, 1);
        drops.create_drop(Vec2::new(10.0, 0.0), ItemKind::Wood, 1);

        let picked = drops.check_pickup(Vec2::ZERO, 10.0);
        assert_eq!(picked.len(), 1);
        assert_eq!(picked[0].id(), near);
        assert_eq!(drops.len(), 1, "drop exactly at the radius stays");
    }

    #[test]
    fn test_no_double_pickup() {
        let mut drops = registry();
        drops.create_drop(Vec2::new(1.0, 1.0), ItemKind::Seed(CropType::Wheat), 2);

        assert_eq!(drops.check_pickup(Vec2::ZERO, 8.0).len(), 1);
        assert!(drops.check_pickup(Vec2::ZERO, 8.0).is_empty());
        assert!(drops.is_empty());
    }

    #[test]
    fn test_cap_evicts_oldest() {
        let config = DropConfig {
            max_drops: Some(2),
            ..DropConfig::default()
        };
        let mut drops = ItemDropRegistry::with_rng(config, fastrand::Rng::with_seed(1));
        let first = drops.create_drop(Vec2::ZERO, ItemKind::Wood, 1);
        let second = drops.create_drop(Vec2::ZERO, ItemKind::Wood, 1);
        let third = drops.create_drop(Vec2::ZERO, ItemKind::Wood, 1);

        assert_eq!(drops.len(), 2);
        assert!(drops.get(first).is_none());
        assert!(drops.get(second).is_some());
        assert!(drops.get(third).is_some());
    }

    #[test]
    fn test_views_match_drops() {
        let mut drops = registry();
        drops.create_drop(Vec2::new(3.0, 4.0), ItemKind::Crop(CropType::Pumpkin), 1);
        let views = drops.views();
        assert_eq!(views.len(), 1);
        assert_eq!(views[0].position, Vec2::new(3.0, 4.0));
        assert_eq!(views[0].item, ItemKind::Crop(CropType::Pumpkin));
    }

    proptest! {
        #[test]
        fn prop_pickup_never_returns_a_drop_twice(
            positions in proptest::collection::vec((-100.0f32..100.0, -100.0f32..100.0), 1..30),
            actors in proptest::collection::vec((-100.0f32..100.0, -100.0f32..100.0, 0.0f32..80.0), 1..20),
        ) {
            let mut drops = registry();
            for (x, y) in &positions {
                drops.create_drop(Vec2::new(*x, *y), ItemKind::Wood, 1);
            }

            let mut seen = std::collections::HashSet::new();
            for (x, y, radius) in actors {
                let actor = Vec2::new(x, y);
                for drop in drops.check_pickup(actor, radius) {
                    prop_assert!(drop.position().distance(actor) < radius);
                    prop_assert!(seen.insert(drop.id()));
                }
            }
            prop_assert_eq!(seen.len() + drops.len(), positions.len());
        }
    }
}
