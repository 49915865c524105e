//! Scripted controller that plays the game in headless runs.
//!
//! Works the tiles around it: tills, plants, waters and harvests, chops any
//! tree in front of it, and walks over to nearby drops to collect them.

use furrow_common::{Clock, CropType};
use furrow_gameplay::{Simulation, Target, TickInput, Tool};
use furrow_world::{Tile, WorldQuery};

/// Distance within which the farmhand goes after drops.
const SEEK_RADIUS: f32 = 80.0;

/// Picks the input for each tick.
#[derive(Debug, Default)]
pub struct Farmhand {
    next_crop: usize,
}

impl Farmhand {
    /// Create a farmhand that starts planting carrots.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Decide what to do next.
    pub fn plan<C: Clock>(&mut self, sim: &Simulation<C>) -> TickInput {
        let actor = sim.actor();
        let position = actor.position();

        let nearest_drop = sim
            .drops()
            .drops()
            .map(|drop| drop.position())
            .filter(|pos| pos.distance(position) <= SEEK_RADIUS)
            .min_by(|a, b| a.distance_squared(position).total_cmp(&b.distance_squared(position)));
        if let Some(drop) = nearest_drop {
            return TickInput::moving(drop - position);
        }

        if sim.resolver().cooldown_remaining(sim.last_tick()).is_some() {
            return TickInput::idle();
        }

        let target = sim.resolver().facing_target(actor, sim.world().tile_size());
        let tool = match sim.world().tile_at(target) {
            Some(Tile::Grass | Tile::Dirt) => Some(Tool::Hoe),
            Some(Tile::Tilled(_)) => Some(Tool::Seeds(self.take_crop())),
            Some(Tile::Planted(crop)) if crop.is_mature() => Some(Tool::Sickle),
            Some(Tile::Planted(crop)) if !crop.is_watered() => Some(Tool::WateringCan),
            Some(Tile::Tree { .. } | Tile::Stump) => Some(Tool::Axe),
            Some(Tile::Planted(_) | Tile::Stone | Tile::Water) | None => None,
        };

        match tool {
            Some(tool) => TickInput::idle().with_action(tool, Target::Facing),
            None => TickInput::turning(actor.facing().clockwise()),
        }
    }

    /// Rotates through every crop type.
    fn take_crop(&mut self) -> CropType {
        let crop = CropType::ALL[self.next_crop % CropType::ALL.len()];
        self.next_crop += 1;
        crop
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use furrow_common::ManualClock;
    use furrow_gameplay::{SimulationConfig, TileEffect};
    use furrow_world::{TileKind, WorldGrid};

    fn sim(rows: &[&str]) -> Simulation<ManualClock> {
        let world = WorldGrid::from_layout(32.0, rows).expect("valid layout");
        Simulation::from_world(world, SimulationConfig::default(), ManualClock::new())
    }

    #[test]
    fn test_first_action_is_hoe() {
        let mut sim = sim(&["...", "...", "..."]);
        let mut farmhand = Farmhand::new();
        let input = farmhand.plan(&sim);
        assert_eq!(input.actions.len(), 1);
        assert_eq!(input.actions[0].tool, Tool::Hoe);

        let report = sim.tick(&input);
        assert_eq!(report.successful_actions(), 1);
    }

    #[test]
    fn test_turns_away_from_water() {
        let sim = sim(&["...", "...", "~~~"]);
        let mut farmhand = Farmhand::new();
        let input = farmhand.plan(&sim);
        assert!(input.actions.is_empty());
        assert_eq!(input.face, Some(sim.actor().facing().clockwise()));
    }

    #[test]
    fn test_crops_rotate() {
        let mut farmhand = Farmhand::new();
        let crops: Vec<CropType> = (0..5).map(|_| farmhand.take_crop()).collect();
        assert_eq!(crops[0], CropType::ALL[0]);
        assert_eq!(crops[4], CropType::ALL[0]);
    }

    #[test]
    fn test_tends_plot_until_harvest() {
        let mut sim = sim(&[".....", ".....", ".....", ".....", "....."]);
        let mut farmhand = Farmhand::new();
        let mut harvests = 0;

        // Short ticks keep each walking step shorter than the pickup
        // diameter, so a drop is never stepped over twice.
        for _ in 0..400 {
            sim.clock_mut().advance_secs(0.25);
            let input = farmhand.plan(&sim);
            let report = sim.tick(&input);
            harvests += report
                .interactions
                .iter()
                .filter(|r| matches!(r, Ok(o) if matches!(o.effect, TileEffect::Harvested(_))))
                .count();
        }

        assert!(harvests >= 1);
        assert!(!sim.world().is_solid(sim.actor().position()));
        assert!(sim.world().count(|t| t.kind() != TileKind::Grass) > 0);
    }
}
