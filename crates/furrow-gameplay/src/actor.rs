//! The controllable actor: position, facing and collision-aware movement.

use furrow_common::{EntityId, Vec2};
use furrow_world::WorldQuery;
use serde::{Deserialize, Serialize};

/// Direction the actor is facing.
///
/// Screen coordinates: `y` grows downwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Direction {
    /// Facing up
    Up,
    /// Facing down (default)
    #[default]
    Down,
    /// Facing left
    Left,
    /// Facing right
    Right,
}

impl Direction {
    /// Convert direction to a unit vector.
    #[must_use]
    pub fn to_vec2(self) -> Vec2 {
        match self {
            Direction::Up => Vec2::new(0.0, -1.0),
            Direction::Down => Vec2::new(0.0, 1.0),
            Direction::Left => Vec2::new(-1.0, 0.0),
            Direction::Right => Vec2::new(1.0, 0.0),
        }
    }

    /// Angle of the direction in radians, measured like `atan2(y, x)`.
    #[must_use]
    pub fn angle(self) -> f32 {
        let v = self.to_vec2();
        v.y.atan2(v.x)
    }

    /// The next direction clockwise on screen.
    #[must_use]
    pub fn clockwise(self) -> Self {
        match self {
            Direction::Up => Direction::Right,
            Direction::Right => Direction::Down,
            Direction::Down => Direction::Left,
            Direction::Left => Direction::Up,
        }
    }

    /// Create direction from a movement vector.
    ///
    /// The axis with the larger magnitude wins; ties go to the vertical axis.
    #[must_use]
    pub fn from_vec2(v: Vec2) -> Option<Self> {
        if v.x == 0.0 && v.y == 0.0 {
            return None;
        }

        if v.x.abs() > v.y.abs() {
            if v.x > 0.0 {
                Some(Direction::Right)
            } else {
                Some(Direction::Left)
            }
        } else if v.y > 0.0 {
            Some(Direction::Down)
        } else {
            Some(Direction::Up)
        }
    }
}

/// Actor movement configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ActorConfig {
    /// Walking speed in world pixels per second
    pub speed: f32,
    /// Half the edge of the square collision box
    pub half_extent: f32,
}

impl Default for ActorConfig {
    fn default() -> Self {
        Self {
            speed: 120.0,
            half_extent: 10.0,
        }
    }
}

impl ActorConfig {
    /// Validate and clamp values to sensible ranges.
    pub fn validate(&mut self) {
        self.speed = self.speed.clamp(1.0, 2000.0);
        self.half_extent = self.half_extent.clamp(0.5, 256.0);
    }
}

/// The player-controlled actor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Actor {
    entity_id: EntityId,
    position: Vec2,
    facing: Direction,
    config: ActorConfig,
}

impl Actor {
    /// Create a new actor at the given position, facing down.
    #[must_use]
    pub fn new(position: Vec2) -> Self {
        Self::with_config(position, ActorConfig::default())
    }

    /// Create a new actor with custom configuration.
    #[must_use]
    pub fn with_config(position: Vec2, config: ActorConfig) -> Self {
        Self {
            entity_id: EntityId::new(),
            position,
            facing: Direction::Down,
            config,
        }
    }

    /// Get the actor's entity ID.
    #[must_use]
    pub fn entity_id(&self) -> EntityId {
        self.entity_id
    }

    /// Get the actor's current position.
    #[must_use]
    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Set the actor's position directly.
    pub fn set_position(&mut self, position: Vec2) {
        self.position = position;
    }

    /// Get the direction the actor is facing.
    #[must_use]
    pub fn facing(&self) -> Direction {
        self.facing
    }

    /// Set the facing direction directly.
    pub fn set_facing(&mut self, facing: Direction) {
        self.facing = facing;
    }

    /// Get the actor's configuration.
    #[must_use]
    pub fn config(&self) -> &ActorConfig {
        &self.config
    }

    /// Moves along `movement` for `dt` seconds.
    ///
    /// Facing follows the last nonzero movement vector even when the move is
    /// blocked. Each axis is resolved separately, so the actor slides along
    /// walls. Long moves are split into sub-steps no longer than the
    /// collision half-extent so a late tick cannot tunnel through a tile.
    /// Returns whether the position changed.
    pub fn step<W: WorldQuery>(&mut self, movement: Vec2, dt: f32, world: &W) -> bool {
        let Some(facing) = Direction::from_vec2(movement) else {
            return false;
        };
        self.facing = facing;

        let velocity = movement.normalize_or_zero() * self.config.speed * dt.max(0.0);
        let max_step = self.config.half_extent.max(1.0);
        let steps = (velocity.length() / max_step).ceil().max(1.0) as u32;
        let delta = velocity / steps as f32;
        let start = self.position;

        for _ in 0..steps {
            let along_x = Vec2::new(self.position.x + delta.x, self.position.y);
            if !self.overlaps_solid(along_x, world) {
                self.position = along_x;
            }
            let along_y = Vec2::new(self.position.x, self.position.y + delta.y);
            if !self.overlaps_solid(along_y, world) {
                self.position = along_y;
            }
        }

        self.position != start
    }

    /// Whether the collision box centered at `center` touches a solid tile.
    fn overlaps_solid<W: WorldQuery>(&self, center: Vec2, world: &W) -> bool {
        // Shrink slightly so a box resting exactly on a tile edge does not
        // count as overlapping the neighbour.
        let h = self.config.half_extent - 0.01;
        [
            Vec2::new(center.x - h, center.y - h),
            Vec2::new(center.x + h, center.y - h),
            Vec2::new(center.x - h, center.y + h),
            Vec2::new(center.x + h, center.y + h),
        ]
        .into_iter()
        .any(|corner| world.is_solid(corner))
    }
}
