use tracing::debug;

use super::collision::{BoxSize, CollisionSystem};
use super::math::Vec3;
use super::transform::{EntityId, TransformStore};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PushableTuning {
    /// Per-update velocity multiplier. Not normalized by the frame delta.
    pub friction: f32,
    pub push_force: f32,
    pub max_speed: f32,
    /// Speeds at or below this are treated as resting and skip integration.
    pub rest_epsilon: f32,
}

impl Default for PushableTuning {
    fn default() -> Self {
        Self {
            friction: 0.9,
            push_force: 15.0,
            max_speed: 10.0,
            rest_epsilon: 0.01,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushableStep {
    Resting,
    Moved,
    Blocked,
}

/// Friction-damped body displaced by player contact. Its position lives in the
/// owner's transform; the body itself only carries velocity and mass.
#[derive(Debug, Clone)]
pub struct PushableBody {
    owner: EntityId,
    size: BoxSize,
    mass: f32,
    velocity: Vec3,
    tuning: PushableTuning,
}

impl PushableBody {
    pub fn new(owner: EntityId, size: BoxSize, mass: f32, tuning: PushableTuning) -> Self {
        debug_assert!(mass > 0.0, "pushable mass must be positive");
        Self {
            owner,
            size,
            mass,
            velocity: Vec3::ZERO,
            tuning,
        }
    }

    pub fn owner(&self) -> EntityId {
        self.owner
    }

    pub fn size(&self) -> BoxSize {
        self.size
    }

    pub fn mass(&self) -> f32 {
        self.mass
    }

    pub fn velocity(&self) -> Vec3 {
        self.velocity
    }

    pub fn push(&mut self, direction: Vec3, force_multiplier: f32) {
        let impulse = direction.with_length(self.tuning.push_force * force_multiplier / self.mass);
        self.velocity += impulse;
        if self.velocity.length() > self.tuning.max_speed {
            self.velocity = self.velocity.with_length(self.tuning.max_speed);
        }
        debug!(
            owner = self.owner.0,
            speed = self.velocity.length(),
            "pushable_pushed"
        );
    }

    /// Applies friction, then moves the owner by `velocity * dt` unless the
    /// destination collides, in which case the body stops dead.
    pub fn update(
        &mut self,
        dt_seconds: f32,
        collisions: &CollisionSystem,
        transforms: &mut TransformStore,
    ) -> PushableStep {
        self.velocity = self.velocity * self.tuning.friction;
        if self.velocity.length() <= self.tuning.rest_epsilon {
            return PushableStep::Resting;
        }
        let Some(position) = transforms.position(self.owner) else {
            return PushableStep::Resting;
        };

        let candidate = position + self.velocity * dt_seconds;
        let hit = collisions.check_collision_excluding(
            &*transforms,
            candidate,
            self.size,
            Some(self.owner),
        );
        if hit.is_collision() {
            debug!(owner = self.owner.0, blocker = ?hit.name(), "pushable_blocked");
            self.velocity = Vec3::ZERO;
            PushableStep::Blocked
        } else {
            transforms.set_position(self.owner, candidate);
            PushableStep::Moved
        }
    }

    /// Coarse circle contact on the ground plane, used only to decide when the
    /// player is pushing this body.
    pub fn check_player_collision(
        &self,
        transforms: &TransformStore,
        player_position: Vec3,
        player_size: BoxSize,
    ) -> bool {
        let Some(position) = transforms.position(self.owner) else {
            return false;
        };
        let contact_distance = (player_size.width + self.size.width) * 0.5;
        position.ground_distance(player_position) < contact_distance
    }

    /// Whether the body, nudged `probe_distance` along `direction`, would hit
    /// anything other than itself.
    pub fn is_blocked_ahead(
        &self,
        collisions: &CollisionSystem,
        transforms: &TransformStore,
        direction: Vec3,
        probe_distance: f32,
    ) -> bool {
        let Some(position) = transforms.position(self.owner) else {
            return false;
        };
        let probe = position + direction.with_length(probe_distance);
        collisions
            .check_collision_excluding(transforms, probe, self.size, Some(self.owner))
            .is_collision()
    }
}
