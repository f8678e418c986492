//! Axis-aligned box collision against static boundaries and owner-bound colliders.
//!
//! Queries are a linear scan over boundaries then colliders. Collider counts in a
//! loaded world are in the tens, so no broad phase is kept.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::math::Vec3;
use super::transform::EntityId;

/// Box extents. Components must be non-negative; a box with any zero
/// component never collides.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BoxSize {
    pub width: f32,
    pub height: f32,
    pub depth: f32,
}

impl BoxSize {
    pub const ZERO: Self = Self {
        width: 0.0,
        height: 0.0,
        depth: 0.0,
    };

    pub const fn new(width: f32, height: f32, depth: f32) -> Self {
        Self {
            width,
            height,
            depth,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0 || self.depth <= 0.0
    }

    pub fn half_extents(&self) -> Vec3 {
        Vec3::new(self.width * 0.5, self.height * 0.5, self.depth * 0.5)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn from_center_size(center: Vec3, size: BoxSize) -> Self {
        debug_assert!(
            size.width >= 0.0 && size.height >= 0.0 && size.depth >= 0.0,
            "box size must be non-negative"
        );
        let half = size.half_extents();
        Self {
            min: center - half,
            max: center + half,
        }
    }

    pub fn from_corners(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> BoxSize {
        BoxSize::new(
            self.max.x - self.min.x,
            self.max.y - self.min.y,
            self.max.z - self.min.z,
        )
    }

    /// Strict overlap on all three axes. Boxes sharing only a face do not
    /// intersect, so an entity can stand flush against a wall.
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
            && self.min.z < other.max.z
            && self.max.z > other.min.z
    }
}

/// Immutable named region fencing the playable world.
#[derive(Debug, Clone, PartialEq)]
pub struct Boundary {
    pub name: String,
    pub aabb: Aabb,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColliderId(u64);

/// Fixed-size footprint bound to an owner entity. Holds no position: the box is
/// centered on the owner's live position at query time.
#[derive(Debug, Clone, PartialEq)]
pub struct Collider {
    pub id: ColliderId,
    pub owner: EntityId,
    pub size: BoxSize,
    pub name: String,
}

impl Collider {
    pub fn aabb_at(&self, owner_position: Vec3) -> Aabb {
        Aabb::from_center_size(owner_position, self.size)
    }
}

/// Resolves collider owners to their current positions.
pub trait PositionSource {
    fn position_of(&self, owner: EntityId) -> Option<Vec3>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionKind {
    Boundary,
    Collider,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CollisionHit<'a> {
    None,
    Boundary(&'a Boundary),
    Collider(&'a Collider),
}

impl CollisionHit<'_> {
    pub fn is_collision(&self) -> bool {
        !matches!(self, CollisionHit::None)
    }

    pub fn kind(&self) -> Option<CollisionKind> {
        match self {
            CollisionHit::None => None,
            CollisionHit::Boundary(_) => Some(CollisionKind::Boundary),
            CollisionHit::Collider(_) => Some(CollisionKind::Collider),
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            CollisionHit::None => None,
            CollisionHit::Boundary(boundary) => Some(boundary.name.as_str()),
            CollisionHit::Collider(collider) => Some(collider.name.as_str()),
        }
    }
}

#[derive(Debug, Default)]
pub struct CollisionSystem {
    boundaries: Vec<Boundary>,
    colliders: Vec<Collider>,
    next_collider_id: u64,
}

impl CollisionSystem {
    /// Registers a static region. Overlapping and duplicate boundaries are all checked.
    pub fn add_boundary(&mut self, min: Vec3, max: Vec3, name: impl Into<String>) -> &Boundary {
        let name = name.into();
        debug!(boundary = %name, ?min, ?max, "boundary_added");
        self.boundaries.push(Boundary {
            name,
            aabb: Aabb::from_corners(min, max),
        });
        &self.boundaries[self.boundaries.len() - 1]
    }

    pub fn add_collider(
        &mut self,
        owner: EntityId,
        size: BoxSize,
        name: impl Into<String>,
    ) -> ColliderId {
        let id = ColliderId(self.next_collider_id);
        self.next_collider_id = self.next_collider_id.saturating_add(1);
        let name = name.into();
        debug!(collider = %name, owner = owner.0, ?size, "collider_added");
        self.colliders.push(Collider {
            id,
            owner,
            size,
            name,
        });
        id
    }

    /// Returns whether the collider was present. Removing twice is a no-op.
    pub fn remove_collider(&mut self, id: ColliderId) -> bool {
        let Some(index) = self.colliders.iter().position(|collider| collider.id == id) else {
            return false;
        };
        let removed = self.colliders.remove(index);
        debug!(collider = %removed.name, "collider_removed");
        true
    }

    pub fn check_collision<'a>(
        &'a self,
        positions: &impl PositionSource,
        position: Vec3,
        size: BoxSize,
    ) -> CollisionHit<'a> {
        self.check_collision_excluding(positions, position, size, None)
    }

    /// Same as [`check_collision`](Self::check_collision) but skips colliders
    /// owned by `excluded_owner`, so a moving body does not hit its own footprint.
    pub fn check_collision_excluding<'a>(
        &'a self,
        positions: &impl PositionSource,
        position: Vec3,
        size: BoxSize,
        excluded_owner: Option<EntityId>,
    ) -> CollisionHit<'a> {
        if size.is_empty() {
            return CollisionHit::None;
        }
        let query = Aabb::from_center_size(position, size);

        if let Some(boundary) = self
            .boundaries
            .iter()
            .find(|boundary| query.intersects(&boundary.aabb))
        {
            return CollisionHit::Boundary(boundary);
        }

        for collider in &self.colliders {
            if Some(collider.owner) == excluded_owner || collider.size.is_empty() {
                continue;
            }
            let Some(owner_position) = positions.position_of(collider.owner) else {
                continue;
            };
            if query.intersects(&collider.aabb_at(owner_position)) {
                return CollisionHit::Collider(collider);
            }
        }

        CollisionHit::None
    }

    pub fn boundaries(&self) -> &[Boundary] {
        &self.boundaries
    }

    pub fn colliders(&self) -> &[Collider] {
        &self.colliders
    }

    pub fn collider(&self, id: ColliderId) -> Option<&Collider> {
        self.colliders.iter().find(|collider| collider.id == id)
    }

    pub fn clear(&mut self) {
        self.boundaries.clear();
        self.colliders.clear();
    }
}
