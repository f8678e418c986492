use engine::content::{PropKind, PropRole};
use engine::{ColliderId, CollisionSystem, EntityId, TransformStore, Vec3};
use tracing::info;

use super::combat::ConeQuery;
use super::particles::ParticleSystem;

/// Base radius for the per-object sword test; the prop kind adds a bonus.
pub(crate) const SWORD_HIT_BASE_RADIUS: f32 = 3.0;

/// A prop that breaks when hit. Destruction is one-way.
#[derive(Debug, Clone)]
pub(crate) struct DestructibleEntity {
    entity: EntityId,
    kind: PropKind,
    collider: Option<ColliderId>,
    destroyed: bool,
}

/// What a successful [`DestructibleEntity::destroy`] left behind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct DestroyedProp {
    pub(crate) kind: PropKind,
    pub(crate) position: Vec3,
}

impl DestructibleEntity {
    pub(crate) fn new(entity: EntityId, kind: PropKind, collider: Option<ColliderId>) -> Self {
        debug_assert_eq!(kind.role(), PropRole::Destructible);
        Self {
            entity,
            kind,
            collider,
            destroyed: false,
        }
    }

    pub(crate) fn entity(&self) -> EntityId {
        self.entity
    }

    pub(crate) fn kind(&self) -> PropKind {
        self.kind
    }

    #[cfg(test)]
    pub(crate) fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    pub(crate) fn hit_radius(&self) -> f32 {
        SWORD_HIT_BASE_RADIUS + self.kind.descriptor().hit_radius_bonus
    }

    /// Per-object distance test for scenes without the cone attack.
    pub(crate) fn check_sword_hit(&self, transforms: &TransformStore, point: Vec3) -> bool {
        if self.destroyed {
            return false;
        }
        transforms
            .position(self.entity)
            .is_some_and(|position| position.ground_distance(point) < self.hit_radius())
    }

    /// Returns `None` when already destroyed, so a second hit spawns no debris
    /// and removes no collider.
    pub(crate) fn destroy(
        &mut self,
        collisions: &mut CollisionSystem,
        transforms: &TransformStore,
        particles: &mut ParticleSystem,
    ) -> Option<DestroyedProp> {
        if self.destroyed {
            return None;
        }
        self.destroyed = true;

        let position = transforms.position(self.entity).unwrap_or(Vec3::ZERO);
        particles.burst(position, self.kind);
        if let Some(collider) = self.collider.take() {
            collisions.remove_collider(collider);
        }
        info!(
            entity = self.entity.0,
            kind = self.kind.name(),
            x = position.x,
            z = position.z,
            "destructible_destroyed"
        );
        Some(DestroyedProp {
            kind: self.kind,
            position,
        })
    }
}

/// All destructibles of one loaded world, in placement order.
#[derive(Debug, Default)]
pub(crate) struct DestructibleSet {
    items: Vec<DestructibleEntity>,
}

impl DestructibleSet {
    pub(crate) fn push(&mut self, destructible: DestructibleEntity) {
        self.items.push(destructible);
    }

    #[cfg(test)]
    pub(crate) fn iter(&self) -> impl Iterator<Item = &DestructibleEntity> {
        self.items.iter()
    }

    /// Destructibles that can still be hit.
    pub(crate) fn active(&self) -> impl Iterator<Item = &DestructibleEntity> {
        self.items.iter().filter(|item| !item.destroyed)
    }

    pub(crate) fn active_count(&self) -> usize {
        self.active().count()
    }

    pub(crate) fn len(&self) -> usize {
        self.items.len()
    }

    #[cfg(test)]
    pub(crate) fn get_mut(&mut self, entity: EntityId) -> Option<&mut DestructibleEntity> {
        self.items.iter_mut().find(|item| item.entity == entity)
    }

    /// Destroys every live destructible inside the cone in one pass.
    pub(crate) fn destroy_in_cone(
        &mut self,
        cone: &ConeQuery,
        collisions: &mut CollisionSystem,
        transforms: &TransformStore,
        particles: &mut ParticleSystem,
    ) -> Vec<DestroyedProp> {
        let mut destroyed = Vec::new();
        for item in self.items.iter_mut().filter(|item| !item.destroyed) {
            let Some(position) = transforms.position(item.entity) else {
                continue;
            };
            if !cone.contains(position) {
                continue;
            }
            if let Some(prop) = item.destroy(collisions, transforms, particles) {
                destroyed.push(prop);
            }
        }
        destroyed
    }
}
