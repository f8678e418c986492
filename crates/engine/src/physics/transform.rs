use std::collections::HashMap;

use super::collision::PositionSource;
use super::math::Vec3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub u64);

#[derive(Debug, Default)]
pub struct EntityIdAllocator {
    next: u64,
}

impl EntityIdAllocator {
    pub fn allocate(&mut self) -> EntityId {
        let id = EntityId(self.next);
        self.next = self.next.saturating_add(1);
        id
    }
}

/// Position and ground-plane yaw of a placed entity.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub yaw_radians: f32,
}

impl Transform {
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            yaw_radians: 0.0,
        }
    }
}

/// Live transforms of every placed entity. Colliders read owner positions
/// from here at query time, so moving an entity moves its collider.
#[derive(Debug, Default)]
pub struct TransformStore {
    allocator: EntityIdAllocator,
    transforms: HashMap<EntityId, Transform>,
}

impl TransformStore {
    pub fn spawn(&mut self, transform: Transform) -> EntityId {
        let id = self.allocator.allocate();
        self.transforms.insert(id, transform);
        id
    }

    pub fn despawn(&mut self, id: EntityId) -> bool {
        self.transforms.remove(&id).is_some()
    }

    pub fn get(&self, id: EntityId) -> Option<&Transform> {
        self.transforms.get(&id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Transform> {
        self.transforms.get_mut(&id)
    }

    pub fn position(&self, id: EntityId) -> Option<Vec3> {
        self.transforms.get(&id).map(|transform| transform.position)
    }

    pub fn set_position(&mut self, id: EntityId, position: Vec3) -> bool {
        match self.transforms.get_mut(&id) {
            Some(transform) => {
                transform.position = position;
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.transforms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transforms.is_empty()
    }

    pub fn clear(&mut self) {
        self.transforms.clear();
    }
}

impl PositionSource for TransformStore {
    fn position_of(&self, owner: EntityId) -> Option<Vec3> {
        self.position(owner)
    }
}
