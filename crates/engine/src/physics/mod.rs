mod collision;
mod math;
mod pushable;
mod rng;
mod transform;

pub use collision::{
    Aabb, Boundary, BoxSize, Collider, ColliderId, CollisionHit, CollisionKind, CollisionSystem,
    PositionSource,
};
pub use math::{direction_from_yaw, yaw_from_direction, Vec2, Vec3};
pub use pushable::{PushableBody, PushableStep, PushableTuning};
pub use rng::SimpleRng;
pub use transform::{EntityId, EntityIdAllocator, Transform, TransformStore};
