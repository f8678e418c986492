use engine::content::{AreaKind, ContentCard, PropKind, PropRole, WorldLayout};
use engine::{
    Aabb, BoxSize, CollisionSystem, EntityId, PushableBody, PushableTuning, Transform,
    TransformStore, Vec3,
};
use tracing::{debug, info};

use super::destructible::{DestructibleEntity, DestructibleSet};
use super::events::{TimedEvent, UiEvent};
use super::timers::TimerQueue;

pub(crate) const DEFAULT_AREA_DESCRIPTION: &str = "Explore and discover new adventures";
pub(crate) const INTERACTIVE_RANGE: f32 = 6.0;
const AREA_FADE_SECONDS: f32 = 3.0;
const AREA_RESET_SECONDS: f32 = 0.5;

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Zone {
    pub(crate) name: String,
    pub(crate) kind: AreaKind,
    pub(crate) center: Vec3,
    pub(crate) radius: f32,
    pub(crate) description: String,
}

impl Zone {
    pub(crate) fn contains(&self, position: Vec3) -> bool {
        self.center.ground_distance(position) < self.radius
    }
}

/// Signpost clearing leading to another area. The footprint is tested
/// radially against its larger extent.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct AreaTransition {
    pub(crate) name: String,
    pub(crate) kind: AreaKind,
    pub(crate) center: Vec3,
    pub(crate) width: f32,
    pub(crate) depth: f32,
}

impl AreaTransition {
    pub(crate) fn trigger_radius(&self) -> f32 {
        self.width.max(self.depth) * 0.5
    }

    pub(crate) fn contains(&self, position: Vec3) -> bool {
        self.center.ground_distance(position) < self.trigger_radius()
    }
}

/// Prop that shows a content card while the player stands nearby.
#[derive(Debug, Clone)]
pub(crate) struct InteractiveElement {
    entity: EntityId,
    kind: PropKind,
    content: ContentCard,
    range: f32,
    active: bool,
}

impl InteractiveElement {
    pub(crate) fn new(entity: EntityId, kind: PropKind, content: ContentCard) -> Self {
        Self {
            entity,
            kind,
            content,
            range: INTERACTIVE_RANGE,
            active: false,
        }
    }

    pub(crate) fn entity(&self) -> EntityId {
        self.entity
    }

    pub(crate) fn kind(&self) -> PropKind {
        self.kind
    }

    pub(crate) fn content(&self) -> &ContentCard {
        &self.content
    }

    pub(crate) fn is_active(&self) -> bool {
        self.active
    }

    /// Emits only on entering or leaving range.
    pub(crate) fn update(
        &mut self,
        transforms: &TransformStore,
        player_position: Vec3,
    ) -> Option<UiEvent> {
        let in_range = transforms
            .position(self.entity)
            .is_some_and(|position| position.ground_distance(player_position) < self.range);
        if in_range == self.active {
            return None;
        }
        self.active = in_range;
        if in_range {
            debug!(title = %self.content.title, "content_shown");
            Some(UiEvent::ContentShown(self.content.clone()))
        } else {
            debug!(title = %self.content.title, "content_hidden");
            Some(UiEvent::ContentHidden {
                title: self.content.title.clone(),
            })
        }
    }
}

/// Decorative or blocking prop with no behavior of its own.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct StaticProp {
    pub(crate) entity: EntityId,
    pub(crate) kind: PropKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TouchEffect {
    Hurt,
    Heal,
}

/// Walk-through prop that acts on the player while their boxes overlap.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct TouchProp {
    pub(crate) entity: EntityId,
    pub(crate) kind: PropKind,
    pub(crate) effect: TouchEffect,
    size: BoxSize,
}

impl TouchProp {
    fn overlaps(&self, transforms: &TransformStore, footprint: &Aabb) -> bool {
        transforms.position(self.entity).is_some_and(|position| {
            Aabb::from_center_size(position, self.size).intersects(footprint)
        })
    }
}

/// Everything placed from one world layout.
#[derive(Debug, Default)]
pub(crate) struct World {
    zones: Vec<Zone>,
    transitions: Vec<AreaTransition>,
    statics: Vec<StaticProp>,
    destructibles: DestructibleSet,
    pushables: Vec<PushableBody>,
    /// Prop kind of each pushable, index-aligned with `pushables`.
    pushable_kinds: Vec<PropKind>,
    interactives: Vec<InteractiveElement>,
    touch_props: Vec<TouchProp>,
}

impl World {
    /// Registers walls, boundaries and prop colliders, and spawns every prop.
    pub(crate) fn build(
        layout: &WorldLayout,
        collisions: &mut CollisionSystem,
        transforms: &mut TransformStore,
        pushable_tuning: PushableTuning,
    ) -> Self {
        let mut world = Self::default();

        for (name, min, max) in layout.arena.walls() {
            collisions.add_boundary(min, max, name);
        }
        for boundary in &layout.boundaries {
            collisions.add_boundary(boundary.min, boundary.max, boundary.name.clone());
        }

        world.zones = layout
            .zones
            .iter()
            .map(|zone| Zone {
                name: zone.name.clone(),
                kind: zone.kind,
                center: Vec3::ground(zone.x, zone.z),
                radius: zone.radius,
                description: zone
                    .description
                    .clone()
                    .unwrap_or_else(|| DEFAULT_AREA_DESCRIPTION.to_string()),
            })
            .collect();
        world.transitions = layout
            .transitions
            .iter()
            .map(|transition| AreaTransition {
                name: transition.name.clone(),
                kind: transition.kind,
                center: Vec3::ground(transition.x, transition.z),
                width: transition.width,
                depth: transition.depth,
            })
            .collect();

        for prop in layout.resolve_props() {
            let entity = transforms.spawn(Transform::at(prop.position));
            let descriptor = prop.kind.descriptor();
            let collider = descriptor
                .has_collision()
                .then(|| collisions.add_collider(entity, descriptor.collision_size, prop.kind.name()));

            match descriptor.role {
                PropRole::Destructible => {
                    world
                        .destructibles
                        .push(DestructibleEntity::new(entity, prop.kind, collider));
                }
                PropRole::Pushable => {
                    world.pushables.push(PushableBody::new(
                        entity,
                        descriptor.collision_size,
                        descriptor.pushable_mass.unwrap_or(1.0),
                        pushable_tuning,
                    ));
                    world.pushable_kinds.push(prop.kind);
                }
                PropRole::Interactive => {
                    let content = prop.content.unwrap_or_else(|| ContentCard {
                        title: prop.kind.name().to_string(),
                        description: String::new(),
                        details: String::new(),
                    });
                    world
                        .interactives
                        .push(InteractiveElement::new(entity, prop.kind, content));
                }
                PropRole::Hazard | PropRole::Restorative => {
                    let effect = if descriptor.role == PropRole::Hazard {
                        TouchEffect::Hurt
                    } else {
                        TouchEffect::Heal
                    };
                    world.touch_props.push(TouchProp {
                        entity,
                        kind: prop.kind,
                        effect,
                        size: descriptor.touch_size,
                    });
                }
                PropRole::Static => world.statics.push(StaticProp {
                    entity,
                    kind: prop.kind,
                }),
            }
        }

        info!(
            zones = world.zones.len(),
            transitions = world.transitions.len(),
            destructibles = world.destructibles.len(),
            pushables = world.pushables.len(),
            interactives = world.interactives.len(),
            touch_props = world.touch_props.len(),
            statics = world.statics.len(),
            colliders = collisions.colliders().len(),
            "world_built"
        );
        world
    }

    /// First zone in registration order whose radius covers the position.
    pub(crate) fn current_zone(&self, position: Vec3) -> Option<&Zone> {
        self.zones.iter().find(|zone| zone.contains(position))
    }

    pub(crate) fn check_transition(&self, position: Vec3) -> Option<&AreaTransition> {
        self.transition_index_at(position)
            .and_then(|index| self.transitions.get(index))
    }

    fn transition_index_at(&self, position: Vec3) -> Option<usize> {
        self.transitions
            .iter()
            .position(|transition| transition.contains(position))
    }

    pub(crate) fn zones(&self) -> &[Zone] {
        &self.zones
    }

    pub(crate) fn transitions(&self) -> &[AreaTransition] {
        &self.transitions
    }

    pub(crate) fn statics(&self) -> &[StaticProp] {
        &self.statics
    }

    pub(crate) fn destructibles(&self) -> &DestructibleSet {
        &self.destructibles
    }

    /// Destructibles still standing.
    #[cfg(test)]
    pub(crate) fn active_destructibles(&self) -> Vec<&DestructibleEntity> {
        self.destructibles.active().collect()
    }

    #[cfg(test)]
    pub(crate) fn pushables(&self) -> &[PushableBody] {
        &self.pushables
    }

    pub(crate) fn pushables_with_kind(&self) -> impl Iterator<Item = (&PushableBody, PropKind)> {
        self.pushables
            .iter()
            .zip(self.pushable_kinds.iter().copied())
    }

    pub(crate) fn interactives(&self) -> &[InteractiveElement] {
        &self.interactives
    }

    pub(crate) fn touch_props(&self) -> &[TouchProp] {
        &self.touch_props
    }

    /// Whether any prop with `effect` overlaps the footprint.
    pub(crate) fn touching(
        &self,
        transforms: &TransformStore,
        footprint: &Aabb,
        effect: TouchEffect,
    ) -> bool {
        self.touch_props
            .iter()
            .filter(|prop| prop.effect == effect)
            .any(|prop| prop.overlaps(transforms, footprint))
    }

    /// Split borrows for a player update.
    pub(crate) fn actors_mut(&mut self) -> (&mut [PushableBody], &mut DestructibleSet) {
        (&mut self.pushables, &mut self.destructibles)
    }

    pub(crate) fn pushables_mut(&mut self) -> &mut [PushableBody] {
        &mut self.pushables
    }

    pub(crate) fn update_interactives(
        &mut self,
        transforms: &TransformStore,
        player_position: Vec3,
    ) -> Vec<UiEvent> {
        self.interactives
            .iter_mut()
            .filter_map(|element| element.update(transforms, player_position))
            .collect()
    }
}

/// Area-enter banner state. The same area is not announced again until its
/// banner has faded and the reset delay has passed.
#[derive(Debug, Default)]
pub(crate) struct AreaNotifier {
    last_shown: Option<String>,
    showing: bool,
    generation: u64,
}

impl AreaNotifier {
    pub(crate) fn observe(
        &mut self,
        zone: Option<&Zone>,
        timers: &mut TimerQueue<TimedEvent>,
    ) -> Option<UiEvent> {
        let zone = zone?;
        if self.last_shown.as_deref() == Some(zone.name.as_str()) {
            return None;
        }
        self.generation += 1;
        self.last_shown = Some(zone.name.clone());
        self.showing = true;
        timers.schedule(
            AREA_FADE_SECONDS,
            TimedEvent::AreaFade {
                generation: self.generation,
            },
        );
        info!(area = %zone.name, "area_entered");
        Some(UiEvent::AreaEntered {
            name: zone.name.clone(),
            description: zone.description.clone(),
        })
    }

    /// Handles a fade or reset timer. Timers from a superseded banner are
    /// ignored.
    pub(crate) fn on_timer(
        &mut self,
        event: TimedEvent,
        timers: &mut TimerQueue<TimedEvent>,
    ) -> Option<UiEvent> {
        match event {
            TimedEvent::AreaFade { generation } if generation == self.generation => {
                if !self.showing {
                    return None;
                }
                self.showing = false;
                timers.schedule(AREA_RESET_SECONDS, TimedEvent::AreaReset { generation });
                debug!("area_banner_faded");
                Some(UiEvent::AreaFaded)
            }
            TimedEvent::AreaReset { generation } if generation == self.generation => {
                self.last_shown = None;
                None
            }
            _ => None,
        }
    }

    /// Name on the banner while it is visible.
    pub(crate) fn banner(&self) -> Option<&str> {
        if self.showing {
            self.last_shown.as_deref()
        } else {
            None
        }
    }
}

/// Edge detection over transition regions plus the pending confirmation for
/// areas that ask before leaving.
#[derive(Debug, Default)]
pub(crate) struct TransitionTracker {
    inside: Option<usize>,
    pending: Option<usize>,
}

impl TransitionTracker {
    pub(crate) fn has_pending_confirmation(&self) -> bool {
        self.pending.is_some()
    }

    pub(crate) fn observe(&mut self, world: &World, position: Vec3) -> Vec<UiEvent> {
        let now_inside = world.transition_index_at(position);
        if now_inside == self.inside {
            return Vec::new();
        }
        let mut events = Vec::new();

        if let Some(pending) = self.pending.take() {
            if let Some(transition) = world.transitions.get(pending) {
                info!(transition = %transition.name, "transition_cancelled");
                events.push(UiEvent::TransitionCancelled {
                    name: transition.name.clone(),
                });
            }
        }

        self.inside = now_inside;
        if let Some(transition) = now_inside.and_then(|index| world.transitions.get(index)) {
            if transition.kind.requires_confirmation() {
                self.pending = now_inside;
                info!(transition = %transition.name, "transition_prompted");
                events.push(UiEvent::TransitionPrompt {
                    name: transition.name.clone(),
                });
            } else {
                info!(transition = %transition.name, kind = ?transition.kind, "transition_entered");
                events.push(UiEvent::TransitionEntered {
                    name: transition.name.clone(),
                    kind: transition.kind,
                });
            }
        }
        events
    }

    /// Resolves a pending prompt. Accepting wins when both inputs arrive in
    /// the same tick.
    pub(crate) fn resolve(&mut self, world: &World, accept: bool, decline: bool) -> Option<UiEvent> {
        let index = self.pending?;
        if !accept && !decline {
            return None;
        }
        self.pending = None;
        let transition = world.transitions.get(index)?;
        if accept {
            info!(transition = %transition.name, "transition_accepted");
            Some(UiEvent::TransitionAccepted {
                name: transition.name.clone(),
                kind: transition.kind,
            })
        } else {
            info!(transition = %transition.name, "transition_declined");
            Some(UiEvent::TransitionDeclined {
                name: transition.name.clone(),
            })
        }
    }
}
