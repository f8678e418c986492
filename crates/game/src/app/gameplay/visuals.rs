use engine::content::{AreaKind, PropKind};
use engine::{DrawRect, SceneWorld, Vec2, Vec3};

use super::simulation::Simulation;

const WALL_COLOR: [u8; 4] = [90, 84, 78, 255];
const ZONE_OUTLINE_COLOR: [u8; 4] = [70, 92, 70, 255];
const PLAYER_COLOR: [u8; 4] = [60, 120, 230, 255];
const PLAYER_DEAD_COLOR: [u8; 4] = [90, 90, 110, 255];
const WEAPON_COLOR: [u8; 4] = [200, 200, 210, 255];
const WEAPON_GLOW_COLOR: [u8; 4] = [255, 240, 140, 255];
const REACH_HIGHLIGHT_COLOR: [u8; 4] = [255, 255, 255, 255];
const WEAPON_HALF_EXTENT: f32 = 0.35;
const PARTICLE_HALF_EXTENT: f32 = 0.2;
/// Distance in front of the player where destructibles light up as "in reach".
const REACH_PROBE_DISTANCE: f32 = 2.0;

/// Presentation for one prop kind. Only the renderer reads this.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct PropVisual {
    pub(crate) color: [u8; 4],
    /// Half width (x) and half depth (z) on the ground.
    pub(crate) half_extents: Vec2,
    pub(crate) outline_only: bool,
}

pub(crate) fn prop_visual(kind: PropKind) -> PropVisual {
    let solid = |color: [u8; 4], width: f32, depth: f32| PropVisual {
        color,
        half_extents: Vec2::new(width * 0.5, depth * 0.5),
        outline_only: false,
    };
    match kind {
        PropKind::Grass => solid([88, 170, 72, 255], 1.0, 1.0),
        PropKind::Crate => solid([160, 110, 60, 255], 3.0, 3.0),
        PropKind::Log => solid([120, 80, 45, 255], 4.0, 1.2),
        PropKind::Rock => solid([128, 128, 128, 255], 2.0, 2.0),
        PropKind::Tree => solid([40, 110, 50, 255], 2.0, 2.0),
        PropKind::Boulder => solid([105, 100, 95, 255], 4.0, 4.0),
        PropKind::Bush => solid([55, 135, 60, 255], 2.5, 2.5),
        PropKind::FlowerPatch => PropVisual {
            outline_only: true,
            ..solid([230, 120, 170, 255], 1.5, 1.5)
        },
        PropKind::Signpost => solid([150, 120, 80, 255], 2.0, 2.0),
        PropKind::Building => solid([180, 160, 140, 255], 8.0, 8.0),
        PropKind::InfoFlower => solid([240, 90, 160, 255], 1.2, 1.2),
        PropKind::InfoRock => solid([150, 150, 175, 255], 1.2, 1.2),
        PropKind::InfoCrystal => solid([110, 210, 240, 255], 1.2, 1.2),
        PropKind::Thorns => solid([120, 40, 50, 255], 3.0, 3.0),
        PropKind::Spring => PropVisual {
            outline_only: true,
            ..solid([90, 190, 230, 255], 3.0, 3.0)
        },
    }
}

/// Banner strip tint for the area being announced.
pub(crate) fn area_color(kind: AreaKind) -> [u8; 4] {
    match kind {
        AreaKind::Hub => [220, 200, 120, 255],
        AreaKind::About => [120, 200, 120, 255],
        AreaKind::Experience => [120, 160, 230, 255],
        AreaKind::Projects => [190, 130, 230, 255],
        AreaKind::Danger => [220, 70, 60, 255],
    }
}

fn shade(color: [u8; 4], factor: f32) -> [u8; 4] {
    let factor = factor.clamp(0.0, 1.0);
    let scale = |channel: u8| (f32::from(channel) * factor).round() as u8;
    [scale(color[0]), scale(color[1]), scale(color[2]), color[3]]
}

fn rect_at(position: Vec3, half_extents: Vec2, color: [u8; 4], outline_only: bool) -> DrawRect {
    DrawRect {
        center: Vec2::new(position.x, position.z),
        half_extents,
        color,
        outline_only,
    }
}

fn prop_rect(position: Vec3, kind: PropKind) -> DrawRect {
    let visual = prop_visual(kind);
    rect_at(position, visual.half_extents, visual.color, visual.outline_only)
}

/// Rebuilds the draw list from simulation state, back to front.
pub(crate) fn build_draw_list(simulation: &Simulation, scene_world: &mut SceneWorld) {
    scene_world.begin_frame();
    let transforms = simulation.transforms();
    let world = simulation.world();

    for zone in world.zones() {
        scene_world.push_rect(rect_at(
            zone.center,
            Vec2::new(zone.radius, zone.radius),
            ZONE_OUTLINE_COLOR,
            true,
        ));
    }
    let player_position = simulation.player_position();
    let standing_in = world
        .check_transition(player_position)
        .map(|transition| transition.name.as_str());
    for transition in world.transitions() {
        scene_world.push_rect(rect_at(
            transition.center,
            Vec2::new(transition.width * 0.5, transition.depth * 0.5),
            area_color(transition.kind),
            standing_in != Some(transition.name.as_str()),
        ));
    }
    for boundary in simulation.collisions().boundaries() {
        let size = boundary.aabb.size();
        scene_world.push_rect(rect_at(
            boundary.aabb.center(),
            Vec2::new(size.width * 0.5, size.depth * 0.5),
            WALL_COLOR,
            false,
        ));
    }

    for prop in world.touch_props() {
        if let Some(position) = transforms.position(prop.entity) {
            scene_world.push_rect(prop_rect(position, prop.kind));
        }
    }
    for prop in world.statics() {
        if let Some(position) = transforms.position(prop.entity) {
            scene_world.push_rect(prop_rect(position, prop.kind));
        }
    }

    let player = simulation.player();
    let facing = player.facing(transforms);
    let reach_point = player_position + facing * REACH_PROBE_DISTANCE;
    for destructible in world.destructibles().active() {
        let Some(position) = transforms.position(destructible.entity()) else {
            continue;
        };
        scene_world.push_rect(prop_rect(position, destructible.kind()));
        if !player.is_dead() && destructible.check_sword_hit(transforms, reach_point) {
            let mut highlight = prop_rect(position, destructible.kind());
            highlight.color = REACH_HIGHLIGHT_COLOR;
            highlight.outline_only = true;
            scene_world.push_rect(highlight);
        }
    }
    for (body, kind) in world.pushables_with_kind() {
        if let Some(position) = transforms.position(body.owner()) {
            scene_world.push_rect(prop_rect(position, kind));
        }
    }
    for element in world.interactives() {
        if let Some(position) = transforms.position(element.entity()) {
            let mut rect = prop_rect(position, element.kind());
            if element.is_active() {
                rect.half_extents = Vec2::new(rect.half_extents.x * 1.5, rect.half_extents.y * 1.5);
            }
            scene_world.push_rect(rect);
        }
    }

    for particle in simulation.particles().particles() {
        let color = shade(prop_visual(particle.source).color, particle.opacity);
        scene_world.push_rect(rect_at(
            particle.position,
            Vec2::new(PARTICLE_HALF_EXTENT, PARTICLE_HALF_EXTENT),
            color,
            false,
        ));
    }

    let size = player.tuning().size;
    let body_color = if player.is_dead() {
        PLAYER_DEAD_COLOR
    } else {
        shade(PLAYER_COLOR, player.opacity())
    };
    scene_world.push_rect(rect_at(
        player_position,
        Vec2::new(size.width * 0.5, size.depth * 0.5),
        body_color,
        false,
    ));

    if !player.is_dead() {
        let pose = player.attack().weapon_pose(&player.tuning().attack);
        let right = Vec3::ground(facing.z, -facing.x);
        let weapon_position = player_position + right * pose.offset.x + facing * pose.offset.z;
        scene_world.push_rect(rect_at(
            weapon_position,
            Vec2::new(WEAPON_HALF_EXTENT, WEAPON_HALF_EXTENT),
            if pose.glowing {
                WEAPON_GLOW_COLOR
            } else {
                WEAPON_COLOR
            },
            false,
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn colliding_props_draw_their_collision_footprint() {
        for kind in PropKind::ALL {
            let descriptor = kind.descriptor();
            if !descriptor.has_collision() {
                continue;
            }
            let visual = prop_visual(kind);
            assert_eq!(
                visual.half_extents,
                Vec2::new(
                    descriptor.collision_size.width * 0.5,
                    descriptor.collision_size.depth * 0.5
                ),
                "{kind:?}"
            );
        }
    }

    #[test]
    fn touch_props_draw_their_trigger_footprint() {
        for kind in [PropKind::Thorns, PropKind::Spring] {
            let touch_size = kind.descriptor().touch_size;
            assert_eq!(
                prop_visual(kind).half_extents,
                Vec2::new(touch_size.width * 0.5, touch_size.depth * 0.5),
                "{kind:?}"
            );
        }
    }

    #[test]
    fn shade_scales_color_but_keeps_alpha() {
        assert_eq!(shade([200, 100, 50, 255], 0.5), [100, 50, 25, 255]);
        assert_eq!(shade([200, 100, 50, 255], 2.0), [200, 100, 50, 255]);
    }
}
