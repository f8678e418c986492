use std::path::Path;

use engine::content::{parse_layout, PropKind, WorldLayout};
use engine::{
    Aabb, InputAction, InputSnapshot, PushableTuning, Scene, SceneCommand, SceneWorld, Vec3,
};

use super::events::UiEvent;
use super::player::PlayerTuning;
use super::scene_impl::CrossroadsScene;
use super::simulation::Simulation;

const DT: f32 = 1.0 / 60.0;
const SHIPPED_LAYOUT: &str = include_str!("../../../../../assets/world/crossroads.json");

fn snapshot_from_actions(actions: &[InputAction]) -> InputSnapshot {
    let mut snapshot = InputSnapshot::empty();
    for action in actions {
        snapshot = snapshot.with_action_down(*action, true);
    }
    snapshot
}

fn layout_with(props: &str, extra: &str) -> WorldLayout {
    let raw = format!(
        r#"{{
            "arena": {{ "half_size": 50.0, "wall_thickness": 2.0, "wall_height": 20.0 }},
            "zones": [
                {{ "name": "Portfolio Crossroads", "kind": "hub", "x": 0.0, "z": 0.0,
                   "radius": 30.0, "description": "Where all paths meet" }}
            ],
            "props": [{props}]
            {extra}
        }}"#
    );
    parse_layout(&raw, Path::new("scenario.json")).expect("scenario layout")
}

fn simulation_for(layout: &WorldLayout) -> Simulation {
    Simulation::new(layout, PlayerTuning::default(), PushableTuning::default())
}

fn player_box(simulation: &Simulation) -> Aabb {
    Aabb::from_center_size(
        simulation.player_position(),
        simulation.player().tuning().size,
    )
}

#[test]
fn attack_destroys_grass_ahead_in_the_same_step() {
    let layout = layout_with(r#"{ "kind": "grass", "x": 0.0, "z": 5.0 }"#, "");
    let mut simulation = simulation_for(&layout);
    assert_eq!(simulation.world().active_destructibles().len(), 1);

    simulation.step(DT, &InputSnapshot::empty().with_attack_pressed(true));

    assert!(simulation
        .world()
        .destructibles()
        .iter()
        .all(|item| item.is_destroyed()));
    assert!(simulation.world().active_destructibles().is_empty());
    let events = simulation.drain_events();
    assert!(events.iter().any(|event| matches!(
        event,
        UiEvent::DestructibleDestroyed {
            kind: PropKind::Grass,
            ..
        }
    )));
    assert_eq!(simulation.particles().burst_count(), 1);
}

#[test]
fn attack_clears_every_target_in_the_cone_but_nothing_outside() {
    let layout = layout_with(
        r#"
        { "kind": "grass", "x": 1.0, "z": 4.0 },
        { "kind": "crate", "x": -1.5, "z": 4.5 },
        { "kind": "grass", "x": 4.0, "z": 1.0 },
        { "kind": "grass", "x": 0.0, "z": -4.0 },
        { "kind": "grass", "x": 0.0, "z": 9.0 }
        "#,
        "",
    );
    let mut simulation = simulation_for(&layout);
    let colliders_before = simulation.collisions().colliders().len();

    simulation.step(DT, &InputSnapshot::empty().with_attack_pressed(true));

    let standing: Vec<_> = simulation
        .world()
        .active_destructibles()
        .iter()
        .map(|item| simulation.transforms().position(item.entity()).expect("pos"))
        .collect();
    assert_eq!(standing.len(), 3);
    assert!(standing.iter().all(|position| position.z != 4.0 && position.z != 4.5));
    assert_eq!(simulation.collisions().colliders().len(), colliders_before - 1);
}

#[test]
fn pressing_attack_mid_swing_does_not_retrigger_the_hit_test() {
    let layout = layout_with(r#"{ "kind": "grass", "x": 0.0, "z": -5.0 }"#, "");
    let mut simulation = simulation_for(&layout);
    let attack = InputSnapshot::empty().with_attack_pressed(true);

    simulation.step(DT, &attack);
    assert_eq!(simulation.particles().burst_count(), 0);

    // Turn to face the grass without moving into it, then press again mid-swing.
    let player = simulation.player().entity();
    simulation
        .transforms_mut()
        .get_mut(player)
        .expect("player")
        .yaw_radians = std::f32::consts::PI;
    simulation.step(DT, &attack);
    assert_eq!(simulation.world().active_destructibles().len(), 1);

    for _ in 0..40 {
        simulation.step(DT, &InputSnapshot::empty());
    }
    simulation.step(DT, &attack);
    assert!(simulation.world().active_destructibles().is_empty());
}

#[test]
fn walking_into_a_wall_never_tunnels() {
    let layout = layout_with(
        "",
        r#", "boundaries": [
            { "name": "fence", "min": { "x": 3.0, "y": 0.0, "z": -20.0 },
              "max": { "x": 3.5, "y": 10.0, "z": 20.0 } }
        ]"#,
    );
    let mut simulation = simulation_for(&layout);
    let fence = simulation
        .collisions()
        .boundaries()
        .iter()
        .find(|boundary| boundary.name == "fence")
        .expect("fence")
        .aabb;
    let input = snapshot_from_actions(&[InputAction::MoveRight]);

    for _ in 0..10 {
        simulation.step(DT, &input);
        assert!(!player_box(&simulation).intersects(&fence));
    }
    assert!(simulation.player_position().x > 1.5);
    assert!(simulation.player_position().x <= 2.0);
}

#[test]
fn diagonal_move_slides_along_the_wall() {
    let layout = layout_with(
        "",
        r#", "boundaries": [
            { "name": "fence", "min": { "x": 1.0, "y": 0.0, "z": -20.0 },
              "max": { "x": 1.5, "y": 10.0, "z": 20.0 } }
        ]"#,
    );
    let mut simulation = simulation_for(&layout);
    let input = snapshot_from_actions(&[InputAction::MoveRight, InputAction::MoveDown]);

    for _ in 0..10 {
        simulation.step(DT, &input);
    }
    let position = simulation.player_position();
    assert_eq!(position.x, 0.0);
    assert!(position.z > 2.0);
}

#[test]
fn walking_into_a_rock_shoves_it_along() {
    let layout = layout_with(r#"{ "kind": "rock", "x": 3.0, "z": 0.0 }"#, "");
    let mut simulation = simulation_for(&layout);
    let rock = simulation.world().pushables()[0].owner();
    let input = snapshot_from_actions(&[InputAction::MoveRight]);

    for _ in 0..60 {
        simulation.step(DT, &input);
        let rock_box = Aabb::from_center_size(
            simulation.transforms().position(rock).expect("rock"),
            simulation.world().pushables()[0].size(),
        );
        assert!(!player_box(&simulation).intersects(&rock_box));
    }
    let rock_x = simulation.transforms().position(rock).expect("rock").x;
    assert!(rock_x > 4.0, "rock only reached {rock_x}");
    assert!(simulation.player_position().x > 1.0);

    let mut previous = f32::INFINITY;
    for _ in 0..30 {
        let before = simulation.transforms().position(rock).expect("rock");
        simulation.step(DT, &InputSnapshot::empty());
        let after = simulation.transforms().position(rock).expect("rock");
        let moved = (after - before).length();
        assert!(moved <= previous + 1e-6);
        previous = moved;
    }
}

#[test]
fn damage_window_rejects_second_hit_until_it_expires() {
    let layout = layout_with("", "");
    let mut simulation = simulation_for(&layout);

    assert!(simulation.damage_player(20.0));
    assert!(!simulation.damage_player(20.0));
    assert_eq!(simulation.player().health(), 80.0);

    for _ in 0..95 {
        simulation.step(DT, &InputSnapshot::empty());
    }
    assert!(simulation.damage_player(20.0));
    assert_eq!(simulation.player().health(), 60.0);
    let health_events: Vec<_> = simulation
        .drain_events()
        .into_iter()
        .filter_map(|event| match event {
            UiEvent::HealthChanged { percent } => Some(percent),
            _ => None,
        })
        .collect();
    assert_eq!(health_events, vec![100.0, 80.0, 60.0]);
}

#[test]
fn standing_in_thorns_hurts_once_per_invincibility_window() {
    let layout = layout_with(r#"{ "kind": "thorns", "x": 0.0, "z": 0.0 }"#, "");
    let mut simulation = simulation_for(&layout);

    simulation.step(DT, &InputSnapshot::empty());
    assert_eq!(simulation.player().health(), 90.0);
    for _ in 0..60 {
        simulation.step(DT, &InputSnapshot::empty());
    }
    assert_eq!(simulation.player().health(), 90.0);
    for _ in 0..40 {
        simulation.step(DT, &InputSnapshot::empty());
    }
    assert_eq!(simulation.player().health(), 80.0);
}

#[test]
fn spring_heals_once_per_visit() {
    let layout = layout_with(r#"{ "kind": "spring", "x": 10.0, "z": 0.0 }"#, "");
    let mut simulation = simulation_for(&layout);
    let player = simulation.player().entity();
    assert!(simulation.damage_player(60.0));

    simulation
        .transforms_mut()
        .set_position(player, Vec3::ground(10.0, 0.0));
    simulation.step(DT, &InputSnapshot::empty());
    assert_eq!(simulation.player().health(), 65.0);
    simulation.step(DT, &InputSnapshot::empty());
    assert_eq!(simulation.player().health(), 65.0);

    simulation.transforms_mut().set_position(player, Vec3::ZERO);
    simulation.step(DT, &InputSnapshot::empty());
    simulation
        .transforms_mut()
        .set_position(player, Vec3::ground(10.0, 0.0));
    simulation.step(DT, &InputSnapshot::empty());
    assert_eq!(simulation.player().health(), 90.0);
}

#[test]
fn death_respawns_at_spawn_after_delay() {
    let layout = layout_with("", "");
    let mut simulation = simulation_for(&layout);
    let walk = snapshot_from_actions(&[InputAction::MoveRight]);
    for _ in 0..20 {
        simulation.step(DT, &walk);
    }
    simulation.drain_events();

    assert!(simulation.damage_player(500.0));
    assert!(simulation.player().is_dead());
    assert!(simulation.respawn_pending());
    assert!(!simulation.damage_player(10.0));
    assert!(!simulation.heal_player(10.0));

    let parked = simulation.player_position();
    for _ in 0..60 {
        simulation.step(DT, &walk);
    }
    assert_eq!(simulation.player_position(), parked);
    assert!(simulation.player().is_dead());

    for _ in 0..65 {
        simulation.step(DT, &InputSnapshot::empty());
    }
    assert!(!simulation.player().is_dead());
    assert!(!simulation.respawn_pending());
    assert!(!simulation.player().is_invincible());
    assert_eq!(simulation.player().health(), 100.0);
    assert_eq!(simulation.player_position(), Vec3::ZERO);
    let events = simulation.drain_events();
    assert!(events.contains(&UiEvent::PlayerDied));
    assert!(events.contains(&UiEvent::PlayerRespawned));
}

#[test]
fn entering_the_hub_announces_it_once() {
    let layout = layout_with("", "");
    let mut simulation = simulation_for(&layout);

    simulation.step(DT, &InputSnapshot::empty());
    simulation.step(DT, &InputSnapshot::empty());

    let entered: Vec<_> = simulation
        .drain_events()
        .into_iter()
        .filter(|event| matches!(event, UiEvent::AreaEntered { .. }))
        .collect();
    assert_eq!(
        entered,
        vec![UiEvent::AreaEntered {
            name: "Portfolio Crossroads".to_string(),
            description: "Where all paths meet".to_string(),
        }]
    );
    assert_eq!(simulation.area_banner(), Some("Portfolio Crossroads"));
}

fn danger_layout() -> WorldLayout {
    layout_with(
        "",
        r#", "transitions": [
            { "name": "Danger Dungeon", "kind": "danger", "x": 0.0, "z": -8.0,
              "width": 8.0, "depth": 12.0 }
        ]"#,
    )
}

fn walk_into_prompt(scene: &mut CrossroadsScene, world: &mut SceneWorld) {
    let up = snapshot_from_actions(&[InputAction::MoveUp]);
    for _ in 0..10 {
        assert_eq!(scene.update(DT, &up, world), SceneCommand::None);
    }
}

#[test]
fn confirming_the_danger_prompt_reloads_the_world() {
    let mut scene = CrossroadsScene::new(danger_layout());
    let mut world = SceneWorld::default();
    scene.load(&mut world);
    walk_into_prompt(&mut scene, &mut world);

    let command = scene.update(
        DT,
        &InputSnapshot::empty().with_attack_pressed(true),
        &mut world,
    );
    assert_eq!(command, SceneCommand::Reload);
}

#[test]
fn menu_declines_prompt_instead_of_pausing() {
    let mut scene = CrossroadsScene::new(danger_layout());
    let mut world = SceneWorld::default();
    scene.load(&mut world);
    walk_into_prompt(&mut scene, &mut world);

    let menu = InputSnapshot::empty().with_menu_pressed(true);
    assert_eq!(scene.update(DT, &menu, &mut world), SceneCommand::None);
    assert_eq!(scene.update(DT, &menu, &mut world), SceneCommand::Pause);
}

#[test]
fn repeated_menu_presses_each_request_a_pause() {
    let mut scene = CrossroadsScene::new(layout_with("", ""));
    let mut world = SceneWorld::default();
    scene.load(&mut world);

    let menu = InputSnapshot::empty().with_menu_pressed(true);
    assert_eq!(scene.update(DT, &menu, &mut world), SceneCommand::Pause);
    assert_eq!(scene.update(DT, &menu, &mut world), SceneCommand::Pause);
}

#[test]
fn render_fills_draw_list_and_hud() {
    let layout = layout_with(
        r#"{ "kind": "crate", "x": 10.0, "z": 0.0 }, { "kind": "tree", "x": -10.0, "z": 0.0 }"#,
        "",
    );
    let mut scene = CrossroadsScene::new(layout);
    let mut world = SceneWorld::default();
    scene.load(&mut world);
    scene.update(DT, &InputSnapshot::empty(), &mut world);
    scene.render(&mut world);

    assert!(world.draw_list().len() >= 8);
    assert_eq!(world.hud().health_fraction, 1.0);
    assert!(world.hud().banner_color.is_some());
    assert_eq!(
        scene.debug_title().as_deref(),
        Some("Portfolio Crossroads | props 1/1")
    );
}

#[test]
fn nearby_content_card_shows_in_the_title() {
    let layout = layout_with(
        r#"{ "kind": "info_crystal", "x": 0.0, "z": 3.0,
              "content": { "title": "My Background", "description": "d", "details": "x" } }"#,
        "",
    );
    let mut scene = CrossroadsScene::new(layout);
    let mut world = SceneWorld::default();
    scene.load(&mut world);
    scene.update(DT, &InputSnapshot::empty(), &mut world);

    assert_eq!(
        scene.debug_title().as_deref(),
        Some("Portfolio Crossroads - My Background | props 0/0")
    );
}

#[test]
fn shipped_layout_builds_with_a_clear_spawn() {
    let layout = parse_layout(SHIPPED_LAYOUT, Path::new("crossroads.json")).expect("layout");
    let simulation = simulation_for(&layout);

    assert_eq!(simulation.world().zones().len(), 5);
    assert_eq!(simulation.world().transitions().len(), 4);
    assert_eq!(simulation.world().interactives().len(), 5);
    assert!(!simulation.world().pushables().is_empty());
    assert!(simulation.world().destructibles().len() > 10);
    assert!(!simulation.world().touch_props().is_empty());
    let spawn = simulation.player_position();
    assert!(!simulation
        .collisions()
        .check_collision(
            simulation.transforms(),
            spawn,
            simulation.player().tuning().size
        )
        .is_collision());
    assert_eq!(
        simulation
            .world()
            .current_zone(spawn)
            .map(|zone| zone.name.as_str()),
        Some("Portfolio Crossroads")
    );
}
