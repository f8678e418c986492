use tracing::info;

use super::input::{axis_value, ActionStates, InputAction};
use crate::physics::{Vec2, Vec3};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneCommand {
    None,
    /// Tear the scene down and load it again from scratch.
    Reload,
    /// Stop ticking the scene; the loop resumes on the next menu press.
    Pause,
    Quit,
}

/// One simulation tick's view of the player's input. Edge flags are true only
/// on the tick the key went down.
#[derive(Debug, Clone, Copy, Default)]
pub struct InputSnapshot {
    actions: ActionStates,
    attack_pressed: bool,
    menu_pressed: bool,
    quit_requested: bool,
    zoom_delta_steps: i32,
    window_width: u32,
    window_height: u32,
}

impl InputSnapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    pub(crate) fn new(
        actions: ActionStates,
        attack_pressed: bool,
        menu_pressed: bool,
        quit_requested: bool,
        zoom_delta_steps: i32,
        window_width: u32,
        window_height: u32,
    ) -> Self {
        Self {
            actions,
            attack_pressed,
            menu_pressed,
            quit_requested,
            zoom_delta_steps,
            window_width,
            window_height,
        }
    }

    pub fn is_down(&self, action: InputAction) -> bool {
        self.actions.is_down(action)
    }

    /// Ground-plane intent with each component in {-1, 0, 1}. Up is -z.
    pub fn movement_intent(&self) -> Vec3 {
        Vec3::ground(
            axis_value(
                self.is_down(InputAction::MoveLeft),
                self.is_down(InputAction::MoveRight),
            ),
            axis_value(
                self.is_down(InputAction::MoveUp),
                self.is_down(InputAction::MoveDown),
            ),
        )
    }

    pub fn attack_pressed(&self) -> bool {
        self.attack_pressed
    }

    pub fn menu_pressed(&self) -> bool {
        self.menu_pressed
    }

    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    pub fn zoom_delta_steps(&self) -> i32 {
        self.zoom_delta_steps
    }

    pub fn window_size(&self) -> (u32, u32) {
        (self.window_width, self.window_height)
    }

    pub fn with_action_down(mut self, action: InputAction, is_down: bool) -> Self {
        self.actions.set(action, is_down);
        self
    }

    pub fn with_attack_pressed(mut self, attack_pressed: bool) -> Self {
        self.attack_pressed = attack_pressed;
        self
    }

    pub fn with_menu_pressed(mut self, menu_pressed: bool) -> Self {
        self.menu_pressed = menu_pressed;
        self
    }

    pub fn with_zoom_delta_steps(mut self, zoom_delta_steps: i32) -> Self {
        self.zoom_delta_steps = zoom_delta_steps;
        self
    }

    pub fn with_window_size(mut self, window_size: (u32, u32)) -> Self {
        self.window_width = window_size.0;
        self.window_height = window_size.1;
        self
    }
}

pub const CAMERA_ZOOM_DEFAULT: f32 = 1.0;
pub const CAMERA_ZOOM_MIN: f32 = 0.5;
pub const CAMERA_ZOOM_MAX: f32 = 2.0;
pub const CAMERA_ZOOM_STEP: f32 = 0.1;

/// Top-down camera. `position.y` tracks world z.
#[derive(Debug, Clone, Copy)]
pub struct Camera2D {
    pub position: Vec2,
    pub zoom: f32,
}

impl Default for Camera2D {
    fn default() -> Self {
        Self {
            position: Vec2::default(),
            zoom: CAMERA_ZOOM_DEFAULT,
        }
    }
}

impl Camera2D {
    pub fn effective_zoom(&self) -> f32 {
        clamp_camera_zoom(self.zoom)
    }

    pub fn set_zoom_clamped(&mut self, zoom: f32) {
        self.zoom = clamp_camera_zoom(zoom);
    }

    pub fn apply_zoom_steps(&mut self, steps: i32) {
        if steps == 0 {
            return;
        }
        let target_zoom = self.zoom + steps as f32 * CAMERA_ZOOM_STEP;
        self.set_zoom_clamped(target_zoom);
    }

    pub fn follow(&mut self, target: Vec3) {
        self.position = Vec2::new(target.x, target.z);
    }
}

fn clamp_camera_zoom(zoom: f32) -> f32 {
    if !zoom.is_finite() {
        return CAMERA_ZOOM_DEFAULT;
    }
    zoom.clamp(CAMERA_ZOOM_MIN, CAMERA_ZOOM_MAX)
}

/// Axis-aligned ground-plane rectangle for the renderer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawRect {
    /// World x and z of the center.
    pub center: Vec2,
    pub half_extents: Vec2,
    pub color: [u8; 4],
    pub outline_only: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HudState {
    /// 0.0 to 1.0.
    pub health_fraction: f32,
    pub paused: bool,
    pub banner_color: Option<[u8; 4]>,
}

impl Default for HudState {
    fn default() -> Self {
        Self {
            health_fraction: 1.0,
            paused: false,
            banner_color: None,
        }
    }
}

/// Presentation state a scene hands to the renderer. Rebuilt by the scene
/// every rendered frame; nothing here is read back by the simulation.
#[derive(Debug, Default)]
pub struct SceneWorld {
    camera: Camera2D,
    draw_list: Vec<DrawRect>,
    hud: HudState,
}

impl SceneWorld {
    pub fn camera(&self) -> &Camera2D {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera2D {
        &mut self.camera
    }

    pub fn draw_list(&self) -> &[DrawRect] {
        &self.draw_list
    }

    pub fn begin_frame(&mut self) {
        self.draw_list.clear();
    }

    pub fn push_rect(&mut self, rect: DrawRect) {
        self.draw_list.push(rect);
    }

    pub fn hud(&self) -> &HudState {
        &self.hud
    }

    pub fn hud_mut(&mut self) -> &mut HudState {
        &mut self.hud
    }

    pub fn clear(&mut self) {
        self.camera = Camera2D::default();
        self.draw_list.clear();
        self.hud = HudState::default();
    }
}

pub trait Scene {
    fn load(&mut self, world: &mut SceneWorld);
    fn update(
        &mut self,
        fixed_dt_seconds: f32,
        input: &InputSnapshot,
        world: &mut SceneWorld,
    ) -> SceneCommand;
    fn render(&mut self, world: &mut SceneWorld);
    fn unload(&mut self, world: &mut SceneWorld);
    fn debug_title(&self) -> Option<String> {
        None
    }
}

pub(crate) struct SceneRuntime {
    scene: Box<dyn Scene>,
    world: SceneWorld,
    is_loaded: bool,
}

impl SceneRuntime {
    pub(crate) fn new(scene: Box<dyn Scene>) -> Self {
        Self {
            scene,
            world: SceneWorld::default(),
            is_loaded: false,
        }
    }

    #[cfg(test)]
    pub(crate) fn is_loaded(&self) -> bool {
        self.is_loaded
    }

    pub(crate) fn load(&mut self) {
        if self.is_loaded {
            return;
        }
        self.scene.load(&mut self.world);
        self.is_loaded = true;
    }

    pub(crate) fn update(&mut self, fixed_dt_seconds: f32, input: &InputSnapshot) -> SceneCommand {
        if !self.is_loaded {
            return SceneCommand::None;
        }
        self.scene.update(fixed_dt_seconds, input, &mut self.world)
    }

    pub(crate) fn render(&mut self, paused: bool) {
        if !self.is_loaded {
            return;
        }
        self.scene.render(&mut self.world);
        self.world.hud_mut().paused = paused;
    }

    pub(crate) fn reload(&mut self) {
        if self.is_loaded {
            self.scene.unload(&mut self.world);
        }
        self.world.clear();
        self.scene.load(&mut self.world);
        self.is_loaded = true;
        info!("scene_reloaded");
    }

    pub(crate) fn shutdown(&mut self) {
        if !self.is_loaded {
            return;
        }
        self.scene.unload(&mut self.world);
        self.world.clear();
        self.is_loaded = false;
    }

    pub(crate) fn world(&self) -> &SceneWorld {
        &self.world
    }

    pub(crate) fn debug_title(&self) -> Option<String> {
        self.scene.debug_title()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    #[derive(Default)]
    struct Calls {
        loads: u32,
        unloads: u32,
        updates: u32,
        renders: u32,
    }

    struct TestScene {
        calls: Rc<RefCell<Calls>>,
        rect_count: usize,
    }

    impl Scene for TestScene {
        fn load(&mut self, world: &mut SceneWorld) {
            self.calls.borrow_mut().loads += 1;
            world.camera_mut().follow(Vec3::ground(3.0, 4.0));
        }

        fn update(
            &mut self,
            _fixed_dt_seconds: f32,
            input: &InputSnapshot,
            _world: &mut SceneWorld,
        ) -> SceneCommand {
            self.calls.borrow_mut().updates += 1;
            if input.menu_pressed() {
                SceneCommand::Pause
            } else {
                SceneCommand::None
            }
        }

        fn render(&mut self, world: &mut SceneWorld) {
            self.calls.borrow_mut().renders += 1;
            world.begin_frame();
            for _ in 0..self.rect_count {
                world.push_rect(DrawRect {
                    center: Vec2::default(),
                    half_extents: Vec2::new(1.0, 1.0),
                    color: [255; 4],
                    outline_only: false,
                });
            }
        }

        fn unload(&mut self, _world: &mut SceneWorld) {
            self.calls.borrow_mut().unloads += 1;
        }
    }

    fn runtime(rect_count: usize) -> (SceneRuntime, Rc<RefCell<Calls>>) {
        let calls = Rc::new(RefCell::new(Calls::default()));
        let scene = TestScene {
            calls: Rc::clone(&calls),
            rect_count,
        };
        (SceneRuntime::new(Box::new(scene)), calls)
    }

    #[test]
    fn movement_intent_maps_up_to_negative_z() {
        let input = InputSnapshot::empty()
            .with_action_down(InputAction::MoveUp, true)
            .with_action_down(InputAction::MoveRight, true);
        assert_eq!(input.movement_intent(), Vec3::ground(1.0, -1.0));
    }

    #[test]
    fn movement_intent_is_zero_with_opposing_keys() {
        let input = InputSnapshot::empty()
            .with_action_down(InputAction::MoveUp, true)
            .with_action_down(InputAction::MoveDown, true);
        assert_eq!(input.movement_intent(), Vec3::ZERO);
    }

    #[test]
    fn load_is_idempotent() {
        let (mut runtime, calls) = runtime(0);
        runtime.load();
        runtime.load();
        assert!(runtime.is_loaded());
        assert_eq!(calls.borrow().loads, 1);
    }

    #[test]
    fn update_before_load_is_a_no_op() {
        let (mut runtime, calls) = runtime(0);
        let command = runtime.update(0.016, &InputSnapshot::empty().with_menu_pressed(true));
        assert_eq!(command, SceneCommand::None);
        assert_eq!(calls.borrow().updates, 0);
    }

    #[test]
    fn reload_unloads_clears_and_loads_again() {
        let (mut runtime, calls) = runtime(3);
        runtime.load();
        runtime.render(false);
        assert_eq!(runtime.world().draw_list().len(), 3);

        runtime.reload();
        assert_eq!(calls.borrow().unloads, 1);
        assert_eq!(calls.borrow().loads, 2);
        assert!(runtime.world().draw_list().is_empty());
        assert_eq!(runtime.world().camera().position, Vec2::new(3.0, 4.0));
    }

    #[test]
    fn render_records_pause_state_for_hud() {
        let (mut runtime, _calls) = runtime(1);
        runtime.load();
        runtime.render(true);
        assert!(runtime.world().hud().paused);
        runtime.render(false);
        assert!(!runtime.world().hud().paused);
    }

    #[test]
    fn shutdown_unloads_once() {
        let (mut runtime, calls) = runtime(0);
        runtime.load();
        runtime.shutdown();
        runtime.shutdown();
        assert!(!runtime.is_loaded());
        assert_eq!(calls.borrow().unloads, 1);
    }

    #[test]
    fn camera_zoom_is_clamped() {
        let mut camera = Camera2D::default();
        camera.apply_zoom_steps(50);
        assert_eq!(camera.effective_zoom(), CAMERA_ZOOM_MAX);
        camera.set_zoom_clamped(f32::NAN);
        assert_eq!(camera.zoom, CAMERA_ZOOM_DEFAULT);
    }
}
