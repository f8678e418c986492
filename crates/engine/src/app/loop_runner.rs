use std::sync::Arc;
use std::time::{Duration, Instant};

use pixels::Error as PixelsError;
use thiserror::Error;
use tracing::{info, warn};
use winit::dpi::LogicalSize;
use winit::error::{EventLoopError, OsError};
use winit::event::{ElementState, Event, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::WindowBuilder;

use crate::content::LayoutError;
use crate::StartupError;

use super::input::ActionStates;
use super::scene::SceneRuntime;
use super::{InputAction, InputSnapshot, Renderer, Scene, SceneCommand};

#[derive(Debug, Clone)]
pub struct LoopConfig {
    pub window_title: String,
    pub window_width: u32,
    pub window_height: u32,
    pub target_tps: u32,
    pub max_frame_delta: Duration,
    pub max_ticks_per_frame: u32,
    pub start_paused: bool,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            window_title: "Crossroads".to_string(),
            window_width: 1280,
            window_height: 720,
            target_tps: 60,
            max_frame_delta: Duration::from_millis(250),
            max_ticks_per_frame: 5,
            start_paused: false,
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Startup(#[from] StartupError),
    #[error(transparent)]
    Layout(#[from] LayoutError),
    #[error("failed to create event loop: {0}")]
    CreateEventLoop(#[source] EventLoopError),
    #[error("failed to create application window: {0}")]
    CreateWindow(#[source] OsError),
    #[error("failed to initialize renderer: {0}")]
    CreateRenderer(#[source] PixelsError),
    #[error("event loop failed: {0}")]
    EventLoopRun(#[source] EventLoopError),
}

pub fn run_app(config: LoopConfig, scene: Box<dyn Scene>) -> Result<(), AppError> {
    let mut runtime = SceneRuntime::new(scene);

    let event_loop = EventLoop::new().map_err(AppError::CreateEventLoop)?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title(config.window_title.clone())
            .with_inner_size(LogicalSize::new(
                config.window_width as f64,
                config.window_height as f64,
            ))
            .build(&event_loop)
            .map_err(AppError::CreateWindow)?,
    );
    let mut renderer = Renderer::new(Arc::clone(&window)).map_err(AppError::CreateRenderer)?;

    event_loop.set_control_flow(ControlFlow::Poll);

    let target_tps = config.target_tps.max(1);
    let max_frame_delta =
        normalize_non_zero_duration(config.max_frame_delta, Duration::from_millis(250));
    let max_ticks_per_frame = config.max_ticks_per_frame.max(1);
    let fixed_dt = Duration::from_secs_f64(1.0 / target_tps as f64);
    let fixed_dt_seconds = fixed_dt.as_secs_f32();
    let inner_size = window.inner_size();
    let mut input_collector = InputCollector::new(inner_size.width, inner_size.height);

    runtime.load();
    info!(
        target_tps,
        max_frame_delta_ms = max_frame_delta.as_millis() as u64,
        max_ticks_per_frame,
        start_paused = config.start_paused,
        "loop_config"
    );

    let mut pause = PauseState::new(config.start_paused);
    let mut accumulator = Duration::ZERO;
    let mut last_frame_instant = Instant::now();
    let mut last_applied_title: Option<String> = None;

    event_loop
        .run(move |event, window_target| match event {
            Event::WindowEvent { window_id, event } if window_id == window.id() => match event {
                WindowEvent::CloseRequested => {
                    info!(reason = "window_close", "shutdown_requested");
                    window_target.exit();
                }
                WindowEvent::Resized(new_size) => {
                    input_collector.set_window_size(new_size.width, new_size.height);
                    if let Err(error) = renderer.resize(new_size.width, new_size.height) {
                        warn!(error = %error, "renderer_resize_failed");
                        window_target.exit();
                    }
                }
                WindowEvent::ScaleFactorChanged { .. } => {
                    let size = window.inner_size();
                    input_collector.set_window_size(size.width, size.height);
                    if let Err(error) = renderer.resize(size.width, size.height) {
                        warn!(error = %error, "renderer_resize_failed");
                        window_target.exit();
                    }
                }
                WindowEvent::Focused(false) => {
                    input_collector.release_all();
                    if pause.pause() {
                        info!(reason = "focus_lost", "paused");
                    }
                }
                WindowEvent::KeyboardInput { event, .. } => {
                    input_collector.handle_keyboard_input(&event);
                    if input_collector.quit_requested {
                        info!(reason = "quit_key", "shutdown_requested");
                        window_target.exit();
                    }
                }
                WindowEvent::RedrawRequested => {
                    let now = Instant::now();
                    let raw_frame_dt = now.saturating_duration_since(last_frame_instant);
                    last_frame_instant = now;

                    if pause.is_paused() {
                        if input_collector.take_menu_pressed() && pause.resume() {
                            accumulator = Duration::ZERO;
                            info!(reason = "menu_key", "resumed");
                        }
                        input_collector.clear_frame_states();
                    } else {
                        let clamped_frame_dt = clamp_frame_delta(raw_frame_dt, max_frame_delta);
                        accumulator = accumulator.saturating_add(clamped_frame_dt);

                        let step_plan = plan_sim_steps(accumulator, fixed_dt, max_ticks_per_frame);
                        for _ in 0..step_plan.ticks_to_run {
                            let input_snapshot = input_collector.snapshot_for_tick();
                            let command = runtime.update(fixed_dt_seconds, &input_snapshot);
                            input_collector.clear_frame_states();
                            match command {
                                SceneCommand::None => {}
                                SceneCommand::Reload => runtime.reload(),
                                SceneCommand::Pause => {
                                    pause.pause();
                                    info!(reason = "menu_key", "paused");
                                }
                                SceneCommand::Quit => {
                                    info!(reason = "scene_command", "shutdown_requested");
                                    window_target.exit();
                                }
                            }
                            if pause.is_paused() {
                                break;
                            }
                        }
                        accumulator = if pause.is_paused() {
                            Duration::ZERO
                        } else {
                            step_plan.remaining_accumulator
                        };

                        if step_plan.dropped_backlog > Duration::ZERO {
                            warn!(
                                dropped_backlog_ms = step_plan.dropped_backlog.as_millis() as u64,
                                max_ticks_per_frame, "sim_clamp_triggered"
                            );
                        }
                    }

                    runtime.render(pause.is_paused());
                    if let Err(error) = renderer.render_world(runtime.world()) {
                        warn!(error = %error, "renderer_draw_failed");
                        window_target.exit();
                    }

                    let next_title = compose_title(
                        &config.window_title,
                        runtime.debug_title().as_deref(),
                        pause.is_paused(),
                    );
                    if last_applied_title.as_deref() != Some(next_title.as_str()) {
                        window.set_title(&next_title);
                        last_applied_title = Some(next_title);
                    }
                }
                _ => {}
            },
            Event::AboutToWait => {
                window.request_redraw();
            }
            Event::LoopExiting => {
                runtime.shutdown();
                info!("shutdown");
            }
            _ => {}
        })
        .map_err(AppError::EventLoopRun)
}

#[derive(Debug, Clone, Copy)]
struct PauseState {
    paused: bool,
}

impl PauseState {
    fn new(paused: bool) -> Self {
        Self { paused }
    }

    fn is_paused(&self) -> bool {
        self.paused
    }

    /// Returns whether the state changed.
    fn pause(&mut self) -> bool {
        let changed = !self.paused;
        self.paused = true;
        changed
    }

    fn resume(&mut self) -> bool {
        let changed = self.paused;
        self.paused = false;
        changed
    }
}

fn compose_title(base: &str, scene_title: Option<&str>, paused: bool) -> String {
    let mut title = match scene_title {
        Some(scene_title) => format!("{base} | {scene_title}"),
        None => base.to_string(),
    };
    if paused {
        title.push_str(" [paused]");
    }
    title
}

#[derive(Debug, Default)]
struct InputCollector {
    quit_requested: bool,
    attack_is_down: bool,
    attack_pressed_edge: bool,
    menu_is_down: bool,
    menu_pressed_edge: bool,
    zoom_in_key_is_down: bool,
    zoom_out_key_is_down: bool,
    pending_zoom_steps: i32,
    action_states: ActionStates,
    window_width: u32,
    window_height: u32,
}

impl InputCollector {
    fn new(window_width: u32, window_height: u32) -> Self {
        Self {
            window_width,
            window_height,
            ..Self::default()
        }
    }

    fn handle_keyboard_input(&mut self, key_event: &winit::event::KeyEvent) {
        let is_pressed = key_event.state == ElementState::Pressed;
        self.update_action_state_from_physical_key(key_event.physical_key, is_pressed);
        self.handle_attack_key_state(is_attack_key(key_event.physical_key), key_event.state);
        self.handle_menu_key_state(is_menu_key(key_event.physical_key), key_event.state);
        self.handle_zoom_in_key_state(is_zoom_in_key(key_event.physical_key), key_event.state);
        self.handle_zoom_out_key_state(is_zoom_out_key(key_event.physical_key), key_event.state);
    }

    fn snapshot_for_tick(&self) -> InputSnapshot {
        InputSnapshot::new(
            self.action_states,
            self.attack_pressed_edge,
            self.menu_pressed_edge,
            self.quit_requested,
            self.pending_zoom_steps,
            self.window_width,
            self.window_height,
        )
    }

    /// Drops edge-triggered state so a press is seen by exactly one tick.
    fn clear_frame_states(&mut self) {
        self.attack_pressed_edge = false;
        self.menu_pressed_edge = false;
        self.pending_zoom_steps = 0;
    }

    fn take_menu_pressed(&mut self) -> bool {
        let was_pressed = self.menu_pressed_edge;
        self.menu_pressed_edge = false;
        was_pressed
    }

    fn release_all(&mut self) {
        self.action_states.clear();
        self.attack_is_down = false;
        self.menu_is_down = false;
        self.zoom_in_key_is_down = false;
        self.zoom_out_key_is_down = false;
    }

    fn update_action_state_from_physical_key(&mut self, key: PhysicalKey, is_pressed: bool) {
        match key {
            PhysicalKey::Code(KeyCode::KeyW) | PhysicalKey::Code(KeyCode::ArrowUp) => {
                self.action_states.set(InputAction::MoveUp, is_pressed);
            }
            PhysicalKey::Code(KeyCode::KeyS) | PhysicalKey::Code(KeyCode::ArrowDown) => {
                self.action_states.set(InputAction::MoveDown, is_pressed);
            }
            PhysicalKey::Code(KeyCode::KeyA) | PhysicalKey::Code(KeyCode::ArrowLeft) => {
                self.action_states.set(InputAction::MoveLeft, is_pressed);
            }
            PhysicalKey::Code(KeyCode::KeyD) | PhysicalKey::Code(KeyCode::ArrowRight) => {
                self.action_states.set(InputAction::MoveRight, is_pressed);
            }
            PhysicalKey::Code(KeyCode::Space) => {
                self.action_states.set(InputAction::Attack, is_pressed);
            }
            PhysicalKey::Code(KeyCode::Escape) => {
                self.action_states.set(InputAction::Menu, is_pressed);
            }
            PhysicalKey::Code(KeyCode::F10) => {
                self.action_states.set(InputAction::Quit, is_pressed);
                if is_pressed {
                    self.quit_requested = true;
                }
            }
            _ => {}
        }
    }

    fn handle_attack_key_state(&mut self, is_attack_key: bool, state: ElementState) {
        if !is_attack_key {
            return;
        }
        match state {
            ElementState::Pressed => {
                if !self.attack_is_down {
                    self.attack_pressed_edge = true;
                }
                self.attack_is_down = true;
            }
            ElementState::Released => self.attack_is_down = false,
        }
    }

    fn handle_menu_key_state(&mut self, is_menu_key: bool, state: ElementState) {
        if !is_menu_key {
            return;
        }
        match state {
            ElementState::Pressed => {
                if !self.menu_is_down {
                    self.menu_pressed_edge = true;
                }
                self.menu_is_down = true;
            }
            ElementState::Released => self.menu_is_down = false,
        }
    }

    fn handle_zoom_in_key_state(&mut self, is_zoom_in_key: bool, state: ElementState) {
        if !is_zoom_in_key {
            return;
        }
        match state {
            ElementState::Pressed => {
                if !self.zoom_in_key_is_down {
                    self.pending_zoom_steps = self.pending_zoom_steps.saturating_add(1);
                }
                self.zoom_in_key_is_down = true;
            }
            ElementState::Released => self.zoom_in_key_is_down = false,
        }
    }

    fn handle_zoom_out_key_state(&mut self, is_zoom_out_key: bool, state: ElementState) {
        if !is_zoom_out_key {
            return;
        }
        match state {
            ElementState::Pressed => {
                if !self.zoom_out_key_is_down {
                    self.pending_zoom_steps = self.pending_zoom_steps.saturating_sub(1);
                }
                self.zoom_out_key_is_down = true;
            }
            ElementState::Released => self.zoom_out_key_is_down = false,
        }
    }

    fn set_window_size(&mut self, width: u32, height: u32) {
        self.window_width = width;
        self.window_height = height;
    }
}

#[derive(Debug, Clone, Copy)]
struct StepPlan {
    ticks_to_run: u32,
    remaining_accumulator: Duration,
    dropped_backlog: Duration,
}

fn plan_sim_steps(
    mut accumulator: Duration,
    fixed_dt: Duration,
    max_ticks_per_frame: u32,
) -> StepPlan {
    let mut ticks_to_run = 0u32;

    while accumulator >= fixed_dt && ticks_to_run < max_ticks_per_frame {
        accumulator = accumulator.saturating_sub(fixed_dt);
        ticks_to_run = ticks_to_run.saturating_add(1);
    }

    if accumulator >= fixed_dt {
        StepPlan {
            ticks_to_run,
            remaining_accumulator: Duration::ZERO,
            dropped_backlog: accumulator,
        }
    } else {
        StepPlan {
            ticks_to_run,
            remaining_accumulator: accumulator,
            dropped_backlog: Duration::ZERO,
        }
    }
}

fn clamp_frame_delta(frame_dt: Duration, max_frame_delta: Duration) -> Duration {
    frame_dt.min(max_frame_delta)
}

fn normalize_non_zero_duration(value: Duration, fallback: Duration) -> Duration {
    if value.is_zero() {
        fallback
    } else {
        value
    }
}

fn is_attack_key(key: PhysicalKey) -> bool {
    matches!(key, PhysicalKey::Code(KeyCode::Space))
}

fn is_menu_key(key: PhysicalKey) -> bool {
    matches!(key, PhysicalKey::Code(KeyCode::Escape))
}

fn is_zoom_in_key(key: PhysicalKey) -> bool {
    matches!(
        key,
        PhysicalKey::Code(KeyCode::Equal) | PhysicalKey::Code(KeyCode::NumpadAdd)
    )
}

fn is_zoom_out_key(key: PhysicalKey) -> bool {
    matches!(
        key,
        PhysicalKey::Code(KeyCode::Minus) | PhysicalKey::Code(KeyCode::NumpadSubtract)
    )
}
