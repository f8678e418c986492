mod input;
mod loop_runner;
mod rendering;
mod scene;

pub use input::InputAction;
pub use loop_runner::{run_app, AppError, LoopConfig};
pub use rendering::{
    camera_pixels_per_world, world_to_screen, world_to_screen_px, Renderer, Viewport,
    PIXELS_PER_WORLD,
};
pub use scene::{
    Camera2D, DrawRect, HudState, InputSnapshot, Scene, SceneCommand, SceneWorld,
    CAMERA_ZOOM_DEFAULT, CAMERA_ZOOM_MAX, CAMERA_ZOOM_MIN, CAMERA_ZOOM_STEP,
};
