use crate::app::Camera2D;
use crate::physics::Vec2;

pub const PIXELS_PER_WORLD: f32 = 4.0;

#[derive(Debug, Clone, Copy)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

pub fn camera_pixels_per_world(camera: &Camera2D) -> f32 {
    PIXELS_PER_WORLD * camera.effective_zoom()
}

/// Maps a ground point (`x`, `y` = world z) to pixels. World z grows
/// downward on screen, so moving up is moving toward -z.
pub fn world_to_screen(
    world: Vec2,
    camera: &Camera2D,
    viewport: Viewport,
    pixels_per_world: f32,
) -> (i32, i32) {
    let x = (world.x - camera.position.x) * pixels_per_world + viewport.width as f32 * 0.5;
    let y = (world.y - camera.position.y) * pixels_per_world + viewport.height as f32 * 0.5;
    (x.round() as i32, y.round() as i32)
}

pub fn world_to_screen_px(camera: &Camera2D, window_size: (u32, u32), world: Vec2) -> (i32, i32) {
    let viewport = Viewport {
        width: window_size.0,
        height: window_size.1,
    };
    world_to_screen(world, camera, viewport, camera_pixels_per_world(camera))
}
