mod renderer;
mod transform;

pub use renderer::Renderer;
pub use transform::{
    camera_pixels_per_world, world_to_screen, world_to_screen_px, Viewport, PIXELS_PER_WORLD,
};
