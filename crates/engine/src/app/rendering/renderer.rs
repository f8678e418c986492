use std::sync::Arc;

use pixels::{Error, Pixels, SurfaceTexture};
use winit::window::Window;

use crate::app::{Camera2D, DrawRect, HudState, SceneWorld};
use crate::physics::Vec2;

use super::transform::camera_pixels_per_world;
use super::{world_to_screen_px, Viewport};

const CLEAR_COLOR: [u8; 4] = [58, 94, 52, 255];
const GRID_CELL_WORLD: f32 = 10.0;
const GRID_MAJOR_EVERY: i32 = 5;
const GRID_MINOR_COLOR: [u8; 4] = [64, 102, 58, 255];
const GRID_MAJOR_COLOR: [u8; 4] = [74, 114, 66, 255];
const HEALTH_BAR_ORIGIN_PX: (i32, i32) = (16, 16);
const HEALTH_BAR_SIZE_PX: (i32, i32) = (200, 14);
const HEALTH_BAR_BACK_COLOR: [u8; 4] = [40, 16, 16, 255];
const HEALTH_BAR_FILL_COLOR: [u8; 4] = [220, 48, 48, 255];
const HEALTH_BAR_FRAME_COLOR: [u8; 4] = [240, 240, 240, 255];
const BANNER_HEIGHT_PX: i32 = 6;
const PAUSE_DIM_NUMERATOR: u16 = 1;
const PAUSE_DIM_DENOMINATOR: u16 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ScreenRectPx {
    left: i32,
    right: i32,
    top: i32,
    bottom: i32,
}

pub struct Renderer {
    window: Arc<Window>,
    pixels: Pixels<'static>,
    viewport: Viewport,
}

impl Renderer {
    pub fn new(window: Arc<Window>) -> Result<Self, Error> {
        let size = window.inner_size();
        let pixels = Self::build_pixels(Arc::clone(&window), size.width, size.height)?;
        Ok(Self {
            window,
            pixels,
            viewport: Viewport {
                width: size.width,
                height: size.height,
            },
        })
    }

    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), Error> {
        if width == 0 || height == 0 {
            return Ok(());
        }
        self.pixels = Self::build_pixels(Arc::clone(&self.window), width, height)?;
        self.viewport = Viewport { width, height };
        Ok(())
    }

    fn build_pixels(
        window: Arc<Window>,
        width: u32,
        height: u32,
    ) -> Result<Pixels<'static>, Error> {
        let surface = SurfaceTexture::new(width, height, window);
        Pixels::new(width, height, surface)
    }

    pub(crate) fn render_world(&mut self, world: &SceneWorld) -> Result<(), Error> {
        if self.viewport.width == 0 || self.viewport.height == 0 {
            return Ok(());
        }

        let width = self.viewport.width;
        let height = self.viewport.height;
        let frame = self.pixels.frame_mut();
        for chunk in frame.chunks_exact_mut(4) {
            chunk.copy_from_slice(&CLEAR_COLOR);
        }

        draw_world_grid(frame, width, height, world.camera());
        for rect in world.draw_list() {
            draw_world_rect(frame, width, height, world.camera(), rect);
        }
        draw_hud(frame, width, height, world.hud());

        self.pixels.render()
    }
}

fn draw_world_rect(frame: &mut [u8], width: u32, height: u32, camera: &Camera2D, rect: &DrawRect) {
    let screen = world_rect_to_screen(camera, (width, height), rect.center, rect.half_extents);
    if rect.outline_only {
        draw_rect_outline(frame, width, height, screen, rect.color);
    } else {
        fill_rect_clipped(frame, width, height, screen, rect.color);
    }
}

fn world_rect_to_screen(
    camera: &Camera2D,
    window_size: (u32, u32),
    center: Vec2,
    half_extents: Vec2,
) -> ScreenRectPx {
    let (left, top) = world_to_screen_px(
        camera,
        window_size,
        Vec2::new(center.x - half_extents.x, center.y - half_extents.y),
    );
    let (right, bottom) = world_to_screen_px(
        camera,
        window_size,
        Vec2::new(center.x + half_extents.x, center.y + half_extents.y),
    );
    // Keep tiny props visible at low zoom.
    ScreenRectPx {
        left,
        right: right.max(left + 1),
        top,
        bottom: bottom.max(top + 1),
    }
}

fn draw_hud(frame: &mut [u8], width: u32, height: u32, hud: &HudState) {
    if hud.paused {
        dim_frame(frame);
    }
    if let Some(color) = hud.banner_color {
        fill_rect_clipped(
            frame,
            width,
            height,
            ScreenRectPx {
                left: 0,
                right: width as i32,
                top: 0,
                bottom: BANNER_HEIGHT_PX,
            },
            color,
        );
    }

    let (x, y) = HEALTH_BAR_ORIGIN_PX;
    let (w, h) = HEALTH_BAR_SIZE_PX;
    let back = ScreenRectPx {
        left: x,
        right: x + w,
        top: y,
        bottom: y + h,
    };
    fill_rect_clipped(frame, width, height, back, HEALTH_BAR_BACK_COLOR);
    let fill_width = health_fill_width_px(hud.health_fraction, w);
    if fill_width > 0 {
        fill_rect_clipped(
            frame,
            width,
            height,
            ScreenRectPx {
                right: x + fill_width,
                ..back
            },
            HEALTH_BAR_FILL_COLOR,
        );
    }
    draw_rect_outline(frame, width, height, back, HEALTH_BAR_FRAME_COLOR);
}

fn health_fill_width_px(fraction: f32, full_width: i32) -> i32 {
    if !fraction.is_finite() {
        return 0;
    }
    (fraction.clamp(0.0, 1.0) * full_width as f32).round() as i32
}

fn dim_frame(frame: &mut [u8]) {
    for chunk in frame.chunks_exact_mut(4) {
        for channel in &mut chunk[..3] {
            *channel = (*channel as u16 * PAUSE_DIM_NUMERATOR / PAUSE_DIM_DENOMINATOR) as u8;
        }
    }
}

fn draw_world_grid(frame: &mut [u8], width: u32, height: u32, camera: &Camera2D) {
    if width == 0 || height == 0 {
        return;
    }

    let pixels_per_world = camera_pixels_per_world(camera);
    let (ix_start, ix_end, iy_start, iy_end) =
        visible_grid_index_bounds(camera.position, width, height, pixels_per_world);

    for ix in ix_start..=ix_end {
        let world_x = ix as f32 * GRID_CELL_WORLD;
        let (screen_x, _) = world_to_screen_px(
            camera,
            (width, height),
            Vec2::new(world_x, camera.position.y),
        );
        let color = if is_major_index(ix) {
            GRID_MAJOR_COLOR
        } else {
            GRID_MINOR_COLOR
        };
        draw_vertical_line_clipped(frame, width, height, screen_x, color);
    }

    for iy in iy_start..=iy_end {
        let world_y = iy as f32 * GRID_CELL_WORLD;
        let (_, screen_y) = world_to_screen_px(
            camera,
            (width, height),
            Vec2::new(camera.position.x, world_y),
        );
        let color = if is_major_index(iy) {
            GRID_MAJOR_COLOR
        } else {
            GRID_MINOR_COLOR
        };
        draw_horizontal_line_clipped(frame, width, height, screen_y, color);
    }
}

fn visible_grid_index_bounds(
    camera_pos: Vec2,
    width: u32,
    height: u32,
    pixels_per_world: f32,
) -> (i32, i32, i32, i32) {
    let half_w_world = width as f32 / (2.0 * pixels_per_world);
    let half_h_world = height as f32 / (2.0 * pixels_per_world);
    let min_x = camera_pos.x - half_w_world;
    let max_x = camera_pos.x + half_w_world;
    let min_y = camera_pos.y - half_h_world;
    let max_y = camera_pos.y + half_h_world;

    let ix_start = (min_x / GRID_CELL_WORLD).floor() as i32 - 1;
    let ix_end = (max_x / GRID_CELL_WORLD).ceil() as i32 + 1;
    let iy_start = (min_y / GRID_CELL_WORLD).floor() as i32 - 1;
    let iy_end = (max_y / GRID_CELL_WORLD).ceil() as i32 + 1;
    (ix_start, ix_end, iy_start, iy_end)
}

fn is_major_index(idx: i32) -> bool {
    idx.rem_euclid(GRID_MAJOR_EVERY) == 0
}

fn draw_vertical_line_clipped(frame: &mut [u8], width: u32, height: u32, x: i32, color: [u8; 4]) {
    if width == 0 || height == 0 || x < 0 || x >= width as i32 {
        return;
    }
    for y in 0..height as i32 {
        write_pixel_rgba_clipped(frame, width as usize, x, y, color);
    }
}

fn draw_horizontal_line_clipped(frame: &mut [u8], width: u32, height: u32, y: i32, color: [u8; 4]) {
    if width == 0 || height == 0 || y < 0 || y >= height as i32 {
        return;
    }
    for x in 0..width as i32 {
        write_pixel_rgba_clipped(frame, width as usize, x, y, color);
    }
}

fn write_pixel_rgba_clipped(frame: &mut [u8], width: usize, x: i32, y: i32, color: [u8; 4]) {
    if x < 0 || y < 0 || x as usize >= width {
        return;
    }
    let x = x as usize;
    let y = y as usize;
    let Some(pixel_offset) = y.checked_mul(width).and_then(|row| row.checked_add(x)) else {
        return;
    };
    let Some(byte_offset) = pixel_offset.checked_mul(4) else {
        return;
    };
    let Some(end) = byte_offset.checked_add(4) else {
        return;
    };
    if end > frame.len() {
        return;
    }
    frame[byte_offset..end].copy_from_slice(&color);
}

fn fill_rect_clipped(frame: &mut [u8], width: u32, height: u32, rect: ScreenRectPx, color: [u8; 4]) {
    let left = rect.left.max(0);
    let right = rect.right.min(width as i32);
    let top = rect.top.max(0);
    let bottom = rect.bottom.min(height as i32);
    for y in top..bottom {
        for x in left..right {
            write_pixel_rgba_clipped(frame, width as usize, x, y, color);
        }
    }
}

fn draw_rect_outline(frame: &mut [u8], width: u32, _height: u32, rect: ScreenRectPx, color: [u8; 4]) {
    let right = rect.right - 1;
    let bottom = rect.bottom - 1;
    for x in rect.left..=right {
        write_pixel_rgba_clipped(frame, width as usize, x, rect.top, color);
        write_pixel_rgba_clipped(frame, width as usize, x, bottom, color);
    }
    for y in rect.top..=bottom {
        write_pixel_rgba_clipped(frame, width as usize, rect.left, y, color);
        write_pixel_rgba_clipped(frame, width as usize, right, y, color);
    }
}
