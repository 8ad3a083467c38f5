//! CPU framebuffer with the rasterization primitives the painter needs.

use raylib::core::texture::RaylibTexture2D;
use raylib::prelude::*;

use super::surface::{validate_polygon, Surface};
use crate::error::RasterError;

pub struct Framebuffer {
    pub color_buffer: Vec<Color>,
    pub width: u32,
    pub height: u32,
    /// RGBA8 bytes reused for every texture upload.
    upload: Vec<u8>,
}

impl Framebuffer {
    pub fn new(width: u32, height: u32) -> Self {
        let size = (width * height) as usize;
        Self {
            color_buffer: vec![Color::BLACK; size],
            width,
            height,
            upload: Vec::with_capacity(size * 4),
        }
    }

    #[inline]
    pub fn set_pixel(&mut self, x: i32, y: i32, color: Color) {
        if x >= 0 && y >= 0 && (x as u32) < self.width && (y as u32) < self.height {
            self.color_buffer[(y as u32 * self.width + x as u32) as usize] = color;
        }
    }

    #[inline]
    pub fn get_pixel(&self, x: u32, y: u32) -> Option<Color> {
        if x < self.width && y < self.height {
            return Some(self.color_buffer[(y * self.width + x) as usize]);
        }
        None
    }

    /// Fill `[x0, x1]` on row `y`, clipped to the buffer.
    fn fill_span(&mut self, y: i32, x0: i32, x1: i32, color: Color) {
        if y < 0 || y >= self.height as i32 {
            return;
        }
        let x0 = x0.max(0);
        let x1 = x1.min(self.width as i32 - 1);
        if x0 > x1 {
            return;
        }
        let row = y as usize * self.width as usize;
        self.color_buffer[row + x0 as usize..=row + x1 as usize].fill(color);
    }

    /// Copy the pixels into a texture of the same size.
    pub fn upload_to_texture(&mut self, texture: &mut Texture2D) {
        self.upload.clear();
        self.upload
            .extend(self.color_buffer.iter().flat_map(|c| [c.r, c.g, c.b, c.a]));
        let _ = texture.update_texture(&self.upload);
    }
}

/// Clip a segment to `[0, max_x] x [0, max_y]` (Liang-Barsky).
fn clip_segment(from: Vector2, to: Vector2, max_x: f32, max_y: f32) -> Option<(Vector2, Vector2)> {
    let (dx, dy) = (to.x - from.x, to.y - from.y);
    let mut t0 = 0.0f32;
    let mut t1 = 1.0f32;
    for (p, q) in [(-dx, from.x), (dx, max_x - from.x), (-dy, from.y), (dy, max_y - from.y)] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            t0 = t0.max(r);
        } else {
            t1 = t1.min(r);
        }
        if t0 > t1 {
            return None;
        }
    }
    Some((
        Vector2::new(from.x + dx * t0, from.y + dy * t0),
        Vector2::new(from.x + dx * t1, from.y + dy * t1),
    ))
}

impl Surface for Framebuffer {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn clear(&mut self, color: Color) {
        self.color_buffer.fill(color);
    }

    /// Even-odd scanline fill sampled at pixel centers.
    fn fill_polygon(&mut self, points: &[Vector2], color: Color) -> Result<(), RasterError> {
        validate_polygon(points)?;
        let min_y = points.iter().map(|p| p.y).fold(f32::INFINITY, f32::min);
        let max_y = points.iter().map(|p| p.y).fold(f32::NEG_INFINITY, f32::max);
        let y_start = (min_y.floor() as i32).max(0);
        let y_end = (max_y.ceil() as i32).min(self.height as i32 - 1);

        let mut crossings: Vec<f32> = Vec::with_capacity(points.len());
        for y in y_start..=y_end {
            let sample = y as f32 + 0.5;
            crossings.clear();
            for (i, a) in points.iter().enumerate() {
                let b = points[(i + 1) % points.len()];
                if (a.y <= sample) != (b.y <= sample) {
                    let t = (sample - a.y) / (b.y - a.y);
                    crossings.push(a.x + t * (b.x - a.x));
                }
            }
            crossings.sort_by(f32::total_cmp);
            for pair in crossings.chunks_exact(2) {
                let x0 = (pair[0] - 0.5).ceil() as i32;
                let x1 = (pair[1] - 0.5).ceil() as i32 - 1;
                self.fill_span(y, x0, x1, color);
            }
        }
        Ok(())
    }

    /// Bresenham line, clipped to the buffer first.
    fn draw_line(&mut self, from: Vector2, to: Vector2, color: Color) {
        if !(from.x.is_finite() && from.y.is_finite() && to.x.is_finite() && to.y.is_finite()) {
            return;
        }
        let max_x = self.width.saturating_sub(1) as f32;
        let max_y = self.height.saturating_sub(1) as f32;
        let Some((a, b)) = clip_segment(from, to, max_x, max_y) else {
            return;
        };

        let (mut x0, mut y0) = (a.x.round() as i32, a.y.round() as i32);
        let (x1, y1) = (b.x.round() as i32, b.y.round() as i32);
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;
        loop {
            self.set_pixel(x0, y0, color);
            if x0 == x1 && y0 == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x0 += sx;
            }
            if e2 <= dx {
                err += dx;
                y0 += sy;
            }
        }
    }

    fn fill_circle(&mut self, center: Vector2, radius: f32, color: Color) {
        if !(center.x.is_finite() && center.y.is_finite() && radius > 0.0) {
            return;
        }
        let r = radius.ceil() as i32;
        let (cx, cy) = (center.x.round() as i32, center.y.round() as i32);
        for dy in -r..=r {
            let span = (radius * radius - (dy * dy) as f32).max(0.0).sqrt() as i32;
            self.fill_span(cy + dy, cx - span, cx + span, color);
        }
    }

    fn fill_rect(&mut self, x: i32, y: i32, width: i32, height: i32, color: Color) {
        for row in y..y + height {
            self.fill_span(row, x, x + width - 1, color);
        }
    }
}
