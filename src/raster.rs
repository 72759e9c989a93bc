//! CPU framebuffer that executes draw commands.

use crate::renderer::{DrawCommand, Rgb};
use crate::texture::Texture;

#[inline]
pub fn pack_rgb(r: u8, g: u8, b: u8) -> u32 {
    // BGRA8 in little-endian memory
    (b as u32) | ((g as u32) << 8) | ((r as u32) << 16)
    // Alpha at 0
}

#[inline]
fn blend(dst: u32, color: Rgb, alpha: f64) -> u32 {
    let mix = |d: u32, s: u8| -> u8 {
        let d = (d & 0xFF) as f64;
        (d + (f64::from(s) - d) * alpha).round() as u8
    };
    pack_rgb(
        mix(dst >> 16, color.0),
        mix(dst >> 8, color.1),
        mix(dst, color.2),
    )
}

/// Clamp `[start, start + len)` to whole pixels in `0..limit`.
#[inline]
fn pixel_range(start: f64, len: f64, limit: usize) -> std::ops::Range<usize> {
    if !(start.is_finite() && len.is_finite()) {
        return 0..0;
    }
    let lo = start.floor().max(0.0);
    let hi = (start + len).ceil().min(limit as f64);
    if lo >= hi {
        return 0..0;
    }
    lo as usize..hi as usize
}

pub struct Framebuffer {
    pub width: usize,
    pub height: usize,
    pub pixels: Vec<u32>,
}

impl Framebuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width * height],
        }
    }

    /// Paints sky over the top half and ground below it.
    pub fn clear(&mut self) {
        let sky = pack_rgb(30, 30, 70);
        let ground = pack_rgb(40, 40, 40);

        let mid = self.height / 2;
        let (top, bottom) = self.pixels.split_at_mut(mid * self.width);
        top.fill(sky);
        bottom.fill(ground);
    }

    pub fn execute(&mut self, commands: &[DrawCommand], texture: &Texture) {
        for command in commands {
            match *command {
                DrawCommand::Blit {
                    left,
                    width,
                    top,
                    height,
                    texture_u,
                } => self.blit_column(left, width, top, height, texture, texture_u),
                DrawCommand::Fill {
                    left,
                    width,
                    top,
                    height,
                    color,
                    alpha,
                } => self.fill(left, width, top, height, color, alpha),
            }
        }
    }

    fn blit_column(
        &mut self,
        left: f64,
        width: f64,
        top: f64,
        height: f64,
        texture: &Texture,
        texture_u: f64,
    ) {
        if height <= 0.0 {
            return;
        }
        let tx = texture.column(texture_u);
        let xs = pixel_range(left, width, self.width);
        for y in pixel_range(top, height, self.height) {
            let v = (y as f64 + 0.5 - top) / height;
            let ty = (v * texture.height as f64).max(0.0) as usize;
            let color = texture.sample(tx, ty);
            let row = y * self.width;
            self.pixels[row + xs.start..row + xs.end].fill(color);
        }
    }

    fn fill(&mut self, left: f64, width: f64, top: f64, height: f64, color: Rgb, alpha: f64) {
        let alpha = if alpha.is_nan() { 0.0 } else { alpha.clamp(0.0, 1.0) };
        if alpha == 0.0 {
            return;
        }
        let xs = pixel_range(left, width, self.width);
        for y in pixel_range(top, height, self.height) {
            let row = y * self.width;
            for px in &mut self.pixels[row + xs.start..row + xs.end] {
                *px = blend(*px, color, alpha);
            }
        }
    }
}
