//! Procedural wall texture.

use crate::raster::pack_rgb;

pub struct Texture {
    pub width: usize,
    pub height: usize,
    pixels: Vec<u32>,
}

impl Texture {
    /// 64x64 brick pattern: 4 courses per texture, alternating half-brick offset.
    pub fn bricks() -> Self {
        const SIZE: usize = 64;
        const COURSE: usize = 16;
        const BRICK: usize = 32;

        let brick = pack_rgb(150, 72, 54);
        let brick_dark = pack_rgb(128, 60, 46);
        let mortar = pack_rgb(190, 184, 170);

        let mut pixels = vec![0; SIZE * SIZE];
        for y in 0..SIZE {
            let course = y / COURSE;
            let shift = if course % 2 == 0 { 0 } else { BRICK / 2 };
            for x in 0..SIZE {
                let bx = (x + shift) % BRICK;
                let by = y % COURSE;
                pixels[y * SIZE + x] = if bx < 2 || by < 2 {
                    mortar
                } else if ((x + shift) / BRICK + course) % 2 == 0 {
                    brick
                } else {
                    brick_dark
                };
            }
        }

        Self {
            width: SIZE,
            height: SIZE,
            pixels,
        }
    }

    /// Texture column for a U coordinate in `[0, 1)`.
    #[inline]
    pub fn column(&self, u: f64) -> usize {
        ((u * self.width as f64).floor().max(0.0) as usize).min(self.width - 1)
    }

    #[inline]
    pub fn sample(&self, tx: usize, ty: usize) -> u32 {
        self.pixels[ty.min(self.height - 1) * self.width + tx.min(self.width - 1)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_selection() {
        let tex = Texture::bricks();
        assert_eq!(tex.column(0.0), 0);
        assert_eq!(tex.column(0.5), 32);
        assert_eq!(tex.column(0.999_999), 63);
        assert_eq!(tex.column(1.0), 63);
        assert_eq!(tex.column(f64::NAN), 0);
    }

    #[test]
    fn test_mortar_lines() {
        let tex = Texture::bricks();
        let mortar = pack_rgb(190, 184, 170);
        assert_eq!(tex.sample(10, 0), mortar);
        assert_eq!(tex.sample(0, 5), mortar);
        assert_ne!(tex.sample(10, 5), mortar);
        // Second course is offset by half a brick
        assert_eq!(tex.sample(16, 20), mortar);
    }
}
