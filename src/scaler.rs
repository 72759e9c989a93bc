use rayon::{
    iter::{IndexedParallelIterator, IntoParallelRefIterator, ParallelIterator},
    slice::ParallelSliceMut,
};

/// Source sample pair and 8.8 fixed-point weight for one destination coordinate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Tap {
    lo: usize,
    hi: usize,
    weight: u32,
}

fn build_taps(dst_len: usize, src_len: usize) -> Vec<Tap> {
    let scale = src_len as f32 / dst_len as f32;
    (0..dst_len)
        .map(|d| {
            let f = d as f32 * scale;
            let lo = (f.floor() as usize).min(src_len - 1);
            Tap {
                lo,
                hi: (lo + 1).min(src_len - 1),
                weight: ((f - lo as f32) * 256.0).round().clamp(0.0, 256.0) as u32,
            }
        })
        .collect()
}

#[inline]
fn lerp_color_u32(a: u32, b: u32, w256: u32) -> u32 {
    let inv = 256 - w256;
    // R and B share one multiply (00RR00BB), G goes alone (0000GG00)
    let rb = (((a & 0x00FF00FF) * inv + (b & 0x00FF00FF) * w256) >> 8) & 0x00FF00FF;
    let g = (((a & 0x0000FF00) * inv + (b & 0x0000FF00) * w256) >> 8) & 0x0000FF00;
    rb | g
}

/// Bilinear stretch of the internal framebuffer onto the window surface.
pub struct SurfaceScaler {
    src_w: usize,
    xs: Vec<Tap>,
    ys: Vec<Tap>,
}

impl SurfaceScaler {
    pub fn new(dst_w: usize, dst_h: usize, src_w: usize, src_h: usize) -> Self {
        if src_w == 0 || src_h == 0 {
            return Self::empty();
        }
        Self {
            src_w,
            xs: build_taps(dst_w, src_w),
            ys: build_taps(dst_h, src_h),
        }
    }

    pub fn empty() -> Self {
        Self {
            src_w: 0,
            xs: Vec::new(),
            ys: Vec::new(),
        }
    }

    /// Rows are written in parallel. `dst` must hold `dst_w * dst_h` pixels.
    pub fn stretch(&self, dst: &mut [u32], src: &[u32]) {
        let dw = self.xs.len();
        if dw == 0 {
            return;
        }
        let sw = self.src_w;
        dst.par_chunks_mut(dw)
            .zip(self.ys.par_iter())
            .for_each(|(dst_row, ty)| {
                let row0 = &src[ty.lo * sw..(ty.lo + 1) * sw];
                let row1 = &src[ty.hi * sw..(ty.hi + 1) * sw];
                for (out, tx) in dst_row.iter_mut().zip(&self.xs) {
                    let top = lerp_color_u32(row0[tx.lo], row0[tx.hi], tx.weight);
                    let bot = lerp_color_u32(row1[tx.lo], row1[tx.hi], tx.weight);
                    *out = lerp_color_u32(top, bot, ty.weight);
                }
            });
    }
}
