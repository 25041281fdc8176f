use rayon::{
    iter::{IndexedParallelIterator, ParallelIterator},
    slice::ParallelSliceMut,
};

use crate::geometry::Vec2;

/// Precomputed nearest-neighbour mapping from window pixels to internal
/// framebuffer pixels.
pub struct ScaleLut {
    src_x: Vec<usize>,
    src_y: Vec<usize>,
    // source pixels per destination pixel
    sx: f64,
    sy: f64,
}

impl ScaleLut {
    pub fn empty() -> Self {
        Self {
            src_x: Vec::new(),
            src_y: Vec::new(),
            sx: 1.0,
            sy: 1.0,
        }
    }

    pub fn new(dst_w: usize, dst_h: usize, src_w: usize, src_h: usize) -> Self {
        let sx = src_w as f64 / dst_w.max(1) as f64;
        let sy = src_h as f64 / dst_h.max(1) as f64;

        // Sample at destination pixel centers
        let map = |n: usize, scale: f64, limit: usize| -> Vec<usize> {
            (0..n)
                .map(|i| (((i as f64 + 0.5) * scale) as usize).min(limit.saturating_sub(1)))
                .collect()
        };

        Self {
            src_x: map(dst_w, sx, src_w),
            src_y: map(dst_h, sy, src_h),
            sx,
            sy,
        }
    }

    /// Window position (physical pixels) to internal framebuffer position.
    #[inline]
    pub fn to_source(&self, x: f64, y: f64) -> Vec2 {
        Vec2::new(x * self.sx, y * self.sy)
    }

    #[inline]
    pub fn dst_size(&self) -> (usize, usize) {
        (self.src_x.len(), self.src_y.len())
    }
}

/// Parallel nearest-neighbour stretch of `src` into `dst`, one row per task.
pub fn blit_nearest(dst: &mut [u32], dw: usize, src: &[u32], sw: usize, lut: &ScaleLut) {
    if dw == 0 {
        return;
    }
    dst.par_chunks_mut(dw).enumerate().for_each(|(y, dst_row)| {
        let Some(&sy) = lut.src_y.get(y) else {
            return;
        };
        let row = &src[sy * sw..(sy + 1) * sw];
        for (d, &sx) in dst_row.iter_mut().zip(&lut.src_x) {
            *d = row[sx];
        }
    });
}
