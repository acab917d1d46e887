//! Sums over clipped square neighborhoods.
//!
//! Erosion, box blur and edge painting all ask the same question of every
//! pixel: what is the total of some per-pixel value over the window
//! `[x - r, x + r] x [y - r, y + r]`, clipped to the image? Windows are never
//! padded or wrapped, so edge pixels see a smaller area.
//!
//! Row sums come from a per-row prefix array; column sums slide a running total
//! down the image. Cost is independent of the radius.

use ndarray::Array2;

use crate::error::filled_vec;
use crate::{MaskError, MaskResult};

/// A square neighborhood of a given radius over a `width x height` grid.
#[derive(Debug, Clone, Copy)]
pub(crate) struct SquareWindow {
    width: usize,
    height: usize,
    radius: usize,
}

impl SquareWindow {
    pub(crate) fn new(width: u32, height: u32, radius: u32) -> Self {
        Self {
            width: width as usize,
            height: height as usize,
            radius: radius as usize,
        }
    }

    /// Half-open range `[lo, hi)` of the window around `center` along an axis of `len`.
    fn span(&self, center: usize, len: usize) -> (usize, usize) {
        let lo = center.saturating_sub(self.radius);
        let hi = center.saturating_add(self.radius).saturating_add(1).min(len);
        (lo, hi)
    }

    /// Visit every pixel in row-major order with `(index, window_sum, window_area)`,
    /// where the sum is of `weight(value)` over the clipped window.
    ///
    /// Working buffers are allocated fallibly; exhaustion is reported as
    /// [`MaskError::Allocation`] before any pixel is visited.
    pub(crate) fn for_each_sum<W, F>(&self, values: &[u8], weight: W, mut visit: F) -> MaskResult<()>
    where
        W: Fn(u8) -> u64,
        F: FnMut(usize, u64, u64),
    {
        let (w, h) = (self.width, self.height);
        let len = w
            .checked_mul(h)
            .ok_or_else(|| MaskError::Allocation(format!("window grid {w}x{h} overflows")))?;

        let table = filled_vec(len, 0u64, "row sums")?;
        let mut row_sums =
            Array2::from_shape_vec((h, w), table).map_err(|e| MaskError::Internal(e.to_string()))?;
        let mut prefix = filled_vec(w + 1, 0u64, "row prefix")?;
        let mut acc = filled_vec(w, 0u64, "column totals")?;

        if values.len() != len {
            return Err(MaskError::InvalidBuffer {
                expected: len,
                found: values.len(),
            });
        }

        for (src, mut dst) in values.chunks_exact(w.max(1)).zip(row_sums.rows_mut()) {
            for (x, &v) in src.iter().enumerate() {
                prefix[x + 1] = prefix[x] + weight(v);
            }
            for (x, out) in dst.iter_mut().enumerate() {
                let (lo, hi) = self.span(x, w);
                *out = prefix[hi] - prefix[lo];
            }
        }

        // running column totals for rows [top, bottom)
        let (mut top, mut bottom) = (0usize, 0usize);
        for y in 0..h {
            let (lo, hi) = self.span(y, h);
            while bottom < hi {
                for (a, &v) in acc.iter_mut().zip(row_sums.row(bottom)) {
                    *a += v;
                }
                bottom += 1;
            }
            while top < lo {
                for (a, &v) in acc.iter_mut().zip(row_sums.row(top)) {
                    *a -= v;
                }
                top += 1;
            }
            let rows = (hi - lo) as u64;
            for (x, &sum) in acc.iter().enumerate() {
                let (cl, ch) = self.span(x, w);
                visit(y * w + x, sum, rows * (ch - cl) as u64);
            }
        }
        Ok(())
    }

    /// Count of zero-valued pixels in each pixel's window.
    pub(crate) fn zero_counts(&self, values: &[u8]) -> MaskResult<Vec<u64>> {
        let mut counts = filled_vec(values.len(), 0u64, "zero counts")?;
        self.for_each_sum(values, |v| u64::from(v == 0), |i, sum, _| counts[i] = sum)?;
        Ok(counts)
    }
}
