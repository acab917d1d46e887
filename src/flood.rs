use image::{GrayImage, RgbaImage};

use crate::color::{Color, distance, percent_of};
use crate::config::SeedPoint;
use crate::error::filled_vec;
use crate::{MaskError, MaskResult};

/// Parameters for [`flood_clear_mask`], already resolved to absolute distances.
#[derive(Debug, Clone, Copy)]
pub struct FloodParams {
    /// Pixels this close to the contour color stop the fill.
    pub contour: Color,
    pub tolerance: f64,
}

impl FloodParams {
    /// Build parameters from a 0-100 percentage of `max_distance`.
    pub fn from_percent(contour: Color, tolerance: f64, max_distance: f64) -> Self {
        Self {
            contour,
            tolerance: percent_of(tolerance, max_distance),
        }
    }

    /// Whether a pixel of this color bounds the fill. Inclusive at the cutoff.
    pub fn is_boundary(&self, color: Color) -> bool {
        distance(color, self.contour) <= self.tolerance
    }
}

/// Grow a transparent region from every seed until pixels resembling the contour color.
///
/// Starts fully opaque. Each in-bounds seed runs an iterative 4-connected
/// depth-first fill on an explicit stack; all seeds share one visited map.
/// Boundary pixels stay opaque and do not propagate. Out-of-bounds seeds are
/// skipped.
pub fn flood_clear_mask(
    rgba: &RgbaImage,
    seeds: &[SeedPoint],
    params: &FloodParams,
) -> MaskResult<GrayImage> {
    let (w, h) = rgba.dimensions();
    let (w_usize, h_usize) = (w as usize, h as usize);
    let len = w_usize * h_usize;

    let mut alpha = filled_vec(len, 255u8, "alpha channel")?;
    let mut visited = filled_vec(len, false, "visited map")?;
    let pixels = rgba.as_raw();
    let mut stack: Vec<usize> = Vec::new();

    for seed in seeds {
        let Some((sx, sy)) = seed.to_pixel(w, h) else {
            log::debug!("skipping out-of-bounds seed ({}, {})", seed.x, seed.y);
            continue;
        };
        push(&mut stack, sy as usize * w_usize + sx as usize)?;

        while let Some(id) = stack.pop() {
            if visited[id] {
                continue;
            }
            visited[id] = true;

            let base = id * 4;
            let color = Color::new(pixels[base], pixels[base + 1], pixels[base + 2]);
            if params.is_boundary(color) {
                continue;
            }
            alpha[id] = 0;

            let (x, y) = (id % w_usize, id / w_usize);
            if x > 0 && !visited[id - 1] {
                push(&mut stack, id - 1)?;
            }
            if x + 1 < w_usize && !visited[id + 1] {
                push(&mut stack, id + 1)?;
            }
            if y > 0 && !visited[id - w_usize] {
                push(&mut stack, id - w_usize)?;
            }
            if y + 1 < h_usize && !visited[id + w_usize] {
                push(&mut stack, id + w_usize)?;
            }
        }
    }

    GrayImage::from_raw(w, h, alpha)
        .ok_or_else(|| MaskError::Internal(format!("alpha channel does not fit {w}x{h}")))
}

/// Push onto the fill stack, growing it fallibly.
fn push(stack: &mut Vec<usize>, id: usize) -> MaskResult<()> {
    stack
        .try_reserve(1)
        .map_err(|e| MaskError::Allocation(format!("fill stack of {} entries: {e}", stack.len())))?;
    stack.push(id);
    Ok(())
}
