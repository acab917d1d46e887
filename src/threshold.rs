use image::{GrayImage, RgbaImage};

use crate::color::{Color, distance, percent_of};
use crate::error::filled_vec;
use crate::{MaskError, MaskResult};

/// Polarity of the global color classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarity {
    /// Pixels near the target become transparent.
    Remove,
    /// Pixels near the target stay opaque, everything else is cleared.
    Keep,
}

/// Parameters for [`threshold_mask`], already resolved to absolute distances.
#[derive(Debug, Clone, Copy)]
pub struct ThresholdParams {
    pub target: Color,
    /// Hard cutoff distance.
    pub tolerance: f64,
    /// Width of the linear ramp past the cutoff.
    pub smoothness: f64,
    pub polarity: Polarity,
}

impl ThresholdParams {
    /// Build parameters from 0-100 percentages of `max_distance`.
    pub fn from_percent(
        target: Color,
        tolerance: f64,
        smoothness: f64,
        max_distance: f64,
        polarity: Polarity,
    ) -> Self {
        Self {
            target,
            tolerance: percent_of(tolerance, max_distance),
            smoothness: percent_of(smoothness, max_distance),
            polarity,
        }
    }

    /// Alpha for a pixel at `dist` from the target.
    pub fn alpha_for(&self, dist: f64) -> u8 {
        let (tol, smooth) = (self.tolerance, self.smoothness);
        match self.polarity {
            Polarity::Remove => {
                if dist <= tol {
                    0
                } else if smooth > 0.0 && dist <= tol + smooth {
                    ramp(255.0 * (dist - tol) / smooth)
                } else {
                    255
                }
            }
            Polarity::Keep => {
                if dist > tol + smooth {
                    0
                } else if smooth > 0.0 && dist > tol {
                    ramp(255.0 * (1.0 - (dist - tol) / smooth))
                } else {
                    255
                }
            }
        }
    }
}

fn ramp(value: f64) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}

/// Classify every pixel by its RGB distance to the target color.
///
/// The input alpha channel is ignored.
pub fn threshold_mask(rgba: &RgbaImage, params: &ThresholdParams) -> MaskResult<GrayImage> {
    let (w, h) = rgba.dimensions();
    let mut out = filled_vec(w as usize * h as usize, 0u8, "alpha channel")?;
    for (rgba_px, out_px) in rgba.pixels().zip(out.iter_mut()) {
        let [r, g, b, _] = rgba_px.0;
        let dist = distance(Color::new(r, g, b), params.target);
        *out_px = params.alpha_for(dist);
    }
    GrayImage::from_raw(w, h, out)
        .ok_or_else(|| MaskError::Internal(format!("alpha channel does not fit {w}x{h}")))
}
