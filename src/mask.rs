use image::GrayImage;

use crate::config::MaskSettings;
use crate::error::filled_vec;
use crate::window::SquareWindow;
use crate::{MaskError, MaskResult};

/// A single refinement step applied to an alpha channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaskOperation {
    Erode { radius: u32 },
    Blur { radius: u32 },
}

impl MaskOperation {
    pub fn apply(&self, alpha: GrayImage) -> MaskResult<GrayImage> {
        match self {
            MaskOperation::Erode { radius } => erode(alpha, *radius),
            MaskOperation::Blur { radius } => box_blur(alpha, *radius),
        }
    }
}

/// Thread an alpha channel through a list of operations, returning the result.
///
/// Stops at the first step that fails.
pub fn apply_operations(alpha: GrayImage, operations: &[MaskOperation]) -> MaskResult<GrayImage> {
    operations.iter().try_fold(alpha, |current, op| {
        log::debug!("applying {op:?}");
        op.apply(current)
    })
}

/// Produce the refinement sequence for `settings`: erosion, then blur.
/// Steps whose radius is zero are omitted.
pub fn operations_from_settings(settings: &MaskSettings) -> Vec<MaskOperation> {
    let mut operations = Vec::new();
    if settings.erosion_radius > 0 {
        operations.push(MaskOperation::Erode {
            radius: settings.erosion_radius,
        });
    }
    if settings.blur_radius > 0 {
        operations.push(MaskOperation::Blur {
            radius: settings.blur_radius,
        });
    }
    operations
}

/// Choke the opaque region: clear every pixel that has a transparent pixel
/// within its clipped `radius` square.
///
/// Decisions are made against the input as given, so clearing does not cascade
/// within one call. Transparent pixels are never made opaque. A zero radius
/// returns the mask untouched.
pub fn erode(mut alpha: GrayImage, radius: u32) -> MaskResult<GrayImage> {
    if radius == 0 {
        return Ok(alpha);
    }
    let (w, h) = alpha.dimensions();
    let counts = SquareWindow::new(w, h, radius).zero_counts(alpha.as_raw())?;
    for (value, zeros) in alpha.iter_mut().zip(counts) {
        if zeros > 0 {
            *value = 0;
        }
    }
    Ok(alpha)
}

/// Unweighted box blur of the alpha channel.
///
/// Each output pixel is the floored mean of its clipped `radius` square; edge
/// pixels average over fewer samples rather than padding. A zero radius
/// returns the mask untouched.
pub fn box_blur(alpha: GrayImage, radius: u32) -> MaskResult<GrayImage> {
    if radius == 0 {
        return Ok(alpha);
    }
    let (w, h) = alpha.dimensions();
    let mut out = filled_vec(alpha.as_raw().len(), 0u8, "blurred alpha")?;
    SquareWindow::new(w, h, radius).for_each_sum(alpha.as_raw(), u64::from, |i, sum, area| {
        out[i] = (sum / area) as u8;
    })?;
    GrayImage::from_raw(w, h, out)
        .ok_or_else(|| MaskError::Internal(format!("blurred alpha does not fit {w}x{h}")))
}
