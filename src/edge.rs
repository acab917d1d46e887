use image::{GrayImage, RgbaImage};

use crate::color::Color;
use crate::window::SquareWindow;
use crate::{MaskError, MaskResult};

/// Outline the cutout: recolor every opaque pixel that has a transparent pixel
/// within its clipped `radius` square.
///
/// Opacity is read from `alpha`, not from the buffer's own alpha bytes, which
/// are left untouched. A zero radius is a no-op.
pub fn paint_edges(
    rgba: &mut RgbaImage,
    alpha: &GrayImage,
    radius: u32,
    color: Color,
) -> MaskResult<()> {
    let expected = rgba.dimensions();
    let found = alpha.dimensions();
    if expected != found {
        return Err(MaskError::AlphaMismatch { expected, found });
    }
    if radius == 0 {
        return Ok(());
    }

    let (w, h) = expected;
    let counts = SquareWindow::new(w, h, radius).zero_counts(alpha.as_raw())?;
    let mut painted = 0usize;
    for ((px, a), zeros) in rgba.pixels_mut().zip(alpha.pixels()).zip(counts) {
        if a.0[0] != 0 && zeros > 0 {
            px.0[..3].copy_from_slice(&<[u8; 3]>::from(color));
            painted += 1;
        }
    }
    log::debug!("edge paint recolored {painted} pixels with {color}");
    Ok(())
}
