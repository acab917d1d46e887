use image::{GrayImage, Luma, RgbaImage};

use crate::{MaskError, MaskResult};

/// Write a finished alpha channel into the alpha byte of every pixel.
///
/// RGB channels are left as they are.
pub fn composite_alpha(rgba: &mut RgbaImage, alpha: &GrayImage) -> MaskResult<()> {
    let expected = rgba.dimensions();
    let found = alpha.dimensions();
    if expected != found {
        return Err(MaskError::AlphaMismatch { expected, found });
    }

    for (px, a) in rgba.pixels_mut().zip(alpha.pixels()) {
        px.0[3] = a.0[0];
    }
    Ok(())
}

/// Copy the alpha byte of every pixel out into a grayscale mask.
pub fn extract_alpha(rgba: &RgbaImage) -> GrayImage {
    let (w, h) = rgba.dimensions();
    let mut out = GrayImage::new(w, h);
    for (px, out_px) in rgba.pixels().zip(out.pixels_mut()) {
        *out_px = Luma([px.0[3]]);
    }
    out
}
