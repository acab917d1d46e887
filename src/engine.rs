//! Single entry point of the masking engine.
//!
//! A call runs `validate -> base mask -> [erode] -> [blur] -> [edge paint] ->
//! composite` to completion on the caller's thread. The color buffer is moved
//! in and moved back out; nothing survives between calls.

use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};

use image::{GrayImage, RgbaImage};

use crate::config::{MaskSettings, Mode};
use crate::edge::paint_edges;
use crate::flood::{FloodParams, flood_clear_mask};
use crate::foreground::composite_alpha;
use crate::mask::{apply_operations, operations_from_settings};
use crate::threshold::{Polarity, ThresholdParams, threshold_mask};
use crate::{MaskError, MaskResult};

/// Bytes per pixel in a color buffer (R, G, B, A).
pub const STRIDE: usize = 4;

/// A buffer plus everything needed to mask it.
#[derive(Debug, Clone)]
pub struct MaskRequest {
    /// Caller-chosen tag echoed on the response.
    pub generation: u64,
    /// Interleaved RGBA bytes, row-major, `width * height * 4` long.
    pub buffer: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub mode: Mode,
    pub settings: MaskSettings,
}

impl MaskRequest {
    pub fn new(buffer: Vec<u8>, width: u32, height: u32, mode: Mode, settings: MaskSettings) -> Self {
        Self {
            generation: 0,
            buffer,
            width,
            height,
            mode,
            settings,
        }
    }

    /// Wrap a decoded image without copying its pixels.
    pub fn from_image(image: RgbaImage, mode: Mode, settings: MaskSettings) -> Self {
        let (width, height) = image.dimensions();
        Self::new(image.into_raw(), width, height, mode, settings)
    }

    pub fn with_generation(mut self, generation: u64) -> Self {
        self.generation = generation;
        self
    }
}

/// Outcome of a [`MaskRequest`].
///
/// On failure `processed_buffer` is empty and `error` holds the message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaskResponse {
    pub generation: u64,
    pub processed_buffer: Vec<u8>,
    pub error: Option<String>,
}

impl MaskResponse {
    fn success(generation: u64, processed_buffer: Vec<u8>) -> Self {
        Self {
            generation,
            processed_buffer,
            error: None,
        }
    }

    fn failure(generation: u64, error: &MaskError) -> Self {
        Self {
            generation,
            processed_buffer: Vec::new(),
            error: Some(error.to_string()),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    /// Split into the processed buffer or the error message.
    pub fn into_result(self) -> Result<Vec<u8>, String> {
        match self.error {
            None => Ok(self.processed_buffer),
            Some(message) => Err(message),
        }
    }
}

/// Run a request to completion, never unwinding past this call.
///
/// Validation failures, allocation failures and panics inside a stage all come
/// back as a failure response.
pub fn process(request: MaskRequest) -> MaskResponse {
    let generation = request.generation;
    match catch_unwind(AssertUnwindSafe(|| try_process(request))) {
        Ok(Ok(buffer)) => MaskResponse::success(generation, buffer),
        Ok(Err(err)) => {
            log::debug!("request {generation} failed: {err}");
            MaskResponse::failure(generation, &err)
        }
        Err(payload) => {
            let err = MaskError::Internal(panic_message(payload.as_ref()));
            log::warn!("request {generation} panicked: {err}");
            MaskResponse::failure(generation, &err)
        }
    }
}

/// Validate and run a request, returning the processed buffer.
pub fn try_process(request: MaskRequest) -> MaskResult<Vec<u8>> {
    let MaskRequest {
        buffer,
        width,
        height,
        mode,
        settings,
        ..
    } = request;
    let expected = expected_len(width, height)?;
    if buffer.len() != expected {
        return Err(MaskError::InvalidBuffer {
            expected,
            found: buffer.len(),
        });
    }
    let found = buffer.len();
    let image = RgbaImage::from_raw(width, height, buffer)
        .ok_or(MaskError::InvalidBuffer { expected, found })?;
    Ok(process_image(image, &settings, mode)?.into_raw())
}

/// Mask an image in place and hand it back.
pub fn process_image(mut rgba: RgbaImage, settings: &MaskSettings, mode: Mode) -> MaskResult<RgbaImage> {
    let (width, height) = rgba.dimensions();
    expected_len(width, height)?;
    settings.validate()?;
    log::debug!("masking {width}x{height} in {mode} mode");

    let alpha = base_mask(&rgba, settings, mode)?;
    let alpha = apply_operations(alpha, &operations_from_settings(settings))?;
    paint_edges(&mut rgba, &alpha, settings.edge_paint_radius, settings.edge_color)?;
    composite_alpha(&mut rgba, &alpha)?;
    Ok(rgba)
}

/// Compute the unrefined alpha channel for `mode`.
pub fn base_mask(rgba: &RgbaImage, settings: &MaskSettings, mode: Mode) -> MaskResult<GrayImage> {
    let threshold = |polarity| {
        let params = ThresholdParams::from_percent(
            settings.target_color,
            settings.tolerance,
            settings.smoothness,
            settings.max_rgb_distance,
            polarity,
        );
        threshold_mask(rgba, &params)
    };
    match mode {
        Mode::Remove => threshold(Polarity::Remove),
        Mode::Keep => threshold(Polarity::Keep),
        Mode::FloodClear => {
            let params = FloodParams::from_percent(
                settings.contour_color,
                settings.tolerance,
                settings.max_rgb_distance,
            );
            flood_clear_mask(rgba, &settings.flood_seed_points, &params)
        }
    }
}

/// Byte length of a `width x height` color buffer.
fn expected_len(width: u32, height: u32) -> MaskResult<usize> {
    let invalid = MaskError::InvalidDimensions { width, height };
    if width == 0 || height == 0 {
        return Err(invalid);
    }
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|n| n.checked_mul(STRIDE))
        .ok_or(invalid)
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "stage panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;
    use crate::config::SeedPoint;
    use image::Rgba;

    fn uniform_buffer(w: u32, h: u32, rgba: [u8; 4]) -> Vec<u8> {
        RgbaImage::from_pixel(w, h, Rgba(rgba)).into_raw()
    }

    fn alphas(buffer: &[u8]) -> Vec<u8> {
        buffer.chunks_exact(STRIDE).map(|px| px[3]).collect()
    }

    mod process {
        use super::*;

        mod unit {
            use super::*;

            #[test]
            fn threshold_round_trip_clears_alpha_and_keeps_rgb() {
                let input = uniform_buffer(3, 2, [12, 34, 56, 255]);
                let settings = MaskSettings::default()
                    .with_target_color([12, 34, 56])
                    .with_tolerance(0.0);
                let response = process(MaskRequest::new(input, 3, 2, Mode::Remove, settings));

                assert!(response.is_ok());
                for px in response.processed_buffer.chunks_exact(STRIDE) {
                    assert_eq!(px, &[12, 34, 56, 0]);
                }
            }

            #[test]
            fn keep_mode_on_matching_image_is_opaque() {
                let input = uniform_buffer(2, 2, [200, 10, 10, 17]);
                let settings = MaskSettings::default().with_target_color([200, 10, 10]);
                let buffer = try_process(MaskRequest::new(input, 2, 2, Mode::Keep, settings)).unwrap();
                assert!(alphas(&buffer).iter().all(|&a| a == 255));
            }

            #[test]
            fn wrong_length_is_invalid_buffer() {
                let request =
                    MaskRequest::new(vec![0; 15], 2, 2, Mode::Remove, MaskSettings::default());
                match try_process(request).unwrap_err() {
                    MaskError::InvalidBuffer { expected, found } => {
                        assert_eq!(expected, 16);
                        assert_eq!(found, 15);
                    }
                    other => panic!("unexpected error: {other:?}"),
                }
            }

            #[test]
            fn failure_response_has_empty_buffer_and_message() {
                let request = MaskRequest::new(vec![0; 17], 2, 2, Mode::Keep, MaskSettings::default())
                    .with_generation(9);
                let response = process(request);
                assert_eq!(response.generation, 9);
                assert!(response.processed_buffer.is_empty());
                let message = response.into_result().unwrap_err();
                assert!(message.contains("17"));
            }

            #[test]
            fn zero_dimensions_are_rejected() {
                let request = MaskRequest::new(Vec::new(), 0, 3, Mode::Remove, MaskSettings::default());
                assert!(matches!(
                    try_process(request),
                    Err(MaskError::InvalidDimensions { width: 0, height: 3 })
                ));
            }

            #[test]
            fn invalid_settings_are_rejected_before_processing() {
                let settings = MaskSettings::default().with_tolerance(150.0);
                let request = MaskRequest::new(uniform_buffer(1, 1, [0; 4]), 1, 1, Mode::Remove, settings);
                assert!(matches!(try_process(request), Err(MaskError::InvalidSettings(_))));
            }

            #[test]
            fn generation_is_echoed_on_success() {
                let request = MaskRequest::new(
                    uniform_buffer(1, 1, [0, 0, 0, 255]),
                    1,
                    1,
                    Mode::Remove,
                    MaskSettings::default(),
                )
                .with_generation(42);
                let response = process(request);
                assert!(response.is_ok());
                assert_eq!(response.generation, 42);
            }

            #[test]
            fn flood_with_only_out_of_bounds_seeds_is_untouched() {
                let input = uniform_buffer(4, 4, [255, 255, 255, 255]);
                let settings = MaskSettings::default()
                    .with_seed(SeedPoint::new(-3.0, 1.0))
                    .with_seed(SeedPoint::new(1.0, 99.0));
                let buffer =
                    try_process(MaskRequest::new(input.clone(), 4, 4, Mode::FloodClear, settings)).unwrap();
                assert_eq!(buffer, input);
            }

            #[test]
            fn flood_wall_scenario() {
                let image = RgbaImage::from_fn(4, 4, |x, _| {
                    if x == 2 { Rgba([0, 0, 0, 255]) } else { Rgba([255, 255, 255, 255]) }
                });
                let settings = MaskSettings::default()
                    .with_target_color(Color::WHITE)
                    .with_contour_color(Color::BLACK)
                    .with_tolerance(10.0)
                    .with_max_rgb_distance(441.0)
                    .with_seed((0u32, 0u32));
                let out = process_image(image, &settings, Mode::FloodClear).unwrap();
                assert_eq!(out.get_pixel(0, 0).0[3], 0);
                assert_eq!(out.get_pixel(1, 0).0[3], 0);
                assert_eq!(out.get_pixel(2, 0).0[3], 255);
                assert_eq!(out.get_pixel(3, 0).0[3], 255);
            }

            #[test]
            fn edge_paint_follows_final_boundary() {
                // left two columns match the target and are removed
                let image = RgbaImage::from_fn(6, 3, |x, _| {
                    if x < 2 { Rgba([0, 255, 0, 255]) } else { Rgba([50, 50, 50, 255]) }
                });
                let settings = MaskSettings::default()
                    .with_target_color([0, 255, 0])
                    .with_tolerance(5.0)
                    .with_erosion_radius(1)
                    .with_edge_paint(1, Color::new(9, 8, 7));
                let out = process_image(image, &settings, Mode::Remove).unwrap();
                for y in 0..3 {
                    // eroded away, color untouched
                    assert_eq!(out.get_pixel(2, y).0, [50, 50, 50, 0]);
                    // new rim is painted
                    assert_eq!(out.get_pixel(3, y).0, [9, 8, 7, 255]);
                    assert_eq!(out.get_pixel(4, y).0, [50, 50, 50, 255]);
                }
            }

            #[test]
            fn zero_radii_skip_refinement() {
                let image = RgbaImage::from_fn(5, 1, |x, _| {
                    if x == 0 { Rgba([0, 0, 0, 255]) } else { Rgba([200, 200, 200, 255]) }
                });
                let settings = MaskSettings::default().with_target_color(Color::BLACK);
                let out = process_image(image, &settings, Mode::Remove).unwrap();
                let expected: Vec<u8> = vec![0, 255, 255, 255, 255];
                assert_eq!(alphas(out.as_raw()), expected);
                assert_eq!(out.get_pixel(1, 0).0, [200, 200, 200, 255]);
            }
        }

        mod prop {
            use super::*;
            use proptest::prelude::*;

            proptest! {
                /// try_process: any length other than width*height*4 is rejected
                #[test]
                fn length_mismatch_always_rejected(
                    w in 1u32..8,
                    h in 1u32..8,
                    len in 0usize..300
                ) {
                    prop_assume!(len != (w * h * 4) as usize);
                    let request = MaskRequest::new(vec![0; len], w, h, Mode::Remove, MaskSettings::default());
                    let rejected = matches!(try_process(request), Err(MaskError::InvalidBuffer { .. }));
                    prop_assert!(rejected);
                }

                /// process: successful output has the input's length and RGB without edge paint
                #[test]
                fn rgb_preserved_without_edge_paint(
                    w in 1u32..8,
                    h in 1u32..8,
                    bytes in proptest::collection::vec(any::<u8>(), 256),
                    tol in 0.0f64..=100.0,
                    erode in 0u32..3,
                    blur in 0u32..3
                ) {
                    let len = (w * h * 4) as usize;
                    let input = bytes[..len].to_vec();
                    let settings = MaskSettings::default()
                        .with_target_color([128, 128, 128])
                        .with_tolerance(tol)
                        .with_erosion_radius(erode)
                        .with_blur_radius(blur);
                    let response = process(MaskRequest::new(input.clone(), w, h, Mode::Remove, settings));
                    prop_assert!(response.is_ok());
                    let out = response.processed_buffer;
                    prop_assert_eq!(out.len(), len);
                    for (a, b) in input.chunks_exact(STRIDE).zip(out.chunks_exact(STRIDE)) {
                        prop_assert_eq!(&a[..3], &b[..3]);
                    }
                }
            }
        }
    }

    #[test]
    fn panic_message_reads_str_and_string_payloads() {
        let boxed: Box<dyn Any + Send> = Box::new("boom");
        assert_eq!(panic_message(boxed.as_ref()), "boom");
        let boxed: Box<dyn Any + Send> = Box::new(String::from("bang"));
        assert_eq!(panic_message(boxed.as_ref()), "bang");
        let boxed: Box<dyn Any + Send> = Box::new(7u8);
        assert_eq!(panic_message(boxed.as_ref()), "stage panicked");
    }
}
