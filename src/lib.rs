pub mod color;
pub mod config;
pub mod edge;
pub mod engine;
pub mod error;
pub mod flood;
pub mod foreground;
pub mod mask;
pub mod threshold;
pub mod worker;
mod window;

pub use color::{Color, MAX_RGB_DISTANCE, distance};
pub use config::{MaskSettings, Mode, SeedPoint};
pub use engine::{MaskRequest, MaskResponse, process, process_image, try_process};
pub use error::{MaskError, MaskResult};
pub use mask::MaskOperation;
pub use worker::MaskWorker;

use image::{GrayImage, RgbaImage};

use crate::foreground::extract_alpha;

/// Entry point for configuring and running a cutout.
#[derive(Debug, Clone, Default)]
pub struct Cutout {
    mode: Mode,
    settings: MaskSettings,
}

impl Cutout {
    pub fn new(mode: Mode) -> Self {
        Self {
            mode,
            settings: MaskSettings::default(),
        }
    }

    /// Replace the mask settings.
    pub fn with_settings(mut self, settings: MaskSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Get a reference to the mask settings.
    pub fn settings(&self) -> &MaskSettings {
        &self.settings
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Build a request that moves `image`'s pixels to an engine or worker.
    pub fn request(&self, image: RgbaImage) -> MaskRequest {
        MaskRequest::from_image(image, self.mode, self.settings.clone())
    }

    /// Mask `image` on the current thread.
    pub fn apply(&self, image: RgbaImage) -> MaskResult<CutoutHandle> {
        let image = process_image(image, &self.settings, self.mode)?;
        Ok(CutoutHandle { image })
    }

    /// Mask `image` on a worker thread and wait for the result.
    ///
    /// Settings are validated here first so their errors keep their variant.
    pub fn apply_on(&self, worker: &MaskWorker, image: RgbaImage) -> MaskResult<CutoutHandle> {
        self.settings.validate()?;
        let (width, height) = image.dimensions();
        let buffer = worker
            .process(self.request(image))?
            .into_result()
            .map_err(MaskError::Worker)?;
        let found = buffer.len();
        let image = RgbaImage::from_raw(width, height, buffer).ok_or(MaskError::InvalidBuffer {
            expected: width as usize * height as usize * engine::STRIDE,
            found,
        })?;
        Ok(CutoutHandle { image })
    }
}

/// A masked RGBA image.
#[derive(Debug, Clone)]
pub struct CutoutHandle {
    image: RgbaImage,
}

impl CutoutHandle {
    /// Get a reference to the masked image.
    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// Consume the handle and return the masked image.
    pub fn into_image(self) -> RgbaImage {
        self.image
    }

    /// The alpha channel as a grayscale mask.
    pub fn mask(&self) -> GrayImage {
        extract_alpha(&self.image)
    }

    /// Save the masked image to the specified path.
    pub fn save(&self, path: impl AsRef<std::path::Path>) -> MaskResult<()> {
        self.image.save(path)?;
        Ok(())
    }

    /// Save the alpha channel as a grayscale image.
    pub fn save_mask(&self, path: impl AsRef<std::path::Path>) -> MaskResult<()> {
        self.mask().save(path)?;
        Ok(())
    }
}
