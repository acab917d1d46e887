use thiserror::Error;

/// Result type alias for operations that may fail with [`MaskError`].
pub type MaskResult<T> = std::result::Result<T, MaskError>;

/// Error types that can occur while computing or transporting a mask.
///
/// Validation failures are reported before any stage runs. Once a request
/// passes validation only resource exhaustion or an internal fault can fail it.
#[derive(Debug, Error)]
pub enum MaskError {
    /// Color buffer length does not match `width * height * 4`.
    #[error("Color buffer holds {found} bytes but {expected} were expected")]
    InvalidBuffer { expected: usize, found: usize },
    /// Width or height is zero, or the byte count overflows.
    #[error("Invalid image dimensions {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },
    /// Alpha channel dimensions do not match the color buffer.
    #[error("Alpha channel size {found:?} does not match color buffer size {expected:?}")]
    AlphaMismatch {
        expected: (u32, u32),
        found: (u32, u32),
    },
    /// Unknown or unusable mode tag.
    #[error("Invalid mode: {0}")]
    InvalidMode(String),
    /// A numeric setting is outside its accepted range.
    #[error("Invalid settings: {0}")]
    InvalidSettings(String),
    /// An intermediate buffer could not be allocated.
    #[error("Allocation failed: {0}")]
    Allocation(String),
    /// A stage faulted after validation.
    #[error("Internal error: {0}")]
    Internal(String),
    /// The worker thread is gone.
    #[error("Mask worker disconnected")]
    WorkerDisconnected,
    /// A request failed on the worker thread; holds the worker's message.
    #[error("{0}")]
    Worker(String),
    /// Image loading, decoding, or encoding error.
    #[error("Image processing failed: {0}")]
    Image(#[from] image::ImageError),
    /// File system I/O error.
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// Settings file could not be parsed.
    #[cfg(feature = "serde")]
    #[error("Invalid settings file: {0}")]
    Json(#[from] serde_json::Error),
}

/// Allocate `len` copies of `value`, reporting exhaustion instead of aborting.
pub(crate) fn filled_vec<T: Clone>(len: usize, value: T, what: &str) -> MaskResult<Vec<T>> {
    let mut out = Vec::new();
    out.try_reserve_exact(len)
        .map_err(|e| MaskError::Allocation(format!("{what} of {len} elements: {e}")))?;
    out.resize(len, value);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filled_vec_fills_requested_length() {
        assert_eq!(filled_vec(3, 7u8, "test").unwrap(), vec![7, 7, 7]);
        assert!(filled_vec(0, 0u64, "test").unwrap().is_empty());
    }

    #[test]
    fn oversized_buffer_is_an_allocation_error() {
        let err = filled_vec(usize::MAX / 2, 0u64, "row sums").unwrap_err();
        assert!(matches!(err, MaskError::Allocation(ref msg) if msg.starts_with("row sums")));
    }
}
