//! Image processing backend trait and shared types.
//!
//! The [`ImageBackend`] trait defines the two operations every backend must
//! support: identify and render. Both work on in-memory bytes; writing the
//! result to disk is the caller's job, so a backend never touches the
//! filesystem.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend): pure Rust decoders and
//! resampling from the `image` crate, plus libwebp for lossy WebP.

use super::params::RenderParams;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Decode failed: {0}")]
    Decode(String),
    #[error("Encode failed: {0}")]
    Encode(String),
}

/// Result of an identify operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// Encoded output of a render.
///
/// `dimensions` are read back from `bytes`, not copied from the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Encoded {
    pub bytes: Vec<u8>,
    pub dimensions: Dimensions,
}

/// Trait for image processing backends.
///
/// `Sync` is required because one backend instance is shared by every
/// concurrent render of a batch.
pub trait ImageBackend: Sync {
    /// Get the pixel dimensions of encoded image bytes.
    fn identify(&self, data: &[u8]) -> Result<Dimensions, BackendError>;

    /// Decode `data`, apply the geometry in `params` and encode to the target format.
    fn render(&self, data: &[u8], params: &RenderParams) -> Result<Encoded, BackendError>;
}
