//! Image processing: decode, resize, crop, encode.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Identify** | `image::ImageReader::into_dimensions` |
//! | **Resize** | Lanczos3, bound on the dominant axis |
//! | **Crop** | cover-fill + edge-energy window |
//! | **Encode** | `webp` for lossy WebP, `image` codecs for PNG / JPEG / AVIF |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for geometry (unit testable)
//! - **Parameters**: Data structures describing a render
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: Rule → render → named file on disk

pub mod backend;
mod calculations;
pub mod operations;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, Dimensions, Encoded, ImageBackend};
pub use calculations::{
    Constraint, best_window_offset, calculate_fill_dimensions, calculate_fit_dimensions, classify,
};
pub use operations::{RenderError, plan_render, render_variant, resolve_geometry};
pub use params::{OutputFormat, Quality, RenderParams, Resize, Rgb};
pub use rust_backend::RustBackend;
