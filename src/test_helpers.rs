//! Shared test utilities for the unit test suite.
//!
//! Synthetic source images are built in memory with the `image` crate so the
//! tests need no fixture files.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = TempDir::new().unwrap();
//! let record = write_record(tmp.path(), 1, "Dawn", Some("Ada"), &jpeg_bytes(400, 200));
//! assert_eq!(record.identity(), "ada-dawn");
//! ```

use image::{ImageEncoder, Rgb, RgbImage, Rgba, RgbaImage};
use std::path::Path;

use crate::types::ImageRecord;

// =========================================================================
// Synthetic images
// =========================================================================

/// A JPEG with a diagonal gradient, so crops and resizes have content.
pub fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |x, y| {
        Rgb([
            (x * 255 / width.max(1)) as u8,
            (y * 255 / height.max(1)) as u8,
            128,
        ])
    });
    let mut buf = Vec::new();
    image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buf, 90)
        .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgb8)
        .unwrap();
    buf
}

/// A PNG whose every pixel is fully transparent.
pub fn transparent_png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = RgbaImage::from_pixel(width, height, Rgba([0, 0, 0, 0]));
    let mut buf = Vec::new();
    image::codecs::png::PngEncoder::new(&mut buf)
        .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgba8)
        .unwrap();
    buf
}

// =========================================================================
// Records and output inspection
// =========================================================================

/// Write `data` as the source file of a new record inside `dir`.
pub fn write_record(
    dir: &Path,
    id: u64,
    name: &str,
    author: Option<&str>,
    data: &[u8],
) -> ImageRecord {
    let source_path = dir.join(format!("{id}-{}.src", name.to_lowercase()));
    std::fs::write(&source_path, data).unwrap();
    ImageRecord {
        id,
        name: name.to_string(),
        author_name: author.map(str::to_string),
        source_path,
        ..Default::default()
    }
}

/// Sorted names of the files directly inside `dir`.
pub fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}
