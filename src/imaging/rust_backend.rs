//! Pure Rust image processing backend.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Identify | `image::ImageReader::into_dimensions` (header only) |
//! | Decode (JPEG, PNG, WebP) | `image::load_from_memory` |
//! | Resize | `image::DynamicImage::resize_exact` with `Lanczos3` filter |
//! | Crop | cover-fill resize + edge-energy window search |
//! | Encode → WebP | `webp` (libwebp lossy, quality honoured) |
//! | Encode → PNG | `image::codecs::png::PngEncoder` (lossless, quality ignored) |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder` |
//! | Encode → AVIF | `image::codecs::avif::AvifEncoder` (rav1e, speed 6) |

use super::backend::{BackendError, Dimensions, Encoded, ImageBackend};
use super::calculations::{best_window_offset, calculate_fill_dimensions, calculate_fit_dimensions};
use super::params::{OutputFormat, RenderParams, Resize, Rgb};
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageReader, RgbImage};
use std::io::Cursor;

/// Pure Rust backend using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn decode(data: &[u8]) -> Result<DynamicImage, BackendError> {
    image::load_from_memory(data).map_err(|e| BackendError::Decode(e.to_string()))
}

/// Resize so the image covers `width`×`height`, then crop the overflowing
/// axis at the window carrying the most edge energy.
fn smart_crop(img: &DynamicImage, width: u32, height: u32) -> DynamicImage {
    let (fill_w, fill_h) = calculate_fill_dimensions(img.dimensions(), (width, height));
    let filled = if (fill_w, fill_h) == img.dimensions() {
        img.clone()
    } else {
        img.resize_exact(fill_w, fill_h, FilterType::Lanczos3)
    };

    if fill_w > width {
        let profile = energy_profile(&filled, Axis::Columns);
        let x = best_window_offset(&profile, width as usize) as u32;
        filled.crop_imm(x, 0, width, height)
    } else if fill_h > height {
        let profile = energy_profile(&filled, Axis::Rows);
        let y = best_window_offset(&profile, height as usize) as u32;
        filled.crop_imm(0, y, width, height)
    } else {
        filled
    }
}

#[derive(Clone, Copy)]
enum Axis {
    Columns,
    Rows,
}

/// Sum of absolute luma gradients per column (or row).
fn energy_profile(img: &DynamicImage, axis: Axis) -> Vec<u64> {
    let luma = img.to_luma8();
    let (w, h) = luma.dimensions();
    let len = match axis {
        Axis::Columns => w,
        Axis::Rows => h,
    };
    let mut profile = vec![0u64; len as usize];

    for y in 0..h {
        for x in 0..w {
            let p = luma.get_pixel(x, y)[0] as i32;
            let dx = if x > 0 {
                (p - luma.get_pixel(x - 1, y)[0] as i32).unsigned_abs()
            } else {
                0
            };
            let dy = if y > 0 {
                (p - luma.get_pixel(x, y - 1)[0] as i32).unsigned_abs()
            } else {
                0
            };
            let slot = match axis {
                Axis::Columns => x,
                Axis::Rows => y,
            };
            profile[slot as usize] += (dx + dy) as u64;
        }
    }

    profile
}

/// Composite the image over an opaque background color.
fn flatten(img: &DynamicImage, background: Rgb) -> DynamicImage {
    if !img.color().has_alpha() {
        return img.clone();
    }

    let rgba = img.to_rgba8();
    let flat = RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
        let [r, g, b, a] = rgba.get_pixel(x, y).0;
        let blend = |c: u8, bg: u8| -> u8 {
            let a = a as u32;
            ((c as u32 * a + bg as u32 * (255 - a) + 127) / 255) as u8
        };
        image::Rgb([
            blend(r, background.r),
            blend(g, background.g),
            blend(b, background.b),
        ])
    });
    DynamicImage::ImageRgb8(flat)
}

fn encode(img: &DynamicImage, format: OutputFormat, quality: u32) -> Result<Vec<u8>, BackendError> {
    let mut buf = Vec::new();
    let quality = quality.clamp(1, 100);

    match format {
        OutputFormat::WebP => {
            let input = if img.color().has_alpha() {
                DynamicImage::ImageRgba8(img.to_rgba8())
            } else {
                DynamicImage::ImageRgb8(img.to_rgb8())
            };
            let encoder = webp::Encoder::from_image(&input)
                .map_err(|e| BackendError::Encode(format!("WebP encoder: {e}")))?;
            let memory = encoder
                .encode_simple(false, quality as f32)
                .map_err(|e| BackendError::Encode(format!("WebP encode failed: {e:?}")))?;
            buf.extend_from_slice(&memory);
        }
        OutputFormat::Png => {
            let encoder = image::codecs::png::PngEncoder::new(&mut buf);
            img.write_with_encoder(encoder)
                .map_err(|e| BackendError::Encode(format!("PNG encode failed: {e}")))?;
        }
        OutputFormat::Jpeg => {
            let encoder =
                image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buf, quality as u8);
            DynamicImage::ImageRgb8(img.to_rgb8())
                .write_with_encoder(encoder)
                .map_err(|e| BackendError::Encode(format!("JPEG encode failed: {e}")))?;
        }
        OutputFormat::Avif => {
            let encoder = image::codecs::avif::AvifEncoder::new_with_speed_quality(
                &mut buf,
                6,
                quality as u8,
            );
            img.write_with_encoder(encoder)
                .map_err(|e| BackendError::Encode(format!("AVIF encode failed: {e}")))?;
        }
    }

    Ok(buf)
}

impl ImageBackend for RustBackend {
    fn identify(&self, data: &[u8]) -> Result<Dimensions, BackendError> {
        let (width, height) = ImageReader::new(Cursor::new(data))
            .with_guessed_format()?
            .into_dimensions()
            .map_err(|e| BackendError::Decode(format!("Failed to read dimensions: {e}")))?;
        Ok(Dimensions { width, height })
    }

    fn render(&self, data: &[u8], params: &RenderParams) -> Result<Encoded, BackendError> {
        let img = decode(data)?;

        let shaped = match params.resize {
            Resize::Bounded {
                constraint,
                max,
                enlarge,
            } => {
                let (w, h) = calculate_fit_dimensions(img.dimensions(), constraint, max, enlarge);
                if (w, h) == img.dimensions() {
                    img
                } else {
                    img.resize_exact(w, h, FilterType::Lanczos3)
                }
            }
            Resize::Crop { width, height } => smart_crop(&img, width, height),
        };

        let shaped = match params.background {
            Some(background) => flatten(&shaped, background),
            None => shaped,
        };

        let bytes = encode(&shaped, params.format, params.quality.value())?;
        let dimensions = self.identify(&bytes)?;
        Ok(Encoded { bytes, dimensions })
    }
}
