//! Parameter types for image operations.
//!
//! These structs describe *what* to do, not *how* to do it. They are the
//! interface between the high-level [`operations`](super::operations) module
//! (which turns a processing rule into a render) and the
//! [`backend`](super::backend) (which does the actual pixel work). This
//! separation allows swapping backends (e.g. for testing with a mock) without
//! changing operation logic.
//!
//! ## Types
//!
//! - [`Quality`]: Encoding quality (1–100). Clamped on construction.
//! - [`OutputFormat`]: Target container/codec of a variant.
//! - [`Rgb`]: Opaque fill color used to flatten transparency.
//! - [`Resize`]: Proportional bound on one axis, or an exact crop box.
//! - [`RenderParams`]: Everything needed to render one variant.

use super::calculations::Constraint;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Quality setting for image encoding (1-100).
///
/// Lossless formats accept it and ignore it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "u32", into = "u32")]
pub struct Quality(u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(75)
    }
}

impl From<u32> for Quality {
    fn from(value: u32) -> Self {
        Self::new(value)
    }
}

impl From<Quality> for u32 {
    fn from(quality: Quality) -> Self {
        quality.0
    }
}

/// Output format of a rendered variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    WebP,
    Png,
    Jpeg,
    Avif,
}

impl OutputFormat {
    /// Lowercase format name. Doubles as the file extension.
    pub fn name(self) -> &'static str {
        match self {
            OutputFormat::WebP => "webp",
            OutputFormat::Png => "png",
            OutputFormat::Jpeg => "jpeg",
            OutputFormat::Avif => "avif",
        }
    }

    pub fn is_lossy(self) -> bool {
        !matches!(self, OutputFormat::Png)
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An opaque RGB color, serialized as `[r, g, b]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "[u8; 3]", into = "[u8; 3]")]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl From<[u8; 3]> for Rgb {
    fn from([r, g, b]: [u8; 3]) -> Self {
        Self { r, g, b }
    }
}

impl From<Rgb> for [u8; 3] {
    fn from(c: Rgb) -> Self {
        [c.r, c.g, c.b]
    }
}

/// How the source is brought to the target geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resize {
    /// Proportional resize with the axis picked by `constraint` bounded to `max`.
    Bounded {
        constraint: Constraint,
        max: u32,
        enlarge: bool,
    },
    /// Cover-fill, then content-aware crop to exactly `width`×`height`.
    Crop { width: u32, height: u32 },
}

/// Parameters for rendering one variant from in-memory source bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderParams {
    pub resize: Resize,
    pub format: OutputFormat,
    pub quality: Quality,
    /// Fill color for transparent regions. `None` keeps alpha where the format allows it.
    pub background: Option<Rgb>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quality_clamps_to_valid_range() {
        assert_eq!(Quality::new(0).value(), 1);
        assert_eq!(Quality::new(50).value(), 50);
        assert_eq!(Quality::new(150).value(), 100);
    }

    #[test]
    fn quality_deserialization_clamps() {
        let q: Quality = serde_json::from_str("250").unwrap();
        assert_eq!(q.value(), 100);
        let q: Quality = serde_json::from_str("0").unwrap();
        assert_eq!(q.value(), 1);
        assert_eq!(serde_json::to_string(&Quality::new(90)).unwrap(), "90");
    }

    #[test]
    fn format_names_are_extensions() {
        assert_eq!(OutputFormat::WebP.name(), "webp");
        assert_eq!(OutputFormat::Png.to_string(), "png");
        assert!(!OutputFormat::Png.is_lossy());
        assert!(OutputFormat::WebP.is_lossy());
    }

    #[test]
    fn rgb_serializes_as_triple() {
        let json = serde_json::to_string(&Rgb::new(67, 118, 198)).unwrap();
        assert_eq!(json, "[67,118,198]");
        let back: Rgb = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Rgb::new(67, 118, 198));
    }
}
