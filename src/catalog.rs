//! Processing rule catalog.
//!
//! A [`ProcessingRule`] describes one output variant: geometry, format,
//! quality and how its filename is built. Rules are a fixed policy table, not
//! user input; the only knobs come from [`AppConfig`](crate::config::AppConfig)
//! (quality levels, PWA background, reference icon size).
//!
//! ## Rule sets
//!
//! ```text
//! standard   WebP 900 / 1200 / 2400 (q=default), WebP 3000 (q=high),
//!            PNG 1910x1000 crop with suffix "meta" (q=high)
//! original   WebP 3000, no size suffix (q=original)
//! favicon    32 48 96 180 192 512 167 ("favicon"), 96 512 ("pwa-icon", filled),
//!            600 ("senex-profile"); each in WebP and PNG, enlarge on
//! ```
//!
//! The [`Catalog`] is built once at startup and shared by reference with
//! every pipeline call.

use crate::config::AppConfig;
use crate::imaging::{OutputFormat, Quality, Rgb};

/// Format used for every standard and original variant.
pub const DEFAULT_FORMAT: OutputFormat = OutputFormat::WebP;

/// Height of the social-preview ("meta") crop; width follows the 1.91:1 ratio.
const META_HEIGHT: u32 = 1000;
const META_ASPECT: f64 = 1.91;

/// Max dimension of the archival original rendition.
const ORIGINAL_MAX_DIM: u32 = 3000;

pub const FAVICON_GROUP: &str = "favicon";
pub const PWA_ICON_GROUP: &str = "pwa-icon";
pub const PROFILE_GROUP: &str = "senex-profile";

/// Target geometry of a rule. Exactly one mode is active by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleGeometry {
    /// Proportional resize; the dominant axis of the source is bounded.
    MaxDim(u32),
    /// Content-aware crop to an exact box.
    Box { width: u32, height: u32 },
}

/// One catalog entry: how to derive one variant from a source image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessingRule {
    pub quality: Quality,
    pub geometry: RuleGeometry,
    pub format: OutputFormat,
    /// Appended as `-<suffix>` instead of the pixel size.
    pub suffix: Option<String>,
    /// Name the file `<base>.<ext>` with no size component.
    pub no_size_suffix: bool,
    /// Replaces the source identity as the filename base.
    pub name: Option<String>,
    pub enlarge: bool,
    pub background: Option<Rgb>,
    /// Icon group the variant belongs to (e.g. "favicon", "pwa-icon").
    pub group: Option<String>,
}

impl ProcessingRule {
    fn with_geometry(geometry: RuleGeometry, format: OutputFormat, quality: Quality) -> Self {
        Self {
            quality,
            geometry,
            format,
            suffix: None,
            no_size_suffix: false,
            name: None,
            enlarge: false,
            background: None,
            group: None,
        }
    }

    /// Proportional rule bounded to `max` pixels on the dominant axis.
    pub fn max_dim(max: u32, format: OutputFormat, quality: Quality) -> Self {
        Self::with_geometry(RuleGeometry::MaxDim(max), format, quality)
    }

    /// Crop rule producing exactly `width`×`height`.
    pub fn crop(width: u32, height: u32, format: OutputFormat, quality: Quality) -> Self {
        Self::with_geometry(RuleGeometry::Box { width, height }, format, quality)
    }

    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = Some(suffix.into());
        self
    }

    pub fn without_size_suffix(mut self) -> Self {
        self.no_size_suffix = true;
        self
    }

    /// Fixed filename base; also tags the rule with a group of the same name.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        self.group = Some(name.clone());
        self.name = Some(name);
        self
    }

    pub fn enlarged(mut self) -> Self {
        self.enlarge = true;
        self
    }

    pub fn with_background(mut self, background: Rgb) -> Self {
        self.background = Some(background);
        self
    }

    /// Short human-readable description, used in logs.
    pub fn describe(&self) -> String {
        let geometry = match self.geometry {
            RuleGeometry::MaxDim(max) => format!("max {max}px"),
            RuleGeometry::Box { width, height } => format!("{width}x{height}"),
        };
        match &self.group {
            Some(group) => format!("{group} {geometry} {}", self.format),
            None => format!("{geometry} {}", self.format),
        }
    }
}

/// Quality levels used by the rule tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QualityLevels {
    pub default: Quality,
    pub high: Quality,
    pub original: Quality,
}

impl Default for QualityLevels {
    fn default() -> Self {
        Self {
            default: Quality::new(75),
            high: Quality::new(90),
            original: Quality::new(95),
        }
    }
}

/// Standard variants rendered for every library image.
pub fn standard_rules(q: &QualityLevels) -> Vec<ProcessingRule> {
    let meta_width = (META_HEIGHT as f64 * META_ASPECT).round() as u32;

    vec![
        ProcessingRule::max_dim(900, DEFAULT_FORMAT, q.default),
        ProcessingRule::max_dim(1200, DEFAULT_FORMAT, q.default),
        ProcessingRule::max_dim(2400, DEFAULT_FORMAT, q.default),
        ProcessingRule::max_dim(3000, DEFAULT_FORMAT, q.high),
        ProcessingRule::crop(meta_width, META_HEIGHT, OutputFormat::Png, q.high)
            .with_suffix("meta"),
    ]
}

/// The archival rendition attached as `original` on a process result.
pub fn original_rule(q: &QualityLevels) -> ProcessingRule {
    ProcessingRule::max_dim(ORIGINAL_MAX_DIM, DEFAULT_FORMAT, q.original).without_size_suffix()
}

/// Favicon and PWA icon variants, every size in WebP and PNG.
pub fn favicon_rules(quality: Quality, pwa_background: Rgb) -> Vec<ProcessingRule> {
    let sizes: [(u32, &str, bool); 10] = [
        (32, FAVICON_GROUP, false),
        (48, FAVICON_GROUP, false),
        (96, FAVICON_GROUP, false),
        (96, PWA_ICON_GROUP, true),
        (180, FAVICON_GROUP, false),
        (192, FAVICON_GROUP, false),
        (512, FAVICON_GROUP, false),
        (512, PWA_ICON_GROUP, true),
        (167, FAVICON_GROUP, false),
        (600, PROFILE_GROUP, false),
    ];
    let formats = [DEFAULT_FORMAT, OutputFormat::Png];

    sizes
        .iter()
        .flat_map(|&(size, group, filled)| {
            formats.iter().map(move |&format| {
                let rule = ProcessingRule::max_dim(size, format, quality)
                    .named(group)
                    .enlarged();
                if filled {
                    rule.with_background(pwa_background)
                } else {
                    rule
                }
            })
        })
        .collect()
}

/// Every rule set the pipeline knows, built once from config.
#[derive(Debug, Clone)]
pub struct Catalog {
    pub standard: Vec<ProcessingRule>,
    pub original: ProcessingRule,
    pub favicon: Vec<ProcessingRule>,
    /// Icons whose width or height equals this are flagged as the default icon.
    pub default_icon_size: u32,
}

impl Catalog {
    pub fn new(quality: QualityLevels, pwa_background: Rgb, default_icon_size: u32) -> Self {
        Self {
            standard: standard_rules(&quality),
            original: original_rule(&quality),
            favicon: favicon_rules(quality.original, pwa_background),
            default_icon_size,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        let q = &config.quality;
        Self::new(
            QualityLevels {
                default: Quality::new(q.default),
                high: Quality::new(q.high),
                original: Quality::new(q.original),
            },
            config.icons.pwa_background,
            config.icons.default_size,
        )
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::from_config(&AppConfig::default())
    }
}
