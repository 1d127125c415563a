//! Favicon and app-icon generation.
//!
//! The favicon catalog renders one source into every icon size the site
//! needs. Each rule carries a fixed name, so the files come out as
//! `favicon-192x192.png` or `pwa-icon-512x512.webp` no matter what the
//! source image was called.
//!
//! Results are grouped by the rule's group label:
//!
//! ```text
//! favicon        32 48 96 167 180 192 512   (webp + png)
//! pwa-icon       96 512                     (flattened onto the brand colour)
//! senex-profile  600
//! ```
//!
//! The group label moves from the variant onto the [`IconGroup`]; grouped
//! variants do not repeat it.

use crate::catalog::Catalog;
use crate::imaging::ImageBackend;
use crate::process::{ImageProcessConfig, ProcessError, ProcessEvent, process_source};
use crate::types::{RenderedVariant, SourceImage};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::mpsc::Sender;

/// Static entry for the hand-made `favicon.ico` that ships alongside the renders.
pub const FAVICON_ICO: &str = "favicon.ico";

/// A rendered icon, without its group label.
///
/// Icon rules name their files after the group, so the variant name is the
/// label too and is dropped along with it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IconVariant {
    pub width: u32,
    pub height: u32,
    pub format: String,
    pub file_name: String,
    pub quality: u32,
}

impl From<&RenderedVariant> for IconVariant {
    fn from(variant: &RenderedVariant) -> Self {
        Self {
            width: variant.width,
            height: variant.height,
            format: variant.format.clone(),
            file_name: variant.file_name.clone(),
            quality: variant.quality,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IconGroup {
    pub name: String,
    pub variants: Vec<IconVariant>,
}

/// Flat icon listing consumed by the site front end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Icon {
    pub width: u32,
    pub height: u32,
    pub default_icon: bool,
    pub format: String,
    pub file_name: String,
    #[serde(rename = "type")]
    pub kind: String,
}

/// An icon is the default when either side matches the reference size.
pub fn is_default_icon(width: u32, height: u32, reference: u32) -> bool {
    width == reference || height == reference
}

/// Partition variants by group label, falling back to the variant name.
///
/// Groups come out sorted by name; variants keep their input order within a
/// group. The input is left untouched.
pub fn group_icons(variants: &[RenderedVariant]) -> Vec<IconGroup> {
    let mut groups: BTreeMap<&str, Vec<IconVariant>> = BTreeMap::new();
    for variant in variants {
        let key = variant.group.as_deref().unwrap_or(&variant.name);
        groups.entry(key).or_default().push(IconVariant::from(variant));
    }

    groups
        .into_iter()
        .map(|(name, variants)| IconGroup {
            name: name.to_string(),
            variants,
        })
        .collect()
}

/// Flatten groups into icon records, then append the static `favicon.ico`.
pub fn icon_records(groups: &[IconGroup], reference: u32) -> Vec<Icon> {
    let rendered = groups.iter().flat_map(|group| {
        group.variants.iter().map(|variant| Icon {
            width: variant.width,
            height: variant.height,
            default_icon: is_default_icon(variant.width, variant.height, reference),
            format: variant.format.clone(),
            file_name: variant.file_name.clone(),
            kind: group.name.clone(),
        })
    });

    rendered
        .chain(std::iter::once(Icon {
            width: 0,
            height: 0,
            default_icon: false,
            format: "ico".to_string(),
            file_name: FAVICON_ICO.to_string(),
            kind: crate::catalog::FAVICON_GROUP.to_string(),
        }))
        .collect()
}

/// Render the favicon catalog for `source` into `icon_dir` and group the results.
///
/// `icon_dir` is created if missing. Stale files are swept by the source
/// identity, not by the fixed rule names, so old renders of other icons stay.
pub fn process_favicon(
    backend: &impl ImageBackend,
    catalog: &Catalog,
    source: &SourceImage,
    icon_dir: &Path,
    events: Option<&Sender<ProcessEvent>>,
) -> Result<Vec<IconGroup>, ProcessError> {
    std::fs::create_dir_all(icon_dir).map_err(|e| ProcessError::OutputDir {
        path: icon_dir.to_path_buf(),
        source: e,
    })?;

    let config = ImageProcessConfig::new(icon_dir).with_rules(&catalog.favicon);
    let rendered = process_source(backend, catalog, source, &config, events)?;

    let groups = group_icons(&rendered.variants);
    log::info!(
        "Rendered {} icons in {} groups for \"{}\"",
        rendered.variants.len(),
        groups.len(),
        source.identity()
    );
    Ok(groups)
}
