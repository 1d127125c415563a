//! Shared types exchanged with the caller.
//!
//! The caller hands in [`ImageRecord`]s (or a ready [`SourceImage`]) and gets
//! back [`ImageProcessResult`]s. Results serialize to the camelCase JSON of
//! the `images.json` manifest.

use crate::naming::compose_identity;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// An image record as supplied by the record-storage layer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ImageRecord {
    pub id: u64,
    pub name: String,
    pub title: String,
    pub description: String,
    pub nsfw: bool,
    pub author_id: Option<u64>,
    pub author_name: Option<String>,
    /// Identity is the bare image name instead of `<author>-<name>`.
    pub ignore_author_name: bool,
    pub categories: Vec<u64>,
    pub related: Vec<u64>,
    /// Path of the uploaded original on disk.
    pub source_path: PathBuf,
}

impl ImageRecord {
    /// Stable identity used as the base of every derived filename.
    pub fn identity(&self) -> String {
        compose_identity(
            &self.name,
            self.author_name.as_deref(),
            self.ignore_author_name,
        )
    }
}

/// Source bytes plus the identity derived files are named after.
///
/// Never mutated by the pipeline; renders share it by reference.
#[derive(Debug, Clone)]
pub struct SourceImage {
    image_id: u64,
    identity: String,
    data: Vec<u8>,
}

impl SourceImage {
    pub fn new(image_id: u64, identity: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            image_id,
            identity: identity.into(),
            data,
        }
    }

    /// Read a source file from disk.
    pub fn read(image_id: u64, identity: impl Into<String>, path: &Path) -> std::io::Result<Self> {
        let data = std::fs::read(path)?;
        Ok(Self::new(image_id, identity, data))
    }

    /// Read the original file behind a record.
    pub fn load(record: &ImageRecord) -> std::io::Result<Self> {
        Self::read(record.id, record.identity(), &record.source_path)
    }

    pub fn image_id(&self) -> u64 {
        self.image_id
    }

    pub fn identity(&self) -> &str {
        &self.identity
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

/// One variant written to disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedVariant {
    /// Encoded width; authoritative over the rule's requested size.
    pub width: u32,
    pub height: u32,
    pub format: String,
    pub file_name: String,
    pub quality: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suffix: Option<String>,
    /// Filename base (rule name or source identity).
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    pub image_id: u64,
}

/// Aggregate result for one image.
///
/// Renders that failed are absent from `variants`; there is no placeholder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageProcessResult {
    pub image_id: u64,
    pub name: String,
    pub title: String,
    pub description: String,
    pub related: Vec<u64>,
    pub categories: Vec<u64>,
    pub author: Option<u64>,
    pub nsfw: bool,
    pub original: Option<RenderedVariant>,
    pub variants: Vec<RenderedVariant>,
}

impl ImageProcessResult {
    /// Start a result carrying the record's metadata and no variants.
    pub fn for_record(record: &ImageRecord) -> Self {
        Self {
            image_id: record.id,
            name: record.name.clone(),
            title: record.title.clone(),
            description: record.description.clone(),
            related: record.related.clone(),
            categories: record.categories.clone(),
            author: record.author_id,
            nsfw: record.nsfw,
            original: None,
            variants: Vec::new(),
        }
    }
}
