//! Variant generation for single images and whole libraries.
//!
//! ## Per image
//!
//! 1. Delete every file in the target directory whose name starts with the
//!    image identity (leftovers from an older catalog or a renamed image).
//! 2. Read the source and classify it as width- or height-limited. Failure
//!    here is fatal to the image.
//! 3. Render every rule in parallel. A rule that fails is logged and left
//!    out; nothing is retried.
//! 4. Optionally render the archival "original" rule after the join.
//!
//! ## Per library
//!
//! The output directory is deleted and recreated (fatal on failure), then
//! every image is processed in parallel with the original rendition enabled.
//! Images skip step 1 here: the directory is already empty, and one image's
//! identity can be a prefix of another's.
//! Images whose source cannot be read are reported in
//! [`BatchResult::skipped`] instead of `results`.
//!
//! ```text
//! processed/
//! ├── ada-dawn.webp              # original (no size suffix)
//! ├── ada-dawn-900x450.webp
//! ├── ada-dawn-1200x600.webp
//! ├── ada-dawn-2400x1200.webp
//! ├── ada-dawn-3000x1500.webp
//! ├── ada-dawn-meta.png          # 1910x1000 social preview
//! └── ...
//! ```
//!
//! ## Parallel Processing
//!
//! Both fan-outs use [rayon](https://docs.rs/rayon). Rule renders nest
//! inside image tasks on the same work-stealing pool; the only joins are per
//! image and per batch. The pipeline does not lock the output directory, so
//! callers must not run two batches against the same directory at once.

use crate::catalog::{Catalog, ProcessingRule};
use crate::imaging::{
    BackendError, Constraint, ImageBackend, RustBackend, render_variant, resolve_geometry,
};
use crate::naming::belongs_to;
use crate::types::{ImageProcessResult, ImageRecord, RenderedVariant, SourceImage};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("could not read source {}: {source}", path.display())]
    SourceUnreadable { path: PathBuf, source: io::Error },
    #[error("could not decode source of '{identity}': {source}")]
    SourceUndecodable {
        identity: String,
        source: BackendError,
    },
    #[error("could not reset output directory {}: {source}", path.display())]
    OutputDir { path: PathBuf, source: io::Error },
}

/// What to render for one image and where.
#[derive(Debug, Clone, Copy)]
pub struct ImageProcessConfig<'a> {
    pub target_dir: &'a Path,
    /// Rules to render; `None` or empty means the standard catalog.
    pub rules: Option<&'a [ProcessingRule]>,
    /// Also render the catalog's original rule, after the fan-out.
    pub process_original: bool,
}

impl<'a> ImageProcessConfig<'a> {
    pub fn new(target_dir: &'a Path) -> Self {
        Self {
            target_dir,
            rules: None,
            process_original: false,
        }
    }

    pub fn with_rules(mut self, rules: &'a [ProcessingRule]) -> Self {
        self.rules = Some(rules);
        self
    }

    pub fn with_original(mut self) -> Self {
        self.process_original = true;
        self
    }
}

/// Progress notifications, sent as work completes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessEvent {
    VariantRendered {
        identity: String,
        file_name: String,
    },
    VariantFailed {
        identity: String,
        rule: String,
        error: String,
    },
    ImageProcessed {
        identity: String,
        variants: usize,
        original: bool,
    },
    ImageSkipped {
        name: String,
        error: String,
    },
}

/// Variants rendered for one source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderedSet {
    pub variants: Vec<RenderedVariant>,
    pub original: Option<RenderedVariant>,
}

/// An image left out of a batch because its source could not be read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkippedImage {
    pub image_id: u64,
    pub name: String,
    pub error: String,
}

/// Outcome of a library run. `results` has no particular order.
#[derive(Debug, Clone, Default)]
pub struct BatchResult {
    pub results: Vec<ImageProcessResult>,
    pub skipped: Vec<SkippedImage>,
}

type Events<'a> = Option<&'a Sender<ProcessEvent>>;

fn emit(events: Events<'_>, event: ProcessEvent) {
    if let Some(tx) = events {
        // The receiver only drives console output; a closed channel is not an error here.
        let _ = tx.send(event);
    }
}

/// Delete files in `dir` that belong to `identity`. Returns how many were removed.
///
/// Only the top level of `dir` is considered. Removal failures are ignored.
pub fn sweep_stale_variants(dir: &Path, identity: &str) -> usize {
    if !dir.is_dir() {
        return 0;
    }

    let stale = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| {
            entry
                .file_name()
                .to_str()
                .is_some_and(|name| belongs_to(name, identity))
        });

    let mut removed = 0;
    for entry in stale {
        if std::fs::remove_file(entry.path()).is_ok() {
            removed += 1;
        }
    }
    removed
}

/// Delete and recreate a batch output directory.
pub fn reset_output_dir(dir: &Path) -> Result<(), ProcessError> {
    let output_dir_error = |source: io::Error| ProcessError::OutputDir {
        path: dir.to_path_buf(),
        source,
    };

    match std::fs::remove_dir_all(dir) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(output_dir_error(e)),
    }
    std::fs::create_dir_all(dir).map_err(output_dir_error)
}

/// Render one rule, turning failure into a log line and an event.
fn render_logged(
    backend: &impl ImageBackend,
    source: &SourceImage,
    rule: &ProcessingRule,
    constraint: Constraint,
    target_dir: &Path,
    events: Events<'_>,
) -> Option<RenderedVariant> {
    match render_variant(backend, source, rule, constraint, target_dir) {
        Ok(variant) => {
            emit(
                events,
                ProcessEvent::VariantRendered {
                    identity: source.identity().to_string(),
                    file_name: variant.file_name.clone(),
                },
            );
            Some(variant)
        }
        Err(e) => {
            log::error!(
                "Dropping variant {} of \"{}\": {e}",
                rule.describe(),
                source.identity()
            );
            emit(
                events,
                ProcessEvent::VariantFailed {
                    identity: source.identity().to_string(),
                    rule: rule.describe(),
                    error: e.to_string(),
                },
            );
            None
        }
    }
}

/// Classify the source, fan out over the rules, then render the original.
fn render_source(
    backend: &impl ImageBackend,
    catalog: &Catalog,
    source: &SourceImage,
    config: &ImageProcessConfig<'_>,
    events: Events<'_>,
) -> Result<RenderedSet, ProcessError> {
    let (_, constraint) = resolve_geometry(backend, source.data()).map_err(|e| {
        ProcessError::SourceUndecodable {
            identity: source.identity().to_string(),
            source: e,
        }
    })?;

    let rules = config
        .rules
        .filter(|rules| !rules.is_empty())
        .unwrap_or(catalog.standard.as_slice());

    let variants: Vec<RenderedVariant> = rules
        .par_iter()
        .filter_map(|rule| {
            render_logged(backend, source, rule, constraint, config.target_dir, events)
        })
        .collect();

    let original = if config.process_original {
        render_logged(
            backend,
            source,
            &catalog.original,
            constraint,
            config.target_dir,
            events,
        )
    } else {
        None
    };

    Ok(RenderedSet { variants, original })
}

fn sweep_logged(dir: &Path, identity: &str) {
    let removed = sweep_stale_variants(dir, identity);
    if removed > 0 {
        log::debug!("Removed {removed} stale files for \"{identity}\"");
    }
}

/// Render every rule for a source already in memory.
pub fn process_source(
    backend: &impl ImageBackend,
    catalog: &Catalog,
    source: &SourceImage,
    config: &ImageProcessConfig<'_>,
    events: Option<&Sender<ProcessEvent>>,
) -> Result<RenderedSet, ProcessError> {
    sweep_logged(config.target_dir, source.identity());
    render_source(backend, catalog, source, config, events)
}

/// Read a record's source file and render every rule for it.
pub fn process_image(
    backend: &impl ImageBackend,
    catalog: &Catalog,
    record: &ImageRecord,
    config: &ImageProcessConfig<'_>,
    events: Option<&Sender<ProcessEvent>>,
) -> Result<ImageProcessResult, ProcessError> {
    sweep_logged(config.target_dir, &record.identity());
    render_record(backend, catalog, record, config, events)
}

/// Load and render a record without sweeping the target directory first.
fn render_record(
    backend: &impl ImageBackend,
    catalog: &Catalog,
    record: &ImageRecord,
    config: &ImageProcessConfig<'_>,
    events: Events<'_>,
) -> Result<ImageProcessResult, ProcessError> {
    let source = SourceImage::load(record).map_err(|e| {
        log::error!("Could not read image file {}: {e}", record.source_path.display());
        ProcessError::SourceUnreadable {
            path: record.source_path.clone(),
            source: e,
        }
    })?;

    let rendered = render_source(backend, catalog, &source, config, events)?;

    let mut result = ImageProcessResult::for_record(record);
    result.variants = rendered.variants;
    result.original = rendered.original;

    log::info!("Processed image \"{}\"", record.name);
    emit(
        events,
        ProcessEvent::ImageProcessed {
            identity: source.identity().to_string(),
            variants: result.variants.len(),
            original: result.original.is_some(),
        },
    );

    Ok(result)
}

/// Regenerate every variant of every image into a fresh `output_dir`.
pub fn process_library(
    catalog: &Catalog,
    records: &[ImageRecord],
    output_dir: &Path,
    events: Option<&Sender<ProcessEvent>>,
) -> Result<BatchResult, ProcessError> {
    let backend = RustBackend::new();
    process_library_with_backend(&backend, catalog, records, output_dir, events)
}

/// Library run using a specific backend (allows testing with mock).
pub fn process_library_with_backend(
    backend: &impl ImageBackend,
    catalog: &Catalog,
    records: &[ImageRecord],
    output_dir: &Path,
    events: Option<&Sender<ProcessEvent>>,
) -> Result<BatchResult, ProcessError> {
    reset_output_dir(output_dir)?;

    // The directory was just emptied. Per-image sweeps would race sibling
    // renders whose identities share a prefix ("ada-dawn", "ada-dawn 2").
    let config = ImageProcessConfig::new(output_dir).with_original();
    let outcomes: Vec<_> = records
        .par_iter()
        .map(|record| (record, render_record(backend, catalog, record, &config, events)))
        .collect();

    let mut batch = BatchResult::default();
    for (record, outcome) in outcomes {
        match outcome {
            Ok(result) => batch.results.push(result),
            Err(e) => {
                log::error!("Skipping image \"{}\": {e}", record.name);
                emit(
                    events,
                    ProcessEvent::ImageSkipped {
                        name: record.name.clone(),
                        error: e.to_string(),
                    },
                );
                batch.skipped.push(SkippedImage {
                    image_id: record.id,
                    name: record.name.clone(),
                    error: e.to_string(),
                });
            }
        }
    }

    Ok(batch)
}
