//! High-level image operations.
//!
//! These functions combine calculations with backend execution: they turn a
//! [`ProcessingRule`] into [`RenderParams`], run the backend, name the output
//! and write it to disk.

use super::backend::{BackendError, Dimensions, ImageBackend};
use super::calculations::{Constraint, classify};
use super::params::{RenderParams, Resize};
use crate::catalog::{ProcessingRule, RuleGeometry};
use crate::naming::{base_name, variant_file_name};
use crate::types::{RenderedVariant, SourceImage};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Failure of a single rule. Never fatal to the image or the batch.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("render failed: {0}")]
    Backend(#[from] BackendError),
    #[error("could not write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Get source dimensions and the axis that binds max-dimension rules.
pub fn resolve_geometry(
    backend: &impl ImageBackend,
    data: &[u8],
) -> Result<(Dimensions, Constraint), BackendError> {
    let dims = backend.identify(data)?;
    Ok((dims, classify(dims.width, dims.height)))
}

/// Plan a render without executing it.
///
/// Crop rules ignore `constraint`; max-dimension rules bound the axis it names.
pub fn plan_render(rule: &ProcessingRule, constraint: Constraint) -> RenderParams {
    let resize = match rule.geometry {
        RuleGeometry::Box { width, height } => Resize::Crop { width, height },
        RuleGeometry::MaxDim(max) => Resize::Bounded {
            constraint,
            max,
            enlarge: rule.enlarge,
        },
    };

    RenderParams {
        resize,
        format: rule.format,
        quality: rule.quality,
        background: rule.background,
    }
}

/// Render one rule against a source and write the result into `target_dir`.
pub fn render_variant(
    backend: &impl ImageBackend,
    source: &SourceImage,
    rule: &ProcessingRule,
    constraint: Constraint,
    target_dir: &Path,
) -> Result<RenderedVariant, RenderError> {
    let params = plan_render(rule, constraint);
    let encoded = backend.render(source.data(), &params)?;
    let Dimensions { width, height } = encoded.dimensions;

    let file_name = variant_file_name(rule, source.identity(), width, height);
    let path = target_dir.join(&file_name);
    std::fs::write(&path, &encoded.bytes).map_err(|e| RenderError::Write {
        path: path.clone(),
        source: e,
    })?;

    Ok(RenderedVariant {
        width,
        height,
        format: rule.format.name().to_string(),
        file_name,
        quality: rule.quality.value(),
        suffix: rule.suffix.clone().filter(|s| !s.is_empty()),
        name: base_name(rule, source.identity()).to_string(),
        group: rule.group.clone(),
        image_id: source.image_id(),
    })
}
