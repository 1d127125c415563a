//! CLI output formatting for library and icon runs.
//!
//! # Output Format
//!
//! ## Progress
//!
//! One line per event, printed as work completes. Lines for the same image
//! interleave with other images because renders run in parallel.
//!
//! ```text
//!     ada-dawn-900x450.webp
//!     ada-dawn 1910x1000 png: FAILED (render failed: ...)
//! ada-dawn (4 variants + original)
//! SKIPPED Dusk: could not read source data/originals/2.jpg: ...
//! ```
//!
//! ## Batch summary
//!
//! ```text
//! Processed 2 images, 10 variants
//! Skipped 1 image
//!     002 Dusk: could not read source ...
//! ```
//!
//! ## Icons
//!
//! ```text
//! favicon (14 icons)
//!     favicon-32x32.webp 32x32
//!     ...
//! pwa-icon (4 icons)
//!     pwa-icon-96x96.webp 96x96
//! ```
//!
//! # Architecture
//!
//! Each output has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format functions
//! are pure: no I/O, no side effects.

use crate::favicon::IconGroup;
use crate::process::{BatchResult, ProcessEvent};

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{n} {word}")
    } else {
        format!("{n} {word}s")
    }
}

// ============================================================================
// Progress
// ============================================================================

/// Format a single progress event as display lines.
pub fn format_process_event(event: &ProcessEvent) -> Vec<String> {
    match event {
        ProcessEvent::VariantRendered { file_name, .. } => vec![format!("    {file_name}")],
        ProcessEvent::VariantFailed { identity, rule, error } => {
            vec![format!("    {identity} {rule}: FAILED ({error})")]
        }
        ProcessEvent::ImageProcessed {
            identity,
            variants,
            original,
        } => {
            let detail = if *original {
                format!("{} + original", plural(*variants, "variant"))
            } else {
                plural(*variants, "variant")
            };
            vec![format!("{identity} ({detail})")]
        }
        ProcessEvent::ImageSkipped { name, error } => vec![format!("SKIPPED {name}: {error}")],
    }
}

pub fn print_process_event(event: &ProcessEvent) {
    for line in format_process_event(event) {
        println!("{line}");
    }
}

// ============================================================================
// Summaries
// ============================================================================

/// Format the end-of-run summary of a library batch.
pub fn format_batch_summary(batch: &BatchResult) -> Vec<String> {
    let variant_count: usize = batch
        .results
        .iter()
        .map(|r| r.variants.len() + usize::from(r.original.is_some()))
        .sum();

    let mut lines = vec![format!(
        "Processed {}, {}",
        plural(batch.results.len(), "image"),
        plural(variant_count, "variant")
    )];

    if !batch.skipped.is_empty() {
        lines.push(format!("Skipped {}", plural(batch.skipped.len(), "image")));
        for skipped in &batch.skipped {
            lines.push(format!(
                "    {} {}: {}",
                format_index(skipped.image_id as usize),
                skipped.name,
                skipped.error
            ));
        }
    }
    lines
}

pub fn print_batch_summary(batch: &BatchResult) {
    for line in format_batch_summary(batch) {
        println!("{line}");
    }
}

/// Format icon groups with their files.
pub fn format_icon_groups(groups: &[IconGroup]) -> Vec<String> {
    let mut lines = Vec::new();
    for group in groups {
        lines.push(format!("{} ({})", group.name, plural(group.variants.len(), "icon")));
        for variant in &group.variants {
            lines.push(format!(
                "    {} {}x{}",
                variant.file_name, variant.width, variant.height
            ));
        }
    }
    lines
}

pub fn print_icon_groups(groups: &[IconGroup]) {
    for line in format_icon_groups(groups) {
        println!("{line}");
    }
}
