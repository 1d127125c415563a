//! # Gallery Variants
//!
//! Responsive image variant generation for a photo gallery backend. Every
//! uploaded original is rendered into a fixed catalog of sizes and formats,
//! plus a social preview crop and an archival rendition. A separate catalog
//! turns one source into favicons and app icons.
//!
//! # Pipeline
//!
//! ```text
//! ImageRecord ──► SourceImage ──► classify (width / height limited)
//!                                     │
//!                       ┌─────────────┼─────────────┐
//!                       ▼             ▼             ▼
//!                   rule 900      rule 1200  …   meta crop      (rayon fan-out)
//!                       │             │             │
//!                       └──── RenderedVariant ──────┘
//!                                     │
//!                              ImageProcessResult
//! ```
//!
//! A rule that fails to render is logged and left out of the result. A source
//! that cannot be read skips its image. Only failing to reset the output
//! directory aborts a whole batch.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`catalog`] | Processing rules: standard sizes, meta crop, original, favicons |
//! | [`imaging`] | Geometry, render parameters, the backend trait and its `image`-crate implementation |
//! | [`naming`] | Image identity and output filename conventions |
//! | [`process`] | Per-image fan-out, stale-file sweep, library batch |
//! | [`favicon`] | Icon grouping and icon records |
//! | [`config`] | `config.toml` loading, merging, and validation |
//! | [`types`] | Records in, results out |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Wipe and Regenerate
//!
//! A library run deletes the output directory and renders everything again.
//! Filenames depend only on identity, rule and encoded size, so a rerun over
//! the same library produces the same tree. There is no cache and no
//! incremental mode.
//!
//! ## Pure-Rust Imaging
//!
//! Decoding, resampling and the PNG/JPEG/AVIF encoders come from the `image`
//! crate. Lossy WebP goes through `webp` (libwebp), since `image` only writes
//! lossless WebP.

pub mod catalog;
pub mod config;
pub mod favicon;
pub mod imaging;
pub mod naming;
pub mod output;
pub mod process;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
