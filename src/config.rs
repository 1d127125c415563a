//! Application configuration.
//!
//! Handles loading, validating, and merging `config.toml`. User values are
//! merged on top of stock defaults, so a config file needs only the keys it
//! wants to change.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [dirs]
//! processed = "data/images/processed"  # Standard variants + images.json
//! icons = "data/icons"                 # Favicon / PWA icon variants
//!
//! [quality]
//! default = 75     # Responsive WebP variants
//! high = 90        # Largest variant and the social-preview crop
//! original = 95    # Archival original and every icon
//!
//! [icons]
//! default_size = 192                 # Icons at this size are the default <link rel="icon">
//! pwa_background = [67, 118, 198]    # Fill color behind transparent PWA icons
//!
//! [processing]
//! max_processes = 4  # Max parallel workers (omit for auto = CPU cores)
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::imaging::Rgb;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Application configuration loaded from `config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// Output directories.
    pub dirs: DirsConfig,
    /// Encoding quality levels used by the rule catalog.
    pub quality: QualityConfig,
    /// Favicon / PWA icon settings.
    pub icons: IconsConfig,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
}

impl AppConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (key, value) in [
            ("quality.default", self.quality.default),
            ("quality.high", self.quality.high),
            ("quality.original", self.quality.original),
        ] {
            if !(1..=100).contains(&value) {
                return Err(ConfigError::Validation(format!("{key} must be 1-100")));
            }
        }
        if self.icons.default_size == 0 {
            return Err(ConfigError::Validation(
                "icons.default_size must be non-zero".into(),
            ));
        }
        if self.dirs.processed.as_os_str().is_empty() || self.dirs.icons.as_os_str().is_empty() {
            return Err(ConfigError::Validation(
                "dirs.processed and dirs.icons must not be empty".into(),
            ));
        }
        Ok(())
    }
}

/// Output directories.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DirsConfig {
    /// Directory receiving standard variants and the batch manifest.
    /// Wiped and recreated on every batch run.
    pub processed: PathBuf,
    /// Directory receiving icon variants.
    pub icons: PathBuf,
}

impl Default for DirsConfig {
    fn default() -> Self {
        Self {
            processed: PathBuf::from("data/images/processed"),
            icons: PathBuf::from("data/icons"),
        }
    }
}

/// Encoding quality levels (1 = worst, 100 = best).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct QualityConfig {
    pub default: u32,
    pub high: u32,
    pub original: u32,
}

impl Default for QualityConfig {
    fn default() -> Self {
        Self {
            default: 75,
            high: 90,
            original: 95,
        }
    }
}

/// Favicon / PWA icon settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IconsConfig {
    /// Reference edge length of the default icon.
    pub default_size: u32,
    /// Background fill for PWA icons, as `[r, g, b]`.
    pub pwa_background: Rgb,
}

impl Default for IconsConfig {
    fn default() -> Self {
        Self {
            default_size: 192,
            pwa_background: Rgb::new(67, 118, 198),
        }
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel image processing workers.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config
        .max_processes
        .map(|n| n.clamp(1, cores))
        .unwrap_or(cores)
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    toml::Value::try_from(AppConfig::default())
        .map_err(|e| ConfigError::Validation(format!("default config must serialize: {e}")))
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Load config from the given file.
///
/// A missing file yields the stock defaults. Otherwise user values are
/// merged on top of the defaults, unknown keys are rejected, and the result
/// is validated.
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let merged = match load_raw_config(path)? {
        Some(overlay) => merge_toml(stock_defaults_value()?, overlay),
        None => stock_defaults_value()?,
    };
    let config: AppConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Returns a fully-commented stock `config.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Image variant pipeline configuration
# =====================================
# Every key is optional. Values below are the defaults.

[dirs]
# Standard variants and images.json. This directory is deleted and
# recreated at the start of every batch run: do not store anything else here.
processed = "data/images/processed"
# Favicon and PWA icon variants.
icons = "data/icons"

[quality]
# WebP quality for the 900/1200/2400px variants.
default = 75
# Quality for the 3000px variant and the 1910x1000 social-preview crop.
high = 90
# Quality for the archival original and every icon.
original = 95

[icons]
# Icons whose width or height equals this size are flagged as the default icon.
default_size = 192
# Background color [r, g, b] painted behind transparent PWA icons.
pwa_background = [67, 118, 198]

[processing]
# Maximum number of parallel workers. Omit to use all CPU cores.
# max_processes = 4
"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_values() {
        let config = AppConfig::default();
        assert_eq!(config.dirs.processed, PathBuf::from("data/images/processed"));
        assert_eq!(config.dirs.icons, PathBuf::from("data/icons"));
        assert_eq!(config.quality.default, 75);
        assert_eq!(config.quality.high, 90);
        assert_eq!(config.quality.original, 95);
        assert_eq!(config.icons.default_size, 192);
        assert_eq!(config.icons.pwa_background, Rgb::new(67, 118, 198));
        assert!(config.processing.max_processes.is_none());
    }

    #[test]
    fn load_config_returns_default_when_no_file() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(&tmp.path().join("config.toml")).unwrap();
        assert_eq!(config.quality.default, 75);
    }

    #[test]
    fn load_config_merges_partial_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        fs::write(
            &path,
            r#"
[quality]
default = 70

[icons]
pwa_background = [0, 0, 0]
"#,
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.quality.default, 70);
        assert_eq!(config.quality.high, 90);
        assert_eq!(config.icons.pwa_background, Rgb::new(0, 0, 0));
        assert_eq!(config.icons.default_size, 192);
    }

    #[test]
    fn load_config_invalid_toml_is_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        fs::write(&path, "[quality\ndefault = ").unwrap();
        assert!(matches!(load_config(&path), Err(ConfigError::Toml(_))));
    }

    #[test]
    fn unknown_key_rejected() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        fs::write(&path, "[quality]\ndefualt = 70\n").unwrap();
        assert!(load_config(&path).is_err());
    }

    #[test]
    fn unknown_section_rejected() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        fs::write(&path, "[thumbnails]\nsize = 3\n").unwrap();
        assert!(load_config(&path).is_err());
    }

    #[test]
    fn load_config_validates_values() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        fs::write(&path, "[quality]\nhigh = 101\n").unwrap();
        assert!(matches!(
            load_config(&path),
            Err(ConfigError::Validation(msg)) if msg.contains("quality.high")
        ));
    }

    #[test]
    fn validate_zero_icon_size() {
        let mut config = AppConfig::default();
        config.icons.default_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_default_config_passes() {
        assert!(AppConfig::default().validate().is_ok());
    }

    #[test]
    fn stock_config_toml_parses_to_defaults() {
        let parsed: AppConfig = toml::from_str(stock_config_toml()).unwrap();
        let defaults = AppConfig::default();
        assert_eq!(parsed.dirs.processed, defaults.dirs.processed);
        assert_eq!(parsed.quality.original, defaults.quality.original);
        assert_eq!(parsed.icons.pwa_background, defaults.icons.pwa_background);
    }

    #[test]
    fn merge_toml_scalar_override() {
        let base: toml::Value = toml::from_str("a = 1\nb = 2").unwrap();
        let overlay: toml::Value = toml::from_str("b = 3").unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged["a"].as_integer(), Some(1));
        assert_eq!(merged["b"].as_integer(), Some(3));
    }

    #[test]
    fn merge_toml_table_merge() {
        let base: toml::Value = toml::from_str("[quality]\ndefault = 75\nhigh = 90").unwrap();
        let overlay: toml::Value = toml::from_str("[quality]\nhigh = 80").unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged["quality"]["default"].as_integer(), Some(75));
        assert_eq!(merged["quality"]["high"].as_integer(), Some(80));
    }

    #[test]
    fn effective_threads_auto() {
        let cores = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        assert_eq!(effective_threads(&ProcessingConfig::default()), cores);
    }

    #[test]
    fn effective_threads_clamped_to_cores() {
        let cores = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        let config = ProcessingConfig {
            max_processes: Some(cores + 64),
        };
        assert_eq!(effective_threads(&config), cores);
    }

    #[test]
    fn effective_threads_user_constrains_down() {
        let config = ProcessingConfig {
            max_processes: Some(1),
        };
        assert_eq!(effective_threads(&config), 1);
    }
}
