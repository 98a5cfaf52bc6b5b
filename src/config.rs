//! Site configuration module.
//!
//! Handles loading and validating `config.toml` from the source root. User
//! values are merged on top of stock defaults, so config files are sparse —
//! override just the values you want. Unknown keys are rejected to catch
//! typos early.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [inference]
//! min_paragraph_len = 20        # Shorter paragraphs are ignored as fields
//! max_ancestor_depth = 5        # Ancestor levels searched for name context
//! extra_repeat_tokens = []      # Extends the repeating-content vocabulary
//! extra_decorative_patterns = []# Extends the decorative image patterns
//!
//! [assets]
//! root_prefix = "/assets"       # Canonical root for rewritten asset paths
//!
//! [backend]
//! draft_and_publish = true      # Emitted into every backend schema's options
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
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

/// Tool configuration loaded from `config.toml`.
///
/// All fields have sensible defaults. User config files need only specify
/// the values they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Schema inference tuning.
    pub inference: InferenceConfig,
    /// Asset path rewriting.
    pub assets: AssetsConfig,
    /// Backend schema emission.
    pub backend: BackendConfig,
}

impl SiteConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.inference.max_ancestor_depth == 0 {
            return Err(ConfigError::Validation(
                "inference.max_ancestor_depth must be at least 1".into(),
            ));
        }
        if !self.assets.root_prefix.starts_with('/') {
            return Err(ConfigError::Validation(
                "assets.root_prefix must be root-relative (start with '/')".into(),
            ));
        }
        Ok(())
    }
}

/// Schema inference tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InferenceConfig {
    /// Paragraphs with fewer characters than this are not promoted to fields.
    pub min_paragraph_len: usize,
    /// How many ancestor levels to search for a naming context modifier.
    pub max_ancestor_depth: usize,
    /// Additional class tokens treated as repeating-content markers.
    pub extra_repeat_tokens: Vec<String>,
    /// Additional substrings marking an image as decorative.
    pub extra_decorative_patterns: Vec<String>,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            min_paragraph_len: 20,
            max_ancestor_depth: 5,
            extra_repeat_tokens: Vec::new(),
            extra_decorative_patterns: Vec::new(),
        }
    }
}

/// Asset path rewriting.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AssetsConfig {
    /// Canonical root prefix for local asset references.
    pub root_prefix: String,
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            root_prefix: "/assets".to_string(),
        }
    }
}

/// Backend schema emission.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BackendConfig {
    /// Value of `options.draft_and_publish` in every emitted schema.
    pub draft_and_publish: bool,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            draft_and_publish: true,
        }
    }
}

// =============================================================================
// Config loading and merging
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(SiteConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// Tables merge key-by-key; non-table overlay values replace base values.
fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
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

/// Load config from `config.toml` in the given directory.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result. Uses pure defaults when no file exists.
pub fn load_config(root: &Path) -> Result<SiteConfig, ConfigError> {
    let config_path = root.join("config.toml");
    let merged = if config_path.exists() {
        let content = fs::read_to_string(&config_path)?;
        let overlay: toml::Value = toml::from_str(&content)?;
        merge_toml(stock_defaults_value(), overlay)
    } else {
        stock_defaults_value()
    };
    let config: SiteConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Returns a fully documented stock config.toml as a string.
///
/// Used by the `gen-config` command to bootstrap a user's config file.
pub fn stock_config_toml() -> &'static str {
    r##"# Sitecast Configuration
# ======================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Place this file at the root of the exported site directory, next to the
# HTML pages. Each run only needs the keys it wants to override.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Schema inference
# ---------------------------------------------------------------------------
[inference]
# Paragraphs with fewer characters than this stay structural markup
# rather than becoming editable fields.
min_paragraph_len = 20

# How many ancestor levels to search for a naming context (e.g. the
# "hero" in hero_title) before falling back to positional names.
max_ancestor_depth = 5

# Additional class tokens treated as repeating-content markers, on top
# of the built-in vocabulary (card, item, post, feature, ...).
extra_repeat_tokens = []

# Additional substrings marking an image as decorative (excluded from
# the schema), on top of the built-ins (logo, icon, arrow, ...).
extra_decorative_patterns = []

# ---------------------------------------------------------------------------
# Asset path rewriting
# ---------------------------------------------------------------------------
[assets]
# Canonical root for rewritten local asset references. Must be
# root-relative.
root_prefix = "/assets"

# ---------------------------------------------------------------------------
# Backend schema emission
# ---------------------------------------------------------------------------
[backend]
# Value of options.draft_and_publish in every emitted content type.
draft_and_publish = true
"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn defaults_when_no_config_file() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.inference.min_paragraph_len, 20);
        assert_eq!(config.assets.root_prefix, "/assets");
        assert!(config.backend.draft_and_publish);
    }

    #[test]
    fn sparse_override_keeps_other_defaults() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("config.toml"),
            "[inference]\nmin_paragraph_len = 40\n",
        )
        .unwrap();
        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.inference.min_paragraph_len, 40);
        // Untouched sections keep stock values.
        assert_eq!(config.inference.max_ancestor_depth, 5);
        assert_eq!(config.assets.root_prefix, "/assets");
    }

    #[test]
    fn extra_tokens_merge_in() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("config.toml"),
            "[inference]\nextra_repeat_tokens = [\"widget\"]\n",
        )
        .unwrap();
        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.inference.extra_repeat_tokens, vec!["widget"]);
    }

    #[test]
    fn unknown_keys_rejected() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("config.toml"), "[inference]\ntypo_key = 1\n").unwrap();
        assert!(load_config(tmp.path()).is_err());
    }

    #[test]
    fn stock_config_toml_roundtrips_to_defaults() {
        let config: SiteConfig = toml::from_str(stock_config_toml()).unwrap();
        assert_eq!(config.inference.min_paragraph_len, 20);
        assert_eq!(config.inference.max_ancestor_depth, 5);
        assert_eq!(config.assets.root_prefix, "/assets");
        assert!(config.backend.draft_and_publish);
    }

    #[test]
    fn stock_config_toml_contains_all_sections() {
        let content = stock_config_toml();
        assert!(content.contains("[inference]"));
        assert!(content.contains("[assets]"));
        assert!(content.contains("[backend]"));
    }

    #[test]
    fn relative_asset_prefix_rejected() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("config.toml"),
            "[assets]\nroot_prefix = \"assets\"\n",
        )
        .unwrap();
        assert!(matches!(
            load_config(tmp.path()),
            Err(ConfigError::Validation(_))
        ));
    }
}
