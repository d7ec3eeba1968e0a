//! Configuration management for mdview.
//!
//! Parses `mdview.toml` with serde and discovers it in the current
//! directory or any parent. Every field is optional:
//!
//! ```toml
//! [render]
//! emit_line_ranges = true
//! heading_anchors = true
//!
//! [style.layout]
//! list_indent = 24
//! bullets = { primary = "-", secondary = "*" }
//!
//! [style.records.h1]
//! size = 30
//! foreground = "#D1242F"
//! ```
//!
//! Command-line overrides are applied during load via [`CliSettings`].

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use mdview_style::{Construct, Layout, StyleRecordPatch, StyleSheet};
use serde::Deserialize;

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "mdview.toml";

/// Smallest padding that keeps adjacent table columns apart.
const MIN_TABLE_CELL_PADDING: usize = 2;

/// CLI settings that override configuration file values.
///
/// Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override `render.emit_line_ranges`.
    pub emit_line_ranges: Option<bool>,
    /// Override `render.heading_anchors`.
    pub heading_anchors: Option<bool>,
    /// Override `render.debug`.
    pub debug: Option<bool>,
}

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Renderer switches.
    pub render: RenderConfig,
    /// Style sheet overrides.
    pub style: StyleConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// Renderer switches.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Add `begin-line`/`end-line` to block elements in HTML output.
    pub emit_line_ranges: bool,
    /// Add `id` anchors to HTML headings.
    pub heading_anchors: bool,
    /// Log the document tree before rendering.
    pub debug: bool,
}

/// Style sheet overrides.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct StyleConfig {
    /// Layout constants, replacing the defaults field by field.
    pub layout: Layout,
    /// Per-construct record patches keyed by construct name (`h1`, `body`,
    /// `code_block`, ...).
    pub records: BTreeMap<String, StyleRecordPatch>,
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
}

fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

fn require_non_negative(value: f32, field: &str) -> Result<(), ConfigError> {
    if !value.is_finite() || value < 0.0 {
        return Err(ConfigError::Validation(format!(
            "{field} must be a non-negative number"
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file. Otherwise,
    /// searches for `mdview.toml` in the current directory and parents and
    /// falls back to defaults when none exists.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, or if reading,
    /// parsing or validation fails.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let discovered = match config_path {
            Some(path) if !path.exists() => {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Some(path) => Some(path.to_path_buf()),
            None => std::env::current_dir()
                .ok()
                .and_then(|cwd| discover_config(&cwd)),
        };

        let mut config = match discovered {
            Some(path) => Self::load_from_file(&path)?,
            None => {
                tracing::debug!("no {CONFIG_FILENAME} found, using defaults");
                Self::default()
            }
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        Ok(config)
    }

    /// Parse configuration from TOML text and validate it.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Parse` or `ConfigError::Validation`.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        tracing::debug!(path = %path.display(), "loading configuration");
        let content = std::fs::read_to_string(path)?;
        let mut config = Self::from_toml(&content)?;
        config.config_path = Some(path.to_path_buf());
        Ok(config)
    }

    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(emit_line_ranges) = settings.emit_line_ranges {
            self.render.emit_line_ranges = emit_line_ranges;
        }
        if let Some(heading_anchors) = settings.heading_anchors {
            self.render.heading_anchors = heading_anchors;
        }
        if let Some(debug) = settings.debug {
            self.render.debug = debug;
        }
    }

    /// Validate configuration values.
    ///
    /// Called automatically after parsing.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` on the first invalid value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_layout()?;
        self.validate_records()?;
        Ok(())
    }

    fn validate_layout(&self) -> Result<(), ConfigError> {
        let layout = &self.style.layout;

        require_non_empty(&layout.bullets.primary, "style.layout.bullets.primary")?;
        require_non_empty(&layout.bullets.secondary, "style.layout.bullets.secondary")?;
        require_non_empty(&layout.checked_glyph, "style.layout.checked_glyph")?;
        require_non_empty(&layout.unchecked_glyph, "style.layout.unchecked_glyph")?;
        require_non_empty(&layout.block_quote_glyph, "style.layout.block_quote_glyph")?;

        for (value, field) in [
            (layout.paragraph_spacer, "style.layout.paragraph_spacer"),
            (layout.soft_break_spacer, "style.layout.soft_break_spacer"),
            (layout.list_indent, "style.layout.list_indent"),
            (layout.block_quote_indent, "style.layout.block_quote_indent"),
            (layout.code_block_head_indent, "style.layout.code_block_head_indent"),
            (layout.code_block_tail_indent, "style.layout.code_block_tail_indent"),
        ] {
            require_non_negative(value, field)?;
        }

        if layout.table_cell_padding < MIN_TABLE_CELL_PADDING {
            return Err(ConfigError::Validation(format!(
                "style.layout.table_cell_padding must be at least {MIN_TABLE_CELL_PADDING}"
            )));
        }

        Ok(())
    }

    fn validate_records(&self) -> Result<(), ConfigError> {
        for (name, patch) in &self.style.records {
            if Construct::from_name(name).is_none() {
                return Err(ConfigError::Validation(format!(
                    "style.records.{name} is not a known construct"
                )));
            }
            if let Some(size) = patch.size
                && (!size.is_finite() || size <= 0.0)
            {
                return Err(ConfigError::Validation(format!(
                    "style.records.{name}.size must be positive"
                )));
            }
            if let Some(spacing) = patch.spacing {
                require_non_negative(spacing, &format!("style.records.{name}.spacing"))?;
            }
        }
        Ok(())
    }

    /// Build the style sheet: defaults, then the configured layout and
    /// record patches.
    #[must_use]
    pub fn style_sheet(&self) -> StyleSheet {
        let mut sheet = StyleSheet::default();
        sheet.layout = self.style.layout.clone();
        for (name, patch) in &self.style.records {
            match Construct::from_name(name) {
                Some(construct) => patch.apply(sheet.record_mut(construct)),
                None => tracing::warn!(name, "ignoring style for unknown construct"),
            }
        }
        sheet
    }
}

/// Search for `mdview.toml` in `start` and its parents.
#[must_use]
pub fn discover_config(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();
    loop {
        let candidate = current.join(CONFIG_FILENAME);
        if candidate.is_file() {
            return Some(candidate);
        }
        if !current.pop() {
            return None;
        }
    }
}

#[cfg(test)]
mod tests {
    use mdview_style::{Color, FontFamily};
    use pretty_assertions::assert_eq;

    use super::*;

    fn assert_validation_error(toml: &str, fragments: &[&str]) {
        let err = Config::from_toml(toml).unwrap_err();
        assert!(
            matches!(err, ConfigError::Validation(_)),
            "Expected ConfigError::Validation, got {err:?}"
        );
        let message = err.to_string();
        for fragment in fragments {
            assert!(message.contains(fragment), "{message:?} lacks {fragment:?}");
        }
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(!config.render.emit_line_ranges);
        assert!(!config.render.heading_anchors);
        assert!(!config.render.debug);
        assert_eq!(config.style.layout, Layout::default());
        assert!(config.style.records.is_empty());
        assert_eq!(config.style_sheet(), StyleSheet::default());
    }

    #[test]
    fn test_parse_empty_config() {
        let config = Config::from_toml("").unwrap();
        assert!(!config.render.heading_anchors);
        assert!(config.config_path.is_none());
    }

    #[test]
    fn test_parse_render_config() {
        let toml = r"
[render]
emit_line_ranges = true
heading_anchors = true
";
        let config = Config::from_toml(toml).unwrap();
        assert!(config.render.emit_line_ranges);
        assert!(config.render.heading_anchors);
        assert!(!config.render.debug);
    }

    #[test]
    fn test_style_sheet_applies_layout_and_records() {
        let toml = r##"
[style.layout]
list_indent = 24
bullets = { primary = "-" }

[style.records.h1]
size = 30
foreground = "#D1242F"

[style.records.code_block]
family = "system"
"##;
        let config = Config::from_toml(toml).unwrap();
        let sheet = config.style_sheet();

        assert_eq!(sheet.layout.list_indent, 24.0);
        assert_eq!(sheet.layout.bullets.primary, "-");
        assert_eq!(sheet.layout.bullets.secondary, "⁃");
        assert_eq!(sheet.layout.block_quote_indent, 16.0);

        let h1 = sheet.record(Construct::Heading(1));
        assert_eq!(h1.font.size, 30.0);
        assert!(h1.font.bold);
        assert_eq!(h1.foreground, Some("#D1242F".parse::<Color>().unwrap()));

        let code = sheet.record(Construct::CodeBlock);
        assert_eq!(code.font.family, FontFamily::System);
        assert_eq!(code.font.size, 14.0);

        let defaults = StyleSheet::default();
        assert_eq!(sheet.record(Construct::Body), defaults.record(Construct::Body));
    }

    #[test]
    fn test_unknown_construct_rejected() {
        assert_validation_error("[style.records.h7]\nsize = 12\n", &["h7", "construct"]);
    }

    #[test]
    fn test_unknown_record_field_rejected() {
        let err = Config::from_toml("[style.records.h1]\nweight = 700\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)), "got {err:?}");
    }

    #[test]
    fn test_validate_font_size_positive() {
        assert_validation_error("[style.records.body]\nsize = 0\n", &["body.size", "positive"]);
        assert_validation_error("[style.records.h2]\nsize = -4\n", &["h2.size"]);
    }

    #[test]
    fn test_validate_glyphs_non_empty() {
        assert_validation_error(
            "[style.layout]\nchecked_glyph = \"\"\n",
            &["checked_glyph", "empty"],
        );
        assert_validation_error(
            "[style.layout.bullets]\nsecondary = \"\"\n",
            &["bullets.secondary"],
        );
    }

    #[test]
    fn test_validate_table_cell_padding() {
        assert_validation_error(
            "[style.layout]\ntable_cell_padding = 1\n",
            &["table_cell_padding", "at least 2"],
        );
        assert!(Config::from_toml("[style.layout]\ntable_cell_padding = 4\n").is_ok());
    }

    #[test]
    fn test_validate_negative_indent() {
        assert_validation_error("[style.layout]\nlist_indent = -1\n", &["list_indent"]);
    }

    #[test]
    fn test_apply_cli_settings() {
        let mut config = Config::from_toml("[render]\nheading_anchors = true\n").unwrap();
        config.apply_cli_settings(&CliSettings {
            emit_line_ranges: Some(true),
            heading_anchors: None,
            debug: Some(true),
        });
        assert!(config.render.emit_line_ranges);
        assert!(config.render.heading_anchors);
        assert!(config.render.debug);

        config.apply_cli_settings(&CliSettings {
            heading_anchors: Some(false),
            ..CliSettings::default()
        });
        assert!(!config.render.heading_anchors);
        assert!(config.render.debug);
    }

    #[test]
    fn test_load_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(&path, "[render]\nemit_line_ranges = true\n").unwrap();

        let config = Config::load(Some(&path), None).unwrap();
        assert!(config.render.emit_line_ranges);
        assert_eq!(config.config_path, Some(path));
    }

    #[test]
    fn test_load_explicit_path_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.toml");

        let err = Config::load(Some(&path), None).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(ref p) if *p == path));
    }

    #[test]
    fn test_cli_settings_override_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        std::fs::write(&path, "[render]\nemit_line_ranges = true\n").unwrap();

        let settings = CliSettings {
            emit_line_ranges: Some(false),
            ..CliSettings::default()
        };
        let config = Config::load(Some(&path), Some(&settings)).unwrap();
        assert!(!config.render.emit_line_ranges);
    }

    #[test]
    fn test_load_reports_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        std::fs::write(&path, "[render\n").unwrap();

        let err = Config::load(Some(&path), None).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)), "got {err:?}");
    }

    #[test]
    fn test_discover_config_in_parent() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("docs").join("guide");
        std::fs::create_dir_all(&nested).unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        std::fs::write(&path, "").unwrap();

        assert_eq!(discover_config(&nested), Some(path.clone()));
        assert_eq!(discover_config(dir.path()), Some(path));
    }

    #[test]
    fn test_discover_config_prefers_nearest() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("docs");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(dir.path().join(CONFIG_FILENAME), "").unwrap();
        std::fs::write(nested.join(CONFIG_FILENAME), "").unwrap();

        assert_eq!(discover_config(&nested), Some(nested.join(CONFIG_FILENAME)));
    }

    #[test]
    fn test_discover_config_ignores_directory_named_like_config() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a");
        std::fs::create_dir_all(nested.join(CONFIG_FILENAME)).unwrap();

        let found = discover_config(&nested);
        assert_ne!(found, Some(nested.join(CONFIG_FILENAME)));
    }
}
