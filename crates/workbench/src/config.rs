// Chunk: docs/chunks/workbench_config - TOML configuration
//!
//! Workspace configuration.
//!
//! Every field has a default, so an empty or partial `workbench.toml` is
//! valid. The config file is also the one file kind the workspace lets the
//! user edit in place.
//!
//! ## File Location
//!
//! `<config_dir>/workbench/workbench.toml`, e.g.
//! `~/.config/workbench/workbench.toml` on Linux.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Application name used for the config and data directories.
pub const APP_NAME: &str = "workbench";

/// Default name of the editable config file.
pub const CONFIG_FILENAME: &str = "workbench.toml";

/// Errors that can occur while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid config {path}: {message}")]
    Invalid { path: PathBuf, message: String },
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkbenchConfig {
    /// File name of the single editable file kind.
    pub editable_file_name: String,
    pub file_tree: FileTreeConfig,
    pub split: SplitConfig,
    pub preview: PreviewConfig,
    pub terminal: TerminalConfig,
}

impl Default for WorkbenchConfig {
    fn default() -> Self {
        Self {
            editable_file_name: CONFIG_FILENAME.to_string(),
            file_tree: FileTreeConfig::default(),
            split: SplitConfig::default(),
            preview: PreviewConfig::default(),
            terminal: TerminalConfig::default(),
        }
    }
}

/// File-tree pane sizing, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileTreeConfig {
    pub default_width: f64,
    /// Hard floor for the tree pane.
    pub min_width: f64,
    /// Hard floor for the main canvas next to the tree.
    pub min_main_width: f64,
}

impl Default for FileTreeConfig {
    fn default() -> Self {
        Self {
            default_width: 280.0,
            min_width: 240.0,
            min_main_width: 360.0,
        }
    }
}

/// Chat / canvas split sizing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitConfig {
    /// Fraction of the container given to the chat pane.
    pub default_ratio: f64,
    pub min_chat_width: f64,
    pub min_canvas_width: f64,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            default_ratio: 0.4,
            min_chat_width: 320.0,
            min_canvas_width: 360.0,
        }
    }
}

/// Limits applied by the local file and diff services.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewConfig {
    pub max_file_bytes: usize,
    pub max_diff_bytes: usize,
    /// How many leading bytes are scanned for NUL when detecting binaries.
    pub binary_sniff_bytes: usize,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            max_file_bytes: 512 * 1024,
            max_diff_bytes: 1024 * 1024,
            binary_sniff_bytes: 8 * 1024,
        }
    }
}

/// Terminal session parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerminalConfig {
    /// Shell to run. `None` uses the user's login shell.
    pub shell: Option<String>,
    pub cols: u16,
    pub rows: u16,
}

impl Default for TerminalConfig {
    fn default() -> Self {
        Self {
            shell: None,
            cols: 80,
            rows: 24,
        }
    }
}

impl WorkbenchConfig {
    /// Parses a config from TOML text and checks its pane sizes.
    pub fn from_toml(text: &str, path: &Path) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate().map_err(|message| ConfigError::Invalid {
            path: path.to_path_buf(),
            message,
        })?;
        Ok(config)
    }

    /// Pane sizes must be finite and non-negative; the split ratio must lie
    /// in `[0, 1]`.
    fn validate(&self) -> Result<(), String> {
        let widths = [
            ("file_tree.default_width", self.file_tree.default_width),
            ("file_tree.min_width", self.file_tree.min_width),
            ("file_tree.min_main_width", self.file_tree.min_main_width),
            ("split.min_chat_width", self.split.min_chat_width),
            ("split.min_canvas_width", self.split.min_canvas_width),
        ];
        for (name, value) in widths {
            if !value.is_finite() || value < 0.0 {
                return Err(format!("{name} must be a finite, non-negative width, got {value}"));
            }
        }
        let ratio = self.split.default_ratio;
        if !(0.0..=1.0).contains(&ratio) {
            return Err(format!("split.default_ratio must be between 0 and 1, got {ratio}"));
        }
        Ok(())
    }

    /// Loads a config file. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match fs::read_to_string(path) {
            Ok(text) => Self::from_toml(&text, path),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file, using defaults");
                Ok(Self::default())
            }
            Err(source) => Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// Loads the config from the platform config directory.
    pub fn load_default() -> Result<Self, ConfigError> {
        match default_config_path() {
            Some(path) => Self::load(&path),
            None => Ok(Self::default()),
        }
    }

    /// Returns true if `path` names the editable config file kind.
    pub fn is_editable(&self, path: &Path) -> bool {
        path.file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name == self.editable_file_name)
    }
}

/// Returns the path of the default config file, if the platform has a
/// config directory.
pub fn default_config_path() -> Option<PathBuf> {
    Some(dirs::config_dir()?.join(APP_NAME).join(CONFIG_FILENAME))
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_empty_toml_is_default() {
        let config = WorkbenchConfig::from_toml("", Path::new("x.toml")).unwrap();
        assert_eq!(config, WorkbenchConfig::default());
    }

    #[test]
    fn test_partial_toml_overrides_only_given_fields() {
        let text = r#"
            editable_file_name = "agent.toml"

            [file_tree]
            min_width = 200.0

            [terminal]
            shell = "/bin/bash"
        "#;
        let config = WorkbenchConfig::from_toml(text, Path::new("x.toml")).unwrap();
        assert_eq!(config.editable_file_name, "agent.toml");
        assert_eq!(config.file_tree.min_width, 200.0);
        assert_eq!(config.file_tree.default_width, 280.0);
        assert_eq!(config.terminal.shell.as_deref(), Some("/bin/bash"));
        assert_eq!(config.terminal.cols, 80);
    }

    #[test]
    fn test_malformed_toml_is_parse_error() {
        let err = WorkbenchConfig::from_toml("file_tree = 3", Path::new("bad.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_nan_width_is_invalid() {
        let err = WorkbenchConfig::from_toml("[file_tree]\nmin_width = nan\n", Path::new("x.toml")).unwrap_err();
        match err {
            ConfigError::Invalid { message, .. } => assert!(message.contains("file_tree.min_width")),
            other => panic!("expected invalid config, got {other:?}"),
        }
    }

    #[test]
    fn test_infinite_or_negative_width_is_invalid() {
        for text in ["[split]\nmin_canvas_width = inf\n", "[file_tree]\ndefault_width = -1.0\n"] {
            let err = WorkbenchConfig::from_toml(text, Path::new("x.toml")).unwrap_err();
            assert!(matches!(err, ConfigError::Invalid { .. }), "{text}");
        }
    }

    #[test]
    fn test_ratio_outside_unit_range_is_invalid() {
        for text in ["[split]\ndefault_ratio = 1.5\n", "[split]\ndefault_ratio = nan\n"] {
            let err = WorkbenchConfig::from_toml(text, Path::new("x.toml")).unwrap_err();
            assert!(matches!(err, ConfigError::Invalid { .. }), "{text}");
        }
    }

    #[test]
    fn test_invalid_file_fails_to_load() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(CONFIG_FILENAME);
        fs::write(&path, "[file_tree]\nmin_main_width = -inf\n").unwrap();
        assert!(matches!(WorkbenchConfig::load(&path), Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let temp = TempDir::new().unwrap();
        let config = WorkbenchConfig::load(&temp.path().join("nope.toml")).unwrap();
        assert_eq!(config, WorkbenchConfig::default());
    }

    #[test]
    fn test_load_reads_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(CONFIG_FILENAME);
        fs::write(&path, "[split]\ndefault_ratio = 0.5\n").unwrap();
        let config = WorkbenchConfig::load(&path).unwrap();
        assert_eq!(config.split.default_ratio, 0.5);
    }

    #[test]
    fn test_is_editable_matches_file_name_only() {
        let config = WorkbenchConfig::default();
        assert!(config.is_editable(Path::new("workbench.toml")));
        assert!(config.is_editable(Path::new("nested/dir/workbench.toml")));
        assert!(!config.is_editable(Path::new("workbench.toml.bak")));
        assert!(!config.is_editable(Path::new("Cargo.toml")));
    }
}
