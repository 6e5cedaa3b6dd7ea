//! Configuration file loading and discovery.
//!
//! Supports loading configuration from YAML files with automatic discovery.

use super::defaults::APP_DIR_NAME;
use super::types::{AppConfig, ConfigOverrides};
use std::path::{Path, PathBuf};

// ============================================================================
// Configuration File Discovery
// ============================================================================

/// Standard config file names to search for.
pub const CONFIG_FILE_NAMES: &[&str] = &[
    ".netpol-matrix.yaml",
    ".netpol-matrix.yml",
    "netpol-matrix.yaml",
    "netpol-matrix.yml",
];

/// Discover a config file by searching standard locations.
///
/// Search order:
/// 1. Explicit path if provided
/// 2. Current directory
/// 3. User config directory (~/.config/netpol-matrix/)
/// 4. Home directory
#[must_use]
pub fn discover_config_file(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        if path.exists() {
            return Some(path.to_path_buf());
        }
    }

    let cwd = std::env::current_dir().ok();
    let user_dir = dirs::config_dir().map(|d| d.join(APP_DIR_NAME));
    let home = dirs::home_dir();

    [cwd, user_dir, home]
        .into_iter()
        .flatten()
        .find_map(|dir| find_config_in_dir(&dir))
}

/// Find a config file in a specific directory.
fn find_config_in_dir(dir: &Path) -> Option<PathBuf> {
    CONFIG_FILE_NAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.is_file())
}

// ============================================================================
// Configuration File Loading
// ============================================================================

/// Error type for config file operations.
#[derive(Debug, thiserror::Error)]
pub enum ConfigFileError {
    #[error("Config file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] serde_yaml::Error),
}

/// Load an `AppConfig` from a YAML file.
pub fn load_config_file(path: &Path) -> Result<AppConfig, ConfigFileError> {
    if !path.exists() {
        return Err(ConfigFileError::NotFound(path.to_path_buf()));
    }

    let content = std::fs::read_to_string(path)?;
    let config: AppConfig = serde_yaml::from_str(&content)?;
    Ok(config)
}

/// Load config from a discovered file, or return defaults.
///
/// A file that fails to load is logged and skipped.
#[must_use]
pub fn load_or_default(explicit_path: Option<&Path>) -> (AppConfig, Option<PathBuf>) {
    discover_config_file(explicit_path).map_or_else(
        || (AppConfig::default(), None),
        |path| match load_config_file(&path) {
            Ok(config) => (config, Some(path)),
            Err(e) => {
                tracing::warn!("Failed to load config from {}: {}", path.display(), e);
                (AppConfig::default(), None)
            }
        },
    )
}

impl AppConfig {
    /// Load from file and apply CLI overrides.
    ///
    /// An explicitly named file must exist and parse; discovered files
    /// fall back to defaults with a warning.
    pub fn from_file_with_overrides(
        config_path: Option<&Path>,
        overrides: &ConfigOverrides,
    ) -> Result<(Self, Option<PathBuf>), ConfigFileError> {
        let (mut config, loaded_from) = match config_path {
            Some(path) => (load_config_file(path)?, Some(path.to_path_buf())),
            None => load_or_default(None),
        };
        config.merge(overrides);
        Ok((config, loaded_from))
    }
}

// ============================================================================
// Example Config Generation
// ============================================================================

/// Generate an example config file content.
#[must_use]
pub fn generate_example_config() -> String {
    let example = AppConfig::default();
    format!(
        r"# netpol-matrix configuration
# Place this file at .netpol-matrix.yaml in the working directory or ~/.config/netpol-matrix/

{}",
        serde_yaml::to_string(&example).unwrap_or_default()
    )
}

/// Generate a commented example config with all options.
#[must_use]
pub fn generate_full_example_config() -> String {
    r#"# netpol-matrix configuration file
# =================================
#
# Place it at:
#   - .netpol-matrix.yaml in the working directory
#   - ~/.config/netpol-matrix/netpol-matrix.yaml for a per-user config
#
# Command-line flags override values from this file.

# Backend connection
server:
  # Base URL of the reachability backend
  url: "http://127.0.0.1:5000"
  # Per-request timeout in seconds
  timeout_secs: 10
  # Retries for network errors, 5xx and 429 responses on graph,
  # namespace and detail loads (pair checks are never retried)
  max_retries: 0
  # Listen for server-sent update events
  push_enabled: true
  # Event stream path, relative to url
  push_path: "/events"

# Matrix behaviour
matrix:
  # Terminal lines per row
  row_height: 1
  # Graph nodes converted per UI tick while a catalog is built
  chunk_size: 10
  # Resource type at startup: deployment or pod
  default_resource_type: deployment
  # Label prefixes hidden unless system resources are shown (press 's')
  system_prefixes:
    - "kube-"
    - "calico-"
    - "coredns"
  show_system_resources: false
  # Drop cached verdicts of a resource type when it is reloaded or pushed
  clear_cache_on_update: true

# Terminal UI
tui:
  # dark, light or high-contrast
  theme: dark
  # UI tick in milliseconds (10-1000)
  tick_rate_ms: 100
  mouse_enabled: true

# Logging. The TUI writes logs to a file so the terminal stays clean.
# Example:
#   logging:
#     file: /tmp/netpol-matrix.log
#     level: info
logging: {}
"#
    .to_string()
}
