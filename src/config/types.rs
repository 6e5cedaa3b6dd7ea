//! Configuration types for netpol-matrix.
//!
//! Every section is `#[serde(default)]` so a config file only needs the
//! keys it changes.

use super::defaults::{
    APP_DIR_NAME, DEFAULT_CHUNK_SIZE, DEFAULT_MAX_RETRIES, DEFAULT_PUSH_PATH, DEFAULT_ROW_HEIGHT,
    DEFAULT_SERVER_URL, DEFAULT_THEME, DEFAULT_TICK_RATE_MS, DEFAULT_TIMEOUT_SECS,
};
use crate::client::HttpClientConfig;
use crate::matrix::{MatrixSettings, SystemPrefixes, DEFAULT_SYSTEM_PREFIXES};
use crate::model::ResourceType;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

// ============================================================================
// Unified Application Configuration
// ============================================================================

/// Top-level configuration, loaded from a file and overridden by CLI flags.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct AppConfig {
    /// Backend connection
    pub server: ServerConfig,
    /// Matrix behaviour
    pub matrix: MatrixConfig,
    /// Terminal UI
    pub tui: TuiConfig,
    /// Log output
    pub logging: LoggingConfig,
}

impl AppConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply CLI overrides; only flags that were given replace file values.
    pub fn merge(&mut self, overrides: &ConfigOverrides) {
        if let Some(url) = &overrides.server_url {
            self.server.url.clone_from(url);
        }
        if let Some(timeout) = overrides.timeout_secs {
            self.server.timeout_secs = timeout;
        }
        if overrides.no_push {
            self.server.push_enabled = false;
        }
        if let Some(rt) = overrides.resource_type {
            self.matrix.default_resource_type = rt;
        }
        if overrides.show_system_resources {
            self.matrix.show_system_resources = true;
        }
        if let Some(theme) = &overrides.theme {
            self.tui.theme.clone_from(theme);
        }
        if let Some(file) = &overrides.log_file {
            self.logging.file = Some(file.clone());
        }
    }
}

/// Values taken from command-line flags. `None`/`false` leaves the file
/// value alone.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub server_url: Option<String>,
    pub timeout_secs: Option<u64>,
    pub no_push: bool,
    pub resource_type: Option<ResourceType>,
    pub show_system_resources: bool,
    pub theme: Option<String>,
    pub log_file: Option<PathBuf>,
}

// ============================================================================
// Server
// ============================================================================

/// Backend connection settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ServerConfig {
    /// Base URL of the reachability backend
    pub url: String,
    /// Request timeout in seconds
    #[schemars(range(min = 1))]
    pub timeout_secs: u64,
    /// Retries for network errors, 5xx and 429 responses on graph,
    /// namespace and detail loads. Pair checks are never retried.
    pub max_retries: u8,
    /// Listen for server-sent update events
    pub push_enabled: bool,
    /// Path of the event stream, relative to `url`
    pub push_path: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_SERVER_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            max_retries: DEFAULT_MAX_RETRIES,
            push_enabled: true,
            push_path: DEFAULT_PUSH_PATH.to_string(),
        }
    }
}

impl ServerConfig {
    #[must_use]
    pub fn client_config(&self) -> HttpClientConfig {
        HttpClientConfig {
            base_url: self.url.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
            max_retries: self.max_retries,
        }
    }
}

// ============================================================================
// Matrix
// ============================================================================

/// Matrix view settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct MatrixConfig {
    /// Terminal lines per matrix row
    #[schemars(range(min = 1))]
    pub row_height: usize,
    /// Graph nodes converted per UI tick while building a catalog
    #[schemars(range(min = 1))]
    pub chunk_size: usize,
    /// Resource type shown at startup
    pub default_resource_type: ResourceType,
    /// Label prefixes hidden unless system resources are shown
    pub system_prefixes: Vec<String>,
    /// Show system resources at startup
    pub show_system_resources: bool,
    /// Drop cached pairs of a resource type when it is reloaded or pushed
    pub clear_cache_on_update: bool,
}

impl Default for MatrixConfig {
    fn default() -> Self {
        Self {
            row_height: DEFAULT_ROW_HEIGHT,
            chunk_size: DEFAULT_CHUNK_SIZE,
            default_resource_type: ResourceType::default(),
            system_prefixes: DEFAULT_SYSTEM_PREFIXES
                .iter()
                .map(|p| (*p).to_string())
                .collect(),
            show_system_resources: false,
            clear_cache_on_update: true,
        }
    }
}

impl MatrixConfig {
    #[must_use]
    pub fn settings(&self) -> MatrixSettings {
        MatrixSettings {
            row_height: self.row_height,
            chunk_size: self.chunk_size,
            system_prefixes: SystemPrefixes::new(&self.system_prefixes),
            show_system_resources: self.show_system_resources,
            clear_cache_on_update: self.clear_cache_on_update,
        }
    }
}

// ============================================================================
// TUI
// ============================================================================

/// TUI-specific configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct TuiConfig {
    /// Theme name: "dark", "light", or "high-contrast"
    pub theme: String,
    /// UI tick in milliseconds
    #[schemars(range(min = 10, max = 1000))]
    pub tick_rate_ms: u64,
    /// Enable mouse support
    pub mouse_enabled: bool,
}

impl Default for TuiConfig {
    fn default() -> Self {
        Self {
            theme: DEFAULT_THEME.to_string(),
            tick_rate_ms: DEFAULT_TICK_RATE_MS,
            mouse_enabled: true,
        }
    }
}

/// TUI state remembered between runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TuiPreferences {
    /// Theme name: "dark", "light", or "high-contrast"
    pub theme: String,
}

impl Default for TuiPreferences {
    fn default() -> Self {
        Self {
            theme: DEFAULT_THEME.to_string(),
        }
    }
}

impl TuiPreferences {
    /// Get the path to the preferences file.
    #[must_use]
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join(APP_DIR_NAME).join("preferences.json"))
    }

    /// Load preferences from disk, or return defaults if not found.
    #[must_use]
    pub fn load() -> Self {
        Self::load_saved().unwrap_or_default()
    }

    /// Preferences from disk, if a readable file exists.
    #[must_use]
    pub fn load_saved() -> Option<Self> {
        Self::config_path()
            .and_then(|p| std::fs::read_to_string(p).ok())
            .and_then(|s| serde_json::from_str(&s).ok())
    }

    /// Save preferences to disk.
    pub fn save(&self) -> std::io::Result<()> {
        if let Some(path) = Self::config_path() {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let json = serde_json::to_string_pretty(self)
                .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
            std::fs::write(path, json)?;
        }
        Ok(())
    }
}

// ============================================================================
// Logging
// ============================================================================

/// Where logs go when the TUI owns the terminal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log file for TUI mode; defaults to the platform cache dir
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
    /// Filter directive used when RUST_LOG is unset, e.g. "info" or "netpol_matrix=debug"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
}

impl LoggingConfig {
    /// Configured log file, or `<cache dir>/netpol-matrix/netpol-matrix.log`.
    #[must_use]
    pub fn resolved_file(&self) -> Option<PathBuf> {
        self.file.clone().or_else(|| {
            dirs::cache_dir().map(|d| d.join(APP_DIR_NAME).join(format!("{APP_DIR_NAME}.log")))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_only_applies_given_flags() {
        let mut config = AppConfig::default();
        config.server.url = "http://file:5000".into();
        config.tui.theme = "light".into();

        config.merge(&ConfigOverrides {
            timeout_secs: Some(3),
            resource_type: Some(ResourceType::Pod),
            ..ConfigOverrides::default()
        });

        assert_eq!(config.server.url, "http://file:5000");
        assert_eq!(config.server.timeout_secs, 3);
        assert_eq!(config.matrix.default_resource_type, ResourceType::Pod);
        assert_eq!(config.tui.theme, "light");
        assert!(config.server.push_enabled);
    }

    #[test]
    fn test_no_push_flag_disables_push() {
        let mut config = AppConfig::default();
        config.merge(&ConfigOverrides {
            no_push: true,
            ..ConfigOverrides::default()
        });
        assert!(!config.server.push_enabled);
    }

    #[test]
    fn test_conversions() {
        let config = AppConfig::default();
        let client = config.server.client_config();
        assert_eq!(client.base_url, DEFAULT_SERVER_URL);
        assert_eq!(client.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));

        let settings = config.matrix.settings();
        assert_eq!(settings.chunk_size, DEFAULT_CHUNK_SIZE);
        assert!(settings.system_prefixes.is_system("kube-proxy"));
        assert!(settings.clear_cache_on_update);
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let config: AppConfig =
            serde_yaml::from_str("matrix:\n  chunk_size: 50\n").expect("parse");
        assert_eq!(config.matrix.chunk_size, 50);
        assert_eq!(config.matrix.row_height, DEFAULT_ROW_HEIGHT);
        assert_eq!(config.server, ServerConfig::default());
    }

    #[test]
    fn test_unknown_resource_type_is_rejected() {
        let parsed: Result<AppConfig, _> =
            serde_yaml::from_str("matrix:\n  default_resource_type: service\n");
        assert!(parsed.is_err());
    }

    #[test]
    fn test_explicit_log_file_wins() {
        let logging = LoggingConfig {
            file: Some(PathBuf::from("/tmp/x.log")),
            level: None,
        };
        assert_eq!(logging.resolved_file(), Some(PathBuf::from("/tmp/x.log")));
    }
}
