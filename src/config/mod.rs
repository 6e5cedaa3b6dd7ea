//! Configuration for netpol-matrix.
//!
//! - Typed sections (`server`, `matrix`, `tui`, `logging`)
//! - Validation that reports every problem at once
//! - YAML config file loading and discovery
//! - CLI flag overrides
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use netpol_matrix::config::{AppConfig, ConfigOverrides, Validatable};
//!
//! let overrides = ConfigOverrides {
//!     server_url: Some("http://cluster-api:5000".into()),
//!     ..ConfigOverrides::default()
//! };
//! let (config, loaded_from) = AppConfig::from_file_with_overrides(None, &overrides)?;
//! assert!(config.is_valid());
//! ```
//!
//! # Configuration File
//!
//! Place a `.netpol-matrix.yaml` file in the working directory or
//! `~/.config/netpol-matrix/`:
//!
//! ```yaml
//! server:
//!   url: http://127.0.0.1:5000
//! matrix:
//!   default_resource_type: pod
//!   chunk_size: 25
//! ```

mod defaults;
pub mod file;
mod types;
mod validation;

pub use defaults::{
    APP_DIR_NAME, DEFAULT_CHUNK_SIZE, DEFAULT_PUSH_PATH, DEFAULT_ROW_HEIGHT, DEFAULT_SERVER_URL,
    DEFAULT_TICK_RATE_MS, THEMES,
};
pub use types::{
    AppConfig, ConfigOverrides, LoggingConfig, MatrixConfig, ServerConfig, TuiConfig,
    TuiPreferences,
};
pub use validation::{ConfigError, Validatable};

pub use file::{
    discover_config_file, generate_example_config, generate_full_example_config, load_config_file,
    load_or_default, ConfigFileError, CONFIG_FILE_NAMES,
};

/// JSON Schema for the `AppConfig` file format, for editor validation and
/// autocompletion.
pub fn generate_json_schema() -> Result<String, serde_json::Error> {
    let schema = schemars::schema_for!(AppConfig);
    serde_json::to_string_pretty(&schema)
}
