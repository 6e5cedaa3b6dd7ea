//! Configuration validation.

use super::defaults::{THEMES, TICK_RATE_RANGE_MS};
use super::types::{AppConfig, LoggingConfig, MatrixConfig, ServerConfig, TuiConfig};
use reqwest::Url;

/// One problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    /// Dotted field path, e.g. `matrix.chunk_size`
    pub field: String,
    pub message: String,
}

impl ConfigError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ConfigError {}

/// Trait for validatable configuration types.
pub trait Validatable {
    /// Every problem found; empty when valid.
    fn validate(&self) -> Vec<ConfigError>;

    fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }
}

impl Validatable for AppConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = self.server.validate();
        errors.extend(self.matrix.validate());
        errors.extend(self.tui.validate());
        errors.extend(self.logging.validate());
        errors
    }
}

impl Validatable for ServerConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        match Url::parse(self.url.trim()) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            Ok(url) => errors.push(ConfigError::new(
                "server.url",
                format!("unsupported scheme '{}'", url.scheme()),
            )),
            Err(e) => errors.push(ConfigError::new(
                "server.url",
                format!("'{}' is not a URL: {e}", self.url),
            )),
        }

        if self.timeout_secs == 0 {
            errors.push(ConfigError::new(
                "server.timeout_secs",
                "must be at least 1",
            ));
        }

        if !self.push_path.starts_with('/') {
            errors.push(ConfigError::new(
                "server.push_path",
                format!("'{}' must start with '/'", self.push_path),
            ));
        }

        errors
    }
}

impl Validatable for MatrixConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        if self.row_height == 0 {
            errors.push(ConfigError::new("matrix.row_height", "must be at least 1"));
        }
        if self.chunk_size == 0 {
            errors.push(ConfigError::new("matrix.chunk_size", "must be at least 1"));
        }
        if self.system_prefixes.iter().any(|p| p.trim().is_empty()) {
            errors.push(ConfigError::new(
                "matrix.system_prefixes",
                "empty prefix would hide every resource",
            ));
        }

        errors
    }
}

impl Validatable for TuiConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        if !THEMES.contains(&self.theme.as_str()) {
            errors.push(ConfigError::new(
                "tui.theme",
                format!(
                    "unknown theme '{}', expected one of: {}",
                    self.theme,
                    THEMES.join(", ")
                ),
            ));
        }

        if !TICK_RATE_RANGE_MS.contains(&self.tick_rate_ms) {
            errors.push(ConfigError::new(
                "tui.tick_rate_ms",
                format!(
                    "{} is outside {}..={}",
                    self.tick_rate_ms,
                    TICK_RATE_RANGE_MS.start(),
                    TICK_RATE_RANGE_MS.end()
                ),
            ));
        }

        errors
    }
}

impl Validatable for LoggingConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        if let Some(level) = &self.level {
            if tracing_subscriber::EnvFilter::try_new(level).is_err() {
                errors.push(ConfigError::new(
                    "logging.level",
                    format!("'{level}' is not a valid filter directive"),
                ));
            }
        }
        errors
    }
}
