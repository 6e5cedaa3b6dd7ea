//! Unified error types for netpol-matrix.
//!
//! Library code returns [`MatrixError`]; the binary wraps it in `anyhow`
//! at the top level.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for netpol-matrix operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum MatrixError {
    /// Errors talking to the analysis backend
    #[error("Backend request failed: {context}")]
    Client {
        context: String,
        #[source]
        source: ClientErrorKind,
    },

    /// IO errors with context
    #[error("IO error at {path:?}: {message}")]
    Io {
        path: Option<PathBuf>,
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Configuration errors
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Validation errors
    #[error("Validation failed: {0}")]
    Validation(String),
}

/// Typed outcome of a failed backend call.
///
/// Cloneable so a failed pair can be kept on its cell and shown in the
/// detail pane without holding the original transport error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ClientErrorKind {
    #[error("Network failure: {0}")]
    NetworkFailure(String),

    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Resource not found: {0}")]
    ResourceNotFound(String),
}

impl ClientErrorKind {
    /// Whether retrying the same request may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::NetworkFailure(_) => true,
            Self::HttpError { status, .. } => *status >= 500 || *status == 429,
            Self::MalformedResponse(_) | Self::ResourceNotFound(_) => false,
        }
    }
}

// ============================================================================
// Result type alias
// ============================================================================

/// Convenient Result type for netpol-matrix operations
pub type Result<T> = std::result::Result<T, MatrixError>;

// ============================================================================
// Error construction helpers
// ============================================================================

impl MatrixError {
    /// Create a client error with context
    pub fn client(context: impl Into<String>, source: ClientErrorKind) -> Self {
        Self::Client {
            context: context.into(),
            source,
        }
    }

    /// Create a network failure
    pub fn network(context: impl Into<String>, message: impl Into<String>) -> Self {
        Self::client(context, ClientErrorKind::NetworkFailure(message.into()))
    }

    /// Create a malformed-response error
    pub fn malformed(context: impl Into<String>, message: impl Into<String>) -> Self {
        Self::client(context, ClientErrorKind::MalformedResponse(message.into()))
    }

    /// Create an IO error with path context
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        let message = format!("{source}");
        Self::Io {
            path: Some(path),
            message,
            source,
        }
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// The backend failure kind, if this is a client error.
    pub fn client_kind(&self) -> Option<&ClientErrorKind> {
        match self {
            Self::Client { source, .. } => Some(source),
            _ => None,
        }
    }

    /// Collapse into the cloneable kind kept on a cell.
    pub fn into_client_kind(self) -> ClientErrorKind {
        match self {
            Self::Client { source, .. } => source,
            other => ClientErrorKind::NetworkFailure(other.to_string()),
        }
    }
}

// ============================================================================
// Conversions from existing error types
// ============================================================================

impl From<std::io::Error> for MatrixError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            path: None,
            message: format!("{err}"),
            source: err,
        }
    }
}

impl From<serde_json::Error> for MatrixError {
    fn from(err: serde_json::Error) -> Self {
        Self::malformed("JSON deserialization", err.to_string())
    }
}

impl From<serde_yaml::Error> for MatrixError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::config(format!("YAML: {err}"))
    }
}

// ============================================================================
// Error context extension trait
// ============================================================================

/// Extension trait for adding context to errors.
///
/// The new context is prepended to the error's existing context, so the
/// final message reads outermost first.
///
/// ```ignore
/// use netpol_matrix::error::ErrorContext;
///
/// let body = std::fs::read_to_string(path).context("reading fixture")?;
/// ```
pub trait ErrorContext<T> {
    /// Add context to an error.
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context from a closure, evaluated only on error.
    fn with_context<F, C>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Into<String>;
}

impl<T, E: Into<MatrixError>> ErrorContext<T> for std::result::Result<T, E> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        let ctx: String = context.into();
        self.map_err(|e| add_context_to_error(e.into(), &ctx))
    }

    fn with_context<F, C>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Into<String>,
    {
        self.map_err(|e| {
            let ctx: String = f().into();
            add_context_to_error(e.into(), &ctx)
        })
    }
}

fn add_context_to_error(err: MatrixError, new_ctx: &str) -> MatrixError {
    match err {
        MatrixError::Client {
            context: existing,
            source,
        } => MatrixError::Client {
            context: chain_context(new_ctx, &existing),
            source,
        },
        MatrixError::Io {
            path,
            message,
            source,
        } => MatrixError::Io {
            path,
            message: chain_context(new_ctx, &message),
            source,
        },
        MatrixError::Config(msg) => MatrixError::Config(chain_context(new_ctx, &msg)),
        MatrixError::Validation(msg) => MatrixError::Validation(chain_context(new_ctx, &msg)),
    }
}

/// Returns "`new`: `existing`", or just `new` when nothing exists yet.
fn chain_context(new: &str, existing: &str) -> String {
    if existing.is_empty() {
        new.to_string()
    } else {
        format!("{new}: {existing}")
    }
}

/// Extension trait for Option types to convert to errors with context.
pub trait OptionContext<T> {
    /// Convert None to an error with the given context.
    fn context_none(self, context: impl Into<String>) -> Result<T>;

    /// Convert None to an error with context from a closure.
    fn with_context_none<F, C>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Into<String>;
}

impl<T> OptionContext<T> for Option<T> {
    fn context_none(self, context: impl Into<String>) -> Result<T> {
        self.ok_or_else(|| MatrixError::Validation(context.into()))
    }

    fn with_context_none<F, C>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Into<String>,
    {
        self.ok_or_else(|| MatrixError::Validation(f().into()))
    }
}
