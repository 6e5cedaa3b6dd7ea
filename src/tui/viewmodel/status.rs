//! Transient status-line messages.

use std::time::{Duration, Instant};

/// Severity of a status message; picks its colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusLevel {
    #[default]
    Info,
    Warning,
    Error,
}

/// A status message that clears itself after a while.
///
/// ```ignore
/// let mut status = StatusMessage::with_auto_clear(Duration::from_secs(4));
/// status.set("Reloading deployments");
/// assert!(status.message().is_some());
/// ```
#[derive(Debug, Clone, Default)]
pub struct StatusMessage {
    message: Option<String>,
    level: StatusLevel,
    set_at: Option<Instant>,
    /// None = keep until replaced or cleared
    auto_clear_after: Option<Duration>,
}

impl StatusMessage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn with_auto_clear(duration: Duration) -> Self {
        Self {
            message: None,
            level: StatusLevel::Info,
            set_at: None,
            auto_clear_after: Some(duration),
        }
    }

    pub fn set(&mut self, msg: impl Into<String>) {
        self.set_with_level(msg, StatusLevel::Info);
    }

    pub fn warn(&mut self, msg: impl Into<String>) {
        self.set_with_level(msg, StatusLevel::Warning);
    }

    pub fn error(&mut self, msg: impl Into<String>) {
        self.set_with_level(msg, StatusLevel::Error);
    }

    fn set_with_level(&mut self, msg: impl Into<String>, level: StatusLevel) {
        self.message = Some(msg.into());
        self.level = level;
        self.set_at = Some(Instant::now());
    }

    pub fn clear(&mut self) {
        self.message = None;
        self.set_at = None;
    }

    /// Drop the message once it has expired. Called every tick.
    pub fn expire(&mut self) {
        if let (Some(set_at), Some(duration)) = (self.set_at, self.auto_clear_after) {
            if set_at.elapsed() >= duration {
                self.clear();
            }
        }
    }

    /// Current message, after applying auto-clear.
    pub fn message(&mut self) -> Option<&str> {
        self.expire();
        self.message.as_deref()
    }

    /// Current message without checking auto-clear.
    #[must_use]
    pub fn peek(&self) -> Option<&str> {
        self.message.as_deref()
    }

    #[must_use]
    pub const fn level(&self) -> StatusLevel {
        self.level
    }

    #[must_use]
    pub const fn has_message(&self) -> bool {
        self.message.is_some()
    }
}
