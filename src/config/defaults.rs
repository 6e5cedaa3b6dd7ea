//! Default values shared by the config types, the CLI and the TUI.

/// Backend base URL when nothing else is configured.
pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:5000";

/// Per-request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Retries for transient backend failures.
pub const DEFAULT_MAX_RETRIES: u8 = 0;

/// Path of the server-sent events stream.
pub const DEFAULT_PUSH_PATH: &str = "/events";

/// Terminal lines per matrix row.
pub const DEFAULT_ROW_HEIGHT: usize = 1;

/// Graph nodes converted per tick while building a catalog.
pub const DEFAULT_CHUNK_SIZE: usize = 10;

/// UI tick in milliseconds.
pub const DEFAULT_TICK_RATE_MS: u64 = 100;

/// Accepted tick range in milliseconds.
pub const TICK_RATE_RANGE_MS: std::ops::RangeInclusive<u64> = 10..=1000;

pub const DEFAULT_THEME: &str = "dark";

/// Theme names understood by the TUI.
pub const THEMES: &[&str] = &["dark", "light", "high-contrast"];

/// Directory name under the platform config/cache dirs.
pub const APP_DIR_NAME: &str = "netpol-matrix";
