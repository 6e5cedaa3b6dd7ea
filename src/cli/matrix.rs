//! `matrix` command: the interactive TUI.

use super::{build_client, EXIT_OK};
use crate::client::PushListener;
use crate::config::{AppConfig, TuiPreferences};
use crate::matrix::MatrixView;
use crate::tui::{run_tui, App, Theme};
use anyhow::{Context, Result};
use std::sync::Arc;

/// Theme precedence: `--theme` flag, then the saved preference, then the
/// config file.
fn resolve_theme(config: &AppConfig, theme_flag: bool, saved: Option<TuiPreferences>) -> Theme {
    if theme_flag {
        return Theme::from_name(&config.tui.theme);
    }
    saved.map_or_else(
        || Theme::from_name(&config.tui.theme),
        |prefs| Theme::from_name(&prefs.theme),
    )
}

pub fn run_matrix(config: &AppConfig, theme_flag: bool) -> Result<i32> {
    let client = build_client(config)?;
    let view = MatrixView::new(config.matrix.default_resource_type, config.matrix.settings());
    let theme = resolve_theme(config, theme_flag, TuiPreferences::load_saved());

    let mut app = App::new(view, Arc::new(client), theme).with_mouse(config.tui.mouse_enabled);
    if config.server.push_enabled {
        match PushListener::new(&config.server.url, &config.server.push_path) {
            Ok(listener) => app = app.with_push(listener),
            Err(e) => tracing::warn!("push updates disabled: {e}"),
        }
    }

    tracing::info!(
        server = %config.server.url,
        resource_type = %config.matrix.default_resource_type,
        theme = theme.name,
        "starting matrix view"
    );
    run_tui(&mut app, config.tui.tick_rate_ms).context("terminal UI failed")?;
    Ok(EXIT_OK)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_theme_precedence() {
        let mut config = AppConfig::default();
        config.tui.theme = "light".into();
        let saved = || {
            Some(TuiPreferences {
                theme: "high-contrast".into(),
            })
        };

        assert_eq!(resolve_theme(&config, true, saved()).name, "light");
        assert_eq!(resolve_theme(&config, false, saved()).name, "high-contrast");
        assert_eq!(resolve_theme(&config, false, None).name, "light");
    }
}
