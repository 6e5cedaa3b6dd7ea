//! Header, filter bar, status line and footer.

use crate::client::PushStatus;
use crate::matrix::LoadState;
use crate::tui::app::App;
use crate::tui::theme::{filter_badge, render_footer_hints, ColorScheme};
use crate::tui::viewmodel::StatusLevel;
use ratatui::{prelude::*, widgets::Paragraph};

pub fn render_header(frame: &mut Frame, area: Rect, app: &App) {
    let scheme = &app.theme.colors;
    let summary = app.view.summary();
    let sep = || Span::styled(" │ ", scheme.muted_style());

    let mut spans = vec![
        Span::styled(" netpol-matrix ", scheme.title()),
        sep(),
        Span::styled(format!("{}s", app.view.resource_type()), Style::default().fg(scheme.accent).bold()),
        sep(),
        Span::styled(format!("{}", summary.visible), scheme.text_style().bold()),
        Span::styled(
            format!("/{} resources, {} rows mounted", summary.total, summary.mounted),
            scheme.muted_style(),
        ),
        sep(),
        Span::styled(
            format!("cache {} ({:.0}% hits)", app.view.cache().len(), summary.cache.hit_rate() * 100.0),
            scheme.muted_style(),
        ),
        sep(),
    ];

    let load_style = if app.view.load_state().is_busy() {
        Style::default().fg(scheme.warning)
    } else if matches!(app.view.load_state(), LoadState::Stopped(_)) {
        Style::default().fg(scheme.error).bold()
    } else {
        Style::default().fg(scheme.success)
    };
    spans.push(Span::styled(app.load_label(), load_style));

    match &app.push_status {
        Some(PushStatus::Connected) => {
            spans.push(sep());
            spans.push(Span::styled("live", Style::default().fg(scheme.success)));
        }
        Some(PushStatus::Reconnecting(delay)) => {
            spans.push(sep());
            spans.push(Span::styled(
                format!("reconnecting in {}s", delay.as_secs()),
                Style::default().fg(scheme.warning),
            ));
        }
        None => {}
    }

    frame.render_widget(Paragraph::new(Line::from(spans)).style(scheme.status_bar()), area);
}

/// Namespace badge text: `all` or `2/5`.
pub fn namespace_badge(app: &App) -> String {
    let choices = app.view.namespace_choices();
    let selected = &app.view.filters().selected_namespaces;
    if selected.is_empty() {
        "all".to_string()
    } else {
        format!("{}/{}", selected.len(), choices.len())
    }
}

pub fn render_filter_bar(frame: &mut Frame, area: Rect, app: &App) {
    let scheme = &app.theme.colors;
    let mut spans = vec![Span::raw(" ")];

    if app.search.active {
        spans.push(Span::styled("Search: ", scheme.shortcut_key()));
        spans.push(Span::styled(app.search.query.clone(), scheme.text_style()));
        spans.push(Span::styled("▏", Style::default().fg(scheme.accent)));
    } else {
        let query = if app.search.query.is_empty() {
            "-".to_string()
        } else {
            app.search.query.clone()
        };
        spans.extend(filter_badge(scheme, "Search", &query));
    }
    spans.push(Span::raw("  "));
    spans.extend(filter_badge(scheme, "Namespaces", &namespace_badge(app)));
    spans.push(Span::raw("  "));
    let system = if app.view.filters().show_system_resources {
        "shown"
    } else {
        "hidden"
    };
    spans.extend(filter_badge(scheme, "System", system));

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

pub fn render_status_line(frame: &mut Frame, area: Rect, app: &App, scheme: &ColorScheme) {
    let line = match app.status.peek() {
        Some(message) => {
            let color = match app.status.level() {
                StatusLevel::Info => scheme.accent,
                StatusLevel::Warning => scheme.warning,
                StatusLevel::Error => scheme.error,
            };
            Line::from(vec![
                Span::styled(" ℹ ", Style::default().fg(color)),
                Span::styled(message.to_string(), Style::default().fg(color).bold()),
            ])
        }
        None => match app.view.tooltip() {
            Some(tip) => Line::styled(format!(" {tip}"), scheme.muted_style()),
            None => Line::from(""),
        },
    };
    frame.render_widget(Paragraph::new(line), area);
}

const MATRIX_HINTS: &[(&str, &str)] = &[
    ("↵", "analyze"),
    ("/", "search"),
    ("n", "namespaces"),
    ("s", "system"),
    ("t", "type"),
    ("r", "reload"),
    ("i", "info"),
    ("p", "policies"),
    ("?", "help"),
    ("q", "quit"),
];

const SEARCH_HINTS: &[(&str, &str)] = &[("↵", "keep"), ("Esc", "cancel"), ("^U", "clear")];

pub fn render_footer(frame: &mut Frame, area: Rect, app: &App) {
    let scheme = &app.theme.colors;
    let hints = if app.search.active {
        SEARCH_HINTS
    } else {
        MATRIX_HINTS
    };
    frame.render_widget(
        Paragraph::new(Line::from(render_footer_hints(scheme, hints))).style(scheme.status_bar()),
        area,
    );
}
