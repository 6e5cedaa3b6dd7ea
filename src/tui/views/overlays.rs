//! Popup overlays: help, namespace picker and resource/policy details.

use crate::tui::app::App;
use crate::tui::state::ListNavigation;
use crate::tui::theme::ColorScheme;
use crate::tui::viewmodel::DetailsPanel;
use crate::tui::widgets::centered_rect;
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
};

fn popup_block(title: String, scheme: &ColorScheme) -> Block<'static> {
    Block::default()
        .title(title)
        .title_style(scheme.title())
        .borders(Borders::ALL)
        .border_style(scheme.border_style(true))
}

const HELP_SECTIONS: &[(&str, &[(&str, &str)])] = &[
    (
        "Navigation",
        &[
            ("↑↓←→ / hjkl", "Move the cursor"),
            ("PgUp/PgDn", "Page up/down"),
            ("Home/End", "First/last row"),
            ("Mouse wheel", "Scroll rows"),
        ],
    ),
    (
        "Analysis",
        &[
            ("Enter/Space", "Analyze the selected pair"),
            ("Click", "Select and analyze a cell"),
            ("i", "Details of the selected row's resource"),
            ("p", "Policies behind the selected pair"),
        ],
    ),
    (
        "Filters",
        &[
            ("/", "Search by name"),
            ("n", "Pick namespaces"),
            ("s", "Show/hide system resources"),
        ],
    ),
    (
        "General",
        &[
            ("t", "Switch deployments/pods"),
            ("r", "Reload from the server"),
            ("T", "Cycle colour theme"),
            ("?", "Toggle this help"),
            ("Esc", "Close overlay"),
            ("q", "Quit"),
        ],
    ),
];

pub fn render_help(frame: &mut Frame, area: Rect, scheme: &ColorScheme) {
    let popup = centered_rect(60, 80, area);
    frame.render_widget(Clear, popup);

    let mut lines = Vec::new();
    for (section, keys) in HELP_SECTIONS {
        lines.push(Line::styled(*section, scheme.title()));
        for (key, desc) in *keys {
            lines.push(Line::from(vec![
                Span::styled(format!("  {key:<14}"), scheme.shortcut_key()),
                Span::styled(*desc, scheme.text_style()),
            ]));
        }
        lines.push(Line::from(""));
    }
    lines.push(Line::styled(
        "Cells: ✓ allowed  ✗ blocked  ! error  … pending  - not analyzed",
        scheme.muted_style(),
    ));

    frame.render_widget(
        Paragraph::new(lines).block(popup_block(" Keyboard Shortcuts ".into(), scheme)),
        popup,
    );
}

pub fn render_namespace_picker(frame: &mut Frame, area: Rect, app: &App) {
    let scheme = &app.theme.colors;
    let popup = centered_rect(40, 60, area);
    frame.render_widget(Clear, popup);

    let choices = app.view.namespace_choices();
    let items: Vec<ListItem> = choices
        .iter()
        .map(|ns| {
            let (mark, style) = if app.view.is_namespace_selected(ns) {
                ("[x] ", scheme.text_style())
            } else {
                ("[ ] ", scheme.muted_style())
            };
            ListItem::new(Line::from(vec![
                Span::styled(mark, scheme.shortcut_key()),
                Span::styled(ns.clone(), style),
            ]))
        })
        .collect();

    let title = " Namespaces  [Space] toggle  [a] all ".to_string();
    let list = List::new(items)
        .block(popup_block(title, scheme))
        .highlight_style(scheme.selected())
        .highlight_symbol("▶ ");
    let mut state = ListState::default().with_selected(
        (!choices.is_empty()).then_some(app.namespace_picker.selected()),
    );
    frame.render_stateful_widget(list, popup, &mut state);
}

/// Styled lines for the details overlay.
pub fn details_lines(panel: &DetailsPanel, scheme: &ColorScheme) -> Vec<Line<'static>> {
    panel
        .lines()
        .into_iter()
        .map(|(label, value)| match label {
            Some(label) => Line::from(vec![
                Span::styled(format!("{label}: "), scheme.label()),
                Span::styled(value, scheme.text_style()),
            ]),
            None => Line::styled(value, scheme.muted_style()),
        })
        .collect()
}

pub fn render_details(frame: &mut Frame, area: Rect, panel: &DetailsPanel, scheme: &ColorScheme) {
    let popup = centered_rect(70, 75, area);
    frame.render_widget(Clear, popup);

    let title = match panel.position() {
        Some((n, total)) => format!(" {} ({n}/{total})  [Tab] next ", panel.subject().title()),
        None => format!(" {} ", panel.subject().title()),
    };

    frame.render_widget(
        Paragraph::new(details_lines(panel, scheme))
            .block(popup_block(title, scheme))
            .wrap(Wrap { trim: false })
            .scroll((panel.scroll, 0)),
        popup,
    );
}
