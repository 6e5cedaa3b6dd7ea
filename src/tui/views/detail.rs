//! Side pane with the analysis of the last selected pair.

use crate::matrix::{DetailView, MatrixView};
use crate::tui::theme::ColorScheme;
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph, Wrap},
};

/// Styled lines for a detail view.
pub fn detail_lines(detail: &DetailView, scheme: &ColorScheme) -> Vec<Line<'static>> {
    let mut lines = vec![Line::styled(detail.title.clone(), scheme.title()), Line::from("")];
    for line in &detail.lines {
        let value_style = line
            .tone
            .map_or_else(|| scheme.text_style(), |tone| Style::default().fg(scheme.tone(tone)));
        match line.label {
            Some(label) => lines.push(Line::from(vec![
                Span::styled(format!("{label}: "), scheme.label()),
                Span::styled(line.value.clone(), value_style),
            ])),
            None => lines.push(Line::from(vec![
                Span::styled("  • ", scheme.muted_style()),
                Span::styled(line.value.clone(), value_style),
            ])),
        }
    }
    lines
}

pub fn render_detail(frame: &mut Frame, area: Rect, view: &MatrixView, scheme: &ColorScheme) {
    let block = Block::default()
        .title(" Details ")
        .title_style(scheme.title())
        .borders(Borders::ALL)
        .border_style(scheme.border_style(false));

    let lines = match view.detail().view() {
        Some(detail) => detail_lines(detail, scheme),
        None => vec![
            Line::from(""),
            Line::styled("Select a cell and press Enter", scheme.muted_style()),
            Line::styled("to analyze the pair.", scheme.muted_style()),
        ],
    };

    frame.render_widget(
        Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: false }),
        area,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::{CellTone, DetailLine};
    use crate::model::{PairKey, ResourceType};

    #[test]
    fn test_detail_lines_labels_and_items() {
        let detail = DetailView {
            key: PairKey::new("default/web", "default/db", ResourceType::Deployment),
            title: "Communication allowed".into(),
            lines: vec![
                DetailLine {
                    label: Some("Status"),
                    value: "Allowed".into(),
                    tone: Some(CellTone::Success),
                },
                DetailLine {
                    label: None,
                    value: "allow-web".into(),
                    tone: None,
                },
            ],
        };
        let scheme = ColorScheme::dark();
        let lines = detail_lines(&detail, &scheme);
        assert_eq!(lines.len(), 4);
        let status: String = lines[2].spans.iter().map(|s| s.content.as_ref()).collect();
        assert_eq!(status, "Status: Allowed");
        assert_eq!(lines[2].spans[1].style.fg, Some(scheme.success));
        let item: String = lines[3].spans.iter().map(|s| s.content.as_ref()).collect();
        assert_eq!(item, "  • allow-web");
    }
}
