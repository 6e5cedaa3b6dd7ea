//! Small rendering helpers shared by the views.

use crate::tui::theme::ColorScheme;
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph},
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Helper function to create a centered rectangle.
pub fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

/// Truncate to `max_width` display columns, marking the cut with `…`.
pub fn truncate_str(s: &str, max_width: usize) -> String {
    if s.width() <= max_width {
        return s.to_string();
    }
    let mut out = String::new();
    let mut used = 0;
    for ch in s.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w + 1 > max_width {
            break;
        }
        out.push(ch);
        used += w;
    }
    out.push('…');
    out
}

// ============================================================================
// Minimum Size Check
// ============================================================================

/// Minimum terminal size requirements.
pub const MIN_WIDTH: u16 = 60;
pub const MIN_HEIGHT: u16 = 12;

/// Check if terminal meets minimum size requirements.
pub fn check_terminal_size(width: u16, height: u16) -> Result<(), (u16, u16)> {
    if width < MIN_WIDTH || height < MIN_HEIGHT {
        Err((MIN_WIDTH, MIN_HEIGHT))
    } else {
        Ok(())
    }
}

/// Render a "terminal too small" message.
pub fn render_size_warning(frame: &mut Frame, area: Rect, scheme: &ColorScheme) {
    let lines = vec![
        Line::styled("Terminal too small", Style::default().fg(scheme.warning).bold()),
        Line::from(""),
        Line::from(vec![
            Span::raw("Current: "),
            Span::styled(format!("{}x{}", area.width, area.height), scheme.text_style()),
        ]),
        Line::from(vec![
            Span::raw("Required: "),
            Span::styled(format!("{MIN_WIDTH}x{MIN_HEIGHT}"), Style::default().fg(scheme.accent)),
        ]),
        Line::from(""),
        Line::styled("Please resize your terminal", scheme.muted_style()),
    ];

    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(scheme.warning)),
        )
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_size_check() {
        assert!(check_terminal_size(80, 24).is_ok());
        assert_eq!(check_terminal_size(40, 24), Err((MIN_WIDTH, MIN_HEIGHT)));
    }

    #[test]
    fn test_truncate_str() {
        assert_eq!(truncate_str("web", 5), "web");
        assert_eq!(truncate_str("frontend-proxy", 6), "front…");
    }

    #[test]
    fn test_centered_rect_is_inside() {
        let popup = centered_rect(60, 80, Rect::new(0, 0, 100, 50));
        assert_eq!(popup, Rect::new(20, 5, 60, 40));
    }
}
