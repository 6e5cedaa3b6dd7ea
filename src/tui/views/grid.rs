//! The reachability grid: sources down the side, targets across the top.
//!
//! Only mounted rows and the current column window are drawn; everything
//! else in the catalog never reaches the terminal.

use crate::matrix::MatrixView;
use crate::model::Resource;
use crate::tui::theme::ColorScheme;
use crate::tui::widgets::truncate_str;
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph},
};

/// Width of the row label column, border excluded.
pub const LABEL_WIDTH: u16 = 24;
/// Width of one cell.
pub const CELL_WIDTH: u16 = 3;
/// Lines taken by the column header inside the grid block.
pub const HEADER_LINES: u16 = 1;

/// Where the grid was drawn, for mouse hit-testing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridGeometry {
    /// Body area: below the column header, inside the border
    pub body: Rect,
    pub scroll_offset: usize,
    pub row_height: usize,
    pub rows: usize,
    pub col_start: usize,
    pub col_end: usize,
}

impl GridGeometry {
    /// `(row, col)` of the cell under a terminal position.
    pub fn cell_at(&self, x: u16, y: u16) -> Option<(usize, usize)> {
        let body = self.body;
        if y < body.y || y >= body.y + body.height {
            return None;
        }
        let cells_x = body.x + LABEL_WIDTH;
        if x < cells_x || x >= body.x + body.width {
            return None;
        }
        let line = self.scroll_offset + usize::from(y - body.y);
        let row = line / self.row_height.max(1);
        let col = self.col_start + usize::from((x - cells_x) / CELL_WIDTH);
        (row < self.rows && col < self.col_end).then_some((row, col))
    }
}

/// Inner body rect and the number of cell columns that fit in `area`.
pub fn body_layout(area: Rect) -> (Rect, usize) {
    let inner = Block::default().borders(Borders::ALL).inner(area);
    let body = Rect {
        y: inner.y + HEADER_LINES.min(inner.height),
        height: inner.height.saturating_sub(HEADER_LINES),
        ..inner
    };
    let cols = inner.width.saturating_sub(LABEL_WIDTH) / CELL_WIDTH;
    (body, usize::from(cols))
}

pub fn render_grid(
    frame: &mut Frame,
    area: Rect,
    view: &MatrixView,
    scheme: &ColorScheme,
) -> GridGeometry {
    let (selected_row, selected_col) = view.selection();
    let columns = view.column_window();
    let scroller = view.scroller();
    let (body, _) = body_layout(area);

    let title = match (view.selected_resource(), view.column_resource(selected_col)) {
        (Some(src), Some(dst)) => format!(" {} → {} ", src.label, dst.label),
        _ => " Matrix ".to_string(),
    };
    let block = Block::default()
        .title(title)
        .title_style(scheme.title())
        .borders(Borders::ALL)
        .border_style(scheme.border_style(true));

    let label_width = usize::from(LABEL_WIDTH);
    let mut lines = Vec::with_capacity(usize::from(body.height) + 1);

    // column header: first letters of each target
    let mut header = vec![Span::raw(" ".repeat(label_width))];
    for col in columns.range() {
        let initials = view
            .column_resource(col)
            .map(|r| truncate_str(&r.label, 2))
            .unwrap_or_default();
        let style = if col == selected_col {
            scheme.selected()
        } else {
            scheme.muted_style()
        };
        header.push(Span::styled(format!("{initials:<2} "), style));
    }
    lines.push(Line::from(header));

    let rows: Vec<(usize, &Resource)> = view.window_rows().collect();
    let row_height = scroller.row_height();
    if view.visible().is_empty() {
        let message = if view.load_state().is_busy() {
            "  Loading..."
        } else if view.catalog().is_empty() {
            "  No resources"
        } else {
            "  No resources match the current filters"
        };
        lines.push(Line::styled(message, scheme.muted_style()));
    }
    for offset in 0..usize::from(body.height) {
        let content_line = scroller.scroll_offset() + offset;
        let row = content_line / row_height;
        let Some((_, resource)) = rows.iter().find(|(r, _)| *r == row) else {
            lines.push(Line::from(""));
            continue;
        };
        if content_line % row_height != 0 {
            lines.push(Line::from(""));
            continue;
        }
        lines.push(grid_row(view, scheme, row, resource, selected_row, selected_col));
    }

    frame.render_widget(Paragraph::new(lines).block(block), area);

    GridGeometry {
        body,
        scroll_offset: scroller.scroll_offset(),
        row_height,
        rows: view.visible().len(),
        col_start: columns.start,
        col_end: columns.end,
    }
}

fn grid_row<'a>(
    view: &MatrixView,
    scheme: &ColorScheme,
    row: usize,
    resource: &Resource,
    selected_row: usize,
    selected_col: usize,
) -> Line<'a> {
    let label_width = usize::from(LABEL_WIDTH);
    let label = truncate_str(&resource.label, label_width - 1);
    let label_style = if row == selected_row {
        Style::default().fg(scheme.accent).bold()
    } else {
        scheme.text_style()
    };
    let mut spans = vec![Span::styled(format!("{label:<label_width$}"), label_style)];

    for col in view.column_window().range() {
        let state = view.cell_state(row, col);
        let mut style = Style::default().fg(scheme.tone(state.tone()));
        if state.is_emphasized() {
            style = style.bold();
        }
        if row == selected_row && col == selected_col {
            style = style.bg(scheme.selection_bg).bold();
        } else if row == selected_row || col == selected_col {
            style = style.bg(scheme.background_alt);
        }
        spans.push(Span::styled(format!(" {} ", state.glyph()), style));
    }
    Line::from(spans)
}
