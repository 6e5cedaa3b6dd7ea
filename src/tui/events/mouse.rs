//! Mouse event handlers.

use crate::tui::app::App;
use crate::tui::viewmodel::OverlayKind;
use crossterm::event::{MouseButton, MouseEvent, MouseEventKind};

/// Rows scrolled per wheel notch.
const WHEEL_ROWS: isize = 3;

pub fn handle_mouse_event(app: &mut App, mouse: MouseEvent) {
    if !app.mouse_enabled {
        return;
    }
    match mouse.kind {
        MouseEventKind::ScrollUp => scroll(app, -WHEEL_ROWS),
        MouseEventKind::ScrollDown => scroll(app, WHEEL_ROWS),
        MouseEventKind::Down(MouseButton::Left) => {
            // Close overlays on click
            if app.overlays.has_overlay() {
                app.close_overlay();
                return;
            }
            let hit = app.grid.and_then(|grid| grid.cell_at(mouse.column, mouse.row));
            if let Some((row, col)) = hit {
                app.activate_at(row, col);
            }
        }
        MouseEventKind::Down(MouseButton::Right) => {
            if app.overlays.has_overlay() {
                app.close_overlay();
            }
        }
        _ => {}
    }
}

fn scroll(app: &mut App, rows: isize) {
    if app.overlays.is_showing(OverlayKind::Details) {
        if let Some(panel) = app.details.as_mut() {
            panel.scroll_by(i32::try_from(rows).unwrap_or(0));
        }
    } else if !app.overlays.has_overlay() {
        app.view.scroll_rows(rows);
    }
}
