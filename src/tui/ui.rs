//! Terminal setup, the main loop and the frame layout.

use super::app::App;
use super::events::{handle_key_event, handle_mouse_event, Event, EventHandler};
use super::viewmodel::OverlayKind;
use super::views;
use super::widgets::{check_terminal_size, render_size_warning};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;
use std::io::{self, stdout, Stdout};

/// Width of the detail pane next to the grid.
const DETAIL_WIDTH: u16 = 40;
/// Below this width the detail pane is hidden.
const DETAIL_MIN_TOTAL_WIDTH: u16 = 100;

/// Raw mode and alternate screen for as long as it lives.
///
/// Restores the terminal on drop, including on early return and panic
/// unwinding.
struct TerminalGuard {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    mouse: bool,
}

impl TerminalGuard {
    fn new(mouse: bool) -> io::Result<Self> {
        enable_raw_mode()?;
        let mut out = stdout();
        let entered = if mouse {
            execute!(out, EnterAlternateScreen, EnableMouseCapture)
        } else {
            execute!(out, EnterAlternateScreen)
        };
        if let Err(e) = entered {
            let _ = disable_raw_mode();
            return Err(e);
        }
        let terminal = match Terminal::new(CrosstermBackend::new(out)) {
            Ok(t) => t,
            Err(e) => {
                let _ = execute!(stdout(), LeaveAlternateScreen, DisableMouseCapture);
                let _ = disable_raw_mode();
                return Err(e);
            }
        };
        Ok(Self { terminal, mouse })
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        if let Err(e) = disable_raw_mode() {
            tracing::warn!("failed to leave raw mode: {e}");
        }
        let backend = self.terminal.backend_mut();
        let restored = if self.mouse {
            execute!(backend, LeaveAlternateScreen, DisableMouseCapture)
        } else {
            execute!(backend, LeaveAlternateScreen)
        };
        if let Err(e) = restored {
            tracing::warn!("failed to restore terminal: {e}");
        }
        let _ = self.terminal.show_cursor();
    }
}

/// Run the TUI application until the user quits.
pub fn run_tui(app: &mut App, tick_rate_ms: u64) -> io::Result<()> {
    let mut guard = TerminalGuard::new(app.mouse_enabled)?;
    let events = EventHandler::new(tick_rate_ms);

    app.start();
    tracing::info!(source = app.source_name(), "tui started");

    loop {
        guard.terminal.draw(|frame| render(frame, app))?;

        match events.next()? {
            Event::Key(key) => handle_key_event(app, key),
            Event::Mouse(mouse) => handle_mouse_event(app, mouse),
            Event::Resize(_, _) => {}
            Event::Tick => {}
        }
        // background results are applied on every pass so input never starves them
        app.on_tick();

        if app.should_quit {
            break;
        }
    }

    app.shutdown();
    app.view.cache().stats().log_summary();
    Ok(())
}

/// Main render function
fn render(frame: &mut Frame, app: &mut App) {
    let area = frame.area();
    let scheme = app.theme.colors;

    // Check minimum terminal size
    if check_terminal_size(area.width, area.height).is_err() {
        app.grid = None;
        render_size_warning(frame, area, &scheme);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Header
            Constraint::Length(1), // Filter bar
            Constraint::Min(5),    // Grid + detail pane
            Constraint::Length(1), // Status line
            Constraint::Length(1), // Footer
        ])
        .split(area);

    views::render_header(frame, chunks[0], app);
    views::render_filter_bar(frame, chunks[1], app);

    let (grid_area, detail_area) = if area.width >= DETAIL_MIN_TOTAL_WIDTH {
        let split = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(20), Constraint::Length(DETAIL_WIDTH)])
            .split(chunks[2]);
        (split[0], Some(split[1]))
    } else {
        (chunks[2], None)
    };

    let (body, cols) = views::body_layout(grid_area);
    app.view.set_viewport(usize::from(body.height), cols);
    app.grid = Some(views::render_grid(frame, grid_area, &app.view, &scheme));
    if let Some(detail_area) = detail_area {
        views::render_detail(frame, detail_area, &app.view, &scheme);
    }

    views::render_status_line(frame, chunks[3], app, &scheme);
    views::render_footer(frame, chunks[4], app);

    match app.overlays.current() {
        Some(OverlayKind::Help) => views::render_help(frame, area, &scheme),
        Some(OverlayKind::Namespaces) => views::render_namespace_picker(frame, area, app),
        Some(OverlayKind::Details) => {
            if let Some(panel) = app.details.as_ref() {
                views::render_details(frame, area, panel, &scheme);
            }
        }
        None => {}
    }
}
