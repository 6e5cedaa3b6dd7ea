//! Event handling for the TUI.
//!
//! - Key and mouse event polling
//! - Key dispatch: search bar first, then the open overlay, then the grid

pub mod mouse;

use crate::tui::app::App;
use crate::tui::state::ListNavigation;
use crate::tui::viewmodel::OverlayKind;
use crossterm::event::{
    self, Event as CrosstermEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEvent,
};
use std::time::Duration;

pub use mouse::handle_mouse_event;

/// Lines scrolled per PgUp/PgDn in the details overlay.
const DETAILS_PAGE: i32 = 10;

/// Application event
#[derive(Debug)]
pub enum Event {
    /// Key press event
    Key(KeyEvent),
    /// Mouse event
    Mouse(MouseEvent),
    /// Terminal tick
    Tick,
    /// Resize event
    Resize(u16, u16),
}

/// Event handler
pub struct EventHandler {
    /// Tick rate in milliseconds
    tick_rate: Duration,
}

impl EventHandler {
    /// Create a new event handler
    pub const fn new(tick_rate: u64) -> Self {
        Self {
            tick_rate: Duration::from_millis(tick_rate),
        }
    }

    /// Poll for the next event
    pub fn next(&self) -> Result<Event, std::io::Error> {
        if event::poll(self.tick_rate)? {
            match event::read()? {
                CrosstermEvent::Key(key) => Ok(Event::Key(key)),
                CrosstermEvent::Mouse(mouse) => Ok(Event::Mouse(mouse)),
                CrosstermEvent::Resize(width, height) => Ok(Event::Resize(width, height)),
                _ => Ok(Event::Tick),
            }
        } else {
            Ok(Event::Tick)
        }
    }
}

impl Default for EventHandler {
    fn default() -> Self {
        Self::new(100)
    }
}

/// Handle key events and update app state
pub fn handle_key_event(app: &mut App, key: KeyEvent) {
    // Windows reports releases too
    if key.kind == KeyEventKind::Release {
        return;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.should_quit = true;
        return;
    }

    if app.search.active {
        handle_search_key(app, key);
        return;
    }

    match app.overlays.current() {
        Some(OverlayKind::Help) => {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('?' | 'q')) {
                app.close_overlay();
            }
        }
        Some(OverlayKind::Namespaces) => handle_picker_key(app, key),
        Some(OverlayKind::Details) => handle_details_key(app, key),
        None => handle_grid_key(app, key),
    }
}

fn handle_search_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.cancel_search(),
        KeyCode::Enter => app.commit_search(),
        KeyCode::Backspace => app.search_pop(),
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => app.search_clear(),
        KeyCode::Char(c) => app.search_push(c),
        _ => {}
    }
}

fn handle_picker_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Char('n' | 'q') => app.close_overlay(),
        KeyCode::Up | KeyCode::Char('k') => app.namespace_picker.select_prev(),
        KeyCode::Down | KeyCode::Char('j') => app.namespace_picker.select_next(),
        KeyCode::Home => app.namespace_picker.go_first(),
        KeyCode::End => app.namespace_picker.go_last(),
        KeyCode::Char(' ') | KeyCode::Enter => app.toggle_picked_namespace(),
        KeyCode::Char('a') => app.select_all_namespaces(),
        _ => {}
    }
}

fn handle_details_key(app: &mut App, key: KeyEvent) {
    let scroll = match key.code {
        KeyCode::Esc | KeyCode::Char('q' | 'i' | 'p') => {
            app.close_overlay();
            return;
        }
        KeyCode::Tab | KeyCode::Right | KeyCode::Char('l') => {
            app.next_policy();
            return;
        }
        KeyCode::Up | KeyCode::Char('k') => -1,
        KeyCode::Down | KeyCode::Char('j') => 1,
        KeyCode::PageUp => -DETAILS_PAGE,
        KeyCode::PageDown => DETAILS_PAGE,
        _ => return,
    };
    if let Some(panel) = app.details.as_mut() {
        panel.scroll_by(scroll);
    }
}

fn handle_grid_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Up | KeyCode::Char('k') => app.view.move_selection(-1, 0),
        KeyCode::Down | KeyCode::Char('j') => app.view.move_selection(1, 0),
        KeyCode::Left | KeyCode::Char('h') => app.view.move_selection(0, -1),
        KeyCode::Right | KeyCode::Char('l') => app.view.move_selection(0, 1),
        KeyCode::PageUp => app.view.page_up(),
        KeyCode::PageDown => app.view.page_down(),
        KeyCode::Home | KeyCode::Char('g') => app.view.go_first(),
        KeyCode::End | KeyCode::Char('G') => app.view.go_last(),
        KeyCode::Enter | KeyCode::Char(' ') => app.activate_selected(),
        KeyCode::Char('/') => app.start_search(),
        KeyCode::Char('n') => app.open_namespace_picker(),
        KeyCode::Char('s') => app.toggle_system_resources(),
        KeyCode::Char('t') => app.toggle_resource_type(),
        KeyCode::Char('r') => app.reload(),
        KeyCode::Char('i') => app.open_resource_details(),
        KeyCode::Char('p') => app.open_policy_details(),
        KeyCode::Char('T') => app.toggle_theme(),
        KeyCode::Char('?') => app.toggle_help(),
        KeyCode::Esc => app.close_overlay(),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::testing::ScriptedSource;
    use crate::matrix::{LoadReason, MatrixSettings, MatrixView};
    use crate::model::wire::{GraphPayload, NodeData, NodeEnvelope};
    use crate::model::ResourceType;
    use crate::tui::theme::Theme;
    use crate::tui::viewmodel::DetailsPanel;
    use std::sync::Arc;

    fn press(app: &mut App, code: KeyCode) {
        handle_key_event(app, KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn app() -> App {
        let mut view = MatrixView::new(ResourceType::Deployment, MatrixSettings::default());
        let ticket = view.begin_load(ResourceType::Deployment, LoadReason::Initial);
        let nodes = ["default/web", "default/db", "shop/cart"]
            .iter()
            .map(|id| NodeEnvelope {
                data: NodeData {
                    id: (*id).to_string(),
                    label: Some(id.rsplit('/').next().unwrap_or(id).to_string()),
                    group: Some("deployment".into()),
                },
            })
            .collect();
        view.load_succeeded(ticket, GraphPayload { nodes, edges: vec![] });
        view.finish_build();
        view.set_viewport(10, 5);
        App::new(view, Arc::new(ScriptedSource::new()), Theme::dark()).without_saved_preferences()
    }

    #[test]
    fn test_movement_keys() {
        let mut app = app();
        press(&mut app, KeyCode::Char('j'));
        press(&mut app, KeyCode::Right);
        assert_eq!(app.view.selection(), (1, 1));
        press(&mut app, KeyCode::End);
        assert_eq!(app.view.selection(), (2, 1));
        press(&mut app, KeyCode::Home);
        assert_eq!(app.view.selection(), (0, 1));
    }

    #[test]
    fn test_search_captures_keys() {
        let mut app = app();
        press(&mut app, KeyCode::Char('/'));
        press(&mut app, KeyCode::Char('q'));
        assert!(!app.should_quit);
        assert_eq!(app.search.query, "q");
        press(&mut app, KeyCode::Esc);
        assert!(!app.search.active);
        assert_eq!(app.search.query, "");
    }

    #[test]
    fn test_namespace_picker_toggles() {
        let mut app = app();
        press(&mut app, KeyCode::Char('n'));
        assert!(app.overlays.is_showing(OverlayKind::Namespaces));
        // choices are catalog order: default, shop
        press(&mut app, KeyCode::Char(' '));
        assert!(!app.view.is_namespace_selected("default"));
        assert_eq!(app.view.visible().len(), 1);
        press(&mut app, KeyCode::Char('a'));
        assert_eq!(app.view.visible().len(), 3);
        press(&mut app, KeyCode::Esc);
        assert!(!app.overlays.has_overlay());
    }

    #[test]
    fn test_help_toggle_and_quit() {
        let mut app = app();
        press(&mut app, KeyCode::Char('?'));
        assert!(app.overlays.is_showing(OverlayKind::Help));
        press(&mut app, KeyCode::Char('q'));
        assert!(!app.overlays.has_overlay());
        assert!(!app.should_quit);
        press(&mut app, KeyCode::Char('q'));
        assert!(app.should_quit);
    }

    #[test]
    fn test_details_scroll() {
        let mut app = app();
        app.details = Some(DetailsPanel::resource(ResourceType::Deployment, "default/web"));
        app.overlays.show(OverlayKind::Details);
        press(&mut app, KeyCode::PageDown);
        press(&mut app, KeyCode::Up);
        assert_eq!(app.details.as_ref().map(|d| d.scroll), Some(9));
        press(&mut app, KeyCode::Esc);
        assert!(app.details.is_none());
    }

    #[test]
    fn test_ctrl_c_quits_from_search() {
        let mut app = app();
        press(&mut app, KeyCode::Char('/'));
        handle_key_event(&mut app, KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(app.should_quit);
    }
}
