//! Application state for the matrix TUI.
//!
//! `App` owns the [`MatrixView`] and all UI-only state. It turns key and
//! mouse actions into view mutations and background requests, and feeds
//! worker results back into the view once per tick.

use super::theme::Theme;
use super::viewmodel::{
    DetailsPanel, DetailsSubject, NamespacePicker, OverlayKind, OverlayState, SearchBar, StatusMessage,
};
use super::views::GridGeometry;
use crate::client::{AnalysisSource, BackgroundEvent, Dispatcher, PushListener, PushStatus};
use crate::config::TuiPreferences;
use crate::matrix::{Activation, Completion, LoadReason, LoadState, MatrixView};
use crate::model::ResourceType;
use std::sync::Arc;
use std::time::Duration;

/// How long informational status messages stay on screen.
const STATUS_TIMEOUT: Duration = Duration::from_secs(5);

/// Main application state
pub struct App {
    pub(crate) view: MatrixView,
    dispatcher: Dispatcher,
    push: Option<PushListener>,
    /// Resource type of the most recent load request
    requested_type: ResourceType,
    pub(crate) theme: Theme,
    pub(crate) status: StatusMessage,
    pub(crate) search: SearchBar,
    pub(crate) overlays: OverlayState,
    pub(crate) namespace_picker: NamespacePicker,
    pub(crate) details: Option<DetailsPanel>,
    pub(crate) push_status: Option<PushStatus>,
    /// Grid placement from the last frame, for mouse hit-testing
    pub(crate) grid: Option<GridGeometry>,
    pub(crate) mouse_enabled: bool,
    /// Save theme changes to the preferences file
    persist_theme: bool,
    pub should_quit: bool,
    pub tick: u64,
}

impl App {
    pub fn new(view: MatrixView, source: Arc<dyn AnalysisSource>, theme: Theme) -> Self {
        Self {
            requested_type: view.resource_type(),
            view,
            dispatcher: Dispatcher::new(source),
            push: None,
            theme,
            status: StatusMessage::with_auto_clear(STATUS_TIMEOUT),
            search: SearchBar::new(),
            overlays: OverlayState::new(),
            namespace_picker: NamespacePicker::new(),
            details: None,
            push_status: None,
            grid: None,
            mouse_enabled: true,
            persist_theme: true,
            should_quit: false,
            tick: 0,
        }
    }

    /// Listen for server updates once the app starts.
    #[must_use]
    pub fn with_push(mut self, listener: PushListener) -> Self {
        self.push = Some(listener);
        self
    }

    #[must_use]
    pub const fn with_mouse(mut self, enabled: bool) -> Self {
        self.mouse_enabled = enabled;
        self
    }

    /// Keep theme changes for this session only.
    #[must_use]
    pub const fn without_saved_preferences(mut self) -> Self {
        self.persist_theme = false;
        self
    }

    pub fn source_name(&self) -> &'static str {
        self.dispatcher.source_name()
    }

    /// Kick off the first catalog load, the namespace list and the push
    /// listener.
    pub fn start(&mut self) {
        let ticket = self.view.begin_load(self.requested_type, LoadReason::Initial);
        self.dispatcher.load_catalog(ticket);
        self.dispatcher.namespaces();
        if let Some(push) = self.push.as_mut() {
            if push.attach(self.dispatcher.sender()) {
                tracing::info!(url = %push.url(), "push listener attached");
            }
        }
    }

    pub fn shutdown(&mut self) {
        if let Some(push) = self.push.take() {
            push.shutdown();
        }
    }

    // ------------------------------------------------------------------
    // Background work
    // ------------------------------------------------------------------

    /// Apply worker results and advance the catalog build by one chunk.
    pub fn on_tick(&mut self) {
        self.tick = self.tick.wrapping_add(1);
        for event in self.dispatcher.drain() {
            self.handle_background(event);
        }
        self.view.tick();
        self.status.expire();
    }

    pub(crate) fn handle_background(&mut self, event: BackgroundEvent) {
        match event {
            BackgroundEvent::CatalogLoaded { ticket, outcome } => match outcome {
                Ok(payload) => {
                    self.view.load_succeeded(ticket, payload);
                }
                Err(kind) => {
                    if self.view.load_failed(ticket, &kind) {
                        self.requested_type = self.view.resource_type();
                        self.status.error(format!("Loading stopped: {kind}"));
                    }
                }
            },
            BackgroundEvent::PairAnalyzed { ticket, outcome } => {
                let failed = outcome.is_err();
                let completion = self.view.complete(ticket, outcome);
                if failed && completion == Completion::Applied {
                    self.status.warn("Analysis failed; press Enter to retry");
                }
            }
            BackgroundEvent::Namespaces(outcome) => match outcome {
                Ok(namespaces) => {
                    tracing::debug!(count = namespaces.len(), "namespaces loaded");
                    self.view.set_namespace_options(namespaces);
                    self.namespace_picker
                        .sync(self.view.namespace_choices().len());
                }
                Err(kind) => {
                    tracing::warn!("failed to load namespaces: {kind}");
                    self.status.warn(format!("Namespaces unavailable: {kind}"));
                }
            },
            BackgroundEvent::ResourceDetails { id, outcome } => {
                let applied = self
                    .details
                    .as_mut()
                    .is_some_and(|panel| panel.resource_loaded(&id, outcome));
                if !applied {
                    tracing::debug!(%id, "resource details arrived after the overlay moved on");
                }
            }
            BackgroundEvent::PolicyDetails { name, outcome } => {
                let applied = self
                    .details
                    .as_mut()
                    .is_some_and(|panel| panel.policy_loaded(&name, outcome));
                if !applied {
                    tracing::debug!(%name, "policy details arrived after the overlay moved on");
                }
            }
            BackgroundEvent::Update(update) => {
                // a pending type switch must not be cancelled by the old type's update
                if update.resource_type != self.requested_type {
                    tracing::debug!(resource_type = %update.resource_type, "update for a type being left ignored");
                    return;
                }
                if let Some(ticket) = self.view.push_update(update) {
                    self.status
                        .set(format!("{} graph updated by server", ticket.resource_type));
                }
            }
            BackgroundEvent::Push(status) => {
                if status == PushStatus::Connected {
                    tracing::debug!("push channel connected");
                }
                self.push_status = Some(status);
            }
        }
    }

    // ------------------------------------------------------------------
    // Catalog actions
    // ------------------------------------------------------------------

    pub fn reload(&mut self) {
        let ticket = self.view.begin_load(self.requested_type, LoadReason::Reload);
        self.dispatcher.load_catalog(ticket);
        self.dispatcher.namespaces();
        self.status.set(format!("Reloading {}s", ticket.resource_type));
    }

    /// Switch between deployments and pods.
    pub fn toggle_resource_type(&mut self) {
        self.requested_type = self.requested_type.toggled();
        let ticket = self
            .view
            .begin_load(self.requested_type, LoadReason::TypeSwitch);
        self.dispatcher.load_catalog(ticket);
        self.close_details();
        self.status.set(format!("Loading {}s", ticket.resource_type));
    }

    pub const fn requested_type(&self) -> ResourceType {
        self.requested_type
    }

    // ------------------------------------------------------------------
    // Cells
    // ------------------------------------------------------------------

    pub fn activate_selected(&mut self) {
        match self.view.activate_selected() {
            Activation::Fetch(ticket) => self.dispatcher.analyze(ticket),
            Activation::Cached => tracing::debug!("cell answered from cache"),
            Activation::Ignored => {}
        }
    }

    /// Move the cursor to a cell and activate it (mouse click).
    pub fn activate_at(&mut self, row: usize, col: usize) {
        self.view.select_cell(row, col);
        self.activate_selected();
    }

    // ------------------------------------------------------------------
    // Search
    // ------------------------------------------------------------------

    pub fn start_search(&mut self) {
        self.search.start();
    }

    pub fn search_push(&mut self, c: char) {
        self.search.push_char(c);
        self.view.set_search(self.search.query.clone());
    }

    pub fn search_pop(&mut self) {
        self.search.pop_char();
        self.view.set_search(self.search.query.clone());
    }

    pub fn search_clear(&mut self) {
        self.search.clear_line();
        self.view.set_search(String::new());
    }

    pub fn commit_search(&mut self) {
        self.search.commit();
    }

    pub fn cancel_search(&mut self) {
        self.search.cancel();
        self.view.set_search(self.search.query.clone());
    }

    // ------------------------------------------------------------------
    // Filters
    // ------------------------------------------------------------------

    pub fn toggle_system_resources(&mut self) {
        self.view.toggle_system_resources();
        let state = if self.view.filters().show_system_resources {
            "shown"
        } else {
            "hidden"
        };
        self.status.set(format!("System resources {state}"));
    }

    pub fn open_namespace_picker(&mut self) {
        self.namespace_picker
            .sync(self.view.namespace_choices().len());
        self.overlays.show(OverlayKind::Namespaces);
    }

    /// Flip the namespace under the picker cursor.
    pub fn toggle_picked_namespace(&mut self) {
        let choices = self.view.namespace_choices();
        if let Some(namespace) = self.namespace_picker.current(&choices) {
            self.view.toggle_namespace(namespace);
        }
        self.namespace_picker.sync(choices.len());
    }

    pub fn select_all_namespaces(&mut self) {
        self.view.select_all_namespaces();
    }

    // ------------------------------------------------------------------
    // Details overlay
    // ------------------------------------------------------------------

    /// Show details of the selected row's resource.
    pub fn open_resource_details(&mut self) {
        let Some(resource) = self.view.selected_resource() else {
            return;
        };
        let resource_type = self.view.resource_type();
        let id = resource.id.clone();
        self.details = Some(DetailsPanel::resource(resource_type, id.clone()));
        self.dispatcher.resource_details(resource_type, id);
        self.overlays.show(OverlayKind::Details);
    }

    /// Show the policies named by the selected cell's analysis.
    pub fn open_policy_details(&mut self) {
        let Some(key) = self.view.selected_pair() else {
            return;
        };
        let Some(result) = self.view.cache().peek(&key) else {
            self.status.warn("Analyze the cell first (Enter)");
            return;
        };
        let mut names: Vec<String> = Vec::new();
        for policy in &result.policies {
            if !names.contains(&policy.name) {
                names.push(policy.name.clone());
            }
        }
        match DetailsPanel::policies(names) {
            Some(panel) => {
                if let DetailsSubject::Policy { name } = panel.subject() {
                    self.dispatcher.policy_details(name.clone());
                }
                self.details = Some(panel);
                self.overlays.show(OverlayKind::Details);
            }
            None => self.status.set("No policies apply to this pair"),
        }
    }

    /// Cycle to the next policy in the details overlay.
    pub fn next_policy(&mut self) {
        if let Some(name) = self.details.as_mut().and_then(DetailsPanel::next_policy) {
            self.dispatcher.policy_details(name);
        }
    }

    fn close_details(&mut self) {
        if self.overlays.is_showing(OverlayKind::Details) {
            self.overlays.close();
        }
        self.details = None;
    }

    pub fn close_overlay(&mut self) {
        if self.overlays.is_showing(OverlayKind::Details) {
            self.details = None;
        }
        self.overlays.close();
    }

    // ------------------------------------------------------------------
    // Misc
    // ------------------------------------------------------------------

    pub fn toggle_help(&mut self) {
        self.overlays.toggle(OverlayKind::Help);
    }

    pub fn toggle_theme(&mut self) {
        self.theme = self.theme.next();
        if self.persist_theme {
            let prefs = TuiPreferences {
                theme: self.theme.name.to_string(),
            };
            if let Err(e) = prefs.save() {
                tracing::warn!("failed to save preferences: {e}");
            }
        }
        self.status.set(format!("Theme: {}", self.theme.name));
    }

    /// Header text for the load state.
    pub fn load_label(&self) -> String {
        match self.view.load_state() {
            LoadState::Idle => "idle".to_string(),
            LoadState::Loading(rt) => format!("loading {rt}s..."),
            LoadState::Building { processed, total } => format!("building {processed}/{total}"),
            LoadState::Ready => "ready".to_string(),
            LoadState::Stopped(message) => message.clone(),
        }
    }
}

impl Drop for App {
    fn drop(&mut self) {
        self.shutdown();
    }
}
