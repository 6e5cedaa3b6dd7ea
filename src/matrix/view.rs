//! The matrix view: catalog, filters, scroller, cells, cache and detail
//! pane composed into one state owner.
//!
//! All mutation happens on the UI thread through `&mut self`. Network
//! work is requested by returning tickets ([`LoadTicket`],
//! [`FetchTicket`]); the caller runs them elsewhere and feeds the outcome
//! back through [`MatrixView::load_succeeded`], [`MatrixView::load_failed`]
//! and [`MatrixView::complete`].

use super::cache::{CacheStats, PairCache};
use super::cell::{CellAction, CellState};
use super::chunked::{BuildStep, CatalogBuild};
use super::detail::{self, DetailPane};
use super::filter::{compute_visible, FilterState, SystemPrefixes, VisibleList};
use super::scroller::{compute_window, Reconciliation, RenderWindow, VirtualScroller};
use crate::client::PushUpdate;
use crate::error::ClientErrorKind;
use crate::model::wire::GraphPayload;
use crate::model::{AnalysisResult, PairKey, Resource, ResourceCatalog, ResourceType, Verdict};
use std::collections::{HashMap, HashSet};

/// Tunables for a [`MatrixView`].
#[derive(Debug, Clone)]
pub struct MatrixSettings {
    /// Terminal lines per matrix row
    pub row_height: usize,
    /// Graph nodes converted per tick while building a catalog
    pub chunk_size: usize,
    pub system_prefixes: SystemPrefixes,
    /// Initial value of the system-resource toggle
    pub show_system_resources: bool,
    /// Drop a context's cached pairs when it is reloaded or pushed
    pub clear_cache_on_update: bool,
}

impl Default for MatrixSettings {
    fn default() -> Self {
        Self {
            row_height: 1,
            chunk_size: 10,
            system_prefixes: SystemPrefixes::default(),
            show_system_resources: false,
            clear_cache_on_update: true,
        }
    }
}

/// Why a catalog is being (re)loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadReason {
    Initial,
    Reload,
    TypeSwitch,
    PushUpdate,
}

impl LoadReason {
    /// Whether installing the result scrolls back to the top.
    fn resets_scroll(self) -> bool {
        !matches!(self, Self::PushUpdate)
    }

    /// Whether the context being replaced may have stale cached pairs.
    fn refreshes_context(self) -> bool {
        matches!(self, Self::Reload | Self::PushUpdate)
    }
}

/// A catalog load request. Only the most recent `seq` is honoured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    pub resource_type: ResourceType,
    pub seq: u64,
    pub reason: LoadReason,
}

/// A pair analysis request issued against one installed catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    pub key: PairKey,
    pub generation: u64,
}

/// Catalog lifecycle as shown in the header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    Idle,
    Loading(ResourceType),
    Building { processed: usize, total: usize },
    Ready,
    /// Loading stopped; the previous catalog is still shown.
    Stopped(String),
}

impl LoadState {
    pub fn is_busy(&self) -> bool {
        matches!(self, Self::Loading(_) | Self::Building { .. })
    }
}

/// Result of activating a cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Activation {
    /// The cell is now pending; run this request.
    Fetch(FetchTicket),
    /// Answered from the cache.
    Cached,
    /// Self-pair, pending cell or out of range.
    Ignored,
}

/// What a completion did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// A mounted cell changed.
    Applied,
    /// No mounted cell was waiting; only the cache (and possibly the
    /// detail pane) changed.
    Detached,
    /// Issued under an older catalog generation.
    Stale,
}

/// Counts for the header line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatrixSummary {
    pub total: usize,
    pub visible: usize,
    pub mounted: usize,
    pub edges: usize,
    pub generation: u64,
    pub cache: CacheStats,
}

/// Composes catalog, filters, virtual scroller, cell states, cache and
/// detail pane. Rows are sources, columns are targets.
#[derive(Debug)]
pub struct MatrixView {
    settings: MatrixSettings,
    resource_type: ResourceType,
    catalog: ResourceCatalog,
    edge_count: usize,
    /// Bumped each time a catalog is installed.
    generation: u64,
    load_seq: u64,
    load_state: LoadState,
    build: Option<(LoadTicket, CatalogBuild)>,
    filters: FilterState,
    visible: VisibleList,
    scroller: VirtualScroller,
    mounted_ids: HashSet<String>,
    viewport_cols: usize,
    col_offset: usize,
    selected_row: usize,
    selected_col: usize,
    cells: HashMap<PairKey, CellState>,
    cache: PairCache,
    detail: DetailPane,
    last_activated: Option<PairKey>,
    namespace_options: Vec<String>,
}

impl MatrixView {
    pub fn new(resource_type: ResourceType, settings: MatrixSettings) -> Self {
        let filters = FilterState {
            show_system_resources: settings.show_system_resources,
            ..FilterState::default()
        };
        Self {
            scroller: VirtualScroller::new(settings.row_height),
            settings,
            resource_type,
            catalog: ResourceCatalog::empty(resource_type),
            edge_count: 0,
            generation: 0,
            load_seq: 0,
            load_state: LoadState::Idle,
            build: None,
            filters,
            visible: VisibleList::default(),
            mounted_ids: HashSet::new(),
            viewport_cols: 0,
            col_offset: 0,
            selected_row: 0,
            selected_col: 0,
            cells: HashMap::new(),
            cache: PairCache::new(),
            detail: DetailPane::default(),
            last_activated: None,
            namespace_options: Vec::new(),
        }
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn settings(&self) -> &MatrixSettings {
        &self.settings
    }

    pub fn resource_type(&self) -> ResourceType {
        self.resource_type
    }

    pub fn catalog(&self) -> &ResourceCatalog {
        &self.catalog
    }

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    pub fn visible(&self) -> &VisibleList {
        &self.visible
    }

    pub fn scroller(&self) -> &VirtualScroller {
        &self.scroller
    }

    pub fn cache(&self) -> &PairCache {
        &self.cache
    }

    pub fn detail(&self) -> &DetailPane {
        &self.detail
    }

    pub fn load_state(&self) -> &LoadState {
        &self.load_state
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn selection(&self) -> (usize, usize) {
        (self.selected_row, self.selected_col)
    }

    pub fn summary(&self) -> MatrixSummary {
        MatrixSummary {
            total: self.catalog.len(),
            visible: self.visible.len(),
            mounted: self.scroller.mounted().len(),
            edges: self.edge_count,
            generation: self.generation,
            cache: self.cache.stats(),
        }
    }

    // ------------------------------------------------------------------
    // Catalog lifecycle
    // ------------------------------------------------------------------

    /// Start a load. The current catalog stays until the new one is built.
    pub fn begin_load(&mut self, resource_type: ResourceType, reason: LoadReason) -> LoadTicket {
        self.load_seq += 1;
        if let Some((_, mut build)) = self.build.take() {
            build.cancel();
            tracing::debug!("cancelled in-progress catalog build");
        }
        self.load_state = LoadState::Loading(resource_type);
        tracing::debug!(%resource_type, seq = self.load_seq, ?reason, "catalog load started");
        LoadTicket {
            resource_type,
            seq: self.load_seq,
            reason,
        }
    }

    fn is_current(&self, ticket: &LoadTicket) -> bool {
        ticket.seq == self.load_seq
    }

    /// Abort a load. The previous catalog is kept.
    pub fn load_failed(&mut self, ticket: LoadTicket, error: &ClientErrorKind) -> bool {
        if !self.is_current(&ticket) {
            tracing::debug!(seq = ticket.seq, "ignoring failure of superseded load");
            return false;
        }
        tracing::warn!(resource_type = %ticket.resource_type, "catalog load failed: {error}");
        self.build = None;
        self.load_state = LoadState::Stopped(format!("loading stopped: {error}"));
        true
    }

    /// Start building the catalog from a fetched payload.
    pub fn load_succeeded(&mut self, ticket: LoadTicket, payload: GraphPayload) -> bool {
        if !self.is_current(&ticket) {
            tracing::debug!(seq = ticket.seq, "ignoring superseded catalog payload");
            return false;
        }
        let build = CatalogBuild::new(ticket.resource_type, payload, self.settings.chunk_size);
        let (processed, total) = build.progress();
        self.load_state = LoadState::Building { processed, total };
        self.build = Some((ticket, build));
        true
    }

    /// Apply a push update. Updates for other resource types are ignored.
    pub fn push_update(&mut self, update: PushUpdate) -> Option<LoadTicket> {
        if update.resource_type != self.resource_type {
            tracing::debug!(
                resource_type = %update.resource_type,
                "push update for inactive resource type ignored"
            );
            return None;
        }
        let ticket = self.begin_load(update.resource_type, LoadReason::PushUpdate);
        self.load_succeeded(ticket, update.payload);
        Some(ticket)
    }

    /// Advance the catalog build by one chunk. Returns true if work was done.
    pub fn tick(&mut self) -> bool {
        let Some((ticket, build)) = self.build.as_mut() else {
            return false;
        };
        let ticket = *ticket;
        match build.step() {
            BuildStep::Running { processed, total } => {
                self.load_state = LoadState::Building { processed, total };
            }
            BuildStep::Done(catalog) => {
                let edges = build.edge_count();
                self.build = None;
                self.install_catalog(ticket, catalog, edges);
            }
            BuildStep::Cancelled => {
                self.build = None;
            }
        }
        true
    }

    /// Run the pending build to completion in one go.
    pub fn finish_build(&mut self) {
        while self.tick() {}
    }

    fn install_catalog(&mut self, ticket: LoadTicket, catalog: ResourceCatalog, edges: usize) {
        self.generation += 1;
        let type_changed = catalog.resource_type() != self.resource_type;
        let mut invalidated = 0;
        if self.settings.clear_cache_on_update && ticket.reason.refreshes_context() {
            invalidated = self.cache.invalidate_context(catalog.resource_type());
        }

        tracing::info!(
            resource_type = %catalog.resource_type(),
            generation = self.generation,
            resources = catalog.len(),
            namespaces = catalog.namespaces().count(),
            edges,
            invalidated,
            "catalog loaded"
        );

        self.resource_type = catalog.resource_type();
        self.catalog = catalog;
        self.edge_count = edges;
        if self.filters.clamp_to(&self.catalog) {
            tracing::debug!("namespace selection clamped to new catalog");
        }

        self.cells.clear();
        if type_changed || invalidated > 0 {
            self.detail.clear();
            self.last_activated = None;
        }

        self.visible = compute_visible(&self.catalog, &self.filters, &self.settings.system_prefixes);
        if ticket.reason.resets_scroll() {
            self.selected_row = 0;
            self.selected_col = 0;
            self.col_offset = 0;
            self.scroller.reset(self.visible.len());
            self.sync_mounted_ids();
        } else {
            self.clamp_selection();
            self.sync_window();
        }
        self.load_state = LoadState::Ready;
    }

    // ------------------------------------------------------------------
    // Filters
    // ------------------------------------------------------------------

    /// Namespaces from `/namespaces`; offered in the picker when present
    /// in the catalog.
    pub fn set_namespace_options(&mut self, namespaces: Vec<String>) {
        self.namespace_options = namespaces;
    }

    /// Selectable namespaces: server order first, then any catalog-only ones.
    pub fn namespace_choices(&self) -> Vec<String> {
        let mut choices: Vec<String> = self
            .namespace_options
            .iter()
            .filter(|ns| self.catalog.has_namespace(ns))
            .cloned()
            .collect();
        for ns in self.catalog.namespaces() {
            if !choices.iter().any(|c| c == ns) {
                choices.push(ns.to_string());
            }
        }
        choices
    }

    /// Empty selection means every namespace is shown.
    pub fn is_namespace_selected(&self, namespace: &str) -> bool {
        self.filters.selected_namespaces.is_empty()
            || self.filters.selected_namespaces.contains(namespace)
    }

    /// Flip one namespace in the picker.
    pub fn toggle_namespace(&mut self, namespace: &str) {
        let choices = self.namespace_choices();
        if self.filters.selected_namespaces.is_empty() {
            self.filters.selected_namespaces = choices.iter().cloned().collect();
        }
        if !self.filters.toggle_namespace(&self.catalog, namespace) {
            tracing::debug!(namespace, "namespace not in catalog; ignored");
        }
        if self.filters.selected_namespaces.len() == choices.len() {
            self.filters.selected_namespaces.clear();
        }
        self.refilter();
    }

    pub fn select_all_namespaces(&mut self) {
        self.filters.selected_namespaces.clear();
        self.refilter();
    }

    pub fn set_search(&mut self, text: impl Into<String>) {
        let text = text.into();
        if text != self.filters.search_text {
            self.filters.search_text = text;
            self.refilter();
        }
    }

    pub fn toggle_system_resources(&mut self) {
        self.filters.show_system_resources = !self.filters.show_system_resources;
        self.refilter();
    }

    /// Recompute the visible list and reconcile in the same step.
    fn refilter(&mut self) -> Reconciliation {
        self.visible = compute_visible(&self.catalog, &self.filters, &self.settings.system_prefixes);
        self.clamp_selection();
        self.sync_window()
    }

    // ------------------------------------------------------------------
    // Viewport and navigation
    // ------------------------------------------------------------------

    /// Resize: lines available for rows and columns available for cells.
    pub fn set_viewport(&mut self, height: usize, cols: usize) {
        self.viewport_cols = cols;
        self.scroller.set_viewport_height(height, self.visible.len());
        self.ensure_col_visible();
        self.sync_window();
    }

    pub fn viewport_cols(&self) -> usize {
        self.viewport_cols
    }

    fn sync_mounted_ids(&mut self) {
        let ids: HashSet<String> = self
            .scroller
            .window()
            .range()
            .filter_map(|row| self.visible.resource(&self.catalog, row))
            .map(|r| r.id.clone())
            .collect();
        self.cells.retain(|k, _| ids.contains(&k.source));
        self.mounted_ids = ids;
    }

    /// Reconcile mounted rows; cell markers of unmounted rows are dropped.
    fn sync_window(&mut self) -> Reconciliation {
        let diff = self.scroller.reconcile(self.visible.len());
        self.sync_mounted_ids();
        diff
    }

    fn clamp_selection(&mut self) {
        let len = self.visible.len();
        self.selected_row = self.selected_row.min(len.saturating_sub(1));
        self.selected_col = self.selected_col.min(len.saturating_sub(1));
        self.clamp_col_offset();
    }

    fn clamp_col_offset(&mut self) {
        let max = self.visible.len().saturating_sub(self.viewport_cols.max(1));
        self.col_offset = self.col_offset.min(max);
    }

    fn ensure_col_visible(&mut self) {
        let cols = self.viewport_cols.max(1);
        if self.selected_col < self.col_offset {
            self.col_offset = self.selected_col;
        } else if self.selected_col >= self.col_offset + cols {
            self.col_offset = self.selected_col + 1 - cols;
        }
        self.clamp_col_offset();
    }

    fn after_selection_move(&mut self) {
        self.scroller
            .ensure_visible(self.selected_row, self.visible.len());
        self.ensure_col_visible();
        self.sync_window();
        self.refresh_detail_for_selection();
    }

    /// Move the cursor by rows and columns.
    pub fn move_selection(&mut self, rows: isize, cols: isize) {
        let len = self.visible.len();
        if len == 0 {
            return;
        }
        let last = len - 1;
        self.selected_row = offset_index(self.selected_row, rows, last);
        self.selected_col = offset_index(self.selected_col, cols, last);
        self.after_selection_move();
    }

    pub fn page_down(&mut self) {
        let page = self.scroller.rows_per_page() as isize;
        self.move_selection(page, 0);
    }

    pub fn page_up(&mut self) {
        let page = self.scroller.rows_per_page() as isize;
        self.move_selection(-page, 0);
    }

    pub fn go_first(&mut self) {
        self.select_cell(0, self.selected_col);
    }

    pub fn go_last(&mut self) {
        self.select_cell(self.visible.len().saturating_sub(1), self.selected_col);
    }

    /// Put the cursor on a specific cell (mouse click).
    pub fn select_cell(&mut self, row: usize, col: usize) {
        if self.visible.is_empty() {
            return;
        }
        let last = self.visible.len() - 1;
        self.selected_row = row.min(last);
        self.selected_col = col.min(last);
        self.after_selection_move();
    }

    /// Scroll without moving the cursor (mouse wheel).
    pub fn scroll_rows(&mut self, rows: isize) {
        self.scroller.scroll_rows(rows, self.visible.len());
        self.sync_window();
    }

    fn refresh_detail_for_selection(&mut self) {
        let Some(key) = self.selected_pair() else {
            return;
        };
        match self.cell_state_for(&key) {
            CellState::Resolved(_) => {
                if let Some(result) = self.cache.peek(&key) {
                    self.detail
                        .show(detail::render(&self.catalog, &key, Ok(result)));
                }
            }
            CellState::Error(kind) => {
                self.detail
                    .show(detail::render(&self.catalog, &key, Err(&kind)));
            }
            _ => {}
        }
    }

    // ------------------------------------------------------------------
    // Cells
    // ------------------------------------------------------------------

    /// Pair under a visible row and column.
    pub fn pair_at(&self, row: usize, col: usize) -> Option<PairKey> {
        let source = self.visible.resource(&self.catalog, row)?;
        let target = self.visible.resource(&self.catalog, col)?;
        Some(PairKey::new(
            source.id.clone(),
            target.id.clone(),
            self.resource_type,
        ))
    }

    pub fn selected_pair(&self) -> Option<PairKey> {
        self.pair_at(self.selected_row, self.selected_col)
    }

    /// Resource of the selected row.
    pub fn selected_resource(&self) -> Option<&Resource> {
        self.visible.resource(&self.catalog, self.selected_row)
    }

    pub fn cell_state_for(&self, key: &PairKey) -> CellState {
        if key.is_self_pair() {
            return CellState::NotApplicable;
        }
        if let Some(state) = self.cells.get(key) {
            return state.clone();
        }
        match self.cache.peek(key) {
            Some(result) => CellState::Resolved(result.verdict()),
            None => CellState::Unknown,
        }
    }

    pub fn cell_state(&self, row: usize, col: usize) -> CellState {
        self.pair_at(row, col)
            .map(|key| self.cell_state_for(&key))
            .unwrap_or_default()
    }

    /// Activate the cell under the cursor.
    pub fn activate_selected(&mut self) -> Activation {
        self.scroller
            .ensure_visible(self.selected_row, self.visible.len());
        self.sync_window();
        self.activate(self.selected_row, self.selected_col)
    }

    /// Activate a cell: cache hit shows it, a miss starts a fetch.
    pub fn activate(&mut self, row: usize, col: usize) -> Activation {
        let Some(key) = self.pair_at(row, col) else {
            return Activation::Ignored;
        };
        if key.is_self_pair() {
            return Activation::Ignored;
        }
        let mut state = self.cells.get(&key).cloned().unwrap_or_default();
        if state.is_pending() {
            tracing::debug!(pair = %key, "activation ignored while pending");
            return Activation::Ignored;
        }

        if let Some(result) = self.cache.get(&key) {
            let verdict = result.verdict();
            self.detail
                .show(detail::render(&self.catalog, &key, Ok(result)));
            self.cells
                .insert(key.clone(), CellState::Resolved(verdict));
            self.last_activated = Some(key);
            return Activation::Cached;
        }

        if matches!(state, CellState::Resolved(_)) {
            state = CellState::Unknown;
        }
        match state.activate() {
            CellAction::Fetch => {
                self.cells.insert(key.clone(), state);
                self.last_activated = Some(key.clone());
                tracing::debug!(pair = %key, "analysis requested");
                Activation::Fetch(FetchTicket {
                    key,
                    generation: self.generation,
                })
            }
            CellAction::Show | CellAction::Ignore => Activation::Ignored,
        }
    }

    /// Feed back the outcome of a [`FetchTicket`].
    pub fn complete(
        &mut self,
        ticket: FetchTicket,
        outcome: Result<AnalysisResult, ClientErrorKind>,
    ) -> Completion {
        let FetchTicket { key, generation } = ticket;

        if generation != self.generation {
            if let Ok(result) = &outcome {
                if !self.settings.clear_cache_on_update {
                    self.cache.put(key.clone(), result.clone());
                }
            }
            if self.cells.get(&key).is_some_and(CellState::is_pending) {
                self.cells.remove(&key);
            }
            tracing::debug!(pair = %key, generation, "stale analysis result dropped");
            return Completion::Stale;
        }

        let is_latest = self.last_activated.as_ref() == Some(&key);
        let mounted = self.mounted_ids.contains(&key.source);
        let applied = match outcome {
            Ok(result) => {
                self.cache.put(key.clone(), result.clone());
                if is_latest {
                    self.detail
                        .show(detail::render(&self.catalog, &key, Ok(&result)));
                }
                mounted
                    && self
                        .cells
                        .get_mut(&key)
                        .is_some_and(|cell| cell.resolve(&result))
            }
            Err(kind) => {
                tracing::warn!(pair = %key, "analysis failed: {kind}");
                if is_latest {
                    self.detail
                        .show(detail::render(&self.catalog, &key, Err(&kind)));
                }
                mounted
                    && self
                        .cells
                        .get_mut(&key)
                        .is_some_and(|cell| cell.fail(kind))
            }
        };

        if applied {
            Completion::Applied
        } else {
            tracing::debug!(pair = %key, "result arrived for an unmounted cell");
            Completion::Detached
        }
    }

    // ------------------------------------------------------------------
    // Rendering helpers
    // ------------------------------------------------------------------

    /// Mounted rows with their visible index.
    pub fn window_rows(&self) -> impl Iterator<Item = (usize, &Resource)> + '_ {
        self.scroller
            .window()
            .range()
            .filter_map(move |row| self.visible.resource(&self.catalog, row).map(|r| (row, r)))
    }

    /// Columns to draw, stateless per frame.
    pub fn column_window(&self) -> RenderWindow {
        compute_window(self.visible.len(), self.col_offset, self.viewport_cols, 1)
    }

    /// Visible-list index of a rendered column.
    pub fn column_resource(&self, col: usize) -> Option<&Resource> {
        self.visible.resource(&self.catalog, col)
    }

    /// `Ports: 80, 443` for an allowed, port-restricted selected cell.
    pub fn tooltip(&self) -> Option<String> {
        let key = self.selected_pair()?;
        let result = self.cache.peek(&key)?;
        if result.verdict() != Verdict::Allowed {
            return None;
        }
        result.port_summary().map(|ports| format!("Ports: {ports}"))
    }
}

fn offset_index(current: usize, delta: isize, last: usize) -> usize {
    if delta < 0 {
        current.saturating_sub(delta.unsigned_abs())
    } else {
        current.saturating_add(delta.unsigned_abs()).min(last)
    }
}
