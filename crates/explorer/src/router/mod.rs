//! Two-way sync between the URL and the view.
//!
//! Inbound: the URL state captured at construction (or on history
//! navigation) waits in `pending` until every gate it needs is open, then is
//! applied once under an [`ApplyFlag`] guard so nothing it changes is written
//! back. Outbound: each user action drains the view's change queue into
//! read-modify-write URL updates; camera moves go through a debouncer.

pub mod gates;
pub mod history;

use catalog::{GroupKey, ItemStore};
use foundation::Millis;
use runtime::{Debouncer, Metrics};
use search::SearchIndex;

use crate::collaborators::{MapCamera, UrlHistory};
use crate::config::ExplorerConfig;
use crate::guard::ApplyFlag;
use crate::view::{ViewChange, ViewController};
use crate::view_state::{Camera, CameraSignature, Tab, ViewState, canonical_query};

pub use gates::{Gate, GateSet};
pub use history::{HistoryMode, MemoryHistory};

pub struct Router {
    config: ExplorerConfig,
    view: ViewController,
    history: Box<dyn UrlHistory>,
    map: Option<Box<dyn MapCamera>>,
    gates: GateSet,
    pending: Option<ViewState>,
    applying: ApplyFlag,
    camera: Debouncer<Camera>,
    last_camera: Option<CameraSignature>,
    metrics: Metrics,
}

impl Router {
    /// Captures the current URL as the pending state.
    pub fn new(config: ExplorerConfig, view: ViewController, history: Box<dyn UrlHistory>) -> Self {
        let pending = ViewState::from_query(&history.query());
        tracing::debug!(?pending, "captured url state");
        Self {
            camera: Debouncer::new(config.camera_debounce_ms),
            applying: view.apply_flag().clone(),
            config,
            view,
            history,
            map: None,
            gates: GateSet::NONE,
            pending: Some(pending),
            last_camera: None,
            metrics: Metrics::new(),
        }
    }

    pub fn view(&self) -> &ViewController {
        &self.view
    }

    pub fn config(&self) -> &ExplorerConfig {
        &self.config
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    pub fn gates(&self) -> GateSet {
        self.gates
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn is_applying(&self) -> bool {
        self.applying.is_set()
    }

    /// The state the URL currently describes.
    pub fn url_state(&self) -> ViewState {
        ViewState::from_query(&self.history.query())
    }

    pub fn url_query(&self) -> String {
        self.history.query()
    }

    // Readiness.

    pub fn set_ui_ready(&mut self) {
        self.open_gate(Gate::Ui);
    }

    pub fn set_data(&mut self, store: ItemStore) {
        self.view.set_store(store);
        self.open_gate(Gate::Data);
    }

    pub fn set_search_index(&mut self, index: SearchIndex) {
        self.view.set_index(index);
        self.open_gate(Gate::Search);
    }

    /// Hands over the store and builds its search index.
    pub fn load(&mut self, store: ItemStore) {
        let index = SearchIndex::build(&store, self.config.fuzzy_threshold);
        self.set_data(store);
        self.set_search_index(index);
    }

    /// Without a camera waiting in the URL, the map starts at the configured
    /// default view. That view is not written back to the URL.
    pub fn set_map(&mut self, mut map: Box<dyn MapCamera>) {
        let url_camera = self.pending.as_ref().is_some_and(|st| st.camera.is_some());
        if !url_camera {
            let camera = self.config.default_camera;
            map.set_view(camera.center(), camera.zoom);
            self.last_camera = Some(camera.signature());
        }
        self.map = Some(map);
        self.open_gate(Gate::Map);
    }

    fn open_gate(&mut self, gate: Gate) {
        if self.gates.open(gate) {
            tracing::debug!(?gate, open = ?self.gates, "gate opened");
        }
        self.reconcile();
    }

    /// Browser back/forward: re-read the URL and apply it once ready.
    pub fn on_history_navigation(&mut self) {
        self.pending = Some(self.url_state());
        self.reconcile();
    }

    /// Applies the pending state if every gate it needs is open.
    fn reconcile(&mut self) {
        let Some(state) = &self.pending else {
            return;
        };
        let missing = self.gates.missing(GateSet::required_for(state));
        if !missing.is_empty() {
            tracing::trace!(?missing, "pending url state waits");
            return;
        }
        if let Some(state) = self.pending.take() {
            self.apply(state);
        }
    }

    fn apply(&mut self, state: ViewState) {
        let _guard = self.applying.acquire();
        tracing::debug!(query = %state.to_query(), "applying url state");

        if let (Some(camera), Some(map)) = (state.camera, self.map.as_mut()) {
            map.set_view(camera.center(), camera.zoom);
            self.last_camera = Some(camera.signature());
            self.camera.cancel();
        }

        self.view.set_active_tab(state.tab);

        let known_filter = state
            .filter
            .as_ref()
            .filter(|key| self.view.store().groups().contains(key));
        if let (Some(key), None) = (&state.filter, known_filter) {
            tracing::info!(group = %key, "url filter names an unknown group");
            self.metrics.incr("url.stale_filter");
        }

        if let Some(key) = known_filter.cloned() {
            if state.results_open && state.tab == Tab::Places {
                self.view.filter_group_and_list_places(&key);
            } else {
                self.view.apply_group_filter(&key);
            }
        } else if !state.query.is_empty() {
            self.view.run_search(&state.query);
        } else {
            self.view.reset_all();
        }

        self.view.set_results_open(state.results_open);

        match &state.open_item {
            Some(id) => {
                if !self.view.open_detail(id.as_str()) {
                    tracing::info!(item = %id, "url names an unknown item");
                    self.metrics.incr("url.stale_item");
                }
            }
            None => self.view.close_detail(),
        }

        self.view.take_changes();
        self.metrics.incr("url.applied");
    }

    // User actions. Each one updates the view, then the URL.

    pub fn search_input(&mut self, text: &str) {
        self.view.run_search(text);
        self.flush();
    }

    pub fn select_tab(&mut self, tab: Tab) {
        self.view.set_active_tab(tab);
        self.flush();
    }

    pub fn apply_group_filter(&mut self, key: &GroupKey) {
        self.view.apply_group_filter(key);
        self.flush();
    }

    pub fn choose_group(&mut self, key: &GroupKey) {
        self.view.filter_group_and_list_places(key);
        self.flush();
    }

    pub fn reset(&mut self) {
        self.view.reset_all();
        self.flush();
    }

    pub fn open_item(&mut self, id: &str) {
        self.view.open_detail(id);
        self.flush();
    }

    pub fn close_item(&mut self) {
        self.view.close_detail();
        self.flush();
    }

    /// Moves the camera to the item at the focus zoom and opens its detail.
    pub fn focus_item(&mut self, id: &str) {
        let Some(position) = self.view.store().by_id(id).map(|item| item.position) else {
            return;
        };
        if let Some(map) = self.map.as_mut() {
            map.set_view(position, self.config.focus_zoom);
        }
        self.open_item(id);
    }

    pub fn apply_tag(&mut self, key: &GroupKey) {
        self.view.apply_tag(key);
        self.flush();
    }

    pub fn set_results_open(&mut self, open: bool) {
        self.view.set_results_open(open);
        self.flush();
    }

    pub fn browse(&mut self) {
        self.view.browse();
    }

    /// Writes the queued changes in order. An overlay change queued ahead of
    /// a push travels with that push so the entry being left keeps the
    /// overlay state the user saw.
    fn flush(&mut self) {
        let changes = self.view.take_changes();
        let last_push = changes
            .iter()
            .rposition(|c| history_mode(c) == HistoryMode::Push);
        let mut overlay = None;
        for (i, change) in changes.into_iter().enumerate() {
            match change {
                ViewChange::ResultsOverlay(open) if last_push.is_some_and(|p| i < p) => {
                    overlay = Some(open);
                }
                change if history_mode(&change) == HistoryMode::Push => {
                    self.write_change(change, overlay.take());
                }
                change => self.write_change(change, None),
            }
        }
    }

    fn write_change(&mut self, change: ViewChange, overlay: Option<bool>) {
        let mode = history_mode(&change);
        let patch_overlay = move |st: &mut ViewState| {
            if let Some(open) = overlay {
                st.results_open = open;
            }
        };
        match change {
            ViewChange::Search { query, tab } => self.write(HistoryMode::Replace, |st| {
                st.query = query;
                st.tab = tab;
                st.filter = None;
            }),
            ViewChange::QueryCleared => self.write(HistoryMode::Replace, |st| st.query.clear()),
            ViewChange::Filter { key, tab } => self.write(mode, |st| {
                st.query.clear();
                st.filter = Some(key);
                st.open_item = None;
                if let Some(tab) = tab {
                    st.tab = tab;
                }
                patch_overlay(st);
            }),
            ViewChange::Reset => self.write(mode, |st| {
                *st = st.reset_keeping_camera();
                patch_overlay(st);
            }),
            ViewChange::DetailOpened(id) => self.write(mode, |st| {
                st.open_item = Some(id);
                patch_overlay(st);
            }),
            ViewChange::DetailClosed => self.write(HistoryMode::Replace, |st| st.open_item = None),
            ViewChange::ResultsOverlay(open) => {
                self.write(HistoryMode::Replace, |st| st.results_open = open)
            }
        }
    }

    /// Read-modify-write against the live URL. Writes that leave the query
    /// string unchanged are dropped.
    fn write<F>(&mut self, mode: HistoryMode, patch: F)
    where
        F: FnOnce(&mut ViewState),
    {
        if self.applying.is_set() {
            return;
        }
        let current = self.history.query();
        let mut state = ViewState::from_query(&current);
        patch(&mut state);
        let next = state.to_query();
        if next == canonical_query(&current) {
            self.metrics.incr("url.unchanged");
            return;
        }
        match mode {
            HistoryMode::Push => {
                self.history.push(&next);
                self.metrics.incr("url.push");
            }
            HistoryMode::Replace => {
                self.history.replace(&next);
                self.metrics.incr("url.replace");
            }
        }
        tracing::debug!(?mode, query = %next, "url written");
    }

    // Camera.

    /// The map reports that a pan or zoom gesture ended.
    pub fn on_camera_settled(&mut self, now: Millis) {
        if self.applying.is_set() {
            return;
        }
        let Some(map) = self.map.as_ref() else {
            return;
        };
        let camera = Camera::from_center(map.center(), map.zoom());
        if self.camera.schedule(now, camera) {
            self.metrics.incr("camera.restarted");
        }
    }

    /// When `poll_timers` next has work to do.
    pub fn next_deadline(&self) -> Option<Millis> {
        self.camera.deadline()
    }

    pub fn poll_timers(&mut self, now: Millis) {
        let Some(camera) = self.camera.poll(now) else {
            return;
        };
        let camera = camera.rounded();
        let signature = camera.signature();
        if self.last_camera == Some(signature) {
            self.metrics.incr("camera.duplicate");
            return;
        }
        self.last_camera = Some(signature);
        self.write(HistoryMode::Replace, |st| st.camera = Some(camera));
    }
}

fn history_mode(change: &ViewChange) -> HistoryMode {
    match change {
        ViewChange::Filter { .. } | ViewChange::Reset | ViewChange::DetailOpened(_) => {
            HistoryMode::Push
        }
        ViewChange::Search { .. }
        | ViewChange::QueryCleared
        | ViewChange::DetailClosed
        | ViewChange::ResultsOverlay(_) => HistoryMode::Replace,
    }
}

#[cfg(test)]
mod tests;
