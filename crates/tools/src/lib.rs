//! Offline helpers behind the `explore` binary: load datasets from disk,
//! inspect groups, run searches, and resolve view-state URLs.

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use catalog::{GroupKind, ItemStore, ItemType, LoadReport, SheetSource, records_from_json, records_from_sheets};
use explorer::{
    ExplorerConfig, FilterDescriptor, FilterObserver, MarkerLayer, MemoryHistory, ResultsView,
    Router, Tab, ViewController, ViewState,
};
use foundation::{GeoBounds, MarkerHandle};
use search::SearchIndex;

/// Loads `.json` files as the structured dataset and everything else as
/// delimited text. A sheet's fallback type comes from the configured source
/// whose name matches the file stem.
pub fn load_files(paths: &[PathBuf], config: &ExplorerConfig) -> Result<(ItemStore, LoadReport)> {
    if paths.is_empty() {
        bail!("no dataset files given");
    }
    let mut records = Vec::new();
    let mut sheets: Vec<(SheetSource, String)> = Vec::new();
    for path in paths {
        let text = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
        if is_json(path) {
            records.extend(records_from_json(&text).with_context(|| format!("parse {}", path.display()))?);
        } else {
            sheets.push((source_for(path, config), text));
        }
    }
    if !sheets.is_empty() {
        records.extend(records_from_sheets(sheets.iter().map(|(s, t)| (s, t.as_str())))?);
    }
    let (mut store, report) = ItemStore::from_records(records);
    store.bind_markers(|idx, _| MarkerHandle::new(idx.0));
    tracing::info!(files = paths.len(), accepted = report.accepted, rejected = report.rejected, "dataset loaded");
    Ok((store, report))
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"))
}

fn source_for(path: &Path, config: &ExplorerConfig) -> SheetSource {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_string();
    config
        .sources
        .iter()
        .find(|s| s.name == stem)
        .cloned()
        .unwrap_or_else(|| SheetSource::new(stem, path.display().to_string()))
}

pub fn stats_report(store: &ItemStore, report: LoadReport, top: usize) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "places: {} ({} rejected)", report.accepted, report.rejected);
    for ty in ItemType::ALL {
        let n = store.items().iter().filter(|i| i.kind == ty).count();
        if n > 0 {
            let _ = writeln!(out, "  [{}] {}: {}", ty.badge(), ty.label(), n);
        }
    }
    for kind in [GroupKind::Title, GroupKind::Collection] {
        let groups = store.top_groups(kind, top);
        let _ = writeln!(out, "top {}s:", kind.as_str().to_lowercase());
        for g in groups {
            let _ = writeln!(out, "  {:>5}  {}", g.count, g.label);
        }
    }
    if let Some(b) = store.bounds_of(&store.all_indices()) {
        let _ = writeln!(
            out,
            "bounds: {:.5},{:.5} .. {:.5},{:.5}",
            b.south_west.lat, b.south_west.lng, b.north_east.lat, b.north_east.lng
        );
    }
    out
}

pub fn search_report(store: &ItemStore, index: &SearchIndex, query: &str, tab: Tab, limit: usize) -> String {
    let mut out = String::new();
    match tab {
        Tab::Groups => {
            for hit in index.search_groups(query, Some(limit)) {
                let _ = writeln!(
                    out,
                    "{:.4}  {}::{}  ({})",
                    hit.score, hit.group.kind, hit.group.label, hit.group.count
                );
            }
        }
        Tab::Places => {
            for hit in index.search_items(query, Some(limit)) {
                if let Some(item) = store.get(hit.item) {
                    let _ = writeln!(
                        out,
                        "{:.4}  {}  {} ({})  [{}]",
                        hit.score,
                        item.id,
                        item.title,
                        item.place,
                        item.kind.badge()
                    );
                }
            }
        }
    }
    if out.is_empty() {
        out.push_str("no matches\n");
    }
    out
}

pub fn describe_state(state: &ViewState) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "query:   {:?}", state.query);
    let _ = writeln!(out, "tab:     {}", state.tab);
    match &state.filter {
        Some(key) => {
            let _ = writeln!(out, "filter:  {key}");
        }
        None => {
            let _ = writeln!(out, "filter:  -");
        }
    }
    let _ = writeln!(
        out,
        "item:    {}",
        state.open_item.as_ref().map_or("-".to_string(), |id| id.to_string())
    );
    let _ = writeln!(out, "results: {}", if state.results_open { "open" } else { "closed" });
    match state.camera {
        Some(c) => {
            let _ = writeln!(out, "camera:  {},{} z{}", c.lat, c.lng, c.zoom);
        }
        None => {
            let _ = writeln!(out, "camera:  -");
        }
    }
    out
}

/// Extracts the query part of a full URL, a `?query`, or a bare query.
pub fn query_part(input: &str) -> &str {
    let without_fragment = input.split('#').next().unwrap_or(input);
    match without_fragment.split_once('?') {
        Some((_, q)) => q,
        None if without_fragment.contains('=') => without_fragment,
        None => "",
    }
}

#[derive(Debug, Default)]
struct Outcome {
    filter: Option<FilterDescriptor>,
    markers: usize,
    fitted: bool,
    listed: Vec<String>,
    detail: Option<String>,
    results_open: bool,
}

type Shared = std::rc::Rc<std::cell::RefCell<Outcome>>;

struct Sink(Shared);

impl MarkerLayer for Sink {
    fn show_markers(&mut self, markers: &[MarkerHandle], fit: Option<GeoBounds>) {
        let mut o = self.0.borrow_mut();
        o.markers = markers.len();
        o.fitted = fit.is_some();
    }
}

impl FilterObserver for Sink {
    fn filter_changed(&mut self, filter: Option<&FilterDescriptor>) {
        self.0.borrow_mut().filter = filter.cloned();
    }
}

impl ResultsView for Sink {
    fn set_active_tab(&mut self, _tab: Tab) {}

    fn set_query_text(&mut self, _query: &str) {}

    fn render_groups(&mut self, groups: &[catalog::GroupSummary]) {
        self.0.borrow_mut().listed = groups
            .iter()
            .map(|g| format!("{}::{} ({})", g.kind, g.label, g.count))
            .collect();
    }

    fn render_places(&mut self, items: &[&catalog::Item]) {
        self.0.borrow_mut().listed = items.iter().map(|i| format!("{} {}", i.id, i.title)).collect();
    }

    fn render_group_places(&mut self, _key: &catalog::GroupKey, items: &[&catalog::Item], total: usize) {
        let mut listed: Vec<String> = items.iter().map(|i| format!("{} {}", i.id, i.title)).collect();
        if total > items.len() {
            listed.push(format!("... {} more", total - items.len()));
        }
        self.0.borrow_mut().listed = listed;
    }

    fn set_results_open(&mut self, open: bool) {
        self.0.borrow_mut().results_open = open;
    }

    fn show_detail(&mut self, item: &catalog::Item) {
        self.0.borrow_mut().detail = Some(format!("{} {}", item.id, item.title));
    }

    fn hide_detail(&mut self) {
        self.0.borrow_mut().detail = None;
    }
}

/// Boots a router on `url` against `store` and reports what a browser
/// would show once every gate is open.
pub fn resolve_report(store: ItemStore, config: ExplorerConfig, url: &str, list: usize) -> String {
    let outcome = Shared::default();
    let mut view = ViewController::new(
        config.limits,
        Box::new(Sink(outcome.clone())),
        Box::new(Sink(outcome.clone())),
    );
    view.set_filter_observer(Box::new(Sink(outcome.clone())));
    let history = MemoryHistory::new(query_part(url));
    let mut router = Router::new(config, view, Box::new(history));
    router.set_ui_ready();
    router.load(store);

    let o = outcome.borrow();
    let mut out = String::new();
    let _ = writeln!(out, "tab:     {}", router.view().tab());
    let _ = writeln!(
        out,
        "filter:  {}",
        o.filter.as_ref().map_or("-".to_string(), |f| f.to_string())
    );
    let _ = writeln!(out, "markers: {}{}", o.markers, if o.fitted { " (fitted)" } else { "" });
    let _ = writeln!(out, "results: {}", if o.results_open { "open" } else { "closed" });
    let _ = writeln!(out, "detail:  {}", o.detail.as_deref().unwrap_or("-"));
    for line in o.listed.iter().take(list) {
        let _ = writeln!(out, "  {line}");
    }
    for (name, n) in router.metrics().snapshot() {
        let _ = writeln!(out, "# {name} = {n}");
    }
    out
}
