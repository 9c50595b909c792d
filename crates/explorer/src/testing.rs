//! Recording fakes for the collaborator traits.

use std::cell::RefCell;
use std::rc::Rc;

use catalog::{GroupKey, GroupSummary, Item, ItemStore, RawRecord};
use foundation::{GeoBounds, ItemId, LatLng, MarkerHandle};

use crate::collaborators::{FilterObserver, MapCamera, MarkerLayer, ResultsView};
use crate::filter::FilterDescriptor;
use crate::view_state::Tab;

#[derive(Clone, Default)]
pub struct RecordingFilterObserver {
    seen: Rc<RefCell<Vec<Option<FilterDescriptor>>>>,
}

impl RecordingFilterObserver {
    pub fn seen(&self) -> Vec<Option<FilterDescriptor>> {
        self.seen.borrow().clone()
    }
}

impl FilterObserver for RecordingFilterObserver {
    fn filter_changed(&mut self, filter: Option<&FilterDescriptor>) {
        self.seen.borrow_mut().push(filter.cloned());
    }
}

#[derive(Debug)]
struct MapInner {
    center: LatLng,
    zoom: f64,
    set_views: Vec<(LatLng, f64)>,
}

#[derive(Clone)]
pub struct FakeMap {
    inner: Rc<RefCell<MapInner>>,
}

impl FakeMap {
    pub fn new(lat: f64, lng: f64, zoom: f64) -> Self {
        Self {
            inner: Rc::new(RefCell::new(MapInner {
                center: LatLng::new(lat, lng),
                zoom,
                set_views: Vec::new(),
            })),
        }
    }

    /// Simulates a user gesture; does not count as `set_view`.
    pub fn pan_to(&self, lat: f64, lng: f64, zoom: f64) {
        let mut m = self.inner.borrow_mut();
        m.center = LatLng::new(lat, lng);
        m.zoom = zoom;
    }

    pub fn set_views(&self) -> Vec<(LatLng, f64)> {
        self.inner.borrow().set_views.clone()
    }
}

impl MapCamera for FakeMap {
    fn set_view(&mut self, center: LatLng, zoom: f64) {
        let mut m = self.inner.borrow_mut();
        m.center = center;
        m.zoom = zoom;
        m.set_views.push((center, zoom));
    }

    fn center(&self) -> LatLng {
        self.inner.borrow().center
    }

    fn zoom(&self) -> f64 {
        self.inner.borrow().zoom
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MarkerCall {
    pub markers: Vec<MarkerHandle>,
    pub fit: Option<GeoBounds>,
}

#[derive(Clone, Default)]
pub struct RecordingMarkers {
    calls: Rc<RefCell<Vec<MarkerCall>>>,
}

impl RecordingMarkers {
    pub fn calls(&self) -> Vec<MarkerCall> {
        self.calls.borrow().clone()
    }

    pub fn last(&self) -> Option<MarkerCall> {
        self.calls.borrow().last().cloned()
    }
}

impl MarkerLayer for RecordingMarkers {
    fn show_markers(&mut self, markers: &[MarkerHandle], fit: Option<GeoBounds>) {
        self.calls.borrow_mut().push(MarkerCall {
            markers: markers.to_vec(),
            fit,
        });
    }
}

/// Snapshot of everything the results widgets were last told.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultsSnapshot {
    pub tab: Tab,
    pub query_text: String,
    pub groups: Vec<GroupSummary>,
    pub places: Vec<ItemId>,
    pub group_places: Option<(GroupKey, Vec<ItemId>, usize)>,
    pub results_open: bool,
    pub detail: Option<ItemId>,
}

#[derive(Clone, Default)]
pub struct RecordingResults {
    state: Rc<RefCell<ResultsSnapshot>>,
}

impl RecordingResults {
    pub fn snapshot(&self) -> ResultsSnapshot {
        self.state.borrow().clone()
    }
}

impl ResultsView for RecordingResults {
    fn set_active_tab(&mut self, tab: Tab) {
        self.state.borrow_mut().tab = tab;
    }

    fn set_query_text(&mut self, query: &str) {
        self.state.borrow_mut().query_text = query.to_string();
    }

    fn render_groups(&mut self, groups: &[GroupSummary]) {
        self.state.borrow_mut().groups = groups.to_vec();
    }

    fn render_places(&mut self, items: &[&Item]) {
        self.state.borrow_mut().places = items.iter().map(|i| i.id.clone()).collect();
    }

    fn render_group_places(&mut self, key: &GroupKey, items: &[&Item], total: usize) {
        let ids = items.iter().map(|i| i.id.clone()).collect();
        self.state.borrow_mut().group_places = Some((key.clone(), ids, total));
    }

    fn set_results_open(&mut self, open: bool) {
        self.state.borrow_mut().results_open = open;
    }

    fn show_detail(&mut self, item: &Item) {
        self.state.borrow_mut().detail = Some(item.id.clone());
    }

    fn hide_detail(&mut self) {
        self.state.borrow_mut().detail = None;
    }
}

/// Record with explicit id for readable assertions.
pub fn record(id: &str, title: &str, place: &str, lat: f64, lng: f64, collections: &str) -> RawRecord {
    RawRecord::from_pairs([
        ("id", id.to_string()),
        ("title", title.to_string()),
        ("place", place.to_string()),
        ("lat", lat.to_string()),
        ("lng", lng.to_string()),
        ("collections", collections.to_string()),
        ("type", "film".to_string()),
    ])
}

/// A: Greenwood Manor (X), B: Green Wood Farm (X), C: Paris Steps (Y).
/// Markers are bound as 100 + ingestion position.
pub fn sample_store() -> ItemStore {
    let (mut store, _) = ItemStore::from_records(vec![
        record("A", "Greenwood Manor", "Surrey", 51.2, -0.4, "X"),
        record("B", "Green Wood Farm", "Kent", 51.3, 0.7, "X"),
        record("C", "Paris Steps", "Paris", 48.86, 2.35, "Y"),
    ]);
    store.bind_markers(|idx, _| MarkerHandle::new(100 + idx.0));
    store
}
