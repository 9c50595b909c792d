//! The page-side half of the app: a JS object implementing the map, list,
//! and overlay widgets. Each collaborator trait is a thin forwarder to it.

use catalog::{GroupKey, GroupSummary, Item};
use explorer::{FilterDescriptor, FilterObserver, MapCamera, MarkerLayer, ResultsView, Tab};
use foundation::{GeoBounds, LatLng, MarkerHandle};
use serde::Serialize;
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
extern "C" {
    #[derive(Debug, Clone)]
    pub type ExplorerHost;

    #[wasm_bindgen(method, js_name = setView)]
    fn set_view(this: &ExplorerHost, lat: f64, lng: f64, zoom: f64);

    #[wasm_bindgen(method, js_name = centerLat)]
    fn center_lat(this: &ExplorerHost) -> f64;

    #[wasm_bindgen(method, js_name = centerLng)]
    fn center_lng(this: &ExplorerHost) -> f64;

    #[wasm_bindgen(method, js_name = getZoom)]
    fn get_zoom(this: &ExplorerHost) -> f64;

    /// Returns the handle the page uses for the new marker.
    #[wasm_bindgen(method, js_name = createMarker)]
    pub fn create_marker(this: &ExplorerHost, place_json: &str) -> u32;

    /// `fit` is `[south, west, north, east]` or empty.
    #[wasm_bindgen(method, js_name = showMarkers)]
    fn show_markers(this: &ExplorerHost, handles: &[u32], fit: &[f64]);

    #[wasm_bindgen(method, js_name = setActiveTab)]
    fn set_active_tab(this: &ExplorerHost, tab: &str);

    #[wasm_bindgen(method, js_name = setQueryText)]
    fn set_query_text(this: &ExplorerHost, text: &str);

    #[wasm_bindgen(method, js_name = renderGroups)]
    fn render_groups(this: &ExplorerHost, groups_json: &str);

    #[wasm_bindgen(method, js_name = renderPlaces)]
    fn render_places(this: &ExplorerHost, places_json: &str);

    #[wasm_bindgen(method, js_name = renderGroupPlaces)]
    fn render_group_places(this: &ExplorerHost, kind: &str, label: &str, places_json: &str, total: u32);

    #[wasm_bindgen(method, js_name = setResultsOpen)]
    fn set_results_open(this: &ExplorerHost, open: bool);

    #[wasm_bindgen(method, js_name = showDetail)]
    fn show_detail(this: &ExplorerHost, place_json: &str);

    #[wasm_bindgen(method, js_name = hideDetail)]
    fn hide_detail(this: &ExplorerHost);

    /// Empty kind means no filter.
    #[wasm_bindgen(method, js_name = filterChanged)]
    fn filter_changed(this: &ExplorerHost, kind: &str, label: &str);

    /// Asks the page to call `poll_timers` at `at_ms` (epoch millis),
    /// replacing any earlier request.
    #[wasm_bindgen(method, js_name = schedulePoll)]
    pub fn schedule_poll(this: &ExplorerHost, at_ms: f64);

    #[wasm_bindgen(method, js_name = dataFailed)]
    pub fn data_failed(this: &ExplorerHost, message: &str);
}

#[derive(Debug, Serialize)]
pub struct GroupCard<'a> {
    pub kind: &'a str,
    pub label: &'a str,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct Tag<'a> {
    pub kind: &'a str,
    pub label: String,
}

#[derive(Debug, Serialize)]
pub struct PlaceCard<'a> {
    pub id: &'a str,
    pub title: &'a str,
    #[serde(rename = "type")]
    pub kind: &'a str,
    pub badge: &'a str,
    pub color: &'a str,
    pub place: &'a str,
    pub country: Option<&'a str>,
    pub description: Option<&'a str>,
    pub series: Option<&'a str>,
    pub images: &'a [String],
    pub lat: f64,
    pub lng: f64,
    pub tags: Vec<Tag<'static>>,
}

impl<'a> PlaceCard<'a> {
    pub fn new(item: &'a Item) -> Self {
        Self {
            id: item.id.as_str(),
            title: &item.title,
            kind: item.kind.label(),
            badge: item.kind.badge(),
            color: item.kind.color(),
            place: &item.place,
            country: item.country.as_deref(),
            description: item.description.as_deref(),
            series: item.series.as_deref(),
            images: &item.images,
            lat: item.position.lat,
            lng: item.position.lng,
            tags: item.tags().into_iter().map(tag).collect(),
        }
    }
}

fn tag(key: GroupKey) -> Tag<'static> {
    Tag {
        kind: key.kind.as_str(),
        label: key.label,
    }
}

pub fn to_json<T: Serialize + ?Sized>(value: &T) -> String {
    match serde_json::to_string(value) {
        Ok(json) => json,
        Err(err) => {
            web_sys::console::log_1(&JsValue::from_str(&format!("serialize error: {err}")));
            "null".to_string()
        }
    }
}

fn places_json(items: &[&Item]) -> String {
    let cards: Vec<PlaceCard<'_>> = items.iter().map(|i| PlaceCard::new(i)).collect();
    to_json(&cards)
}

pub struct HostMap(pub ExplorerHost);

impl MapCamera for HostMap {
    fn set_view(&mut self, center: LatLng, zoom: f64) {
        self.0.set_view(center.lat, center.lng, zoom);
    }

    fn center(&self) -> LatLng {
        LatLng::new(self.0.center_lat(), self.0.center_lng())
    }

    fn zoom(&self) -> f64 {
        self.0.get_zoom()
    }
}

pub struct HostMarkers(pub ExplorerHost);

impl MarkerLayer for HostMarkers {
    fn show_markers(&mut self, markers: &[MarkerHandle], fit: Option<GeoBounds>) {
        let handles: Vec<u32> = markers.iter().map(|m| m.index()).collect();
        let fit: Vec<f64> = match fit {
            Some(b) => vec![
                b.south_west.lat,
                b.south_west.lng,
                b.north_east.lat,
                b.north_east.lng,
            ],
            None => Vec::new(),
        };
        self.0.show_markers(&handles, &fit);
    }
}

pub struct HostResults(pub ExplorerHost);

impl ResultsView for HostResults {
    fn set_active_tab(&mut self, tab: Tab) {
        self.0.set_active_tab(tab.as_str());
    }

    fn set_query_text(&mut self, query: &str) {
        self.0.set_query_text(query);
    }

    fn render_groups(&mut self, groups: &[GroupSummary]) {
        let cards: Vec<GroupCard<'_>> = groups
            .iter()
            .map(|g| GroupCard {
                kind: g.kind.as_str(),
                label: &g.label,
                count: g.count,
            })
            .collect();
        self.0.render_groups(&to_json(&cards));
    }

    fn render_places(&mut self, items: &[&Item]) {
        self.0.render_places(&places_json(items));
    }

    fn render_group_places(&mut self, key: &GroupKey, items: &[&Item], total: usize) {
        let total = u32::try_from(total).unwrap_or(u32::MAX);
        self.0
            .render_group_places(key.kind.as_str(), &key.label, &places_json(items), total);
    }

    fn set_results_open(&mut self, open: bool) {
        self.0.set_results_open(open);
    }

    fn show_detail(&mut self, item: &Item) {
        self.0.show_detail(&to_json(&PlaceCard::new(item)));
    }

    fn hide_detail(&mut self) {
        self.0.hide_detail();
    }
}

pub struct HostFilter(pub ExplorerHost);

impl FilterObserver for HostFilter {
    fn filter_changed(&mut self, filter: Option<&FilterDescriptor>) {
        match filter {
            Some(f) => self.0.filter_changed(f.kind.as_str(), &f.label),
            None => self.0.filter_changed("", ""),
        }
    }
}
