//! Seams to the outside world. The browser shell implements these over the
//! DOM and the JS map; tests use the recorders in `testing`.

use catalog::{GroupKey, GroupSummary, Item};
use foundation::{GeoBounds, LatLng, MarkerHandle};

use crate::filter::FilterDescriptor;
use crate::view_state::Tab;

/// The map's camera control.
pub trait MapCamera {
    fn set_view(&mut self, center: LatLng, zoom: f64);
    fn center(&self) -> LatLng;
    fn zoom(&self) -> f64;
}

/// The clustered marker layer.
pub trait MarkerLayer {
    /// Shows exactly `markers`. With `fit`, the camera is re-fitted to it.
    fn show_markers(&mut self, markers: &[MarkerHandle], fit: Option<GeoBounds>);
}

/// List, overlay and detail widgets.
pub trait ResultsView {
    fn set_active_tab(&mut self, tab: Tab);
    fn set_query_text(&mut self, query: &str);
    fn render_groups(&mut self, groups: &[GroupSummary]);
    fn render_places(&mut self, items: &[&Item]);
    /// `total` may exceed `items.len()` when the list was capped.
    fn render_group_places(&mut self, key: &GroupKey, items: &[&Item], total: usize);
    fn set_results_open(&mut self, open: bool);
    fn show_detail(&mut self, item: &Item);
    fn hide_detail(&mut self);
}

pub trait FilterObserver {
    fn filter_changed(&mut self, filter: Option<&FilterDescriptor>);
}

/// Browser history as seen by the router: the current query string and
/// the two ways to write a new one.
pub trait UrlHistory {
    /// Current query string without the leading `?`.
    fn query(&self) -> String;
    fn push(&mut self, query: &str);
    fn replace(&mut self, query: &str);
}
