use catalog::{GroupKey, GroupKind};
use foundation::{ItemId, Millis};
use pretty_assertions::assert_eq;

use super::{Gate, MemoryHistory, Router};
use crate::collaborators::UrlHistory;
use crate::config::ExplorerConfig;
use crate::filter::{FilterDescriptor, FilterKind};
use crate::testing::{FakeMap, RecordingFilterObserver, RecordingMarkers, RecordingResults, sample_store};
use crate::view::ViewController;
use crate::view_state::{Camera, Tab, ViewState};

struct Rig {
    router: Router,
    history: MemoryHistory,
    results: RecordingResults,
    markers: RecordingMarkers,
    map: FakeMap,
    filters: RecordingFilterObserver,
}

impl Rig {
    fn new(url: &str) -> Self {
        let history = MemoryHistory::new(url);
        let results = RecordingResults::default();
        let markers = RecordingMarkers::default();
        let filters = RecordingFilterObserver::default();
        let config = ExplorerConfig::default();
        let mut view = ViewController::new(
            config.limits,
            Box::new(results.clone()),
            Box::new(markers.clone()),
        );
        view.set_filter_observer(Box::new(filters.clone()));
        let router = Router::new(config, view, Box::new(history.clone()));
        Self {
            router,
            history,
            results,
            markers,
            map: FakeMap::new(54.5, -2.5, 6.0),
            filters,
        }
    }

    fn ready(url: &str) -> Self {
        let mut rig = Rig::new(url);
        rig.router.set_ui_ready();
        rig.router.load(sample_store());
        rig.router.set_map(Box::new(rig.map.clone()));
        rig
    }

    fn url(&self) -> String {
        self.history.query()
    }
}

fn key(kind: GroupKind, label: &str) -> GroupKey {
    GroupKey::new(kind, label)
}

#[test]
fn pending_state_waits_for_every_needed_gate_in_any_order() {
    let url = "fk=Collection&fl=X&mlat=51.1&mlng=0.2&mz=9";
    let orders: [[Gate; 4]; 3] = [
        [Gate::Data, Gate::Search, Gate::Ui, Gate::Map],
        [Gate::Map, Gate::Ui, Gate::Data, Gate::Search],
        [Gate::Search, Gate::Map, Gate::Data, Gate::Ui],
    ];
    for order in orders {
        let mut rig = Rig::new(url);
        let store = sample_store();
        let index = search::SearchIndex::build(&store, 0.35);
        let mut store = Some(store);
        let mut index = Some(index);
        for (step, gate) in order.into_iter().enumerate() {
            assert!(rig.router.has_pending(), "{order:?} applied early at step {step}");
            match gate {
                Gate::Ui => rig.router.set_ui_ready(),
                Gate::Data => {
                    if let Some(s) = store.take() {
                        rig.router.set_data(s);
                    }
                }
                Gate::Search => {
                    if let Some(i) = index.take() {
                        rig.router.set_search_index(i);
                    }
                }
                Gate::Map => rig.router.set_map(Box::new(rig.map.clone())),
            }
        }
        assert!(!rig.router.has_pending(), "{order:?}");
        assert_eq!(rig.map.set_views().len(), 1, "{order:?}");
        assert_eq!(rig.map.set_views()[0].1, 9.0);
        assert_eq!(
            rig.router.view().filter(),
            Some(&FilterDescriptor::group(&key(GroupKind::Collection, "X")))
        );
        assert_eq!(rig.markers.last().map(|c| c.markers.len()), Some(2));
        assert_eq!(rig.history.len(), 1, "applying must not write history");
        assert_eq!(rig.url(), url);
    }
}

#[test]
fn state_without_camera_does_not_wait_for_the_map() {
    let mut rig = Rig::new("q=paris&tab=places");
    rig.router.set_ui_ready();
    rig.router.load(sample_store());
    assert!(!rig.router.has_pending());
    assert_eq!(rig.router.view().tab(), Tab::Places);
    assert_eq!(rig.results.snapshot().places, vec![ItemId::new("C")]);
    assert_eq!(rig.results.snapshot().query_text, "paris");
}

#[test]
fn unknown_item_in_url_is_skipped() {
    let rig = Rig::ready("loc=doesnotexist");
    assert_eq!(rig.router.view().open_item(), None);
    assert_eq!(rig.results.snapshot().detail, None);
    assert_eq!(rig.router.metrics().counter("url.stale_item"), 1);
    assert_eq!(rig.url(), "loc=doesnotexist");
}

#[test]
fn known_item_in_url_opens_detail() {
    let rig = Rig::ready("loc=B");
    assert_eq!(rig.results.snapshot().detail, Some(ItemId::new("B")));
}

#[test]
fn unknown_group_falls_back_to_query_then_reset() {
    let rig = Rig::ready("fk=Collection&fl=Gone&q=paris&tab=places");
    assert_eq!(rig.router.view().filter(), Some(&FilterDescriptor::search("paris")));
    assert_eq!(rig.router.metrics().counter("url.stale_filter"), 1);

    let rig = Rig::ready("fk=Collection&fl=Gone");
    assert_eq!(rig.router.view().filter(), None);
    assert_eq!(rig.markers.last().map(|c| c.markers.len()), Some(3));
}

#[test]
fn filter_wins_over_query() {
    let rig = Rig::ready("q=paris&fk=Collection&fl=X");
    assert_eq!(
        rig.router.view().filter().map(|f| f.kind),
        Some(FilterKind::Group(GroupKind::Collection))
    );
    assert_eq!(rig.router.view().query(), "");
}

#[test]
fn reapplying_the_same_url_is_idempotent() {
    let mut rig = Rig::ready("fk=Collection&fl=X&tab=places&rm=1&loc=A");
    let first = rig.results.snapshot();
    let filter = rig.router.view().filter().cloned();
    rig.router.on_history_navigation();
    rig.router.on_history_navigation();
    assert_eq!(rig.results.snapshot(), first);
    assert_eq!(rig.router.view().filter().cloned(), filter);
    assert_eq!(rig.history.len(), 1);
    assert!(first.results_open);
    assert_eq!(first.group_places.map(|(_, ids, _)| ids.len()), Some(2));
}

#[test]
fn outbound_writes_follow_push_and_replace_rules() {
    let mut rig = Rig::ready("");
    assert_eq!(rig.history.len(), 1);

    rig.router.select_tab(Tab::Places);
    assert_eq!(rig.url(), "tab=places");
    rig.router.search_input("paris");
    assert_eq!(rig.url(), "q=paris&tab=places&rm=1");
    assert_eq!(rig.history.len(), 1, "typing replaces");

    rig.router.apply_group_filter(&key(GroupKind::Collection, "X"));
    assert_eq!(rig.url(), "tab=places&fk=Collection&fl=X");
    assert_eq!(rig.history.len(), 2, "filter pushes");

    rig.router.open_item("A");
    assert_eq!(rig.url(), "tab=places&fk=Collection&fl=X&loc=A");
    assert_eq!(rig.history.len(), 3, "detail open pushes");

    rig.router.close_item();
    assert_eq!(rig.url(), "tab=places&fk=Collection&fl=X");
    assert_eq!(rig.history.len(), 3, "detail close replaces");

    rig.router.close_item();
    rig.router.set_results_open(false);
    assert_eq!(rig.history.len(), 3);

    rig.router.reset();
    assert_eq!(rig.url(), "");
    assert_eq!(rig.history.len(), 4, "reset pushes");
}

#[test]
fn query_and_filter_are_mutually_exclusive_in_the_url() {
    let mut rig = Rig::ready("");
    rig.router.apply_group_filter(&key(GroupKind::Collection, "X"));
    rig.router.search_input("paris");
    let st = rig.router.url_state();
    assert_eq!(st.filter, None);
    assert_eq!(st.query, "paris");

    rig.router.apply_group_filter(&key(GroupKind::Collection, "Y"));
    let st = rig.router.url_state();
    assert_eq!(st.query, "");
    assert_eq!(st.filter, Some(key(GroupKind::Collection, "Y")));
}

#[test]
fn clearing_the_query_keeps_the_filter() {
    let mut rig = Rig::ready("");
    rig.router.apply_group_filter(&key(GroupKind::Collection, "X"));
    rig.router.search_input("");
    assert_eq!(rig.url(), "fk=Collection&fl=X");
    assert_eq!(
        rig.router.view().filter(),
        Some(&FilterDescriptor::group(&key(GroupKind::Collection, "X")))
    );
}

#[test]
fn choosing_a_group_writes_one_filter_entry_with_places_tab() {
    let mut rig = Rig::ready("");
    rig.router.search_input("green");
    let before = rig.history.len();
    rig.router.choose_group(&key(GroupKind::Collection, "X"));
    assert_eq!(rig.url(), "tab=places&fk=Collection&fl=X&rm=1");
    assert_eq!(rig.history.len(), before + 1);

    // The written URL reproduces the same view.
    let reloaded = Rig::ready(&rig.url());
    assert_eq!(
        reloaded.results.snapshot().group_places,
        rig.results.snapshot().group_places
    );
    assert_eq!(reloaded.router.view().tab(), Tab::Places);
}

#[test]
fn reset_keeps_the_camera() {
    let mut rig = Rig::ready("q=paris&mlat=51&mlng=0&mz=9");
    rig.router.reset();
    assert_eq!(rig.url(), "mlat=51&mlng=0&mz=9");
}

#[test]
fn camera_burst_writes_once_with_final_values() {
    let mut rig = Rig::ready("q=x");
    let before = rig.history.len();
    for i in 0..10u64 {
        rig.map.pan_to(50.0 + i as f64 * 0.1, 1.0, 7.0);
        rig.router.on_camera_settled(Millis(1_000 + i * 10));
        rig.router.poll_timers(Millis(1_000 + i * 10 + 5));
    }
    assert_eq!(rig.url(), "q=x", "nothing before quiescence");
    assert_eq!(rig.router.next_deadline(), Some(Millis(1_240)));

    rig.router.poll_timers(Millis(1_239));
    assert_eq!(rig.url(), "q=x");
    rig.router.poll_timers(Millis(1_240));
    assert_eq!(rig.url(), "q=x&mlat=50.9&mlng=1&mz=7");
    assert_eq!(rig.history.len(), before, "camera writes replace");
    assert_eq!(rig.router.metrics().counter("url.replace"), 1);
    assert_eq!(rig.router.next_deadline(), None);
}

#[test]
fn repeated_camera_signature_is_not_rewritten() {
    let mut rig = Rig::ready("");
    rig.map.pan_to(51.0, 0.5, 8.2);
    rig.router.on_camera_settled(Millis(0));
    rig.router.poll_timers(Millis(150));
    let written = rig.router.metrics().counter("url.replace");

    rig.map.pan_to(51.000001, 0.5, 7.9);
    rig.router.on_camera_settled(Millis(500));
    rig.router.poll_timers(Millis(650));
    assert_eq!(rig.router.metrics().counter("url.replace"), written);
    assert_eq!(rig.router.metrics().counter("camera.duplicate"), 1);
}

#[test]
fn camera_applied_from_url_is_not_echoed_back() {
    let mut rig = Rig::ready("mlat=51.1&mlng=0.2&mz=9");
    rig.router.on_camera_settled(Millis(10));
    rig.router.poll_timers(Millis(500));
    assert_eq!(rig.router.metrics().counter("url.replace"), 0);
    assert_eq!(rig.router.metrics().counter("camera.duplicate"), 1);
}

#[test]
fn camera_write_sees_earlier_filter_write() {
    let mut rig = Rig::ready("");
    rig.map.pan_to(40.0, 3.0, 5.0);
    rig.router.on_camera_settled(Millis(0));
    rig.router.apply_group_filter(&key(GroupKind::Collection, "Y"));
    rig.router.poll_timers(Millis(150));
    assert_eq!(rig.url(), "fk=Collection&fl=Y&mlat=40&mlng=3&mz=5");
}

#[test]
fn back_and_forward_reapply_without_writing() {
    let mut rig = Rig::ready("");
    rig.router.apply_group_filter(&key(GroupKind::Collection, "X"));
    rig.router.open_item("A");
    assert_eq!(rig.history.len(), 3);

    assert!(rig.history.back());
    rig.router.on_history_navigation();
    assert_eq!(rig.router.view().open_item(), None);
    assert_eq!(rig.results.snapshot().detail, None);
    assert!(rig.router.view().filter().is_some());

    assert!(rig.history.back());
    rig.router.on_history_navigation();
    assert_eq!(rig.router.view().filter(), None);

    assert!(rig.history.forward());
    assert!(rig.history.forward());
    rig.router.on_history_navigation();
    assert_eq!(rig.router.view().open_item(), Some(&ItemId::new("A")));
    assert_eq!(rig.history.len(), 3);
}

#[test]
fn focus_item_moves_camera_and_opens_detail() {
    let mut rig = Rig::ready("");
    rig.router.focus_item("C");
    let (center, zoom) = rig.map.set_views().last().copied().unwrap();
    assert_eq!((center.lat, center.lng, zoom), (48.86, 2.35, 16.0));
    assert_eq!(rig.url(), "loc=C");

    rig.router.focus_item("doesnotexist");
    assert_eq!(rig.url(), "loc=C");
}

#[test]
fn tag_click_filters_and_clears_detail_from_url() {
    let mut rig = Rig::ready("");
    rig.router.open_item("C");
    rig.router.apply_tag(&key(GroupKind::Type, "Film"));
    assert_eq!(rig.url(), "fk=Type&fl=Film");
    assert_eq!(rig.markers.last().map(|c| c.markers.len()), Some(3));
}

#[test]
fn filter_observer_sees_every_change() {
    let mut rig = Rig::ready("");
    let seen_at_boot = rig.filters.seen().len();
    rig.router.select_tab(Tab::Places);
    rig.router.search_input("paris");
    rig.router.apply_group_filter(&key(GroupKind::Collection, "X"));
    let seen = rig.filters.seen();
    assert_eq!(seen.len(), seen_at_boot + 2);
    assert_eq!(seen.last().cloned().flatten().map(|d| d.label), Some("X".to_string()));
}

#[test]
fn user_state_round_trips_through_a_fresh_router() {
    let mut rig = Rig::ready("");
    rig.router.select_tab(Tab::Places);
    rig.router.search_input("greenwod");
    rig.router.open_item("A");
    rig.map.pan_to(51.25, 0.15, 10.4);
    rig.router.on_camera_settled(Millis(0));
    rig.router.poll_timers(Millis(150));

    let url = rig.url();
    let fresh = Rig::ready(&url);
    let expected = ViewState {
        query: "greenwod".into(),
        tab: Tab::Places,
        filter: None,
        open_item: Some(ItemId::new("A")),
        results_open: true,
        camera: Some(Camera::new(51.25, 0.15, 10.0)),
    };
    assert_eq!(ViewState::from_query(&url), expected);
    assert_eq!(fresh.router.view().query(), "greenwod");
    assert_eq!(fresh.router.view().open_item(), Some(&ItemId::new("A")));
    assert_eq!(fresh.results.snapshot().places, rig.results.snapshot().places);
    assert!(fresh.router.view().results_open());
}

#[test]
fn unknown_group_action_leaves_filter_and_url_alone() {
    let mut rig = Rig::ready("");
    let nope = key(GroupKind::Collection, "Nope");
    rig.router.apply_group_filter(&nope);
    rig.router.choose_group(&nope);
    assert_eq!(rig.router.view().filter(), None);
    assert_eq!(rig.url(), "");
    assert_eq!(rig.history.len(), 1);

    rig.router.open_item("C");
    rig.router.apply_tag(&nope);
    assert_eq!(rig.url(), "loc=C");
    assert_eq!(rig.router.view().open_item(), Some(&ItemId::new("C")));
    assert_eq!(rig.results.snapshot().detail, Some(ItemId::new("C")));
}

#[test]
fn filter_push_leaves_the_previous_entry_untouched() {
    let mut rig = Rig::ready("");
    rig.router.choose_group(&key(GroupKind::Collection, "X"));
    assert_eq!(
        rig.history.entries(),
        vec!["".to_string(), "tab=places&fk=Collection&fl=X&rm=1".to_string()]
    );

    let mut rig = Rig::ready("");
    rig.router.select_tab(Tab::Places);
    rig.router.search_input("paris");
    rig.router.apply_group_filter(&key(GroupKind::Collection, "X"));
    assert_eq!(
        rig.history.entries(),
        vec![
            "q=paris&tab=places&rm=1".to_string(),
            "tab=places&fk=Collection&fl=X".to_string()
        ]
    );

    assert!(rig.history.back());
    rig.router.on_history_navigation();
    assert!(rig.router.view().results_open());
    assert_eq!(rig.router.view().query(), "paris");
}

#[test]
fn map_starts_at_the_default_camera_without_writing_it() {
    let mut rig = Rig::ready("q=paris");
    let default = ExplorerConfig::default().default_camera;
    let views = rig.map.set_views();
    assert_eq!(views.len(), 1);
    assert_eq!(
        (views[0].0.lat, views[0].0.lng, views[0].1),
        (default.lat, default.lng, default.zoom)
    );

    rig.router.on_camera_settled(Millis(0));
    rig.router.poll_timers(Millis(150));
    assert_eq!(rig.url(), "q=paris");
    assert_eq!(rig.router.metrics().counter("camera.duplicate"), 1);
}
