use console_error_panic_hook::set_once;
use gloo_net::http::Request;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;

use catalog::{
    CatalogError, GroupKey, GroupKind, ItemStore, RawRecord, SheetSource, records_from_json,
    records_from_sheets,
};
use explorer::{ExplorerConfig, Router, Tab, ViewController};
use foundation::{Millis, MarkerHandle};

mod browser_history;
mod dispatch;
mod host;

use browser_history::BrowserHistory;
use dispatch::Dispatcher;
pub use host::ExplorerHost;
use host::{HostFilter, HostMap, HostMarkers, HostResults, PlaceCard, to_json};

struct App {
    host: ExplorerHost,
    router: Router,
}

/// A page event on its way to the router.
enum Event {
    MapReady,
    Loaded(ItemStore),
    SearchInput(String),
    Tab(Tab),
    GroupClick(GroupKey),
    TagClick(GroupKey),
    PlaceClick(String),
    MarkerClick(String),
    DetailClose,
    ResultsToggle(bool),
    Reset,
    Popstate,
    CameraSettled(Millis),
    Timers(Millis),
}

impl App {
    fn handle(&mut self, event: Event) {
        let router = &mut self.router;
        match event {
            Event::MapReady => router.set_map(Box::new(HostMap(self.host.clone()))),
            Event::Loaded(store) => router.load(store),
            Event::SearchInput(text) => router.search_input(&text),
            Event::Tab(tab) => router.select_tab(tab),
            Event::GroupClick(key) => router.choose_group(&key),
            Event::TagClick(key) => router.apply_tag(&key),
            Event::PlaceClick(id) => router.focus_item(&id),
            Event::MarkerClick(id) => router.open_item(&id),
            Event::DetailClose => router.close_item(),
            Event::ResultsToggle(open) => router.set_results_open(open),
            Event::Reset => router.reset(),
            Event::Popstate => router.on_history_navigation(),
            Event::CameraSettled(now) => router.on_camera_settled(now),
            Event::Timers(now) => router.poll_timers(now),
        }
    }

    fn schedule_poll(&self) {
        if let Some(at) = self.router.next_deadline() {
            self.host.schedule_poll(at.0 as f64);
        }
    }
}

thread_local! {
    static APP: Dispatcher<App, Event> = const { Dispatcher::new() };
}

fn log(msg: &str) {
    web_sys::console::log_1(&JsValue::from_str(msg));
}

fn dispatch(event: Event) {
    APP.with(|app| {
        app.dispatch(event, App::handle, App::schedule_poll);
    });
}

fn with_app<R>(f: impl FnOnce(&App) -> R) -> Option<R> {
    APP.with(|app| app.with(f))
}

fn now() -> Millis {
    Millis::from_f64(js_sys::Date::now())
}

fn js_err(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn group_key(kind: &str, label: &str) -> Result<GroupKey, JsValue> {
    let kind: GroupKind = kind.parse().map_err(js_err)?;
    Ok(GroupKey::new(kind, label))
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    set_once();
    Ok(())
}

/// Wires the page. `config_json` may be empty for defaults.
#[wasm_bindgen]
pub fn init(host: ExplorerHost, config_json: &str) -> Result<(), JsValue> {
    let config = if config_json.trim().is_empty() {
        ExplorerConfig::default()
    } else {
        ExplorerConfig::from_json_str(config_json).map_err(js_err)?
    };
    let mut view = ViewController::new(
        config.limits,
        Box::new(HostResults(host.clone())),
        Box::new(HostMarkers(host.clone())),
    );
    view.set_filter_observer(Box::new(HostFilter(host.clone())));
    let history = BrowserHistory::new()?;
    let mut router = Router::new(config, view, Box::new(history));
    router.set_ui_ready();
    APP.with(|app| app.install(App { host, router }));
    Ok(())
}

/// The map widget is ready for camera calls.
#[wasm_bindgen]
pub fn attach_map() {
    dispatch(Event::MapReady);
}

/// Fetches the configured sources, then builds the store and index.
#[wasm_bindgen]
pub fn load_data() {
    let Some((config, host)) = with_app(|app| (app.router.config().clone(), app.host.clone()))
    else {
        log("load_data called before init");
        return;
    };
    spawn_local(async move {
        let records = match fetch_records(&config).await {
            Ok(r) => r,
            Err(err) => {
                let msg = format!("Failed to load data: {err}");
                log(&msg);
                host.data_failed(&msg);
                return;
            }
        };
        let (mut store, report) = ItemStore::from_records(records);
        store.bind_markers(|_, item| MarkerHandle::new(host.create_marker(&to_json(&PlaceCard::new(item)))));
        log(&format!(
            "loaded {} places ({} rejected)",
            report.accepted, report.rejected
        ));
        dispatch(Event::Loaded(store));
    });
}

async fn fetch_text(url: &str) -> Result<String, String> {
    let resp = Request::get(url).send().await.map_err(|e| e.to_string())?;
    if !resp.ok() {
        return Err(format!("HTTP {}", resp.status()));
    }
    resp.text().await.map_err(|e| e.to_string())
}

async fn fetch_records(config: &ExplorerConfig) -> Result<Vec<RawRecord>, CatalogError> {
    if config.sources.is_empty() {
        let Some(url) = config.fallback_dataset.as_deref() else {
            return Err(CatalogError::NoSources);
        };
        let text = fetch_text(url).await.map_err(|message| CatalogError::Fetch {
            source_name: url.to_string(),
            message,
        })?;
        return records_from_json(&text);
    }

    let mut bodies: Vec<(&SheetSource, String)> = Vec::with_capacity(config.sources.len());
    for source in &config.sources {
        let body = fetch_text(&source.url)
            .await
            .map_err(|message| CatalogError::Fetch {
                source_name: source.name.clone(),
                message,
            })?;
        bodies.push((source, body));
    }
    records_from_sheets(bodies.iter().map(|(s, b)| (*s, b.as_str())))
}

#[wasm_bindgen]
pub fn on_search_input(text: &str) {
    dispatch(Event::SearchInput(text.to_string()));
}

#[wasm_bindgen]
pub fn on_tab(tab: &str) {
    dispatch(Event::Tab(Tab::parse(tab)));
}

/// A group card: filter and list its places.
#[wasm_bindgen]
pub fn on_group_click(kind: &str, label: &str) -> Result<(), JsValue> {
    dispatch(Event::GroupClick(group_key(kind, label)?));
    Ok(())
}

#[wasm_bindgen]
pub fn on_tag_click(kind: &str, label: &str) -> Result<(), JsValue> {
    dispatch(Event::TagClick(group_key(kind, label)?));
    Ok(())
}

#[wasm_bindgen]
pub fn on_place_click(id: &str) {
    dispatch(Event::PlaceClick(id.to_string()));
}

#[wasm_bindgen]
pub fn on_marker_click(id: &str) {
    dispatch(Event::MarkerClick(id.to_string()));
}

#[wasm_bindgen]
pub fn on_detail_close() {
    dispatch(Event::DetailClose);
}

#[wasm_bindgen]
pub fn on_results_toggle(open: bool) {
    dispatch(Event::ResultsToggle(open));
}

#[wasm_bindgen]
pub fn on_reset() {
    dispatch(Event::Reset);
}

#[wasm_bindgen]
pub fn on_popstate() {
    dispatch(Event::Popstate);
}

/// Map `moveend`/`zoomend`. The page is asked through `schedulePoll` when
/// to call `poll_timers`.
#[wasm_bindgen]
pub fn on_camera_settled() {
    dispatch(Event::CameraSettled(now()));
}

#[wasm_bindgen]
pub fn poll_timers() {
    dispatch(Event::Timers(now()));
}
