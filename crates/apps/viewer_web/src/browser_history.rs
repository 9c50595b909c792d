use explorer::UrlHistory;
use wasm_bindgen::JsValue;

/// `window.location` / `window.history` as a [`UrlHistory`].
pub struct BrowserHistory {
    window: web_sys::Window,
}

impl BrowserHistory {
    pub fn new() -> Result<Self, JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        Ok(Self { window })
    }

    fn target(&self, query: &str) -> String {
        if query.is_empty() {
            self.window
                .location()
                .pathname()
                .unwrap_or_else(|_| "/".to_string())
        } else {
            format!("?{query}")
        }
    }

    fn report(result: Result<(), JsValue>) {
        if let Err(err) = result {
            web_sys::console::log_1(&JsValue::from_str(&format!(
                "history update failed: {err:?}"
            )));
        }
    }
}

impl UrlHistory for BrowserHistory {
    fn query(&self) -> String {
        let search = self.window.location().search().unwrap_or_default();
        search.trim_start_matches('?').to_string()
    }

    fn push(&mut self, query: &str) {
        let url = self.target(query);
        let result = self
            .window
            .history()
            .and_then(|h| h.push_state_with_url(&JsValue::NULL, "", Some(&url)));
        Self::report(result);
    }

    fn replace(&mut self, query: &str) {
        let url = self.target(query);
        let result = self
            .window
            .history()
            .and_then(|h| h.replace_state_with_url(&JsValue::NULL, "", Some(&url)));
        Self::report(result);
    }
}
