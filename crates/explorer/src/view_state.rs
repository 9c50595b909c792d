use std::fmt;

use catalog::{GroupKey, GroupKind};
use foundation::{ItemId, LatLng, round_to};
use serde::{Deserialize, Serialize};
use url::form_urlencoded;

/// Decimal places kept for camera coordinates in the URL.
pub const CAMERA_DECIMALS: u32 = 5;

pub const PARAM_QUERY: &str = "q";
pub const PARAM_TAB: &str = "tab";
pub const PARAM_FILTER_KIND: &str = "fk";
pub const PARAM_FILTER_LABEL: &str = "fl";
pub const PARAM_OPEN_ITEM: &str = "loc";
pub const PARAM_RESULTS: &str = "rm";
pub const PARAM_LAT: &str = "mlat";
pub const PARAM_LNG: &str = "mlng";
pub const PARAM_ZOOM: &str = "mz";

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tab {
    #[default]
    Groups,
    Places,
}

impl Tab {
    pub fn as_str(self) -> &'static str {
        match self {
            Tab::Groups => "groups",
            Tab::Places => "places",
        }
    }

    /// Anything but `places` selects the default tab.
    pub fn parse(raw: &str) -> Tab {
        if raw == "places" {
            Tab::Places
        } else {
            Tab::Groups
        }
    }
}

impl fmt::Display for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Map center and zoom.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub lat: f64,
    pub lng: f64,
    pub zoom: f64,
}

/// Integer form of a rounded camera, comparable without float noise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CameraSignature {
    lat_e5: i64,
    lng_e5: i64,
    zoom: i64,
}

impl Camera {
    pub fn new(lat: f64, lng: f64, zoom: f64) -> Self {
        Self { lat, lng, zoom }
    }

    pub fn from_center(center: LatLng, zoom: f64) -> Self {
        Self::new(center.lat, center.lng, zoom)
    }

    pub fn center(self) -> LatLng {
        LatLng::new(self.lat, self.lng)
    }

    pub fn is_finite(self) -> bool {
        self.lat.is_finite() && self.lng.is_finite() && self.zoom.is_finite()
    }

    /// Coordinates to five decimal places, zoom to an integer.
    pub fn rounded(self) -> Self {
        let zoom = self.zoom.round();
        Self {
            lat: round_to(self.lat, CAMERA_DECIMALS),
            lng: round_to(self.lng, CAMERA_DECIMALS),
            zoom: if zoom == 0.0 { 0.0 } else { zoom },
        }
    }

    pub fn signature(self) -> CameraSignature {
        let r = self.rounded();
        let scale = 10f64.powi(CAMERA_DECIMALS as i32);
        CameraSignature {
            lat_e5: (r.lat * scale).round() as i64,
            lng_e5: (r.lng * scale).round() as i64,
            zoom: r.zoom as i64,
        }
    }
}

/// The URL-serializable projection of what the user is looking at.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ViewState {
    pub query: String,
    pub tab: Tab,
    pub filter: Option<GroupKey>,
    pub open_item: Option<ItemId>,
    pub results_open: bool,
    pub camera: Option<Camera>,
}

impl ViewState {
    /// Parses a query string, with or without the leading `?`.
    ///
    /// Unknown parameters are ignored. For repeated parameters the first
    /// occurrence wins. A filter needs both kind and label, and the camera
    /// needs all three values to be finite numbers.
    pub fn from_query(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        let mut q = None;
        let mut tab = None;
        let mut fk = None;
        let mut fl = None;
        let mut loc = None;
        let mut rm = None;
        let mut mlat = None;
        let mut mlng = None;
        let mut mz = None;

        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            let slot = match &*key {
                PARAM_QUERY => &mut q,
                PARAM_TAB => &mut tab,
                PARAM_FILTER_KIND => &mut fk,
                PARAM_FILTER_LABEL => &mut fl,
                PARAM_OPEN_ITEM => &mut loc,
                PARAM_RESULTS => &mut rm,
                PARAM_LAT => &mut mlat,
                PARAM_LNG => &mut mlng,
                PARAM_ZOOM => &mut mz,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value.into_owned());
            }
        }

        let filter = match (fk.as_deref(), fl) {
            (Some(kind), Some(label)) if !label.is_empty() => match kind.parse::<GroupKind>() {
                Ok(kind) => Some(GroupKey::new(kind, label)),
                Err(err) => {
                    tracing::debug!(%err, "ignoring filter with unknown kind");
                    None
                }
            },
            _ => None,
        };

        let camera = match (number(mlat), number(mlng), number(mz)) {
            (Some(lat), Some(lng), Some(zoom)) => Some(Camera::new(lat, lng, zoom).rounded()),
            _ => None,
        };

        ViewState {
            query: q.unwrap_or_default(),
            tab: tab.as_deref().map(Tab::parse).unwrap_or_default(),
            filter,
            open_item: loc.filter(|s| !s.is_empty()).map(ItemId::new),
            results_open: rm.as_deref() == Some("1"),
            camera,
        }
    }

    /// Serializes to a query string without the leading `?`. Defaults are
    /// omitted, so the default state is the empty string.
    pub fn to_query(&self) -> String {
        let mut out = form_urlencoded::Serializer::new(String::new());
        if !self.query.is_empty() {
            out.append_pair(PARAM_QUERY, &self.query);
        }
        if self.tab == Tab::Places {
            out.append_pair(PARAM_TAB, Tab::Places.as_str());
        }
        if let Some(key) = &self.filter {
            out.append_pair(PARAM_FILTER_KIND, key.kind.as_str());
            out.append_pair(PARAM_FILTER_LABEL, &key.label);
        }
        if let Some(id) = &self.open_item {
            out.append_pair(PARAM_OPEN_ITEM, id.as_str());
        }
        if self.results_open {
            out.append_pair(PARAM_RESULTS, "1");
        }
        if let Some(camera) = self.camera.filter(|c| c.is_finite()) {
            let c = camera.rounded();
            out.append_pair(PARAM_LAT, &c.lat.to_string());
            out.append_pair(PARAM_LNG, &c.lng.to_string());
            out.append_pair(PARAM_ZOOM, &(c.zoom as i64).to_string());
        }
        out.finish()
    }

    /// Everything reset except the camera.
    pub fn reset_keeping_camera(&self) -> ViewState {
        ViewState {
            camera: self.camera,
            ..ViewState::default()
        }
    }
}

/// Re-encodes a raw query string through the codec so that two spellings of
/// the same state compare equal.
pub fn canonical_query(raw: &str) -> String {
    ViewState::from_query(raw).to_query()
}

fn number(raw: Option<String>) -> Option<f64> {
    let n: f64 = raw?.trim().parse().ok()?;
    n.is_finite().then_some(n)
}

#[cfg(test)]
mod tests {
    use super::{Camera, Tab, ViewState, canonical_query};
    use catalog::{GroupKey, GroupKind};
    use foundation::ItemId;
    use pretty_assertions::assert_eq;

    fn samples() -> Vec<ViewState> {
        vec![
            ViewState::default(),
            ViewState {
                query: "paris & lyon".into(),
                tab: Tab::Places,
                results_open: true,
                ..ViewState::default()
            },
            ViewState {
                tab: Tab::Places,
                filter: Some(GroupKey::new(GroupKind::Collection, "Film Noir / 1940s")),
                open_item: Some(ItemId::new("a1b2c3d4e5f6")),
                camera: Some(Camera::new(51.50735, -0.12776, 12.0)),
                ..ViewState::default()
            },
            ViewState {
                query: "ünïcödé".into(),
                camera: Some(Camera::new(-33.86882, 151.20929, 0.0)),
                ..ViewState::default()
            },
        ]
    }

    #[test]
    fn states_round_trip() {
        for state in samples() {
            let encoded = state.to_query();
            assert_eq!(ViewState::from_query(&encoded), state, "via {encoded}");
        }
    }

    #[test]
    fn camera_is_rounded_on_the_way_out() {
        let state = ViewState {
            camera: Some(Camera::new(51.507351234, -0.127758999, 11.6)),
            ..ViewState::default()
        };
        assert_eq!(state.to_query(), "mlat=51.50735&mlng=-0.12776&mz=12");
        let back = ViewState::from_query(&state.to_query());
        assert_eq!(back.camera, Some(Camera::new(51.50735, -0.12776, 12.0)));
    }

    #[test]
    fn default_state_is_empty_and_params_are_ordered() {
        assert_eq!(ViewState::default().to_query(), "");
        let state = ViewState {
            query: "a b".into(),
            tab: Tab::Places,
            filter: Some(GroupKey::new(GroupKind::Title, "X")),
            open_item: Some(ItemId::new("id")),
            results_open: true,
            camera: Some(Camera::new(1.0, 2.0, 3.0)),
        };
        assert_eq!(
            state.to_query(),
            "q=a+b&tab=places&fk=Title&fl=X&loc=id&rm=1&mlat=1&mlng=2&mz=3"
        );
    }

    #[test]
    fn partial_or_invalid_params_fall_back_to_defaults() {
        let s = ViewState::from_query("?tab=maps&fk=Collection&rm=yes&mlat=1&mlng=2");
        assert_eq!(s, ViewState::default());

        let s = ViewState::from_query("fk=Planet&fl=Mars&mlat=1&mlng=NaN&mz=3");
        assert_eq!(s.filter, None);
        assert_eq!(s.camera, None);

        let s = ViewState::from_query("loc=&q=");
        assert_eq!(s.open_item, None);
        assert_eq!(s.query, "");
    }

    #[test]
    fn first_occurrence_wins() {
        let s = ViewState::from_query("q=one&q=two");
        assert_eq!(s.query, "one");
    }

    #[test]
    fn canonical_form_drops_unknown_params() {
        assert_eq!(canonical_query("?utm=x&q=a%20b"), "q=a+b");
        assert_eq!(canonical_query(""), "");
    }

    #[test]
    fn signatures_ignore_sub_rounding_noise() {
        let a = Camera::new(51.500001, -0.1, 12.2).signature();
        let b = Camera::new(51.500004, -0.1, 11.8).signature();
        let c = Camera::new(51.50001, -0.1, 12.0).signature();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn reset_keeps_only_camera() {
        let s = ViewState::from_query("q=x&tab=places&loc=1&rm=1&mlat=1&mlng=2&mz=3");
        let r = s.reset_keeping_camera();
        assert_eq!(r.to_query(), "mlat=1&mlng=2&mz=3");
    }
}
