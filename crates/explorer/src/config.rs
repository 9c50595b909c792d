use std::path::Path;
use std::str::FromStr;

use catalog::SheetSource;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::view_state::Camera;

pub const ENV_DEBOUNCE_MS: &str = "EXPLORER_DEBOUNCE_MS";
pub const ENV_FUZZY_THRESHOLD: &str = "EXPLORER_FUZZY_THRESHOLD";
pub const ENV_GROUP_RESULTS: &str = "EXPLORER_GROUP_RESULTS";
pub const ENV_PLACE_RESULTS: &str = "EXPLORER_PLACE_RESULTS";

/// Display caps. None of these truncate what the map shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    pub group_results: usize,
    pub place_results: usize,
    pub group_places: usize,
    /// Above this many markers the camera is not re-fitted.
    pub fit_bounds_max: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            group_results: 30,
            place_results: 50,
            group_places: 200,
            fit_bounds_max: 2000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplorerConfig {
    pub sources: Vec<SheetSource>,
    pub fallback_dataset: Option<String>,
    pub limits: Limits,
    pub camera_debounce_ms: u64,
    pub fuzzy_threshold: f64,
    pub default_camera: Camera,
    pub focus_zoom: f64,
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            sources: Vec::new(),
            fallback_dataset: None,
            limits: Limits::default(),
            camera_debounce_ms: 150,
            fuzzy_threshold: search::DEFAULT_THRESHOLD,
            default_camera: Camera::new(54.5, -2.5, 6.0),
            focus_zoom: 16.0,
        }
    }
}

impl ExplorerConfig {
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: ExplorerConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Applies `EXPLORER_*` overrides from the process environment.
    pub fn with_env_overrides(self) -> Result<Self, ConfigError> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Applies overrides from any key lookup. Unset keys keep the current
    /// value; set but unparsable keys are an error.
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = parse_var(&lookup, ENV_DEBOUNCE_MS)? {
            self.camera_debounce_ms = v;
        }
        if let Some(v) = parse_var(&lookup, ENV_FUZZY_THRESHOLD)? {
            self.fuzzy_threshold = v;
        }
        if let Some(v) = parse_var(&lookup, ENV_GROUP_RESULTS)? {
            self.limits.group_results = v;
        }
        if let Some(v) = parse_var(&lookup, ENV_PLACE_RESULTS)? {
            self.limits.place_results = v;
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.fuzzy_threshold.is_finite() && (0.0..=1.0).contains(&self.fuzzy_threshold)) {
            return Err(ConfigError::OutOfRange {
                field: "fuzzy_threshold",
                expected: "between 0 and 1",
            });
        }
        if !self.focus_zoom.is_finite() {
            return Err(ConfigError::OutOfRange {
                field: "focus_zoom",
                expected: "finite",
            });
        }
        Ok(())
    }
}

fn parse_var<T, F>(lookup: &F, key: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidEnv { key, value: raw }),
    }
}

#[cfg(test)]
mod tests {
    use super::{ENV_DEBOUNCE_MS, ENV_FUZZY_THRESHOLD, ExplorerConfig};
    use crate::error::ConfigError;
    use catalog::ItemType;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_match_documented_values() {
        let c = ExplorerConfig::default();
        assert_eq!(c.limits.group_results, 30);
        assert_eq!(c.limits.place_results, 50);
        assert_eq!(c.limits.group_places, 200);
        assert_eq!(c.limits.fit_bounds_max, 2000);
        assert_eq!(c.camera_debounce_ms, 150);
        assert_eq!(c.fuzzy_threshold, 0.35);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let c = ExplorerConfig::from_json_str(
            r#"{
                "sources": [{"name": "tv", "url": "tv.csv", "fallback_type": "TV"}],
                "limits": {"place_results": 20}
            }"#,
        )
        .unwrap();
        assert_eq!(c.sources[0].fallback_type, Some(ItemType::Tv));
        assert_eq!(c.limits.place_results, 20);
        assert_eq!(c.limits.group_results, 30);
        assert_eq!(c.camera_debounce_ms, 150);
    }

    #[test]
    fn overrides_apply_and_reject_garbage() {
        let c = ExplorerConfig::default()
            .with_overrides(|k| (k == ENV_DEBOUNCE_MS).then(|| "300".to_string()))
            .unwrap();
        assert_eq!(c.camera_debounce_ms, 300);

        let err = ExplorerConfig::default()
            .with_overrides(|k| (k == ENV_DEBOUNCE_MS).then(|| "soon".to_string()))
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidEnv {
                key: ENV_DEBOUNCE_MS,
                ..
            }
        ));
    }

    #[test]
    fn threshold_must_be_a_fraction() {
        let err = ExplorerConfig::default()
            .with_overrides(|k| (k == ENV_FUZZY_THRESHOLD).then(|| "2.5".to_string()))
            .unwrap_err();
        assert!(matches!(err, ConfigError::OutOfRange { .. }));
    }
}
