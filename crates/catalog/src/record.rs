use std::collections::BTreeMap;

use serde_json::Value;

use crate::item::ItemType;

/// Separator for multi-valued cells such as `collections` or `images`.
pub const LIST_SEPARATOR: char = '|';

/// One cell of an ingested row before normalization.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    Text(String),
    Number(f64),
    List(Vec<String>),
}

/// An ingested row keyed by lower-cased field name.
///
/// Records come from delimited text (every cell is text) or from the JSON
/// fallback dataset (cells may already be numbers or arrays). Accessors hide
/// that difference from item normalization.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRecord {
    fields: BTreeMap<String, RawValue>,
    fallback_type: Option<ItemType>,
}

impl RawRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<K, V, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut r = RawRecord::new();
        for (k, v) in pairs {
            r.insert(k.as_ref(), RawValue::Text(v.into()));
        }
        r
    }

    /// Converts one element of a JSON dataset. Non-object values are ignored.
    pub fn from_json(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        let mut r = RawRecord::new();
        for (k, v) in obj {
            let raw = match v {
                Value::String(s) => RawValue::Text(s.clone()),
                Value::Number(n) => match n.as_f64() {
                    Some(f) => RawValue::Number(f),
                    None => continue,
                },
                Value::Array(values) => RawValue::List(
                    values
                        .iter()
                        .filter_map(|x| match x {
                            Value::String(s) => Some(s.clone()),
                            Value::Number(n) => Some(n.to_string()),
                            _ => None,
                        })
                        .collect(),
                ),
                Value::Bool(b) => RawValue::Text(b.to_string()),
                Value::Null | Value::Object(_) => continue,
            };
            r.insert(k, raw);
        }
        Some(r)
    }

    pub fn insert(&mut self, key: &str, value: RawValue) {
        self.fields.insert(key.trim().to_ascii_lowercase(), value);
    }

    pub fn with_fallback_type(mut self, ty: ItemType) -> Self {
        self.fallback_type = Some(ty);
        self
    }

    pub fn fallback_type(&self) -> Option<ItemType> {
        self.fallback_type
    }

    pub fn raw(&self, key: &str) -> Option<&RawValue> {
        self.fields.get(key)
    }

    pub fn is_blank(&self) -> bool {
        self.fields.values().all(|v| match v {
            RawValue::Text(s) => s.trim().is_empty(),
            RawValue::Number(_) => false,
            RawValue::List(items) => items.iter().all(|s| s.trim().is_empty()),
        })
    }

    /// Trimmed text; empty becomes `None`.
    pub fn text(&self, key: &str) -> Option<String> {
        match self.fields.get(key)? {
            RawValue::Text(s) => norm(s),
            RawValue::Number(n) => Some(n.to_string()),
            RawValue::List(items) => {
                let joined = items
                    .iter()
                    .filter_map(|s| norm(s))
                    .collect::<Vec<_>>()
                    .join(", ");
                (!joined.is_empty()).then_some(joined)
            }
        }
    }

    /// Multi-valued field: `|`-separated text or a JSON array, trimmed with
    /// empty entries dropped. Order is preserved.
    pub fn list(&self, key: &str) -> Vec<String> {
        match self.fields.get(key) {
            Some(RawValue::Text(s)) => split_list(s),
            Some(RawValue::List(items)) => items.iter().filter_map(|s| norm(s)).collect(),
            Some(RawValue::Number(n)) => vec![n.to_string()],
            None => Vec::new(),
        }
    }

    /// Finite number, or `None` when missing, blank, or not numeric.
    pub fn number(&self, key: &str) -> Option<f64> {
        let n = match self.fields.get(key)? {
            RawValue::Number(n) => *n,
            RawValue::Text(s) => s.trim().parse::<f64>().ok()?,
            RawValue::List(_) => return None,
        };
        n.is_finite().then_some(n)
    }
}

pub fn norm(s: &str) -> Option<String> {
    let t = s.trim();
    (!t.is_empty()).then(|| t.to_string())
}

pub fn split_list(s: &str) -> Vec<String> {
    s.split(LIST_SEPARATOR).filter_map(norm).collect()
}
