use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::delimited::parse_delimited;
use crate::error::{CatalogError, Result};
use crate::item::ItemType;
use crate::record::RawRecord;

/// One delimited-text feed. Rows with an empty `type` cell take the
/// source's fallback classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetSource {
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub fallback_type: Option<ItemType>,
}

impl SheetSource {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            fallback_type: None,
        }
    }

    pub fn with_fallback_type(mut self, ty: ItemType) -> Self {
        self.fallback_type = Some(ty);
        self
    }
}

/// Parses already-fetched sheet bodies, in source order.
///
/// Every source must parse; one failure fails the whole load so the store
/// never holds a partial dataset.
pub fn records_from_sheets<'a, I>(sheets: I) -> Result<Vec<RawRecord>>
where
    I: IntoIterator<Item = (&'a SheetSource, &'a str)>,
{
    let mut out = Vec::new();
    let mut any = false;
    for (source, body) in sheets {
        any = true;
        let rows = parse_delimited(body).map_err(|err| CatalogError::Csv {
            source_name: source.name.clone(),
            source: err,
        })?;
        tracing::debug!(source = %source.name, rows = rows.len(), "parsed sheet");
        out.extend(rows.into_iter().map(|r| match source.fallback_type {
            Some(ty) => r.with_fallback_type(ty),
            None => r,
        }));
    }
    if !any {
        return Err(CatalogError::NoSources);
    }
    Ok(out)
}

/// Parses the structured fallback dataset: a JSON array of objects.
pub fn records_from_json(text: &str) -> Result<Vec<RawRecord>> {
    let value: Value = serde_json::from_str(text)?;
    let Value::Array(rows) = value else {
        return Err(CatalogError::NotAnArray);
    };
    Ok(rows.iter().filter_map(RawRecord::from_json).collect())
}
