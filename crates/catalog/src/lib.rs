//! Item collection: ingestion, normalization, and group aggregates.

pub mod delimited;
pub mod error;
pub mod groups;
pub mod item;
pub mod record;
pub mod sources;
pub mod store;

pub use delimited::parse_delimited;
pub use error::{CatalogError, Result};
pub use groups::{GroupIndex, GroupKey, GroupKind, GroupSummary, UnknownGroupKind};
pub use item::{Item, ItemType, Rejection};
pub use record::{RawRecord, RawValue};
pub use sources::{SheetSource, records_from_json, records_from_sheets};
pub use store::{ItemStore, LoadReport};
