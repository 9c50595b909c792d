//! Browsing state for a map of geotagged items: tabs, search, group
//! filters, and the URL that mirrors them.

pub mod collaborators;
pub mod config;
pub mod error;
pub mod filter;
pub mod guard;
pub mod router;
pub mod view;
pub mod view_state;

#[cfg(test)]
pub mod testing;

pub use collaborators::{FilterObserver, MapCamera, MarkerLayer, ResultsView, UrlHistory};
pub use config::{ExplorerConfig, Limits};
pub use error::ConfigError;
pub use filter::{FilterDescriptor, FilterKind, FilterState};
pub use guard::{ApplyFlag, ApplyGuard};
pub use router::{Gate, GateSet, HistoryMode, MemoryHistory, Router};
pub use view::{ViewChange, ViewController};
pub use view_state::{Camera, CameraSignature, Tab, ViewState, canonical_query};
