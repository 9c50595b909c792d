pub mod debounce;
pub mod metrics;

pub use debounce::*;
pub use metrics::*;
