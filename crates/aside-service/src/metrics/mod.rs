//! Metrics for the cache-aside service.

pub mod service;
pub mod setup;

pub use service::{CacheAsideMetrics, register_service_metrics};
pub use setup::init_metrics;
