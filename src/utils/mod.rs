//! Utils Module - Cache, Telemetry & Shared Constants

pub mod cache;
pub mod constants;
pub mod telemetry;

pub use cache::{CacheStats, ScanCache};
pub use telemetry::{TelemetryCollector, TelemetryStats};
