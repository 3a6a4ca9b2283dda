//! Current telemetry
//!
//! Per-axis current sampling on a wall-clock cadence, with the rolling
//! average published to a lock-free cache for the reply path.

pub mod cache;
pub mod current;

pub use cache::TelemetryCache;
pub use current::{CurrentChannel, CurrentTelemetry, CURRENT_WINDOW};
