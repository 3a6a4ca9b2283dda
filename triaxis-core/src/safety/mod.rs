//! Safety monitoring
//!
//! Leak sensing on the pump heads. Detection is reported only; it does
//! not halt motion.

pub mod monitor;

pub use monitor::{LeakFlags, LeakMonitor, LeakStatus};
