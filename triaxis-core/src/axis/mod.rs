//! Per-axis state
//!
//! Axis state is written from exactly two contexts: the step scheduler
//! (interrupt priority) and the command handler (thread priority). The
//! registry serialises them through a raw mutex chosen by the firmware.

pub mod registry;
pub mod state;

pub use registry::{AxisRegistry, PendingInterval};
pub use state::{Axis, Direction};
