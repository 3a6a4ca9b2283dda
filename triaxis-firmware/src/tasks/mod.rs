//! Embassy async tasks
//!
//! Step tasks run on the interrupt-priority executor, the tick task on
//! the medium-priority one, the serial task in thread mode.

pub mod serial;
pub mod step;
pub mod tick;

pub use serial::serial_task;
pub use step::step_task;
pub use tick::{tick_task, LEAK_SENSORS};
