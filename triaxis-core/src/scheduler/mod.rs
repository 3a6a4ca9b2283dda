//! Step scheduler
//!
//! Runs once per timer compare match on each axis and turns the axis
//! state into step pulses and speed updates.

pub mod step;

pub use step::{StepEvent, StepScheduler};
