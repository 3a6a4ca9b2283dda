//! Triaxis Hardware Abstraction Layer
//!
//! This crate defines the hardware capabilities the motion core depends
//! on. Chip-specific crates implement them; host tests implement them
//! with simulated pins and timers.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  triaxis-core (planner, scheduler, ...) │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  triaxis-hal (this crate - traits)      │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//!            ┌─────────────────┐
//!            │ triaxis-hal-    │
//!            │    rp2040       │
//!            └─────────────────┘
//! ```
//!
//! # Traits
//!
//! - [`gpio::OutputPin`], [`gpio::InputPin`] - Digital I/O
//! - [`timer::TimerChannel`] - Per-axis step compare timer
//! - [`adc::AnalogInput`] - Raw analog sampling

#![no_std]
#![deny(unsafe_code)]

pub mod adc;
pub mod gpio;
pub mod timer;

// Re-export key traits at crate root for convenience
pub use adc::{AdcError, AnalogInput};
pub use gpio::{InputPin, OutputPin};
pub use timer::TimerChannel;
