//! Board-agnostic core logic for the Triaxis stepper controller
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - Shared per-axis state and its mutex-guarded registry
//! - Velocity profile planning (trapezoidal and triangular)
//! - Half-period step scheduling with in-place speed updates
//! - Serial command dispatch and query replies
//! - Current telemetry sampling and rolling averages
//! - Leak sensor debouncing
//! - Configuration type definitions

#![no_std]
#![deny(unsafe_code)]

pub mod axis;
pub mod command;
pub mod config;
pub mod motion;
pub mod safety;
pub mod scheduler;
pub mod telemetry;

#[cfg(test)]
mod sim;
