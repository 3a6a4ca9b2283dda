//! Configuration types
//!
//! All configuration is compile-time defaults plus serial commands at
//! runtime. Timing constants the planner and scheduler depend on are
//! carried here and passed in at construction.

pub mod types;

pub use types::*;
