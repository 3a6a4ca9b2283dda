//! Command handling
//!
//! Turns validated protocol frames into axis state changes, timer
//! programming and query replies.

pub mod handler;

pub use handler::{AxisIo, CommandHandler, Dispatch, DispatchError};
