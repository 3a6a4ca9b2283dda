//! Triaxis Serial Command Protocol
//!
//! This crate defines the fixed-length framed protocol between a host
//! controller and the stepper firmware. Every command is exactly 11 bytes;
//! query replies are exactly 10 bytes.
//!
//! # Command Frame
//!
//! ```text
//! ┌─────┬──────┬────────┬──────────────┬──────────┬─────┐
//! │ STX │ AXIS │ ACTION │ VALUE        │ CHECKSUM │ ETX │
//! │ 02  │ '1'… │ 'M'…   │ 6 ASCII dig. │ XOR 1..8 │ 03  │
//! └─────┴──────┴────────┴──────────────┴──────────┴─────┘
//! ```
//!
//! The protocol is fail-silent: frames with bad markers or checksum are
//! dropped without a reply and the host is expected to resend.

#![no_std]
#![deny(unsafe_code)]

pub mod frame;
pub mod messages;

pub use frame::{
    checksum, CommandFrame, FrameError, FrameParser, ResponseFrame, ResponseLayout,
    COMMAND_FRAME_LEN, ETX, RESPONSE_FRAME_LEN, STX,
};
pub use messages::{Action, AxisId, Command, CommandError, AXIS_COUNT};
