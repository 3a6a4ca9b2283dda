//! Command types for the serial protocol
//!
//! A validated [`CommandFrame`] carries a raw axis selector and action
//! code. This module turns them into typed commands:
//!
//! | Code | Command                                   | Value          |
//! |------|-------------------------------------------|----------------|
//! | `M`  | Start motion                              | steps (0 = ∞)  |
//! | `S`  | Stop                                      | ignored        |
//! | `F`  | Direction forward                         | ignored        |
//! | `R`  | Direction reverse                         | ignored        |
//! | `V`  | Set speed                                 | RPM            |
//! | `E`  | Enable excitation                         | ignored        |
//! | `D`  | Disable excitation                        | ignored        |
//! | `A`  | Trapezoid ramping                         | 0 = off, else on |
//! | `C`  | Query rolling-average current             | ignored        |
//! | `X`  | Query rotation speed (legacy controllers) | ignored        |

use crate::frame::{CommandFrame, FrameError};

// Action codes
pub const ACTION_MOVE: u8 = b'M';
pub const ACTION_STOP: u8 = b'S';
pub const ACTION_FORWARD: u8 = b'F';
pub const ACTION_REVERSE: u8 = b'R';
pub const ACTION_SPEED: u8 = b'V';
pub const ACTION_EXCITE: u8 = b'E';
pub const ACTION_RELEASE: u8 = b'D';
pub const ACTION_TRAPEZOID: u8 = b'A';
pub const ACTION_QUERY_CURRENT: u8 = b'C';
pub const ACTION_QUERY_ROTATION: u8 = b'X';

/// Number of axes addressable on the wire
pub const AXIS_COUNT: usize = 3;

/// Errors interpreting a well-formed frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CommandError {
    /// Axis selector outside `'1'..='3'`
    UnknownAxis,
    /// Action code not in the command table
    UnknownAction,
}

/// Zero-based axis index, guaranteed `< AXIS_COUNT`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AxisId(u8);

impl AxisId {
    pub const AXIS_1: AxisId = AxisId(0);
    pub const AXIS_2: AxisId = AxisId(1);
    pub const AXIS_3: AxisId = AxisId(2);

    /// All axes in index order
    pub const ALL: [AxisId; AXIS_COUNT] = [Self::AXIS_1, Self::AXIS_2, Self::AXIS_3];

    /// Decode an ASCII selector digit (`'1'..='3'`)
    pub fn from_selector(selector: u8) -> Result<Self, CommandError> {
        match selector {
            b'1'..=b'3' => Ok(AxisId(selector - b'1')),
            _ => Err(CommandError::UnknownAxis),
        }
    }

    /// ASCII selector digit for this axis
    pub const fn selector(self) -> u8 {
        b'1' + self.0
    }

    /// Zero-based index for table lookups
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// What a command asks the axis to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Action {
    /// Start motion; `steps == 0` runs until stopped
    Move { steps: u32 },
    /// Stop immediately
    Stop,
    /// Select forward direction
    Forward,
    /// Select reverse direction
    Reverse,
    /// Set target speed in RPM
    Speed { rpm: u32 },
    /// Energise the driver
    Excite,
    /// De-energise the driver
    Release,
    /// Switch trapezoid ramping on or off
    Trapezoid { enabled: bool },
    /// Reply with the rolling-average current
    QueryCurrent,
    /// Reply with the externally measured rotation speed
    QueryRotation,
}

impl Action {
    /// Decode an action code and its value field
    pub fn decode(code: u8, value: u32) -> Result<Self, CommandError> {
        match code {
            ACTION_MOVE => Ok(Action::Move { steps: value }),
            ACTION_STOP => Ok(Action::Stop),
            ACTION_FORWARD => Ok(Action::Forward),
            ACTION_REVERSE => Ok(Action::Reverse),
            ACTION_SPEED => Ok(Action::Speed { rpm: value }),
            ACTION_EXCITE => Ok(Action::Excite),
            ACTION_RELEASE => Ok(Action::Release),
            ACTION_TRAPEZOID => Ok(Action::Trapezoid {
                enabled: value != 0,
            }),
            ACTION_QUERY_CURRENT => Ok(Action::QueryCurrent),
            ACTION_QUERY_ROTATION => Ok(Action::QueryRotation),
            _ => Err(CommandError::UnknownAction),
        }
    }

    /// Action code and value field for encoding
    pub fn encode(&self) -> (u8, u32) {
        match *self {
            Action::Move { steps } => (ACTION_MOVE, steps),
            Action::Stop => (ACTION_STOP, 0),
            Action::Forward => (ACTION_FORWARD, 0),
            Action::Reverse => (ACTION_REVERSE, 0),
            Action::Speed { rpm } => (ACTION_SPEED, rpm),
            Action::Excite => (ACTION_EXCITE, 0),
            Action::Release => (ACTION_RELEASE, 0),
            Action::Trapezoid { enabled } => (ACTION_TRAPEZOID, enabled as u32),
            Action::QueryCurrent => (ACTION_QUERY_CURRENT, 0),
            Action::QueryRotation => (ACTION_QUERY_ROTATION, 0),
        }
    }

    /// Whether this action expects a reply frame
    pub fn is_query(&self) -> bool {
        matches!(self, Action::QueryCurrent | Action::QueryRotation)
    }
}

/// A typed command addressed to one axis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Command {
    pub axis: AxisId,
    pub action: Action,
}

impl Command {
    /// Interpret a validated frame
    pub fn from_frame(frame: &CommandFrame) -> Result<Self, CommandError> {
        let axis = AxisId::from_selector(frame.selector)?;
        let action = Action::decode(frame.action, frame.value)?;
        Ok(Self { axis, action })
    }

    /// Build the wire frame for this command (host side)
    pub fn to_frame(&self) -> Result<CommandFrame, FrameError> {
        let (code, value) = self.action.encode();
        CommandFrame::new(self.axis.selector(), code, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_axis_selector_range() {
        assert_eq!(AxisId::from_selector(b'1'), Ok(AxisId::AXIS_1));
        assert_eq!(AxisId::from_selector(b'3'), Ok(AxisId::AXIS_3));
        assert_eq!(AxisId::from_selector(b'0'), Err(CommandError::UnknownAxis));
        assert_eq!(AxisId::from_selector(b'4'), Err(CommandError::UnknownAxis));
        assert_eq!(AxisId::AXIS_2.selector(), b'2');
    }

    #[test]
    fn test_decode_move() {
        let frame = CommandFrame::new(b'2', b'M', 10_000).unwrap();
        let cmd = Command::from_frame(&frame).unwrap();

        assert_eq!(cmd.axis, AxisId::AXIS_2);
        assert_eq!(cmd.action, Action::Move { steps: 10_000 });
    }

    #[test]
    fn test_decode_trapezoid_value() {
        assert_eq!(
            Action::decode(b'A', 0),
            Ok(Action::Trapezoid { enabled: false })
        );
        assert_eq!(
            Action::decode(b'A', 1),
            Ok(Action::Trapezoid { enabled: true })
        );
    }

    #[test]
    fn test_unknown_action() {
        let frame = CommandFrame::new(b'1', b'Z', 0).unwrap();
        assert_eq!(
            Command::from_frame(&frame),
            Err(CommandError::UnknownAction)
        );
    }

    #[test]
    fn test_command_to_frame() {
        let cmd = Command {
            axis: AxisId::AXIS_3,
            action: Action::Speed { rpm: 60 },
        };
        let frame = cmd.to_frame().unwrap();

        assert_eq!(frame.selector, b'3');
        assert_eq!(frame.action, b'V');
        assert_eq!(frame.value, 60);
        assert_eq!(Command::from_frame(&frame), Ok(cmd));
    }

    #[test]
    fn test_queries() {
        assert!(Action::QueryCurrent.is_query());
        assert!(Action::QueryRotation.is_query());
        assert!(!Action::Stop.is_query());
    }
}
