//! Axis state data

use crate::motion::MotionPlan;

/// Rotation direction as seen on the direction line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    /// Direction line low
    #[default]
    Forward,
    /// Direction line high
    Reverse,
}

impl Direction {
    /// Direction line level for this direction
    pub fn line_high(self) -> bool {
        matches!(self, Direction::Reverse)
    }
}

/// State of one motor channel
///
/// `remaining_steps == 0` while enabled means the move is unbounded.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Axis {
    /// Step generation active
    pub enabled: bool,
    /// Direction for the current or next move
    pub direction: Direction,
    /// Full steps left in a bounded move
    pub remaining_steps: u32,
    /// Half-period the axis timer runs at (µs)
    pub step_interval_us: u32,
    /// Instantaneous speed (steps/s)
    pub current_speed_sps: f32,
    /// Requested steady-state speed (steps/s)
    pub target_speed_sps: f32,
    /// Signed ramp acceleration (steps/s²)
    pub acceleration_sps2: f32,
    /// Ramp speed changes instead of applying them at once
    pub trapezoid_enabled: bool,
    /// Driver energised
    pub excitation_enabled: bool,
    /// Profile for a bounded ramped move
    pub plan: Option<MotionPlan>,
}

impl Default for Axis {
    fn default() -> Self {
        Self::IDLE
    }
}

impl Axis {
    /// Power-on state, before configuration is applied
    pub const IDLE: Axis = Axis {
        enabled: false,
        direction: Direction::Forward,
        remaining_steps: 0,
        step_interval_us: 0,
        current_speed_sps: 0.0,
        target_speed_sps: 0.0,
        acceleration_sps2: 0.0,
        trapezoid_enabled: true,
        excitation_enabled: false,
        plan: None,
    };

    /// Whether the active move has a step budget
    pub fn is_bounded(&self) -> bool {
        self.remaining_steps > 0
    }

    /// Halt step generation and forget the current move
    pub fn halt(&mut self) {
        self.enabled = false;
        self.remaining_steps = 0;
        self.current_speed_sps = 0.0;
        self.plan = None;
    }
}
