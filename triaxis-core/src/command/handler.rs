//! Serial command dispatcher
//!
//! Owns the frame parser and the per-axis timer, direction and enable
//! lines. All multi-field axis updates happen inside the registry lock
//! so the step interrupt never sees a half-applied command.

use embassy_sync::blocking_mutex::raw::RawMutex;
use triaxis_hal::{OutputPin, TimerChannel};
use triaxis_protocol::{
    Action, AxisId, Command, CommandError, CommandFrame, FrameError, FrameParser, ResponseFrame,
    ResponseLayout, AXIS_COUNT,
};

use crate::axis::{Axis, AxisRegistry, Direction};
use crate::config::MotionConfig;
use crate::motion::ProfilePlanner;
use crate::telemetry::TelemetryCache;

/// Hardware the handler drives for one axis
pub struct AxisIo<T, O> {
    /// Step timer (the step line itself belongs to the scheduler)
    pub timer: T,
    /// Direction line
    pub direction: O,
    /// Driver enable line, active low
    pub enable: O,
}

/// Result of a dispatched command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Dispatch {
    /// State changed, nothing to send
    Applied(Command),
    /// Reply frame to transmit
    Reply(ResponseFrame),
}

/// Reasons a frame or command was dropped
///
/// None of these produce a reply on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DispatchError {
    Frame(FrameError),
    Command(CommandError),
    /// Speed of zero requested; previous target kept
    InvalidSpeed,
}

impl From<FrameError> for DispatchError {
    fn from(e: FrameError) -> Self {
        DispatchError::Frame(e)
    }
}

impl From<CommandError> for DispatchError {
    fn from(e: CommandError) -> Self {
        DispatchError::Command(e)
    }
}

/// Protocol handler for all axes
pub struct CommandHandler<'a, M: RawMutex, T, O> {
    registry: &'a AxisRegistry<M>,
    telemetry: &'a TelemetryCache,
    motion: MotionConfig,
    planner: ProfilePlanner,
    io: [AxisIo<T, O>; AXIS_COUNT],
    parser: FrameParser,
}

impl<'a, M, T, O> CommandHandler<'a, M, T, O>
where
    M: RawMutex,
    T: TimerChannel,
    O: OutputPin,
{
    /// Apply the motion defaults and put every axis in its idle state
    ///
    /// Drivers start de-energised with the direction line forward.
    pub fn new(
        registry: &'a AxisRegistry<M>,
        telemetry: &'a TelemetryCache,
        motion: MotionConfig,
        mut io: [AxisIo<T, O>; AXIS_COUNT],
    ) -> Self {
        registry.configure(&motion);
        for (id, io) in AxisId::ALL.iter().zip(io.iter_mut()) {
            let axis = registry.snapshot(*id);
            io.timer.stop();
            io.direction.set_state(axis.direction.line_high());
            io.enable.set_state(!axis.excitation_enabled);
        }

        Self {
            registry,
            telemetry,
            motion,
            planner: ProfilePlanner::new(&motion),
            io,
            parser: FrameParser::new(),
        }
    }

    /// Feed one received byte
    ///
    /// Returns `Ok(None)` while a frame is still being accumulated.
    pub fn feed(&mut self, byte: u8) -> Result<Option<Dispatch>, DispatchError> {
        match self.parser.feed(byte)? {
            Some(frame) => self.handle_frame(&frame).map(Some),
            None => Ok(None),
        }
    }

    /// Interpret and execute a validated frame
    pub fn handle_frame(&mut self, frame: &CommandFrame) -> Result<Dispatch, DispatchError> {
        let command = Command::from_frame(frame)?;
        self.execute(command)
    }

    /// Execute a typed command
    pub fn execute(&mut self, command: Command) -> Result<Dispatch, DispatchError> {
        let id = command.axis;
        match command.action {
            Action::Move { steps } => self.start(id, steps),
            Action::Stop => self.stop(id),
            Action::Forward | Action::Reverse => {
                let reverse = matches!(command.action, Action::Reverse);
                self.set_direction(id, reverse)
            }
            Action::Speed { rpm } => self.set_speed(id, rpm)?,
            Action::Excite | Action::Release => {
                let on = matches!(command.action, Action::Excite);
                self.set_excitation(id, on)
            }
            Action::Trapezoid { enabled } => self.set_trapezoid(id, enabled),
            Action::QueryCurrent => {
                return Ok(Dispatch::Reply(ResponseFrame::new(
                    id.selector(),
                    self.telemetry.average_ma(id),
                    ResponseLayout::ChecksumThenEnd,
                )));
            }
            Action::QueryRotation => {
                return Ok(Dispatch::Reply(ResponseFrame::new(
                    id.selector(),
                    self.telemetry.rpm(id),
                    ResponseLayout::EndThenChecksum,
                )));
            }
        }
        Ok(Dispatch::Applied(command))
    }

    /// Axis state as seen by the command side
    pub fn axis(&self, id: AxisId) -> Axis {
        self.registry.snapshot(id)
    }

    /// Hardware for one axis
    pub fn io(&self, id: AxisId) -> &AxisIo<T, O> {
        &self.io[id.index()]
    }

    fn start(&mut self, id: AxisId, steps: u32) {
        let motion = &self.motion;
        let planner = &self.planner;
        let io = &mut self.io[id.index()];
        let pending = self.registry.pending(id);

        self.registry.with(id, |axis| {
            axis.enabled = true;
            axis.remaining_steps = steps;
            axis.plan = None;

            if axis.trapezoid_enabled {
                let v0 = motion.start_speed(axis.target_speed_sps);
                axis.current_speed_sps = v0;
                axis.acceleration_sps2 = motion.ramp_acceleration(v0, axis.target_speed_sps);
                if steps > 0 {
                    axis.plan = planner.plan(
                        v0,
                        axis.target_speed_sps,
                        v0,
                        axis.acceleration_sps2,
                        steps,
                    );
                }
                axis.step_interval_us = motion.half_period_us(v0);
            } else {
                axis.current_speed_sps = axis.target_speed_sps;
                axis.step_interval_us = motion.half_period_us(axis.target_speed_sps);
            }

            // The timer is restarted at the right interval, a queued
            // update would be stale
            pending.take();
            io.direction.set_state(axis.direction.line_high());
            io.timer.start(axis.step_interval_us);
        });
    }

    /// The step interrupt lowers the step line and stops the timer on
    /// its next compare once it sees the axis disabled
    fn stop(&mut self, id: AxisId) {
        let pending = self.registry.pending(id);
        self.registry.with(id, |axis| {
            axis.halt();
            pending.take();
        });
    }

    /// A running move keeps its direction; the line follows on next start
    fn set_direction(&mut self, id: AxisId, reverse: bool) {
        let io = &mut self.io[id.index()];
        self.registry.with(id, |axis| {
            axis.direction = if reverse {
                Direction::Reverse
            } else {
                Direction::Forward
            };
            if !axis.enabled {
                io.direction.set_state(axis.direction.line_high());
            }
        });
    }

    fn set_speed(&mut self, id: AxisId, rpm: u32) -> Result<(), DispatchError> {
        if rpm == 0 {
            return Err(DispatchError::InvalidSpeed);
        }
        let motion = &self.motion;
        let planner = &self.planner;
        let pending = self.registry.pending(id);
        let target = motion.rpm_to_sps(rpm);

        self.registry.with(id, |axis| {
            axis.target_speed_sps = target;
            if axis.trapezoid_enabled {
                retarget(motion, planner, axis);
            } else {
                let us = motion.half_period_us(target);
                if axis.enabled {
                    axis.current_speed_sps = target;
                    pending.request(us);
                } else {
                    axis.step_interval_us = us;
                }
            }
        });
        Ok(())
    }

    fn set_excitation(&mut self, id: AxisId, on: bool) {
        let io = &mut self.io[id.index()];
        self.registry.with(id, |axis| {
            axis.excitation_enabled = on;
            io.enable.set_state(!on);
        });
    }

    fn set_trapezoid(&mut self, id: AxisId, enabled: bool) {
        let motion = &self.motion;
        let planner = &self.planner;
        let pending = self.registry.pending(id);

        self.registry.with(id, |axis| {
            axis.trapezoid_enabled = enabled;
            if enabled {
                retarget(motion, planner, axis);
                return;
            }

            axis.plan = None;
            let us = motion.half_period_us(axis.target_speed_sps);
            if axis.enabled {
                axis.current_speed_sps = axis.target_speed_sps;
                pending.request(us);
            } else {
                axis.step_interval_us = us;
            }
        });
    }
}

/// Point a ramped axis at its current target
///
/// A running bounded move is re-planned over its remaining steps from
/// the current speed, so it still brakes down to the start speed.
fn retarget(motion: &MotionConfig, planner: &ProfilePlanner, axis: &mut Axis) {
    let current = axis.current_speed_sps;
    let target = axis.target_speed_sps;

    if axis.enabled && axis.is_bounded() {
        axis.acceleration_sps2 = motion.replan_acceleration(current, target);
        axis.plan = planner.plan(
            current,
            target,
            motion.start_speed(target),
            axis.acceleration_sps2,
            axis.remaining_steps,
        );
    } else {
        axis.acceleration_sps2 = motion.ramp_acceleration(current, target);
        axis.plan = None;
    }
}
