//! Interrupt-driven step generation
//!
//! Every compare match is one half-period: the step line is toggled and,
//! on the rising edge, one full step is accounted. With trapezoid ramping
//! on, the speed is re-evaluated every half-period and the timer period
//! is adjusted in place, without restarting the timer.

use embassy_sync::blocking_mutex::raw::RawMutex;
use triaxis_hal::{OutputPin, TimerChannel};
use triaxis_protocol::AxisId;

use crate::axis::{Axis, AxisRegistry, PendingInterval};
use crate::config::MotionConfig;
use crate::motion::PlanPhase;

/// What a compare match did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StepEvent {
    /// Axis disabled; line returned low and timer stopped
    Idle,
    /// Falling edge
    Low,
    /// Rising edge, one step taken
    Step,
    /// Rising edge that used up the step budget; axis disabled
    Finished,
}

/// Per-axis step scheduler
#[derive(Debug, Clone, Copy)]
pub struct StepScheduler {
    motion: MotionConfig,
}

impl StepScheduler {
    pub fn new(motion: MotionConfig) -> Self {
        Self { motion }
    }

    /// Compare-match entry point for one axis
    pub fn on_compare<M, T, P>(
        &self,
        registry: &AxisRegistry<M>,
        id: AxisId,
        timer: &mut T,
        step_pin: &mut P,
    ) -> StepEvent
    where
        M: RawMutex,
        T: TimerChannel,
        P: OutputPin,
    {
        let pending = registry.pending(id);
        registry.with(id, |axis| self.advance(axis, pending, timer, step_pin))
    }

    /// Advance one axis by one half-period
    pub fn advance<T, P>(
        &self,
        axis: &mut Axis,
        pending: &PendingInterval,
        timer: &mut T,
        step_pin: &mut P,
    ) -> StepEvent
    where
        T: TimerChannel,
        P: OutputPin,
    {
        if !axis.enabled {
            // Finish the last pulse cleanly and go quiet
            step_pin.set_low();
            timer.stop();
            return StepEvent::Idle;
        }

        step_pin.toggle();
        if !step_pin.is_set_high() {
            if axis.trapezoid_enabled {
                self.update_speed(axis, timer);
            }
            return StepEvent::Low;
        }

        if let Some(plan) = axis.plan.as_mut() {
            plan.advance();
        }

        if axis.remaining_steps > 0 {
            axis.remaining_steps -= 1;
            if axis.remaining_steps == 0 {
                // Timer keeps running for one more half-period so the
                // final pulse gets its full width
                axis.enabled = false;
                axis.current_speed_sps = 0.0;
                axis.plan = None;
                return StepEvent::Finished;
            }
        }

        if let Some(us) = pending.take() {
            axis.step_interval_us = us;
            timer.set_period(us);
        }

        if axis.trapezoid_enabled {
            self.update_speed(axis, timer);
        }
        StepEvent::Step
    }

    /// Recompute speed for the next half-period and reprogram if changed
    fn update_speed<T: TimerChannel>(&self, axis: &mut Axis, timer: &mut T) {
        let dt = axis.step_interval_us as f32 * 1.0e-6;
        let accel = self.motion.accel_magnitude(axis.acceleration_sps2);
        let dv = accel * dt;
        let floor = self.motion.start_speed(axis.target_speed_sps);
        let current = axis.current_speed_sps;

        axis.current_speed_sps = if !axis.is_bounded() {
            ramp_toward(current, axis.target_speed_sps, dv)
        } else if let Some(plan) = axis.plan.as_ref() {
            match plan.phase() {
                PlanPhase::Accelerate => (current + dv).min(plan.peak_speed_sps),
                // Reached at once after a normal ramp; a re-planned
                // slowdown glides down to it
                PlanPhase::Cruise => ramp_toward(current, plan.peak_speed_sps, dv),
                PlanPhase::Decelerate => (current - dv).max(floor),
            }
        } else {
            // No plan: brake once the stopping distance covers what is left
            let stopping_steps = current * current / (2.0 * accel);
            if axis.remaining_steps as f32 <= stopping_steps {
                (current - dv).max(floor)
            } else {
                ramp_toward(current, axis.target_speed_sps, dv)
            }
        };

        let us = self.motion.half_period_us(axis.current_speed_sps);
        if us != axis.step_interval_us {
            axis.step_interval_us = us;
            timer.set_period(us);
        }
    }
}

/// Move `current` toward `target` by at most `dv`
fn ramp_toward(current: f32, target: f32, dv: f32) -> f32 {
    if current < target {
        (current + dv).min(target)
    } else {
        (current - dv).max(target)
    }
}
