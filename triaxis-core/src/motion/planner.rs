//! Velocity profile planner
//!
//! Splits a bounded move into accelerate, cruise and decelerate phases,
//! measured in whole steps. If the move is too short to reach the
//! target speed the cruise phase disappears and the peak speed is
//! lowered to what the step budget allows.

use crate::config::MotionConfig;

/// Overall shape of a planned profile
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ProfileShape {
    /// Accelerate, cruise at target, decelerate
    Trapezoidal,
    /// Accelerate to a reduced peak, then decelerate
    Triangular,
}

/// Phase of a plan at a given step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PlanPhase {
    Accelerate,
    Cruise,
    Decelerate,
}

/// A planned bounded move
///
/// `accel_steps + cruise_steps + decel_steps == total_steps` always holds.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MotionPlan {
    pub total_steps: u32,
    pub steps_done: u32,
    pub accel_steps: u32,
    pub cruise_steps: u32,
    pub decel_steps: u32,
    pub peak_speed_sps: f32,
    pub shape: ProfileShape,
}

impl MotionPlan {
    /// Phase for the step about to be taken
    pub fn phase(&self) -> PlanPhase {
        if self.steps_done < self.accel_steps {
            PlanPhase::Accelerate
        } else if self.steps_done < self.accel_steps + self.cruise_steps {
            PlanPhase::Cruise
        } else {
            PlanPhase::Decelerate
        }
    }

    /// Record one completed step
    pub fn advance(&mut self) {
        if self.steps_done < self.total_steps {
            self.steps_done += 1;
        }
    }

    /// Whether every planned step has been taken
    pub fn is_complete(&self) -> bool {
        self.steps_done >= self.total_steps
    }
}

/// Stateless profile planner
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProfilePlanner {
    min_accel_sps2: f32,
}

impl ProfilePlanner {
    pub fn new(config: &MotionConfig) -> Self {
        Self {
            min_accel_sps2: config.min_accel_sps2,
        }
    }

    /// Plan a move of `total_steps` from `v0` through `v_target` to `v_end`
    ///
    /// Returns `None` for unbounded moves (`total_steps == 0`); those
    /// track the target speed directly.
    pub fn plan(
        &self,
        v0: f32,
        v_target: f32,
        v_end: f32,
        accel: f32,
        total_steps: u32,
    ) -> Option<MotionPlan> {
        if total_steps == 0 {
            return None;
        }

        let accel = {
            let magnitude = libm::fabsf(accel);
            if magnitude.is_nan() {
                self.min_accel_sps2
            } else {
                magnitude.max(self.min_accel_sps2)
            }
        };
        let two_a = 2.0 * accel;

        let accel_steps = round_steps((v_target * v_target - v0 * v0) / two_a);
        let decel_steps = round_steps((v_target * v_target - v_end * v_end) / two_a);

        if accel_steps as u64 + decel_steps as u64 <= total_steps as u64 {
            return Some(MotionPlan {
                total_steps,
                steps_done: 0,
                accel_steps,
                cruise_steps: total_steps - accel_steps - decel_steps,
                decel_steps,
                peak_speed_sps: v_target,
                shape: ProfileShape::Trapezoidal,
            });
        }

        // Too short to reach target: meet in the middle
        let peak = libm::sqrtf(accel * total_steps as f32 + (v0 * v0 + v_end * v_end) / 2.0)
            .max(v0)
            .min(v_target.max(v0));
        let accel_steps = round_steps((peak * peak - v0 * v0) / two_a).min(total_steps);

        Some(MotionPlan {
            total_steps,
            steps_done: 0,
            accel_steps,
            cruise_steps: 0,
            decel_steps: total_steps - accel_steps,
            peak_speed_sps: peak,
            shape: ProfileShape::Triangular,
        })
    }
}

/// Round a distance to whole steps, negative distances count as zero
fn round_steps(distance: f32) -> u32 {
    if !(distance > 0.0) {
        return 0;
    }
    // Saturating float-to-int cast
    libm::roundf(distance) as u32
}
