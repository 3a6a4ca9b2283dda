//! Motion planning
//!
//! Velocity profiles for bounded moves.

pub mod planner;

pub use planner::{MotionPlan, PlanPhase, ProfilePlanner, ProfileShape};
