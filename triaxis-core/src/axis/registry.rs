//! Shared axis table
//!
//! One slot per axis. Multi-field updates go through [`AxisRegistry::with`],
//! which holds the raw mutex `M` only for the duration of the closure.
//! The firmware picks an `M` that masks the step executor alone, so the
//! step path never blocks unrelated interrupts. Interval changes requested
//! from thread context go through the lock-free [`PendingInterval`]
//! handshake instead and are applied by the scheduler at the next rising
//! step edge.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex;
use portable_atomic::{AtomicU32, Ordering};
use triaxis_protocol::{AxisId, AXIS_COUNT};

use super::state::Axis;
use crate::config::MotionConfig;

/// Interval change waiting for the next rising edge
///
/// Zero means nothing is queued; a later request replaces an earlier one.
#[derive(Debug)]
pub struct PendingInterval(AtomicU32);

impl Default for PendingInterval {
    fn default() -> Self {
        Self::new()
    }
}

impl PendingInterval {
    pub const fn new() -> Self {
        Self(AtomicU32::new(0))
    }

    /// Queue a half-period for the next rising edge
    pub fn request(&self, half_period_us: u32) {
        self.0.store(half_period_us.max(1), Ordering::Release);
    }

    /// Take the queued half-period, if any
    pub fn take(&self) -> Option<u32> {
        match self.0.swap(0, Ordering::AcqRel) {
            0 => None,
            us => Some(us),
        }
    }

    /// Look at the queued half-period without consuming it
    pub fn peek(&self) -> Option<u32> {
        match self.0.load(Ordering::Acquire) {
            0 => None,
            us => Some(us),
        }
    }
}

struct AxisSlot<M: RawMutex> {
    state: Mutex<M, RefCell<Axis>>,
    pending: PendingInterval,
}

impl<M: RawMutex> AxisSlot<M> {
    const fn new() -> Self {
        Self {
            state: Mutex::const_new(M::INIT, RefCell::new(Axis::IDLE)),
            pending: PendingInterval::new(),
        }
    }
}

/// Process-wide axis table
pub struct AxisRegistry<M: RawMutex> {
    slots: [AxisSlot<M>; AXIS_COUNT],
}

impl<M: RawMutex> Default for AxisRegistry<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: RawMutex> AxisRegistry<M> {
    /// Create a registry with every axis idle
    pub const fn new() -> Self {
        Self {
            slots: [AxisSlot::new(), AxisSlot::new(), AxisSlot::new()],
        }
    }

    /// Apply boot configuration to every axis
    pub fn configure(&self, motion: &MotionConfig) {
        let target = motion.rpm_to_sps(motion.default_rpm);
        for id in AxisId::ALL {
            self.with(id, |axis| {
                *axis = Axis {
                    target_speed_sps: target,
                    step_interval_us: motion.half_period_us(target),
                    trapezoid_enabled: motion.trapezoid_default,
                    ..Axis::IDLE
                };
            });
            self.pending(id).take();
        }
    }

    /// Run `f` with exclusive access to one axis
    ///
    /// `M` is held while `f` runs; keep it short and never call back
    /// into the registry from inside it.
    pub fn with<R>(&self, id: AxisId, f: impl FnOnce(&mut Axis) -> R) -> R {
        self.slots[id.index()]
            .state
            .lock(|axis| f(&mut axis.borrow_mut()))
    }

    /// Consistent copy of one axis
    pub fn snapshot(&self, id: AxisId) -> Axis {
        self.slots[id.index()].state.lock(|axis| *axis.borrow())
    }

    /// Pending-interval handshake for one axis
    pub fn pending(&self, id: AxisId) -> &PendingInterval {
        &self.slots[id.index()].pending
    }
}
