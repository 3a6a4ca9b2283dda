//! Lock-free telemetry cache

use portable_atomic::{AtomicI32, Ordering};
use triaxis_protocol::{AxisId, AXIS_COUNT};

/// Latest published per-axis readings
///
/// The sampling tick writes averages, the rotation measurement writes
/// RPM, and the command handler reads both when answering queries.
#[derive(Debug)]
pub struct TelemetryCache {
    average_ma: [AtomicI32; AXIS_COUNT],
    rpm: [AtomicI32; AXIS_COUNT],
}

impl Default for TelemetryCache {
    fn default() -> Self {
        Self::new()
    }
}

impl TelemetryCache {
    pub const fn new() -> Self {
        Self {
            average_ma: [AtomicI32::new(0), AtomicI32::new(0), AtomicI32::new(0)],
            rpm: [AtomicI32::new(0), AtomicI32::new(0), AtomicI32::new(0)],
        }
    }

    pub fn publish_average(&self, axis: AxisId, milliamps: i32) {
        self.average_ma[axis.index()].store(milliamps, Ordering::Release);
    }

    /// Last published rolling-average current (mA)
    pub fn average_ma(&self, axis: AxisId) -> i32 {
        self.average_ma[axis.index()].load(Ordering::Acquire)
    }

    pub fn publish_rpm(&self, axis: AxisId, rpm: i32) {
        self.rpm[axis.index()].store(rpm, Ordering::Release);
    }

    /// Last published rotation speed
    pub fn rpm(&self, axis: AxisId) -> i32 {
        self.rpm[axis.index()].load(Ordering::Acquire)
    }
}
