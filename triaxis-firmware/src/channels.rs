//! Shared state between executors
//!
//! Everything here is a plain static: axis state behind a lock that
//! masks only the step executor, timers and telemetry behind atomics.
//! Tasks at every priority reach them without passing references
//! around.

use embassy_rp::interrupt::typelevel::SWI_IRQ_1;
use triaxis_core::axis::AxisRegistry;
use triaxis_core::safety::LeakFlags;
use triaxis_core::telemetry::TelemetryCache;
use triaxis_hal_rp2040::{IrqMaskRawMutex, StepTimer};
use triaxis_protocol::AXIS_COUNT;

/// Excludes the step executor (SWI_IRQ_1) and nothing else
///
/// Only the serial task (thread mode) and the step tasks touch `AXES`.
pub type StepLock = IrqMaskRawMutex<SWI_IRQ_1>;

/// Axis state, written by the serial task and the step tasks
pub static AXES: AxisRegistry<StepLock> = AxisRegistry::new();

/// Per-axis compare timers
pub static STEP_TIMERS: [StepTimer; AXIS_COUNT] =
    [StepTimer::new(), StepTimer::new(), StepTimer::new()];

/// Averaged current and rotation speed per axis
pub static TELEMETRY: TelemetryCache = TelemetryCache::new();

/// Debounced leak sensor mask
pub static LEAK_FLAGS: LeakFlags = LeakFlags::new();
