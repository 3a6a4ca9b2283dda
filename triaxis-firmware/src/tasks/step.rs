//! Per-axis step generation
//!
//! One task instance per axis, all on the highest-priority executor.
//! Nothing here logs: a defmt write at this priority would stretch the
//! pulse timing of every axis.

use embassy_time::Instant;

use triaxis_core::scheduler::StepScheduler;
use triaxis_hal_rp2040::{RpOutput, StepTimer};
use triaxis_protocol::AxisId;

use crate::channels::AXES;

#[embassy_executor::task(pool_size = 3)]
pub async fn step_task(
    axis: AxisId,
    timer: &'static StepTimer,
    mut step_pin: RpOutput<'static>,
    scheduler: StepScheduler,
) {
    let mut channel = timer;
    let mut anchor: Option<Instant> = None;

    loop {
        timer.next_compare(&mut anchor).await;
        scheduler.on_compare(&AXES, axis, &mut channel, &mut step_pin);
    }
}
