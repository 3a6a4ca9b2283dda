//! Software compare timer
//!
//! Each axis gets one `StepTimer` shared between the command side and
//! the step task running on the interrupt-priority executor. The timer
//! itself is a set of atomics plus a wake signal. The step task calls
//! [`StepTimer::next_compare`] in a loop and runs the scheduler once per
//! expiry, which gives the same contract as a hardware compare channel:
//! `start` re-arms from now, `set_period` takes effect from the next
//! expiry, `stop` cancels.

use embassy_futures::select::{select, Either};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use embassy_time::{Duration, Instant, Timer};
use portable_atomic::{AtomicBool, AtomicU32, Ordering};
use triaxis_hal::TimerChannel;

pub struct StepTimer {
    period_us: AtomicU32,
    running: AtomicBool,
    /// Raised by `start` and `stop` so a waiting step task re-anchors
    rearm: Signal<CriticalSectionRawMutex, ()>,
}

impl Default for StepTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl StepTimer {
    pub const fn new() -> Self {
        Self {
            period_us: AtomicU32::new(0),
            running: AtomicBool::new(false),
            rearm: Signal::new(),
        }
    }

    /// Wait for the next compare match
    ///
    /// `anchor` is owned by the caller and holds the time of the last
    /// expiry. Expiries are scheduled from the previous deadline rather
    /// than from wake-up time so the pulse train does not drift.
    pub async fn next_compare(&self, anchor: &mut Option<Instant>) {
        loop {
            if !self.running.load(Ordering::Acquire) {
                *anchor = None;
                self.rearm.wait().await;
                continue;
            }

            let base = *anchor.get_or_insert_with(Instant::now);
            let period = self.period_us.load(Ordering::Acquire).max(1);
            let deadline = base + Duration::from_micros(period as u64);

            match select(Timer::at(deadline), self.rearm.wait()).await {
                Either::First(()) => {
                    *anchor = Some(deadline);
                    return;
                }
                Either::Second(()) => *anchor = None,
            }
        }
    }
}

impl TimerChannel for &StepTimer {
    fn start(&mut self, half_period_us: u32) {
        self.period_us.store(half_period_us.max(1), Ordering::Release);
        self.running.store(true, Ordering::Release);
        self.rearm.signal(());
    }

    fn set_period(&mut self, half_period_us: u32) {
        self.period_us.store(half_period_us.max(1), Ordering::Release);
    }

    fn stop(&mut self) {
        self.running.store(false, Ordering::Release);
        self.rearm.signal(());
    }

    fn period_us(&self) -> u32 {
        self.period_us.load(Ordering::Acquire)
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }
}
