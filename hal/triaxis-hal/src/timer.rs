//! Step timer abstraction
//!
//! Each axis owns one compare timer. Every compare match represents one
//! half-period of the step waveform; the scheduler runs once per match.

/// Per-axis compare timer
///
/// The period is always a half-period in microseconds.
pub trait TimerChannel {
    /// Start (or restart) the timer with a fresh phase
    ///
    /// The first compare match fires one `half_period_us` from now.
    fn start(&mut self, half_period_us: u32);

    /// Change the compare period without restarting the phase
    ///
    /// Takes effect from the next compare match onwards.
    fn set_period(&mut self, half_period_us: u32);

    /// Stop generating compare matches
    fn stop(&mut self);

    /// Currently programmed half-period in microseconds
    fn period_us(&self) -> u32;

    /// Whether compare matches are being generated
    fn is_running(&self) -> bool;
}

impl<T: TimerChannel + ?Sized> TimerChannel for &mut T {
    fn start(&mut self, half_period_us: u32) {
        T::start(self, half_period_us)
    }

    fn set_period(&mut self, half_period_us: u32) {
        T::set_period(self, half_period_us)
    }

    fn stop(&mut self) {
        T::stop(self)
    }

    fn period_us(&self) -> u32 {
        T::period_us(self)
    }

    fn is_running(&self) -> bool {
        T::is_running(self)
    }
}
