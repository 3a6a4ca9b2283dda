//! Host-side doubles for the hardware traits

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use triaxis_hal::{AdcError, AnalogInput, InputPin, OutputPin, TimerChannel};

use crate::axis::AxisRegistry;

/// Registry locked with the host `critical-section` implementation
pub type SimRegistry = AxisRegistry<CriticalSectionRawMutex>;

/// Digital line that counts rising edges
#[derive(Debug, Default, Clone, Copy)]
pub struct SimPin {
    high: bool,
    rising_edges: u32,
}

impl SimPin {
    pub fn low() -> Self {
        Self::default()
    }

    pub fn high() -> Self {
        Self {
            high: true,
            rising_edges: 0,
        }
    }

    pub fn rising_edges(&self) -> u32 {
        self.rising_edges
    }
}

impl OutputPin for SimPin {
    fn set_high(&mut self) {
        if !self.high {
            self.rising_edges += 1;
        }
        self.high = true;
    }

    fn set_low(&mut self) {
        self.high = false;
    }

    fn is_set_high(&self) -> bool {
        self.high
    }
}

impl InputPin for SimPin {
    fn is_high(&self) -> bool {
        self.high
    }
}

/// Timer that records how it was driven
#[derive(Debug, Default, Clone, Copy)]
pub struct SimTimer {
    period_us: u32,
    running: bool,
    starts: u32,
}

impl SimTimer {
    pub fn stopped() -> Self {
        Self::default()
    }

    pub fn running(period_us: u32) -> Self {
        Self {
            period_us,
            running: true,
            starts: 1,
        }
    }

    /// Number of `start` calls, counting the one implied by `running`
    pub fn starts(&self) -> u32 {
        self.starts
    }
}

impl TimerChannel for SimTimer {
    fn start(&mut self, half_period_us: u32) {
        self.period_us = half_period_us;
        self.running = true;
        self.starts += 1;
    }

    fn set_period(&mut self, half_period_us: u32) {
        self.period_us = half_period_us;
    }

    fn stop(&mut self) {
        self.running = false;
    }

    fn period_us(&self) -> u32 {
        self.period_us
    }

    fn is_running(&self) -> bool {
        self.running
    }
}

/// Three-channel ADC with fixed readings
#[derive(Debug, Clone, Copy)]
pub struct SimAdc {
    raw: [u16; 3],
    reads: usize,
    fail_next: bool,
}

impl SimAdc {
    pub fn new(raw: [u16; 3]) -> Self {
        Self {
            raw,
            reads: 0,
            fail_next: false,
        }
    }

    pub fn set_raw(&mut self, channel: usize, raw: u16) {
        self.raw[channel] = raw;
    }

    pub fn fail_next(&mut self) {
        self.fail_next = true;
    }

    pub fn reads(&self) -> usize {
        self.reads
    }
}

impl AnalogInput for SimAdc {
    fn read_raw(&mut self, channel: usize) -> Result<u16, AdcError> {
        if core::mem::take(&mut self.fail_next) {
            return Err(AdcError::ConversionFailed);
        }
        let raw = *self.raw.get(channel).ok_or(AdcError::InvalidChannel)?;
        self.reads += 1;
        Ok(raw)
    }
}
