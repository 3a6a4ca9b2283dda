//! Current sampling and rolling average
//!
//! Samples go into a fixed window per axis. The mean is recomputed on
//! its own slower cadence so neither the sampling path nor the query
//! path does the division.

use heapless::HistoryBuffer;
use triaxis_hal::{AdcError, AnalogInput};
use triaxis_protocol::{AxisId, AXIS_COUNT};

use super::cache::TelemetryCache;
use crate::config::{CurrentSensorConfig, TelemetryConfig};

/// Samples kept per axis
pub const CURRENT_WINDOW: usize = 50;

/// Ring buffer of milliamp samples for one axis
#[derive(Clone)]
pub struct CurrentChannel {
    samples: HistoryBuffer<i32, CURRENT_WINDOW>,
    average_ma: i32,
}

impl Default for CurrentChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl CurrentChannel {
    pub const fn new() -> Self {
        Self {
            samples: HistoryBuffer::new(),
            average_ma: 0,
        }
    }

    /// Store a sample, overwriting the oldest once full
    pub fn push(&mut self, milliamps: i32) {
        self.samples.write(milliamps);
    }

    /// Valid samples held
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.len() == 0
    }

    /// Whether the window has wrapped at least once
    pub fn is_full(&self) -> bool {
        self.samples.len() == self.samples.capacity()
    }

    /// Recompute the cached mean over the valid samples
    ///
    /// Rounds to nearest; zero with no samples.
    pub fn recompute_average(&mut self) -> i32 {
        let count = self.samples.len() as i64;
        self.average_ma = if count == 0 {
            0
        } else {
            let sum: i64 = self.samples.as_slice().iter().map(|&s| s as i64).sum();
            let half = if sum < 0 { -count / 2 } else { count / 2 };
            ((sum + half) / count) as i32
        };
        self.average_ma
    }

    /// Mean from the last recomputation
    pub fn average_ma(&self) -> i32 {
        self.average_ma
    }
}

/// Sampling and averaging schedule for all axes
#[derive(Clone)]
pub struct CurrentTelemetry {
    sensor: CurrentSensorConfig,
    cadence: TelemetryConfig,
    channels: [CurrentChannel; AXIS_COUNT],
    last_sample_us: Option<u64>,
    last_average_us: u64,
}

impl CurrentTelemetry {
    pub fn new(sensor: CurrentSensorConfig, cadence: TelemetryConfig) -> Self {
        Self {
            sensor,
            cadence,
            channels: [CurrentChannel::new(), CurrentChannel::new(), CurrentChannel::new()],
            last_sample_us: None,
            last_average_us: 0,
        }
    }

    pub fn channel(&self, axis: AxisId) -> &CurrentChannel {
        &self.channels[axis.index()]
    }

    /// Periodic tick
    ///
    /// Samples every axis once `sample_interval_us` of wall-clock time
    /// has passed and publishes fresh averages every
    /// `average_interval_us`. Independent of step rate or motion state.
    pub fn on_tick<A: AnalogInput>(
        &mut self,
        now_us: u64,
        adc: &mut A,
        cache: &TelemetryCache,
    ) -> Result<(), AdcError> {
        let sample_due = match self.last_sample_us {
            None => {
                self.last_average_us = now_us;
                true
            }
            Some(last) => now_us.wrapping_sub(last) >= self.cadence.sample_interval_us as u64,
        };
        if sample_due {
            self.last_sample_us = Some(now_us);
            self.sample(adc)?;
        }

        if now_us.wrapping_sub(self.last_average_us) >= self.cadence.average_interval_us as u64 {
            self.last_average_us = now_us;
            for (axis, channel) in AxisId::ALL.iter().zip(self.channels.iter_mut()) {
                cache.publish_average(*axis, channel.recompute_average());
            }
        }
        Ok(())
    }

    /// Read every axis and store the converted samples
    pub fn sample<A: AnalogInput>(&mut self, adc: &mut A) -> Result<(), AdcError> {
        for (index, channel) in self.channels.iter_mut().enumerate() {
            let raw = adc.read_raw(index)?;
            channel.push(self.sensor.raw_to_milliamps(raw));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::SimAdc;
    use proptest::prelude::*;

    #[test]
    fn test_empty_average_is_zero() {
        let mut channel = CurrentChannel::new();
        assert!(channel.is_empty());
        assert_eq!(channel.recompute_average(), 0);
    }

    #[test]
    fn test_exact_mean_of_full_window() {
        let mut channel = CurrentChannel::new();
        for i in 0..50 {
            channel.push(i * 10);
        }
        assert!(channel.is_full());
        // 10 * (0 + 1 + ... + 49) / 50 = 245
        assert_eq!(channel.recompute_average(), 245);
        assert_eq!(channel.average_ma(), 245);
    }

    #[test]
    fn test_overflow_drops_oldest() {
        let mut channel = CurrentChannel::new();
        for i in 0..50 {
            channel.push(i * 10);
        }
        channel.push(1000);
        assert_eq!(channel.len(), 50);
        // Oldest sample (0) replaced: (12250 - 0 + 1000) / 50 = 265
        assert_eq!(channel.recompute_average(), 265);
    }

    #[test]
    fn test_partial_window_mean() {
        let mut channel = CurrentChannel::new();
        channel.push(100);
        channel.push(201);
        assert!(!channel.is_full());
        assert_eq!(channel.recompute_average(), 151);
    }

    #[test]
    fn test_negative_mean_rounds_to_nearest() {
        let mut channel = CurrentChannel::new();
        channel.push(-100);
        channel.push(-201);
        assert_eq!(channel.recompute_average(), -151);
    }

    #[test]
    fn test_average_not_recomputed_on_push() {
        let mut channel = CurrentChannel::new();
        channel.push(500);
        assert_eq!(channel.average_ma(), 0);
    }

    #[test]
    fn test_tick_cadence() {
        let mut telemetry = CurrentTelemetry::new(
            CurrentSensorConfig::default(),
            TelemetryConfig::default(),
        );
        let cache = TelemetryCache::new();
        // Midscale (2048) is 1.65 V, zero current
        let mut adc = SimAdc::new([2048, 2048, 2048]);

        // 1 ms ticks for 99 ms: one sample every 2 ms, nothing published yet
        for ms in 0..100u64 {
            telemetry.on_tick(ms * 1_000, &mut adc, &cache).unwrap();
        }
        assert_eq!(adc.reads(), 50 * 3);
        assert_eq!(telemetry.channel(AxisId::AXIS_1).len(), 50);
        assert_eq!(cache.average_ma(AxisId::AXIS_1), 0);

        adc.set_raw(0, 2560);
        for ms in 100..=200u64 {
            telemetry.on_tick(ms * 1_000, &mut adc, &cache).unwrap();
        }
        let expected = CurrentSensorConfig::default().raw_to_milliamps(2560);
        assert_eq!(cache.average_ma(AxisId::AXIS_1), expected);
        assert_eq!(cache.average_ma(AxisId::AXIS_2), 0);
    }

    #[test]
    fn test_adc_error_propagates() {
        let mut telemetry = CurrentTelemetry::new(
            CurrentSensorConfig::default(),
            TelemetryConfig::default(),
        );
        let cache = TelemetryCache::new();
        let mut adc = SimAdc::new([2048; 3]);
        adc.fail_next();

        assert_eq!(
            telemetry.on_tick(0, &mut adc, &cache),
            Err(AdcError::ConversionFailed)
        );
    }

    proptest! {
        #[test]
        fn mean_within_sample_bounds(samples in prop::collection::vec(-50_000i32..50_000, 1..120)) {
            let mut channel = CurrentChannel::new();
            for &s in &samples {
                channel.push(s);
            }
            let window = &samples[samples.len().saturating_sub(CURRENT_WINDOW)..];
            let min = *window.iter().min().unwrap();
            let max = *window.iter().max().unwrap();
            let mean = channel.recompute_average();
            prop_assert!(mean >= min && mean <= max);
        }
    }
}
