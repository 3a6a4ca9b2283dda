//! Configuration type definitions
//!
//! Defaults match the reference board: 200-step motors at 16x
//! microstepping, ACS712-5A current sensors on a 12-bit 3.3 V ADC, and
//! active-low leak probes with pull-ups.

/// Errors found by configuration validation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Steps per revolution must be non-zero
    InvalidStepsPerRev,
    /// Start speed must be positive and finite
    InvalidStartSpeed,
    /// Ramp time must be positive and finite
    InvalidRampTime,
    /// Minimum acceleration must be positive and finite
    InvalidAcceleration,
    /// Half-period bounds must satisfy `0 < min <= max`
    InvalidIntervalRange,
    /// Sensor sensitivity must be non-zero and finite
    InvalidSensitivity,
    /// ADC resolution must be non-zero
    InvalidAdcResolution,
    /// Telemetry intervals must be non-zero and ordered
    InvalidTelemetryInterval,
    /// Leak debounce and poll interval must be non-zero
    InvalidLeakTiming,
}

/// Motion and timing parameters
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MotionConfig {
    /// Microsteps per output revolution
    pub steps_per_rev: u32,
    /// Speed a ramped move starts from and decelerates to (steps/s)
    pub min_start_speed_sps: f32,
    /// Time allowed to reach a new target speed (seconds)
    pub ramp_time_s: f32,
    /// Floor applied to acceleration magnitudes (steps/s²)
    pub min_accel_sps2: f32,
    /// Target speed each axis boots with (RPM)
    pub default_rpm: u32,
    /// Whether trapezoid ramping is on at boot
    pub trapezoid_default: bool,
    /// Shortest half-period the timers are programmed with (µs)
    pub min_half_period_us: u32,
    /// Longest half-period the timers are programmed with (µs)
    pub max_half_period_us: u32,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            steps_per_rev: 200 * 16,
            min_start_speed_sps: 500.0,
            ramp_time_s: 0.2,
            min_accel_sps2: 1.0,
            default_rpm: 60,
            trapezoid_default: true,
            min_half_period_us: 20,
            max_half_period_us: 1_000_000,
        }
    }
}

impl MotionConfig {
    /// Convert a shaft speed in RPM to steps per second
    pub fn rpm_to_sps(&self, rpm: u32) -> f32 {
        rpm as f32 * self.steps_per_rev as f32 / 60.0
    }

    /// Convert a step rate to a timer half-period in microseconds
    ///
    /// Non-positive speeds map to the longest half-period.
    pub fn half_period_us(&self, speed_sps: f32) -> u32 {
        if !(speed_sps > 0.0) {
            return self.max_half_period_us;
        }
        let us = libm::roundf(500_000.0 / speed_sps);
        (us as u32).clamp(self.min_half_period_us, self.max_half_period_us)
    }

    /// Speed a ramped move starts from when heading for `target_sps`
    pub fn start_speed(&self, target_sps: f32) -> f32 {
        self.min_start_speed_sps.min(target_sps)
    }

    /// Acceleration that reaches `to` from `from` in one ramp time
    pub fn ramp_acceleration(&self, from_sps: f32, to_sps: f32) -> f32 {
        (to_sps - from_sps) / self.ramp_time_s
    }

    /// Acceleration for re-planning a move already running at `from_sps`
    ///
    /// Never gentler than the ramp a fresh move toward `to_sps` starts
    /// with, so a target that barely changes still leaves a usable
    /// braking ramp at the end of the move.
    pub fn replan_acceleration(&self, from_sps: f32, to_sps: f32) -> f32 {
        let ramp = self.ramp_acceleration(from_sps, to_sps);
        let start = self.ramp_acceleration(self.start_speed(to_sps), to_sps);
        if libm::fabsf(ramp) >= start {
            ramp
        } else if ramp < 0.0 {
            -start
        } else {
            start
        }
    }

    /// Usable magnitude of a signed acceleration
    pub fn accel_magnitude(&self, accel_sps2: f32) -> f32 {
        let magnitude = libm::fabsf(accel_sps2);
        if magnitude.is_nan() {
            return self.min_accel_sps2;
        }
        magnitude.max(self.min_accel_sps2)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.steps_per_rev == 0 {
            return Err(ConfigError::InvalidStepsPerRev);
        }
        if !(self.min_start_speed_sps > 0.0) || !self.min_start_speed_sps.is_finite() {
            return Err(ConfigError::InvalidStartSpeed);
        }
        if !(self.ramp_time_s > 0.0) || !self.ramp_time_s.is_finite() {
            return Err(ConfigError::InvalidRampTime);
        }
        if !(self.min_accel_sps2 > 0.0) || !self.min_accel_sps2.is_finite() {
            return Err(ConfigError::InvalidAcceleration);
        }
        if self.min_half_period_us == 0 || self.min_half_period_us > self.max_half_period_us {
            return Err(ConfigError::InvalidIntervalRange);
        }
        Ok(())
    }
}

/// Analog current sensor transfer function
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CurrentSensorConfig {
    /// ADC reference voltage (V)
    pub vref_v: f32,
    /// ADC full-scale count (4096 for 12-bit)
    pub adc_resolution: u32,
    /// Sensor output at zero current (V)
    pub zero_offset_v: f32,
    /// Sensor output change per ampere (V/A)
    pub sensitivity_v_per_a: f32,
}

impl Default for CurrentSensorConfig {
    fn default() -> Self {
        Self {
            vref_v: 3.3,
            adc_resolution: 4096,
            zero_offset_v: 1.65,
            sensitivity_v_per_a: 0.185,
        }
    }
}

impl CurrentSensorConfig {
    /// Convert a raw conversion to milliamps
    pub fn raw_to_milliamps(&self, raw: u16) -> i32 {
        let volts = raw as f32 * self.vref_v / self.adc_resolution as f32;
        let amps = (volts - self.zero_offset_v) / self.sensitivity_v_per_a;
        libm::roundf(amps * 1000.0) as i32
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.adc_resolution == 0 {
            return Err(ConfigError::InvalidAdcResolution);
        }
        if self.sensitivity_v_per_a == 0.0 || !self.sensitivity_v_per_a.is_finite() {
            return Err(ConfigError::InvalidSensitivity);
        }
        Ok(())
    }
}

/// Telemetry cadence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TelemetryConfig {
    /// Time between current samples (µs)
    pub sample_interval_us: u32,
    /// Time between rolling-average recomputations (µs)
    pub average_interval_us: u32,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            sample_interval_us: 2_000,
            average_interval_us: 100_000,
        }
    }
}

impl TelemetryConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sample_interval_us == 0 || self.average_interval_us < self.sample_interval_us {
            return Err(ConfigError::InvalidTelemetryInterval);
        }
        Ok(())
    }
}

/// Leak sensor polling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LeakConfig {
    /// Time between polls (ms)
    pub poll_interval_ms: u32,
    /// Consecutive active polls before a leak is reported
    pub debounce_samples: u8,
}

impl Default for LeakConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 10,
            debounce_samples: 5,
        }
    }
}

impl LeakConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.poll_interval_ms == 0 || self.debounce_samples == 0 {
            return Err(ConfigError::InvalidLeakTiming);
        }
        Ok(())
    }
}

/// Complete controller configuration
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ControllerConfig {
    pub motion: MotionConfig,
    pub current: CurrentSensorConfig,
    pub telemetry: TelemetryConfig,
    pub leak: LeakConfig,
}

impl ControllerConfig {
    /// Validate every section, returning the first problem found
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.motion.validate()?;
        self.current.validate()?;
        self.telemetry.validate()?;
        self.leak.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert_eq!(ControllerConfig::default().validate(), Ok(()));
    }

    #[test]
    fn test_rpm_conversion() {
        let motion = MotionConfig {
            steps_per_rev: 1000,
            ..Default::default()
        };
        assert_eq!(motion.rpm_to_sps(60), 1000.0);
    }

    #[test]
    fn test_half_period() {
        let motion = MotionConfig::default();
        assert_eq!(motion.half_period_us(1000.0), 500);
        assert_eq!(motion.half_period_us(500.0), 1000);
        // Clamped at both ends
        assert_eq!(motion.half_period_us(1.0e9), motion.min_half_period_us);
        assert_eq!(motion.half_period_us(0.0), motion.max_half_period_us);
        assert_eq!(motion.half_period_us(-5.0), motion.max_half_period_us);
    }

    #[test]
    fn test_accel_floor() {
        let motion = MotionConfig::default();
        assert_eq!(motion.accel_magnitude(-2500.0), 2500.0);
        assert_eq!(motion.accel_magnitude(0.0), motion.min_accel_sps2);
        assert_eq!(motion.accel_magnitude(f32::NAN), motion.min_accel_sps2);
    }

    #[test]
    fn test_ramp_acceleration() {
        let motion = MotionConfig::default();
        assert_eq!(motion.ramp_acceleration(500.0, 1000.0), 2500.0);
        assert!(motion.ramp_acceleration(1000.0, 500.0) < 0.0);
    }

    #[test]
    fn test_replan_acceleration_floor() {
        let motion = MotionConfig {
            steps_per_rev: 1000,
            ..Default::default()
        };
        // Same speed: falls back to the 500 → 2000 start ramp
        assert_eq!(motion.replan_acceleration(2000.0, 2000.0), 7500.0);
        // Small slowdown keeps its sign
        assert_eq!(motion.replan_acceleration(2100.0, 2000.0), -7500.0);
        // A steeper ramp is kept as is
        assert_eq!(motion.replan_acceleration(4000.0, 2000.0), -10_000.0);
    }

    #[test]
    fn test_current_conversion() {
        let sensor = CurrentSensorConfig::default();
        // Mid-scale is the zero-current point
        assert_eq!(sensor.raw_to_milliamps(2048), 0);
        // One sensitivity step above zero is one ampere
        let raw = ((1.65 + 0.185) / 3.3 * 4096.0) as u16;
        assert!((sensor.raw_to_milliamps(raw) - 1000).abs() < 5);
        assert!(sensor.raw_to_milliamps(0) < 0);
    }

    #[test]
    fn test_invalid_configs() {
        let mut config = ControllerConfig::default();
        config.motion.steps_per_rev = 0;
        assert_eq!(config.validate(), Err(ConfigError::InvalidStepsPerRev));

        let mut config = ControllerConfig::default();
        config.motion.ramp_time_s = 0.0;
        assert_eq!(config.validate(), Err(ConfigError::InvalidRampTime));

        let mut config = ControllerConfig::default();
        config.motion.min_half_period_us = 2_000_000;
        assert_eq!(config.validate(), Err(ConfigError::InvalidIntervalRange));

        let mut config = ControllerConfig::default();
        config.current.sensitivity_v_per_a = 0.0;
        assert_eq!(config.validate(), Err(ConfigError::InvalidSensitivity));

        let mut config = ControllerConfig::default();
        config.telemetry.average_interval_us = 1_000;
        assert_eq!(config.validate(), Err(ConfigError::InvalidTelemetryInterval));

        let mut config = ControllerConfig::default();
        config.leak.debounce_samples = 0;
        assert_eq!(config.validate(), Err(ConfigError::InvalidLeakTiming));
    }
}
