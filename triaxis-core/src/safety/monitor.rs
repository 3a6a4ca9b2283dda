//! Leak monitor implementation
//!
//! Each leak sensor is an active-low digital input. A raw reading must
//! hold for `debounce_samples` consecutive polls before the debounced
//! state follows it.

use portable_atomic::{AtomicU8, Ordering};
use triaxis_hal::InputPin;

use crate::config::LeakConfig;

/// Debounced leak state across all sensors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LeakStatus {
    /// No sensor reports a leak
    Dry,
    /// Bit `n` set when sensor `n` reports a leak
    Leak { mask: u8 },
}

impl LeakStatus {
    fn from_mask(mask: u8) -> Self {
        if mask == 0 {
            LeakStatus::Dry
        } else {
            LeakStatus::Leak { mask }
        }
    }
}

/// Shared debounced leak mask
///
/// Written by the polling task, readable from anywhere.
#[derive(Debug, Default)]
pub struct LeakFlags(AtomicU8);

impl LeakFlags {
    pub const fn new() -> Self {
        Self(AtomicU8::new(0))
    }

    pub fn store(&self, mask: u8) {
        self.0.store(mask, Ordering::Release);
    }

    pub fn mask(&self) -> u8 {
        self.0.load(Ordering::Acquire)
    }

    pub fn is_leaking(&self, sensor: usize) -> bool {
        sensor < 8 && self.mask() & (1 << sensor) != 0
    }

    pub fn status(&self) -> LeakStatus {
        LeakStatus::from_mask(self.mask())
    }
}

/// Debouncing monitor for `N` leak sensors (`N <= 8`)
#[derive(Debug, Clone)]
pub struct LeakMonitor<const N: usize> {
    debounce_samples: u8,
    /// Consecutive polls each raw reading has disagreed with the stable state
    counts: [u8; N],
    stable_mask: u8,
}

impl<const N: usize> LeakMonitor<N> {
    pub fn new(config: &LeakConfig) -> Self {
        Self {
            debounce_samples: config.debounce_samples.max(1),
            counts: [0; N],
            stable_mask: 0,
        }
    }

    /// Debounced mask
    pub fn mask(&self) -> u8 {
        self.stable_mask
    }

    pub fn status(&self) -> LeakStatus {
        LeakStatus::from_mask(self.stable_mask)
    }

    /// Sample every sensor once
    ///
    /// Returns the new status when the debounced mask changed.
    pub fn poll<P: InputPin>(&mut self, sensors: &[P; N]) -> Option<LeakStatus> {
        let mut raw = [false; N];
        for (leak, sensor) in raw.iter_mut().zip(sensors.iter()) {
            *leak = sensor.is_low();
        }
        self.update(&raw)
    }

    /// Feed one set of raw readings (`true` = leak)
    pub fn update(&mut self, raw: &[bool; N]) -> Option<LeakStatus> {
        let previous = self.stable_mask;

        for (i, &leak) in raw.iter().enumerate().take(8) {
            let bit = 1u8 << i;
            let stable = self.stable_mask & bit != 0;
            if leak == stable {
                self.counts[i] = 0;
                continue;
            }
            self.counts[i] = self.counts[i].saturating_add(1);
            if self.counts[i] >= self.debounce_samples {
                self.counts[i] = 0;
                self.stable_mask ^= bit;
            }
        }

        (self.stable_mask != previous).then(|| self.status())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::SimPin;

    fn monitor() -> LeakMonitor<2> {
        LeakMonitor::new(&LeakConfig {
            poll_interval_ms: 10,
            debounce_samples: 3,
        })
    }

    #[test]
    fn test_starts_dry() {
        let monitor = monitor();
        assert_eq!(monitor.status(), LeakStatus::Dry);
        assert_eq!(monitor.mask(), 0);
    }

    #[test]
    fn test_leak_after_debounce() {
        let mut monitor = monitor();
        assert_eq!(monitor.update(&[false, true]), None);
        assert_eq!(monitor.update(&[false, true]), None);
        assert_eq!(
            monitor.update(&[false, true]),
            Some(LeakStatus::Leak { mask: 0b10 })
        );
        assert_eq!(monitor.update(&[false, true]), None);
    }

    #[test]
    fn test_glitch_is_ignored() {
        let mut monitor = monitor();
        monitor.update(&[true, false]);
        monitor.update(&[true, false]);
        monitor.update(&[false, false]);
        monitor.update(&[true, false]);
        monitor.update(&[true, false]);
        assert_eq!(monitor.status(), LeakStatus::Dry);
    }

    #[test]
    fn test_clears_after_debounce() {
        let mut monitor = monitor();
        for _ in 0..3 {
            monitor.update(&[true, false]);
        }
        assert_eq!(monitor.mask(), 0b01);

        monitor.update(&[false, false]);
        monitor.update(&[false, false]);
        assert_eq!(monitor.update(&[false, false]), Some(LeakStatus::Dry));
    }

    #[test]
    fn test_poll_reads_active_low() {
        let mut monitor = monitor();
        let sensors = [SimPin::high(), SimPin::low()];
        for _ in 0..2 {
            assert_eq!(monitor.poll(&sensors), None);
        }
        assert_eq!(
            monitor.poll(&sensors),
            Some(LeakStatus::Leak { mask: 0b10 })
        );
    }

    #[test]
    fn test_flags() {
        let flags = LeakFlags::new();
        assert_eq!(flags.status(), LeakStatus::Dry);

        flags.store(0b100);
        assert!(flags.is_leaking(2));
        assert!(!flags.is_leaking(0));
        assert!(!flags.is_leaking(9));
        assert_eq!(flags.status(), LeakStatus::Leak { mask: 0b100 });
    }
}
