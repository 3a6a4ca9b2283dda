//! Current-sense ADC bank
//!
//! RP2040 has a single SAR ADC. Channels 0..2 (GPIO26..28) carry the
//! per-axis current sensors; conversions are short enough to run
//! blocking from the telemetry tick.

use embassy_rp::adc::{Adc, Blocking, Channel};
use triaxis_hal::{AdcError, AnalogInput};

/// Number of current-sense channels
pub const CURRENT_CHANNELS: usize = 3;

pub struct CurrentSenseAdc<'d> {
    adc: Adc<'d, Blocking>,
    channels: [Channel<'d>; CURRENT_CHANNELS],
}

impl<'d> CurrentSenseAdc<'d> {
    /// Channels are indexed by axis
    pub fn new(adc: Adc<'d, Blocking>, channels: [Channel<'d>; CURRENT_CHANNELS]) -> Self {
        Self { adc, channels }
    }
}

impl AnalogInput for CurrentSenseAdc<'_> {
    fn read_raw(&mut self, channel: usize) -> Result<u16, AdcError> {
        let ch = self
            .channels
            .get_mut(channel)
            .ok_or(AdcError::InvalidChannel)?;
        self.adc
            .blocking_read(ch)
            .map_err(|_| AdcError::ConversionFailed)
    }
}
