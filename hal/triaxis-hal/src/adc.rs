//! Analog input abstraction
//!
//! Used by the current telemetry subsystem to read one raw conversion
//! per axis current-sense line.

/// Errors reported by an analog front end
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AdcError {
    /// Channel index has no analog line behind it
    InvalidChannel,
    /// Conversion did not complete
    ConversionFailed,
}

/// Multi-channel analog input
pub trait AnalogInput {
    /// Read one raw conversion from `channel`
    fn read_raw(&mut self, channel: usize) -> Result<u16, AdcError>;
}
