//! RP2040-specific HAL for the Triaxis stepper controller
//!
//! Implements the shared `triaxis-hal` traits on top of `embassy-rp`:
//!
//! - GPIO newtypes for step, direction, enable and leak lines
//! - Software compare timers driven by the embassy time queue
//! - Blocking ADC bank for the current-sense channels (GPIO26..28)
//! - A raw mutex that masks only the step executor's interrupt

#![no_std]

pub mod adc;
pub mod gpio;
pub mod mutex;
pub mod timer;

pub use adc::CurrentSenseAdc;
pub use gpio::{RpInput, RpOutput};
pub use mutex::IrqMaskRawMutex;
pub use timer::StepTimer;
