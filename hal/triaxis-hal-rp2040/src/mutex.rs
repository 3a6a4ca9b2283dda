//! Exclusion against a single interrupt
//!
//! A raw mutex that masks one NVIC line instead of every interrupt.
//! State shared only between thread mode and the handler of `I` (for
//! instance an `InterruptExecutor` running the step tasks) needs
//! nothing more, and the UART and tick interrupts keep running while
//! the lock is held.
//!
//! Taking the lock from inside `I`'s own handler masks the line that is
//! already active, which costs two NVIC writes and blocks nothing.

use core::marker::PhantomData;
use core::sync::atomic::{compiler_fence, Ordering};

use embassy_rp::interrupt::typelevel::Interrupt;
use embassy_rp::interrupt::InterruptExt;
use embassy_sync::blocking_mutex::raw::RawMutex;

/// Raw mutex that masks interrupt `I` while held
///
/// Only thread mode and `I`'s handler may share data behind it; a
/// higher-priority handler touching the same data is not excluded.
pub struct IrqMaskRawMutex<I> {
    _irq: PhantomData<fn() -> I>,
}

impl<I: Interrupt> IrqMaskRawMutex<I> {
    pub const fn new() -> Self {
        Self { _irq: PhantomData }
    }
}

impl<I: Interrupt> Default for IrqMaskRawMutex<I> {
    fn default() -> Self {
        Self::new()
    }
}

unsafe impl<I: Interrupt> RawMutex for IrqMaskRawMutex<I> {
    const INIT: Self = Self::new();

    fn lock<R>(&self, f: impl FnOnce() -> R) -> R {
        let irq = I::IRQ;
        let was_enabled = irq.is_enabled();
        irq.disable();
        compiler_fence(Ordering::SeqCst);

        let result = f();

        compiler_fence(Ordering::SeqCst);
        if was_enabled {
            // SAFETY: restores the enable state found on entry; the
            // handler was bound before the line was first enabled
            unsafe { irq.enable() };
        }
        result
    }
}
