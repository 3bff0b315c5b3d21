//! Masking-based critical sections.
//!
//! A [`CriticalSection`] is a token: acquiring it masks an interrupt source
//! and records what the mask was before; dropping it puts exactly that mask
//! back. Nesting therefore works without counters, since an inner section
//! saves "already masked" and restores it.
//!
//! ```no_run
//! use econotag_common::sync::{CriticalSection, Irq};
//!
//! CriticalSection::<Irq>::with(|_| {
//!     // IRQ handlers cannot run here.
//! });
//! ```
//!
//! Masking only works in privileged modes. From user mode the CPU ignores
//! the write and the section silently protects nothing.

use core::marker::PhantomData;

use super::irq::{Interrupts, IrqControl};

/// Proof that an interrupt source is masked.
///
/// Not `Send`: the saved mask belongs to the context that took it.
#[must_use = "the section ends as soon as the token is dropped"]
pub struct CriticalSection<I: IrqControl = Interrupts> {
    saved: I::State,
    _not_send: PhantomData<*const ()>,
}

impl<I: IrqControl> CriticalSection<I> {
    /// Mask the source and remember the prior state.
    #[inline(always)]
    pub fn enter() -> Self {
        Self {
            saved: I::disable(),
            _not_send: PhantomData,
        }
    }

    /// Run `f` with the source masked.
    #[inline]
    pub fn with<R>(f: impl FnOnce(&Self) -> R) -> R {
        let cs = Self::enter();
        f(&cs)
    }

    /// The state that will be restored when the section ends.
    pub fn saved(&self) -> I::State {
        self.saved
    }
}

impl<I: IrqControl> Drop for CriticalSection<I> {
    #[inline(always)]
    fn drop(&mut self) {
        I::restore(self.saved);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arch;
    use crate::sync::{Fiq, InterruptMask, Irq};

    #[test]
    fn test_enter_reports_prior_state() {
        let _serial = arch::TEST_MASK_LOCK.lock();
        arch::restore_interrupts(InterruptMask::empty());

        let cs = CriticalSection::<Interrupts>::enter();
        assert_eq!(cs.saved(), InterruptMask::empty());
        assert_eq!(arch::current_mask(), InterruptMask::all());
        drop(cs);

        assert_eq!(arch::current_mask(), InterruptMask::empty());
    }

    #[test]
    fn test_nested_sections_restore_in_order() {
        let _serial = arch::TEST_MASK_LOCK.lock();
        arch::restore_interrupts(InterruptMask::empty());

        let outer = CriticalSection::<Irq>::enter();
        assert!(!outer.saved());
        {
            let inner = CriticalSection::<Irq>::enter();
            assert!(inner.saved());
        }
        // Inner restored "already masked".
        assert_eq!(arch::current_mask(), InterruptMask::IRQ);
        drop(outer);
        assert_eq!(arch::current_mask(), InterruptMask::empty());
    }

    #[test]
    fn test_irq_section_leaves_fiq_alone() {
        let _serial = arch::TEST_MASK_LOCK.lock();
        arch::restore_interrupts(InterruptMask::FIQ);

        CriticalSection::<Irq>::with(|_| {
            assert_eq!(arch::current_mask(), InterruptMask::all());
        });
        assert_eq!(arch::current_mask(), InterruptMask::FIQ);

        CriticalSection::<Fiq>::with(|cs| {
            assert!(cs.saved());
        });
        assert_eq!(arch::current_mask(), InterruptMask::FIQ);
        arch::restore_interrupts(InterruptMask::empty());
    }

    #[test]
    fn test_with_returns_value() {
        let _serial = arch::TEST_MASK_LOCK.lock();
        let v = CriticalSection::<Interrupts>::with(|_| 42);
        assert_eq!(v, 42);
    }
}
