use core::fmt::Debug;

use crate::arch;

bitflags::bitflags! {
    /// CPU interrupt mask bits.
    ///
    /// The encoding is the CPSR `I`/`F` pair shifted down by six, so the
    /// four possible values read as:
    ///
    /// | value | IRQ      | FIQ      |
    /// |-------|----------|----------|
    /// | 0     | enabled  | enabled  |
    /// | 1     | enabled  | disabled |
    /// | 2     | disabled | enabled  |
    /// | 3     | disabled | disabled |
    #[derive(Debug, Copy, Clone, PartialEq, Eq)]
    pub struct InterruptMask: u32 {
        /// Fast interrupts are masked.
        const FIQ = 0b01;
        /// Normal interrupts are masked.
        const IRQ = 0b10;
    }
}

/// Architecture-specific interrupt masking interface.
///
/// Implemented by the architecture layer.
pub trait IrqControl {
    /// Saved interrupt state
    type State: Copy + Debug;

    /// Disable interrupts and return the previous state.
    fn disable() -> Self::State;

    /// Restore interrupts to a previous state.
    fn restore(state: Self::State);
}

/// Normal interrupt (IRQ) source.
///
/// The state is the prior `I` bit: `true` if IRQs were already masked.
pub struct Irq;

impl IrqControl for Irq {
    type State = bool;

    #[inline(always)]
    fn disable() -> bool {
        arch::disable_irq()
    }

    #[inline(always)]
    fn restore(masked: bool) {
        arch::restore_irq(masked)
    }
}

/// Fast interrupt (FIQ) source.
///
/// The state is the prior `F` bit: `true` if FIQs were already masked.
pub struct Fiq;

impl IrqControl for Fiq {
    type State = bool;

    #[inline(always)]
    fn disable() -> bool {
        arch::disable_fiq()
    }

    #[inline(always)]
    fn restore(masked: bool) {
        arch::restore_fiq(masked)
    }
}

/// Both interrupt sources at once.
pub struct Interrupts;

impl IrqControl for Interrupts {
    type State = InterruptMask;

    #[inline(always)]
    fn disable() -> InterruptMask {
        arch::disable_interrupts()
    }

    #[inline(always)]
    fn restore(mask: InterruptMask) {
        arch::restore_interrupts(mask)
    }
}
