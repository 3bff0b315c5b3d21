use crate::sync::irq::InterruptMask;

const CPSR_F_BIT: u32 = 1 << 6;
const CPSR_I_BIT: u32 = 1 << 7;
const CPSR_MASK_SHIFT: u32 = 6;

/// Interrupt masking through the CPSR `I` and `F` bits.
///
/// `cpsid`/`cpsie` only exist from ARMv6, so the bits are changed with a
/// `mrs`/`msr` pair, which also works on the ARM7TDMI.
///
/// # Privilege
///
/// `msr cpsr_c` is ignored in user mode. Called from user mode these
/// functions neither mask anything nor report failure.
///
/// # Assembly Details
///
/// - `mrs {0}, cpsr`: Move from CPSR to general purpose register
/// - `msr cpsr_c, {0}`: Write the control byte (mode, `T`, `F`, `I`)
///
/// The `msr` is not marked `nomem` so the compiler keeps memory accesses on
/// the correct side of the mask change.
#[inline(always)]
fn read_cpsr() -> u32 {
    let cpsr: u32;
    unsafe {
        core::arch::asm!(
            "mrs {0}, cpsr",
            out(reg) cpsr,
            options(nomem, nostack, preserves_flags)
        );
    }
    cpsr
}

#[inline(always)]
fn write_cpsr_c(cpsr: u32) {
    unsafe {
        core::arch::asm!("msr cpsr_c, {0}", in(reg) cpsr, options(nostack));
    }
}

/// Mask IRQ and FIQ, returning the previous mask.
#[inline(always)]
pub fn disable_interrupts() -> InterruptMask {
    let cpsr = read_cpsr();
    write_cpsr_c(cpsr | CPSR_I_BIT | CPSR_F_BIT);
    InterruptMask::from_bits_truncate(cpsr >> CPSR_MASK_SHIFT)
}

/// Mask IRQ, returning `true` if it was already masked.
#[inline(always)]
pub fn disable_irq() -> bool {
    let cpsr = read_cpsr();
    write_cpsr_c(cpsr | CPSR_I_BIT);
    cpsr & CPSR_I_BIT != 0
}

/// Mask FIQ, returning `true` if it was already masked.
#[inline(always)]
pub fn disable_fiq() -> bool {
    let cpsr = read_cpsr();
    write_cpsr_c(cpsr | CPSR_F_BIT);
    cpsr & CPSR_F_BIT != 0
}

/// Put back both mask bits as returned by [`disable_interrupts`].
#[inline(always)]
pub fn restore_interrupts(mask: InterruptMask) {
    let cpsr = read_cpsr() & !(CPSR_I_BIT | CPSR_F_BIT);
    write_cpsr_c(cpsr | (mask.bits() << CPSR_MASK_SHIFT));
}

/// Put back the `I` bit as returned by [`disable_irq`].
#[inline(always)]
pub fn restore_irq(masked: bool) {
    let cpsr = read_cpsr() & !CPSR_I_BIT;
    write_cpsr_c(if masked { cpsr | CPSR_I_BIT } else { cpsr });
}

/// Put back the `F` bit as returned by [`disable_fiq`].
#[inline(always)]
pub fn restore_fiq(masked: bool) {
    let cpsr = read_cpsr() & !CPSR_F_BIT;
    write_cpsr_c(if masked { cpsr | CPSR_F_BIT } else { cpsr });
}

/// The mask currently in effect.
#[inline(always)]
pub fn current_mask() -> InterruptMask {
    InterruptMask::from_bits_truncate(read_cpsr() >> CPSR_MASK_SHIFT)
}
