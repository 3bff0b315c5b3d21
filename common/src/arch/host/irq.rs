use core::sync::atomic::{AtomicU32, Ordering};

use crate::sync::irq::InterruptMask;

static MASK: AtomicU32 = AtomicU32::new(0);

/// Serializes tests that observe the process-wide simulated mask.
#[cfg(test)]
pub(crate) static TEST_MASK_LOCK: spin::Mutex<()> = spin::Mutex::new(());

fn set(bits: InterruptMask) -> InterruptMask {
    InterruptMask::from_bits_truncate(MASK.fetch_or(bits.bits(), Ordering::SeqCst))
}

fn replace(clear: InterruptMask, value: InterruptMask) {
    let mut current = MASK.load(Ordering::SeqCst);
    loop {
        let next = (current & !clear.bits()) | (value & clear).bits();
        match MASK.compare_exchange_weak(current, next, Ordering::SeqCst, Ordering::SeqCst) {
            Ok(_) => return,
            Err(seen) => current = seen,
        }
    }
}

/// Mask IRQ and FIQ, returning the previous mask.
pub fn disable_interrupts() -> InterruptMask {
    set(InterruptMask::all())
}

/// Mask IRQ, returning `true` if it was already masked.
pub fn disable_irq() -> bool {
    set(InterruptMask::IRQ).contains(InterruptMask::IRQ)
}

/// Mask FIQ, returning `true` if it was already masked.
pub fn disable_fiq() -> bool {
    set(InterruptMask::FIQ).contains(InterruptMask::FIQ)
}

/// Put back both mask bits as returned by [`disable_interrupts`].
pub fn restore_interrupts(mask: InterruptMask) {
    replace(InterruptMask::all(), mask);
}

/// Put back the IRQ bit as returned by [`disable_irq`].
pub fn restore_irq(masked: bool) {
    let value = if masked { InterruptMask::IRQ } else { InterruptMask::empty() };
    replace(InterruptMask::IRQ, value);
}

/// Put back the FIQ bit as returned by [`disable_fiq`].
pub fn restore_fiq(masked: bool) {
    let value = if masked { InterruptMask::FIQ } else { InterruptMask::empty() };
    replace(InterruptMask::FIQ, value);
}

/// The mask currently in effect.
pub fn current_mask() -> InterruptMask {
    InterruptMask::from_bits_truncate(MASK.load(Ordering::SeqCst))
}
