//! CPU interrupt-mask primitives for the selected architecture.
//!
//! Every backend exposes the same free functions:
//!
//! - `disable_interrupts() -> InterruptMask` / `restore_interrupts(mask)`
//! - `disable_irq() -> bool` / `restore_irq(bit)`
//! - `disable_fiq() -> bool` / `restore_fiq(bit)`
//! - `current_mask() -> InterruptMask`
//!
//! The `disable_*` calls return the prior mask; the matching `restore_*`
//! call reasserts exactly those bits and leaves the others untouched.

cfg_if::cfg_if! {
    if #[cfg(target_arch = "arm")] {
        pub mod arm;
        pub use arm::irq::*;
    } else {
        pub mod host;
        pub use host::irq::*;
    }
}

#[cfg(all(test, not(target_arch = "arm")))]
pub(crate) use host::irq::TEST_MASK_LOCK;
