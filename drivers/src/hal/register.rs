//! Register-file abstraction.
//!
//! Drivers never overlay structs onto hardware addresses. They name
//! registers with a [`Register`] type and go through a [`RegisterFile`],
//! which in production is [`Mmio`] and in tests an in-memory model with
//! the same field semantics.

use core::ptr::{read_volatile, write_volatile};

/// A typed identifier for one 32-bit register of a block.
pub trait Register: Copy {
    /// Byte offset of the register from the block base.
    fn offset(self) -> usize;
}

/// A block of 32-bit registers.
pub trait RegisterFile<R: Register> {
    /// Load a register.
    fn read(&self, reg: R) -> u32;

    /// Store a register.
    fn write(&self, reg: R, value: u32);

    /// Read-modify-write a register.
    ///
    /// This is two bus accesses. It is not atomic with respect to
    /// interrupt handlers touching the same register.
    #[inline]
    fn modify(&self, reg: R, f: impl FnOnce(u32) -> u32) {
        let value = self.read(reg);
        self.write(reg, f(value));
    }
}

/// Volatile memory-mapped register block.
#[derive(Debug)]
pub struct Mmio {
    base: usize,
}

impl Mmio {
    /// Create an accessor for the block at `base`.
    ///
    /// # Safety
    ///
    /// - `base` must be the address of the register block the register
    ///   type describes, mapped as device memory
    /// - the block must stay valid for the lifetime of this value
    pub const unsafe fn new(base: usize) -> Self {
        Self { base }
    }

    pub const fn base(&self) -> usize {
        self.base
    }
}

impl<R: Register> RegisterFile<R> for Mmio {
    #[inline]
    fn read(&self, reg: R) -> u32 {
        // SAFETY: `new` requires `base` to be a valid register block and
        // `reg.offset()` stays inside it.
        unsafe { read_volatile((self.base + reg.offset()) as *const u32) }
    }

    #[inline]
    fn write(&self, reg: R, value: u32) {
        // SAFETY: see `read`.
        unsafe { write_volatile((self.base + reg.offset()) as *mut u32, value) }
    }
}
