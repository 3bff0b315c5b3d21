//! ARM (ARMv4T and later, A32 state) support.

pub mod irq;
