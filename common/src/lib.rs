//! Architecture-neutral primitives shared by the Econotag drivers.
//!
//! - [`arch`]: CPU interrupt-mask manipulation for the selected target
//! - [`sync`]: masking-based critical sections and an IRQ-safe mutex
//! - [`exception`]: the exception handler table
//! - [`collections`]: fixed-capacity byte queues

#![cfg_attr(not(test), no_std)]

pub mod arch;
pub mod collections;
pub mod exception;
pub mod sync;
