//! In-memory stand-ins for the MC1322x peripherals.
//!
//! The register files here implement the same field semantics as the
//! hardware (strobe registers, read-to-clear status, split read/write FIFO
//! control words), so drivers can be exercised on the host. They are not
//! safe to share between threads.

pub mod gpio;
pub mod interrupt;
pub mod uart;

pub use gpio::SimGpio;
pub use interrupt::SimInterruptController;
pub use uart::SimUart;
