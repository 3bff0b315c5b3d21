//! Hardware Driver Subsystem
//!
//! Drivers for the Freescale MC1322x as found on the Redwire Econotag.
//!
//! # Module Organization
//!
//! - [`hal`]: Platform-independent trait definitions
//! - [`hw`]: Register maps and fixed hardware constants
//! - [`platform`]: SoC drivers, generic over a register file
//! - [`uart`]: The two UART instances, addressed by id
//! - [`device_manager`]: Named device table
//! - `sim`: In-memory register files (tests and the `sim` feature)
//!
//! # Usage Example
//!
//! ```no_run
//! use econotag_drivers::device_manager::devices;
//! use econotag_drivers::hal::interrupt::InterruptController;
//! use econotag_drivers::uart;
//!
//! fn bring_up(intc: &mut impl InterruptController) {
//!     let mut registry = devices().lock();
//!     uart::init(0, 115_200, "console", intc, &mut *registry).ok();
//!     drop(registry);
//!
//!     let mut pending: &[u8] = b"Hello, world!\n";
//!     while !pending.is_empty() {
//!         let queued = uart::send(0, pending).unwrap_or(0);
//!         pending = &pending[queued..];
//!     }
//! }
//! ```

#![cfg_attr(not(test), no_std)]

pub mod device_manager;
pub mod hal;
pub mod hw;
pub mod platform;
pub mod uart;

#[cfg(any(test, feature = "sim"))]
pub mod sim;

// Re-export commonly used types
pub use hal::gpio::{GpioController, PinLevel};
pub use hal::interrupt::InterruptController;
pub use hal::serial::{NonBlockingSerial, SerialConfig, SerialError, SerialPort};
pub use platform::mc1322x::UartId;
