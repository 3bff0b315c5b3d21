//! Hardware Abstraction Layer (HAL) - Platform-Independent Traits
//!
//! This module defines generic traits for interacting with hardware
//! peripherals. These traits are implemented by platform-specific
//! drivers, allowing application code to be written in a
//! platform-independent manner.
//!
//! # Available Interfaces
//!
//! - [`gpio`]: General Purpose Input/Output control
//! - [`serial`]: Serial port (UART) communication
//! - [`interrupt`]: Interrupt controller collaborator surface
//! - [`register`]: Typed access to memory-mapped register blocks

pub mod gpio;
pub mod interrupt;
pub mod register;
pub mod serial;
