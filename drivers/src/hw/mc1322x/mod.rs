//! Freescale MC1322x register maps.

pub mod gpio;
pub mod uart;

/// Core clock feeding the peripherals.
pub const CPU_FREQ: u32 = 24_000_000;
