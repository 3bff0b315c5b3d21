//! Freescale MC1322x (Redwire Econotag) platform drivers.

pub mod gpio;
pub mod uart;

pub use gpio::Gpio;
pub use uart::{BUFFER_SIZE, Uart, UartId, UartPins};
