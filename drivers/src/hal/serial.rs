//! Serial Port (UART) Hardware Abstraction Layer.
//!
//! This module defines platform-independent traits for serial communication.

/// Serial port configuration.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct SerialConfig {
    /// Baud rate in bits per second.
    pub baud_rate: u32,
    /// Number of data bits per frame.
    pub data_bits: DataBits,
    /// Parity checking mode.
    pub parity: Parity,
    /// Number of stop bits.
    pub stop_bits: StopBits,
}

impl SerialConfig {
    /// Create a standard 8N1 configuration at the specified baud rate.
    ///
    /// 8N1 means: 8 data bits, no parity, 1 stop bit.
    pub const fn new_8n1(baud_rate: u32) -> Self {
        Self {
            baud_rate,
            data_bits: DataBits::Eight,
            parity: Parity::None,
            stop_bits: StopBits::One,
        }
    }

    /// Whether this is the 8N1 frame.
    pub const fn is_8n1(&self) -> bool {
        matches!(self.data_bits, DataBits::Eight)
            && matches!(self.parity, Parity::None)
            && matches!(self.stop_bits, StopBits::One)
    }
}

impl Default for SerialConfig {
    /// Default configuration: 115200 baud, 8N1.
    fn default() -> Self {
        Self::new_8n1(115200)
    }
}

/// Number of data bits per frame.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DataBits {
    Seven,
    Eight,
}

/// Parity mode.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Parity {
    /// No parity bit.
    None,
    /// Odd parity.
    Odd,
    /// Even parity.
    Even,
}

/// Number of stop bits.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum StopBits {
    /// One stop bit.
    One,
    /// Two stop bits.
    Two,
}

/// Serial port errors.
///
/// Line errors (framing, parity, overrun) are cleared by the driver and
/// never reported.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SerialError {
    /// Unknown instance id, empty device name, or unsupported
    /// configuration.
    InvalidParameter,
}

/// Callback invoked from interrupt context.
///
/// It must return quickly and must not block on the instance that
/// invoked it.
pub type SerialCallback = fn();

/// Serial port trait.
///
/// Blocking operations busy-wait on the hardware without any timeout.
pub trait SerialPort {
    /// Write a single byte (blocking).
    ///
    /// Returns once the byte is in the transmit FIFO, not once it has been
    /// shifted out.
    fn write_byte(&mut self, byte: u8);

    /// Write multiple bytes (blocking).
    fn write(&mut self, bytes: &[u8]) -> usize {
        for &byte in bytes {
            self.write_byte(byte);
        }
        bytes.len()
    }

    /// Read a single byte (blocking).
    fn read_byte(&mut self) -> u8;

    /// Read multiple bytes (blocking).
    fn read(&mut self, buffer: &mut [u8]) -> usize {
        for byte in buffer.iter_mut() {
            *byte = self.read_byte();
        }
        buffer.len()
    }
}

/// Extension trait for buffered, interrupt-driven operations.
pub trait NonBlockingSerial: SerialPort {
    /// Queue as many bytes as fit, returning how many were queued.
    fn send(&mut self, bytes: &[u8]) -> usize;

    /// Take up to `buffer.len()` received bytes, returning how many.
    fn receive(&mut self, buffer: &mut [u8]) -> usize;

    /// Install or clear the receive callback.
    fn set_rx_callback(&mut self, callback: Option<SerialCallback>);

    /// Install or clear the transmit callback.
    fn set_tx_callback(&mut self, callback: Option<SerialCallback>);
}
