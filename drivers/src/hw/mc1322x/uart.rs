use crate::hal::interrupt::IrqNumber;
use crate::hal::register::Register;

pub const UART1_BASE: usize = 0x8000_5000;
pub const UART2_BASE: usize = 0x8000_B000;

/// Interrupt controller source numbers.
pub const ITC_SRC_UART1: IrqNumber = 1;
pub const ITC_SRC_UART2: IrqNumber = 2;

/// Entries in each hardware FIFO.
pub const FIFO_DEPTH: u32 = 32;

/// Baud generator modulus.
pub const BAUD_MOD: u32 = 9999;

/// Field masks for the FIFO control registers.
pub const FIFO_LEVEL_MASK: u32 = 0x1F;
pub const FIFO_ADDR_DIFF_MASK: u32 = 0x3F;

/// Shift of `INC` within `BR`.
pub const BR_INC_SHIFT: u32 = 16;

/// UART register block.
///
/// `RxCon` and `TxCon` read and write differently: a write sets the
/// 5-bit interrupt trigger level, a read returns the 6-bit FIFO address
/// difference (bytes pending for rx, free slots for tx).
#[repr(usize)]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum UartReg {
    Con = 0x00,
    Stat = 0x04,
    Data = 0x08,
    RxCon = 0x0C,
    TxCon = 0x10,
    Cts = 0x14,
    Br = 0x18,
}

impl Register for UartReg {
    #[inline(always)]
    fn offset(self) -> usize {
        self as usize
    }
}

bitflags::bitflags! {
    /// `CON` bits.
    #[derive(Debug, Copy, Clone, PartialEq, Eq)]
    pub struct Control: u32 {
        /// Transmitter enable.
        const TXE = 1 << 0;
        /// Receiver enable.
        const RXE = 1 << 1;
        /// Parity enable.
        const PEN = 1 << 2;
        /// Even parity.
        const EP = 1 << 3;
        /// Two stop bits.
        const ST2 = 1 << 4;
        /// Send break.
        const SB = 1 << 5;
        /// Continuous transmit.
        const CON_TX = 1 << 6;
        const TX_OEN_B = 1 << 7;
        /// Baud clock source select.
        const XTIM = 1 << 10;
        /// Flow control polarity.
        const FCP = 1 << 11;
        /// Flow control enable.
        const FCE = 1 << 12;
        /// Mask the transmit-ready interrupt.
        const MASK_TX_READY = 1 << 13;
        /// Mask the receive-ready interrupt.
        const MASK_RX_READY = 1 << 14;
        /// Test mode (loopback).
        const TST = 1 << 15;
    }
}

bitflags::bitflags! {
    /// `STAT` bits. Reading the register clears the error latches.
    #[derive(Debug, Copy, Clone, PartialEq, Eq)]
    pub struct Status: u32 {
        /// Start bit error.
        const SE = 1 << 0;
        /// Parity error.
        const PE = 1 << 1;
        /// Framing error.
        const FE = 1 << 2;
        /// Transmitter overrun.
        const TOE = 1 << 3;
        /// Receiver overrun.
        const ROE = 1 << 4;
        /// Receiver underrun.
        const RUE = 1 << 5;
        /// Rx FIFO at or above its trigger level.
        const RX_READY = 1 << 6;
        /// Tx FIFO free space at or above its trigger level.
        const TX_READY = 1 << 7;

        const ERRORS = Self::SE.bits() | Self::PE.bits() | Self::FE.bits()
            | Self::TOE.bits() | Self::ROE.bits() | Self::RUE.bits();
    }
}
