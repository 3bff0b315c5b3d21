use core::cell::{Cell, RefCell};

use heapless::{Deque, Vec};

use crate::hal::register::RegisterFile;
use crate::hw::mc1322x::uart::{
    Control, FIFO_ADDR_DIFF_MASK, FIFO_DEPTH, FIFO_LEVEL_MASK, Status, UartReg,
};

const DEPTH: usize = FIFO_DEPTH as usize;

/// Bytes of `DATA` writes kept for inspection.
pub const WIRE_LOG: usize = 2048;

/// UART register block with modelled FIFOs.
///
/// Bytes written to `DATA` are logged and queued in the tx FIFO until the
/// test shifts them out with [`transmit`](Self::transmit). Bytes arrive in
/// the rx FIFO through [`inject`](Self::inject).
pub struct SimUart {
    con: Cell<u32>,
    br: Cell<u32>,
    cts: Cell<u32>,
    rx_level: Cell<u32>,
    tx_level: Cell<u32>,
    errors: Cell<Status>,
    rx_fifo: RefCell<Deque<u8, DEPTH>>,
    tx_fifo: RefCell<Deque<u8, DEPTH>>,
    written: RefCell<Vec<u8, WIRE_LOG>>,
    accesses: Cell<usize>,
}

impl SimUart {
    pub const fn new() -> Self {
        Self {
            con: Cell::new(0),
            br: Cell::new(0),
            cts: Cell::new(0),
            rx_level: Cell::new(0),
            tx_level: Cell::new(0),
            errors: Cell::new(Status::empty()),
            rx_fifo: RefCell::new(Deque::new()),
            tx_fifo: RefCell::new(Deque::new()),
            written: RefCell::new(Vec::new()),
            accesses: Cell::new(0),
        }
    }

    /// Deliver bytes from the line into the rx FIFO.
    ///
    /// Returns how many fit; the rest are lost and latch an overrun.
    pub fn inject(&self, bytes: &[u8]) -> usize {
        let mut fifo = self.rx_fifo.borrow_mut();
        let mut accepted = 0;
        for &b in bytes {
            if fifo.push_back(b).is_err() {
                self.errors.set(self.errors.get() | Status::ROE);
                break;
            }
            accepted += 1;
        }
        accepted
    }

    /// Shift up to `count` bytes out of the tx FIFO onto the line.
    pub fn transmit(&self, count: usize) -> usize {
        let mut fifo = self.tx_fifo.borrow_mut();
        let mut sent = 0;
        while sent < count && fifo.pop_front().is_some() {
            sent += 1;
        }
        sent
    }

    /// Empty the tx FIFO.
    pub fn transmit_all(&self) -> usize {
        self.transmit(DEPTH)
    }

    /// Every byte stored to `DATA`, in order.
    pub fn written(&self) -> Vec<u8, WIRE_LOG> {
        self.written.borrow().clone()
    }

    pub fn rx_pending(&self) -> usize {
        self.rx_fifo.borrow().len()
    }

    pub fn tx_queued(&self) -> usize {
        self.tx_fifo.borrow().len()
    }

    pub fn control(&self) -> Control {
        Control::from_bits_retain(self.con.get())
    }

    /// Programmed trigger levels as `(rx, tx)`.
    pub fn trigger_levels(&self) -> (u32, u32) {
        (self.rx_level.get(), self.tx_level.get())
    }

    /// Latch an error as the line would.
    pub fn raise_error(&self, error: Status) {
        self.errors.set(self.errors.get() | (error & Status::ERRORS));
    }

    /// Latched errors not yet cleared by a `STAT` read.
    pub fn latched_errors(&self) -> Status {
        self.errors.get()
    }

    /// Reads and writes performed through [`RegisterFile`].
    pub fn accesses(&self) -> usize {
        self.accesses.get()
    }

    fn ready(&self) -> Status {
        let mut status = Status::empty();
        if self.rx_pending() as u32 >= self.rx_level.get() && self.rx_pending() > 0 {
            status |= Status::RX_READY;
        }
        if FIFO_DEPTH - self.tx_queued() as u32 >= self.tx_level.get() {
            status |= Status::TX_READY;
        }
        status
    }

    /// The level-triggered interrupt line: a ready condition whose mask bit
    /// is clear.
    pub fn interrupt_pending(&self) -> bool {
        let ready = self.ready();
        let con = self.control();
        (ready.contains(Status::RX_READY) && !con.contains(Control::MASK_RX_READY))
            || (ready.contains(Status::TX_READY) && !con.contains(Control::MASK_TX_READY))
    }
}

impl Default for SimUart {
    fn default() -> Self {
        Self::new()
    }
}

impl RegisterFile<UartReg> for SimUart {
    fn read(&self, reg: UartReg) -> u32 {
        self.accesses.set(self.accesses.get() + 1);
        match reg {
            UartReg::Con => self.con.get(),
            UartReg::Stat => {
                let status = self.errors.replace(Status::empty()) | self.ready();
                status.bits()
            }
            UartReg::Data => match self.rx_fifo.borrow_mut().pop_front() {
                Some(b) => b as u32,
                None => {
                    self.errors.set(self.errors.get() | Status::RUE);
                    0
                }
            },
            UartReg::RxCon => self.rx_pending() as u32 & FIFO_ADDR_DIFF_MASK,
            UartReg::TxCon => (FIFO_DEPTH - self.tx_queued() as u32) & FIFO_ADDR_DIFF_MASK,
            UartReg::Cts => self.cts.get(),
            UartReg::Br => self.br.get(),
        }
    }

    fn write(&self, reg: UartReg, value: u32) {
        self.accesses.set(self.accesses.get() + 1);
        match reg {
            UartReg::Con => self.con.set(value),
            UartReg::Stat => {}
            UartReg::Data => {
                let byte = value as u8;
                // The log only overflows in tests that send far more than
                // they inspect.
                let _ = self.written.borrow_mut().push(byte);
                if self.tx_fifo.borrow_mut().push_back(byte).is_err() {
                    self.errors.set(self.errors.get() | Status::TOE);
                }
            }
            UartReg::RxCon => self.rx_level.set(value & FIFO_LEVEL_MASK),
            UartReg::TxCon => self.tx_level.set(value & FIFO_LEVEL_MASK),
            UartReg::Cts => self.cts.set(value & FIFO_LEVEL_MASK),
            UartReg::Br => self.br.set(value),
        }
    }
}
