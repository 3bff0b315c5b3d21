//! MC1322x UART Driver
//!
//! Interrupt-driven serial transport. Each instance owns a 256-byte rx
//! ring and a 256-byte tx ring sitting between the application and the
//! 32-entry hardware FIFOs:
//!
//! ```text
//! send()    -> tx ring -> [ISR] -> tx FIFO -> line
//! receive() <- rx ring <- [ISR] <- rx FIFO <- line
//! ```
//!
//! # Ownership of the rings
//!
//! There are no locks. Each ring is shared between the foreground and this
//! instance's ISR, and belongs to whichever of them currently holds the
//! interrupt source: the ISR while the source is unmasked, the foreground
//! while it has masked it. Every foreground entry point masks the matching
//! source at the peripheral before touching a ring.
//!
//! # Backpressure
//!
//! When the rx ring fills the ISR masks the receive interrupt, so further
//! bytes stay in the hardware FIFO until [`Uart::receive`] makes room.
//! When the tx ring empties the ISR masks the transmit interrupt to stop it
//! re-triggering; [`Uart::send`] unmasks it again. The transmit interrupt is
//! assumed level-triggered: unmasking with data queued and FIFO space free
//! raises it immediately.
//!
//! # Blocking
//!
//! `send_byte` and `receive_byte` busy-wait on the FIFOs with no timeout. A
//! stalled peripheral hangs the caller.

use core::cell::{Cell, UnsafeCell};
use core::sync::atomic::{AtomicBool, Ordering};

use common::collections::CircularBuffer;
use common::sync::{CriticalSection, Irq};

use super::gpio::Gpio;
use crate::hal::gpio::{Direction, Function};
use crate::hal::interrupt::{InterruptController, InterruptHandler, IrqNumber, Priority};
use crate::hal::register::RegisterFile;
use crate::hal::serial::{NonBlockingSerial, SerialCallback, SerialConfig, SerialError, SerialPort};
use crate::hw::mc1322x::CPU_FREQ;
use crate::hw::mc1322x::gpio::GpioReg;
use crate::hw::mc1322x::uart::{
    BAUD_MOD, BR_INC_SHIFT, Control, FIFO_ADDR_DIFF_MASK, ITC_SRC_UART1, ITC_SRC_UART2, Status,
    UART1_BASE, UART2_BASE, UartReg,
};

/// Capacity of each software ring.
pub const BUFFER_SIZE: usize = 256;

/// The transmit interrupt fires while at least this many FIFO slots are
/// free.
pub const TX_TRIGGER_LEVEL: u32 = 31;

/// The receive interrupt fires while at least this many bytes are pending.
pub const RX_TRIGGER_LEVEL: u32 = 1;

/// UART instance.
#[repr(u32)]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum UartId {
    Uart1 = 0,
    Uart2 = 1,
}

/// Pads an instance is wired to.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct UartPins {
    pub tx: u8,
    pub rx: u8,
    pub cts: u8,
    pub rts: u8,
}

impl UartId {
    pub const ALL: [UartId; 2] = [UartId::Uart1, UartId::Uart2];

    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn base(self) -> usize {
        match self {
            UartId::Uart1 => UART1_BASE,
            UartId::Uart2 => UART2_BASE,
        }
    }

    pub const fn irq(self) -> IrqNumber {
        match self {
            UartId::Uart1 => ITC_SRC_UART1,
            UartId::Uart2 => ITC_SRC_UART2,
        }
    }

    pub const fn pins(self) -> UartPins {
        match self {
            UartId::Uart1 => UartPins {
                tx: 14,
                rx: 15,
                cts: 16,
                rts: 17,
            },
            UartId::Uart2 => UartPins {
                tx: 18,
                rx: 19,
                cts: 20,
                rts: 21,
            },
        }
    }
}

impl TryFrom<u32> for UartId {
    type Error = SerialError;

    fn try_from(id: u32) -> Result<Self, Self::Error> {
        match id {
            0 => Ok(UartId::Uart1),
            1 => Ok(UartId::Uart2),
            _ => Err(SerialError::InvalidParameter),
        }
    }
}

/// Value for the `BR` register at `baud_rate`.
///
/// `INC = baud * MOD / (CPU_FREQ / 16)` with `MOD = 9999`, which assumes 8x
/// oversampling. Rates whose increment is zero or does not fit the 16-bit
/// field are rejected.
pub fn baud_register(baud_rate: u32) -> Result<u32, SerialError> {
    let inc = baud_rate as u64 * BAUD_MOD as u64 / (CPU_FREQ >> 4) as u64;

    if inc == 0 || inc > 0xFFFF {
        return Err(SerialError::InvalidParameter);
    }

    Ok(((inc as u32) << BR_INC_SHIFT) | BAUD_MOD)
}

/// Clears the ISR re-entry flag when the handler returns.
struct IsrGuard<'a>(&'a AtomicBool);

impl<'a> IsrGuard<'a> {
    fn enter(flag: &'a AtomicBool) -> Self {
        debug_assert!(
            !flag.load(Ordering::Relaxed),
            "UART interrupt handler re-entered"
        );
        flag.store(true, Ordering::Relaxed);
        Self(flag)
    }
}

impl Drop for IsrGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Relaxed);
    }
}

/// MC1322x UART driver.
pub struct Uart<R> {
    id: UartId,
    regs: R,
    rx: UnsafeCell<CircularBuffer<BUFFER_SIZE>>,
    tx: UnsafeCell<CircularBuffer<BUFFER_SIZE>>,
    rx_callback: Cell<Option<SerialCallback>>,
    tx_callback: Cell<Option<SerialCallback>>,
    in_isr: AtomicBool,
}

// SAFETY: there is one core. The rings are only reached through
// `with_rx`/`with_tx`, whose callers own the ring by the masking discipline
// described in the module docs. The callback cells are written only inside
// an IRQ critical section and read only by the ISR.
unsafe impl<R: Sync> Sync for Uart<R> {}

impl<R: RegisterFile<UartReg>> Uart<R> {
    /// An uninitialized instance over `regs`.
    pub const fn new(id: UartId, regs: R) -> Self {
        Self {
            id,
            regs,
            rx: UnsafeCell::new(CircularBuffer::new()),
            tx: UnsafeCell::new(CircularBuffer::new()),
            rx_callback: Cell::new(None),
            tx_callback: Cell::new(None),
            in_isr: AtomicBool::new(false),
        }
    }

    pub fn id(&self) -> UartId {
        self.id
    }

    /// The backing register file.
    pub fn registers(&self) -> &R {
        &self.regs
    }

    /// Bring the instance up and leave it receiving under interrupts.
    ///
    /// `handler` is this instance's service routine as seen by the
    /// interrupt controller; it must end up calling
    /// [`handle_interrupt`](Self::handle_interrupt). Call once. The
    /// configuration is checked before any register is written.
    pub fn init<G, C>(
        &self,
        gpio: &Gpio<G>,
        intc: &mut C,
        handler: InterruptHandler,
        config: SerialConfig,
    ) -> Result<(), SerialError>
    where
        G: RegisterFile<GpioReg>,
        C: InterruptController,
    {
        if !config.is_8n1() {
            return Err(SerialError::InvalidParameter);
        }
        let br = baud_register(config.baud_rate)?;

        // The rate can only be changed with the UART disabled. This also
        // masks both interrupts.
        self.regs.write(
            UartReg::Con,
            (Control::MASK_TX_READY | Control::MASK_RX_READY).bits(),
        );
        self.regs.write(UartReg::Br, br);
        log::debug!("{:?}: BR = {:#010x}", self.id, br);

        // The pads only follow the peripheral while it is enabled.
        self.update_control(|con| con | Control::TXE | Control::RXE);

        let pins = self.id.pins();
        let pad_error = |_| SerialError::InvalidParameter;
        for pin in [pins.tx, pins.rx, pins.cts, pins.rts] {
            gpio.set_pin_func(pin, Function::Alternate1).map_err(pad_error)?;
        }
        gpio.set_pin_direction(pins.tx, Direction::Output).map_err(pad_error)?;
        gpio.set_pin_direction(pins.cts, Direction::Output).map_err(pad_error)?;
        gpio.set_pin_direction(pins.rx, Direction::Input).map_err(pad_error)?;
        gpio.set_pin_direction(pins.rts, Direction::Input).map_err(pad_error)?;

        self.with_rx(|rx| rx.init());
        self.with_tx(|tx| tx.init());

        self.regs.write(UartReg::TxCon, TX_TRIGGER_LEVEL);
        self.regs.write(UartReg::RxCon, RX_TRIGGER_LEVEL);

        let irq = self.id.irq();
        intc.set_priority(irq, Priority::Normal);
        intc.set_handler(irq, handler);
        intc.enable_interrupt(irq);

        self.rx_callback.set(None);
        self.tx_callback.set(None);

        self.set_masked(Control::MASK_RX_READY, false);

        log::info!("{:?}: {} baud 8N1", self.id, config.baud_rate);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Register helpers
    // ------------------------------------------------------------------

    /// Read-modify-write `CON` inside an IRQ critical section, so the
    /// ISR's own mask updates cannot land between the read and the write.
    fn update_control(&self, f: impl FnOnce(Control) -> Control) {
        CriticalSection::<Irq>::with(|_| {
            self.regs
                .modify(UartReg::Con, |con| f(Control::from_bits_retain(con)).bits());
        });
    }

    /// Set a mask bit, returning whether it was already set.
    fn mask(&self, source: Control) -> bool {
        let mut was_masked = false;
        self.update_control(|con| {
            was_masked = con.contains(source);
            con | source
        });
        was_masked
    }

    fn set_masked(&self, source: Control, masked: bool) {
        self.update_control(|mut con| {
            con.set(source, masked);
            con
        });
    }

    fn rx_fifo_pending(&self) -> u32 {
        self.regs.read(UartReg::RxCon) & FIFO_ADDR_DIFF_MASK
    }

    fn tx_fifo_free(&self) -> u32 {
        self.regs.read(UartReg::TxCon) & FIFO_ADDR_DIFF_MASK
    }

    fn wait_tx_space(&self) {
        while self.tx_fifo_free() == 0 {
            core::hint::spin_loop();
        }
    }

    fn wait_rx_data(&self) {
        while self.rx_fifo_pending() == 0 {
            core::hint::spin_loop();
        }
    }

    fn write_data(&self, byte: u8) {
        self.regs.write(UartReg::Data, byte as u32);
    }

    fn read_data(&self) -> u8 {
        self.regs.read(UartReg::Data) as u8
    }

    // ------------------------------------------------------------------
    // Ring access
    // ------------------------------------------------------------------

    /// Run `f` on the rx ring. The caller must own it: be the ISR, or have
    /// masked the receive interrupt.
    fn with_rx<T>(&self, f: impl FnOnce(&mut CircularBuffer<BUFFER_SIZE>) -> T) -> T {
        // SAFETY: ownership by masking (module docs); no other reference
        // to the ring is live while `f` runs.
        f(unsafe { &mut *self.rx.get() })
    }

    /// Run `f` on the tx ring. The caller must own it: be the ISR, or have
    /// masked the transmit interrupt.
    fn with_tx<T>(&self, f: impl FnOnce(&mut CircularBuffer<BUFFER_SIZE>) -> T) -> T {
        // SAFETY: see `with_rx`.
        f(unsafe { &mut *self.tx.get() })
    }

    // ------------------------------------------------------------------
    // Blocking API
    // ------------------------------------------------------------------

    /// Send one byte, waiting for FIFO space.
    ///
    /// Anything still queued in the tx ring is pushed out first, so bytes
    /// leave in the order they were handed to the driver. Returns once the
    /// byte is in the FIFO.
    pub fn send_byte(&self, byte: u8) {
        let was_masked = self.mask(Control::MASK_TX_READY);

        self.with_tx(|tx| {
            while !tx.is_empty() {
                self.wait_tx_space();
                self.write_data(tx.read());
            }
        });

        self.wait_tx_space();
        self.write_data(byte);

        self.set_masked(Control::MASK_TX_READY, was_masked);
    }

    /// Receive one byte, from the rx ring if it holds any, otherwise by
    /// waiting on the FIFO.
    pub fn receive_byte(&self) -> u8 {
        let was_masked = self.mask(Control::MASK_RX_READY);

        let byte = match self.with_rx(|rx| (!rx.is_empty()).then(|| rx.read())) {
            Some(byte) => byte,
            None => {
                self.wait_rx_data();
                self.read_data()
            }
        };

        self.set_masked(Control::MASK_RX_READY, was_masked);
        byte
    }

    // ------------------------------------------------------------------
    // Non-blocking API
    // ------------------------------------------------------------------

    /// Queue as much of `bytes` as fits in the tx ring.
    ///
    /// Returns the number queued, which is short of `bytes.len()` when the
    /// ring fills. The transmit interrupt is unmasked afterwards.
    pub fn send(&self, bytes: &[u8]) -> usize {
        self.mask(Control::MASK_TX_READY);

        let queued = self.with_tx(|tx| {
            let mut queued = 0;
            for &byte in bytes {
                if tx.is_full() {
                    break;
                }
                tx.write(byte);
                queued += 1;
            }
            queued
        });

        self.set_masked(Control::MASK_TX_READY, false);
        queued
    }

    /// Move up to `buffer.len()` bytes out of the rx ring.
    ///
    /// Returns the number moved, zero if nothing has arrived. The receive
    /// interrupt is unmasked afterwards, which also lifts backpressure.
    pub fn receive(&self, buffer: &mut [u8]) -> usize {
        self.mask(Control::MASK_RX_READY);

        let received = self.with_rx(|rx| {
            let mut received = 0;
            for slot in buffer.iter_mut() {
                if rx.is_empty() {
                    break;
                }
                *slot = rx.read();
                received += 1;
            }
            received
        });

        self.set_masked(Control::MASK_RX_READY, false);
        received
    }

    /// Bytes waiting in the rx ring.
    pub fn rx_pending(&self) -> usize {
        let was_masked = self.mask(Control::MASK_RX_READY);
        let len = self.with_rx(|rx| rx.len());
        self.set_masked(Control::MASK_RX_READY, was_masked);
        len
    }

    /// Bytes waiting in the tx ring.
    pub fn tx_pending(&self) -> usize {
        let was_masked = self.mask(Control::MASK_TX_READY);
        let len = self.with_tx(|tx| tx.len());
        self.set_masked(Control::MASK_TX_READY, was_masked);
        len
    }

    // ------------------------------------------------------------------
    // Callbacks
    // ------------------------------------------------------------------

    /// Install the function the ISR calls after filling the rx ring, or
    /// clear it with `None`.
    ///
    /// The callback runs in interrupt context. It must not block, and it
    /// must not wait on this instance (`receive_byte` with an empty FIFO
    /// never returns there). Calling the non-blocking `receive` is fine.
    pub fn set_rx_callback(&self, callback: Option<SerialCallback>) {
        CriticalSection::<Irq>::with(|_| self.rx_callback.set(callback));
    }

    /// Install the function the ISR calls after draining the tx ring, or
    /// clear it with `None`. Same constraints as
    /// [`set_rx_callback`](Self::set_rx_callback).
    pub fn set_tx_callback(&self, callback: Option<SerialCallback>) {
        CriticalSection::<Irq>::with(|_| self.tx_callback.set(callback));
    }

    // ------------------------------------------------------------------
    // Interrupt service
    // ------------------------------------------------------------------

    /// Service the instance's interrupt.
    ///
    /// Must only be called from the instance's interrupt handler.
    pub fn handle_interrupt(&self) {
        let _guard = IsrGuard::enter(&self.in_isr);

        // Reading STAT clears the latched line errors. They are dropped.
        let status = Status::from_bits_truncate(self.regs.read(UartReg::Stat));
        let con = Control::from_bits_retain(self.regs.read(UartReg::Con));

        // A ring only belongs to the ISR while its source is unmasked.
        if status.contains(Status::RX_READY) && !con.contains(Control::MASK_RX_READY) {
            self.service_rx();
        }

        if status.contains(Status::TX_READY) && !con.contains(Control::MASK_TX_READY) {
            self.service_tx();
        }
    }

    fn service_rx(&self) {
        self.with_rx(|rx| {
            while !rx.is_full() && self.rx_fifo_pending() > 0 {
                rx.write(self.read_data());
            }
        });

        if let Some(callback) = self.rx_callback.get() {
            callback();
        }

        if self.with_rx(|rx| rx.is_full()) {
            self.set_masked(Control::MASK_RX_READY, true);
        }
    }

    fn service_tx(&self) {
        self.with_tx(|tx| {
            while !tx.is_empty() && self.tx_fifo_free() > 0 {
                self.write_data(tx.read());
            }
        });

        if let Some(callback) = self.tx_callback.get() {
            callback();
        }

        if self.with_tx(|tx| tx.is_empty()) {
            self.set_masked(Control::MASK_TX_READY, true);
        }
    }
}

// ============================================================================
// HAL Implementation
// ============================================================================

impl<R: RegisterFile<UartReg>> SerialPort for Uart<R> {
    fn write_byte(&mut self, byte: u8) {
        self.send_byte(byte);
    }

    fn read_byte(&mut self) -> u8 {
        self.receive_byte()
    }
}

impl<R: RegisterFile<UartReg>> NonBlockingSerial for Uart<R> {
    fn send(&mut self, bytes: &[u8]) -> usize {
        Uart::send(self, bytes)
    }

    fn receive(&mut self, buffer: &mut [u8]) -> usize {
        Uart::receive(self, buffer)
    }

    fn set_rx_callback(&mut self, callback: Option<SerialCallback>) {
        Uart::set_rx_callback(self, callback);
    }

    fn set_tx_callback(&mut self, callback: Option<SerialCallback>) {
        Uart::set_tx_callback(self, callback);
    }
}

#[cfg(test)]
mod tests {
    use core::sync::atomic::AtomicUsize;

    use super::*;
    use crate::hal::serial::{DataBits, Parity};
    use crate::sim::{SimGpio, SimInterruptController, SimUart};

    fn no_handler() {}

    fn setup(id: UartId) -> (Uart<SimUart>, Gpio<SimGpio>, SimInterruptController) {
        let uart = Uart::new(id, SimUart::new());
        let gpio = Gpio::new(SimGpio::new());
        let mut intc = SimInterruptController::new();
        uart.init(&gpio, &mut intc, no_handler, SerialConfig::default())
            .unwrap();
        (uart, gpio, intc)
    }

    /// Run the ISR for as long as the level-triggered line stays high.
    /// The transmitter empties the FIFO before every check, as the
    /// hardware shifts bytes out on its own.
    fn service(uart: &Uart<SimUart>) {
        loop {
            uart.registers().transmit_all();
            if !uart.registers().interrupt_pending() {
                break;
            }
            uart.handle_interrupt();
        }
    }

    #[test]
    fn test_baud_register() {
        assert_eq!(baud_register(115_200), Ok(0x02FF_270F));
        assert_eq!(baud_register(9_600), Ok((63 << 16) | 9999));
        assert_eq!(baud_register(100), Err(SerialError::InvalidParameter));
        assert_eq!(baud_register(20_000_000), Err(SerialError::InvalidParameter));
    }

    #[test]
    fn test_uart_id_try_from() {
        assert_eq!(UartId::try_from(0), Ok(UartId::Uart1));
        assert_eq!(UartId::try_from(1), Ok(UartId::Uart2));
        assert_eq!(UartId::try_from(2), Err(SerialError::InvalidParameter));
        assert_eq!(UartId::try_from(7), Err(SerialError::InvalidParameter));
    }

    #[test]
    fn test_init_programs_uart1() {
        let (uart, gpio, intc) = setup(UartId::Uart1);
        let sim = uart.registers();

        assert_eq!(sim.read(UartReg::Br), 0x02FF_270F);
        assert_eq!(
            sim.control(),
            Control::TXE | Control::RXE | Control::MASK_TX_READY
        );
        assert_eq!(sim.trigger_levels(), (RX_TRIGGER_LEVEL, TX_TRIGGER_LEVEL));

        for pin in 14..=17 {
            assert_eq!(gpio.get_pin_func(pin), Ok(Function::Alternate1));
        }
        let dir = gpio.get_port_direction(0).unwrap();
        assert_eq!(dir & (0xF << 14), (1 << 14) | (1 << 16));

        assert_eq!(intc.priority(ITC_SRC_UART1), Some(Priority::Normal));
        assert_eq!(
            intc.handler(ITC_SRC_UART1).map(|h| h as usize),
            Some(no_handler as usize)
        );
        assert!(intc.is_enabled(ITC_SRC_UART1));
        assert!(!intc.is_enabled(ITC_SRC_UART2));
    }

    #[test]
    fn test_init_uart2_uses_its_own_pads() {
        let (_uart, gpio, intc) = setup(UartId::Uart2);

        for pin in 18..=21 {
            assert_eq!(gpio.get_pin_func(pin), Ok(Function::Alternate1));
        }
        for pin in 14..=17 {
            assert_eq!(gpio.get_pin_func(pin), Ok(Function::Normal));
        }
        let dir = gpio.get_port_direction(0).unwrap();
        assert_eq!(dir, (1 << 18) | (1 << 20));
        assert!(intc.is_enabled(ITC_SRC_UART2));
    }

    #[test]
    fn test_init_rejects_bad_config_without_touching_hardware() {
        let uart = Uart::new(UartId::Uart1, SimUart::new());
        let gpio = Gpio::new(SimGpio::new());
        let mut intc = SimInterruptController::new();

        let parity = SerialConfig {
            parity: Parity::Even,
            ..SerialConfig::default()
        };
        assert_eq!(
            uart.init(&gpio, &mut intc, no_handler, parity),
            Err(SerialError::InvalidParameter)
        );
        let seven_bit = SerialConfig {
            data_bits: DataBits::Seven,
            ..SerialConfig::default()
        };
        assert_eq!(
            uart.init(&gpio, &mut intc, no_handler, seven_bit),
            Err(SerialError::InvalidParameter)
        );
        assert_eq!(
            uart.init(&gpio, &mut intc, no_handler, SerialConfig::new_8n1(10)),
            Err(SerialError::InvalidParameter)
        );

        assert_eq!(uart.registers().accesses(), 0);
        assert_eq!(gpio.registers().accesses(), 0);
        assert!(!intc.is_enabled(ITC_SRC_UART1));
    }

    #[test]
    fn test_send_queues_until_full() {
        let (uart, _gpio, _intc) = setup(UartId::Uart1);

        assert_eq!(uart.send(b"AB"), 2);
        assert_eq!(uart.send(&[0x55; 300]), BUFFER_SIZE - 2);
        assert_eq!(uart.tx_pending(), BUFFER_SIZE);
        assert_eq!(uart.send(b"C"), 0);

        assert!(!uart.registers().control().contains(Control::MASK_TX_READY));
        assert!(uart.registers().written().is_empty());
    }

    #[test]
    fn test_interrupts_drain_tx_in_order() {
        let (uart, _gpio, _intc) = setup(UartId::Uart1);
        let message: [u8; 200] = core::array::from_fn(|i| i as u8);

        assert_eq!(uart.send(&message), message.len());
        service(&uart);

        assert_eq!(uart.registers().written().as_slice(), &message[..]);
        assert_eq!(uart.tx_pending(), 0);
        assert!(uart.registers().control().contains(Control::MASK_TX_READY));
    }

    #[test]
    fn test_receive_empty_returns_zero() {
        let (uart, _gpio, _intc) = setup(UartId::Uart1);
        let mut buf = [0u8; 8];

        assert_eq!(uart.receive(&mut buf), 0);
        assert_eq!(uart.receive(&mut []), 0);
        assert!(!uart.registers().control().contains(Control::MASK_RX_READY));
    }

    #[test]
    fn test_interrupts_fill_rx_and_notify() {
        static RX_CALLS: AtomicUsize = AtomicUsize::new(0);
        fn on_rx() {
            RX_CALLS.fetch_add(1, Ordering::Relaxed);
        }

        let (uart, _gpio, _intc) = setup(UartId::Uart1);
        uart.set_rx_callback(Some(on_rx));

        uart.registers().inject(b"hello");
        service(&uart);

        assert_eq!(RX_CALLS.load(Ordering::Relaxed), 1);
        assert_eq!(uart.rx_pending(), 5);

        let mut buf = [0u8; 16];
        assert_eq!(uart.receive(&mut buf), 5);
        assert_eq!(&buf[..5], b"hello");

        uart.set_rx_callback(None);
        uart.registers().inject(b"!");
        service(&uart);
        assert_eq!(RX_CALLS.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_tx_callback_runs_after_drain() {
        static TX_CALLS: AtomicUsize = AtomicUsize::new(0);
        fn on_tx() {
            TX_CALLS.fetch_add(1, Ordering::Relaxed);
        }

        let (uart, _gpio, _intc) = setup(UartId::Uart2);
        uart.set_tx_callback(Some(on_tx));

        uart.send(b"ping");
        service(&uart);

        assert_eq!(TX_CALLS.load(Ordering::Relaxed), 1);
        assert_eq!(uart.registers().written().as_slice(), b"ping");
    }

    #[test]
    fn test_rx_backpressure() {
        let (uart, _gpio, _intc) = setup(UartId::Uart1);
        let sim = uart.registers();
        let incoming: [u8; BUFFER_SIZE] = core::array::from_fn(|i| i as u8);

        for chunk in incoming.chunks(FIFO_DEPTH_BYTES) {
            assert_eq!(sim.inject(chunk), chunk.len());
            service(&uart);
        }
        assert_eq!(uart.rx_pending(), BUFFER_SIZE);
        assert!(sim.control().contains(Control::MASK_RX_READY));

        // Held in the FIFO while the ring is full.
        sim.inject(&[0xA0, 0xA1, 0xA2]);
        service(&uart);
        assert_eq!(sim.rx_pending(), 3);

        let mut buf = [0u8; 10];
        assert_eq!(uart.receive(&mut buf), 10);
        assert_eq!(&buf, &incoming[..10]);
        assert!(!sim.control().contains(Control::MASK_RX_READY));

        service(&uart);
        assert_eq!(sim.rx_pending(), 0);
        assert_eq!(uart.rx_pending(), BUFFER_SIZE - 10 + 3);
    }

    const FIFO_DEPTH_BYTES: usize = crate::hw::mc1322x::uart::FIFO_DEPTH as usize;

    #[test]
    fn test_send_byte_flushes_queue_first() {
        let (uart, _gpio, _intc) = setup(UartId::Uart1);

        assert_eq!(uart.send(b"xyz"), 3);
        uart.send_byte(b'!');

        assert_eq!(uart.registers().written().as_slice(), b"xyz!");
        assert_eq!(uart.tx_pending(), 0);
        // `send` left the source unmasked, so that is what comes back.
        assert!(!uart.registers().control().contains(Control::MASK_TX_READY));

        service(&uart);
        assert!(uart.registers().control().contains(Control::MASK_TX_READY));
        uart.send_byte(b'?');
        assert!(uart.registers().control().contains(Control::MASK_TX_READY));
    }

    #[test]
    fn test_receive_byte_prefers_ring() {
        let (uart, _gpio, _intc) = setup(UartId::Uart1);
        let sim = uart.registers();

        sim.inject(b"ab");
        service(&uart);
        sim.inject(b"c");

        assert_eq!(uart.receive_byte(), b'a');
        assert_eq!(uart.receive_byte(), b'b');
        // Ring empty: falls through to the FIFO.
        assert_eq!(uart.receive_byte(), b'c');
        assert!(!sim.control().contains(Control::MASK_RX_READY));
    }

    #[test]
    fn test_isr_clears_line_errors() {
        let (uart, _gpio, _intc) = setup(UartId::Uart1);
        let sim = uart.registers();

        sim.raise_error(Status::FE | Status::PE);
        sim.inject(b"z");
        service(&uart);

        assert!(sim.latched_errors().is_empty());
        assert_eq!(uart.receive_byte(), b'z');
    }

    #[test]
    fn test_isr_leaves_masked_ring_alone() {
        let (uart, _gpio, _intc) = setup(UartId::Uart1);
        let sim = uart.registers();

        // tx is masked after init; an rx entry must not touch the tx side.
        sim.inject(b"q");
        uart.handle_interrupt();
        assert!(sim.written().is_empty());
        assert_eq!(uart.rx_pending(), 1);
    }

    #[test]
    #[should_panic(expected = "re-entered")]
    fn test_isr_reentry_panics() {
        thread_local! {
            static NESTED: (Uart<SimUart>, Gpio<SimGpio>) =
                (Uart::new(UartId::Uart1, SimUart::new()), Gpio::new(SimGpio::new()));
        }

        fn reenter() {
            NESTED.with(|(uart, _)| uart.handle_interrupt());
        }

        NESTED.with(|(uart, gpio)| {
            let mut intc = SimInterruptController::new();
            uart.init(gpio, &mut intc, no_handler, SerialConfig::default())
                .unwrap();
            uart.set_rx_callback(Some(reenter));

            uart.registers().inject(b"x");
            uart.handle_interrupt();
        });
    }

    #[test]
    fn test_trait_interface() {
        fn exercise<S: NonBlockingSerial>(port: &mut S) -> usize {
            port.write(b"ok");
            port.send(b"queued")
        }

        let (mut uart, _gpio, _intc) = setup(UartId::Uart1);
        assert_eq!(exercise(&mut uart), 6);
        service(&uart);
        assert_eq!(uart.registers().written().as_slice(), b"okqueued");
    }
}
