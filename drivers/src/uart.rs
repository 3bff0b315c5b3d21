//! The two on-chip UARTs, addressed by instance id.
//!
//! Both instances are statically allocated. The application picks one
//! with a raw id (`0` for UART1, `1` for UART2), brings it up with
//! [`init`], and from then on moves bytes through the functions here. The
//! interrupt controller calls [`uart1_isr`] / [`uart2_isr`].

use crate::device_manager::{DeviceRegistry, SerialDevice};
use crate::hal::interrupt::{InterruptController, InterruptHandler};
use crate::hal::register::{Mmio, RegisterFile};
use crate::hal::serial::{SerialCallback, SerialConfig, SerialError};
use crate::hw::mc1322x::gpio::{GPIO_BASE, GpioReg};
use crate::hw::mc1322x::uart::{UART1_BASE, UART2_BASE, UartReg};
use crate::platform::mc1322x::{Gpio, Uart, UartId};

static GPIO: Gpio<Mmio> = Gpio::new(unsafe { Mmio::new(GPIO_BASE) });

static UARTS: [Uart<Mmio>; 2] = [
    Uart::new(UartId::Uart1, unsafe { Mmio::new(UART1_BASE) }),
    Uart::new(UartId::Uart2, unsafe { Mmio::new(UART2_BASE) }),
];

/// The driver instance behind `id`.
pub fn uart(id: UartId) -> &'static Uart<Mmio> {
    &UARTS[id.index()]
}

/// How an instance is reached once it is up: the service routine the
/// interrupt controller calls and the entry points published under its name.
struct Wiring {
    handler: InterruptHandler,
    device: SerialDevice,
}

fn wiring(id: UartId) -> Wiring {
    let handler: InterruptHandler = match id {
        UartId::Uart1 => uart1_isr,
        UartId::Uart2 => uart2_isr,
    };

    Wiring {
        handler,
        device: SerialDevice {
            id: id as u32,
            send,
            receive,
        },
    }
}

/// Initialize UART `id` at `baud_rate`, 8N1, and publish it as `name`.
///
/// The id and name are checked before any hardware is touched. Call once
/// per instance, during board bring-up.
pub fn init(
    id: u32,
    baud_rate: u32,
    name: &'static str,
    intc: &mut impl InterruptController,
    registry: &mut impl DeviceRegistry,
) -> Result<(), SerialError> {
    let id = UartId::try_from(id)?;
    bring_up(uart(id), &GPIO, wiring(id), baud_rate, name, intc, registry)
}

fn bring_up<R, G>(
    uart: &Uart<R>,
    gpio: &Gpio<G>,
    wiring: Wiring,
    baud_rate: u32,
    name: &'static str,
    intc: &mut impl InterruptController,
    registry: &mut impl DeviceRegistry,
) -> Result<(), SerialError>
where
    R: RegisterFile<UartReg>,
    G: RegisterFile<GpioReg>,
{
    if name.is_empty() {
        return Err(SerialError::InvalidParameter);
    }

    uart.init(gpio, intc, wiring.handler, SerialConfig::new_8n1(baud_rate))?;
    registry.register_serial(name, wiring.device);
    Ok(())
}

/// Send one byte, blocking until it is in the transmit FIFO.
pub fn send_byte(id: UartId, byte: u8) {
    uart(id).send_byte(byte);
}

/// Receive one byte, blocking until one is available.
pub fn receive_byte(id: UartId) -> u8 {
    uart(id).receive_byte()
}

/// Queue as many of `bytes` as fit, returning how many were queued.
pub fn send(id: u32, bytes: &[u8]) -> Result<usize, SerialError> {
    let id = UartId::try_from(id)?;
    Ok(uart(id).send(bytes))
}

/// Take up to `buffer.len()` received bytes, returning how many.
pub fn receive(id: u32, buffer: &mut [u8]) -> Result<usize, SerialError> {
    let id = UartId::try_from(id)?;
    Ok(uart(id).receive(buffer))
}

/// Install or clear the function called from the ISR after bytes arrive.
pub fn set_rx_callback(id: u32, callback: Option<SerialCallback>) -> Result<(), SerialError> {
    let id = UartId::try_from(id)?;
    uart(id).set_rx_callback(callback);
    Ok(())
}

/// Install or clear the function called from the ISR after the transmit
/// ring is drained into the FIFO.
pub fn set_tx_callback(id: u32, callback: Option<SerialCallback>) -> Result<(), SerialError> {
    let id = UartId::try_from(id)?;
    uart(id).set_tx_callback(callback);
    Ok(())
}

/// UART1 interrupt service routine.
pub fn uart1_isr() {
    UARTS[UartId::Uart1.index()].handle_interrupt();
}

/// UART2 interrupt service routine.
pub fn uart2_isr() {
    UARTS[UartId::Uart2.index()].handle_interrupt();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device_manager::DeviceManager;
    use crate::sim::{SimGpio, SimInterruptController, SimUart};

    fn noop() {}

    thread_local! {
        static SIM: (Uart<SimUart>, Gpio<SimGpio>) =
            (Uart::new(UartId::Uart2, SimUart::new()), Gpio::new(SimGpio::new()));
    }

    fn sim_isr() {
        SIM.with(|(uart, _)| uart.handle_interrupt());
    }

    fn sim_send(id: u32, bytes: &[u8]) -> Result<usize, SerialError> {
        UartId::try_from(id)?;
        Ok(SIM.with(|(uart, _)| uart.send(bytes)))
    }

    fn sim_receive(id: u32, buffer: &mut [u8]) -> Result<usize, SerialError> {
        UartId::try_from(id)?;
        Ok(SIM.with(|(uart, _)| uart.receive(buffer)))
    }

    fn sim_wiring() -> Wiring {
        Wiring {
            handler: sim_isr,
            device: SerialDevice {
                id: UartId::Uart2 as u32,
                send: sim_send,
                receive: sim_receive,
            },
        }
    }

    #[test]
    fn test_invalid_id_rejected() {
        let mut intc = SimInterruptController::new();
        let mut registry = DeviceManager::new();

        assert_eq!(
            init(7, 115_200, "uart7", &mut intc, &mut registry),
            Err(SerialError::InvalidParameter)
        );
        assert_eq!(registry.list().count(), 0);
        assert!(!intc.is_enabled(1) && !intc.is_enabled(2));

        let mut buf = [0u8; 4];
        assert_eq!(send(2, b"x"), Err(SerialError::InvalidParameter));
        assert_eq!(receive(u32::MAX, &mut buf), Err(SerialError::InvalidParameter));
        assert_eq!(set_rx_callback(2, Some(noop)), Err(SerialError::InvalidParameter));
        assert_eq!(set_tx_callback(9, None), Err(SerialError::InvalidParameter));
    }

    #[test]
    fn test_empty_name_rejected() {
        let mut intc = SimInterruptController::new();
        let mut registry = DeviceManager::new();

        assert_eq!(
            init(0, 115_200, "", &mut intc, &mut registry),
            Err(SerialError::InvalidParameter)
        );
        assert_eq!(registry.list().count(), 0);
        assert!(intc.handler(1).is_none());
    }

    #[test]
    fn test_instances_are_fixed() {
        assert_eq!(uart(UartId::Uart1).id(), UartId::Uart1);
        assert_eq!(uart(UartId::Uart2).id(), UartId::Uart2);
        assert_eq!(uart(UartId::Uart1).registers().base(), 0x8000_5000);
        assert_eq!(uart(UartId::Uart2).registers().base(), 0x8000_B000);
    }

    #[test]
    fn test_wiring_matches_instance() {
        for id in UartId::ALL {
            let wiring = wiring(id);
            assert_eq!(wiring.device.id, id as u32);
            assert_eq!(wiring.device.send as usize, send as usize);
            assert_eq!(wiring.device.receive as usize, receive as usize);
        }

        assert_eq!(wiring(UartId::Uart1).handler as usize, uart1_isr as usize);
        assert_eq!(wiring(UartId::Uart2).handler as usize, uart2_isr as usize);
    }

    #[test]
    fn test_bring_up_publishes_device() {
        let mut intc = SimInterruptController::new();
        let mut registry = DeviceManager::new();

        SIM.with(|(uart, gpio)| {
            bring_up(uart, gpio, sim_wiring(), 115_200, "radio", &mut intc, &mut registry)
        })
        .unwrap();

        let irq = UartId::Uart2.irq();
        assert_eq!(
            intc.handler(irq).map(|h| h as usize),
            Some(sim_isr as usize)
        );
        assert!(intc.is_enabled(irq));

        let radio = registry.serial("radio").unwrap();
        assert_eq!(radio.id, UartId::Uart2 as u32);
        assert_eq!(radio.send(b"hi"), Ok(2));

        // The controller dispatches to the registered routine, which moves
        // the queued bytes into the FIFO.
        assert!(intc.fire(irq));
        SIM.with(|(uart, _)| {
            assert_eq!(uart.registers().written().as_slice(), b"hi");
            uart.registers().inject(b"ok");
        });

        assert!(intc.fire(irq));
        let mut buf = [0u8; 4];
        assert_eq!(radio.receive(&mut buf), Ok(2));
        assert_eq!(&buf[..2], b"ok");
    }

    #[test]
    fn test_bring_up_rejects_empty_name() {
        let uart = Uart::new(UartId::Uart1, SimUart::new());
        let gpio = Gpio::new(SimGpio::new());
        let mut intc = SimInterruptController::new();
        let mut registry = DeviceManager::new();

        assert_eq!(
            bring_up(&uart, &gpio, wiring(UartId::Uart1), 115_200, "", &mut intc, &mut registry),
            Err(SerialError::InvalidParameter)
        );
        assert_eq!(uart.registers().accesses(), 0);
        assert_eq!(gpio.registers().accesses(), 0);
        assert_eq!(registry.list().count(), 0);
    }
}
