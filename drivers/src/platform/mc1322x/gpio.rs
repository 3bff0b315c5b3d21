//! MC1322x GPIO Controller Driver
//!
//! 64 pads in two 32-bit ports. Pin `n` is bit `n % 32` of port `n / 32`.
//!
//! Direction and data changes go through the set/reset strobe registers,
//! so each is a single store and needs no critical section even when an
//! interrupt handler drives pins of the same port.
//!
//! Function and pull selection are masked read-modify-writes of shared
//! words and are **not** atomic. Callers that change them from more than
//! one context must serialize those calls themselves.

use crate::hal::gpio::{Direction, Function, GpioController, GpioError, PinLevel, PullMode};
use crate::hal::register::RegisterFile;
use crate::hw::mc1322x::gpio::{GpioReg, PIN_COUNT, PINS_PER_FUNC_SEL, PINS_PER_PORT};

const PORT_COUNT: u8 = 2;

fn check_port(port: u8) -> Result<usize, GpioError> {
    if port < PORT_COUNT {
        Ok(port as usize)
    } else {
        Err(GpioError::InvalidParameter)
    }
}

fn check_pin(pin: u8) -> Result<(), GpioError> {
    if pin < PIN_COUNT {
        Ok(())
    } else {
        Err(GpioError::InvalidParameter)
    }
}

/// Port index and bit mask of a validated pin.
fn pin_port_and_bit(pin: u8) -> (usize, u32) {
    let port = (pin / PINS_PER_PORT) as usize;
    let bit = 1u32 << (pin % PINS_PER_PORT);
    (port, bit)
}

/// Function-select word index and field shift of a validated pin.
fn func_sel_and_shift(pin: u8) -> (usize, u32) {
    let reg = (pin / PINS_PER_FUNC_SEL) as usize;
    let shift = ((pin % PINS_PER_FUNC_SEL) * 2) as u32;
    (reg, shift)
}

/// MC1322x GPIO controller.
pub struct Gpio<R> {
    regs: R,
}

impl<R: RegisterFile<GpioReg>> Gpio<R> {
    pub const fn new(regs: R) -> Self {
        Self { regs }
    }

    /// The backing register file.
    pub fn registers(&self) -> &R {
        &self.regs
    }

    /// Set the pads selected by `mask` to `direction`. Other pads keep
    /// their direction.
    pub fn set_port_direction(
        &self,
        port: u8,
        mask: u32,
        direction: Direction,
    ) -> Result<(), GpioError> {
        let port = check_port(port)?;
        let reg = match direction {
            Direction::Input => GpioReg::pad_dir_reset(port),
            Direction::Output => GpioReg::pad_dir_set(port),
        };
        self.regs.write(reg, mask);
        Ok(())
    }

    pub fn set_pin_direction(&self, pin: u8, direction: Direction) -> Result<(), GpioError> {
        check_pin(pin)?;
        let (port, bit) = pin_port_and_bit(pin);
        self.set_port_direction(port as u8, bit, direction)
    }

    /// Direction word of a port; a 1 bit is an output.
    pub fn get_port_direction(&self, port: u8) -> Result<u32, GpioError> {
        let port = check_port(port)?;
        Ok(self.regs.read(GpioReg::pad_dir(port)))
    }

    /// Drive the pads selected by `mask` high.
    pub fn set_port(&self, port: u8, mask: u32) -> Result<(), GpioError> {
        let port = check_port(port)?;
        self.regs.write(GpioReg::data_set(port), mask);
        Ok(())
    }

    /// Drive the pads selected by `mask` low.
    pub fn clear_port(&self, port: u8, mask: u32) -> Result<(), GpioError> {
        let port = check_port(port)?;
        self.regs.write(GpioReg::data_reset(port), mask);
        Ok(())
    }

    pub fn set_pin(&self, pin: u8) -> Result<(), GpioError> {
        check_pin(pin)?;
        let (port, bit) = pin_port_and_bit(pin);
        self.regs.write(GpioReg::data_set(port), bit);
        Ok(())
    }

    pub fn clear_pin(&self, pin: u8) -> Result<(), GpioError> {
        check_pin(pin)?;
        let (port, bit) = pin_port_and_bit(pin);
        self.regs.write(GpioReg::data_reset(port), bit);
        Ok(())
    }

    /// Data word of a port.
    pub fn get_port(&self, port: u8) -> Result<u32, GpioError> {
        let port = check_port(port)?;
        Ok(self.regs.read(GpioReg::data(port)))
    }

    /// Level of a single pad. The pin is validated before any register is
    /// read.
    pub fn get_pin(&self, pin: u8) -> Result<PinLevel, GpioError> {
        check_pin(pin)?;
        let (port, bit) = pin_port_and_bit(pin);
        let val = self.regs.read(GpioReg::data(port));
        Ok(PinLevel::from(val & bit != 0))
    }

    /// Multiplex every pad selected by `mask` to `func`.
    ///
    /// Not atomic; see the module docs.
    pub fn set_port_func(&self, port: u8, func: Function, mask: u32) -> Result<(), GpioError> {
        let port = check_port(port)?;

        // Each port spans two function-select words of 16 pads.
        for half in 0..2usize {
            let pads = (mask >> (half * 16)) & 0xFFFF;
            if pads == 0 {
                continue;
            }

            let mut field_mask = 0u32;
            let mut field_value = 0u32;
            for i in 0..16 {
                if pads & (1 << i) != 0 {
                    field_mask |= 0b11 << (i * 2);
                    field_value |= (func as u32) << (i * 2);
                }
            }

            let reg = GpioReg::func_sel(port * 2 + half);
            self.regs.modify(reg, |v| (v & !field_mask) | field_value);
        }

        Ok(())
    }

    /// Multiplex one pad to `func`.
    ///
    /// Not atomic; see the module docs.
    pub fn set_pin_func(&self, pin: u8, func: Function) -> Result<(), GpioError> {
        check_pin(pin)?;
        let (reg, shift) = func_sel_and_shift(pin);
        self.regs.modify(GpioReg::func_sel(reg), |v| {
            (v & !(0b11 << shift)) | ((func as u32) << shift)
        });
        Ok(())
    }

    /// Function a pad is currently multiplexed to.
    pub fn get_pin_func(&self, pin: u8) -> Result<Function, GpioError> {
        check_pin(pin)?;
        let (reg, shift) = func_sel_and_shift(pin);
        let val = self.regs.read(GpioReg::func_sel(reg));
        Ok(Function::from_bits(val >> shift))
    }

    /// Configure the pad's pull resistor.
    ///
    /// Not atomic; see the module docs.
    pub fn set_pin_pull(&self, pin: u8, pull: PullMode) -> Result<(), GpioError> {
        check_pin(pin)?;
        let (port, bit) = pin_port_and_bit(pin);

        match pull {
            PullMode::None => {
                self.regs.modify(GpioReg::pad_pu_en(port), |v| v & !bit);
            }
            PullMode::Up | PullMode::Down => {
                // Select the direction first so the pad never pulls the
                // wrong way.
                let up = pull == PullMode::Up;
                self.regs.modify(GpioReg::pad_pu_sel(port), |v| {
                    if up { v | bit } else { v & !bit }
                });
                self.regs.modify(GpioReg::pad_pu_en(port), |v| v | bit);
            }
        }

        Ok(())
    }
}

// ============================================================================
// HAL Implementation
// ============================================================================

impl<R: RegisterFile<GpioReg>> GpioController for Gpio<R> {
    type Pin = u8;
    type Error = GpioError;

    fn set_direction(&mut self, pin: Self::Pin, direction: Direction) -> Result<(), Self::Error> {
        self.set_pin_direction(pin, direction)
    }

    fn set_function(&mut self, pin: Self::Pin, function: Function) -> Result<(), Self::Error> {
        self.set_pin_func(pin, function)
    }

    fn set_pull(&mut self, pin: Self::Pin, pull: PullMode) -> Result<(), Self::Error> {
        self.set_pin_pull(pin, pull)
    }

    fn set_high(&mut self, pin: Self::Pin) -> Result<(), Self::Error> {
        self.set_pin(pin)
    }

    fn set_low(&mut self, pin: Self::Pin) -> Result<(), Self::Error> {
        self.clear_pin(pin)
    }

    fn read(&self, pin: Self::Pin) -> Result<PinLevel, Self::Error> {
        self.get_pin(pin)
    }
}
