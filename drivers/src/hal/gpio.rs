//! GPIO (General Purpose Input/Output) Hardware Abstraction Layer.
//!
//! This module defines platform-independent types and traits for GPIO
//! control.

/// Pin logic level.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PinLevel {
    /// Logic low (0V or ground).
    Low,
    /// Logic high (VDD).
    High,
}

impl From<bool> for PinLevel {
    fn from(value: bool) -> Self {
        if value {
            PinLevel::High
        } else {
            PinLevel::Low
        }
    }
}

/// Pad direction.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Direction {
    Input,
    Output,
}

/// Pin multiplexing function.
///
/// The discriminant is the 2-bit code stored in the function-select
/// registers.
#[repr(u32)]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Function {
    /// Plain digital I/O.
    Normal = 0b00,
    /// Alternate function 1.
    Alternate1 = 0b01,
    /// Alternate function 2.
    Alternate2 = 0b10,
    /// Alternate function 3.
    Alternate3 = 0b11,
}

impl Function {
    /// Decode a 2-bit function-select field.
    pub const fn from_bits(bits: u32) -> Self {
        match bits & 0b11 {
            0b00 => Function::Normal,
            0b01 => Function::Alternate1,
            0b10 => Function::Alternate2,
            _ => Function::Alternate3,
        }
    }
}

/// Internal pull resistor configuration.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PullMode {
    /// No pull resistor (high impedance).
    None,
    /// Enable internal pull-up resistor.
    Up,
    /// Enable internal pull-down resistor.
    Down,
}

/// GPIO controller trait.
///
/// This trait represents a GPIO controller capable of configuring
/// and controlling multiple GPIO pins.
///
/// # Type Parameters
///
/// - `Pin`: Platform-specific pin identifier (typically `u8` or typed)
/// - `Error`: Error type for operations that can fail
pub trait GpioController {
    /// Platform-specific pin identifier.
    type Pin: Copy + Clone;

    /// Error type for GPIO operations.
    type Error: core::fmt::Debug;

    /// Configure a pin as input or output.
    fn set_direction(&mut self, pin: Self::Pin, direction: Direction) -> Result<(), Self::Error>;

    /// Select the function a pin is multiplexed to.
    fn set_function(&mut self, pin: Self::Pin, function: Function) -> Result<(), Self::Error>;

    /// Configure the internal pull resistor for a pin.
    fn set_pull(&mut self, pin: Self::Pin, pull: PullMode) -> Result<(), Self::Error>;

    /// Set a pin to logic high.
    fn set_high(&mut self, pin: Self::Pin) -> Result<(), Self::Error>;

    /// Set a pin to logic low.
    fn set_low(&mut self, pin: Self::Pin) -> Result<(), Self::Error>;

    /// Read the current logic level of a pin.
    fn read(&self, pin: Self::Pin) -> Result<PinLevel, Self::Error>;

    /// Set the pin to a specific level.
    fn set_level(&mut self, pin: Self::Pin, level: PinLevel) -> Result<(), Self::Error> {
        match level {
            PinLevel::High => self.set_high(pin),
            PinLevel::Low => self.set_low(pin),
        }
    }

    /// Toggle the output state of a pin.
    fn toggle(&mut self, pin: Self::Pin) -> Result<(), Self::Error> {
        let level = self.read(pin)?;
        self.set_level(
            pin,
            if level == PinLevel::High {
                PinLevel::Low
            } else {
                PinLevel::High
            },
        )
    }
}

/// GPIO errors.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum GpioError {
    /// Port not in {0, 1} or pin not below 64.
    InvalidParameter,
}
