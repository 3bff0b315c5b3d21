use core::cell::Cell;

use crate::hal::register::RegisterFile;
use crate::hw::mc1322x::gpio::GpioReg;

/// GPIO register block held in memory.
pub struct SimGpio {
    words: [Cell<u32>; GpioReg::COUNT],
    accesses: Cell<usize>,
}

impl SimGpio {
    pub const fn new() -> Self {
        Self {
            words: [const { Cell::new(0) }; GpioReg::COUNT],
            accesses: Cell::new(0),
        }
    }

    /// Stored value of a register, bypassing access semantics.
    pub fn peek(&self, reg: GpioReg) -> u32 {
        self.words[reg.index()].get()
    }

    /// Overwrite a register, bypassing access semantics.
    pub fn poke(&self, reg: GpioReg, value: u32) {
        self.words[reg.index()].set(value);
    }

    /// Reads and writes performed through [`RegisterFile`].
    pub fn accesses(&self) -> usize {
        self.accesses.get()
    }

    fn strobe_target(reg: GpioReg) -> Option<(GpioReg, bool)> {
        match reg {
            GpioReg::DataSet0 => Some((GpioReg::Data0, true)),
            GpioReg::DataSet1 => Some((GpioReg::Data1, true)),
            GpioReg::DataReset0 => Some((GpioReg::Data0, false)),
            GpioReg::DataReset1 => Some((GpioReg::Data1, false)),
            GpioReg::PadDirSet0 => Some((GpioReg::PadDir0, true)),
            GpioReg::PadDirSet1 => Some((GpioReg::PadDir1, true)),
            GpioReg::PadDirReset0 => Some((GpioReg::PadDir0, false)),
            GpioReg::PadDirReset1 => Some((GpioReg::PadDir1, false)),
            _ => None,
        }
    }
}

impl Default for SimGpio {
    fn default() -> Self {
        Self::new()
    }
}

impl RegisterFile<GpioReg> for SimGpio {
    fn read(&self, reg: GpioReg) -> u32 {
        self.accesses.set(self.accesses.get() + 1);
        match Self::strobe_target(reg) {
            Some(_) => 0,
            None => self.peek(reg),
        }
    }

    fn write(&self, reg: GpioReg, value: u32) {
        self.accesses.set(self.accesses.get() + 1);
        match Self::strobe_target(reg) {
            Some((target, true)) => self.poke(target, self.peek(target) | value),
            Some((target, false)) => self.poke(target, self.peek(target) & !value),
            None => self.poke(reg, value),
        }
    }
}
