use crate::hal::register::Register;

/// Base address of the GPIO controller.
pub const GPIO_BASE: usize = 0x8000_0000;

/// Number of pads.
pub const PIN_COUNT: u8 = 64;

/// Pads per 32-bit data/direction word.
pub const PINS_PER_PORT: u8 = 32;

/// Pads per function-select word (2 bits each).
pub const PINS_PER_FUNC_SEL: u8 = 16;

/// GPIO register block.
///
/// The block is 26 consecutive words. Every setting comes as a pair, one
/// word per port. `DataSet`/`DataReset` and `PadDirSet`/`PadDirReset` are
/// write-only strobes: each 1 bit sets or clears the matching bit of the
/// data or direction word in a single store.
#[repr(usize)]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum GpioReg {
    PadDir0 = 0x00,
    PadDir1 = 0x04,
    Data0 = 0x08,
    Data1 = 0x0C,
    PadPuEn0 = 0x10,
    PadPuEn1 = 0x14,
    FuncSel0 = 0x18,
    FuncSel1 = 0x1C,
    FuncSel2 = 0x20,
    FuncSel3 = 0x24,
    DataSel0 = 0x28,
    DataSel1 = 0x2C,
    PadPuSel0 = 0x30,
    PadPuSel1 = 0x34,
    PadHystEn0 = 0x38,
    PadHystEn1 = 0x3C,
    PadKeep0 = 0x40,
    PadKeep1 = 0x44,
    DataSet0 = 0x48,
    DataSet1 = 0x4C,
    DataReset0 = 0x50,
    DataReset1 = 0x54,
    PadDirSet0 = 0x58,
    PadDirSet1 = 0x5C,
    PadDirReset0 = 0x60,
    PadDirReset1 = 0x64,
}

impl GpioReg {
    /// Number of registers in the block.
    pub const COUNT: usize = 26;

    /// Word index within the block.
    pub const fn index(self) -> usize {
        self as usize / 4
    }

    pub const fn pad_dir(port: usize) -> Self {
        [GpioReg::PadDir0, GpioReg::PadDir1][port]
    }

    pub const fn data(port: usize) -> Self {
        [GpioReg::Data0, GpioReg::Data1][port]
    }

    pub const fn pad_pu_en(port: usize) -> Self {
        [GpioReg::PadPuEn0, GpioReg::PadPuEn1][port]
    }

    pub const fn pad_pu_sel(port: usize) -> Self {
        [GpioReg::PadPuSel0, GpioReg::PadPuSel1][port]
    }

    pub const fn data_set(port: usize) -> Self {
        [GpioReg::DataSet0, GpioReg::DataSet1][port]
    }

    pub const fn data_reset(port: usize) -> Self {
        [GpioReg::DataReset0, GpioReg::DataReset1][port]
    }

    pub const fn pad_dir_set(port: usize) -> Self {
        [GpioReg::PadDirSet0, GpioReg::PadDirSet1][port]
    }

    pub const fn pad_dir_reset(port: usize) -> Self {
        [GpioReg::PadDirReset0, GpioReg::PadDirReset1][port]
    }

    /// Function-select word `n` (0..4), covering pads `16n..16n+16`.
    pub const fn func_sel(n: usize) -> Self {
        [
            GpioReg::FuncSel0,
            GpioReg::FuncSel1,
            GpioReg::FuncSel2,
            GpioReg::FuncSel3,
        ][n]
    }
}

impl Register for GpioReg {
    #[inline(always)]
    fn offset(self) -> usize {
        self as usize
    }
}
