use crate::instructions::Size;
use thiserror::Error;

/// Every way a decode, execute or memory access can fail.
///
/// None of these are recovered internally: they bubble out of
/// `Cpu::step` and the driver decides what to do with them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Fault {
    #[error("address error: misaligned access at 0x{address:06X}")]
    AddressError { address: u32 },

    #[error("bus error: access past end of storage at 0x{address:06X}")]
    BusError { address: u32 },

    #[error("unsupported address 0x{address:06X}")]
    UnsupportedAddress { address: u32 },

    #[error("invalid {size} write to 0x{address:06X}")]
    InvalidAddress { address: u32, size: Size },

    #[error("ROM image too large: {length} bytes")]
    RomSizeTooLarge { length: usize },

    #[error("unsupported instruction 0x{opcode:04X}")]
    UnsupportedInstruction { opcode: u16 },

    #[error("unsupported source addressing mode {mode:03b}/{register:03b}")]
    UnsupportedSource { mode: u8, register: u8 },

    #[error("unsupported destination addressing mode {mode:03b}/{register:03b}")]
    UnsupportedDestination { mode: u8, register: u8 },

    #[error("unsupported operand for this instruction")]
    UnsupportedTarget,

    #[error("invalid size encoding {bits:02b}")]
    InvalidSize { bits: u8 },
}
