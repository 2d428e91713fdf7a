use crate::constants::address_space::{VDP_SIZE, VDP_START};
use crate::error::Fault;
use crate::instructions::Size;
use crate::memory::MemoryType;
use crate::utils::write_be;
use log::debug;

/// VDP data/control port block at 0xC00000.
///
/// Only the raw bytes written to the ports are kept; no video state is
/// derived from them.
pub struct VdpRegisters {
    registers: [u8; VDP_SIZE],
}

impl VdpRegisters {
    pub fn new() -> Self {
        Self {
            registers: [0; VDP_SIZE],
        }
    }

    pub fn registers(&self) -> &[u8; VDP_SIZE] {
        &self.registers
    }
}

impl MemoryType for VdpRegisters {
    fn read(&self, address: u32, _size: Size) -> Result<u32, Fault> {
        Err(Fault::UnsupportedAddress { address })
    }

    fn write(&mut self, address: u32, size: Size, value: u32) -> Result<(), Fault> {
        if size == Size::Byte {
            return Err(Fault::InvalidAddress { address, size });
        }

        let index = (address - VDP_START) as usize;
        if index + size.bytes() as usize > VDP_SIZE {
            return Err(Fault::BusError { address });
        }

        write_be(&mut self.registers[index..], size, value);
        debug!(
            "VDP port 0x{:06X} <- 0x{:X} ({})",
            address,
            value & size.mask(),
            size
        );
        Ok(())
    }
}
