use crate::constants::address_space::{RAM_SIZE, RAM_START};
use crate::error::Fault;
use crate::instructions::Size;
use crate::memory::MemoryType;
use crate::utils::{read_be, write_be};

/// 64 KiB of 68000 work RAM mapped at 0xFF0000
pub struct Ram {
    contents: [u8; RAM_SIZE],
}

impl Ram {
    pub fn new() -> Self {
        Self {
            contents: [0; RAM_SIZE],
        }
    }

    pub fn contents(&self) -> &[u8] {
        &self.contents
    }

    /// Offset into `contents` for an access, after alignment and bounds checks
    fn offset(address: u32, size: Size) -> Result<usize, Fault> {
        if size != Size::Byte && address & 1 != 0 {
            return Err(Fault::AddressError { address });
        }

        let offset = address.wrapping_sub(RAM_START) as usize;
        match offset.checked_add(size.bytes() as usize) {
            Some(end) if end <= RAM_SIZE => Ok(offset),
            _ => Err(Fault::BusError { address }),
        }
    }
}

impl MemoryType for Ram {
    fn read(&self, address: u32, size: Size) -> Result<u32, Fault> {
        let offset = Ram::offset(address, size)?;
        Ok(read_be(&self.contents[offset..], size))
    }

    fn write(&mut self, address: u32, size: Size, value: u32) -> Result<(), Fault> {
        let offset = Ram::offset(address, size)?;
        write_be(&mut self.contents[offset..], size, value);
        Ok(())
    }
}
