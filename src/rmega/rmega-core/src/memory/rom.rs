use crate::constants::address_space::ROM_MAX_SIZE;
use crate::error::Fault;
use crate::instructions::Size;
use crate::memory::MemoryType;
use crate::utils::read_be;
use log::warn;

/// Cartridge ROM: a borrowed image mapped from address 0
pub struct ReadOnlyMemory<'a> {
    image: &'a [u8],
}

impl<'a> ReadOnlyMemory<'a> {
    /// Wraps a ROM image, rejecting anything larger than the 4 MiB window
    pub fn new(image: &'a [u8]) -> Result<Self, Fault> {
        if image.len() > ROM_MAX_SIZE {
            return Err(Fault::RomSizeTooLarge {
                length: image.len(),
            });
        }
        Ok(Self { image })
    }

    pub fn len(&self) -> usize {
        self.image.len()
    }
}

impl<'a> MemoryType for ReadOnlyMemory<'a> {
    fn read(&self, address: u32, size: Size) -> Result<u32, Fault> {
        if size != Size::Byte && address & 1 != 0 {
            return Err(Fault::AddressError { address });
        }

        let offset = address as usize;
        match offset.checked_add(size.bytes() as usize) {
            Some(end) if end <= self.image.len() => Ok(read_be(&self.image[offset..], size)),
            _ => Err(Fault::BusError { address }),
        }
    }

    fn write(&mut self, address: u32, size: Size, _value: u32) -> Result<(), Fault> {
        warn!("Write operation is not allowed on ROM (0x{:06X})", address);
        Err(Fault::InvalidAddress { address, size })
    }
}
