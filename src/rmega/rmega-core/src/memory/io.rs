use crate::error::Fault;
use crate::instructions::Size;
use crate::memory::MemoryType;

use log::debug;

/// Controller / version port block at 0xA10000-0xA1001F.
///
/// No pad is attached yet: every read returns the configured preset value,
/// truncated to the access width, and writes are accepted and dropped.
pub struct IoController {
    preset: u32,
}

impl IoController {
    pub fn new(preset: u32) -> Self {
        Self { preset }
    }
}

impl MemoryType for IoController {
    fn read(&self, address: u32, size: Size) -> Result<u32, Fault> {
        debug!("Reading {} from I/O port: 0x{:06X}", size, address);
        Ok(self.preset & size.mask())
    }

    fn write(&mut self, address: u32, size: Size, value: u32) -> Result<(), Fault> {
        debug!(
            "Discarding {} write to I/O port: 0x{:06X} with value 0x{:X}",
            size, address, value
        );
        Ok(())
    }
}
