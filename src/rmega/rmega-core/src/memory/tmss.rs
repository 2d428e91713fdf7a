use crate::constants::address_space::TMSS_START;
use crate::error::Fault;
use crate::instructions::Size;
use crate::memory::MemoryType;
use log::debug;

/// TMSS security latch: one 32-bit register written as a long at 0xA14000,
/// or as two words at 0xA14000 (high half) and 0xA14002 (low half).
/// Nothing reads it back; the value only matters to hardware that checks it.
pub struct Tmss {
    latch: u32,
}

impl Tmss {
    pub fn new() -> Self {
        Self { latch: 0 }
    }

    pub fn latch(&self) -> u32 {
        self.latch
    }
}

impl MemoryType for Tmss {
    fn read(&self, address: u32, _size: Size) -> Result<u32, Fault> {
        Err(Fault::UnsupportedAddress { address })
    }

    fn write(&mut self, address: u32, size: Size, value: u32) -> Result<(), Fault> {
        self.latch = match (size, address - TMSS_START) {
            (Size::Long, 0) => value,
            (Size::Word, 0) => (self.latch & 0x0000_FFFF) | ((value & 0xFFFF) << 16),
            (Size::Word, 2) => (self.latch & 0xFFFF_0000) | (value & 0xFFFF),
            _ => return Err(Fault::InvalidAddress { address, size }),
        };
        debug!("TMSS latch now 0x{:08X}", self.latch);
        Ok(())
    }
}

#[cfg(test)]
mod tmss_tests {
    use super::*;

    #[test]
    fn test_long_write() {
        let mut tmss = Tmss::new();
        tmss.write(0xA14000, Size::Long, 0x5345_4741).unwrap();
        assert_eq!(tmss.latch(), 0x5345_4741);
    }

    #[test]
    fn test_word_halves() {
        let mut tmss = Tmss::new();
        tmss.write(0xA14000, Size::Word, 0x5345).unwrap();
        assert_eq!(tmss.latch(), 0x5345_0000);
        tmss.write(0xA14002, Size::Word, 0x4741).unwrap();
        assert_eq!(tmss.latch(), 0x5345_4741);
    }

    #[test]
    fn test_undefined_writes_rejected() {
        let mut tmss = Tmss::new();
        assert_eq!(
            tmss.write(0xA14002, Size::Long, 1),
            Err(Fault::InvalidAddress {
                address: 0xA14002,
                size: Size::Long
            })
        );
        assert_eq!(
            tmss.write(0xA14000, Size::Byte, 1),
            Err(Fault::InvalidAddress {
                address: 0xA14000,
                size: Size::Byte
            })
        );
        assert_eq!(
            tmss.write(0xA14001, Size::Word, 1),
            Err(Fault::InvalidAddress {
                address: 0xA14001,
                size: Size::Word
            })
        );
        assert_eq!(tmss.latch(), 0);
    }

    #[test]
    fn test_reads_unsupported() {
        let tmss = Tmss::new();
        assert_eq!(
            tmss.read(0xA14000, Size::Long),
            Err(Fault::UnsupportedAddress { address: 0xA14000 })
        );
    }
}
