pub mod io;
mod ram;
mod rom;
mod tmss;
mod vdp;

pub use io::IoController;

use crate::constants::address_space::*;
use crate::constants::vectors::{VECTOR_INITIAL_PC, VECTOR_INITIAL_SP};
use crate::error::Fault;
use crate::instructions::Size;

/// Access interface every mapped region implements. Addresses are absolute
/// bus addresses; each region translates them to its own storage.
trait MemoryType {
    fn read(&self, address: u32, size: Size) -> Result<u32, Fault>;
    fn write(&mut self, address: u32, size: Size, value: u32) -> Result<(), Fault>;
}

/// 68000-side address space of the console.
/// Routes every bus access to the region that owns the address.
pub struct AddressSpace<'a> {
    rom: rom::ReadOnlyMemory<'a>, // Cartridge ROM
    ram: ram::Ram,                // Work RAM
    io: io::IoController,         // Controller ports
    tmss: tmss::Tmss,             // Security latch
    vdp: vdp::VdpRegisters,       // Video ports
}

/// Region selected for an address
enum Region {
    Rom,
    Ram,
    Io,
    Tmss,
    Vdp,
}

impl<'a> AddressSpace<'a> {
    /// Maps a ROM image. `controller_value` is what controller port reads
    /// return while no pad is emulated.
    pub fn new(rom_image: &'a [u8], controller_value: u32) -> Result<AddressSpace<'a>, Fault> {
        Ok(AddressSpace {
            rom: rom::ReadOnlyMemory::new(rom_image)?,
            ram: ram::Ram::new(),
            io: io::IoController::new(controller_value),
            tmss: tmss::Tmss::new(),
            vdp: vdp::VdpRegisters::new(),
        })
    }

    fn region(address: u32) -> Option<Region> {
        match address {
            ROM_START..=ROM_END => Some(Region::Rom),
            RAM_START..=RAM_END => Some(Region::Ram),
            CONTROLLER_IO_START..=CONTROLLER_IO_END => Some(Region::Io),
            TMSS_START..=TMSS_END => Some(Region::Tmss),
            VDP_START..=VDP_END if address & 1 == 0 => Some(Region::Vdp),
            _ => None,
        }
    }

    /// Main memory read handler
    pub fn read(&self, address: u32, size: Size) -> Result<u32, Fault> {
        match AddressSpace::region(address) {
            Some(Region::Rom) => self.rom.read(address, size),
            Some(Region::Ram) => self.ram.read(address, size),
            Some(Region::Io) => self.io.read(address, size),
            Some(Region::Tmss) => self.tmss.read(address, size),
            Some(Region::Vdp) => self.vdp.read(address, size),
            None => Err(Fault::UnsupportedAddress { address }),
        }
    }

    /// Main memory write handler
    pub fn write(&mut self, address: u32, size: Size, value: u32) -> Result<(), Fault> {
        match AddressSpace::region(address) {
            Some(Region::Rom) => self.rom.write(address, size, value),
            Some(Region::Ram) => self.ram.write(address, size, value),
            Some(Region::Io) => self.io.write(address, size, value),
            Some(Region::Tmss) => self.tmss.write(address, size, value),
            Some(Region::Vdp) => self.vdp.write(address, size, value),
            None => Err(Fault::InvalidAddress { address, size }),
        }
    }

    /// Initial supervisor stack pointer from the reset vector
    pub fn initial_sp(&self) -> Result<u32, Fault> {
        self.read(VECTOR_INITIAL_SP, Size::Long)
    }

    /// Initial program counter from the reset vector
    pub fn initial_pc(&self) -> Result<u32, Fault> {
        self.read(VECTOR_INITIAL_PC, Size::Long)
    }

    pub fn rom_len(&self) -> usize {
        self.rom.len()
    }

    pub fn ram(&self) -> &[u8] {
        self.ram.contents()
    }

    pub fn tmss_latch(&self) -> u32 {
        self.tmss.latch()
    }

    pub fn vdp_registers(&self) -> &[u8; VDP_SIZE] {
        self.vdp.registers()
    }
}
