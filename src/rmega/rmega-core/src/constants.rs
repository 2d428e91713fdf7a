// Number of general-purpose registers in each bank (d0-d7, a0-a7)
pub const DATA_REGISTERS: usize = 8;
pub const ADDRESS_REGISTERS: usize = 8;

// Address register aliased as the stack pointer
pub const STACK_POINTER: usize = 7;

// Number of recently executed instruction addresses kept for fault reports
pub const PC_HISTORY_LEN: usize = 16;

pub mod address_space {
    // Cartridge ROM (read only)
    pub const ROM_START: u32 = 0x000000;
    pub const ROM_END: u32 = 0x3FFFFF;
    pub const ROM_MAX_SIZE: usize = 0x400000;

    // Work RAM
    pub const RAM_START: u32 = 0xFF0000;
    pub const RAM_END: u32 = 0xFFFFFF;
    pub const RAM_SIZE: usize = 0x10000;

    // Controller / version I/O block
    pub const CONTROLLER_IO_START: u32 = 0xA10000;
    pub const CONTROLLER_IO_END: u32 = 0xA1001F;

    // TMSS security latch
    pub const TMSS_START: u32 = 0xA14000;
    pub const TMSS_END: u32 = 0xA14003;

    // VDP data/control ports
    pub const VDP_START: u32 = 0xC00000;
    pub const VDP_END: u32 = 0xC0000F;
    pub const VDP_SIZE: usize = 0x10;
}

pub mod vectors {
    // Reset vectors at the base of ROM
    pub const VECTOR_INITIAL_SP: u32 = 0x000000;
    pub const VECTOR_INITIAL_PC: u32 = 0x000004;
}

pub mod status {
    // Condition code bits of the status register
    pub const FLAG_CARRY: u16 = 1 << 0;
    pub const FLAG_OVERFLOW: u16 = 1 << 1;
    pub const FLAG_ZERO: u16 = 1 << 2;
    pub const FLAG_NEGATIVE: u16 = 1 << 3;

    pub const FLAGS_NZ: u16 = FLAG_NEGATIVE | FLAG_ZERO;
    pub const FLAGS_VC: u16 = FLAG_OVERFLOW | FLAG_CARRY;
}

pub mod opcodes {
    // Opcode words matched literally before any class mask
    pub const OPCODE_NOP: u16 = 0x4E71;
    pub const OPCODE_STOP: u16 = 0x4E72;
    pub const OPCODE_RTS: u16 = 0x4E75;
    pub const OPCODE_MOVE_TO_SR: u16 = 0x46FC;

    // Upper-byte class identifiers
    pub const CLASS_TST: u8 = 0x4A;
    pub const CLASS_ANDI: u8 = 0x02;

    // Class masks and the pattern they must produce
    pub const MASK_MOVE: u16 = 0xC000;
    pub const MASK_BRANCH: u16 = 0xF000;
    pub const PATTERN_BRANCH: u16 = 0x6000;
    pub const MASK_LEA: u16 = 0xF1C0;
    pub const PATTERN_LEA: u16 = 0x41C0;
    pub const MASK_DBCC: u16 = 0xF0F8;
    pub const PATTERN_DBCC: u16 = 0x50C8;
    pub const MASK_SUBQ: u16 = 0xF100;
    pub const PATTERN_SUBQ: u16 = 0x5100;

    // Branch condition codes handled by the decoder
    pub const BRANCH_BSR: u8 = 0x1;
    pub const BRANCH_BNE: u8 = 0x6;
    pub const BRANCH_BEQ: u8 = 0x7;
}
