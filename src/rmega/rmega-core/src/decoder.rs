use crate::constants::opcodes::*;
use crate::error::Fault;
use crate::instructions::*;
use crate::memory::AddressSpace;

/// Which side of the instruction an effective address sits on.
/// Only decides the fault raised for an unsupported mode.
#[derive(Clone, Copy)]
enum Role {
    Source,
    Destination,
}

impl Role {
    fn unsupported(self, mode: u8, register: u8) -> Fault {
        match self {
            Role::Source => Fault::UnsupportedSource { mode, register },
            Role::Destination => Fault::UnsupportedDestination { mode, register },
        }
    }
}

/// Sequential reader over the instruction stream starting at `pc`
struct WordStream<'m, 'a> {
    mem: &'m AddressSpace<'a>,
    pc: u32,
    next: u32,
}

impl<'m, 'a> WordStream<'m, 'a> {
    fn word(&mut self) -> Result<u16, Fault> {
        let word = self.mem.read(self.next, Size::Word)? as u16;
        self.next = self.next.wrapping_add(2);
        Ok(word)
    }

    fn long(&mut self) -> Result<u32, Fault> {
        let long = self.mem.read(self.next, Size::Long)?;
        self.next = self.next.wrapping_add(4);
        Ok(long)
    }

    fn consumed(&self) -> u32 {
        self.next.wrapping_sub(self.pc)
    }
}

/// Resolve a 3-bit mode / 3-bit register pair, pulling any extension words
fn decode_ea(
    stream: &mut WordStream,
    mode: u8,
    register: u8,
    size: Size,
    role: Role,
) -> Result<Target, Fault> {
    let target = match (mode, register) {
        (MODE_DATA_REGISTER, n) => Target::Register(Register::Data(n)),
        (MODE_ADDRESS_REGISTER, n) => Target::Register(Register::Address(n)),
        (MODE_INDIRECT, n) => Target::Indirect {
            register: n,
            post_increment: false,
        },
        (MODE_POST_INCREMENT, n) => Target::Indirect {
            register: n,
            post_increment: true,
        },
        (MODE_DISPLACEMENT, n) => Target::Displacement {
            register: n,
            displacement: stream.word()? as i16,
        },
        (MODE_EXTENDED, EXT_ABSOLUTE_LONG) => Target::Absolute(stream.long()?),
        (MODE_EXTENDED, EXT_PC_DISPLACEMENT) if matches!(role, Role::Source) => {
            Target::PcDisplacement(stream.word()? as i16)
        }
        (MODE_EXTENDED, EXT_IMMEDIATE) if matches!(role, Role::Source) => {
            let value = match size {
                // Byte immediates occupy the low half of a full extension word
                Size::Byte => u32::from(stream.word()?) & 0xFF,
                Size::Word => u32::from(stream.word()?),
                Size::Long => stream.long()?,
            };
            Target::Immediate(value)
        }
        _ => return Err(role.unsupported(mode, register)),
    };
    Ok(target)
}

/// Source EA held in bits 5-0
fn decode_source_ea(stream: &mut WordStream, opcode: u16, size: Size) -> Result<Target, Fault> {
    let mode = ((opcode >> 3) & 0x7) as u8;
    let register = (opcode & 0x7) as u8;
    decode_ea(stream, mode, register, size, Role::Source)
}

/// Destination EA held in bits 5-0 (immediate-to-EA and quick forms)
fn decode_destination_ea(
    stream: &mut WordStream,
    opcode: u16,
    size: Size,
) -> Result<Target, Fault> {
    let mode = ((opcode >> 3) & 0x7) as u8;
    let register = (opcode & 0x7) as u8;
    decode_ea(stream, mode, register, size, Role::Destination)
}

/// Standard size field in bits 7-6
fn size_field(opcode: u16) -> Result<Size, Fault> {
    Size::from_bits(((opcode >> 6) & 0x3) as u8)
}

fn decode_tst(stream: &mut WordStream, opcode: u16) -> Result<Instruction, Fault> {
    let size = size_field(opcode)?;
    let target = decode_source_ea(stream, opcode, size)?;
    Ok(Instruction::Tst { target, size })
}

fn decode_move(stream: &mut WordStream, opcode: u16) -> Result<Instruction, Fault> {
    let size = Size::from_move_bits(((opcode >> 12) & 0x3) as u8)?;
    // Source extension words precede the destination's
    let source = decode_source_ea(stream, opcode, size)?;

    let mode = ((opcode >> 6) & 0x7) as u8;
    let register = ((opcode >> 9) & 0x7) as u8;
    let destination = decode_ea(stream, mode, register, size, Role::Destination)?;

    Ok(Instruction::Move {
        source,
        destination,
        size,
    })
}

fn decode_branch(stream: &mut WordStream, opcode: u16) -> Result<Instruction, Fault> {
    let condition = ((opcode >> 8) & 0xF) as u8;
    match condition {
        BRANCH_BNE | BRANCH_BEQ | BRANCH_BSR => {}
        // BRA and the remaining Bcc conditions are not modeled
        _ => return Err(Fault::UnsupportedInstruction { opcode }),
    }

    // A zero displacement byte means a 16-bit displacement word follows
    let (target, size) = match opcode as u8 {
        0 => (Target::Branch(stream.word()? as i16), Size::Word),
        short => (Target::Branch(i16::from(short as i8)), Size::Byte),
    };

    Ok(match condition {
        BRANCH_BNE => Instruction::Bne { target, size },
        BRANCH_BEQ => Instruction::Beq { target, size },
        _ => Instruction::Bsr { target, size },
    })
}

fn decode_lea(stream: &mut WordStream, opcode: u16) -> Result<Instruction, Fault> {
    let destination = Register::Address(((opcode >> 9) & 0x7) as u8);
    let target = decode_source_ea(stream, opcode, Size::Long)?;
    Ok(Instruction::Lea {
        target,
        destination,
    })
}

fn decode_andi(stream: &mut WordStream, opcode: u16) -> Result<Instruction, Fault> {
    let size = size_field(opcode)?;
    let source = decode_ea(stream, MODE_EXTENDED, EXT_IMMEDIATE, size, Role::Source)?;
    let destination = decode_destination_ea(stream, opcode, size)?;
    Ok(Instruction::Andi {
        source,
        destination,
        size,
    })
}

fn decode_dbcc(stream: &mut WordStream, opcode: u16) -> Result<Instruction, Fault> {
    let condition = Condition::from_bits((opcode >> 8) as u8);
    let register = Register::Data((opcode & 0x7) as u8);
    let displacement = stream.word()? as i16;
    Ok(Instruction::Dbcc {
        condition,
        register,
        displacement,
    })
}

fn decode_subq(stream: &mut WordStream, opcode: u16) -> Result<Instruction, Fault> {
    // Quick data 0 encodes 8
    let data = match (opcode >> 9) & 0x7 {
        0 => 8,
        n => u32::from(n),
    };
    let size = size_field(opcode)?;
    let destination = decode_destination_ea(stream, opcode, size)?;
    Ok(Instruction::Subq {
        immediate: Target::Immediate(data),
        destination,
        size,
    })
}

/// Classify an opcode word: literal encodings first, then opcode classes
fn decode_opcode(stream: &mut WordStream, opcode: u16) -> Result<Instruction, Fault> {
    match opcode {
        OPCODE_NOP => return Ok(Instruction::Nop),
        OPCODE_STOP => {
            return Ok(Instruction::Stop {
                value: stream.word()?,
            })
        }
        OPCODE_MOVE_TO_SR => {
            return Ok(Instruction::MoveToSr {
                value: stream.word()?,
            })
        }
        OPCODE_RTS => return Ok(Instruction::Rts),
        _ => {}
    }

    let upper = (opcode >> 8) as u8;
    let size_bits = (opcode >> 6) & 0x3;

    if upper == CLASS_TST {
        decode_tst(stream, opcode)
    } else if opcode & MASK_MOVE == 0 && opcode & 0x3000 != 0 {
        decode_move(stream, opcode)
    } else if opcode & MASK_BRANCH == PATTERN_BRANCH {
        decode_branch(stream, opcode)
    } else if opcode & MASK_LEA == PATTERN_LEA {
        decode_lea(stream, opcode)
    } else if upper == CLASS_ANDI {
        decode_andi(stream, opcode)
    } else if opcode & MASK_DBCC == PATTERN_DBCC {
        decode_dbcc(stream, opcode)
    } else if opcode & MASK_SUBQ == PATTERN_SUBQ && size_bits != 0x3 {
        decode_subq(stream, opcode)
    } else {
        Err(Fault::UnsupportedInstruction { opcode })
    }
}

/// Decode the instruction at `pc`.
///
/// Returns the instruction and the total number of bytes it occupies,
/// opcode word and extension words included. Nothing is mutated.
pub fn decode(mem: &AddressSpace, pc: u32) -> Result<(Instruction, u32), Fault> {
    let mut stream = WordStream { mem, pc, next: pc };
    let opcode = stream.word()?;
    let instruction = decode_opcode(&mut stream, opcode)?;
    Ok((instruction, stream.consumed()))
}
