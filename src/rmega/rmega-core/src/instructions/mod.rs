pub mod instructions;

use core::fmt;

use crate::constants::status::*;
use crate::error::Fault;

// Import trait implementations for CPU instruction families
pub use instructions::Arithmetic;
pub use instructions::ControlFlow;
pub use instructions::LoadStore;
pub use instructions::System;

// Effective-address mode numbers (bits 5-3 of an EA field)
pub const MODE_DATA_REGISTER: u8 = 0b000;
pub const MODE_ADDRESS_REGISTER: u8 = 0b001;
pub const MODE_INDIRECT: u8 = 0b010;
pub const MODE_POST_INCREMENT: u8 = 0b011;
pub const MODE_DISPLACEMENT: u8 = 0b101;
pub const MODE_EXTENDED: u8 = 0b111;

// Register numbers selecting a mode-7 variant
pub const EXT_ABSOLUTE_LONG: u8 = 0b001;
pub const EXT_PC_DISPLACEMENT: u8 = 0b010;
pub const EXT_IMMEDIATE: u8 = 0b100;

/// Operand width
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Size {
    Byte,
    Word,
    Long,
}

impl Size {
    /// Decode the standard two-bit size field (00/01/10).
    pub fn from_bits(bits: u8) -> Result<Size, Fault> {
        match bits & 0b11 {
            0b00 => Ok(Size::Byte),
            0b01 => Ok(Size::Word),
            0b10 => Ok(Size::Long),
            bits => Err(Fault::InvalidSize { bits }),
        }
    }

    /// Decode the two-bit size field used by MOVE (01/11/10).
    pub fn from_move_bits(bits: u8) -> Result<Size, Fault> {
        match bits & 0b11 {
            0b01 => Ok(Size::Byte),
            0b11 => Ok(Size::Word),
            0b10 => Ok(Size::Long),
            bits => Err(Fault::InvalidSize { bits }),
        }
    }

    pub fn bytes(self) -> u32 {
        match self {
            Size::Byte => 1,
            Size::Word => 2,
            Size::Long => 4,
        }
    }

    pub fn mask(self) -> u32 {
        match self {
            Size::Byte => 0xFF,
            Size::Word => 0xFFFF,
            Size::Long => 0xFFFF_FFFF,
        }
    }

    pub fn sign_bit(self) -> u32 {
        match self {
            Size::Byte => 0x80,
            Size::Word => 0x8000,
            Size::Long => 0x8000_0000,
        }
    }

    fn suffix(self) -> &'static str {
        match self {
            Size::Byte => "b",
            Size::Word => "w",
            Size::Long => "l",
        }
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Size::Byte => "byte",
            Size::Word => "word",
            Size::Long => "long",
        };
        f.write_str(name)
    }
}

/// A general-purpose register by name (d0-d7, a0-a7)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Register {
    Data(u8),
    Address(u8),
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Register::Data(n) => write!(f, "d{}", n),
            Register::Address(7) => f.write_str("sp"),
            Register::Address(n) => write!(f, "a{}", n),
        }
    }
}

/// Where an operand lives, as resolved by the decoder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Absolute(u32),
    Immediate(u32),
    Register(Register),
    Indirect { register: u8, post_increment: bool },
    Displacement { register: u8, displacement: i16 },
    PcDisplacement(i16),
    Branch(i16),
}

impl Target {
    /// Re-encode the operand as the 6-bit mode/register field it was decoded
    /// from. Branch displacements live outside the EA field and yield `None`.
    pub fn ea_bits(&self) -> Option<u8> {
        let (mode, register) = match *self {
            Target::Register(Register::Data(n)) => (MODE_DATA_REGISTER, n),
            Target::Register(Register::Address(n)) => (MODE_ADDRESS_REGISTER, n),
            Target::Indirect {
                register,
                post_increment: false,
            } => (MODE_INDIRECT, register),
            Target::Indirect {
                register,
                post_increment: true,
            } => (MODE_POST_INCREMENT, register),
            Target::Displacement { register, .. } => (MODE_DISPLACEMENT, register),
            Target::Absolute(_) => (MODE_EXTENDED, EXT_ABSOLUTE_LONG),
            Target::PcDisplacement(_) => (MODE_EXTENDED, EXT_PC_DISPLACEMENT),
            Target::Immediate(_) => (MODE_EXTENDED, EXT_IMMEDIATE),
            Target::Branch(_) => return None,
        };
        Some((mode << 3) | (register & 0x7))
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Target::Absolute(address) => write!(f, "${:08x}", address),
            Target::Immediate(value) => write!(f, "#${:x}", value),
            Target::Register(register) => write!(f, "{}", register),
            Target::Indirect {
                register,
                post_increment,
            } => {
                write!(f, "({})", Register::Address(register))?;
                if post_increment {
                    f.write_str("+")?;
                }
                Ok(())
            }
            Target::Displacement {
                register,
                displacement,
            } => write!(f, "{}({})", displacement, Register::Address(register)),
            Target::PcDisplacement(displacement) => write!(f, "{}(pc)", displacement),
            Target::Branch(displacement) => write!(f, "*{:+}", i32::from(displacement) + 2),
        }
    }
}

/// 68000 condition codes, numbered as in bits 11-8 of Bcc/DBcc/Scc
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Condition {
    True,
    False,
    Higher,
    LowerOrSame,
    CarryClear,
    CarrySet,
    NotEqual,
    Equal,
    OverflowClear,
    OverflowSet,
    Plus,
    Minus,
    GreaterOrEqual,
    LessThan,
    GreaterThan,
    LessOrEqual,
}

impl Condition {
    pub fn from_bits(bits: u8) -> Condition {
        match bits & 0xF {
            0x0 => Condition::True,
            0x1 => Condition::False,
            0x2 => Condition::Higher,
            0x3 => Condition::LowerOrSame,
            0x4 => Condition::CarryClear,
            0x5 => Condition::CarrySet,
            0x6 => Condition::NotEqual,
            0x7 => Condition::Equal,
            0x8 => Condition::OverflowClear,
            0x9 => Condition::OverflowSet,
            0xA => Condition::Plus,
            0xB => Condition::Minus,
            0xC => Condition::GreaterOrEqual,
            0xD => Condition::LessThan,
            0xE => Condition::GreaterThan,
            _ => Condition::LessOrEqual,
        }
    }

    /// Evaluate against the condition code bits of `sr`
    pub fn evaluate(self, sr: u16) -> bool {
        let c = sr & FLAG_CARRY != 0;
        let v = sr & FLAG_OVERFLOW != 0;
        let z = sr & FLAG_ZERO != 0;
        let n = sr & FLAG_NEGATIVE != 0;

        match self {
            Condition::True => true,
            Condition::False => false,
            Condition::Higher => !c && !z,
            Condition::LowerOrSame => c || z,
            Condition::CarryClear => !c,
            Condition::CarrySet => c,
            Condition::NotEqual => !z,
            Condition::Equal => z,
            Condition::OverflowClear => !v,
            Condition::OverflowSet => v,
            Condition::Plus => !n,
            Condition::Minus => n,
            Condition::GreaterOrEqual => n == v,
            Condition::LessThan => n != v,
            Condition::GreaterThan => !z && n == v,
            Condition::LessOrEqual => z || n != v,
        }
    }

    fn mnemonic(self) -> &'static str {
        match self {
            Condition::True => "t",
            Condition::False => "f",
            Condition::Higher => "hi",
            Condition::LowerOrSame => "ls",
            Condition::CarryClear => "cc",
            Condition::CarrySet => "cs",
            Condition::NotEqual => "ne",
            Condition::Equal => "eq",
            Condition::OverflowClear => "vc",
            Condition::OverflowSet => "vs",
            Condition::Plus => "pl",
            Condition::Minus => "mi",
            Condition::GreaterOrEqual => "ge",
            Condition::LessThan => "lt",
            Condition::GreaterThan => "gt",
            Condition::LessOrEqual => "le",
        }
    }
}

/// Decoded instruction. Each variant carries only what its opcode encodes.
///
/// Branch sizes are `Size::Byte` for the short form (displacement inside the
/// opcode word) and `Size::Word` when a displacement word follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    Nop,
    MoveToSr { value: u16 },
    Tst { target: Target, size: Size },
    Bne { target: Target, size: Size },
    Beq { target: Target, size: Size },
    Bsr { target: Target, size: Size },
    Lea { target: Target, destination: Register },
    Move { source: Target, destination: Target, size: Size },
    Andi { source: Target, destination: Target, size: Size },
    Dbcc { condition: Condition, register: Register, displacement: i16 },
    Rts,
    Subq { immediate: Target, destination: Target, size: Size },
    Stop { value: u16 },
}

/// Size suffix for branches: `.s` for the short form
fn branch_suffix(size: Size) -> &'static str {
    match size {
        Size::Byte => "s",
        _ => size.suffix(),
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Instruction::Nop => f.write_str("nop"),
            Instruction::MoveToSr { value } => write!(f, "move.w #${:04x},sr", value),
            Instruction::Tst { target, size } => write!(f, "tst.{} {}", size.suffix(), target),
            Instruction::Bne { target, size } => {
                write!(f, "bne.{} {}", branch_suffix(size), target)
            }
            Instruction::Beq { target, size } => {
                write!(f, "beq.{} {}", branch_suffix(size), target)
            }
            Instruction::Bsr { target, size } => {
                write!(f, "bsr.{} {}", branch_suffix(size), target)
            }
            Instruction::Lea {
                target,
                destination,
            } => write!(f, "lea {},{}", target, destination),
            Instruction::Move {
                source,
                destination,
                size,
            } => write!(f, "move.{} {},{}", size.suffix(), source, destination),
            Instruction::Andi {
                source,
                destination,
                size,
            } => write!(f, "andi.{} {},{}", size.suffix(), source, destination),
            Instruction::Dbcc {
                condition,
                register,
                displacement,
            } => write!(
                f,
                "db{} {},*{:+}",
                condition.mnemonic(),
                register,
                i32::from(displacement) + 2
            ),
            Instruction::Rts => f.write_str("rts"),
            Instruction::Subq {
                immediate,
                destination,
                size,
            } => write!(f, "subq.{} {},{}", size.suffix(), immediate, destination),
            Instruction::Stop { value } => write!(f, "stop #${:04x}", value),
        }
    }
}

#[cfg(test)]
mod model_tests {
    use super::*;

    #[test]
    fn test_size_fields() {
        assert_eq!(Size::from_bits(0b00), Ok(Size::Byte));
        assert_eq!(Size::from_bits(0b10), Ok(Size::Long));
        assert_eq!(Size::from_bits(0b11), Err(Fault::InvalidSize { bits: 0b11 }));
        assert_eq!(Size::from_move_bits(0b11), Ok(Size::Word));
        assert_eq!(
            Size::from_move_bits(0b00),
            Err(Fault::InvalidSize { bits: 0b00 })
        );
    }

    #[test]
    fn test_conditions() {
        assert!(Condition::Equal.evaluate(FLAG_ZERO));
        assert!(!Condition::NotEqual.evaluate(FLAG_ZERO));
        assert!(!Condition::False.evaluate(0xFFFF));
        assert!(Condition::LessThan.evaluate(FLAG_NEGATIVE));
        assert!(!Condition::LessThan.evaluate(FLAG_NEGATIVE | FLAG_OVERFLOW));
        assert!(Condition::Higher.evaluate(0));
        assert!(Condition::LowerOrSame.evaluate(FLAG_CARRY));
    }

    #[test]
    fn test_disassembly() {
        let tst = Instruction::Tst {
            target: Target::Absolute(0x00A1_0008),
            size: Size::Long,
        };
        assert_eq!(tst.to_string(), "tst.l $00a10008");

        let bne = Instruction::Bne {
            target: Target::Branch(6),
            size: Size::Byte,
        };
        assert_eq!(bne.to_string(), "bne.s *+8");

        let mv = Instruction::Move {
            source: Target::Immediate(3),
            destination: Target::Indirect {
                register: 7,
                post_increment: true,
            },
            size: Size::Long,
        };
        assert_eq!(mv.to_string(), "move.l #$3,(sp)+");

        let dbf = Instruction::Dbcc {
            condition: Condition::False,
            register: Register::Data(0),
            displacement: -4,
        };
        assert_eq!(dbf.to_string(), "dbf d0,*-2");
    }
}
