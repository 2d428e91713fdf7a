use super::{Condition, Register, Size, Target};
use crate::cpu::Cpu;
use crate::error::Fault;
use crate::utils::displace;
use log::debug;

/// Data movement: MOVE, LEA, MOVE to SR
pub trait LoadStore {
    fn move_data(&mut self, source: Target, destination: Target, size: Size) -> Result<(), Fault>;
    fn lea(&mut self, target: Target, destination: Register) -> Result<(), Fault>;
    fn move_to_sr(&mut self, value: u16) -> Result<(), Fault>;
}

/// Flag-producing and arithmetic operations: TST, ANDI, SUBQ
pub trait Arithmetic {
    fn tst(&mut self, target: Target, size: Size) -> Result<(), Fault>;
    fn andi(&mut self, source: Target, destination: Target, size: Size) -> Result<(), Fault>;
    fn subq(&mut self, immediate: Target, destination: Target, size: Size) -> Result<(), Fault>;
}

/// Branches, subroutine calls and loops
pub trait ControlFlow {
    fn bne(&mut self, target: Target, size: Size) -> Result<(), Fault>;
    fn beq(&mut self, target: Target, size: Size) -> Result<(), Fault>;
    fn bsr(&mut self, target: Target, size: Size) -> Result<(), Fault>;
    fn rts(&mut self) -> Result<(), Fault>;
    fn dbcc(&mut self, condition: Condition, register: Register, displacement: i16)
        -> Result<(), Fault>;
}

/// CPU control: NOP, STOP
pub trait System {
    fn nop(&mut self) -> Result<(), Fault>;
    fn stop(&mut self, value: u16) -> Result<(), Fault>;
}

impl<'a> LoadStore for Cpu<'a> {
    fn move_data(&mut self, source: Target, destination: Target, size: Size) -> Result<(), Fault> {
        let value = match source {
            Target::Immediate(value) => value & size.mask(),
            Target::PcDisplacement(_) | Target::Branch(_) => return Err(self.unsupported()),
            _ => self.read_operand(source, size)?,
        };

        let source_increment = match source {
            Target::Indirect {
                register,
                post_increment: true,
            } => Some(register),
            _ => None,
        };

        // An address register stepped by the source is seen stepped by the
        // destination, as the hardware does for move (an)+,(an)+
        let base = |cpu: &Cpu, register: u8| {
            let address = cpu.a[register as usize & 0x7];
            if source_increment == Some(register) {
                address.wrapping_add(size.bytes())
            } else {
                address
            }
        };

        let mut destination_increment = None;
        let mut register_result = None;
        match destination {
            Target::Register(register) => register_result = Some(register),
            Target::Absolute(address) => self.write_memory(address, size, value)?,
            Target::Indirect {
                register,
                post_increment,
            } => {
                let address = base(self, register);
                self.write_memory(address, size, value)?;
                if post_increment {
                    destination_increment = Some(register);
                }
            }
            Target::Displacement {
                register,
                displacement,
            } => {
                let address = displace(base(self, register), displacement);
                self.write_memory(address, size, value)?;
            }
            Target::Immediate(_) | Target::PcDisplacement(_) | Target::Branch(_) => {
                return Err(self.unsupported())
            }
        }

        // Both accesses succeeded: commit
        if let Some(register) = source_increment {
            self.post_increment(register, size);
        }
        if let Some(register) = destination_increment {
            self.post_increment(register, size);
        }
        if let Some(register) = register_result {
            self.write_register(register, size, value);
        }
        Ok(())
    }

    fn lea(&mut self, target: Target, destination: Register) -> Result<(), Fault> {
        let address = match target {
            // Relative to the extension word, which sits right before pc
            Target::PcDisplacement(displacement) => {
                displace(self.pc.wrapping_sub(2), displacement)
            }
            Target::Absolute(address) => address,
            Target::Indirect {
                register,
                post_increment: false,
            } => self.a[register as usize & 0x7],
            Target::Displacement {
                register,
                displacement,
            } => displace(self.a[register as usize & 0x7], displacement),
            _ => return Err(Fault::UnsupportedTarget),
        };
        self.write_register(destination, Size::Long, address);
        Ok(())
    }

    fn move_to_sr(&mut self, value: u16) -> Result<(), Fault> {
        // Only the condition code byte is modeled
        self.sr = (self.sr & 0xFF00) | (value & 0x00FF);
        Ok(())
    }
}

impl<'a> Arithmetic for Cpu<'a> {
    fn tst(&mut self, target: Target, size: Size) -> Result<(), Fault> {
        let value = self.read_operand(target, size)?;
        if let Target::Indirect {
            register,
            post_increment: true,
        } = target
        {
            self.post_increment(register, size);
        }
        self.set_test_flags(value, size);
        Ok(())
    }

    fn andi(&mut self, source: Target, destination: Target, size: Size) -> Result<(), Fault> {
        match (source, destination, size) {
            (Target::Immediate(mask), Target::Register(register), Size::Byte) => {
                let result = self.read_register(register, Size::Byte) & mask & 0xFF;
                self.write_register(register, Size::Byte, result);
                self.set_test_flags(result, Size::Byte);
                Ok(())
            }
            _ => Err(self.unsupported()),
        }
    }

    fn subq(&mut self, immediate: Target, destination: Target, size: Size) -> Result<(), Fault> {
        match (immediate, destination, size) {
            (Target::Immediate(data), Target::Register(register), Size::Long) => {
                let value = self.read_register(register, Size::Long).wrapping_sub(data);
                self.write_register(register, Size::Long, value);
                Ok(())
            }
            _ => Err(self.unsupported()),
        }
    }
}

impl<'a> ControlFlow for Cpu<'a> {
    fn bne(&mut self, target: Target, size: Size) -> Result<(), Fault> {
        let destination = self.branch_target(target, size)?;
        if Condition::NotEqual.evaluate(self.sr) {
            self.pc = destination;
        }
        Ok(())
    }

    fn beq(&mut self, target: Target, size: Size) -> Result<(), Fault> {
        let destination = self.branch_target(target, size)?;
        if Condition::Equal.evaluate(self.sr) {
            self.pc = destination;
        }
        Ok(())
    }

    fn bsr(&mut self, target: Target, size: Size) -> Result<(), Fault> {
        let destination = self.branch_target(target, size)?;
        let sp = self.sp().wrapping_sub(4);

        // Push first so a failed push leaves sp untouched
        self.write_memory(sp, Size::Long, self.pc)?;
        self.set_sp(sp);
        debug!("bsr 0x{:06X} -> 0x{:06X}", self.pc, destination);
        self.pc = destination;
        Ok(())
    }

    fn rts(&mut self) -> Result<(), Fault> {
        let sp = self.sp();
        let destination = self.read_memory(sp, Size::Long)?;
        self.set_sp(sp.wrapping_add(4));
        self.pc = destination;
        Ok(())
    }

    fn dbcc(
        &mut self,
        condition: Condition,
        register: Register,
        displacement: i16,
    ) -> Result<(), Fault> {
        // The terminating condition path is not modeled
        if condition.evaluate(self.sr) {
            return Err(self.unsupported());
        }

        let counter = self.read_register(register, Size::Word).wrapping_sub(1) & 0xFFFF;
        self.write_register(register, Size::Word, counter);

        // 0xFFFF: loop exhausted, fall through past the displacement word
        if counter != 0xFFFF {
            self.pc = displace(self.pc.wrapping_sub(2), displacement);
        }
        Ok(())
    }
}

impl<'a> System for Cpu<'a> {
    fn nop(&mut self) -> Result<(), Fault> {
        Ok(())
    }

    fn stop(&mut self, value: u16) -> Result<(), Fault> {
        self.sr = value;
        self.halt();
        Ok(())
    }
}

#[cfg(test)]
mod load_store_tests {
    use super::*;
    use crate::instructions::tests::{init_cpu, rom_with, TEST_PC};

    const RAM: u32 = 0x00FF_0000;

    #[test]
    fn test_move_immediate_to_register() {
        let image = rom_with(&[]);
        let mut cpu = init_cpu(&image);
        cpu.d[0] = 0xFFFF_FFFF;
        cpu.move_data(
            Target::Immediate(0x1234),
            Target::Register(Register::Data(0)),
            Size::Word,
        )
        .unwrap();
        assert_eq!(cpu.d[0], 0xFFFF_1234);
    }

    #[test]
    fn test_move_sets_no_flags() {
        let image = rom_with(&[]);
        let mut cpu = init_cpu(&image);
        cpu.sr = 0x2705;
        cpu.move_data(
            Target::Immediate(0),
            Target::Register(Register::Data(1)),
            Size::Long,
        )
        .unwrap();
        assert_eq!(cpu.sr, 0x2705);
    }

    #[test]
    fn test_move_post_increment_copy() {
        let image = rom_with(&[]);
        let mut cpu = init_cpu(&image);
        cpu.write_memory(RAM, Size::Long, 0xCAFE_BABE).unwrap();
        cpu.a[0] = RAM;
        cpu.a[1] = RAM + 0x100;

        let src = Target::Indirect {
            register: 0,
            post_increment: true,
        };
        let dst = Target::Indirect {
            register: 1,
            post_increment: true,
        };
        cpu.move_data(src, dst, Size::Long).unwrap();

        assert_eq!(cpu.read_memory(RAM + 0x100, Size::Long), Ok(0xCAFE_BABE));
        assert_eq!(cpu.a[0], RAM + 4);
        assert_eq!(cpu.a[1], RAM + 0x104);
    }

    #[test]
    fn test_move_same_register_increments() {
        let image = rom_with(&[]);
        let mut cpu = init_cpu(&image);
        cpu.write_memory(RAM, Size::Word, 0xBEEF).unwrap();
        cpu.a[2] = RAM;

        let both = Target::Indirect {
            register: 2,
            post_increment: true,
        };
        cpu.move_data(both, both, Size::Word).unwrap();

        assert_eq!(cpu.read_memory(RAM + 2, Size::Word), Ok(0xBEEF));
        assert_eq!(cpu.a[2], RAM + 4);
    }

    #[test]
    fn test_move_fault_commits_nothing() {
        let image = rom_with(&[]);
        let mut cpu = init_cpu(&image);
        cpu.a[0] = RAM;
        cpu.a[1] = RAM + 1;

        let src = Target::Indirect {
            register: 0,
            post_increment: true,
        };
        let dst = Target::Indirect {
            register: 1,
            post_increment: true,
        };
        assert_eq!(
            cpu.move_data(src, dst, Size::Long),
            Err(Fault::AddressError { address: RAM + 1 })
        );
        assert_eq!(cpu.a[0], RAM);
        assert_eq!(cpu.a[1], RAM + 1);
    }

    #[test]
    fn test_move_to_displacement_and_absolute() {
        let image = rom_with(&[]);
        let mut cpu = init_cpu(&image);
        cpu.a[6] = RAM + 0x20;
        cpu.d[1] = 0x0000_00A5;

        cpu.move_data(
            Target::Register(Register::Data(1)),
            Target::Displacement {
                register: 6,
                displacement: -8,
            },
            Size::Byte,
        )
        .unwrap();
        assert_eq!(cpu.read_memory(RAM + 0x18, Size::Byte), Ok(0xA5));

        cpu.move_data(
            Target::Immediate(0x5345_4741),
            Target::Absolute(0x00A1_4000),
            Size::Long,
        )
        .unwrap();
        assert_eq!(cpu.memory().tmss_latch(), 0x5345_4741);
    }

    #[test]
    fn test_move_unsupported_operands() {
        let image = rom_with(&[]);
        let mut cpu = init_cpu(&image);
        cpu.ir = 0x2EBC;
        assert_eq!(
            cpu.move_data(
                Target::Register(Register::Data(0)),
                Target::Immediate(0),
                Size::Long
            ),
            Err(Fault::UnsupportedInstruction { opcode: 0x2EBC })
        );
        assert_eq!(
            cpu.move_data(
                Target::PcDisplacement(4),
                Target::Register(Register::Data(0)),
                Size::Long
            ),
            Err(Fault::UnsupportedInstruction { opcode: 0x2EBC })
        );
    }

    #[test]
    fn test_lea_pc_relative() {
        let image = rom_with(&[]);
        let mut cpu = init_cpu(&image);
        // lea 52(pc),a5 at 0x200, pc already past it
        cpu.pc = 0x204;
        cpu.lea(Target::PcDisplacement(0x34), Register::Address(5))
            .unwrap();
        assert_eq!(cpu.a[5], 0x236);
    }

    #[test]
    fn test_lea_other_targets() {
        let image = rom_with(&[]);
        let mut cpu = init_cpu(&image);
        cpu.lea(Target::Absolute(0x00A1_0008), Register::Address(0))
            .unwrap();
        assert_eq!(cpu.a[0], 0x00A1_0008);

        cpu.lea(
            Target::Displacement {
                register: 0,
                displacement: -8,
            },
            Register::Address(1),
        )
        .unwrap();
        assert_eq!(cpu.a[1], 0x00A1_0000);

        assert_eq!(
            cpu.lea(Target::Immediate(4), Register::Address(2)),
            Err(Fault::UnsupportedTarget)
        );
    }

    #[test]
    fn test_move_to_sr_low_byte() {
        let image = rom_with(&[]);
        let mut cpu = init_cpu(&image);
        cpu.sr = 0xAB00;
        cpu.move_to_sr(0x2715).unwrap();
        assert_eq!(cpu.sr, 0xAB15);
        assert_eq!(cpu.pc, TEST_PC);
    }
}
