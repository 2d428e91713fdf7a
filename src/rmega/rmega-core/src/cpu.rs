use crate::constants::status::*;
use crate::constants::*;
use crate::decoder::decode;
use crate::error::Fault;
use crate::instructions::{Arithmetic, ControlFlow, LoadStore, System};
use crate::instructions::{Instruction, Register, Size, Target};
use crate::memory::AddressSpace;
use crate::utils::{displace, is_negative, merge_sized};

use heapless::Deque;

/// Run state of the CPU. `Halted` is only entered through STOP and
/// only left through `reset`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Running,
    Halted,
}

/// Struct representing the CPU and its state
pub struct Cpu<'a> {
    mem: AddressSpace<'a>,             // Address space router
    pub d: [u32; DATA_REGISTERS],      // Data registers
    pub a: [u32; ADDRESS_REGISTERS],   // Address registers, a7 is sp
    pub pc: u32,                       // Program counter
    pub sr: u16,                       // Status register
    pub ir: u16,                       // Opcode word of the current instruction
    state: RunState,                   // Running or halted by STOP
    history: Deque<u32, PC_HISTORY_LEN>, // Addresses of recently executed instructions
}

impl<'a> Cpu<'a> {
    /// Creates a CPU over `mem` and seeds sp and pc from the reset vectors
    pub fn new(mem: AddressSpace<'a>) -> Result<Cpu<'a>, Fault> {
        let mut cpu = Cpu {
            mem,
            d: [0; DATA_REGISTERS],
            a: [0; ADDRESS_REGISTERS],
            pc: 0,
            sr: 0,
            ir: 0,
            state: RunState::Running,
            history: Deque::new(),
        };
        cpu.reset()?;
        Ok(cpu)
    }

    /// Reset CPU to startup state. Memory is left as it is.
    pub fn reset(&mut self) -> Result<(), Fault> {
        let sp = self.mem.initial_sp()?;
        let pc = self.mem.initial_pc()?;

        self.d = [0; DATA_REGISTERS];
        self.a = [0; ADDRESS_REGISTERS];
        self.a[STACK_POINTER] = sp;
        self.pc = pc;
        self.sr = 0;
        self.ir = 0;
        self.state = RunState::Running;
        self.history = Deque::new();
        Ok(())
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == RunState::Running
    }

    pub(crate) fn halt(&mut self) {
        self.state = RunState::Halted;
    }

    pub fn sp(&self) -> u32 {
        self.a[STACK_POINTER]
    }

    pub fn set_sp(&mut self, value: u32) {
        self.a[STACK_POINTER] = value;
    }

    pub fn memory(&self) -> &AddressSpace<'a> {
        &self.mem
    }

    pub fn memory_mut(&mut self) -> &mut AddressSpace<'a> {
        &mut self.mem
    }

    /// Oldest first
    pub fn recent_pcs(&self) -> impl Iterator<Item = u32> + '_ {
        self.history.iter().copied()
    }

    fn record_pc(&mut self, pc: u32) {
        if self.history.is_full() {
            self.history.pop_front();
        }
        self.history.push_back(pc).ok();
    }

    pub fn read_memory(&self, address: u32, size: Size) -> Result<u32, Fault> {
        self.mem.read(address, size)
    }

    pub fn write_memory(&mut self, address: u32, size: Size, value: u32) -> Result<(), Fault> {
        self.mem.write(address, size, value)
    }

    /// Read the low `size` bits of a register
    pub fn read_register(&self, register: Register, size: Size) -> u32 {
        let value = match register {
            Register::Data(n) => self.d[n as usize & 0x7],
            Register::Address(n) => self.a[n as usize & 0x7],
        };
        value & size.mask()
    }

    /// Write the low `size` bits of a register, keeping the rest
    pub fn write_register(&mut self, register: Register, size: Size, value: u32) {
        let slot = match register {
            Register::Data(n) => &mut self.d[n as usize & 0x7],
            Register::Address(n) => &mut self.a[n as usize & 0x7],
        };
        *slot = merge_sized(*slot, value, size);
    }

    /// Read a memory or register operand. Post-increment is left to the
    /// caller so it can be committed once the whole instruction succeeded.
    pub(crate) fn read_operand(&self, target: Target, size: Size) -> Result<u32, Fault> {
        match target {
            Target::Register(register) => Ok(self.read_register(register, size)),
            Target::Absolute(address) => self.mem.read(address, size),
            Target::Indirect { register, .. } => {
                self.mem.read(self.a[register as usize & 0x7], size)
            }
            Target::Displacement {
                register,
                displacement,
            } => {
                let address = displace(self.a[register as usize & 0x7], displacement);
                self.mem.read(address, size)
            }
            Target::Immediate(_) | Target::PcDisplacement(_) | Target::Branch(_) => {
                Err(Fault::UnsupportedTarget)
            }
        }
    }

    pub(crate) fn post_increment(&mut self, register: u8, size: Size) {
        let slot = &mut self.a[register as usize & 0x7];
        *slot = slot.wrapping_add(size.bytes());
    }

    /// Set N and Z from `value`, clear V and C. Other bits are kept.
    pub(crate) fn set_test_flags(&mut self, value: u32, size: Size) {
        let mut sr = self.sr & !(FLAGS_NZ | FLAGS_VC);
        if value & size.mask() == 0 {
            sr |= FLAG_ZERO;
        }
        if is_negative(value, size) {
            sr |= FLAG_NEGATIVE;
        }
        self.sr = sr;
    }

    /// Target of a Bcc/BSR, relative to the address after the opcode word
    pub(crate) fn branch_target(&self, target: Target, size: Size) -> Result<u32, Fault> {
        match target {
            Target::Branch(displacement) => {
                let base = match size {
                    Size::Byte => self.pc,
                    _ => self.pc.wrapping_sub(2),
                };
                Ok(displace(base, displacement))
            }
            _ => Err(Fault::UnsupportedTarget),
        }
    }

    /// Fault for an operand combination the current opcode cannot run with
    pub(crate) fn unsupported(&self) -> Fault {
        Fault::UnsupportedInstruction { opcode: self.ir }
    }

    /// Decode the instruction at pc without touching any state
    pub fn decode(&self) -> Result<(Instruction, u32), Fault> {
        decode(&self.mem, self.pc)
    }

    /// Run one decoded instruction. pc must already point past it.
    pub fn execute(&mut self, instruction: &Instruction) -> Result<(), Fault> {
        match *instruction {
            Instruction::Nop => self.nop(),
            Instruction::MoveToSr { value } => self.move_to_sr(value),
            Instruction::Tst { target, size } => self.tst(target, size),
            Instruction::Bne { target, size } => self.bne(target, size),
            Instruction::Beq { target, size } => self.beq(target, size),
            Instruction::Bsr { target, size } => self.bsr(target, size),
            Instruction::Lea {
                target,
                destination,
            } => self.lea(target, destination),
            Instruction::Move {
                source,
                destination,
                size,
            } => self.move_data(source, destination, size),
            Instruction::Andi {
                source,
                destination,
                size,
            } => self.andi(source, destination, size),
            Instruction::Dbcc {
                condition,
                register,
                displacement,
            } => self.dbcc(condition, register, displacement),
            Instruction::Rts => self.rts(),
            Instruction::Subq {
                immediate,
                destination,
                size,
            } => self.subq(immediate, destination, size),
            Instruction::Stop { value } => self.stop(value),
        }
    }

    /// CPU execution cycle handler.
    ///
    /// Decodes at pc, moves pc past the instruction and executes it. On a
    /// fault pc is put back on the opcode so the step can be inspected.
    pub fn step(&mut self) -> Result<Instruction, Fault> {
        let opcode_pc = self.pc;
        self.ir = self.mem.read(opcode_pc, Size::Word)? as u16;

        let (instruction, length) = self.decode()?;
        self.pc = opcode_pc.wrapping_add(length);

        if let Err(fault) = self.execute(&instruction) {
            self.pc = opcode_pc;
            return Err(fault);
        }

        self.record_pc(opcode_pc);
        Ok(instruction)
    }
}

// Tests for the CPU
#[cfg(test)]
mod cpu_tests {
    use super::*;
    use crate::instructions::tests::{init_cpu, rom_with, TEST_PC, TEST_SP};

    #[test]
    fn test_reset_from_vectors() {
        let image = rom_with(&[0x4E, 0x71]);
        let cpu = init_cpu(&image);
        assert_eq!(cpu.pc, TEST_PC);
        assert_eq!(cpu.sp(), TEST_SP);
        assert_eq!(cpu.a[STACK_POINTER], TEST_SP);
        assert!(cpu.is_running());
    }

    #[test]
    fn test_short_rom_cannot_reset() {
        let image = [0x00, 0xFF, 0x00, 0x00, 0x00, 0x00];
        let mem = AddressSpace::new(&image, 0).unwrap();
        assert_eq!(Cpu::new(mem).err(), Some(Fault::BusError { address: 4 }));
    }

    #[test]
    fn test_sub_word_register_writes() {
        let image = rom_with(&[]);
        let mut cpu = init_cpu(&image);
        cpu.d[3] = 0x1234_5678;
        cpu.write_register(Register::Data(3), Size::Byte, 0xFFAB);
        assert_eq!(cpu.d[3], 0x1234_56AB);
        cpu.write_register(Register::Data(3), Size::Word, 0xCDEF);
        assert_eq!(cpu.d[3], 0x1234_CDEF);
        assert_eq!(cpu.read_register(Register::Data(3), Size::Byte), 0xEF);

        cpu.write_register(Register::Address(7), Size::Long, 0x00FF_2000);
        assert_eq!(cpu.sp(), 0x00FF_2000);
    }

    #[test]
    fn test_two_nops_then_bus_error() {
        let image = [0x00, 0xFF, 0x00, 0xFE, 0, 0, 0, 8, 0x4E, 0x71, 0x4E, 0x71];
        let mut cpu = init_cpu(&image);

        assert_eq!(cpu.step(), Ok(Instruction::Nop));
        assert_eq!(cpu.pc, 10);
        assert_eq!(cpu.step(), Ok(Instruction::Nop));
        assert_eq!(cpu.pc, 12);
        assert_eq!(cpu.step(), Err(Fault::BusError { address: 12 }));
        assert_eq!(cpu.pc, 12);
        assert!(cpu.is_running());
        assert_eq!(cpu.recent_pcs().collect::<Vec<_>>(), vec![8, 10]);
    }

    #[test]
    fn test_faulting_execute_restores_pc() {
        // andi.w #$00ff,d0 decodes but only the byte form runs
        let image = rom_with(&[0x02, 0x40, 0x00, 0xFF]);
        let mut cpu = init_cpu(&image);
        cpu.d[0] = 0x1234;

        assert_eq!(
            cpu.step(),
            Err(Fault::UnsupportedInstruction { opcode: 0x0240 })
        );
        assert_eq!(cpu.pc, TEST_PC);
        assert_eq!(cpu.d[0], 0x1234);
        assert!(cpu.is_running());
        assert_eq!(cpu.recent_pcs().count(), 0);
    }

    #[test]
    fn test_stop_halts() {
        let image = rom_with(&[0x4E, 0x72, 0x27, 0x00]);
        let mut cpu = init_cpu(&image);

        assert_eq!(cpu.step(), Ok(Instruction::Stop { value: 0x2700 }));
        assert_eq!(cpu.sr, 0x2700);
        assert_eq!(cpu.state(), RunState::Halted);

        cpu.reset().unwrap();
        assert!(cpu.is_running());
        assert_eq!(cpu.pc, TEST_PC);
    }

    #[test]
    fn test_history_keeps_latest() {
        let code = [0x4E, 0x71].repeat(PC_HISTORY_LEN + 4);
        let image = rom_with(&code);
        let mut cpu = init_cpu(&image);

        for _ in 0..PC_HISTORY_LEN + 4 {
            cpu.step().unwrap();
        }

        let pcs: Vec<u32> = cpu.recent_pcs().collect();
        assert_eq!(pcs.len(), PC_HISTORY_LEN);
        assert_eq!(pcs[0], TEST_PC + 8);
        assert_eq!(
            *pcs.last().unwrap(),
            TEST_PC + 2 * (PC_HISTORY_LEN as u32 + 3)
        );
    }

    #[test]
    fn test_decode_has_no_side_effects() {
        let image = rom_with(&[0x4E, 0x75]);
        let cpu = init_cpu(&image);
        assert_eq!(cpu.decode(), Ok((Instruction::Rts, 2)));
        assert_eq!(cpu.pc, TEST_PC);
        assert_eq!(cpu.sp(), TEST_SP);
    }
}
