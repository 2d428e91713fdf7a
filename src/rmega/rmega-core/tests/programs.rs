use rmega_core::cpu::{Cpu, RunState};
use rmega_core::error::Fault;
use rmega_core::instructions::{Instruction, Size};
use rmega_core::memory::AddressSpace;

const STEP_LIMIT: usize = 1000;

fn boot(image: &[u8], controller: u32) -> Cpu<'_> {
    let mem = AddressSpace::new(image, controller).unwrap();
    Cpu::new(mem).unwrap()
}

/// Step until STOP, returning the number of executed instructions
fn run_to_halt(cpu: &mut Cpu) -> Result<usize, Fault> {
    for steps in 1..=STEP_LIMIT {
        cpu.step()?;
        if !cpu.is_running() {
            return Ok(steps);
        }
    }
    panic!("no STOP within {} steps", STEP_LIMIT);
}

#[test]
fn two_nops_end_in_bus_error() {
    let mut cpu = boot(rmega_roms::TWO_NOPS, 0xFFFF_FFFF);
    assert_eq!(cpu.sp(), 0x00FF_00FE);

    assert_eq!(cpu.step(), Ok(Instruction::Nop));
    assert_eq!(cpu.step(), Ok(Instruction::Nop));
    assert_eq!(cpu.step(), Err(Fault::BusError { address: 12 }));
    assert_eq!(cpu.pc, 12);
    assert_eq!(cpu.state(), RunState::Running);
}

#[test]
fn countdown_loop() {
    let mut cpu = boot(rmega_roms::COUNTDOWN, 0);
    assert_eq!(run_to_halt(&mut cpu), Ok(12));
    assert_eq!(cpu.d[0], 0x0000_FFFF);
    assert_eq!(cpu.d[1], 0xFFFF_FFFB);
    assert_eq!(cpu.sr, 0x2700);
    assert_eq!(cpu.pc, 0x18);
}

#[test]
fn subroutine_call_returns() {
    let mut cpu = boot(rmega_roms::CALL, 0);
    let sp = cpu.sp();

    assert_eq!(run_to_halt(&mut cpu), Ok(4));
    assert_eq!(cpu.d[0], 0x2A);
    assert_eq!(cpu.sp(), sp);
    assert_eq!(cpu.read_memory(sp - 4, Size::Long), Ok(0x0A));
    assert_eq!(
        cpu.recent_pcs().collect::<Vec<_>>(),
        vec![0x08, 0x10, 0x16, 0x0A]
    );
}

#[test]
fn ram_store() {
    let mut cpu = boot(rmega_roms::RAM_STORE, 0);
    assert_eq!(run_to_halt(&mut cpu), Ok(6));

    let ram = cpu.memory().ram();
    assert_eq!(&ram[0..6], &[0xDE, 0xAD, 0xBE, 0xEF, 0x12, 0x34]);
    assert_eq!(cpu.a[0], 0x00FF_0004);
    assert_eq!(cpu.sr, 0x2700);
}

#[test]
fn tmss_unlock() {
    let mut cpu = boot(rmega_roms::TMSS_BOOT, 0xFFFF_FFFF);
    assert_eq!(run_to_halt(&mut cpu), Ok(8));
    assert_eq!(cpu.memory().tmss_latch(), 0x5345_4741);
    assert_eq!(cpu.a[5], 0x4C);
    assert_eq!(cpu.d[0], 0x0F);
}

#[test]
fn tmss_skipped_on_version_zero() {
    let mut cpu = boot(rmega_roms::TMSS_BOOT, 0);
    assert_eq!(run_to_halt(&mut cpu), Ok(8));
    assert_eq!(cpu.memory().tmss_latch(), 0);
    assert_eq!(cpu.d[0], 0);
}

#[test]
fn trace_disassembly() {
    let mut cpu = boot(rmega_roms::TMSS_BOOT, 0xFFFF_FFFF);
    let mut listing = Vec::new();
    while cpu.is_running() {
        listing.push(cpu.step().unwrap().to_string());
    }
    assert_eq!(
        listing,
        vec![
            "tst.l $00a10008",
            "bne.s *+8",
            "lea 52(pc),a5",
            "move.b $00a10001,d0",
            "andi.b #$f,d0",
            "beq.s *+12",
            "move.l #$53454741,$00a14000",
            "stop #$2700",
        ]
    );
}
