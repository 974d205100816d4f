//! Register/flag invariants and round-trip laws.

use cpu_z80::Z80;
use emu_core::{Bus, IoBus};

struct FlatMemory {
    mem: [u8; 65536],
}

impl FlatMemory {
    fn new() -> Self {
        Self { mem: [0; 65536] }
    }

    fn load(&mut self, addr: u16, bytes: &[u8]) {
        for (i, b) in bytes.iter().enumerate() {
            self.mem[addr as usize + i] = *b;
        }
    }
}

impl Bus for FlatMemory {
    fn read(&mut self, address: u16) -> u8 {
        self.mem[address as usize]
    }

    fn write(&mut self, address: u16, value: u8) {
        self.mem[address as usize] = value;
    }
}

impl IoBus for FlatMemory {
    fn read_io(&mut self, _port: u16) -> u8 {
        0xFF
    }

    fn write_io(&mut self, _port: u16, _value: u8) {}
}

#[test]
fn refresh_counter_preserves_bit7() {
    let mut cpu = Z80::new();
    let mut mem = FlatMemory::new();
    cpu.regs_mut().r = 0x80;
    mem.load(0x0000, &[0x00]); // NOP

    cpu.step(&mut mem);

    assert_eq!(cpu.regs().r & 0x80, 0x80);
}

#[test]
fn clocks_accumulate_by_returned_t_states() {
    let mut cpu = Z80::new();
    let mut mem = FlatMemory::new();
    mem.load(0x0000, &[0x00, 0x00]);

    let t1 = cpu.step(&mut mem);
    let t2 = cpu.step(&mut mem);

    assert_eq!(cpu.clocks(), u64::from(t1 + t2));
}

#[test]
fn halt_costs_four_t_states_and_freezes_pc() {
    let mut cpu = Z80::new();
    let mut mem = FlatMemory::new();
    mem.load(0x0000, &[0x76]); // HALT

    cpu.step(&mut mem);
    assert!(cpu.halted());
    let pc_after_halt = cpu.pc();

    let t = cpu.step(&mut mem);
    assert_eq!(t, 4);
    assert_eq!(cpu.pc(), pc_after_halt);
}

#[test]
fn retn_restores_iff1_from_iff2() {
    let mut cpu = Z80::new();
    let mut mem = FlatMemory::new();
    cpu.regs_mut().sp = 0xFFFE;
    cpu.regs_mut().iff2 = true;
    mem.load(0x0000, &[0xED, 0x45]); // RETN

    cpu.step(&mut mem);

    assert!(cpu.regs().iff1);
}

#[test]
fn nmi_copies_iff1_into_iff2_then_clears_iff1() {
    let mut cpu = Z80::new();
    let mut mem = FlatMemory::new();
    cpu.regs_mut().sp = 0xFFFE;
    cpu.regs_mut().iff1 = true;

    cpu.nmi(&mut mem);

    assert!(cpu.regs().iff2);
    assert!(!cpu.regs().iff1);
    assert_eq!(cpu.pc(), 0x0066);
}

#[test]
fn push_pop_round_trip_is_identity() {
    let mut cpu = Z80::new();
    let mut mem = FlatMemory::new();
    cpu.regs_mut().sp = 0xFFFE;
    cpu.regs_mut().set_bc(0xBEEF);
    let sp_before = cpu.regs().sp;
    mem.load(0x0000, &[0xC5, 0xC1]); // PUSH BC; POP BC

    cpu.step(&mut mem);
    cpu.step(&mut mem);

    assert_eq!(cpu.regs().bc(), 0xBEEF);
    assert_eq!(cpu.regs().sp, sp_before);
}

#[test]
fn exx_twice_is_identity() {
    let mut cpu = Z80::new();
    cpu.regs_mut().set_bc(0x1234);
    cpu.regs_mut().b_shadow = 0xAA;
    cpu.regs_mut().exx();
    cpu.regs_mut().exx();
    assert_eq!(cpu.regs().bc(), 0x1234);
}

#[test]
fn ex_af_af_twice_is_identity() {
    let mut cpu = Z80::new();
    cpu.regs_mut().set_af(0x1234);
    cpu.regs_mut().ex_af_af();
    cpu.regs_mut().ex_af_af();
    assert_eq!(cpu.regs().af(), 0x1234);
}

#[test]
fn add_7f_plus_1_sets_sign_half_overflow() {
    let mut cpu = Z80::new();
    let mut mem = FlatMemory::new();
    cpu.regs_mut().a = 0x7F;
    mem.load(0x0000, &[0xC6, 0x01]); // ADD A, 0x01

    cpu.step(&mut mem);

    assert_eq!(cpu.regs().a, 0x80);
    assert_ne!(cpu.regs().f & cpu_z80::flags::SF, 0);
    assert_ne!(cpu.regs().f & cpu_z80::flags::HF, 0);
    assert_ne!(cpu.regs().f & cpu_z80::flags::PF, 0);
}

#[test]
fn inc_ff_wraps_to_zero_with_half_carry() {
    let mut cpu = Z80::new();
    let mut mem = FlatMemory::new();
    cpu.regs_mut().a = 0xFF;
    mem.load(0x0000, &[0x3C]); // INC A

    cpu.step(&mut mem);

    assert_eq!(cpu.regs().a, 0x00);
    assert_ne!(cpu.regs().f & cpu_z80::flags::ZF, 0);
    assert_ne!(cpu.regs().f & cpu_z80::flags::HF, 0);
}

#[test]
fn bit_instruction_tests_individual_bits() {
    let mut cpu = Z80::new();
    let mut mem = FlatMemory::new();
    cpu.regs_mut().a = 0x80;
    mem.load(0x0000, &[0xCB, 0x7F, 0xCB, 0x47]); // BIT 7,A; BIT 0,A

    cpu.step(&mut mem);
    assert_eq!(cpu.regs().f & cpu_z80::flags::ZF, 0);

    cpu.step(&mut mem);
    assert_ne!(cpu.regs().f & cpu_z80::flags::ZF, 0);
}

#[test]
fn djnz_falls_through_when_b_reaches_zero() {
    let mut cpu = Z80::new();
    let mut mem = FlatMemory::new();
    cpu.regs_mut().b = 2;
    // DJNZ -2 (loop on itself), followed by NOP
    mem.load(0x0000, &[0x10, 0xFE, 0x00]);

    cpu.step(&mut mem); // B: 2 -> 1, jumps back to 0x0000
    assert_eq!(cpu.pc(), 0x0000);
    assert_eq!(cpu.regs().b, 1);

    cpu.step(&mut mem); // B: 1 -> 0, falls through
    assert_eq!(cpu.pc(), 0x0002);
    assert_eq!(cpu.regs().b, 0);
}

#[test]
fn dd_prefixed_ld_bc_immediate_is_a_wasted_prefix_not_add_ix_bc() {
    let mut cpu = Z80::new();
    let mut mem = FlatMemory::new();
    cpu.regs_mut().ix = 0x0001;
    // DD 01 34 12 -> LD BC,0x1234 with a wasted DD prefix (BC is not
    // index-substituted); must not be decoded as ADD IX,BC.
    mem.load(0x0000, &[0xDD, 0x01, 0x34, 0x12]);

    let t = cpu.step(&mut mem);

    assert_eq!(cpu.regs().bc(), 0x1234);
    assert_eq!(cpu.regs().ix, 0x0001);
    assert_eq!(cpu.pc(), 0x0004);
    assert_eq!(t, 14);
}

#[test]
fn cpi_on_matching_byte_sets_zero_and_decrements_bc() {
    let mut cpu = Z80::new();
    let mut mem = FlatMemory::new();
    cpu.regs_mut().a = 0x42;
    cpu.regs_mut().set_hl(0x2000);
    cpu.regs_mut().set_bc(5);
    mem.mem[0x2000] = 0x42;
    mem.load(0x0000, &[0xED, 0xA1]); // CPI

    cpu.step(&mut mem);

    assert_ne!(cpu.regs().f & cpu_z80::flags::ZF, 0);
    assert_eq!(cpu.regs().bc(), 4);
}
