//! End-to-end scenarios against small hand-assembled programs.

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
fn bcd_addition_via_daa() {
    let mut cpu = Z80::new();
    let mut mem = FlatMemory::new();
    mem.load(0x0000, &[0x3E, 0x15, 0xC6, 0x27, 0x27]);

    cpu.step(&mut mem);
    cpu.step(&mut mem);
    cpu.step(&mut mem);

    assert_eq!(cpu.regs().a, 0x42);
}

#[test]
fn call_ret_round_trip() {
    let mut cpu = Z80::new();
    let mut mem = FlatMemory::new();
    mem.load(0x0000, &[0x31, 0xFE, 0xFF, 0xCD, 0x10, 0x00, 0x76]);
    mem.load(0x0010, &[0x3E, 0x99, 0xC9]);

    for _ in 0..4 {
        cpu.step(&mut mem);
    }

    assert_eq!(cpu.regs().a, 0x99);
    assert_eq!(cpu.regs().sp, 0xFFFE);
    assert_eq!(cpu.pc(), 0x0006);
}

#[test]
fn ldir_block_copy() {
    let mut cpu = Z80::new();
    let mut mem = FlatMemory::new();
    mem.load(0x1000, &[0x11, 0x22, 0x33, 0x44]);
    mem.load(
        0x0000,
        &[0x21, 0x00, 0x10, 0x11, 0x00, 0x20, 0x01, 0x04, 0x00, 0xED, 0xB0],
    );

    loop {
        cpu.step(&mut mem);
        if cpu.pc() == 0x000B {
            break;
        }
    }

    assert_eq!(&mem.mem[0x2000..0x2004], &[0x11, 0x22, 0x33, 0x44]);
    assert_eq!(cpu.regs().bc(), 0);
}

#[test]
fn im1_interrupt_delivery() {
    let mut cpu = Z80::new();
    let mut mem = FlatMemory::new();
    mem.load(0x0038, &[0xC9]);
    cpu.regs_mut().pc = 0x1234;
    cpu.regs_mut().sp = 0xFFFE;
    cpu.regs_mut().im = 1;
    cpu.regs_mut().iff1 = true;

    cpu.interrupt_with_data(&mut mem, 0xFF);
    assert_eq!(cpu.pc(), 0x0038);
    assert!(!cpu.regs().iff1);

    cpu.step(&mut mem);
    assert_eq!(cpu.pc(), 0x1234);
    assert_eq!(cpu.regs().sp, 0xFFFE);
}

#[test]
fn cp_takes_f3_f5_from_operand() {
    let mut cpu = Z80::new();
    let mut mem = FlatMemory::new();
    cpu.regs_mut().a = 0x00;
    mem.load(0x0000, &[0xFE, 0x28]);

    cpu.step(&mut mem);

    assert_ne!(cpu.regs().f & cpu_z80::flags::XF, 0);
    assert_ne!(cpu.regs().f & cpu_z80::flags::YF, 0);
}

#[test]
fn indexed_addressing_with_negative_displacement() {
    let mut cpu = Z80::new();
    let mut mem = FlatMemory::new();
    cpu.regs_mut().ix = 0x5005;
    mem.mem[0x5000] = 0x77;
    mem.load(0x0000, &[0xDD, 0x7E, 0xFB]);

    let t = cpu.step(&mut mem);

    assert_eq!(cpu.regs().a, 0x77);
    assert_eq!(cpu.pc(), 0x0003);
    assert_eq!(t, 19);
}
