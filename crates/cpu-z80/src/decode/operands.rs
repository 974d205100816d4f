//! Register-table lookups shared across the unprefixed, CB, and ED decoders.
//!
//! `r[0..7]` = B, C, D, E, H, L, (HL), A. `rp[0..3]` = BC, DE, HL, SP.
//! `rp2[0..3]` = BC, DE, HL, AF (the PUSH/POP variant of the pair table).

use emu_core::IoBus;

use crate::cpu::Z80;
use crate::flags::{CF, HF, NF, PF, SF, ZF};

pub fn read_r8(cpu: &mut Z80, bus: &mut impl IoBus, z: u8) -> u8 {
    match z {
        0 => cpu.regs().b,
        1 => cpu.regs().c,
        2 => cpu.regs().d,
        3 => cpu.regs().e,
        4 => cpu.regs().h,
        5 => cpu.regs().l,
        6 => bus.read(cpu.regs().hl()),
        7 => cpu.regs().a,
        _ => unreachable!("register index is 3 bits"),
    }
}

pub fn write_r8(cpu: &mut Z80, bus: &mut impl IoBus, z: u8, value: u8) {
    match z {
        0 => cpu.regs_mut().b = value,
        1 => cpu.regs_mut().c = value,
        2 => cpu.regs_mut().d = value,
        3 => cpu.regs_mut().e = value,
        4 => cpu.regs_mut().h = value,
        5 => cpu.regs_mut().l = value,
        6 => bus.write(cpu.regs().hl(), value),
        7 => cpu.regs_mut().a = value,
        _ => unreachable!("register index is 3 bits"),
    }
}

pub fn read_rp(cpu: &Z80, p: u8) -> u16 {
    match p {
        0 => cpu.regs().bc(),
        1 => cpu.regs().de(),
        2 => cpu.regs().hl(),
        3 => cpu.regs().sp,
        _ => unreachable!("pair index is 2 bits"),
    }
}

pub fn write_rp(cpu: &mut Z80, p: u8, value: u16) {
    match p {
        0 => cpu.regs_mut().set_bc(value),
        1 => cpu.regs_mut().set_de(value),
        2 => cpu.regs_mut().set_hl(value),
        3 => cpu.regs_mut().sp = value,
        _ => unreachable!("pair index is 2 bits"),
    }
}

pub fn read_rp2(cpu: &Z80, p: u8) -> u16 {
    match p {
        0 => cpu.regs().bc(),
        1 => cpu.regs().de(),
        2 => cpu.regs().hl(),
        3 => cpu.regs().af(),
        _ => unreachable!("pair index is 2 bits"),
    }
}

pub fn write_rp2(cpu: &mut Z80, p: u8, value: u16) {
    match p {
        0 => cpu.regs_mut().set_bc(value),
        1 => cpu.regs_mut().set_de(value),
        2 => cpu.regs_mut().set_hl(value),
        3 => cpu.regs_mut().set_af(value),
        _ => unreachable!("pair index is 2 bits"),
    }
}

/// Condition code table: NZ, Z, NC, C, PO, PE, P, M.
pub fn check_cc(cpu: &Z80, y: u8) -> bool {
    let f = cpu.regs().f;
    match y {
        0 => f & ZF == 0,
        1 => f & ZF != 0,
        2 => f & CF == 0,
        3 => f & CF != 0,
        4 => f & PF == 0,
        5 => f & PF != 0,
        6 => f & SF == 0,
        7 => f & SF != 0,
        _ => unreachable!("condition index is 3 bits"),
    }
}

/// Apply an [`crate::alu::AluResult`] produced against the accumulator.
pub fn apply_a(cpu: &mut Z80, result: crate::alu::AluResult) {
    cpu.regs_mut().a = result.value;
    cpu.regs_mut().f = result.flags;
}

pub const fn carry(f: u8) -> bool {
    f & CF != 0
}

pub const fn half(f: u8) -> bool {
    f & HF != 0
}

pub const fn negative(f: u8) -> bool {
    f & NF != 0
}
