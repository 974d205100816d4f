//! The unprefixed (and, for opcodes that don't touch H/L/(HL), DD/FD-wasted)
//! opcode table.

use emu_core::IoBus;

use super::operands::{apply_a, check_cc, read_r8, read_rp, read_rp2, write_r8, write_rp, write_rp2};
use super::{decompose, Decomposed};
use crate::alu;
use crate::cpu::{IndexMode, Z80};
use crate::flags::{CF, NF};

pub fn execute(cpu: &mut Z80, bus: &mut impl IoBus, opcode: u8, idx: IndexMode) -> u32 {
    debug_assert!(matches!(idx, IndexMode::Hl), "indexed opcodes are handled in decode::dd_fd");
    let Decomposed { x, y, z, p, q } = decompose(opcode);

    match (x, z) {
        (0, 0) => group_x0_z0(cpu, bus, y),
        (0, 1) if q == 0 => {
            let nn = cpu.fetch_word_pub(bus);
            write_rp(cpu, p, nn);
            10
        }
        (0, 1) => group_x0_z1_add_hl(cpu, p),
        (0, 2) => group_x0_z2(cpu, bus, p, q),
        (0, 3) => group_x0_z3(cpu, p, q),
        (0, 4) => {
            let v = read_r8(cpu, bus, y);
            let r = alu::inc8(v);
            write_r8(cpu, bus, y, r.value);
            cpu.regs_mut().f = (cpu.regs().f & CF) | (r.flags & !CF);
            if y == 6 { 11 } else { 4 }
        }
        (0, 5) => {
            let v = read_r8(cpu, bus, y);
            let r = alu::dec8(v);
            write_r8(cpu, bus, y, r.value);
            cpu.regs_mut().f = (cpu.regs().f & CF) | (r.flags & !CF);
            if y == 6 { 11 } else { 4 }
        }
        (0, 6) => {
            let n = cpu.fetch_byte_pub(bus);
            write_r8(cpu, bus, y, n);
            if y == 6 { 10 } else { 7 }
        }
        (0, 7) => group_x0_z7(cpu, y),
        (1, _) if y == 6 && z == 6 => {
            cpu.set_halted();
            4
        }
        (1, _) => {
            let v = read_r8(cpu, bus, z);
            write_r8(cpu, bus, y, v);
            if y == 6 || z == 6 { 7 } else { 4 }
        }
        (2, _) => {
            let v = read_r8(cpu, bus, z);
            alu_op(cpu, y, v);
            if z == 6 { 7 } else { 4 }
        }
        (3, 0) => {
            let taken = check_cc(cpu, y);
            if taken {
                let ret = cpu.pop16(bus);
                cpu.regs_mut().pc = ret;
                11
            } else {
                5
            }
        }
        (3, 1) => group_x3_z1(cpu, bus, p, q),
        (3, 2) => {
            let nn = cpu.fetch_word_pub(bus);
            if check_cc(cpu, y) {
                cpu.regs_mut().pc = nn;
            }
            10
        }
        (3, 3) => group_x3_z3(cpu, bus, y),
        (3, 4) => {
            let nn = cpu.fetch_word_pub(bus);
            if check_cc(cpu, y) {
                cpu.push16(bus, cpu.regs().pc);
                cpu.regs_mut().pc = nn;
                17
            } else {
                10
            }
        }
        (3, 5) => group_x3_z5(cpu, bus, p, q),
        (3, 6) => {
            let n = cpu.fetch_byte_pub(bus);
            alu_op(cpu, y, n);
            7
        }
        (3, 7) => {
            cpu.push16(bus, cpu.regs().pc);
            cpu.regs_mut().pc = u16::from(y) * 8;
            11
        }
        _ => unreachable!("x is 2 bits"),
    }
}

fn group_x0_z0(cpu: &mut Z80, bus: &mut impl IoBus, y: u8) -> u32 {
    match y {
        0 => 4, // NOP
        1 => {
            cpu.regs_mut().ex_af_af();
            4
        }
        2 => {
            cpu.regs_mut().b = cpu.regs().b.wrapping_sub(1);
            let d = cpu.fetch_signed_byte_pub(bus);
            if cpu.regs().b != 0 {
                cpu.regs_mut().pc = cpu.regs().pc.wrapping_add(d as u16);
                13
            } else {
                8
            }
        }
        3 => {
            let d = cpu.fetch_signed_byte_pub(bus);
            cpu.regs_mut().pc = cpu.regs().pc.wrapping_add(d as u16);
            12
        }
        4..=7 => {
            let d = cpu.fetch_signed_byte_pub(bus);
            if check_cc(cpu, y - 4) {
                cpu.regs_mut().pc = cpu.regs().pc.wrapping_add(d as u16);
                12
            } else {
                7
            }
        }
        _ => unreachable!(),
    }
}

fn group_x0_z1_add_hl(cpu: &mut Z80, p: u8) -> u32 {
    let hl = cpu.regs().hl();
    let rp = read_rp(cpu, p);
    let (result, flags) = alu::add16(hl, rp);
    cpu.regs_mut().set_hl(result);
    let preserved = cpu.regs().f & (crate::flags::SF | crate::flags::ZF | crate::flags::PF);
    cpu.regs_mut().f = preserved | flags;
    11
}

fn group_x0_z2(cpu: &mut Z80, bus: &mut impl IoBus, p: u8, q: u8) -> u32 {
    if q == 0 {
        match p {
            0 => {
                bus.write(cpu.regs().bc(), cpu.regs().a);
                7
            }
            1 => {
                bus.write(cpu.regs().de(), cpu.regs().a);
                7
            }
            2 => {
                let nn = cpu.fetch_word_pub(bus);
                let hl = cpu.regs().hl();
                let [hi, lo] = hl.to_be_bytes();
                bus.write(nn, lo);
                bus.write(nn.wrapping_add(1), hi);
                16
            }
            3 => {
                let nn = cpu.fetch_word_pub(bus);
                bus.write(nn, cpu.regs().a);
                13
            }
            _ => unreachable!(),
        }
    } else {
        match p {
            0 => {
                cpu.regs_mut().a = bus.read(cpu.regs().bc());
                7
            }
            1 => {
                cpu.regs_mut().a = bus.read(cpu.regs().de());
                7
            }
            2 => {
                let nn = cpu.fetch_word_pub(bus);
                let lo = bus.read(nn);
                let hi = bus.read(nn.wrapping_add(1));
                cpu.regs_mut().set_hl(u16::from_be_bytes([hi, lo]));
                16
            }
            3 => {
                let nn = cpu.fetch_word_pub(bus);
                cpu.regs_mut().a = bus.read(nn);
                13
            }
            _ => unreachable!(),
        }
    }
}

fn group_x0_z3(cpu: &mut Z80, p: u8, q: u8) -> u32 {
    let rp = read_rp(cpu, p);
    let result = if q == 0 { rp.wrapping_add(1) } else { rp.wrapping_sub(1) };
    write_rp(cpu, p, result);
    6
}

fn group_x0_z7(cpu: &mut Z80, y: u8) -> u32 {
    let a = cpu.regs().a;
    let f = cpu.regs().f;
    match y {
        0 => {
            let r = alu::rlc8(a);
            cpu.regs_mut().a = r.value;
            cpu.regs_mut().f = (r.flags & (CF | crate::flags::YF | crate::flags::XF)) | (f & (crate::flags::SF | crate::flags::ZF | crate::flags::PF));
        }
        1 => {
            let r = alu::rrc8(a);
            cpu.regs_mut().a = r.value;
            cpu.regs_mut().f = (r.flags & (CF | crate::flags::YF | crate::flags::XF)) | (f & (crate::flags::SF | crate::flags::ZF | crate::flags::PF));
        }
        2 => {
            let r = alu::rl8(a, f & CF != 0);
            cpu.regs_mut().a = r.value;
            cpu.regs_mut().f = (r.flags & (CF | crate::flags::YF | crate::flags::XF)) | (f & (crate::flags::SF | crate::flags::ZF | crate::flags::PF));
        }
        3 => {
            let r = alu::rr8(a, f & CF != 0);
            cpu.regs_mut().a = r.value;
            cpu.regs_mut().f = (r.flags & (CF | crate::flags::YF | crate::flags::XF)) | (f & (crate::flags::SF | crate::flags::ZF | crate::flags::PF));
        }
        4 => {
            let r = alu::daa(a, f & NF != 0, f & crate::flags::HF != 0, f & CF != 0);
            apply_a(cpu, r);
        }
        5 => {
            let r = alu::cpl(a, f);
            apply_a(cpu, r);
        }
        6 => cpu.regs_mut().f = alu::scf(a, f),
        7 => cpu.regs_mut().f = alu::ccf(a, f),
        _ => unreachable!(),
    }
    4
}

fn alu_op(cpu: &mut Z80, y: u8, operand: u8) {
    let a = cpu.regs().a;
    let c = cpu.regs().f & CF != 0;
    let result = match y {
        0 => alu::add8(a, operand, false),
        1 => alu::add8(a, operand, c),
        2 => alu::sub8(a, operand, false),
        3 => alu::sub8(a, operand, c),
        4 => alu::and8(a, operand),
        5 => alu::xor8(a, operand),
        6 => alu::or8(a, operand),
        7 => {
            let r = alu::cp8(a, operand);
            cpu.regs_mut().f = r.flags;
            return;
        }
        _ => unreachable!(),
    };
    apply_a(cpu, result);
}

fn group_x3_z1(cpu: &mut Z80, bus: &mut impl IoBus, p: u8, q: u8) -> u32 {
    if q == 0 {
        let value = cpu.pop16(bus);
        write_rp2(cpu, p, value);
        10
    } else {
        match p {
            0 => {
                let ret = cpu.pop16(bus);
                cpu.regs_mut().pc = ret;
                10
            }
            1 => {
                cpu.regs_mut().exx();
                4
            }
            2 => {
                cpu.regs_mut().pc = cpu.regs().hl();
                4
            }
            3 => {
                cpu.regs_mut().sp = cpu.regs().hl();
                6
            }
            _ => unreachable!(),
        }
    }
}

fn group_x3_z3(cpu: &mut Z80, bus: &mut impl IoBus, y: u8) -> u32 {
    match y {
        0 => {
            let nn = cpu.fetch_word_pub(bus);
            cpu.regs_mut().pc = nn;
            10
        }
        2 => {
            let n = cpu.fetch_byte_pub(bus);
            bus.write_io(u16::from(n), cpu.regs().a);
            11
        }
        3 => {
            let n = cpu.fetch_byte_pub(bus);
            cpu.regs_mut().a = bus.read_io(u16::from(n));
            11
        }
        4 => {
            let sp = cpu.regs().sp;
            let lo = bus.read(sp);
            let hi = bus.read(sp.wrapping_add(1));
            let hl = cpu.regs().hl();
            let [hl_hi, hl_lo] = hl.to_be_bytes();
            bus.write(sp, hl_lo);
            bus.write(sp.wrapping_add(1), hl_hi);
            cpu.regs_mut().set_hl(u16::from_be_bytes([hi, lo]));
            19
        }
        5 => {
            let de = cpu.regs().de();
            let hl = cpu.regs().hl();
            cpu.regs_mut().set_de(hl);
            cpu.regs_mut().set_hl(de);
            4
        }
        6 => {
            cpu.regs_mut().iff1 = false;
            cpu.regs_mut().iff2 = false;
            4
        }
        7 => {
            cpu.regs_mut().iff1 = true;
            cpu.regs_mut().iff2 = true;
            cpu.request_ei_delay();
            4
        }
        _ => unreachable!("y=1 (CB) is intercepted before reaching the unprefixed table"),
    }
}

fn group_x3_z5(cpu: &mut Z80, bus: &mut impl IoBus, p: u8, q: u8) -> u32 {
    if q == 0 {
        let value = read_rp2(cpu, p);
        cpu.push16(bus, value);
        11
    } else {
        match p {
            0 => {
                let nn = cpu.fetch_word_pub(bus);
                cpu.push16(bus, cpu.regs().pc);
                cpu.regs_mut().pc = nn;
                17
            }
            _ => unreachable!("p=1,2,3 (DD/ED/FD) are intercepted before reaching the unprefixed table"),
        }
    }
}
