//! DD/FD-prefixed opcodes: the index-register modifier prefixes.
//!
//! Only opcodes that actually reference `H`, `L`, or `(HL)` are redirected
//! to the chosen index register; every other opcode is a wasted prefix and
//! falls back to the unprefixed table unmodified (charging 4 T-states for
//! the prefix byte itself).

use emu_core::IoBus;

use super::operands::{apply_a, read_r8, read_rp, write_r8};
use crate::alu;
use crate::cpu::{IndexMode, Z80};
use crate::flags::CF;

pub fn decode_indexed(cpu: &mut Z80, bus: &mut impl IoBus, mut idx: IndexMode) -> u32 {
    let mut wasted = 0u32;
    loop {
        cpu.regs_mut().bump_r(1);
        let opcode = cpu.fetch_byte_pub(bus);
        match opcode {
            0xDD => {
                idx = IndexMode::Ix;
                wasted += 4;
            }
            0xFD => {
                idx = IndexMode::Iy;
                wasted += 4;
            }
            0xCB => return wasted + super::ddcb_fdcb::decode_indexed_cb(cpu, bus, idx),
            0xED => return wasted + 4 + super::ed::decode_ed(cpu, bus),
            _ => return wasted + execute_indexed(cpu, bus, opcode, idx),
        }
    }
}

fn idx_value(cpu: &Z80, idx: IndexMode) -> u16 {
    match idx {
        IndexMode::Ix => cpu.regs().ix,
        IndexMode::Iy => cpu.regs().iy,
        IndexMode::Hl => unreachable!("execute_indexed is only called with Ix/Iy"),
    }
}

fn set_idx_value(cpu: &mut Z80, idx: IndexMode, value: u16) {
    match idx {
        IndexMode::Ix => cpu.regs_mut().ix = value,
        IndexMode::Iy => cpu.regs_mut().iy = value,
        IndexMode::Hl => unreachable!(),
    }
}

fn idx_hi(cpu: &Z80, idx: IndexMode) -> u8 {
    match idx {
        IndexMode::Ix => cpu.regs().ixh(),
        IndexMode::Iy => cpu.regs().iyh(),
        IndexMode::Hl => unreachable!(),
    }
}

fn idx_lo(cpu: &Z80, idx: IndexMode) -> u8 {
    match idx {
        IndexMode::Ix => cpu.regs().ixl(),
        IndexMode::Iy => cpu.regs().iyl(),
        IndexMode::Hl => unreachable!(),
    }
}

fn set_idx_hi(cpu: &mut Z80, idx: IndexMode, value: u8) {
    match idx {
        IndexMode::Ix => cpu.regs_mut().set_ixh(value),
        IndexMode::Iy => cpu.regs_mut().set_iyh(value),
        IndexMode::Hl => unreachable!(),
    }
}

fn set_idx_lo(cpu: &mut Z80, idx: IndexMode, value: u8) {
    match idx {
        IndexMode::Ix => cpu.regs_mut().set_ixl(value),
        IndexMode::Iy => cpu.regs_mut().set_iyl(value),
        IndexMode::Hl => unreachable!(),
    }
}

/// Read the displacement byte (signed) and form the effective address.
fn eff_addr(cpu: &mut Z80, bus: &mut impl IoBus, idx: IndexMode) -> u16 {
    let d = cpu.fetch_signed_byte_pub(bus);
    idx_value(cpu, idx).wrapping_add(d as u16)
}

/// Get an 8-bit "r[slot]" value honoring the index-register substitution
/// rule for slots 4 (H) and 5 (L) — used only for register-register forms,
/// never when the instruction addresses `(IX+d)`/`(IY+d)` itself.
fn read_r8_idx(cpu: &mut Z80, bus: &mut impl IoBus, idx: IndexMode, slot: u8) -> u8 {
    match slot {
        4 => idx_hi(cpu, idx),
        5 => idx_lo(cpu, idx),
        _ => read_r8(cpu, bus, slot),
    }
}

fn write_r8_idx(cpu: &mut Z80, bus: &mut impl IoBus, idx: IndexMode, slot: u8, value: u8) {
    match slot {
        4 => set_idx_hi(cpu, idx, value),
        5 => set_idx_lo(cpu, idx, value),
        _ => write_r8(cpu, bus, slot, value),
    }
}

fn execute_indexed(cpu: &mut Z80, bus: &mut impl IoBus, opcode: u8, idx: IndexMode) -> u32 {
    let super::Decomposed { x, y, z, p, q } = super::decompose(opcode);

    match (x, z) {
        (0, 1) if p == 2 && q == 0 => {
            let nn = cpu.fetch_word_pub(bus);
            set_idx_value(cpu, idx, nn);
            14
        }
        (0, 1) if p == 2 => {
            let (result, flags) = alu::add16(idx_value(cpu, idx), idx_value(cpu, idx));
            set_idx_value(cpu, idx, result);
            let preserved = cpu.regs().f & (crate::flags::SF | crate::flags::ZF | crate::flags::PF);
            cpu.regs_mut().f = preserved | flags;
            15
        }
        (0, 1) if q == 0 => {
            // LD BC/DE/SP,nn: p != 2, so this rp is not index-substituted.
            // A genuine wasted prefix; route through the unprefixed table
            // so the +4 T-state prefix charge is applied consistently.
            4 + super::unprefixed::execute(cpu, bus, opcode, IndexMode::Hl)
        }
        (0, 1) => {
            // ADD IX, BC/DE/SP (p != 2): index register is both accumulator
            // and one operand only when p selects it; otherwise plain rp.
            let operand = if p == 3 { cpu.regs().sp } else { read_rp(cpu, p) };
            let (result, flags) = alu::add16(idx_value(cpu, idx), operand);
            set_idx_value(cpu, idx, result);
            let preserved = cpu.regs().f & (crate::flags::SF | crate::flags::ZF | crate::flags::PF);
            cpu.regs_mut().f = preserved | flags;
            15
        }
        (0, 2) if p == 2 => {
            let nn = cpu.fetch_word_pub(bus);
            if q == 0 {
                let [hi, lo] = idx_value(cpu, idx).to_be_bytes();
                bus.write(nn, lo);
                bus.write(nn.wrapping_add(1), hi);
            } else {
                let lo = bus.read(nn);
                let hi = bus.read(nn.wrapping_add(1));
                set_idx_value(cpu, idx, u16::from_be_bytes([hi, lo]));
            }
            20
        }
        (0, 3) if p == 2 => {
            let v = idx_value(cpu, idx);
            set_idx_value(cpu, idx, if q == 0 { v.wrapping_add(1) } else { v.wrapping_sub(1) });
            10
        }
        (0, 4) if y == 4 || y == 5 => {
            let v = read_r8_idx(cpu, bus, idx, y);
            let r = alu::inc8(v);
            write_r8_idx(cpu, bus, idx, y, r.value);
            cpu.regs_mut().f = (cpu.regs().f & CF) | (r.flags & !CF);
            8
        }
        (0, 4) if y == 6 => {
            let addr = eff_addr(cpu, bus, idx);
            let v = bus.read(addr);
            let r = alu::inc8(v);
            bus.write(addr, r.value);
            cpu.regs_mut().f = (cpu.regs().f & CF) | (r.flags & !CF);
            23
        }
        (0, 5) if y == 4 || y == 5 => {
            let v = read_r8_idx(cpu, bus, idx, y);
            let r = alu::dec8(v);
            write_r8_idx(cpu, bus, idx, y, r.value);
            cpu.regs_mut().f = (cpu.regs().f & CF) | (r.flags & !CF);
            8
        }
        (0, 5) if y == 6 => {
            let addr = eff_addr(cpu, bus, idx);
            let v = bus.read(addr);
            let r = alu::dec8(v);
            bus.write(addr, r.value);
            cpu.regs_mut().f = (cpu.regs().f & CF) | (r.flags & !CF);
            23
        }
        (0, 6) if y == 4 || y == 5 => {
            let n = cpu.fetch_byte_pub(bus);
            write_r8_idx(cpu, bus, idx, y, n);
            11
        }
        (0, 6) if y == 6 => {
            let addr = eff_addr(cpu, bus, idx);
            let n = cpu.fetch_byte_pub(bus);
            bus.write(addr, n);
            19
        }
        (1, _) if y == 6 && z == 6 => {
            // DD/FD 76: HALT, unaffected by the prefix.
            cpu.set_halted();
            4
        }
        (1, _) if y == 6 => {
            let addr = eff_addr(cpu, bus, idx);
            let v = read_r8(cpu, bus, z);
            bus.write(addr, v);
            19
        }
        (1, _) if z == 6 => {
            let addr = eff_addr(cpu, bus, idx);
            let v = bus.read(addr);
            write_r8(cpu, bus, y, v);
            19
        }
        (1, _) if y == 4 || y == 5 || z == 4 || z == 5 => {
            let v = read_r8_idx(cpu, bus, idx, z);
            write_r8_idx(cpu, bus, idx, y, v);
            8
        }
        (2, _) if z == 6 => {
            let addr = eff_addr(cpu, bus, idx);
            let v = bus.read(addr);
            alu_op(cpu, y, v);
            19
        }
        (2, _) if z == 4 || z == 5 => {
            let v = read_r8_idx(cpu, bus, idx, z);
            alu_op(cpu, y, v);
            8
        }
        (3, 3) if opcode == 0xE3 => {
            // EX (SP), IX/IY
            let sp = cpu.regs().sp;
            let lo = bus.read(sp);
            let hi = bus.read(sp.wrapping_add(1));
            let [idx_hi_b, idx_lo_b] = idx_value(cpu, idx).to_be_bytes();
            bus.write(sp, idx_lo_b);
            bus.write(sp.wrapping_add(1), idx_hi_b);
            set_idx_value(cpu, idx, u16::from_be_bytes([hi, lo]));
            23
        }
        (3, 1) if opcode == 0xE1 => {
            let v = cpu.pop16(bus);
            set_idx_value(cpu, idx, v);
            14
        }
        (3, 1) if opcode == 0xE9 => {
            cpu.regs_mut().pc = idx_value(cpu, idx);
            8
        }
        (3, 1) if opcode == 0xF9 => {
            cpu.regs_mut().sp = idx_value(cpu, idx);
            10
        }
        (3, 5) if opcode == 0xE5 => {
            let v = idx_value(cpu, idx);
            cpu.push16(bus, v);
            15
        }
        _ => 4 + super::unprefixed::execute(cpu, bus, opcode, IndexMode::Hl),
    }
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
