//! CB-prefixed opcodes: rotate/shift, BIT, RES, SET on `r[z]`.

use emu_core::IoBus;

use super::operands::{read_r8, write_r8};
use super::decompose;
use crate::alu;
use crate::cpu::Z80;
use crate::flags::CF;

pub fn decode_cb(cpu: &mut Z80, bus: &mut impl IoBus) -> u32 {
    cpu.regs_mut().bump_r(1);
    let opcode = cpu.fetch_byte_pub(bus);
    let d = decompose(opcode);
    let mem = d.z == 6;

    match d.x {
        0 => {
            let v = read_r8(cpu, bus, d.z);
            let r = rotate_shift(d.y, v, cpu.regs().f & CF != 0);
            write_r8(cpu, bus, d.z, r.value);
            cpu.regs_mut().f = r.flags;
            if mem { 15 } else { 8 }
        }
        1 => {
            let v = read_r8(cpu, bus, d.z);
            let old_c = cpu.regs().f & CF != 0;
            cpu.regs_mut().f = alu::bit(d.y, v, old_c);
            if mem { 12 } else { 8 }
        }
        2 => {
            let v = read_r8(cpu, bus, d.z) & !(1 << d.y);
            write_r8(cpu, bus, d.z, v);
            if mem { 15 } else { 8 }
        }
        3 => {
            let v = read_r8(cpu, bus, d.z) | (1 << d.y);
            write_r8(cpu, bus, d.z, v);
            if mem { 15 } else { 8 }
        }
        _ => unreachable!(),
    }
}

fn rotate_shift(y: u8, v: u8, carry: bool) -> alu::AluResult {
    match y {
        0 => alu::rlc8(v),
        1 => alu::rrc8(v),
        2 => alu::rl8(v, carry),
        3 => alu::rr8(v, carry),
        4 => alu::sla8(v),
        5 => alu::sra8(v),
        6 => alu::sll8(v),
        7 => alu::srl8(v),
        _ => unreachable!("y is 3 bits"),
    }
}
