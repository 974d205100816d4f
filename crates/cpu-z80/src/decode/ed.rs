//! ED-prefixed opcodes: extended loads, 16-bit ADC/SBC HL, I/O, and the
//! block instruction families.

use emu_core::IoBus;

use super::decompose;
use super::operands::{read_rp, write_rp};
use crate::alu;
use crate::cpu::Z80;
use crate::flags::{CF, HF, NF, PF, SF, XF, YF, ZF};

pub fn decode_ed(cpu: &mut Z80, bus: &mut impl IoBus) -> u32 {
    cpu.regs_mut().bump_r(1);
    let opcode = cpu.fetch_byte_pub(bus);
    let d = decompose(opcode);

    match d.x {
        1 => match d.z {
            0 => {
                let value = bus.read_io(cpu.regs().bc());
                if d.y != 6 {
                    super::operands::write_r8(cpu, bus, d.y, value);
                }
                let mut f = crate::flags::sz53p(value);
                f |= cpu.regs().f & CF;
                cpu.regs_mut().f = f;
                12
            }
            1 => {
                let value = if d.y == 6 { 0 } else { super::operands::read_r8(cpu, bus, d.y) };
                bus.write_io(cpu.regs().bc(), value);
                12
            }
            2 => {
                let hl = cpu.regs().hl();
                let rp = read_rp(cpu, d.p);
                let (result, flags) = if d.q == 0 {
                    alu::sbc16(hl, rp, cpu.regs().f & CF != 0)
                } else {
                    alu::adc16(hl, rp, cpu.regs().f & CF != 0)
                };
                cpu.regs_mut().set_hl(result);
                cpu.regs_mut().f = flags;
                15
            }
            3 => {
                let nn = cpu.fetch_word_pub(bus);
                if d.q == 0 {
                    let value = read_rp(cpu, d.p);
                    let [hi, lo] = value.to_be_bytes();
                    bus.write(nn, lo);
                    bus.write(nn.wrapping_add(1), hi);
                } else {
                    let lo = bus.read(nn);
                    let hi = bus.read(nn.wrapping_add(1));
                    write_rp(cpu, d.p, u16::from_be_bytes([hi, lo]));
                }
                20
            }
            4 => {
                let a = cpu.regs().a;
                let r = alu::sub8(0, a, false);
                cpu.regs_mut().a = r.value;
                cpu.regs_mut().f = r.flags;
                8
            }
            5 => {
                cpu.retn();
                let ret = cpu.pop16(bus);
                cpu.regs_mut().pc = ret;
                14
            }
            6 => {
                cpu.regs_mut().im = match d.y & 0x03 {
                    0 | 1 => 0,
                    2 => 1,
                    _ => 2,
                };
                8
            }
            7 => ed_misc(cpu, bus, d.y),
            _ => unreachable!(),
        },
        2 if d.y >= 4 && d.z <= 3 => block_instruction(cpu, bus, d.y, d.z),
        _ => 8, // unassigned ED opcode: documented no-op
    }
}

fn ed_misc(cpu: &mut Z80, bus: &mut impl IoBus, y: u8) -> u32 {
    match y {
        0 => {
            cpu.regs_mut().i = cpu.regs().a;
            9
        }
        1 => {
            cpu.regs_mut().r = cpu.regs().a;
            9
        }
        2 => {
            let i = cpu.regs().i;
            cpu.regs_mut().f = cpu.flags_for_ir_load(i);
            cpu.regs_mut().a = i;
            9
        }
        3 => {
            let r = cpu.regs().r;
            cpu.regs_mut().f = cpu.flags_for_ir_load(r);
            cpu.regs_mut().a = r;
            9
        }
        4 => {
            // RRD: rotate (HL)'s nibbles through A's low nibble.
            let addr = cpu.regs().hl();
            let mem = bus.read(addr);
            let a = cpu.regs().a;
            let new_mem = (a << 4) | (mem >> 4);
            let new_a = (a & 0xF0) | (mem & 0x0F);
            bus.write(addr, new_mem);
            cpu.regs_mut().a = new_a;
            cpu.regs_mut().f = (cpu.regs().f & CF) | crate::flags::sz53p(new_a);
            18
        }
        5 => {
            let addr = cpu.regs().hl();
            let mem = bus.read(addr);
            let a = cpu.regs().a;
            let new_mem = (mem << 4) | (a & 0x0F);
            let new_a = (a & 0xF0) | (mem >> 4);
            bus.write(addr, new_mem);
            cpu.regs_mut().a = new_a;
            cpu.regs_mut().f = (cpu.regs().f & CF) | crate::flags::sz53p(new_a);
            18
        }
        _ => 8,
    }
}

fn block_instruction(cpu: &mut Z80, bus: &mut impl IoBus, y: u8, z: u8) -> u32 {
    let increment = matches!(y, 4 | 6);
    let repeat = matches!(y, 6 | 7);

    match z {
        0 => block_ld(cpu, bus, increment, repeat),
        1 => block_cp(cpu, bus, increment, repeat),
        2 => block_in(cpu, bus, increment, repeat),
        3 => block_out(cpu, bus, increment, repeat),
        _ => unreachable!(),
    }
}

fn step_hl(cpu: &mut Z80, increment: bool) -> u16 {
    let hl = cpu.regs().hl();
    let next = if increment { hl.wrapping_add(1) } else { hl.wrapping_sub(1) };
    cpu.regs_mut().set_hl(next);
    hl
}

fn step_de(cpu: &mut Z80, increment: bool) -> u16 {
    let de = cpu.regs().de();
    let next = if increment { de.wrapping_add(1) } else { de.wrapping_sub(1) };
    cpu.regs_mut().set_de(next);
    de
}

fn block_ld(cpu: &mut Z80, bus: &mut impl IoBus, increment: bool, repeat: bool) -> u32 {
    let hl = step_hl(cpu, increment);
    let de = step_de(cpu, increment);
    let value = bus.read(hl);
    bus.write(de, value);

    let bc = cpu.regs().bc().wrapping_sub(1);
    cpu.regs_mut().set_bc(bc);

    let n = value.wrapping_add(cpu.regs().a);
    let mut f = cpu.regs().f & (SF | ZF | CF);
    f |= n & XF;
    if n & 0x02 != 0 {
        f |= YF;
    }
    if bc != 0 {
        f |= PF;
    }
    cpu.regs_mut().f = f;

    if repeat && bc != 0 {
        cpu.regs_mut().pc = cpu.regs().pc.wrapping_sub(2);
        21
    } else {
        16
    }
}

fn block_cp(cpu: &mut Z80, bus: &mut impl IoBus, increment: bool, repeat: bool) -> u32 {
    let hl = step_hl(cpu, increment);
    let value = bus.read(hl);
    let a = cpu.regs().a;
    let result = a.wrapping_sub(value);

    let bc = cpu.regs().bc().wrapping_sub(1);
    cpu.regs_mut().set_bc(bc);

    let half_borrow = (a & 0x0F) < (value & 0x0F);
    let n = if half_borrow { result.wrapping_sub(1) } else { result };

    let mut f = NF | (cpu.regs().f & CF);
    f |= crate::flags::sz53(result) & (SF | ZF);
    if half_borrow {
        f |= HF;
    }
    f |= n & XF;
    if n & 0x02 != 0 {
        f |= YF;
    }
    if bc != 0 {
        f |= PF;
    }
    cpu.regs_mut().f = f;

    if repeat && bc != 0 && result != 0 {
        cpu.regs_mut().pc = cpu.regs().pc.wrapping_sub(2);
        21
    } else {
        16
    }
}

fn block_in(cpu: &mut Z80, bus: &mut impl IoBus, increment: bool, repeat: bool) -> u32 {
    let port = cpu.regs().bc();
    let value = bus.read_io(port);
    let hl = step_hl(cpu, increment);
    bus.write(hl, value);

    let b = cpu.regs().b.wrapping_sub(1);
    cpu.regs_mut().b = b;

    let mut f = crate::flags::sz53(b);
    if value & 0x80 != 0 {
        f |= NF;
    }
    cpu.regs_mut().f = f;

    if repeat && b != 0 {
        cpu.regs_mut().pc = cpu.regs().pc.wrapping_sub(2);
        21
    } else {
        16
    }
}

fn block_out(cpu: &mut Z80, bus: &mut impl IoBus, increment: bool, repeat: bool) -> u32 {
    let hl = step_hl(cpu, increment);
    let value = bus.read(hl);

    let b = cpu.regs().b.wrapping_sub(1);
    cpu.regs_mut().b = b;

    bus.write_io(cpu.regs().bc(), value);

    let mut f = crate::flags::sz53(b);
    if value & 0x80 != 0 {
        f |= NF;
    }
    cpu.regs_mut().f = f;

    if repeat && b != 0 {
        cpu.regs_mut().pc = cpu.regs().pc.wrapping_sub(2);
        21
    } else {
        16
    }
}
