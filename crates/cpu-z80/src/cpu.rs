//! The Z80 CPU core: state, fetch/execute cycle, and the small helpers the
//! decode tables in [`crate::decode`] build on.

use emu_core::IoBus;

use crate::flags::CF;
use crate::registers::Registers;

/// Which register pair (if any) the current instruction's `H`/`L`/`(HL)`
/// operand references have been redirected to by a DD or FD prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexMode {
    Hl,
    Ix,
    Iy,
}

impl IndexMode {
    #[must_use]
    pub fn is_indexed(self) -> bool {
        !matches!(self, IndexMode::Hl)
    }
}

/// The Z80 CPU.
///
/// Holds every architectural register plus the small amount of execution
/// scratch state (the EI one-shot delay, the halt flag, and the cumulative
/// T-state counter) that isn't part of the programmer-visible register
/// file. Does not own a bus: every entry point borrows one for the call.
#[derive(Debug, Clone, Copy, Default)]
pub struct Z80 {
    regs: Registers,
    halted: bool,
    ei_delay: bool,
    clocks: u64,
}

impl Z80 {
    /// Power-on state: A = F = 0xFF, SP = 0xFFFF, PC = 0, everything else
    /// zeroed/false, interrupt mode 0.
    #[must_use]
    pub fn new() -> Self {
        let mut regs = Registers::default();
        regs.a = 0xFF;
        regs.f = 0xFF;
        regs.sp = 0xFFFF;
        Self { regs, halted: false, ei_delay: false, clocks: 0 }
    }

    #[must_use]
    pub fn regs(&self) -> &Registers {
        &self.regs
    }

    pub fn regs_mut(&mut self) -> &mut Registers {
        &mut self.regs
    }

    #[must_use]
    pub fn pc(&self) -> u16 {
        self.regs.pc
    }

    #[must_use]
    pub fn halted(&self) -> bool {
        self.halted
    }

    #[must_use]
    pub fn clocks(&self) -> u64 {
        self.clocks
    }

    #[must_use]
    pub fn iff1(&self) -> bool {
        self.regs.iff1
    }

    #[cfg(feature = "test-utils")]
    pub fn set_pc(&mut self, pc: u16) {
        self.regs.pc = pc;
    }

    #[cfg(feature = "test-utils")]
    pub fn set_sp(&mut self, sp: u16) {
        self.regs.sp = sp;
    }

    #[cfg(feature = "test-utils")]
    pub fn force_ret(&mut self, bus: &mut impl IoBus) {
        self.regs.pc = self.pop16(bus);
    }

    fn fetch_byte(&mut self, bus: &mut impl IoBus) -> u8 {
        let value = bus.read(self.regs.pc);
        self.regs.pc = self.regs.pc.wrapping_add(1);
        value
    }

    fn fetch_signed_byte(&mut self, bus: &mut impl IoBus) -> i8 {
        self.fetch_byte(bus) as i8
    }

    fn fetch_word(&mut self, bus: &mut impl IoBus) -> u16 {
        let lo = self.fetch_byte(bus);
        let hi = self.fetch_byte(bus);
        u16::from_be_bytes([hi, lo])
    }

    pub(crate) fn push16(&mut self, bus: &mut impl IoBus, value: u16) {
        let [hi, lo] = value.to_be_bytes();
        self.regs.sp = self.regs.sp.wrapping_sub(1);
        bus.write(self.regs.sp, hi);
        self.regs.sp = self.regs.sp.wrapping_sub(1);
        bus.write(self.regs.sp, lo);
    }

    pub(crate) fn pop16(&mut self, bus: &mut impl IoBus) -> u16 {
        let lo = bus.read(self.regs.sp);
        self.regs.sp = self.regs.sp.wrapping_add(1);
        let hi = bus.read(self.regs.sp);
        self.regs.sp = self.regs.sp.wrapping_add(1);
        u16::from_be_bytes([hi, lo])
    }

    /// Execute one instruction (or one HALT quantum). Returns T-states used.
    pub fn step(&mut self, bus: &mut impl IoBus) -> u32 {
        if self.halted {
            self.regs.bump_r(1);
            self.clocks += 4;
            return 4;
        }

        self.regs.bump_r(1);
        let opcode = self.fetch_byte(bus);
        let is_ei = opcode == 0xFB;
        let had_delay = self.ei_delay;

        let t = match opcode {
            0xCB => crate::decode::cb::decode_cb(self, bus),
            0xED => crate::decode::ed::decode_ed(self, bus),
            0xDD => crate::decode::dd_fd::decode_indexed(self, bus, IndexMode::Ix),
            0xFD => crate::decode::dd_fd::decode_indexed(self, bus, IndexMode::Iy),
            _ => crate::decode::unprefixed::execute(self, bus, opcode, IndexMode::Hl),
        };

        // The EI delay blocks interrupt acceptance from the EI instruction's
        // own step through the end of the step that follows it; it clears
        // once that following (non-EI) instruction has fully executed.
        if !is_ei && had_delay {
            self.ei_delay = false;
        }

        self.clocks += u64::from(t);
        t
    }

    /// Deliver a maskable interrupt carrying `data` (an IM 0 opcode byte, or
    /// the low byte of an IM 2 vector — ignored in IM 1).
    pub fn interrupt_with_data(&mut self, bus: &mut impl IoBus, data: u8) {
        if !self.regs.iff1 || self.ei_delay {
            return;
        }
        self.halted = false;
        self.regs.iff1 = false;
        self.regs.iff2 = false;
        self.regs.bump_r(1);

        match self.regs.im {
            1 => {
                self.push16(bus, self.regs.pc);
                self.regs.pc = 0x0038;
                self.clocks += 13;
            }
            2 => {
                self.push16(bus, self.regs.pc);
                let vector_addr = (u16::from(self.regs.i) << 8) | u16::from(data & 0xFE);
                let lo = bus.read(vector_addr);
                let hi = bus.read(vector_addr.wrapping_add(1));
                self.regs.pc = u16::from_be_bytes([hi, lo]);
                self.clocks += 19;
            }
            _ => {
                // IM 0: treat `data` as an opcode; the only subset this
                // design supports is RST n (0b11nnn111).
                if data & 0xC7 == 0xC7 {
                    let n = (data >> 3) & 0x07;
                    self.push16(bus, self.regs.pc);
                    self.regs.pc = u16::from(n) * 8;
                    self.clocks += 13;
                } else {
                    self.clocks += 13;
                }
            }
        }
    }

    /// Deliver a non-maskable interrupt.
    pub fn nmi(&mut self, bus: &mut impl IoBus) {
        self.halted = false;
        self.regs.iff2 = self.regs.iff1;
        self.regs.iff1 = false;
        self.ei_delay = false;
        self.regs.bump_r(1);
        self.push16(bus, self.regs.pc);
        self.regs.pc = 0x0066;
        self.clocks += 11;
    }

    pub(crate) fn set_halted(&mut self) {
        self.halted = true;
    }

    pub(crate) fn request_ei_delay(&mut self) {
        self.ei_delay = true;
    }

    pub(crate) fn retn(&mut self) {
        self.regs.iff1 = self.regs.iff2;
    }

    /// F5/F3-from-the-low-byte-of-I/R quirk for `LD A,I` / `LD A,R`: P/V
    /// comes from IFF2, not from the parity of the loaded byte.
    pub(crate) fn flags_for_ir_load(&self, value: u8) -> u8 {
        let mut f = crate::flags::sz53(value);
        if self.regs.iff2 {
            f |= crate::flags::PF;
        }
        f | (self.regs.f & CF)
    }

    pub(crate) fn fetch_byte_pub(&mut self, bus: &mut impl IoBus) -> u8 {
        self.fetch_byte(bus)
    }

    pub(crate) fn fetch_signed_byte_pub(&mut self, bus: &mut impl IoBus) -> i8 {
        self.fetch_signed_byte(bus)
    }

    pub(crate) fn fetch_word_pub(&mut self, bus: &mut impl IoBus) -> u16 {
        self.fetch_word(bus)
    }
}

impl<B: IoBus> emu_core::Cpu<B> for Z80 {
    fn step(&mut self, bus: &mut B) -> u32 {
        Z80::step(self, bus)
    }

    fn reset(&mut self, _bus: &mut B) {
        *self = Z80::new();
    }

    fn interrupt(&mut self, bus: &mut B) {
        // The shared trait carries no data byte; RST 38h (0xFF) is the
        // overwhelmingly common case. Hosts that need IM 0/IM 2 precision
        // call `interrupt_with_data` directly.
        self.interrupt_with_data(bus, 0xFF);
    }

    fn nmi(&mut self, bus: &mut B) {
        Z80::nmi(self, bus);
    }

    fn pc(&self) -> u16 {
        self.regs.pc
    }

    fn halted(&self) -> bool {
        self.halted
    }
}
