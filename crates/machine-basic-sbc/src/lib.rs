//! A minimal single-board computer: 64 KiB of memory with the low 8 KiB
//! ROM-protected, and a two-register memory-mapped UART.

mod uart;

pub use uart::Uart;

use emu_core::{Bus, IoBus};

/// Size, in bytes, of the ROM-protected region at the bottom of the address
/// space once a ROM image has been loaded.
pub const ROM_SIZE: u16 = 0x2000;

/// The BASIC single-board computer: memory plus its serial controller.
pub struct BasicSbc {
    memory: [u8; 65536],
    rom_loaded: bool,
    uart: Uart,
    uart_port: u16,
}

impl BasicSbc {
    #[must_use]
    pub fn new(uart_port: u16) -> Self {
        Self { memory: [0; 65536], rom_loaded: false, uart: Uart::new(), uart_port }
    }

    /// Load a ROM image at address 0 and arm write protection over
    /// [`ROM_SIZE`] bytes from there.
    pub fn load_rom(&mut self, image: &[u8]) {
        let n = image.len().min(self.memory.len());
        self.memory[..n].copy_from_slice(&image[..n]);
        self.rom_loaded = true;
    }

    /// Load bytes anywhere in the address space without write protection
    /// (used by the Intel HEX loader, and to seed RAM above the ROM).
    pub fn load_raw(&mut self, addr: u16, bytes: &[u8]) {
        for (i, b) in bytes.iter().enumerate() {
            let a = addr.wrapping_add(i as u16);
            self.memory[a as usize] = *b;
        }
    }

    #[must_use]
    pub fn uart(&self) -> &Uart {
        &self.uart
    }

    pub fn uart_mut(&mut self) -> &mut Uart {
        &mut self.uart
    }

    /// Feed one received byte to the UART, if it has capacity.
    pub fn receive_byte(&mut self, byte: u8) {
        self.uart.receive(byte);
    }

    /// Whether the UART wants to raise its receive interrupt right now.
    #[must_use]
    pub fn wants_interrupt(&self) -> bool {
        self.uart.wants_interrupt()
    }

    fn is_rom_protected(&self, address: u16) -> bool {
        self.rom_loaded && address < ROM_SIZE
    }
}

impl Bus for BasicSbc {
    fn read(&mut self, address: u16) -> u8 {
        self.memory[address as usize]
    }

    fn write(&mut self, address: u16, value: u8) {
        if self.is_rom_protected(address) {
            return;
        }
        self.memory[address as usize] = value;
    }
}

impl IoBus for BasicSbc {
    fn read_io(&mut self, port: u16) -> u8 {
        if port == self.uart_port {
            self.uart.read_status()
        } else if port == self.uart_port.wrapping_add(1) {
            self.uart.read_data()
        } else {
            0xFF
        }
    }

    fn write_io(&mut self, port: u16, value: u8) {
        if port == self.uart_port {
            self.uart.write_control(value);
        } else if port == self.uart_port.wrapping_add(1) {
            self.uart.write_data(value);
        }
    }
}

/// Scan a ROM image for `IN A,(n)` (0xDB) / `OUT (n),A` (0xD3) opcodes and
/// guess which port pair the firmware expects its UART at.
///
/// Picks the port `p` maximizing `in_count[p]+in_count[p+1]+out_count[p]+out_count[p+1]`
/// among ports where the `IN`-side sum and the `OUT`-side sum are *both*
/// positive (the firmware must both read and write the port pair for it to
/// be a plausible UART); falls back to 0x80 if no port qualifies.
#[must_use]
pub fn detect_uart_port(rom: &[u8]) -> u16 {
    let mut in_count = [0u32; 256];
    let mut out_count = [0u32; 256];

    let mut i = 0;
    while i + 1 < rom.len() {
        match rom[i] {
            0xDB => in_count[rom[i + 1] as usize] += 1,
            0xD3 => out_count[rom[i + 1] as usize] += 1,
            _ => {}
        }
        i += 1;
    }

    let mut best_port = None;
    let mut best_score = 0u32;
    for p in 0..255u16 {
        let lo = p as usize;
        let hi = (p + 1) as usize;
        let in_sum = in_count[lo] + in_count[hi];
        let out_sum = out_count[lo] + out_count[hi];
        if in_sum > 0 && out_sum > 0 && in_sum + out_sum > best_score {
            best_score = in_sum + out_sum;
            best_port = Some(p);
        }
    }

    best_port.unwrap_or(0x80)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rom_protected_region_ignores_writes() {
        let mut sbc = BasicSbc::new(0x80);
        sbc.load_rom(&[0xAA; 0x2000]);

        sbc.write(0x1FFF, 0x00);
        assert_eq!(sbc.read(0x1FFF), 0xAA);

        sbc.write(0x2000, 0x55);
        assert_eq!(sbc.read(0x2000), 0x55);
    }

    #[test]
    fn detects_port_from_synthetic_rom() {
        let rom = [0xDB, 0x42, 0xD3, 0x42, 0xDB, 0x43];
        assert_eq!(detect_uart_port(&rom), 0x42);
    }

    #[test]
    fn detection_defaults_to_0x80_with_no_hits() {
        let rom = [0x00, 0x00, 0x00];
        assert_eq!(detect_uart_port(&rom), 0x80);
    }

    #[test]
    fn out_only_port_does_not_qualify() {
        // Only OUT references a port pair, so its IN-side sum is zero:
        // this must not be picked over the 0x80 default.
        let rom = [0xD3, 0x42];
        assert_eq!(detect_uart_port(&rom), 0x80);
    }
}
