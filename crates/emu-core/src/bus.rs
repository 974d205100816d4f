/// A bus that supports memory read/write operations.
///
/// This is the base trait for any host that wants to drive a CPU core from
/// this workspace. The Z80 has a 16-bit address space, so addresses are
/// plain `u16` rather than the wider bus width some other CPU families need.
pub trait Bus {
    /// Read a byte from the given address.
    ///
    /// Implementations must be side-effect-free from the CPU's perspective;
    /// a single instruction may read the same address more than once.
    fn read(&mut self, address: u16) -> u8;

    /// Write a byte to the given address.
    ///
    /// Implementations may silently ignore writes, for example to model
    /// read-only memory.
    fn write(&mut self, address: u16, value: u8);
}

/// A bus that also supports separate I/O port operations.
///
/// The Z80 has a distinct 16-bit I/O address space accessed via `IN` and
/// `OUT` instructions (the high byte is only meaningful for the `IN r,(C)`
/// / `OUT (C),r` forms; single-byte-port instructions read/write with the
/// accumulator on the high byte).
pub trait IoBus: Bus {
    /// Read a byte from the given I/O port.
    fn read_io(&mut self, port: u16) -> u8;

    /// Write a byte to the given I/O port.
    fn write_io(&mut self, port: u16, value: u8);
}
