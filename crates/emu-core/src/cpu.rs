use crate::Bus;

/// A CPU that can execute instructions against a host-provided bus.
///
/// The type parameter `B` is the bus the CPU operates on. Implementations
/// hold no bus of their own reference beyond the duration of a call; the
/// host retains ownership and passes it in on every entry point.
pub trait Cpu<B: Bus> {
    /// Execute one instruction (or one HALT quantum). Returns the number of
    /// T-states consumed.
    fn step(&mut self, bus: &mut B) -> u32;

    /// Reset the CPU to its initial power-on state.
    fn reset(&mut self, bus: &mut B);

    /// Signal a maskable interrupt. Ignored if interrupts are disabled.
    fn interrupt(&mut self, bus: &mut B);

    /// Signal a non-maskable interrupt.
    fn nmi(&mut self, bus: &mut B);

    /// The current program counter.
    fn pc(&self) -> u16;

    /// Whether the CPU is halted (executing the HALT no-op loop).
    fn halted(&self) -> bool;
}
