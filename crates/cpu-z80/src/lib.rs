//! Cycle-accurate Z80 CPU interpreter.
//!
//! The CPU is a single value type, [`Z80`], generic over nothing: every
//! entry point borrows the host's [`emu_core::IoBus`] implementation for
//! the duration of the call rather than owning it. This lets one `Z80`
//! step against different buses across its lifetime, which conformance
//! harnesses in `tests/` rely on.

pub mod alu;
mod cpu;
pub mod decode;
pub mod flags;
pub mod registers;

pub use cpu::{IndexMode, Z80};
pub use registers::Registers;
