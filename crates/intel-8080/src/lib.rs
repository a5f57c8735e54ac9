//! Intel 8080 CPU emulator.
//!
//! Each call to `step()` executes one whole instruction. The CPU owns a flat
//! 64 KiB address space; port I/O goes through an [`emu_core::IoBus`]
//! supplied by the machine.

mod alu;
mod cpu;
mod decode;
mod error;
mod flags;
mod memory;
mod registers;

pub use alu::{AluOp, AluResult};
pub use cpu::{CpuSnapshot, I8080, RunExit};
pub use decode::{Condition, Instruction, decode};
pub use error::{CpuError, RomError};
pub use flags::{AC, CY, Flags, P, S, Z, parity};
pub use memory::{MEMORY_SIZE, Memory};
pub use registers::{Reg, RegPair, Registers, StackPair, compose, split};
