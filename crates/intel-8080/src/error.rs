//! Error types for the 8080 core.

use thiserror::Error;

/// A program image that cannot be loaded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RomError {
    #[error("program image is empty")]
    Empty,
    #[error("program image is {len} bytes, larger than the 64 KiB address space")]
    TooLarge { len: usize },
}

/// Fatal execution error. The CPU stops at the faulting instruction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CpuError {
    #[error("unimplemented opcode {opcode:#04X} at {pc:#06X}")]
    UnimplementedOpcode { opcode: u8, pc: u16 },
}
