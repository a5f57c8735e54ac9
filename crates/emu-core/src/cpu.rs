//! CPU core trait.

use crate::IoBus;

/// Result of executing one instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// The instruction completed and the CPU can keep going.
    Continue,
    /// The CPU executed HLT (or was already halted).
    Halted,
}

/// A CPU core.
///
/// CPUs execute whole instructions and own their address space. Port I/O
/// goes through the bus passed into `step()`, so the machine keeps ownership
/// of its devices and can inspect them between steps.
pub trait Cpu {
    /// The type used for register inspection.
    type Registers;

    /// Fatal execution error (e.g. an opcode the core refuses to run).
    type Error;

    /// Execute one instruction, or one staged interrupt opcode.
    fn step<B: IoBus>(&mut self, io: &mut B) -> Result<StepOutcome, Self::Error>;

    /// Returns the current program counter.
    fn pc(&self) -> u16;

    /// Returns a snapshot of all registers for inspection.
    fn registers(&self) -> Self::Registers;

    /// Returns true if the CPU is halted.
    fn is_halted(&self) -> bool;

    /// Stage an interrupt whose vector is the given opcode.
    ///
    /// Returns true if the request was accepted.
    fn interrupt(&mut self, opcode: u8) -> bool;

    /// Reset the CPU to its power-on register state. Memory is kept.
    fn reset(&mut self);
}
