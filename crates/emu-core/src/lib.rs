//! Core traits and types shared by CPU cores and machines.
//!
//! A CPU owns its memory and executes one instruction per step. Everything
//! outside the address space (switches, shift hardware, sound latches) sits
//! behind the port bus, which the machine passes in on every step.

mod cpu;
mod io_bus;
mod observable;

pub use cpu::{Cpu, StepOutcome};
pub use io_bus::{IoBus, SimpleIo};
pub use observable::{Observable, Value};
