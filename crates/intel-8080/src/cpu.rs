//! 8080 CPU core with per-instruction execution.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

use emu_core::{Cpu, IoBus, Observable, StepOutcome, Value};
use tracing::{debug, trace, warn};

use crate::decode::TABLE;
use crate::error::{CpuError, RomError};
use crate::flags::Flags;
use crate::memory::{MEMORY_SIZE, Memory};
use crate::registers::{Reg, RegPair, Registers, StackPair, compose, split};

mod execute;

/// Why [`I8080::run`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunExit {
    /// The program executed HLT.
    Halted,
    /// The host cleared the keep-running flag.
    Stopped,
}

/// Intel 8080 CPU.
///
/// The CPU owns its 64 KiB memory. Port devices stay with the machine and
/// are passed to `step()` each time, so the machine can read and update them
/// between instructions.
pub struct I8080 {
    pub(crate) regs: Registers,
    /// INTE flip-flop. Set at power-on and by EI, cleared by DI and by
    /// accepting an interrupt.
    inte: bool,
    /// RST opcode staged by `request_interrupt()`, taken in place of the next fetch.
    pending: Option<u8>,
    halted: bool,
    pub(crate) memory: Memory,
    /// Nominal 8080 states executed since power-on.
    cycles: u64,
}

impl I8080 {
    /// Create a CPU with `rom` copied to address 0 and all other memory zeroed.
    pub fn new(rom: &[u8]) -> Result<Self, RomError> {
        if rom.is_empty() {
            return Err(RomError::Empty);
        }
        if rom.len() > MEMORY_SIZE {
            return Err(RomError::TooLarge { len: rom.len() });
        }

        let mut memory = Memory::new();
        memory.load(0x0000, rom);
        debug!(bytes = rom.len(), "program image loaded");

        Ok(Self {
            regs: Registers::default(),
            inte: true,
            pending: None,
            halted: false,
            memory,
            cycles: 0,
        })
    }

    /// Execute one instruction.
    ///
    /// A staged interrupt opcode is executed instead of fetching from PC.
    /// Once halted, every call returns `Halted` without executing anything.
    pub fn step<B: IoBus>(&mut self, io: &mut B) -> Result<StepOutcome, CpuError> {
        if self.halted {
            return Ok(StepOutcome::Halted);
        }

        let pc = self.regs.pc;
        let opcode = match self.pending.take() {
            Some(opcode) => {
                self.inte = false;
                debug!(pc = format_args!("{pc:#06X}"), "accepted RST {}", (opcode >> 3) & 7);
                opcode
            }
            None => self.fetch(),
        };

        let instruction = TABLE[usize::from(opcode)];
        trace!("{pc:04X}  {instruction}");

        match self.execute(instruction, pc, io) {
            Ok(cycles) => self.cycles += u64::from(cycles),
            Err(e) => {
                self.regs.pc = pc;
                return Err(e);
            }
        }

        Ok(if self.halted {
            StepOutcome::Halted
        } else {
            StepOutcome::Continue
        })
    }

    /// Step until HLT or until `keep_running` is cleared.
    ///
    /// The flag is checked between instructions, never mid-instruction.
    pub fn run<B: IoBus>(
        &mut self,
        io: &mut B,
        keep_running: &AtomicBool,
    ) -> Result<RunExit, CpuError> {
        loop {
            if !keep_running.load(Ordering::Relaxed) {
                return Ok(RunExit::Stopped);
            }
            if self.step(io)? == StepOutcome::Halted {
                return Ok(RunExit::Halted);
            }
        }
    }

    /// Step until at least `cycles` nominal states have elapsed, or HLT.
    ///
    /// The last instruction may overshoot the budget.
    pub fn run_for<B: IoBus>(&mut self, io: &mut B, cycles: u64) -> Result<StepOutcome, CpuError> {
        let target = self.cycles.saturating_add(cycles);
        while self.cycles < target {
            if self.step(io)? == StepOutcome::Halted {
                return Ok(StepOutcome::Halted);
            }
        }
        Ok(StepOutcome::Continue)
    }

    /// Stage an RST opcode to run in place of the next fetch.
    ///
    /// Ignored (returns false) while interrupts are disabled or if `opcode`
    /// is not one of the eight RST opcodes. A second request before the
    /// first is taken replaces it.
    pub fn request_interrupt(&mut self, opcode: u8) -> bool {
        if opcode & 0xC7 != 0xC7 {
            warn!(opcode = format_args!("{opcode:#04X}"), "interrupt vector is not an RST opcode");
            return false;
        }
        if !self.inte {
            trace!("interrupt RST {} ignored, interrupts disabled", (opcode >> 3) & 7);
            return false;
        }
        self.pending = Some(opcode);
        true
    }

    /// Nominal 8080 states executed since power-on.
    #[must_use]
    pub const fn total_cycles(&self) -> u64 {
        self.cycles
    }

    #[must_use]
    pub const fn interrupts_enabled(&self) -> bool {
        self.inte
    }

    /// The staged interrupt opcode, if one is waiting.
    #[must_use]
    pub const fn pending_interrupt(&self) -> Option<u8> {
        self.pending
    }

    #[must_use]
    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    pub fn memory_mut(&mut self) -> &mut Memory {
        &mut self.memory
    }

    /// Full copy of the CPU state, memory included.
    #[must_use]
    pub fn snapshot(&self) -> CpuSnapshot {
        CpuSnapshot {
            registers: self.regs,
            inte: self.inte,
            halted: self.halted,
            pending: self.pending,
            cycles: self.cycles,
            memory: self.memory.as_slice().to_vec(),
        }
    }

    // === Register accessors ===

    #[must_use]
    pub const fn a(&self) -> u8 {
        self.regs.a
    }

    #[must_use]
    pub const fn b(&self) -> u8 {
        self.regs.b
    }

    #[must_use]
    pub const fn c(&self) -> u8 {
        self.regs.c
    }

    #[must_use]
    pub const fn d(&self) -> u8 {
        self.regs.d
    }

    #[must_use]
    pub const fn e(&self) -> u8 {
        self.regs.e
    }

    #[must_use]
    pub const fn h(&self) -> u8 {
        self.regs.h
    }

    #[must_use]
    pub const fn l(&self) -> u8 {
        self.regs.l
    }

    #[must_use]
    pub const fn bc(&self) -> u16 {
        self.regs.bc()
    }

    #[must_use]
    pub const fn de(&self) -> u16 {
        self.regs.de()
    }

    #[must_use]
    pub const fn hl(&self) -> u16 {
        self.regs.hl()
    }

    #[must_use]
    pub const fn sp(&self) -> u16 {
        self.regs.sp
    }

    #[must_use]
    pub const fn flags(&self) -> Flags {
        self.regs.flags
    }

    /// Force a return from a subroutine call.
    ///
    /// Pops the return address into PC. Used by test harnesses to skip trap
    /// addresses after handling system calls (e.g. CP/M BDOS emulation).
    #[cfg(any(test, feature = "test-utils"))]
    pub fn force_ret(&mut self) {
        self.regs.pc = self.pop();
    }

    /// Set the program counter.
    #[cfg(any(test, feature = "test-utils"))]
    pub fn set_pc(&mut self, value: u16) {
        self.regs.pc = value;
    }

    /// Set the stack pointer.
    #[cfg(any(test, feature = "test-utils"))]
    pub fn set_sp(&mut self, value: u16) {
        self.regs.sp = value;
    }

    #[cfg(any(test, feature = "test-utils"))]
    pub fn set_a(&mut self, value: u8) {
        self.regs.a = value;
    }

    #[cfg(any(test, feature = "test-utils"))]
    pub fn set_bc(&mut self, value: u16) {
        self.regs.set_bc(value);
    }

    #[cfg(any(test, feature = "test-utils"))]
    pub fn set_de(&mut self, value: u16) {
        self.regs.set_de(value);
    }

    #[cfg(any(test, feature = "test-utils"))]
    pub fn set_hl(&mut self, value: u16) {
        self.regs.set_hl(value);
    }

    #[cfg(any(test, feature = "test-utils"))]
    pub fn set_flags(&mut self, flags: Flags) {
        self.regs.flags = flags;
    }

    // === Internal helpers ===

    /// Read the byte at PC and advance PC.
    fn fetch(&mut self) -> u8 {
        let value = self.memory.read(self.regs.pc);
        self.regs.pc = self.regs.pc.wrapping_add(1);
        value
    }

    /// Read a little-endian word at PC and advance PC past it.
    fn fetch_word(&mut self) -> u16 {
        let low = self.fetch();
        let high = self.fetch();
        compose(high, low)
    }

    fn push(&mut self, value: u16) {
        let (high, low) = split(value);
        self.regs.sp = self.regs.sp.wrapping_sub(1);
        self.memory.write(self.regs.sp, high);
        self.regs.sp = self.regs.sp.wrapping_sub(1);
        self.memory.write(self.regs.sp, low);
    }

    fn pop(&mut self) -> u16 {
        let low = self.memory.read(self.regs.sp);
        self.regs.sp = self.regs.sp.wrapping_add(1);
        let high = self.memory.read(self.regs.sp);
        self.regs.sp = self.regs.sp.wrapping_add(1);
        compose(high, low)
    }

    fn get_reg(&self, r: Reg) -> u8 {
        match r {
            Reg::B => self.regs.b,
            Reg::C => self.regs.c,
            Reg::D => self.regs.d,
            Reg::E => self.regs.e,
            Reg::H => self.regs.h,
            Reg::L => self.regs.l,
            Reg::M => self.memory.read(self.regs.hl()),
            Reg::A => self.regs.a,
        }
    }

    fn set_reg(&mut self, r: Reg, value: u8) {
        match r {
            Reg::B => self.regs.b = value,
            Reg::C => self.regs.c = value,
            Reg::D => self.regs.d = value,
            Reg::E => self.regs.e = value,
            Reg::H => self.regs.h = value,
            Reg::L => self.regs.l = value,
            Reg::M => self.memory.write(self.regs.hl(), value),
            Reg::A => self.regs.a = value,
        }
    }

    fn get_pair(&self, rp: RegPair) -> u16 {
        match rp {
            RegPair::BC => self.regs.bc(),
            RegPair::DE => self.regs.de(),
            RegPair::HL => self.regs.hl(),
            RegPair::SP => self.regs.sp,
        }
    }

    fn set_pair(&mut self, rp: RegPair, value: u16) {
        match rp {
            RegPair::BC => self.regs.set_bc(value),
            RegPair::DE => self.regs.set_de(value),
            RegPair::HL => self.regs.set_hl(value),
            RegPair::SP => self.regs.sp = value,
        }
    }

    fn get_stack_pair(&self, sp: StackPair) -> u16 {
        match sp {
            StackPair::BC => self.regs.bc(),
            StackPair::DE => self.regs.de(),
            StackPair::HL => self.regs.hl(),
            StackPair::PSW => self.regs.psw(),
        }
    }

    fn set_stack_pair(&mut self, sp: StackPair, value: u16) {
        match sp {
            StackPair::BC => self.regs.set_bc(value),
            StackPair::DE => self.regs.set_de(value),
            StackPair::HL => self.regs.set_hl(value),
            StackPair::PSW => self.regs.set_psw(value),
        }
    }
}

impl Cpu for I8080 {
    type Registers = Registers;
    type Error = CpuError;

    fn step<B: IoBus>(&mut self, io: &mut B) -> Result<StepOutcome, CpuError> {
        I8080::step(self, io)
    }

    fn pc(&self) -> u16 {
        self.regs.pc
    }

    fn registers(&self) -> Registers {
        self.regs
    }

    fn is_halted(&self) -> bool {
        self.halted
    }

    fn interrupt(&mut self, opcode: u8) -> bool {
        self.request_interrupt(opcode)
    }

    fn reset(&mut self) {
        self.regs = Registers::default();
        self.inte = true;
        self.pending = None;
        self.halted = false;
        self.cycles = 0;
    }
}

/// All paths supported by [`I8080::query`](Observable::query).
const QUERY_PATHS: &[&str] = &[
    "a", "b", "c", "d", "e", "h", "l", "bc", "de", "hl", "psw", "sp", "pc", "flags", "flags.s",
    "flags.z", "flags.ac", "flags.p", "flags.cy", "inte", "pending", "halted", "cycles",
];

impl Observable for I8080 {
    fn query(&self, path: &str) -> Option<Value> {
        let r = &self.regs;
        let value = match path {
            "a" => r.a.into(),
            "b" => r.b.into(),
            "c" => r.c.into(),
            "d" => r.d.into(),
            "e" => r.e.into(),
            "h" => r.h.into(),
            "l" => r.l.into(),
            "bc" => r.bc().into(),
            "de" => r.de().into(),
            "hl" => r.hl().into(),
            "psw" => r.psw().into(),
            "sp" => r.sp.into(),
            "pc" => r.pc.into(),
            "flags" => r.flags.to_byte().into(),
            "flags.s" => r.flags.s.into(),
            "flags.z" => r.flags.z.into(),
            "flags.ac" => r.flags.ac.into(),
            "flags.p" => r.flags.p.into(),
            "flags.cy" => r.flags.cy.into(),
            "inte" => self.inte.into(),
            "pending" => self.pending.into(),
            "halted" => self.halted.into(),
            "cycles" => self.cycles.into(),
            _ => return None,
        };
        Some(value)
    }

    fn query_paths(&self) -> &'static [&'static str] {
        QUERY_PATHS
    }
}

/// Owned copy of the full CPU state, for dumps and post-mortems.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CpuSnapshot {
    pub registers: Registers,
    pub inte: bool,
    pub halted: bool,
    pub pending: Option<u8>,
    pub cycles: u64,
    pub memory: Vec<u8>,
}

impl fmt::Display for CpuSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let r = &self.registers;
        let flag = |set: bool, name: &'static str| if set { name } else { "." };
        writeln!(
            f,
            "PC={:04X} SP={:04X} A={:02X} BC={:04X} DE={:04X} HL={:04X}",
            r.pc,
            r.sp,
            r.a,
            r.bc(),
            r.de(),
            r.hl()
        )?;
        write!(
            f,
            "flags={}{}{}{}{} INTE={} halted={} cycles={}",
            flag(r.flags.s, "S"),
            flag(r.flags.z, "Z"),
            flag(r.flags.ac, "A"),
            flag(r.flags.p, "P"),
            flag(r.flags.cy, "C"),
            u8::from(self.inte),
            self.halted,
            self.cycles
        )?;
        if let Some(op) = self.pending {
            write!(f, " pending=RST {}", (op >> 3) & 7)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use emu_core::SimpleIo;

    fn cpu(program: &[u8]) -> I8080 {
        I8080::new(program).expect("valid program")
    }

    #[test]
    fn rejects_bad_images() {
        assert_eq!(I8080::new(&[]).err(), Some(RomError::Empty));
        let big = vec![0; MEMORY_SIZE + 1];
        assert_eq!(
            I8080::new(&big).err(),
            Some(RomError::TooLarge {
                len: MEMORY_SIZE + 1
            })
        );
        assert!(I8080::new(&vec![0; MEMORY_SIZE]).is_ok());
    }

    #[test]
    fn image_loaded_at_zero() {
        let c = cpu(&[0x3E, 0x05, 0x76]);
        assert_eq!(c.memory().window(0, 4), &[0x3E, 0x05, 0x76, 0x00]);
        assert_eq!(Cpu::pc(&c), 0);
        assert!(c.interrupts_enabled());
    }

    #[test]
    fn push_pop_wrap_stack() {
        let mut c = cpu(&[0x00]);
        c.set_sp(0x0001);
        c.push(0xABCD);
        assert_eq!(c.sp(), 0xFFFF);
        assert_eq!(c.memory().read(0x0000), 0xAB);
        assert_eq!(c.memory().read(0xFFFF), 0xCD);
        assert_eq!(c.pop(), 0xABCD);
        assert_eq!(c.sp(), 0x0001);
    }

    #[test]
    fn fetch_wraps_pc() {
        let mut c = cpu(&[0x11]);
        c.set_pc(0xFFFF);
        c.memory_mut().write(0xFFFF, 0x22);
        assert_eq!(c.fetch(), 0x22);
        assert_eq!(Cpu::pc(&c), 0x0000);
        assert_eq!(c.fetch(), 0x11);
    }

    #[test]
    fn m_operand_goes_through_hl() {
        let mut c = cpu(&[0x00]);
        c.regs.set_hl(0x2400);
        c.set_reg(Reg::M, 0x5A);
        assert_eq!(c.memory().read(0x2400), 0x5A);
        assert_eq!(c.get_reg(Reg::M), 0x5A);
    }

    #[test]
    fn interrupt_requires_enable_and_rst() {
        let mut c = cpu(&[0x00]);
        c.inte = false;
        assert!(!c.request_interrupt(0xCF));
        assert_eq!(c.pending_interrupt(), None);

        c.inte = true;
        assert!(!c.request_interrupt(0x3E));
        assert!(c.request_interrupt(0xCF));
        assert!(c.request_interrupt(0xD7));
        assert_eq!(c.pending_interrupt(), Some(0xD7));
    }

    #[test]
    fn interrupts_enabled_at_power_on() {
        // LXI SP,2400 with no EI anywhere
        let mut c = cpu(&[0x31, 0x00, 0x24, 0x00]);
        let mut io = SimpleIo::new();
        c.step(&mut io).expect("LXI");
        assert!(c.request_interrupt(0xCF));
        c.step(&mut io).expect("RST 1");
        assert_eq!(Cpu::pc(&c), 0x0008);
        assert_eq!(c.memory().read_word(0x23FE), 0x0003);
    }

    #[test]
    fn reset_reenables_interrupts() {
        let mut c = cpu(&[0xF3, 0x00]);
        let mut io = SimpleIo::new();
        c.step(&mut io).expect("DI");
        assert!(!c.interrupts_enabled());
        Cpu::reset(&mut c);
        assert!(c.interrupts_enabled());
        assert!(c.request_interrupt(0xD7));
    }

    #[test]
    fn accepted_interrupt_disables_further_interrupts() {
        let mut c = cpu(&[0xFB, 0x00, 0x00]);
        let mut io = SimpleIo::new();
        c.set_sp(0x2400);
        c.step(&mut io).expect("EI");
        assert!(c.request_interrupt(0xCF));
        c.step(&mut io).expect("RST 1");
        assert_eq!(Cpu::pc(&c), 0x0008);
        assert!(!c.interrupts_enabled());
        assert!(!c.request_interrupt(0xD7));
    }

    #[test]
    fn fault_leaves_pc_on_opcode() {
        let mut c = cpu(&[0x00, 0xDD]);
        let mut io = SimpleIo::new();
        c.step(&mut io).expect("NOP");
        assert_eq!(
            c.step(&mut io),
            Err(CpuError::UnimplementedOpcode {
                opcode: 0xDD,
                pc: 0x0001
            })
        );
        assert_eq!(Cpu::pc(&c), 0x0001);
    }

    #[test]
    fn run_stops_when_flag_cleared() {
        // JMP 0000
        let mut c = cpu(&[0xC3, 0x00, 0x00]);
        let mut io = SimpleIo::new();
        let keep_running = AtomicBool::new(false);
        assert_eq!(c.run(&mut io, &keep_running), Ok(RunExit::Stopped));
        assert_eq!(c.total_cycles(), 0);
    }

    #[test]
    fn run_for_meets_budget() {
        let mut c = cpu(&[0xC3, 0x00, 0x00]);
        let mut io = SimpleIo::new();
        assert_eq!(c.run_for(&mut io, 25), Ok(StepOutcome::Continue));
        // three JMPs of 10 states each
        assert_eq!(c.total_cycles(), 30);
    }

    #[test]
    fn reset_keeps_memory() {
        let mut c = cpu(&[0x3E, 0x05, 0x76]);
        let mut io = SimpleIo::new();
        while c.step(&mut io) == Ok(StepOutcome::Continue) {}
        assert!(c.is_halted());
        c.reset();
        assert!(!c.is_halted());
        assert_eq!(c.a(), 0);
        assert_eq!(c.memory().read(1), 0x05);
    }

    #[test]
    fn observable_paths() {
        let mut c = cpu(&[0x00]);
        c.regs.set_bc(0x1234);
        c.regs.flags.z = true;
        assert_eq!(c.query("bc"), Some(Value::U16(0x1234)));
        assert_eq!(c.query("flags.z"), Some(Value::Bool(true)));
        assert_eq!(c.query("flags"), Some(Value::U8(0x42)));
        assert_eq!(c.query("pending"), Some(Value::None));
        assert_eq!(c.query("ix"), None);
        for path in c.query_paths() {
            assert!(c.query(path).is_some(), "{path}");
        }
    }

    #[test]
    fn snapshot_dump() {
        let mut c = cpu(&[0x00]);
        c.regs.a = 0x5A;
        c.regs.flags.cy = true;
        let snap = c.snapshot();
        assert_eq!(snap.memory.len(), MEMORY_SIZE);
        let text = snap.to_string();
        assert!(text.contains("A=5A"));
        assert!(text.contains("flags=....C"));
    }
}
