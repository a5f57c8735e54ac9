//! Instruction execution.
//!
//! Each arm performs one instruction and returns its nominal state count.
//! Counts follow the 8080 data sheet; conditional calls and returns cost
//! less when not taken.

use emu_core::IoBus;

use super::I8080;
use crate::alu::{self, AluOp, AluResult};
use crate::decode::{Condition, Instruction};
use crate::error::CpuError;
use crate::registers::Reg;

impl I8080 {
    pub(super) fn execute<B: IoBus>(
        &mut self,
        instruction: Instruction,
        pc: u16,
        io: &mut B,
    ) -> Result<u32, CpuError> {
        let cycles = match instruction {
            Instruction::Nop => 4,

            // === Data transfer ===
            Instruction::Mov(dst, src) => {
                let value = self.get_reg(src);
                self.set_reg(dst, value);
                if dst == Reg::M || src == Reg::M { 7 } else { 5 }
            }
            Instruction::Mvi(r) => {
                let value = self.fetch();
                self.set_reg(r, value);
                if r == Reg::M { 10 } else { 7 }
            }
            Instruction::Lxi(rp) => {
                let value = self.fetch_word();
                self.set_pair(rp, value);
                10
            }
            Instruction::Stax(rp) => {
                let addr = self.get_pair(rp);
                self.memory.write(addr, self.regs.a);
                7
            }
            Instruction::Ldax(rp) => {
                let addr = self.get_pair(rp);
                self.regs.a = self.memory.read(addr);
                7
            }
            Instruction::Sta => {
                let addr = self.fetch_word();
                self.memory.write(addr, self.regs.a);
                13
            }
            Instruction::Lda => {
                let addr = self.fetch_word();
                self.regs.a = self.memory.read(addr);
                13
            }
            Instruction::Shld => {
                let addr = self.fetch_word();
                self.memory.write_word(addr, self.regs.hl());
                16
            }
            Instruction::Lhld => {
                let addr = self.fetch_word();
                let value = self.memory.read_word(addr);
                self.regs.set_hl(value);
                16
            }
            Instruction::Xchg => {
                let (de, hl) = (self.regs.de(), self.regs.hl());
                self.regs.set_de(hl);
                self.regs.set_hl(de);
                5
            }

            // === Increment / decrement ===
            Instruction::Inr(r) => {
                let result = alu::inr(self.get_reg(r), self.regs.flags);
                self.store(r, result);
                if r == Reg::M { 10 } else { 5 }
            }
            Instruction::Dcr(r) => {
                let result = alu::dcr(self.get_reg(r), self.regs.flags);
                self.store(r, result);
                if r == Reg::M { 10 } else { 5 }
            }
            Instruction::Inx(rp) => {
                let value = self.get_pair(rp).wrapping_add(1);
                self.set_pair(rp, value);
                5
            }
            Instruction::Dcx(rp) => {
                let value = self.get_pair(rp).wrapping_sub(1);
                self.set_pair(rp, value);
                5
            }
            Instruction::Dad(rp) => {
                let (sum, carry) = alu::dad(self.regs.hl(), self.get_pair(rp));
                self.regs.set_hl(sum);
                self.regs.flags.cy = carry;
                10
            }

            // === Accumulator ===
            Instruction::Alu(op, r) => {
                let operand = self.get_reg(r);
                self.accumulate(op, operand);
                if r == Reg::M { 7 } else { 4 }
            }
            Instruction::AluImm(op) => {
                let operand = self.fetch();
                self.accumulate(op, operand);
                7
            }
            Instruction::Rlc => {
                let (a, carry) = alu::rlc(self.regs.a);
                self.rotated(a, carry)
            }
            Instruction::Rrc => {
                let (a, carry) = alu::rrc(self.regs.a);
                self.rotated(a, carry)
            }
            Instruction::Ral => {
                let (a, carry) = alu::ral(self.regs.a, self.regs.flags.cy);
                self.rotated(a, carry)
            }
            Instruction::Rar => {
                let (a, carry) = alu::rar(self.regs.a, self.regs.flags.cy);
                self.rotated(a, carry)
            }
            Instruction::Daa => {
                let result = alu::daa(self.regs.a, self.regs.flags);
                self.store(Reg::A, result);
                4
            }
            Instruction::Cma => {
                self.regs.a = !self.regs.a;
                4
            }
            Instruction::Stc => {
                self.regs.flags.cy = true;
                4
            }
            Instruction::Cmc => {
                self.regs.flags.cy = !self.regs.flags.cy;
                4
            }

            // === Branch ===
            Instruction::Jmp(cc) => {
                // The address is consumed whether or not the jump is taken
                let addr = self.fetch_word();
                if cc.holds(self.regs.flags) {
                    self.regs.pc = addr;
                }
                10
            }
            Instruction::Call(cc) => {
                let addr = self.fetch_word();
                if cc.holds(self.regs.flags) {
                    self.push(self.regs.pc);
                    self.regs.pc = addr;
                    17
                } else {
                    11
                }
            }
            Instruction::Ret(Condition::Always) => {
                self.regs.pc = self.pop();
                10
            }
            Instruction::Ret(cc) => {
                if cc.holds(self.regs.flags) {
                    self.regs.pc = self.pop();
                    11
                } else {
                    5
                }
            }
            Instruction::Rst(n) => {
                self.push(self.regs.pc);
                self.regs.pc = u16::from(n) * 8;
                11
            }
            Instruction::Pchl => {
                self.regs.pc = self.regs.hl();
                5
            }

            // === Stack ===
            Instruction::Push(sp) => {
                let value = self.get_stack_pair(sp);
                self.push(value);
                11
            }
            Instruction::Pop(sp) => {
                let value = self.pop();
                self.set_stack_pair(sp, value);
                10
            }
            Instruction::Xthl => {
                let top = self.memory.read_word(self.regs.sp);
                self.memory.write_word(self.regs.sp, self.regs.hl());
                self.regs.set_hl(top);
                18
            }
            Instruction::Sphl => {
                self.regs.sp = self.regs.hl();
                5
            }

            // === I/O and machine control ===
            Instruction::In => {
                let port = self.fetch();
                self.regs.a = io.port_in(port);
                10
            }
            Instruction::Out => {
                let port = self.fetch();
                io.port_out(port, self.regs.a);
                10
            }
            Instruction::Ei => {
                self.inte = true;
                4
            }
            Instruction::Di => {
                self.inte = false;
                4
            }
            Instruction::Hlt => {
                self.halted = true;
                7
            }
            Instruction::Unimplemented(opcode) => {
                return Err(CpuError::UnimplementedOpcode { opcode, pc });
            }
        };
        Ok(cycles)
    }

    /// Write an ALU result back to a register and take its flags.
    fn store(&mut self, r: Reg, result: AluResult) {
        self.set_reg(r, result.value);
        self.regs.flags = result.flags;
    }

    fn accumulate(&mut self, op: AluOp, operand: u8) {
        let result = op.apply(self.regs.a, operand, self.regs.flags);
        self.store(Reg::A, result);
    }

    /// Rotates touch only CY.
    fn rotated(&mut self, a: u8, carry: bool) -> u32 {
        self.regs.a = a;
        self.regs.flags.cy = carry;
        4
    }
}
