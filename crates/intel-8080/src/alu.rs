//! ALU operations for the 8080.
//!
//! Everything here is a pure function of its inputs: the CPU passes in the
//! current flags and stores whatever comes back.

#![allow(clippy::verbose_bit_mask)] // Clearer to read nibble comparisons.

use std::fmt;

use crate::flags::Flags;

/// Result of an ALU operation with flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AluResult {
    pub value: u8,
    pub flags: Flags,
}

/// The eight accumulator operations, in opcode order (bits 3-5).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AluOp {
    Add,
    Adc,
    Sub,
    Sbb,
    Ana,
    Xra,
    Ora,
    Cmp,
}

impl AluOp {
    #[must_use]
    pub const fn from_code(code: u8) -> Self {
        match code & 7 {
            0 => Self::Add,
            1 => Self::Adc,
            2 => Self::Sub,
            3 => Self::Sbb,
            4 => Self::Ana,
            5 => Self::Xra,
            6 => Self::Ora,
            _ => Self::Cmp,
        }
    }

    /// Register-operand mnemonic (ADD, ADC, ...).
    #[must_use]
    pub const fn mnemonic(self) -> &'static str {
        match self {
            Self::Add => "ADD",
            Self::Adc => "ADC",
            Self::Sub => "SUB",
            Self::Sbb => "SBB",
            Self::Ana => "ANA",
            Self::Xra => "XRA",
            Self::Ora => "ORA",
            Self::Cmp => "CMP",
        }
    }

    /// Immediate-operand mnemonic (ADI, ACI, ...).
    #[must_use]
    pub const fn immediate_mnemonic(self) -> &'static str {
        match self {
            Self::Add => "ADI",
            Self::Adc => "ACI",
            Self::Sub => "SUI",
            Self::Sbb => "SBI",
            Self::Ana => "ANI",
            Self::Xra => "XRI",
            Self::Ora => "ORI",
            Self::Cmp => "CPI",
        }
    }

    /// Apply the operation to the accumulator. CMP returns `a` unchanged.
    #[must_use]
    pub fn apply(self, a: u8, b: u8, flags: Flags) -> AluResult {
        match self {
            Self::Add => add(a, b, false),
            Self::Adc => add(a, b, flags.cy),
            Self::Sub => sub(a, b, false),
            Self::Sbb => sub(a, b, flags.cy),
            Self::Ana => and(a, b),
            Self::Xra => logic(a ^ b),
            Self::Ora => logic(a | b),
            Self::Cmp => AluResult {
                value: a,
                flags: sub(a, b, false).flags,
            },
        }
    }
}

impl fmt::Display for AluOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}

/// Add with optional carry in.
#[must_use]
pub fn add(a: u8, b: u8, carry: bool) -> AluResult {
    let c = u8::from(carry);
    let wide = u16::from(a) + u16::from(b) + u16::from(c);
    let mut flags = Flags::default();
    flags.set_all(wide, (a & 0x0F) + (b & 0x0F) + c > 0x0F);
    AluResult {
        value: wide as u8,
        flags,
    }
}

/// Subtract with optional borrow in.
///
/// The 8080 subtracts by adding the one's complement, so AC is the carry out
/// of bit 3 of `a + !b + !borrow`. CY is the true borrow.
#[must_use]
pub fn sub(a: u8, b: u8, borrow: bool) -> AluResult {
    let c = u8::from(borrow);
    let value = a.wrapping_sub(b).wrapping_sub(c);
    let mut flags = Flags::default();
    flags.set_zsp(value);
    flags.cy = u16::from(a) < u16::from(b) + u16::from(c);
    flags.ac = (a & 0x0F) + (!b & 0x0F) + (1 - c) > 0x0F;
    AluResult { value, flags }
}

/// ANA/ANI: AC is the OR of bit 3 of both operands.
#[must_use]
pub fn and(a: u8, b: u8) -> AluResult {
    let value = a & b;
    let mut flags = Flags::default();
    flags.set_zsp(value);
    flags.ac = (a | b) & 0x08 != 0;
    AluResult { value, flags }
}

/// XRA/ORA and their immediates: CY and AC cleared.
fn logic(value: u8) -> AluResult {
    let mut flags = Flags::default();
    flags.set_zsp(value);
    AluResult { value, flags }
}

/// Increment. CY is left as it was.
#[must_use]
pub fn inr(value: u8, flags: Flags) -> AluResult {
    let result = value.wrapping_add(1);
    let mut flags = flags;
    flags.set_zsp(result);
    flags.ac = value & 0x0F == 0x0F;
    AluResult {
        value: result,
        flags,
    }
}

/// Decrement. CY is left as it was.
#[must_use]
pub fn dcr(value: u8, flags: Flags) -> AluResult {
    let result = value.wrapping_sub(1);
    let mut flags = flags;
    flags.set_zsp(result);
    flags.ac = value & 0x0F != 0;
    AluResult {
        value: result,
        flags,
    }
}

/// Decimal adjust the accumulator after a BCD addition.
///
/// CY can be set but never cleared.
#[must_use]
pub fn daa(a: u8, flags: Flags) -> AluResult {
    let low = a & 0x0F;
    let high = a >> 4;
    let mut correction = 0;
    let mut carry = flags.cy;
    if flags.ac || low > 9 {
        correction |= 0x06;
    }
    if flags.cy || high > 9 || (high >= 9 && low > 9) {
        correction |= 0x60;
        carry = true;
    }
    let mut result = add(a, correction, false);
    result.flags.cy = carry;
    result
}

/// DAD: 16-bit add, returns the sum and the carry out of bit 15.
#[must_use]
pub fn dad(hl: u16, rp: u16) -> (u16, bool) {
    hl.overflowing_add(rp)
}

/// RLC: rotate left, bit 7 into bit 0 and CY.
#[must_use]
pub const fn rlc(a: u8) -> (u8, bool) {
    (a.rotate_left(1), a & 0x80 != 0)
}

/// RRC: rotate right, bit 0 into bit 7 and CY.
#[must_use]
pub const fn rrc(a: u8) -> (u8, bool) {
    (a.rotate_right(1), a & 0x01 != 0)
}

/// RAL: rotate left through carry.
#[must_use]
pub const fn ral(a: u8, carry: bool) -> (u8, bool) {
    ((a << 1) | carry as u8, a & 0x80 != 0)
}

/// RAR: rotate right through carry.
#[must_use]
pub const fn rar(a: u8, carry: bool) -> (u8, bool) {
    ((a >> 1) | ((carry as u8) << 7), a & 0x01 != 0)
}
