//! 8080 register set and register operand encodings.

use crate::flags::Flags;

/// Compose a register pair from its high and low halves.
#[must_use]
pub const fn compose(high: u8, low: u8) -> u16 {
    (high as u16) << 8 | low as u16
}

/// Split a register pair into `(high, low)`.
#[must_use]
pub const fn split(value: u16) -> (u8, u8) {
    ((value >> 8) as u8, value as u8)
}

/// 8-bit operand, in the order of the 3-bit field in the opcode.
///
/// `M` is the byte in memory addressed by H:L.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reg {
    B,
    C,
    D,
    E,
    H,
    L,
    M,
    A,
}

impl Reg {
    /// Decode a 3-bit register field.
    #[must_use]
    pub const fn from_code(code: u8) -> Self {
        match code & 7 {
            0 => Self::B,
            1 => Self::C,
            2 => Self::D,
            3 => Self::E,
            4 => Self::H,
            5 => Self::L,
            6 => Self::M,
            _ => Self::A,
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
            Self::E => "E",
            Self::H => "H",
            Self::L => "L",
            Self::M => "M",
            Self::A => "A",
        }
    }
}

/// 16-bit operand of LXI, INX, DCX and DAD.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegPair {
    BC,
    DE,
    HL,
    SP,
}

impl RegPair {
    /// Decode the 2-bit pair field (bits 4-5 of the opcode).
    #[must_use]
    pub const fn from_code(code: u8) -> Self {
        match code & 3 {
            0 => Self::BC,
            1 => Self::DE,
            2 => Self::HL,
            _ => Self::SP,
        }
    }

    /// Name as written in 8080 mnemonics (B, D, H, SP).
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::BC => "B",
            Self::DE => "D",
            Self::HL => "H",
            Self::SP => "SP",
        }
    }
}

/// 16-bit operand of PUSH and POP. PSW takes the place of SP.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackPair {
    BC,
    DE,
    HL,
    PSW,
}

impl StackPair {
    #[must_use]
    pub const fn from_code(code: u8) -> Self {
        match code & 3 {
            0 => Self::BC,
            1 => Self::DE,
            2 => Self::HL,
            _ => Self::PSW,
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::BC => "B",
            Self::DE => "D",
            Self::HL => "H",
            Self::PSW => "PSW",
        }
    }
}

/// 8080 registers snapshot for observation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Registers {
    pub a: u8,
    pub b: u8,
    pub c: u8,
    pub d: u8,
    pub e: u8,
    pub h: u8,
    pub l: u8,
    pub sp: u16,
    pub pc: u16,
    pub flags: Flags,
}

impl Registers {
    /// Get BC register pair.
    #[must_use]
    pub const fn bc(&self) -> u16 {
        compose(self.b, self.c)
    }

    /// Get DE register pair.
    #[must_use]
    pub const fn de(&self) -> u16 {
        compose(self.d, self.e)
    }

    /// Get HL register pair.
    #[must_use]
    pub const fn hl(&self) -> u16 {
        compose(self.h, self.l)
    }

    /// Get the program status word (A and the flag byte).
    #[must_use]
    pub const fn psw(&self) -> u16 {
        compose(self.a, self.flags.to_byte())
    }

    pub fn set_bc(&mut self, value: u16) {
        (self.b, self.c) = split(value);
    }

    pub fn set_de(&mut self, value: u16) {
        (self.d, self.e) = split(value);
    }

    pub fn set_hl(&mut self, value: u16) {
        (self.h, self.l) = split(value);
    }

    pub fn set_psw(&mut self, value: u16) {
        let (a, f) = split(value);
        self.a = a;
        self.flags = Flags::from_byte(f);
    }
}
