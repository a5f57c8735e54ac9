//! 8080 condition flags.
//!
//! The five flags live as separate bools in [`Flags`]. They only become a
//! byte when PSW is pushed, using the layout `S Z 0 AC 0 P 1 C`.

/// Sign flag (bit 7) - copy of bit 7 of the result.
pub const S: u8 = 0b1000_0000;

/// Zero flag (bit 6) - set if the result is zero.
pub const Z: u8 = 0b0100_0000;

/// Auxiliary carry (bit 4) - carry out of bit 3.
pub const AC: u8 = 0b0001_0000;

/// Parity flag (bit 2) - set if the result has an even number of 1 bits.
pub const P: u8 = 0b0000_0100;

/// Carry flag (bit 0) - carry out of bit 7, or borrow for subtraction.
pub const CY: u8 = 0b0000_0001;

/// Bit 1 of the flag byte always reads as 1.
const FIXED_ONE: u8 = 0b0000_0010;

/// Compute parity of a byte (true if even number of 1 bits).
#[must_use]
pub const fn parity(value: u8) -> bool {
    value.count_ones().is_multiple_of(2)
}

/// The 8080 flag set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Flags {
    pub z: bool,
    pub s: bool,
    pub p: bool,
    pub cy: bool,
    pub ac: bool,
}

impl Flags {
    /// Set Z, S and P from a result byte.
    pub fn set_zsp(&mut self, value: u8) {
        self.z = value == 0;
        self.s = value & 0x80 != 0;
        self.p = parity(value);
    }

    /// Set all five flags from an untruncated arithmetic result.
    ///
    /// Z, S and P follow the low byte, carry is set when the result
    /// overflowed eight bits. The caller truncates the register.
    pub fn set_all(&mut self, wide: u16, aux: bool) {
        self.set_zsp(wide as u8);
        self.cy = wide > 0xFF;
        self.ac = aux;
    }

    /// Pack into the PSW flag byte.
    #[must_use]
    pub const fn to_byte(self) -> u8 {
        let mut f = FIXED_ONE;
        if self.s {
            f |= S;
        }
        if self.z {
            f |= Z;
        }
        if self.ac {
            f |= AC;
        }
        if self.p {
            f |= P;
        }
        if self.cy {
            f |= CY;
        }
        f
    }

    /// Unpack a PSW flag byte. Bits 5, 3 and 1 are ignored.
    #[must_use]
    pub const fn from_byte(f: u8) -> Self {
        Self {
            z: f & Z != 0,
            s: f & S != 0,
            p: f & P != 0,
            cy: f & CY != 0,
            ac: f & AC != 0,
        }
    }
}
