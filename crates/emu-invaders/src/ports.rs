//! The board's port devices: input switches, the hardware bit shifter and
//! the sound and watchdog latches.
//!
//! The 8080 has no barrel shifter, so the board carries a 16-bit shift
//! register that the game uses to draw sprites at any pixel offset.

use emu_core::IoBus;
use tracing::{debug, trace};

use crate::config::DipSwitches;
use crate::input::InvadersKey;

/// Port 0 is wired but never read by the game.
const PORT0_VALUE: u8 = 0x17;

/// Port 1 bit 3 is tied high.
const PORT1_FIXED: u8 = 0x08;

/// 16-bit shift register behind ports 2, 3 and 4.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ShiftRegister {
    value: u16,
    offset: u8,
}

impl ShiftRegister {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            value: 0,
            offset: 0,
        }
    }

    /// OUT 4: new byte enters at the top, the old top byte moves down.
    pub fn push(&mut self, data: u8) {
        self.value = (u16::from(data) << 8) | (self.value >> 8);
    }

    /// OUT 2: read offset, low three bits only.
    pub fn set_offset(&mut self, offset: u8) {
        self.offset = offset & 0x07;
    }

    /// IN 3: eight bits starting `offset` bits below the top.
    #[must_use]
    pub const fn result(&self) -> u8 {
        (self.value >> (8 - self.offset)) as u8
    }
}

/// Everything on the far side of IN and OUT.
#[derive(Debug, Clone)]
pub struct InvadersIo {
    /// Switch bits on port 1 (without the fixed bit).
    port1: u8,
    /// Switch bits on port 2 (without the DIP switches).
    port2: u8,
    dips: DipSwitches,
    shift: ShiftRegister,
    sound1: u8,
    sound2: u8,
    watchdog: u64,
}

impl InvadersIo {
    #[must_use]
    pub fn new(dips: DipSwitches) -> Self {
        Self {
            port1: 0,
            port2: 0,
            dips,
            shift: ShiftRegister::new(),
            sound1: 0,
            sound2: 0,
            watchdog: 0,
        }
    }

    pub fn set_key(&mut self, key: InvadersKey, pressed: bool) {
        let (port, mask) = key.port_bit();
        let bits = if port == 1 {
            &mut self.port1
        } else {
            &mut self.port2
        };
        if pressed {
            *bits |= mask;
        } else {
            *bits &= !mask;
        }
    }

    /// Sound latches written through ports 3 and 5.
    #[must_use]
    pub const fn sound_latches(&self) -> (u8, u8) {
        (self.sound1, self.sound2)
    }

    /// Writes to the watchdog port since power-on.
    #[must_use]
    pub const fn watchdog_kicks(&self) -> u64 {
        self.watchdog
    }

    #[must_use]
    pub const fn shift_register(&self) -> &ShiftRegister {
        &self.shift
    }

    fn latch_sound(latch: &mut u8, port: u8, value: u8) {
        let started = value & !*latch;
        if started != 0 {
            debug!(port, bits = format_args!("{started:#04X}"), "sound on");
        }
        *latch = value;
    }
}

impl IoBus for InvadersIo {
    fn port_in(&mut self, port: u8) -> u8 {
        match port {
            0 => PORT0_VALUE,
            1 => self.port1 | PORT1_FIXED,
            2 => self.port2 | self.dips.port2_bits(),
            3 => self.shift.result(),
            _ => {
                trace!(port, "read from unmapped port");
                0
            }
        }
    }

    fn port_out(&mut self, port: u8, value: u8) {
        match port {
            2 => self.shift.set_offset(value),
            3 => Self::latch_sound(&mut self.sound1, port, value),
            4 => self.shift.push(value),
            5 => Self::latch_sound(&mut self.sound2, port, value),
            6 => self.watchdog += 1,
            _ => trace!(port, value, "write to unmapped port"),
        }
    }
}
