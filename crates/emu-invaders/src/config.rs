//! Machine and host configuration.

use std::fs;
use std::path::Path;

use crate::InvadersError;

/// Names of the four 2 KiB ROM chips, in load order (0x0000 upward).
pub const ROM_PARTS: [&str; 4] = ["invaders.h", "invaders.g", "invaders.f", "invaders.e"];

/// Operator DIP switches, read through input port 2.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DipSwitches {
    /// Ships per game, 3 to 6.
    pub ships: u8,
    /// Extra ship at 1000 points instead of 1500.
    pub bonus_life_at_1000: bool,
    /// Hide the coin information on the attract screen.
    pub coin_info_hidden: bool,
}

impl DipSwitches {
    pub fn new(ships: u8, bonus_life_at_1000: bool, coin_info_hidden: bool) -> Result<Self, InvadersError> {
        if !(3..=6).contains(&ships) {
            return Err(InvadersError::InvalidShips(ships));
        }
        Ok(Self {
            ships,
            bonus_life_at_1000,
            coin_info_hidden,
        })
    }

    /// The switch bits as they appear on port 2 (bits 0, 1, 3 and 7).
    #[must_use]
    pub const fn port2_bits(&self) -> u8 {
        let mut bits = self.ships.saturating_sub(3) & 0x03;
        if self.bonus_life_at_1000 {
            bits |= 0x08;
        }
        if self.coin_info_hidden {
            bits |= 0x80;
        }
        bits
    }
}

impl Default for DipSwitches {
    fn default() -> Self {
        Self {
            ships: 3,
            bonus_life_at_1000: false,
            coin_info_hidden: false,
        }
    }
}

/// Configuration for creating an [`Invaders`](crate::Invaders) instance.
pub struct InvadersConfig {
    /// Program image, loaded at 0x0000.
    pub rom: Vec<u8>,
    pub dips: DipSwitches,
    /// Tint the picture like the coloured strips on the cabinet glass.
    pub overlay: bool,
}

/// Pacing for the threaded host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostConfig {
    /// CPU clock the emulation thread is paced to.
    pub cpu_hz: u64,
    pub frame_rate: u64,
    /// Nominal cycles run per lock acquisition.
    pub slice_cycles: u64,
    /// Sleep to hold `cpu_hz`. When false the CPU runs flat out.
    pub paced: bool,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            cpu_hz: 2_000_000,
            frame_rate: 60,
            slice_cycles: 2_000,
            paced: true,
        }
    }
}

/// Load a program image.
///
/// `path` is either a single file (the four chips already concatenated) or
/// a directory holding `invaders.h`, `.g`, `.f` and `.e`.
pub fn load_rom(path: &Path) -> Result<Vec<u8>, InvadersError> {
    let read = |p: &Path| {
        fs::read(p).map_err(|source| InvadersError::RomRead {
            path: p.to_path_buf(),
            source,
        })
    };

    if !path.is_dir() {
        return read(path);
    }

    let mut rom = Vec::with_capacity(0x2000);
    for part in ROM_PARTS {
        rom.extend(read(&path.join(part))?);
    }
    Ok(rom)
}
