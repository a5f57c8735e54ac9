//! Space Invaders arcade board emulator.
//!
//! The board is an Intel 8080 at 2 MHz with 8 KiB of ROM, 1 KiB of work
//! RAM and 7 KiB of bitmap video RAM. Around the CPU sit three input ports,
//! a hardware shift register and the sound and watchdog latches. The
//! video hardware raises RST 1 mid-frame and RST 2 at vertical blank.
//!
//! [`Invaders::run_frame`] drives the board deterministically on the CPU
//! cycle counter. [`Host`] runs it on its own thread instead, with the
//! owner injecting the two interrupts on a wall-clock timer.

pub mod capture;
pub mod config;
mod error;
mod host;
mod input;
mod invaders;
#[cfg(feature = "window")]
pub mod keyboard_map;
mod ports;
pub mod video;

pub use config::{DipSwitches, HostConfig, InvadersConfig, load_rom};
pub use error::InvadersError;
pub use host::Host;
pub use input::InvadersKey;
pub use invaders::{CPU_HZ, CYCLES_PER_FRAME, FRAME_RATE, FramePhase, Invaders};
pub use ports::{InvadersIo, ShiftRegister};
