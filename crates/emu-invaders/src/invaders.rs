//! Top-level arcade board: CPU, port devices and the video output.

use emu_core::{Cpu, StepOutcome};
use intel_8080::{CpuError, I8080};
use tracing::info;

use crate::InvadersError;
use crate::config::InvadersConfig;
use crate::input::InvadersKey;
use crate::ports::InvadersIo;
use crate::video::{self, SCREEN_HEIGHT, SCREEN_WIDTH, VRAM_LEN, VRAM_START};

/// CPU clock: 19.968 MHz crystal divided by ten, rounded.
pub const CPU_HZ: u64 = 2_000_000;

pub const FRAME_RATE: u64 = 60;

/// Nominal CPU states per video frame.
pub const CYCLES_PER_FRAME: u64 = CPU_HZ / FRAME_RATE;

/// The two interrupt points of a video frame.
///
/// The video hardware raises RST 1 when the beam reaches the middle of the
/// screen and RST 2 at the start of vertical blank. The game redraws the
/// half of the screen the beam is not on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FramePhase {
    Mid,
    End,
}

impl FramePhase {
    /// RST opcode the board puts on the bus.
    #[must_use]
    pub const fn vector(self) -> u8 {
        match self {
            Self::Mid => 0xCF,
            Self::End => 0xD7,
        }
    }

    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::Mid => Self::End,
            Self::End => Self::Mid,
        }
    }
}

/// Space Invaders arcade board.
pub struct Invaders {
    cpu: I8080,
    io: InvadersIo,
    framebuffer: Vec<u32>,
    overlay: bool,
    frame_count: u64,
    /// Cycle count at which the next frame begins.
    next_frame: u64,
}

impl Invaders {
    pub fn new(config: &InvadersConfig) -> Result<Self, InvadersError> {
        let cpu = I8080::new(&config.rom)?;
        info!(
            rom_bytes = config.rom.len(),
            ships = config.dips.ships,
            "board powered on"
        );
        Ok(Self {
            cpu,
            io: InvadersIo::new(config.dips),
            framebuffer: vec![video::BLACK; (SCREEN_WIDTH * SCREEN_HEIGHT) as usize],
            overlay: config.overlay,
            frame_count: 0,
            next_frame: 0,
        })
    }

    /// Run at least `cycles` nominal CPU states.
    pub fn run_cycles(&mut self, cycles: u64) -> Result<StepOutcome, CpuError> {
        self.cpu.run_for(&mut self.io, cycles)
    }

    /// Run until the CPU's cycle counter reaches `target`.
    fn run_until(&mut self, target: u64) -> Result<StepOutcome, CpuError> {
        let remaining = target.saturating_sub(self.cpu.total_cycles());
        self.run_cycles(remaining)
    }

    /// Raise the interrupt for `phase`. Returns false if the game has
    /// interrupts disabled.
    pub fn interrupt(&mut self, phase: FramePhase) -> bool {
        self.cpu.request_interrupt(phase.vector())
    }

    /// Run one frame: half a frame, RST 1, half a frame, RST 2, then decode
    /// video RAM.
    ///
    /// Frame boundaries are fixed to the cycle counter, so instruction
    /// overshoot does not accumulate.
    pub fn run_frame(&mut self) -> Result<StepOutcome, CpuError> {
        let total = self.cpu.total_cycles();
        // Resync if the CPU was run outside run_frame() since the last frame
        let start = if total.abs_diff(self.next_frame) > CYCLES_PER_FRAME / 2 {
            total
        } else {
            self.next_frame
        };
        self.next_frame = start + CYCLES_PER_FRAME;

        if self.run_until(start + CYCLES_PER_FRAME / 2)? == StepOutcome::Halted {
            return Ok(StepOutcome::Halted);
        }
        self.interrupt(FramePhase::Mid);

        if self.run_until(self.next_frame)? == StepOutcome::Halted {
            return Ok(StepOutcome::Halted);
        }
        self.interrupt(FramePhase::End);

        self.render();
        self.frame_count += 1;
        Ok(StepOutcome::Continue)
    }

    /// Decode video RAM into the framebuffer.
    pub fn render(&mut self) {
        let vram = self.cpu.memory().window(VRAM_START, VRAM_LEN);
        video::render(vram, &mut self.framebuffer, self.overlay);
    }

    pub fn press_key(&mut self, key: InvadersKey) {
        self.io.set_key(key, true);
    }

    pub fn release_key(&mut self, key: InvadersKey) {
        self.io.set_key(key, false);
    }

    /// Upright 224x256 ARGB32 picture as of the last `render()`.
    #[must_use]
    pub fn framebuffer(&self) -> &[u32] {
        &self.framebuffer
    }

    #[must_use]
    pub const fn framebuffer_width(&self) -> u32 {
        SCREEN_WIDTH
    }

    #[must_use]
    pub const fn framebuffer_height(&self) -> u32 {
        SCREEN_HEIGHT
    }

    /// Raw video RAM, 0x2400-0x3FFF.
    #[must_use]
    pub fn vram(&self) -> &[u8] {
        self.cpu.memory().window(VRAM_START, VRAM_LEN)
    }

    #[must_use]
    pub const fn frame_count(&self) -> u64 {
        self.frame_count
    }

    #[must_use]
    pub fn is_halted(&self) -> bool {
        self.cpu.is_halted()
    }

    #[must_use]
    pub fn cpu(&self) -> &I8080 {
        &self.cpu
    }

    pub fn cpu_mut(&mut self) -> &mut I8080 {
        &mut self.cpu
    }

    #[must_use]
    pub fn io(&self) -> &InvadersIo {
        &self.io
    }
}
