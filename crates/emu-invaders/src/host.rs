//! Two-thread host.
//!
//! The emulation thread runs the CPU in short slices, taking the machine
//! lock for one slice at a time. The display side (whoever owns the
//! [`Host`]) takes the lock between slices to raise the two video
//! interrupts and to copy the picture out. Either side stops the other by
//! clearing the shared keep-running flag.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use emu_core::StepOutcome;
use parking_lot::Mutex;
use tracing::{debug, error, info};

use crate::config::HostConfig;
use crate::invaders::{FramePhase, Invaders};
use crate::InvadersError;

/// Runs an [`Invaders`] board on its own thread.
pub struct Host {
    machine: Arc<Mutex<Invaders>>,
    keep_running: Arc<AtomicBool>,
    emulation: Option<JoinHandle<Result<(), InvadersError>>>,
    config: HostConfig,
    phase: FramePhase,
    /// Last completed picture, copied out at the end of each frame.
    display: Vec<u32>,
}

impl Host {
    /// Move the board onto a new emulation thread and start it.
    pub fn start(machine: Invaders, config: HostConfig) -> Result<Self, InvadersError> {
        let display = machine.framebuffer().to_vec();
        let machine = Arc::new(Mutex::new(machine));
        let keep_running = Arc::new(AtomicBool::new(true));

        let emulation = {
            let machine = Arc::clone(&machine);
            let keep_running = Arc::clone(&keep_running);
            thread::Builder::new()
                .name("emulation".into())
                .spawn(move || emulation_loop(&machine, &keep_running, config))?
        };
        info!(
            cpu_hz = config.cpu_hz,
            slice = config.slice_cycles,
            paced = config.paced,
            "emulation thread started"
        );

        Ok(Self {
            machine,
            keep_running,
            emulation: Some(emulation),
            config,
            phase: FramePhase::Mid,
            display,
        })
    }

    /// Shared handle to the board, e.g. for key presses.
    #[must_use]
    pub fn machine(&self) -> &Arc<Mutex<Invaders>> {
        &self.machine
    }

    /// The flag both threads poll. Clearing it stops the emulation thread.
    #[must_use]
    pub fn keep_running(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.keep_running)
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.keep_running.load(Ordering::Relaxed)
    }

    /// Wall-clock time between two calls to [`half_frame`](Self::half_frame).
    #[must_use]
    pub fn half_frame_interval(&self) -> Duration {
        let half_frames = u32::try_from(self.config.frame_rate.saturating_mul(2))
            .unwrap_or(u32::MAX)
            .max(1);
        Duration::from_secs(1) / half_frames
    }

    /// Display-side tick, to be called twice per frame.
    ///
    /// Alternates RST 1 and RST 2. After RST 2 the picture is decoded and
    /// copied to [`frame`](Self::frame); returns true when that happened.
    pub fn half_frame(&mut self) -> bool {
        let phase = self.phase;
        self.phase = phase.next();

        let mut machine = self.machine.lock();
        if !machine.interrupt(phase) {
            debug!(?phase, "interrupt not accepted");
        }
        if phase == FramePhase::End {
            machine.render();
            self.display.copy_from_slice(machine.framebuffer());
            return true;
        }
        false
    }

    /// The last completed picture (224x256 ARGB32).
    #[must_use]
    pub fn frame(&self) -> &[u32] {
        &self.display
    }

    /// Stop the emulation thread and wait for it.
    ///
    /// Returns the error that ended emulation, if any.
    pub fn stop(mut self) -> Result<(), InvadersError> {
        self.shutdown()
    }

    fn shutdown(&mut self) -> Result<(), InvadersError> {
        self.keep_running.store(false, Ordering::Relaxed);
        match self.emulation.take() {
            Some(handle) => handle.join().map_err(|_| InvadersError::ThreadPanicked)?,
            None => Ok(()),
        }
    }
}

impl Drop for Host {
    fn drop(&mut self) {
        if let Err(e) = self.shutdown() {
            error!("emulation ended with an error: {e}");
        }
    }
}

fn emulation_loop(
    machine: &Mutex<Invaders>,
    keep_running: &AtomicBool,
    config: HostConfig,
) -> Result<(), InvadersError> {
    let started = Instant::now();
    let first_cycle = machine.lock().cpu().total_cycles();

    while keep_running.load(Ordering::Relaxed) {
        let (outcome, cycles) = {
            let mut m = machine.lock();
            let outcome = m.run_cycles(config.slice_cycles);
            (outcome, m.cpu().total_cycles())
        };

        match outcome {
            Ok(StepOutcome::Continue) => {}
            Ok(StepOutcome::Halted) => {
                info!(cycles, "CPU halted");
                break;
            }
            Err(e) => {
                error!("{e}");
                error!("{}", machine.lock().cpu().snapshot());
                keep_running.store(false, Ordering::Relaxed);
                return Err(e.into());
            }
        }

        if config.paced {
            let due = cycles_to_duration(cycles - first_cycle, config.cpu_hz);
            if let Some(ahead) = due.checked_sub(started.elapsed()) {
                thread::sleep(ahead);
            }
        }
    }

    keep_running.store(false, Ordering::Relaxed);
    Ok(())
}

/// Wall-clock time `cycles` take at `hz`.
fn cycles_to_duration(cycles: u64, hz: u64) -> Duration {
    let nanos = u128::from(cycles) * 1_000_000_000 / u128::from(hz.max(1));
    Duration::from_nanos(u64::try_from(nanos).unwrap_or(u64::MAX))
}
