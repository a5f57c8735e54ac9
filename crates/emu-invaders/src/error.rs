//! Error type for the arcade machine and its host.

use std::io;
use std::path::PathBuf;

use intel_8080::{CpuError, RomError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum InvadersError {
    #[error("failed to read ROM {}: {source}", .path.display())]
    RomRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Rom(#[from] RomError),
    #[error(transparent)]
    Cpu(#[from] CpuError),
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("PNG encoding failed: {0}")]
    Png(#[from] png::EncodingError),
    #[error("invalid ship count {0}, expected 3 to 6")]
    InvalidShips(u8),
    #[error("emulation thread panicked")]
    ThreadPanicked,
}
