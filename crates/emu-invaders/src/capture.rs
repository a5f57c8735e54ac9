//! Headless capture: PNG screenshots and frame dumps.

use std::fs;
use std::io::BufWriter;
use std::path::Path;

use emu_core::StepOutcome;
use tracing::info;

use crate::video::{SCREEN_HEIGHT, SCREEN_WIDTH};
use crate::{Invaders, InvadersError};

/// Save a 224x256 ARGB32 picture as a PNG file.
///
/// # Errors
///
/// Returns an error if the file cannot be created or written.
pub fn save_screenshot(framebuffer: &[u32], path: &Path) -> Result<(), InvadersError> {
    let file = fs::File::create(path)?;
    let mut encoder = png::Encoder::new(BufWriter::new(file), SCREEN_WIDTH, SCREEN_HEIGHT);
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder.write_header()?;

    // ARGB32 -> RGBA bytes
    let mut rgba = Vec::with_capacity(framebuffer.len() * 4);
    for &pixel in framebuffer {
        let [_, r, g, b] = pixel.to_be_bytes();
        rgba.extend_from_slice(&[r, g, b, 0xFF]);
    }

    writer.write_image_data(&rgba)?;
    Ok(())
}

/// Run `frames` frames, saving each one as `dir/frames/NNNNNN.png`.
///
/// Stops early if the CPU halts.
pub fn record(invaders: &mut Invaders, dir: &Path, frames: u32) -> Result<(), InvadersError> {
    let frames_dir = dir.join("frames");
    fs::create_dir_all(&frames_dir)?;

    let mut saved = 0;
    for i in 1..=frames {
        if invaders.run_frame()? == StepOutcome::Halted {
            break;
        }
        save_screenshot(invaders.framebuffer(), &frames_dir.join(format!("{i:06}.png")))?;
        saved = i;
    }

    info!(frames = saved, dir = %frames_dir.display(), "recording finished");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DipSwitches, InvadersConfig};
    use crate::video::WHITE;

    fn temp_dir(name: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("emu-invaders-{name}-{}", std::process::id()));
        fs::create_dir_all(&dir).expect("temp dir");
        dir
    }

    #[test]
    fn screenshot_is_a_png_of_the_screen() {
        let dir = temp_dir("shot");
        let path = dir.join("shot.png");
        let mut fb = vec![crate::video::BLACK; (SCREEN_WIDTH * SCREEN_HEIGHT) as usize];
        fb[0] = WHITE;

        save_screenshot(&fb, &path).expect("png written");

        let bytes = fs::read(&path).expect("png exists");
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
        // IHDR: width and height, big-endian
        assert_eq!(&bytes[16..20], &SCREEN_WIDTH.to_be_bytes());
        assert_eq!(&bytes[20..24], &SCREEN_HEIGHT.to_be_bytes());

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn record_stops_at_halt() {
        let dir = temp_dir("record");
        let mut inv = Invaders::new(&InvadersConfig {
            rom: vec![0x76],
            dips: DipSwitches::default(),
            overlay: false,
        })
        .expect("valid rom");

        record(&mut inv, &dir, 5).expect("recording runs");
        let saved = fs::read_dir(dir.join("frames")).expect("frames dir").count();
        assert_eq!(saved, 0);

        fs::remove_dir_all(&dir).ok();
    }
}
