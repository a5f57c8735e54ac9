//! Video RAM decoding.
//!
//! The monitor is mounted rotated 90 degrees anticlockwise. VRAM holds 224
//! scan lines of 32 bytes, each line running bottom-to-top on the upright
//! picture with the least significant bit lowest. Output is the upright
//! 224x256 picture in ARGB32.

/// First byte of video RAM.
pub const VRAM_START: u16 = 0x2400;

/// 224 lines of 32 bytes.
pub const VRAM_LEN: usize = 0x1C00;

pub const SCREEN_WIDTH: u32 = 224;
pub const SCREEN_HEIGHT: u32 = 256;

pub const BLACK: u32 = 0xFF00_0000;
pub const WHITE: u32 = 0xFFFF_FFFF;
pub const RED: u32 = 0xFFFF_2020;
pub const GREEN: u32 = 0xFF20_FF20;

const BYTES_PER_LINE: usize = 32;

/// Colour of a lit pixel, with or without the cabinet's cellophane strips.
fn ink(x: usize, y: usize, overlay: bool) -> u32 {
    if !overlay {
        return WHITE;
    }
    match y {
        // Saucer row
        32..64 => RED,
        // Bases and shields
        184..240 => GREEN,
        // Reserve ships, left of the credit counter
        240.. if (16..134).contains(&x) => GREEN,
        _ => WHITE,
    }
}

/// Decode `vram` into `fb` (224x256, row-major).
pub fn render(vram: &[u8], fb: &mut [u32], overlay: bool) {
    let width = SCREEN_WIDTH as usize;
    let height = SCREEN_HEIGHT as usize;

    for (i, &byte) in vram.iter().take(VRAM_LEN).enumerate() {
        let x = i / BYTES_PER_LINE;
        let base = (i % BYTES_PER_LINE) * 8;
        for bit in 0..8 {
            let y = height - 1 - (base + bit);
            fb[y * width + x] = if byte & (1 << bit) != 0 {
                ink(x, y, overlay)
            } else {
                BLACK
            };
        }
    }
}
