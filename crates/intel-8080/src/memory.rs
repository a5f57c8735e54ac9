//! Flat 64 KiB address space.

use crate::registers::{compose, split};

/// Size of the 8080 address space.
pub const MEMORY_SIZE: usize = 0x1_0000;

/// 65,536 bytes of RAM. Every `u16` address is valid.
///
/// There is no ROM protection: the arcade board decodes ROM and RAM in
/// hardware, and the programs it runs never write below 0x2000.
#[derive(Clone)]
pub struct Memory {
    bytes: Box<[u8]>,
}

impl Memory {
    /// Zero-filled memory.
    #[must_use]
    pub fn new() -> Self {
        Self {
            bytes: vec![0; MEMORY_SIZE].into_boxed_slice(),
        }
    }

    #[must_use]
    pub fn read(&self, addr: u16) -> u8 {
        self.bytes[usize::from(addr)]
    }

    pub fn write(&mut self, addr: u16, value: u8) {
        self.bytes[usize::from(addr)] = value;
    }

    /// Read a little-endian word. `addr + 1` wraps to 0x0000.
    #[must_use]
    pub fn read_word(&self, addr: u16) -> u16 {
        compose(self.read(addr.wrapping_add(1)), self.read(addr))
    }

    /// Write a little-endian word. `addr + 1` wraps to 0x0000.
    pub fn write_word(&mut self, addr: u16, value: u16) {
        let (high, low) = split(value);
        self.write(addr, low);
        self.write(addr.wrapping_add(1), high);
    }

    /// Copy `data` in starting at `addr`, wrapping at the top of memory.
    pub fn load(&mut self, addr: u16, data: &[u8]) {
        let mut a = addr;
        for &byte in data {
            self.write(a, byte);
            a = a.wrapping_add(1);
        }
    }

    /// Read-only view of `len` bytes from `start`, clipped at 0xFFFF.
    #[must_use]
    pub fn window(&self, start: u16, len: usize) -> &[u8] {
        let start = usize::from(start);
        let end = start.saturating_add(len).min(MEMORY_SIZE);
        &self.bytes[start..end]
    }

    /// The whole address space.
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Memory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Memory").field("size", &self.bytes.len()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn words_are_little_endian() {
        let mut mem = Memory::new();
        mem.write_word(0x2000, 0xBEEF);
        assert_eq!(mem.read(0x2000), 0xEF);
        assert_eq!(mem.read(0x2001), 0xBE);
        assert_eq!(mem.read_word(0x2000), 0xBEEF);
    }

    #[test]
    fn word_access_wraps() {
        let mut mem = Memory::new();
        mem.write_word(0xFFFF, 0x1234);
        assert_eq!(mem.read(0xFFFF), 0x34);
        assert_eq!(mem.read(0x0000), 0x12);
        assert_eq!(mem.read_word(0xFFFF), 0x1234);
    }

    #[test]
    fn load_wraps() {
        let mut mem = Memory::new();
        mem.load(0xFFFE, &[1, 2, 3]);
        assert_eq!(mem.read(0xFFFE), 1);
        assert_eq!(mem.read(0xFFFF), 2);
        assert_eq!(mem.read(0x0000), 3);
    }

    #[test]
    fn window_is_clipped() {
        let mut mem = Memory::new();
        mem.load(0x2400, &[0xAA; 4]);
        assert_eq!(mem.window(0x2400, 0x1C00).len(), 0x1C00);
        assert_eq!(mem.window(0x2400, 4), &[0xAA; 4]);
        assert_eq!(mem.window(0xFFF0, 0x100).len(), 0x10);
    }
}
