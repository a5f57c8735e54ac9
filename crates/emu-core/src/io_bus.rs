//! Port I/O interface.

/// The 256-port I/O space reached by IN and OUT.
///
/// The CPU knows nothing about the devices behind a port. Reads may have
/// side effects on the device (that is why they take `&mut self`).
pub trait IoBus {
    /// Read a byte from the given port.
    fn port_in(&mut self, port: u8) -> u8;

    /// Write a byte to the given port.
    fn port_out(&mut self, port: u8, value: u8);
}

/// Port bus with fixed input latches and a log of every write.
///
/// Useful for tests and for running programs that don't care about I/O.
#[derive(Debug, Clone)]
pub struct SimpleIo {
    inputs: [u8; 256],
    writes: Vec<(u8, u8)>,
}

impl SimpleIo {
    /// Create a bus where every port reads 0.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inputs: [0; 256],
            writes: Vec::new(),
        }
    }

    /// Set the value returned by reads of `port`.
    pub fn set_input(&mut self, port: u8, value: u8) {
        self.inputs[usize::from(port)] = value;
    }

    /// All `(port, value)` writes, oldest first.
    #[must_use]
    pub fn writes(&self) -> &[(u8, u8)] {
        &self.writes
    }

    /// The most recent value written to `port`, if any.
    #[must_use]
    pub fn last_write(&self, port: u8) -> Option<u8> {
        self.writes
            .iter()
            .rev()
            .find(|&&(p, _)| p == port)
            .map(|&(_, v)| v)
    }
}

impl Default for SimpleIo {
    fn default() -> Self {
        Self::new()
    }
}

impl IoBus for SimpleIo {
    fn port_in(&mut self, port: u8) -> u8 {
        self.inputs[usize::from(port)]
    }

    fn port_out(&mut self, port: u8, value: u8) {
        self.writes.push((port, value));
    }
}
