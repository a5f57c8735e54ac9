//! Cabinet controls.

/// A switch on the control panel or inside the cabinet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InvadersKey {
    Coin,
    P1Start,
    P1Left,
    P1Right,
    P1Fire,
    P2Start,
    P2Left,
    P2Right,
    P2Fire,
    Tilt,
}

impl InvadersKey {
    pub const ALL: [Self; 10] = [
        Self::Coin,
        Self::P1Start,
        Self::P1Left,
        Self::P1Right,
        Self::P1Fire,
        Self::P2Start,
        Self::P2Left,
        Self::P2Right,
        Self::P2Fire,
        Self::Tilt,
    ];

    /// Input port and bit mask the switch drives. Active high.
    #[must_use]
    pub const fn port_bit(self) -> (u8, u8) {
        match self {
            Self::Coin => (1, 0x01),
            Self::P2Start => (1, 0x02),
            Self::P1Start => (1, 0x04),
            Self::P1Fire => (1, 0x10),
            Self::P1Left => (1, 0x20),
            Self::P1Right => (1, 0x40),
            Self::Tilt => (2, 0x04),
            Self::P2Fire => (2, 0x10),
            Self::P2Left => (2, 0x20),
            Self::P2Right => (2, 0x40),
        }
    }
}
