//! Host keyboard to cabinet switch mapping for the windowed binary.

use winit::keyboard::KeyCode;

use crate::input::InvadersKey;

/// Map a host key to a cabinet switch. Returns `None` for unmapped keys.
#[must_use]
pub fn map_keycode(key: KeyCode) -> Option<InvadersKey> {
    match key {
        KeyCode::KeyC => Some(InvadersKey::Coin),
        KeyCode::Digit1 => Some(InvadersKey::P1Start),
        KeyCode::Digit2 => Some(InvadersKey::P2Start),
        KeyCode::ArrowLeft => Some(InvadersKey::P1Left),
        KeyCode::ArrowRight => Some(InvadersKey::P1Right),
        KeyCode::Space => Some(InvadersKey::P1Fire),
        KeyCode::KeyA => Some(InvadersKey::P2Left),
        KeyCode::KeyD => Some(InvadersKey::P2Right),
        KeyCode::KeyW => Some(InvadersKey::P2Fire),
        KeyCode::KeyT => Some(InvadersKey::Tilt),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_switch_has_a_key() {
        let keys = [
            KeyCode::KeyC,
            KeyCode::Digit1,
            KeyCode::Digit2,
            KeyCode::ArrowLeft,
            KeyCode::ArrowRight,
            KeyCode::Space,
            KeyCode::KeyA,
            KeyCode::KeyD,
            KeyCode::KeyW,
            KeyCode::KeyT,
        ];
        let mapped: Vec<_> = keys.iter().filter_map(|&k| map_keycode(k)).collect();
        for switch in InvadersKey::ALL {
            assert!(mapped.contains(&switch), "{switch:?} unmapped");
        }
    }

    #[test]
    fn start_keys_are_distinct() {
        assert_eq!(map_keycode(KeyCode::Digit1), Some(InvadersKey::P1Start));
        assert_eq!(map_keycode(KeyCode::Digit2), Some(InvadersKey::P2Start));
        assert_eq!(map_keycode(KeyCode::Digit0), None);
    }

    #[test]
    fn unmapped_keys() {
        assert_eq!(map_keycode(KeyCode::Escape), None);
        assert_eq!(map_keycode(KeyCode::KeyQ), None);
    }
}
