//! Keyboard sampling for the frame loop

use crate::movement::InputFlags;
use macroquad::prelude::*;

/// One-shot commands detected on key press edges
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Commands {
    pub start: bool,
    pub restart: bool,
}

/// Turns raw key state into held movement flags and press-edge commands
pub struct InputManager {
    // Previous frame key states for edge detection
    prev_key_enter: bool,
    prev_key_r: bool,
}

impl InputManager {
    pub fn new() -> Self {
        Self {
            prev_key_enter: false,
            prev_key_r: false,
        }
    }

    /// Samples the keyboard. Movement flags are empty when `movement_enabled`
    /// is false so a finished match ignores the arrows entirely.
    pub fn update(&mut self, movement_enabled: bool) -> (InputFlags, Commands) {
        let key_enter = is_key_down(KeyCode::Enter) || is_key_down(KeyCode::Space);
        let key_r = is_key_down(KeyCode::R);

        let commands = Commands {
            start: key_enter && !self.prev_key_enter,
            restart: key_r && !self.prev_key_r,
        };

        self.prev_key_enter = key_enter;
        self.prev_key_r = key_r;

        if !movement_enabled {
            return (InputFlags::default(), commands);
        }

        // Support both WASD and arrow keys
        let flags = InputFlags {
            forward: is_key_down(KeyCode::Up) || is_key_down(KeyCode::W),
            backward: is_key_down(KeyCode::Down) || is_key_down(KeyCode::S),
            left: is_key_down(KeyCode::Left) || is_key_down(KeyCode::A),
            right: is_key_down(KeyCode::Right) || is_key_down(KeyCode::D),
        };

        (flags, commands)
    }
}

impl Default for InputManager {
    fn default() -> Self {
        Self::new()
    }
}
