//! Keyboard state polling.
//!
//! winit only reports key transitions, so [`KeyState`] folds them into the set
//! of currently held keys which the frame loop samples once per frame.

use std::collections::HashSet;

use winit::{
    event::{ElementState, KeyEvent, WindowEvent},
    keyboard::{KeyCode, PhysicalKey},
};

#[derive(Debug, Default, Clone)]
pub struct KeyState {
    held: HashSet<KeyCode>,
}

impl KeyState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track key presses and releases. Returns `true` if the event was a
    /// keyboard event.
    pub fn handle_window_event(&mut self, event: &WindowEvent) -> bool {
        match event {
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state,
                        ..
                    },
                ..
            } => {
                match state {
                    ElementState::Pressed => self.press(*code),
                    ElementState::Released => self.release(*code),
                }
                true
            }
            // Releases that happen while unfocused are never delivered.
            WindowEvent::Focused(false) => {
                self.clear();
                false
            }
            _ => false,
        }
    }

    pub fn press(&mut self, code: KeyCode) {
        self.held.insert(code);
    }

    pub fn release(&mut self, code: KeyCode) {
        self.held.remove(&code);
    }

    pub fn clear(&mut self) {
        self.held.clear();
    }

    pub fn is_held(&self, code: KeyCode) -> bool {
        self.held.contains(&code)
    }

    /// `1.0` if only `positive` is held, `-1.0` if only `negative` is held,
    /// `0.0` otherwise.
    pub fn axis(&self, positive: KeyCode, negative: KeyCode) -> f32 {
        let mut value = 0.0;
        if self.is_held(positive) {
            value += 1.0;
        }
        if self.is_held(negative) {
            value -= 1.0;
        }
        value
    }
}
