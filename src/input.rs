use std::collections::HashSet;

use winit::event::{ElementState, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

/// Everything the engine reacts to from the keyboard.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InputFlag {
    Forward,
    Back,
    Left,
    Right,
    LookUp,
    LookDown,
    ToggleBlend,
    CycleFilter,
}

impl InputFlag {
    /// Held flags act every frame; the rest fire once per physical press.
    pub fn is_held(self) -> bool {
        !matches!(self, InputFlag::ToggleBlend | InputFlag::CycleFilter)
    }
}

/// Default key bindings.
pub const BINDINGS: &[(KeyCode, InputFlag)] = &[
    (KeyCode::ArrowUp, InputFlag::Forward),
    (KeyCode::ArrowDown, InputFlag::Back),
    (KeyCode::ArrowLeft, InputFlag::Left),
    (KeyCode::ArrowRight, InputFlag::Right),
    (KeyCode::PageUp, InputFlag::LookUp),
    (KeyCode::PageDown, InputFlag::LookDown),
    (KeyCode::KeyB, InputFlag::ToggleBlend),
    (KeyCode::KeyF, InputFlag::CycleFilter),
];

/// Tracks keyboard state between frames.
#[derive(Default)]
pub struct Input {
    keys_down: HashSet<KeyCode>,
    keys_pressed: HashSet<KeyCode>,
}

impl Input {
    pub fn new() -> Self {
        Self::default()
    }

    /// Call at the end of each frame to reset per-frame state.
    pub fn end_frame(&mut self) {
        self.keys_pressed.clear();
    }

    /// Process a window event and update input state.
    pub fn handle_event(&mut self, event: &WindowEvent) {
        if let WindowEvent::KeyboardInput { event, .. } = event {
            if let PhysicalKey::Code(key) = event.physical_key {
                self.key(key, event.state, event.repeat);
            }
        }
    }

    /// Records a key transition. Auto-repeat never counts as a new press.
    pub fn key(&mut self, key: KeyCode, state: ElementState, repeat: bool) {
        match state {
            ElementState::Pressed => {
                if !repeat && !self.keys_down.contains(&key) {
                    self.keys_pressed.insert(key);
                }
                self.keys_down.insert(key);
            }
            ElementState::Released => {
                self.keys_down.remove(&key);
            }
        }
    }

    /// Returns true if the key is currently held down.
    pub fn key_down(&self, key: KeyCode) -> bool {
        self.keys_down.contains(&key)
    }

    /// Returns true if the key was pressed this frame.
    pub fn key_pressed(&self, key: KeyCode) -> bool {
        self.keys_pressed.contains(&key)
    }

    /// Flags active this frame under the default bindings.
    pub fn flags(&self) -> impl Iterator<Item = InputFlag> + '_ {
        BINDINGS.iter().filter_map(|&(key, flag)| {
            let active = if flag.is_held() {
                self.key_down(key)
            } else {
                self.key_pressed(key)
            };
            active.then_some(flag)
        })
    }
}
