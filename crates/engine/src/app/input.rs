use serde::{Deserialize, Serialize};
use winit::event::{ElementState, KeyEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Button {
    Up,
    Down,
    Left,
    Right,
    #[serde(alias = "a")]
    Activate,
    #[serde(alias = "b")]
    Cancel,
    Start,
    Select,
    L,
    R,
}

pub const BUTTON_COUNT: usize = 10;

impl Button {
    pub const ALL: [Button; BUTTON_COUNT] = [
        Button::Up,
        Button::Down,
        Button::Left,
        Button::Right,
        Button::Activate,
        Button::Cancel,
        Button::Start,
        Button::Select,
        Button::L,
        Button::R,
    ];

    const fn index(self) -> usize {
        match self {
            Button::Up => 0,
            Button::Down => 1,
            Button::Left => 2,
            Button::Right => 3,
            Button::Activate => 4,
            Button::Cancel => 5,
            Button::Start => 6,
            Button::Select => 7,
            Button::L => 8,
            Button::R => 9,
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        match token.trim().to_ascii_lowercase().as_str() {
            "up" => Some(Button::Up),
            "down" => Some(Button::Down),
            "left" => Some(Button::Left),
            "right" => Some(Button::Right),
            "activate" | "a" => Some(Button::Activate),
            "cancel" | "b" => Some(Button::Cancel),
            "start" => Some(Button::Start),
            "select" => Some(Button::Select),
            "l" => Some(Button::L),
            "r" => Some(Button::R),
            _ => None,
        }
    }
}

/// Button state for one frame. `held` is level-triggered; `pressed` is true
/// only on the frame a button went down.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ButtonStates {
    down: [bool; BUTTON_COUNT],
    pressed: [bool; BUTTON_COUNT],
}

impl ButtonStates {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Next frame's state given the buttons now down, deriving press edges
    /// against `self`.
    pub fn advance(&self, down: &[Button]) -> Self {
        let mut next = Self::default();
        for button in down {
            next.down[button.index()] = true;
        }
        for index in 0..BUTTON_COUNT {
            next.pressed[index] = next.down[index] && !self.down[index];
        }
        next
    }

    pub fn with_down(mut self, button: Button, is_down: bool) -> Self {
        self.down[button.index()] = is_down;
        self
    }

    pub fn with_pressed(mut self, button: Button, pressed: bool) -> Self {
        self.pressed[button.index()] = pressed;
        self
    }

    pub fn held(&self, button: Button) -> bool {
        self.down[button.index()]
    }

    pub fn pressed(&self, button: Button) -> bool {
        self.pressed[button.index()]
    }

    pub fn any_pressed(&self, buttons: &[Button]) -> bool {
        buttons.iter().any(|button| self.pressed(*button))
    }
}

/// Collects keyboard transitions between frames for a windowed host.
#[derive(Debug, Default)]
pub struct KeyboardCollector {
    down: [bool; BUTTON_COUNT],
    pressed_edge: [bool; BUTTON_COUNT],
}

impl KeyboardCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle_key_event(&mut self, key_event: &KeyEvent) {
        self.handle_key(key_event.physical_key, key_event.state);
    }

    pub fn handle_key(&mut self, key: PhysicalKey, state: ElementState) {
        let Some(button) = button_for_key(key) else {
            return;
        };
        let index = button.index();
        match state {
            ElementState::Pressed => {
                if !self.down[index] {
                    self.pressed_edge[index] = true;
                }
                self.down[index] = true;
            }
            ElementState::Released => self.down[index] = false,
        }
    }

    pub fn snapshot_for_frame(&mut self) -> ButtonStates {
        let snapshot = ButtonStates {
            down: self.down,
            pressed: self.pressed_edge,
        };
        self.pressed_edge = [false; BUTTON_COUNT];
        snapshot
    }
}

pub fn button_for_key(key: PhysicalKey) -> Option<Button> {
    let PhysicalKey::Code(code) = key else {
        return None;
    };
    match code {
        KeyCode::KeyW | KeyCode::ArrowUp => Some(Button::Up),
        KeyCode::KeyS | KeyCode::ArrowDown => Some(Button::Down),
        KeyCode::KeyA | KeyCode::ArrowLeft => Some(Button::Left),
        KeyCode::KeyD | KeyCode::ArrowRight => Some(Button::Right),
        KeyCode::KeyZ | KeyCode::Space => Some(Button::Activate),
        KeyCode::KeyX | KeyCode::Backspace => Some(Button::Cancel),
        KeyCode::Enter => Some(Button::Start),
        KeyCode::Tab => Some(Button::Select),
        KeyCode::KeyQ => Some(Button::L),
        KeyCode::KeyE => Some(Button::R),
        _ => None,
    }
}
