use serde::{Deserialize, Serialize};

use super::value::{Expression, Value};
use crate::app::Button;

pub const MAX_BUTTONS_PER_EVENT: usize = 10;
pub const START_SENTINEL: i32 = -1;

/// Handle to an event list stored in the scene graph arena. Index 0 is always
/// the empty list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventListId(pub u32);

impl EventListId {
    pub const EMPTY: EventListId = EventListId(0);

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Left,
    Right,
    Up,
    #[default]
    Down,
}

impl Direction {
    pub fn opposite(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
            Self::Up => Self::Down,
            Self::Down => Self::Up,
        }
    }

    /// Unit tile offset, with y growing downward.
    pub fn offset(self) -> (i32, i32) {
        match self {
            Self::Left => (-1, 0),
            Self::Right => (1, 0),
            Self::Up => (0, -1),
            Self::Down => (0, 1),
        }
    }

    pub fn button(self) -> Button {
        match self {
            Self::Left => Button::Left,
            Self::Right => Button::Right,
            Self::Up => Button::Up,
            Self::Down => Button::Down,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DirectionPriority {
    #[default]
    Horizontal,
    Vertical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompareOp {
    #[serde(rename = "==", alias = "eq")]
    Eq,
    #[serde(rename = "!=", alias = "neq")]
    Neq,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    pub op: CompareOp,
    pub left: Expression,
    pub right: Expression,
}

impl Condition {
    pub fn eq(left: Expression, right: Expression) -> Self {
        Self {
            op: CompareOp::Eq,
            left,
            right,
        }
    }

    pub fn neq(left: Expression, right: Expression) -> Self {
        Self {
            op: CompareOp::Neq,
            left,
            right,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartPosition {
    #[serde(default = "sentinel")]
    pub x: Expression,
    #[serde(default = "sentinel")]
    pub y: Expression,
    #[serde(default)]
    pub direction: Direction,
}

impl Default for StartPosition {
    fn default() -> Self {
        Self {
            x: sentinel(),
            y: sentinel(),
            direction: Direction::Down,
        }
    }
}

/// One node of the compiled behavior tree. Nested bodies are arena handles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Event {
    Wait {
        #[serde(default = "default_wait_ms")]
        duration: Expression,
    },
    FadeIn {
        #[serde(default = "default_fade_ms")]
        duration: Expression,
    },
    FadeOut {
        #[serde(default = "default_fade_ms")]
        duration: Expression,
    },
    GoToScene {
        target: String,
        #[serde(default)]
        start: StartPosition,
    },
    WaitForButton {
        #[serde(default)]
        buttons: Vec<Button>,
    },
    OnButtonPress {
        #[serde(default)]
        buttons: Vec<Button>,
        #[serde(default)]
        events: EventListId,
    },
    ShowDialog {
        text: String,
    },
    SetVariable {
        name: String,
        value: Value,
    },
    If {
        #[serde(default)]
        conditions: Vec<Condition>,
        #[serde(default)]
        then: EventListId,
        #[serde(default, rename = "else")]
        otherwise: EventListId,
    },
    DisableActor {
        actor: String,
    },
    EnableActor {
        actor: String,
    },
    PlayMusic {
        name: String,
        #[serde(default = "full_volume")]
        volume: i32,
        #[serde(default = "yes", rename = "loop")]
        looping: bool,
    },
    StopMusic,
    PlaySound {
        name: String,
        #[serde(default = "full_volume")]
        volume: i32,
        #[serde(default = "unit_speed")]
        speed: f32,
        #[serde(default)]
        panning: i32,
        #[serde(default = "default_sound_priority")]
        priority: i32,
    },
    ExecuteScript {
        #[serde(alias = "script")]
        name: String,
    },
    MoveCameraTo {
        #[serde(default)]
        x: Expression,
        #[serde(default)]
        y: Expression,
        #[serde(default = "default_camera_ms")]
        duration: Expression,
        #[serde(default = "yes")]
        allow_diagonal: bool,
        #[serde(default)]
        direction_priority: DirectionPriority,
    },
    /// Emitted by the compiler for events switched off in the editor.
    Disabled {
        kind: String,
    },
    #[serde(other)]
    Unknown,
}

impl Event {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Wait { .. } => "wait",
            Self::FadeIn { .. } => "fade-in",
            Self::FadeOut { .. } => "fade-out",
            Self::GoToScene { .. } => "go-to-scene",
            Self::WaitForButton { .. } => "wait-for-button",
            Self::OnButtonPress { .. } => "on-button-press",
            Self::ShowDialog { .. } => "show-dialog",
            Self::SetVariable { .. } => "set-variable",
            Self::If { .. } => "if",
            Self::DisableActor { .. } => "disable-actor",
            Self::EnableActor { .. } => "enable-actor",
            Self::PlayMusic { .. } => "play-music",
            Self::StopMusic => "stop-music",
            Self::PlaySound { .. } => "play-sound",
            Self::ExecuteScript { .. } => "execute-script",
            Self::MoveCameraTo { .. } => "move-camera-to",
            Self::Disabled { .. } => "disabled",
            Self::Unknown => "unknown",
        }
    }

    /// Nested bodies referenced by this node.
    pub fn child_lists(&self) -> Vec<EventListId> {
        match self {
            Self::OnButtonPress { events, .. } => vec![*events],
            Self::If {
                then, otherwise, ..
            } => vec![*then, *otherwise],
            _ => Vec::new(),
        }
    }

    pub(crate) fn buttons(&self) -> Option<&[Button]> {
        match self {
            Self::WaitForButton { buttons } | Self::OnButtonPress { buttons, .. } => {
                Some(buttons)
            }
            _ => None,
        }
    }
}

fn sentinel() -> Expression {
    Expression::literal(START_SENTINEL)
}

fn default_wait_ms() -> Expression {
    Expression::literal(500)
}

fn default_fade_ms() -> Expression {
    Expression::literal(200)
}

fn default_camera_ms() -> Expression {
    Expression::literal(200)
}

fn full_volume() -> i32 {
    100
}

fn unit_speed() -> f32 {
    1.0
}

fn default_sound_priority() -> i32 {
    32767
}

fn yes() -> bool {
    true
}
