mod actor;
mod camera;
mod config;
mod director;
mod executor;
mod fade;
mod headless;
mod host;
mod input;
mod player;
mod stage;
mod variables;

pub use actor::{facing_frame, Actor, Prop};
pub use camera::{follow_target, pan_to, CameraMove, ScrollBounds};
pub use config::RuntimeConfig;
pub use director::{Director, RunSummary};
pub use executor::{Context, RuntimeError};
pub use headless::{FrameRecord, HeadlessHost, PlayingMusic, ScriptedInput, SpriteRecord};
pub use host::{
    BackgroundState, Host, HostError, MusicRequest, SoundRequest, SpriteDesc, SpriteHandle,
};
pub use input::{button_for_key, Button, ButtonStates, KeyboardCollector, BUTTON_COUNT};
pub use player::{Player, WalkAnimation};
pub use stage::{SceneRequest, Stage};
pub use variables::{VariableError, VariableRegistry};
