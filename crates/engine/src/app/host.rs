use thiserror::Error;

use super::input::ButtonStates;
use crate::content::PixelPoint;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SpriteHandle(pub u32);

/// Sprite creation request. `position` is the sprite's center in world pixels,
/// where (0,0) is the middle of the current map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpriteDesc {
    pub sheet: String,
    pub width: i32,
    pub height: i32,
    pub position: PixelPoint,
    pub z_order: i32,
    pub frame: u32,
    pub flip: bool,
    pub visible: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackgroundState {
    pub name: String,
    pub visible: bool,
    pub blending: bool,
}

impl BackgroundState {
    /// Backgrounds start hidden; a fade-in or the first frame shows them.
    pub fn hidden(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            visible: false,
            blending: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MusicRequest {
    pub name: String,
    /// 0.0 to 1.0.
    pub volume: f32,
    pub looping: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SoundRequest {
    pub name: String,
    pub volume: f32,
    pub speed: f32,
    /// -1.0 (left) to 1.0 (right).
    pub panning: f32,
    pub priority: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum HostError {
    #[error("host requested shutdown")]
    Shutdown,
    #[error("frame budget of {frames} frames exhausted")]
    FrameBudgetExhausted { frames: u64 },
}

/// Everything the runtime needs from the platform: the frame pump, input,
/// and the presentation and audio primitives.
///
/// `advance_frame` is the only suspension point. Returning an error from it
/// unwinds the whole cooperative loop.
pub trait Host {
    fn advance_frame(&mut self) -> Result<(), HostError>;
    /// Frames advanced since the host was created.
    fn frame_count(&self) -> u64;
    fn input(&self) -> ButtonStates;

    fn create_sprite(&mut self, desc: &SpriteDesc) -> SpriteHandle;
    fn destroy_sprite(&mut self, sprite: SpriteHandle);
    fn set_sprite_position(&mut self, sprite: SpriteHandle, position: PixelPoint);
    fn set_sprite_visible(&mut self, sprite: SpriteHandle, visible: bool);
    fn set_sprite_frame(&mut self, sprite: SpriteHandle, frame: u32);
    fn set_sprite_flip(&mut self, sprite: SpriteHandle, flip: bool);
    fn set_sprite_blending(&mut self, sprite: SpriteHandle, enabled: bool);

    fn set_camera_position(&mut self, position: PixelPoint);
    fn set_background(&mut self, background: &BackgroundState);
    fn set_blend_alpha(&mut self, alpha: f32);
    fn open_dialog(&mut self, text: &str);
    fn close_dialog(&mut self);

    fn play_music(&mut self, request: &MusicRequest);
    fn stop_music(&mut self);
    fn music_playing(&self) -> bool;
    fn music_volume(&self) -> f32;
    fn set_music_volume(&mut self, volume: f32);
    fn play_sound(&mut self, request: &SoundRequest);
}
