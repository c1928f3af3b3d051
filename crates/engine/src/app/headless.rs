use std::collections::BTreeMap;

use tracing::debug;

use super::host::{
    BackgroundState, Host, HostError, MusicRequest, SoundRequest, SpriteDesc, SpriteHandle,
};
use super::input::{Button, ButtonStates};
use crate::content::PixelPoint;

/// Per-frame list of held buttons. Frames past the end of the script have
/// nothing held.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScriptedInput {
    frames: Vec<Vec<Button>>,
}

impl ScriptedInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn idle(mut self, frames: usize) -> Self {
        self.frames.extend((0..frames).map(|_| Vec::new()));
        self
    }

    pub fn hold(self, button: Button, frames: usize) -> Self {
        self.hold_all(&[button], frames)
    }

    pub fn hold_all(mut self, buttons: &[Button], frames: usize) -> Self {
        self.frames.extend((0..frames).map(|_| buttons.to_vec()));
        self
    }

    /// Held for one frame, then released for one frame so the next tap is a
    /// fresh press.
    pub fn tap(self, button: Button) -> Self {
        self.hold(button, 1).idle(1)
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn held_at(&self, frame: u64) -> &[Button] {
        usize::try_from(frame)
            .ok()
            .and_then(|index| self.frames.get(index))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpriteRecord {
    pub desc: SpriteDesc,
    pub blending: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlayingMusic {
    pub name: String,
    pub volume: f32,
    pub looping: bool,
}

/// Presentation state captured at each `advance_frame`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameRecord {
    pub camera: PixelPoint,
    pub blend_alpha: f32,
    pub dialog_open: bool,
}

/// In-memory host that replays scripted input and records every presentation
/// and audio call.
#[derive(Debug, Default)]
pub struct HeadlessHost {
    input: ScriptedInput,
    states: ButtonStates,
    frame: u64,
    max_frames: Option<u64>,
    shutdown_on_input_end: bool,
    next_sprite: u32,
    sprites: BTreeMap<SpriteHandle, SpriteRecord>,
    camera: PixelPoint,
    blend_alpha: f32,
    background: Option<BackgroundState>,
    dialog: Option<String>,
    dialogs: Vec<String>,
    music: Option<PlayingMusic>,
    music_started: Vec<String>,
    sounds: Vec<SoundRequest>,
    frames: Vec<FrameRecord>,
}

impl HeadlessHost {
    pub fn new(input: ScriptedInput) -> Self {
        let states = ButtonStates::empty().advance(input.held_at(0));
        Self {
            input,
            states,
            ..Self::default()
        }
    }

    pub fn with_frame_budget(mut self, max_frames: u64) -> Self {
        self.max_frames = Some(max_frames);
        self
    }

    /// Stop with [`HostError::Shutdown`] once every scripted frame was played.
    pub fn with_shutdown_on_input_end(mut self) -> Self {
        self.shutdown_on_input_end = true;
        self
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn frames(&self) -> &[FrameRecord] {
        &self.frames
    }

    pub fn sprite(&self, sprite: SpriteHandle) -> Option<&SpriteRecord> {
        self.sprites.get(&sprite)
    }

    pub fn live_sprites(&self) -> impl Iterator<Item = (&SpriteHandle, &SpriteRecord)> {
        self.sprites.iter()
    }

    pub fn sprites_with_sheet<'a>(
        &'a self,
        sheet: &'a str,
    ) -> impl Iterator<Item = &'a SpriteRecord> + 'a {
        self.sprites
            .values()
            .filter(move |record| record.desc.sheet == sheet)
    }

    pub fn camera(&self) -> PixelPoint {
        self.camera
    }

    pub fn blend_alpha(&self) -> f32 {
        self.blend_alpha
    }

    pub fn background(&self) -> Option<&BackgroundState> {
        self.background.as_ref()
    }

    pub fn dialog_open(&self) -> Option<&str> {
        self.dialog.as_deref()
    }

    pub fn dialogs(&self) -> &[String] {
        &self.dialogs
    }

    pub fn music(&self) -> Option<&PlayingMusic> {
        self.music.as_ref()
    }

    pub fn music_started(&self) -> &[String] {
        &self.music_started
    }

    pub fn sounds(&self) -> &[SoundRequest] {
        &self.sounds
    }

    fn sprite_mut(&mut self, sprite: SpriteHandle) -> Option<&mut SpriteRecord> {
        let record = self.sprites.get_mut(&sprite);
        if record.is_none() {
            debug!(sprite = sprite.0, "headless_sprite_missing");
        }
        record
    }
}

impl Host for HeadlessHost {
    fn advance_frame(&mut self) -> Result<(), HostError> {
        if let Some(max_frames) = self.max_frames {
            if self.frame >= max_frames {
                return Err(HostError::FrameBudgetExhausted { frames: max_frames });
            }
        }
        if self.shutdown_on_input_end && self.frame >= self.input.len() as u64 {
            return Err(HostError::Shutdown);
        }

        self.frames.push(FrameRecord {
            camera: self.camera,
            blend_alpha: self.blend_alpha,
            dialog_open: self.dialog.is_some(),
        });
        self.frame += 1;
        self.states = self.states.advance(self.input.held_at(self.frame));
        Ok(())
    }

    fn frame_count(&self) -> u64 {
        self.frame
    }

    fn input(&self) -> ButtonStates {
        self.states
    }

    fn create_sprite(&mut self, desc: &SpriteDesc) -> SpriteHandle {
        let handle = SpriteHandle(self.next_sprite);
        self.next_sprite += 1;
        self.sprites.insert(
            handle,
            SpriteRecord {
                desc: desc.clone(),
                blending: false,
            },
        );
        handle
    }

    fn destroy_sprite(&mut self, sprite: SpriteHandle) {
        self.sprites.remove(&sprite);
    }

    fn set_sprite_position(&mut self, sprite: SpriteHandle, position: PixelPoint) {
        if let Some(record) = self.sprite_mut(sprite) {
            record.desc.position = position;
        }
    }

    fn set_sprite_visible(&mut self, sprite: SpriteHandle, visible: bool) {
        if let Some(record) = self.sprite_mut(sprite) {
            record.desc.visible = visible;
        }
    }

    fn set_sprite_frame(&mut self, sprite: SpriteHandle, frame: u32) {
        if let Some(record) = self.sprite_mut(sprite) {
            record.desc.frame = frame;
        }
    }

    fn set_sprite_flip(&mut self, sprite: SpriteHandle, flip: bool) {
        if let Some(record) = self.sprite_mut(sprite) {
            record.desc.flip = flip;
        }
    }

    fn set_sprite_blending(&mut self, sprite: SpriteHandle, enabled: bool) {
        if let Some(record) = self.sprite_mut(sprite) {
            record.blending = enabled;
        }
    }

    fn set_camera_position(&mut self, position: PixelPoint) {
        self.camera = position;
    }

    fn set_background(&mut self, background: &BackgroundState) {
        self.background = Some(background.clone());
    }

    fn set_blend_alpha(&mut self, alpha: f32) {
        self.blend_alpha = alpha;
    }

    fn open_dialog(&mut self, text: &str) {
        self.dialog = Some(text.to_string());
        self.dialogs.push(text.to_string());
    }

    fn close_dialog(&mut self) {
        self.dialog = None;
    }

    fn play_music(&mut self, request: &MusicRequest) {
        self.music = Some(PlayingMusic {
            name: request.name.clone(),
            volume: request.volume,
            looping: request.looping,
        });
        self.music_started.push(request.name.clone());
    }

    fn stop_music(&mut self) {
        self.music = None;
    }

    fn music_playing(&self) -> bool {
        self.music.is_some()
    }

    fn music_volume(&self) -> f32 {
        self.music.as_ref().map_or(0.0, |music| music.volume)
    }

    fn set_music_volume(&mut self, volume: f32) {
        if let Some(music) = &mut self.music {
            music.volume = volume;
        }
    }

    fn play_sound(&mut self, request: &SoundRequest) {
        self.sounds.push(request.clone());
    }
}
