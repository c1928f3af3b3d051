use super::input::Button;

#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Milliseconds covered by one `advance_frame` call.
    pub frame_ms: i32,
    pub screen_width: i32,
    pub screen_height: i32,
    /// Player walking speed in pixels per frame.
    pub player_speed: i32,
    /// Frames between walk animation steps.
    pub walk_animation_wait: u32,
    pub max_event_depth: usize,
    pub music_fade_steps: u32,
    pub dialog_button: Button,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            frame_ms: 16,
            screen_width: 240,
            screen_height: 160,
            player_speed: 2,
            walk_animation_wait: 7,
            max_event_depth: 64,
            music_fade_steps: 10,
            dialog_button: Button::Activate,
        }
    }
}

impl RuntimeConfig {
    /// Whole frames needed to cover `duration_ms`; zero for non-positive
    /// durations.
    pub fn frames_for(&self, duration_ms: i32) -> u32 {
        if duration_ms <= 0 {
            return 0;
        }
        (duration_ms / self.frame_ms.max(1)) as u32
    }
}
