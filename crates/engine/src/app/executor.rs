use thiserror::Error;
use tracing::{debug, info, warn};

use super::camera::{self, CameraMove, ScrollBounds};
use super::config::RuntimeConfig;
use super::fade;
use super::host::{Host, HostError, MusicRequest, SoundRequest};
use super::input::Button;
use super::stage::{SceneRequest, Stage};
use super::variables::{VariableError, VariableRegistry};
use crate::content::{CompareOp, Condition, Event, EventListId, SceneGraph, TilePoint};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Variable(#[from] VariableError),
    #[error(transparent)]
    Host(#[from] HostError),
    #[error("event nesting exceeded {limit} levels")]
    NestingTooDeep { limit: usize },
}

/// Everything an executing event may touch. Built by the director for each
/// pass and threaded through nested lists by `&mut self`.
pub struct Context<'a, 'g> {
    pub(crate) graph: &'g SceneGraph,
    pub(crate) config: &'a RuntimeConfig,
    pub(crate) host: &'a mut dyn Host,
    pub(crate) variables: &'a mut VariableRegistry,
    pub(crate) stage: &'a mut Stage<'g>,
    depth: usize,
}

impl<'a, 'g> Context<'a, 'g> {
    pub fn new(
        graph: &'g SceneGraph,
        config: &'a RuntimeConfig,
        host: &'a mut dyn Host,
        variables: &'a mut VariableRegistry,
        stage: &'a mut Stage<'g>,
    ) -> Self {
        Self {
            graph,
            config,
            host,
            variables,
            stage,
            depth: 0,
        }
    }

    pub fn advance(&mut self) -> Result<(), RuntimeError> {
        self.host.advance_frame()?;
        Ok(())
    }

    pub fn execute_list(&mut self, list: EventListId, frame_loop: bool) -> Result<(), RuntimeError> {
        let graph = self.graph;
        for event in graph.events(list) {
            self.execute(event, frame_loop)?;
        }
        Ok(())
    }

    /// Runs one event. `frame_loop` is true when the event is re-evaluated
    /// every frame rather than once on scene entry.
    pub fn execute(&mut self, event: &'g Event, frame_loop: bool) -> Result<(), RuntimeError> {
        let limit = self.config.max_event_depth;
        if self.depth >= limit {
            return Err(RuntimeError::NestingTooDeep { limit });
        }
        self.depth += 1;
        let result = self.dispatch(event, frame_loop);
        self.depth -= 1;
        result
    }

    fn dispatch(&mut self, event: &'g Event, frame_loop: bool) -> Result<(), RuntimeError> {
        debug!(kind = event.kind(), frame_loop, depth = self.depth, "event_dispatch");
        match event {
            Event::Wait { duration } => {
                let duration = duration.as_int(self.variables);
                self.wait(duration)
            }
            Event::FadeIn { duration } => {
                let frames = self.config.frames_for(duration.as_int(self.variables));
                self.stage.set_blending(&mut *self.host, true);
                fade::enter(&mut *self.host, &mut self.stage.background, frames)?;
                self.stage.set_blending(&mut *self.host, false);
                Ok(())
            }
            Event::FadeOut { duration } => {
                let frames = self.config.frames_for(duration.as_int(self.variables));
                self.stage.set_blending(&mut *self.host, true);
                fade::exit(&mut *self.host, &mut self.stage.background, frames)?;
                Ok(())
            }
            Event::GoToScene { target, start } => {
                info!(scene = %target, "scene_change_requested");
                self.stage.request = Some(SceneRequest {
                    target: target.as_str(),
                    start,
                });
                Ok(())
            }
            Event::WaitForButton { buttons } => {
                if buttons.is_empty() {
                    return Ok(());
                }
                while !self.host.input().any_pressed(buttons) {
                    self.advance()?;
                }
                Ok(())
            }
            Event::OnButtonPress { buttons, events } => {
                if !frame_loop {
                    self.stage.scripted.push(event);
                    return Ok(());
                }
                if self.host.input().any_pressed(buttons) {
                    debug!(buttons = ?buttons, "button_press_triggered");
                    self.execute_list(*events, true)?;
                }
                Ok(())
            }
            Event::ShowDialog { text } => self.show_dialog(text),
            Event::SetVariable { name, value } => {
                self.variables.set(name, value.clone())?;
                Ok(())
            }
            Event::If {
                conditions,
                then,
                otherwise,
            } => {
                let branch = if conditions.iter().all(|c| self.evaluate(c)) {
                    *then
                } else {
                    *otherwise
                };
                self.execute_list(branch, frame_loop)
            }
            Event::DisableActor { actor } => {
                self.toggle_actor(actor, false);
                Ok(())
            }
            Event::EnableActor { actor } => {
                self.toggle_actor(actor, true);
                Ok(())
            }
            Event::PlayMusic {
                name,
                volume,
                looping,
            } => {
                if self.host.music_playing() {
                    debug!(music = %name, "music_already_playing");
                    return Ok(());
                }
                info!(music = %name, volume, looping, "music_started");
                self.host.play_music(&MusicRequest {
                    name: name.clone(),
                    volume: *volume as f32 / 100.0,
                    looping: *looping,
                });
                Ok(())
            }
            Event::StopMusic => self.stop_music(),
            Event::PlaySound {
                name,
                volume,
                speed,
                panning,
                priority,
            } => {
                debug!(sound = %name, "sound_played");
                self.host.play_sound(&SoundRequest {
                    name: name.clone(),
                    volume: *volume as f32 / 100.0,
                    speed: *speed,
                    panning: *panning as f32 / 100.0,
                    priority: *priority,
                });
                Ok(())
            }
            Event::ExecuteScript { name } => {
                let script = self.graph.script(name);
                debug!(script = %name, "script_executed");
                self.execute_list(script.events, frame_loop)
            }
            Event::MoveCameraTo {
                x,
                y,
                duration,
                allow_diagonal,
                direction_priority,
            } => {
                let Some(map) = self.stage.map() else {
                    warn!(scene = %self.stage.scene.label(), "camera_move_without_map");
                    return Ok(());
                };
                let bounds = ScrollBounds::for_map(map, self.config);
                let tile = TilePoint::new(x.as_int(self.variables), y.as_int(self.variables));
                let movement = CameraMove {
                    target: bounds.tile_target(map, tile),
                    frames: self.config.frames_for(duration.as_int(self.variables)),
                    allow_diagonal: *allow_diagonal,
                    priority: *direction_priority,
                };
                self.stage.camera =
                    camera::pan_to(&mut *self.host, self.stage.camera, &bounds, movement)?;
                Ok(())
            }
            Event::Disabled { kind } => {
                debug!(kind = %kind, "disabled_event_skipped");
                Ok(())
            }
            Event::Unknown => {
                warn!("unknown_event");
                Ok(())
            }
        }
    }

    /// Every comparison is on the text form of both sides.
    pub fn evaluate(&self, condition: &Condition) -> bool {
        let left = condition.left.as_str(self.variables);
        let right = condition.right.as_str(self.variables);
        match condition.op {
            CompareOp::Eq => left == right,
            CompareOp::Neq => left != right,
        }
    }

    fn wait(&mut self, duration_ms: i32) -> Result<(), RuntimeError> {
        let step = i64::from(self.config.frame_ms.max(1));
        let frames = (i64::from(duration_ms.max(0)) + step - 1) / step;
        for _ in 0..frames {
            self.advance()?;
        }
        Ok(())
    }

    fn show_dialog(&mut self, text: &str) -> Result<(), RuntimeError> {
        info!(text = %text, "dialog_opened");
        self.host.open_dialog(text);
        loop {
            self.advance()?;
            if self.host.input().pressed(self.config.dialog_button) {
                break;
            }
        }
        self.host.close_dialog();
        Ok(())
    }

    fn toggle_actor(&mut self, name: &str, visible: bool) {
        match self.stage.actor_mut(name) {
            Some(actor) => {
                actor.set_visible(&mut *self.host, visible);
                if visible {
                    info!(actor = %name, "actor_enabled");
                } else {
                    info!(actor = %name, "actor_disabled");
                }
            }
            None => warn!(actor = %name, "actor_not_found"),
        }
    }

    fn stop_music(&mut self) -> Result<(), RuntimeError> {
        if !self.host.music_playing() {
            return Ok(());
        }
        let steps = self.config.music_fade_steps;
        let start = self.host.music_volume();
        for step in 1..=steps {
            let remaining = 1.0 - step as f32 / steps as f32;
            self.host.set_music_volume(start * remaining);
            self.advance()?;
        }
        self.host.stop_music();
        info!("music_stopped");
        Ok(())
    }

    pub(crate) fn pressed(&self, button: Button) -> bool {
        self.host.input().pressed(button)
    }

    pub(crate) fn held(&self, button: Button) -> bool {
        self.host.input().held(button)
    }
}
