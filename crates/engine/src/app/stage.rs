use super::actor::{Actor, Prop};
use super::host::{BackgroundState, Host};
use super::player::Player;
use crate::content::{Direction, Event, Map, PixelPoint, Scene, StartPosition, TilePoint};

/// Scene change requested by a go-to-scene event. The start position is kept
/// until a scene matching `target` with a player is entered.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneRequest<'g> {
    pub target: &'g str,
    pub start: &'g StartPosition,
}

/// Everything that lives for one scene entry: the background, spawned
/// entities, registered per-frame events and the camera.
#[derive(Debug)]
pub struct Stage<'g> {
    pub(crate) scene: &'g Scene,
    pub(crate) background: BackgroundState,
    pub(crate) actors: Vec<Actor<'g>>,
    pub(crate) props: Vec<Prop>,
    pub(crate) player: Option<Player>,
    pub(crate) scripted: Vec<&'g Event>,
    pub(crate) camera: PixelPoint,
    pub(crate) request: Option<SceneRequest<'g>>,
}

impl<'g> Stage<'g> {
    pub fn new(scene: &'g Scene) -> Self {
        Self {
            scene,
            background: BackgroundState::hidden(scene.background_name()),
            actors: Vec::new(),
            props: Vec::new(),
            player: None,
            scripted: Vec::new(),
            camera: PixelPoint::default(),
            request: None,
        }
    }

    pub fn scene(&self) -> &'g Scene {
        self.scene
    }

    pub fn map(&self) -> Option<&'g Map> {
        self.scene.map.as_ref()
    }

    pub fn actors(&self) -> &[Actor<'g>] {
        &self.actors
    }

    pub fn actor(&self, name: &str) -> Option<&Actor<'g>> {
        self.actors.iter().find(|actor| actor.is(name))
    }

    pub fn player(&self) -> Option<&Player> {
        self.player.as_ref()
    }

    pub fn camera(&self) -> PixelPoint {
        self.camera
    }

    pub fn background(&self) -> &BackgroundState {
        &self.background
    }

    pub fn scripted_len(&self) -> usize {
        self.scripted.len()
    }

    pub fn scene_changed(&self) -> bool {
        self.request.is_some()
    }

    pub fn request(&self) -> Option<SceneRequest<'g>> {
        self.request
    }

    pub(crate) fn actor_mut(&mut self, name: &str) -> Option<&mut Actor<'g>> {
        self.actors.iter_mut().find(|actor| actor.is(name))
    }

    pub fn actor_collides(&self, tile: TilePoint) -> bool {
        self.actors.iter().any(|actor| actor.collides(tile))
    }

    /// Index of the first visible actor one tile from `tile` towards
    /// `direction`.
    pub fn actor_at(&self, tile: TilePoint, direction: Direction) -> Option<usize> {
        let target = tile.offset(direction.offset());
        self.actors.iter().position(|actor| actor.collides(target))
    }

    pub(crate) fn set_blending(&self, host: &mut dyn Host, enabled: bool) {
        if let Some(player) = &self.player {
            host.set_sprite_blending(player.sprite(), enabled);
        }
        for actor in &self.actors {
            host.set_sprite_blending(actor.sprite(), enabled);
        }
    }

    pub(crate) fn teardown(&mut self, host: &mut dyn Host) {
        for actor in self.actors.drain(..) {
            actor.despawn(host);
        }
        for prop in self.props.drain(..) {
            prop.despawn(host);
        }
        if let Some(player) = self.player.take() {
            player.despawn(host);
        }
        self.scripted.clear();
        self.background.visible = false;
        host.set_background(&self.background);
    }
}
