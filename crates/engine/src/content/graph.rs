use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use super::event::{Direction, Event, EventListId, MAX_BUTTONS_PER_EVENT};
use super::map::{Map, MapError};
use super::value::{Expression, Value};

pub const DEFAULT_BACKGROUND: &str = "bg_default";
pub const DEFAULT_SPRITE: &str = "sprite_default";
pub const DEFAULT_SPRITE_SIZE: i32 = 16;

/// Built-in scene used when a requested scene does not exist.
pub static FALLBACK_SCENE: Scene = Scene {
    id: String::new(),
    name: String::new(),
    background: None,
    events: EventListId::EMPTY,
    player: None,
    map: None,
    actors: Vec::new(),
    sprites: Vec::new(),
};

static EMPTY_SCRIPT: Script = Script {
    id: String::new(),
    name: String::new(),
    events: EventListId::EMPTY,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpriteSheet {
    #[serde(default = "default_sprite_name")]
    pub name: String,
    #[serde(default = "default_sprite_size")]
    pub width: i32,
    #[serde(default = "default_sprite_size")]
    pub height: i32,
}

impl SpriteSheet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            width: DEFAULT_SPRITE_SIZE,
            height: DEFAULT_SPRITE_SIZE,
        }
    }
}

impl Default for SpriteSheet {
    fn default() -> Self {
        Self::new(DEFAULT_SPRITE)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSpawn {
    #[serde(default)]
    pub x: Expression,
    #[serde(default)]
    pub y: Expression,
    #[serde(default)]
    pub z: Expression,
    #[serde(default)]
    pub direction: Direction,
    #[serde(default)]
    pub sprite: SpriteSheet,
}

impl PlayerSpawn {
    pub fn at(x: i32, y: i32) -> Self {
        Self {
            x: Expression::literal(x),
            y: Expression::literal(y),
            z: Expression::literal(0),
            direction: Direction::Down,
            sprite: SpriteSheet::default(),
        }
    }

    pub fn facing(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    pub fn with_z(mut self, z: i32) -> Self {
        self.z = Expression::literal(z);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorDef {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub x: Expression,
    #[serde(default)]
    pub y: Expression,
    #[serde(default)]
    pub z: Expression,
    #[serde(default)]
    pub direction: Direction,
    #[serde(default)]
    pub sprite: SpriteSheet,
    #[serde(default)]
    pub init: EventListId,
    #[serde(default)]
    pub interact: EventListId,
    #[serde(default)]
    pub update: EventListId,
}

impl ActorDef {
    pub fn new(name: impl Into<String>, x: i32, y: i32) -> Self {
        Self {
            id: String::new(),
            name: name.into(),
            x: Expression::literal(x),
            y: Expression::literal(y),
            z: Expression::literal(0),
            direction: Direction::Down,
            sprite: SpriteSheet::default(),
            init: EventListId::EMPTY,
            interact: EventListId::EMPTY,
            update: EventListId::EMPTY,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn facing(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    pub fn on_init(mut self, events: EventListId) -> Self {
        self.init = events;
        self
    }

    pub fn on_interact(mut self, events: EventListId) -> Self {
        self.interact = events;
        self
    }

    pub fn on_update(mut self, events: EventListId) -> Self {
        self.update = events;
        self
    }

    pub fn is(&self, name: &str) -> bool {
        self.name == name || (!self.id.is_empty() && self.id == name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpriteDef {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub x: Expression,
    #[serde(default)]
    pub y: Expression,
    #[serde(default)]
    pub z: Expression,
    #[serde(default)]
    pub sprite: SpriteSheet,
}

impl SpriteDef {
    pub fn new(name: impl Into<String>, x: i32, y: i32, sprite: SpriteSheet) -> Self {
        Self {
            id: String::new(),
            name: name.into(),
            x: Expression::literal(x),
            y: Expression::literal(y),
            z: Expression::literal(0),
            sprite,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Script {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub events: EventListId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scene {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub background: Option<String>,
    #[serde(default)]
    pub events: EventListId,
    #[serde(default)]
    pub player: Option<PlayerSpawn>,
    #[serde(default)]
    pub map: Option<Map>,
    #[serde(default)]
    pub actors: Vec<ActorDef>,
    #[serde(default)]
    pub sprites: Vec<SpriteDef>,
}

impl Scene {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            name: name.into(),
            background: None,
            events: EventListId::EMPTY,
            player: None,
            map: None,
            actors: Vec::new(),
            sprites: Vec::new(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_background(mut self, background: impl Into<String>) -> Self {
        self.background = Some(background.into());
        self
    }

    pub fn with_events(mut self, events: EventListId) -> Self {
        self.events = events;
        self
    }

    pub fn with_player(mut self, player: PlayerSpawn) -> Self {
        self.player = Some(player);
        self
    }

    pub fn with_map(mut self, map: Map) -> Self {
        self.map = Some(map);
        self
    }

    pub fn with_actor(mut self, actor: ActorDef) -> Self {
        self.actors.push(actor);
        self
    }

    pub fn with_sprite(mut self, sprite: SpriteDef) -> Self {
        self.sprites.push(sprite);
        self
    }

    /// Scenes answer to either their id or their display name.
    pub fn is(&self, name: &str) -> bool {
        !name.is_empty() && (self.name == name || self.id == name)
    }

    pub fn background_name(&self) -> &str {
        self.background.as_deref().unwrap_or(DEFAULT_BACKGROUND)
    }

    pub fn label(&self) -> &str {
        if self.name.is_empty() {
            "default"
        } else {
            &self.name
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableDecl {
    pub name: String,
    #[serde(default)]
    pub value: Value,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    #[error("event list 0 is reserved for the empty list but holds {len} events")]
    ReservedListNotEmpty { len: usize },
    #[error("{owner} references event list {list} but the graph has {available} lists")]
    DanglingEventList {
        owner: String,
        list: u32,
        available: usize,
    },
    #[error("{owner} lists {count} buttons; at most 10 are allowed")]
    TooManyButtons { owner: String, count: usize },
    #[error("variable {name} is declared more than once")]
    DuplicateVariable { name: String },
    #[error("map of scene {scene} is invalid: {source}")]
    InvalidMap {
        scene: String,
        #[source]
        source: MapError,
    },
}

/// Immutable arena produced by the level compiler. Event bodies reference each
/// other through [`EventListId`] handles into `event_lists`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneGraph {
    #[serde(default)]
    pub starting_scene: Option<String>,
    #[serde(default)]
    pub variables: Vec<VariableDecl>,
    #[serde(default)]
    pub scenes: Vec<Scene>,
    #[serde(default)]
    pub scripts: Vec<Script>,
    #[serde(default = "reserved_lists")]
    pub event_lists: Vec<Vec<Event>>,
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self {
            starting_scene: None,
            variables: Vec::new(),
            scenes: Vec::new(),
            scripts: Vec::new(),
            event_lists: reserved_lists(),
        }
    }
}

impl SceneGraph {
    pub fn events(&self, list: EventListId) -> &[Event] {
        self.event_lists
            .get(list.index())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Unknown names resolve to the built-in empty scene.
    pub fn scene(&self, name: &str) -> &Scene {
        self.find_scene(name).unwrap_or(&FALLBACK_SCENE)
    }

    pub fn find_scene(&self, name: &str) -> Option<&Scene> {
        self.scenes.iter().find(|scene| scene.is(name))
    }

    /// Unknown names resolve to an empty script.
    pub fn script(&self, name: &str) -> &Script {
        self.scripts
            .iter()
            .find(|script| !name.is_empty() && (script.name == name || script.id == name))
            .unwrap_or(&EMPTY_SCRIPT)
    }

    pub fn starting_scene(&self) -> &str {
        match &self.starting_scene {
            Some(name) => name.as_str(),
            None => self
                .scenes
                .first()
                .map(|scene| if scene.id.is_empty() { &scene.name } else { &scene.id })
                .map(String::as_str)
                .unwrap_or(""),
        }
    }

    pub fn validate(&self) -> Result<(), GraphError> {
        if let Some(reserved) = self.event_lists.first() {
            if !reserved.is_empty() {
                return Err(GraphError::ReservedListNotEmpty {
                    len: reserved.len(),
                });
            }
        }

        let mut seen = HashSet::new();
        for decl in &self.variables {
            if !seen.insert(decl.name.as_str()) {
                return Err(GraphError::DuplicateVariable {
                    name: decl.name.clone(),
                });
            }
        }

        for scene in &self.scenes {
            let owner = format!("scene {}", scene.label());
            self.check_list(&owner, scene.events)?;
            if let Some(map) = &scene.map {
                map.validate().map_err(|source| GraphError::InvalidMap {
                    scene: scene.label().to_string(),
                    source,
                })?;
                for sensor in map.sensors() {
                    self.check_list(&format!("{owner} sensor {}", sensor.id), sensor.events)?;
                }
            }
            for actor in &scene.actors {
                let actor_owner = format!("{owner} actor {}", actor.name);
                self.check_list(&actor_owner, actor.init)?;
                self.check_list(&actor_owner, actor.interact)?;
                self.check_list(&actor_owner, actor.update)?;
            }
        }

        for script in &self.scripts {
            self.check_list(&format!("script {}", script.name), script.events)?;
        }

        for (index, list) in self.event_lists.iter().enumerate() {
            for (position, event) in list.iter().enumerate() {
                let owner = format!("event {position} of list {index} ({})", event.kind());
                for child in event.child_lists() {
                    self.check_list(&owner, child)?;
                }
                if let Some(buttons) = event.buttons() {
                    if buttons.len() > MAX_BUTTONS_PER_EVENT {
                        return Err(GraphError::TooManyButtons {
                            owner,
                            count: buttons.len(),
                        });
                    }
                }
            }
        }

        let start = self.starting_scene();
        if self.find_scene(start).is_none() {
            warn!(scene = %start, "starting_scene_not_found");
        }

        Ok(())
    }

    fn check_list(&self, owner: &str, list: EventListId) -> Result<(), GraphError> {
        if list.index() < self.event_lists.len() || list == EventListId::EMPTY {
            return Ok(());
        }
        Err(GraphError::DanglingEventList {
            owner: owner.to_string(),
            list: list.0,
            available: self.event_lists.len(),
        })
    }
}

fn reserved_lists() -> Vec<Vec<Event>> {
    vec![Vec::new()]
}

fn default_sprite_name() -> String {
    DEFAULT_SPRITE.to_string()
}

fn default_sprite_size() -> i32 {
    DEFAULT_SPRITE_SIZE
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::TilePoint;

    #[test]
    fn unknown_scene_falls_back_to_empty_default() {
        let graph = SceneGraph::default();
        let scene = graph.scene("nowhere");
        assert!(scene.player.is_none());
        assert!(scene.actors.is_empty());
        assert_eq!(scene.events, EventListId::EMPTY);
        assert_eq!(scene.background_name(), DEFAULT_BACKGROUND);
        assert_eq!(scene.label(), "default");
    }

    #[test]
    fn scenes_match_by_id_or_name() {
        let scene = Scene::new("Village").with_id("0a1b");
        assert!(scene.is("Village"));
        assert!(scene.is("0a1b"));
        assert!(!scene.is("village"));
        assert!(!scene.is(""));
    }

    #[test]
    fn dangling_list_is_rejected() {
        let mut graph = SceneGraph::default();
        graph.scenes.push(Scene::new("a").with_events(EventListId(4)));
        let error = graph.validate().expect_err("dangling list");
        assert!(matches!(
            error,
            GraphError::DanglingEventList { list: 4, .. }
        ));
    }

    #[test]
    fn reserved_empty_list_must_stay_empty() {
        let mut graph = SceneGraph::default();
        graph.event_lists[0].push(Event::StopMusic);
        assert_eq!(
            graph.validate(),
            Err(GraphError::ReservedListNotEmpty { len: 1 })
        );
    }

    #[test]
    fn duplicate_variables_are_rejected() {
        let mut graph = SceneGraph::default();
        for _ in 0..2 {
            graph.variables.push(VariableDecl {
                name: "coins".to_string(),
                value: Value::from(0),
            });
        }
        assert!(matches!(
            graph.validate(),
            Err(GraphError::DuplicateVariable { .. })
        ));
    }

    #[test]
    fn compiled_json_graph_deserializes_and_validates() {
        let graph: SceneGraph = serde_json::from_str(
            r#"{
                "starting_scene": "village",
                "variables": [{"name": "coins", "value": 0}],
                "scenes": [{
                    "name": "village",
                    "events": 1,
                    "player": {"x": {"type":"value","value":2}, "y": {"type":"value","value":3}},
                    "map": {"width": 3, "height": 2, "collisions": [0,0,1,0,0,0],
                            "sensors": [{"x": 2, "y": 1, "events": 2}]},
                    "actors": [{"name": "guard", "interact": 2}]
                }],
                "event_lists": [
                    [],
                    [{"type":"fade-in"}],
                    [{"type":"set-variable","name":"coins","value":5}]
                ]
            }"#,
        )
        .expect("graph");

        graph.validate().expect("valid graph");
        assert_eq!(graph.starting_scene(), "village");
        let scene = graph.scene("village");
        let map = scene.map.as_ref().expect("map");
        assert!(map.has_collision(TilePoint::new(2, 0)));
        assert_eq!(map.sensors()[0].width, 1);
        assert_eq!(scene.actors[0].sprite.name, DEFAULT_SPRITE);
        assert_eq!(graph.events(scene.events).len(), 1);
    }
}
