mod builder;
mod event;
mod graph;
mod map;
mod value;

pub use builder::GraphBuilder;
pub use event::{
    CompareOp, Condition, Direction, DirectionPriority, Event, EventListId, StartPosition,
    MAX_BUTTONS_PER_EVENT, START_SENTINEL,
};
pub use graph::{
    ActorDef, GraphError, PlayerSpawn, Scene, SceneGraph, Script, SpriteDef, SpriteSheet,
    VariableDecl, DEFAULT_BACKGROUND, DEFAULT_SPRITE, DEFAULT_SPRITE_SIZE, FALLBACK_SCENE,
};
pub use map::{Map, MapError, PixelPoint, Sensor, TilePoint, DEFAULT_GRID_SIZE};
pub use value::{Expression, Value};
