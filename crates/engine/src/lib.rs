pub mod app;
pub mod content;

pub use app::{
    button_for_key, BackgroundState, Button, ButtonStates, CameraMove, Context, Director,
    FrameRecord, HeadlessHost, Host, HostError, KeyboardCollector, MusicRequest, PlayingMusic,
    RunSummary, RuntimeConfig, RuntimeError, ScriptedInput, SoundRequest, SpriteDesc,
    SpriteHandle, SpriteRecord, Stage, VariableError, VariableRegistry, BUTTON_COUNT,
};
pub use content::{
    ActorDef, CompareOp, Condition, Direction, DirectionPriority, Event, EventListId, Expression,
    GraphBuilder, GraphError, Map, MapError, PixelPoint, PlayerSpawn, Scene, SceneGraph, Script,
    Sensor, SpriteDef, SpriteSheet, StartPosition, TilePoint, Value, VariableDecl,
    FALLBACK_SCENE, START_SENTINEL,
};
