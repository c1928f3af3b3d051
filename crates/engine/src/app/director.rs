use tracing::{debug, info, warn};

use super::actor::{Actor, Prop};
use super::camera::{follow_target, ScrollBounds};
use super::config::RuntimeConfig;
use super::executor::{Context, RuntimeError};
use super::host::{Host, HostError};
use super::player::Player;
use super::stage::{SceneRequest, Stage};
use super::variables::{VariableError, VariableRegistry};
use crate::content::{
    Direction, PixelPoint, PlayerSpawn, Scene, SceneGraph, TilePoint, FALLBACK_SCENE,
    START_SENTINEL,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub frames: u64,
    pub scenes_entered: u32,
    pub last_scene: String,
    pub stop: HostError,
}

/// Owns the live scene and drives the frame loop.
///
/// A scene runs until one of its events requests another scene; the director
/// then tears everything down and enters the target. The run ends only when
/// the host stops the frame pump.
pub struct Director<'g, H: Host> {
    graph: &'g SceneGraph,
    config: RuntimeConfig,
    host: H,
    variables: VariableRegistry,
    stage: Stage<'g>,
    pending_start: Option<SceneRequest<'g>>,
    scenes_entered: u32,
}

impl<'g, H: Host> Director<'g, H> {
    pub fn new(graph: &'g SceneGraph, config: RuntimeConfig, host: H) -> Result<Self, VariableError> {
        let variables = VariableRegistry::from_graph(graph)?;
        Ok(Self {
            graph,
            config,
            host,
            variables,
            stage: Stage::new(&FALLBACK_SCENE),
            pending_start: None,
            scenes_entered: 0,
        })
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn into_host(self) -> H {
        self.host
    }

    pub fn variables(&self) -> &VariableRegistry {
        &self.variables
    }

    pub fn stage(&self) -> &Stage<'g> {
        &self.stage
    }

    pub fn scenes_entered(&self) -> u32 {
        self.scenes_entered
    }

    fn context(&mut self) -> Context<'_, 'g> {
        Context::new(
            self.graph,
            &self.config,
            &mut self.host,
            &mut self.variables,
            &mut self.stage,
        )
    }

    /// Plays scenes from the starting scene until the host stops the frame
    /// pump. Host stops end the run cleanly; every other error is fatal.
    pub fn run(&mut self) -> Result<RunSummary, RuntimeError> {
        let graph = self.graph;
        let mut next = graph.starting_scene();
        let stop = loop {
            let played = self.enter_scene(next).and_then(|()| self.run_scene());
            match played {
                Ok(request) => next = request.target,
                Err(RuntimeError::Host(stop)) => break stop,
                Err(error) => return Err(error),
            }
        };

        let summary = RunSummary {
            frames: self.host.frame_count(),
            scenes_entered: self.scenes_entered,
            last_scene: self.stage.scene().label().to_string(),
            stop,
        };
        info!(
            frames = summary.frames,
            scenes_entered = summary.scenes_entered,
            last_scene = %summary.last_scene,
            stop = %summary.stop,
            "run_stopped"
        );
        Ok(summary)
    }

    /// Tears down the current scene and builds `name`: background, player,
    /// sprites, then actors with their init events, then the scene's own
    /// events once.
    pub fn enter_scene(&mut self, name: &str) -> Result<(), RuntimeError> {
        let graph = self.graph;
        self.stage.teardown(&mut self.host);

        let scene = match graph.find_scene(name) {
            Some(scene) => scene,
            None => {
                warn!(scene = %name, "scene_not_found");
                &FALLBACK_SCENE
            }
        };
        self.stage = Stage::new(scene);
        self.host.set_background(&self.stage.background);
        self.stage.camera = PixelPoint::default();

        if let Some(spawn) = &scene.player {
            self.spawn_player(scene, spawn);
        }
        self.host.set_camera_position(self.stage.camera);

        for def in &scene.sprites {
            let prop = Prop::spawn(def, scene.map.as_ref(), &self.variables, &mut self.host);
            self.stage.props.push(prop);
        }

        for def in &scene.actors {
            let actor = Actor::spawn(def, scene.map.as_ref(), &self.variables, &mut self.host);
            self.stage.actors.push(actor);
            self.context().execute_list(def.init, false)?;
        }
        self.stage.scripted.clear();

        self.scenes_entered += 1;
        info!(
            scene = %scene.label(),
            actor_count = scene.actors.len(),
            has_player = self.stage.player.is_some(),
            "scene_entered"
        );
        self.context().execute_list(scene.events, false)
    }

    /// Runs frames until a scene change is requested and returns the request.
    /// The requested start position is remembered for the next entry.
    pub fn run_scene(&mut self) -> Result<SceneRequest<'g>, RuntimeError> {
        let request = loop {
            if let Some(request) = self.stage.request {
                break request;
            }
            self.run_frame()?;
        };

        self.stage.background.visible = false;
        self.host.set_background(&self.stage.background);
        self.pending_start = Some(request);
        debug!(scene = %request.target, "scene_exited");
        Ok(request)
    }

    /// One loop iteration: registered button handlers, the player, every
    /// actor's update list, then one frame.
    pub fn run_frame(&mut self) -> Result<(), RuntimeError> {
        let mut context = self.context();
        for index in 0..context.stage.scripted.len() {
            let event = context.stage.scripted[index];
            context.execute(event, true)?;
        }

        if context.stage.player.is_some() {
            context.update_player()?;
        }

        for index in 0..context.stage.actors.len() {
            let update = context.stage.actors[index].def().update;
            context.execute_list(update, true)?;
        }

        context.advance()
    }

    fn spawn_player(&mut self, scene: &'g Scene, spawn: &'g PlayerSpawn) {
        let Some(map) = &scene.map else {
            debug!(scene = %scene.label(), "player_without_map");
            return;
        };
        let (tile, direction) = self.start_position(scene, spawn);
        let z_order = spawn.z.as_int(&self.variables);
        let player = Player::spawn(&mut self.host, map, &spawn.sprite, tile, direction, z_order);
        let bounds = ScrollBounds::for_map(map, &self.config);
        self.stage.camera = follow_target(map, &bounds, player.position());
        debug!(x = tile.x, y = tile.y, direction = ?direction, "player_spawned");
        self.stage.player = Some(player);
    }

    /// The remembered go-to-scene start wins when it targets this scene and
    /// both coordinates are set. It is consumed only when used.
    fn start_position(&mut self, scene: &Scene, spawn: &PlayerSpawn) -> (TilePoint, Direction) {
        if let Some(request) = self.pending_start {
            if scene.is(request.target) {
                let x = request.start.x.as_int(&self.variables);
                let y = request.start.y.as_int(&self.variables);
                if x != START_SENTINEL && y != START_SENTINEL {
                    self.pending_start = None;
                    return (TilePoint::new(x, y), request.start.direction);
                }
            }
        }
        (
            TilePoint::new(
                spawn.x.as_int(&self.variables),
                spawn.y.as_int(&self.variables),
            ),
            spawn.direction,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::{Button, HeadlessHost, ScriptedInput};
    use crate::content::{
        ActorDef, Condition, Event, EventListId, Expression, GraphBuilder, Map, Sensor,
        SpriteDef, SpriteSheet, StartPosition, Value,
    };

    fn director(graph: &SceneGraph, input: ScriptedInput, frames: u64) -> Director<'_, HeadlessHost> {
        let host = HeadlessHost::new(input).with_frame_budget(frames);
        Director::new(graph, RuntimeConfig::default(), host).expect("director")
    }

    fn go_to(target: &str, x: i32, y: i32, direction: Direction) -> Event {
        Event::GoToScene {
            target: target.to_string(),
            start: StartPosition {
                x: Expression::literal(x),
                y: Expression::literal(y),
                direction,
            },
        }
    }

    fn set(name: &str, value: impl Into<Value>) -> Event {
        Event::SetVariable {
            name: name.to_string(),
            value: value.into(),
        }
    }

    fn open_map() -> Map {
        Map::open(10, 10, 16).expect("map")
    }

    #[test]
    fn go_to_scene_in_update_finishes_frame_then_stops_loop() {
        let mut builder = GraphBuilder::new();
        builder.variable("later_update_ran", false);
        let leave = builder.list(vec![go_to("house", 2, 3, Direction::Up)]);
        let first_update = builder.list(vec![Event::If {
            conditions: vec![Condition::eq(Expression::literal(1), Expression::literal(1))],
            then: leave,
            otherwise: EventListId::EMPTY,
        }]);
        let second_update = builder.list(vec![set("later_update_ran", true)]);
        builder
            .scene(
                Scene::new("yard")
                    .with_actor(ActorDef::new("a", 0, 0).on_update(first_update))
                    .with_actor(ActorDef::new("b", 1, 0).on_update(second_update)),
            )
            .scene(
                Scene::new("house")
                    .with_map(open_map())
                    .with_player(PlayerSpawn::at(7, 7)),
            );
        let graph = builder.build().expect("graph");
        let mut director = director(&graph, ScriptedInput::new(), 100);

        director.enter_scene("yard").expect("enter");
        let request = director.run_scene().expect("scene");

        assert_eq!(request.target, "house");
        assert_eq!(director.host().frame(), 1);
        assert_eq!(
            director.variables().get("later_update_ran").map(Value::as_bool),
            Ok(true)
        );

        director.enter_scene(request.target).expect("enter house");
        let player = director.stage().player().expect("player");
        assert_eq!(player.tile(&open_map()), TilePoint::new(2, 3));
        assert_eq!(player.direction(), Direction::Up);
    }

    #[test]
    fn start_position_applies_only_to_matching_target() {
        let mut builder = GraphBuilder::new();
        let leave = builder.list(vec![go_to("house", 2, 3, Direction::Left)]);
        builder
            .scene(Scene::new("yard").with_events(leave))
            .scene(
                Scene::new("cellar")
                    .with_map(open_map())
                    .with_player(PlayerSpawn::at(5, 5)),
            )
            .scene(
                Scene::new("house")
                    .with_id("h1")
                    .with_map(open_map())
                    .with_player(PlayerSpawn::at(7, 7)),
            );
        let graph = builder.build().expect("graph");
        let map = open_map();
        let mut director = director(&graph, ScriptedInput::new(), 100);

        director.enter_scene("yard").expect("enter");
        director.run_scene().expect("scene");

        director.enter_scene("cellar").expect("cellar");
        let player = director.stage().player().expect("player");
        assert_eq!(player.tile(&map), TilePoint::new(5, 5));

        director.enter_scene("house").expect("house");
        let player = director.stage().player().expect("player");
        assert_eq!(player.tile(&map), TilePoint::new(2, 3));
        assert_eq!(player.direction(), Direction::Left);

        director.enter_scene("h1").expect("house again");
        let player = director.stage().player().expect("player");
        assert_eq!(player.tile(&map), TilePoint::new(7, 7));
    }

    #[test]
    fn sentinel_start_keeps_scene_spawn() {
        let mut builder = GraphBuilder::new();
        let leave = builder.list(vec![go_to("house", START_SENTINEL, 4, Direction::Up)]);
        builder.scene(Scene::new("yard").with_events(leave)).scene(
            Scene::new("house")
                .with_map(open_map())
                .with_player(PlayerSpawn::at(7, 7).facing(Direction::Right)),
        );
        let graph = builder.build().expect("graph");
        let mut director = director(&graph, ScriptedInput::new(), 100);

        director.enter_scene("yard").expect("enter");
        let request = director.run_scene().expect("scene");
        assert_eq!(director.host().frame(), 0);
        director.enter_scene(request.target).expect("house");

        let player = director.stage().player().expect("player");
        assert_eq!(player.tile(&open_map()), TilePoint::new(7, 7));
        assert_eq!(player.direction(), Direction::Right);
    }

    #[test]
    fn on_button_press_fires_on_press_edges_only() {
        let mut builder = GraphBuilder::new();
        let beep = builder.list(vec![Event::PlaySound {
            name: "beep".to_string(),
            volume: 100,
            speed: 1.0,
            panning: 0,
            priority: 0,
        }]);
        let events = builder.list(vec![Event::OnButtonPress {
            buttons: vec![Button::Activate],
            events: beep,
        }]);
        builder.scene(Scene::new("menu").with_events(events));
        let graph = builder.build().expect("graph");
        let input = ScriptedInput::new()
            .idle(2)
            .hold(Button::Activate, 4)
            .idle(1)
            .tap(Button::Activate);
        let mut director = director(&graph, input, 12);

        let summary = director.run().expect("run");

        assert_eq!(summary.stop, HostError::FrameBudgetExhausted { frames: 12 });
        assert_eq!(summary.frames, 12);
        assert_eq!(director.host().sounds().len(), 2);
        assert_eq!(director.stage().scripted_len(), 1);
    }

    #[test]
    fn handler_registered_through_if_and_script_waits_for_frame_loop() {
        let mut builder = GraphBuilder::new();
        let beep = builder.list(vec![Event::PlaySound {
            name: "beep".to_string(),
            volume: 100,
            speed: 1.0,
            panning: 0,
            priority: 0,
        }]);
        let register = builder.list(vec![Event::OnButtonPress {
            buttons: vec![Button::Start],
            events: beep,
        }]);
        builder.script("register_pause", register);
        let via_script = builder.list(vec![Event::ExecuteScript {
            name: "register_pause".to_string(),
        }]);
        let events = builder.list(vec![Event::If {
            conditions: vec![Condition::eq(Expression::literal(1), Expression::literal(1))],
            then: via_script,
            otherwise: EventListId::EMPTY,
        }]);
        builder.scene(Scene::new("menu").with_events(events));
        let graph = builder.build().expect("graph");
        let input = ScriptedInput::new()
            .tap(Button::Start)
            .hold(Button::Start, 3)
            .idle(1);
        let mut director = director(&graph, input, 8);

        director.enter_scene("menu").expect("enter");
        assert_eq!(director.stage().scripted_len(), 1);
        assert!(director.host().sounds().is_empty());
        assert_eq!(director.host().frame(), 0);

        let result = director.run_scene();
        assert!(matches!(
            result,
            Err(RuntimeError::Host(HostError::FrameBudgetExhausted { frames: 8 }))
        ));
        assert_eq!(director.host().sounds().len(), 2);
        assert_eq!(director.stage().scripted_len(), 1);
    }

    #[test]
    fn scripted_handlers_run_in_registration_order_each_frame() {
        let mut builder = GraphBuilder::new();
        builder.variable("order", "");
        let first = builder.list(vec![set("order", "first")]);
        let promote = builder.list(vec![set("order", "second")]);
        let second = builder.list(vec![Event::If {
            conditions: vec![Condition::eq(
                Expression::variable("order"),
                Expression::literal("first"),
            )],
            then: promote,
            otherwise: EventListId::EMPTY,
        }]);
        let events = builder.list(vec![
            Event::OnButtonPress {
                buttons: vec![Button::Activate],
                events: first,
            },
            Event::OnButtonPress {
                buttons: vec![Button::Activate],
                events: second,
            },
        ]);
        builder.scene(Scene::new("menu").with_events(events));
        let graph = builder.build().expect("graph");
        let input = ScriptedInput::new().idle(3).tap(Button::Activate);
        let mut director = director(&graph, input, 10);

        director.run().expect("run");

        assert_eq!(
            director.variables().get("order").map(Value::as_str),
            Ok("second")
        );
        assert_eq!(director.stage().scripted_len(), 2);
    }

    #[test]
    fn entry_runs_actor_init_then_scene_events_once() {
        let mut builder = GraphBuilder::new();
        builder.variable("order", "");
        let init = builder.list(vec![set("order", "init")]);
        let confirm = builder.list(vec![set("order", "scene")]);
        let scene_events = builder.list(vec![Event::If {
            conditions: vec![Condition::eq(
                Expression::variable("order"),
                Expression::literal("init"),
            )],
            then: confirm,
            otherwise: EventListId::EMPTY,
        }]);
        builder.scene(
            Scene::new("yard")
                .with_events(scene_events)
                .with_actor(ActorDef::new("a", 0, 0).on_init(init)),
        );
        let graph = builder.build().expect("graph");
        let mut director = director(&graph, ScriptedInput::new(), 3);

        director.enter_scene("yard").expect("enter");
        assert_eq!(
            director.variables().get("order").map(Value::as_str),
            Ok("scene")
        );
        assert_eq!(director.host().frame(), 0);
    }

    #[test]
    fn reentering_scene_recreates_entities() {
        let mut builder = GraphBuilder::new();
        let handlers = builder.list(vec![Event::OnButtonPress {
            buttons: vec![Button::Start],
            events: EventListId::EMPTY,
        }]);
        let again = builder.list(vec![go_to("yard", -1, -1, Direction::Down)]);
        builder.scene(
            Scene::new("yard")
                .with_map(open_map())
                .with_player(PlayerSpawn::at(1, 1))
                .with_sprite(SpriteDef::new("tree", 4, 4, SpriteSheet::new("tree")))
                .with_actor(ActorDef::new("a", 2, 2).on_update(again))
                .with_events(handlers),
        );
        let graph = builder.build().expect("graph");
        let mut director = director(&graph, ScriptedInput::new(), 5);

        let summary = director.run().expect("run");

        assert_eq!(summary.frames, 5);
        assert_eq!(summary.scenes_entered, 6);
        assert_eq!(summary.last_scene, "yard");
        assert_eq!(director.host().live_sprites().count(), 3);
        assert_eq!(director.host().sprites_with_sheet("tree").count(), 1);
        assert_eq!(director.stage().scripted_len(), 1);
    }

    #[test]
    fn unknown_scene_falls_back_to_empty_default() {
        let graph = GraphBuilder::new().build().expect("graph");
        let mut director = director(&graph, ScriptedInput::new(), 2);

        let summary = director.run().expect("run");

        assert_eq!(summary.scenes_entered, 1);
        assert_eq!(summary.last_scene, "default");
        assert!(director.stage().player().is_none());
        assert_eq!(
            director.host().background().map(|bg| bg.name.as_str()),
            Some(crate::content::DEFAULT_BACKGROUND)
        );
    }

    #[test]
    fn held_direction_walks_one_cell_per_grid_traversal() {
        let mut builder = GraphBuilder::new();
        builder.scene(
            Scene::new("field")
                .with_map(open_map())
                .with_player(PlayerSpawn::at(1, 1)),
        );
        let graph = builder.build().expect("graph");
        let input = ScriptedInput::new().hold(Button::Right, 8);
        let mut director = director(&graph, input, 12);

        director.run().expect("run");

        let player = director.stage().player().expect("player");
        assert_eq!(player.tile(&open_map()), TilePoint::new(2, 1));
        assert_eq!(player.direction(), Direction::Right);
        let sprite = director.host().sprite(player.sprite()).expect("sprite");
        assert_eq!(sprite.desc.frame, 2);
        assert!(!sprite.desc.flip);
    }

    #[test]
    fn player_sprite_uses_spawn_z() {
        let mut builder = GraphBuilder::new();
        builder.variable("layer", 3);
        let mut spawn = PlayerSpawn::at(1, 1);
        spawn.z = Expression::variable("layer");
        builder.scene(Scene::new("field").with_map(open_map()).with_player(spawn));
        let graph = builder.build().expect("graph");
        let mut director = director(&graph, ScriptedInput::new(), 2);

        director.enter_scene("field").expect("enter");

        let player = director.stage().player().expect("player");
        let sprite = director.host().sprite(player.sprite()).expect("sprite");
        assert_eq!(sprite.desc.z_order, 3);
    }

    #[test]
    fn blocked_step_turns_and_ticks_one_frame() {
        let mut builder = GraphBuilder::new();
        let cells = vec![0, 1, 0, 0, 0, 0];
        builder.scene(
            Scene::new("field")
                .with_map(Map::new(3, 2, 16, cells).expect("map"))
                .with_player(PlayerSpawn::at(0, 0))
                .with_actor(ActorDef::new("rock", 0, 1)),
        );
        let graph = builder.build().expect("graph");
        let input = ScriptedInput::new().hold(Button::Right, 2).hold(Button::Down, 2);
        let mut director = director(&graph, input, 6);

        director.run().expect("run");

        let player = director.stage().player().expect("player");
        assert_eq!(player.position(), PixelPoint::new(0, 0));
        assert_eq!(player.direction(), Direction::Down);
    }

    #[test]
    fn sensor_events_run_after_stepping_onto_tile() {
        let mut builder = GraphBuilder::new();
        let door = builder.list(vec![go_to("house", 4, 4, Direction::Down)]);
        builder
            .scene(
                Scene::new("field").with_player(PlayerSpawn::at(1, 1)).with_map(
                    open_map().with_sensor(Sensor::new(1, 2, 1, 1, door)),
                ),
            )
            .scene(
                Scene::new("house")
                    .with_map(open_map())
                    .with_player(PlayerSpawn::at(0, 0)),
            );
        let graph = builder.build().expect("graph");
        let input = ScriptedInput::new().hold(Button::Down, 20);
        let mut director = director(&graph, input, 11);

        let summary = director.run().expect("run");

        assert_eq!(summary.scenes_entered, 2);
        assert_eq!(summary.last_scene, "house");
        let player = director.stage().player().expect("player");
        assert_eq!(player.tile(&open_map()), TilePoint::new(4, 4));
    }

    #[test]
    fn activate_turns_actor_and_runs_interaction() {
        let mut builder = GraphBuilder::new();
        builder.variable("talked", false);
        let talk = builder.list(vec![set("talked", true)]);
        builder.scene(
            Scene::new("field")
                .with_map(open_map())
                .with_player(PlayerSpawn::at(1, 1).facing(Direction::Right))
                .with_actor(
                    ActorDef::new("guard", 2, 1)
                        .facing(Direction::Down)
                        .on_interact(talk),
                ),
        );
        let graph = builder.build().expect("graph");
        let input = ScriptedInput::new().tap(Button::Activate);
        let mut director = director(&graph, input, 4);

        director.run().expect("run");

        assert_eq!(
            director.variables().get("talked").map(Value::as_bool),
            Ok(true)
        );
        let guard = director.stage().actor("guard").expect("guard");
        assert_eq!(guard.direction(), Direction::Left);
    }

    #[test]
    fn fades_toggle_entity_blending() {
        let mut builder = GraphBuilder::new();
        let events = builder.list(vec![
            Event::FadeIn {
                duration: Expression::literal(64),
            },
            Event::FadeOut {
                duration: Expression::literal(32),
            },
        ]);
        builder.scene(
            Scene::new("field")
                .with_map(open_map())
                .with_player(PlayerSpawn::at(1, 1))
                .with_actor(ActorDef::new("guard", 2, 1))
                .with_events(events),
        );
        let graph = builder.build().expect("graph");
        let mut director = director(&graph, ScriptedInput::new(), 20);

        director.enter_scene("field").expect("enter");

        assert_eq!(director.host().frame(), 6);
        assert!(director
            .host()
            .live_sprites()
            .all(|(_, record)| record.blending));
        assert_eq!(director.host().blend_alpha(), 1.0);
        assert!(!director.stage().background().visible);
    }

    #[test]
    fn undeclared_write_in_frame_loop_is_fatal() {
        let mut builder = GraphBuilder::new();
        let update = builder.list(vec![set("nope", 1)]);
        builder.scene(Scene::new("yard").with_actor(ActorDef::new("a", 0, 0).on_update(update)));
        let graph = builder.build().expect("graph");
        let mut director = director(&graph, ScriptedInput::new(), 10);

        let result = director.run();
        assert!(matches!(
            result,
            Err(RuntimeError::Variable(VariableError::Undeclared { .. }))
        ));
    }
}
