use engine::{
    ActorDef, Button, Condition, Direction, DirectionPriority, Event, Expression, GraphBuilder,
    GraphError, Map, PlayerSpawn, Scene, SceneGraph, Sensor, SpriteDef, SpriteSheet,
    StartPosition, Value,
};

const VILLAGE: &str = "village";
const CELLAR: &str = "cellar";

/// Two connected scenes used when no compiled graph is supplied: a village
/// with a guard and a door sensor, and a cellar that pans the camera on entry.
pub(crate) fn demo_graph() -> Result<SceneGraph, GraphError> {
    let mut builder = GraphBuilder::new();
    builder.variable("met_guard", false);

    let pause = builder.list(vec![
        sound("menu_open"),
        Event::ShowDialog {
            text: "Paused".to_string(),
        },
    ]);
    builder.script("pause_menu", pause);

    let greet = builder.list(vec![
        Event::ShowDialog {
            text: "Halt! The cellar is below the old well.".to_string(),
        },
        Event::SetVariable {
            name: "met_guard".to_string(),
            value: Value::from(true),
        },
    ]);
    let remind = builder.list(vec![Event::ShowDialog {
        text: "Go on then.".to_string(),
    }]);
    let guard_talk = builder.list(vec![Event::If {
        conditions: vec![Condition::eq(
            Expression::variable("met_guard"),
            Expression::literal(false),
        )],
        then: greet,
        otherwise: remind,
    }]);

    let to_cellar = builder.list(vec![fade_out(), go_to(CELLAR, 1, 5, Direction::Right)]);
    let to_village = builder.list(vec![fade_out(), go_to(VILLAGE, 8, 8, Direction::Left)]);

    let open_pause_menu = builder.list(vec![Event::ExecuteScript {
        name: "pause_menu".to_string(),
    }]);
    let village_events = builder.list(vec![
        fade_in(),
        Event::PlayMusic {
            name: "village_theme".to_string(),
            volume: 80,
            looping: true,
        },
        Event::OnButtonPress {
            buttons: vec![Button::Start],
            events: open_pause_menu,
        },
    ]);

    let cellar_events = builder.list(vec![
        fade_in(),
        Event::StopMusic,
        Event::MoveCameraTo {
            x: Expression::literal(19),
            y: Expression::literal(0),
            duration: Expression::literal(500),
            allow_diagonal: false,
            direction_priority: DirectionPriority::Horizontal,
        },
        Event::Wait {
            duration: Expression::literal(250),
        },
        Event::MoveCameraTo {
            x: Expression::literal(0),
            y: Expression::literal(5),
            duration: Expression::literal(500),
            allow_diagonal: true,
            direction_priority: DirectionPriority::Horizontal,
        },
    ]);

    builder
        .scene(
            Scene::new(VILLAGE)
                .with_id("scene_village")
                .with_background("bg_village")
                .with_map(
                    Map::open(16, 12, 16)
                        .map_err(|source| GraphError::InvalidMap {
                            scene: VILLAGE.to_string(),
                            source,
                        })?
                        .with_sensor(Sensor::new(10, 8, 1, 1, to_cellar)),
                )
                .with_player(PlayerSpawn::at(8, 8).facing(Direction::Right).with_z(1))
                .with_actor(
                    ActorDef::new("guard", 8, 7)
                        .with_id("actor_guard")
                        .on_interact(guard_talk),
                )
                .with_sprite(SpriteDef::new("well", 11, 8, SpriteSheet::new("well")))
                .with_events(village_events),
        )
        .scene(
            Scene::new(CELLAR)
                .with_id("scene_cellar")
                .with_background("bg_cellar")
                .with_map(
                    Map::open(20, 12, 16)
                        .map_err(|source| GraphError::InvalidMap {
                            scene: CELLAR.to_string(),
                            source,
                        })?
                        .with_sensor(Sensor::new(0, 5, 1, 1, to_village)),
                )
                .with_player(PlayerSpawn::at(2, 5).with_z(1))
                .with_events(cellar_events),
        )
        .starting_scene(VILLAGE);
    builder.build()
}

fn fade_in() -> Event {
    Event::FadeIn {
        duration: Expression::literal(200),
    }
}

fn fade_out() -> Event {
    Event::FadeOut {
        duration: Expression::literal(200),
    }
}

fn sound(name: &str) -> Event {
    Event::PlaySound {
        name: name.to_string(),
        volume: 100,
        speed: 1.0,
        panning: 0,
        priority: 32767,
    }
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
