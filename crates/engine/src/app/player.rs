use tracing::debug;

use super::actor::{facing_frame, world_position};
use super::camera::{follow_target, ScrollBounds};
use super::executor::{Context, RuntimeError};
use super::host::{Host, SpriteDesc, SpriteHandle};
use super::input::Button;
use crate::content::{Direction, EventListId, Map, PixelPoint, SpriteSheet, TilePoint};

const WALK_DOWN: [u32; 4] = [4, 0, 5, 0];
const WALK_UP: [u32; 4] = [6, 1, 7, 1];
const WALK_SIDE: [u32; 4] = [8, 2, 9, 2];

/// Looping four-frame walk cycle that moves on every `wait`-th tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WalkAnimation {
    frames: [u32; 4],
    wait: u32,
    counter: u32,
    index: usize,
}

impl WalkAnimation {
    pub fn new(direction: Direction, wait: u32) -> Self {
        let frames = match direction {
            Direction::Down => WALK_DOWN,
            Direction::Up => WALK_UP,
            Direction::Left | Direction::Right => WALK_SIDE,
        };
        Self {
            frames,
            wait: wait.max(1),
            counter: 0,
            index: 0,
        }
    }

    pub fn tick(&mut self, host: &mut dyn Host, sprite: SpriteHandle) {
        if self.counter == 0 {
            host.set_sprite_frame(sprite, self.frames[self.index]);
            self.index = (self.index + 1) % self.frames.len();
        }
        self.counter = (self.counter + 1) % self.wait;
    }
}

/// The controllable character. `position` is the map-space top-left pixel and
/// stays grid aligned between steps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    position: PixelPoint,
    direction: Direction,
    sheet: SpriteSheet,
    sprite: SpriteHandle,
}

impl Player {
    pub fn spawn(
        host: &mut dyn Host,
        map: &Map,
        sheet: &SpriteSheet,
        tile: TilePoint,
        direction: Direction,
        z_order: i32,
    ) -> Self {
        let position = map.to_pixel(tile);
        let (frame, flip) = facing_frame(direction);
        let sprite = host.create_sprite(&SpriteDesc {
            sheet: sheet.name.clone(),
            width: sheet.width,
            height: sheet.height,
            position: world_position(Some(map), position, sheet),
            z_order,
            frame,
            flip,
            visible: true,
        });
        Self {
            position,
            direction,
            sheet: sheet.clone(),
            sprite,
        }
    }

    pub fn position(&self) -> PixelPoint {
        self.position
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn sprite(&self) -> SpriteHandle {
        self.sprite
    }

    pub fn tile(&self, map: &Map) -> TilePoint {
        map.to_tile(self.position)
    }

    pub fn face(&mut self, host: &mut dyn Host, direction: Direction) {
        self.direction = direction;
        let (frame, flip) = facing_frame(direction);
        host.set_sprite_frame(self.sprite, frame);
        host.set_sprite_flip(self.sprite, flip);
    }

    fn place(&mut self, host: &mut dyn Host, map: &Map, position: PixelPoint) {
        self.position = position;
        host.set_sprite_position(self.sprite, world_position(Some(map), position, &self.sheet));
    }

    pub fn despawn(self, host: &mut dyn Host) {
        host.destroy_sprite(self.sprite);
    }
}

impl<'a, 'g> Context<'a, 'g> {
    /// One frame of player control: interaction first, then at most one
    /// horizontal and one vertical walk.
    pub(crate) fn update_player(&mut self) -> Result<(), RuntimeError> {
        let Some(map) = self.stage.map() else {
            return Ok(());
        };
        let Some(player) = self.stage.player.as_ref() else {
            return Ok(());
        };

        if self.pressed(Button::Activate) {
            let facing = player.direction();
            if let Some(index) = self.stage.actor_at(player.tile(map), facing) {
                let interact = self.stage.actors[index].def().interact;
                if !self.graph.events(interact).is_empty() {
                    debug!(actor = %self.stage.actors[index].def().name, "actor_interaction");
                    self.stage.actors[index].set_direction(&mut *self.host, facing.opposite());
                    self.execute_list(interact, true)?;
                    return self.advance();
                }
            }
        }

        if self.pressed(Button::Left) || self.held(Button::Left) {
            self.walk(map, Direction::Left)?;
        } else if self.pressed(Button::Right) || self.held(Button::Right) {
            self.walk(map, Direction::Right)?;
        }

        if self.pressed(Button::Up) || self.held(Button::Up) {
            self.walk(map, Direction::Up)?;
        } else if self.pressed(Button::Down) || self.held(Button::Down) {
            self.walk(map, Direction::Down)?;
        }
        Ok(())
    }

    /// Faces `direction` and keeps stepping while its button is held.
    fn walk(&mut self, map: &'g Map, direction: Direction) -> Result<(), RuntimeError> {
        let Some(player) = self.stage.player.as_mut() else {
            return Ok(());
        };
        player.face(&mut *self.host, direction);
        let sprite = player.sprite();

        let button = direction.button();
        if !self.held(button) {
            return Ok(());
        }

        let mut animation = WalkAnimation::new(direction, self.config.walk_animation_wait);
        while self.held(button) && !self.stage.scene_changed() {
            self.step(map, direction, &mut animation, sprite)?;
        }

        if let Some(player) = self.stage.player.as_mut() {
            player.face(&mut *self.host, direction);
        }
        Ok(())
    }

    /// Moves one grid cell, or plays a single animation tick when the
    /// destination is blocked.
    fn step(
        &mut self,
        map: &'g Map,
        direction: Direction,
        animation: &mut WalkAnimation,
        sprite: SpriteHandle,
    ) -> Result<(), RuntimeError> {
        let Some(start) = self.stage.player.as_ref().map(Player::position) else {
            return Ok(());
        };
        let destination = map.to_tile(start).offset(direction.offset());

        if map.has_collision(destination) || self.stage.actor_collides(destination) {
            animation.tick(&mut *self.host, sprite);
            return self.advance();
        }

        let bounds = ScrollBounds::for_map(map, self.config);
        let speed = self.config.player_speed.max(1);
        let (dx, dy) = direction.offset();
        let mut position = start;
        let mut moved = 0;
        while moved < map.grid_size() {
            position = PixelPoint::new(position.x + dx * speed, position.y + dy * speed);
            if let Some(player) = self.stage.player.as_mut() {
                player.place(&mut *self.host, map, position);
            }
            self.stage.camera = follow_target(map, &bounds, position);
            self.host.set_camera_position(self.stage.camera);
            moved += speed;
            animation.tick(&mut *self.host, sprite);
            self.advance()?;
        }

        if let Some(sensor) = map.sensor_at(destination) {
            if sensor.events != EventListId::EMPTY {
                debug!(x = destination.x, y = destination.y, "sensor_triggered");
                self.execute_list(sensor.events, true)?;
                animation.tick(&mut *self.host, sprite);
                self.advance()?;
            }
        }
        Ok(())
    }
}
