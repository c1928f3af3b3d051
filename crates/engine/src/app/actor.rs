use tracing::debug;

use super::host::{Host, SpriteDesc, SpriteHandle};
use super::variables::VariableRegistry;
use crate::content::{ActorDef, Direction, Map, PixelPoint, SpriteDef, SpriteSheet, TilePoint};

pub const IDLE_FRAME_DOWN: u32 = 0;
pub const IDLE_FRAME_UP: u32 = 1;
pub const IDLE_FRAME_SIDE: u32 = 2;

/// Idle tile frame for a facing direction. Left reuses the side frame
/// mirrored.
pub fn facing_frame(direction: Direction) -> (u32, bool) {
    match direction {
        Direction::Down => (IDLE_FRAME_DOWN, false),
        Direction::Up => (IDLE_FRAME_UP, false),
        Direction::Right => (IDLE_FRAME_SIDE, false),
        Direction::Left => (IDLE_FRAME_SIDE, true),
    }
}

/// Converts a map-space top-left pixel into the world-space sprite center.
pub fn world_position(map: Option<&Map>, map_pixel: PixelPoint, sheet: &SpriteSheet) -> PixelPoint {
    let (map_width, map_height) = map.map_or((0, 0), |map| (map.pixel_width(), map.pixel_height()));
    PixelPoint {
        x: map_pixel.x - map_width / 2 + sheet.width / 2,
        y: map_pixel.y - map_height / 2 + sheet.height / 2,
    }
}

fn tile_pixel(map: Option<&Map>, tile: TilePoint) -> PixelPoint {
    match map {
        Some(map) => map.to_pixel(tile),
        None => PixelPoint::new(0, 0),
    }
}

/// Live instance of an [`ActorDef`] for the current scene.
#[derive(Debug, Clone)]
pub struct Actor<'g> {
    def: &'g ActorDef,
    tile: TilePoint,
    direction: Direction,
    visible: bool,
    sprite: SpriteHandle,
}

impl<'g> Actor<'g> {
    pub fn spawn(
        def: &'g ActorDef,
        map: Option<&Map>,
        variables: &VariableRegistry,
        host: &mut dyn Host,
    ) -> Self {
        let tile = TilePoint::new(def.x.as_int(variables), def.y.as_int(variables));
        let (frame, flip) = facing_frame(def.direction);
        let sprite = host.create_sprite(&SpriteDesc {
            sheet: def.sprite.name.clone(),
            width: def.sprite.width,
            height: def.sprite.height,
            position: world_position(map, tile_pixel(map, tile), &def.sprite),
            z_order: def.z.as_int(variables),
            frame,
            flip,
            visible: true,
        });
        debug!(actor = %def.name, x = tile.x, y = tile.y, "actor_spawned");
        Self {
            def,
            tile,
            direction: def.direction,
            visible: true,
            sprite,
        }
    }

    pub fn def(&self) -> &'g ActorDef {
        self.def
    }

    pub fn tile(&self) -> TilePoint {
        self.tile
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn sprite(&self) -> SpriteHandle {
        self.sprite
    }

    pub fn is(&self, name: &str) -> bool {
        self.def.is(name)
    }

    /// Hidden actors neither block movement nor respond to interaction.
    pub fn collides(&self, tile: TilePoint) -> bool {
        self.visible && self.tile == tile
    }

    pub fn set_direction(&mut self, host: &mut dyn Host, direction: Direction) {
        self.direction = direction;
        let (frame, flip) = facing_frame(direction);
        host.set_sprite_frame(self.sprite, frame);
        host.set_sprite_flip(self.sprite, flip);
    }

    pub fn set_visible(&mut self, host: &mut dyn Host, visible: bool) {
        self.visible = visible;
        host.set_sprite_visible(self.sprite, visible);
    }

    pub fn despawn(self, host: &mut dyn Host) {
        host.destroy_sprite(self.sprite);
    }
}

/// Standalone scene decoration with no behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Prop {
    sprite: SpriteHandle,
}

impl Prop {
    pub fn spawn(
        def: &SpriteDef,
        map: Option<&Map>,
        variables: &VariableRegistry,
        host: &mut dyn Host,
    ) -> Self {
        let tile = TilePoint::new(def.x.as_int(variables), def.y.as_int(variables));
        let sprite = host.create_sprite(&SpriteDesc {
            sheet: def.sprite.name.clone(),
            width: def.sprite.width,
            height: def.sprite.height,
            position: world_position(map, tile_pixel(map, tile), &def.sprite),
            z_order: def.z.as_int(variables),
            frame: 0,
            flip: false,
            visible: true,
        });
        Self { sprite }
    }

    pub fn sprite(&self) -> SpriteHandle {
        self.sprite
    }

    pub fn despawn(self, host: &mut dyn Host) {
        host.destroy_sprite(self.sprite);
    }
}
