use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::event::EventListId;

pub const DEFAULT_GRID_SIZE: i32 = 16;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct TilePoint {
    pub x: i32,
    pub y: i32,
}

impl TilePoint {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn offset(self, (dx, dy): (i32, i32)) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

/// Pixel coordinates. Map-space points have (0,0) at the map's top-left;
/// screen and camera points are centered on the map.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct PixelPoint {
    pub x: i32,
    pub y: i32,
}

impl PixelPoint {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sensor {
    #[serde(default)]
    pub id: String,
    pub x: i32,
    pub y: i32,
    #[serde(default = "one")]
    pub width: i32,
    #[serde(default = "one")]
    pub height: i32,
    #[serde(default)]
    pub events: EventListId,
}

impl Sensor {
    pub fn new(x: i32, y: i32, width: i32, height: i32, events: EventListId) -> Self {
        Self {
            id: String::new(),
            x,
            y,
            width,
            height,
            events,
        }
    }

    pub fn contains(&self, tile: TilePoint) -> bool {
        tile.x >= self.x
            && tile.x < self.x + self.width
            && tile.y >= self.y
            && tile.y < self.y + self.height
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MapError {
    #[error("collision count mismatch: expected {expected}, got {actual}")]
    CollisionCountMismatch { expected: usize, actual: usize },
    #[error("map dimensions must be non-negative, got {width}x{height}")]
    NegativeSize { width: i32, height: i32 },
    #[error("grid size must be positive, got {grid_size}")]
    InvalidGridSize { grid_size: i32 },
    #[error("collision cell {index} holds {value}; only 0 and 1 are allowed")]
    InvalidCell { index: usize, value: u8 },
}

/// Collision grid convention:
/// - cells are row-major, index `y * width + x`;
/// - a cell value of `1` blocks movement;
/// - every coordinate outside the grid blocks movement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Map {
    width: i32,
    height: i32,
    #[serde(default = "default_grid_size")]
    grid_size: i32,
    #[serde(default)]
    collisions: Vec<u8>,
    #[serde(default)]
    sensors: Vec<Sensor>,
}

impl Map {
    pub fn new(
        width: i32,
        height: i32,
        grid_size: i32,
        collisions: Vec<u8>,
    ) -> Result<Self, MapError> {
        let map = Self {
            width,
            height,
            grid_size,
            collisions,
            sensors: Vec::new(),
        };
        map.validate()?;
        Ok(map)
    }

    /// Open map with no blocked cells.
    pub fn open(width: i32, height: i32, grid_size: i32) -> Result<Self, MapError> {
        let cells = width.max(0) as usize * height.max(0) as usize;
        Self::new(width, height, grid_size, vec![0; cells])
    }

    pub fn with_sensor(mut self, sensor: Sensor) -> Self {
        self.sensors.push(sensor);
        self
    }

    pub fn validate(&self) -> Result<(), MapError> {
        if self.width < 0 || self.height < 0 {
            return Err(MapError::NegativeSize {
                width: self.width,
                height: self.height,
            });
        }
        if self.grid_size <= 0 {
            return Err(MapError::InvalidGridSize {
                grid_size: self.grid_size,
            });
        }
        let expected = self.width as usize * self.height as usize;
        let actual = self.collisions.len();
        if expected != actual {
            return Err(MapError::CollisionCountMismatch { expected, actual });
        }
        if let Some(index) = self.collisions.iter().position(|cell| *cell > 1) {
            return Err(MapError::InvalidCell {
                index,
                value: self.collisions[index],
            });
        }
        Ok(())
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn grid_size(&self) -> i32 {
        self.grid_size
    }

    pub fn sensors(&self) -> &[Sensor] {
        &self.sensors
    }

    pub fn pixel_width(&self) -> i32 {
        self.width * self.grid_size
    }

    pub fn pixel_height(&self) -> i32 {
        self.height * self.grid_size
    }

    pub fn to_pixel(&self, tile: TilePoint) -> PixelPoint {
        PixelPoint {
            x: tile.x * self.grid_size,
            y: tile.y * self.grid_size,
        }
    }

    pub fn to_tile(&self, pixel: PixelPoint) -> TilePoint {
        TilePoint {
            x: pixel.x.div_euclid(self.grid_size),
            y: pixel.y.div_euclid(self.grid_size),
        }
    }

    pub fn index_of(&self, tile: TilePoint) -> Option<usize> {
        if tile.x < 0 || tile.x >= self.width || tile.y < 0 || tile.y >= self.height {
            return None;
        }
        Some(tile.y as usize * self.width as usize + tile.x as usize)
    }

    pub fn has_collision(&self, tile: TilePoint) -> bool {
        match self.index_of(tile) {
            Some(index) => self.collisions.get(index).map_or(true, |cell| *cell == 1),
            None => true,
        }
    }

    pub fn sensor_at(&self, tile: TilePoint) -> Option<&Sensor> {
        self.sensors.iter().find(|sensor| sensor.contains(tile))
    }
}

fn default_grid_size() -> i32 {
    DEFAULT_GRID_SIZE
}

fn one() -> i32 {
    1
}
