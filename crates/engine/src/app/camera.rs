use super::config::RuntimeConfig;
use super::host::{Host, HostError};
use crate::content::{DirectionPriority, Map, PixelPoint, TilePoint};

/// Valid camera centers for a map. The camera origin is the middle of the map,
/// so each bound is half the map minus half the screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollBounds {
    pub min_x: i32,
    pub max_x: i32,
    pub min_y: i32,
    pub max_y: i32,
}

impl ScrollBounds {
    pub fn for_map(map: &Map, config: &RuntimeConfig) -> Self {
        let max_x = map.pixel_width() / 2 - config.screen_width / 2;
        let max_y = map.pixel_height() / 2 - config.screen_height / 2;
        Self {
            min_x: -max_x,
            max_x,
            min_y: -max_y,
            max_y,
        }
    }

    /// Applies the lower bound first, then the upper one. When a map is
    /// smaller than the screen the bounds cross and the upper one wins.
    pub fn clamp(&self, point: PixelPoint) -> PixelPoint {
        PixelPoint {
            x: point.x.max(self.min_x).min(self.max_x),
            y: point.y.max(self.min_y).min(self.max_y),
        }
    }

    /// Camera position that puts `tile` at the top-left of the screen.
    pub fn tile_target(&self, map: &Map, tile: TilePoint) -> PixelPoint {
        let pixel = map.to_pixel(tile);
        PixelPoint {
            x: self.min_x + pixel.x,
            y: self.min_y + pixel.y,
        }
    }
}

/// Camera center that tracks an entity whose top-left sits at `map_pixel`.
pub fn follow_target(map: &Map, bounds: &ScrollBounds, map_pixel: PixelPoint) -> PixelPoint {
    bounds.clamp(PixelPoint {
        x: map_pixel.x - map.pixel_width() / 2,
        y: map_pixel.y - map.pixel_height() / 2,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CameraMove {
    pub target: PixelPoint,
    pub frames: u32,
    pub allow_diagonal: bool,
    pub priority: DirectionPriority,
}

/// Pans from `start` to the clamped target, advancing one frame per step.
/// Returns the final camera position.
pub fn pan_to(
    host: &mut dyn Host,
    start: PixelPoint,
    bounds: &ScrollBounds,
    movement: CameraMove,
) -> Result<PixelPoint, HostError> {
    let end = bounds.clamp(movement.target);
    if movement.frames == 0 {
        host.set_camera_position(end);
        return Ok(end);
    }

    let delta_x = end.x - start.x;
    let delta_y = end.y - start.y;

    if movement.allow_diagonal {
        for step in 1..=movement.frames {
            host.set_camera_position(PixelPoint {
                x: lerp(start.x, delta_x, step, movement.frames),
                y: lerp(start.y, delta_y, step, movement.frames),
            });
            host.advance_frame()?;
        }
    } else {
        let total = delta_x.unsigned_abs() + delta_y.unsigned_abs();
        let horizontal_frames = if total == 0 {
            0
        } else {
            (movement.frames as u64 * delta_x.unsigned_abs() as u64 / total as u64) as u32
        };
        let vertical_frames = movement.frames - horizontal_frames;

        match movement.priority {
            DirectionPriority::Horizontal => {
                pan_axis(host, horizontal_frames, delta_x, |step, frames| PixelPoint {
                    x: lerp(start.x, delta_x, step, frames),
                    y: start.y,
                })?;
                pan_axis(host, vertical_frames, delta_y, |step, frames| PixelPoint {
                    x: end.x,
                    y: lerp(start.y, delta_y, step, frames),
                })?;
            }
            DirectionPriority::Vertical => {
                pan_axis(host, vertical_frames, delta_y, |step, frames| PixelPoint {
                    x: start.x,
                    y: lerp(start.y, delta_y, step, frames),
                })?;
                pan_axis(host, horizontal_frames, delta_x, |step, frames| PixelPoint {
                    x: lerp(start.x, delta_x, step, frames),
                    y: end.y,
                })?;
            }
        }
    }

    host.set_camera_position(end);
    Ok(end)
}

/// One sequential phase. Axes that do not move are skipped; axes that move
/// but got no frames of the split jump straight to their end.
fn pan_axis(
    host: &mut dyn Host,
    frames: u32,
    delta: i32,
    position_at: impl Fn(u32, u32) -> PixelPoint,
) -> Result<(), HostError> {
    if delta == 0 {
        return Ok(());
    }
    if frames == 0 {
        host.set_camera_position(position_at(1, 1));
        return Ok(());
    }
    for step in 1..=frames {
        host.set_camera_position(position_at(step, frames));
        host.advance_frame()?;
    }
    Ok(())
}

fn lerp(start: i32, delta: i32, step: u32, frames: u32) -> i32 {
    start + (delta as i64 * step as i64 / frames as i64) as i32
}
