#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Grid ray casting shared by the renderer and by line-of-sight queries.
//!
//! Rays walk the wall grid cell by cell (DDA traversal) until they enter a
//! solid cell or leave the map. The map boundary behaves like an implicit
//! brick wall, so every cast reports a hit.

use spraydoom_core::{CellCoord, TileMap, WallKind, WorldPoint};

/// Hard cap on traversal steps for a single ray.
pub const MAX_STEPS: u32 = 2048;

/// Smallest distance ever reported for a hit.
pub const MIN_HIT_DISTANCE: f32 = 1.0e-4;

/// Slack subtracted from a target distance before comparing it with a hit.
pub const LINE_OF_SIGHT_SLACK: f32 = 0.1;

const DIRECTION_EPSILON: f32 = 1.0e-9;

/// Axis of the grid line a ray crossed when it hit a wall.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HitSide {
    /// The ray crossed a vertical grid line (an east or west face).
    Vertical,
    /// The ray crossed a horizontal grid line (a north or south face).
    Horizontal,
}

/// Result of casting a single ray.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RayHit {
    /// Perpendicular distance from the origin to the hit plane.
    pub distance: f32,
    /// Grid axis of the face that was hit.
    pub side: HitSide,
    /// Horizontal texture coordinate along the face in `0.0..=1.0`.
    pub texture_u: f32,
    /// Material of the wall that was hit.
    pub wall: WallKind,
    /// Cell holding the wall, possibly just outside the map.
    pub cell: CellCoord,
}

/// Casts a ray from `origin` along `angle` and reports the first wall hit.
#[must_use]
pub fn cast_ray(map: &TileMap, origin: WorldPoint, angle: f32) -> RayHit {
    cast_along(map, origin, angle.cos(), angle.sin())
}

/// Casts a ray along an explicit, not necessarily normalised, direction.
///
/// The returned distance is measured in multiples of the direction vector,
/// which for camera rays equals the distance along the view axis.
#[must_use]
pub fn cast_along(map: &TileMap, origin: WorldPoint, direction_x: f32, direction_y: f32) -> RayHit {
    let dir_x = non_zero(direction_x);
    let dir_y = non_zero(direction_y);

    let mut cell = CellCoord::containing(origin);
    let delta_x = (1.0 / dir_x).abs();
    let delta_y = (1.0 / dir_y).abs();

    let (step_x, mut side_x) = if dir_x < 0.0 {
        (-1, (origin.x - cell.column() as f32) * delta_x)
    } else {
        (1, (cell.column() as f32 + 1.0 - origin.x) * delta_x)
    };
    let (step_y, mut side_y) = if dir_y < 0.0 {
        (-1, (origin.y - cell.row() as f32) * delta_y)
    } else {
        (1, (cell.row() as f32 + 1.0 - origin.y) * delta_y)
    };

    let mut side = HitSide::Vertical;
    let mut wall = WallKind::Brick;
    for _ in 0..MAX_STEPS {
        if side_x < side_y {
            side_x += delta_x;
            cell = cell.offset(step_x, 0);
            side = HitSide::Vertical;
        } else {
            side_y += delta_y;
            cell = cell.offset(0, step_y);
            side = HitSide::Horizontal;
        }

        match map.wall(cell) {
            None => {
                wall = WallKind::Brick;
                break;
            }
            Some(found) if found.is_solid() => {
                wall = found;
                break;
            }
            Some(_) => {}
        }
    }

    let raw_distance = match side {
        HitSide::Vertical => {
            (cell.column() as f32 - origin.x + (1 - step_x) as f32 / 2.0) / dir_x
        }
        HitSide::Horizontal => (cell.row() as f32 - origin.y + (1 - step_y) as f32 / 2.0) / dir_y,
    };
    let distance = raw_distance.max(MIN_HIT_DISTANCE);

    let along_face = match side {
        HitSide::Vertical => origin.y + distance * dir_y,
        HitSide::Horizontal => origin.x + distance * dir_x,
    };
    let mut texture_u = along_face - along_face.floor();
    let mirrored = match side {
        HitSide::Vertical => dir_x > 0.0,
        HitSide::Horizontal => dir_y < 0.0,
    };
    if mirrored {
        texture_u = 1.0 - texture_u;
    }

    RayHit {
        distance,
        side,
        texture_u,
        wall,
        cell,
    }
}

/// Reports whether nothing solid stands between `from` and `to`.
#[must_use]
pub fn has_line_of_sight(map: &TileMap, from: WorldPoint, to: WorldPoint) -> bool {
    let target_distance = from.distance(to);
    let hit = cast_ray(map, from, from.bearing_to(to));
    hit.distance > target_distance - LINE_OF_SIGHT_SLACK
}

fn non_zero(component: f32) -> f32 {
    if component == 0.0 {
        DIRECTION_EPSILON
    } else {
        component
    }
}
