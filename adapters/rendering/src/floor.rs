use spraydoom_core::{CellCoord, FloorKind, TileMap, WorldPoint};

use crate::{Camera, FrameBuffer, ImageKey, TextureProvider};

/// Row distance at which the floor reaches its darkest shade.
const SHADE_DISTANCE: f32 = 14.0;

/// Darkest shade applied to distant floor rows.
const MAX_SHADE: f32 = 0.6;

/// Paints every row below the horizon with the textured city floor.
///
/// Cells outside the map render as road. Returns the number of texels that
/// could not be sampled and were left untouched.
pub(crate) fn cast_floor<T: TextureProvider>(
    map: &TileMap,
    camera: &Camera,
    textures: &T,
    frame: &mut FrameBuffer,
) -> u32 {
    let (width, height) = (frame.width(), frame.height());
    let horizon = height / 2;
    let eye_height = 0.5 * height as f32;
    let left_ray = camera.direction() - camera.plane();
    let right_ray = camera.direction() + camera.plane();
    let mut skipped = 0;

    for y in horizon..height {
        let offset = (y - horizon).max(1) as f32;
        let row_distance = eye_height / offset;
        let step = (right_ray - left_ray) * (row_distance / width as f32);
        let mut sample = camera.position() + left_ray * row_distance;
        let shade = (row_distance / SHADE_DISTANCE).clamp(0.0, MAX_SHADE);

        for x in 0..width {
            let cell = CellCoord::containing(WorldPoint::new(sample.x, sample.y));
            let floor = map.floor(cell).unwrap_or(FloorKind::Road);
            let u = sample.x - cell.column() as f32;
            let v = sample.y - cell.row() as f32;
            match textures.sample_uv(ImageKey::Floor(floor), u, v) {
                Ok(texel) => frame.set(x, y, texel.darken(shade)),
                Err(_) => skipped += 1,
            }
            sample += step;
        }
    }
    skipped
}
