use log::debug;
use spraydoom_core::{Decal, EntityView, PlayerSnapshot, TileMap, WorldPoint};
use spraydoom_system_raycast::{cast_along, HitSide};

use crate::{
    billboards, floor, sprites, Camera, FrameBuffer, ImageKey, RenderingError, Texel,
    TextureProvider,
};

/// Colour painted above the horizon.
pub const SKY_COLOR: Texel = Texel::from_hex(0x0a0f16);

const WALL_SHADE_DISTANCE: f32 = 14.0;
const WALL_MAX_SHADE: f32 = 0.7;
const HORIZONTAL_FACE_SHADE: f32 = 0.06;

const MIST_OPACITY: f32 = 0.25;
const MIST_SCALE: f32 = 0.8;

/// World state needed to draw one first-person frame.
#[derive(Clone, Copy, Debug)]
pub struct RenderInput<'a> {
    /// Static city.
    pub map: &'a TileMap,
    /// Camera pose and resources.
    pub player: PlayerSnapshot,
    /// Every live entity.
    pub entities: &'a EntityView,
    /// Painted tags.
    pub decals: &'a [Decal],
    /// Whether the spray mist overlay is visible.
    pub spraying: bool,
}

/// Counters gathered while rendering a frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Texels left unpainted because the provider could not supply them.
    pub skipped_samples: u32,
    /// Billboards considered for drawing.
    pub billboards: usize,
}

/// Software raycaster drawing the first-person view into a [`FrameBuffer`].
#[derive(Clone, Debug)]
pub struct RaycastRenderer<T> {
    textures: T,
}

impl<T: TextureProvider> RaycastRenderer<T> {
    /// Creates a renderer sampling images from `textures`.
    #[must_use]
    pub fn new(textures: T) -> Self {
        Self { textures }
    }

    /// Texture provider used by the renderer.
    #[must_use]
    pub fn textures(&self) -> &T {
        &self.textures
    }

    /// Renders sky, floor, walls, sprites and the spray overlay in that order.
    ///
    /// Texels the provider cannot supply are skipped and counted instead of
    /// failing the frame; only an unusable camera pose is an error.
    pub fn render(
        &self,
        input: &RenderInput<'_>,
        frame: &mut FrameBuffer,
    ) -> Result<FrameStats, RenderingError> {
        let camera = Camera::new(input.player.position, input.player.heading)?;
        frame.reset_depth();
        frame.fill_rows(0, frame.height() / 2, SKY_COLOR);

        let mut skipped = floor::cast_floor(input.map, &camera, &self.textures, frame);
        skipped += self.draw_walls(input.map, &camera, frame);

        let sprites = billboards(input.entities, input.decals, input.player.position);
        skipped += sprites::project(&camera, &sprites, &self.textures, frame);

        if input.spraying {
            skipped += self.draw_mist(frame);
        }

        if skipped > 0 {
            debug!("skipped {skipped} texture samples while rendering frame");
        }

        Ok(FrameStats {
            skipped_samples: skipped,
            billboards: sprites.len(),
        })
    }

    fn draw_walls(&self, map: &TileMap, camera: &Camera, frame: &mut FrameBuffer) -> u32 {
        let (width, height) = (frame.width(), frame.height());
        let eye = camera.position();
        let origin = WorldPoint::new(eye.x, eye.y);
        let mut skipped = 0;

        for column in 0..width {
            let ray = camera.ray_for_column(column, width);
            let hit = cast_along(map, origin, ray.x, ray.y);
            frame.set_depth(column, hit.distance);

            let line_height = height as f32 / hit.distance;
            let top = height as f32 / 2.0 - line_height / 2.0;
            let first_row = top.max(0.0) as u32;
            let last_row = (top + line_height).clamp(0.0, height as f32) as u32;

            let mut shade = (hit.distance / WALL_SHADE_DISTANCE).clamp(0.0, WALL_MAX_SHADE);
            if hit.side == HitSide::Horizontal {
                shade += HORIZONTAL_FACE_SHADE;
            }

            let key = ImageKey::Wall(hit.wall);
            for row in first_row..last_row {
                let v = (row as f32 + 0.5 - top) / line_height;
                match self.textures.sample_uv(key, hit.texture_u, v) {
                    Ok(texel) => frame.set(column, row, texel.darken(shade)),
                    Err(_) => skipped += 1,
                }
            }
        }
        skipped
    }

    fn draw_mist(&self, frame: &mut FrameBuffer) -> u32 {
        let (width, height) = (frame.width() as f32, frame.height() as f32);
        let size = width.min(height) * MIST_SCALE;
        let left = width / 2.0 - size / 2.0;
        let top = height / 2.0 - size / 3.0;
        let mut skipped = 0;

        for row in top.max(0.0) as u32..(top + size).min(height) as u32 {
            for column in left.max(0.0) as u32..(left + size).min(width) as u32 {
                let u = (column as f32 + 0.5 - left) / size;
                let v = (row as f32 + 0.5 - top) / size;
                match self.textures.sample_uv(ImageKey::SprayMist, u, v) {
                    Ok(texel) => frame.blend(column, row, texel.faded(MIST_OPACITY)),
                    Err(_) => skipped += 1,
                }
            }
        }
        skipped
    }
}
