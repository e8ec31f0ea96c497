use glam::Vec2;
use macroquad::texture::{draw_texture_ex, DrawTextureParams, Texture2D};
use spraydoom_core::{FloorKind, TileMap, WorldPoint};
use spraydoom_rendering::{Color, MarkerKind, Scene};

use crate::to_macroquad_color;

/// Fraction of the viewport width covered by the minimap.
const WIDTH_FRACTION: f32 = 0.28;
const MARGIN: f32 = 8.0;

const BACKGROUND: Color = Color::from_hex(0x061019);
const PLAYER: Color = Color::from_hex(0x39ff14);

/// Screen placement of the minimap.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct MinimapLayout {
    origin: Vec2,
    cell: f32,
    size: Vec2,
}

impl MinimapLayout {
    /// Places a `columns` x `rows` map in the top-left corner of the viewport.
    pub(crate) fn fit(
        columns: u32,
        rows: u32,
        viewport_x: f32,
        viewport_y: f32,
        viewport_width: f32,
    ) -> Self {
        let cell = viewport_width * WIDTH_FRACTION / columns.max(1) as f32;
        Self {
            origin: Vec2::new(viewport_x + MARGIN, viewport_y + MARGIN),
            cell,
            size: Vec2::new(columns as f32, rows as f32) * cell,
        }
    }

    /// Screen position of a world point.
    pub(crate) fn project(&self, point: WorldPoint) -> Vec2 {
        self.origin + Vec2::new(point.x, point.y) * self.cell
    }
}

/// RGBA bytes with one pixel per map cell.
pub(crate) fn floor_plan_pixels(map: &TileMap) -> Vec<u8> {
    map.cells()
        .flat_map(|cell| {
            let color = match (map.wall(cell), map.floor(cell)) {
                (Some(wall), _) if wall.is_solid() => 0xaa3333,
                (_, Some(FloorKind::Sidewalk)) => 0xb6c1c7,
                (_, Some(FloorKind::Park)) => 0x1f4d1f,
                (_, Some(FloorKind::CrosswalkVertical | FloorKind::CrosswalkHorizontal)) => {
                    0xf6f6f6
                }
                (_, Some(FloorKind::Road) | None) => 0x1b1f24,
            };
            [(color >> 16) as u8, (color >> 8) as u8, color as u8, 255]
        })
        .collect()
}

/// Colour of a minimap marker.
pub(crate) fn marker_color(kind: MarkerKind) -> Color {
    match kind {
        MarkerKind::Tag { completed: true } => Color::from_hex(0x39ff14),
        MarkerKind::Tag { completed: false } => Color::from_hex(0xffcc00),
        MarkerKind::Civilian => Color::from_hex(0xffffff),
        MarkerKind::Police | MarkerKind::PoliceCar => Color::from_hex(0x2d3cff),
        MarkerKind::CivilianCar => Color::from_hex(0xff66aa),
    }
}

fn marker_radius(kind: MarkerKind, cell: f32) -> f32 {
    match kind {
        MarkerKind::Tag { .. } => cell * 0.45,
        MarkerKind::CivilianCar | MarkerKind::PoliceCar => cell * 0.7,
        MarkerKind::Civilian | MarkerKind::Police => cell * 0.5,
    }
}

pub(crate) fn draw_minimap(floor_plan: Texture2D, layout: &MinimapLayout, scene: &Scene) {
    macroquad::shapes::draw_rectangle(
        layout.origin.x - 2.0,
        layout.origin.y - 2.0,
        layout.size.x + 4.0,
        layout.size.y + 4.0,
        to_macroquad_color(BACKGROUND),
    );
    draw_texture_ex(
        floor_plan,
        layout.origin.x,
        layout.origin.y,
        macroquad::color::WHITE,
        DrawTextureParams {
            dest_size: Some(macroquad::math::Vec2::new(layout.size.x, layout.size.y)),
            ..DrawTextureParams::default()
        },
    );

    for marker in &scene.markers {
        let at = layout.project(marker.position);
        macroquad::shapes::draw_circle(
            at.x,
            at.y,
            marker_radius(marker.kind, layout.cell).max(1.0),
            to_macroquad_color(marker_color(marker.kind)),
        );
    }

    let player = layout.project(scene.player.position);
    let nose = player + Vec2::from_angle(scene.player.heading) * layout.cell * 2.0;
    let color = to_macroquad_color(PLAYER);
    macroquad::shapes::draw_circle(player.x, player.y, (layout.cell * 0.6).max(1.5), color);
    macroquad::shapes::draw_line(player.x, player.y, nose.x, nose.y, 1.5, color);
}
