#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Procedural city generator producing the static tile grid of a session.
//!
//! The city is a lattice of square blocks separated by road corridors. Every
//! block is ringed by sidewalk and holds either a park or a walled building
//! whose outer faces carry graffiti tag targets. Crosswalks are sprinkled over
//! a few four-way road cells afterwards, and a sidewalk spawn point is chosen
//! for the player. All randomness comes from the supplied [`SimRng`].

use spraydoom_core::{
    CellCoord, Face, FloorKind, SimRng, Tag, TagColor, TagId, TileMap, WallKind, WorldPoint,
};
use thiserror::Error;

/// Width of the sidewalk ring around each block, in tiles.
pub const SIDEWALK_WIDTH: i32 = 1;
/// Width of every road corridor, in tiles.
pub const ROAD_WIDTH: i32 = 4;
/// Side length of the building or park inside each block, in tiles.
pub const BUILDING_WIDTH: i32 = 6;

const BLOCK_SPAN: i32 = BUILDING_WIDTH + 2 * SIDEWALK_WIDTH;
const PARK_PROBABILITY: f32 = 0.16;
const CROSSWALK_PROBABILITY: f32 = 0.08;
const CROSSWALK_CLEARANCE: i32 = 3;
const CROSSWALK_MARGIN: i32 = 2;
const SPAWN_MARGIN: i32 = 4;
const SPAWN_SEARCH_LIMIT: u32 = 5_000;
const TAG_INSET: f32 = 0.1;
const BLOCK_COLUMN_RANGE: (i32, i32) = (6, 9);
const BLOCK_ROW_RANGE: (i32, i32) = (5, 7);

/// Number of blocks laid out along each axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CityConfig {
    block_columns: u32,
    block_rows: u32,
}

impl CityConfig {
    /// Creates a configuration with an explicit block lattice.
    #[must_use]
    pub const fn new(block_columns: u32, block_rows: u32) -> Self {
        Self {
            block_columns,
            block_rows,
        }
    }

    /// Draws the session's block lattice from the shared stream.
    pub fn random(rng: &mut SimRng) -> Self {
        let columns = rng.range_inclusive(BLOCK_COLUMN_RANGE.0, BLOCK_COLUMN_RANGE.1);
        let rows = rng.range_inclusive(BLOCK_ROW_RANGE.0, BLOCK_ROW_RANGE.1);
        Self::new(columns.unsigned_abs(), rows.unsigned_abs())
    }

    /// Number of blocks along the horizontal axis.
    #[must_use]
    pub const fn block_columns(&self) -> u32 {
        self.block_columns
    }

    /// Number of blocks along the vertical axis.
    #[must_use]
    pub const fn block_rows(&self) -> u32 {
        self.block_rows
    }

    /// Width of the generated map in tiles.
    #[must_use]
    pub const fn map_columns(&self) -> u32 {
        span_for(self.block_columns)
    }

    /// Height of the generated map in tiles.
    #[must_use]
    pub const fn map_rows(&self) -> u32 {
        span_for(self.block_rows)
    }
}

const fn span_for(blocks: u32) -> u32 {
    ROAD_WIDTH as u32 * (blocks + 1) + BLOCK_SPAN as u32 * blocks
}

/// Static city produced by the generator.
#[derive(Clone, Debug, PartialEq)]
pub struct City {
    /// Wall and floor layers.
    pub map: TileMap,
    /// Tag targets placed around building perimeters.
    pub tags: Vec<Tag>,
    /// Player spawn position at the centre of a sidewalk tile.
    pub spawn: WorldPoint,
    /// Intersection cells that seeded a crosswalk cluster.
    pub crosswalk_origins: Vec<CellCoord>,
}

/// Errors that can occur while generating a city.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CityGenError {
    /// At least one block is required along each axis.
    #[error("city needs at least one block per axis (received {columns}x{rows})")]
    EmptyLayout {
        /// Requested block columns.
        columns: u32,
        /// Requested block rows.
        rows: u32,
    },
    /// The requested lattice does not fit the signed tile index range.
    #[error("city of {columns}x{rows} blocks exceeds the supported map size")]
    Oversized {
        /// Requested block columns.
        columns: u32,
        /// Requested block rows.
        rows: u32,
    },
}

/// Deterministic city generator.
#[derive(Clone, Copy, Debug)]
pub struct CityGenerator {
    config: CityConfig,
}

impl CityGenerator {
    /// Creates a generator for the provided block lattice.
    #[must_use]
    pub const fn new(config: CityConfig) -> Self {
        Self { config }
    }

    /// Generates a city, drawing every random decision from `rng`.
    pub fn generate(&self, rng: &mut SimRng) -> Result<City, CityGenError> {
        let CityConfig {
            block_columns,
            block_rows,
        } = self.config;
        if block_columns == 0 || block_rows == 0 {
            return Err(CityGenError::EmptyLayout {
                columns: block_columns,
                rows: block_rows,
            });
        }
        if block_columns > 1_000 || block_rows > 1_000 {
            return Err(CityGenError::Oversized {
                columns: block_columns,
                rows: block_rows,
            });
        }

        let mut map = TileMap::new(self.config.map_columns(), self.config.map_rows());
        let mut tags = Vec::new();

        for block_row in 0..block_rows as i32 {
            for block_column in 0..block_columns as i32 {
                let origin = CellCoord::new(
                    ROAD_WIDTH + block_column * (BLOCK_SPAN + ROAD_WIDTH),
                    ROAD_WIDTH + block_row * (BLOCK_SPAN + ROAD_WIDTH),
                );
                lay_block(&mut map, &mut tags, origin, rng);
            }
        }

        let crosswalk_origins = place_crosswalks(&mut map, rng);
        let spawn = choose_spawn(&map, rng);

        log::debug!(
            "generated {}x{} city: {} tags, {} crosswalks, spawn ({:.1}, {:.1})",
            map.columns(),
            map.rows(),
            tags.len(),
            crosswalk_origins.len(),
            spawn.x,
            spawn.y
        );

        Ok(City {
            map,
            tags,
            spawn,
            crosswalk_origins,
        })
    }
}

fn lay_block(map: &mut TileMap, tags: &mut Vec<Tag>, origin: CellCoord, rng: &mut SimRng) {
    fill(map, origin, BLOCK_SPAN, BLOCK_SPAN, |map, cell| {
        map.set_floor(cell, FloorKind::Sidewalk);
    });

    let interior = origin.offset(SIDEWALK_WIDTH, SIDEWALK_WIDTH);
    if rng.chance(PARK_PROBABILITY) {
        fill(map, interior, BUILDING_WIDTH, BUILDING_WIDTH, |map, cell| {
            map.set_floor(cell, FloorKind::Park);
            map.set_wall(cell, WallKind::None);
        });
        return;
    }

    let material = WallKind::MATERIALS[rng.index(WallKind::MATERIALS.len())];
    fill(map, interior, BUILDING_WIDTH, BUILDING_WIDTH, |map, cell| {
        map.set_floor(cell, FloorKind::Sidewalk);
        map.set_wall(cell, material);
    });
    place_facade_tags(map, tags, interior, rng);
}

fn place_facade_tags(map: &TileMap, tags: &mut Vec<Tag>, interior: CellCoord, rng: &mut SimRng) {
    let left = interior.column() as f32;
    let top = interior.row() as f32;
    let far = BUILDING_WIDTH as f32;

    let facades = [
        (Face::North, 0),
        (Face::South, 1),
        (Face::West, 1),
        (Face::East, 0),
    ];
    for (face, start) in facades {
        let mut offset = start;
        while offset < BUILDING_WIDTH {
            let along = offset as f32 + 0.5;
            let (outside, position) = match face {
                Face::North => (
                    interior.offset(offset, -1),
                    WorldPoint::new(left + along, top - TAG_INSET),
                ),
                Face::South => (
                    interior.offset(offset, BUILDING_WIDTH),
                    WorldPoint::new(left + along, top + far + TAG_INSET),
                ),
                Face::West => (
                    interior.offset(-1, offset),
                    WorldPoint::new(left - TAG_INSET, top + along),
                ),
                Face::East => (
                    interior.offset(BUILDING_WIDTH, offset),
                    WorldPoint::new(left + far + TAG_INSET, top + along),
                ),
            };
            if map.contains(outside) {
                let hue = rng.range_inclusive(0, 359).unsigned_abs() as u16;
                let id = TagId::new(u32::try_from(tags.len()).unwrap_or(u32::MAX));
                tags.push(Tag {
                    id,
                    position,
                    face,
                    completed: false,
                    color: TagColor::from_hue(hue),
                });
            }
            offset += rng.range_inclusive(2, 4);
        }
    }
}

fn place_crosswalks(map: &mut TileMap, rng: &mut SimRng) -> Vec<CellCoord> {
    let columns = map.columns() as i32;
    let rows = map.rows() as i32;
    let mut origins = Vec::new();

    for row in CROSSWALK_MARGIN..rows - CROSSWALK_MARGIN {
        for column in CROSSWALK_MARGIN..columns - CROSSWALK_MARGIN {
            let cell = CellCoord::new(column, row);
            if !is_four_way_road(map, cell) {
                continue;
            }
            if !rng.chance(CROSSWALK_PROBABILITY) {
                continue;
            }
            if crosswalk_within(map, cell, CROSSWALK_CLEARANCE) {
                continue;
            }

            // The horizontal band claims the road first, so the vertical pass
            // only fills cells it left behind.
            for band in [FloorKind::CrosswalkHorizontal, FloorKind::CrosswalkVertical] {
                paint_band(map, cell, band);
            }
            origins.push(cell);
        }
    }

    origins
}

fn is_four_way_road(map: &TileMap, cell: CellCoord) -> bool {
    [(0, 0), (0, -1), (0, 1), (-1, 0), (1, 0)]
        .into_iter()
        .all(|(columns, rows)| map.floor(cell.offset(columns, rows)) == Some(FloorKind::Road))
}

fn crosswalk_within(map: &TileMap, center: CellCoord, radius: i32) -> bool {
    (-radius..=radius).any(|rows| {
        (-radius..=radius).any(|columns| {
            map.floor(center.offset(columns, rows))
                .is_some_and(FloorKind::is_crosswalk)
        })
    })
}

fn paint_band(map: &mut TileMap, center: CellCoord, band: FloorKind) {
    for rows in -1..=1 {
        for columns in -1..=1 {
            let cell = center.offset(columns, rows);
            if map.floor(cell) == Some(FloorKind::Road) {
                map.set_floor(cell, band);
            }
        }
    }
}

fn choose_spawn(map: &TileMap, rng: &mut SimRng) -> WorldPoint {
    let max_column = map.columns() as i32 - 1 - SPAWN_MARGIN;
    let max_row = map.rows() as i32 - 1 - SPAWN_MARGIN;
    let mut cell = CellCoord::new(CROSSWALK_MARGIN, CROSSWALK_MARGIN);

    for _ in 0..SPAWN_SEARCH_LIMIT {
        cell = CellCoord::new(
            rng.range_inclusive(SPAWN_MARGIN, max_column),
            rng.range_inclusive(SPAWN_MARGIN, max_row),
        );
        if map.wall(cell) == Some(WallKind::None) && map.floor(cell) == Some(FloorKind::Sidewalk)
        {
            return cell.center();
        }
    }

    log::warn!(
        "spawn search exhausted after {SPAWN_SEARCH_LIMIT} trials, using ({}, {})",
        cell.column(),
        cell.row()
    );
    cell.center()
}

fn fill(
    map: &mut TileMap,
    origin: CellCoord,
    width: i32,
    height: i32,
    mut paint: impl FnMut(&mut TileMap, CellCoord),
) {
    for rows in 0..height {
        for columns in 0..width {
            paint(map, origin.offset(columns, rows));
        }
    }
}
