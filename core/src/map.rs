use serde::{Deserialize, Serialize};

use crate::{CellCoord, WorldPoint};

/// Wall material occupying a tile.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WallKind {
    /// Open tile without a wall.
    #[default]
    None,
    /// Red brick facade.
    Brick,
    /// Grey concrete facade.
    Concrete,
    /// Blue glass curtain wall.
    Glass,
}

impl WallKind {
    /// Building materials that can be assigned to a generated block.
    pub const MATERIALS: [WallKind; 3] = [WallKind::Brick, WallKind::Concrete, WallKind::Glass];

    /// Returns `true` when the tile holds a wall.
    #[must_use]
    pub const fn is_solid(self) -> bool {
        !matches!(self, WallKind::None)
    }
}

/// Ground surface classification of a tile.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FloorKind {
    /// Pedestrian sidewalk.
    Sidewalk,
    /// Asphalt road.
    #[default]
    Road,
    /// Open green park.
    Park,
    /// Crosswalk with stripes running along the vertical axis.
    CrosswalkVertical,
    /// Crosswalk with stripes running along the horizontal axis.
    CrosswalkHorizontal,
}

impl FloorKind {
    /// Returns `true` for surfaces vehicles may drive on.
    #[must_use]
    pub const fn is_drivable(self) -> bool {
        matches!(
            self,
            FloorKind::Road | FloorKind::CrosswalkVertical | FloorKind::CrosswalkHorizontal
        )
    }

    /// Returns `true` for crosswalk surfaces of either orientation.
    #[must_use]
    pub const fn is_crosswalk(self) -> bool {
        matches!(
            self,
            FloorKind::CrosswalkVertical | FloorKind::CrosswalkHorizontal
        )
    }
}

/// Dense wall and floor grids describing the static city.
///
/// Both layers share the same dimensions, fixed at construction. Lookups
/// outside the grid return `None` so ray casts and collision probes can step
/// past the edges without special casing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TileMap {
    columns: u32,
    rows: u32,
    walls: Vec<WallKind>,
    floors: Vec<FloorKind>,
}

impl TileMap {
    /// Creates a map of the provided size covered in road without walls.
    #[must_use]
    pub fn new(columns: u32, rows: u32) -> Self {
        let cells = usize::try_from(u64::from(columns) * u64::from(rows)).unwrap_or(0);
        Self {
            columns,
            rows,
            walls: vec![WallKind::None; cells],
            floors: vec![FloorKind::Road; cells],
        }
    }

    /// Number of tile columns in the map.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of tile rows in the map.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Total number of tiles in the map.
    #[must_use]
    pub fn area(&self) -> u32 {
        self.columns.saturating_mul(self.rows)
    }

    /// Reports whether the cell lies inside the map.
    #[must_use]
    pub fn contains(&self, cell: CellCoord) -> bool {
        self.index(cell).is_some()
    }

    /// Wall stored at the provided cell, or `None` outside the map.
    #[must_use]
    pub fn wall(&self, cell: CellCoord) -> Option<WallKind> {
        self.index(cell).map(|index| self.walls[index])
    }

    /// Floor stored at the provided cell, or `None` outside the map.
    #[must_use]
    pub fn floor(&self, cell: CellCoord) -> Option<FloorKind> {
        self.index(cell).map(|index| self.floors[index])
    }

    /// Floor under the provided world position, or `None` outside the map.
    #[must_use]
    pub fn floor_at(&self, point: WorldPoint) -> Option<FloorKind> {
        self.floor(CellCoord::containing(point))
    }

    /// Replaces the wall at the provided cell. Cells outside the map are ignored.
    pub fn set_wall(&mut self, cell: CellCoord, wall: WallKind) {
        if let Some(index) = self.index(cell) {
            self.walls[index] = wall;
        }
    }

    /// Replaces the floor at the provided cell. Cells outside the map are ignored.
    pub fn set_floor(&mut self, cell: CellCoord, floor: FloorKind) {
        if let Some(index) = self.index(cell) {
            self.floors[index] = floor;
        }
    }

    /// Iterates every cell in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = CellCoord> {
        let columns = i32::try_from(self.columns).unwrap_or(i32::MAX);
        let rows = i32::try_from(self.rows).unwrap_or(i32::MAX);
        (0..rows).flat_map(move |row| (0..columns).map(move |column| CellCoord::new(column, row)))
    }

    /// Row-major wall layer.
    #[must_use]
    pub fn walls(&self) -> &[WallKind] {
        &self.walls
    }

    /// Row-major floor layer.
    #[must_use]
    pub fn floors(&self) -> &[FloorKind] {
        &self.floors
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        let column = u32::try_from(cell.column()).ok()?;
        let row = u32::try_from(cell.row()).ok()?;
        if column >= self.columns || row >= self.rows {
            return None;
        }
        usize::try_from(u64::from(row) * u64::from(self.columns) + u64::from(column)).ok()
    }
}
