#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Spray Doom engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Systems read immutable world views
//! and respond with [`Command`] values, the world executes those commands via
//! its `apply` entry point, and then broadcasts [`Event`] values describing
//! what actually changed. Randomness flows through an explicit [`SimRng`]
//! so every session replays identically from its seed.

mod map;
mod rng;

use std::time::Duration;

use serde::{Deserialize, Serialize};

pub use map::{FloorKind, TileMap, WallKind};
pub use rng::SimRng;

/// Canonical title shown when the experience boots.
pub const WELCOME_BANNER: &str = "Spray Doom: NY'90s";

/// Upper bound shared by player health and spray resource.
pub const RESOURCE_MAX: f32 = 100.0;

/// Collision radius of the player.
pub const PLAYER_RADIUS: f32 = 0.25;

/// Collision radius of civilians and police officers.
pub const NPC_RADIUS: f32 = 0.25;

/// Collision radius of vehicles.
pub const VEHICLE_RADIUS: f32 = 0.35;

/// Number of civilian outfits the presentation layer can draw.
pub const OUTFIT_VARIANTS: u8 = 4;

/// Number of civilian car paint jobs the presentation layer can draw.
pub const PAINT_VARIANTS: u8 = 6;

/// Continuous position in world units where one tile spans one unit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct WorldPoint {
    /// Horizontal coordinate growing toward the east.
    pub x: f32,
    /// Vertical coordinate growing toward the south.
    pub y: f32,
}

impl WorldPoint {
    /// Creates a new world position.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Squared Euclidean distance to another point.
    #[must_use]
    pub fn distance_squared(self, other: WorldPoint) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    /// Euclidean distance to another point.
    #[must_use]
    pub fn distance(self, other: WorldPoint) -> f32 {
        self.distance_squared(other).sqrt()
    }

    /// Angle of the vector pointing from `self` toward `other`.
    #[must_use]
    pub fn bearing_to(self, other: WorldPoint) -> f32 {
        (other.y - self.y).atan2(other.x - self.x)
    }

    /// Point reached by travelling `length` units along `heading`.
    #[must_use]
    pub fn advanced(self, heading: f32, length: f32) -> Self {
        Self {
            x: self.x + heading.cos() * length,
            y: self.y + heading.sin() * length,
        }
    }
}

/// Location of a single tile expressed as signed column and row indices.
///
/// Signed indices let probes step outside the map; the map itself rejects
/// anything out of range.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: i32,
    row: i32,
}

impl CellCoord {
    /// Creates a new cell coordinate.
    #[must_use]
    pub const fn new(column: i32, row: i32) -> Self {
        Self { column, row }
    }

    /// Cell containing the provided world position.
    #[must_use]
    pub fn containing(point: WorldPoint) -> Self {
        Self {
            column: point.x.floor() as i32,
            row: point.y.floor() as i32,
        }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> i32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> i32 {
        self.row
    }

    /// World position of the cell's centre.
    #[must_use]
    pub fn center(&self) -> WorldPoint {
        WorldPoint::new(self.column as f32 + 0.5, self.row as f32 + 0.5)
    }

    /// Cell displaced by the provided offsets.
    #[must_use]
    pub const fn offset(&self, columns: i32, rows: i32) -> Self {
        Self {
            column: self.column + columns,
            row: self.row + rows,
        }
    }

    /// Chebyshev (king-move) distance between two cells.
    #[must_use]
    pub fn chebyshev_distance(self, other: CellCoord) -> u32 {
        self.column
            .abs_diff(other.column)
            .max(self.row.abs_diff(other.row))
    }
}

/// Side of a building a tag is painted on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Face {
    /// Facade facing decreasing rows.
    North,
    /// Facade facing increasing rows.
    South,
    /// Facade facing increasing columns.
    East,
    /// Facade facing decreasing columns.
    West,
}

impl Face {
    /// Unit vector pointing away from the facade.
    #[must_use]
    pub const fn normal(self) -> (f32, f32) {
        match self {
            Face::North => (0.0, -1.0),
            Face::South => (0.0, 1.0),
            Face::East => (1.0, 0.0),
            Face::West => (-1.0, 0.0),
        }
    }
}

/// Unique identifier assigned to a tag target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TagId(u32);

impl TagId {
    /// Creates a new tag identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a simulated entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(u32);

impl EntityId {
    /// Creates a new entity identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Display colour of a tag expressed as a hue in degrees.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TagColor {
    hue: u16,
}

impl TagColor {
    /// Creates a colour from a hue, wrapped into `0..360`.
    #[must_use]
    pub const fn from_hue(hue: u16) -> Self {
        Self { hue: hue % 360 }
    }

    /// Hue of the colour in degrees.
    #[must_use]
    pub const fn hue(&self) -> u16 {
        self.hue
    }
}

/// Graffiti target painted on a building perimeter.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    /// Identifier assigned at generation time.
    pub id: TagId,
    /// World position just outside the facade.
    pub position: WorldPoint,
    /// Facade the tag belongs to.
    pub face: Face,
    /// Whether the player has completed the tag.
    pub completed: bool,
    /// Display colour used by the presentation layer.
    pub color: TagColor,
}

/// Artwork painted when a tag is completed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DecalStyle {
    /// "NY90" throw-up.
    Ny90,
    /// "DOOM" throw-up.
    Doom,
}

/// Painted mark left behind by a completed tag.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Decal {
    /// World position of the billboard.
    pub position: WorldPoint,
    /// Artwork drawn for the decal.
    pub style: DecalStyle,
}

/// Read-only snapshot of the player.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlayerSnapshot {
    /// Current world position.
    pub position: WorldPoint,
    /// Facing angle in radians.
    pub heading: f32,
    /// Remaining hit points in `0..=100`.
    pub health: f32,
    /// Remaining spray resource in `0..=100`.
    pub spray: f32,
}

/// States of the police officer state machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PoliceState {
    /// Wandering along sidewalks.
    Patrol,
    /// Pursuing the player.
    Chase,
    /// Incapacitated by spray.
    Stunned,
}

/// Category of a vehicle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum VehicleCategory {
    /// Ordinary traffic.
    Civilian,
    /// Patrol car with flashing lights.
    Police,
}

/// Capability-specific state carried by an entity.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Actor {
    /// Pedestrian wandering the sidewalks.
    Civilian {
        /// Remaining stun time.
        stun: Duration,
        /// Appearance variant.
        outfit: u8,
    },
    /// Police officer.
    Police {
        /// Current state machine state.
        state: PoliceState,
        /// Remaining stun time.
        stun: Duration,
    },
    /// Car driving on roads.
    Vehicle {
        /// Civilian or police car.
        category: VehicleCategory,
        /// Travel speed in world units per second.
        speed: f32,
        /// Light phase in radians, only meaningful for police cars.
        flash_phase: f32,
        /// Appearance variant for civilian cars.
        paint: u8,
    },
}

impl Actor {
    /// Collision radius of the entity class.
    #[must_use]
    pub const fn radius(&self) -> f32 {
        match self {
            Actor::Vehicle { .. } => VEHICLE_RADIUS,
            Actor::Civilian { .. } | Actor::Police { .. } => NPC_RADIUS,
        }
    }

    /// Returns `true` for civilians and police officers.
    #[must_use]
    pub const fn is_pedestrian(&self) -> bool {
        matches!(self, Actor::Civilian { .. } | Actor::Police { .. })
    }
}

/// Immutable representation of a single entity used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EntitySnapshot {
    /// Unique identifier of the entity.
    pub id: EntityId,
    /// Current world position.
    pub position: WorldPoint,
    /// Facing angle in radians.
    pub heading: f32,
    /// Capability-specific state.
    pub actor: Actor,
}

/// Read-only snapshot describing every entity in deterministic order.
#[derive(Clone, Debug, Default)]
pub struct EntityView {
    snapshots: Vec<EntitySnapshot>,
}

impl EntityView {
    /// Creates a new entity view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<EntitySnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured snapshots ordered by identifier.
    pub fn iter(&self) -> impl Iterator<Item = &EntitySnapshot> {
        self.snapshots.iter()
    }

    /// Looks up a snapshot by identifier.
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&EntitySnapshot> {
        self.snapshots
            .binary_search_by_key(&id, |snapshot| snapshot.id)
            .ok()
            .map(|index| &self.snapshots[index])
    }

    /// Number of captured snapshots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Returns `true` when the view holds no entities.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<EntitySnapshot> {
        self.snapshots
    }
}

/// Terminal result of a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// Every tag was completed.
    Won,
    /// The player ran out of hit points.
    Lost,
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances the simulation clock, decaying stun timers and light phases.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Places the player at a resolved position and heading.
    MovePlayer {
        /// Position the player occupies after movement.
        to: WorldPoint,
        /// Facing angle after rotation.
        heading: f32,
    },
    /// Consumes spray resource.
    DrainSpray {
        /// Amount of resource to remove.
        amount: f32,
    },
    /// Removes hit points from the player.
    DamagePlayer {
        /// Amount of hit points to remove.
        amount: f32,
    },
    /// Creates a new entity.
    SpawnEntity {
        /// Initial position.
        position: WorldPoint,
        /// Initial facing angle.
        heading: f32,
        /// Capability-specific initial state.
        actor: Actor,
    },
    /// Requests that an entity move to a new position.
    MoveEntity {
        /// Entity attempting to move.
        entity: EntityId,
        /// Candidate position.
        to: WorldPoint,
    },
    /// Changes the facing angle of an entity.
    TurnEntity {
        /// Entity to rotate.
        entity: EntityId,
        /// New facing angle.
        heading: f32,
    },
    /// Switches a patrolling officer into pursuit.
    AlertPolice {
        /// Officer that spotted the player.
        entity: EntityId,
    },
    /// Stuns a civilian or police officer.
    StunEntity {
        /// Entity hit by spray.
        entity: EntityId,
        /// Length of the stun.
        duration: Duration,
    },
    /// Marks a tag complete and paints its decal.
    CompleteTag {
        /// Tag being completed.
        tag: TagId,
        /// Artwork used for the decal.
        style: DecalStyle,
    },
    /// Ends the session and freezes the simulation.
    EndSession {
        /// Result of the session.
        outcome: Outcome,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Confirms that the player moved or turned.
    PlayerMoved {
        /// Position after the move.
        to: WorldPoint,
    },
    /// Reports a change of the spray resource.
    SprayChanged {
        /// Spray remaining after the change.
        spray: f32,
    },
    /// Reports that the player lost hit points.
    PlayerDamaged {
        /// Hit points remaining after the damage.
        health: f32,
    },
    /// Confirms that an entity was created.
    EntitySpawned {
        /// Identifier assigned to the entity.
        entity: EntityId,
        /// Position the entity occupies.
        position: WorldPoint,
    },
    /// Confirms that an entity moved.
    EntityMoved {
        /// Entity that moved.
        entity: EntityId,
        /// Position before the move.
        from: WorldPoint,
        /// Position after the move.
        to: WorldPoint,
    },
    /// Reports that a move request collided and was discarded.
    EntityMoveRejected {
        /// Entity whose move was rejected.
        entity: EntityId,
    },
    /// Announces a police state transition.
    PoliceStateChanged {
        /// Officer whose state changed.
        entity: EntityId,
        /// State after the transition.
        state: PoliceState,
    },
    /// Confirms that an entity was stunned.
    EntityStunned {
        /// Entity that was stunned.
        entity: EntityId,
    },
    /// Confirms that a tag was completed.
    TagCompleted {
        /// Tag that was completed.
        tag: TagId,
        /// Number of completed tags after the change.
        completed: usize,
        /// Total number of tags in the city.
        total: usize,
    },
    /// Announces the end of the session.
    SessionEnded {
        /// Result of the session.
        outcome: Outcome,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_containing_floors_negative_coordinates() {
        assert_eq!(
            CellCoord::containing(WorldPoint::new(2.9, 0.1)),
            CellCoord::new(2, 0)
        );
        assert_eq!(
            CellCoord::containing(WorldPoint::new(-0.2, 1.0)),
            CellCoord::new(-1, 1)
        );
    }

    #[test]
    fn chebyshev_distance_uses_largest_axis() {
        let origin = CellCoord::new(3, 3);
        assert_eq!(origin.chebyshev_distance(CellCoord::new(6, 4)), 3);
        assert_eq!(origin.chebyshev_distance(CellCoord::new(1, 0)), 3);
        assert_eq!(origin.chebyshev_distance(origin), 0);
    }

    #[test]
    fn entity_view_sorts_and_finds_by_id() {
        let snapshot = |id| EntitySnapshot {
            id: EntityId::new(id),
            position: WorldPoint::default(),
            heading: 0.0,
            actor: Actor::Civilian {
                stun: Duration::ZERO,
                outfit: 0,
            },
        };
        let view = EntityView::from_snapshots(vec![snapshot(4), snapshot(1), snapshot(2)]);

        let ids: Vec<u32> = view.iter().map(|entity| entity.id.get()).collect();
        assert_eq!(ids, vec![1, 2, 4]);
        assert!(view.get(EntityId::new(2)).is_some());
        assert!(view.get(EntityId::new(3)).is_none());
    }

    #[test]
    fn tag_color_wraps_hue() {
        assert_eq!(TagColor::from_hue(400).hue(), 40);
    }

    #[test]
    fn advancing_along_heading_moves_in_world_space() {
        let start = WorldPoint::new(1.0, 1.0);
        let east = start.advanced(0.0, 2.0);
        assert!((east.x - 3.0).abs() < 1e-6);
        assert!((east.y - 1.0).abs() < 1e-6);
        assert!((start.bearing_to(east)).abs() < 1e-6);
    }
}
