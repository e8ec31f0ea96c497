#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic spawning system that populates a freshly generated city.
//!
//! Civilians and police officers are placed on sidewalk tiles, vehicles on
//! road or crosswalk tiles. Each placement is a bounded random search over
//! tile centres that rejects blocked candidates; when the search runs dry the
//! last sample is used anyway.

use std::{
    f32::consts::{FRAC_PI_2, PI},
    time::Duration,
};

use spraydoom_core::{
    Actor, CellCoord, Command, FloorKind, PoliceState, SimRng, TileMap, VehicleCategory,
    WorldPoint, NPC_RADIUS, OUTFIT_VARIANTS, PAINT_VARIANTS, VEHICLE_RADIUS,
};

const PLACEMENT_SEARCH_LIMIT: u32 = 3_000;
const POLICE_CAR_PROBABILITY: f32 = 0.25;
const CIVILIAN_CAR_SPEED: f32 = 1.8;
const POLICE_CAR_SPEED: f32 = 2.3;
const CARDINAL_HEADINGS: [f32; 4] = [0.0, FRAC_PI_2, PI, -FRAC_PI_2];

/// Entity counts derived from the map area.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Population {
    /// Number of civilians to place.
    pub civilians: u32,
    /// Number of police officers to place.
    pub police: u32,
    /// Number of vehicles to place.
    pub vehicles: u32,
}

impl Population {
    /// Scales the population with the number of tiles in the city.
    #[must_use]
    pub fn for_area(area: u32) -> Self {
        Self {
            civilians: (area / 450).clamp(10, 30),
            police: (area / 1_200).clamp(4, 12),
            vehicles: (area / 900).clamp(6, 16),
        }
    }

    /// Total number of entities.
    #[must_use]
    pub const fn total(&self) -> u32 {
        self.civilians + self.police + self.vehicles
    }
}

/// Summary of a population pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SpawnReport {
    /// Number of spawn commands emitted.
    pub spawned: u32,
    /// Placements that exhausted their search and fell back to the last sample.
    pub fallbacks: u32,
}

/// Emits spawn commands for the whole population of `map`.
///
/// `is_blocked` reports whether a circle of the given radius collides with the
/// static city or with entities already present in the world. Entities
/// emitted during this pass are tracked internally so they never overlap each
/// other.
pub fn populate<F>(
    map: &TileMap,
    population: Population,
    rng: &mut SimRng,
    is_blocked: F,
    out: &mut Vec<Command>,
) -> SpawnReport
where
    F: Fn(WorldPoint, f32) -> bool,
{
    let mut placer = Placer {
        map,
        is_blocked,
        placed: Vec::with_capacity(population.total() as usize),
        report: SpawnReport::default(),
    };

    for _ in 0..population.civilians {
        let position = placer.place(rng, NPC_RADIUS, |floor| floor == FloorKind::Sidewalk);
        let heading = rng.angle();
        let outfit = rng.index(usize::from(OUTFIT_VARIANTS)) as u8;
        placer.emit(
            out,
            position,
            heading,
            Actor::Civilian {
                stun: Duration::ZERO,
                outfit,
            },
        );
    }

    for _ in 0..population.police {
        let position = placer.place(rng, NPC_RADIUS, |floor| floor == FloorKind::Sidewalk);
        let heading = rng.angle();
        placer.emit(
            out,
            position,
            heading,
            Actor::Police {
                state: PoliceState::Patrol,
                stun: Duration::ZERO,
            },
        );
    }

    for _ in 0..population.vehicles {
        let position = placer.place(rng, VEHICLE_RADIUS, FloorKind::is_drivable);
        let police = rng.chance(POLICE_CAR_PROBABILITY);
        let heading = CARDINAL_HEADINGS[rng.index(CARDINAL_HEADINGS.len())];
        let actor = if police {
            Actor::Vehicle {
                category: VehicleCategory::Police,
                speed: POLICE_CAR_SPEED,
                flash_phase: rng.angle(),
                paint: 0,
            }
        } else {
            Actor::Vehicle {
                category: VehicleCategory::Civilian,
                speed: CIVILIAN_CAR_SPEED,
                flash_phase: 0.0,
                paint: rng.index(usize::from(PAINT_VARIANTS)) as u8,
            }
        };
        placer.emit(out, position, heading, actor);
    }

    log::info!(
        "spawned {} civilians, {} police, {} vehicles ({} placement fallbacks)",
        population.civilians,
        population.police,
        population.vehicles,
        placer.report.fallbacks
    );
    placer.report
}

struct Placer<'a, F> {
    map: &'a TileMap,
    is_blocked: F,
    placed: Vec<(WorldPoint, f32)>,
    report: SpawnReport,
}

impl<F> Placer<'_, F>
where
    F: Fn(WorldPoint, f32) -> bool,
{
    fn place(
        &mut self,
        rng: &mut SimRng,
        radius: f32,
        accepts: impl Fn(FloorKind) -> bool,
    ) -> WorldPoint {
        let max_column = self.map.columns().saturating_sub(1) as i32;
        let max_row = self.map.rows().saturating_sub(1) as i32;
        let mut candidate = WorldPoint::default();

        for _ in 0..PLACEMENT_SEARCH_LIMIT {
            candidate = CellCoord::new(
                rng.range_inclusive(0, max_column),
                rng.range_inclusive(0, max_row),
            )
            .center();
            let legal = self.map.floor_at(candidate).is_some_and(&accepts);
            if legal && !self.collides(candidate, radius) {
                return candidate;
            }
        }

        self.report.fallbacks += 1;
        log::warn!(
            "placement search exhausted after {PLACEMENT_SEARCH_LIMIT} trials, using ({:.1}, {:.1})",
            candidate.x,
            candidate.y
        );
        candidate
    }

    fn collides(&self, candidate: WorldPoint, radius: f32) -> bool {
        (self.is_blocked)(candidate, radius)
            || self.placed.iter().any(|(position, other)| {
                let reach = radius + other;
                position.distance_squared(candidate) < reach * reach
            })
    }

    fn emit(&mut self, out: &mut Vec<Command>, position: WorldPoint, heading: f32, actor: Actor) {
        self.placed.push((position, actor.radius()));
        self.report.spawned += 1;
        out.push(Command::SpawnEntity {
            position,
            heading,
            actor,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn population_scales_with_area_within_bounds() {
        assert_eq!(
            Population::for_area(100),
            Population {
                civilians: 10,
                police: 4,
                vehicles: 6,
            }
        );
        assert_eq!(
            Population::for_area(88 * 76),
            Population {
                civilians: 14,
                police: 5,
                vehicles: 7,
            }
        );
        assert_eq!(
            Population::for_area(1_000_000),
            Population {
                civilians: 30,
                police: 12,
                vehicles: 16,
            }
        );
    }

    #[test]
    fn exhausted_search_falls_back_to_last_sample() {
        let map = TileMap::new(4, 4);
        let mut rng = SimRng::from_seed(5);
        let mut out = Vec::new();
        let population = Population {
            civilians: 1,
            police: 0,
            vehicles: 0,
        };

        let report = populate(&map, population, &mut rng, |_, _| false, &mut out);

        assert_eq!(
            report,
            SpawnReport {
                spawned: 1,
                fallbacks: 1,
            }
        );
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn placements_in_one_pass_never_overlap() {
        let map = TileMap::new(6, 6);
        let mut rng = SimRng::from_seed(17);
        let mut out = Vec::new();
        let population = Population {
            civilians: 0,
            police: 0,
            vehicles: 20,
        };

        let report = populate(&map, population, &mut rng, |_, _| false, &mut out);

        assert_eq!(report.fallbacks, 0);
        let positions: Vec<WorldPoint> = out
            .iter()
            .map(|command| match command {
                Command::SpawnEntity { position, .. } => *position,
                other => panic!("unexpected command {other:?}"),
            })
            .collect();
        for (index, first) in positions.iter().enumerate() {
            for second in &positions[index + 1..] {
                assert!(first.distance_squared(*second) >= 0.7 * 0.7);
            }
        }
    }
}
