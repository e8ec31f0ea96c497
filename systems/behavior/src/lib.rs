#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Per-frame AI for the city's inhabitants.
//!
//! Three pure systems cover civilians, police officers and vehicles. Each one
//! reads the current [`EntityView`](spraydoom_core::EntityView) and player
//! snapshot and emits turn, move, alert and damage commands. Callers run them
//! in the order civilians, police, vehicles and apply each batch before the
//! next so later movers see earlier ones.
//!
//! Every system takes an `is_blocked(point, radius, mover)` probe that must
//! answer the shared collision test with `mover` excluded.

mod civilians;
mod police;
mod vehicles;

use std::f32::consts::FRAC_PI_2;

use spraydoom_core::{
    Command, EntityId, EntitySnapshot, FloorKind, SimRng, TileMap, WorldPoint, NPC_RADIUS,
};

pub use civilians::{CivilianBehavior, CIVILIAN_SPEED};
pub use police::{
    PoliceBehavior, CHASE_DETOUR, CHASE_SPEED, DETECTION_RADIUS, PATROL_SPEED,
    TOUCH_DAMAGE_PER_SECOND,
};
pub use vehicles::{VehicleBehavior, IMPACT_DAMAGE_PER_SECOND, TURN_PROBE_DISTANCE};

/// Chance per tick that a wandering pedestrian perturbs its heading.
pub const WANDER_PROBABILITY: f32 = 0.02;
/// Width of the uniform heading perturbation in radians.
pub const WANDER_SPREAD: f32 = 1.2;

/// Sidewalk wander shared by civilians and patrolling officers.
///
/// Occasionally perturbs the heading, then either steps forward or, when the
/// next position leaves the sidewalk or collides, turns a quarter turn in a
/// random direction and stays put.
fn wander<F>(
    entity: &EntitySnapshot,
    speed: f32,
    seconds: f32,
    map: &TileMap,
    rng: &mut SimRng,
    is_blocked: &F,
    out: &mut Vec<Command>,
) where
    F: Fn(WorldPoint, f32, EntityId) -> bool,
{
    let mut heading = entity.heading;
    if rng.chance(WANDER_PROBABILITY) {
        heading += rng.jitter(WANDER_SPREAD);
    }

    let candidate = entity.position.advanced(heading, speed * seconds);
    let on_sidewalk = map.floor_at(candidate) == Some(FloorKind::Sidewalk);
    if !on_sidewalk || is_blocked(candidate, NPC_RADIUS, entity.id) {
        out.push(Command::TurnEntity {
            entity: entity.id,
            heading: heading + FRAC_PI_2 * rng.sign(),
        });
        return;
    }

    if heading != entity.heading {
        out.push(Command::TurnEntity {
            entity: entity.id,
            heading,
        });
    }
    out.push(Command::MoveEntity {
        entity: entity.id,
        to: candidate,
    });
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use spraydoom_core::{Actor, CellCoord};

    fn civilian_at(position: WorldPoint, heading: f32) -> EntitySnapshot {
        EntitySnapshot {
            id: EntityId::new(3),
            position,
            heading,
            actor: Actor::Civilian {
                stun: Duration::ZERO,
                outfit: 1,
            },
        }
    }

    fn sidewalk_map() -> TileMap {
        let mut map = TileMap::new(6, 6);
        for row in 0..6 {
            for column in 0..3 {
                map.set_floor(CellCoord::new(column, row), FloorKind::Sidewalk);
            }
        }
        map
    }

    #[test]
    fn wander_turns_a_quarter_at_the_curb() {
        let map = sidewalk_map();
        let entity = civilian_at(WorldPoint::new(2.99, 2.5), 0.0);

        for seed in 0..32 {
            let mut rng = SimRng::from_seed(seed);
            let mut out = Vec::new();
            wander(&entity, 1.2, 0.05, &map, &mut rng, &|_, _, _| false, &mut out);

            let [Command::TurnEntity { heading, .. }] = out.as_slice() else {
                panic!("expected a single turn, got {out:?}");
            };
            let quarter = (heading.abs() - FRAC_PI_2).abs();
            assert!(quarter <= WANDER_SPREAD / 2.0 + 1e-5, "heading {heading}");
        }
    }

    #[test]
    fn wander_steps_forward_on_open_sidewalk() {
        let map = sidewalk_map();
        let entity = civilian_at(WorldPoint::new(1.5, 2.5), FRAC_PI_2);
        let mut rng = SimRng::from_seed(8);
        let mut out = Vec::new();

        wander(&entity, 1.2, 0.05, &map, &mut rng, &|_, _, _| false, &mut out);

        let Some(Command::MoveEntity { to, .. }) = out.last() else {
            panic!("expected a move, got {out:?}");
        };
        assert!((to.distance(entity.position) - 0.06).abs() < 1e-5);
    }

    #[test]
    fn wander_respects_collisions() {
        let map = sidewalk_map();
        let entity = civilian_at(WorldPoint::new(1.5, 2.5), FRAC_PI_2);
        let mut rng = SimRng::from_seed(8);
        let mut out = Vec::new();

        wander(&entity, 1.2, 0.05, &map, &mut rng, &|_, _, _| true, &mut out);

        assert!(matches!(out.as_slice(), [Command::TurnEntity { .. }]));
    }
}
