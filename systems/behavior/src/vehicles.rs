use std::{
    f32::consts::{FRAC_PI_2, PI},
    time::Duration,
};

use spraydoom_core::{
    Actor, Command, EntityId, EntityView, PlayerSnapshot, SimRng, TileMap, WorldPoint,
    PLAYER_RADIUS, VEHICLE_RADIUS,
};

/// Distance ahead at which turn options are probed.
pub const TURN_PROBE_DISTANCE: f32 = 0.8;
/// Hit points drained per second while a vehicle overlaps the player.
pub const IMPACT_DAMAGE_PER_SECOND: f32 = 10.0;

/// Pure system steering vehicles along roads and crosswalks.
#[derive(Debug, Default)]
pub struct VehicleBehavior;

impl VehicleBehavior {
    /// Emits move, turn and damage commands for every vehicle.
    #[allow(clippy::too_many_arguments)]
    pub fn handle<F>(
        &mut self,
        entities: &EntityView,
        player: &PlayerSnapshot,
        map: &TileMap,
        dt: Duration,
        rng: &mut SimRng,
        is_blocked: F,
        out: &mut Vec<Command>,
    ) where
        F: Fn(WorldPoint, f32, EntityId) -> bool,
    {
        let seconds = dt.as_secs_f32();
        for entity in entities.iter() {
            let Actor::Vehicle { speed, .. } = entity.actor else {
                continue;
            };

            let candidate = entity.position.advanced(entity.heading, speed * seconds);
            let on_road = map.floor_at(candidate).is_some_and(|floor| floor.is_drivable());
            if !on_road || is_blocked(candidate, VEHICLE_RADIUS, entity.id) {
                let heading = choose_turn(map, entity.position, entity.heading, rng);
                out.push(Command::TurnEntity {
                    entity: entity.id,
                    heading,
                });
                continue;
            }

            out.push(Command::MoveEntity {
                entity: entity.id,
                to: candidate,
            });
            let reach = VEHICLE_RADIUS + PLAYER_RADIUS;
            if entity.position.distance_squared(player.position) < reach * reach {
                out.push(Command::DamagePlayer {
                    amount: IMPACT_DAMAGE_PER_SECOND * seconds,
                });
            }
        }
    }
}

/// Picks a legal quarter turn at random, or reverses when neither side is road.
fn choose_turn(map: &TileMap, position: WorldPoint, heading: f32, rng: &mut SimRng) -> f32 {
    let options: Vec<f32> = [heading - FRAC_PI_2, heading + FRAC_PI_2]
        .into_iter()
        .filter(|&direction| {
            map.floor_at(position.advanced(direction, TURN_PROBE_DISTANCE))
                .is_some_and(|floor| floor.is_drivable())
        })
        .collect();

    if options.is_empty() {
        heading + PI
    } else {
        options[rng.index(options.len())]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spraydoom_core::{CellCoord, EntitySnapshot, FloorKind, VehicleCategory};

    const FRAME: Duration = Duration::from_millis(50);

    fn car_at(x: f32, y: f32) -> EntityView {
        EntityView::from_snapshots(vec![EntitySnapshot {
            id: EntityId::new(0),
            position: WorldPoint::new(x, y),
            heading: 0.0,
            actor: Actor::Vehicle {
                category: VehicleCategory::Civilian,
                speed: 1.8,
                flash_phase: 0.0,
                paint: 0,
            },
        }])
    }

    fn player_at(x: f32, y: f32) -> PlayerSnapshot {
        PlayerSnapshot {
            position: WorldPoint::new(x, y),
            heading: 0.0,
            health: 100.0,
            spray: 100.0,
        }
    }

    fn drive(view: &EntityView, player: &PlayerSnapshot, blocked: bool) -> Vec<Command> {
        let mut rng = SimRng::from_seed(2);
        let mut out = Vec::new();
        VehicleBehavior.handle(
            view,
            player,
            &TileMap::new(8, 8),
            FRAME,
            &mut rng,
            |_, _, _| blocked,
            &mut out,
        );
        out
    }

    fn damage(out: &[Command]) -> Option<f32> {
        out.iter().find_map(|command| match command {
            Command::DamagePlayer { amount } => Some(*amount),
            _ => None,
        })
    }

    #[test]
    fn moving_car_hits_the_player_it_touches() {
        let out = drive(&car_at(2.5, 2.5), &player_at(2.9, 2.5), false);

        assert!(matches!(out[0], Command::MoveEntity { .. }));
        assert_eq!(
            damage(&out),
            Some(IMPACT_DAMAGE_PER_SECOND * FRAME.as_secs_f32())
        );
    }

    #[test]
    fn blocked_car_turns_without_hitting() {
        let out = drive(&car_at(2.5, 2.5), &player_at(2.9, 2.5), true);

        assert!(matches!(out.as_slice(), [Command::TurnEntity { .. }]));
        assert_eq!(damage(&out), None);
    }

    #[test]
    fn distant_car_deals_no_damage() {
        let out = drive(&car_at(2.5, 2.5), &player_at(5.5, 2.5), false);

        assert_eq!(damage(&out), None);
    }

    #[test]
    fn dead_end_reverses() {
        let mut map = TileMap::new(5, 5);
        for cell in map.cells().collect::<Vec<_>>() {
            map.set_floor(cell, FloorKind::Sidewalk);
        }
        map.set_floor(CellCoord::new(2, 2), FloorKind::Road);
        let mut rng = SimRng::from_seed(4);

        let heading = choose_turn(&map, WorldPoint::new(2.5, 2.5), 0.0, &mut rng);

        assert!((heading - PI).abs() < 1e-6);
    }

    #[test]
    fn open_junction_offers_both_sides() {
        let map = TileMap::new(5, 5);
        let mut seen_left = false;
        let mut seen_right = false;

        for seed in 0..64 {
            let mut rng = SimRng::from_seed(seed);
            let heading = choose_turn(&map, WorldPoint::new(2.5, 2.5), 0.0, &mut rng);
            seen_left |= (heading + FRAC_PI_2).abs() < 1e-6;
            seen_right |= (heading - FRAC_PI_2).abs() < 1e-6;
        }

        assert!(seen_left && seen_right);
    }
}
