use std::time::Duration;

use spraydoom_core::{
    Actor, CellCoord, Command, EntityId, EntitySnapshot, EntityView, FloorKind, PlayerSnapshot,
    PoliceState, SimRng, TileMap, WallKind, WorldPoint, NPC_RADIUS, PLAYER_RADIUS,
};
use spraydoom_system_raycast::has_line_of_sight;

use crate::wander;

/// Patrol speed in world units per second.
pub const PATROL_SPEED: f32 = 1.35;
/// Pursuit speed in world units per second.
pub const CHASE_SPEED: f32 = 1.5;
/// Distance within which an officer can spot the player.
pub const DETECTION_RADIUS: f32 = 6.0;
/// Heading change applied when a pursuit step is blocked.
pub const CHASE_DETOUR: f32 = 0.6;
/// Hit points drained per second while an officer touches the player.
pub const TOUCH_DAMAGE_PER_SECOND: f32 = 6.0;

/// Pure system driving the police state machine.
///
/// Patrolling officers wander like civilians. An officer that sees the player
/// within [`DETECTION_RADIUS`] switches to pursuit, locks its heading onto the
/// player and drains hit points while touching them. Stunned officers wait
/// for the world to expire their timer.
#[derive(Debug, Default)]
pub struct PoliceBehavior;

impl PoliceBehavior {
    /// Emits alert, turn, move and damage commands for every officer.
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
            let Actor::Police { state, .. } = entity.actor else {
                continue;
            };
            if state == PoliceState::Stunned {
                continue;
            }

            let spotted = entity.position.distance(player.position) < DETECTION_RADIUS
                && has_line_of_sight(map, entity.position, player.position);
            let state = if spotted && state == PoliceState::Patrol {
                out.push(Command::AlertPolice { entity: entity.id });
                PoliceState::Chase
            } else {
                state
            };

            if state == PoliceState::Chase {
                pursue(entity, player, seconds, map, rng, &is_blocked, out);
            } else {
                wander(entity, PATROL_SPEED, seconds, map, rng, &is_blocked, out);
            }
        }
    }
}

fn pursue<F>(
    entity: &EntitySnapshot,
    player: &PlayerSnapshot,
    seconds: f32,
    map: &TileMap,
    rng: &mut SimRng,
    is_blocked: &F,
    out: &mut Vec<Command>,
) where
    F: Fn(WorldPoint, f32, EntityId) -> bool,
{
    let heading = entity.position.bearing_to(player.position);
    let candidate = entity.position.advanced(heading, CHASE_SPEED * seconds);

    let cell = CellCoord::containing(candidate);
    let walkable = map.floor(cell).is_some_and(|floor| floor != FloorKind::Park)
        && map.wall(cell) == Some(WallKind::None);
    if !walkable || is_blocked(candidate, NPC_RADIUS, entity.id) {
        out.push(Command::TurnEntity {
            entity: entity.id,
            heading: heading + CHASE_DETOUR * rng.sign(),
        });
        return;
    }

    out.push(Command::TurnEntity {
        entity: entity.id,
        heading,
    });
    out.push(Command::MoveEntity {
        entity: entity.id,
        to: candidate,
    });

    // Contact is measured where the world last accepted the officer.
    let reach = NPC_RADIUS + PLAYER_RADIUS;
    if entity.position.distance_squared(player.position) < reach * reach {
        out.push(Command::DamagePlayer {
            amount: TOUCH_DAMAGE_PER_SECOND * seconds,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn officer(position: WorldPoint, state: PoliceState) -> EntityView {
        EntityView::from_snapshots(vec![EntitySnapshot {
            id: EntityId::new(0),
            position,
            heading: 0.0,
            actor: Actor::Police {
                state,
                stun: std::time::Duration::ZERO,
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

    fn run(view: &EntityView, player: &PlayerSnapshot, map: &TileMap) -> Vec<Command> {
        let mut rng = SimRng::from_seed(1);
        let mut out = Vec::new();
        PoliceBehavior.handle(
            view,
            player,
            map,
            Duration::from_millis(50),
            &mut rng,
            |_, _, _| false,
            &mut out,
        );
        out
    }

    #[test]
    fn officer_in_sight_gives_chase() {
        let map = TileMap::new(12, 12);
        let view = officer(WorldPoint::new(2.5, 2.5), PoliceState::Patrol);

        let out = run(&view, &player_at(6.5, 2.5), &map);

        assert_eq!(
            out.first(),
            Some(&Command::AlertPolice {
                entity: EntityId::new(0)
            })
        );
        assert!(out.iter().any(|command| matches!(
            command,
            Command::MoveEntity { to, .. } if to.x > 2.5
        )));
    }

    #[test]
    fn walls_and_distance_hide_the_player() {
        let mut map = TileMap::new(12, 12);
        map.set_wall(CellCoord::new(4, 2), WallKind::Concrete);
        let view = officer(WorldPoint::new(2.5, 2.5), PoliceState::Patrol);

        let hidden = run(&view, &player_at(6.5, 2.5), &map);
        let distant = run(&view, &player_at(9.0, 2.5), &TileMap::new(12, 12));

        for commands in [hidden, distant] {
            assert!(!commands
                .iter()
                .any(|command| matches!(command, Command::AlertPolice { .. })));
        }
    }

    #[test]
    fn touching_pursuer_drains_health() {
        let map = TileMap::new(12, 12);
        let view = officer(WorldPoint::new(2.5, 2.5), PoliceState::Chase);

        let out = run(&view, &player_at(2.8, 2.5), &map);

        let damage = out.iter().find_map(|command| match command {
            Command::DamagePlayer { amount } => Some(*amount),
            _ => None,
        });
        assert_eq!(damage, Some(TOUCH_DAMAGE_PER_SECOND * 0.05));
    }

    #[test]
    fn contact_ignores_the_requested_step() {
        let map = TileMap::new(12, 12);
        let view = officer(WorldPoint::new(2.5, 2.5), PoliceState::Chase);

        let out = run(&view, &player_at(3.0, 2.5), &map);

        assert!(out
            .iter()
            .any(|command| matches!(command, Command::MoveEntity { .. })));
        assert!(!out
            .iter()
            .any(|command| matches!(command, Command::DamagePlayer { .. })));
    }

    #[test]
    fn pursuit_refuses_to_enter_parks() {
        let mut map = TileMap::new(12, 12);
        map.set_floor(CellCoord::new(3, 2), FloorKind::Park);
        let view = officer(WorldPoint::new(2.99, 2.5), PoliceState::Chase);

        let out = run(&view, &player_at(6.5, 2.5), &map);

        let [Command::TurnEntity { heading, .. }] = out.as_slice() else {
            panic!("expected a detour turn, got {out:?}");
        };
        assert!((heading.abs() - CHASE_DETOUR).abs() < 1e-5);
    }

    #[test]
    fn stunned_officers_stay_idle() {
        let map = TileMap::new(12, 12);
        let view = officer(WorldPoint::new(2.5, 2.5), PoliceState::Stunned);

        assert!(run(&view, &player_at(3.0, 2.5), &map).is_empty());
    }
}
