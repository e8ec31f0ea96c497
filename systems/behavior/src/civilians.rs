use std::time::Duration;

use spraydoom_core::{Actor, Command, EntityId, EntityView, SimRng, TileMap, WorldPoint};

use crate::wander;

/// Walking speed of civilians in world units per second.
pub const CIVILIAN_SPEED: f32 = 1.2;

/// Pure system that makes civilians wander the sidewalks.
#[derive(Debug, Default)]
pub struct CivilianBehavior;

impl CivilianBehavior {
    /// Emits wander commands for every civilian that is not stunned.
    pub fn handle<F>(
        &mut self,
        entities: &EntityView,
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
            let Actor::Civilian { stun, .. } = entity.actor else {
                continue;
            };
            if !stun.is_zero() {
                continue;
            }
            wander(entity, CIVILIAN_SPEED, seconds, map, rng, &is_blocked, out);
        }
    }
}
