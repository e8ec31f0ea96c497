#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Combat system covering the spray attack, tagging and session outcome.

use std::{
    f32::consts::{FRAC_PI_4, FRAC_PI_8, PI, TAU},
    time::Duration,
};

use spraydoom_core::{
    Command, DecalStyle, EntityView, Outcome, PlayerSnapshot, SimRng, Tag, TileMap,
};
use spraydoom_system_raycast::has_line_of_sight;

/// Maximum distance at which spray stuns a pedestrian.
pub const SPRAY_RANGE: f32 = 3.0;
/// Half-angle of the spray cone around the player's heading.
pub const SPRAY_HALF_ANGLE: f32 = FRAC_PI_8;
/// Spray resource consumed per second while the trigger is held.
pub const SPRAY_DRAIN_PER_SECOND: f32 = 20.0;
/// How long a sprayed pedestrian stays stunned.
pub const STUN_DURATION: Duration = Duration::from_millis(2_500);
/// Squared distance within which a tag can be painted.
pub const TAG_REACH_SQUARED: f32 = 1.0;
/// Half-angle within which the player must face a tag to paint it.
pub const TAG_HALF_ANGLE: f32 = FRAC_PI_4;

/// Signed angular difference `target - heading` wrapped into `-PI..=PI`.
#[must_use]
pub fn angle_difference(target: f32, heading: f32) -> f32 {
    let wrapped = (target - heading).rem_euclid(TAU);
    if wrapped > PI {
        wrapped - TAU
    } else {
        wrapped
    }
}

/// Pure system resolving player attacks and the end of the session.
#[derive(Debug, Default)]
pub struct Combat;

impl Combat {
    /// Sprays for `dt` seconds while the trigger is held.
    ///
    /// Drains the can and stuns every civilian or officer inside the cone
    /// that is not hidden behind a wall. An empty can does nothing.
    pub fn spray(
        &mut self,
        player: &PlayerSnapshot,
        entities: &EntityView,
        map: &TileMap,
        dt: Duration,
        out: &mut Vec<Command>,
    ) {
        if player.spray <= 0.0 || dt.is_zero() {
            return;
        }
        out.push(Command::DrainSpray {
            amount: SPRAY_DRAIN_PER_SECOND * dt.as_secs_f32(),
        });

        for entity in entities.iter().filter(|entity| entity.actor.is_pedestrian()) {
            if entity.position.distance(player.position) > SPRAY_RANGE {
                continue;
            }
            let bearing = player.position.bearing_to(entity.position);
            if angle_difference(bearing, player.heading).abs() > SPRAY_HALF_ANGLE {
                continue;
            }
            if has_line_of_sight(map, player.position, entity.position) {
                out.push(Command::StunEntity {
                    entity: entity.id,
                    duration: STUN_DURATION,
                });
            }
        }
    }

    /// Paints the first reachable incomplete tag the player is facing.
    pub fn tag(
        &mut self,
        player: &PlayerSnapshot,
        tags: &[Tag],
        rng: &mut SimRng,
        out: &mut Vec<Command>,
    ) {
        let reachable = tags.iter().find(|tag| {
            !tag.completed
                && tag.position.distance_squared(player.position) < TAG_REACH_SQUARED
                && angle_difference(player.position.bearing_to(tag.position), player.heading)
                    .abs()
                    < TAG_HALF_ANGLE
        });

        if let Some(tag) = reachable {
            let style = if rng.chance(0.5) {
                DecalStyle::Ny90
            } else {
                DecalStyle::Doom
            };
            out.push(Command::CompleteTag { tag: tag.id, style });
        }
    }

    /// Ends the session once every tag is painted or the player is out of health.
    ///
    /// A win takes precedence when both conditions hold in the same frame.
    pub fn evaluate(
        &mut self,
        player: &PlayerSnapshot,
        completed: usize,
        total: usize,
        current: Option<Outcome>,
        out: &mut Vec<Command>,
    ) {
        if current.is_some() {
            return;
        }
        let outcome = if total > 0 && completed == total {
            Outcome::Won
        } else if player.health <= 0.0 {
            Outcome::Lost
        } else {
            return;
        };
        out.push(Command::EndSession { outcome });
    }
}
