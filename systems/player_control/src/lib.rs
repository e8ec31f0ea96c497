#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Player movement system translating held controls into a resolved pose.
//!
//! Rotation is applied first, then the combined forward and strafe
//! displacement is resolved one axis at a time so the player keeps sliding
//! along a wall when only one component of the motion is obstructed.

use std::{f32::consts::FRAC_PI_2, time::Duration};

use spraydoom_core::{Command, PlayerSnapshot, TileMap, WorldPoint};

/// Forward and backward speed in world units per second.
pub const MOVE_SPEED: f32 = 2.2;
/// Sideways speed in world units per second.
pub const STRAFE_SPEED: f32 = 2.0;
/// Turning speed in radians per second.
pub const ROTATION_SPEED: f32 = 2.3;
/// Speed multiplier applied while standing on road or crosswalk tiles.
pub const ROAD_SPEED_MULTIPLIER: f32 = 1.1;

/// Movement axes requested by the player for a single frame.
///
/// Each axis is expected in `-1.0..=1.0`; positive values mean forward,
/// strafe right and turn clockwise respectively.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MovementIntent {
    /// Forward (+) or backward (-) motion.
    pub forward: f32,
    /// Right (+) or left (-) strafe.
    pub strafe: f32,
    /// Clockwise (+) or counter-clockwise (-) rotation.
    pub rotate: f32,
}

impl MovementIntent {
    /// Builds an intent from pairs of opposing held controls.
    #[must_use]
    pub fn from_held(
        forward: bool,
        backward: bool,
        strafe_left: bool,
        strafe_right: bool,
        turn_left: bool,
        turn_right: bool,
    ) -> Self {
        Self {
            forward: axis(forward, backward),
            strafe: axis(strafe_right, strafe_left),
            rotate: axis(turn_right, turn_left),
        }
    }

    /// Returns `true` when no control is held.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.forward == 0.0 && self.strafe == 0.0 && self.rotate == 0.0
    }
}

fn axis(positive: bool, negative: bool) -> f32 {
    f32::from(u8::from(positive)) - f32::from(u8::from(negative))
}

/// Pure system that resolves the player's pose for one frame.
#[derive(Debug, Default)]
pub struct PlayerControl;

impl PlayerControl {
    /// Emits a [`Command::MovePlayer`] describing the resolved pose.
    ///
    /// `is_blocked` answers whether the player's collision circle fits at a
    /// candidate position.
    pub fn handle<F>(
        &mut self,
        player: &PlayerSnapshot,
        map: &TileMap,
        intent: MovementIntent,
        dt: Duration,
        is_blocked: F,
        out: &mut Vec<Command>,
    ) where
        F: Fn(WorldPoint) -> bool,
    {
        if intent.is_idle() || dt.is_zero() {
            return;
        }
        let seconds = dt.as_secs_f32();

        let heading = player.heading + intent.rotate * ROTATION_SPEED * seconds;
        let (forward_y, forward_x) = heading.sin_cos();
        let (right_y, right_x) = (heading + FRAC_PI_2).sin_cos();

        let multiplier = if map
            .floor_at(player.position)
            .is_some_and(|floor| floor.is_drivable())
        {
            ROAD_SPEED_MULTIPLIER
        } else {
            1.0
        };
        let step = seconds * multiplier;
        let dx = (forward_x * intent.forward * MOVE_SPEED + right_x * intent.strafe * STRAFE_SPEED)
            * step;
        let dy = (forward_y * intent.forward * MOVE_SPEED + right_y * intent.strafe * STRAFE_SPEED)
            * step;

        let mut resolved = player.position;
        let across = WorldPoint::new(resolved.x + dx, resolved.y);
        if !is_blocked(across) {
            resolved = across;
        }
        let along = WorldPoint::new(resolved.x, resolved.y + dy);
        if !is_blocked(along) {
            resolved = along;
        }

        out.push(Command::MovePlayer {
            to: resolved,
            heading,
        });
    }
}
