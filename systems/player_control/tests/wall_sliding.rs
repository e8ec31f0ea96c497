use std::{f32::consts::FRAC_PI_4, time::Duration};

use spraydoom_core::{CellCoord, Command, TileMap, WallKind, WorldPoint, PLAYER_RADIUS};
use spraydoom_system_player_control::{MovementIntent, PlayerControl};
use spraydoom_world::{self as world, query, World};

fn corridor_world(start: WorldPoint, heading: f32) -> World {
    let mut map = TileMap::new(8, 8);
    for row in 0..8 {
        map.set_wall(CellCoord::new(4, row), WallKind::Brick);
    }
    World::new(map, Vec::new(), start, heading)
}

fn step(world: &mut World, control: &mut PlayerControl, intent: MovementIntent) {
    let mut commands = Vec::new();
    control.handle(
        &query::player(world),
        query::tile_map(world),
        intent,
        Duration::from_millis(50),
        |point| query::is_blocked(world, point, PLAYER_RADIUS, None),
        &mut commands,
    );
    let mut events = Vec::new();
    for command in commands {
        world::apply(world, command, &mut events);
    }
}

#[test]
fn diagonal_push_into_wall_slides_along_it() {
    let start = WorldPoint::new(3.2, 2.5);
    let mut world = corridor_world(start, FRAC_PI_4);
    let mut control = PlayerControl;
    let intent = MovementIntent {
        forward: 1.0,
        ..MovementIntent::default()
    };

    for _ in 0..10 {
        step(&mut world, &mut control, intent);
    }

    let player = query::player(&world);
    assert!(player.position.x < 3.75);
    assert!(player.position.y > start.y + 0.5);
    assert!(!query::touches_wall(&world, player.position, PLAYER_RADIUS));
}

#[test]
fn walking_never_enters_wall_bounds() {
    let mut world = corridor_world(WorldPoint::new(1.5, 1.5), 0.3);
    let mut control = PlayerControl;
    let pattern = [
        MovementIntent::from_held(true, false, false, false, false, false),
        MovementIntent::from_held(true, false, false, true, false, true),
        MovementIntent::from_held(false, true, true, false, true, false),
    ];

    for tick in 0..300 {
        step(&mut world, &mut control, pattern[(tick / 25) % pattern.len()]);
        let player = query::player(&world);
        assert!(
            !query::touches_wall(&world, player.position, PLAYER_RADIUS),
            "tick {tick}: {:?}",
            player.position
        );
    }
}

#[test]
fn move_command_is_emitted_once_per_frame() {
    let world = corridor_world(WorldPoint::new(1.5, 1.5), 0.0);
    let mut commands = Vec::new();

    PlayerControl.handle(
        &query::player(&world),
        query::tile_map(&world),
        MovementIntent::from_held(true, false, true, false, false, true),
        Duration::from_millis(16),
        |_| false,
        &mut commands,
    );

    assert!(matches!(commands.as_slice(), [Command::MovePlayer { .. }]));
}
