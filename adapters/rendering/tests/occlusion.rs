use std::time::Duration;

use spraydoom_core::{
    Actor, CellCoord, EntityId, EntitySnapshot, EntityView, PlayerSnapshot, PoliceState,
    TileMap, WallKind, WorldPoint,
};
use spraydoom_rendering::{FrameBuffer, ProceduralTextures, RaycastRenderer, RenderInput};

fn officer_at(x: f32, y: f32) -> EntityView {
    EntityView::from_snapshots(vec![EntitySnapshot {
        id: EntityId::new(0),
        position: WorldPoint::new(x, y),
        heading: 0.0,
        actor: Actor::Police {
            state: PoliceState::Patrol,
            stun: Duration::ZERO,
        },
    }])
}

fn render(map: &TileMap, entities: &EntityView) -> FrameBuffer {
    let renderer = RaycastRenderer::new(ProceduralTextures::new());
    let mut frame = FrameBuffer::new(64, 48).expect("valid frame");
    let input = RenderInput {
        map,
        player: PlayerSnapshot {
            position: WorldPoint::new(1.5, 2.5),
            heading: 0.0,
            health: 100.0,
            spray: 100.0,
        },
        entities,
        decals: &[],
        spraying: false,
    };
    let stats = renderer.render(&input, &mut frame).expect("frame renders");
    assert_eq!(stats.skipped_samples, 0);
    frame
}

#[test]
fn visible_officer_is_drawn_over_the_background() {
    let map = TileMap::new(12, 5);

    let empty = render(&map, &EntityView::default());
    let occupied = render(&map, &officer_at(4.5, 2.5));

    assert_ne!(empty.get(32, 24), occupied.get(32, 24));
    assert_eq!(empty.get(2, 2), occupied.get(2, 2));
}

#[test]
fn officer_behind_a_wall_is_hidden() {
    let mut map = TileMap::new(12, 5);
    for row in 0..5 {
        map.set_wall(CellCoord::new(3, row), WallKind::Brick);
    }

    let empty = render(&map, &EntityView::default());
    let occupied = render(&map, &officer_at(4.5, 2.5));

    assert_eq!(empty, occupied);
}

#[test]
fn officer_behind_the_camera_is_culled() {
    let map = TileMap::new(12, 5);

    let empty = render(&map, &EntityView::default());
    let behind = render(&map, &officer_at(0.5, 2.5));

    assert_eq!(empty, behind);
}
