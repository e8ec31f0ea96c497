use std::{
    collections::hash_map::DefaultHasher,
    hash::{Hash, Hasher},
};

use spraydoom_core::FloorKind;
use spraydoom_system_bootstrap::{Bootstrap, Session};
use spraydoom_world::query;

fn fingerprint(session: &Session) -> u64 {
    let mut hasher = DefaultHasher::new();
    let world = &session.world;
    let map = query::tile_map(world);
    map.walls().hash(&mut hasher);
    map.floors().hash(&mut hasher);
    for tag in query::tags(world) {
        tag.id.hash(&mut hasher);
        tag.position.x.to_bits().hash(&mut hasher);
        tag.position.y.to_bits().hash(&mut hasher);
    }
    let player = query::player(world);
    player.position.x.to_bits().hash(&mut hasher);
    player.position.y.to_bits().hash(&mut hasher);
    player.heading.to_bits().hash(&mut hasher);
    for entity in query::entity_view(world).iter() {
        entity.id.hash(&mut hasher);
        entity.position.x.to_bits().hash(&mut hasher);
        entity.position.y.to_bits().hash(&mut hasher);
        entity.heading.to_bits().hash(&mut hasher);
    }
    hasher.finish()
}

#[test]
fn sessions_replay_from_their_seed() {
    for seed in [0, 42, 90_210, u32::MAX] {
        let first = Bootstrap.start(seed).expect("session starts");
        let second = Bootstrap.start(seed).expect("session starts");

        assert_eq!(fingerprint(&first), fingerprint(&second), "seed {seed}");
        assert_eq!(first.layout, second.layout);
        assert_eq!(first.crosswalk_origins, second.crosswalk_origins);
    }
}

#[test]
fn layouts_stay_within_the_block_ranges() {
    for seed in 0..12 {
        let session = Bootstrap.start(seed).expect("session starts");

        assert!((6..=9).contains(&session.layout.block_columns()));
        assert!((5..=7).contains(&session.layout.block_rows()));
        assert_eq!(
            query::tile_map(&session.world).columns(),
            session.layout.map_columns()
        );
    }
}

#[test]
fn player_starts_on_a_sidewalk_with_full_resources() {
    let session = Bootstrap.start(7).expect("session starts");
    let player = query::player(&session.world);

    assert_eq!(
        query::tile_map(&session.world).floor_at(player.position),
        Some(FloorKind::Sidewalk)
    );
    assert_eq!(player.health, 100.0);
    assert_eq!(player.spray, 100.0);
    assert_eq!(query::outcome(&session.world), None);
}
