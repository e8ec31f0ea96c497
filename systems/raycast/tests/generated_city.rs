use std::f32::consts::TAU;

use spraydoom_core::SimRng;
use spraydoom_system_citygen::{CityConfig, CityGenerator};
use spraydoom_system_raycast::{cast_ray, has_line_of_sight};

#[test]
fn every_ray_from_spawn_terminates_on_a_wall() {
    let mut rng = SimRng::from_seed(1_994);
    let city = CityGenerator::new(CityConfig::new(6, 5))
        .generate(&mut rng)
        .expect("city generates");
    let map = &city.map;
    let diagonal = (map.columns() as f32).hypot(map.rows() as f32);

    for step in 0..360 {
        let angle = TAU * step as f32 / 360.0;
        let hit = cast_ray(map, city.spawn, angle);

        assert!(hit.distance > 0.0 && hit.distance.is_finite());
        assert!(hit.distance <= diagonal + 1.0, "angle {angle}: {hit:?}");
        assert!(hit.wall.is_solid());
        assert!((0.0..=1.0).contains(&hit.texture_u));
        match map.wall(hit.cell) {
            Some(wall) => assert_eq!(wall, hit.wall),
            None => assert!(!map.contains(hit.cell)),
        }
    }
}

#[test]
fn spawn_sees_itself() {
    let mut rng = SimRng::from_seed(7);
    let city = CityGenerator::new(CityConfig::new(6, 5))
        .generate(&mut rng)
        .expect("city generates");

    assert!(has_line_of_sight(&city.map, city.spawn, city.spawn));
}
