use std::cmp::Ordering;

use spraydoom_core::{Actor, Decal, EntityView, PoliceState, VehicleCategory, WorldPoint};

use crate::{Camera, FrameBuffer, ImageKey, TextureProvider};

const CIVILIAN_SIZE: f32 = 0.65;
const POLICE_SIZE: f32 = 0.85;
const VEHICLE_SIZE: f32 = 1.2;
const DECAL_SIZE: f32 = 0.8;

const STUNNED_CIVILIAN_SHADE: f32 = 0.4;
const STUNNED_POLICE_SHADE: f32 = 0.5;
const DECAL_SHADE: f32 = 0.2;

/// Sprites closer than this depth are culled.
const NEAR_PLANE: f32 = 0.01;

/// Camera-facing image placed in the world.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Billboard {
    /// World position of the sprite's centre.
    pub position: WorldPoint,
    /// Image drawn for the sprite.
    pub image: ImageKey,
    /// On-screen height in world units at unit depth.
    pub size: f32,
    /// Darkening applied to every texel in `0.0..=1.0`.
    pub shade: f32,
}

/// Builds billboards for every entity and decal as seen from `viewer`.
///
/// Vehicles heading towards the viewer show their front image. Police cars
/// flash by the sign of their light phase.
#[must_use]
pub fn billboards(entities: &EntityView, decals: &[Decal], viewer: WorldPoint) -> Vec<Billboard> {
    let mut sprites: Vec<Billboard> = entities
        .iter()
        .map(|entity| {
            let (image, size, shade) = match entity.actor {
                Actor::Civilian { stun, outfit } => {
                    let shade = if stun.is_zero() {
                        0.0
                    } else {
                        STUNNED_CIVILIAN_SHADE
                    };
                    (ImageKey::Civilian { outfit }, CIVILIAN_SIZE, shade)
                }
                Actor::Police { state, .. } => {
                    let shade = if state == PoliceState::Stunned {
                        STUNNED_POLICE_SHADE
                    } else {
                        0.0
                    };
                    (ImageKey::Police, POLICE_SIZE, shade)
                }
                Actor::Vehicle {
                    category,
                    flash_phase,
                    paint,
                    ..
                } => {
                    let toward_viewer = (viewer.x - entity.position.x) * entity.heading.cos()
                        + (viewer.y - entity.position.y) * entity.heading.sin();
                    let front = toward_viewer > 0.0;
                    let image = match (category, front) {
                        (VehicleCategory::Civilian, true) => ImageKey::CarFront { paint },
                        (VehicleCategory::Civilian, false) => ImageKey::CarBack { paint },
                        (VehicleCategory::Police, true) => ImageKey::PoliceCarFront {
                            lights_on: flash_phase.sin() > 0.0,
                        },
                        (VehicleCategory::Police, false) => ImageKey::PoliceCarBack,
                    };
                    (image, VEHICLE_SIZE, 0.0)
                }
            };
            Billboard {
                position: entity.position,
                image,
                size,
                shade,
            }
        })
        .collect();

    sprites.extend(decals.iter().map(|decal| Billboard {
        position: decal.position,
        image: ImageKey::Decal(decal.style),
        size: DECAL_SIZE,
        shade: DECAL_SHADE,
    }));
    sprites
}

/// Draws billboards far to near, clipping each column against the wall depth.
///
/// Sprites never write depth, so overlap between sprites is resolved only by
/// draw order. Returns the number of texels that could not be sampled.
pub(crate) fn project<T: TextureProvider>(
    camera: &Camera,
    sprites: &[Billboard],
    textures: &T,
    frame: &mut FrameBuffer,
) -> u32 {
    let eye = camera.position();
    let mut ordered: Vec<&Billboard> = sprites.iter().collect();
    ordered.sort_by(|a, b| {
        let da = (a.position.x - eye.x).powi(2) + (a.position.y - eye.y).powi(2);
        let db = (b.position.x - eye.x).powi(2) + (b.position.y - eye.y).powi(2);
        db.partial_cmp(&da).unwrap_or(Ordering::Equal)
    });

    let (width, height) = (frame.width() as f32, frame.height() as f32);
    let mut skipped = 0;
    for sprite in ordered {
        let view = camera.to_camera_space(sprite.position);
        if view.y <= NEAR_PLANE {
            continue;
        }
        let Some((image_width, image_height)) = textures.dimensions(sprite.image) else {
            skipped += 1;
            continue;
        };

        let screen_x = width / 2.0 * (1.0 + view.x / view.y);
        let extent = (height / view.y * sprite.size).abs();
        if extent < 1.0 {
            continue;
        }
        let left = screen_x - extent / 2.0;
        let top = height / 2.0 - extent / 2.0;
        let first_column = left.max(0.0) as u32;
        let last_column = (left + extent).min(width) as u32;
        let first_row = top.max(0.0) as u32;
        let last_row = (top + extent).min(height) as u32;

        for column in first_column..last_column {
            let nearer_than_wall = frame
                .depth()
                .get(column as usize)
                .is_some_and(|&wall| view.y < wall);
            if !nearer_than_wall {
                continue;
            }
            let u = (column as f32 + 0.5 - left) / extent;
            let texel_x = ((u * image_width as f32) as u32).min(image_width - 1);
            for row in first_row..last_row {
                let v = (row as f32 + 0.5 - top) / extent;
                let texel_y = ((v * image_height as f32) as u32).min(image_height - 1);
                match textures.sample(sprite.image, texel_x, texel_y) {
                    Ok(texel) if texel.is_transparent() => {}
                    Ok(texel) => frame.blend(column, row, texel.darken(sprite.shade)),
                    Err(_) => skipped += 1,
                }
            }
        }
    }
    skipped
}

#[cfg(test)]
mod tests {
    use super::*;
    use spraydoom_core::{DecalStyle, EntityId, EntitySnapshot};
    use std::time::Duration;

    fn vehicle(heading: f32, category: VehicleCategory, flash_phase: f32) -> EntityView {
        EntityView::from_snapshots(vec![EntitySnapshot {
            id: EntityId::new(0),
            position: WorldPoint::new(5.0, 5.0),
            heading,
            actor: Actor::Vehicle {
                category,
                speed: 1.8,
                flash_phase,
                paint: 3,
            },
        }])
    }

    #[test]
    fn approaching_cars_show_their_front() {
        let viewer = WorldPoint::new(9.0, 5.0);

        let towards = billboards(&vehicle(0.0, VehicleCategory::Civilian, 0.0), &[], viewer);
        let away = billboards(
            &vehicle(std::f32::consts::PI, VehicleCategory::Civilian, 0.0),
            &[],
            viewer,
        );

        assert_eq!(towards[0].image, ImageKey::CarFront { paint: 3 });
        assert_eq!(away[0].image, ImageKey::CarBack { paint: 3 });
        assert_eq!(towards[0].size, VEHICLE_SIZE);
    }

    #[test]
    fn police_cars_flash_by_phase() {
        let viewer = WorldPoint::new(9.0, 5.0);

        let lit = billboards(&vehicle(0.0, VehicleCategory::Police, 1.0), &[], viewer);
        let dark = billboards(&vehicle(0.0, VehicleCategory::Police, 4.0), &[], viewer);
        let back = billboards(
            &vehicle(std::f32::consts::PI, VehicleCategory::Police, 1.0),
            &[],
            viewer,
        );

        assert_eq!(lit[0].image, ImageKey::PoliceCarFront { lights_on: true });
        assert_eq!(dark[0].image, ImageKey::PoliceCarFront { lights_on: false });
        assert_eq!(back[0].image, ImageKey::PoliceCarBack);
    }

    #[test]
    fn stunned_pedestrians_and_decals_are_shaded() {
        let entities = EntityView::from_snapshots(vec![
            EntitySnapshot {
                id: EntityId::new(0),
                position: WorldPoint::new(1.0, 1.0),
                heading: 0.0,
                actor: Actor::Civilian {
                    stun: Duration::from_millis(300),
                    outfit: 1,
                },
            },
            EntitySnapshot {
                id: EntityId::new(1),
                position: WorldPoint::new(2.0, 1.0),
                heading: 0.0,
                actor: Actor::Police {
                    state: PoliceState::Stunned,
                    stun: Duration::from_millis(300),
                },
            },
        ]);
        let decals = [Decal {
            position: WorldPoint::new(3.0, 1.0),
            style: DecalStyle::Doom,
        }];

        let sprites = billboards(&entities, &decals, WorldPoint::new(0.0, 0.0));
        let shades: Vec<f32> = sprites.iter().map(|sprite| sprite.shade).collect();

        assert_eq!(shades, vec![0.4, 0.5, 0.2]);
        assert_eq!(sprites[2].image, ImageKey::Decal(DecalStyle::Doom));
    }
}
