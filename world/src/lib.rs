#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Spray Doom.
//!
//! The [`World`] owns the static city, the tag and decal lists, the player and
//! every simulated entity. Systems never touch it directly: they read through
//! the [`query`] module and submit [`Command`] values which [`apply`] executes,
//! reporting what changed as [`Event`] values. Once an [`Outcome`] is recorded
//! the world is frozen and further commands are ignored.

use std::{f32::consts::TAU, time::Duration};

use spraydoom_core::{
    Actor, Command, Decal, EntityId, Event, Outcome, PoliceState, Tag, TileMap, VehicleCategory,
    WorldPoint, PLAYER_RADIUS, RESOURCE_MAX, WELCOME_BANNER,
};

const DECAL_OFFSET: f32 = 0.12;
const TAG_SPRAY_RESTORE: f32 = 2.0;
const FLASH_RATE: f32 = 6.0;

#[derive(Clone, Copy, Debug)]
struct Player {
    position: WorldPoint,
    heading: f32,
    health: f32,
    spray: f32,
}

#[derive(Clone, Copy, Debug)]
struct Entity {
    id: EntityId,
    position: WorldPoint,
    heading: f32,
    actor: Actor,
}

impl Entity {
    fn is_stunned(&self) -> bool {
        match self.actor {
            Actor::Civilian { stun, .. } => !stun.is_zero(),
            Actor::Police { state, .. } => state == PoliceState::Stunned,
            Actor::Vehicle { .. } => false,
        }
    }
}

/// Represents the authoritative Spray Doom world state.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    map: TileMap,
    tags: Vec<Tag>,
    decals: Vec<Decal>,
    player: Player,
    entities: Vec<Entity>,
    next_entity: u32,
    outcome: Option<Outcome>,
    tick_index: u64,
    frame_dt: Duration,
}

impl World {
    /// Creates a world around a generated city with the player at `spawn`.
    ///
    /// The player starts with full health and a full spray can. Entities are
    /// added afterwards through [`Command::SpawnEntity`].
    #[must_use]
    pub fn new(map: TileMap, tags: Vec<Tag>, spawn: WorldPoint, heading: f32) -> Self {
        Self {
            banner: WELCOME_BANNER,
            map,
            tags,
            decals: Vec::new(),
            player: Player {
                position: spawn,
                heading: heading.rem_euclid(TAU),
                health: RESOURCE_MAX,
                spray: RESOURCE_MAX,
            },
            entities: Vec::new(),
            next_entity: 0,
            outcome: None,
            tick_index: 0,
            frame_dt: Duration::ZERO,
        }
    }

    fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.iter_mut().find(|entity| entity.id == id)
    }

    fn completed_tags(&self) -> usize {
        self.tags.iter().filter(|tag| tag.completed).count()
    }

    fn advance_timers(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        for entity in &mut self.entities {
            match &mut entity.actor {
                Actor::Civilian { stun, .. } => *stun = stun.saturating_sub(dt),
                Actor::Police { state, stun } => {
                    *stun = stun.saturating_sub(dt);
                    if *state == PoliceState::Stunned && stun.is_zero() {
                        *state = PoliceState::Patrol;
                        out_events.push(Event::PoliceStateChanged {
                            entity: entity.id,
                            state: PoliceState::Patrol,
                        });
                    }
                }
                Actor::Vehicle { .. } => {}
            }
        }
    }
}

fn clamp_resource(value: f32) -> f32 {
    value.clamp(0.0, RESOURCE_MAX)
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    if world.outcome.is_some() {
        return;
    }

    match command {
        Command::Tick { dt } => {
            world.tick_index = world.tick_index.saturating_add(1);
            world.frame_dt = dt;
            out_events.push(Event::TimeAdvanced { dt });
            world.advance_timers(dt, out_events);
        }
        Command::MovePlayer { to, heading } => {
            world.player.heading = heading.rem_euclid(TAU);
            if !query::is_blocked(world, to, PLAYER_RADIUS, None) {
                world.player.position = to;
            }
            out_events.push(Event::PlayerMoved {
                to: world.player.position,
            });
        }
        Command::DrainSpray { amount } => {
            world.player.spray = clamp_resource(world.player.spray - amount);
            out_events.push(Event::SprayChanged {
                spray: world.player.spray,
            });
        }
        Command::DamagePlayer { amount } => {
            world.player.health = clamp_resource(world.player.health - amount);
            out_events.push(Event::PlayerDamaged {
                health: world.player.health,
            });
        }
        Command::SpawnEntity {
            position,
            heading,
            actor,
        } => {
            let id = EntityId::new(world.next_entity);
            world.next_entity = world.next_entity.saturating_add(1);
            world.entities.push(Entity {
                id,
                position,
                heading: heading.rem_euclid(TAU),
                actor,
            });
            out_events.push(Event::EntitySpawned {
                entity: id,
                position,
            });
        }
        Command::MoveEntity { entity, to } => {
            let Some(index) = world.entities.iter().position(|e| e.id == entity) else {
                return;
            };
            let current = world.entities[index];
            if current.is_stunned()
                || query::is_blocked(world, to, current.actor.radius(), Some(entity))
            {
                out_events.push(Event::EntityMoveRejected { entity });
                return;
            }
            let phase_step = world.frame_dt.as_secs_f32() * FLASH_RATE;
            let moved = &mut world.entities[index];
            moved.position = to;
            // Lights only cycle while the car is actually driving.
            if let Actor::Vehicle {
                category: VehicleCategory::Police,
                flash_phase,
                ..
            } = &mut moved.actor
            {
                *flash_phase = (*flash_phase + phase_step).rem_euclid(TAU);
            }
            out_events.push(Event::EntityMoved {
                entity,
                from: current.position,
                to,
            });
        }
        Command::TurnEntity { entity, heading } => {
            if let Some(target) = world.entity_mut(entity) {
                target.heading = heading.rem_euclid(TAU);
            }
        }
        Command::AlertPolice { entity } => {
            if let Some(target) = world.entity_mut(entity) {
                if let Actor::Police { state, .. } = &mut target.actor {
                    if *state == PoliceState::Patrol {
                        *state = PoliceState::Chase;
                        out_events.push(Event::PoliceStateChanged {
                            entity,
                            state: PoliceState::Chase,
                        });
                    }
                }
            }
        }
        Command::StunEntity { entity, duration } => {
            let Some(target) = world.entity_mut(entity) else {
                return;
            };
            match &mut target.actor {
                Actor::Civilian { stun, .. } => *stun = duration,
                Actor::Police { state, stun } => {
                    *stun = duration;
                    if *state != PoliceState::Stunned {
                        *state = PoliceState::Stunned;
                        out_events.push(Event::PoliceStateChanged {
                            entity,
                            state: PoliceState::Stunned,
                        });
                    }
                }
                Actor::Vehicle { .. } => return,
            }
            out_events.push(Event::EntityStunned { entity });
        }
        Command::CompleteTag { tag, style } => {
            let Some(target) = world
                .tags
                .iter_mut()
                .find(|candidate| candidate.id == tag && !candidate.completed)
            else {
                return;
            };
            target.completed = true;
            let (nx, ny) = target.face.normal();
            world.decals.push(Decal {
                position: WorldPoint::new(
                    target.position.x + nx * DECAL_OFFSET,
                    target.position.y + ny * DECAL_OFFSET,
                ),
                style,
            });
            world.player.spray = clamp_resource(world.player.spray + TAG_SPRAY_RESTORE);
            out_events.push(Event::SprayChanged {
                spray: world.player.spray,
            });
            out_events.push(Event::TagCompleted {
                tag,
                completed: world.completed_tags(),
                total: world.tags.len(),
            });
        }
        Command::EndSession { outcome } => {
            log::info!(
                "session ended ({outcome:?}) after {} ticks with {}/{} tags",
                world.tick_index,
                world.completed_tags(),
                world.tags.len()
            );
            world.outcome = Some(outcome);
            out_events.push(Event::SessionEnded { outcome });
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use super::World;
    use spraydoom_core::{
        CellCoord, Decal, EntityId, EntitySnapshot, EntityView, Outcome, PlayerSnapshot, Tag,
        TileMap, WorldPoint,
    };

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Provides read-only access to the static city grid.
    #[must_use]
    pub fn tile_map(world: &World) -> &TileMap {
        &world.map
    }

    /// Tag targets in generation order.
    #[must_use]
    pub fn tags(world: &World) -> &[Tag] {
        &world.tags
    }

    /// Decals in the order they were painted.
    #[must_use]
    pub fn decals(world: &World) -> &[Decal] {
        &world.decals
    }

    /// Completed and total tag counts.
    #[must_use]
    pub fn tag_progress(world: &World) -> (usize, usize) {
        (world.completed_tags(), world.tags.len())
    }

    /// Captures the player's current state.
    #[must_use]
    pub fn player(world: &World) -> PlayerSnapshot {
        PlayerSnapshot {
            position: world.player.position,
            heading: world.player.heading,
            health: world.player.health,
            spray: world.player.spray,
        }
    }

    /// Captures a read-only view of every entity ordered by identifier.
    #[must_use]
    pub fn entity_view(world: &World) -> EntityView {
        EntityView::from_snapshots(
            world
                .entities
                .iter()
                .map(|entity| EntitySnapshot {
                    id: entity.id,
                    position: entity.position,
                    heading: entity.heading,
                    actor: entity.actor,
                })
                .collect(),
        )
    }

    /// Result of the session once it has ended.
    #[must_use]
    pub fn outcome(world: &World) -> Option<Outcome> {
        world.outcome
    }

    /// Number of ticks processed so far.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }

    /// Reports whether a circle at `point` overlaps the expanded bounds of a
    /// wall cell in its 3x3 neighbourhood.
    #[must_use]
    pub fn touches_wall(world: &World, point: WorldPoint, radius: f32) -> bool {
        let center = CellCoord::containing(point);
        let reach = 0.5 + radius;
        (-1..=1).any(|rows| {
            (-1..=1).any(|columns| {
                let cell = center.offset(columns, rows);
                if !world.map.wall(cell).is_some_and(|wall| wall.is_solid()) {
                    return false;
                }
                let middle = cell.center();
                (point.x - middle.x).abs() < reach && (point.y - middle.y).abs() < reach
            })
        })
    }

    /// Shared collision test for a circle of `radius` centred at `point`.
    ///
    /// A position is blocked when it leaves the grid, when it overlaps a wall
    /// cell, or when it overlaps any entity other than `ignore`. The player is
    /// not an obstacle for entities; contact with the player is handled as
    /// damage instead.
    #[must_use]
    pub fn is_blocked(
        world: &World,
        point: WorldPoint,
        radius: f32,
        ignore: Option<EntityId>,
    ) -> bool {
        if !world.map.contains(CellCoord::containing(point)) {
            return true;
        }
        if touches_wall(world, point, radius) {
            return true;
        }
        world
            .entities
            .iter()
            .filter(|entity| Some(entity.id) != ignore)
            .any(|entity| {
                let reach = radius + entity.actor.radius();
                entity.position.distance_squared(point) < reach * reach
            })
    }
}

#[cfg(test)]
mod tests {
    use std::f32::consts::FRAC_PI_2;

    use super::*;
    use spraydoom_core::{
        CellCoord, DecalStyle, Face, TagColor, TagId, WallKind, NPC_RADIUS,
    };

    fn open_world() -> World {
        World::new(TileMap::new(10, 10), Vec::new(), WorldPoint::new(1.5, 1.5), 0.0)
    }

    fn tagged_world() -> World {
        let mut map = TileMap::new(10, 10);
        map.set_wall(CellCoord::new(5, 5), WallKind::Brick);
        let tags = vec![
            Tag {
                id: TagId::new(0),
                position: WorldPoint::new(5.5, 4.9),
                face: Face::North,
                completed: false,
                color: TagColor::from_hue(120),
            },
            Tag {
                id: TagId::new(1),
                position: WorldPoint::new(6.1, 5.5),
                face: Face::East,
                completed: false,
                color: TagColor::from_hue(240),
            },
        ];
        World::new(map, tags, WorldPoint::new(5.5, 4.2), FRAC_PI_2)
    }

    fn spawn(world: &mut World, position: WorldPoint, actor: Actor) -> EntityId {
        let mut events = Vec::new();
        apply(
            world,
            Command::SpawnEntity {
                position,
                heading: 0.0,
                actor,
            },
            &mut events,
        );
        match events.as_slice() {
            [Event::EntitySpawned { entity, .. }] => *entity,
            other => panic!("unexpected spawn events: {other:?}"),
        }
    }

    fn patrol() -> Actor {
        Actor::Police {
            state: PoliceState::Patrol,
            stun: Duration::ZERO,
        }
    }

    #[test]
    fn new_world_starts_with_full_resources() {
        let world = open_world();
        let player = query::player(&world);

        assert_eq!(query::welcome_banner(&world), "Spray Doom: NY'90s");
        assert_eq!(player.health, RESOURCE_MAX);
        assert_eq!(player.spray, RESOURCE_MAX);
        assert_eq!(query::outcome(&world), None);
        assert!(query::entity_view(&world).is_empty());
    }

    #[test]
    fn resources_are_clamped() {
        let mut world = open_world();
        let mut events = Vec::new();

        apply(&mut world, Command::DamagePlayer { amount: 250.0 }, &mut events);
        apply(&mut world, Command::DrainSpray { amount: 130.0 }, &mut events);
        apply(&mut world, Command::DamagePlayer { amount: -40.0 }, &mut events);

        let player = query::player(&world);
        assert_eq!(player.spray, 0.0);
        assert_eq!(player.health, 40.0);
        assert_eq!(
            events,
            vec![
                Event::PlayerDamaged { health: 0.0 },
                Event::SprayChanged { spray: 0.0 },
                Event::PlayerDamaged { health: 40.0 },
            ]
        );
    }

    #[test]
    fn spawned_entities_receive_sequential_ids() {
        let mut world = open_world();

        let first = spawn(&mut world, WorldPoint::new(3.5, 3.5), patrol());
        let second = spawn(&mut world, WorldPoint::new(6.5, 6.5), patrol());

        assert_eq!(first, EntityId::new(0));
        assert_eq!(second, EntityId::new(1));
        assert_eq!(query::entity_view(&world).len(), 2);
    }

    #[test]
    fn move_into_wall_is_rejected() {
        let mut world = tagged_world();
        let officer = spawn(&mut world, WorldPoint::new(4.5, 5.5), patrol());
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::MoveEntity {
                entity: officer,
                to: WorldPoint::new(4.9, 5.5),
            },
            &mut events,
        );

        assert_eq!(events, vec![Event::EntityMoveRejected { entity: officer }]);
        let snapshot = *query::entity_view(&world)
            .get(officer)
            .expect("officer exists");
        assert_eq!(snapshot.position, WorldPoint::new(4.5, 5.5));
    }

    #[test]
    fn move_into_other_entity_is_rejected_but_self_is_ignored() {
        let mut world = open_world();
        let first = spawn(&mut world, WorldPoint::new(3.5, 3.5), patrol());
        let _second = spawn(&mut world, WorldPoint::new(4.5, 3.5), patrol());
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::MoveEntity {
                entity: first,
                to: WorldPoint::new(3.6, 3.5),
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::MoveEntity {
                entity: first,
                to: WorldPoint::new(4.1, 3.5),
            },
            &mut events,
        );

        assert_eq!(
            events,
            vec![
                Event::EntityMoved {
                    entity: first,
                    from: WorldPoint::new(3.5, 3.5),
                    to: WorldPoint::new(3.6, 3.5),
                },
                Event::EntityMoveRejected { entity: first },
            ]
        );
    }

    #[test]
    fn leaving_the_grid_is_blocked() {
        let world = open_world();

        assert!(query::is_blocked(&world, WorldPoint::new(-0.1, 2.0), NPC_RADIUS, None));
        assert!(query::is_blocked(&world, WorldPoint::new(2.0, 10.0), NPC_RADIUS, None));
        assert!(!query::is_blocked(&world, WorldPoint::new(0.1, 0.1), NPC_RADIUS, None));
    }

    #[test]
    fn stun_decays_and_officer_returns_to_patrol() {
        let mut world = open_world();
        let officer = spawn(&mut world, WorldPoint::new(3.5, 3.5), patrol());
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::StunEntity {
                entity: officer,
                duration: Duration::from_millis(100),
            },
            &mut events,
        );
        assert_eq!(
            events,
            vec![
                Event::PoliceStateChanged {
                    entity: officer,
                    state: PoliceState::Stunned,
                },
                Event::EntityStunned { entity: officer },
            ]
        );

        events.clear();
        apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_millis(50),
            },
            &mut events,
        );
        assert_eq!(events.len(), 1);

        events.clear();
        apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_millis(50),
            },
            &mut events,
        );
        assert!(events.contains(&Event::PoliceStateChanged {
            entity: officer,
            state: PoliceState::Patrol,
        }));
    }

    #[test]
    fn stunned_entities_cannot_move() {
        let mut world = open_world();
        let civilian = spawn(
            &mut world,
            WorldPoint::new(3.5, 3.5),
            Actor::Civilian {
                stun: Duration::ZERO,
                outfit: 0,
            },
        );
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::StunEntity {
                entity: civilian,
                duration: Duration::from_secs(1),
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::MoveEntity {
                entity: civilian,
                to: WorldPoint::new(3.6, 3.5),
            },
            &mut events,
        );

        assert_eq!(
            events,
            vec![
                Event::EntityStunned { entity: civilian },
                Event::EntityMoveRejected { entity: civilian },
            ]
        );
    }

    #[test]
    fn alert_only_promotes_patrolling_officers() {
        let mut world = open_world();
        let officer = spawn(&mut world, WorldPoint::new(3.5, 3.5), patrol());
        let mut events = Vec::new();

        apply(&mut world, Command::AlertPolice { entity: officer }, &mut events);
        apply(&mut world, Command::AlertPolice { entity: officer }, &mut events);

        assert_eq!(
            events,
            vec![Event::PoliceStateChanged {
                entity: officer,
                state: PoliceState::Chase,
            }]
        );
    }

    fn flash_phase(world: &World, car: EntityId) -> f32 {
        let view = query::entity_view(world);
        let Some(Actor::Vehicle { flash_phase, .. }) = view.get(car).map(|s| s.actor) else {
            panic!("car disappeared");
        };
        flash_phase
    }

    #[test]
    fn police_car_lights_cycle_only_while_driving() {
        let mut world = open_world();
        let car = spawn(
            &mut world,
            WorldPoint::new(3.5, 3.5),
            Actor::Vehicle {
                category: VehicleCategory::Police,
                speed: 2.3,
                flash_phase: 0.0,
                paint: 0,
            },
        );
        let _ = spawn(&mut world, WorldPoint::new(5.5, 3.5), patrol());
        let mut events = Vec::new();
        let tick = Command::Tick {
            dt: Duration::from_millis(50),
        };

        apply(&mut world, tick.clone(), &mut events);
        assert_eq!(flash_phase(&world, car), 0.0);

        apply(
            &mut world,
            Command::MoveEntity {
                entity: car,
                to: WorldPoint::new(3.6, 3.5),
            },
            &mut events,
        );
        assert!((flash_phase(&world, car) - 0.3).abs() < 1e-5);

        apply(&mut world, tick, &mut events);
        events.clear();
        apply(
            &mut world,
            Command::MoveEntity {
                entity: car,
                to: WorldPoint::new(5.3, 3.5),
            },
            &mut events,
        );
        assert_eq!(events, vec![Event::EntityMoveRejected { entity: car }]);
        assert!((flash_phase(&world, car) - 0.3).abs() < 1e-5);
    }

    #[test]
    fn completing_a_tag_paints_one_decal_and_restores_spray() {
        let mut world = tagged_world();
        let mut events = Vec::new();
        apply(&mut world, Command::DrainSpray { amount: 10.0 }, &mut events);
        events.clear();

        apply(
            &mut world,
            Command::CompleteTag {
                tag: TagId::new(0),
                style: DecalStyle::Doom,
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::CompleteTag {
                tag: TagId::new(0),
                style: DecalStyle::Ny90,
            },
            &mut events,
        );

        assert_eq!(
            events,
            vec![
                Event::SprayChanged { spray: 92.0 },
                Event::TagCompleted {
                    tag: TagId::new(0),
                    completed: 1,
                    total: 2,
                },
            ]
        );
        let decals = query::decals(&world);
        assert_eq!(decals.len(), 1);
        assert_eq!(decals[0].style, DecalStyle::Doom);
        assert!((decals[0].position.y - 4.78).abs() < 1e-5);
        assert_eq!(query::tag_progress(&world), (1, 2));
    }

    #[test]
    fn spray_restore_is_capped() {
        let mut world = tagged_world();
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::CompleteTag {
                tag: TagId::new(1),
                style: DecalStyle::Ny90,
            },
            &mut events,
        );

        assert_eq!(query::player(&world).spray, RESOURCE_MAX);
        let decal = query::decals(&world)[0];
        assert!((decal.position.x - 6.22).abs() < 1e-5);
    }

    #[test]
    fn player_moves_are_revalidated() {
        let mut world = tagged_world();
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::MovePlayer {
                to: WorldPoint::new(5.5, 4.9),
                heading: 0.5,
            },
            &mut events,
        );

        let player = query::player(&world);
        assert_eq!(player.position, WorldPoint::new(5.5, 4.2));
        assert_eq!(player.heading, 0.5);
        assert_eq!(
            events,
            vec![Event::PlayerMoved {
                to: WorldPoint::new(5.5, 4.2)
            }]
        );
    }

    #[test]
    fn ended_session_freezes_the_world() {
        let mut world = open_world();
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::EndSession {
                outcome: Outcome::Lost,
            },
            &mut events,
        );
        apply(&mut world, Command::DamagePlayer { amount: 10.0 }, &mut events);
        apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_millis(16),
            },
            &mut events,
        );

        assert_eq!(
            events,
            vec![Event::SessionEnded {
                outcome: Outcome::Lost
            }]
        );
        assert_eq!(query::outcome(&world), Some(Outcome::Lost));
        assert_eq!(query::player(&world).health, RESOURCE_MAX);
        assert_eq!(query::tick_index(&world), 0);
    }
}
