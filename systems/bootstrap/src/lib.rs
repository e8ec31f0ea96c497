#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Bootstrap system that turns a seed into a ready-to-play session.
//!
//! Start-up draws from a single [`SimRng`] in a fixed order: the block
//! lattice, the city, the player's initial heading and finally the
//! population. The same stream is handed back for per-frame AI so a seed
//! replays the whole session.

use spraydoom_core::{CellCoord, Command, SimRng};
use spraydoom_system_citygen::{CityConfig, CityGenError, CityGenerator};
use spraydoom_system_spawning::{populate, Population, SpawnReport};
use spraydoom_world::{apply, query, World};
use thiserror::Error;

/// Errors that prevent a session from starting.
#[derive(Debug, Error)]
pub enum BootstrapError {
    /// The city generator rejected its configuration.
    #[error("city generation failed")]
    City(#[from] CityGenError),
    /// The generated city offers nothing to tag, so it can never be won.
    #[error("generated city for seed {seed} contains no tag targets")]
    NoTags {
        /// Seed that produced the city.
        seed: u32,
    },
}

/// Freshly initialised session state.
#[derive(Debug)]
pub struct Session {
    /// Seed the session was derived from.
    pub seed: u32,
    /// Block lattice drawn for the city.
    pub layout: CityConfig,
    /// Authoritative world populated with the player and every entity.
    pub world: World,
    /// Stream to keep drawing from for per-frame AI.
    pub rng: SimRng,
    /// Intersection cells that seeded crosswalks.
    pub crosswalk_origins: Vec<CellCoord>,
    /// Outcome of the population pass.
    pub spawn_report: SpawnReport,
}

/// Pure bootstrap system preparing the Spray Doom experience.
#[derive(Debug, Default)]
pub struct Bootstrap;

impl Bootstrap {
    /// Derives the banner that should be shown when the experience starts.
    #[must_use]
    pub fn welcome_banner<'world>(&self, world: &'world World) -> &'world str {
        query::welcome_banner(world)
    }

    /// Generates the city, places the player and spawns the population.
    pub fn start(&self, seed: u32) -> Result<Session, BootstrapError> {
        let mut rng = SimRng::from_seed(seed);
        let layout = CityConfig::random(&mut rng);
        let city = CityGenerator::new(layout).generate(&mut rng)?;
        if city.tags.is_empty() {
            return Err(BootstrapError::NoTags { seed });
        }
        log::info!(
            "seed {seed}: {}x{} blocks, {}x{} tiles, {} tags",
            layout.block_columns(),
            layout.block_rows(),
            city.map.columns(),
            city.map.rows(),
            city.tags.len()
        );

        let heading = rng.angle();
        let mut world = World::new(city.map, city.tags, city.spawn, heading);

        let population = Population::for_area(query::tile_map(&world).area());
        let mut commands: Vec<Command> = Vec::with_capacity(population.total() as usize);
        let spawn_report = populate(
            query::tile_map(&world),
            population,
            &mut rng,
            |point, radius| query::is_blocked(&world, point, radius, None),
            &mut commands,
        );

        let mut events = Vec::with_capacity(commands.len());
        for command in commands {
            apply(&mut world, command, &mut events);
        }

        Ok(Session {
            seed,
            layout,
            world,
            rng,
            crosswalk_origins: city.crosswalk_origins,
            spawn_report,
        })
    }
}
