use std::{fs, path::Path};

use anyhow::{Context, Result};
use serde::Serialize;
use spraydoom_core::{CellCoord, Tag, TileMap, WorldPoint};
use spraydoom_system_bootstrap::Session;
use spraydoom_world::query;

/// JSON document describing a generated city.
#[derive(Debug, Serialize)]
pub(crate) struct CityExport<'a> {
    /// Seed the city was generated from.
    seed: u32,
    /// Number of building blocks along the x axis.
    block_columns: u32,
    /// Number of building blocks along the y axis.
    block_rows: u32,
    /// Player start position.
    spawn: WorldPoint,
    /// Wall and floor layers.
    map: &'a TileMap,
    /// Every tag target.
    tags: &'a [Tag],
    /// Centres of the painted crosswalk clusters.
    crosswalk_origins: &'a [CellCoord],
}

impl<'a> CityExport<'a> {
    pub(crate) fn from_session(session: &'a Session) -> Self {
        Self {
            seed: session.seed,
            block_columns: session.layout.block_columns(),
            block_rows: session.layout.block_rows(),
            spawn: query::player(&session.world).position,
            map: query::tile_map(&session.world),
            tags: query::tags(&session.world),
            crosswalk_origins: &session.crosswalk_origins,
        }
    }

    pub(crate) fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("failed to serialise city")
    }
}

/// Writes the session's city to `path` as pretty-printed JSON.
pub(crate) fn write_city(session: &Session, path: &Path) -> Result<()> {
    let json = CityExport::from_session(session).to_json()?;
    fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))?;
    log::info!("exported city for seed {} to {}", session.seed, path.display());
    Ok(())
}
