use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::info;

use crate::{
    catalog::{EntityKind, ResourceKind},
    config::FarmConfig,
    farm::Farm,
    grid::{Rotation, Tile},
};

fn default_tick_ms() -> u64 {
    1_000
}

#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    pub name: String,
    pub description: Option<String>,
    pub seed: u64,
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,
    #[serde(default)]
    pub ticks: Option<u64>,
    #[serde(default)]
    pub starting_coins: u64,
    #[serde(default)]
    pub inventory: BTreeMap<ResourceKind, u32>,
    #[serde(default)]
    pub placements: Vec<ScenarioPlacement>,
    #[serde(default)]
    pub config: FarmConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScenarioPlacement {
    pub kind: EntityKind,
    pub x: i32,
    pub z: i32,
    #[serde(default)]
    pub rotation: u8,
}

pub struct ScenarioLoader {
    base_dir: PathBuf,
}

impl ScenarioLoader {
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    pub fn load(&self, file: impl AsRef<Path>) -> Result<Scenario> {
        let path = self.base_dir.join(file);
        let data = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read scenario file {}", path.display()))?;
        let scenario: Scenario = serde_yaml::from_str(&data)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(scenario)
    }
}

impl Scenario {
    /// Builds the starting farm at time zero. Placements go through the normal
    /// operation path, so their build costs come out of the starting coins.
    pub fn build_farm(&self) -> Result<Farm> {
        let mut farm = Farm::new(self.config.clone(), self.seed);
        farm.grant(self.starting_coins, &self.inventory);
        for placement in &self.placements {
            let origin = Tile::new(placement.x, placement.z);
            farm.place(placement.kind, origin, Rotation::new(placement.rotation), 0)
                .with_context(|| {
                    format!(
                        "Scenario '{}' cannot place {} at ({}, {})",
                        self.name, placement.kind, placement.x, placement.z
                    )
                })?;
        }
        info!(
            scenario = %self.name,
            entities = farm.state().entity_count(),
            coins = farm.state().coins(),
            "scenario loaded"
        );
        Ok(farm)
    }

    pub fn ticks(&self, override_ticks: Option<u64>) -> u64 {
        override_ticks.or(self.ticks).unwrap_or(120)
    }
}
