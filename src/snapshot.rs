//! Persisted farm layout and the JSON writer behind the persistence hook.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::catalog::ResourceKind;
use crate::config::FarmConfig;
use crate::crops::CropInstance;
use crate::dispatch::{FarmerAgent, PendingCollection};
use crate::grid::GridIndex;
use crate::world::{PlacedEntity, SimulationState};

/// Everything needed to bring a farm back after a restart. The grid index and
/// ledger capacity are derived and rebuilt on load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FarmSnapshot {
    pub user: String,
    pub saved_at: DateTime<Utc>,
    pub grid_size: u32,
    pub expansions: u32,
    pub entities: Vec<PlacedEntity>,
    pub crops: Vec<CropInstance>,
    pub inventory: BTreeMap<ResourceKind, u32>,
    pub pending: Vec<PendingCollection>,
    pub agents: Vec<FarmerAgent>,
    pub coins: u64,
    pub experience: u64,
    pub growth_multiplier: f64,
    pub last_daily_reset_day: u64,
    pub next_entity: u64,
    pub next_collection: u64,
    pub next_agent: u32,
}

impl FarmSnapshot {
    pub fn from_state(user: &str, world: &SimulationState) -> Self {
        Self {
            user: user.to_string(),
            saved_at: Utc::now(),
            grid_size: world.grid.size(),
            expansions: world.expansions,
            entities: world.entities.values().cloned().collect(),
            crops: world.crops.values().cloned().collect(),
            inventory: world.inventory.quantities().clone(),
            pending: world.pending.clone(),
            agents: world.agents.clone(),
            coins: world.coins,
            experience: world.experience,
            growth_multiplier: world.growth_multiplier,
            last_daily_reset_day: world.last_daily_reset_day,
            next_entity: world.next_entity,
            next_collection: world.next_collection,
            next_agent: world.next_agent,
        }
    }

    pub fn into_state(self, config: &FarmConfig) -> SimulationState {
        let mut world = SimulationState::new(config);
        world.grid = GridIndex::new(self.grid_size, config.edge_margin);
        for entity in self.entities {
            world.grid.insert(entity.id, entity.kind, entity.footprint());
            world.entities.insert(entity.id, entity);
        }
        world.crops = self
            .crops
            .into_iter()
            .filter(|crop| world.entities.contains_key(&crop.entity))
            .map(|crop| (crop.entity, crop))
            .collect();
        for (resource, amount) in self.inventory {
            world.inventory.force_add(resource, amount);
        }
        world.pending = self.pending;
        world.agents = self.agents;
        world.coins = self.coins;
        world.experience = self.experience;
        world.growth_multiplier = self.growth_multiplier;
        world.expansions = self.expansions;
        world.last_daily_reset_day = self.last_daily_reset_day;
        world.next_entity = self.next_entity;
        world.next_collection = self.next_collection;
        world.next_agent = self.next_agent;
        world.refresh_capacity();
        world
    }
}

/// Receives the full farm state after every change that should survive a
/// restart.
pub trait PersistenceHook: Send {
    fn persist(&mut self, snapshot: &FarmSnapshot) -> Result<()>;
}

/// Writes `<dir>/<user>.json`, replacing the previous save.
pub struct SnapshotWriter {
    dir: PathBuf,
}

impl SnapshotWriter {
    pub fn new(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create snapshot dir {}", dir.display()))?;
        Ok(Self { dir })
    }

    pub fn path_for(&self, user: &str) -> PathBuf {
        snapshot_path(&self.dir, user)
    }
}

impl PersistenceHook for SnapshotWriter {
    fn persist(&mut self, snapshot: &FarmSnapshot) -> Result<()> {
        let path = self.path_for(&snapshot.user);
        let json = serde_json::to_string_pretty(snapshot)?;
        fs::write(&path, json).with_context(|| format!("Failed to write {}", path.display()))?;
        debug!(path = %path.display(), "snapshot written");
        Ok(())
    }
}

fn snapshot_path(dir: &Path, user: &str) -> PathBuf {
    dir.join(format!("{user}.json"))
}

pub fn load_snapshot(dir: impl AsRef<Path>, user: &str) -> Result<FarmSnapshot> {
    let path = snapshot_path(dir.as_ref(), user);
    let data = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read snapshot {}", path.display()))?;
    let snapshot = serde_json::from_str(&data)
        .with_context(|| format!("Failed to parse snapshot {}", path.display()))?;
    Ok(snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::EntityKind;
    use crate::grid::{Rotation, Tile};

    #[test]
    fn restore_rebuilds_grid_and_capacity() {
        let config = FarmConfig::default();
        let mut world = SimulationState::new(&config);
        world.set_coins(5_000);
        let barn = world
            .place(EntityKind::Barn, Tile::new(2, 2), Rotation::new(1), 0)
            .unwrap();
        world.seed_inventory(ResourceKind::Egg, 12);

        let restored = FarmSnapshot::from_state("ada", &world).into_state(&config);
        assert_eq!(restored.grid(), world.grid());
        assert_eq!(restored.inventory().capacity(), 150);
        assert_eq!(restored.inventory().get(ResourceKind::Egg), 12);
        assert_eq!(restored.entity(barn), world.entity(barn));
    }
}
