use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::catalog::{EntityKind, ResourceKind};
use crate::config::FarmConfig;
use crate::crops::CropInstance;
use crate::dispatch::{FarmerAgent, PendingCollection};
use crate::error::SimError;
use crate::grid::{Footprint, GridIndex, Rotation, Tile};
use crate::inventory::Inventory;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(u64);

impl EntityId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacedEntity {
    pub id: EntityId,
    pub kind: EntityKind,
    pub origin: Tile,
    pub rotation: Rotation,
    pub level: u8,
    /// `None` until the first tick after placement seeds the production clock.
    #[serde(default)]
    pub last_production_at: Option<u64>,
}

impl PlacedEntity {
    pub fn footprint(&self) -> Footprint {
        Footprint::of(self.kind, self.origin, self.rotation)
    }
}

/// Every piece of mutable farm state. Operations and systems receive it by
/// `&mut`; nothing else holds authoritative copies.
#[derive(Debug, Clone)]
pub struct SimulationState {
    pub(crate) grid: GridIndex,
    pub(crate) entities: BTreeMap<EntityId, PlacedEntity>,
    pub(crate) crops: BTreeMap<EntityId, CropInstance>,
    pub(crate) inventory: Inventory,
    pub(crate) pending: Vec<PendingCollection>,
    pub(crate) agents: Vec<FarmerAgent>,
    pub(crate) coins: u64,
    pub(crate) experience: u64,
    pub(crate) growth_multiplier: f64,
    pub(crate) expansions: u32,
    pub(crate) last_daily_reset_day: u64,
    pub(crate) base_capacity: u32,
    pub(crate) next_entity: u64,
    pub(crate) next_collection: u64,
    pub(crate) next_agent: u32,
}

impl SimulationState {
    pub fn new(config: &FarmConfig) -> Self {
        Self {
            grid: GridIndex::new(config.grid_size, config.edge_margin),
            entities: BTreeMap::new(),
            crops: BTreeMap::new(),
            inventory: Inventory::with_capacity(config.base_capacity),
            pending: Vec::new(),
            agents: Vec::new(),
            coins: 0,
            experience: 0,
            growth_multiplier: 1.0,
            expansions: 0,
            last_daily_reset_day: 0,
            base_capacity: config.base_capacity,
            next_entity: 1,
            next_collection: 1,
            next_agent: 1,
        }
    }

    pub fn grid(&self) -> &GridIndex {
        &self.grid
    }

    pub fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    pub fn coins(&self) -> u64 {
        self.coins
    }

    pub fn experience(&self) -> u64 {
        self.experience
    }

    pub fn growth_multiplier(&self) -> f64 {
        self.growth_multiplier
    }

    pub fn expansions(&self) -> u32 {
        self.expansions
    }

    pub fn last_daily_reset_day(&self) -> u64 {
        self.last_daily_reset_day
    }

    pub fn entity(&self, id: EntityId) -> Option<&PlacedEntity> {
        self.entities.get(&id)
    }

    /// Entities in id order.
    pub fn entities(&self) -> impl Iterator<Item = &PlacedEntity> {
        self.entities.values()
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    pub fn crop(&self, id: EntityId) -> Option<&CropInstance> {
        self.crops.get(&id)
    }

    pub fn crops(&self) -> impl Iterator<Item = &CropInstance> {
        self.crops.values()
    }

    pub fn pending(&self) -> &[PendingCollection] {
        &self.pending
    }

    pub fn agents(&self) -> &[FarmerAgent] {
        &self.agents
    }

    pub fn houses(&self) -> impl Iterator<Item = &PlacedEntity> {
        self.entities.values().filter(|e| e.kind.is_house())
    }

    #[cfg(test)]
    pub(crate) fn set_coins(&mut self, coins: u64) {
        self.coins = coins;
    }

    pub(crate) fn seed_inventory(&mut self, resource: ResourceKind, amount: u32) {
        self.inventory.force_add(resource, amount);
    }

    pub(crate) fn spend(&mut self, amount: u64) -> Result<(), SimError> {
        if self.coins < amount {
            return Err(SimError::InsufficientFunds {
                needed: amount,
                available: self.coins,
            });
        }
        self.coins -= amount;
        Ok(())
    }

    pub(crate) fn earn(&mut self, amount: u64) {
        self.coins = self.coins.saturating_add(amount);
    }

    pub(crate) fn gain_experience(&mut self, amount: u64) {
        self.experience = self.experience.saturating_add(amount);
    }

    /// Grid legality plus build cost, without writing anything.
    pub fn check_placement(
        &self,
        kind: EntityKind,
        origin: Tile,
        rotation: Rotation,
    ) -> Result<Footprint, SimError> {
        let footprint = self.grid.check(kind, origin, rotation)?;
        let cost = kind.descriptor().build_cost;
        if self.coins < cost {
            return Err(SimError::InsufficientFunds {
                needed: cost,
                available: self.coins,
            });
        }
        Ok(footprint)
    }

    pub fn can_place(&self, kind: EntityKind, origin: Tile, rotation: Rotation) -> bool {
        self.check_placement(kind, origin, rotation).is_ok()
    }

    pub(crate) fn place(
        &mut self,
        kind: EntityKind,
        origin: Tile,
        rotation: Rotation,
        now: u64,
    ) -> Result<EntityId, SimError> {
        let footprint = self.check_placement(kind, origin, rotation)?;
        self.spend(kind.descriptor().build_cost)?;
        let id = self.allocate_entity();
        self.grid.insert(id, kind, footprint);
        self.entities.insert(
            id,
            PlacedEntity {
                id,
                kind,
                origin,
                rotation,
                level: 1,
                last_production_at: None,
            },
        );
        if kind.crop_spec().is_some() {
            self.crops
                .insert(id, CropInstance::plant(id, kind, origin, now));
        }
        if kind.is_storage() {
            self.refresh_capacity();
        }
        Ok(id)
    }

    /// Unregisters an entity from the grid, the crop engine and the entity
    /// table in one step. A plot takes the crop growing on it along.
    pub(crate) fn remove(&mut self, id: EntityId) -> Result<Vec<PlacedEntity>, SimError> {
        let entity = self
            .entities
            .get(&id)
            .cloned()
            .ok_or(SimError::EntityNotFound(id))?;
        let stacked: Vec<EntityId> = self
            .grid
            .occupied_tiles(id)
            .unwrap_or(&[])
            .iter()
            .filter_map(|tile| self.grid.crop_at(*tile))
            .filter(|crop| *crop != id)
            .collect();

        let mut removed = Vec::with_capacity(1 + stacked.len());
        for crop_id in stacked {
            if let Some(crop) = self.detach(crop_id) {
                removed.push(crop);
            }
        }
        self.detach(id);
        removed.push(entity.clone());
        if entity.kind.is_storage() {
            self.refresh_capacity();
        }
        Ok(removed)
    }

    fn detach(&mut self, id: EntityId) -> Option<PlacedEntity> {
        self.grid.remove(id);
        self.crops.remove(&id);
        self.entities.remove(&id)
    }

    pub(crate) fn refresh_capacity(&mut self) {
        let storage: u32 = self
            .entities
            .values()
            .map(|e| e.kind.storage_capacity(e.level))
            .sum();
        self.inventory
            .set_capacity(self.base_capacity.saturating_add(storage));
    }

    pub(crate) fn push_pending(
        &mut self,
        resource: ResourceKind,
        amount: u32,
        produced_at: u64,
        source: Tile,
    ) -> u64 {
        let id = self.next_collection;
        self.next_collection += 1;
        self.pending.push(PendingCollection {
            id,
            resource,
            amount,
            produced_at,
            source,
            collected: false,
            assigned_agent: None,
        });
        id
    }

    pub(crate) fn allocate_agent(&mut self) -> u32 {
        let id = self.next_agent;
        self.next_agent += 1;
        id
    }

    fn allocate_entity(&mut self) -> EntityId {
        let id = EntityId(self.next_entity);
        self.next_entity += 1;
        id
    }
}
