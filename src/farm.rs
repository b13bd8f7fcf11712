//! Player-facing facade over the simulation.
//!
//! `Farm` owns the state, the tick engine and the host hooks. Every operation
//! validates fully before it writes, reports failures through the
//! notification sink, and hands the resulting events to the observers and
//! mission hooks before persisting.

use std::collections::BTreeMap;

use rand::Rng;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::catalog::{EntityKind, ResourceKind};
use crate::config::FarmConfig;
use crate::crops::{CropStage, WaterOutcome};
use crate::engine::{Engine, EngineBuilder, SimulatedClock, TickSummary};
use crate::error::SimError;
use crate::events::{
    EntityObserver, LogNotifier, MissionAction, MissionHook, NotificationSink, RemovalReason,
    Severity, SimEvent,
};
use crate::grid::{Rotation, Tile};
use crate::power::PowerBalance;
use crate::snapshot::{FarmSnapshot, PersistenceHook};
use crate::upgrade::{self, UpgradeOutcome};
use crate::world::{EntityId, SimulationState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HarvestOutcome {
    pub id: EntityId,
    pub kind: EntityKind,
    pub resource: ResourceKind,
    pub amount: u32,
    /// Trees stay in place and start a new cycle.
    pub regrowing: bool,
}

/// Read-only summary for HUDs and the web feed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FarmView {
    pub coins: u64,
    pub experience: u64,
    pub inventory: BTreeMap<ResourceKind, u32>,
    pub inventory_total: u32,
    pub capacity: u32,
    pub power: PowerBalance,
    pub powered: bool,
    pub growth_multiplier: f64,
    pub grid_size: u32,
    pub entities: usize,
    pub crops: usize,
    pub pending_collections: usize,
    pub agents: usize,
}

pub struct Farm {
    config: FarmConfig,
    state: SimulationState,
    engine: Engine,
    observers: Vec<Box<dyn EntityObserver>>,
    missions: Vec<Box<dyn MissionHook>>,
    notifier: Box<dyn NotificationSink>,
    persistence: Option<Box<dyn PersistenceHook>>,
}

impl Farm {
    pub fn new(config: FarmConfig, seed: u64) -> Self {
        let state = SimulationState::new(&config);
        Self::with_state(config, state, seed)
    }

    /// Rebuilds a farm from a saved snapshot. Agents mid-trip resume their
    /// legs on the next tick.
    pub fn restore(config: FarmConfig, snapshot: FarmSnapshot, seed: u64) -> Self {
        let state = snapshot.into_state(&config);
        Self::with_state(config, state, seed)
    }

    fn with_state(config: FarmConfig, state: SimulationState, seed: u64) -> Self {
        Self {
            config,
            state,
            engine: EngineBuilder::standard(seed).build(),
            observers: Vec::new(),
            missions: Vec::new(),
            notifier: Box::new(LogNotifier),
            persistence: None,
        }
    }

    pub fn add_observer(&mut self, observer: impl EntityObserver + 'static) {
        self.observers.push(Box::new(observer));
    }

    pub fn add_mission_hook(&mut self, hook: impl MissionHook + 'static) {
        self.missions.push(Box::new(hook));
    }

    pub fn set_notifier(&mut self, notifier: impl NotificationSink + 'static) {
        self.notifier = Box::new(notifier);
    }

    pub fn set_persistence(&mut self, hook: impl PersistenceHook + 'static) {
        self.persistence = Some(Box::new(hook));
    }

    pub fn config(&self) -> &FarmConfig {
        &self.config
    }

    pub fn state(&self) -> &SimulationState {
        &self.state
    }

    /// Starting funds and stock, applied outside the operation pipeline.
    pub fn grant(&mut self, coins: u64, inventory: &BTreeMap<ResourceKind, u32>) {
        self.state.earn(coins);
        for (resource, amount) in inventory {
            self.state.seed_inventory(*resource, *amount);
        }
    }

    pub fn can_place(&self, kind: EntityKind, origin: Tile, rotation: Rotation) -> bool {
        self.state.can_place(kind, origin, rotation)
    }

    /// Places any kind, crops and trees included. A crop needs a free plot
    /// under it.
    pub fn place(
        &mut self,
        kind: EntityKind,
        origin: Tile,
        rotation: Rotation,
        now: u64,
    ) -> Result<EntityId, SimError> {
        let result = self.state.place(kind, origin, rotation, now);
        let id = self.check(result)?;
        self.state.gain_experience(self.config.build_experience);
        info!(entity = %id, %kind, x = origin.x, z = origin.z, "placed");

        let mut events = Vec::with_capacity(2);
        if let Some(entity) = self.state.entity(id) {
            events.push(SimEvent::EntityPlaced {
                entity: entity.clone(),
            });
        }
        events.push(SimEvent::mission(MissionAction::Build, kind.as_str(), 1));
        self.publish(&events);
        self.persist();
        Ok(id)
    }

    pub fn remove(&mut self, id: EntityId) -> Result<(), SimError> {
        let result = self.state.remove(id);
        let removed = self.check(result)?;
        let events: Vec<SimEvent> = removed
            .into_iter()
            .map(|entity| SimEvent::EntityRemoved {
                id: entity.id,
                kind: entity.kind,
                reason: RemovalReason::Demolished,
            })
            .collect();
        info!(entity = %id, removed = events.len(), "removed");
        self.publish(&events);
        self.persist();
        Ok(())
    }

    /// Spends one water bucket on the crop. Watering a crop that already has
    /// all the water it needs is a no-op.
    pub fn water(&mut self, id: EntityId, now: u64) -> Result<WaterOutcome, SimError> {
        let result = self.try_water(id, now);
        let outcome = self.check(result)?;
        if let WaterOutcome::Watered { count } = outcome {
            debug!(entity = %id, count, "watered");
            self.persist();
        }
        Ok(outcome)
    }

    fn try_water(&mut self, id: EntityId, now: u64) -> Result<WaterOutcome, SimError> {
        if self.state.entity(id).is_none() {
            return Err(SimError::EntityNotFound(id));
        }
        let crop = self.state.crop(id).ok_or(SimError::NotACrop(id))?;
        if crop.stage() == CropStage::FullyWatered {
            return Ok(WaterOutcome::Saturated);
        }
        self.state
            .inventory
            .try_remove(ResourceKind::WaterBucket, 1)?;
        let crop = self
            .state
            .crops
            .get_mut(&id)
            .ok_or(SimError::NotACrop(id))?;
        Ok(crop.water(now))
    }

    /// Credits a random yield to the ledger. Annual crops leave the field and
    /// free their plot; trees reset and grow again.
    pub fn harvest(&mut self, id: EntityId, now: u64) -> Result<HarvestOutcome, SimError> {
        let result = self.try_harvest(id, now);
        let outcome = self.check(result)?;
        info!(
            entity = %id,
            resource = %outcome.resource,
            amount = outcome.amount,
            "harvested"
        );

        let mut events = Vec::with_capacity(3);
        events.push(SimEvent::CropHarvested {
            id,
            kind: outcome.kind,
            resource: outcome.resource,
            amount: outcome.amount,
        });
        if !outcome.regrowing {
            events.push(SimEvent::EntityRemoved {
                id,
                kind: outcome.kind,
                reason: RemovalReason::Harvested,
            });
        }
        events.push(SimEvent::mission(
            MissionAction::Harvest,
            outcome.resource.as_str(),
            u64::from(outcome.amount),
        ));
        self.publish(&events);
        self.persist();
        Ok(outcome)
    }

    fn try_harvest(&mut self, id: EntityId, now: u64) -> Result<HarvestOutcome, SimError> {
        let kind = self
            .state
            .entity(id)
            .map(|entity| entity.kind)
            .ok_or(SimError::EntityNotFound(id))?;
        let spec = kind.crop_spec().ok_or(SimError::NotACrop(id))?;
        let multiplier = self.state.growth_multiplier;
        let crop = self.state.crop(id).ok_or(SimError::NotACrop(id))?;
        if crop.is_stale(now, self.config.wither_after_ms) {
            return Err(SimError::Withered(id));
        }
        if crop.growth_at(now, multiplier) < 1.0 {
            return Err(SimError::NotMature(id));
        }

        let mut rng = self.engine.fork_rng("harvest");
        let amount = rng.gen_range(spec.yield_min..=spec.yield_max.max(spec.yield_min));
        self.state.inventory.try_add(spec.resource, amount)?;
        self.engine.commit_rng("harvest", rng);
        if spec.perennial {
            if let Some(crop) = self.state.crops.get_mut(&id) {
                crop.regrow(now);
            }
        } else {
            self.state.remove(id)?;
        }
        self.state.gain_experience(u64::from(amount));
        Ok(HarvestOutcome {
            id,
            kind,
            resource: spec.resource,
            amount,
            regrowing: spec.perennial,
        })
    }

    pub fn can_upgrade(&self, id: EntityId) -> bool {
        upgrade::can_upgrade(&self.state, id)
    }

    /// Levels up one building. A residence's faster growth counts from `now`.
    pub fn upgrade(&mut self, id: EntityId, now: u64) -> Result<UpgradeOutcome, SimError> {
        let result = upgrade::apply_upgrade(&mut self.state, id, now);
        let outcome = self.check(result)?;
        info!(entity = %id, kind = %outcome.kind, level = outcome.level, "level changed");
        self.publish(&[SimEvent::LevelChanged {
            id,
            kind: outcome.kind,
            level: outcome.level,
        }]);
        self.persist();
        Ok(outcome)
    }

    /// Converts stock into coins at the resource's fixed price. Returns the
    /// coins earned.
    pub fn sell(&mut self, resource: ResourceKind, amount: u32) -> Result<u64, SimError> {
        let result = self.state.inventory.try_remove(resource, amount);
        self.check(result)?;
        let earned = resource.sell_price() * u64::from(amount);
        self.state.earn(earned);
        info!(%resource, amount, earned, "sold");
        self.publish(&[
            SimEvent::mission(MissionAction::Sell, resource.as_str(), u64::from(amount)),
            SimEvent::mission(MissionAction::Earn, "coins", earned),
        ]);
        self.persist();
        Ok(earned)
    }

    /// Grows the farm by one step. Each expansion costs more than the last.
    pub fn expand(&mut self) -> Result<u32, SimError> {
        let result = self.try_expand();
        let size = self.check(result)?;
        info!(size, expansions = self.state.expansions, "farm expanded");
        self.publish(&[SimEvent::GridExpanded { size }]);
        self.persist();
        Ok(size)
    }

    fn try_expand(&mut self) -> Result<u32, SimError> {
        let size = self.state.grid.size();
        if size >= self.config.max_grid_size {
            return Err(SimError::GridAtMaxSize { size });
        }
        let cost = self.expansion_cost();
        self.state.spend(cost)?;
        let next = (size + self.config.expand_step).min(self.config.max_grid_size);
        self.state.grid.resize(next);
        self.state.expansions += 1;
        Ok(next)
    }

    pub fn expansion_cost(&self) -> u64 {
        self.config.expand_base_cost * u64::from(self.state.expansions + 1)
    }

    /// Advances every subsystem to `now` as one step, then persists. Quiet
    /// ticks persist too.
    pub fn tick(&mut self, now: u64) -> TickSummary {
        let summary = self.engine.tick(&mut self.state, &self.config, now);
        self.publish(&summary.events);
        self.persist();
        summary
    }

    /// Runs `ticks` steps of `tick_ms` each on a simulated clock, handing every
    /// summary to `hook`.
    pub fn run_for<F>(
        &mut self,
        clock: &mut SimulatedClock,
        ticks: u64,
        tick_ms: u64,
        mut hook: F,
    ) -> Vec<TickSummary>
    where
        F: FnMut(&Farm, &TickSummary),
    {
        let mut summaries = Vec::with_capacity(ticks as usize);
        for _ in 0..ticks {
            let now = clock.advance(tick_ms);
            let summary = self.tick(now);
            hook(self, &summary);
            summaries.push(summary);
        }
        summaries
    }

    pub fn view(&self) -> FarmView {
        let power = PowerBalance::compute(&self.state);
        let inventory = self.state.inventory();
        FarmView {
            coins: self.state.coins(),
            experience: self.state.experience(),
            inventory: inventory.quantities().clone(),
            inventory_total: inventory.total(),
            capacity: inventory.capacity(),
            power,
            powered: power.is_powered(),
            growth_multiplier: self.state.growth_multiplier(),
            grid_size: self.state.grid().size(),
            entities: self.state.entity_count(),
            crops: self.state.crops.len(),
            pending_collections: self.state.pending().len(),
            agents: self.state.agents().len(),
        }
    }

    pub fn snapshot(&self) -> FarmSnapshot {
        FarmSnapshot::from_state(&self.config.user, &self.state)
    }

    fn check<T>(&mut self, result: Result<T, SimError>) -> Result<T, SimError> {
        if let Err(err) = &result {
            debug!(code = err.code(), "operation rejected");
            self.notifier.notify(&err.to_string(), Severity::Warning);
        }
        result
    }

    fn publish(&mut self, events: &[SimEvent]) {
        for event in events {
            match event {
                SimEvent::EntityPlaced { entity } => {
                    for observer in &mut self.observers {
                        observer.on_entity_placed(entity);
                    }
                }
                SimEvent::EntityRemoved { id, kind, .. } => {
                    for observer in &mut self.observers {
                        observer.on_entity_removed(*id, *kind);
                    }
                }
                SimEvent::LevelChanged { id, level, .. } => {
                    for observer in &mut self.observers {
                        observer.on_entity_level_changed(*id, *level);
                    }
                }
                SimEvent::Mission {
                    action,
                    target,
                    amount,
                } => {
                    for hook in &mut self.missions {
                        hook.on_progress(*action, target, *amount);
                    }
                }
                _ => {}
            }
            if let Some((message, severity)) = event.notification() {
                self.notifier.notify(&message, severity);
            }
        }
    }

    fn persist(&mut self) {
        let Some(hook) = self.persistence.as_mut() else {
            return;
        };
        let snapshot = FarmSnapshot::from_state(&self.config.user, &self.state);
        if let Err(err) = hook.persist(&snapshot) {
            warn!(error = %err, "failed to persist farm");
        }
    }
}
