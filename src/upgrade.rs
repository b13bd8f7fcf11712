//! Leveling for production, storage and residence buildings.
//!
//! Validation and application are split so callers can preview an upgrade
//! with [`can_upgrade`] and get the exact failure from [`check_upgrade`].

use tracing::debug;

use crate::catalog::{EntityKind, UpgradeStep};
use crate::error::SimError;
use crate::world::{EntityId, SimulationState};

/// What an applied upgrade changed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UpgradeOutcome {
    pub id: EntityId,
    pub kind: EntityKind,
    pub level: u8,
    pub cost: u64,
}

/// Resolves the next step for `id` and confirms coins and resources cover it.
pub fn check_upgrade(
    world: &SimulationState,
    id: EntityId,
) -> Result<(EntityKind, u8, &'static UpgradeStep), SimError> {
    let entity = world.entity(id).ok_or(SimError::EntityNotFound(id))?;
    let kind = entity.kind;
    if entity.level >= kind.max_level() {
        return Err(SimError::InvalidLevel {
            kind,
            level: entity.level,
        });
    }
    let next = entity.level + 1;
    let step = kind
        .upgrade_step(next)
        .ok_or(SimError::InvalidLevel { kind, level: next })?;
    if world.coins() < step.cost {
        return Err(SimError::InsufficientFunds {
            needed: step.cost,
            available: world.coins(),
        });
    }
    for (resource, amount) in step.requirements {
        world.inventory().check_available(*resource, *amount)?;
    }
    Ok((kind, next, step))
}

pub fn can_upgrade(world: &SimulationState, id: EntityId) -> bool {
    check_upgrade(world, id).is_ok()
}

/// Re-validates, then takes coins and resources and bumps the level. Nothing
/// is deducted when any check fails. A new growth multiplier only applies
/// from `now` on.
pub fn apply_upgrade(
    world: &mut SimulationState,
    id: EntityId,
    now: u64,
) -> Result<UpgradeOutcome, SimError> {
    let (kind, level, step) = check_upgrade(world, id)?;
    world.inventory.try_remove_all(step.requirements)?;
    world.spend(step.cost)?;
    if let Some(entity) = world.entities.get_mut(&id) {
        entity.level = level;
    }

    if let Some(multiplier) = kind.growth_multiplier(level) {
        let previous = world.growth_multiplier;
        for crop in world.crops.values_mut() {
            crop.advance(now, previous);
        }
        world.growth_multiplier = multiplier;
    }
    if kind.is_storage() {
        world.refresh_capacity();
    }
    debug!(entity = %id, %kind, level, cost = step.cost, "upgraded");
    Ok(UpgradeOutcome {
        id,
        kind,
        level,
        cost: step.cost,
    })
}
