use tracing::debug;

use crate::{
    catalog::{EntityKind, ResourceKind},
    engine::{System, SystemContext},
    events::SimEvent,
    grid::Tile,
    rng::SystemRng,
    world::{EntityId, SimulationState},
};

/// Runs the per-building production clocks.
///
/// A building fires at most one batch per tick however long the gap since its
/// last batch, and its clock restarts at `now` rather than at a cycle
/// boundary. Power consumers hold their clock while the farm is unpowered, so
/// production resumes a full cycle after power returns.
pub struct ProductionSystem;

impl ProductionSystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ProductionSystem {
    fn default() -> Self {
        Self::new()
    }
}

struct Batch {
    entity: EntityId,
    kind: EntityKind,
    resource: ResourceKind,
    amount: u32,
    source: Tile,
}

impl System for ProductionSystem {
    fn name(&self) -> &str {
        "production"
    }

    fn run(
        &mut self,
        ctx: &SystemContext<'_>,
        world: &mut SimulationState,
        _rng: &mut SystemRng<'_>,
        events: &mut Vec<SimEvent>,
    ) {
        let now = ctx.now;
        let powered = ctx.power.is_powered();
        let mut batches = Vec::new();

        for entity in world.entities.values_mut() {
            let Some((resource, tier)) = entity.kind.production(entity.level) else {
                continue;
            };
            let Some(last) = entity.last_production_at else {
                entity.last_production_at = Some(now);
                continue;
            };
            if entity.kind.descriptor().power < 0 && !powered {
                entity.last_production_at = Some(now);
                continue;
            }
            if now.saturating_sub(last) < tier.cycle_ms {
                continue;
            }
            entity.last_production_at = Some(now);
            batches.push(Batch {
                entity: entity.id,
                kind: entity.kind,
                resource,
                amount: tier.output_amount,
                source: entity.origin,
            });
        }

        for batch in batches {
            let collection = world.push_pending(batch.resource, batch.amount, now, batch.source);
            debug!(
                entity = %batch.entity,
                kind = %batch.kind,
                amount = batch.amount,
                collection,
                "batch ready"
            );
            events.push(SimEvent::ProductionReady {
                entity: batch.entity,
                kind: batch.kind,
                collection,
                resource: batch.resource,
                amount: batch.amount,
            });
        }
    }
}
