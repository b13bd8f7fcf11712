use tracing::debug;

use crate::{
    engine::{System, SystemContext},
    events::{RemovalReason, SimEvent},
    rng::SystemRng,
    world::{EntityId, SimulationState},
};

/// Advances growth on every live crop and withers the ones left unwatered
/// past the window.
pub struct CropSystem;

impl CropSystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CropSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for CropSystem {
    fn name(&self) -> &str {
        "crops"
    }

    fn run(
        &mut self,
        ctx: &SystemContext<'_>,
        world: &mut SimulationState,
        _rng: &mut SystemRng<'_>,
        events: &mut Vec<SimEvent>,
    ) {
        let multiplier = world.growth_multiplier;
        let mut withered: Vec<EntityId> = Vec::new();
        for crop in world.crops.values_mut() {
            if crop.is_stale(ctx.now, ctx.config.wither_after_ms) {
                withered.push(crop.entity);
                continue;
            }
            crop.advance(ctx.now, multiplier);
        }

        for id in withered {
            let Ok(removed) = world.remove(id) else {
                continue;
            };
            for entity in removed {
                debug!(entity = %entity.id, kind = %entity.kind, now = ctx.now, "crop withered");
                events.push(SimEvent::CropWithered {
                    id: entity.id,
                    kind: entity.kind,
                });
                events.push(SimEvent::EntityRemoved {
                    id: entity.id,
                    kind: entity.kind,
                    reason: RemovalReason::Withered,
                });
            }
        }
    }
}
