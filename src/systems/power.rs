use tracing::{info, warn};

use crate::{
    engine::{System, SystemContext},
    events::SimEvent,
    rng::SystemRng,
    world::SimulationState,
};

/// Reports powered/unpowered transitions once each. The balance itself is
/// recomputed by the engine before any system runs.
pub struct PowerSystem {
    last_powered: Option<bool>,
}

impl PowerSystem {
    pub fn new() -> Self {
        Self { last_powered: None }
    }
}

impl Default for PowerSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for PowerSystem {
    fn name(&self) -> &str {
        "power"
    }

    fn run(
        &mut self,
        ctx: &SystemContext<'_>,
        _world: &mut SimulationState,
        _rng: &mut SystemRng<'_>,
        events: &mut Vec<SimEvent>,
    ) {
        let powered = ctx.power.is_powered();
        let changed = match self.last_powered {
            Some(previous) => previous != powered,
            None => !powered,
        };
        self.last_powered = Some(powered);
        if !changed {
            return;
        }
        if powered {
            info!(
                produced = ctx.power.produced,
                consumed = ctx.power.consumed,
                "power restored"
            );
        } else {
            warn!(
                produced = ctx.power.produced,
                consumed = ctx.power.consumed,
                "blackout"
            );
        }
        events.push(SimEvent::PowerChanged {
            powered,
            balance: ctx.power,
        });
    }
}
