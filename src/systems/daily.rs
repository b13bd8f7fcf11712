use tracing::info;

use crate::{
    engine::{System, SystemContext},
    events::{MissionAction, SimEvent},
    rng::SystemRng,
    world::SimulationState,
};

pub const DAY_MS: u64 = 86_400_000;

/// Grants the daily bonus once per clock day.
pub struct DailyResetSystem;

impl DailyResetSystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DailyResetSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for DailyResetSystem {
    fn name(&self) -> &str {
        "daily_reset"
    }

    fn run(
        &mut self,
        ctx: &SystemContext<'_>,
        world: &mut SimulationState,
        _rng: &mut SystemRng<'_>,
        events: &mut Vec<SimEvent>,
    ) {
        let day = ctx.now / DAY_MS;
        if day <= world.last_daily_reset_day {
            return;
        }
        world.last_daily_reset_day = day;
        let bonus = ctx.config.daily_bonus;
        world.earn(bonus);
        info!(day, bonus, "daily reset");
        events.push(SimEvent::DailyReset { day, bonus });
        if bonus > 0 {
            events.push(SimEvent::mission(MissionAction::Earn, "coins", bonus));
        }
    }
}
