use std::time::Instant;

use rand_chacha::ChaCha8Rng;

use crate::config::FarmConfig;
use crate::events::SimEvent;
use crate::power::PowerBalance;
use crate::rng::{RngManager, SystemRng};
use crate::systems::{
    CropSystem, DailyResetSystem, DispatchSystem, PowerSystem, ProductionSystem,
};
use crate::world::SimulationState;

pub struct SystemContext<'a> {
    pub now: u64,
    pub power: PowerBalance,
    pub config: &'a FarmConfig,
}

/// One stage of the tick. Systems never fail: missing table data or stale
/// references are skipped.
pub trait System: Send {
    fn name(&self) -> &str;
    fn run(
        &mut self,
        ctx: &SystemContext<'_>,
        world: &mut SimulationState,
        rng: &mut SystemRng<'_>,
        events: &mut Vec<SimEvent>,
    );
}

pub struct EngineBuilder {
    seed: u64,
    systems: Vec<Box<dyn System>>,
}

impl EngineBuilder {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            systems: Vec::new(),
        }
    }

    /// Power is observed first so production sees this tick's balance.
    pub fn standard(seed: u64) -> Self {
        Self::new(seed)
            .with_system(PowerSystem::new())
            .with_system(CropSystem::new())
            .with_system(ProductionSystem::new())
            .with_system(DispatchSystem::new())
            .with_system(DailyResetSystem::new())
    }

    pub fn with_system(mut self, system: impl System + 'static) -> Self {
        self.systems.push(Box::new(system));
        self
    }

    pub fn build(self) -> Engine {
        Engine {
            rng: RngManager::new(self.seed),
            systems: self.systems,
        }
    }
}

pub struct Engine {
    rng: RngManager,
    systems: Vec<Box<dyn System>>,
}

impl Engine {
    pub fn tick(
        &mut self,
        world: &mut SimulationState,
        config: &FarmConfig,
        now: u64,
    ) -> TickSummary {
        let power = PowerBalance::compute(world);
        let ctx = SystemContext { now, power, config };
        let mut events = Vec::new();
        for system in &mut self.systems {
            let mut rng_stream = self.rng.stream(system.name());
            system.run(&ctx, world, &mut rng_stream, &mut events);
        }
        TickSummary { now, power, events }
    }

    /// Draws for an operation that may still be rejected. See
    /// [`RngManager::fork`].
    pub fn fork_rng(&mut self, name: &str) -> ChaCha8Rng {
        self.rng.fork(name)
    }

    pub fn commit_rng(&mut self, name: &str, rng: ChaCha8Rng) {
        self.rng.commit(name, rng);
    }
}

#[derive(Debug, Clone)]
pub struct TickSummary {
    pub now: u64,
    pub power: PowerBalance,
    pub events: Vec<SimEvent>,
}

/// Monotonic millisecond clock supplied by the host.
pub trait Clock {
    fn now_ms(&self) -> u64;
}

/// Host clock backed by [`Instant`], counting from construction.
pub struct SystemClock {
    started: Instant,
    offset_ms: u64,
}

impl SystemClock {
    pub fn starting_at(offset_ms: u64) -> Self {
        Self {
            started: Instant::now(),
            offset_ms,
        }
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        self.offset_ms + self.started.elapsed().as_millis() as u64
    }
}

/// Clock that only moves when told to. Used by headless runs and tests.
#[derive(Debug, Clone, Default)]
pub struct SimulatedClock {
    now: u64,
}

impl SimulatedClock {
    pub fn starting_at(now: u64) -> Self {
        Self { now }
    }

    pub fn advance(&mut self, ms: u64) -> u64 {
        self.now = self.now.saturating_add(ms);
        self.now
    }
}

impl Clock for SimulatedClock {
    fn now_ms(&self) -> u64 {
        self.now
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct CountingSystem {
        calls: u32,
    }

    impl System for CountingSystem {
        fn name(&self) -> &str {
            "counting"
        }

        fn run(
            &mut self,
            ctx: &SystemContext<'_>,
            _world: &mut SimulationState,
            _rng: &mut SystemRng<'_>,
            events: &mut Vec<SimEvent>,
        ) {
            self.calls += 1;
            events.push(SimEvent::DailyReset {
                day: ctx.now,
                bonus: u64::from(self.calls),
            });
        }
    }

    #[test]
    fn engine_runs_each_system_once_per_tick() {
        let config = FarmConfig::default();
        let mut world = SimulationState::new(&config);
        let mut engine = EngineBuilder::new(1)
            .with_system(CountingSystem { calls: 0 })
            .build();

        let first = engine.tick(&mut world, &config, 10);
        let second = engine.tick(&mut world, &config, 20);
        assert_eq!(first.events, vec![SimEvent::DailyReset { day: 10, bonus: 1 }]);
        assert_eq!(second.events, vec![SimEvent::DailyReset { day: 20, bonus: 2 }]);
    }

    #[test]
    fn simulated_clock_only_moves_forward() {
        let mut clock = SimulatedClock::starting_at(5);
        assert_eq!(clock.now_ms(), 5);
        assert_eq!(clock.advance(1_000), 1_005);
        assert_eq!(clock.now_ms(), 1_005);
    }
}
