use serde::Serialize;

use crate::world::SimulationState;

/// Derived each tick from the placed buildings; never persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PowerBalance {
    pub produced: u32,
    pub consumed: u32,
}

impl PowerBalance {
    pub fn compute(world: &SimulationState) -> Self {
        world
            .entities()
            .map(|entity| entity.kind.descriptor().power)
            .fold(Self::default(), |mut balance, power| {
                if power > 0 {
                    balance.produced += power.unsigned_abs();
                } else {
                    balance.consumed += power.unsigned_abs();
                }
                balance
            })
    }

    pub fn is_powered(&self) -> bool {
        self.produced >= self.consumed
    }
}
