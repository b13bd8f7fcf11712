//! Tick throughput on the starter farm.
//!
//! Run with: cargo bench

use std::hint::black_box;
use std::time::Instant;

use farmstead::{scenario::ScenarioLoader, SimulatedClock};

#[cfg(test)]
mod benches {
    use super::*;

    #[test]
    fn starter_farm_tick_throughput() {
        let scenario = ScenarioLoader::new(env!("CARGO_MANIFEST_DIR"))
            .load("scenarios/starter_farm.yaml")
            .expect("fixture loads");
        let mut farm = scenario.build_farm().expect("fixture builds");
        let mut clock = SimulatedClock::default();

        let ticks = 10_000;
        let started = Instant::now();
        let summaries = farm.run_for(&mut clock, ticks, 1_000, |_, summary| {
            black_box(summary.events.len());
        });
        let elapsed = started.elapsed();

        assert_eq!(summaries.len() as u64, ticks);
        println!(
            "{} ticks in {:?} ({:?} per tick)",
            ticks,
            elapsed,
            elapsed / ticks as u32
        );
    }
}
