use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use farmstead::{
    dispatch::AgentStatus,
    events::{NotificationSink, Severity},
    EntityKind, Farm, FarmConfig, ResourceKind, Rotation, SimEvent, SimulatedClock, Tile,
};

const HOUR_MS: u64 = 3_600_000;

fn funded_farm() -> Farm {
    let mut farm = Farm::new(FarmConfig::default(), 42);
    farm.grant(20_000, &BTreeMap::new());
    farm
}

fn place(farm: &mut Farm, kind: EntityKind, x: i32, z: i32) -> farmstead::EntityId {
    farm.place(kind, Tile::new(x, z), Rotation::default(), 0)
        .unwrap()
}

#[test]
fn idle_coop_produces_a_single_batch() {
    let mut farm = funded_farm();
    place(&mut farm, EntityKind::Coop, 0, 0);
    farm.tick(0);
    assert!(farm.state().pending().is_empty());

    let summary = farm.tick(5 * HOUR_MS);
    let pending = farm.state().pending();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].resource, ResourceKind::Egg);
    assert_eq!(pending[0].amount, 10);
    assert_eq!(pending[0].produced_at, 5 * HOUR_MS);
    assert_eq!(
        summary
            .events
            .iter()
            .filter(|e| matches!(e, SimEvent::ProductionReady { .. }))
            .count(),
        1
    );
}

#[test]
fn production_clock_restarts_at_the_tick() {
    let mut farm = funded_farm();
    let well = place(&mut farm, EntityKind::Well, 0, 0);
    farm.tick(0);
    farm.tick(150_000);
    assert_eq!(farm.state().pending().len(), 1);
    assert_eq!(
        farm.state().entity(well).unwrap().last_production_at,
        Some(150_000)
    );

    // 240s is two cycles from placement but only 90s since the last batch.
    farm.tick(240_000);
    assert_eq!(farm.state().pending().len(), 1);
    farm.tick(270_000);
    assert_eq!(farm.state().pending().len(), 2);
}

#[test]
fn upgraded_buildings_use_their_new_tier() {
    let mut farm = funded_farm();
    farm.grant(0, &BTreeMap::from([(ResourceKind::Stone, 5)]));
    let well = place(&mut farm, EntityKind::Well, 0, 0);
    farm.upgrade(well, 0).unwrap();
    farm.tick(0);
    farm.tick(100_000);
    let pending = farm.state().pending();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].amount, 8);
}

#[test]
fn consumers_stall_without_power_and_resume_a_cycle_later() {
    let mut farm = funded_farm();
    place(&mut farm, EntityKind::Sawmill, 0, 0);

    let blackout = farm.tick(0);
    assert!(!blackout.power.is_powered());
    assert!(blackout
        .events
        .iter()
        .any(|e| matches!(e, SimEvent::PowerChanged { powered: false, .. })));
    farm.tick(300_000);
    farm.tick(600_000);
    assert!(farm.state().pending().is_empty());

    place(&mut farm, EntityKind::WindTurbine, 5, 5);
    let restored = farm.tick(700_000);
    assert!(restored.power.is_powered());
    assert!(restored
        .events
        .iter()
        .any(|e| matches!(e, SimEvent::PowerChanged { powered: true, .. })));
    assert!(farm.state().pending().is_empty());

    farm.tick(900_000);
    let pending = farm.state().pending();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].resource, ResourceKind::Plank);
    assert_eq!(pending[0].amount, 4);
}

#[test]
fn power_balance_tracks_producers_and_consumers() {
    let mut farm = funded_farm();
    place(&mut farm, EntityKind::SolarPanel, 0, 0);
    place(&mut farm, EntityKind::Quarry, 3, 3);
    let view = farm.view();
    assert_eq!(view.power.produced, 3);
    assert_eq!(view.power.consumed, 4);
    assert!(!view.powered);

    place(&mut farm, EntityKind::WindTurbine, -5, -5);
    let view = farm.view();
    assert_eq!(view.power.produced, 8);
    assert!(view.powered);
}

#[test]
fn farmers_carry_batches_home() {
    let mut farm = funded_farm();
    place(&mut farm, EntityKind::House, -6, -6);
    place(&mut farm, EntityKind::Coop, 2, 2);

    let mut clock = SimulatedClock::default();
    farm.run_for(&mut clock, 1, 0, |_, _| {});
    assert_eq!(farm.state().agents().len(), 1);

    farm.tick(600_000);
    assert_eq!(farm.state().pending().len(), 1);
    assert_eq!(farm.state().agents()[0].status, AgentStatus::Traveling);

    // Travel and return both fit inside this gap, so one tick finishes the trip.
    let summary = farm.tick(700_000);
    assert!(summary.events.iter().any(|e| matches!(
        e,
        SimEvent::CollectionCommitted {
            amount: 10,
            overflow: false,
            ..
        }
    )));
    assert_eq!(farm.state().inventory().get(ResourceKind::Egg), 10);
    assert!(farm.state().pending().is_empty());
    assert!(farm.state().agents()[0].is_idle());
}

#[test]
fn demolishing_the_house_mid_trip_still_delivers() {
    let mut farm = funded_farm();
    let house = place(&mut farm, EntityKind::House, -6, -6);
    place(&mut farm, EntityKind::Coop, 2, 2);
    farm.tick(0);
    farm.tick(600_000);
    assert_eq!(farm.state().agents()[0].status, AgentStatus::Traveling);

    farm.remove(house).unwrap();
    assert_eq!(farm.state().agents().len(), 1);
    assert_eq!(farm.state().agents()[0].status, AgentStatus::Traveling);

    // The agent finishes its trip, then the roster drops it.
    farm.tick(700_000);
    assert_eq!(farm.state().inventory().get(ResourceKind::Egg), 10);
    assert!(farm.state().pending().is_empty());
    assert!(farm.state().agents().is_empty());
}

#[test]
fn batches_wait_for_a_house() {
    let mut farm = funded_farm();
    place(&mut farm, EntityKind::Coop, 2, 2);
    farm.tick(0);
    farm.tick(600_000);
    farm.tick(1_000_000);
    assert!(farm.state().agents().is_empty());
    assert_eq!(farm.state().pending().len(), 1);
    assert_eq!(farm.state().inventory().total(), 0);
}

#[derive(Clone, Default)]
struct Notes {
    seen: Arc<Mutex<Vec<(String, Severity)>>>,
}

impl NotificationSink for Notes {
    fn notify(&mut self, message: &str, severity: Severity) {
        self.seen
            .lock()
            .unwrap()
            .push((message.to_string(), severity));
    }
}

#[test]
fn autonomous_pickup_may_overfill_the_ledger() {
    let mut farm = funded_farm();
    farm.grant(0, &BTreeMap::from([(ResourceKind::Stone, 45)]));
    let notes = Notes::default();
    farm.set_notifier(notes.clone());
    place(&mut farm, EntityKind::House, -6, -6);
    place(&mut farm, EntityKind::Coop, 2, 2);

    farm.tick(0);
    farm.tick(600_000);
    let summary = farm.tick(700_000);

    assert!(summary.events.iter().any(|e| matches!(
        e,
        SimEvent::CollectionCommitted { overflow: true, .. }
    )));
    assert_eq!(farm.state().inventory().total(), 55);
    assert!(farm.state().inventory().is_over_capacity());
    assert!(notes
        .seen
        .lock()
        .unwrap()
        .iter()
        .any(|(_, severity)| *severity == Severity::Warning));
}
