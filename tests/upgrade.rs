use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use farmstead::{
    events::{EntityObserver, MissionAction, MissionHook},
    EntityId, EntityKind, Farm, FarmConfig, ResourceKind, Rotation, SimError, Tile,
};

fn farm_with(coins: u64, stock: &[(ResourceKind, u32)]) -> Farm {
    let mut farm = Farm::new(FarmConfig::default(), 5);
    farm.grant(coins, &stock.iter().copied().collect::<BTreeMap<_, _>>());
    farm
}

#[test]
fn upgrade_short_one_resource_is_atomic() {
    let mut farm = farm_with(5_000, &[(ResourceKind::Plank, 19), (ResourceKind::Stone, 10)]);
    let barn = farm
        .place(EntityKind::Barn, Tile::new(0, 0), Rotation::default(), 0)
        .unwrap();
    let coins = farm.state().coins();

    // Level 2 needs 10 planks, leaving 9 of the 20 level 3 wants.
    farm.upgrade(barn, 0).unwrap();
    assert!(!farm.can_upgrade(barn));
    let before = farm.state().inventory().clone();
    assert_eq!(
        farm.upgrade(barn, 0),
        Err(SimError::InsufficientResources {
            resource: ResourceKind::Plank,
            needed: 20,
            available: 9
        })
    );
    assert_eq!(farm.state().inventory(), &before);
    assert_eq!(farm.state().coins(), coins - 250);
    assert_eq!(farm.state().entity(barn).unwrap().level, 2);
}

#[test]
fn upgrades_need_coins() {
    let mut farm = farm_with(200, &[(ResourceKind::Plank, 10)]);
    let coop = farm
        .place(EntityKind::Coop, Tile::new(0, 0), Rotation::default(), 0)
        .unwrap();
    assert_eq!(
        farm.upgrade(coop, 0),
        Err(SimError::InsufficientFunds {
            needed: 300,
            available: 50
        })
    );
    assert_eq!(farm.state().inventory().get(ResourceKind::Plank), 10);
}

#[test]
fn missing_entities_are_reported() {
    let mut farm = farm_with(0, &[]);
    let ghost = EntityId::new(99);
    assert!(!farm.can_upgrade(ghost));
    assert_eq!(farm.upgrade(ghost, 0), Err(SimError::EntityNotFound(ghost)));
}

#[test]
fn farmhouse_climbs_its_longer_table() {
    let mut farm = farm_with(
        20_000,
        &[
            (ResourceKind::Wheat, 20),
            (ResourceKind::Plank, 20),
            (ResourceKind::Stone, 10),
        ],
    );
    let house = farm
        .place(EntityKind::Farmhouse, Tile::new(-3, -3), Rotation::default(), 0)
        .unwrap();
    assert_eq!(EntityKind::Farmhouse.max_level(), 6);

    farm.upgrade(house, 0).unwrap();
    farm.upgrade(house, 0).unwrap();
    assert_eq!(farm.state().entity(house).unwrap().level, 3);
    assert_eq!(farm.state().growth_multiplier(), 1.2);
    assert_eq!(farm.state().coins(), 20_000 - 500 - 1_200);
    assert_eq!(farm.state().inventory().total(), 0);
}

#[derive(Clone, Default)]
struct Levels {
    seen: Arc<Mutex<Vec<(EntityId, u8)>>>,
}

impl EntityObserver for Levels {
    fn on_entity_level_changed(&mut self, id: EntityId, level: u8) {
        self.seen.lock().unwrap().push((id, level));
    }
}

#[derive(Clone, Default)]
struct Missions {
    seen: Arc<Mutex<Vec<(MissionAction, String, u64)>>>,
}

impl MissionHook for Missions {
    fn on_progress(&mut self, action: MissionAction, target: &str, amount: u64) {
        self.seen
            .lock()
            .unwrap()
            .push((action, target.to_string(), amount));
    }
}

#[test]
fn hooks_hear_about_levels_and_missions() {
    let mut farm = farm_with(1_000, &[(ResourceKind::Plank, 10), (ResourceKind::Egg, 5)]);
    let levels = Levels::default();
    let missions = Missions::default();
    farm.add_observer(levels.clone());
    farm.add_mission_hook(missions.clone());

    let coop = farm
        .place(EntityKind::Coop, Tile::new(0, 0), Rotation::default(), 0)
        .unwrap();
    farm.upgrade(coop, 0).unwrap();
    farm.sell(ResourceKind::Egg, 5).unwrap();

    assert_eq!(*levels.seen.lock().unwrap(), vec![(coop, 2)]);
    assert_eq!(
        *missions.seen.lock().unwrap(),
        vec![
            (MissionAction::Build, "coop".to_string(), 1),
            (MissionAction::Sell, "egg".to_string(), 5),
            (MissionAction::Earn, "coins".to_string(), 20),
        ]
    );
}
