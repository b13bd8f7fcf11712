use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use farmstead::{
    events::EntityObserver, EntityId, EntityKind, Farm, FarmConfig, Rotation, SimError, Tile,
};

fn funded_farm() -> Farm {
    let mut farm = Farm::new(FarmConfig::default(), 7);
    farm.grant(50_000, &BTreeMap::new());
    farm
}

fn upright() -> Rotation {
    Rotation::default()
}

#[test]
fn footprints_never_overlap_outside_the_plot_stack() {
    let mut farm = funded_farm();
    farm.place(EntityKind::Coop, Tile::new(0, 0), upright(), 0)
        .unwrap();

    assert_eq!(
        farm.place(EntityKind::Well, Tile::new(1, 1), upright(), 0),
        Err(SimError::TileOccupied(Tile::new(1, 1)))
    );
    assert_eq!(
        farm.place(EntityKind::Plot, Tile::new(1, 0), upright(), 0),
        Err(SimError::TileOccupied(Tile::new(1, 0)))
    );
    assert!(!farm.can_place(EntityKind::AppleTree, Tile::new(0, 1), upright()));

    farm.place(EntityKind::Plot, Tile::new(4, 4), upright(), 0)
        .unwrap();
    farm.place(EntityKind::Wheat, Tile::new(4, 4), upright(), 0)
        .unwrap();
    assert_eq!(
        farm.place(EntityKind::Carrot, Tile::new(4, 4), upright(), 0),
        Err(SimError::TileOccupied(Tile::new(4, 4)))
    );
    assert!(!farm.can_place(EntityKind::AppleTree, Tile::new(4, 4), upright()));

    let grid = farm.state().grid();
    for entity in farm.state().entities() {
        for tile in grid.occupied_tiles(entity.id).unwrap() {
            let others: Vec<EntityId> = farm
                .state()
                .entities()
                .filter(|other| other.id != entity.id)
                .filter(|other| grid.occupied_tiles(other.id).unwrap().contains(tile))
                .map(|other| other.id)
                .collect();
            if !others.is_empty() {
                let pair = [entity.kind, farm.state().entity(others[0]).unwrap().kind];
                assert_eq!(others.len(), 1);
                assert!(pair.contains(&EntityKind::Plot) && pair.contains(&EntityKind::Wheat));
            }
        }
    }
}

#[test]
fn crops_need_a_plot() {
    let mut farm = funded_farm();
    assert_eq!(
        farm.place(EntityKind::Wheat, Tile::new(2, 2), upright(), 0),
        Err(SimError::TileOccupied(Tile::new(2, 2)))
    );
    assert_eq!(farm.state().entity_count(), 0);
}

#[test]
fn can_place_is_repeatable_and_read_only() {
    let mut farm = funded_farm();
    farm.place(EntityKind::Barn, Tile::new(-3, -3), upright(), 0)
        .unwrap();
    let grid_before = farm.state().grid().clone();
    let coins_before = farm.state().coins();

    let first = farm.can_place(EntityKind::CowShed, Tile::new(-1, -3), upright());
    let second = farm.can_place(EntityKind::CowShed, Tile::new(-1, -3), upright());
    let free = farm.can_place(EntityKind::CowShed, Tile::new(3, 3), upright());

    assert!(!first);
    assert_eq!(first, second);
    assert!(free);
    assert_eq!(farm.state().grid(), &grid_before);
    assert_eq!(farm.state().coins(), coins_before);
}

#[test]
fn bounds_follow_size_and_margin() {
    let mut farm = funded_farm();
    // 20 tiles with a margin of one leaves [-9, 9).
    assert!(farm.can_place(EntityKind::Well, Tile::new(-9, -9), upright()));
    assert!(farm.can_place(EntityKind::Well, Tile::new(8, 8), upright()));
    assert_eq!(
        farm.place(EntityKind::Well, Tile::new(9, 0), upright(), 0),
        Err(SimError::OutOfBounds(Tile::new(9, 0)))
    );
    assert_eq!(
        farm.place(EntityKind::Barn, Tile::new(7, 0), upright(), 0),
        Err(SimError::OutOfBounds(Tile::new(9, 0)))
    );
    assert!(farm.can_place(EntityKind::Barn, Tile::new(7, 0), Rotation::new(1)));
}

#[test]
fn expansion_opens_new_ground() {
    let mut farm = funded_farm();
    assert!(!farm.can_place(EntityKind::Well, Tile::new(10, 10), upright()));
    assert_eq!(farm.expand(), Ok(24));
    assert!(farm.can_place(EntityKind::Well, Tile::new(10, 10), upright()));
}

#[test]
fn placement_without_funds_is_rejected() {
    let mut farm = Farm::new(FarmConfig::default(), 7);
    farm.grant(100, &BTreeMap::new());
    assert_eq!(
        farm.place(EntityKind::Sawmill, Tile::new(0, 0), upright(), 0),
        Err(SimError::InsufficientFunds {
            needed: 400,
            available: 100
        })
    );
    assert!(farm.state().grid().is_free(Tile::new(0, 0)));
}

#[derive(Clone, Default)]
struct Recorder {
    log: Arc<Mutex<Vec<String>>>,
}

impl EntityObserver for Recorder {
    fn on_entity_placed(&mut self, entity: &farmstead::world::PlacedEntity) {
        self.log
            .lock()
            .unwrap()
            .push(format!("placed {}", entity.kind));
    }

    fn on_entity_removed(&mut self, _id: EntityId, kind: EntityKind) {
        self.log.lock().unwrap().push(format!("removed {kind}"));
    }
}

#[test]
fn removing_a_plot_notifies_for_its_crop_too() {
    let mut farm = funded_farm();
    let recorder = Recorder::default();
    farm.add_observer(recorder.clone());

    let plot = farm
        .place(EntityKind::Plot, Tile::new(0, 0), upright(), 0)
        .unwrap();
    let crop = farm
        .place(EntityKind::Wheat, Tile::new(0, 0), upright(), 0)
        .unwrap();
    farm.remove(plot).unwrap();

    assert!(farm.state().crop(crop).is_none());
    assert!(farm.state().grid().is_free(Tile::new(0, 0)));
    assert_eq!(
        *recorder.log.lock().unwrap(),
        vec![
            "placed plot".to_string(),
            "placed wheat".to_string(),
            "removed wheat".to_string(),
            "removed plot".to_string(),
        ]
    );
    assert_eq!(farm.remove(plot), Err(SimError::EntityNotFound(plot)));
}
