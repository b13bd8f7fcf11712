//! Farm simulation core: placement on a bounded tile grid, crop growth and
//! watering, timed production, farmer pickups, power balance and building
//! upgrades, all advanced by an explicit `tick(now)`.

pub mod catalog;
pub mod config;
pub mod crops;
pub mod dispatch;
pub mod engine;
pub mod error;
pub mod events;
pub mod farm;
pub mod grid;
pub mod inventory;
pub mod power;
pub mod rng;
pub mod scenario;
pub mod snapshot;
pub mod systems;
pub mod upgrade;
pub mod web;
pub mod world;

pub use catalog::{EntityKind, ResourceKind};
pub use config::FarmConfig;
pub use engine::{Clock, SimulatedClock, SystemClock, TickSummary};
pub use error::SimError;
pub use events::SimEvent;
pub use farm::{Farm, FarmView, HarvestOutcome};
pub use grid::{Rotation, Tile};
pub use world::{EntityId, SimulationState};
