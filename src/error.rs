use thiserror::Error;

use crate::catalog::{EntityKind, ResourceKind};
use crate::grid::Tile;
use crate::world::EntityId;

/// Failures returned by player-initiated operations. Every variant is raised
/// before any state is written.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SimError {
    #[error("tile ({}, {}) is occupied", .0.x, .0.z)]
    TileOccupied(Tile),
    #[error("tile ({}, {}) is outside the farm", .0.x, .0.z)]
    OutOfBounds(Tile),
    #[error("need {needed} coins, have {available}")]
    InsufficientFunds { needed: u64, available: u64 },
    #[error("need {needed} {resource}, have {available}")]
    InsufficientResources {
        resource: ResourceKind,
        needed: u32,
        available: u32,
    },
    #[error("inventory full: {requested} more units do not fit in {free} free slots")]
    InventoryFull { requested: u32, free: u32 },
    #[error("{kind} cannot go past level {level}")]
    InvalidLevel { kind: EntityKind, level: u8 },
    #[error("entity {0} not found")]
    EntityNotFound(EntityId),
    #[error("entity {0} is not a crop")]
    NotACrop(EntityId),
    #[error("crop {0} is not ready to harvest")]
    NotMature(EntityId),
    #[error("crop {0} has withered")]
    Withered(EntityId),
    #[error("farm is already at its largest size ({size})")]
    GridAtMaxSize { size: u32 },
}

impl SimError {
    pub fn code(&self) -> &'static str {
        match self {
            SimError::TileOccupied(_) => "tile_occupied",
            SimError::OutOfBounds(_) => "out_of_bounds",
            SimError::InsufficientFunds { .. } => "insufficient_funds",
            SimError::InsufficientResources { .. } => "insufficient_resources",
            SimError::InventoryFull { .. } => "inventory_full",
            SimError::InvalidLevel { .. } => "invalid_level",
            SimError::EntityNotFound(_) => "entity_not_found",
            SimError::NotACrop(_) => "not_a_crop",
            SimError::NotMature(_) => "not_mature",
            SimError::Withered(_) => "withered",
            SimError::GridAtMaxSize { .. } => "grid_at_max_size",
        }
    }
}
