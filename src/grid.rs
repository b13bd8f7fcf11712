//! Tile occupancy index for the square farm grid.
//!
//! The grid is centred on the origin. Each tile carries at most one ground
//! occupant (plot, tree or building) and at most one crop, and a crop may only
//! sit on a plot.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::catalog::{Category, EntityKind};
use crate::error::SimError;
use crate::world::EntityId;

/// Tile position in the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Tile {
    pub x: i32,
    pub z: i32,
}

impl Tile {
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    pub fn offset(self, dx: i32, dz: i32) -> Self {
        Self::new(self.x + dx, self.z + dz)
    }

    /// Euclidean distance between two tiles
    pub fn distance(self, other: Tile) -> f32 {
        let dx = (self.x - other.x) as f32;
        let dz = (self.z - other.z) as f32;
        (dx * dx + dz * dz).sqrt()
    }
}

/// Quarter turns, always kept in `0..=3`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Rotation(u8);

impl Rotation {
    pub fn new(turns: u8) -> Self {
        Self(turns % 4)
    }

    pub fn turns(self) -> u8 {
        self.0 % 4
    }

    pub fn swaps_axes(self) -> bool {
        self.turns() % 2 == 1
    }
}

/// Rectangle of tiles an entity covers once rotation is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Footprint {
    pub origin: Tile,
    pub width: u8,
    pub depth: u8,
}

impl Footprint {
    pub fn of(kind: EntityKind, origin: Tile, rotation: Rotation) -> Self {
        let descriptor = kind.descriptor();
        let (width, depth) = if rotation.swaps_axes() {
            (descriptor.depth, descriptor.width)
        } else {
            (descriptor.width, descriptor.depth)
        };
        Self {
            origin,
            width,
            depth,
        }
    }

    pub fn tiles(&self) -> impl Iterator<Item = Tile> + '_ {
        (0..i32::from(self.depth)).flat_map(move |dz| {
            (0..i32::from(self.width)).map(move |dx| self.origin.offset(dx, dz))
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Occupant {
    id: EntityId,
    category: Category,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Cell {
    ground: Option<Occupant>,
    crop: Option<EntityId>,
}

impl Cell {
    fn is_empty(&self) -> bool {
        self.ground.is_none() && self.crop.is_none()
    }

    fn accepts_crop(&self) -> bool {
        self.crop.is_none()
            && matches!(
                self.ground,
                Some(Occupant {
                    category: Category::Plot,
                    ..
                })
            )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridIndex {
    size: u32,
    edge_margin: u32,
    cells: HashMap<Tile, Cell>,
    footprints: HashMap<EntityId, Vec<Tile>>,
}

impl GridIndex {
    pub fn new(size: u32, edge_margin: u32) -> Self {
        Self {
            size,
            edge_margin,
            cells: HashMap::new(),
            footprints: HashMap::new(),
        }
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub(crate) fn resize(&mut self, size: u32) {
        self.size = size;
    }

    /// Inclusive lower and exclusive upper coordinate on both axes.
    pub fn bounds(&self) -> (i32, i32) {
        let half = (self.size / 2).saturating_sub(self.edge_margin) as i32;
        (-half, half)
    }

    pub fn in_bounds(&self, tile: Tile) -> bool {
        let (min, max) = self.bounds();
        (min..max).contains(&tile.x) && (min..max).contains(&tile.z)
    }

    /// Validates a placement without touching the index.
    pub fn check(
        &self,
        kind: EntityKind,
        origin: Tile,
        rotation: Rotation,
    ) -> Result<Footprint, SimError> {
        let footprint = Footprint::of(kind, origin, rotation);
        if let Some(tile) = footprint.tiles().find(|tile| !self.in_bounds(*tile)) {
            return Err(SimError::OutOfBounds(tile));
        }
        for tile in footprint.tiles() {
            let cell = self.cells.get(&tile);
            let legal = match kind.category() {
                Category::Crop => cell.is_some_and(Cell::accepts_crop),
                // trees never stack, so the plot/crop pair stays the only two-layer tile
                Category::Plot | Category::Tree | Category::Building => {
                    cell.map_or(true, Cell::is_empty)
                }
            };
            if !legal {
                return Err(SimError::TileOccupied(tile));
            }
        }
        Ok(footprint)
    }

    pub fn can_place(&self, kind: EntityKind, origin: Tile, rotation: Rotation) -> bool {
        self.check(kind, origin, rotation).is_ok()
    }

    pub fn place(
        &mut self,
        id: EntityId,
        kind: EntityKind,
        origin: Tile,
        rotation: Rotation,
    ) -> Result<(), SimError> {
        let footprint = self.check(kind, origin, rotation)?;
        self.insert(id, kind, footprint);
        Ok(())
    }

    /// Writes a footprint that has already been validated, or that comes from
    /// a trusted snapshot.
    pub(crate) fn insert(&mut self, id: EntityId, kind: EntityKind, footprint: Footprint) {
        let category = kind.category();
        let tiles: Vec<Tile> = footprint.tiles().collect();
        for tile in &tiles {
            let cell = self.cells.entry(*tile).or_default();
            if category == Category::Crop {
                cell.crop = Some(id);
            } else {
                cell.ground = Some(Occupant { id, category });
            }
        }
        self.footprints.insert(id, tiles);
    }

    pub fn remove(&mut self, id: EntityId) -> Option<Vec<Tile>> {
        let tiles = self.footprints.remove(&id)?;
        for tile in &tiles {
            let emptied = match self.cells.get_mut(tile) {
                Some(cell) => {
                    if cell.ground.map(|o| o.id) == Some(id) {
                        cell.ground = None;
                    }
                    if cell.crop == Some(id) {
                        cell.crop = None;
                    }
                    cell.is_empty()
                }
                None => false,
            };
            if emptied {
                self.cells.remove(tile);
            }
        }
        Some(tiles)
    }

    pub fn occupied_tiles(&self, id: EntityId) -> Option<&[Tile]> {
        self.footprints.get(&id).map(Vec::as_slice)
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.footprints.contains_key(&id)
    }

    pub fn entity_count(&self) -> usize {
        self.footprints.len()
    }

    pub fn is_free(&self, tile: Tile) -> bool {
        self.cells.get(&tile).map_or(true, Cell::is_empty)
    }

    pub fn crop_at(&self, tile: Tile) -> Option<EntityId> {
        self.cells.get(&tile).and_then(|cell| cell.crop)
    }

    pub fn ground_at(&self, tile: Tile) -> Option<EntityId> {
        self.cells
            .get(&tile)
            .and_then(|cell| cell.ground)
            .map(|o| o.id)
    }

    /// Closest free in-bounds tile around `source`, searching rings of growing
    /// radius. Within a ring the tile nearest the source wins.
    pub fn nearest_free(&self, source: Tile, max_radius: u32) -> Option<Tile> {
        for radius in 1..=max_radius as i32 {
            let ring = (-radius..=radius)
                .flat_map(|dz| (-radius..=radius).map(move |dx| (dx, dz)))
                .filter(|(dx, dz)| dx.abs().max(dz.abs()) == radius)
                .map(|(dx, dz)| source.offset(dx, dz))
                .filter(|tile| self.in_bounds(*tile) && self.is_free(*tile));
            if let Some(tile) = ring.min_by_key(|tile| {
                let dx = tile.x - source.x;
                let dz = tile.z - source.z;
                dx * dx + dz * dz
            }) {
                return Some(tile);
            }
        }
        None
    }
}
