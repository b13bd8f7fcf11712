//! Per-crop growth and watering state.

use serde::{Deserialize, Serialize};

use crate::catalog::{CropSpec, EntityKind};
use crate::grid::Tile;
use crate::world::EntityId;

/// Real-time window after which an unwatered crop withers.
pub const WITHER_AFTER_MS: u64 = 86_400_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CropStage {
    Planted,
    PartiallyWatered,
    FullyWatered,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaterOutcome {
    Watered { count: u8 },
    /// Already at the kind's requirement; nothing was spent.
    Saturated,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CropInstance {
    pub entity: EntityId,
    pub kind: EntityKind,
    pub origin: Tile,
    pub watered_count: u8,
    pub last_watered_at: u64,
    pub planted_at: u64,
    pub growth: f64,
    pub last_grown_at: u64,
}

impl CropInstance {
    pub fn plant(entity: EntityId, kind: EntityKind, origin: Tile, now: u64) -> Self {
        Self {
            entity,
            kind,
            origin,
            watered_count: 0,
            last_watered_at: now,
            planted_at: now,
            growth: 0.0,
            last_grown_at: now,
        }
    }

    pub fn spec(&self) -> Option<&'static CropSpec> {
        self.kind.crop_spec()
    }

    pub fn stage(&self) -> CropStage {
        let required = self.spec().map(|s| s.water_required).unwrap_or(0);
        match self.watered_count {
            0 => CropStage::Planted,
            count if count >= required => CropStage::FullyWatered,
            _ => CropStage::PartiallyWatered,
        }
    }

    /// Growth this crop would have at `now` without touching its state.
    pub fn growth_at(&self, now: u64, multiplier: f64) -> f64 {
        let Some(spec) = self.spec() else {
            return self.growth;
        };
        if now <= self.last_grown_at {
            return self.growth;
        }
        let elapsed = (now - self.last_grown_at) as f64;
        let gained = elapsed * multiplier.max(0.0) / spec.growth_ms.max(1) as f64;
        (self.growth + gained).clamp(0.0, 1.0)
    }

    /// Integrates growth from the last update to `now`. Never moves backwards.
    pub fn advance(&mut self, now: u64, multiplier: f64) {
        if now <= self.last_grown_at {
            return;
        }
        self.growth = self.growth_at(now, multiplier);
        self.last_grown_at = now;
    }

    pub fn is_mature(&self) -> bool {
        self.growth >= 1.0
    }

    pub fn is_stale(&self, now: u64, window_ms: u64) -> bool {
        now.saturating_sub(self.last_watered_at) > window_ms
    }

    pub fn water(&mut self, now: u64) -> WaterOutcome {
        let required = self.spec().map(|s| s.water_required).unwrap_or(0);
        if self.watered_count >= required {
            return WaterOutcome::Saturated;
        }
        self.watered_count += 1;
        self.last_watered_at = now;
        WaterOutcome::Watered {
            count: self.watered_count,
        }
    }

    /// Starts a new cycle after a perennial harvest.
    pub fn regrow(&mut self, now: u64) {
        self.growth = 0.0;
        self.watered_count = 0;
        self.last_grown_at = now;
    }
}
