//! Pending collections and the farmer agents that fetch them.

use serde::{Deserialize, Serialize};

use crate::catalog::ResourceKind;
use crate::grid::Tile;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingCollection {
    pub id: u64,
    pub resource: ResourceKind,
    pub amount: u32,
    pub produced_at: u64,
    pub source: Tile,
    pub collected: bool,
    pub assigned_agent: Option<u32>,
}

impl PendingCollection {
    pub fn is_open(&self) -> bool {
        !self.collected && self.assigned_agent.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentStatus {
    Idle,
    Traveling,
    Returning,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FarmerAgent {
    pub id: u32,
    pub home: Tile,
    pub status: AgentStatus,
    pub assigned_collection: Option<u64>,
    pub trip_started_at: u64,
    pub trip_duration_ms: u64,
    /// Where the current leg ends; equals `home` while idle.
    pub target: Tile,
    /// Where the current leg began.
    pub origin: Tile,
}

impl FarmerAgent {
    pub fn new(id: u32, home: Tile) -> Self {
        Self {
            id,
            home,
            status: AgentStatus::Idle,
            assigned_collection: None,
            trip_started_at: 0,
            trip_duration_ms: 0,
            target: home,
            origin: home,
        }
    }

    pub fn is_idle(&self) -> bool {
        self.status == AgentStatus::Idle
    }

    pub fn begin_trip(&mut self, collection: u64, target: Tile, now: u64, duration_ms: u64) {
        self.status = AgentStatus::Traveling;
        self.assigned_collection = Some(collection);
        self.origin = self.home;
        self.target = target;
        self.trip_started_at = now;
        self.trip_duration_ms = duration_ms;
    }

    pub fn begin_return(&mut self, started_at: u64, duration_ms: u64) {
        self.status = AgentStatus::Returning;
        self.assigned_collection = None;
        self.origin = self.target;
        self.target = self.home;
        self.trip_started_at = started_at;
        self.trip_duration_ms = duration_ms;
    }

    pub fn settle(&mut self) {
        self.status = AgentStatus::Idle;
        self.assigned_collection = None;
        self.origin = self.home;
        self.target = self.home;
    }

    /// Logical end of the current leg.
    pub fn leg_ends_at(&self) -> u64 {
        self.trip_started_at.saturating_add(self.trip_duration_ms)
    }

    /// Interpolated position along the current leg.
    pub fn position_at(&self, now: u64) -> (f32, f32) {
        let progress = if self.trip_duration_ms == 0 {
            1.0
        } else {
            (now.saturating_sub(self.trip_started_at) as f32 / self.trip_duration_ms as f32)
                .clamp(0.0, 1.0)
        };
        let lerp = |a: i32, b: i32| a as f32 + (b - a) as f32 * progress;
        (
            lerp(self.origin.x, self.target.x),
            lerp(self.origin.z, self.target.z),
        )
    }

    pub fn has_arrived(&self, now: u64, arrival_radius: f32) -> bool {
        if now >= self.leg_ends_at() {
            return true;
        }
        let (x, z) = self.position_at(now);
        let dx = x - self.target.x as f32;
        let dz = z - self.target.z as f32;
        (dx * dx + dz * dz).sqrt() <= arrival_radius
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_interpolates_along_leg() {
        let mut agent = FarmerAgent::new(0, Tile::new(0, 0));
        agent.begin_trip(7, Tile::new(10, 0), 1_000, 4_000);
        assert_eq!(agent.position_at(1_000), (0.0, 0.0));
        assert_eq!(agent.position_at(3_000), (5.0, 0.0));
        assert_eq!(agent.position_at(9_000), (10.0, 0.0));
    }

    #[test]
    fn arrival_uses_time_or_proximity() {
        let mut agent = FarmerAgent::new(0, Tile::new(0, 0));
        agent.begin_trip(1, Tile::new(10, 0), 0, 10_000);
        assert!(!agent.has_arrived(5_000, 0.5));
        assert!(agent.has_arrived(9_600, 0.5));
        assert!(agent.has_arrived(10_000, 0.0));
    }

    #[test]
    fn return_leg_heads_home() {
        let mut agent = FarmerAgent::new(3, Tile::new(2, 2));
        agent.begin_trip(1, Tile::new(6, 2), 0, 2_000);
        agent.begin_return(2_000, 4_000);
        assert_eq!(agent.status, AgentStatus::Returning);
        assert_eq!(agent.assigned_collection, None);
        assert_eq!(agent.position_at(2_000), (6.0, 2.0));
        assert_eq!(agent.leg_ends_at(), 6_000);
        agent.settle();
        assert!(agent.is_idle());
    }
}
