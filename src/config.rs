//! Tunables for a farm session

use serde::{Deserialize, Serialize};

use crate::crops::WITHER_AFTER_MS;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FarmConfig {
    /// Key the persistence hook stores snapshots under
    pub user: String,
    pub grid_size: u32,
    pub edge_margin: u32,
    pub expand_step: u32,
    pub max_grid_size: u32,
    pub expand_base_cost: u64,
    pub wither_after_ms: u64,
    pub travel_min_ms: u64,
    pub travel_max_ms: u64,
    pub return_trip_ms: u64,
    pub nudge_radius: u32,
    pub arrival_radius: f32,
    /// Storage available before any barn is built
    pub base_capacity: u32,
    pub daily_bonus: u64,
    pub build_experience: u64,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for FarmConfig {
    fn default() -> Self {
        Self {
            user: "local".to_string(),
            grid_size: 20,
            edge_margin: 1,
            expand_step: 4,
            max_grid_size: 48,
            expand_base_cost: 500,
            wither_after_ms: WITHER_AFTER_MS,
            travel_min_ms: 3_000,
            travel_max_ms: 6_000,
            return_trip_ms: 4_000,
            nudge_radius: 4,
            arrival_radius: 0.5,
            base_capacity: 50,
            daily_bonus: 25,
            build_experience: 5,
            logging: LoggingConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}
