//! Events emitted by operations and ticks, and the hooks that consume them.

use serde::Serialize;
use tracing::{error, info, warn};

use crate::catalog::{EntityKind, ResourceKind};
use crate::power::PowerBalance;
use crate::world::{EntityId, PlacedEntity};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MissionAction {
    Harvest,
    Build,
    Sell,
    Earn,
}

impl MissionAction {
    pub fn as_str(self) -> &'static str {
        match self {
            MissionAction::Harvest => "harvest",
            MissionAction::Build => "build",
            MissionAction::Sell => "sell",
            MissionAction::Earn => "earn",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RemovalReason {
    Demolished,
    Harvested,
    Withered,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SimEvent {
    EntityPlaced {
        entity: PlacedEntity,
    },
    EntityRemoved {
        id: EntityId,
        kind: EntityKind,
        reason: RemovalReason,
    },
    LevelChanged {
        id: EntityId,
        kind: EntityKind,
        level: u8,
    },
    CropHarvested {
        id: EntityId,
        kind: EntityKind,
        resource: ResourceKind,
        amount: u32,
    },
    CropWithered {
        id: EntityId,
        kind: EntityKind,
    },
    ProductionReady {
        entity: EntityId,
        kind: EntityKind,
        collection: u64,
        resource: ResourceKind,
        amount: u32,
    },
    CollectionCommitted {
        collection: u64,
        agent: u32,
        resource: ResourceKind,
        amount: u32,
        overflow: bool,
    },
    PowerChanged {
        powered: bool,
        balance: PowerBalance,
    },
    DailyReset {
        day: u64,
        bonus: u64,
    },
    GridExpanded {
        size: u32,
    },
    Mission {
        action: MissionAction,
        target: String,
        amount: u64,
    },
}

impl SimEvent {
    pub fn mission(action: MissionAction, target: impl Into<String>, amount: u64) -> Self {
        SimEvent::Mission {
            action,
            target: target.into(),
            amount,
        }
    }

    /// User-facing message for events worth surfacing.
    pub fn notification(&self) -> Option<(String, Severity)> {
        match self {
            SimEvent::ProductionReady {
                kind,
                amount,
                resource,
                ..
            } => Some((
                format!("{kind} has {amount} {resource} ready for pickup"),
                Severity::Info,
            )),
            SimEvent::CollectionCommitted {
                overflow: true,
                resource,
                amount,
                ..
            } => Some((
                format!("Inventory full: {amount} {resource} stored over capacity"),
                Severity::Warning,
            )),
            SimEvent::LevelChanged { kind, level, .. } => Some((
                format!("{kind} upgraded to level {level}"),
                Severity::Success,
            )),
            SimEvent::CropWithered { kind, .. } => Some((
                format!("{kind} withered for lack of water"),
                Severity::Warning,
            )),
            SimEvent::PowerChanged { powered: false, balance } => Some((
                format!(
                    "Blackout: {} power produced, {} needed",
                    balance.produced, balance.consumed
                ),
                Severity::Warning,
            )),
            SimEvent::PowerChanged { powered: true, .. } => {
                Some(("Power restored".to_string(), Severity::Success))
            }
            SimEvent::DailyReset { bonus, .. } => {
                Some((format!("New day: {bonus} bonus coins"), Severity::Info))
            }
            _ => None,
        }
    }
}

/// Rendering-side listener for entity lifecycle changes.
pub trait EntityObserver: Send {
    fn on_entity_placed(&mut self, _entity: &PlacedEntity) {}
    fn on_entity_removed(&mut self, _id: EntityId, _kind: EntityKind) {}
    fn on_entity_level_changed(&mut self, _id: EntityId, _level: u8) {}
}

pub trait MissionHook: Send {
    fn on_progress(&mut self, action: MissionAction, target: &str, amount: u64);
}

pub trait NotificationSink: Send {
    fn notify(&mut self, message: &str, severity: Severity);
}

/// Routes notifications into the tracing pipeline.
#[derive(Debug, Default)]
pub struct LogNotifier;

impl NotificationSink for LogNotifier {
    fn notify(&mut self, message: &str, severity: Severity) {
        match severity {
            Severity::Info | Severity::Success => info!(target: "farmstead::notify", "{message}"),
            Severity::Warning => warn!(target: "farmstead::notify", "{message}"),
            Severity::Error => error!(target: "farmstead::notify", "{message}"),
        }
    }
}
