use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::catalog::ResourceKind;
use crate::error::SimError;

/// Capacity-bounded resource ledger.
///
/// `total() <= capacity()` holds for every path except [`Inventory::force_add`],
/// which autonomous collection uses so production never stalls.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    quantities: BTreeMap<ResourceKind, u32>,
    #[serde(skip)]
    capacity: u32,
}

impl Inventory {
    pub fn with_capacity(capacity: u32) -> Self {
        Self {
            quantities: BTreeMap::new(),
            capacity,
        }
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    pub(crate) fn set_capacity(&mut self, capacity: u32) {
        self.capacity = capacity;
    }

    pub fn get(&self, resource: ResourceKind) -> u32 {
        self.quantities.get(&resource).copied().unwrap_or(0)
    }

    pub fn total(&self) -> u32 {
        self.quantities.values().sum()
    }

    pub fn free_space(&self) -> u32 {
        self.capacity.saturating_sub(self.total())
    }

    pub fn is_over_capacity(&self) -> bool {
        self.total() > self.capacity
    }

    pub fn quantities(&self) -> &BTreeMap<ResourceKind, u32> {
        &self.quantities
    }

    pub fn try_add(&mut self, resource: ResourceKind, amount: u32) -> Result<(), SimError> {
        let free = self.free_space();
        if amount > free {
            return Err(SimError::InventoryFull {
                requested: amount,
                free,
            });
        }
        self.force_add(resource, amount);
        Ok(())
    }

    pub fn force_add(&mut self, resource: ResourceKind, amount: u32) {
        if amount == 0 {
            return;
        }
        let entry = self.quantities.entry(resource).or_insert(0);
        *entry = entry.saturating_add(amount);
    }

    pub fn check_available(&self, resource: ResourceKind, amount: u32) -> Result<(), SimError> {
        let available = self.get(resource);
        if available < amount {
            return Err(SimError::InsufficientResources {
                resource,
                needed: amount,
                available,
            });
        }
        Ok(())
    }

    pub fn try_remove(&mut self, resource: ResourceKind, amount: u32) -> Result<(), SimError> {
        self.check_available(resource, amount)?;
        self.take(resource, amount);
        Ok(())
    }

    /// Removes every listed amount, or nothing when any one is short.
    pub fn try_remove_all(&mut self, requirements: &[(ResourceKind, u32)]) -> Result<(), SimError> {
        for (resource, amount) in requirements {
            self.check_available(*resource, *amount)?;
        }
        for (resource, amount) in requirements {
            self.take(*resource, *amount);
        }
        Ok(())
    }

    fn take(&mut self, resource: ResourceKind, amount: u32) {
        if let Some(entry) = self.quantities.get_mut(&resource) {
            *entry = entry.saturating_sub(amount);
            if *entry == 0 {
                self.quantities.remove(&resource);
            }
        }
    }
}
