//! Adapter registry
//!
//! Holds one adapter per item type and provides lookup functions for the
//! engine and the CLI.

use crate::adapters::{all_adapters, Adapter, AdapterContext};
use crate::sdp::ItemType;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Every adapter, keyed by the item type it serves
#[derive(Clone, Default)]
pub struct AdapterRegistry {
    adapters: BTreeMap<ItemType, Arc<dyn Adapter>>,
}

impl AdapterRegistry {
    /// Build every adapter this crate provides
    pub fn new(ctx: &AdapterContext) -> Self {
        Self::from_adapters(all_adapters(ctx))
    }

    /// Register the given adapters; a later adapter for the same type replaces
    /// an earlier one
    pub fn from_adapters(adapters: impl IntoIterator<Item = Arc<dyn Adapter>>) -> Self {
        let mut registry = Self::default();
        for adapter in adapters {
            registry.register(adapter);
        }
        registry
    }

    pub fn register(&mut self, adapter: Arc<dyn Adapter>) {
        let item_type = adapter.item_type();
        if self.adapters.insert(item_type, adapter).is_some() {
            tracing::warn!("replacing adapter for {}", item_type);
        }
    }

    pub fn get(&self, item_type: ItemType) -> Option<&Arc<dyn Adapter>> {
        self.adapters.get(&item_type)
    }

    /// Item types with an adapter, in a stable order
    pub fn item_types(&self) -> Vec<ItemType> {
        self.adapters.keys().copied().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Adapter>> {
        self.adapters.values()
    }

    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }
}
