//! Plugin registry mapping adapter names to implementations.
//!
//! The registry is an explicit value populated once at startup by the host
//! program; there is no global instance and no runtime re-discovery, which
//! keeps the set of available adapters a testable input.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::adapter::Adapter;
use crate::error::{Error, Result};

/// Registry of available adapter implementations.
#[derive(Default)]
pub struct AdapterRegistry {
    adapters: HashMap<String, Arc<dyn Adapter>>,
    /// Registration order, for stable listing
    order: Vec<String>,
}

impl AdapterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an adapter under its own name.
    ///
    /// Re-registering a name overwrites the previous implementation with a
    /// warning; it never fails.
    pub fn register(&mut self, adapter: Arc<dyn Adapter>) {
        let name = adapter.name().to_string();
        if self.adapters.insert(name.clone(), adapter).is_some() {
            warn!(adapter = %name, "Adapter re-registered, overwriting previous implementation");
        } else {
            debug!(adapter = %name, "Registered adapter");
            self.order.push(name);
        }
    }

    /// Look up an adapter by name.
    pub fn get(&self, name: &str) -> Result<Arc<dyn Adapter>> {
        self.adapters
            .get(name)
            .cloned()
            .ok_or_else(|| Error::AdapterNotFound {
                name: name.to_string(),
                available: self.list(),
            })
    }

    /// Registered adapter names, in registration order.
    pub fn list(&self) -> Vec<String> {
        self.order.clone()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.adapters.contains_key(name)
    }
}
