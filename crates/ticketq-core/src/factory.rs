//! Adapter factory with auto-detection.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::adapter::{Adapter, Client};
use crate::config::{AdapterConfig, ConfigStore};
use crate::error::{Error, Result};
use crate::registry::AdapterRegistry;
use crate::vault::CredentialVault;

/// Produces fully authenticated, ready-to-query adapter clients.
///
/// All collaborators are explicit instances so tests can wire isolated
/// registries, stores, and vaults.
pub struct AdapterFactory {
    registry: Arc<AdapterRegistry>,
    config_store: ConfigStore,
    vault: Arc<dyn CredentialVault>,
}

impl AdapterFactory {
    pub fn new(
        registry: Arc<AdapterRegistry>,
        config_store: ConfigStore,
        vault: Arc<dyn CredentialVault>,
    ) -> Self {
        Self {
            registry,
            config_store,
            vault,
        }
    }

    pub fn registry(&self) -> &AdapterRegistry {
        &self.registry
    }

    pub fn config_store(&self) -> &ConfigStore {
        &self.config_store
    }

    pub fn vault(&self) -> &dyn CredentialVault {
        self.vault.as_ref()
    }

    /// Create an adapter and its authenticated client.
    ///
    /// With no explicit name the adapter is auto-detected from the set of
    /// fully configured adapters (or the configured default). The vault is
    /// only checked for secret presence here; credential validity is proven
    /// by the first real call.
    pub fn create(
        &self,
        name: Option<&str>,
        config_override: Option<AdapterConfig>,
    ) -> Result<(Arc<dyn Adapter>, Arc<dyn Client>)> {
        let name = match name {
            Some(n) => n.to_string(),
            None => self.detect()?,
        };

        let adapter = self.registry.get(&name)?;

        let config = match config_override {
            Some(config) => config,
            None => self.config_store.load(&name)?.ok_or_else(|| Error::Config {
                message: format!(
                    "Adapter '{}' is not configured. Run 'tq configure {}'",
                    name, name
                ),
                path: None,
            })?,
        };

        adapter.validate_config(&config)?;

        let principal = adapter.principal(&config)?.to_string();
        let secret = self
            .vault
            .get(&name, &principal)?
            .ok_or_else(|| Error::Config {
                message: format!(
                    "No credential stored for '{}' (principal '{}'). Run 'tq configure {}'",
                    name, principal, name
                ),
                path: None,
            })?;

        let auth = adapter.create_auth(&config, secret)?;
        let client = adapter.create_client(auth)?;

        info!(adapter = %name, "Created adapter client");
        Ok((adapter, client))
    }

    /// Pick the adapter to use when none was named.
    fn detect(&self) -> Result<String> {
        if let Some(default) = self.config_store.default_adapter()? {
            if self.registry.contains(&default) && self.is_configured(&default) {
                debug!(adapter = %default, "Using default adapter from main config");
                return Ok(default);
            }
            warn!(
                adapter = %default,
                "Default adapter is not available or not configured, auto-detecting"
            );
        }

        let mut candidates = self.configured_adapters();
        match candidates.len() {
            0 => Err(Error::NoConfiguration {
                available: self.registry.list(),
            }),
            1 => {
                let detected = candidates.remove(0);
                debug!(adapter = %detected, "Auto-detected adapter");
                Ok(detected)
            }
            _ => Err(Error::AmbiguousAdapter { candidates }),
        }
    }

    /// Whether an adapter has a complete, valid persisted configuration with
    /// a vaulted secret.
    pub fn is_configured(&self, name: &str) -> bool {
        let Ok(adapter) = self.registry.get(name) else {
            return false;
        };
        let Ok(Some(config)) = self.config_store.load(name) else {
            return false;
        };
        if adapter.validate_config(&config).is_err() {
            return false;
        }
        let Ok(principal) = adapter.principal(&config) else {
            return false;
        };
        self.vault.contains(name, principal)
    }

    /// Registered adapters with a complete configuration, in registration
    /// order.
    pub fn configured_adapters(&self) -> Vec<String> {
        self.registry
            .list()
            .into_iter()
            .filter(|name| self.is_configured(name))
            .collect()
    }
}
