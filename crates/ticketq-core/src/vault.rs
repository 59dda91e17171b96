//! Credential vault interface.
//!
//! Secrets are addressed by `(service, account)` where the service is the
//! adapter name and the account is the configured principal (e.g. email).
//! The production implementation lives in `ticketq-storage` and uses the OS
//! keychain; [`MemoryVault`] here serves tests and headless environments.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::error::{Error, Result};
use crate::types::Secret;

/// Secure storage for credential material.
pub trait CredentialVault: Send + Sync {
    /// Store a secret.
    fn set(&self, service: &str, account: &str, secret: &Secret) -> Result<()>;

    /// Retrieve a secret. Returns `Ok(None)` when absent.
    fn get(&self, service: &str, account: &str) -> Result<Option<Secret>>;

    /// Delete a secret. Succeeds even when it was already absent.
    fn delete(&self, service: &str, account: &str) -> Result<()>;

    /// Check whether a secret is present.
    fn contains(&self, service: &str, account: &str) -> bool {
        matches!(self.get(service, account), Ok(Some(_)))
    }
}

/// In-memory credential vault for testing.
#[derive(Debug, Default)]
pub struct MemoryVault {
    secrets: RwLock<HashMap<(String, String), Secret>>,
}

impl MemoryVault {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CredentialVault for MemoryVault {
    fn set(&self, service: &str, account: &str, secret: &Secret) -> Result<()> {
        let mut secrets = self
            .secrets
            .write()
            .map_err(|e| Error::Vault(format!("Lock poisoned: {}", e)))?;
        secrets.insert((service.to_string(), account.to_string()), secret.clone());
        Ok(())
    }

    fn get(&self, service: &str, account: &str) -> Result<Option<Secret>> {
        let secrets = self
            .secrets
            .read()
            .map_err(|e| Error::Vault(format!("Lock poisoned: {}", e)))?;
        Ok(secrets
            .get(&(service.to_string(), account.to_string()))
            .cloned())
    }

    fn delete(&self, service: &str, account: &str) -> Result<()> {
        let mut secrets = self
            .secrets
            .write()
            .map_err(|e| Error::Vault(format!("Lock poisoned: {}", e)))?;
        secrets.remove(&(service.to_string(), account.to_string()));
        Ok(())
    }
}
