//! Secure credential storage using the OS keychain.
//!
//! Implements the [`CredentialVault`] trait from `ticketq-core` on top of
//! the operating system's native credential manager:
//!
//! - **macOS**: Keychain Services
//! - **Windows**: Credential Manager
//! - **Linux**: Secret Service (GNOME Keyring / KWallet)
//!
//! Secrets are addressed by `(adapter, principal)`; the keychain service
//! name is namespaced under `ticketq` so entries cannot collide with other
//! applications.
//!
//! # Example
//!
//! ```ignore
//! use ticketq_core::{CredentialVault, Secret};
//! use ticketq_storage::KeychainVault;
//!
//! let vault = KeychainVault::new();
//! vault.set("zendesk", "me@acme.com", &Secret::new("token"))?;
//! let secret = vault.get("zendesk", "me@acme.com")?;
//! vault.delete("zendesk", "me@acme.com")?;
//! ```

use keyring::Entry;
use tracing::{debug, warn};

use ticketq_core::{CredentialVault, Error, Result, Secret};

/// Namespace prefix for keychain service names.
const SERVICE_PREFIX: &str = "ticketq";

/// Credential vault backed by the OS keychain.
#[derive(Debug)]
pub struct KeychainVault {
    service_prefix: String,
}

impl KeychainVault {
    /// Create a vault with the default `ticketq` namespace.
    pub fn new() -> Self {
        Self {
            service_prefix: SERVICE_PREFIX.to_string(),
        }
    }

    /// Create a vault with a custom namespace.
    ///
    /// Useful for integration tests to avoid clobbering real credentials.
    pub fn with_service_prefix(prefix: impl Into<String>) -> Self {
        Self {
            service_prefix: prefix.into(),
        }
    }

    fn make_entry(&self, service: &str, account: &str) -> Result<Entry> {
        let namespaced = format!("{}:{}", self.service_prefix, service);
        Entry::new(&namespaced, account).map_err(|e| {
            Error::Vault(format!(
                "Failed to create keychain entry for '{}/{}': {}",
                service, account, e
            ))
        })
    }
}

impl Default for KeychainVault {
    fn default() -> Self {
        Self::new()
    }
}

impl CredentialVault for KeychainVault {
    fn set(&self, service: &str, account: &str, secret: &Secret) -> Result<()> {
        debug!(service = service, account = account, "Storing credential in keychain");

        self.make_entry(service, account)?
            .set_password(secret.expose())
            .map_err(|e| {
                Error::Vault(format!(
                    "Failed to store credential for '{}/{}': {}",
                    service, account, e
                ))
            })
    }

    fn get(&self, service: &str, account: &str) -> Result<Option<Secret>> {
        debug!(service = service, account = account, "Retrieving credential from keychain");

        match self.make_entry(service, account)?.get_password() {
            Ok(password) => Ok(Some(Secret::new(password))),
            Err(keyring::Error::NoEntry) => {
                debug!(service = service, account = account, "Credential not found");
                Ok(None)
            }
            Err(e) => {
                warn!(service = service, account = account, error = %e, "Failed to retrieve credential");
                Err(Error::Vault(format!(
                    "Failed to retrieve credential for '{}/{}': {}",
                    service, account, e
                )))
            }
        }
    }

    fn delete(&self, service: &str, account: &str) -> Result<()> {
        debug!(service = service, account = account, "Deleting credential from keychain");

        match self.make_entry(service, account)?.delete_credential() {
            Ok(()) => Ok(()),
            // Already gone, nothing to do
            Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(Error::Vault(format!(
                "Failed to delete credential for '{}/{}': {}",
                service, account, e
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_service_prefix() {
        let vault = KeychainVault::new();
        assert_eq!(vault.service_prefix, "ticketq");
    }

    #[test]
    fn test_custom_service_prefix() {
        let vault = KeychainVault::with_service_prefix("ticketq-test");
        assert_eq!(vault.service_prefix, "ticketq-test");
    }

    // KeychainVault round-trip tests would touch the real OS keychain, so
    // they are not run here; MemoryVault in ticketq-core covers the trait
    // contract.
}
