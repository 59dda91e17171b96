//! Zendesk adapter registration surface.

use std::sync::Arc;

use ticketq_core::{
    Adapter, AdapterConfig, Auth, Client, ConfigField, Error, Result, Secret, Status,
};

use crate::auth::ZendeskAuth;
use crate::client::ZendeskClient;
use crate::types::parse_status;

/// Minimum plausible API token length.
const MIN_TOKEN_LEN: usize = 10;

/// Zendesk adapter.
#[derive(Debug, Default)]
pub struct ZendeskAdapter;

impl ZendeskAdapter {
    pub fn new() -> Self {
        Self
    }
}

impl Adapter for ZendeskAdapter {
    fn name(&self) -> &str {
        "zendesk"
    }

    fn display_name(&self) -> &str {
        "Zendesk"
    }

    fn version(&self) -> &str {
        env!("CARGO_PKG_VERSION")
    }

    fn config_schema(&self) -> Vec<ConfigField> {
        vec![
            ConfigField {
                name: "domain",
                description: "Zendesk domain (e.g. company.zendesk.com)",
                required: true,
                secret: false,
            },
            ConfigField {
                name: "email",
                description: "Zendesk account email",
                required: true,
                secret: false,
            },
            ConfigField {
                name: "api_token",
                description: "Zendesk API token",
                required: true,
                secret: true,
            },
        ]
    }

    fn validate_config(&self, config: &AdapterConfig) -> Result<()> {
        let domain = config.require_str("domain")?;
        if !domain.ends_with(".zendesk.com") {
            return Err(Error::Config {
                message: format!("Zendesk domain '{}' must end with .zendesk.com", domain),
                path: None,
            });
        }

        let email = config.require_str("email")?;
        if !email.contains('@') {
            return Err(Error::Config {
                message: format!("'{}' does not look like an email address", email),
                path: None,
            });
        }

        Ok(())
    }

    fn principal<'a>(&self, config: &'a AdapterConfig) -> Result<&'a str> {
        config.require_str("email")
    }

    fn create_auth(&self, config: &AdapterConfig, secret: Secret) -> Result<Box<dyn Auth>> {
        if secret.expose().len() < MIN_TOKEN_LEN {
            return Err(Error::Config {
                message: "Zendesk API token is too short".to_string(),
                path: None,
            });
        }

        let domain = config.require_str("domain")?;
        let email = config.require_str("email")?;
        Ok(Box::new(ZendeskAuth::new(domain, email, secret)))
    }

    fn create_client(&self, auth: Box<dyn Auth>) -> Result<Arc<dyn Client>> {
        Ok(Arc::new(ZendeskClient::new(auth.as_ref())?))
    }

    fn normalize_status(&self, raw: &str) -> Result<Status> {
        parse_status(raw).ok_or_else(|| Error::UnknownStatus {
            adapter: "zendesk".to_string(),
            status: raw.to_string(),
        })
    }

    fn denormalize_status(&self, status: Status) -> String {
        // Zendesk's vocabulary is the canonical one
        status.as_str().to_string()
    }
}
