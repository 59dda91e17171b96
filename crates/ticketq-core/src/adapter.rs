//! Adapter contract for ticketing backends.
//!
//! Every backend plugin implements [`Adapter`], which knows how to validate
//! its configuration, build an authenticated [`Client`], and translate its
//! native status vocabulary to the canonical [`Status`] set. The factory
//! drives the lifecycle: validate config, resolve the principal, fetch the
//! secret from the vault, `create_auth`, `create_client`.

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::AdapterConfig;
use crate::error::Result;
use crate::types::{Group, Secret, Status, Ticket, User};

/// One entry of an adapter's configuration schema.
///
/// Fields flagged `secret` are stored in the credential vault and must never
/// appear in the plain JSON config document.
#[derive(Debug, Clone)]
pub struct ConfigField {
    pub name: &'static str,
    pub description: &'static str,
    pub required: bool,
    pub secret: bool,
}

/// A single-status search issued against a backend.
///
/// Multi-status filters are decomposed by the query engine; the backend only
/// ever sees one canonical status per call.
#[derive(Debug, Clone)]
pub struct TicketQuery {
    pub status: Status,
    pub group: Option<u64>,
    pub assignee: Option<u64>,
}

/// One page of search results plus the cursor for the next page, if any.
#[derive(Debug, Clone, Default)]
pub struct TicketPage {
    pub tickets: Vec<Ticket>,
    pub next_cursor: Option<String>,
}

/// Authentication material for one backend session.
pub trait Auth: Send + Sync + std::fmt::Debug {
    /// The principal (e.g. email) this auth was built for.
    fn principal(&self) -> &str;

    /// Base URL of the backend API.
    fn base_url(&self) -> &str;

    /// Headers to attach to every request.
    fn headers(&self) -> Vec<(String, String)>;
}

/// Authenticated client for one ticketing backend.
#[async_trait]
pub trait Client: Send + Sync + std::fmt::Debug {
    /// Fetch one page of tickets matching a single-status query.
    async fn search_tickets(
        &self,
        query: &TicketQuery,
        cursor: Option<&str>,
    ) -> Result<TicketPage>;

    /// Get the currently authenticated user.
    async fn current_user(&self) -> Result<User>;

    /// List all groups (teams) visible to the authenticated user.
    async fn list_groups(&self) -> Result<Vec<Group>>;
}

/// Trait for ticketing backend adapters (Zendesk, Jira, etc.)
pub trait Adapter: Send + Sync + std::fmt::Debug {
    /// Adapter name used for registry lookup and config files (e.g. "zendesk")
    fn name(&self) -> &str;

    /// Human-readable adapter name
    fn display_name(&self) -> &str;

    /// Adapter version
    fn version(&self) -> &str;

    /// The adapter's configuration schema.
    fn config_schema(&self) -> Vec<ConfigField>;

    /// Validate a plain (non-secret) configuration.
    fn validate_config(&self, config: &AdapterConfig) -> Result<()>;

    /// The principal under which this configuration's secret is vaulted.
    fn principal<'a>(&self, config: &'a AdapterConfig) -> Result<&'a str>;

    /// Build authentication material from a validated config and its secret.
    fn create_auth(&self, config: &AdapterConfig, secret: Secret) -> Result<Box<dyn Auth>>;

    /// Build an authenticated client.
    fn create_client(&self, auth: Box<dyn Auth>) -> Result<Arc<dyn Client>>;

    /// Map a backend-native status onto the canonical set.
    ///
    /// Fails with [`Error::UnknownStatus`](crate::Error::UnknownStatus) when
    /// there is no mapping; callers keep the ticket with
    /// [`Status::Unknown`] rather than dropping it.
    fn normalize_status(&self, raw: &str) -> Result<Status>;

    /// Map a canonical status back to the backend's vocabulary.
    fn denormalize_status(&self, status: Status) -> String;
}
