//! Hand-rolled fakes shared by the core unit tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};

use crate::adapter::{Adapter, Auth, Client, ConfigField, TicketPage, TicketQuery};
use crate::config::AdapterConfig;
use crate::error::{Error, Result};
use crate::types::{Group, Secret, Status, Ticket, User};

/// A plain open ticket with the given id.
pub(crate) fn make_ticket(id: u64) -> Ticket {
    Ticket {
        id,
        subject: format!("Ticket {}", id),
        description: format!("Description of ticket {}", id),
        status: Status::Open,
        created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        updated_at: Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap(),
        assignee_id: None,
        group_id: None,
        url: format!("https://fake.example.com/tickets/{}", id),
        team_name: None,
    }
}

type QueryKey = (Status, Option<u64>);

/// Scripted in-memory [`Client`].
///
/// Pages are keyed by `(status, group)`; cursors are page indices. Scripted
/// failures are consumed one per call before the scripted pages apply.
#[derive(Debug, Default)]
pub(crate) struct FakeClient {
    pages: Mutex<HashMap<QueryKey, Vec<Vec<Ticket>>>>,
    failures: Mutex<HashMap<QueryKey, Vec<Error>>>,
    queries: Mutex<Vec<TicketQuery>>,
    search_count: AtomicUsize,
    groups: Vec<Group>,
    groups_error: Mutex<Option<Error>>,
    groups_delay: Option<Duration>,
    groups_count: AtomicUsize,
    user: Option<User>,
    user_error: Mutex<Option<Error>>,
}

impl FakeClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_groups(mut self, groups: Vec<Group>) -> Self {
        self.groups = groups;
        self
    }

    /// Delay `list_groups` to widen the race window in coalescing tests.
    pub fn with_groups_delay(mut self, millis: u64) -> Self {
        self.groups_delay = Some(Duration::from_millis(millis));
        self
    }

    pub fn with_groups_error(self, error: Error) -> Self {
        *self.groups_error.lock().unwrap() = Some(error);
        self
    }

    pub fn with_user(mut self, user: User) -> Self {
        self.user = Some(user);
        self
    }

    pub fn with_user_error(self, error: Error) -> Self {
        *self.user_error.lock().unwrap() = Some(error);
        self
    }

    /// Script a single result page for one `(status, group)` call.
    pub fn script(&self, status: Status, group: Option<u64>, tickets: Vec<Ticket>) {
        self.script_pages(status, group, vec![tickets]);
    }

    /// Script a multi-page result for one `(status, group)` call.
    pub fn script_pages(&self, status: Status, group: Option<u64>, pages: Vec<Vec<Ticket>>) {
        self.pages.lock().unwrap().insert((status, group), pages);
    }

    /// Script one failure consumed by the next call for `(status, group)`.
    pub fn fail_once(&self, status: Status, group: Option<u64>, error: Error) {
        self.failures
            .lock()
            .unwrap()
            .entry((status, group))
            .or_default()
            .push(error);
    }

    pub fn search_calls(&self) -> usize {
        self.search_count.load(Ordering::SeqCst)
    }

    pub fn list_groups_calls(&self) -> usize {
        self.groups_count.load(Ordering::SeqCst)
    }

    pub fn recorded_queries(&self) -> Vec<TicketQuery> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl Client for FakeClient {
    async fn search_tickets(
        &self,
        query: &TicketQuery,
        cursor: Option<&str>,
    ) -> Result<TicketPage> {
        self.search_count.fetch_add(1, Ordering::SeqCst);
        self.queries.lock().unwrap().push(query.clone());

        let key = (query.status, query.group);

        if let Some(queue) = self.failures.lock().unwrap().get_mut(&key) {
            if !queue.is_empty() {
                return Err(queue.remove(0));
            }
        }

        let pages = self.pages.lock().unwrap();
        let Some(scripted) = pages.get(&key) else {
            return Ok(TicketPage::default());
        };

        let index: usize = cursor.map(|c| c.parse().unwrap()).unwrap_or(0);
        let tickets = scripted.get(index).cloned().unwrap_or_default();
        let next_cursor = if index + 1 < scripted.len() {
            Some((index + 1).to_string())
        } else {
            None
        };
        Ok(TicketPage {
            tickets,
            next_cursor,
        })
    }

    async fn current_user(&self) -> Result<User> {
        if let Some(error) = self.user_error.lock().unwrap().take() {
            return Err(error);
        }
        Ok(self.user.clone().unwrap_or(User {
            id: 1,
            name: "Fake Agent".to_string(),
            email: Some("agent@fake.example.com".to_string()),
            group_ids: Vec::new(),
        }))
    }

    async fn list_groups(&self) -> Result<Vec<Group>> {
        self.groups_count.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.groups_delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(error) = self.groups_error.lock().unwrap().take() {
            return Err(error);
        }
        Ok(self.groups.clone())
    }
}

#[derive(Debug)]
struct FakeAuth {
    principal: String,
}

impl Auth for FakeAuth {
    fn principal(&self) -> &str {
        &self.principal
    }

    fn base_url(&self) -> &str {
        "http://fake.example.com"
    }

    fn headers(&self) -> Vec<(String, String)> {
        Vec::new()
    }
}

/// Minimal [`Adapter`] whose client is injected by the test.
#[derive(Debug)]
pub(crate) struct FakeAdapter {
    name: String,
    client: Arc<FakeClient>,
    valid: bool,
}

impl FakeAdapter {
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            client: Arc::new(FakeClient::new()),
            valid: true,
        }
    }

    pub fn with_client(mut self, client: Arc<FakeClient>) -> Self {
        self.client = client;
        self
    }

    /// Make `validate_config` reject everything.
    pub fn rejecting_config(mut self) -> Self {
        self.valid = false;
        self
    }
}

impl Adapter for FakeAdapter {
    fn name(&self) -> &str {
        &self.name
    }

    fn display_name(&self) -> &str {
        &self.name
    }

    fn version(&self) -> &str {
        "0.0.0"
    }

    fn config_schema(&self) -> Vec<ConfigField> {
        vec![
            ConfigField {
                name: "domain",
                description: "Backend domain",
                required: true,
                secret: false,
            },
            ConfigField {
                name: "email",
                description: "Account email",
                required: true,
                secret: false,
            },
            ConfigField {
                name: "api_token",
                description: "API token",
                required: true,
                secret: true,
            },
        ]
    }

    fn validate_config(&self, config: &AdapterConfig) -> Result<()> {
        if !self.valid {
            return Err(Error::Config {
                message: format!("Invalid configuration for '{}'", self.name),
                path: None,
            });
        }
        config.require_str("domain")?;
        config.require_str("email")?;
        Ok(())
    }

    fn principal<'a>(&self, config: &'a AdapterConfig) -> Result<&'a str> {
        config.require_str("email")
    }

    fn create_auth(&self, config: &AdapterConfig, _secret: Secret) -> Result<Box<dyn Auth>> {
        Ok(Box::new(FakeAuth {
            principal: config.require_str("email")?.to_string(),
        }))
    }

    fn create_client(&self, _auth: Box<dyn Auth>) -> Result<Arc<dyn Client>> {
        Ok(Arc::clone(&self.client) as Arc<dyn Client>)
    }

    fn normalize_status(&self, raw: &str) -> Result<Status> {
        raw.parse().map_err(|_| Error::UnknownStatus {
            adapter: self.name.clone(),
            status: raw.to_string(),
        })
    }

    fn denormalize_status(&self, status: Status) -> String {
        status.as_str().to_string()
    }
}
