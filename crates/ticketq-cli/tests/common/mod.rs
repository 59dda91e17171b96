//! Common test infrastructure: a hand-rolled in-memory adapter and client
//! so workflow tests can run the full factory/facade path without a
//! network or a real keychain.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use ticketq_core::{
    Adapter, AdapterConfig, Auth, Client, ConfigField, Error, Group, Result, Secret, Status,
    Ticket, TicketPage, TicketQuery, User,
};

/// In-memory backend with scripted tickets per (status, group) pair.
#[derive(Debug, Default)]
pub struct TestClient {
    pub tickets: Mutex<HashMap<(Status, Option<u64>), Vec<Ticket>>>,
    pub groups: Vec<Group>,
    pub user: Option<User>,
}

impl TestClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn script(&self, status: Status, group: Option<u64>, tickets: Vec<Ticket>) {
        self.tickets
            .lock()
            .unwrap()
            .insert((status, group), tickets);
    }
}

#[async_trait]
impl Client for TestClient {
    async fn search_tickets(
        &self,
        query: &TicketQuery,
        _cursor: Option<&str>,
    ) -> Result<TicketPage> {
        let tickets = self
            .tickets
            .lock()
            .unwrap()
            .get(&(query.status, query.group))
            .cloned()
            .unwrap_or_default();
        Ok(TicketPage {
            tickets,
            next_cursor: None,
        })
    }

    async fn current_user(&self) -> Result<User> {
        self.user.clone().ok_or_else(|| Error::Auth {
            adapter: "test".to_string(),
            message: "no user scripted".to_string(),
        })
    }

    async fn list_groups(&self) -> Result<Vec<Group>> {
        Ok(self.groups.clone())
    }
}

#[derive(Debug)]
pub struct TestAuth {
    principal: String,
}

impl Auth for TestAuth {
    fn principal(&self) -> &str {
        &self.principal
    }

    fn base_url(&self) -> &str {
        "http://localhost"
    }

    fn headers(&self) -> Vec<(String, String)> {
        Vec::new()
    }
}

/// Adapter whose clients all share one scripted in-memory backend.
#[derive(Debug)]
pub struct TestAdapter {
    client: Arc<TestClient>,
}

impl TestAdapter {
    pub fn new(client: Arc<TestClient>) -> Self {
        Self { client }
    }
}

impl Adapter for TestAdapter {
    fn name(&self) -> &str {
        "test"
    }

    fn display_name(&self) -> &str {
        "Test Backend"
    }

    fn version(&self) -> &str {
        "0.0.0"
    }

    fn config_schema(&self) -> Vec<ConfigField> {
        vec![
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
        config.require_str("email").map(|_| ())
    }

    fn principal<'a>(&self, config: &'a AdapterConfig) -> Result<&'a str> {
        config.require_str("email")
    }

    fn create_auth(&self, config: &AdapterConfig, _secret: Secret) -> Result<Box<dyn Auth>> {
        Ok(Box::new(TestAuth {
            principal: config.require_str("email")?.to_string(),
        }))
    }

    fn create_client(&self, _auth: Box<dyn Auth>) -> Result<Arc<dyn Client>> {
        Ok(Arc::clone(&self.client) as Arc<dyn Client>)
    }

    fn normalize_status(&self, raw: &str) -> Result<Status> {
        raw.parse()
    }

    fn denormalize_status(&self, status: Status) -> String {
        status.to_string()
    }
}

pub fn sample_ticket(id: u64, status: Status) -> Ticket {
    use chrono::TimeZone;
    let created = chrono::Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    Ticket {
        id,
        subject: format!("Ticket {}", id),
        description: format!("Description for ticket {}", id),
        status,
        created_at: created,
        updated_at: created,
        assignee_id: None,
        group_id: None,
        url: format!("http://localhost/tickets/{}", id),
        team_name: None,
    }
}
