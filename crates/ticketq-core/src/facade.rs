//! Library facade: the single call surface for the CLI and external
//! programs.

use std::fs;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, warn};

use crate::adapter::{Adapter, Client};
use crate::config::AdapterConfig;
use crate::error::{Error, Result};
use crate::factory::AdapterFactory;
use crate::query::{sort_tickets, QueryEngine};
use crate::teams::TeamResolver;
use crate::types::{SortKey, Status, Ticket, TicketFilter, User};

/// One ready-to-query backend session.
pub struct TicketQ {
    adapter: Arc<dyn Adapter>,
    client: Arc<dyn Client>,
}

impl std::fmt::Debug for TicketQ {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TicketQ")
            .field("adapter", &self.adapter.name())
            .finish_non_exhaustive()
    }
}

impl TicketQ {
    pub fn new(adapter: Arc<dyn Adapter>, client: Arc<dyn Client>) -> Self {
        Self { adapter, client }
    }

    /// Construct through the factory, with optional explicit adapter name
    /// and config override.
    pub fn from_factory(
        factory: &AdapterFactory,
        name: Option<&str>,
        config_override: Option<AdapterConfig>,
    ) -> Result<Self> {
        let (adapter, client) = factory.create(name, config_override)?;
        Ok(Self::new(adapter, client))
    }

    pub fn adapter_name(&self) -> &str {
        self.adapter.name()
    }

    pub fn display_name(&self) -> &str {
        self.adapter.display_name()
    }

    /// Fetch tickets for a logical filter: fan out, merge, annotate team
    /// names, sort.
    ///
    /// An empty status list defaults to `open`. With `assignee_only` the
    /// current user is resolved once and threaded into every fan-out call.
    /// Without a sort key the deterministic merge order is returned as-is.
    pub async fn get_tickets(
        &self,
        filter: &TicketFilter,
        sort_by: Option<SortKey>,
    ) -> Result<Vec<Ticket>> {
        let statuses: Vec<Status> = if filter.statuses.is_empty() {
            vec![Status::Open]
        } else {
            filter.statuses.clone()
        };

        let assignee = if filter.assignee_only {
            let user = self.client.current_user().await?;
            debug!(user_id = user.id, "Restricting to current assignee");
            Some(user.id)
        } else {
            None
        };

        let engine = QueryEngine::new(Arc::clone(&self.client));
        let mut tickets = engine.run(&statuses, &filter.groups, assignee).await?;

        let resolver = TeamResolver::new(Arc::clone(&self.client));
        resolver.annotate(&mut tickets).await;

        if let Some(key) = sort_by {
            sort_tickets(&mut tickets, key);
        }

        debug!(count = tickets.len(), "Query complete");
        Ok(tickets)
    }

    /// Current authenticated user.
    pub async fn current_user(&self) -> Result<User> {
        self.client.current_user().await
    }

    /// One lightweight `current_user` probe; never propagates an error.
    pub async fn test_connection(&self) -> bool {
        match self.client.current_user().await {
            Ok(user) => {
                debug!(user_id = user.id, "Connection test succeeded");
                true
            }
            Err(e) => {
                warn!(adapter = self.adapter.name(), error = %e, "Connection test failed");
                false
            }
        }
    }

    /// Write a fully resolved, fully sorted ticket list to a CSV file.
    ///
    /// Descriptions are exported in full, not truncated.
    pub fn export_csv(tickets: &[Ticket], path: &Path) -> Result<()> {
        let now = Utc::now();
        let mut out = String::new();
        out.push_str(
            "id,subject,description,status,team,created_at,updated_at,\
             days_since_created,days_since_updated,assignee_id,url\n",
        );
        for t in tickets {
            let fields = [
                t.id.to_string(),
                t.subject.clone(),
                t.description.clone(),
                t.status.to_string(),
                t.team_name.clone().unwrap_or_default(),
                t.created_at.to_rfc3339(),
                t.updated_at.to_rfc3339(),
                t.days_since_created(now).to_string(),
                t.days_since_updated(now).to_string(),
                t.assignee_id.map(|id| id.to_string()).unwrap_or_default(),
                t.url.clone(),
            ];
            let row: Vec<String> = fields.iter().map(|f| csv_escape(f)).collect();
            out.push_str(&row.join(","));
            out.push('\n');
        }

        let mut file = fs::File::create(path).map_err(|e| Error::Config {
            message: format!("Failed to create CSV file: {}", e),
            path: Some(path.to_path_buf()),
        })?;
        file.write_all(out.as_bytes()).map_err(|e| Error::Config {
            message: format!("Failed to write CSV file: {}", e),
            path: Some(path.to_path_buf()),
        })?;
        Ok(())
    }
}

/// RFC 4180 quoting: wrap when the field contains a comma, quote, or
/// newline, doubling embedded quotes.
fn csv_escape(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
