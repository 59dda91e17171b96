//! Group-id to team-name resolution.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::OnceCell;
use tracing::{debug, warn};

use crate::adapter::Client;
use crate::types::Ticket;

/// Session-scoped cache over `list_groups()`.
///
/// The first `resolve` call populates the cache with exactly one backend
/// call; concurrent first-callers coalesce on the cell instead of issuing
/// duplicates. The resolver lives for one facade operation and is never
/// persisted.
pub struct TeamResolver {
    client: Arc<dyn Client>,
    cache: OnceCell<HashMap<u64, String>>,
}

impl TeamResolver {
    pub fn new(client: Arc<dyn Client>) -> Self {
        Self {
            client,
            cache: OnceCell::new(),
        }
    }

    /// Resolve a group id to its team name.
    ///
    /// Resolution is decorative: unknown ids (deleted group, no access) and
    /// even a failed `list_groups()` fall back to the stringified id rather
    /// than failing the operation.
    pub async fn resolve(&self, group_id: u64) -> String {
        let cache = self
            .cache
            .get_or_init(|| async {
                match self.client.list_groups().await {
                    Ok(groups) => {
                        debug!(count = groups.len(), "Cached group names");
                        groups.into_iter().map(|g| (g.id, g.name)).collect()
                    }
                    Err(e) => {
                        warn!(error = %e, "Failed to list groups, falling back to raw ids");
                        HashMap::new()
                    }
                }
            })
            .await;

        cache
            .get(&group_id)
            .cloned()
            .unwrap_or_else(|| group_id.to_string())
    }

    /// Annotate every grouped ticket with its resolved team name.
    pub async fn annotate(&self, tickets: &mut [Ticket]) {
        for ticket in tickets.iter_mut() {
            if let Some(group_id) = ticket.group_id {
                ticket.team_name = Some(self.resolve(group_id).await);
            }
        }
    }
}
