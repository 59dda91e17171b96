//! Multi-status query fan-out, merge, and sort.
//!
//! Backend OR-filter semantics are unreliable, so a logical multi-status
//! filter is decomposed into one independent call per `(status, group)` pair
//! and recombined here. Calls run concurrently, but the merge order is fixed
//! by call-issue order, not completion order, so the output is deterministic
//! for a given input order.

use std::cmp::Reverse;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::adapter::{Client, TicketQuery};
use crate::error::{Error, Result};
use crate::types::{SortKey, Status, Ticket};

/// Default cap on rate-limit retries per fan-out call.
const DEFAULT_MAX_RETRIES: u32 = 3;

/// Default base delay for exponential backoff.
const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(500);

/// Drives a [`Client`] through the fan-out calls for one logical filter.
pub struct QueryEngine {
    client: Arc<dyn Client>,
    max_retries: u32,
    base_delay: Duration,
}

impl QueryEngine {
    pub fn new(client: Arc<dyn Client>) -> Self {
        Self {
            client,
            max_retries: DEFAULT_MAX_RETRIES,
            base_delay: DEFAULT_BASE_DELAY,
        }
    }

    /// Override the retry policy. Used by tests to avoid real backoff sleeps.
    pub fn with_retry(mut self, max_retries: u32, base_delay: Duration) -> Self {
        self.max_retries = max_retries;
        self.base_delay = base_delay;
        self
    }

    /// Execute the fan-out for `statuses` x `groups` and return the merged,
    /// deduplicated ticket list in deterministic call-issue order.
    ///
    /// Any call failing with something other than a recoverable rate limit
    /// aborts the whole aggregation; a partial result set is never returned.
    pub async fn run(
        &self,
        statuses: &[Status],
        groups: &[u64],
        assignee: Option<u64>,
    ) -> Result<Vec<Ticket>> {
        // Cartesian product, outer loop statuses, inner loop groups, both in
        // caller order. An empty group list is a single unconstrained call.
        let group_slots: Vec<Option<u64>> = if groups.is_empty() {
            vec![None]
        } else {
            groups.iter().copied().map(Some).collect()
        };

        let queries: Vec<TicketQuery> = statuses
            .iter()
            .flat_map(|&status| {
                group_slots.iter().map(move |&group| TicketQuery {
                    status,
                    group,
                    assignee,
                })
            })
            .collect();

        debug!(calls = queries.len(), "Issuing fan-out calls");

        let mut tasks = JoinSet::new();
        for (slot, query) in queries.into_iter().enumerate() {
            let client = Arc::clone(&self.client);
            let max_retries = self.max_retries;
            let base_delay = self.base_delay;
            tasks.spawn(async move {
                let result = fetch_to_exhaustion(client, &query, max_retries, base_delay).await;
                (slot, result)
            });
        }

        // Completion order is arbitrary; results land in their issue-order
        // slot so the merge below is reproducible.
        let mut slots: Vec<Option<Vec<Ticket>>> = Vec::new();
        slots.resize_with(tasks.len(), || None);

        while let Some(joined) = tasks.join_next().await {
            let (slot, result) = match joined {
                Ok(pair) => pair,
                Err(e) => {
                    tasks.abort_all();
                    return Err(Error::Network(format!("Fan-out task failed: {}", e)));
                }
            };
            match result {
                Ok(tickets) => slots[slot] = Some(tickets),
                Err(e) => {
                    tasks.abort_all();
                    return Err(e);
                }
            }
        }

        Ok(merge(slots.into_iter().flatten()))
    }
}

/// Paginate one query to exhaustion, retrying rate limits per page.
async fn fetch_to_exhaustion(
    client: Arc<dyn Client>,
    query: &TicketQuery,
    max_retries: u32,
    base_delay: Duration,
) -> Result<Vec<Ticket>> {
    let mut tickets = Vec::new();
    let mut cursor: Option<String> = None;

    loop {
        let page =
            search_with_retry(client.as_ref(), query, cursor.as_deref(), max_retries, base_delay)
                .await?;
        tickets.extend(page.tickets);
        match page.next_cursor {
            Some(next) => cursor = Some(next),
            None => break,
        }
    }

    Ok(tickets)
}

/// One page fetch with bounded exponential backoff on `RateLimited`.
///
/// The sleep is scoped to this call only; sibling fan-out calls keep running.
async fn search_with_retry(
    client: &dyn Client,
    query: &TicketQuery,
    cursor: Option<&str>,
    max_retries: u32,
    base_delay: Duration,
) -> Result<crate::adapter::TicketPage> {
    let mut attempt = 0;
    loop {
        match client.search_tickets(query, cursor).await {
            Err(Error::RateLimited { retry_after }) if attempt < max_retries => {
                let delay = retry_after
                    .map(Duration::from_secs)
                    .unwrap_or_else(|| base_delay * 2u32.pow(attempt));
                warn!(
                    status = %query.status,
                    attempt = attempt + 1,
                    delay_ms = delay.as_millis() as u64,
                    "Rate limited, backing off"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            other => return other,
        }
    }
}

/// Concatenate per-call batches in issue order, dropping duplicate ticket
/// ids and keeping the first occurrence.
fn merge(batches: impl IntoIterator<Item = Vec<Ticket>>) -> Vec<Ticket> {
    let mut seen = HashSet::new();
    let mut merged = Vec::new();
    for batch in batches {
        for ticket in batch {
            if seen.insert(ticket.id) {
                merged.push(ticket);
            }
        }
    }
    merged
}

/// Stable in-place sort by one supported key.
///
/// Equal keys preserve the post-merge relative order. Day-age keys are
/// computed once against a single clock snapshot so that tickets within the
/// same whole-day bucket keep their merge order. The team key compares the
/// annotated `team_name` verbatim, including the stringified-id fallback;
/// tickets without a team sort under the empty string.
pub fn sort_tickets(tickets: &mut [Ticket], key: SortKey) {
    match key {
        SortKey::Id => tickets.sort_by_key(|t| t.id),
        SortKey::Status => tickets.sort_by_key(|t| t.status),
        SortKey::Team => {
            tickets.sort_by(|a, b| {
                let a_key = a.team_name.as_deref().unwrap_or("");
                let b_key = b.team_name.as_deref().unwrap_or("");
                a_key.cmp(b_key)
            });
        }
        SortKey::Description => {
            tickets.sort_by(|a, b| a.description.cmp(&b.description));
        }
        SortKey::CreatedAt => tickets.sort_by_key(|t| Reverse(t.created_at)),
        SortKey::UpdatedAt => tickets.sort_by_key(|t| Reverse(t.updated_at)),
        SortKey::DaysCreated => {
            let now = Utc::now();
            tickets.sort_by_key(|t| Reverse(t.days_since_created(now)));
        }
        SortKey::DaysUpdated => {
            let now = Utc::now();
            tickets.sort_by_key(|t| Reverse(t.days_since_updated(now)));
        }
    }
}
