//! Zendesk API client implementation.

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use ticketq_core::{Auth, Client, Error, Group, Result, TicketPage, TicketQuery, User};

use crate::types::{
    map_group, map_ticket, map_user, CurrentUserResponse, GroupsResponse, SearchResponse,
};

/// Results per search page.
const PAGE_SIZE: u32 = 100;

/// Request timeout.
const TIMEOUT: Duration = Duration::from_secs(30);

/// Zendesk API client.
#[derive(Debug)]
pub struct ZendeskClient {
    base_url: String,
    web_root: String,
    headers: Vec<(String, String)>,
    client: reqwest::Client,
}

impl ZendeskClient {
    /// Create a client from authentication material.
    pub fn new(auth: &dyn Auth) -> Result<Self> {
        let base_url = auth.base_url().to_string();
        let web_root = base_url
            .strip_suffix("/api/v2")
            .unwrap_or(&base_url)
            .to_string();

        let client = reqwest::Client::builder()
            .user_agent(concat!("ticketq/", env!("CARGO_PKG_VERSION")))
            .timeout(TIMEOUT)
            .build()
            .map_err(|e| Error::Network(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            base_url,
            web_root,
            headers: auth.headers(),
            client,
        })
    }

    fn api_url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint)
    }

    /// Make an authenticated GET request with typed deserialization.
    async fn get<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        params: &[(&str, String)],
    ) -> Result<T> {
        debug!(url = url, "Zendesk GET request");

        let mut request = self.client.get(url).query(params);
        for (name, value) in &self.headers {
            request = request.header(name, value);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                Error::Network(format!("Request timed out: {}", e))
            } else {
                Error::Network(format!("Request failed: {}", e))
            }
        })?;

        self.handle_response(response).await
    }

    /// Map response status to the error taxonomy, then deserialize.
    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T> {
        let status = response.status();

        if !status.is_success() {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok());
            let message = response.text().await.unwrap_or_default();

            // 429 is mapped here rather than through from_status so the
            // Retry-After hint survives
            return Err(match status.as_u16() {
                429 => Error::RateLimited { retry_after },
                code => Error::from_status("zendesk", code, message),
            });
        }

        response
            .json()
            .await
            .map_err(|e| Error::MalformedResponse(format!("Failed to parse response: {}", e)))
    }

    /// Build the search query string for one single-status fan-out call.
    fn search_query(&self, query: &TicketQuery) -> String {
        let mut parts = vec!["type:ticket".to_string(), format!("status:{}", query.status)];
        if let Some(group) = query.group {
            parts.push(format!("group:{}", group));
        }
        if let Some(assignee) = query.assignee {
            parts.push(format!("assignee:{}", assignee));
        }
        parts.join(" ")
    }
}

#[async_trait]
impl Client for ZendeskClient {
    async fn search_tickets(
        &self,
        query: &TicketQuery,
        cursor: Option<&str>,
    ) -> Result<TicketPage> {
        let mut params = vec![
            ("query", self.search_query(query)),
            ("filter[type]", "ticket".to_string()),
            ("page[size]", PAGE_SIZE.to_string()),
        ];
        if let Some(cursor) = cursor {
            params.push(("page[after]", cursor.to_string()));
        }

        let response: SearchResponse = self
            .get(&self.api_url("search/export.json"), &params)
            .await?;

        let tickets = response
            .results
            .into_iter()
            .map(|t| map_ticket(t, &self.web_root))
            .collect();
        let next_cursor = if response.meta.has_more {
            response.meta.after_cursor
        } else {
            None
        };

        Ok(TicketPage {
            tickets,
            next_cursor,
        })
    }

    async fn current_user(&self) -> Result<User> {
        let response: CurrentUserResponse = self.get(&self.api_url("users/me.json"), &[]).await?;
        Ok(map_user(response.user))
    }

    async fn list_groups(&self) -> Result<Vec<Group>> {
        let mut groups = Vec::new();
        let mut url = self.api_url("groups.json");

        // groups.json uses offset pagination with absolute next_page links
        loop {
            let response: GroupsResponse = self.get(&url, &[]).await?;
            groups.extend(response.groups.into_iter().map(map_group));
            match response.next_page {
                Some(next) => url = next,
                None => break,
            }
        }

        Ok(groups)
    }
}
