//! Zendesk API payload types and mapping to the unified model.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::warn;

use ticketq_core::{Group, Status, Ticket, User};

/// Zendesk ticket as returned by the search API.
#[derive(Debug, Clone, Deserialize)]
pub struct ZendeskTicket {
    pub id: u64,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub description: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub assignee_id: Option<u64>,
    pub group_id: Option<u64>,
}

/// Zendesk user payload.
#[derive(Debug, Clone, Deserialize)]
pub struct ZendeskUser {
    pub id: u64,
    pub name: String,
    pub email: Option<String>,
    pub default_group_id: Option<u64>,
}

/// Zendesk group payload.
#[derive(Debug, Clone, Deserialize)]
pub struct ZendeskGroup {
    pub id: u64,
    pub name: String,
    pub description: Option<String>,
}

/// Cursor-paginated search response.
#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub results: Vec<ZendeskTicket>,
    #[serde(default)]
    pub meta: SearchMeta,
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchMeta {
    #[serde(default)]
    pub has_more: bool,
    pub after_cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CurrentUserResponse {
    pub user: ZendeskUser,
}

#[derive(Debug, Deserialize)]
pub struct GroupsResponse {
    #[serde(default)]
    pub groups: Vec<ZendeskGroup>,
    pub next_page: Option<String>,
}

/// Map a native Zendesk status onto the canonical set.
///
/// Zendesk's vocabulary is already canonical; anything else has no mapping.
pub fn parse_status(raw: &str) -> Option<Status> {
    match raw.trim().to_lowercase().as_str() {
        "new" => Some(Status::New),
        "open" => Some(Status::Open),
        "pending" => Some(Status::Pending),
        "hold" => Some(Status::Hold),
        "solved" => Some(Status::Solved),
        "closed" => Some(Status::Closed),
        _ => None,
    }
}

/// Map a Zendesk ticket onto the unified model.
///
/// Unmappable statuses keep the ticket with `Status::Unknown`; timestamps
/// are clamped so `updated_at >= created_at` always holds.
pub fn map_ticket(zd: ZendeskTicket, web_root: &str) -> Ticket {
    let status = parse_status(&zd.status).unwrap_or_else(|| {
        warn!(ticket = zd.id, status = %zd.status, "Unknown Zendesk status, keeping ticket");
        Status::Unknown
    });
    let updated_at = zd.updated_at.max(zd.created_at);

    Ticket {
        id: zd.id,
        subject: zd.subject,
        description: zd.description,
        status,
        created_at: zd.created_at,
        updated_at,
        assignee_id: zd.assignee_id,
        group_id: zd.group_id,
        url: format!("{}/agent/tickets/{}", web_root, zd.id),
        team_name: None,
    }
}

pub fn map_user(zd: ZendeskUser) -> User {
    User {
        id: zd.id,
        name: zd.name,
        email: zd.email,
        group_ids: zd.default_group_id.into_iter().collect(),
    }
}

pub fn map_group(zd: ZendeskGroup) -> Group {
    Group {
        id: zd.id,
        name: zd.name,
        description: zd.description,
    }
}
