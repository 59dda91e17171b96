//! Common types used across adapters.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Canonical ticket status, independent of backend-native vocabulary.
///
/// `Unknown` is not a filterable value: it marks tickets whose native status
/// had no canonical mapping, which are still included in results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    New,
    Open,
    Pending,
    Hold,
    Solved,
    Closed,
    Unknown,
}

impl Status {
    /// The six canonical statuses, in display order.
    pub const CANONICAL: [Status; 6] = [
        Status::New,
        Status::Open,
        Status::Pending,
        Status::Hold,
        Status::Solved,
        Status::Closed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::New => "new",
            Status::Open => "open",
            Status::Pending => "pending",
            Status::Hold => "hold",
            Status::Solved => "solved",
            Status::Closed => "closed",
            Status::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "new" => Ok(Status::New),
            "open" => Ok(Status::Open),
            "pending" => Ok(Status::Pending),
            "hold" => Ok(Status::Hold),
            "solved" => Ok(Status::Solved),
            "closed" => Ok(Status::Closed),
            other => Err(Error::Validation(format!(
                "Invalid status '{}'. Valid statuses: new, open, pending, hold, solved, closed",
                other
            ))),
        }
    }
}

/// A ticket from a ticketing backend.
///
/// Immutable once constructed, apart from the `team_name` annotation filled
/// in by the team resolver. Invariant: `updated_at >= created_at` (adapters
/// clamp at mapping time). Derived attributes are computed from a supplied
/// clock, never stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ticket {
    pub id: u64,
    pub subject: String,
    pub description: String,
    pub status: Status,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub assignee_id: Option<u64>,
    pub group_id: Option<u64>,
    /// Canonical web URL of the ticket
    pub url: String,
    /// Human-readable team name, resolved after the query
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team_name: Option<String>,
}

impl Ticket {
    /// Description truncated for table display.
    pub fn short_description(&self) -> String {
        const MAX: usize = 50;
        if self.description.chars().count() > MAX {
            let truncated: String = self.description.chars().take(MAX).collect();
            format!("{}...", truncated)
        } else {
            self.description.clone()
        }
    }

    /// Whole days elapsed since creation, relative to `now`.
    pub fn days_since_created(&self, now: DateTime<Utc>) -> i64 {
        (now - self.created_at).num_days()
    }

    /// Whole days elapsed since the last update, relative to `now`.
    pub fn days_since_updated(&self, now: DateTime<Utc>) -> i64 {
        (now - self.updated_at).num_days()
    }
}

/// A user from a ticketing backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub name: String,
    pub email: Option<String>,
    /// Groups the user belongs to
    #[serde(default)]
    pub group_ids: Vec<u64>,
}

/// A group (team) from a ticketing backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Group {
    pub id: u64,
    pub name: String,
    pub description: Option<String>,
}

/// Opaque credential material.
///
/// Stored only in the credential vault, never in config files. `Debug`
/// redacts the value so secrets cannot leak through logs.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(***)")
    }
}

/// Sort key for ticket listings.
///
/// Id sorts ascending, timestamps newest first, and day-ages largest
/// first (most stale at the top).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Id,
    Status,
    Team,
    Description,
    CreatedAt,
    DaysCreated,
    UpdatedAt,
    DaysUpdated,
}

impl FromStr for SortKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "id" => Ok(SortKey::Id),
            "status" => Ok(SortKey::Status),
            "team" => Ok(SortKey::Team),
            "description" => Ok(SortKey::Description),
            "created" | "created_at" => Ok(SortKey::CreatedAt),
            "days_created" => Ok(SortKey::DaysCreated),
            "updated" | "updated_at" => Ok(SortKey::UpdatedAt),
            "days_updated" => Ok(SortKey::DaysUpdated),
            other => Err(Error::Validation(format!(
                "Invalid sort key '{}'. Valid keys: id, status, team, description, \
                 created_at, days_created, updated_at, days_updated",
                other
            ))),
        }
    }
}

/// Logical ticket filter, as supplied by the caller.
///
/// The order of `statuses` and `groups` is significant: it fixes the
/// fan-out call order and therefore the deterministic merge order.
#[derive(Debug, Clone, Default)]
pub struct TicketFilter {
    pub statuses: Vec<Status>,
    pub groups: Vec<u64>,
    pub assignee_only: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ticket(description: &str) -> Ticket {
        Ticket {
            id: 1,
            subject: "subject".to_string(),
            description: description.to_string(),
            status: Status::Open,
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            updated_at: Utc.with_ymd_and_hms(2024, 1, 3, 0, 0, 0).unwrap(),
            assignee_id: None,
            group_id: None,
            url: String::new(),
            team_name: None,
        }
    }

    #[test]
    fn test_status_from_str() {
        assert_eq!("open".parse::<Status>().unwrap(), Status::Open);
        assert_eq!(" Pending ".parse::<Status>().unwrap(), Status::Pending);
        assert!(matches!(
            "invalid".parse::<Status>(),
            Err(Error::Validation(_))
        ));
        // "unknown" is not a filterable status
        assert!("unknown".parse::<Status>().is_err());
    }

    #[test]
    fn test_status_serde() {
        let json = serde_json::to_string(&Status::Open).unwrap();
        assert_eq!(json, "\"open\"");
        let status: Status = serde_json::from_str("\"solved\"").unwrap();
        assert_eq!(status, Status::Solved);
    }

    #[test]
    fn test_short_description_truncates() {
        let long = "x".repeat(80);
        let t = ticket(&long);
        assert_eq!(t.short_description().chars().count(), 53);
        assert!(t.short_description().ends_with("..."));

        let t = ticket("short");
        assert_eq!(t.short_description(), "short");
    }

    #[test]
    fn test_day_ages_use_supplied_clock() {
        let t = ticket("d");
        let now = Utc.with_ymd_and_hms(2024, 1, 11, 0, 0, 0).unwrap();
        assert_eq!(t.days_since_created(now), 10);
        assert_eq!(t.days_since_updated(now), 8);
    }

    #[test]
    fn test_sort_key_from_str() {
        assert_eq!("created".parse::<SortKey>().unwrap(), SortKey::CreatedAt);
        assert_eq!(
            "days_updated".parse::<SortKey>().unwrap(),
            SortKey::DaysUpdated
        );
        assert!("bogus".parse::<SortKey>().is_err());
    }

    #[test]
    fn test_secret_debug_redacts() {
        let secret = Secret::new("super-secret-token");
        let debug = format!("{:?}", secret);
        assert!(!debug.contains("super-secret-token"));
        assert_eq!(secret.expose(), "super-secret-token");
    }
}
