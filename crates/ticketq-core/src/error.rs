//! Error types for ticketq.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for ticketq operations.
///
/// Every failure the core can produce is a variant here; nothing in the
/// library panics or terminates the process. Secret values never appear in
/// error messages.
#[derive(Error, Debug)]
pub enum Error {
    /// Credentials were rejected by the backend
    #[error("Authentication failed for '{adapter}': {message}")]
    Auth { adapter: String, message: String },

    /// Backend rate limit hit; carries the Retry-After hint in seconds
    #[error("Rate limited{}", retry_after.map(|s| format!(", retry after {}s", s)).unwrap_or_default())]
    RateLimited { retry_after: Option<u64> },

    /// Connection failure or timeout
    #[error("Network error: {0}")]
    Network(String),

    /// Backend returned data the adapter could not parse
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// Authenticated but not allowed
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// Missing or invalid configuration
    #[error("Configuration error: {message}{}", path.as_ref().map(|p| format!(" ({})", p.display())).unwrap_or_default())]
    Config {
        message: String,
        path: Option<PathBuf>,
    },

    /// A secret-marked field was present in a plain config payload
    #[error("Field '{field}' of adapter '{adapter}' is a secret and cannot be stored in a config file")]
    SchemaViolation { adapter: String, field: String },

    /// Requested adapter is not registered
    #[error("Adapter '{name}' not found. Available: {}", if available.is_empty() { "none".to_string() } else { available.join(", ") })]
    AdapterNotFound {
        name: String,
        available: Vec<String>,
    },

    /// Auto-detection found no configured adapter
    #[error("No adapter is configured. Run 'tq configure <adapter>' first. Available: {}", if available.is_empty() { "none".to_string() } else { available.join(", ") })]
    NoConfiguration { available: Vec<String> },

    /// Auto-detection found more than one configured adapter
    #[error("Multiple adapters are configured ({}). Pass --adapter or set a default", candidates.join(", "))]
    AmbiguousAdapter { candidates: Vec<String> },

    /// A backend status with no canonical mapping
    #[error("Adapter '{adapter}' returned unknown status '{status}'")]
    UnknownStatus { adapter: String, status: String },

    /// Caller supplied a value outside the recognized enumeration
    #[error("Validation error: {0}")]
    Validation(String),

    /// Credential vault failure
    #[error("Credential vault error: {0}")]
    Vault(String),
}

impl Error {
    /// Map an HTTP status code to the matching error kind.
    pub fn from_status(adapter: &str, status: u16, message: String) -> Self {
        match status {
            401 => Error::Auth {
                adapter: adapter.to_string(),
                message,
            },
            403 => Error::PermissionDenied(message),
            429 => Error::RateLimited { retry_after: None },
            _ => Error::Network(format!("HTTP {}: {}", status, message)),
        }
    }
}

/// Result type alias for ticketq operations.
pub type Result<T> = std::result::Result<T, Error>;
