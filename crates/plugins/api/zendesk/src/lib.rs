//! Zendesk adapter for ticketq.
//!
//! Implements the ticketq adapter contract against the Zendesk REST API:
//! ticket search with cursor pagination, current-user lookup, and group
//! listing, authenticated with an email/API-token basic-auth header.

mod adapter;
mod auth;
mod client;
mod types;

pub use adapter::ZendeskAdapter;
pub use auth::ZendeskAuth;
pub use client::ZendeskClient;
