//! Core traits, types, and the query engine for ticketq.
//!
//! This crate provides the adapter contract every ticketing backend plugin
//! implements, the registry/factory pair that wires authenticated clients,
//! the secure configuration store, and the multi-status fan-out engine that
//! merges backend results deterministically.

pub mod adapter;
pub mod config;
pub mod error;
pub mod facade;
pub mod factory;
pub mod query;
pub mod registry;
pub mod teams;
pub mod types;
pub mod vault;

#[cfg(test)]
pub(crate) mod testutil;

pub use adapter::{Adapter, Auth, Client, ConfigField, TicketPage, TicketQuery};
pub use config::{AdapterConfig, ConfigStore, MainConfig};
pub use error::{Error, Result};
pub use facade::TicketQ;
pub use factory::AdapterFactory;
pub use query::{sort_tickets, QueryEngine};
pub use registry::AdapterRegistry;
pub use teams::TeamResolver;
pub use types::{Group, Secret, SortKey, Status, Ticket, TicketFilter, User};
pub use vault::{CredentialVault, MemoryVault};
