//! Command handlers: wiring between parsed arguments and the library
//! facade.

use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::{bail, Context};

use ticketq_core::{
    AdapterConfig, AdapterFactory, AdapterRegistry, ConfigStore, Secret, SortKey, Status, TicketQ,
    TicketFilter,
};
use ticketq_storage::KeychainVault;
use ticketq_zendesk::ZendeskAdapter;

use crate::output;

/// Wire the built-in adapters, config store, and system keychain together.
pub fn build_factory(config_path: Option<PathBuf>) -> anyhow::Result<AdapterFactory> {
    let mut registry = AdapterRegistry::new();
    registry.register(Arc::new(ZendeskAdapter::new()));

    let store = match config_path {
        Some(dir) => ConfigStore::with_dir(dir),
        None => ConfigStore::new().context("Failed to locate the configuration directory")?,
    };
    let vault = Arc::new(KeychainVault::new());

    Ok(AdapterFactory::new(Arc::new(registry), store, vault))
}

pub struct TicketsArgs {
    pub status: Option<String>,
    pub group: Option<String>,
    pub assignee_only: bool,
    pub sort_by: Option<String>,
    pub csv: Option<PathBuf>,
    pub adapter: Option<String>,
}

pub async fn tickets(factory: &AdapterFactory, args: TicketsArgs) -> anyhow::Result<()> {
    let filter = TicketFilter {
        statuses: parse_statuses(args.status.as_deref())?,
        groups: parse_groups(args.group.as_deref())?,
        assignee_only: args.assignee_only,
    };
    let sort_by = args
        .sort_by
        .as_deref()
        .map(SortKey::from_str)
        .transpose()?;

    let tq = TicketQ::from_factory(factory, args.adapter.as_deref(), None)?;
    let tickets = tq.get_tickets(&filter, sort_by).await?;

    match args.csv {
        Some(path) => {
            TicketQ::export_csv(&tickets, &path)?;
            println!("Wrote {} tickets to {}", tickets.len(), path.display());
        }
        None => {
            output::print_ticket_table(&tickets);
            println!("\n{} tickets ({})", tickets.len(), tq.display_name());
        }
    }
    Ok(())
}

pub fn configure(factory: &AdapterFactory, name: &str, pairs: &[String]) -> anyhow::Result<()> {
    let adapter = factory.registry().get(name)?;
    let schema = adapter.config_schema();

    if pairs.is_empty() {
        println!("Settings for {}:", adapter.display_name());
        for field in &schema {
            let marker = match (field.required, field.secret) {
                (true, true) => " (required, secret)",
                (true, false) => " (required)",
                (false, true) => " (secret)",
                (false, false) => "",
            };
            println!("  {}{} - {}", field.name, marker, field.description);
        }
        return Ok(());
    }

    // Start from the persisted config so single-key updates work.
    let mut config = factory
        .config_store()
        .load(name)?
        .unwrap_or_else(|| AdapterConfig::new(name));

    let mut secrets: Vec<(String, Secret)> = Vec::new();
    for pair in pairs {
        let (key, value) = pair
            .split_once('=')
            .with_context(|| format!("Invalid setting '{}', expected KEY=VALUE", pair))?;

        let Some(field) = schema.iter().find(|f| f.name == key) else {
            let known: Vec<&str> = schema.iter().map(|f| f.name).collect();
            bail!(
                "Unknown setting '{}' for adapter '{}'. Known settings: {}",
                key,
                name,
                known.join(", ")
            );
        };

        if field.secret {
            secrets.push((key.to_string(), Secret::new(value)));
        } else {
            config
                .settings
                .insert(key.to_string(), serde_json::Value::String(value.to_string()));
        }
    }

    adapter.validate_config(&config)?;
    let principal = adapter.principal(&config)?.to_string();

    factory.config_store().save(name, &config, &schema)?;
    for (key, secret) in &secrets {
        factory.vault().set(name, &principal, secret)?;
        println!("Stored secret '{}' in the system keychain", key);
    }

    if factory.is_configured(name) {
        println!("{} is configured for {}", adapter.display_name(), principal);
    } else {
        let missing: Vec<&str> = schema
            .iter()
            .filter(|f| {
                f.required
                    && if f.secret {
                        !factory.vault().contains(name, &principal)
                    } else {
                        config.get_str(f.name).is_none()
                    }
            })
            .map(|f| f.name)
            .collect();
        println!(
            "Saved. Still missing: {}. Run 'tq configure {} --set KEY=VALUE'",
            missing.join(", "),
            name
        );
    }
    Ok(())
}

pub fn adapters_list(factory: &AdapterFactory) -> anyhow::Result<()> {
    let default = factory.config_store().default_adapter()?;

    println!("{:<12} {:<16} {:<10} {}", "NAME", "DISPLAY", "VERSION", "STATE");
    for name in factory.registry().list() {
        let adapter = factory.registry().get(&name)?;
        let mut state = if factory.is_configured(&name) {
            "configured".to_string()
        } else {
            "not configured".to_string()
        };
        if default.as_deref() == Some(name.as_str()) {
            state.push_str(", default");
        }
        println!(
            "{:<12} {:<16} {:<10} {}",
            name,
            adapter.display_name(),
            adapter.version(),
            state
        );
    }
    Ok(())
}

pub async fn adapters_test(factory: &AdapterFactory, name: Option<&str>) -> anyhow::Result<()> {
    let tq = TicketQ::from_factory(factory, name, None)?;
    if tq.test_connection().await {
        let user = tq.current_user().await?;
        println!("{}: connected as {}", tq.display_name(), user.name);
        Ok(())
    } else {
        bail!("{}: connection failed", tq.display_name());
    }
}

pub fn adapters_set_default(factory: &AdapterFactory, name: &str) -> anyhow::Result<()> {
    factory.registry().get(name)?;
    factory.config_store().set_default_adapter(name)?;
    println!("Default adapter set to {}", name);
    Ok(())
}

pub fn adapters_remove(factory: &AdapterFactory, name: &str) -> anyhow::Result<()> {
    // Resolve the principal first so the vaulted secret can be dropped too.
    let principal = factory
        .config_store()
        .load(name)?
        .and_then(|config| {
            let adapter = factory.registry().get(name).ok()?;
            adapter.principal(&config).ok().map(str::to_string)
        });

    let removed = factory.config_store().delete(name)?;
    if let Some(principal) = principal {
        factory.vault().delete(name, &principal)?;
    }

    if removed {
        println!("Removed configuration for {}", name);
    } else {
        println!("No configuration found for {}", name);
    }
    Ok(())
}

fn parse_statuses(raw: Option<&str>) -> anyhow::Result<Vec<Status>> {
    let Some(raw) = raw else {
        return Ok(Vec::new());
    };
    raw.split(',')
        .filter(|s| !s.trim().is_empty())
        .map(|s| Status::from_str(s).map_err(Into::into))
        .collect()
}

fn parse_groups(raw: Option<&str>) -> anyhow::Result<Vec<u64>> {
    let Some(raw) = raw else {
        return Ok(Vec::new());
    };
    raw.split(',')
        .filter(|s| !s.trim().is_empty())
        .map(|s| {
            s.trim()
                .parse::<u64>()
                .with_context(|| format!("Invalid group id '{}'", s.trim()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_statuses() {
        assert_eq!(
            parse_statuses(Some("open, pending")).unwrap(),
            vec![Status::Open, Status::Pending]
        );
        assert!(parse_statuses(Some("escalated")).is_err());
        assert!(parse_statuses(None).unwrap().is_empty());
    }

    #[test]
    fn test_parse_groups() {
        assert_eq!(parse_groups(Some("1, 2,3")).unwrap(), vec![1, 2, 3]);
        assert!(parse_groups(Some("abc")).is_err());
        assert!(parse_groups(None).unwrap().is_empty());
    }
}
