//! TicketQ CLI - unified ticket queue queries across helpdesk backends.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod output;

#[derive(Parser)]
#[command(name = "tq")]
#[command(author, version, about = "TicketQ - query ticket queues from the terminal", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use a custom configuration directory
    #[arg(long, global = true, value_name = "DIR")]
    config_path: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List tickets from the configured backend
    Tickets {
        /// Statuses to include, comma separated (e.g. open,pending)
        #[arg(short, long)]
        status: Option<String>,

        /// Group ids to restrict to, comma separated
        #[arg(short, long)]
        group: Option<String>,

        /// Only tickets assigned to the authenticated user
        #[arg(long)]
        assignee_only: bool,

        /// Sort key: id, status, team, description, created_at,
        /// days_created, updated_at, days_updated
        #[arg(long)]
        sort_by: Option<String>,

        /// Write full results to a CSV file instead of the table
        #[arg(long)]
        csv: Option<PathBuf>,

        /// Adapter to query (auto-detected when omitted)
        #[arg(short, long)]
        adapter: Option<String>,
    },

    /// Configure an adapter
    Configure {
        /// Adapter name (e.g. zendesk)
        adapter: String,

        /// Setting as KEY=VALUE; repeatable. Secret fields go to the
        /// system keychain, everything else to the config file.
        #[arg(long = "set", value_name = "KEY=VALUE")]
        set: Vec<String>,
    },

    /// Inspect and manage adapters
    Adapters {
        #[command(subcommand)]
        command: AdapterCommands,
    },
}

#[derive(Subcommand)]
enum AdapterCommands {
    /// List registered adapters and their configuration state
    List,

    /// Probe backend connectivity with the stored credentials
    Test {
        /// Adapter to test (auto-detected when omitted)
        name: Option<String>,
    },

    /// Set the adapter used when none is named
    SetDefault { name: String },

    /// Remove an adapter's configuration and stored credential
    Remove { name: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let factory = commands::build_factory(cli.config_path)?;

    match cli.command {
        Some(Commands::Tickets {
            status,
            group,
            assignee_only,
            sort_by,
            csv,
            adapter,
        }) => {
            commands::tickets(
                &factory,
                commands::TicketsArgs {
                    status,
                    group,
                    assignee_only,
                    sort_by,
                    csv,
                    adapter,
                },
            )
            .await
        }
        Some(Commands::Configure { adapter, set }) => commands::configure(&factory, &adapter, &set),
        Some(Commands::Adapters { command }) => match command {
            AdapterCommands::List => commands::adapters_list(&factory),
            AdapterCommands::Test { name } => {
                commands::adapters_test(&factory, name.as_deref()).await
            }
            AdapterCommands::SetDefault { name } => commands::adapters_set_default(&factory, &name),
            AdapterCommands::Remove { name } => commands::adapters_remove(&factory, &name),
        },
        None => {
            println!("TicketQ - query ticket queues from the terminal");
            println!("Run with --help for usage information");
            Ok(())
        }
    }
}
