//! # ChurnWise CLI (`churnwise`)
//!
//! Starts the HTTP server and runs the same operations from the command
//! line for quick inspection.
//!
//! ## Usage
//!
//! ```bash
//! churnwise --config ./config/churnwise.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `churnwise serve` | Start the HTTP server |
//! | `churnwise sources` | Show the load status of every input file |
//! | `churnwise chat "<query>"` | Answer a chat query |
//! | `churnwise profile <id>` | Print a customer record |
//! | `churnwise dashboard` | Print aggregate statistics |
//! | `churnwise predict --feature tenure=12 ...` | Predict churn |

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use churnwise::{chat, config, dashboard, logging, predict, profile, server, sources};

/// ChurnWise — customer churn insights over a small HTTP API.
#[derive(Parser)]
#[command(
    name = "churnwise",
    about = "ChurnWise — churn predictions, customer lookups, dashboard statistics, and chat retrieval",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Relative data paths inside the file resolve against its directory.
    #[arg(long, global = true, default_value = "./config/churnwise.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server.
    ///
    /// Loads the dataset, model, and chat corpus, then binds to
    /// `[server].bind`.
    Serve,

    /// Show whether each configured input loads.
    ///
    /// Exits non-zero when the customer dataset cannot be loaded.
    Sources,

    /// Answer a chat query with the best-matching document.
    Chat {
        /// The query text.
        query: String,
    },

    /// Print the first customer record with the given id.
    Profile {
        /// Customer id (matched against `[data].id_column`).
        customer_id: String,
    },

    /// Print aggregate dashboard statistics.
    Dashboard,

    /// Predict churn for a set of features.
    ///
    /// Features the model expects but that are not given are filled with 0.
    Predict {
        /// Feature value as `name=value`; repeatable.
        #[arg(long = "feature", value_parser = predict::parse_feature)]
        features: Vec<(String, f64)>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init_tracing();
    let cli = Cli::parse();

    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
        Commands::Sources => {
            sources::list_sources(&cfg)?;
        }
        Commands::Chat { query } => {
            chat::run_chat(&cfg, &query)?;
        }
        Commands::Profile { customer_id } => {
            profile::run_profile(&cfg, &customer_id)?;
        }
        Commands::Dashboard => {
            dashboard::run_dashboard(&cfg)?;
        }
        Commands::Predict { features } => {
            predict::run_predict(&cfg, features)?;
        }
    }

    Ok(())
}
