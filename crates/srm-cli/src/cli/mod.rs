//! CLI for the SRM spreadsheet record manager.

mod commands;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use srm_core::config::{self, SrmConfig};
use srm_core::connectivity::{AlwaysOnline, ConnectivitySource, ConnectivityState};
use srm_core::fetcher::ResilientFetcher;
use url::Url;

use commands::{
    run_add, run_completions, run_delete, run_get, run_headers, run_list, run_update,
};

/// Top-level CLI for the SRM spreadsheet record manager.
#[derive(Debug, Parser)]
#[command(name = "srm")]
#[command(about = "SRM: resilient client for spreadsheet-backed CRUD", long_about = None)]
pub struct Cli {
    /// Endpoint URL of the deployed web app (overrides config.toml).
    #[arg(long, global = true, value_name = "URL")]
    pub endpoint: Option<String>,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Fetch and render all records, retrying transient failures.
    List,

    /// Show the sheet's column headers.
    Headers,

    /// Fetch a single record by id.
    Get {
        /// Record identifier.
        id: String,
    },

    /// Add a record; an id is generated when none is given.
    Add {
        /// Record id; a UUID is generated when omitted.
        #[arg(long)]
        id: Option<String>,
        /// Field as NAME=VALUE (repeatable).
        #[arg(short = 'f', long = "field", value_parser = parse_field, value_name = "NAME=VALUE")]
        fields: Vec<(String, String)>,
    },

    /// Update a record by id.
    Update {
        /// Record identifier.
        id: String,
        /// Field as NAME=VALUE (repeatable).
        #[arg(short = 'f', long = "field", value_parser = parse_field, value_name = "NAME=VALUE")]
        fields: Vec<(String, String)>,
    },

    /// Delete a record by id.
    Delete {
        /// Record identifier.
        id: String,
    },

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: clap_complete::Shell,
    },
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);
        let endpoint_flag = cli.endpoint.clone();
        let fetcher = || build_fetcher(endpoint_flag.as_deref(), &cfg);

        match cli.command {
            CliCommand::List => run_list(&fetcher()?, &cfg).await?,
            CliCommand::Headers => run_headers(&fetcher()?).await?,
            CliCommand::Get { id } => run_get(&fetcher()?, &id).await?,
            CliCommand::Add { id, fields } => run_add(&fetcher()?, id, fields).await?,
            CliCommand::Update { id, fields } => run_update(&fetcher()?, &id, fields).await?,
            CliCommand::Delete { id } => run_delete(&fetcher()?, &id).await?,
            CliCommand::Completions { shell } => run_completions(shell)?,
        }

        Ok(())
    }
}

/// Resolve the endpoint (flag wins over config) and wire up the fetcher.
fn build_fetcher(flag: Option<&str>, cfg: &SrmConfig) -> Result<ResilientFetcher> {
    let raw = flag
        .map(str::to_string)
        .or_else(|| cfg.endpoint_url.clone())
        .context("no endpoint configured; pass --endpoint or set endpoint_url in config.toml")?;
    let endpoint = Url::parse(&raw).with_context(|| format!("invalid endpoint URL: {raw}"))?;

    let connectivity = ConnectivityState::new();
    AlwaysOnline
        .subscribe(connectivity.clone())
        .context("install connectivity source")?;

    Ok(ResilientFetcher::from_config(cfg, endpoint, connectivity))
}

/// Parse a NAME=VALUE field argument.
fn parse_field(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((name, value)) if !name.trim().is_empty() => {
            Ok((name.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected NAME=VALUE, got '{s}'")),
    }
}
