//! `cinevaultctl`: inspect the CineVault session gate from a terminal.
#![allow(missing_docs)]

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use cinevault_config::ConfigLoader;
use cinevault_model::KindFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod cli;

use cli::simulate::Scenario;

#[derive(Parser)]
#[command(name = "cinevaultctl", about = "CineVault session gate inspector")]
struct Cli {
    /// Config file (TOML or JSON); defaults to CINEVAULT_CONFIG_PATH or ./cinevault.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// dotenv file loaded before reading CINEVAULT_* overrides
    #[arg(long, global = true)]
    env_file: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the redirect decision for every combination of gate inputs
    Decide {
        #[arg(long, value_enum, default_value = "table")]
        format: OutputFormat,
    },
    /// Boot a simulated client and walk through a gating scenario
    Simulate {
        #[arg(long, value_enum, default_value = "all")]
        scenario: Scenario,
        /// Outcomes the simulated sensor returns, in order (success, denied, cancelled, unavailable)
        #[arg(long, value_delimiter = ',')]
        prompts: Vec<cli::simulate::PromptArg>,
        /// Simulate a browser: capture protection falls back to advisory hooks
        #[arg(long)]
        web: bool,
    },
    /// Validate configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Browse the built-in catalog
    Catalog {
        /// Case-insensitive title search
        query: Option<String>,
        #[arg(long, value_enum, default_value = "all")]
        kind: KindArg,
        #[arg(long)]
        genre: Option<String>,
        #[arg(long)]
        year: Option<u16>,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Load the layered configuration and report the effective values
    Check {
        #[arg(long, value_enum, default_value = "table")]
        format: OutputFormat,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum KindArg {
    All,
    Movie,
    Series,
}

impl From<KindArg> for KindFilter {
    fn from(val: KindArg) -> Self {
        match val {
            KindArg::All => KindFilter::All,
            KindArg::Movie => KindFilter::Movie,
            KindArg::Series => KindFilter::Series,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let mut loader = ConfigLoader::new();
    if let Some(path) = &cli.config {
        loader = loader.with_config_path(path);
    }
    if let Some(path) = &cli.env_file {
        loader = loader.with_env_file(path);
    }

    match cli.command {
        Command::Decide { format } => {
            cli::decide::run(matches!(format, OutputFormat::Json))
        }
        Command::Simulate {
            scenario,
            prompts,
            web,
        } => {
            let load = loader.load()?;
            cli::simulate::run(load.config, scenario, &prompts, web).await
        }
        Command::Config {
            action: ConfigAction::Check { format },
        } => cli::config::check(&loader, matches!(format, OutputFormat::Json)),
        Command::Catalog {
            query,
            kind,
            genre,
            year,
        } => cli::catalog::run(query.as_deref(), kind.into(), genre, year),
    }
}
