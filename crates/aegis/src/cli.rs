//! Command Line Interface
//!
//! | Command | Description |
//! |---------|-------------|
//! | `aegis check-config` | Load and validate configuration, print it as JSON |
//! | `aegis health` | Build the stack, probe every provider once, print the report |
//! | `aegis login` | Authenticate once against the configured providers |
//!
//! Every command accepts `--config <path>`; without it the default locations
//! and `AEGIS_` environment variables apply.

use crate::bootstrap::{init_app, load_config};
use aegis_domain::value_objects::{AuthCredentials, SecurityContext};
use aegis_infrastructure::logging::init_logging;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use tracing::warn;

/// Command line interface of the `aegis` binary
#[derive(Parser, Debug)]
#[command(name = "aegis")]
#[command(about = "Aegis - Multi-provider authentication with failover")]
#[command(version)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Load and validate configuration, then print it
    CheckConfig,
    /// Probe every configured provider once and print the health report
    Health,
    /// Authenticate with a username and password
    Login {
        /// Username or email
        #[arg(short, long)]
        username: String,
        /// Password
        #[arg(short, long)]
        password: String,
    },
}

/// Context the CLI presents itself with
pub fn cli_context() -> SecurityContext {
    let agent = concat!("aegis-cli/", env!("CARGO_PKG_VERSION"));
    SecurityContext::new()
        .with_ip("127.0.0.1")
        .with_user_agent(agent)
        .with_header("user-agent", agent)
}

/// Execute `cli`
pub async fn run(cli: Cli) -> Result<()> {
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Command::CheckConfig => print_json(&config),
        Command::Health => {
            init_logging(&config.logging).context("Failed to initialize logging")?;
            let stack = init_app(&config).await?;
            if let Err(e) = stack.orchestrator.initialize().await {
                warn!(code = %e.code, "Initialization failed, reporting health anyway");
            }
            stack
                .orchestrator
                .provider_manager()
                .perform_health_checks()
                .await;
            let report = stack.orchestrator.health_report();
            stack.orchestrator.shutdown().await;
            print_json(&report)
        }
        Command::Login { username, password } => {
            init_logging(&config.logging).context("Failed to initialize logging")?;
            let stack = init_app(&config).await?;
            stack
                .orchestrator
                .initialize()
                .await
                .context("Authentication service failed to start")?;

            let credentials = AuthCredentials::password(username, password);
            let outcome = stack
                .orchestrator
                .authenticate(&credentials, Some(&cli_context()))
                .await;
            stack.orchestrator.shutdown().await;

            let session = outcome.context("Authentication failed")?;
            print_json(&session)
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{json}");
    Ok(())
}
