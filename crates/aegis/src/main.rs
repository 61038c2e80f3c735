//! Aegis - Entry Point
//!
//! Binary entry point of the `aegis` command. Lives in the facade crate so
//! the binary and the library share one name.

use aegis::cli::{Cli, run};
use clap::Parser;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    run(Cli::parse()).await
}
