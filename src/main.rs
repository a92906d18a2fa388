// src/main.rs

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use entitled::Config;

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load_or_default(&cli.config)?;

    // RUST_LOG wins over the configured level
    let level = config.log_level()?;
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level)),
        )
        .init();

    match cli.command {
        Commands::Repos => commands::cmd_repos(&config),
        Commands::Releases { tags } => commands::cmd_releases(&config, &tags),
        Commands::Products => commands::cmd_products(&config),
    }
}
