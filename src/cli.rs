// src/cli.rs
//! CLI definitions for entitled
//!
//! The actual command implementations are in the `commands` module.

use clap::{Parser, Subcommand};
use entitled::config::DEFAULT_CONFIG_PATH;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "entitled")]
#[command(author = "Entitled Contributors")]
#[command(version)]
#[command(about = "Entitlement certificate content and release discovery", long_about = None)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Regenerate the repository file from installed entitlements
    Repos,

    /// List release versions available for the entitled content
    Releases {
        /// Tags provided by installed products (repeatable)
        #[arg(short, long = "tag")]
        tags: Vec<String>,
    },

    /// Show products and content granted by installed entitlements
    Products,
}
