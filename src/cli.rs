use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Cross-currency routing engine — quotes, reserves, and drives execution
/// of multi-hop fiat/stablecoin/on-chain transfers.
#[derive(Parser)]
#[command(name = "crossflow-router", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP API and background prefetch orchestrator
    Serve {
        #[arg(long, default_value = "0.0.0.0")]
        host: String,

        #[arg(long, default_value = "8080")]
        port: u16,

        /// Optional JSON config file overlaying the built-in defaults
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Resolve a single route and print its scored quote to stdout, without
    /// starting the HTTP server or persisting anything
    Quote {
        #[arg(long)]
        amount_in: f64,

        #[arg(long)]
        from_token: String,

        #[arg(long)]
        to_token: String,

        /// Comma-separated intermediate tokens to try, beyond the defaults
        #[arg(long)]
        intermediates: Option<String>,

        #[arg(long)]
        config: Option<PathBuf>,
    },
}
