// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 apiflow contributors

//! apiflow - Visual API Pipeline Builder
//!
//! Build, wire and simulate node-graph API pipelines.

use clap::Parser;
use miette::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use apiflow::cli::{Cli, Commands};
use apiflow::flow::Position;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "apiflow=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let cli = Cli::parse();

    // Change to specified directory if provided
    if let Some(ref dir) = cli.directory {
        std::env::set_current_dir(dir).map_err(|e| {
            miette::miette!("Failed to change to directory '{}': {}", dir.display(), e)
        })?;
    }

    // Dispatch to command handlers
    match cli.command {
        Commands::Init { name, flow, force } => {
            apiflow::cli::init::run(name, flow, force, cli.verbose).await
        }
        Commands::Run { flow, format } => apiflow::cli::run::run(flow, format, cli.verbose).await,
        Commands::Validate { flow } => apiflow::cli::validate::run(flow, cli.verbose).await,
        Commands::Graph { flow, format } => {
            apiflow::cli::graph::run(flow, format, cli.verbose).await
        }
        Commands::Add {
            kind,
            flow,
            label,
            set,
            x,
            y,
        } => apiflow::cli::edit::add(flow, kind, label, set, Position::new(x, y), cli.verbose).await,
        Commands::Connect { from, to, flow } => {
            apiflow::cli::edit::connect(flow, from, to, cli.verbose).await
        }
        Commands::Configure {
            node,
            entries,
            flow,
        } => apiflow::cli::edit::configure(flow, node, entries, cli.verbose).await,
        Commands::Watch { flow, debounce } => {
            apiflow::cli::watch::run(flow, debounce, cli.verbose).await
        }
    }
}
