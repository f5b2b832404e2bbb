// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 apiflow contributors

//! CLI command definitions and handlers
//!
//! Defines the command-line interface for apiflow.

pub mod edit;
pub mod graph;
pub mod init;
pub mod run;
pub mod validate;
pub mod watch;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use miette::Result;
use std::path::{Path, PathBuf};

use crate::errors::{FlowError, FlowResult};
use crate::flow::{Flow, NodeKind};

/// Default flow file
pub const DEFAULT_FLOW_FILE: &str = ".apiflow.yaml";

/// Visual API pipeline builder
///
/// Edit, validate and simulate node-graph API pipelines.
#[derive(Parser, Debug)]
#[clap(
    name = "apiflow",
    version,
    about = "Build and simulate node-graph API pipelines",
    long_about = None,
    after_help = "Examples:\n\
        apiflow init                         Write a sample flow\n\
        apiflow add auth                     Add an authentication node\n\
        apiflow connect node-1 node-2        Connect two nodes\n\
        apiflow run                          Simulate the flow\n\
        apiflow watch                        Re-simulate on every change\n\n\
        See 'apiflow <command> --help' for more information on a specific command."
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[clap(short, long, global = true)]
    pub verbose: bool,

    /// Change to directory before executing
    #[clap(short = 'C', long, global = true, value_name = "DIR")]
    pub directory: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write a sample flow file
    Init {
        /// Flow name (defaults to current directory name)
        name: Option<String>,

        /// Flow file to create
        #[clap(short, long, default_value = DEFAULT_FLOW_FILE)]
        flow: PathBuf,

        /// Overwrite an existing flow file
        #[clap(long)]
        force: bool,
    },

    /// Simulate the flow and show each node's result
    Run {
        /// Flow file
        #[clap(short, long, default_value = DEFAULT_FLOW_FILE)]
        flow: PathBuf,

        /// Output format
        #[clap(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Validate the flow file
    Validate {
        /// Flow file to validate
        #[clap(default_value = DEFAULT_FLOW_FILE)]
        flow: PathBuf,
    },

    /// Show the flow as a graph
    Graph {
        /// Flow file
        #[clap(default_value = DEFAULT_FLOW_FILE)]
        flow: PathBuf,

        /// Output format
        #[clap(long, value_enum, default_value_t = GraphFormat::Text)]
        format: GraphFormat,
    },

    /// Add a node (auth, transformer, conditional, endpoint)
    Add {
        /// Node type
        kind: NodeKind,

        /// Flow file
        #[clap(short, long, default_value = DEFAULT_FLOW_FILE)]
        flow: PathBuf,

        /// Display label (defaults to the type's label)
        #[clap(short, long)]
        label: Option<String>,

        /// Configuration entry, repeatable
        #[clap(short, long = "set", value_name = "KEY=VALUE")]
        set: Vec<String>,

        /// Canvas x position
        #[clap(long, default_value = "0")]
        x: f64,

        /// Canvas y position
        #[clap(long, default_value = "0")]
        y: f64,
    },

    /// Connect two nodes; cycles and duplicates are declined
    Connect {
        /// Source node id
        from: String,

        /// Destination node id
        to: String,

        /// Flow file
        #[clap(short, long, default_value = DEFAULT_FLOW_FILE)]
        flow: PathBuf,
    },

    /// Change node configuration
    Configure {
        /// Node id
        node: String,

        /// Configuration entries
        #[clap(required = true, value_name = "KEY=VALUE")]
        entries: Vec<String>,

        /// Flow file
        #[clap(short, long, default_value = DEFAULT_FLOW_FILE)]
        flow: PathBuf,
    },

    /// Watch mode - re-simulate when the flow file changes
    Watch {
        /// Flow file
        #[clap(short, long, default_value = DEFAULT_FLOW_FILE)]
        flow: PathBuf,

        /// Debounce delay in milliseconds
        #[clap(long, default_value = "300")]
        debounce: u64,
    },
}

/// Output format for the run command
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Graph output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum GraphFormat {
    Text,
    Dot,
    Mermaid,
}

/// Load a flow file, printing recovery steps when that fails
pub fn load_flow(path: &Path) -> Result<Flow> {
    Flow::from_file(path).map_err(|e| {
        if let Some(suggestion) = e.recovery() {
            eprintln!("{}", suggestion.to_string().dimmed());
        }
        e.into()
    })
}

/// Comma-separated names of the node kinds with simulation rules
pub fn known_kinds() -> String {
    NodeKind::KNOWN
        .iter()
        .map(NodeKind::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Split a `key=value` argument. The value may be empty.
pub fn parse_assignment(input: &str) -> FlowResult<(String, String)> {
    match input.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(FlowError::InvalidAssignment {
            input: input.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_assignment() {
        assert_eq!(
            parse_assignment("token=abc").unwrap(),
            ("token".to_string(), "abc".to_string())
        );
        assert_eq!(
            parse_assignment("token=").unwrap(),
            ("token".to_string(), String::new())
        );
        assert_eq!(
            parse_assignment("url=https://x.dev/?a=b").unwrap().1,
            "https://x.dev/?a=b"
        );
        assert!(parse_assignment("token").is_err());
        assert!(parse_assignment("=abc").is_err());
    }

    #[test]
    fn test_known_kinds() {
        assert_eq!(known_kinds(), "auth, transformer, conditional, endpoint");
    }

    #[test]
    fn test_cli_parses_add() {
        let cli = Cli::try_parse_from([
            "apiflow", "add", "conditional", "--set", "value=Alice", "--label", "Gate",
        ])
        .unwrap();

        match cli.command {
            Commands::Add {
                kind, set, label, ..
            } => {
                assert_eq!(kind, NodeKind::Conditional);
                assert_eq!(set, vec!["value=Alice".to_string()]);
                assert_eq!(label.as_deref(), Some("Gate"));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_cli_rejects_unknown_graph_format() {
        assert!(Cli::try_parse_from(["apiflow", "graph", "--format", "png"]).is_err());
    }
}
