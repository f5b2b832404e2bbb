// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 apiflow contributors

//! Error types
//!
//! Pipeline "failures" during a simulation (missing token, unmet condition)
//! are data, not errors. `FlowError` covers the operational side: loading
//! and saving flow files, referring to nodes or versions that don't exist,
//! and flows that were written with a cycle in them.

mod recovery;

pub use recovery::RecoverySuggestion;

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for apiflow operations
pub type FlowResult<T> = Result<T, FlowError>;

/// Main error type for apiflow
#[derive(Error, Debug, Diagnostic)]
pub enum FlowError {
    // ─────────────────────────────────────────────────────────────────────────
    // Flow Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("Flow file not found: {path}")]
    #[diagnostic(
        code(apiflow::flow_not_found),
        help("Create a flow with 'apiflow init' or write .apiflow.yaml manually")
    )]
    FlowFileNotFound { path: PathBuf },

    #[error("Invalid flow: {reason}")]
    #[diagnostic(code(apiflow::invalid_flow))]
    InvalidFlow {
        reason: String,
        #[help]
        help: Option<String>,
    },

    #[error("Node '{node}' not found in flow")]
    #[diagnostic(
        code(apiflow::node_not_found),
        help("Run 'apiflow graph' to list the node ids of this flow")
    )]
    NodeNotFound { node: String },

    #[error("Version '{version}' not found in history")]
    #[diagnostic(code(apiflow::version_not_found))]
    VersionNotFound { version: String },

    #[error("Circular connection detected")]
    #[diagnostic(
        code(apiflow::circular_connection),
        help("Review the connections between these nodes to remove the cycle")
    )]
    CircularConnection { nodes: Vec<String> },

    #[error("Invalid assignment '{input}': expected key=value")]
    #[diagnostic(code(apiflow::invalid_assignment))]
    InvalidAssignment { input: String },

    // ─────────────────────────────────────────────────────────────────────────
    // File Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("Failed to read file '{path}': {error}")]
    #[diagnostic(code(apiflow::file_read_error))]
    FileReadError { path: PathBuf, error: String },

    #[error("Failed to write file '{path}': {error}")]
    #[diagnostic(code(apiflow::file_write_error))]
    FileWriteError { path: PathBuf, error: String },

    // ─────────────────────────────────────────────────────────────────────────
    // IO/Serialization Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("YAML parsing error: {message}")]
    #[diagnostic(code(apiflow::yaml_error))]
    Yaml { message: String },

    #[error("JSON parsing error: {message}")]
    #[diagnostic(code(apiflow::json_error))]
    Json { message: String },

    #[error("TOML parsing error: {message}")]
    #[diagnostic(code(apiflow::toml_error))]
    TomlDe { message: String },

    #[error("TOML serialization error: {message}")]
    #[diagnostic(code(apiflow::toml_error))]
    TomlSer { message: String },
}

impl From<serde_yaml::Error> for FlowError {
    fn from(e: serde_yaml::Error) -> Self {
        Self::Yaml { message: e.to_string() }
    }
}

impl From<serde_json::Error> for FlowError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json { message: e.to_string() }
    }
}

impl From<toml::de::Error> for FlowError {
    fn from(e: toml::de::Error) -> Self {
        Self::TomlDe { message: e.to_string() }
    }
}

impl From<toml::ser::Error> for FlowError {
    fn from(e: toml::ser::Error) -> Self {
        Self::TomlSer { message: e.to_string() }
    }
}

impl FlowError {
    /// Create a node-not-found error
    pub fn node_not_found(node: &str) -> Self {
        Self::NodeNotFound {
            node: node.to_string(),
        }
    }

    /// Create an invalid flow error pointing at the validate command
    pub fn invalid_flow(reason: impl Into<String>) -> Self {
        Self::InvalidFlow {
            reason: reason.into(),
            help: Some("Run 'apiflow validate' for the full list of problems".into()),
        }
    }

    /// Recovery steps for this error, when there are any worth showing
    pub fn recovery(&self) -> Option<RecoverySuggestion> {
        match self {
            Self::FlowFileNotFound { .. } => Some(RecoverySuggestion::create_flow()),
            Self::CircularConnection { nodes } => {
                Some(RecoverySuggestion::fix_circular_connection(nodes))
            }
            Self::NodeNotFound { node } => Some(RecoverySuggestion::fix_unknown_node(node)),
            Self::Yaml { .. } => Some(RecoverySuggestion::fix_yaml_syntax()),
            _ => None,
        }
    }
}
