// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 apiflow contributors

//! Flow definition structures
//!
//! Defines the schema for .apiflow.yaml files and the in-memory graph the
//! editor mutates: nodes stored in insertion order, addressed by id, and
//! connections stored as id pairs.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

use crate::errors::{FlowError, FlowResult};
use crate::flow::FlowDag;

/// Free-form node configuration
pub type Config = BTreeMap<String, String>;

/// Mock data object threaded through a simulation path
pub type Payload = serde_json::Map<String, Value>;

/// Flow definition from .apiflow.yaml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Flow {
    /// Flow name
    #[serde(default = "default_name")]
    pub name: String,

    /// Flow description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Nodes in insertion order
    #[serde(default)]
    pub nodes: Vec<Node>,

    /// Directed connections between nodes
    #[serde(default)]
    pub connections: Vec<Connection>,

    /// Simulation settings
    #[serde(default)]
    pub simulation: SimulationConfig,
}

fn default_name() -> String {
    "untitled".to_string()
}

impl Default for Flow {
    fn default() -> Self {
        Self::new(default_name())
    }
}

impl Flow {
    /// Create an empty flow
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            nodes: Vec::new(),
            connections: Vec::new(),
            simulation: SimulationConfig::default(),
        }
    }

    /// Load a flow from a file, picking the format from its extension
    pub fn from_file(path: &Path) -> FlowResult<Self> {
        if !path.exists() {
            return Err(FlowError::FlowFileNotFound {
                path: path.to_path_buf(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| FlowError::FileReadError {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Self::parse(&content, FlowFormat::from_path(path))
    }

    /// Write the flow to a file, picking the format from its extension
    pub fn save(&self, path: &Path) -> FlowResult<()> {
        let content = self.render(FlowFormat::from_path(path))?;
        std::fs::write(path, content).map_err(|e| FlowError::FileWriteError {
            path: path.to_path_buf(),
            error: e.to_string(),
        })
    }

    /// Parse a flow from a string in the given format
    pub fn parse(content: &str, format: FlowFormat) -> FlowResult<Self> {
        match format {
            FlowFormat::Yaml => serde_yaml::from_str(content).map_err(Into::into),
            FlowFormat::Json => serde_json::from_str(content).map_err(Into::into),
            FlowFormat::Toml => toml::from_str(content).map_err(Into::into),
        }
    }

    /// Serialize the flow in the given format
    pub fn render(&self, format: FlowFormat) -> FlowResult<String> {
        match format {
            FlowFormat::Yaml => serde_yaml::to_string(self).map_err(Into::into),
            FlowFormat::Json => serde_json::to_string_pretty(self).map_err(Into::into),
            FlowFormat::Toml => toml::to_string_pretty(self).map_err(Into::into),
        }
    }

    /// Parse flow from YAML string
    pub fn from_yaml(yaml: &str) -> FlowResult<Self> {
        Self::parse(yaml, FlowFormat::Yaml)
    }

    /// Serialize flow to YAML
    pub fn to_yaml(&self) -> FlowResult<String> {
        self.render(FlowFormat::Yaml)
    }

    /// Get a node by id
    pub fn get_node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Get a mutable node by id
    pub fn get_node_mut(&mut self, id: &str) -> Option<&mut Node> {
        self.nodes.iter_mut().find(|n| n.id == id)
    }

    /// Check whether a node with this id exists
    pub fn contains_node(&self, id: &str) -> bool {
        self.get_node(id).is_some()
    }

    /// All node ids in insertion order
    pub fn node_ids(&self) -> Vec<&str> {
        self.nodes.iter().map(|n| n.id.as_str()).collect()
    }

    /// Connections leaving a node, in insertion order
    pub fn outgoing<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a Connection> + 'a {
        self.connections.iter().filter(move |c| c.from == id)
    }

    /// Check whether an identical (from, to) connection already exists
    pub fn has_connection(&self, from: &str, to: &str) -> bool {
        self.connections.iter().any(|c| c.from == from && c.to == to)
    }

    /// Add a node built from the kind's template and return its id
    pub fn add_node(&mut self, kind: NodeKind, position: Position) -> String {
        let id = self.fresh_id("node", |flow, id| flow.contains_node(id));
        let mut node = Node::from_template(id.clone(), kind);
        node.position = position;
        debug!(node = %id, kind = %node.kind, "adding node");
        self.nodes.push(node);
        id
    }

    /// Add a fully built node. Fails if the id is already taken.
    pub fn insert_node(&mut self, node: Node) -> FlowResult<()> {
        if self.contains_node(&node.id) {
            return Err(FlowError::invalid_flow(format!(
                "Duplicate node id '{}'",
                node.id
            )));
        }
        self.nodes.push(node);
        Ok(())
    }

    /// Propose a new connection.
    ///
    /// The connection is recorded only if both nodes exist, it is not a self
    /// loop, the same pair isn't already connected and `from` is not
    /// reachable from `to`. A rejected proposal leaves the flow untouched.
    pub fn connect(&mut self, from: &str, to: &str) -> ConnectOutcome {
        let rejection = if from == to {
            Some(Rejection::SelfLoop)
        } else if !self.contains_node(from) {
            Some(Rejection::UnknownNode(from.to_string()))
        } else if !self.contains_node(to) {
            Some(Rejection::UnknownNode(to.to_string()))
        } else if self.has_connection(from, to) {
            Some(Rejection::Duplicate)
        } else if FlowDag::build(self).would_create_cycle(from, to) {
            Some(Rejection::Circular)
        } else {
            None
        };

        if let Some(reason) = rejection {
            debug!(%from, %to, %reason, "connection rejected");
            return ConnectOutcome::Rejected(reason);
        }

        let id = self.fresh_id("conn", |flow, id| {
            flow.connections.iter().any(|c| c.id == id)
        });
        self.connections.push(Connection {
            id: id.clone(),
            from: from.to_string(),
            to: to.to_string(),
        });
        if let Some(source) = self.get_node_mut(from) {
            source.connections.push(to.to_string());
        }

        debug!(%from, %to, connection = %id, "connection added");
        ConnectOutcome::Added(id)
    }

    /// Set one configuration entry of a node
    pub fn set_config(&mut self, node: &str, key: &str, value: &str) -> FlowResult<()> {
        let target = self
            .get_node_mut(node)
            .ok_or_else(|| FlowError::node_not_found(node))?;
        target.config.insert(key.to_string(), value.to_string());
        Ok(())
    }

    /// Change a node's display label
    pub fn set_label(&mut self, node: &str, label: &str) -> FlowResult<()> {
        let target = self
            .get_node_mut(node)
            .ok_or_else(|| FlowError::node_not_found(node))?;
        target.label = label.to_string();
        Ok(())
    }

    /// Move a node on the canvas
    pub fn move_node(&mut self, node: &str, position: Position) -> FlowResult<()> {
        let target = self
            .get_node_mut(node)
            .ok_or_else(|| FlowError::node_not_found(node))?;
        target.position = position;
        Ok(())
    }

    /// First `prefix-N` id not yet taken
    fn fresh_id(&self, prefix: &str, taken: impl Fn(&Self, &str) -> bool) -> String {
        (1..)
            .map(|n| format!("{}-{}", prefix, n))
            .find(|id| !taken(self, id))
            .unwrap_or_else(|| prefix.to_string())
    }
}

/// A typed unit of pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    /// Unique node id
    pub id: String,

    /// Node type
    pub kind: NodeKind,

    /// Display label
    #[serde(default)]
    pub label: String,

    /// Canvas position
    #[serde(default)]
    pub position: Position,

    /// Node configuration
    #[serde(default)]
    pub config: Config,

    /// Payload snapshot from the last simulation
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub variables: Payload,

    /// Ids of the nodes this one feeds
    #[serde(default)]
    pub connections: Vec<String>,
}

impl Node {
    /// Create a node with an empty configuration
    pub fn new(id: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            id: id.into(),
            label: kind.to_string(),
            kind,
            position: Position::default(),
            config: Config::new(),
            variables: Payload::new(),
            connections: Vec::new(),
        }
    }

    /// Create a node with the kind's default label and configuration
    pub fn from_template(id: impl Into<String>, kind: NodeKind) -> Self {
        let template = kind.template();
        Self {
            label: template.label.to_string(),
            config: template.config(),
            ..Self::new(id, kind)
        }
    }

    /// Set a configuration entry
    pub fn with_config(mut self, key: &str, value: &str) -> Self {
        self.config.insert(key.to_string(), value.to_string());
        self
    }
}

/// Node type
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum NodeKind {
    /// Checks for a token and adds it to the payload
    Auth,
    /// Renames a payload field
    Transformer,
    /// Tests that a value is present in the payload
    Conditional,
    /// Wraps the payload in a response
    Endpoint,
    /// Any type this crate doesn't know
    Other(String),
}

impl NodeKind {
    /// All known node kinds
    pub const KNOWN: [NodeKind; 4] = [
        NodeKind::Auth,
        NodeKind::Transformer,
        NodeKind::Conditional,
        NodeKind::Endpoint,
    ];

    /// Name used in flow files
    pub fn as_str(&self) -> &str {
        match self {
            Self::Auth => "auth",
            Self::Transformer => "transformer",
            Self::Conditional => "conditional",
            Self::Endpoint => "endpoint",
            Self::Other(name) => name,
        }
    }

    /// Whether this kind has simulation rules
    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Other(_))
    }

    /// Default label and configuration for new nodes of this kind
    pub fn template(&self) -> NodeTemplate {
        match self {
            Self::Auth => NodeTemplate {
                label: "Authentication",
                config: &[("method", "bearer")],
            },
            Self::Transformer => NodeTemplate {
                label: "Data Transformer",
                config: &[("operation", "map"), ("field", "")],
            },
            Self::Conditional => NodeTemplate {
                label: "Conditional Logic",
                config: &[("condition", "equals"), ("value", "")],
            },
            Self::Endpoint => NodeTemplate {
                label: "API Endpoint",
                config: &[("method", "GET"), ("url", "")],
            },
            Self::Other(_) => NodeTemplate {
                label: "Custom Node",
                config: &[],
            },
        }
    }
}

/// Known names match case-insensitively; other names are kept as written
impl From<String> for NodeKind {
    fn from(s: String) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "auth" => Self::Auth,
            "transformer" => Self::Transformer,
            "conditional" => Self::Conditional,
            "endpoint" => Self::Endpoint,
            _ => Self::Other(s),
        }
    }
}

impl From<&str> for NodeKind {
    fn from(s: &str) -> Self {
        Self::from(s.to_string())
    }
}

impl From<NodeKind> for String {
    fn from(kind: NodeKind) -> Self {
        kind.as_str().to_string()
    }
}

impl std::str::FromStr for NodeKind {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s))
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Default label and configuration of a node kind
#[derive(Debug, Clone, Copy)]
pub struct NodeTemplate {
    pub label: &'static str,
    pub config: &'static [(&'static str, &'static str)],
}

impl NodeTemplate {
    /// Owned copy of the default configuration
    pub fn config(&self) -> Config {
        self.config
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }
}

/// Canvas position. Has no effect on simulation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Directed edge from one node's output to another's input
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    pub id: String,
    pub from: String,
    pub to: String,
}

/// Result of proposing a connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectOutcome {
    /// Connection recorded under this id
    Added(String),
    /// Connection declined; the flow is unchanged
    Rejected(Rejection),
}

impl ConnectOutcome {
    pub fn is_added(&self) -> bool {
        matches!(self, Self::Added(_))
    }
}

/// Why a proposed connection was declined
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    SelfLoop,
    UnknownNode(String),
    Duplicate,
    Circular,
}

impl std::fmt::Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SelfLoop => write!(f, "a node cannot connect to itself"),
            Self::UnknownNode(id) => write!(f, "node '{}' does not exist", id),
            Self::Duplicate => write!(f, "these nodes are already connected"),
            Self::Circular => write!(f, "the connection would create a cycle"),
        }
    }
}

/// Simulation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Payload every start node begins with
    #[serde(default = "default_seed")]
    pub seed: Payload,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: default_seed(),
        }
    }
}

/// `{ "user": "Alice" }`
pub fn default_seed() -> Payload {
    let mut seed = Payload::new();
    seed.insert("user".to_string(), Value::String("Alice".to_string()));
    seed
}

/// Flow file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowFormat {
    Yaml,
    Json,
    Toml,
}

impl FlowFormat {
    /// Pick a format from a file extension, defaulting to YAML
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::Json,
            Some("toml") => Self::Toml,
            _ => Self::Yaml,
        }
    }
}
