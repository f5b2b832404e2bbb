// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 apiflow contributors

//! Flow validation
//!
//! Checks a loaded flow file before it is simulated or edited. Flows built
//! through `Flow::connect` can't fail the structural checks, but files
//! written by hand can.

use std::collections::HashSet;

use crate::flow::{Flow, FlowDag, Node, NodeKind};

/// Flow validator
pub struct FlowValidator;

impl FlowValidator {
    /// Validate a flow
    pub fn validate(flow: &Flow) -> ValidationResult {
        let mut result = ValidationResult::new();

        if flow.nodes.is_empty() {
            result.add_error("Flow has no nodes defined");
            return result;
        }

        // Duplicate node ids
        let mut seen_ids = HashSet::new();
        for node in &flow.nodes {
            if !seen_ids.insert(node.id.as_str()) {
                result.add_error(&format!("Duplicate node id: '{}'", node.id));
            }
        }

        Self::validate_connections(flow, &mut result);

        let dag = FlowDag::build(flow);
        if let Some(cycle) = dag.find_cycle() {
            result.add_error(&format!("Circular connection: {}", cycle.join(" → ")));
        }

        // Entry points, using the same rule the simulator applies
        let incoming: HashSet<&str> = flow.connections.iter().map(|c| c.to.as_str()).collect();
        if flow.nodes.iter().all(|n| incoming.contains(n.id.as_str())) {
            result.add_warning("Flow has no start node; simulation will produce no output");
        } else {
            let reached = dag.reachable_from_starts();
            for node in &flow.nodes {
                if !reached.contains(&node.id) {
                    result.add_warning(&format!(
                        "Node '{}' is not reachable from any start node",
                        node.id
                    ));
                }
            }
        }

        for node in &flow.nodes {
            Self::validate_node(node, flow, &mut result);
        }

        result
    }

    fn validate_connections(flow: &Flow, result: &mut ValidationResult) {
        let mut seen_pairs = HashSet::new();

        for conn in &flow.connections {
            for end in [&conn.from, &conn.to] {
                if !flow.contains_node(end) {
                    result.add_error(&format!(
                        "Connection '{}' references unknown node '{}'",
                        conn.id, end
                    ));
                }
            }

            if conn.from == conn.to {
                result.add_error(&format!(
                    "Connection '{}' connects node '{}' to itself",
                    conn.id, conn.from
                ));
            }

            if !seen_pairs.insert((conn.from.as_str(), conn.to.as_str())) {
                result.add_error(&format!(
                    "Duplicate connection '{}': {} → {}",
                    conn.id, conn.from, conn.to
                ));
            }
        }
    }

    /// Validate a single node's configuration
    fn validate_node(node: &Node, flow: &Flow, result: &mut ValidationResult) {
        let config = |key: &str| node.config.get(key).map(String::as_str);

        match &node.kind {
            NodeKind::Auth => {
                if config("token") == Some("") {
                    result.add_warning(&format!(
                        "Node '{}': token is empty - authentication will fail",
                        node.id
                    ));
                }
            }
            NodeKind::Transformer => {
                if let Some(op) = config("operation").filter(|op| !op.is_empty() && *op != "map") {
                    result.add_warning(&format!(
                        "Node '{}': unsupported operation '{}' - transform will fail",
                        node.id, op
                    ));
                }
            }
            NodeKind::Conditional => {
                if config("value").unwrap_or_default().is_empty() {
                    result.add_warning(&format!(
                        "Node '{}': condition has no value - it will always fail",
                        node.id
                    ));
                }
            }
            NodeKind::Endpoint => {}
            NodeKind::Other(name) => {
                result.add_warning(&format!(
                    "Node '{}': unknown node type '{}' - it will pass data through",
                    node.id, name
                ));
            }
        }

        // The cached targets must mirror the connection list
        let mut expected: Vec<&str> = flow.outgoing(&node.id).map(|c| c.to.as_str()).collect();
        let mut cached: Vec<&str> = node.connections.iter().map(String::as_str).collect();
        expected.sort_unstable();
        cached.sort_unstable();
        if expected != cached {
            result.add_warning(&format!(
                "Node '{}': connections list is out of date (expected [{}])",
                node.id,
                expected.join(", ")
            ));
        }
    }
}

/// Result of flow validation
#[derive(Debug, Default)]
pub struct ValidationResult {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_error(&mut self, message: &str) {
        self.errors.push(message.to_string());
    }

    pub fn add_warning(&mut self, message: &str) {
        self.warnings.push(message.to_string());
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flow::{Connection, Position};

    fn connection(id: &str, from: &str, to: &str) -> Connection {
        Connection {
            id: id.into(),
            from: from.into(),
            to: to.into(),
        }
    }

    #[test]
    fn test_validate_empty_flow() {
        let result = FlowValidator::validate(&Flow::new("empty"));
        assert!(!result.is_valid());
        assert!(result.errors[0].contains("no nodes"));
    }

    #[test]
    fn test_connected_flow_is_clean() {
        let mut flow = Flow::new("ok");
        let auth = flow.add_node(NodeKind::Auth, Position::default());
        let end = flow.add_node(NodeKind::Endpoint, Position::default());
        flow.connect(&auth, &end);

        let result = FlowValidator::validate(&flow);
        assert!(result.is_valid());
        assert!(!result.has_warnings(), "{:?}", result.warnings);
    }

    #[test]
    fn test_validate_duplicate_ids_and_dangling() {
        let mut flow = Flow::new("bad");
        flow.nodes.push(Node::new("a", NodeKind::Auth));
        flow.nodes.push(Node::new("a", NodeKind::Endpoint));
        flow.connections.push(connection("c1", "a", "ghost"));

        let result = FlowValidator::validate(&flow);
        assert!(!result.is_valid());
        assert!(result.errors.iter().any(|e| e.contains("Duplicate node id")));
        assert!(result.errors.iter().any(|e| e.contains("unknown node 'ghost'")));
    }

    #[test]
    fn test_validate_cycle_and_unreachable() {
        let mut flow = Flow::new("cycle");
        for id in ["start", "x", "y"] {
            flow.nodes.push(Node::new(id, NodeKind::Endpoint));
        }
        flow.connections.push(connection("c1", "x", "y"));
        flow.connections.push(connection("c2", "y", "x"));

        let result = FlowValidator::validate(&flow);
        assert!(result.errors.iter().any(|e| e.starts_with("Circular connection")));
        assert!(result
            .warnings
            .iter()
            .any(|w| w.contains("'x' is not reachable")));
    }

    #[test]
    fn test_validate_self_loop_and_duplicate_connection() {
        let mut flow = Flow::new("loops");
        flow.nodes.push(Node::new("a", NodeKind::Endpoint));
        flow.nodes.push(Node::new("b", NodeKind::Endpoint));
        flow.connections.push(connection("c1", "a", "a"));
        flow.connections.push(connection("c2", "a", "b"));
        flow.connections.push(connection("c3", "a", "b"));

        let result = FlowValidator::validate(&flow);
        assert!(result.errors.iter().any(|e| e.contains("to itself")));
        assert!(result.errors.iter().any(|e| e.contains("Duplicate connection 'c3'")));
    }

    #[test]
    fn test_validate_config_warnings() {
        let mut flow = Flow::new("config");
        flow.nodes.push(Node::new("auth", NodeKind::Auth).with_config("token", ""));
        flow.nodes
            .push(Node::new("cond", NodeKind::Conditional).with_config("condition", "equals"));
        flow.nodes.push(Node::new("hook", NodeKind::from("webhook")));

        let result = FlowValidator::validate(&flow);
        assert!(result.is_valid());
        assert!(result.warnings.iter().any(|w| w.contains("token is empty")));
        assert!(result.warnings.iter().any(|w| w.contains("no value")));
        assert!(result.warnings.iter().any(|w| w.contains("unknown node type 'webhook'")));
    }

    #[test]
    fn test_validate_stale_connection_cache() {
        let mut flow = Flow::new("stale");
        flow.nodes.push(Node::new("a", NodeKind::Auth));
        flow.nodes.push(Node::new("b", NodeKind::Endpoint));
        flow.connections.push(connection("c1", "a", "b"));

        let result = FlowValidator::validate(&flow);
        assert!(result.warnings.iter().any(|w| w.contains("out of date")));
    }
}
