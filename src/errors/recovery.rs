// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 apiflow contributors

//! Error recovery suggestions
//!
//! Provides actionable suggestions for recovering from errors.

/// A recovery suggestion with concrete steps
#[derive(Debug, Clone)]
pub struct RecoverySuggestion {
    /// Brief description of what to do
    pub action: String,
    /// Detailed steps
    pub steps: Vec<String>,
    /// Commands to run
    pub commands: Vec<String>,
}

impl RecoverySuggestion {
    /// Suggest breaking a cycle between nodes
    pub fn fix_circular_connection(nodes: &[String]) -> Self {
        Self {
            action: "Remove circular connection".into(),
            steps: vec![
                format!("Detected cycle: {}", nodes.join(" → ")),
                "Remove one of the connections in the cycle from the flow file".into(),
                "Connections added with 'apiflow connect' can never form a cycle".into(),
            ],
            commands: vec![
                "# Visualize your flow:".into(),
                "apiflow graph --format mermaid".into(),
            ],
        }
    }

    /// Suggest checking node ids
    pub fn fix_unknown_node(node: &str) -> Self {
        Self {
            action: format!("Check node id '{}'", node),
            steps: vec![
                "Node ids are generated as node-1, node-2, ... unless set by hand".into(),
                "List the ids of the current flow and retry".into(),
            ],
            commands: vec!["apiflow graph".into()],
        }
    }

    /// Suggest adding an entry point to a flow without start nodes
    pub fn add_start_node() -> Self {
        Self {
            action: "Add a start node".into(),
            steps: vec![
                "Every node has an incoming connection, so the simulation has no entry point".into(),
                "Add a node that nothing connects into, then connect it to the pipeline".into(),
            ],
            commands: vec![
                "apiflow add auth".into(),
                "apiflow connect <new-node> <first-node>".into(),
            ],
        }
    }

    /// Suggest creating a flow file
    pub fn create_flow() -> Self {
        Self {
            action: "Create a flow file".into(),
            steps: vec![
                "No .apiflow.yaml found in current directory".into(),
                "Initialize a sample flow or write the file manually".into(),
            ],
            commands: vec!["apiflow init".into()],
        }
    }

    /// Suggest fixing invalid YAML
    pub fn fix_yaml_syntax() -> Self {
        Self {
            action: "Fix YAML syntax error".into(),
            steps: vec![
                "Check for common YAML issues:".into(),
                "  • Incorrect indentation (use spaces, not tabs)".into(),
                "  • Missing colons after keys".into(),
                "  • Incorrect list formatting".into(),
            ],
            commands: vec![],
        }
    }
}

impl std::fmt::Display for RecoverySuggestion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "→ {}", self.action)?;

        for step in &self.steps {
            writeln!(f, "  {}", step)?;
        }

        if !self.commands.is_empty() {
            writeln!(f)?;
            for cmd in &self.commands {
                writeln!(f, "  {}", cmd)?;
            }
        }

        Ok(())
    }
}
