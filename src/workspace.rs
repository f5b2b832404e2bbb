// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 apiflow contributors

//! Editing session
//!
//! A `Workspace` owns the flow being edited and keeps the simulation report
//! in step with it: every structural change re-runs the simulator and
//! writes each node's `variables` from the fresh report.

use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

use crate::errors::{FlowError, FlowResult};
use crate::flow::{
    Config, ConnectOutcome, Flow, NodeKind, Payload, Position, Version, VersionHistory,
};
use crate::simulator::{SimulationReport, Simulator};

/// What the debug panel shows for one node
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeDebug {
    pub kind: NodeKind,
    pub label: String,
    pub config: Config,
    pub variables: Payload,
    pub connections: usize,
}

/// A flow under edit, its history and its latest simulation
pub struct Workspace {
    flow: Flow,
    simulator: Simulator,
    history: VersionHistory,
    report: Option<SimulationReport>,
}

impl Workspace {
    /// Open a flow and simulate it once
    pub fn new(flow: Flow) -> Self {
        let simulator = Simulator::for_flow(&flow);
        let mut workspace = Self {
            flow,
            simulator,
            history: VersionHistory::new(),
            report: None,
        };
        workspace.refresh();
        workspace
    }

    pub fn flow(&self) -> &Flow {
        &self.flow
    }

    /// Give the flow back, with variables from the last run
    pub fn into_flow(self) -> Flow {
        self.flow
    }

    /// Latest report; `None` when the flow has no start node
    pub fn report(&self) -> Option<&SimulationReport> {
        self.report.as_ref()
    }

    pub fn history(&self) -> &VersionHistory {
        &self.history
    }

    /// Add a node from its template and record a version
    pub fn add_node(&mut self, kind: NodeKind, position: Position) -> String {
        let label = kind.template().label;
        let id = self.flow.add_node(kind, position);
        self.refresh();
        self.history.save(format!("Added {} node", label), &self.flow);
        id
    }

    /// Propose a connection; the simulation re-runs only if it was added
    pub fn connect(&mut self, from: &str, to: &str) -> ConnectOutcome {
        let outcome = self.flow.connect(from, to);
        if outcome.is_added() {
            self.refresh();
        }
        outcome
    }

    /// Change one configuration entry of a node
    pub fn set_config(&mut self, node: &str, key: &str, value: &str) -> FlowResult<()> {
        self.flow.set_config(node, key, value)?;
        self.refresh();
        Ok(())
    }

    /// Rename a node. Labels don't affect the simulation.
    pub fn set_label(&mut self, node: &str, label: &str) -> FlowResult<()> {
        self.flow.set_label(node, label)
    }

    /// Move a node. Positions don't affect the simulation.
    pub fn move_node(&mut self, node: &str, position: Position) -> FlowResult<()> {
        self.flow.move_node(node, position)
    }

    /// Snapshot the current nodes and connections
    pub fn save_version(&mut self, description: &str) -> String {
        self.history.save(description, &self.flow)
    }

    /// Restore the nodes and connections of a saved version
    pub fn load_version(&mut self, id: &str) -> FlowResult<()> {
        let Version {
            nodes, connections, ..
        } = self
            .history
            .load(id)
            .cloned()
            .ok_or_else(|| FlowError::VersionNotFound {
                version: id.to_string(),
            })?;

        self.flow.nodes = nodes;
        self.flow.connections = connections;
        self.refresh();
        Ok(())
    }

    /// Per-node view of type, label, config, variables and fan-out
    pub fn debug_info(&self) -> BTreeMap<String, NodeDebug> {
        self.flow
            .nodes
            .iter()
            .map(|node| {
                (
                    node.id.clone(),
                    NodeDebug {
                        kind: node.kind.clone(),
                        label: node.label.clone(),
                        config: node.config.clone(),
                        variables: node.variables.clone(),
                        connections: node.connections.len(),
                    },
                )
            })
            .collect()
    }

    /// Re-run the simulation and copy each node's variables from it
    pub fn refresh(&mut self) {
        let report = self.simulator.run(&self.flow);

        for node in &mut self.flow.nodes {
            node.variables = report
                .as_ref()
                .and_then(|r| r.get(&node.id))
                .map(|run| run.variables.clone())
                .unwrap_or_default();
        }

        debug!(
            nodes = self.flow.nodes.len(),
            connections = self.flow.connections.len(),
            simulated = report.is_some(),
            "workspace refreshed"
        );
        self.report = report;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flow::Connection;
    use serde_json::json;

    fn pipeline() -> (Workspace, String, String) {
        let mut ws = Workspace::new(Flow::new("ws"));
        let auth = ws.add_node(NodeKind::Auth, Position::default());
        let end = ws.add_node(NodeKind::Endpoint, Position::new(200.0, 0.0));
        assert!(ws.connect(&auth, &end).is_added());
        (ws, auth, end)
    }

    #[test]
    fn test_connect_refreshes_variables() {
        let (ws, _, end) = pipeline();

        let node = ws.flow().get_node(&end).unwrap();
        assert_eq!(node.variables["status"], json!("200 OK"));
        assert_eq!(ws.report().unwrap().get(&end).unwrap().log, "Response returned");
    }

    #[test]
    fn test_config_edit_reruns_simulation() {
        let (mut ws, auth, end) = pipeline();
        ws.set_config(&auth, "token", "").unwrap();

        let node = ws.flow().get_node(&end).unwrap();
        assert_eq!(node.variables["status"], json!("400 Bad Request"));
        assert!(ws.set_config("ghost", "token", "x").is_err());
    }

    #[test]
    fn test_rejected_connection_changes_nothing() {
        let (mut ws, auth, end) = pipeline();
        let before = ws.flow().connections.clone();

        assert!(!ws.connect(&end, &auth).is_added());
        assert_eq!(ws.flow().connections, before);
    }

    #[test]
    fn test_add_node_saves_version() {
        let (ws, _, _) = pipeline();

        let versions = ws.history().list();
        assert_eq!(versions.len(), 2);
        assert_eq!(versions[0].description, "Added API Endpoint node");
        assert_eq!(versions[1].description, "Added Authentication node");
        assert_eq!(versions[1].nodes.len(), 1);
    }

    #[test]
    fn test_load_version_restores_graph() {
        let (mut ws, auth, end) = pipeline();
        let saved = ws.save_version("connected");
        ws.add_node(NodeKind::Transformer, Position::default());
        assert_eq!(ws.flow().nodes.len(), 3);

        ws.load_version(&saved).unwrap();
        assert_eq!(ws.flow().nodes.len(), 2);
        assert!(ws.flow().has_connection(&auth, &end));
        assert_eq!(ws.history().current(), Some(saved.as_str()));

        assert!(matches!(
            ws.load_version("v-99"),
            Err(FlowError::VersionNotFound { .. })
        ));
    }

    #[test]
    fn test_variables_cleared_without_start_node() {
        let (mut ws, auth, end) = pipeline();
        let mut flow = ws.flow().clone();
        flow.connections.push(Connection {
            id: "back".into(),
            from: end.clone(),
            to: auth.clone(),
        });
        ws = Workspace::new(flow);

        assert!(ws.report().is_none());
        assert!(ws.flow().nodes.iter().all(|n| n.variables.is_empty()));
    }

    #[test]
    fn test_debug_info() {
        let (mut ws, auth, _) = pipeline();
        ws.move_node(&auth, Position::new(5.0, 5.0)).unwrap();

        let info = ws.debug_info();
        let entry = &info[&auth];
        assert_eq!(entry.kind, NodeKind::Auth);
        assert_eq!(entry.label, "Authentication");
        assert_eq!(entry.connections, 1);
        assert_eq!(entry.variables["token"], json!("demo-token"));
    }
}
