// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 apiflow contributors

//! Pipeline simulator
//!
//! Walks a flow breadth-first from every node without incoming connections,
//! threading a mock payload and a success flag through the per-node rules
//! in [`rules`]. Every node ends up with exactly one [`NodeRun`]: nodes the
//! walk reaches record the payload they produced, the rest are marked as
//! not connected.
//!
//! A node is processed once per run even when several paths lead to it;
//! the first path to reach it in breadth-first order wins.

pub mod rules;

use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use tracing::{debug, info, warn};

use crate::flow::{default_seed, Flow, Node, Payload};
use self::rules::Verdict;

/// Result recorded for one node
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeRun {
    /// Payload after the node ran
    pub variables: Payload,
    /// What the node did
    pub log: String,
    /// Success flag after the node ran
    pub ok: bool,
}

impl NodeRun {
    fn new(variables: Payload, verdict: Verdict, ok: bool) -> Self {
        Self {
            variables,
            log: verdict.message().to_string(),
            ok,
        }
    }

    fn disconnected() -> Self {
        Self::new(Payload::new(), Verdict::NotConnected, false)
    }

    /// Whether the walk reached this node
    pub fn is_connected(&self) -> bool {
        self.log != Verdict::NotConnected.message()
    }
}

/// Results of one simulation, keyed by node id
#[derive(Debug, Clone, Default, Serialize)]
pub struct SimulationReport {
    /// Entry points the walk started from, in flow order
    pub start_nodes: Vec<String>,
    /// One entry per node of the flow
    pub runs: BTreeMap<String, NodeRun>,
}

impl SimulationReport {
    pub fn get(&self, id: &str) -> Option<&NodeRun> {
        self.runs.get(id)
    }

    pub fn len(&self) -> usize {
        self.runs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }
}

/// Breadth-first pipeline simulator
#[derive(Debug, Clone)]
pub struct Simulator {
    seed: Payload,
}

impl Default for Simulator {
    fn default() -> Self {
        Self::new()
    }
}

impl Simulator {
    /// Simulator seeding every path with `{ "user": "Alice" }`
    pub fn new() -> Self {
        Self {
            seed: default_seed(),
        }
    }

    /// Simulator with a custom seed payload
    pub fn with_seed(seed: Payload) -> Self {
        Self { seed }
    }

    /// Simulator using the seed from the flow's settings
    pub fn for_flow(flow: &Flow) -> Self {
        Self::with_seed(flow.simulation.seed.clone())
    }

    /// Simulate the flow. Returns `None` when no node is free of incoming
    /// connections, since there is nowhere to start.
    pub fn run(&self, flow: &Flow) -> Option<SimulationReport> {
        let by_id: HashMap<&str, &Node> = flow.nodes.iter().map(|n| (n.id.as_str(), n)).collect();
        let incoming: HashSet<&str> = flow.connections.iter().map(|c| c.to.as_str()).collect();

        let start_nodes: Vec<&Node> = flow
            .nodes
            .iter()
            .filter(|n| !incoming.contains(n.id.as_str()))
            .collect();

        if start_nodes.is_empty() {
            warn!(flow = %flow.name, "no start node found");
            return None;
        }

        let mut runs = BTreeMap::new();
        let mut visited: HashSet<&str> = HashSet::new();

        for start in &start_nodes {
            let mut queue = VecDeque::from([(*start, self.seed.clone(), true)]);

            while let Some((node, payload, ok)) = queue.pop_front() {
                if !visited.insert(node.id.as_str()) {
                    continue;
                }

                let step = rules::apply(&node.kind, &node.config, payload, ok);
                debug!(node = %node.id, kind = %node.kind, ok = step.ok, log = %step.verdict, "simulated node");

                for conn in flow.outgoing(&node.id) {
                    if let Some(next) = by_id.get(conn.to.as_str()) {
                        if !visited.contains(next.id.as_str()) {
                            queue.push_back((*next, step.payload.clone(), step.ok));
                        }
                    }
                }

                runs.insert(node.id.clone(), NodeRun::new(step.payload, step.verdict, step.ok));
            }
        }

        for node in &flow.nodes {
            if !visited.contains(node.id.as_str()) {
                runs.insert(node.id.clone(), NodeRun::disconnected());
            }
        }

        info!(
            flow = %flow.name,
            nodes = runs.len(),
            reached = visited.len(),
            "simulation finished"
        );

        Some(SimulationReport {
            start_nodes: start_nodes.iter().map(|n| n.id.clone()).collect(),
            runs,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flow::{Connection, NodeKind, Position};
    use serde_json::{json, Value};

    fn object(value: Value) -> Payload {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected an object"),
        }
    }

    fn chain(kinds: &[NodeKind]) -> (Flow, Vec<String>) {
        let mut flow = Flow::new("chain");
        let ids: Vec<String> = kinds
            .iter()
            .map(|k| flow.add_node(k.clone(), Position::default()))
            .collect();
        for pair in ids.windows(2) {
            assert!(flow.connect(&pair[0], &pair[1]).is_added());
        }
        (flow, ids)
    }

    #[test]
    fn test_no_start_node_yields_nothing() {
        let mut flow = Flow::new("loop");
        flow.nodes.push(Node::new("a", NodeKind::Auth));
        flow.nodes.push(Node::new("b", NodeKind::Endpoint));
        for (id, from, to) in [("c1", "a", "b"), ("c2", "b", "a")] {
            flow.connections.push(Connection {
                id: id.into(),
                from: from.into(),
                to: to.into(),
            });
        }

        assert!(Simulator::new().run(&flow).is_none());
        assert!(Simulator::new().run(&Flow::new("empty")).is_none());
    }

    #[test]
    fn test_auth_to_endpoint_default_config() {
        let (flow, ids) = chain(&[NodeKind::Auth, NodeKind::Endpoint]);
        let report = Simulator::new().run(&flow).unwrap();

        assert_eq!(report.start_nodes, vec![ids[0].clone()]);
        assert_eq!(report.get(&ids[0]).unwrap().log, "Auth passed");

        let end = report.get(&ids[1]).unwrap();
        assert_eq!(end.log, "Response returned");
        assert_eq!(
            end.variables,
            object(json!({
                "status": "200 OK",
                "body": { "user": "Alice", "token": "demo-token" }
            }))
        );
    }

    #[test]
    fn test_empty_token_fails_response() {
        let (mut flow, ids) = chain(&[NodeKind::Auth, NodeKind::Endpoint]);
        flow.set_config(&ids[0], "token", "").unwrap();

        let report = Simulator::new().run(&flow).unwrap();
        assert_eq!(report.get(&ids[0]).unwrap().log, "Auth failed: No token");
        assert_eq!(
            report.get(&ids[1]).unwrap().variables["status"],
            json!("400 Bad Request")
        );
    }

    #[test]
    fn test_failed_transform_propagates_downstream() {
        let (mut flow, ids) = chain(&[
            NodeKind::Auth,
            NodeKind::Transformer,
            NodeKind::Conditional,
            NodeKind::Endpoint,
        ]);
        flow.set_config(&ids[1], "field", "missing").unwrap();
        flow.set_config(&ids[2], "value", "Alice").unwrap();

        let report = Simulator::new().run(&flow).unwrap();
        assert_eq!(report.get(&ids[1]).unwrap().log, "Data transform failed");
        assert!(!report.get(&ids[1]).unwrap().ok);
        assert_eq!(report.get(&ids[2]).unwrap().log, "Condition met");
        assert!(!report.get(&ids[2]).unwrap().ok);
        assert_eq!(
            report.get(&ids[3]).unwrap().variables["status"],
            json!("400 Bad Request")
        );
    }

    #[test]
    fn test_full_pipeline_success() {
        let (mut flow, ids) = chain(&[
            NodeKind::Auth,
            NodeKind::Transformer,
            NodeKind::Conditional,
            NodeKind::Endpoint,
        ]);
        flow.set_config(&ids[2], "value", "demo-token").unwrap();

        let report = Simulator::new().run(&flow).unwrap();
        assert_eq!(report.get(&ids[1]).unwrap().log, "Data transformed");
        assert_eq!(
            report.get(&ids[3]).unwrap().variables,
            object(json!({
                "status": "200 OK",
                "body": { "user_mapped": "Alice", "token": "demo-token" }
            }))
        );
    }

    #[test]
    fn test_unreachable_nodes_are_not_connected() {
        let (mut flow, ids) = chain(&[NodeKind::Auth, NodeKind::Endpoint]);
        flow.nodes.push(Node::new("x", NodeKind::Transformer));
        flow.nodes.push(Node::new("y", NodeKind::Endpoint));
        for (id, from, to) in [("cx", "x", "y"), ("cy", "y", "x")] {
            flow.connections.push(Connection {
                id: id.into(),
                from: from.into(),
                to: to.into(),
            });
        }

        let report = Simulator::new().run(&flow).unwrap();
        assert_eq!(report.len(), 4);
        assert_eq!(report.get(&ids[1]).unwrap().log, "Response returned");
        for id in ["x", "y"] {
            let run = report.get(id).unwrap();
            assert_eq!(run.log, "Not connected");
            assert!(!run.is_connected());
            assert!(run.variables.is_empty());
        }
    }

    #[test]
    fn test_isolated_node_is_its_own_start() {
        let mut flow = Flow::new("single");
        let id = flow.add_node(NodeKind::Endpoint, Position::default());

        let report = Simulator::new().run(&flow).unwrap();
        assert_eq!(report.start_nodes, vec![id.clone()]);
        assert_eq!(report.get(&id).unwrap().variables["status"], json!("200 OK"));
    }

    #[test]
    fn test_diamond_processes_each_node_once() {
        let mut flow = Flow::new("diamond");
        let auth = flow.add_node(NodeKind::Auth, Position::default());
        let left = flow.add_node(NodeKind::Transformer, Position::default());
        let right = flow.add_node(NodeKind::Conditional, Position::default());
        let end = flow.add_node(NodeKind::Endpoint, Position::default());
        flow.connect(&auth, &left);
        flow.connect(&auth, &right);
        flow.connect(&left, &end);
        flow.connect(&right, &end);

        let report = Simulator::new().run(&flow).unwrap();
        assert_eq!(report.len(), 4);

        // The left branch is queued first, so its payload reaches the endpoint
        let body = &report.get(&end).unwrap().variables["body"];
        assert_eq!(body, &json!({ "user_mapped": "Alice", "token": "demo-token" }));
    }

    #[test]
    fn test_multiple_starts_share_visited_set() {
        let mut flow = Flow::new("merge");
        let a = flow.add_node(NodeKind::Auth, Position::default());
        let b = flow.add_node(NodeKind::Transformer, Position::default());
        let end = flow.add_node(NodeKind::Endpoint, Position::default());
        flow.connect(&a, &end);
        flow.connect(&b, &end);

        let report = Simulator::new().run(&flow).unwrap();
        assert_eq!(report.start_nodes, vec![a, b]);
        assert_eq!(
            report.get(&end).unwrap().variables["body"],
            json!({ "user": "Alice", "token": "demo-token" })
        );
    }

    #[test]
    fn test_custom_seed() {
        let (mut flow, ids) = chain(&[NodeKind::Conditional, NodeKind::Endpoint]);
        flow.set_config(&ids[0], "value", "Bob").unwrap();
        flow.simulation.seed = object(json!({ "user": "Bob" }));

        let report = Simulator::for_flow(&flow).run(&flow).unwrap();
        assert_eq!(report.get(&ids[0]).unwrap().log, "Condition met");
        assert_eq!(report.get(&ids[1]).unwrap().variables["status"], json!("200 OK"));
    }

    #[test]
    fn test_dangling_connection_is_ignored() {
        let (mut flow, ids) = chain(&[NodeKind::Auth]);
        flow.connections.push(Connection {
            id: "c9".into(),
            from: ids[0].clone(),
            to: "ghost".into(),
        });

        let report = Simulator::new().run(&flow).unwrap();
        assert_eq!(report.len(), 1);
        assert_eq!(report.get(&ids[0]).unwrap().log, "Auth passed");
    }
}
