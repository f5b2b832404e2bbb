// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 apiflow contributors

//! Graph view of a flow
//!
//! Builds a petgraph `DiGraph` from a flow's nodes and connections for the
//! structural questions the editor asks: would a new connection close a
//! cycle, which nodes are entry points, what is reachable, and in what
//! order the nodes run.

use petgraph::algo::{tarjan_scc, toposort};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::{Bfs, Dfs};
use petgraph::Direction;
use std::collections::{HashMap, HashSet, VecDeque};

use crate::errors::FlowError;
use crate::flow::Flow;

/// Directed graph over a flow's node ids
pub struct FlowDag {
    graph: DiGraph<String, ()>,
    id_to_index: HashMap<String, NodeIndex>,
}

impl FlowDag {
    /// Build the graph. Connections that name unknown nodes are left out.
    pub fn build(flow: &Flow) -> Self {
        let mut graph = DiGraph::new();
        let mut id_to_index = HashMap::new();

        for node in &flow.nodes {
            if id_to_index.contains_key(&node.id) {
                continue;
            }
            let idx = graph.add_node(node.id.clone());
            id_to_index.insert(node.id.clone(), idx);
        }

        for conn in &flow.connections {
            if let (Some(&from), Some(&to)) =
                (id_to_index.get(&conn.from), id_to_index.get(&conn.to))
            {
                graph.add_edge(from, to, ());
            }
        }

        Self { graph, id_to_index }
    }

    /// Whether connecting `from` → `to` would close a cycle.
    ///
    /// Depth-first search from `to` over the existing edges; the answer is
    /// yes when `from` is reachable.
    pub fn would_create_cycle(&self, from: &str, to: &str) -> bool {
        if from == to {
            return true;
        }
        let (Some(&from), Some(&to)) = (self.id_to_index.get(from), self.id_to_index.get(to))
        else {
            return false;
        };

        let mut dfs = Dfs::new(&self.graph, to);
        while let Some(node) = dfs.next(&self.graph) {
            if node == from {
                return true;
            }
        }
        false
    }

    /// Nodes without incoming connections, in flow order
    pub fn start_nodes(&self) -> Vec<String> {
        self.graph
            .node_indices()
            .filter(|&n| {
                self.graph
                    .neighbors_directed(n, Direction::Incoming)
                    .next()
                    .is_none()
            })
            .map(|n| self.graph[n].clone())
            .collect()
    }

    /// Every node reachable from some start node, start nodes included
    pub fn reachable_from_starts(&self) -> HashSet<String> {
        let mut reached = HashSet::new();
        for start in self.start_nodes() {
            let mut bfs = Bfs::new(&self.graph, self.id_to_index[&start]);
            while let Some(node) = bfs.next(&self.graph) {
                reached.insert(self.graph[node].clone());
            }
        }
        reached
    }

    /// Nodes fed by this node
    pub fn successors(&self, id: &str) -> Option<Vec<String>> {
        self.neighbors(id, Direction::Outgoing)
    }

    /// Nodes feeding into this node
    pub fn predecessors(&self, id: &str) -> Option<Vec<String>> {
        self.neighbors(id, Direction::Incoming)
    }

    fn neighbors(&self, id: &str, direction: Direction) -> Option<Vec<String>> {
        let node = self.id_to_index.get(id)?;
        let mut ids: Vec<String> = self
            .graph
            .neighbors_directed(*node, direction)
            .map(|n| self.graph[n].clone())
            .collect();
        // petgraph walks adjacency lists newest first
        ids.reverse();
        Some(ids)
    }

    /// One cycle of the graph, as a closed path of node ids
    pub fn find_cycle(&self) -> Option<Vec<String>> {
        tarjan_scc(&self.graph).into_iter().find_map(|scc| {
            let start = *scc.first()?;
            let cyclic = scc.len() > 1 || self.graph.contains_edge(start, start);
            cyclic.then(|| {
                let members: HashSet<NodeIndex> = scc.iter().copied().collect();
                self.cycle_through(start, &members)
            })
        })
    }

    /// Breadth-first search inside one strongly connected component for a
    /// shortest path from `start` back to itself
    fn cycle_through(&self, start: NodeIndex, members: &HashSet<NodeIndex>) -> Vec<String> {
        let mut parent: HashMap<NodeIndex, NodeIndex> = HashMap::new();
        let mut seen = HashSet::from([start]);
        let mut queue = VecDeque::from([start]);

        while let Some(node) = queue.pop_front() {
            for next in self.graph.neighbors_directed(node, Direction::Outgoing) {
                if !members.contains(&next) {
                    continue;
                }
                if next == start {
                    let mut path = vec![node];
                    let mut cur = node;
                    while let Some(&p) = parent.get(&cur) {
                        path.push(p);
                        cur = p;
                    }
                    path.reverse();
                    path.push(start);
                    return path.into_iter().map(|n| self.graph[n].clone()).collect();
                }
                if seen.insert(next) {
                    parent.insert(next, node);
                    queue.push_back(next);
                }
            }
        }

        vec![self.graph[start].clone()]
    }

    /// Node ids in an order where every connection points forward
    pub fn topological_order(&self) -> Result<Vec<String>, FlowError> {
        toposort(&self.graph, None)
            .map(|nodes| nodes.into_iter().map(|n| self.graph[n].clone()).collect())
            .map_err(|_| FlowError::CircularConnection {
                nodes: self.find_cycle().unwrap_or_default(),
            })
    }

    /// Generate Mermaid diagram of the flow
    pub fn to_mermaid(&self, flow: &Flow) -> String {
        let mut out = String::from("graph LR\n");

        for idx in self.graph.node_indices() {
            let id = &self.graph[idx];
            out.push_str(&format!("    {}[\"{}\"]\n", id, display_label(flow, id)));
        }

        for conn in &flow.connections {
            if self.id_to_index.contains_key(&conn.from) && self.id_to_index.contains_key(&conn.to)
            {
                out.push_str(&format!("    {} --> {}\n", conn.from, conn.to));
            }
        }

        out
    }

    /// Generate DOT diagram of the flow
    pub fn to_dot(&self, flow: &Flow) -> String {
        let mut out = String::from("digraph flow {\n");
        out.push_str("    rankdir=LR;\n");
        out.push_str("    node [shape=box, style=rounded];\n\n");

        for idx in self.graph.node_indices() {
            let id = &self.graph[idx];
            out.push_str(&format!(
                "    \"{}\" [label=\"{}\"];\n",
                id,
                display_label(flow, id)
            ));
        }

        out.push('\n');

        for conn in &flow.connections {
            if self.id_to_index.contains_key(&conn.from) && self.id_to_index.contains_key(&conn.to)
            {
                out.push_str(&format!("    \"{}\" -> \"{}\";\n", conn.from, conn.to));
            }
        }

        out.push_str("}\n");
        out
    }

    /// Generate text representation of evaluation order
    pub fn to_text(&self, flow: &Flow) -> Result<String, FlowError> {
        let order = self.topological_order()?;
        let mut out = String::new();

        for (i, id) in order.iter().enumerate() {
            let Some(node) = flow.get_node(id) else {
                continue;
            };
            let deps = self.predecessors(id).unwrap_or_default();

            out.push_str(&format!("{}. {} ({}) {}", i + 1, node.id, node.kind, node.label));

            if !deps.is_empty() {
                out.push_str(&format!(" [after: {}]", deps.join(", ")));
            }

            out.push('\n');
        }

        Ok(out)
    }
}

fn display_label(flow: &Flow, id: &str) -> String {
    flow.get_node(id)
        .map(|n| format!("{}: {}", n.kind, n.label).replace('"', "'"))
        .unwrap_or_else(|| id.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flow::{Connection, Node, NodeKind};

    fn make_test_flow(nodes: &[&str], edges: &[(&str, &str)]) -> Flow {
        let mut flow = Flow::new("test");
        for id in nodes {
            flow.nodes.push(Node::new(*id, NodeKind::Auth));
        }
        for (i, (from, to)) in edges.iter().enumerate() {
            flow.connections.push(Connection {
                id: format!("c{}", i),
                from: from.to_string(),
                to: to.to_string(),
            });
        }
        flow
    }

    #[test]
    fn test_linear_order() {
        let flow = make_test_flow(&["a", "b", "c"], &[("a", "b"), ("b", "c")]);
        let dag = FlowDag::build(&flow);

        assert_eq!(dag.topological_order().unwrap(), vec!["a", "b", "c"]);
        assert_eq!(dag.start_nodes(), vec!["a"]);
    }

    #[test]
    fn test_would_create_cycle() {
        let flow = make_test_flow(&["a", "b", "c"], &[("a", "b"), ("b", "c")]);
        let dag = FlowDag::build(&flow);

        assert!(dag.would_create_cycle("c", "a"));
        assert!(dag.would_create_cycle("b", "a"));
        assert!(dag.would_create_cycle("a", "a"));
        assert!(!dag.would_create_cycle("a", "c"));
        assert!(!dag.would_create_cycle("a", "missing"));
    }

    #[test]
    fn test_find_cycle_reports_path() {
        let flow = make_test_flow(
            &["a", "b", "c", "d"],
            &[("a", "b"), ("b", "c"), ("c", "d"), ("d", "b")],
        );
        let dag = FlowDag::build(&flow);

        let cycle = dag.find_cycle().unwrap();
        assert_eq!(cycle.first(), cycle.last());
        assert_eq!(cycle.len(), 4);
        assert!(matches!(
            dag.topological_order(),
            Err(FlowError::CircularConnection { .. })
        ));
    }

    #[test]
    fn test_acyclic_has_no_cycle() {
        let flow = make_test_flow(
            &["a", "b", "c", "d"],
            &[("a", "b"), ("a", "c"), ("b", "d"), ("c", "d")],
        );
        let dag = FlowDag::build(&flow);

        assert!(dag.find_cycle().is_none());
        assert_eq!(dag.successors("a").unwrap(), vec!["b", "c"]);
        assert_eq!(dag.predecessors("d").unwrap(), vec!["b", "c"]);
    }

    #[test]
    fn test_reachable_from_starts() {
        let flow = make_test_flow(
            &["a", "b", "x", "y"],
            &[("a", "b"), ("x", "y"), ("y", "x")],
        );
        let dag = FlowDag::build(&flow);

        let reached = dag.reachable_from_starts();
        assert!(reached.contains("a"));
        assert!(reached.contains("b"));
        assert!(!reached.contains("x"));
        assert!(!reached.contains("y"));
    }

    #[test]
    fn test_dangling_connections_are_ignored() {
        let flow = make_test_flow(&["a"], &[("a", "ghost")]);
        let dag = FlowDag::build(&flow);

        assert_eq!(dag.successors("a").unwrap(), Vec::<String>::new());
        assert!(dag.successors("ghost").is_none());
    }

    #[test]
    fn test_mermaid_output() {
        let flow = make_test_flow(&["a", "b"], &[("a", "b")]);
        let dag = FlowDag::build(&flow);

        insta::assert_snapshot!(dag.to_mermaid(&flow), @r###"
        graph LR
            a["auth: auth"]
            b["auth: auth"]
            a --> b
        "###);
    }

    #[test]
    fn test_dot_output() {
        let flow = make_test_flow(&["a", "b"], &[("a", "b")]);
        let dag = FlowDag::build(&flow);
        let dot = dag.to_dot(&flow);

        assert!(dot.starts_with("digraph flow {"));
        assert!(dot.contains("\"a\" -> \"b\";"));
    }
}
