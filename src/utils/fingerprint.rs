// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 apiflow contributors

//! Flow fingerprints
//!
//! BLAKE3 hash over the parts of a flow that can change a simulation:
//! node ids, kinds and configs, the connections, and the seed payload.
//! Labels, positions and stored variables are left out, so dragging a node
//! around doesn't count as a change.

use blake3::Hasher;

use crate::flow::Flow;

/// Hash the simulation-relevant content of a flow
pub fn fingerprint(flow: &Flow) -> String {
    let mut hasher = Hasher::new();

    for node in &flow.nodes {
        hasher.update(node.id.as_bytes());
        hasher.update(&[0]);
        hasher.update(node.kind.as_str().as_bytes());
        hasher.update(&[0]);
        for (key, value) in &node.config {
            hasher.update(key.as_bytes());
            hasher.update(&[1]);
            hasher.update(value.as_bytes());
            hasher.update(&[0]);
        }
        hasher.update(&[2]);
    }

    for conn in &flow.connections {
        hasher.update(conn.from.as_bytes());
        hasher.update(&[1]);
        hasher.update(conn.to.as_bytes());
        hasher.update(&[0]);
    }

    hasher.update(&[3]);
    // Map serializes with sorted keys, so equal seeds hash equally
    hasher.update(serde_json::Value::Object(flow.simulation.seed.clone()).to_string().as_bytes());

    hasher.finalize().to_hex().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flow::{NodeKind, Position};

    fn sample() -> Flow {
        let mut flow = Flow::new("fp");
        let a = flow.add_node(NodeKind::Auth, Position::default());
        let b = flow.add_node(NodeKind::Endpoint, Position::default());
        flow.connect(&a, &b);
        flow
    }

    #[test]
    fn test_same_flow_same_fingerprint() {
        assert_eq!(fingerprint(&sample()), fingerprint(&sample()));
    }

    #[test]
    fn test_position_and_label_are_ignored() {
        let mut moved = sample();
        moved.move_node("node-1", Position::new(50.0, 80.0)).unwrap();
        moved.nodes[1].label = "Renamed".into();

        assert_eq!(fingerprint(&sample()), fingerprint(&moved));
    }

    #[test]
    fn test_config_change_is_detected() {
        let mut edited = sample();
        edited.set_config("node-1", "token", "").unwrap();

        assert_ne!(fingerprint(&sample()), fingerprint(&edited));
    }
}
