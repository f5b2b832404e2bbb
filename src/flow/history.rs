// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 apiflow contributors

//! Version history
//!
//! Named snapshots of a flow's nodes and connections. The history lives in
//! memory next to the flow it tracks; nothing here touches the disk.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::flow::{Connection, Flow, Node};

/// A snapshot of a flow
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Version {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub description: String,
    pub nodes: Vec<Node>,
    pub connections: Vec<Connection>,
}

/// Snapshots, newest first
#[derive(Debug, Clone, Default)]
pub struct VersionHistory {
    versions: Vec<Version>,
    current: Option<String>,
    saved: usize,
}

impl VersionHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot the flow and make the snapshot current
    pub fn save(&mut self, description: impl Into<String>, flow: &Flow) -> String {
        self.saved += 1;
        let version = Version {
            id: format!("v-{}", self.saved),
            timestamp: Utc::now(),
            description: description.into(),
            nodes: flow.nodes.clone(),
            connections: flow.connections.clone(),
        };

        info!(version = %version.id, description = %version.description, "saved version");

        let id = version.id.clone();
        self.versions.insert(0, version);
        self.current = Some(id.clone());
        id
    }

    /// Look up a snapshot and make it current
    pub fn load(&mut self, id: &str) -> Option<&Version> {
        let version = self.versions.iter().find(|v| v.id == id)?;
        self.current = Some(version.id.clone());
        Some(version)
    }

    /// Id of the version saved or loaded last
    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// All snapshots, newest first
    pub fn list(&self) -> &[Version] {
        &self.versions
    }

    pub fn len(&self) -> usize {
        self.versions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }
}
