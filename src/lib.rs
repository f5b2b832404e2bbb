// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 apiflow contributors

//! # apiflow - Visual API Pipeline Builder
//!
//! `apiflow` models API pipelines as graphs of typed nodes and simulates
//! how a mock request flows through them.
//!
//! ## Features
//!
//! - **Typed nodes** - authentication, transformers, conditionals and endpoints
//! - **Safe wiring** - connections that would close a cycle are declined
//! - **Live simulation** - every edit re-runs a breadth-first walk of the graph
//! - **Version history** - snapshot and restore the graph
//!
//! ## Quick Start
//!
//! ```bash
//! # Write a sample flow
//! apiflow init my-api
//!
//! # Simulate it
//! apiflow run
//!
//! # Wire in another node
//! apiflow add endpoint --set url=/users
//! apiflow connect node-3 node-5
//! ```

pub mod cli;
pub mod errors;
pub mod flow;
pub mod simulator;
pub mod utils;
pub mod workspace;

// Re-export commonly used types
pub use errors::{FlowError, FlowResult};
pub use flow::{Flow, NodeKind};
pub use simulator::{SimulationReport, Simulator};
pub use workspace::Workspace;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
