// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 apiflow contributors

//! Flow definitions and graph structure
//!
//! This module defines the node graph of an API pipeline: typed nodes,
//! directed connections, the file format they are stored in, and the
//! structural checks run on them.

mod dag;
mod definition;
mod history;
mod validation;

pub use dag::FlowDag;
pub use definition::*;
pub use history::{Version, VersionHistory};
pub use validation::{FlowValidator, ValidationResult};
