// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 apiflow contributors

//! Graph command - visualize the flow as a graph

use miette::Result;
use std::path::PathBuf;

use super::{load_flow, GraphFormat};
use crate::flow::FlowDag;

/// Run the graph command
pub async fn run(flow_path: PathBuf, format: GraphFormat, _verbose: bool) -> Result<()> {
    let flow = load_flow(&flow_path)?;
    let dag = FlowDag::build(&flow);

    let output = match format {
        GraphFormat::Text => dag.to_text(&flow)?,
        GraphFormat::Dot => dag.to_dot(&flow),
        GraphFormat::Mermaid => dag.to_mermaid(&flow),
    };

    println!("{}", output);

    Ok(())
}
