// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 apiflow contributors

//! Editing commands - add, connect and configure nodes

use colored::Colorize;
use miette::Result;
use std::path::PathBuf;

use super::{known_kinds, load_flow, parse_assignment};
use crate::flow::{ConnectOutcome, NodeKind, Position};
use crate::workspace::Workspace;

/// Add a node from its type's template
pub async fn add(
    flow_path: PathBuf,
    kind: NodeKind,
    label: Option<String>,
    set: Vec<String>,
    position: Position,
    verbose: bool,
) -> Result<()> {
    let assignments = set
        .iter()
        .map(|s| parse_assignment(s))
        .collect::<Result<Vec<_>, _>>()?;

    let mut workspace = Workspace::new(load_flow(&flow_path)?);

    if !kind.is_known() {
        println!(
            "  {} '{}' is not a known node type ({}); it will pass data through unchanged",
            "⚠".yellow(),
            kind,
            known_kinds()
        );
    }

    let id = workspace.add_node(kind, position);
    if let Some(label) = label {
        workspace.set_label(&id, &label)?;
    }
    for (key, value) in &assignments {
        workspace.set_config(&id, key, value)?;
    }

    if verbose {
        if let Some(node) = workspace.debug_info().get(&id) {
            for (key, value) in &node.config {
                println!("    {} = {}", key, value.dimmed());
            }
        }
    }

    workspace.into_flow().save(&flow_path)?;
    println!("  {} Added {}", "✓".green(), id.cyan());

    Ok(())
}

/// Propose a connection; a declined one leaves the file untouched
pub async fn connect(flow_path: PathBuf, from: String, to: String, verbose: bool) -> Result<()> {
    let mut workspace = Workspace::new(load_flow(&flow_path)?);

    match workspace.connect(&from, &to) {
        ConnectOutcome::Added(id) => {
            if verbose {
                if let Some(run) = workspace.report().and_then(|r| r.get(&to)) {
                    println!("    {}: {}", to, run.log.dimmed());
                }
            }
            workspace.into_flow().save(&flow_path)?;
            println!("  {} Connected {} → {} ({})", "✓".green(), from, to, id);
        }
        ConnectOutcome::Rejected(reason) => {
            println!(
                "  {} Connection {} → {} declined: {}",
                "✗".red(),
                from,
                to,
                reason
            );
        }
    }

    Ok(())
}

/// Set configuration entries on one node
pub async fn configure(
    flow_path: PathBuf,
    node: String,
    entries: Vec<String>,
    verbose: bool,
) -> Result<()> {
    let assignments = entries
        .iter()
        .map(|s| parse_assignment(s))
        .collect::<Result<Vec<_>, _>>()?;

    let mut workspace = Workspace::new(load_flow(&flow_path)?);

    for (key, value) in &assignments {
        workspace.set_config(&node, key, value)?;
        if verbose {
            println!("    {} = {}", key, value.dimmed());
        }
    }

    workspace.into_flow().save(&flow_path)?;
    println!(
        "  {} Updated {} ({} entr{})",
        "✓".green(),
        node.cyan(),
        assignments.len(),
        if assignments.len() == 1 { "y" } else { "ies" }
    );

    Ok(())
}
