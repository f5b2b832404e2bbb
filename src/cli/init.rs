// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 apiflow contributors

//! Init command - write a sample flow

use colored::Colorize;
use miette::Result;
use std::path::{Path, PathBuf};

use crate::flow::{Flow, NodeKind, Position};

/// Run the init command
pub async fn run(name: Option<String>, flow_path: PathBuf, force: bool, verbose: bool) -> Result<()> {
    let flow_name = name.unwrap_or_else(|| {
        std::env::current_dir()
            .ok()
            .and_then(|p| p.file_name().map(|s| s.to_string_lossy().to_string()))
            .unwrap_or_else(|| "my-flow".to_string())
    });

    println!("{}", "Initializing apiflow flow...".bold());
    println!();

    if flow_path.exists() && !force {
        return Err(miette::miette!(
            "{} already exists. Use --force to overwrite.",
            flow_path.display()
        ));
    }

    let flow = sample_flow(&flow_name)?;
    flow.save(&flow_path)?;

    println!("  {} Created {}", "✓".green(), flow_path.display());

    if verbose {
        for node in &flow.nodes {
            println!("    - {} ({})", node.id, node.kind);
        }
    }

    let file_arg = if flow_path == Path::new(super::DEFAULT_FLOW_FILE) {
        String::new()
    } else {
        format!(" -f {}", flow_path.display())
    };

    println!();
    println!("{}", "Flow initialized!".green().bold());
    println!();
    println!("Next steps:");
    println!("  1. Run {} to simulate it", format!("apiflow run{}", file_arg).cyan());
    println!("  2. Add nodes with {}", format!("apiflow add <type>{}", file_arg).cyan());
    println!(
        "  3. Wire them with {}",
        format!("apiflow connect <from> <to>{}", file_arg).cyan()
    );
    println!();

    Ok(())
}

/// Authentication, transformer, conditional and endpoint, wired in a line
pub fn sample_flow(name: &str) -> Result<Flow> {
    let mut flow = Flow::new(name);
    flow.description = Some("Authenticate, map the user, check the token, respond".to_string());

    let kinds = [
        NodeKind::Auth,
        NodeKind::Transformer,
        NodeKind::Conditional,
        NodeKind::Endpoint,
    ];
    let ids: Vec<String> = kinds
        .into_iter()
        .enumerate()
        .map(|(i, kind)| flow.add_node(kind, Position::new(i as f64 * 220.0, 100.0)))
        .collect();

    flow.set_config(&ids[1], "field", "user")?;
    flow.set_config(&ids[2], "value", crate::simulator::rules::DEFAULT_TOKEN)?;

    for pair in ids.windows(2) {
        if !flow.connect(&pair[0], &pair[1]).is_added() {
            return Err(miette::miette!(
                "Could not connect {} to {}",
                pair[0],
                pair[1]
            ));
        }
    }

    Ok(flow)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulator::Simulator;

    #[test]
    fn test_sample_flow_returns_ok() {
        let flow = sample_flow("demo").unwrap();
        let report = Simulator::for_flow(&flow).run(&flow).unwrap();

        assert_eq!(report.start_nodes, vec!["node-1".to_string()]);
        let end = report.get("node-4").unwrap();
        assert!(end.ok);
        assert_eq!(end.log, "Response returned");
        assert!(report.runs.values().all(|r| r.ok));
    }
}
