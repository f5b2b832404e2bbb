// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 apiflow contributors

//! Validate command - check the flow file

use colored::Colorize;
use miette::Result;
use std::path::PathBuf;

use super::load_flow;
use crate::errors::RecoverySuggestion;
use crate::flow::{FlowDag, FlowValidator};
use crate::utils::print_section;

/// Run the validate command
pub async fn run(flow_path: PathBuf, verbose: bool) -> Result<()> {
    println!("{}", "Validating flow...".bold());
    println!();

    let flow = match load_flow(&flow_path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("  {} Failed to parse flow", "✗".red());
            eprintln!();
            return Err(e);
        }
    };

    println!("  {} Flow file parsed", "✓".green());

    let validation = FlowValidator::validate(&flow);

    if !validation.errors.is_empty() {
        println!();
        println!("{}:", "Errors".red().bold());
        for error in &validation.errors {
            println!("  {} {}", "✗".red(), error);
        }

        if let Some(cycle) = FlowDag::build(&flow).find_cycle() {
            println!();
            println!(
                "{}",
                RecoverySuggestion::fix_circular_connection(&cycle)
                    .to_string()
                    .dimmed()
            );
        }
    }

    if !validation.warnings.is_empty() {
        println!();
        println!("{}:", "Warnings".yellow().bold());
        for warning in &validation.warnings {
            println!("  {} {}", "⚠".yellow(), warning);
        }
    }

    if verbose {
        print_section("Flow summary");
        println!("  Name: {}", flow.name);
        println!("  Nodes: {}", flow.nodes.len());
        for node in &flow.nodes {
            let targets = if node.connections.is_empty() {
                String::new()
            } else {
                format!(" [feeds: {}]", node.connections.join(", "))
            };
            println!("    - {} ({}){}", node.id, node.kind, targets.dimmed());
        }
    }

    println!();

    if !validation.is_valid() {
        return Err(miette::miette!("Flow validation failed"));
    }

    if validation.has_warnings() {
        println!("{}", "Flow is valid but has warnings.".yellow().bold());
    } else {
        println!("{}", "Flow is valid!".green().bold());
    }
    Ok(())
}
