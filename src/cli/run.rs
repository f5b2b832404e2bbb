// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 apiflow contributors

//! Run command - simulate the flow

use colored::Colorize;
use miette::{IntoDiagnostic, Result};
use std::path::PathBuf;

use super::{load_flow, OutputFormat};
use crate::errors::RecoverySuggestion;
use crate::flow::{Flow, FlowValidator};
use crate::simulator::{SimulationReport, Simulator};
use crate::utils::{print_error, print_header, print_info, print_success, print_warning};

/// Run the simulation
pub async fn run(flow_path: PathBuf, format: OutputFormat, verbose: bool) -> Result<()> {
    let flow = load_flow(&flow_path)?;

    if verbose && format == OutputFormat::Text {
        let validation = FlowValidator::validate(&flow);
        for problem in validation.errors.iter().chain(&validation.warnings) {
            print_warning(problem);
        }
    }

    let report = Simulator::for_flow(&flow).run(&flow);

    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&report).into_diagnostic()?;
            println!("{}", json);
        }
        OutputFormat::Text => print_report(&flow, report.as_ref(), verbose),
    }

    Ok(())
}

/// Print one line per node, in flow order
pub fn print_report(flow: &Flow, report: Option<&SimulationReport>, verbose: bool) {
    print_header(&format!("Flow: {}", flow.name));

    let Some(report) = report else {
        println!("{}", "No start node found".yellow().bold());
        println!();
        println!("{}", RecoverySuggestion::add_start_node().to_string().dimmed());
        return;
    };

    println!("Start nodes: {}", report.start_nodes.join(", "));
    println!();

    for node in &flow.nodes {
        let Some(run) = report.get(&node.id) else {
            continue;
        };

        let line = format!("{} ({}) {}: {}", node.id, node.kind, node.label, run.log);
        if !run.is_connected() {
            print_warning(&line);
        } else if run.ok {
            print_success(&line);
        } else {
            print_error(&line);
        }

        if verbose || !run.variables.is_empty() {
            let variables = serde_json::Value::Object(run.variables.clone());
            println!("      {}", variables.to_string().dimmed());
        }
    }

    let responses: Vec<_> = flow
        .nodes
        .iter()
        .filter_map(|n| report.get(&n.id).map(|run| (n, run)))
        .filter_map(|(n, run)| run.variables.get("status").map(|s| (n, s)))
        .collect();

    if !responses.is_empty() {
        println!();
        for (node, status) in responses {
            print_info(&format!(
                "{} responded {}",
                node.id,
                status.as_str().unwrap_or_default()
            ));
        }
    }
}
