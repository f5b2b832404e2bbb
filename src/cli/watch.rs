// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 apiflow contributors

//! Watch command - re-simulate the flow on file changes

use colored::Colorize;
use miette::Result;
use notify::RecursiveMode;
use notify_debouncer_mini::{new_debouncer, DebouncedEventKind};
use std::path::{Path, PathBuf};
use std::sync::mpsc::channel;
use std::time::Duration;
use tracing::debug;

use super::run::print_report;
use crate::flow::Flow;
use crate::simulator::Simulator;
use crate::utils::fingerprint;

/// Run the watch command
pub async fn run(flow_path: PathBuf, debounce_ms: u64, verbose: bool) -> Result<()> {
    if !flow_path.exists() {
        return Err(miette::miette!(
            "Flow file not found: {}\n\n\
             Run 'apiflow init' to create one.",
            flow_path.display()
        ));
    }

    println!("{}", "Starting watch mode...".bold());
    println!("Watching {} (debounce: {}ms)", flow_path.display(), debounce_ms);
    println!("Press {} to exit.", "Ctrl+C".cyan());
    println!();

    let (tx, rx) = channel();

    let mut debouncer = new_debouncer(Duration::from_millis(debounce_ms), tx)
        .map_err(|e| miette::miette!("Failed to create file watcher: {}", e))?;

    // Editors often replace the file, so watch its directory
    let directory = match flow_path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    debouncer
        .watcher()
        .watch(&directory, RecursiveMode::NonRecursive)
        .map_err(|e| miette::miette!("Failed to start watching: {}", e))?;

    let mut last = simulate(&flow_path, None, verbose);

    loop {
        match rx.recv() {
            Ok(Ok(events)) => {
                let touched = events
                    .iter()
                    .filter(|e| matches!(e.kind, DebouncedEventKind::Any))
                    .any(|e| is_flow_file(&e.path, &flow_path));

                if touched {
                    last = simulate(&flow_path, last, verbose);
                }
            }
            Ok(Err(e)) => {
                eprintln!("{}: {:?}", "Watch error".red(), e);
            }
            Err(e) => {
                eprintln!("{}: {}", "Channel error".red(), e);
                break;
            }
        }
    }

    Ok(())
}

fn is_flow_file(changed: &Path, flow_path: &Path) -> bool {
    changed.file_name().is_some() && changed.file_name() == flow_path.file_name()
}

/// Re-run the simulation unless the flow's structure is unchanged.
/// Returns the fingerprint to compare the next change against.
fn simulate(flow_path: &Path, previous: Option<String>, verbose: bool) -> Option<String> {
    let flow = match Flow::from_file(flow_path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("{}: {}", "Failed to load flow".red(), e);
            return previous;
        }
    };

    let current = fingerprint(&flow);
    if previous.as_deref() == Some(current.as_str()) {
        debug!(fingerprint = %current, "flow unchanged, skipping simulation");
        return previous;
    }

    if previous.is_some() {
        println!();
        println!("{}", "─".repeat(50).dimmed());
        println!("{}", "Change detected".yellow());
    }

    let start = std::time::Instant::now();
    let report = Simulator::for_flow(&flow).run(&flow);
    print_report(&flow, report.as_ref(), verbose);
    println!();
    println!("{}", format!("Simulated in {:.2}ms", start.elapsed().as_secs_f64() * 1000.0).dimmed());

    Some(current)
}
