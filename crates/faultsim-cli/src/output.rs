//! Output formatting for operator-facing messages

use anyhow::Error;
use colored::*;
use faultsim_monitor::{
    DiagnosticReport, FaultKind, LogEntry, RecoveryOutcome, Severity, ShutdownOutcome,
};
use serde_json::json;

use crate::error::CliError;

/// Print error in JSON format
pub fn print_error_json(error: &Error) {
    let error_json = json!({
        "success": false,
        "error": {
            "message": error.to_string(),
            "type": error_type_name(error)
        }
    });
    match serde_json::to_string_pretty(&error_json) {
        Ok(s) => println!("{s}"),
        Err(e) => eprintln!("Failed to format error as JSON: {e}"),
    }
}

/// Print error in human-readable format
pub fn print_error_human(error: &Error) {
    eprintln!("{} {}", "Error:".red().bold(), error);

    let mut source = error.source();
    while let Some(err) = source {
        eprintln!("  {} {}", "Caused by:".yellow(), err);
        source = err.source();
    }
}

/// Print the diagnostic report
pub fn print_report(report: &DiagnosticReport, json: bool) {
    if json {
        let output = json!({
            "success": true,
            "report": report
        });
        match serde_json::to_string(&output) {
            Ok(s) => println!("{s}"),
            Err(e) => eprintln!("Failed to format report as JSON: {e}"),
        }
    } else {
        print!("{report}");
    }
}

/// Print an operator-visible log entry
pub fn print_mirrored(entry: &LogEntry) {
    let label = entry.severity().label();
    let label = match entry.severity() {
        Severity::Critical => label.red().bold(),
        Severity::Error => label.red(),
        Severity::Warning => label.yellow(),
        Severity::Info | Severity::Debug => label.normal(),
    };
    eprintln!(
        "{} {} {}",
        format!("[{:>8.3}s]", entry.timestamp().as_secs_f64()).dimmed(),
        label,
        entry.message()
    );
}

/// Print an operator-visible log entry as one JSON line on stdout
pub fn print_mirrored_json(entry: &LogEntry) {
    let output = json!({ "event": entry });
    match serde_json::to_string(&output) {
        Ok(s) => println!("{s}"),
        Err(e) => eprintln!("Failed to format event as JSON: {e}"),
    }
}

/// Print confirmation of an injected fault
pub fn print_injected(kind: FaultKind, recorded: bool, json: bool) {
    if json {
        let output = json!({
            "success": true,
            "injected": kind,
            "recorded": recorded
        });
        println!("{output}");
    } else if recorded {
        println!("{} Injected fault: {}", "⚡".yellow(), kind.to_string().bold());
    } else {
        println!(
            "{} Injected fault: {} (history full, not recorded)",
            "⚡".yellow(),
            kind.to_string().bold()
        );
    }
}

/// Print the result of a recovery request
pub fn print_recovery(outcome: &RecoveryOutcome, json: bool) {
    if json {
        let output = json!({
            "success": outcome.is_completed() || matches!(outcome, RecoveryOutcome::InProgress { .. }),
            "recovery": outcome
        });
        println!("{output}");
        return;
    }
    match outcome {
        RecoveryOutcome::NothingToRecover { state } => {
            println!("{} No faults to recover from (state {state})", "ℹ".cyan());
        }
        RecoveryOutcome::InProgress { resume_at } => {
            println!(
                "{} Recovering, resuming at {:.1}s",
                "↻".yellow(),
                resume_at.as_secs_f64()
            );
        }
        RecoveryOutcome::Completed { resolved } => {
            println!("{} Recovered, {resolved} fault(s) resolved", "✓".green());
        }
    }
}

/// Print the usage hint for an unknown key
pub fn print_usage(usage: &str, json: bool) {
    if json {
        let output = json!({
            "success": false,
            "warning": usage
        });
        println!("{output}");
    } else {
        println!("{} {}", "⚠".yellow(), usage);
    }
}

/// Tell the operator that keyboard input is unavailable
pub fn print_no_terminal() {
    eprintln!(
        "{} stdin is not a terminal, shutting down. Pass --script KEYS to run non-interactively",
        "⚠".yellow()
    );
}

/// Print the final shutdown summary
pub fn print_shutdown(outcome: ShutdownOutcome, report: &DiagnosticReport, json: bool) {
    if json {
        let output = json!({
            "success": outcome.is_clean(),
            "outcome": outcome,
            "report": report
        });
        match serde_json::to_string(&output) {
            Ok(s) => println!("{s}"),
            Err(e) => eprintln!("Failed to format shutdown summary as JSON: {e}"),
        }
        return;
    }
    match outcome {
        ShutdownOutcome::Clean => println!("{} Shut down cleanly", "✓".green()),
        ShutdownOutcome::UnresolvedFault => println!(
            "{} Shut down with {} unresolved fault(s)",
            "✗".red(),
            report.unresolved_faults()
        ),
    }
}

/// Get error type name for JSON output
fn error_type_name(error: &Error) -> &'static str {
    error
        .downcast_ref::<CliError>()
        .map_or("internal", CliError::kind)
}
