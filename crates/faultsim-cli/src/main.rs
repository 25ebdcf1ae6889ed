//! faultsim - fault injection and recovery monitor
//!
//! Runs a simulated control loop under the monitor and takes single-key
//! operator commands: `f` inject a fault, `r` attempt recovery, `d` print
//! diagnostics, `q` shut down.

#![deny(static_mut_refs)]
#![deny(unused_must_use)]
#![deny(clippy::unwrap_used)]

mod config;
mod console;
mod error;
mod output;
mod runner;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use faultsim_monitor::{FaultKind, MonitorCore, RandomGauges, ShutdownOutcome};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::console::{CommandSource, KeyboardCommands, ScriptedCommands};
use crate::error::CliError;
use crate::runner::RunOptions;

#[derive(Parser, Debug)]
#[command(name = "faultsim")]
#[command(about = "Fault injection and recovery monitor for a simulated control loop")]
#[command(version)]
#[command(long_about = "
faultsim runs a simulated control loop (sensor, actuator, communication link,
power monitor) under a monitor that keeps a bounded event log, tracks health,
injects synthetic faults on request and recovers from the fault state.

Keys: f inject fault, r attempt recovery, d diagnostics, q quit.
Use --script to replay keys non-interactively ('.' is an idle tick).
")]
struct Cli {
    /// Monitor configuration file (JSON)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Append the session log to this file
    #[arg(long, value_name = "FILE", conflicts_with = "no_log_file")]
    log_file: Option<PathBuf>,

    /// Do not write a session log file
    #[arg(long)]
    no_log_file: bool,

    /// Control loop period in milliseconds
    #[arg(long, default_value_t = 100, value_parser = clap::value_parser!(u64).range(1..))]
    tick_ms: u64,

    /// Seed for the fault, collaborator and health gauge random streams
    #[arg(long)]
    seed: Option<u64>,

    /// Inject this fault on `f` instead of a random one
    #[arg(long, value_enum)]
    fault_kind: Option<FaultArg>,

    /// Replay these keys instead of reading the keyboard
    #[arg(long, value_name = "KEYS")]
    script: Option<String>,

    /// Advance monitor time by one tick per iteration instead of sleeping
    #[arg(long)]
    simulated_time: bool,

    /// Run without the reference sensor/actuator/comm/power collaborators
    #[arg(long)]
    no_collaborators: bool,

    /// Feed the watchdog at the end of every iteration
    #[arg(long)]
    feed_watchdog: bool,

    /// Output in JSON format for machine parsing
    #[arg(long)]
    json: bool,

    /// Verbose logging
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum FaultArg {
    SensorNoise,
    ActuatorFail,
    CommBreak,
    PowerSpike,
    MemoryLeak,
}

impl From<FaultArg> for FaultKind {
    fn from(arg: FaultArg) -> Self {
        match arg {
            FaultArg::SensorNoise => FaultKind::SensorNoise,
            FaultArg::ActuatorFail => FaultKind::ActuatorFail,
            FaultArg::CommBreak => FaultKind::CommBreak,
            FaultArg::PowerSpike => FaultKind::PowerSpike,
            FaultArg::MemoryLeak => FaultKind::MemoryLeak,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("faultsim={log_level},faultsim_monitor={log_level}").into()
            }),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    match execute(&cli) {
        Ok(ShutdownOutcome::Clean) => ExitCode::SUCCESS,
        Ok(ShutdownOutcome::UnresolvedFault) => {
            ExitCode::from(CliError::UnresolvedFaults.exit_code())
        }
        Err(e) => {
            if cli.json {
                output::print_error_json(&e);
            } else {
                output::print_error_human(&e);
            }

            let exit_code = e.downcast_ref::<CliError>().map_or(1, CliError::exit_code);
            ExitCode::from(exit_code)
        }
    }
}

fn execute(cli: &Cli) -> Result<ShutdownOutcome> {
    let overrides = config::Overrides {
        log_file: cli.log_file.clone(),
        no_log_file: cli.no_log_file,
    };
    let config = config::resolve(cli.config.as_deref(), &overrides)?;

    let mut monitor = MonitorCore::new(config).map_err(CliError::from)?;
    if cli.json {
        monitor.add_mirror_callback(output::print_mirrored_json);
    } else {
        monitor.add_mirror_callback(output::print_mirrored);
    }
    if let Some(seed) = cli.seed {
        monitor.set_gauges(RandomGauges::seeded(seed));
    }
    if monitor.open_sink() {
        tracing::debug!("session log file attached");
    }
    monitor.start().map_err(CliError::from)?;

    let options = RunOptions {
        tick: Duration::from_millis(cli.tick_ms),
        simulated_time: cli.simulated_time,
        seed: cli.seed,
        fault_kind: cli.fault_kind.map(FaultKind::from),
        collaborators: !cli.no_collaborators,
        feed_watchdog: cli.feed_watchdog,
        json: cli.json,
    };

    let mut commands: Box<dyn CommandSource> = match &cli.script {
        Some(script) => Box::new(ScriptedCommands::new(script)),
        None => {
            let keyboard = KeyboardCommands::new();
            if !keyboard.is_interactive() {
                output::print_no_terminal();
            } else if !cli.json {
                println!("Commands: f = inject fault, r = recover, d = diagnostics, q = quit");
            }
            Box::new(keyboard)
        }
    };

    runner::run(&mut monitor, commands.as_mut(), &options)
}
