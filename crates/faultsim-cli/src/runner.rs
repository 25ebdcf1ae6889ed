//! The monitor control loop

use anyhow::Result;
use faultsim_monitor::{
    COMMAND_USAGE, Collaborator, FaultKind, MonitorCore, OperatorCommand, ShutdownOutcome,
    default_collaborators, emit_info,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::thread;
use std::time::{Duration, Instant};

use crate::console::{CommandSource, Input};
use crate::error::CliError;
use crate::output;

/// Loop settings taken from the command line.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub tick: Duration,
    pub simulated_time: bool,
    pub seed: Option<u64>,
    pub fault_kind: Option<FaultKind>,
    pub collaborators: bool,
    pub feed_watchdog: bool,
    pub json: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            tick: Duration::from_millis(100),
            simulated_time: false,
            seed: None,
            fault_kind: None,
            collaborators: true,
            feed_watchdog: false,
            json: false,
        }
    }
}

enum Step {
    Continue,
    Stop,
}

/// Run the loop until the operator quits or the command source runs dry,
/// then shut the monitor down.
///
/// Each iteration: health check and fault effects, at most one operator
/// command, collaborator updates, then wait for the next tick.
pub fn run(
    monitor: &mut MonitorCore,
    commands: &mut dyn CommandSource,
    options: &RunOptions,
) -> Result<ShutdownOutcome> {
    let mut rng = options
        .seed
        .map_or_else(StdRng::from_os_rng, StdRng::seed_from_u64);
    let mut collaborators: Vec<Box<dyn Collaborator>> = if options.collaborators {
        default_collaborators()
    } else {
        Vec::new()
    };

    let clock = Instant::now();
    let mut iterations: u64 = 0;
    tracing::info!(
        tick_ms = u64::try_from(options.tick.as_millis()).unwrap_or(u64::MAX),
        simulated = options.simulated_time,
        collaborators = collaborators.len(),
        "control loop started"
    );

    loop {
        if options.simulated_time {
            monitor.advance(options.tick);
        } else {
            monitor.update_time(clock.elapsed());
        }
        monitor.tick();
        iterations = iterations.saturating_add(1);

        let input = commands
            .next_input()
            .map_err(|e| CliError::Terminal(e.to_string()))?;
        if let Step::Stop = handle_input(monitor, input, &mut rng, options)? {
            break;
        }

        for collaborator in &mut collaborators {
            collaborator.update(monitor, &mut rng);
        }
        if options.feed_watchdog {
            monitor.feed_watchdog();
        }

        if !options.simulated_time {
            thread::sleep(options.tick);
        }
    }

    tracing::info!(iterations, "control loop stopped");
    let outcome = monitor.shutdown().map_err(CliError::from)?;
    output::print_shutdown(outcome, &monitor.report(), options.json);
    Ok(outcome)
}

fn handle_input(
    monitor: &mut MonitorCore,
    input: Input,
    rng: &mut StdRng,
    options: &RunOptions,
) -> Result<Step> {
    let key = match input {
        Input::Idle => return Ok(Step::Continue),
        Input::Exhausted => {
            tracing::info!("command source exhausted");
            return Ok(Step::Stop);
        }
        Input::Key(key) => key,
    };

    let Some(command) = OperatorCommand::from_key(key) else {
        output::print_usage(COMMAND_USAGE, options.json);
        return Ok(Step::Continue);
    };
    tracing::debug!(%command, "operator command");

    match command {
        OperatorCommand::InjectFault => {
            let kind = options.fault_kind.unwrap_or_else(|| random_fault(rng));
            let recorded = monitor.inject(kind).map_err(CliError::from)?;
            output::print_injected(kind, recorded, options.json);
        }
        OperatorCommand::AttemptRecovery => {
            let outcome = monitor.attempt_recovery().map_err(CliError::from)?;
            output::print_recovery(&outcome, options.json);
        }
        OperatorCommand::Diagnostics => {
            output::print_report(&monitor.report(), options.json);
        }
        OperatorCommand::Quit => {
            emit_info!(monitor, "User requested system shutdown");
            return Ok(Step::Stop);
        }
    }
    Ok(Step::Continue)
}

fn random_fault(rng: &mut StdRng) -> FaultKind {
    FaultKind::from_index(rng.random_range(0..FaultKind::COUNT)).unwrap_or(FaultKind::SensorNoise)
}
