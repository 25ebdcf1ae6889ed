//! Unit tests for the monitor aggregate.

use super::{FailingWriter, FixedGauges, LowGauges, SharedBuffer, memory_only, run_ticks, running};
use crate::*;
use core::time::Duration;
use parking_lot::Mutex;
use std::sync::Arc;

const TICK: Duration = Duration::from_millis(100);

fn messages(monitor: &MonitorCore) -> Vec<String> {
    monitor
        .event_log()
        .iter()
        .map(|e| e.message().to_string())
        .collect()
}

#[test]
fn test_start_logs_lifecycle_entries() -> MonitorResult<()> {
    let monitor = running(memory_only())?;
    assert_eq!(monitor.state(), SystemState::Running);
    assert_eq!(
        messages(&monitor),
        vec![
            "Debug monitoring system initialized",
            "System transitioned to RUNNING state"
        ]
    );
    assert!(!monitor.has_sink());
    Ok(())
}

#[test]
fn test_critical_append_while_running() -> MonitorResult<()> {
    let mut monitor = running(memory_only())?;
    let before_log = monitor.event_log().len();
    let before_faults = monitor.health().fault_count;

    monitor.append(
        Severity::Critical,
        ErrorCode::MemoryCorruption,
        "heap canary overwritten",
        "test",
        1,
    );

    assert_eq!(monitor.state(), SystemState::Fault);
    assert_eq!(monitor.health().fault_count, before_faults + 1);
    assert_eq!(monitor.event_log().len(), before_log + 2);

    let newest = monitor.event_log().newest();
    assert_eq!(newest.map(LogEntry::message), Some("System entered fault state"));
    assert_eq!(newest.map(LogEntry::severity), Some(Severity::Warning));
    assert_eq!(newest.map(LogEntry::code), Some(ErrorCode::MemoryCorruption));
    Ok(())
}

#[test]
fn test_error_while_faulted_does_not_re_escalate() -> MonitorResult<()> {
    let mut monitor = running(memory_only())?;
    monitor.append(Severity::Error, ErrorCode::SensorFailure, "first", "test", 1);
    let len = monitor.event_log().len();

    monitor.append(Severity::Error, ErrorCode::SensorFailure, "second", "test", 2);

    assert_eq!(monitor.state(), SystemState::Fault);
    assert_eq!(monitor.health().fault_count, 2);
    assert_eq!(monitor.event_log().len(), len + 1);
    Ok(())
}

#[test]
fn test_error_before_start_counts_without_escalating() -> MonitorResult<()> {
    let mut monitor = MonitorCore::new(memory_only())?;
    monitor.append(Severity::Error, ErrorCode::FileIoError, "early", "test", 1);
    assert_eq!(monitor.state(), SystemState::Init);
    assert_eq!(monitor.health().fault_count, 1);
    assert_eq!(monitor.event_log().len(), 1);
    Ok(())
}

#[test]
fn test_warning_does_not_escalate() -> MonitorResult<()> {
    let mut monitor = running(memory_only())?;
    monitor.append(Severity::Warning, ErrorCode::PowerFluctuation, "sag", "test", 1);
    assert_eq!(monitor.state(), SystemState::Running);
    assert_eq!(monitor.health().fault_count, 0);
    Ok(())
}

#[test]
fn test_mirror_receives_warning_and_above() -> MonitorResult<()> {
    let mirrored = Arc::new(Mutex::new(Vec::new()));
    let mut monitor = MonitorCore::new(memory_only())?.with_gauges(LowGauges);
    let sink = Arc::clone(&mirrored);
    monitor.add_mirror_callback(move |entry| sink.lock().push(entry.to_string()));
    monitor.start()?;

    monitor.append(Severity::Debug, ErrorCode::None, "debug", "test", 1);
    monitor.append(Severity::Info, ErrorCode::None, "info", "test", 2);
    monitor.append(Severity::Warning, ErrorCode::None, "warn", "test", 3);
    monitor.append(Severity::Error, ErrorCode::ActuatorStuck, "error", "test", 4);

    let mirrored = mirrored.lock().clone();
    assert_eq!(mirrored.len(), 3);
    assert_eq!(mirrored.first().map(String::as_str), Some("[WARN] test:3 - warn"));
    assert_eq!(mirrored.get(1).map(String::as_str), Some("[ERROR] test:4 - error"));
    assert!(
        mirrored
            .get(2)
            .is_some_and(|line| line.starts_with("[WARN]") && line.ends_with("System entered fault state"))
    );
    Ok(())
}

#[test]
fn test_event_log_evicts_oldest() -> MonitorResult<()> {
    let config = MonitorConfig {
        event_log_capacity: 5,
        ..memory_only()
    };
    let mut monitor = running(config)?;
    for n in 0..10u32 {
        monitor.append(Severity::Info, ErrorCode::None, &format!("entry {n}"), "test", n);
    }
    assert_eq!(monitor.event_log().len(), 5);
    assert_eq!(
        messages(&monitor),
        vec!["entry 5", "entry 6", "entry 7", "entry 8", "entry 9"]
    );
    assert_eq!(monitor.event_log().evicted(), 7);
    Ok(())
}

#[test]
fn test_inject_records_fault_and_logs() -> MonitorResult<()> {
    let mut monitor = running(memory_only())?;
    assert!(monitor.inject(FaultKind::CommBreak)?);

    assert!(monitor.is_fault_injection_enabled());
    assert_eq!(monitor.active_fault(), Some(FaultKind::CommBreak));
    assert_eq!(monitor.fault_history().len(), 1);
    assert_eq!(monitor.fault_history().unresolved(), 1);
    assert_eq!(
        monitor.event_log().newest().map(LogEntry::message),
        Some("Fault injection activated: Communication break")
    );
    assert_eq!(monitor.state(), SystemState::Running);
    Ok(())
}

#[test]
fn test_fifty_first_injection_is_dropped() -> MonitorResult<()> {
    let mut monitor = running(memory_only())?;
    for _ in 0..FAULT_HISTORY_CAPACITY {
        assert!(monitor.inject(FaultKind::SensorNoise)?);
    }

    let recorded = monitor.inject(FaultKind::MemoryLeak)?;

    assert!(!recorded);
    assert_eq!(monitor.active_fault(), Some(FaultKind::MemoryLeak));
    assert_eq!(monitor.fault_history().len(), FAULT_HISTORY_CAPACITY);
    assert_eq!(monitor.fault_history().dropped(), 1);
    assert_eq!(
        monitor.event_log().newest().map(LogEntry::message),
        Some("Fault injection activated: Memory leak")
    );
    Ok(())
}

#[test]
fn test_actuator_effect_on_twentieth_tick() -> MonitorResult<()> {
    let mut monitor = running(memory_only())?;
    monitor.inject(FaultKind::ActuatorFail)?;

    run_ticks(&mut monitor, 19, TICK);
    assert_eq!(monitor.state(), SystemState::Running);
    let stuck = |m: &MonitorCore| {
        m.event_log()
            .iter()
            .filter(|e| e.code() == ErrorCode::ActuatorStuck && e.severity() == Severity::Error)
            .count()
    };
    assert_eq!(stuck(&monitor), 0);

    monitor.advance(TICK);
    let summary = monitor.tick();

    assert_eq!(summary.fault_effect, Some(FaultKind::ActuatorFail));
    assert_eq!(stuck(&monitor), 1);
    assert_eq!(monitor.state(), SystemState::Fault);
    assert_eq!(monitor.injector().invocations(FaultKind::ActuatorFail), 5);
    Ok(())
}

#[test]
fn test_warning_effects_do_not_escalate() -> MonitorResult<()> {
    let mut monitor = running(memory_only())?;
    monitor.inject(FaultKind::PowerSpike)?;
    run_ticks(&mut monitor, 40, TICK);

    let effects = monitor
        .event_log()
        .iter()
        .filter(|e| e.message() == "Power fluctuation simulation active")
        .count();
    assert_eq!(effects, 2);
    assert_eq!(monitor.state(), SystemState::Running);
    Ok(())
}

#[test]
fn test_watchdog_fires_twice_in_twelve_seconds() -> MonitorResult<()> {
    let mut monitor = running(memory_only())?;
    run_ticks(&mut monitor, 120, TICK);

    let timeouts = monitor
        .event_log()
        .iter()
        .filter(|e| e.code() == ErrorCode::WatchdogTimeout && e.severity() == Severity::Critical)
        .count();
    assert_eq!(timeouts, 2);
    assert_eq!(monitor.health().uptime_seconds, 12);
    Ok(())
}

#[test]
fn test_fed_watchdog_stays_quiet() -> MonitorResult<()> {
    let mut monitor = running(memory_only())?;
    for _ in 0..120 {
        monitor.advance(TICK);
        monitor.feed_watchdog();
        monitor.tick();
    }
    assert_eq!(monitor.health_tracker().watchdog().timeouts(), 0);
    assert_eq!(monitor.state(), SystemState::Running);
    Ok(())
}

#[test]
fn test_overload_gauges_escalate() -> MonitorResult<()> {
    let mut monitor = MonitorCore::new(memory_only())?.with_gauges(FixedGauges::new(95.0, 40.0));
    monitor.start()?;
    monitor.advance(TICK);
    let summary = monitor.tick();

    assert_eq!(summary.health_findings, 1);
    assert_eq!(monitor.state(), SystemState::Fault);
    assert!(
        monitor
            .event_log()
            .iter()
            .any(|e| e.code() == ErrorCode::SystemOverload && e.message() == "CPU usage critical")
    );
    Ok(())
}

#[test]
fn test_tick_before_start_is_skipped() -> MonitorResult<()> {
    let mut monitor = MonitorCore::new(memory_only())?.with_gauges(LowGauges);
    monitor.advance(Duration::from_secs(30));
    let summary = monitor.tick();
    assert!(!summary.ran);
    assert!(monitor.event_log().is_empty());
    Ok(())
}

#[test]
fn test_time_never_moves_backwards() -> MonitorResult<()> {
    let mut monitor = MonitorCore::new(memory_only())?;
    monitor.update_time(Duration::from_secs(5));
    monitor.update_time(Duration::from_secs(3));
    assert_eq!(monitor.now(), Duration::from_secs(5));
    Ok(())
}

#[test]
fn test_expect_state() -> MonitorResult<()> {
    let mut monitor = running(memory_only())?;
    monitor.expect_state(SystemState::Running)?;

    let err = monitor.expect_state(SystemState::Recovery).err();
    assert!(matches!(
        err,
        Some(MonitorError::StateAssertion {
            expected: SystemState::Recovery,
            actual: SystemState::Running
        })
    ));
    assert!(monitor.event_log().iter().any(|e| {
        e.code() == ErrorCode::InvalidState && e.message() == "Expected state RECOVERY, got RUNNING"
    }));
    assert_eq!(monitor.state(), SystemState::Fault);
    Ok(())
}

#[test]
fn test_sink_receives_session() -> MonitorResult<()> {
    let buffer = SharedBuffer::default();
    let mut monitor = MonitorCore::new(memory_only())?.with_gauges(LowGauges);
    monitor.attach_sink(TextSink::new(buffer.clone()));
    monitor.start()?;
    monitor.advance(Duration::from_millis(1_500));
    monitor.append(Severity::Warning, ErrorCode::PowerFluctuation, "sag", "psu", 12);
    assert_eq!(monitor.shutdown()?, ShutdownOutcome::Clean);
    assert!(!monitor.has_sink());

    let text = buffer.contents();
    let lines: Vec<&str> = text.lines().collect();
    assert!(lines.first().is_some_and(|l| l.starts_with("=== Log Session Start ")));
    assert!(lines.last().is_some_and(|l| l.starts_with("=== Log Session End ")));
    assert!(lines.contains(&"[1.500s] WARN psu:12 [power fluctuation] - sag"));
    assert!(
        lines
            .iter()
            .any(|l| l.ends_with("[none] - Shutting down debug monitoring system"))
    );
    Ok(())
}

#[test]
fn test_sink_write_failures_are_counted() -> MonitorResult<()> {
    let mut monitor = MonitorCore::new(memory_only())?.with_gauges(LowGauges);
    monitor.attach_sink(TextSink::new(FailingWriter));
    monitor.start()?;

    // start marker plus two lifecycle entries
    assert_eq!(monitor.sink_write_failures(), 3);
    assert_eq!(monitor.event_log().len(), 2);
    assert_eq!(monitor.state(), SystemState::Running);

    assert_eq!(monitor.shutdown()?, ShutdownOutcome::Clean);
    assert!(monitor.event_log().iter().any(|e| {
        e.code() == ErrorCode::FileIoError && e.message().starts_with("Error writing to log file")
    }));
    Ok(())
}

#[test]
fn test_unopenable_sink_degrades_once() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let config = MonitorConfig {
        sink_path: Some(dir.path().join("missing").join("debug.log")),
        ..MonitorConfig::default()
    };
    let mut monitor = MonitorCore::new(config)?.with_gauges(LowGauges);

    assert!(!monitor.open_sink());
    assert!(!monitor.open_sink());
    assert!(monitor.is_sink_degraded());

    let warnings = monitor
        .event_log()
        .iter()
        .filter(|e| e.code() == ErrorCode::FileIoError && e.severity() == Severity::Warning)
        .count();
    assert_eq!(warnings, 1);

    monitor.start()?;
    assert_eq!(monitor.shutdown()?, ShutdownOutcome::Clean);
    assert_eq!(
        monitor.event_log().newest().map(LogEntry::message),
        Some("Log file not available")
    );
    Ok(())
}

#[test]
fn test_open_appends_to_file() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("system_debug.log");
    let config = MonitorConfig {
        sink_path: Some(path.clone()),
        ..MonitorConfig::default()
    };

    for _ in 0..2 {
        let mut monitor = MonitorCore::open(config.clone())?;
        monitor.shutdown()?;
    }

    let text = std::fs::read_to_string(&path)?;
    assert_eq!(text.matches("=== Log Session Start").count(), 2);
    assert_eq!(text.matches("=== Log Session End").count(), 2);
    Ok(())
}

#[test]
fn test_drop_closes_session() -> MonitorResult<()> {
    let buffer = SharedBuffer::default();
    {
        let mut monitor = MonitorCore::new(memory_only())?;
        monitor.attach_sink(TextSink::new(buffer.clone()));
        monitor.start()?;
    }
    assert_eq!(buffer.contents().matches("=== Log Session End").count(), 1);
    Ok(())
}

#[test]
fn test_shutdown_from_fault_is_unresolved() -> MonitorResult<()> {
    let mut monitor = running(memory_only())?;
    monitor.append(Severity::Error, ErrorCode::CommunicationLost, "link down", "test", 1);

    assert_eq!(monitor.shutdown()?, ShutdownOutcome::UnresolvedFault);
    assert_eq!(monitor.state(), SystemState::Shutdown);
    assert!(monitor.event_log().iter().any(|e| {
        e.severity() == Severity::Critical
            && e.code() == ErrorCode::InvalidState
            && e.message() == "System shutdown with unresolved faults"
    }));
    Ok(())
}

#[test]
fn test_operations_after_shutdown() -> MonitorResult<()> {
    let mut monitor = running(memory_only())?;
    monitor.shutdown()?;

    assert!(matches!(monitor.shutdown(), Err(MonitorError::ShutDown)));
    assert!(matches!(
        monitor.inject(FaultKind::SensorNoise),
        Err(MonitorError::ShutDown)
    ));
    assert!(matches!(monitor.attempt_recovery(), Err(MonitorError::ShutDown)));
    assert!(matches!(monitor.start(), Err(MonitorError::ShutDown)));

    let len = monitor.event_log().len();
    monitor.advance(Duration::from_secs(10));
    assert!(!monitor.tick().ran);
    assert_eq!(monitor.event_log().len(), len);
    Ok(())
}

#[test]
fn test_report_contents() -> MonitorResult<()> {
    let mut monitor = running(memory_only())?;
    monitor.inject(FaultKind::SensorNoise)?;
    monitor.inject(FaultKind::PowerSpike)?;

    let report = monitor.report();
    assert_eq!(report.state, SystemState::Running);
    assert_eq!(report.faults.len(), 2);
    assert_eq!(report.unresolved_faults(), 2);
    assert_eq!(report.recent_entries.len(), 4);
    assert_eq!(report.active_fault, Some(FaultKind::PowerSpike));
    assert!(report.fault_injection_enabled);

    let text = report.to_string();
    assert!(text.contains("System State: RUNNING"));
    assert!(text.contains("  ACTIVE: Injected fault: Sensor noise"));
    assert!(text.contains("Active Fault: Power spike"));
    Ok(())
}

#[test]
fn test_report_recent_entries_limit() -> MonitorResult<()> {
    let mut monitor = running(memory_only())?;
    for n in 0..10u32 {
        monitor.append(Severity::Info, ErrorCode::None, &format!("n{n}"), "test", n);
    }
    let recent: Vec<String> = monitor
        .report()
        .recent_entries
        .iter()
        .map(|e| e.message().to_string())
        .collect();
    assert_eq!(recent, vec!["n5", "n6", "n7", "n8", "n9"]);
    Ok(())
}

#[test]
fn test_report_snapshot_after_recovery() -> MonitorResult<()> {
    let config = MonitorConfig {
        recovery_hold_ms: 0,
        ..memory_only()
    };
    let mut monitor = running(config)?;
    monitor.inject(FaultKind::ActuatorFail)?;
    run_ticks(&mut monitor, 20, TICK);
    monitor.attempt_recovery()?;

    insta::assert_snapshot!(monitor.report().to_string(), @r"
    === Debug Information ===
    System State: RUNNING
    Uptime: 2 seconds
    Fault Count: 1
    Recovery Count: 1
    CPU Usage: 15.0%
    Memory Usage: 25.0%
    Active Fault: none

    Recent Log Entries:
      [ERR] Actuator failure simulation active
      [WRN] System entered fault state
      [INF] Attempting fault recovery
      [INF] Fault 1 resolved in recovery attempt
      [INF] Fault recovery successful

    Fault History:
      RESOLVED: Injected fault: Actuator failure
    ");
    Ok(())
}

#[test]
fn test_report_serializes() -> Result<(), Box<dyn std::error::Error>> {
    let mut monitor = running(memory_only())?;
    monitor.inject(FaultKind::CommBreak)?;
    let json = serde_json::to_value(monitor.report())?;
    assert_eq!(json["state"], "Running");
    assert_eq!(json["active_fault"], "CommBreak");
    assert_eq!(json["faults"][0]["resolved"], false);
    Ok(())
}

#[test]
fn test_collaborators_drive_through_port() -> MonitorResult<()> {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    let mut monitor = running(memory_only())?;
    let mut rng = StdRng::seed_from_u64(5);
    let mut power = PowerMonitorSim::default();
    monitor.inject(FaultKind::PowerSpike)?;

    let before = monitor.event_log().len();
    for _ in 0..200 {
        power.update(&mut monitor, &mut rng);
    }
    let reported = monitor
        .event_log()
        .iter()
        .skip(before)
        .filter(|e| e.code() == ErrorCode::PowerFluctuation)
        .count();
    assert!(reported > 0);
    assert_eq!(monitor.state(), SystemState::Running);
    Ok(())
}
