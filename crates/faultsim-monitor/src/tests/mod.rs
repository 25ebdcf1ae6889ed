mod unit_tests;

use crate::*;
use parking_lot::Mutex;
use std::io::{self, Write};
use std::sync::Arc;

/// Gauges pinned to the bottom of every band.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct LowGauges;

impl GaugeSource for LowGauges {
    fn sample(&mut self, band: GaugeBand) -> f32 {
        band.min
    }
}

/// Gauges returning fixed CPU and memory readings, alternating.
#[derive(Debug, Clone, Copy)]
pub(crate) struct FixedGauges {
    pub cpu: f32,
    pub memory: f32,
    next_is_cpu: bool,
}

impl FixedGauges {
    pub(crate) fn new(cpu: f32, memory: f32) -> Self {
        Self {
            cpu,
            memory,
            next_is_cpu: true,
        }
    }
}

impl GaugeSource for FixedGauges {
    fn sample(&mut self, _band: GaugeBand) -> f32 {
        let value = if self.next_is_cpu { self.cpu } else { self.memory };
        self.next_is_cpu = !self.next_is_cpu;
        value
    }
}

/// In-memory writer shared between a sink and the test.
#[derive(Debug, Clone, Default)]
pub(crate) struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    pub(crate) fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock()).into_owned()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Writer that always fails.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct FailingWriter;

impl Write for FailingWriter {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::Error::other("disk full"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Err(io::Error::other("disk full"))
    }
}

pub(crate) fn memory_only() -> MonitorConfig {
    MonitorConfig {
        sink_path: None,
        ..MonitorConfig::default()
    }
}

/// A started, memory-only monitor with quiet gauges.
pub(crate) fn running(config: MonitorConfig) -> MonitorResult<MonitorCore> {
    let mut monitor = MonitorCore::new(config)?.with_gauges(LowGauges);
    monitor.start()?;
    Ok(monitor)
}

/// Advance by `step` and tick, `count` times.
pub(crate) fn run_ticks(monitor: &mut MonitorCore, count: usize, step: core::time::Duration) {
    for _ in 0..count {
        monitor.advance(step);
        monitor.tick();
    }
}
