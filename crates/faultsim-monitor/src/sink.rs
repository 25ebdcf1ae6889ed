//! Append-mode text sink for the diagnostic log.
//!
//! A session is framed by start and end markers:
//!
//! ```text
//! === Log Session Start 2026-01-01T00:00:00+00:00 ===
//! [1.250s] ERROR faultsim_monitor::monitor:88 [actuator stuck] - Actuator failure simulation active
//! === Log Session End 2026-01-01T00:00:09+00:00 ===
//! ```

use crate::LogEntry;
use chrono::{DateTime, SecondsFormat, Utc};
use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Destination for diagnostic log entries.
pub trait LogSink: Send {
    /// Write the session start marker.
    fn begin_session(&mut self, at: DateTime<Utc>) -> io::Result<()>;

    /// Write one entry.
    fn write_entry(&mut self, entry: &LogEntry) -> io::Result<()>;

    /// Write the session end marker and flush.
    fn end_session(&mut self, at: DateTime<Utc>) -> io::Result<()>;
}

/// Line-oriented text sink over any writer.
pub struct TextSink<W: Write + Send> {
    writer: W,
    entries_written: u64,
}

impl TextSink<BufWriter<File>> {
    /// Open `path` in append mode, creating it if needed.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error if the file cannot be opened.
    pub fn open_append(path: impl AsRef<Path>) -> io::Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path.as_ref())?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write + Send> TextSink<W> {
    /// Wrap a writer.
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            entries_written: 0,
        }
    }

    /// Number of entries written successfully.
    pub fn entries_written(&self) -> u64 {
        self.entries_written
    }

    /// Unwrap the inner writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write + Send> fmt::Debug for TextSink<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextSink")
            .field("entries_written", &self.entries_written)
            .finish_non_exhaustive()
    }
}

/// Format an entry as one sink line, without the trailing newline.
pub fn format_entry(entry: &LogEntry) -> String {
    let ts = entry.timestamp();
    format!(
        "[{}.{:03}s] {} {}:{} [{}] - {}",
        ts.as_secs(),
        ts.subsec_millis(),
        entry.severity().label(),
        entry.origin(),
        entry.line(),
        entry.code(),
        entry.message()
    )
}

fn marker(kind: &str, at: DateTime<Utc>) -> String {
    format!(
        "=== Log Session {kind} {} ===",
        at.to_rfc3339_opts(SecondsFormat::Secs, false)
    )
}

impl<W: Write + Send> LogSink for TextSink<W> {
    fn begin_session(&mut self, at: DateTime<Utc>) -> io::Result<()> {
        writeln!(self.writer, "{}", marker("Start", at))?;
        self.writer.flush()
    }

    fn write_entry(&mut self, entry: &LogEntry) -> io::Result<()> {
        writeln!(self.writer, "{}", format_entry(entry))?;
        self.writer.flush()?;
        self.entries_written = self.entries_written.saturating_add(1);
        Ok(())
    }

    fn end_session(&mut self, at: DateTime<Utc>) -> io::Result<()> {
        writeln!(self.writer, "{}", marker("End", at))?;
        self.writer.flush()
    }
}
