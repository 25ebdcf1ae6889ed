//! Recovery from the fault state.
//!
//! Recovery does not block the caller. Starting a recovery arms a resume
//! deadline; the monitor tick polls the deadline and completes the recovery
//! once it has elapsed, so the control loop keeps running while the system
//! holds in [`SystemState::Recovery`](crate::SystemState::Recovery).

use crate::SystemState;
use core::time::Duration;
use serde::{Deserialize, Serialize};

/// Default time the system holds in recovery before resuming.
pub const DEFAULT_RECOVERY_HOLD: Duration = Duration::from_secs(2);

/// Recovery engine status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecoveryStatus {
    /// No recovery running.
    Idle,
    /// Waiting for the resume deadline.
    InProgress,
}

/// Result of a recovery request or a completed recovery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecoveryOutcome {
    /// The system was not in the fault state; nothing changed.
    NothingToRecover {
        /// State the system was in.
        state: SystemState,
    },
    /// Recovery started; the system resumes at `resume_at`.
    InProgress {
        /// Monitor time at which the system resumes.
        resume_at: Duration,
    },
    /// Recovery finished and the system is running again.
    Completed {
        /// Number of fault records resolved by this recovery.
        resolved: usize,
    },
}

impl RecoveryOutcome {
    /// Check if the system is back to running.
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }
}

/// Deadline-driven recovery engine.
#[derive(Debug, Clone)]
pub struct RecoveryEngine {
    hold: Duration,
    started_at: Option<Duration>,
    resume_at: Option<Duration>,
    resolved: usize,
    completed: u32,
}

impl Default for RecoveryEngine {
    fn default() -> Self {
        Self::new(DEFAULT_RECOVERY_HOLD)
    }
}

impl RecoveryEngine {
    /// Create an idle engine with the given hold time.
    pub fn new(hold: Duration) -> Self {
        Self {
            hold,
            started_at: None,
            resume_at: None,
            resolved: 0,
            completed: 0,
        }
    }

    /// Start a recovery at `now` that resolved `resolved` fault records.
    ///
    /// Returns the resume deadline. Starting while a recovery is already
    /// pending restarts the hold.
    pub fn begin(&mut self, now: Duration, resolved: usize) -> Duration {
        let resume_at = now.saturating_add(self.hold);
        self.started_at = Some(now);
        self.resume_at = Some(resume_at);
        self.resolved = resolved;
        resume_at
    }

    /// Check the deadline at `now`.
    ///
    /// Returns [`RecoveryOutcome::Completed`] exactly once, on the first poll
    /// at or after the deadline.
    pub fn poll(&mut self, now: Duration) -> Option<RecoveryOutcome> {
        let resume_at = self.resume_at?;
        if now < resume_at {
            return None;
        }
        self.started_at = None;
        self.resume_at = None;
        self.completed = self.completed.saturating_add(1);
        Some(RecoveryOutcome::Completed {
            resolved: core::mem::take(&mut self.resolved),
        })
    }

    /// Current status.
    pub fn status(&self) -> RecoveryStatus {
        if self.resume_at.is_some() {
            RecoveryStatus::InProgress
        } else {
            RecoveryStatus::Idle
        }
    }

    /// Check if a recovery is waiting for its deadline.
    pub fn is_pending(&self) -> bool {
        self.resume_at.is_some()
    }

    /// Resume deadline of the pending recovery.
    pub fn resume_at(&self) -> Option<Duration> {
        self.resume_at
    }

    /// Time spent in the pending recovery so far.
    pub fn elapsed(&self, now: Duration) -> Option<Duration> {
        self.started_at.map(|start| now.saturating_sub(start))
    }

    /// Hold time applied to each recovery.
    pub fn hold(&self) -> Duration {
        self.hold
    }

    /// Number of recoveries completed.
    pub fn completed(&self) -> u32 {
        self.completed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_starts_idle() {
        let mut engine = RecoveryEngine::default();
        assert_eq!(engine.status(), RecoveryStatus::Idle);
        assert_eq!(engine.hold(), DEFAULT_RECOVERY_HOLD);
        assert!(engine.poll(Duration::from_secs(100)).is_none());
    }

    #[test]
    fn test_begin_arms_deadline() {
        let mut engine = RecoveryEngine::new(Duration::from_secs(2));
        let resume_at = engine.begin(Duration::from_secs(10), 3);
        assert_eq!(resume_at, Duration::from_secs(12));
        assert!(engine.is_pending());
        assert_eq!(engine.resume_at(), Some(Duration::from_secs(12)));
        assert_eq!(
            engine.elapsed(Duration::from_millis(10_500)),
            Some(Duration::from_millis(500))
        );
    }

    #[test]
    fn test_poll_completes_once_at_deadline() {
        let mut engine = RecoveryEngine::new(Duration::from_secs(2));
        engine.begin(Duration::ZERO, 2);

        assert!(engine.poll(Duration::from_millis(1_999)).is_none());
        assert_eq!(
            engine.poll(Duration::from_secs(2)),
            Some(RecoveryOutcome::Completed { resolved: 2 })
        );
        assert!(engine.poll(Duration::from_secs(3)).is_none());
        assert_eq!(engine.status(), RecoveryStatus::Idle);
        assert_eq!(engine.completed(), 1);
    }

    #[test]
    fn test_zero_hold_completes_on_first_poll() {
        let mut engine = RecoveryEngine::new(Duration::ZERO);
        let now = Duration::from_secs(5);
        engine.begin(now, 0);
        assert!(engine.poll(now).is_some_and(|o| o.is_completed()));
    }

    #[test]
    fn test_begin_while_pending_restarts_hold() {
        let mut engine = RecoveryEngine::new(Duration::from_secs(2));
        engine.begin(Duration::ZERO, 1);
        engine.begin(Duration::from_secs(1), 0);
        assert!(engine.poll(Duration::from_secs(2)).is_none());
        assert!(engine.poll(Duration::from_secs(3)).is_some());
    }
}
