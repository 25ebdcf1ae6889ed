//! Synthetic fault injection with counter-based throttling.
//!
//! While armed, the injector runs its effect generator on every
//! `tick_divisor`-th tick. The generator keeps one invocation counter per
//! fault kind and only produces a visible [`FaultEffect`] on every
//! `log_interval`-th invocation. All counters are plain fields, so two
//! injectors never share cadence state.

use crate::{FaultEffect, FaultKind};

/// Default number of ticks between effect generator runs.
pub const DEFAULT_EFFECT_TICK_DIVISOR: u32 = 4;

/// Default number of generator runs between visible effects.
pub const DEFAULT_EFFECT_LOG_INTERVAL: u32 = 5;

/// Fault injector state.
#[derive(Debug, Clone)]
pub struct FaultInjector {
    enabled: bool,
    active: Option<FaultKind>,
    throttle: u32,
    invocations: [u32; FaultKind::COUNT],
    tick_divisor: u32,
    log_interval: u32,
}

impl Default for FaultInjector {
    fn default() -> Self {
        Self::new(DEFAULT_EFFECT_TICK_DIVISOR, DEFAULT_EFFECT_LOG_INTERVAL)
    }
}

impl FaultInjector {
    /// Create a disarmed injector with the given cadence.
    ///
    /// Zero values are raised to one.
    pub fn new(tick_divisor: u32, log_interval: u32) -> Self {
        Self {
            enabled: false,
            active: None,
            throttle: 0,
            invocations: [0; FaultKind::COUNT],
            tick_divisor: tick_divisor.max(1),
            log_interval: log_interval.max(1),
        }
    }

    /// Arm the injector with `kind`, replacing any previously active fault.
    pub fn arm(&mut self, kind: FaultKind) {
        self.enabled = true;
        self.active = Some(kind);
    }

    /// Disarm the injector and clear the active fault.
    pub fn disarm(&mut self) {
        self.enabled = false;
        self.active = None;
    }

    /// Whether fault injection is enabled.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Currently active fault, if any.
    pub fn active(&self) -> Option<FaultKind> {
        self.active
    }

    /// Number of generator invocations so far for `kind`.
    pub fn invocations(&self, kind: FaultKind) -> u32 {
        self.invocations.get(kind.index()).copied().unwrap_or(0)
    }

    /// Number of armed ticks seen by the throttle.
    pub fn throttle_count(&self) -> u32 {
        self.throttle
    }

    /// Advance one tick.
    ///
    /// Returns the effect to log, if this tick produced one.
    pub fn tick(&mut self) -> Option<FaultEffect> {
        if !self.enabled {
            return None;
        }
        let kind = self.active?;

        self.throttle = self.throttle.wrapping_add(1);
        if self.throttle % self.tick_divisor != 0 {
            return None;
        }

        let counter = self.invocations.get_mut(kind.index())?;
        *counter = counter.wrapping_add(1);
        if *counter % self.log_interval != 0 {
            return None;
        }

        Some(FaultEffect::for_kind(kind))
    }
}
