//! Source-tagged event emission.

/// Emit an event through a [`MonitorPort`](crate::MonitorPort), tagging it with
/// the calling module path and line.
///
/// The first argument must be a mutable reference to something implementing
/// `MonitorPort`; the message accepts `format!` arguments.
///
/// # Example
///
/// ```rust
/// use faultsim_monitor::{emit_event, ErrorCode, MonitorConfig, MonitorCore, Severity};
///
/// let config = MonitorConfig::builder().without_sink().build()?;
/// let mut monitor = MonitorCore::new(config)?;
/// monitor.start()?;
/// emit_event!(&mut monitor, Severity::Warning, ErrorCode::PowerFluctuation, "bus at {:.1} V", 21.7);
/// assert_eq!(monitor.event_log().newest().map(|e| e.message()), Some("bus at 21.7 V"));
/// # Ok::<(), faultsim_monitor::MonitorError>(())
/// ```
#[macro_export]
macro_rules! emit_event {
    ($port:expr, $severity:expr, $code:expr, $($arg:tt)+) => {
        $crate::MonitorPort::emit(
            &mut *$port,
            $severity,
            $code,
            &::std::format!($($arg)+),
            ::core::module_path!(),
            ::core::line!(),
        )
    };
}

/// Emit an info event with no error code.
#[macro_export]
macro_rules! emit_info {
    ($port:expr, $($arg:tt)+) => {
        $crate::emit_event!($port, $crate::Severity::Info, $crate::ErrorCode::None, $($arg)+)
    };
}
