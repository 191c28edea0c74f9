//! Logging facilities for gridstate.
//!
//! gridstate uses the `tracing` crate for instrumentation. To see logs,
//! install a tracing subscriber in your application:
//!
//! ```ignore
//! fn main() {
//!     tracing_subscriber::fmt()
//!         .with_env_filter("gridstate=debug")
//!         .init();
//! }
//! ```
//!
//! Every event is emitted on one of the [`targets`], so a filter such as
//! `gridstate::columns=trace` narrows the output to a single subsystem.

use std::time::Instant;

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Signal/slot registry target.
    pub const SIGNAL: &str = "gridstate::signal";
    /// Row sorting (sort index and sorting decorator).
    pub const SORT: &str = "gridstate::sort";
    /// Column visibility and ordering.
    pub const COLUMNS: &str = "gridstate::columns";
    /// Snapshot/restore of view state.
    pub const STATE: &str = "gridstate::state";
    /// The view coordinator.
    pub const VIEW: &str = "gridstate::view";
    /// Performance spans.
    pub const PERF: &str = "gridstate::perf";
}

/// RAII guard for a performance-tracing span.
///
/// The span is entered on creation and exited when the guard is dropped.
/// On drop the guard also logs the elapsed time at `debug` level on the
/// [`targets::PERF`] target.
///
/// ```
/// use gridstate_core::PerfSpan;
///
/// {
///     let _span = PerfSpan::new("resort");
///     // ... timed work ...
/// }
/// ```
pub struct PerfSpan {
    #[allow(dead_code)]
    span: tracing::span::EnteredSpan,
    operation: &'static str,
    started: Instant,
}

impl PerfSpan {
    /// Create a new performance span.
    ///
    /// The span will be active until the guard is dropped.
    pub fn new(name: &'static str) -> Self {
        let span = tracing::info_span!(target: "gridstate::perf", "perf", operation = name);
        Self {
            span: span.entered(),
            operation: name,
            started: Instant::now(),
        }
    }

    /// Time since the span was created.
    pub fn elapsed(&self) -> std::time::Duration {
        self.started.elapsed()
    }
}

impl Drop for PerfSpan {
    fn drop(&mut self) {
        tracing::debug!(
            target: targets::PERF,
            operation = self.operation,
            elapsed_us = self.started.elapsed().as_micros() as u64,
            "perf span finished"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perf_span() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("gridstate=trace")
            .with_test_writer()
            .try_init();
        let span = PerfSpan::new("test_operation");
        tracing::debug!(target: targets::SORT, "inside span");
        std::thread::sleep(std::time::Duration::from_millis(2));
        assert!(span.elapsed() >= std::time::Duration::from_millis(2));
    }

    #[test]
    fn test_targets_share_prefix() {
        for target in [
            targets::SIGNAL,
            targets::SORT,
            targets::COLUMNS,
            targets::STATE,
            targets::VIEW,
            targets::PERF,
        ] {
            assert!(target.starts_with("gridstate::"));
        }
    }
}
