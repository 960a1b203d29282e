//! Error types used by the relayvisor runtime and managed processes.
//!
//! This module defines two main error enums:
//!
//! - [`ProcessError`] — errors raised at the managed-process boundary.
//! - [`RuntimeError`] — errors raised by the supervisor runtime itself.
//!
//! Both types provide an `as_label` helper for logging/metrics.
//! [`ProcessError::is_caller_bug`] distinguishes precondition violations
//! (which signal a defect in the caller's guard logic) from ordinary
//! spawn/kill/wait failures.

use std::io;
use thiserror::Error;

/// # Errors produced at the managed-process boundary.
///
/// [`AlreadyStarted`](ProcessError::AlreadyStarted) and
/// [`NotRunning`](ProcessError::NotRunning) are precondition violations:
/// the reconciliation loop always probes `is_running()` under the state
/// lock before acting, so seeing either means the caller's guard logic is
/// broken. They are never retried; the offending record is left as-is.
///
/// The remaining variants wrap the underlying OS failure. A spawn failure
/// is an ordinary `start()` failure: the record's handle stays empty and
/// the next reconciliation tick retries, indefinitely.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ProcessError {
    /// `start()` was called on a handle that already held a process.
    #[error("relay process already started")]
    AlreadyStarted,

    /// `stop()` or `wait_for_exit()` was called with no live process.
    #[error("relay process is not running")]
    NotRunning,

    /// Spawning the external relay tool failed (missing executable,
    /// permission denied, ...). Not distinguished further; the next
    /// reconciliation tick retries.
    #[error("failed to spawn relay process: {0}")]
    Spawn(#[source] io::Error),

    /// Sending the forced termination signal failed.
    #[error("failed to kill relay process: {0}")]
    Kill(#[source] io::Error),

    /// Waiting for the child to exit failed.
    #[error("failed to wait for relay process: {0}")]
    Wait(#[source] io::Error),
}

impl ProcessError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use relayvisor::ProcessError;
    ///
    /// assert_eq!(ProcessError::AlreadyStarted.as_label(), "process_already_started");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            ProcessError::AlreadyStarted => "process_already_started",
            ProcessError::NotRunning => "process_not_running",
            ProcessError::Spawn(_) => "process_spawn_failed",
            ProcessError::Kill(_) => "process_kill_failed",
            ProcessError::Wait(_) => "process_wait_failed",
        }
    }

    /// Indicates whether the error is a precondition violation on the
    /// caller's side rather than an expected runtime condition.
    ///
    /// Returns `true` for [`ProcessError::AlreadyStarted`] and
    /// [`ProcessError::NotRunning`].
    ///
    /// # Example
    /// ```
    /// use relayvisor::ProcessError;
    ///
    /// assert!(ProcessError::NotRunning.is_caller_bug());
    ///
    /// let spawn = ProcessError::Spawn(std::io::Error::other("boom"));
    /// assert!(!spawn.is_caller_bug());
    /// ```
    pub fn is_caller_bug(&self) -> bool {
        matches!(
            self,
            ProcessError::AlreadyStarted | ProcessError::NotRunning
        )
    }
}

/// # Errors produced by the supervisor runtime.
///
/// These represent failures of the orchestration layer itself, not of an
/// individual relay process.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Registering the OS termination-signal handlers failed.
    #[error("failed to register shutdown signal handler: {0}")]
    Signal(#[source] io::Error),
}

impl RuntimeError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            RuntimeError::Signal(_) => "runtime_signal_failed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precondition_errors_are_caller_bugs() {
        assert!(ProcessError::AlreadyStarted.is_caller_bug());
        assert!(ProcessError::NotRunning.is_caller_bug());
    }

    #[test]
    fn test_io_backed_errors_are_not_caller_bugs() {
        let err = ProcessError::Spawn(io::Error::new(io::ErrorKind::NotFound, "no ffmpeg"));
        assert!(!err.is_caller_bug());
        let err = ProcessError::Kill(io::Error::other("boom"));
        assert!(!err.is_caller_bug());
    }

    #[test]
    fn test_labels_are_stable() {
        assert_eq!(ProcessError::NotRunning.as_label(), "process_not_running");
        assert_eq!(
            ProcessError::Wait(io::Error::other("x")).as_label(),
            "process_wait_failed"
        );
        assert_eq!(
            RuntimeError::Signal(io::Error::other("x")).as_label(),
            "runtime_signal_failed"
        );
    }

    #[test]
    fn test_display_carries_source_message() {
        let err = ProcessError::Spawn(io::Error::new(io::ErrorKind::NotFound, "no such file"));
        assert!(err.to_string().contains("no such file"));
    }
}
