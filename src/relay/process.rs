//! # RelayProcess: one spawned relay tool invocation.
//!
//! Owns the lifecycle of a single external process: spawn, liveness
//! probing, output draining, forced termination.
//!
//! ## State machine
//! ```text
//! Created ──start()──► Running ──self exit──► Exited
//!                         │
//!                         └────stop()───────► Terminated
//! ```
//!
//! ## Rules
//! - A handle is **never restartable**: once `start()` has spawned a
//!   process, a second `start()` fails with `AlreadyStarted` even after
//!   the process exited or was stopped. Run the same options again by
//!   creating a new `RelayProcess`.
//! - `is_running()` never blocks; it probes the child with `try_wait`.
//! - `stop()` blocks until the forced signal has taken effect; no timeout
//!   is applied to that wait.
//! - Every non-empty stdout/stderr line is published to the bus as
//!   [`EventKind::RelayOutput`].

use std::path::Path;
use std::process::{ExitStatus, Stdio};
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{Child, Command};

use crate::error::ProcessError;
use crate::events::{Bus, Event, EventKind};
use crate::relay::RelayOptions;

/// Handle owning one spawned relay process.
pub struct RelayProcess {
    /// Stable instance label used in published events.
    name: Arc<str>,
    /// The invocation this handle runs.
    options: Arc<RelayOptions>,
    /// Bus for output lines.
    bus: Bus,
    /// Live child, present from `start()` until `stop()` releases it.
    child: Option<Child>,
    /// Latched on first `start()`; makes the handle single-use.
    spawned: bool,
}

impl RelayProcess {
    /// Creates a handle in the `Created` state; nothing is spawned yet.
    pub fn new(name: Arc<str>, options: Arc<RelayOptions>, bus: Bus) -> Self {
        Self {
            name,
            options,
            bus,
            child: None,
            spawned: false,
        }
    }

    /// Returns the options this handle runs.
    pub fn options(&self) -> &Arc<RelayOptions> {
        &self.options
    }

    /// Spawns the relay tool with this handle's argument tokens.
    ///
    /// Captures stdout and stderr as asynchronous line streams and
    /// forwards each non-empty line to the bus. The spawn is
    /// fire-and-forget: this does not wait for the child's lifetime.
    ///
    /// ### Errors
    /// - [`ProcessError::AlreadyStarted`] if this handle ever held a
    ///   process (caller bug; the reconciliation loop always probes
    ///   `is_running()` first).
    /// - [`ProcessError::Spawn`] if the OS spawn fails; the handle stays
    ///   empty and may be discarded.
    pub fn start(&mut self, relay_path: &Path) -> Result<(), ProcessError> {
        if self.spawned {
            return Err(ProcessError::AlreadyStarted);
        }

        let mut child = Command::new(relay_path)
            .args(self.options.args())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(ProcessError::Spawn)?;

        if let Some(out) = child.stdout.take() {
            self.forward_lines(out);
        }
        if let Some(err) = child.stderr.take() {
            self.forward_lines(err);
        }

        self.child = Some(child);
        self.spawned = true;
        Ok(())
    }

    /// Returns true iff a process was spawned and has not exited.
    ///
    /// Never blocks. A probe failure is treated as "not running" so the
    /// reconciliation loop replaces the handle; a replaced child that is
    /// somehow still alive is reaped on drop.
    pub fn is_running(&mut self) -> bool {
        match self.child.as_mut() {
            Some(child) => matches!(child.try_wait(), Ok(None)),
            None => false,
        }
    }

    /// Sends a forced termination signal and blocks until the process has
    /// fully exited, then releases the child.
    ///
    /// ### Errors
    /// - [`ProcessError::NotRunning`] if no process is currently running
    ///   (caller bug).
    /// - [`ProcessError::Kill`] if signalling or reaping fails.
    pub async fn stop(&mut self) -> Result<(), ProcessError> {
        if !self.is_running() {
            return Err(ProcessError::NotRunning);
        }
        if let Some(mut child) = self.child.take() {
            child.kill().await.map_err(ProcessError::Kill)?;
        }
        Ok(())
    }

    /// Blocks until the process exits on its own and returns its status.
    ///
    /// ### Errors
    /// - [`ProcessError::NotRunning`] if no process is currently running
    ///   (caller bug).
    /// - [`ProcessError::Wait`] if the underlying wait fails.
    pub async fn wait_for_exit(&mut self) -> Result<ExitStatus, ProcessError> {
        if !self.is_running() {
            return Err(ProcessError::NotRunning);
        }
        match self.child.as_mut() {
            Some(child) => child.wait().await.map_err(ProcessError::Wait),
            None => Err(ProcessError::NotRunning),
        }
    }

    /// Spawns a task draining one output stream line by line onto the bus.
    fn forward_lines<R>(&self, stream: R)
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        let name = Arc::clone(&self.name);
        let bus = self.bus.clone();
        tokio::spawn(async move {
            let mut lines = BufReader::new(stream).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                if !line.is_empty() {
                    bus.publish(
                        Event::now(EventKind::RelayOutput)
                            .with_relay(Arc::clone(&name))
                            .with_line(line),
                    );
                }
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::time::Duration;

    fn handle(args: &[&str], bus: &Bus) -> RelayProcess {
        RelayProcess::new(
            Arc::from("relay-0"),
            Arc::new(RelayOptions::from_args(args.to_vec())),
            bus.clone(),
        )
    }

    #[tokio::test]
    async fn test_start_twice_fails_with_already_started() {
        let bus = Bus::new(16);
        let mut proc = handle(&["30"], &bus);
        proc.start(&PathBuf::from("sleep")).unwrap();
        let err = proc.start(&PathBuf::from("sleep")).unwrap_err();
        assert!(matches!(err, ProcessError::AlreadyStarted));
        proc.stop().await.unwrap();
    }

    #[tokio::test]
    async fn test_stop_without_start_fails_with_not_running() {
        let bus = Bus::new(16);
        let mut proc = handle(&["30"], &bus);
        let err = proc.stop().await.unwrap_err();
        assert!(matches!(err, ProcessError::NotRunning));
    }

    #[tokio::test]
    async fn test_wait_for_exit_without_start_fails() {
        let bus = Bus::new(16);
        let mut proc = handle(&["30"], &bus);
        let err = proc.wait_for_exit().await.unwrap_err();
        assert!(matches!(err, ProcessError::NotRunning));
    }

    #[tokio::test]
    async fn test_spawn_failure_propagates_and_leaves_handle_empty() {
        let bus = Bus::new(16);
        let mut proc = handle(&[], &bus);
        let err = proc
            .start(&PathBuf::from("/nonexistent/relay-tool"))
            .unwrap_err();
        assert!(matches!(err, ProcessError::Spawn(_)));
        assert!(!proc.is_running());
    }

    #[tokio::test]
    async fn test_running_then_stopped_is_not_restartable() {
        let bus = Bus::new(16);
        let mut proc = handle(&["30"], &bus);
        proc.start(&PathBuf::from("sleep")).unwrap();
        assert!(proc.is_running());

        proc.stop().await.unwrap();
        assert!(!proc.is_running());

        // Released handle stays single-use.
        let err = proc.start(&PathBuf::from("sleep")).unwrap_err();
        assert!(matches!(err, ProcessError::AlreadyStarted));
        let err = proc.stop().await.unwrap_err();
        assert!(matches!(err, ProcessError::NotRunning));
    }

    #[tokio::test]
    async fn test_self_exit_is_observed_by_is_running() {
        let bus = Bus::new(16);
        let mut proc = handle(&[], &bus);
        proc.start(&PathBuf::from("true")).unwrap();
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(!proc.is_running());
    }

    #[tokio::test]
    async fn test_wait_for_exit_returns_status() {
        let bus = Bus::new(16);
        let mut proc = handle(&["0.1"], &bus);
        proc.start(&PathBuf::from("sleep")).unwrap();
        let status = proc.wait_for_exit().await.unwrap();
        assert!(status.success());
        assert!(!proc.is_running());
    }

    #[tokio::test]
    async fn test_output_lines_reach_the_bus() {
        let bus = Bus::new(64);
        let mut rx = bus.subscribe();
        let mut proc = RelayProcess::new(
            Arc::from("relay-0"),
            Arc::new(RelayOptions::from_args(["hello"])),
            bus.clone(),
        );
        proc.start(&PathBuf::from("echo")).unwrap();

        let ev = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("no output event")
            .unwrap();
        assert_eq!(ev.kind, EventKind::RelayOutput);
        assert_eq!(ev.relay.as_deref(), Some("relay-0"));
        assert_eq!(ev.line.as_deref(), Some("hello"));
    }
}
