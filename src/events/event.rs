//! # Runtime events emitted by the supervisor and its loops.
//!
//! The [`EventKind`] enum classifies event types across three categories:
//! - **Supervisor lifecycle**: the control surface was armed/disarmed
//! - **Relay lifecycle**: per-instance spawn, output, and teardown flow
//! - **Health reporting**: snapshot results and sink failures
//!
//! The [`Event`] struct carries additional metadata such as timestamps,
//! the relay instance name, forwarded output lines, and failure reasons.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases
//! monotonically. Use `seq` to restore the exact order when events are
//! delivered out of order.
//!
//! ## Example
//! ```rust
//! use relayvisor::{Event, EventKind};
//!
//! let ev = Event::now(EventKind::RelaySpawnFailed)
//!     .with_relay("relay-0")
//!     .with_reason("no such file or directory");
//!
//! assert_eq!(ev.kind, EventKind::RelaySpawnFailed);
//! assert_eq!(ev.relay.as_deref(), Some("relay-0"));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::SystemTime;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Supervisor lifecycle ===
    /// Both periodic loops were armed.
    ///
    /// Sets:
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    SupervisorStarted,

    /// Both loops were disarmed and every live instance force-stopped.
    ///
    /// Sets:
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    SupervisorStopped,

    // === Relay lifecycle ===
    /// A reconciliation tick is about to (re)start an instance.
    ///
    /// Sets:
    /// - `relay`: instance name
    /// - `reason`: the instance's flattened argument string
    /// - `at`, `seq`
    RelayStarting,

    /// Spawning an instance failed; retried next tick.
    ///
    /// Sets:
    /// - `relay`: instance name
    /// - `reason`: failure message
    /// - `at`, `seq`
    RelaySpawnFailed,

    /// An instance was force-stopped during supervisor teardown.
    ///
    /// Sets:
    /// - `relay`: instance name
    /// - `at`, `seq`
    RelayStopped,

    /// Force-stopping an instance failed; its handle is released anyway.
    ///
    /// Sets:
    /// - `relay`: instance name
    /// - `reason`: failure message
    /// - `at`, `seq`
    RelayStopFailed,

    /// A line of the instance's standard output or standard error.
    ///
    /// Sets:
    /// - `relay`: instance name
    /// - `line`: the forwarded output line (never empty)
    /// - `at`, `seq`
    RelayOutput,

    // === Health reporting ===
    /// A live instance exceeded its declared timeout plus safety margin.
    ///
    /// Sets:
    /// - `relay`: instance name
    /// - `reason`: the instance's flattened argument string
    /// - `at`, `seq`
    RelayStalled,

    /// A health snapshot was written to the sink file.
    ///
    /// Sets:
    /// - `flagged`: number of instances flagged in this snapshot
    /// - `at`, `seq`
    HealthReport,

    /// Writing the health snapshot failed.
    ///
    /// Sets:
    /// - `reason`: io error message
    /// - `at`, `seq`
    HealthReportFailed,
}

/// Runtime event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Name of the relay instance, if applicable.
    pub relay: Option<Arc<str>>,
    /// Forwarded process output line.
    pub line: Option<Arc<str>>,
    /// Human-readable reason (errors, argument strings, ...).
    pub reason: Option<Arc<str>>,
    /// Number of instances flagged by a health snapshot.
    pub flagged: Option<usize>,
}

impl Event {
    /// Creates a new event of the given kind with the current timestamp
    /// and the next sequence number.
    pub fn now(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            relay: None,
            line: None,
            reason: None,
            flagged: None,
        }
    }

    /// Attaches a relay instance name.
    #[inline]
    pub fn with_relay(mut self, relay: impl Into<Arc<str>>) -> Self {
        self.relay = Some(relay.into());
        self
    }

    /// Attaches a forwarded output line.
    #[inline]
    pub fn with_line(mut self, line: impl Into<Arc<str>>) -> Self {
        self.line = Some(line.into());
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches a flagged-instance count.
    #[inline]
    pub fn with_flagged(mut self, flagged: usize) -> Self {
        self.flagged = Some(flagged);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seq_is_monotonic() {
        let a = Event::now(EventKind::SupervisorStarted);
        let b = Event::now(EventKind::SupervisorStopped);
        assert!(b.seq > a.seq);
    }

    #[test]
    fn test_builders_set_fields() {
        let ev = Event::now(EventKind::RelayOutput)
            .with_relay("relay-3")
            .with_line("frame=  120 fps= 25");
        assert_eq!(ev.relay.as_deref(), Some("relay-3"));
        assert_eq!(ev.line.as_deref(), Some("frame=  120 fps= 25"));
        assert!(ev.reason.is_none());
        assert!(ev.flagged.is_none());
    }

    #[test]
    fn test_flagged_count() {
        let ev = Event::now(EventKind::HealthReport).with_flagged(2);
        assert_eq!(ev.flagged, Some(2));
    }
}
