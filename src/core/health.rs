//! # Health loop: flag instances that look hung.
//!
//! A live instance whose declared read-timeout elapsed long ago without
//! the relay tool self-terminating is suspected to be hung rather than
//! cleanly erroring out. Each tick writes a point-in-time snapshot of
//! such instances to the sink file — overwritten, not appended — for an
//! external alerting consumer.
//!
//! ## Sink format
//! ```text
//! 2026-08-07 14:03:21.512
//! -fflags nobuffer -i udp://10.0.0.1:5000?timeout=5000000 ... udp://10.0.0.2:6000?pkt_size=1316
//! ```
//! First line: current local timestamp. Then the flattened argument
//! string of every flagged instance.
//!
//! ## Rules
//! - Flag iff the handle is live **and** `now − created >
//!   declared timeout + STALL_MARGIN`.
//! - A zero declared timeout means "no expectation": never flagged,
//!   regardless of age.
//! - The snapshot is computed and written while holding the state lock;
//!   a health tick never interleaves with a reconcile tick or teardown.
//! - Sink write failures are published and the loop keeps ticking.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::core::state::ProcessTable;
use crate::events::{Bus, Event, EventKind};

/// Slack added to the declared timeout before an instance is flagged,
/// absorbing tool startup and teardown latency.
pub(crate) const STALL_MARGIN: Duration = Duration::from_secs(2);

/// Periodic task that snapshots suspected-hung instances to a file.
pub(crate) struct HealthLoop {
    pub table: Arc<ProcessTable>,
    pub health_file: PathBuf,
    pub every: Duration,
    pub bus: Bus,
}

impl HealthLoop {
    /// Runs until the token is cancelled. The first tick fires
    /// immediately; subsequent ticks fire every `every`.
    pub async fn run(self, token: CancellationToken) {
        let mut ticker = time::interval(self.every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = token.cancelled() => break,
                _ = ticker.tick() => self.tick().await,
            }
        }
    }

    /// One snapshot pass: collect flagged instances and rewrite the sink,
    /// all under the state lock.
    pub async fn tick(&self) {
        let mut report = format!("{}\n", chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"));
        let mut flagged = 0usize;

        let mut records = self.table.lock().await;
        let now = Instant::now();
        for record in records.iter_mut() {
            if !record.is_live() {
                continue;
            }
            let timeout = record.options.timeout();
            if timeout == Duration::ZERO {
                continue;
            }
            let Some(created) = record.created else {
                continue;
            };
            if now.duration_since(created) > timeout + STALL_MARGIN {
                report.push_str(&record.options.arg_string());
                report.push('\n');
                flagged += 1;
                self.bus.publish(
                    Event::now(EventKind::RelayStalled)
                        .with_relay(Arc::clone(&record.name))
                        .with_reason(record.options.arg_string()),
                );
            }
        }

        match std::fs::write(&self.health_file, report) {
            Ok(()) => self
                .bus
                .publish(Event::now(EventKind::HealthReport).with_flagged(flagged)),
            Err(e) => self.bus.publish(
                Event::now(EventKind::HealthReportFailed).with_reason(e.to_string()),
            ),
        }
    }
}
