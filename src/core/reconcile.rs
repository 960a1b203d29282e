//! # Reconciliation loop: keep every configured instance running.
//!
//! On each tick, compares desired state (the configured instances) to
//! observed state (live handles) and corrects drift by starting missing
//! or dead ones.
//!
//! ## Tick flow
//! ```text
//! loop {
//!   ├─► token cancelled? → break
//!   ├─► interval tick (first fires immediately)
//!   └─► lock table; for each record:
//!         ├─ handle live? → skip
//!         ├─ publish RelayStarting
//!         ├─ new RelayProcess + start()
//!         │     ├─ Ok  → store handle, created = now
//!         │     └─ Err → publish RelaySpawnFailed, clear record
//!         └─ (next record)
//! }
//! ```
//!
//! ## Rules
//! - Cancellation is checked at the top of each tick; an in-flight tick
//!   is never interrupted.
//! - Spawn failures are retried every period, indefinitely — no backoff,
//!   no retry cap.
//! - A precondition error from `start()` cannot occur here (the tick
//!   only starts handles it just created); if it ever does, the record
//!   is left untouched.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::core::state::ProcessTable;
use crate::events::{Bus, Event, EventKind};
use crate::relay::RelayProcess;

/// Periodic task that (re)starts dead instances.
pub(crate) struct ReconcileLoop {
    pub table: Arc<ProcessTable>,
    pub relay_path: PathBuf,
    pub every: Duration,
    pub bus: Bus,
}

impl ReconcileLoop {
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

    /// One reconciliation pass over the whole table, under the state lock.
    pub async fn tick(&self) {
        let mut records = self.table.lock().await;
        for record in records.iter_mut() {
            if record.is_live() {
                continue;
            }

            self.bus.publish(
                Event::now(EventKind::RelayStarting)
                    .with_relay(Arc::clone(&record.name))
                    .with_reason(record.options.arg_string()),
            );

            let mut proc = RelayProcess::new(
                Arc::clone(&record.name),
                Arc::clone(&record.options),
                self.bus.clone(),
            );
            match proc.start(&self.relay_path) {
                Ok(()) => {
                    record.process = Some(proc);
                    record.created = Some(Instant::now());
                }
                Err(e) if e.is_caller_bug() => {
                    // Guard logic defect; surface it and leave the record
                    // exactly as it was.
                    self.bus.publish(
                        Event::now(EventKind::RelaySpawnFailed)
                            .with_relay(Arc::clone(&record.name))
                            .with_reason(e.to_string()),
                    );
                }
                Err(e) => {
                    self.bus.publish(
                        Event::now(EventKind::RelaySpawnFailed)
                            .with_relay(Arc::clone(&record.name))
                            .with_reason(e.to_string()),
                    );
                    record.process = None;
                    record.created = None;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relay::RelayOptions;

    fn reconciler(table: Arc<ProcessTable>, relay_path: &str, bus: &Bus) -> ReconcileLoop {
        ReconcileLoop {
            table,
            relay_path: PathBuf::from(relay_path),
            every: Duration::from_secs(60),
            bus: bus.clone(),
        }
    }

    #[tokio::test]
    async fn test_first_tick_starts_every_instance() {
        let bus = Bus::new(64);
        let table = Arc::new(ProcessTable::new(vec![
            RelayOptions::from_args(["30"]),
            RelayOptions::from_args(["30"]),
            RelayOptions::from_args(["30"]),
        ]));
        let loop_ = reconciler(Arc::clone(&table), "sleep", &bus);

        let before = Instant::now();
        loop_.tick().await;

        let mut records = table.lock().await;
        assert_eq!(records.len(), 3);
        for record in records.iter_mut() {
            assert!(record.is_live());
            let created = record.created.expect("created must be set");
            assert!(created >= before && created <= Instant::now());
        }
        drop(records);
        table.stop_all(&bus).await;
    }

    #[tokio::test]
    async fn test_dead_instance_is_replaced_with_later_creation_time() {
        let bus = Bus::new(64);
        let table = Arc::new(ProcessTable::new(vec![RelayOptions::from_args([
            "0.05",
        ])]));
        let loop_ = reconciler(Arc::clone(&table), "sleep", &bus);

        loop_.tick().await;
        let first_created = table.lock().await[0].created.unwrap();

        // Let the 50 ms sleep exit on its own.
        time::sleep(Duration::from_millis(300)).await;
        assert!(!table.lock().await[0].is_live());

        loop_.tick().await;
        let mut records = table.lock().await;
        assert!(records[0].is_live());
        assert!(records[0].created.unwrap() > first_created);
        drop(records);
        table.stop_all(&bus).await;
    }

    #[tokio::test]
    async fn test_live_instance_is_left_alone() {
        let bus = Bus::new(64);
        let table = Arc::new(ProcessTable::new(vec![RelayOptions::from_args(["30"])]));
        let loop_ = reconciler(Arc::clone(&table), "sleep", &bus);

        loop_.tick().await;
        let created = table.lock().await[0].created.unwrap();

        loop_.tick().await;
        assert_eq!(table.lock().await[0].created.unwrap(), created);
        table.stop_all(&bus).await;
    }

    #[tokio::test]
    async fn test_spawn_failure_clears_record_and_publishes() {
        let bus = Bus::new(64);
        let mut rx = bus.subscribe();
        let table = Arc::new(ProcessTable::new(vec![RelayOptions::from_args(["x"])]));
        let loop_ = reconciler(Arc::clone(&table), "/nonexistent/relay-tool", &bus);

        loop_.tick().await;

        let records = table.lock().await;
        assert!(records[0].process.is_none());
        assert!(records[0].created.is_none());
        drop(records);

        // RelayStarting, then RelaySpawnFailed.
        assert_eq!(rx.recv().await.unwrap().kind, EventKind::RelayStarting);
        assert_eq!(rx.recv().await.unwrap().kind, EventKind::RelaySpawnFailed);
    }

    #[tokio::test]
    async fn test_spawn_failure_is_retried_next_tick() {
        let bus = Bus::new(64);
        let mut rx = bus.subscribe();
        let table = Arc::new(ProcessTable::new(vec![RelayOptions::from_args(["x"])]));
        let loop_ = reconciler(Arc::clone(&table), "/nonexistent/relay-tool", &bus);

        loop_.tick().await;
        loop_.tick().await;

        let mut starting = 0;
        while let Ok(ev) = rx.try_recv() {
            if ev.kind == EventKind::RelayStarting {
                starting += 1;
            }
        }
        assert_eq!(starting, 2);
    }
}
