//! # Supervisor state: the process table.
//!
//! One [`ProcessRecord`] per configured instance, created at supervisor
//! construction and never added or removed afterward — only a record's
//! handle and creation timestamp are overwritten, always together.
//!
//! ## Rules
//! - Instance identity is the record's **position** in the table; two
//!   records with identical options are independent instances.
//! - The table's mutex is the single state lock: every reconcile tick,
//!   every health tick, and teardown hold the guard for their full
//!   duration, so a tick never observes a partially-updated record.
//! - Invariant: `created.is_some() == process.is_some()`.

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::{Mutex, MutexGuard};

use crate::events::{Bus, Event, EventKind};
use crate::relay::{RelayOptions, RelayProcess};

/// State of one configured instance.
pub(crate) struct ProcessRecord {
    /// Stable instance label (`relay-{index}`), used in events.
    pub name: Arc<str>,
    /// The invocation this record keeps alive.
    pub options: Arc<RelayOptions>,
    /// Live handle, if any.
    pub process: Option<RelayProcess>,
    /// When the live handle was started; set iff `process` is set.
    pub created: Option<Instant>,
}

impl ProcessRecord {
    /// Returns true iff the record holds a live handle.
    pub fn is_live(&mut self) -> bool {
        match self.process.as_mut() {
            Some(proc) => proc.is_running(),
            None => false,
        }
    }
}

/// Fixed-membership table of process records behind the state lock.
pub(crate) struct ProcessTable {
    records: Mutex<Vec<ProcessRecord>>,
}

impl ProcessTable {
    /// Builds the table from the configured instances; every record
    /// starts with no handle.
    pub fn new(instances: Vec<RelayOptions>) -> Self {
        let records = instances
            .into_iter()
            .enumerate()
            .map(|(index, options)| ProcessRecord {
                name: Arc::from(format!("relay-{index}")),
                options: Arc::new(options),
                process: None,
                created: None,
            })
            .collect();
        Self {
            records: Mutex::new(records),
        }
    }

    /// Acquires the state lock.
    ///
    /// Callers hold the guard for the whole tick (or teardown) so that
    /// ticks and teardown serialize.
    pub async fn lock(&self) -> MutexGuard<'_, Vec<ProcessRecord>> {
        self.records.lock().await
    }

    /// Force-stops every live handle and clears all records.
    ///
    /// Part of supervisor teardown; runs under the state lock. A stop
    /// failure is published and the record is cleared anyway — the
    /// handle is released either way and `kill_on_drop` reaps stragglers.
    pub async fn stop_all(&self, bus: &Bus) {
        let mut records = self.records.lock().await;
        for record in records.iter_mut() {
            if let Some(proc) = record.process.as_mut() {
                if proc.is_running() {
                    match proc.stop().await {
                        Ok(()) => bus.publish(
                            Event::now(EventKind::RelayStopped)
                                .with_relay(Arc::clone(&record.name)),
                        ),
                        Err(e) => bus.publish(
                            Event::now(EventKind::RelayStopFailed)
                                .with_relay(Arc::clone(&record.name))
                                .with_reason(e.to_string()),
                        ),
                    }
                }
            }
            record.process = None;
            record.created = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_table_starts_with_empty_records() {
        let table = ProcessTable::new(vec![
            RelayOptions::from_args(["a"]),
            RelayOptions::from_args(["b"]),
        ]);
        let mut records = table.lock().await;
        assert_eq!(records.len(), 2);
        assert_eq!(&*records[0].name, "relay-0");
        assert_eq!(&*records[1].name, "relay-1");
        for record in records.iter_mut() {
            assert!(!record.is_live());
            assert!(record.process.is_none());
            assert!(record.created.is_none());
        }
    }

    #[tokio::test]
    async fn test_identical_options_stay_distinct_records() {
        let opts = RelayOptions::from_args(["same"]);
        let table = ProcessTable::new(vec![opts.clone(), opts]);
        let records = table.lock().await;
        assert_eq!(records.len(), 2);
        assert_ne!(records[0].name, records[1].name);
    }

    #[tokio::test]
    async fn test_stop_all_on_empty_table_is_a_noop() {
        let bus = Bus::new(8);
        let table = ProcessTable::new(vec![RelayOptions::from_args(["a"])]);
        table.stop_all(&bus).await;
        let records = table.lock().await;
        assert!(records[0].process.is_none());
        assert!(records[0].created.is_none());
    }
}
