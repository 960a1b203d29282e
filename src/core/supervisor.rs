//! # Supervisor: composes the process table and the two periodic loops.
//!
//! The [`Supervisor`] owns the event bus, a [`SubscriberSet`], the process
//! table, and the lifecycle of the two periodic tasks. It exposes the
//! idempotent control surface a hosting service-lifecycle manager calls:
//! `start()`, `stop()`, `is_running()`.
//!
//! ## High-level architecture
//! ```text
//! Inputs:
//!   Config + Vec<RelayOptions> + subscribers ──► Supervisor::new
//!
//! start():
//!   ├─► spawn subscriber listener (once): Bus.subscribe() ─► SubscriberSet::emit
//!   ├─► runtime CancellationToken
//!   ├─► spawn ReconcileLoop::run(child token)   (immediate first tick)
//!   └─► spawn HealthLoop::run(child token)      (immediate first tick)
//!
//! Tick serialization (state lock):
//!   ReconcileLoop tick ──┐
//!   HealthLoop tick    ──┼──► Mutex<Vec<ProcessRecord>>
//!   stop() teardown    ──┘
//!
//! stop():
//!   ├─► cancel runtime token        (future ticks)
//!   ├─► await both loop handles     (in-flight tick completes)
//!   ├─► table.stop_all()            (force-stop every live handle)
//!   └─► publish SupervisorStopped
//! ```
//!
//! ## Rules
//! - `start()`/`stop()` are idempotent; the lifecycle lock prevents
//!   concurrent calls from double-arming or double-disarming.
//! - Disarm strictly precedes teardown: because `stop()` awaits the loop
//!   handles after cancelling, no straggling tick can resurrect a
//!   process after teardown clears it.
//! - `is_running()` reflects the armed state, not the liveness of
//!   individual processes.
//!
//! ## Example
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use relayvisor::{Config, RelayOptions, Subscriber, Supervisor};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let cfg = Config {
//!         health_file: "/var/log/relay-health.log".into(),
//!         restart_every: Duration::from_secs(5),
//!         ..Config::default()
//!     };
//!
//!     let instances = vec![
//!         RelayOptions::stream_copy(
//!             "udp://10.0.0.1:5000",
//!             "udp://10.0.0.2:6000",
//!             Some(Duration::from_secs(5)),
//!         ),
//!     ];
//!
//!     let subs: Vec<Arc<dyn Subscriber>> = Vec::new();
//!     let sup = Supervisor::new(cfg, instances, subs);
//!     sup.run_until_shutdown().await?;
//!     Ok(())
//! }
//! ```

use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::core::health::HealthLoop;
use crate::core::reconcile::ReconcileLoop;
use crate::core::shutdown;
use crate::core::state::ProcessTable;
use crate::error::RuntimeError;
use crate::events::{Bus, Event, EventKind};
use crate::relay::RelayOptions;
use crate::subscribers::{Subscriber, SubscriberSet};

/// Armed periodic tasks; present iff the supervisor is running.
struct Armed {
    token: CancellationToken,
    reconcile: JoinHandle<()>,
    health: JoinHandle<()>,
}

/// Guarded by the lifecycle lock: listener handle + armed state.
#[derive(Default)]
struct Lifecycle {
    listener: Option<JoinHandle<()>>,
    armed: Option<Armed>,
}

/// Keeps a fixed set of relay instances running and reports suspected
/// hangs.
pub struct Supervisor {
    /// Global runtime configuration.
    pub cfg: Config,
    /// Event bus shared with loops and process output forwarders.
    pub bus: Bus,
    /// Fan-out set for subscribers.
    pub subs: Arc<SubscriberSet>,
    table: Arc<ProcessTable>,
    lifecycle: Mutex<Lifecycle>,
}

impl Supervisor {
    /// Creates a stopped supervisor over the given instances.
    ///
    /// The instance order is preserved; each gets a stable
    /// `relay-{index}` label.
    pub fn new(
        cfg: Config,
        instances: Vec<RelayOptions>,
        subscribers: Vec<Arc<dyn Subscriber>>,
    ) -> Self {
        let bus = Bus::new(cfg.bus_capacity_clamped());
        Self {
            bus,
            subs: Arc::new(SubscriberSet::new(subscribers)),
            table: Arc::new(ProcessTable::new(instances)),
            lifecycle: Mutex::new(Lifecycle::default()),
            cfg,
        }
    }

    /// Arms both periodic loops. Idempotent: a no-op if already running.
    ///
    /// The first reconcile tick fires immediately, so instances start
    /// without waiting one period.
    pub async fn start(&self) {
        let mut lifecycle = self.lifecycle.lock().await;
        if lifecycle.armed.is_some() {
            return;
        }

        if lifecycle.listener.is_none() {
            lifecycle.listener = Some(self.subscriber_listener());
        }

        let token = CancellationToken::new();
        let reconcile = ReconcileLoop {
            table: Arc::clone(&self.table),
            relay_path: self.cfg.relay_path.clone(),
            every: self.cfg.restart_period(),
            bus: self.bus.clone(),
        };
        let health = HealthLoop {
            table: Arc::clone(&self.table),
            health_file: self.cfg.health_file.clone(),
            every: self.cfg.health_period(),
            bus: self.bus.clone(),
        };

        lifecycle.armed = Some(Armed {
            reconcile: tokio::spawn(reconcile.run(token.child_token())),
            health: tokio::spawn(health.run(token.child_token())),
            token,
        });
        self.bus.publish(Event::now(EventKind::SupervisorStarted));
    }

    /// Disarms both loops and force-stops every live instance.
    /// Idempotent: a no-op if already stopped.
    ///
    /// Once this returns, no process the supervisor spawned remains live
    /// and no further ticks will fire. An in-flight tick is not
    /// interrupted; it is awaited before teardown.
    pub async fn stop(&self) {
        let mut lifecycle = self.lifecycle.lock().await;
        let Some(armed) = lifecycle.armed.take() else {
            return;
        };

        armed.token.cancel();
        let _ = armed.reconcile.await;
        let _ = armed.health.await;

        self.table.stop_all(&self.bus).await;
        self.bus.publish(Event::now(EventKind::SupervisorStopped));
    }

    /// Returns true iff the periodic loops are armed.
    pub async fn is_running(&self) -> bool {
        self.lifecycle.lock().await.armed.is_some()
    }

    /// Runs until the process receives a termination signal:
    /// `start()`, await the signal, `stop()`.
    ///
    /// Intended as the whole body of a hosting service's main loop.
    pub async fn run_until_shutdown(&self) -> Result<(), RuntimeError> {
        self.start().await;
        let waited = shutdown::wait_for_shutdown_signal()
            .await
            .map_err(RuntimeError::Signal);
        self.stop().await;
        waited
    }

    /// Subscribes to the bus and forwards events to the subscriber set.
    ///
    /// Lives for the supervisor's lifetime (ends when the bus closes), so
    /// teardown events published by `stop()` are still delivered.
    fn subscriber_listener(&self) -> JoinHandle<()> {
        let mut rx = self.bus.subscribe();
        let subs = Arc::clone(&self.subs);
        tokio::spawn(async move {
            while let Ok(ev) = rx.recv().await {
                subs.emit(&ev).await;
            }
        })
    }
}
