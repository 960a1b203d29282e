//! # relayvisor
//!
//! **Relayvisor** keeps a fixed set of long-running external media-relay
//! processes alive. Each configured instance describes one invocation of
//! a relay tool (such as ffmpeg); the supervisor continuously (re)starts
//! instances that died and reports instances that appear stuck.
//!
//! ## Architecture
//! ```text
//!     ┌───────────────┐   ┌───────────────┐   ┌───────────────┐
//!     │ RelayOptions  │   │ RelayOptions  │   │ RelayOptions  │
//!     │ (instance #0) │   │ (instance #1) │   │ (instance #N) │
//!     └──────┬────────┘   └──────┬────────┘   └──────┬────────┘
//!            ▼                   ▼                   ▼
//! ┌──────────────────────────────────────────────────────────────────┐
//! │  Supervisor                                                      │
//! │  - ProcessTable (one record per instance, single state lock)     │
//! │  - ReconcileLoop (periodic: restart dead instances)              │
//! │  - HealthLoop (periodic: snapshot suspected hangs to a file)     │
//! │  - Bus (broadcast events) + SubscriberSet (fan-out)              │
//! └───────┬───────────────────┬───────────────────┬──────────────────┘
//!         ▼                   ▼                   ▼
//!  ┌──────────────┐    ┌──────────────┐    ┌──────────────┐
//!  │ RelayProcess │    │ RelayProcess │    │ RelayProcess │
//!  │ (child proc) │    │ (child proc) │    │ (child proc) │
//!  └──────┬───────┘    └──────┬───────┘    └──────┬───────┘
//!         │ stdout/stderr     │                   │
//!         └────── lines ──────┴─── published ─────┘
//!                             ▼
//!                     Bus ──► subscriber listener ──► Subscriber::handle
//! ```
//!
//! ### Lifecycle
//! ```text
//! start():
//!   arm ReconcileLoop + HealthLoop (first tick immediate)
//!
//! each reconcile tick (state lock held):
//!   for every record without a live handle:
//!     spawn RelayProcess, record handle + creation time
//!
//! each health tick (state lock held):
//!   rewrite sink file: timestamp header +
//!     arg string of every live instance with
//!     now − created > declared timeout + 2s margin
//!
//! stop():
//!   cancel both loops → await in-flight tick →
//!   force-stop every live handle → clear records
//! ```
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogWriter`] _(demo/reference only)_.
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
//!         relay_path: "/usr/bin/ffmpeg".into(),
//!         health_file: "/var/log/relay-health.log".into(),
//!         restart_every: Duration::from_secs(5),
//!         health_every: Duration::from_secs(1),
//!         ..Config::default()
//!     };
//!
//!     // One instance per relay; identical addresses are still
//!     // independent instances.
//!     let instances = vec![
//!         RelayOptions::stream_copy(
//!             "udp://10.0.0.1:5000",
//!             "udp://10.0.0.2:6000",
//!             Some(Duration::from_secs(5)),
//!         ),
//!         RelayOptions::stream_copy(
//!             "udp://10.0.0.1:5002",
//!             "udp://10.0.0.2:6002",
//!             Some(Duration::from_secs(5)),
//!         ),
//!     ];
//!
//!     // Build subscribers (optional)
//!     #[cfg(feature = "logging")]
//!     let subs: Vec<Arc<dyn Subscriber>> = {
//!         use relayvisor::LogWriter;
//!         vec![Arc::new(LogWriter::default())]
//!     };
//!     #[cfg(not(feature = "logging"))]
//!     let subs: Vec<Arc<dyn Subscriber>> = Vec::new();
//!
//!     let sup = Supervisor::new(cfg, instances, subs);
//!
//!     // start() → wait for SIGINT/SIGTERM → stop()
//!     sup.run_until_shutdown().await?;
//!     Ok(())
//! }
//! ```

mod config;
mod core;
mod error;
mod events;
mod relay;
mod subscribers;

// ---- Public re-exports ----

pub use config::Config;
pub use self::core::Supervisor;
pub use error::{ProcessError, RuntimeError};
pub use events::{Bus, Event, EventKind};
pub use relay::{RelayOptions, RelayProcess};
pub use subscribers::{Subscriber, SubscriberSet};

// Optional: expose a simple built-in logger subscriber (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
