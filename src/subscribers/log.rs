//! # Simple logging subscriber for debugging and demos.
//!
//! [`LogWriter`] prints events to stdout in a human-readable format.
//! This is primarily useful for development, debugging, and examples.
//!
//! ## Output format
//! ```text
//! [supervisor-started]
//! [starting] relay=relay-0 args="-fflags nobuffer -i udp://10.0.0.1:5000 ..."
//! [output] relay=relay-0 frame=  120 fps= 25 ...
//! [spawn-failed] relay=relay-1 err="No such file or directory"
//! [stalled] relay=relay-0 args="-fflags nobuffer ..."
//! [health] flagged=1
//! [health-failed] err="Permission denied"
//! [stopped] relay=relay-0
//! [supervisor-stopped]
//! ```
//!
//! Not intended for production use - implement a custom
//! [`Subscriber`](crate::Subscriber) for structured logging or metrics
//! collection.

use async_trait::async_trait;

use crate::events::{Event, EventKind};
use crate::subscribers::Subscriber;

/// Simple stdout logging subscriber.
///
/// Enabled via the `logging` feature. Prints human-readable event
/// descriptions to stdout for debugging and demonstration purposes.
#[derive(Default)]
pub struct LogWriter;

#[async_trait]
impl Subscriber for LogWriter {
    async fn handle(&self, e: &Event) {
        match e.kind {
            EventKind::SupervisorStarted => {
                println!("[supervisor-started]");
            }
            EventKind::SupervisorStopped => {
                println!("[supervisor-stopped]");
            }
            EventKind::RelayStarting => {
                if let (Some(relay), Some(args)) = (&e.relay, &e.reason) {
                    println!("[starting] relay={relay} args={args:?}");
                }
            }
            EventKind::RelaySpawnFailed => {
                println!("[spawn-failed] relay={:?} err={:?}", e.relay, e.reason);
            }
            EventKind::RelayStopped => {
                println!("[stopped] relay={:?}", e.relay);
            }
            EventKind::RelayStopFailed => {
                println!("[stop-failed] relay={:?} err={:?}", e.relay, e.reason);
            }
            EventKind::RelayOutput => {
                if let (Some(relay), Some(line)) = (&e.relay, &e.line) {
                    println!("[output] relay={relay} {line}");
                }
            }
            EventKind::RelayStalled => {
                println!("[stalled] relay={:?} args={:?}", e.relay, e.reason);
            }
            EventKind::HealthReport => {
                println!("[health] flagged={:?}", e.flagged);
            }
            EventKind::HealthReportFailed => {
                println!("[health-failed] err={:?}", e.reason);
            }
        }
    }
}
