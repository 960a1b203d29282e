//! Runtime events: types and broadcast bus.
//!
//! This module groups the event **data model** and the **bus** used to
//! publish/subscribe to runtime events emitted by the supervisor, the two
//! periodic loops, and the per-process output forwarders.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: `Supervisor`, `ReconcileLoop`, `HealthLoop`,
//!   `RelayProcess` output forwarders.
//! - **Consumer**: the supervisor's listener task (fans out to the
//!   [`SubscriberSet`](crate::SubscriberSet)).

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
