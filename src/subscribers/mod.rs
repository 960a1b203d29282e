//! # Event subscribers for the relayvisor runtime.
//!
//! This module provides the [`Subscriber`] trait and the [`SubscriberSet`]
//! fan-out used to deliver runtime events broadcast through the
//! [`Bus`](crate::events::Bus) — this is the "log sink" boundary: child
//! process output, lifecycle transitions, and health results all arrive
//! here as events.
//!
//! ## Architecture
//! ```text
//! Event flow:
//!   loops/processes ── publish(Event) ──► Bus ──► supervisor listener
//!                                                       │
//!                                                       ▼
//!                                             SubscriberSet::emit(&Event)
//!                                                  ┌────┴────┬────────┐
//!                                                  ▼         ▼        ▼
//!                                               LogWriter  Metrics  Custom
//! ```

mod subscriber;

pub use subscriber::{Subscriber, SubscriberSet};

#[cfg(feature = "logging")]
mod log;
#[cfg(feature = "logging")]
pub use log::LogWriter;
