//! # Subscriber trait and fan-out set.
//!
//! [`Subscriber`] is the seam between the runtime and external sinks:
//! logging, metrics, alerting. The supervisor's listener task receives
//! every [`Event`] from the bus and hands it to [`SubscriberSet::emit`],
//! which calls each subscriber in registration order.
//!
//! ## Rules
//! - Subscribers are called **sequentially** per event; a slow subscriber
//!   delays the ones after it, not the publishers (the bus buffers).
//! - Subscribers must not panic; a panicking subscriber takes the
//!   listener task down with it.

use std::sync::Arc;

use async_trait::async_trait;

use crate::events::Event;

/// Receives every runtime event.
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use relayvisor::{Event, EventKind, Subscriber};
///
/// struct StallCounter;
///
/// #[async_trait]
/// impl Subscriber for StallCounter {
///     async fn handle(&self, event: &Event) {
///         if event.kind == EventKind::RelayStalled {
///             // increment a counter, page someone, ...
///         }
///     }
/// }
/// ```
#[async_trait]
pub trait Subscriber: Send + Sync + 'static {
    /// Processes one event.
    async fn handle(&self, event: &Event);
}

/// Ordered collection of subscribers sharing one event stream.
pub struct SubscriberSet {
    subs: Vec<Arc<dyn Subscriber>>,
}

impl SubscriberSet {
    /// Creates a set from the given subscribers.
    pub fn new(subs: Vec<Arc<dyn Subscriber>>) -> Self {
        Self { subs }
    }

    /// Delivers `event` to every subscriber, in registration order.
    pub async fn emit(&self, event: &Event) {
        for sub in &self.subs {
            sub.handle(event).await;
        }
    }

    /// Returns the number of registered subscribers.
    pub fn len(&self) -> usize {
        self.subs.len()
    }

    /// Returns true if no subscribers are registered.
    pub fn is_empty(&self) -> bool {
        self.subs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventKind;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Counter(Arc<AtomicUsize>);

    #[async_trait]
    impl Subscriber for Counter {
        async fn handle(&self, _event: &Event) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[tokio::test]
    async fn test_emit_reaches_every_subscriber() {
        let hits = Arc::new(AtomicUsize::new(0));
        let set = SubscriberSet::new(vec![
            Arc::new(Counter(hits.clone())),
            Arc::new(Counter(hits.clone())),
        ]);
        set.emit(&Event::now(EventKind::SupervisorStarted)).await;
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_empty_set_is_a_noop() {
        let set = SubscriberSet::new(Vec::new());
        assert!(set.is_empty());
        set.emit(&Event::now(EventKind::SupervisorStopped)).await;
    }
}
