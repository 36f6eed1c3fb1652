use std::collections::HashMap;
use std::sync::RwLock;

use tracing::{debug, trace};

use crate::core::event::{Event, EventKind};
use crate::error::{constants, NetError, Result};

type Subscriber = dyn Fn(&Event) + Send + Sync + 'static;

/// Event dispatcher routing decoded events to registered subscribers.
///
/// Subscribers for a kind run synchronously with respect to each other, in
/// registration order. Registration normally happens during scene setup;
/// dispatch happens from the connection's receive loop, so the registry is
/// guarded by a read-write lock.
pub struct EventDispatcher {
    subscribers: RwLock<HashMap<EventKind, Vec<Box<Subscriber>>>>,
}

impl Default for EventDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self {
            subscribers: RwLock::new(HashMap::new()),
        }
    }

    /// Add a subscriber for `kind`. A subscriber may register for several
    /// kinds independently; registering twice for the same kind delivers
    /// twice.
    pub fn register<F>(&self, kind: EventKind, subscriber: F) -> Result<()>
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        let mut subscribers = self
            .subscribers
            .write()
            .map_err(|_| NetError::Custom(constants::ERR_DISPATCHER_WRITE_LOCK.to_string()))?;

        subscribers.entry(kind).or_default().push(Box::new(subscriber));
        Ok(())
    }

    /// Deliver `event` to every subscriber registered for its kind, in
    /// registration order. An event with no subscribers is dropped
    /// silently — that is a valid configuration, not an error.
    pub fn dispatch(&self, event: &Event) -> Result<()> {
        let subscribers = self
            .subscribers
            .read()
            .map_err(|_| NetError::Custom(constants::ERR_DISPATCHER_READ_LOCK.to_string()))?;

        match subscribers.get(&event.kind()) {
            Some(list) => {
                debug!(
                    kind = event.kind().name(),
                    subscribers = list.len(),
                    "dispatching event"
                );
                for subscriber in list {
                    subscriber(event);
                }
            }
            None => {
                trace!(kind = event.kind().name(), "no subscriber, dropping event");
            }
        }

        Ok(())
    }

    /// Number of subscribers currently registered for `kind`.
    pub fn subscriber_count(&self, kind: EventKind) -> usize {
        self.subscribers
            .read()
            .map(|s| s.get(&kind).map_or(0, Vec::len))
            .unwrap_or(0)
    }
}
