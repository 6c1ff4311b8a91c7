//! Single-process status bus.
//!
//! Handlers are invoked synchronously, in publish order, on the publisher's
//! task. The handler list is cloned before dispatch so a handler may itself
//! subscribe without deadlocking.

use std::sync::{Arc, PoisonError, RwLock};

use crate::domain::{RoomStatusEvent, StatusEventBus, StatusEventHandler};

#[derive(Default)]
pub struct InProcessStatusBus {
    handlers: RwLock<Vec<Arc<dyn StatusEventHandler>>>,
}

impl InProcessStatusBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscriber_count(&self) -> usize {
        self.handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl StatusEventBus for InProcessStatusBus {
    fn publish(&self, event: RoomStatusEvent) {
        let handlers = self
            .handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();

        tracing::debug!(
            "Publishing status for room '{}' (isLive={}) to {} subscriber(s)",
            event.slug,
            event.is_live,
            handlers.len()
        );
        for handler in handlers {
            handler.handle(&event);
        }
    }

    fn subscribe(&self, handler: Arc<dyn StatusEventHandler>) {
        self.handlers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(handler);
    }
}
