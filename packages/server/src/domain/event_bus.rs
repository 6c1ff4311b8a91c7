//! Status event bus interface.
//!
//! Carries room liveness transitions from the ingest webhooks to the relay.
//! Delivery is synchronous and in publish order; there is no buffering and no
//! unsubscribe.

use std::sync::Arc;

use super::RoomStatusEvent;

/// Receives every event published after registration.
///
/// Implementations must not panic: the publisher's call stack is the webhook
/// request, which has to succeed regardless of relay-side faults.
pub trait StatusEventHandler: Send + Sync {
    fn handle(&self, event: &RoomStatusEvent);
}

pub trait StatusEventBus: Send + Sync {
    /// Deliver `event` to every currently registered handler.
    fn publish(&self, event: RoomStatusEvent);

    fn subscribe(&self, handler: Arc<dyn StatusEventHandler>);
}
