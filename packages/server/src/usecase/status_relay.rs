//! Status bus subscriber that forwards liveness transitions to viewers.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use crate::domain::{MessagePusher, RoomStatusEvent, StatusEventHandler, ViewerEvent};

/// Broadcasts every `RoomStatusEvent` to the channel of the event's slug.
///
/// Never lets a fault escape into the publisher: push errors and panics are
/// logged and dropped. An empty channel simply drops the event.
pub struct StatusRelay {
    message_pusher: Arc<dyn MessagePusher>,
}

impl StatusRelay {
    pub fn new(message_pusher: Arc<dyn MessagePusher>) -> Self {
        Self { message_pusher }
    }
}

impl StatusEventHandler for StatusRelay {
    fn handle(&self, event: &RoomStatusEvent) {
        let status = ViewerEvent::Status {
            is_live: event.is_live,
        };
        let outcome = catch_unwind(AssertUnwindSafe(|| {
            self.message_pusher.broadcast(&event.slug, &status)
        }));

        match outcome {
            Ok(Ok(delivered)) => tracing::info!(
                "Room '{}' is now {} ({} viewers notified)",
                event.slug,
                if event.is_live { "live" } else { "offline" },
                delivered
            ),
            Ok(Err(e)) => tracing::error!(
                "Failed to relay status of room '{}': {}",
                event.slug,
                e
            ),
            Err(_) => tracing::error!("Status relay panicked for room '{}'", event.slug),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{MessagePushError, PusherChannel, RoomId, SessionId, Slug},
        infrastructure::message_pusher::WebSocketMessagePusher,
    };
    use tokio::sync::mpsc;

    fn event(slug: &str, is_live: bool) -> RoomStatusEvent {
        RoomStatusEvent {
            room_id: RoomId::generate(),
            slug: Slug::new(slug.to_string()).unwrap(),
            is_live,
        }
    }

    /// broadcast で常に panic する MessagePusher
    struct PanickingPusher;

    impl MessagePusher for PanickingPusher {
        fn join(
            &self,
            _slug: &Slug,
            _session_id: SessionId,
            _sender: PusherChannel,
            _snapshot: Vec<ViewerEvent>,
        ) -> Result<(), MessagePushError> {
            Ok(())
        }

        fn leave(&self, _slug: &Slug, _session_id: &SessionId) -> bool {
            false
        }

        fn push_to(
            &self,
            _slug: &Slug,
            session_id: &SessionId,
            _event: &ViewerEvent,
        ) -> Result<(), MessagePushError> {
            Err(MessagePushError::ClientNotFound(session_id.to_string()))
        }

        fn broadcast(&self, _slug: &Slug, _event: &ViewerEvent) -> Result<usize, MessagePushError> {
            panic!("broadcast exploded");
        }

        fn member_count(&self, _slug: &Slug) -> usize {
            0
        }
    }

    #[test]
    fn test_relay_forwards_status_to_matching_channel() {
        // テスト項目: イベントの slug のチャンネルにだけステータスが届く
        // given (前提条件):
        let pusher = Arc::new(WebSocketMessagePusher::new());
        let relay = StatusRelay::new(pusher.clone());
        let jam = Slug::new("jam-night".to_string()).unwrap();
        let other = Slug::new("other-room".to_string()).unwrap();
        let (jam_tx, mut jam_rx) = mpsc::unbounded_channel();
        let (other_tx, mut other_rx) = mpsc::unbounded_channel();
        pusher.join(&jam, SessionId::generate(), jam_tx, vec![]).unwrap();
        pusher
            .join(&other, SessionId::generate(), other_tx, vec![])
            .unwrap();

        // when (操作):
        relay.handle(&event("jam-night", true));

        // then (期待する結果):
        let frame: serde_json::Value = serde_json::from_str(&jam_rx.try_recv().unwrap()).unwrap();
        assert_eq!(frame["event"], "stream:status");
        assert_eq!(frame["data"]["isLive"], true);
        assert!(other_rx.try_recv().is_err());
    }

    #[test]
    fn test_relay_with_empty_channel_drops_event() {
        // テスト項目: 視聴者のいないルームのイベントは破棄され、チャンネルも作られない
        // given (前提条件):
        let pusher = Arc::new(WebSocketMessagePusher::new());
        let relay = StatusRelay::new(pusher.clone());

        // when (操作):
        relay.handle(&event("jam-night", false));

        // then (期待する結果):
        assert_eq!(pusher.channel_count(), 0);
    }

    #[test]
    fn test_relay_swallows_panics() {
        // テスト項目: ブロードキャスト中の panic が publish 側に伝播しない
        // given (前提条件):
        let relay = StatusRelay::new(Arc::new(PanickingPusher));

        // when (操作) / then (期待する結果):
        relay.handle(&event("jam-night", true));
    }
}
