//! UseCase: 視聴者切断処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - DisconnectViewerUseCase::execute() メソッド
//!
//! ### なぜこのテストが必要か
//! - 切断したセッションにそれ以降のブロードキャストが届かないことを保証
//! - 最後の視聴者が抜けたチャンネルが破棄されることを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：参加中のセッションの切断
//! - エッジケース：最後の視聴者の切断、二重の切断

use std::sync::Arc;

use crate::domain::{MessagePusher, ViewerSession};

/// 視聴者切断のユースケース
///
/// チャンネルから外すだけで、退出の通知は行わない。
pub struct DisconnectViewerUseCase {
    message_pusher: Arc<dyn MessagePusher>,
}

impl DisconnectViewerUseCase {
    pub fn new(message_pusher: Arc<dyn MessagePusher>) -> Self {
        Self { message_pusher }
    }

    /// 視聴者切断を実行
    ///
    /// セッションがチャンネルに参加していた場合は `true` を返す。
    pub fn execute(&self, session: &ViewerSession) -> bool {
        let removed = self.message_pusher.leave(&session.slug, &session.id);
        if removed {
            tracing::info!(
                "Viewer '{}' left room '{}' (session {})",
                session.display_name.as_str(),
                session.slug,
                session.id
            );
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{DisplayName, PlaybackKey, RoomId, SessionId, Slug, ViewerEvent},
        infrastructure::message_pusher::WebSocketMessagePusher,
    };
    use tokio::sync::mpsc;

    fn create_session(display_name: &str) -> ViewerSession {
        ViewerSession {
            id: SessionId::generate(),
            room_id: RoomId::generate(),
            slug: Slug::new("jam-night".to_string()).unwrap(),
            display_name: DisplayName::new(display_name.to_string()).unwrap(),
            playback_token: PlaybackKey::new("ABC1234567".to_string()).unwrap(),
        }
    }

    #[test]
    fn test_disconnect_stops_delivery() {
        // テスト項目: 切断したセッションには以降のブロードキャストが届かない
        // given (前提条件):
        let pusher = Arc::new(WebSocketMessagePusher::new());
        let usecase = DisconnectViewerUseCase::new(pusher.clone());
        let alex = create_session("Alex");
        let sam = create_session("Sam");
        let (alex_tx, mut alex_rx) = mpsc::unbounded_channel();
        let (sam_tx, mut sam_rx) = mpsc::unbounded_channel();
        pusher.join(&alex.slug, alex.id, alex_tx, vec![]).unwrap();
        pusher.join(&sam.slug, sam.id, sam_tx, vec![]).unwrap();

        // when (操作):
        let removed = usecase.execute(&alex);
        pusher
            .broadcast(&sam.slug, &ViewerEvent::Status { is_live: true })
            .unwrap();

        // then (期待する結果):
        assert!(removed);
        assert!(alex_rx.try_recv().is_err());
        assert!(sam_rx.try_recv().is_ok());
        assert_eq!(pusher.member_count(&sam.slug), 1);
    }

    #[test]
    fn test_last_viewer_leaving_drops_channel() {
        // テスト項目: 最後の視聴者が抜けるとチャンネルが破棄され、二重の切断は false
        // given (前提条件):
        let pusher = Arc::new(WebSocketMessagePusher::new());
        let usecase = DisconnectViewerUseCase::new(pusher.clone());
        let alex = create_session("Alex");
        let (tx, _rx) = mpsc::unbounded_channel();
        pusher.join(&alex.slug, alex.id, tx, vec![]).unwrap();

        // when (操作):
        let first = usecase.execute(&alex);
        let second = usecase.execute(&alex);

        // then (期待する結果):
        assert!(first);
        assert!(!second);
        assert_eq!(pusher.channel_count(), 0);
    }
}
