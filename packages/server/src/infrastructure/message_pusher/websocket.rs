//! WebSocket を使った MessagePusher 実装
//!
//! ## 責務
//!
//! - slug ごとのチャンネル（参加セッションと送信キューの集合）の管理
//! - セッションへのイベント送信（push_to, broadcast）
//!
//! ## 設計ノート
//!
//! 送信キュー（`UnboundedSender`）の生成は UI 層（`ui/handler/websocket.rs`）で行われます。
//! この実装は生成された sender を受け取り、イベントをエンコードして投入するだけです。
//!
//! ロックはチャンネル単位です。レジストリ（`DashMap`）のエントリガードを保持したまま
//! 参加者を追加し、空のチャンネルは `remove_if` で削除するため、
//! 削除途中のチャンネルに参加してしまうことはありません。
//! ロック順序は常に「レジストリのシャード → チャンネル」です。

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use dashmap::DashMap;

use crate::{
    domain::{MessagePushError, MessagePusher, PusherChannel, SessionId, Slug, ViewerEvent},
    infrastructure::dto::conversion::encode_viewer_event,
};

/// 1 ルーム分のチャンネル
#[derive(Default)]
struct Channel {
    members: Mutex<HashMap<SessionId, PusherChannel>>,
}

impl Channel {
    fn members(&self) -> MutexGuard<'_, HashMap<SessionId, PusherChannel>> {
        self.members.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn is_empty(&self) -> bool {
        self.members().is_empty()
    }
}

/// WebSocket を使った MessagePusher 実装
///
/// ## 使用例
///
/// ```ignore
/// let pusher = WebSocketMessagePusher::new();
/// pusher.join(&slug, session_id, tx, vec![ViewerEvent::Status { is_live: false }])?;
/// pusher.broadcast(&slug, &ViewerEvent::Status { is_live: true })?;
/// ```
#[derive(Default)]
pub struct WebSocketMessagePusher {
    /// Key: slug
    channels: DashMap<String, Arc<Channel>>,
}

impl WebSocketMessagePusher {
    pub fn new() -> Self {
        Self::default()
    }

    /// 参加者がいるチャンネル数
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    fn channel(&self, slug: &Slug) -> Option<Arc<Channel>> {
        self.channels
            .get(slug.as_str())
            .map(|entry| entry.value().clone())
    }

    fn remove_if_empty(&self, slug: &Slug) {
        if self
            .channels
            .remove_if(slug.as_str(), |_, channel| channel.is_empty())
            .is_some()
        {
            tracing::debug!("Channel '{}' is empty and was dropped", slug);
        }
    }
}

fn encode(event: &ViewerEvent) -> Result<String, MessagePushError> {
    encode_viewer_event(event).map_err(|e| MessagePushError::EncodeFailed(e.to_string()))
}

impl MessagePusher for WebSocketMessagePusher {
    fn join(
        &self,
        slug: &Slug,
        session_id: SessionId,
        sender: PusherChannel,
        snapshot: Vec<ViewerEvent>,
    ) -> Result<(), MessagePushError> {
        let frames = snapshot
            .iter()
            .map(encode)
            .collect::<Result<Vec<_>, _>>()?;

        let result = {
            let channel = self.channels.entry(slug.as_str().to_string()).or_default();
            let mut members = channel.members();
            let delivered = frames
                .into_iter()
                .try_for_each(|frame| sender.send(frame))
                .map_err(|e| MessagePushError::PushFailed(e.to_string()));
            if delivered.is_ok() {
                members.insert(session_id, sender);
                tracing::debug!(
                    "Session '{}' joined channel '{}' ({} members)",
                    session_id,
                    slug,
                    members.len()
                );
            }
            delivered
        };

        if result.is_err() {
            self.remove_if_empty(slug);
        }
        result
    }

    fn leave(&self, slug: &Slug, session_id: &SessionId) -> bool {
        let Some(channel) = self.channel(slug) else {
            return false;
        };

        let removed = channel.members().remove(session_id).is_some();
        if removed {
            tracing::debug!("Session '{}' left channel '{}'", session_id, slug);
        }
        self.remove_if_empty(slug);
        removed
    }

    fn push_to(
        &self,
        slug: &Slug,
        session_id: &SessionId,
        event: &ViewerEvent,
    ) -> Result<(), MessagePushError> {
        let sender = self
            .channel(slug)
            .and_then(|channel| channel.members().get(session_id).cloned())
            .ok_or_else(|| MessagePushError::ClientNotFound(session_id.to_string()))?;

        sender
            .send(encode(event)?)
            .map_err(|e| MessagePushError::PushFailed(e.to_string()))?;
        tracing::debug!("Pushed event to session '{}'", session_id);
        Ok(())
    }

    fn broadcast(&self, slug: &Slug, event: &ViewerEvent) -> Result<usize, MessagePushError> {
        let Some(channel) = self.channel(slug) else {
            tracing::debug!("No channel for '{}', event dropped", slug);
            return Ok(0);
        };

        let frame = encode(event)?;
        let targets: Vec<(SessionId, PusherChannel)> = channel
            .members()
            .iter()
            .map(|(id, sender)| (*id, sender.clone()))
            .collect();

        let mut delivered = 0;
        let mut closed = Vec::new();
        for (session_id, sender) in targets {
            // ブロードキャストでは一部の送信失敗を許容
            match sender.send(frame.clone()) {
                Ok(()) => delivered += 1,
                Err(_) => {
                    tracing::warn!(
                        "Session '{}' in channel '{}' is gone, pruning",
                        session_id,
                        slug
                    );
                    closed.push(session_id);
                }
            }
        }

        if !closed.is_empty() {
            {
                let mut members = channel.members();
                for session_id in &closed {
                    members.remove(session_id);
                }
            }
            self.remove_if_empty(slug);
        }

        tracing::debug!(
            "Broadcasted event to {} session(s) in channel '{}'",
            delivered,
            slug
        );
        Ok(delivered)
    }

    fn member_count(&self, slug: &Slug) -> usize {
        self.channel(slug)
            .map(|channel| channel.members().len())
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    // ========================================
    // テスト作業記録
    // ========================================
    // 【何をテストするか】
    // - チャンネルへの参加・離脱とチャンネルの自動破棄
    // - 参加時の snapshot 送信順序
    // - broadcast がチャンネル内の全員（送信者を含む）に届き、他のチャンネルには届かないこと
    // - 切断済みセッションの掃除
    //
    // 【なぜこのテストが必要か】
    // - MessagePusher はリレーの中核であり、配送範囲の誤りは情報漏えいに直結する
    // ========================================

    fn slug(value: &str) -> Slug {
        Slug::new(value.to_string()).unwrap()
    }

    fn decode(frame: Option<String>) -> serde_json::Value {
        serde_json::from_str(&frame.expect("frame expected")).unwrap()
    }

    #[test]
    fn test_join_sends_snapshot_in_order() {
        // テスト項目: 参加時に snapshot が順番通りに送信される
        // given (前提条件):
        let pusher = WebSocketMessagePusher::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let jam = slug("jam-night");

        // when (操作):
        let result = pusher.join(
            &jam,
            SessionId::generate(),
            tx,
            vec![
                ViewerEvent::History(vec![]),
                ViewerEvent::Status { is_live: false },
            ],
        );

        // then (期待する結果):
        assert!(result.is_ok());
        assert_eq!(decode(rx.try_recv().ok())["event"], "chat:history");
        assert_eq!(decode(rx.try_recv().ok())["event"], "stream:status");
        assert_eq!(pusher.member_count(&jam), 1);
    }

    #[test]
    fn test_broadcast_reaches_only_the_target_channel() {
        // テスト項目: ブロードキャストは対象チャンネルの全員に届き、他チャンネルには届かない
        // given (前提条件):
        let pusher = WebSocketMessagePusher::new();
        let (alex_tx, mut alex_rx) = mpsc::unbounded_channel();
        let (sam_tx, mut sam_rx) = mpsc::unbounded_channel();
        let (other_tx, mut other_rx) = mpsc::unbounded_channel();
        let jam = slug("jam-night");
        let other = slug("quiet-room");
        pusher
            .join(&jam, SessionId::generate(), alex_tx, vec![])
            .unwrap();
        pusher
            .join(&jam, SessionId::generate(), sam_tx, vec![])
            .unwrap();
        pusher
            .join(&other, SessionId::generate(), other_tx, vec![])
            .unwrap();

        // when (操作):
        let delivered = pusher
            .broadcast(&jam, &ViewerEvent::Status { is_live: true })
            .unwrap();

        // then (期待する結果):
        assert_eq!(delivered, 2);
        assert_eq!(decode(alex_rx.try_recv().ok())["data"]["isLive"], true);
        assert_eq!(decode(sam_rx.try_recv().ok())["data"]["isLive"], true);
        assert!(other_rx.try_recv().is_err());
    }

    #[test]
    fn test_broadcast_to_missing_channel_is_dropped() {
        // テスト項目: 参加者のいないチャンネルへのブロードキャストは破棄される
        // given (前提条件):
        let pusher = WebSocketMessagePusher::new();

        // when (操作):
        let result = pusher.broadcast(&slug("empty-room"), &ViewerEvent::Status { is_live: true });

        // then (期待する結果):
        assert_eq!(result, Ok(0));
        assert_eq!(pusher.channel_count(), 0);
    }

    #[test]
    fn test_leave_removes_empty_channel() {
        // テスト項目: 最後の参加者が離脱するとチャンネルが破棄される
        // given (前提条件):
        let pusher = WebSocketMessagePusher::new();
        let (tx, _rx) = mpsc::unbounded_channel();
        let jam = slug("jam-night");
        let session_id = SessionId::generate();
        pusher.join(&jam, session_id, tx, vec![]).unwrap();

        // when (操作):
        let removed = pusher.leave(&jam, &session_id);
        let removed_again = pusher.leave(&jam, &session_id);

        // then (期待する結果):
        assert!(removed);
        assert!(!removed_again);
        assert_eq!(pusher.member_count(&jam), 0);
        assert_eq!(pusher.channel_count(), 0);
    }

    #[test]
    fn test_push_to_unknown_session_fails() {
        // テスト項目: 参加していないセッションへの送信はエラーになる
        // given (前提条件):
        let pusher = WebSocketMessagePusher::new();
        let session_id = SessionId::generate();

        // when (操作):
        let result = pusher.push_to(
            &slug("jam-night"),
            &session_id,
            &ViewerEvent::Status { is_live: true },
        );

        // then (期待する結果):
        assert!(matches!(result, Err(MessagePushError::ClientNotFound(_))));
    }

    #[test]
    fn test_broadcast_prunes_closed_sessions() {
        // テスト項目: 受信側が閉じたセッションはブロードキャスト時に取り除かれる
        // given (前提条件):
        let pusher = WebSocketMessagePusher::new();
        let (alive_tx, mut alive_rx) = mpsc::unbounded_channel();
        let (dead_tx, dead_rx) = mpsc::unbounded_channel();
        let jam = slug("jam-night");
        pusher
            .join(&jam, SessionId::generate(), alive_tx, vec![])
            .unwrap();
        pusher
            .join(&jam, SessionId::generate(), dead_tx, vec![])
            .unwrap();
        drop(dead_rx);

        // when (操作):
        let delivered = pusher
            .broadcast(&jam, &ViewerEvent::Status { is_live: false })
            .unwrap();

        // then (期待する結果):
        assert_eq!(delivered, 1);
        assert!(alive_rx.try_recv().is_ok());
        assert_eq!(pusher.member_count(&jam), 1);
    }

    #[test]
    fn test_join_with_closed_receiver_leaves_no_state() {
        // テスト項目: snapshot を送れない場合は参加させず、空のチャンネルも残さない
        // given (前提条件):
        let pusher = WebSocketMessagePusher::new();
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        let jam = slug("jam-night");

        // when (操作):
        let result = pusher.join(
            &jam,
            SessionId::generate(),
            tx,
            vec![ViewerEvent::Status { is_live: false }],
        );

        // then (期待する結果):
        assert!(matches!(result, Err(MessagePushError::PushFailed(_))));
        assert_eq!(pusher.channel_count(), 0);
    }
}
