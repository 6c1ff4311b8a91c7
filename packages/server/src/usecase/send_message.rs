//! UseCase: チャット送信処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - SendMessageUseCase::execute() / acknowledge() メソッド
//! - メッセージの永続化とチャンネル全体へのブロードキャスト
//!
//! ### なぜこのテストが必要か
//! - 送信者を含む全参加者にちょうど 1 回届くことを保証
//! - 永続化に失敗したメッセージがブロードキャストされないことを保証
//! - 不正な内容ではストアが変化しないことを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：メッセージ送信とブロードキャスト
//! - 異常系：空白のみ・長すぎる内容、ストア障害
//! - エッジケース：送信者が既に切断している場合の ack

use std::sync::Arc;

use crate::domain::{
    ChatMessage, MessageContent, MessagePushError, MessagePusher, MessageRepository,
    NewChatMessage, SendAck, ViewerEvent, ViewerSession,
};

use super::{error::SendMessageError, sequencer::RoomSequencer};

/// チャット送信のユースケース
pub struct SendMessageUseCase {
    /// Repository（メッセージ履歴の永続化）
    messages: Arc<dyn MessageRepository>,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
    sequencer: Arc<RoomSequencer>,
}

impl SendMessageUseCase {
    /// 新しい SendMessageUseCase を作成
    pub fn new(
        messages: Arc<dyn MessageRepository>,
        message_pusher: Arc<dyn MessagePusher>,
        sequencer: Arc<RoomSequencer>,
    ) -> Self {
        Self {
            messages,
            message_pusher,
            sequencer,
        }
    }

    /// メッセージ送信を実行
    ///
    /// # Arguments
    ///
    /// * `session` - 送信者のセッション
    /// * `content` - 未検証のメッセージ内容
    ///
    /// # Returns
    ///
    /// * `Ok(ChatMessage)` - 永続化され、ブロードキャストされたメッセージ
    /// * `Err(SendMessageError)` - 検証または永続化に失敗（ブロードキャストは行われない）
    pub async fn execute(
        &self,
        session: &ViewerSession,
        content: String,
    ) -> Result<ChatMessage, SendMessageError> {
        // 1. 内容の検証
        let content = MessageContent::new(content)
            .map_err(|e| SendMessageError::InvalidPayload(e.to_string()))?;

        // 2. 永続化とブロードキャストをルーム単位で直列化
        let _guard = self.sequencer.lock(&session.room_id).await;

        let message = self
            .messages
            .insert_message(NewChatMessage {
                room_id: session.room_id,
                author: session.display_name.clone(),
                content,
            })
            .await
            .map_err(|e| {
                tracing::error!(
                    "Failed to persist message in room '{}': {}",
                    session.slug,
                    e
                );
                SendMessageError::Persistence(e.to_string())
            })?;

        // 3. 送信者を含むチャンネル全体にブロードキャスト
        match self
            .message_pusher
            .broadcast(&session.slug, &ViewerEvent::Chat(message.clone()))
        {
            Ok(delivered) => tracing::debug!(
                "Broadcasted message {} to {} viewers in '{}'",
                message.id,
                delivered,
                session.slug
            ),
            Err(e) => tracing::warn!(
                "Failed to broadcast message {} in '{}': {}",
                message.id,
                session.slug,
                e
            ),
        }

        Ok(message)
    }

    /// 送信者にのみ ack を返す
    ///
    /// 送信者が既に切断している場合は何もしない。
    pub fn acknowledge(&self, session: &ViewerSession, ack: SendAck) {
        match self
            .message_pusher
            .push_to(&session.slug, &session.id, &ViewerEvent::Ack(ack))
        {
            Ok(()) => {}
            Err(MessagePushError::ClientNotFound(_)) => {
                tracing::debug!("Session {} left before its ack was sent", session.id);
            }
            Err(e) => tracing::warn!("Failed to send ack to session {}: {}", session.id, e),
        }
    }
}
