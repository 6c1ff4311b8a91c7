//! UseCase: 視聴者接続処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - ConnectViewerUseCase::authenticate() / join() メソッド
//! - playback token による認証と、履歴 → ステータスのスナップショット送信
//!
//! ### なぜこのテストが必要か
//! - 別ルームの token やローテーション前の token で参加できないことを保証
//! - 参加直後に履歴がステータスより先に届くことを保証
//! - ストア障害時にチャンネルへ何も登録されないことを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：正しい token での参加
//! - 異常系：不正な形式、存在しないルーム、不一致の token、ストア障害
//! - エッジケース：履歴が 50 件を超える場合

use std::sync::Arc;

use crate::domain::{
    DisplayName, HISTORY_LIMIT, MessagePusher, MessageRepository, PlaybackKey, PusherChannel,
    RoomRepository, SessionId, Slug, ViewerEvent, ViewerSession,
};

use super::{error::ConnectError, sequencer::RoomSequencer};

/// ハンドシェイクで受け取った未検証の値
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HandshakeRequest {
    pub slug: String,
    pub token: String,
    pub display_name: String,
}

/// 視聴者接続のユースケース
pub struct ConnectViewerUseCase {
    rooms: Arc<dyn RoomRepository>,
    messages: Arc<dyn MessageRepository>,
    message_pusher: Arc<dyn MessagePusher>,
    sequencer: Arc<RoomSequencer>,
}

impl ConnectViewerUseCase {
    /// 新しい ConnectViewerUseCase を作成
    pub fn new(
        rooms: Arc<dyn RoomRepository>,
        messages: Arc<dyn MessageRepository>,
        message_pusher: Arc<dyn MessagePusher>,
        sequencer: Arc<RoomSequencer>,
    ) -> Self {
        Self {
            rooms,
            messages,
            message_pusher,
            sequencer,
        }
    }

    /// ハンドシェイクを検証し、セッションを作成する
    ///
    /// 形式の検証をルーム検索より先に行う。ルームが存在しない場合と
    /// token が一致しない場合はどちらも `Unauthorized`。
    /// この時点ではまだチャンネルに参加しない。
    pub async fn authenticate(
        &self,
        request: HandshakeRequest,
    ) -> Result<ViewerSession, ConnectError> {
        // 1. 形式の検証
        let slug = Slug::new(request.slug)?;
        let token = PlaybackKey::new(request.token)?;
        let display_name = DisplayName::new(request.display_name)?;

        // 2. ルームの検索
        let room = self
            .rooms
            .find_by_slug(&slug)
            .await?
            .ok_or(ConnectError::Unauthorized)?;

        // 3. capability token の照合
        if !room.authorizes_playback(&token) {
            return Err(ConnectError::Unauthorized);
        }

        Ok(ViewerSession {
            id: SessionId::generate(),
            room_id: room.id,
            slug: room.slug,
            display_name,
            playback_token: token,
        })
    }

    /// セッションをルームのチャンネルに参加させる
    ///
    /// 直近の履歴と現在の配信状態を、この順で `sender` に送ってから参加する。
    /// 失敗した場合はチャンネルに何も残らない。
    pub async fn join(
        &self,
        session: &ViewerSession,
        sender: PusherChannel,
    ) -> Result<(), ConnectError> {
        let _guard = self.sequencer.lock(&session.room_id).await;

        // ロック取得中に isLive が変わっている可能性があるため再取得する
        let room = self
            .rooms
            .find_by_slug(&session.slug)
            .await?
            .ok_or(ConnectError::Unauthorized)?;
        if !room.authorizes_playback(&session.playback_token) {
            return Err(ConnectError::Unauthorized);
        }

        let history = self
            .messages
            .recent_messages(&session.room_id, HISTORY_LIMIT)
            .await?;
        let history_len = history.len();

        self.message_pusher
            .join(
                &session.slug,
                session.id,
                sender,
                vec![
                    ViewerEvent::History(history),
                    ViewerEvent::Status {
                        is_live: room.is_live,
                    },
                ],
            )
            .map_err(|e| ConnectError::Persistence(e.to_string()))?;

        tracing::info!(
            "Viewer '{}' joined room '{}' (session {}, {} history messages)",
            session.display_name.as_str(),
            session.slug,
            session.id,
            history_len
        );
        Ok(())
    }
}
