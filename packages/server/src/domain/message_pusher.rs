//! MessagePusher trait 定義
//!
//! 接続中の視聴者へのイベント送信（通知）のインターフェース。
//! ルーム（slug）ごとのチャンネルに参加しているセッションの集合を管理し、
//! 個別送信とブロードキャストを提供します。
//!
//! 送信はすべてメモリ上のキューへの投入なので同期的に完了し、
//! ステータスバスのハンドラからも直接呼び出せます。

use tokio::sync::mpsc;

use super::{ChatMessage, MessagePushError, SessionId, Slug};

/// セッションごとの送信キュー（エンコード済みフレーム）
pub type PusherChannel = mpsc::UnboundedSender<String>;

/// Acknowledgment of one chat send, delivered to the sender only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendAck {
    pub ack_id: Option<u64>,
    pub success: bool,
    pub error: Option<String>,
}

impl SendAck {
    pub fn ok(ack_id: Option<u64>) -> Self {
        Self {
            ack_id,
            success: true,
            error: None,
        }
    }

    pub fn failed(ack_id: Option<u64>, reason: impl Into<String>) -> Self {
        Self {
            ack_id,
            success: false,
            error: Some(reason.into()),
        }
    }
}

/// Events delivered to a viewer connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewerEvent {
    /// Recent chat backlog, oldest first.
    History(Vec<ChatMessage>),
    Status { is_live: bool },
    Chat(ChatMessage),
    Ack(SendAck),
}

/// MessagePusher trait
///
/// ## 責務
///
/// - slug ごとのチャンネル参加者（セッション）の管理
/// - 個別送信（push_to）とチャンネル全体へのブロードキャスト（broadcast）
///
/// チャンネルは最初の参加で作成され、最後の参加者が離脱すると破棄される。
pub trait MessagePusher: Send + Sync {
    /// セッションをチャンネルに参加させ、`snapshot` を順に送信する
    ///
    /// 参加と snapshot の送信は、同じチャンネルへのブロードキャストに対して
    /// アトミックに行われる（snapshot より前に他のイベントが届くことはない）。
    fn join(
        &self,
        slug: &Slug,
        session_id: SessionId,
        sender: PusherChannel,
        snapshot: Vec<ViewerEvent>,
    ) -> Result<(), MessagePushError>;

    /// セッションをチャンネルから外す。参加していた場合は `true`
    fn leave(&self, slug: &Slug, session_id: &SessionId) -> bool;

    /// 特定のセッションにイベントを送信
    fn push_to(
        &self,
        slug: &Slug,
        session_id: &SessionId,
        event: &ViewerEvent,
    ) -> Result<(), MessagePushError>;

    /// チャンネルの全参加者にイベントを送信し、送信できた件数を返す
    ///
    /// 一部の参加者への送信失敗は許容する。
    fn broadcast(&self, slug: &Slug, event: &ViewerEvent) -> Result<usize, MessagePushError>;

    /// チャンネルの参加者数
    fn member_count(&self, slug: &Slug) -> usize;
}
