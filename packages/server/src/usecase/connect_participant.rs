//! UseCase: 参加者接続処理
//!
//! 新しい接続に ID を割り当て、既存の全接続へ connect メッセージを配信します。
//! 新しい接続自身をレジストリへ登録するのは、その接続へ connect メッセージを
//! 直接送信した後です（`announce` → 直接送信 → `register` の順序）。
//! これにより新しい接続は自分の connect を二重に受け取らず、既存の接続も取りこぼしません。

use std::sync::Arc;

use wschat_shared::{Action, Message};

use super::{broadcast, error::ConnectError};
use crate::domain::{ConnectionId, ConnectionIdFactory, ConnectionRepository, OutboundQueue};

/// Identity assigned to a new connection, with the encoded connect message
/// that must be written to it directly.
#[derive(Debug, Clone)]
pub struct Announcement {
    pub id: ConnectionId,
    pub payload: String,
}

/// 参加者接続のユースケース
pub struct ConnectParticipantUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn ConnectionRepository>,
}

impl ConnectParticipantUseCase {
    /// 新しい ConnectParticipantUseCase を作成
    pub fn new(repository: Arc<dyn ConnectionRepository>) -> Self {
        Self { repository }
    }

    /// ID を割り当て、現在登録されている全接続へ connect を配信する
    ///
    /// 新しい接続はまだ登録されないため、この配信には含まれません。
    pub async fn announce(&self) -> Result<Announcement, ConnectError> {
        let id = ConnectionIdFactory::generate()?;
        let payload = Message::system(Action::Connect, id.as_str()).encode()?;

        let recipients = broadcast(self.repository.as_ref(), &payload).await;
        tracing::debug!("Announced '{}' to {} connection(s)", id, recipients);

        Ok(Announcement { id, payload })
    }

    /// 接続の送信キューをレジストリへ登録する
    pub async fn register(
        &self,
        id: ConnectionId,
        queue: OutboundQueue,
    ) -> Result<(), ConnectError> {
        self.repository.add(id, queue).await?;
        Ok(())
    }
}
