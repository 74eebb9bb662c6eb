//! UseCase: 参加者切断処理
//!
//! レジストリから接続を削除し、送信キューを Close した後、
//! 残りの全接続へ disconnect を非同期に配信します。
//! 配信の完了は待たないため、切断処理自体はブロックされません。

use std::sync::Arc;

use tokio::task::JoinHandle;
use wschat_shared::{Action, Message};

use super::{broadcast, error::DisconnectError};
use crate::domain::{ConnectionId, ConnectionRepository};

/// 参加者切断のユースケース
pub struct DisconnectParticipantUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn ConnectionRepository>,
}

impl DisconnectParticipantUseCase {
    /// 新しい DisconnectParticipantUseCase を作成
    pub fn new(repository: Arc<dyn ConnectionRepository>) -> Self {
        Self { repository }
    }

    /// 参加者切断を実行
    ///
    /// # Returns
    ///
    /// * `Ok(JoinHandle<usize>)` - disconnect 配信タスク（完了時に配信数を返す）
    /// * `Err(DisconnectError)` - 接続がレジストリに存在しない
    pub async fn execute(&self, id: &ConnectionId) -> Result<JoinHandle<usize>, DisconnectError> {
        let queue = self.repository.remove(id).await?;
        queue.close().await;

        let payload = Message::system(Action::Disconnect, id.as_str()).encode()?;
        let repository = self.repository.clone();
        let departed = id.clone();
        let handle = tokio::spawn(async move {
            let recipients = broadcast(repository.as_ref(), &payload).await;
            tracing::debug!(
                "Broadcasted disconnect of '{}' to {} connection(s)",
                departed,
                recipients
            );
            recipients
        });

        Ok(handle)
    }

    /// 残りの参加者数を取得
    pub async fn count_remaining_participants(&self) -> usize {
        self.repository.count().await
    }
}
