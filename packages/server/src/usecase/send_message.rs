//! UseCase: メッセージ送信処理
//!
//! 受信したメッセージを chat として全接続へ再配信します。
//! 送信者はクライアントが名乗った値ではなく、接続に割り当てた ID で上書きされます。

use std::sync::Arc;

use wschat_shared::{Action, Message};

use super::{broadcast, error::SendMessageError};
use crate::domain::{ConnectionId, ConnectionRepository};

/// Contents of the error message sent back for an undecodable frame.
pub const BAD_MESSAGE: &str = "bad message";

/// メッセージ送信のユースケース
pub struct SendMessageUseCase {
    repository: Arc<dyn ConnectionRepository>,
}

impl SendMessageUseCase {
    pub fn new(repository: Arc<dyn ConnectionRepository>) -> Self {
        Self { repository }
    }

    /// `inbound` を `sender` からの chat として全接続へ配信する
    ///
    /// # Returns
    ///
    /// 配信できた接続数
    pub async fn execute(
        &self,
        sender: &ConnectionId,
        inbound: Message,
    ) -> Result<usize, SendMessageError> {
        let contents = inbound.contents.unwrap_or_default();
        let payload = Message::chat(sender.as_str(), contents).encode()?;

        Ok(broadcast(self.repository.as_ref(), &payload).await)
    }

    /// Encoded error message answering a malformed inbound frame.
    pub fn rejection() -> Result<String, SendMessageError> {
        Ok(Message::system(Action::Error, BAD_MESSAGE).encode()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::{queue::SafeQueue, repository::InMemoryConnectionRepository};

    async fn setup() -> (
        Arc<InMemoryConnectionRepository>,
        tokio::sync::mpsc::Receiver<String>,
        tokio::sync::mpsc::Receiver<String>,
    ) {
        let repository = Arc::new(InMemoryConnectionRepository::new());
        let (q1, rx1) = SafeQueue::new(8);
        let (q2, rx2) = SafeQueue::new(8);
        repository
            .add(ConnectionId::new("alice".to_string()).unwrap(), q1)
            .await
            .unwrap();
        repository
            .add(ConnectionId::new("bob".to_string()).unwrap(), q2)
            .await
            .unwrap();
        (repository, rx1, rx2)
    }

    #[tokio::test]
    async fn test_chat_is_broadcast_to_everyone_including_sender() {
        // テスト項目: chat は送信者を含む全接続へ配信される
        // given (前提条件):
        let (repository, mut alice_rx, mut bob_rx) = setup().await;
        let usecase = SendMessageUseCase::new(repository);
        let alice = ConnectionId::new("alice".to_string()).unwrap();

        // when (操作):
        let delivered = usecase
            .execute(&alice, Message::chat("alice", "hello"))
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(delivered, 2);
        for rx in [&mut alice_rx, &mut bob_rx] {
            let msg = Message::decode(&rx.recv().await.unwrap()).unwrap();
            assert_eq!(msg.action, Action::Chat);
            assert_eq!(msg.sender(), Some("alice"));
            assert_eq!(msg.contents(), "hello");
        }
    }

    #[tokio::test]
    async fn test_sender_is_overwritten_with_true_identity() {
        // テスト項目: クライアントが偽の sender や action を送っても、接続の ID の chat になる
        // given (前提条件):
        let (repository, _alice_rx, mut bob_rx) = setup().await;
        let usecase = SendMessageUseCase::new(repository);
        let alice = ConnectionId::new("alice".to_string()).unwrap();
        let spoofed = Message {
            sender: Some("bob".to_string()),
            action: Action::Disconnect,
            contents: Some("spoof".to_string()),
            timestamp: None,
        };

        // when (操作):
        usecase.execute(&alice, spoofed).await.unwrap();

        // then (期待する結果):
        let msg = Message::decode(&bob_rx.recv().await.unwrap()).unwrap();
        assert_eq!(msg.action, Action::Chat);
        assert_eq!(msg.sender(), Some("alice"));
        assert_eq!(msg.contents(), "spoof");
    }

    #[test]
    fn test_rejection_payload() {
        // テスト項目: 不正メッセージへの応答は system からの error "bad message"
        let msg = Message::decode(&SendMessageUseCase::rejection().unwrap()).unwrap();

        assert_eq!(msg.action, Action::Error);
        assert_eq!(msg.sender(), Some("system"));
        assert_eq!(msg.contents(), BAD_MESSAGE);
    }
}
