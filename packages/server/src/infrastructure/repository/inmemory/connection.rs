//! InMemory Connection Repository 実装
//!
//! ドメイン層が定義する ConnectionRepository trait の具体的な実装。
//! シャード分割された DashMap をレジストリとして使用するため、
//! 追加・削除・スナップショット取得が単一のグローバルロックで直列化されません。

use async_trait::async_trait;
use dashmap::{DashMap, mapref::entry::Entry};

use crate::domain::{ConnectionId, ConnectionRepository, OutboundQueue, RepositoryError};

/// インメモリ Connection Repository 実装
#[derive(Default)]
pub struct InMemoryConnectionRepository {
    /// 接続中のクライアントの送信キュー
    connections: DashMap<ConnectionId, OutboundQueue>,
}

impl InMemoryConnectionRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ConnectionRepository for InMemoryConnectionRepository {
    async fn add(&self, id: ConnectionId, queue: OutboundQueue) -> Result<(), RepositoryError> {
        match self.connections.entry(id) {
            Entry::Occupied(entry) => Err(RepositoryError::DuplicateConnection(
                entry.key().as_str().to_string(),
            )),
            Entry::Vacant(entry) => {
                entry.insert(queue);
                Ok(())
            }
        }
    }

    async fn remove(&self, id: &ConnectionId) -> Result<OutboundQueue, RepositoryError> {
        self.connections
            .remove(id)
            .map(|(_, queue)| queue)
            .ok_or_else(|| RepositoryError::ConnectionNotFound(id.as_str().to_string()))
    }

    async fn snapshot(&self) -> Vec<(ConnectionId, OutboundQueue)> {
        // Each shard is read-locked only while it is being copied.
        self.connections
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect()
    }

    async fn ids(&self) -> Vec<ConnectionId> {
        self.connections
            .iter()
            .map(|entry| entry.key().clone())
            .collect()
    }

    async fn count(&self) -> usize {
        self.connections.len()
    }
}
