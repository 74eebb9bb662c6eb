//! Connection registry abstraction.
//!
//! The use case layer depends on this trait only; the concrete storage lives
//! in `infrastructure::repository`.

use std::sync::Arc;

use async_trait::async_trait;

use super::{ConnectionId, RepositoryError};
use crate::infrastructure::queue::SafeQueue;

/// Outbound queue of one connection, holding encoded messages.
pub type OutboundQueue = Arc<SafeQueue<String>>;

/// Registry of the currently active connections.
///
/// Implementations must support concurrent add/remove/snapshot without one
/// lock being held across a whole broadcast.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ConnectionRepository: Send + Sync {
    /// Register a connection's outbound queue.
    async fn add(&self, id: ConnectionId, queue: OutboundQueue) -> Result<(), RepositoryError>;

    /// Remove a connection, returning its queue.
    async fn remove(&self, id: &ConnectionId) -> Result<OutboundQueue, RepositoryError>;

    /// Copy of the current members, taken without blocking concurrent writers for
    /// longer than a single shard access.
    async fn snapshot(&self) -> Vec<(ConnectionId, OutboundQueue)>;

    /// Identities of all active connections.
    async fn ids(&self) -> Vec<ConnectionId>;

    /// Number of active connections.
    async fn count(&self) -> usize;
}
