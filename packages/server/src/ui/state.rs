//! Server state shared by every handler.

use std::{path::PathBuf, sync::Arc};

use crate::{
    domain::ConnectionRepository,
    infrastructure::{directory::EndpointDirectory, repository::InMemoryConnectionRepository},
};

/// Shared application state, built once at startup.
pub struct AppState {
    /// Registry of active connections（データアクセス層の抽象化）
    pub repository: Arc<dyn ConnectionRepository>,
    /// Name → endpoint URL directory
    pub directory: Arc<EndpointDirectory>,
    /// Capacity of each connection's outbound queue
    pub queue_capacity: usize,
}

impl AppState {
    pub fn new(servers_path: impl Into<PathBuf>, queue_capacity: usize) -> Self {
        Self {
            repository: Arc::new(InMemoryConnectionRepository::new()),
            directory: Arc::new(EndpointDirectory::new(servers_path)),
            queue_capacity,
        }
    }
}
