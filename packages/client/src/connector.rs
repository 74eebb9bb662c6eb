//! Connection establishment seam.
//!
//! Workers never dial directly; they go through a [`Connector`] so that tests
//! can inject latency or failures per worker.

use async_trait::async_trait;
use tokio::net::TcpStream;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

use crate::error::HarnessError;

pub type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

#[async_trait]
pub trait Connector: Send + Sync {
    /// Open a WebSocket connection to `addr` on behalf of `worker_id`.
    async fn connect(&self, worker_id: usize, addr: &str) -> Result<WsStream, HarnessError>;
}

/// Plain tungstenite dialer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TungsteniteConnector;

#[async_trait]
impl Connector for TungsteniteConnector {
    async fn connect(&self, worker_id: usize, addr: &str) -> Result<WsStream, HarnessError> {
        let (ws, _) = connect_async(addr).await.map_err(|e| {
            tracing::debug!("Worker #{}: dial failed: {}", worker_id, e);
            HarnessError::Connect(e.to_string())
        })?;
        Ok(ws)
    }
}
