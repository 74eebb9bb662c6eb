//! In-process hubs used by the harness integration tests.

#![allow(dead_code)]

use std::{future::Future, net::SocketAddr, sync::Arc, time::Duration};

use async_trait::async_trait;
use tokio::{
    net::{TcpListener, TcpStream},
    task::JoinHandle,
};
use tokio_tungstenite::{WebSocketStream, accept_async};
use wschat_client::{
    RunSettings,
    connector::{Connector, TungsteniteConnector, WsStream},
    error::HarnessError,
};
use wschat_server::{infrastructure::queue::DEFAULT_QUEUE_CAPACITY, ui, ui::state::AppState};

/// The real hub, served on an ephemeral port.
pub struct TestHub {
    addr: SocketAddr,
    handle: JoinHandle<()>,
}

impl TestHub {
    pub async fn start() -> Self {
        let servers_path = std::env::temp_dir().join(format!(
            "wschat-client-test-servers-{}.json",
            std::process::id()
        ));
        let state = Arc::new(AppState::new(servers_path, DEFAULT_QUEUE_CAPACITY));
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("Failed to read local addr");

        let handle = tokio::spawn(async move {
            if let Err(e) = ui::serve(listener, state).await {
                eprintln!("test hub stopped: {e}");
            }
        });

        Self { addr, handle }
    }

    pub fn ws_url(&self) -> String {
        format!("ws://{}/", self.addr)
    }
}

impl Drop for TestHub {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Accept a single connection and hand it to `script`.
pub async fn scripted_hub<F, Fut>(script: F) -> (String, JoinHandle<()>)
where
    F: FnOnce(WebSocketStream<TcpStream>) -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("Failed to read local addr");

    let handle = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.expect("Failed to accept");
        let ws = accept_async(stream).await.expect("Failed to upgrade");
        script(ws).await;
    });

    (format!("ws://{addr}/"), handle)
}

/// Address nothing listens on.
pub async fn closed_addr() -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("Failed to read local addr");
    drop(listener);
    format!("ws://{addr}/")
}

pub fn settings(addr: String, connections: usize, mpc: usize) -> RunSettings {
    RunSettings {
        addr,
        connections,
        messages_per_connection: mpc,
        same_start: false,
        timeout: Duration::from_secs(10),
    }
}

/// Connector that holds one worker back before dialing.
pub struct DelayedConnector {
    pub worker_id: usize,
    pub delay: Duration,
}

#[async_trait]
impl Connector for DelayedConnector {
    async fn connect(&self, worker_id: usize, addr: &str) -> Result<WsStream, HarnessError> {
        if worker_id == self.worker_id {
            tokio::time::sleep(self.delay).await;
        }
        TungsteniteConnector.connect(worker_id, addr).await
    }
}
