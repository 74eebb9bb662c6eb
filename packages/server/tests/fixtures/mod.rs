//! In-process hub used by the integration tests.

#![allow(dead_code)]

use std::{net::SocketAddr, path::PathBuf, sync::Arc, time::Duration};

use tokio::{net::TcpListener, task::JoinHandle};
use wschat_server::{infrastructure::queue::DEFAULT_QUEUE_CAPACITY, ui, ui::state::AppState};

pub struct TestServer {
    addr: SocketAddr,
    pub state: Arc<AppState>,
    handle: JoinHandle<()>,
}

impl TestServer {
    /// Start a hub on an ephemeral port with an endpoint directory at `servers_path`.
    pub async fn start_with_servers_path(servers_path: PathBuf) -> Self {
        let state = Arc::new(AppState::new(servers_path, DEFAULT_QUEUE_CAPACITY));
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("Failed to read local addr");

        let handle = tokio::spawn({
            let state = state.clone();
            async move {
                if let Err(e) = ui::serve(listener, state).await {
                    eprintln!("test server stopped: {e}");
                }
            }
        });

        Self {
            addr,
            state,
            handle,
        }
    }

    pub async fn start() -> Self {
        Self::start_with_servers_path(temp_servers_path()).await
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn ws_url(&self) -> String {
        format!("ws://{}/ws", self.addr)
    }

    /// Wait until exactly `n` connections are registered.
    pub async fn wait_for_connections(&self, n: usize) {
        let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
        while self.state.repository.count().await != n {
            assert!(
                tokio::time::Instant::now() < deadline,
                "timed out waiting for {n} registered connection(s)"
            );
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

pub fn temp_servers_path() -> PathBuf {
    std::env::temp_dir().join(format!(
        "wschat-servers-{}-{}.json",
        std::process::id(),
        uuid::Uuid::new_v4()
    ))
}
