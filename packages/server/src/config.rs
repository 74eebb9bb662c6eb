//! Command line configuration of the hub.

use std::path::PathBuf;

use clap::Parser;

use crate::infrastructure::queue::DEFAULT_QUEUE_CAPACITY;

/// WebSocket broadcast hub.
#[derive(Debug, Clone, Parser)]
#[command(version, about)]
pub struct ServerConfig {
    /// Address to serve on
    #[arg(long, default_value = "127.0.0.1:8000")]
    pub addr: String,

    /// Path to a JSON object mapping unique server names to full endpoint URLs
    #[arg(long, default_value = "./servers.json")]
    pub servers_path: PathBuf,

    /// Capacity of each connection's outbound queue
    #[arg(long, default_value_t = DEFAULT_QUEUE_CAPACITY)]
    pub queue_capacity: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        // テスト項目: 引数なしの場合はデフォルト値が使われる
        let config = ServerConfig::try_parse_from(["wschat-server"]).unwrap();

        assert_eq!(config.addr, "127.0.0.1:8000");
        assert_eq!(config.servers_path, PathBuf::from("./servers.json"));
        assert_eq!(config.queue_capacity, 50);
    }

    #[test]
    fn test_overrides() {
        // テスト項目: 引数で各値を上書きできる
        let config = ServerConfig::try_parse_from([
            "wschat-server",
            "--addr",
            "0.0.0.0:9000",
            "--servers-path",
            "/etc/wschat/servers.json",
            "--queue-capacity",
            "8",
        ])
        .unwrap();

        assert_eq!(config.addr, "0.0.0.0:9000");
        assert_eq!(config.queue_capacity, 8);
    }
}
