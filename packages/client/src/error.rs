//! Harness error definitions.

use std::io;

use thiserror::Error;
use wschat_shared::Action;

/// Errors observed by a worker while exercising the hub.
///
/// Kept as data (no transport error sources) so that results can be cloned,
/// compared and browsed after the run.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HarnessError {
    /// Transport failure or timeout before the handshake
    #[error("error connecting: {0}")]
    Connect(String),

    /// Undecodable message from the hub
    #[error("protocol error: {0}")]
    Protocol(String),

    /// No connect message within the phase timeout
    #[error("timed out waiting for the connect message")]
    HandshakeTimeout,

    /// Write failure or write deadline
    #[error("error sending message #{index}: {reason}")]
    Send { index: usize, reason: String },

    /// Read failure or read deadline
    #[error("error receiving: {0}")]
    Receive(String),

    /// Wrong action where another one was required
    #[error("expected {expected}, got {got} (contents: {contents:?})")]
    UnexpectedMessage {
        expected: Action,
        got: Action,
        contents: String,
    },

    /// Explicit error message sent by the hub
    #[error("server error: {0}")]
    ServerReported(String),
}

/// Invalid harness configuration. Fatal before any connection is attempted.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("must provide address")]
    MissingAddr,

    #[error("bad address {addr:?}: {reason}")]
    InvalidAddr { addr: String, reason: String },
}

/// Top-level errors of the harness binary.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unexpected_message_names_expected_action() {
        // テスト項目: UnexpectedMessage の表示は期待した action と実際の action を示す
        let err = HarnessError::UnexpectedMessage {
            expected: Action::Chat,
            got: Action::Disconnect,
            contents: "abc".to_string(),
        };

        assert_eq!(
            err.to_string(),
            r#"expected chat, got disconnect (contents: "abc")"#
        );
    }

    #[test]
    fn test_send_error_display() {
        // テスト項目: Send エラーは失敗したメッセージ番号を含む
        let err = HarnessError::Send {
            index: 3,
            reason: "broken pipe".to_string(),
        };

        assert_eq!(err.to_string(), "error sending message #3: broken pipe");
    }
}
