//! Wire message codec.
//!
//! Every WebSocket text frame exchanged with the hub carries exactly one JSON
//! encoded [`Message`]. The `action` field is a closed set; anything outside
//! it is rejected on decode with [`CodecError::InvalidAction`].

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::time::unix_nanos;

/// Sender name used for messages originated by the hub itself.
pub const SYSTEM_SENDER: &str = "system";

/// Codec errors
#[derive(Debug, Error)]
pub enum CodecError {
    /// Action string outside the closed enumeration
    #[error("invalid action: {0}")]
    InvalidAction(String),

    /// Payload is not a well-formed message (bad JSON, missing action, wrong types)
    #[error("malformed message: {0}")]
    Malformed(#[source] serde_json::Error),

    /// Serialization failure
    #[error("failed to encode message: {0}")]
    Encode(#[source] serde_json::Error),
}

/// Message action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum Action {
    Connect,
    Chat,
    Disconnect,
    Error,
}

impl Action {
    pub const ALL: [Action; 4] = [
        Action::Connect,
        Action::Chat,
        Action::Disconnect,
        Action::Error,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Connect => "connect",
            Action::Chat => "chat",
            Action::Disconnect => "disconnect",
            Action::Error => "error",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "connect" => Ok(Action::Connect),
            "chat" => Ok(Action::Chat),
            "disconnect" => Ok(Action::Disconnect),
            "error" => Ok(Action::Error),
            other => Err(CodecError::InvalidAction(other.to_string())),
        }
    }
}

impl TryFrom<String> for Action {
    type Error = CodecError;

    fn try_from(value: String) -> Result<Self, CodecError> {
        value.parse()
    }
}

/// A single wire message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sender: Option<String>,
    pub action: Action,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contents: Option<String>,
    /// Unix timestamp in nanoseconds. Informational only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

/// Decoding shape: the action stays a raw string so that an out-of-set value
/// surfaces as `InvalidAction` rather than a generic serde error.
#[derive(Deserialize)]
struct WireMessage {
    #[serde(default)]
    sender: Option<String>,
    action: String,
    #[serde(default)]
    contents: Option<String>,
    #[serde(default)]
    timestamp: Option<i64>,
}

impl Message {
    /// Message originated by the hub (`sender = "system"`).
    pub fn system(action: Action, contents: impl Into<String>) -> Self {
        Self {
            sender: Some(SYSTEM_SENDER.to_string()),
            action,
            contents: Some(contents.into()),
            timestamp: Some(unix_nanos()),
        }
    }

    /// Chat message from `sender`.
    pub fn chat(sender: impl Into<String>, contents: impl Into<String>) -> Self {
        Self {
            sender: Some(sender.into()),
            action: Action::Chat,
            contents: Some(contents.into()),
            timestamp: Some(unix_nanos()),
        }
    }

    pub fn sender(&self) -> Option<&str> {
        self.sender.as_deref()
    }

    pub fn contents(&self) -> &str {
        self.contents.as_deref().unwrap_or_default()
    }

    pub fn encode(&self) -> Result<String, CodecError> {
        serde_json::to_string(self).map_err(CodecError::Encode)
    }

    pub fn decode(text: &str) -> Result<Self, CodecError> {
        let wire: WireMessage = serde_json::from_str(text).map_err(CodecError::Malformed)?;
        Ok(Self {
            sender: wire.sender,
            action: wire.action.parse()?,
            contents: wire.contents,
            timestamp: wire.timestamp,
        })
    }
}
