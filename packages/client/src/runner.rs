//! Validation worker.
//!
//! One `TestRunner` drives one connection through
//! `Connecting → AwaitingHandshake → Active{Sending ‖ Receiving} → Closed`
//! and publishes a single [`TestResult`].
//!
//! The runner task owns the write half and the result record. Receiving runs
//! in a spawned task that owns the read half and hands its
//! [`ReceiveOutcome`] back over a one-shot channel.

use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use futures_util::{
    sink::SinkExt,
    stream::{SplitSink, SplitStream, StreamExt},
};
use tokio::sync::oneshot;
use tokio_tungstenite::tungstenite::Message as Frame;
use wschat_shared::{Action, Message};

use crate::{
    config::RunSettings,
    connector::{Connector, WsStream},
    error::HarnessError,
    gate::StartGate,
    result::{ReceiveOutcome, TestResult},
};

/// Extra time granted to the receive task beyond its own deadline.
const RECEIVE_GRACE: Duration = Duration::from_secs(5);

/// Chat contents sent by worker `worker_id` for its `index`-th message.
pub fn message_contents(worker_id: usize, index: usize) -> String {
    format!("Worker #{}: Message {}", worker_id, index)
}

pub struct TestRunner {
    worker_id: usize,
    settings: Arc<RunSettings>,
    connector: Arc<dyn Connector>,
    gate: Option<StartGate>,
}

impl TestRunner {
    pub fn new(
        worker_id: usize,
        settings: Arc<RunSettings>,
        connector: Arc<dyn Connector>,
        gate: Option<StartGate>,
    ) -> Self {
        Self {
            worker_id,
            settings,
            connector,
            gate,
        }
    }

    pub async fn run(mut self) -> TestResult {
        let mut result = TestResult::new(self.worker_id);

        // Connecting
        let connection = self.connect(&mut result).await;
        if let Some(gate) = &self.gate {
            gate.arrive().await;
        }
        let Some(ws) = connection else {
            return result;
        };
        let (mut write, mut read) = ws.split();

        // AwaitingHandshake
        let Some(identity) = self.await_handshake(&mut read, &mut result).await else {
            let _ = write.close().await;
            return result;
        };
        tracing::debug!("Worker #{}: identity '{}'", self.worker_id, identity);
        result.identity = Some(identity.clone());

        if let Some(gate) = self.gate.as_mut() {
            gate.wait().await;
        }

        // Active
        let (done_tx, done_rx) = oneshot::channel();
        let receiver = tokio::spawn(receive_loop(
            read,
            identity.clone(),
            self.settings.messages_per_connection,
            self.settings.timeout,
            done_tx,
        ));

        self.send_all(&mut write, &identity, &mut result).await;

        // Closed
        let wait_limit = self.settings.timeout + RECEIVE_GRACE;
        match tokio::time::timeout(wait_limit, done_rx).await {
            Ok(Ok(outcome)) => outcome.apply_to(&mut result),
            Ok(Err(_)) => {
                result.receive_error = Some(HarnessError::Receive(
                    "receiver stopped without reporting".to_string(),
                ));
            }
            Err(_) => {
                receiver.abort();
                result.receive_error = Some(HarnessError::Receive(
                    "receiver did not finish in time".to_string(),
                ));
            }
        }

        if let Err(e) = write.close().await {
            tracing::debug!("Worker #{}: error closing: {}", self.worker_id, e);
        }
        result
    }

    async fn connect(&self, result: &mut TestResult) -> Option<WsStream> {
        let start = Instant::now();
        let attempt = tokio::time::timeout(
            self.settings.timeout,
            self.connector.connect(self.worker_id, &self.settings.addr),
        )
        .await;
        result.connect_duration = start.elapsed();

        let error = match attempt {
            Ok(Ok(ws)) => {
                result.connected = true;
                result.connected_at = Some(Instant::now());
                return Some(ws);
            }
            Ok(Err(e)) => e,
            Err(_) => HarnessError::Connect(format!(
                "timed out after {:?}",
                self.settings.timeout
            )),
        };
        tracing::warn!("Worker #{}: {}", self.worker_id, error);
        result.connect_error = Some(error);
        None
    }

    async fn await_handshake(
        &self,
        read: &mut SplitStream<WsStream>,
        result: &mut TestResult,
    ) -> Option<String> {
        let deadline = tokio::time::Instant::now() + self.settings.timeout;
        match next_message(read, deadline).await {
            Ok(msg) if msg.action == Action::Connect => Some(msg.contents().to_string()),
            Ok(msg) => {
                result.stop_reason = Some(HarnessError::UnexpectedMessage {
                    expected: Action::Connect,
                    got: msg.action,
                    contents: msg.contents().to_string(),
                });
                None
            }
            Err(ReadFailure::Timeout) => {
                result.receive_error = Some(HarnessError::HandshakeTimeout);
                None
            }
            Err(ReadFailure::Transport(reason)) => {
                result.receive_error = Some(HarnessError::Receive(format!(
                    "error receiving identity: {reason}"
                )));
                None
            }
            Err(ReadFailure::Decode(reason)) => {
                result.receive_error = Some(HarnessError::Protocol(reason));
                None
            }
        }
    }

    /// Send phase: stops at the first failure under a single write deadline.
    async fn send_all(
        &self,
        write: &mut SplitSink<WsStream, Frame>,
        identity: &str,
        result: &mut TestResult,
    ) {
        let start = Instant::now();
        let deadline = tokio::time::Instant::now() + self.settings.timeout;

        for index in 1..=self.settings.messages_per_connection {
            let payload = match Message::chat(identity, message_contents(self.worker_id, index))
                .encode()
            {
                Ok(payload) => payload,
                Err(e) => {
                    result.send_error = Some(HarnessError::Protocol(e.to_string()));
                    break;
                }
            };

            result.first_send_at.get_or_insert_with(Instant::now);
            let sending = write.send(Frame::Text(payload.into()));
            let error = match tokio::time::timeout_at(deadline, sending).await {
                Ok(Ok(())) => {
                    result.messages_sent += 1;
                    continue;
                }
                Ok(Err(e)) => e.to_string(),
                Err(_) => "write deadline exceeded".to_string(),
            };
            tracing::warn!(
                "Worker #{}: error sending message #{}: {}",
                self.worker_id,
                index,
                error
            );
            result.send_error = Some(HarnessError::Send {
                index,
                reason: error,
            });
            break;
        }

        result.send_duration = start.elapsed();
    }
}

enum ReadFailure {
    Timeout,
    Transport(String),
    Decode(String),
}

/// Next decoded message, skipping control and binary frames.
async fn next_message(
    read: &mut SplitStream<WsStream>,
    deadline: tokio::time::Instant,
) -> Result<Message, ReadFailure> {
    loop {
        let frame = match tokio::time::timeout_at(deadline, read.next()).await {
            Err(_) => return Err(ReadFailure::Timeout),
            Ok(None) => {
                return Err(ReadFailure::Transport(
                    "connection closed by server".to_string(),
                ));
            }
            Ok(Some(Err(e))) => return Err(ReadFailure::Transport(e.to_string())),
            Ok(Some(Ok(frame))) => frame,
        };

        match frame {
            Frame::Text(text) => {
                return Message::decode(text.as_str())
                    .map_err(|e| ReadFailure::Decode(format!("{e} (msg: {})", text.as_str())));
            }
            Frame::Close(_) => {
                return Err(ReadFailure::Transport(
                    "connection closed by server".to_string(),
                ));
            }
            _ => continue,
        }
    }
}

/// Receive phase: count own chat messages until `expected` is reached or the
/// phase stops early.
async fn receive_loop(
    mut read: SplitStream<WsStream>,
    identity: String,
    expected: usize,
    timeout: Duration,
    done: oneshot::Sender<ReceiveOutcome>,
) {
    let start = Instant::now();
    let deadline = tokio::time::Instant::now() + timeout;
    let mut outcome = ReceiveOutcome::default();

    while outcome.messages_received < expected {
        let msg = match next_message(&mut read, deadline).await {
            Ok(msg) => msg,
            Err(ReadFailure::Timeout) => {
                outcome.error = Some(HarnessError::Receive("read deadline exceeded".to_string()));
                break;
            }
            Err(ReadFailure::Transport(reason)) => {
                outcome.error = Some(HarnessError::Receive(reason));
                break;
            }
            Err(ReadFailure::Decode(reason)) => {
                outcome.error = Some(HarnessError::Protocol(reason));
                break;
            }
        };

        match msg.action {
            Action::Chat if msg.sender() == Some(identity.as_str()) => {
                outcome.messages_received += 1;
            }
            Action::Disconnect if msg.contents() == identity => {
                outcome.stop_reason = Some(HarnessError::UnexpectedMessage {
                    expected: Action::Chat,
                    got: Action::Disconnect,
                    contents: msg.contents().to_string(),
                });
                break;
            }
            Action::Error => {
                outcome.server_error =
                    Some(HarnessError::ServerReported(msg.contents().to_string()));
                break;
            }
            _ => {}
        }
    }

    outcome.duration = start.elapsed();
    let _ = done.send(outcome);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_contents_format() {
        // テスト項目: 送信メッセージの内容は "Worker #<id>: Message <k>" 形式
        assert_eq!(message_contents(2, 7), "Worker #2: Message 7");
    }
}
