//! Raw load worker: sends without checking anything the hub sends back.

use std::sync::Arc;

use futures_util::{sink::SinkExt, stream::StreamExt};
use tokio_tungstenite::tungstenite::Message as Frame;
use wschat_shared::Message;

use crate::{
    config::RunSettings, connector::Connector, error::HarnessError, gate::StartGate,
    runner::message_contents,
};

/// Connect, wait for the gate if any, then send every message.
///
/// Returns the number of messages written. Inbound traffic is drained and
/// discarded so the hub's outbound queue for this connection keeps moving.
pub async fn run_load_worker(
    worker_id: usize,
    settings: Arc<RunSettings>,
    connector: Arc<dyn Connector>,
    mut gate: Option<StartGate>,
) -> Result<usize, HarnessError> {
    let connection =
        tokio::time::timeout(settings.timeout, connector.connect(worker_id, &settings.addr)).await;
    if let Some(gate) = &gate {
        gate.arrive().await;
    }
    let ws = match connection {
        Ok(result) => result?,
        Err(_) => {
            return Err(HarnessError::Connect(format!(
                "timed out after {:?}",
                settings.timeout
            )));
        }
    };

    if let Some(gate) = gate.as_mut() {
        gate.wait().await;
    }

    let (mut write, mut read) = ws.split();
    let drain = tokio::spawn(async move { while let Some(Ok(_)) = read.next().await {} });

    let mut sent = 0;
    let mut failure = None;
    for index in 1..=settings.messages_per_connection {
        // The hub overwrites the sender, so none is claimed here.
        let msg = Message::chat("", message_contents(worker_id, index));
        let payload = match msg.encode() {
            Ok(payload) => payload,
            Err(e) => {
                failure = Some(HarnessError::Protocol(e.to_string()));
                break;
            }
        };
        if let Err(e) = write.send(Frame::Text(payload.into())).await {
            failure = Some(HarnessError::Send {
                index,
                reason: e.to_string(),
            });
            break;
        }
        sent += 1;
    }

    let _ = write.close().await;
    drain.abort();

    match failure {
        Some(e) => Err(e),
        None => Ok(sent),
    }
}
