//! WebSocket connection handlers.
//!
//! Each accepted connection gets two tasks: the handler task reading inbound
//! frames, and a writer task draining the connection's outbound queue to the
//! socket. They share nothing but the registry and that queue.

use std::sync::Arc;

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::{
    sink::SinkExt,
    stream::{SplitSink, SplitStream, StreamExt},
};
use tokio::sync::mpsc;
use wschat_shared::Message as WireMessage;

use crate::{
    domain::{ConnectionId, OutboundQueue},
    infrastructure::queue::SafeQueue,
    ui::state::AppState,
    usecase::{
        Announcement, ConnectParticipantUseCase, DisconnectParticipantUseCase, SendMessageUseCase,
    },
};

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (mut sender, mut receiver) = socket.split();
    let connect_usecase = ConnectParticipantUseCase::new(state.repository.clone());

    // Announce to the current members before this connection is registered,
    // then deliver the same message to the new connection directly.
    let Announcement { id, payload } = match connect_usecase.announce().await {
        Ok(announcement) => announcement,
        Err(e) => {
            tracing::error!("Failed to announce new connection: {}", e);
            return;
        }
    };
    if let Err(e) = sender.send(Message::Text(payload.into())).await {
        // Peers already saw the connect; the read loop below ends at once and the
        // regular teardown announces the disconnect.
        tracing::warn!("Failed to send connect to '{}': {}", id, e);
    }

    let (queue, rx) = SafeQueue::new(state.queue_capacity);
    if let Err(e) = connect_usecase.register(id.clone(), queue.clone()).await {
        tracing::error!("Failed to register '{}': {}", id, e);
        return;
    }
    tracing::info!("Connection '{}' registered", id);

    let writer = tokio::spawn(write_outbound(sender, rx, id.clone()));

    read_inbound(&mut receiver, &state, &id, &queue).await;

    // Teardown
    let disconnect_usecase = DisconnectParticipantUseCase::new(state.repository.clone());
    match disconnect_usecase.execute(&id).await {
        Ok(_) => tracing::info!(
            "Connection '{}' removed ({} remaining)",
            id,
            disconnect_usecase.count_remaining_participants().await
        ),
        Err(e) => tracing::warn!("Failed to disconnect '{}': {}", id, e),
    }
    // Already closed on the normal path; makes sure the writer terminates.
    queue.close().await;

    if let Err(e) = writer.await {
        tracing::error!("Writer task of '{}' failed: {}", id, e);
    }
}

/// Read frames until the transport closes, fails, or sends an undecodable
/// message.
async fn read_inbound(
    receiver: &mut SplitStream<WebSocket>,
    state: &AppState,
    id: &ConnectionId,
    queue: &OutboundQueue,
) {
    let send_usecase = SendMessageUseCase::new(state.repository.clone());

    while let Some(frame) = receiver.next().await {
        let frame = match frame {
            Ok(frame) => frame,
            Err(e) => {
                tracing::debug!("Error reading from '{}': {}", id, e);
                break;
            }
        };

        let text = match frame {
            Message::Text(text) => text,
            Message::Close(_) => {
                tracing::info!("Connection '{}' requested close", id);
                break;
            }
            // Ping/pong is handled automatically by the WebSocket protocol
            Message::Ping(_) | Message::Pong(_) => continue,
            Message::Binary(_) => {
                tracing::debug!("Ignoring binary frame from '{}'", id);
                continue;
            }
        };

        let inbound = match WireMessage::decode(text.as_str()) {
            Ok(msg) => msg,
            Err(e) => {
                tracing::info!("Bad message from '{}': {}", id, e);
                match SendMessageUseCase::rejection() {
                    Ok(payload) => {
                        queue.send(payload).await;
                    }
                    Err(e) => tracing::error!("Failed to encode rejection: {}", e),
                }
                break;
            }
        };

        if let Err(e) = send_usecase.execute(id, inbound).await {
            tracing::warn!("Failed to broadcast message from '{}': {}", id, e);
        }
    }
}

/// Drain the outbound queue to the socket until the queue is closed.
///
/// After a failed write the remaining items are discarded rather than left in
/// the queue, so producers never wait on a dead connection.
async fn write_outbound(
    mut sender: SplitSink<WebSocket, Message>,
    mut rx: mpsc::Receiver<String>,
    id: ConnectionId,
) {
    let mut healthy = true;
    while let Some(payload) = rx.recv().await {
        if !healthy {
            continue;
        }
        if let Err(e) = sender.send(Message::Text(payload.into())).await {
            tracing::debug!("Error writing to '{}': {}", id, e);
            healthy = false;
        }
    }

    if healthy {
        let _ = sender.close().await;
    }
}
