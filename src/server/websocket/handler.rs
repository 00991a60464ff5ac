//! WebSocket route handler.
//!
//! Handles the upgrade, the message loop and cleanup.

use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tracing::{debug, error};
use uuid::Uuid;

use super::{
    connection::ConnectionManager,
    messages::{events, system, ClientMessage, ServerMessage},
};
use crate::server::session::Identity;
use crate::server::state::GuardedConnectionManager;

/// `GET /api/ws`. Guests may connect too.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    identity: Identity,
    State(connection_manager): State<GuardedConnectionManager>,
) -> Response {
    debug!("WebSocket upgrade for user {:?}", identity.user_id);
    ws.on_upgrade(move |socket| handle_socket(socket, identity, connection_manager))
}

async fn handle_socket(
    socket: WebSocket,
    identity: Identity,
    connection_manager: GuardedConnectionManager,
) {
    let (connection_id, outgoing_rx) = connection_manager.register(identity.user_id).await;
    if identity.is_guest() {
        debug!("WebSocket connected: {} (guest)", connection_id);
    } else {
        debug!(
            "WebSocket connected: {} (user {:?})",
            connection_id, identity.user_id
        );
    }

    let (ws_sink, ws_stream) = socket.split();

    let connected_msg = ServerMessage::new(
        events::CONNECTED,
        system::Connected {
            connection_id: connection_id.to_string(),
            user: identity,
        },
    );

    let outgoing_handle = tokio::spawn(forward_outgoing(ws_sink, outgoing_rx, connected_msg));

    process_incoming(ws_stream, connection_id, &connection_manager).await;

    debug!("WebSocket disconnected: {}", connection_id);
    outgoing_handle.abort();
    connection_manager.unregister(connection_id).await;
}

async fn forward_outgoing(
    mut ws_sink: futures::stream::SplitSink<WebSocket, Message>,
    mut outgoing_rx: mpsc::Receiver<ServerMessage>,
    initial_msg: ServerMessage,
) {
    if let Ok(json) = serde_json::to_string(&initial_msg) {
        if ws_sink.send(Message::Text(json.into())).await.is_err() {
            return;
        }
    }

    while let Some(msg) = outgoing_rx.recv().await {
        match serde_json::to_string(&msg) {
            Ok(json) => {
                if ws_sink.send(Message::Text(json.into())).await.is_err() {
                    break;
                }
            }
            Err(e) => {
                error!("Failed to serialize WebSocket message: {}", e);
            }
        }
    }
}

async fn process_incoming(
    mut ws_stream: futures::stream::SplitStream<WebSocket>,
    connection_id: Uuid,
    connection_manager: &ConnectionManager,
) {
    while let Some(result) = ws_stream.next().await {
        match result {
            Ok(Message::Text(text)) => match serde_json::from_str::<ClientMessage>(text.as_str()) {
                Ok(msg) => handle_client_message(connection_id, msg, connection_manager).await,
                Err(e) => {
                    debug!("Failed to parse client message: {}", e);
                    let error_msg = ServerMessage::new(
                        events::ERROR,
                        system::Error::new(
                            "parse_error",
                            format!("Invalid message format: {}", e),
                        ),
                    );
                    let _ = connection_manager
                        .send_to_connection(connection_id, error_msg)
                        .await;
                }
            },
            Ok(Message::Binary(_)) => {
                debug!("Received binary message, ignoring");
            }
            Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => {}
            Ok(Message::Close(_)) => {
                debug!("Received close frame");
                break;
            }
            Err(e) => {
                debug!("WebSocket error: {}", e);
                break;
            }
        }
    }
}

async fn handle_client_message(
    connection_id: Uuid,
    msg: ClientMessage,
    connection_manager: &ConnectionManager,
) {
    let reply = match msg.event.as_str() {
        events::PING => ServerMessage::empty(events::PONG),
        other => {
            debug!("Unknown event: {}", other);
            ServerMessage::new(
                events::ERROR,
                system::Error::new("unknown_event", format!("Unknown event: {}", other)),
            )
        }
    };
    let _ = connection_manager
        .send_to_connection(connection_id, reply)
        .await;
}
