//! WebSocket connection handlers.

use std::sync::Arc;

use axum::{
    extract::{
        Query, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    http::StatusCode,
    response::IntoResponse,
};
use futures_util::{
    sink::SinkExt,
    stream::{SplitSink, StreamExt},
};
use hibiki_shared::protocol::ClientEvent;
use serde::Deserialize;
use tokio::sync::mpsc;

use crate::{
    domain::{DisplayName, InboundMessage, Participant, RoomName},
    ui::state::AppState,
};

/// Query parameters for WebSocket connection
#[derive(Debug, Deserialize)]
pub struct ConnectQuery {
    pub name: Option<String>,
    pub room: Option<String>,
}

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Query(query): Query<ConnectQuery>,
) -> Result<impl IntoResponse, StatusCode> {
    // Convert query -> Domain Models
    let name = DisplayName::parse(query.name.as_deref()).map_err(|e| {
        tracing::warn!("Rejecting connection: {}", e);
        StatusCode::BAD_REQUEST
    })?;
    let room = RoomName::parse_or(query.room.as_deref(), &state.default_room).map_err(|e| {
        tracing::warn!("Rejecting connection: {}", e);
        StatusCode::BAD_REQUEST
    })?;

    // Create a channel for this participant to receive events
    let (tx, rx) = mpsc::unbounded_channel();

    match state
        .connect_participant_usecase
        .execute(name, room, tx)
        .await
    {
        Ok(participant) => {
            tracing::info!(
                "Participant '{}' ({}) joined room '{}'",
                participant.name,
                participant.id,
                participant.room
            );
            Ok(ws.on_upgrade(move |socket| handle_socket(socket, state, participant, rx)))
        }
        Err(e) => {
            tracing::error!("Failed to connect participant: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Spawns a task that drains the participant's outbound channel into the
/// WebSocket sink.
fn pusher_loop(
    mut rx: mpsc::UnboundedReceiver<String>,
    mut sender: SplitSink<WebSocket, Message>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            if sender.send(Message::Text(frame.into())).await.is_err() {
                break;
            }
        }
    })
}

async fn handle_socket(
    socket: WebSocket,
    state: Arc<AppState>,
    participant: Participant,
    rx: mpsc::UnboundedReceiver<String>,
) {
    let (sender, mut receiver) = socket.split();

    let state_clone = state.clone();
    let sender_id = participant.id.clone();
    let room = participant.room.clone();

    // Messages of one participant are relayed strictly one after another,
    // each to completion of its stream.
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            let msg = match msg {
                Ok(msg) => msg,
                Err(e) => {
                    tracing::warn!("WebSocket error from '{}': {}", sender_id, e);
                    break;
                }
            };

            match msg {
                Message::Text(frame) => {
                    let ClientEvent::ChatMessage { text, request_id } =
                        ClientEvent::from_frame(&frame);
                    tracing::debug!("Received chat message from '{}': {}", sender_id, text);

                    let message = InboundMessage {
                        sender: sender_id.clone(),
                        text,
                        room: room.clone(),
                        request_id,
                    };
                    match state_clone.relay_engine.execute(message).await {
                        Ok(outcome) => tracing::debug!("Relay outcome: {:?}", outcome),
                        Err(e) => {
                            tracing::warn!("Failed to relay message: {}", e);
                            break;
                        }
                    }
                }
                Message::Ping(_) => {
                    tracing::debug!("Received ping");
                }
                Message::Close(_) => {
                    tracing::info!("Participant '{}' requested close", sender_id);
                    break;
                }
                _ => {}
            }
        }
    });

    let mut send_task = pusher_loop(rx, sender);

    // If any one of the tasks completes, abort the other
    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => recv_task.abort(),
    };

    match state
        .disconnect_participant_usecase
        .execute(&participant.id)
        .await
    {
        Ok(left) => tracing::info!(
            "Participant '{}' ({}) left room '{}'",
            left.name,
            left.id,
            left.room
        ),
        Err(e) => tracing::warn!("Failed to disconnect participant: {}", e),
    }
}
