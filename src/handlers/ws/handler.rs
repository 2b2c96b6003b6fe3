//! Axum WebSocket handler
//!
//! This module contains the WebSocket upgrade handler for `/ws/audio` and
//! the connection loop that drives per-connection audio moderation.

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use crate::state::AppState;

use super::{
    audio_handler::handle_audio_message,
    messages::OutgoingMessage,
    state::ConnectionState,
};

/// Channel buffer size for outgoing messages. Generous so short send stalls
/// do not back-pressure the audio receive loop.
const CHANNEL_BUFFER_SIZE: usize = 1024;

/// WebSocket audio moderation handler
/// Upgrades the HTTP connection to WebSocket for streaming audio analysis
pub async fn ws_audio_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> Response {
    info!("WebSocket audio connection upgrade requested");
    ws.on_upgrade(move |socket| handle_audio_socket(socket, state))
}

/// Manage one WebSocket audio session from greeting to teardown
async fn handle_audio_socket(socket: WebSocket, app_state: Arc<AppState>) {
    info!("WebSocket audio connection established");

    let (mut sender, mut receiver) = socket.split();

    // Without a transcription engine there is nothing to moderate; tell the
    // client and close instead of silently buffering audio forever.
    let Some(stt) = app_state.stt.clone() else {
        warn!("Rejecting audio connection: no transcription engine available");
        let message = OutgoingMessage::Error {
            detail: "no transcription engine available".to_string(),
        };
        if let Ok(json) = serde_json::to_string(&message) {
            let _ = sender.send(Message::Text(json.into())).await;
        }
        let _ = sender.send(Message::Close(None)).await;
        return;
    };

    let mut state = match ConnectionState::new(&app_state, stt) {
        Ok(state) => state,
        Err(e) => {
            error!("Failed to build connection pipeline: {e}");
            let _ = sender.send(Message::Close(None)).await;
            return;
        }
    };

    let (message_tx, mut message_rx) = mpsc::channel::<OutgoingMessage>(CHANNEL_BUFFER_SIZE);

    // Spawn task to handle outgoing messages, starting with the greeting
    let sender_task = tokio::spawn(async move {
        if let Err(e) = sender.send(Message::Text("Connected".into())).await {
            error!("Failed to send connection greeting: {e}");
            return;
        }

        while let Some(message) = message_rx.recv().await {
            match serde_json::to_string(&message) {
                Ok(json) => {
                    if let Err(e) = sender.send(Message::Text(json.into())).await {
                        error!("Failed to send WebSocket message: {e}");
                        break;
                    }
                }
                Err(e) => {
                    error!("Failed to serialize outgoing message: {e}");
                }
            }
        }
    });

    // Receive loop. Each audio message is awaited to completion before the
    // next is read, which keeps per-connection results in arrival order.
    while let Some(msg_result) = receiver.next().await {
        match msg_result {
            Ok(Message::Binary(data)) => {
                if !handle_audio_message(data, &mut state, &message_tx).await {
                    break;
                }
            }
            Ok(Message::Text(_)) => {
                let message = OutgoingMessage::Error {
                    detail: "binary audio data required".to_string(),
                };
                if message_tx.send(message).await.is_err() {
                    break;
                }
            }
            Ok(Message::Close(_)) => {
                info!("WebSocket connection closed by client");
                break;
            }
            Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => {
                // Axum answers pings automatically.
            }
            Err(e) => {
                warn!("WebSocket error: {e}");
                break;
            }
        }
    }

    // Clean up resources
    state.pipeline.close();
    drop(message_tx);
    let _ = sender_task.await;

    info!("WebSocket audio connection terminated");
}
