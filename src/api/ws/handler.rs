//! WebSocket endpoint streaming `StreamEvent`s to connected clients.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use tokio::sync::broadcast;
use tracing::debug;

use super::events::StreamEvent;

#[derive(Clone)]
pub struct BroadcastState {
    pub tx: broadcast::Sender<StreamEvent>,
}

impl BroadcastState {
    pub fn new() -> Self {
        let (tx, _rx) = broadcast::channel(1024);
        Self { tx }
    }

    pub fn publish(&self, event: StreamEvent) {
        let _ = self.tx.send(event);
    }
}

impl Default for BroadcastState {
    fn default() -> Self {
        Self::new()
    }
}

/// `GET /ws` -- upgrades to a WebSocket and streams every `StreamEvent`
/// published to `BroadcastState` until the client disconnects.
pub async fn ws_handler(ws: WebSocketUpgrade, State(broadcast): State<Arc<BroadcastState>>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, broadcast))
}

async fn handle_socket(mut socket: WebSocket, broadcast: Arc<BroadcastState>) {
    let mut rx = broadcast.tx.subscribe();
    loop {
        tokio::select! {
            event = rx.recv() => {
                let event = match event {
                    Ok(event) => event,
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        debug!(skipped, "ws client lagged behind stream, skipping");
                        continue;
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                };
                let Ok(text) = event.to_json() else { continue };
                if socket.send(Message::Text(text)).await.is_err() {
                    break;
                }
            }
            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(_)) => break,
                    _ => {}
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn broadcast_state_starts_with_no_receivers() {
        let state = BroadcastState::new();
        assert_eq!(state.tx.receiver_count(), 0);
    }

    #[test]
    fn publish_with_no_subscribers_does_not_panic() {
        let state = BroadcastState::new();
        state.publish(StreamEvent::phase_changed("wf-1", serde_json::json!({"phase": "planning"})));
    }
}
