//! WebSocket endpoint streaming freshly minted discount codes.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::Response;
use futures_util::{SinkExt, StreamExt};
use notify::StoreEvent;
use tracing::{debug, info};

use crate::routes::store::AppState;

/// GET /ws — upgrades the connection and streams minted codes.
pub async fn upgrade(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Drives one client connection until either side hangs up.
///
/// The send half forwards hub events as text frames whose body is exactly
/// the code string. The receive half drains inbound frames so the
/// connection stays healthy, and treats Close as the end of the session.
async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (connection_id, mut events) = state.hub.subscribe();
    info!(%connection_id, "websocket client connected");

    let (mut sender, mut receiver) = socket.split();

    let mut send_task = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            let StoreEvent::DiscountCodeMinted { code } = event;
            if sender.send(Message::Text(code.into())).await.is_err() {
                break;
            }
        }

        debug!("websocket send task finished");
    });

    let mut recv_task = tokio::spawn(async move {
        // Nothing inbound changes server state; Close ends the session.
        while let Some(Ok(message)) = receiver.next().await {
            if let Message::Close(_) = message {
                debug!("client requested close");
                break;
            }
        }

        debug!("websocket receive task finished");
    });

    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }

    state.hub.unregister(connection_id);
    info!(%connection_id, "websocket client disconnected");
}
