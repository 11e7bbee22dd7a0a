//! WebSocket upgrade handler and per-connection event loop.

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;

use crate::AppState;

use super::events::{ClientEvent, ServerEvent};
use super::{identity, presence, relay};

pub fn router() -> Router<AppState> {
    Router::new().route("/gateway", get(ws_upgrade))
}

async fn ws_upgrade(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_connection(socket, state))
}

/// Owns one transport connection from registration to unregistration.
///
/// Inbound frames are decoded and dispatched inline; outbound events arrive
/// on this connection's queue and are written in queue order, so delivery
/// order to a single recipient always matches send order.
async fn handle_connection(socket: WebSocket, state: AppState) {
    let conn_id = matinee_common::id::prefixed_ulid(matinee_common::id::prefix::CONNECTION);
    let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel();
    state.registry.register(conn_id.clone(), outbound_tx);
    tracing::info!(%conn_id, "connection established");

    let (mut ws_tx, mut ws_rx) = socket.split();

    loop {
        tokio::select! {
            // Client sends us a frame.
            msg = ws_rx.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        match serde_json::from_str::<ClientEvent>(&text) {
                            Ok(event) => dispatch(&state, &conn_id, event),
                            Err(err) => {
                                // Unknown or malformed events are dropped;
                                // the connection stays usable.
                                tracing::debug!(%conn_id, %err, "undecodable frame dropped");
                            }
                        }
                    }
                    Some(Ok(Message::Ping(_))) | Some(Ok(Message::Pong(_))) => continue,
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(err)) => {
                        tracing::debug!(%conn_id, ?err, "ws read error");
                        break;
                    }
                    _ => continue,
                }
            }

            // Queued outbound event for this connection.
            event = outbound_rx.recv() => {
                match event {
                    Some(event) => {
                        let json = serde_json::to_string(&event).unwrap();
                        if ws_tx.send(Message::Text(json.into())).await.is_err() {
                            break;
                        }
                    }
                    None => break,
                }
            }
        }
    }

    // Transport loss and explicit close both land here; cleanup is identical
    // to an explicit logout.
    state.registry.unregister(&conn_id);
    tracing::info!(%conn_id, "connection closed");
}

/// Route one decoded client event.
fn dispatch(state: &AppState, conn_id: &str, event: ClientEvent) {
    match event {
        ClientEvent::ClientInfo(info) => {
            identity::authorize(&state.registry, &state.config, conn_id, info);
        }
        ClientEvent::ChatMessage { text } => relay::chat(&state.registry, conn_id, text),
        ClientEvent::VideoState(video) => relay::video_state(&state.registry, conn_id, video),
        ClientEvent::StateRequest => relay::state_request(&state.registry, conn_id),
        ClientEvent::VideoListRequest => relay::video_list(state, conn_id),
        ClientEvent::LogOut => presence::log_out(&state.registry, conn_id),
        ClientEvent::Heartbeat(payload) => {
            // Pure echo, allowed in every connection state.
            tracing::debug!(%conn_id, "heartbeat");
            state
                .registry
                .lock()
                .send_to(conn_id, ServerEvent::Heartbeat(payload));
        }
    }
}
