#![allow(dead_code)] // Each test binary uses a subset of these helpers.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::time;
use tokio_tungstenite::tungstenite;

use room_api::catalog::{FsCatalog, VideoCatalog};
use room_api::config::Config;
use room_api::gateway::registry::RoomRegistry;
use room_api::AppState;

pub const TEST_SECRET: &str = "opensesame";

/// Guard that removes the test media directory on drop.
pub struct MediaDir(pub PathBuf);

impl MediaDir {
    pub fn write(&self, rel: &str) {
        let path = self.0.join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create parent dir");
        }
        std::fs::write(path, b"").expect("write file");
    }
}

impl Drop for MediaDir {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.0);
    }
}

/// Build an `AppState` backed by a fresh temp media directory.
pub fn test_state() -> (AppState, MediaDir) {
    let media_dir = std::env::temp_dir().join(matinee_common::id::prefixed_ulid("room-api-test"));
    std::fs::create_dir_all(&media_dir).expect("create media dir");

    let config = Config {
        room_secret: TEST_SECRET.to_string(),
        media_dir: media_dir.clone(),
        port: 0,
    };
    let catalog: Arc<dyn VideoCatalog> = Arc::new(FsCatalog::new(&media_dir));
    let state = AppState {
        config: Arc::new(config),
        registry: Arc::new(RoomRegistry::new()),
        catalog,
    };
    (state, MediaDir(media_dir))
}

/// Start an actual TCP server for WebSocket testing; it runs in the
/// background for the remainder of the test.
pub async fn start_ws_server() -> (SocketAddr, AppState, MediaDir) {
    let (state, media_dir) = test_state();
    let app = room_api::routes::router().with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (addr, state, media_dir)
}

pub type WsStream =
    tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>;

/// Open a gateway WebSocket connection.
pub async fn connect(addr: SocketAddr) -> WsStream {
    let url = format!("ws://{addr}/gateway");
    let (ws_stream, _) = tokio_tungstenite::connect_async(&url)
        .await
        .expect("ws connect");
    ws_stream
}

/// Send one client event frame.
pub async fn send_event(ws: &mut WsStream, event: serde_json::Value) {
    ws.send(tungstenite::Message::Text(event.to_string().into()))
        .await
        .expect("send event");
}

/// Read the next text frame as JSON, failing after a timeout.
pub async fn recv_event(ws: &mut WsStream) -> serde_json::Value {
    loop {
        let msg = time::timeout(Duration::from_secs(5), ws.next())
            .await
            .expect("timeout waiting for event")
            .expect("stream ended")
            .expect("ws read error");
        match msg {
            tungstenite::Message::Text(text) => {
                return serde_json::from_str(&text).expect("parse event")
            }
            tungstenite::Message::Ping(_) | tungstenite::Message::Pong(_) => continue,
            other => panic!("expected text frame, got: {other:?}"),
        }
    }
}

/// Assert that no frame arrives within a short quiet window.
pub async fn assert_silent(ws: &mut WsStream) {
    if let Ok(msg) = time::timeout(Duration::from_millis(300), ws.next()).await {
        panic!("expected silence, got: {msg:?}");
    }
}

/// Build a `clientInfo` frame.
pub fn client_info(name: &str, secret: &str, color: &str) -> serde_json::Value {
    serde_json::json!({
        "event": "clientInfo",
        "data": { "name": name, "secret": secret, "color": color }
    })
}

/// Log a client in and consume its `clientAuthorised` and own `userJoined`.
/// Returns the stream and the assigned color.
pub async fn connect_and_login(addr: SocketAddr, name: &str) -> (WsStream, String) {
    let mut ws = connect(addr).await;
    send_event(&mut ws, client_info(name, TEST_SECRET, "")).await;

    let authorised = recv_event(&mut ws).await;
    assert_eq!(
        authorised["event"], "clientAuthorised",
        "unexpected login reply: {authorised}"
    );
    let color = authorised["data"]["color"]
        .as_str()
        .expect("assigned color")
        .to_string();

    let joined = recv_event(&mut ws).await;
    assert_eq!(joined["event"], "userJoined");
    assert_eq!(joined["data"]["name"], name);

    (ws, color)
}

/// Consume the `requestState` + `userJoined` pair an existing member sees
/// when someone else joins.
pub async fn expect_join_notices(ws: &mut WsStream, name: &str) {
    let request = recv_event(ws).await;
    assert_eq!(request["event"], "requestState");
    let joined = recv_event(ws).await;
    assert_eq!(joined["event"], "userJoined");
    assert_eq!(joined["data"]["name"], name);
}
