//! Wire-format messages exchanged over the `/gateway` WebSocket.
//!
//! Every frame is a tagged JSON object: `{"event": "...", "data": ...}`.
//! Frames that do not decode into one of these variants are dropped at the
//! boundary and never reach dispatch.

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ---------------------------------------------------------------------------
// Shared payloads
// ---------------------------------------------------------------------------

/// Login submission carried by `clientInfo`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientInfo {
    pub name: String,
    pub secret: String,
    /// Requested display color; empty means "assign one for me".
    #[serde(default)]
    pub color: String,
    /// Client-reported prior local failure (page-reload resubmission).
    #[serde(default)]
    pub failed: bool,
    #[serde(default)]
    pub failure_message: String,
}

/// Playback state carried by `videoState` and forwarded on `videoControl`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoState {
    pub paused: bool,
    pub position_seconds: f64,
    pub video_id: String,
    /// Reconciliation traffic: recipients apply it without a chat announcement.
    #[serde(default)]
    pub silent: bool,
}

// ---------------------------------------------------------------------------
// Client → Server events
// ---------------------------------------------------------------------------

/// A message received from a client.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ClientEvent {
    ClientInfo(ClientInfo),
    ChatMessage { text: String },
    VideoState(VideoState),
    StateRequest,
    VideoListRequest,
    LogOut,
    Heartbeat(Value),
}

// ---------------------------------------------------------------------------
// Server → Client events
// ---------------------------------------------------------------------------

/// A message sent to a client.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ServerEvent {
    ClientAuthorised {
        color: String,
    },
    ClientRejected {
        message: String,
    },
    UserJoined {
        name: String,
        color: String,
    },
    UserLeft {
        name: String,
        color: String,
    },
    #[serde(rename_all = "camelCase")]
    ChatControl {
        sender_name: String,
        sender_color: String,
        text: String,
    },
    #[serde(rename_all = "camelCase")]
    VideoControl {
        paused: bool,
        position_seconds: f64,
        video_id: String,
        silent: bool,
        sender_name: String,
        sender_color: String,
    },
    RequestState,
    VideoList {
        videos: Vec<String>,
    },
    Heartbeat(Value),
}
