//! Chat and playback-state relays.
//!
//! The server keeps no playback ground truth; it relays change notices and
//! reconciliation requests between roster members. Every relay drops events
//! from connections that are not currently logged in — a listener firing
//! just after logout is an expected race, not an error.

use super::events::{ServerEvent, VideoState};
use super::registry::RoomRegistry;
use crate::AppState;

/// Fan a chat line out to the whole roster, sender included, annotated with
/// the sender's roster identity. Chat is safe to echo back; the sender's
/// client renders it as self-authored.
pub fn chat(registry: &RoomRegistry, conn_id: &str, text: String) {
    let room = registry.lock();
    let Some(sender) = room.participant(conn_id) else {
        tracing::debug!(%conn_id, "chatMessage from connection not in roster dropped");
        return;
    };
    tracing::debug!(%conn_id, name = %sender.name, "relaying chat message");
    let event = ServerEvent::ChatControl {
        sender_name: sender.name.clone(),
        sender_color: sender.color.clone(),
        text,
    };
    room.broadcast(&event);
}

/// Fan a playback-state change out to every other member. The originator is
/// never echoed, otherwise it would re-apply its own action and ping-pong
/// corrective seeks with its peers.
pub fn video_state(registry: &RoomRegistry, conn_id: &str, state: VideoState) {
    let room = registry.lock();
    let Some(sender) = room.participant(conn_id) else {
        tracing::debug!(%conn_id, "videoState from connection not in roster dropped");
        return;
    };
    tracing::debug!(
        %conn_id,
        name = %sender.name,
        paused = state.paused,
        position = state.position_seconds,
        video = %state.video_id,
        silent = state.silent,
        "relaying video state"
    );
    let event = ServerEvent::VideoControl {
        paused: state.paused,
        position_seconds: state.position_seconds,
        video_id: state.video_id,
        silent: state.silent,
        sender_name: sender.name.clone(),
        sender_color: sender.color.clone(),
    };
    room.broadcast_except(conn_id, &event);
}

/// Ask every other member to report its playback state. Each is expected to
/// answer with a silent `videoState`; the requester picks whichever reply it
/// chooses to honor.
pub fn state_request(registry: &RoomRegistry, conn_id: &str) {
    let room = registry.lock();
    let Some(sender) = room.participant(conn_id) else {
        tracing::debug!(%conn_id, "stateRequest from connection not in roster dropped");
        return;
    };
    tracing::debug!(%conn_id, name = %sender.name, "relaying state request");
    room.broadcast_except(conn_id, &ServerEvent::RequestState);
}

/// Answer a catalog query. The listing runs off the relay path so other
/// connections keep being served, and the reply goes to the requester alone.
pub fn video_list(state: &AppState, conn_id: &str) {
    let sender = {
        let room = state.registry.lock();
        if room.participant(conn_id).is_none() {
            tracing::debug!(%conn_id, "videoListRequest from connection not in roster dropped");
            return;
        }
        match room.sender(conn_id) {
            Some(sender) => sender,
            None => return,
        }
    };

    let catalog = state.catalog.clone();
    let conn_id = conn_id.to_string();
    tokio::spawn(async move {
        let videos = match catalog.list().await {
            Ok(videos) => videos,
            Err(err) => {
                tracing::warn!(%conn_id, ?err, "video catalog listing failed");
                Vec::new()
            }
        };
        tracing::debug!(%conn_id, count = videos.len(), "sending video list");
        let _ = sender.send(ServerEvent::VideoList { videos });
    });
}
