//! Login validation and admission.

use rand::Rng;

use crate::config::Config;

use super::events::{ClientInfo, ServerEvent};
use super::presence;
use super::registry::{Room, RoomRegistry};
use super::session::Participant;

/// Colors handed out when a client leaves the choice blank.
pub const PALETTE: [&str; 11] = [
    "red", "orange", "yellow", "lime", "green", "cyan", "blue", "purple", "pink", "gray", "brown",
];

/// Process a `clientInfo` submission from `conn_id`.
///
/// Validation and admission run under one registry lock, so two concurrent
/// submissions of the same name cannot both pass the uniqueness check.
pub fn authorize(registry: &RoomRegistry, config: &Config, conn_id: &str, info: ClientInfo) {
    let mut room = registry.lock();
    match room.state(conn_id) {
        None => {
            // Connection vanished between frame receipt and dispatch.
            tracing::debug!(%conn_id, "clientInfo from unregistered connection dropped");
            return;
        }
        Some(state) if state.is_active() => {
            tracing::debug!(%conn_id, "clientInfo from logged-in connection dropped");
            return;
        }
        Some(_) => {}
    }

    if let Err(message) = validate(&info, &config.room_secret, &room) {
        tracing::info!(%conn_id, name = %info.name, %message, "login rejected");
        room.send_to(conn_id, ServerEvent::ClientRejected { message });
        return;
    }

    let color = resolve_color(&info.color);
    let participant = Participant {
        name: info.name,
        color: color.clone(),
    };
    let first_login = room.activate(conn_id, participant.clone());
    tracing::info!(%conn_id, name = %participant.name, color = %participant.color, first_login, "login accepted");
    room.send_to(conn_id, ServerEvent::ClientAuthorised { color });
    presence::announce_join(&room, conn_id, &participant);
}

/// Apply the login rules in order; the first failing rule wins.
fn validate(info: &ClientInfo, room_secret: &str, room: &Room) -> Result<(), String> {
    if info.failed {
        // The client re-surfaces an earlier local failure after a page
        // reload; echo the message back verbatim.
        return Err(info.failure_message.clone());
    }
    if info.secret != room_secret {
        return Err("Incorrect password.".to_string());
    }
    if info.name.replace(' ', "").is_empty() {
        return Err("Empty username.".to_string());
    }
    if info.name.chars().count() > 200 {
        return Err("Username too long (>200 characters)".to_string());
    }
    if room.name_in_use(&info.name) {
        return Err("Username already in use.".to_string());
    }
    Ok(())
}

/// Pass the requested color through, or pick one from the palette.
fn resolve_color(requested: &str) -> String {
    if requested.is_empty() {
        let idx = rand::thread_rng().gen_range(0..PALETTE.len());
        PALETTE[idx].to_string()
    } else {
        requested.to_string()
    }
}
