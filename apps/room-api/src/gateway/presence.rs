//! Join and leave announcements to the roster.

use super::events::ServerEvent;
use super::registry::{Room, RoomRegistry};
use super::session::Participant;

/// Announce a newly admitted participant.
///
/// Each existing member is asked for a state report exactly once (the
/// newcomer needs the current playback state) and then told who joined.
/// The join notice also reaches the new member itself, right after its
/// `clientAuthorised`.
pub fn announce_join(room: &Room, joined_id: &str, participant: &Participant) {
    let joined = ServerEvent::UserJoined {
        name: participant.name.clone(),
        color: participant.color.clone(),
    };
    for (conn_id, entry) in room.members() {
        if conn_id != joined_id {
            entry.send(ServerEvent::RequestState);
        }
        entry.send(joined.clone());
    }
}

/// Announce a departure. Callers remove or suspend the roster entry first,
/// so a racing join cannot collide with the departing name and the notice
/// reaches only the remaining members.
pub fn announce_leave(room: &Room, departed: &Participant) {
    let left = ServerEvent::UserLeft {
        name: departed.name.clone(),
        color: departed.color.clone(),
    };
    for (_, entry) in room.members() {
        entry.send(left.clone());
    }
}

/// Handle an explicit `logOut`. The connection stays registered and may
/// re-authorize later.
pub fn log_out(registry: &RoomRegistry, conn_id: &str) {
    let mut room = registry.lock();
    match room.suspend(conn_id) {
        Some(participant) => {
            tracing::info!(%conn_id, name = %participant.name, "logged out");
            announce_leave(&room, &participant);
        }
        None => {
            tracing::debug!(%conn_id, "logOut from connection not in roster dropped");
        }
    }
}
