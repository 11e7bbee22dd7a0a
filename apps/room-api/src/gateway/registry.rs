//! Connection registry and roster behind a single lock domain.
//!
//! Username uniqueness is a check-then-act over the whole roster, so every
//! membership check and mutation happens under one `parking_lot::Mutex`.
//! Outbound delivery goes through per-connection unbounded queues; sends
//! never block, which keeps fan-out atomic with respect to membership
//! changes and preserves send order per recipient.

use std::collections::HashMap;

use parking_lot::{Mutex, MutexGuard};
use tokio::sync::mpsc;

use super::events::ServerEvent;
use super::presence;
use super::session::{ConnectionState, Participant};

/// Outbound queue handle for one connection.
pub type OutboundSender = mpsc::UnboundedSender<ServerEvent>;

/// One registered transport connection.
pub struct ConnectionEntry {
    sender: OutboundSender,
    state: ConnectionState,
}

impl ConnectionEntry {
    /// Queue an event for this connection. A receiver that is already gone
    /// is skipped; broadcasts are fire-and-forget.
    pub fn send(&self, event: ServerEvent) {
        let _ = self.sender.send(event);
    }
}

/// Every connection known to the server, keyed by connection ID.
pub struct Room {
    connections: HashMap<String, ConnectionEntry>,
}

impl Room {
    fn new() -> Self {
        Self {
            connections: HashMap::new(),
        }
    }

    pub fn insert(&mut self, conn_id: String, sender: OutboundSender) {
        self.connections.insert(
            conn_id,
            ConnectionEntry {
                sender,
                state: ConnectionState::Unauthenticated,
            },
        );
    }

    pub fn remove(&mut self, conn_id: &str) -> Option<ConnectionEntry> {
        self.connections.remove(conn_id)
    }

    pub fn state(&self, conn_id: &str) -> Option<&ConnectionState> {
        self.connections.get(conn_id).map(|entry| &entry.state)
    }

    /// The participant bound to `conn_id`, if that connection is logged in.
    pub fn participant(&self, conn_id: &str) -> Option<&Participant> {
        self.connections
            .get(conn_id)
            .and_then(|entry| entry.state.participant())
    }

    /// Whether a display name is held by any logged-in participant.
    /// Suspended (logged-out) identities do not block the name.
    pub fn name_in_use(&self, name: &str) -> bool {
        self.connections
            .values()
            .any(|entry| entry.state.participant().is_some_and(|p| p.name == name))
    }

    /// Move a connection into the roster. Returns `true` on the very first
    /// activation of this connection, `false` on re-login after logout.
    pub fn activate(&mut self, conn_id: &str, participant: Participant) -> bool {
        let Some(entry) = self.connections.get_mut(conn_id) else {
            return false;
        };
        let first_login = matches!(entry.state, ConnectionState::Unauthenticated);
        entry.state = ConnectionState::Active(participant);
        first_login
    }

    /// Take a connection out of the roster, keeping it registered so it can
    /// re-authorize. Returns the suspended participant, or `None` if the
    /// connection was not logged in.
    pub fn suspend(&mut self, conn_id: &str) -> Option<Participant> {
        let entry = self.connections.get_mut(conn_id)?;
        if let ConnectionState::Active(participant) = entry.state.clone() {
            entry.state = ConnectionState::LoggedOut(participant.clone());
            Some(participant)
        } else {
            None
        }
    }

    /// Outbound handle for one connection, for replies produced off-loop.
    pub fn sender(&self, conn_id: &str) -> Option<OutboundSender> {
        self.connections.get(conn_id).map(|entry| entry.sender.clone())
    }

    /// Queue an event for a single connection, logged in or not.
    pub fn send_to(&self, conn_id: &str, event: ServerEvent) {
        if let Some(entry) = self.connections.get(conn_id) {
            entry.send(event);
        }
    }

    /// All roster members (logged-in connections only).
    pub fn members(&self) -> impl Iterator<Item = (&str, &ConnectionEntry)> {
        self.connections
            .iter()
            .filter(|(_, entry)| entry.state.is_active())
            .map(|(id, entry)| (id.as_str(), entry))
    }

    /// Queue an event for every roster member, the originator included.
    pub fn broadcast(&self, event: &ServerEvent) {
        for (_, entry) in self.members() {
            entry.send(event.clone());
        }
    }

    /// Queue an event for every roster member except `exclude`.
    pub fn broadcast_except(&self, exclude: &str, event: &ServerEvent) {
        for (id, entry) in self.members() {
            if id != exclude {
                entry.send(event.clone());
            }
        }
    }
}

/// Shared registry of all gateway connections. Cloneable via `Arc` in
/// `AppState`; lives for the process lifetime.
pub struct RoomRegistry {
    inner: Mutex<Room>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Room::new()),
        }
    }

    /// Lock the room. Callers must not hold the guard across await points.
    pub fn lock(&self) -> MutexGuard<'_, Room> {
        self.inner.lock()
    }

    /// Record a new transport connection in the Unauthenticated state.
    pub fn register(&self, conn_id: String, sender: OutboundSender) {
        self.lock().insert(conn_id, sender);
    }

    /// Discard a connection on transport loss. A logged-in participant gets
    /// the identical cleanup as an explicit logout: roster removal first,
    /// then a leave notice to everyone remaining. Idempotent — a second
    /// call for the same ID is a no-op.
    pub fn unregister(&self, conn_id: &str) {
        let mut room = self.lock();
        if let Some(entry) = room.remove(conn_id) {
            if let ConnectionState::Active(participant) = entry.state {
                tracing::info!(%conn_id, name = %participant.name, "disconnected while logged in");
                presence::announce_leave(&room, &participant);
            }
        }
    }
}

impl Default for RoomRegistry {
    fn default() -> Self {
        Self::new()
    }
}
