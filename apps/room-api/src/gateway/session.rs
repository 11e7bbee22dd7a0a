//! Per-connection session state.

/// A logged-in identity bound to exactly one connection at a time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participant {
    /// Display name, unique among logged-in participants.
    pub name: String,
    /// CSS color string, fixed for the lifetime of the login.
    pub color: String,
}

/// Lifecycle of a single gateway connection.
///
/// `Unauthenticated` is the state at transport connect; the first accepted
/// `clientInfo` moves the connection to `Active`. `logOut` suspends the
/// participant rather than destroying it, so a later re-login on the same
/// connection is the `LoggedOut → Active` edge and skips first-time setup.
/// Transport disconnect discards the connection in any state.
#[derive(Debug, Clone)]
pub enum ConnectionState {
    Unauthenticated,
    Active(Participant),
    LoggedOut(Participant),
}

impl ConnectionState {
    /// The participant, if this connection is currently in the roster.
    pub fn participant(&self) -> Option<&Participant> {
        match self {
            ConnectionState::Active(participant) => Some(participant),
            _ => None,
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, ConnectionState::Active(_))
    }
}
