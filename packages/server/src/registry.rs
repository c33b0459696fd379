//! Presence registry: who is currently connected, in arrival order.
//!
//! Pure data structure with no I/O. The coordinator owns one instance and
//! broadcasts a snapshot after every mutation that changes the roster.

use idobata_shared::protocol::{SessionId, User};

/// Ordered set of present users keyed by session identifier.
///
/// Iteration order is arrival order: a user who updates their profile keeps
/// their position, and a reconnecting user re-enters at the end.
#[derive(Debug, Default)]
pub struct PresenceRegistry {
    users: Vec<User>,
}

impl PresenceRegistry {
    pub fn new() -> Self {
        Self { users: Vec::new() }
    }

    /// Register a new session with an empty profile.
    ///
    /// Name and avatar stay empty until the first profile update arrives.
    pub fn on_connect(&mut self, session_id: SessionId) {
        self.users.push(User {
            id: session_id,
            name: String::new(),
            avatar: String::new(),
        });
    }

    /// Replace the name and avatar of an existing entry.
    ///
    /// Returns `false` if the session is unknown (already disconnected); the
    /// update is dropped in that case and the roster is unchanged.
    pub fn on_profile_update(
        &mut self,
        session_id: &SessionId,
        name: String,
        avatar: String,
    ) -> bool {
        match self.users.iter_mut().find(|user| &user.id == session_id) {
            Some(user) => {
                user.name = name;
                user.avatar = avatar;
                true
            }
            None => false,
        }
    }

    /// Remove a session from the roster.
    ///
    /// Returns `false` if the session was not present.
    pub fn on_disconnect(&mut self, session_id: &SessionId) -> bool {
        let before = self.users.len();
        self.users.retain(|user| &user.id != session_id);
        self.users.len() != before
    }

    /// Clone the full roster in arrival order.
    pub fn snapshot(&self) -> Vec<User> {
        self.users.clone()
    }

    pub fn contains(&self, session_id: &SessionId) -> bool {
        self.users.iter().any(|user| &user.id == session_id)
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}
