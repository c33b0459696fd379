//! Single-writer core of the chat coordinator.
//!
//! All roster mutations and message relays go through one [`Coordinator`]
//! behind one lock, so every connected session observes snapshots and
//! messages in the same total order in which the coordinator accepted them.
//!
//! Frames are serialized once and the JSON string is cloned per receiver.
//! Delivery failures are logged and skipped; they never fail the operation.

use std::collections::HashMap;

use tokio::sync::mpsc;
use uuid::Uuid;

use idobata_shared::protocol::{ServerEvent, SessionId, User};

use crate::registry::PresenceRegistry;

/// Presence registry plus the outbound channel of every open connection.
#[derive(Debug, Default)]
pub struct Coordinator {
    registry: PresenceRegistry,
    connections: HashMap<SessionId, mpsc::UnboundedSender<String>>,
}

impl Coordinator {
    pub fn new() -> Self {
        Self {
            registry: PresenceRegistry::new(),
            connections: HashMap::new(),
        }
    }

    /// Accept a new connection.
    ///
    /// Allocates a fresh session identifier, registers the connection with an
    /// empty profile, queues the welcome frame for the new session, and then
    /// broadcasts the updated roster to everyone (the new session included).
    /// Returns the identifier and the receiving end of the session's outbound
    /// channel.
    pub fn on_connect(&mut self) -> (SessionId, mpsc::UnboundedReceiver<String>) {
        let session_id = SessionId::new(Uuid::new_v4().to_string());
        let (tx, rx) = mpsc::unbounded_channel();

        self.connections.insert(session_id.clone(), tx);
        self.registry.on_connect(session_id.clone());

        let welcome = ServerEvent::Welcome {
            session_id: session_id.clone(),
        };
        self.send_to(&session_id, welcome.encode());
        self.broadcast_snapshot();

        (session_id, rx)
    }

    /// Apply a profile update and broadcast the new roster.
    ///
    /// Updates from sessions that already left the roster are dropped.
    pub fn on_profile_update(&mut self, session_id: &SessionId, name: String, avatar: String) {
        if self.registry.on_profile_update(session_id, name, avatar) {
            self.broadcast_snapshot();
        } else {
            tracing::debug!("Dropped profile update from unknown session '{}'", session_id);
        }
    }

    /// Rebroadcast a chat message to every connected session, sender included.
    ///
    /// The sender is stamped from the connection the frame arrived on; the
    /// text and timestamp are forwarded untouched and unvalidated.
    pub fn on_message(&mut self, session_id: &SessionId, text: String, ts: i64) {
        let message = ServerEvent::Message {
            text,
            user_id: session_id.clone(),
            ts,
        };
        self.broadcast(message.encode());
    }

    /// Drop a closed connection and broadcast the shrunken roster.
    ///
    /// The channel is removed before the broadcast, so the departing session
    /// receives nothing further.
    pub fn on_disconnect(&mut self, session_id: &SessionId) {
        self.connections.remove(session_id);
        if self.registry.on_disconnect(session_id) {
            self.broadcast_snapshot();
        }
    }

    /// Current roster in arrival order.
    pub fn snapshot(&self) -> Vec<User> {
        self.registry.snapshot()
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    fn broadcast_snapshot(&self) {
        let snapshot = ServerEvent::PresenceSnapshot {
            users: self.registry.snapshot(),
        };
        self.broadcast(snapshot.encode());
    }

    fn broadcast(&self, frame: String) {
        for (session_id, sender) in self.connections.iter() {
            if sender.send(frame.clone()).is_err() {
                tracing::warn!("Failed to deliver frame to session '{}'", session_id);
            }
        }
    }

    fn send_to(&self, session_id: &SessionId, frame: String) {
        if let Some(sender) = self.connections.get(session_id)
            && sender.send(frame).is_err()
        {
            tracing::warn!("Failed to deliver frame to session '{}'", session_id);
        }
    }
}
