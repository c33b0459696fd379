//! Wire protocol shared by the coordinator and the client.
//!
//! Every frame is a single JSON object tagged by a `type` field. Clients send
//! [`ClientEvent`] frames, the coordinator sends [`ServerEvent`] frames.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while decoding wire frames.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// The frame was not a well-formed event of the expected kind
    #[error("malformed frame: {0}")]
    MalformedFrame(#[from] serde_json::Error),
}

/// Opaque session identifier allocated by the coordinator.
///
/// The value is unique per connection, not per person. Reconnecting yields a
/// fresh identifier, so a `SessionId` found in an old message may no longer
/// resolve to a present user.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A participant as seen by the presence registry.
///
/// `name` and `avatar` are empty strings until the first profile update
/// arrives for the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: SessionId,
    pub name: String,
    pub avatar: String,
}

/// A relayed chat message as appended to the client-side log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub text: String,
    /// Session that sent the message, stamped by the coordinator
    pub user_id: SessionId,
    /// Sender-local Unix timestamp in milliseconds
    pub ts: i64,
}

/// Frames sent from a client to the coordinator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ClientEvent {
    /// Full replacement of the sender's registry entry
    ProfileUpdate {
        id: SessionId,
        name: String,
        avatar: String,
    },
    /// Ask the coordinator to rebroadcast a chat message
    SendMessage {
        text: String,
        user_id: SessionId,
        ts: i64,
    },
}

impl ClientEvent {
    /// Serialize to a JSON frame.
    pub fn encode(&self) -> String {
        serde_json::to_string(self).expect("event serialization should not fail")
    }

    /// Parse a JSON frame received from a client.
    pub fn decode(text: &str) -> Result<Self, ProtocolError> {
        Ok(serde_json::from_str(text)?)
    }
}

/// Frames sent from the coordinator to a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ServerEvent {
    /// Handshake acknowledgment carrying the allocated session identifier
    Welcome { session_id: SessionId },
    /// Full roster replacing any previously delivered snapshot
    PresenceSnapshot { users: Vec<User> },
    /// A chat message rebroadcast to every connected session
    Message {
        text: String,
        user_id: SessionId,
        ts: i64,
    },
}

impl ServerEvent {
    /// Serialize to a JSON frame.
    pub fn encode(&self) -> String {
        serde_json::to_string(self).expect("event serialization should not fail")
    }

    /// Parse a JSON frame received from the coordinator.
    pub fn decode(text: &str) -> Result<Self, ProtocolError> {
        Ok(serde_json::from_str(text)?)
    }
}
