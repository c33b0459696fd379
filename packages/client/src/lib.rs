//! Idobata CLI chat client.
//!
//! Connects to the chat coordinator over WebSocket, keeps a local view of
//! presence and the message log in sync, and renders everything in the
//! terminal. Connection lifecycle is explicit: the client connects when told
//! to and stays down when the link drops.

pub mod commands;
pub mod directory;
pub mod error;
pub mod formatter;
pub mod identity;
pub mod lifecycle;
pub mod reconciler;
pub mod runner;
pub mod session;

pub use error::ClientError;
pub use lifecycle::{ChatClient, ConnectionState};
pub use runner::{ClientOptions, run_client};
