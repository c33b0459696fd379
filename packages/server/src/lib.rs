//! Idobata chat coordinator.
//!
//! A single central process that tracks who is present and relays chat
//! messages. Clients connect over WebSocket; the coordinator allocates a
//! session identifier per connection, broadcasts full presence snapshots on
//! every roster change, and rebroadcasts chat messages to all connected
//! sessions in one total order.

pub mod coordinator;
pub mod handler;
pub mod registry;
pub mod runner;
pub mod signal;
pub mod state;

pub use runner::{router, run_server};
pub use state::AppState;
