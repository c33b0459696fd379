//! Shared application state for the HTTP/WebSocket handlers.

use tokio::sync::Mutex;

use crate::coordinator::Coordinator;

/// Shared application state
///
/// A single lock over the whole coordinator. Handlers take it once per
/// operation, which is what serializes connects, updates, relays, and
/// disconnects into one total order.
#[derive(Debug, Default)]
pub struct AppState {
    pub coordinator: Mutex<Coordinator>,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            coordinator: Mutex::new(Coordinator::new()),
        }
    }
}
