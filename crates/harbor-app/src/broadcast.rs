//! Broadcast channel bridging the drive loop to renderer connections.

use tokio::sync::broadcast;

use crate::protocol::ServerMessage;

/// Broadcast capacity. A renderer falling more than this many messages
/// behind will observe a lag gap instead of blocking the bridge.
const BROADCAST_CAPACITY: usize = 256;

/// Owned by the drive loop. `send()` is non-blocking and a no-op while no
/// renderer is connected; each connection task gets its own `subscribe()`.
#[derive(Clone)]
pub struct Broadcaster {
    tx: broadcast::Sender<ServerMessage>,
}

impl Broadcaster {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(BROADCAST_CAPACITY);
        Self { tx }
    }

    /// Push a message to every connected renderer.
    pub fn send(&self, msg: ServerMessage) {
        let _ = self.tx.send(msg);
    }

    /// Create a receiver for a new renderer connection.
    pub fn subscribe(&self) -> broadcast::Receiver<ServerMessage> {
        self.tx.subscribe()
    }
}

impl Default for Broadcaster {
    fn default() -> Self {
        Self::new()
    }
}
