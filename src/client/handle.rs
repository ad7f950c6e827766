use std::net::SocketAddr;

use tokio::sync::mpsc::UnboundedSender;
use tungstenite::protocol::Message as WsMessage;
use uuid::Uuid;

/// Unique identifier for a connected client (e.g. `client-<uuid>`).
pub type ClientId = String;

/// Represents one live WebSocket connection in the relay.
///
/// Each client is uniquely identified by an `id` and has a channel (`sender`)
/// for queueing messages to its connection writer task. The peer address is
/// kept for diagnostics only.
#[derive(Debug)]
pub struct ClientHandle {
    pub id: ClientId,
    pub addr: SocketAddr,
    pub sender: UnboundedSender<WsMessage>,
}

impl ClientHandle {
    pub fn new(addr: SocketAddr, sender: UnboundedSender<WsMessage>) -> Self {
        Self {
            id: format!("client-{}", Uuid::new_v4()),
            addr,
            sender,
        }
    }
}

/// Outcome of one delivery attempt to a client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// The message was handed to the client's connection writer.
    Delivered,
    /// No handle is registered for the client; it was already cleaned up.
    PeerGone,
    /// The outbound channel rejected the message; delivery state is ambiguous.
    SendFailed,
}
