use std::collections::HashMap;
use std::sync::Mutex;

use tracing::debug;
use tungstenite::protocol::Message as WsMessage;

use crate::client::{ClientHandle, ClientId, Delivery};

/// Tracks every connected client and its outbound channel.
#[derive(Debug, Default)]
pub struct ClientRegistry {
    clients: Mutex<HashMap<ClientId, ClientHandle>>,
}

impl ClientRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, client: ClientHandle) {
        debug!("registering client {}", client.id);
        self.clients
            .lock()
            .unwrap()
            .insert(client.id.clone(), client);
    }

    /// Removes a client, returning its handle if it was still registered.
    /// Dropping the returned handle closes the client's outbound channel.
    pub fn unregister(&self, id: &ClientId) -> Option<ClientHandle> {
        self.clients.lock().unwrap().remove(id)
    }

    pub fn contains(&self, id: &ClientId) -> bool {
        self.clients.lock().unwrap().contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.clients.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.lock().unwrap().is_empty()
    }

    /// Attempts to queue a message for one client.
    pub fn deliver(&self, id: &ClientId, message: WsMessage) -> Delivery {
        match self.clients.lock().unwrap().get(id) {
            None => Delivery::PeerGone,
            Some(client) => match client.sender.send(message) {
                Ok(()) => Delivery::Delivered,
                Err(_) => Delivery::SendFailed,
            },
        }
    }
}
