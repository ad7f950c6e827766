use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::broker::registry::SubscriptionRegistry;
use crate::client::{ClientHandle, ClientId, ClientRegistry, Delivery};
use crate::transport::message::ServerMessage;

/// Tracks each client's existence and reconciles the subscription registry
/// when a connection ends, however it ends.
pub struct ConnectionLifecycle {
    clients: Arc<ClientRegistry>,
    subscriptions: Arc<SubscriptionRegistry>,
}

impl ConnectionLifecycle {
    pub fn new(clients: Arc<ClientRegistry>, subscriptions: Arc<SubscriptionRegistry>) -> Self {
        Self {
            clients,
            subscriptions,
        }
    }

    /// Records a new client and greets it with the subscribe protocol.
    pub fn on_connect(&self, client: ClientHandle) {
        info!("client connected: {} ({})", client.id, client.addr);
        let id = client.id.clone();
        self.clients.register(client);
        if self.clients.deliver(&id, ServerMessage::greeting().to_ws()) != Delivery::Delivered {
            warn!("could not deliver greeting to {}", id);
        }
    }

    /// Removes a client and every subscription it held. Safe to call more
    /// than once for the same client, so a dispatch-driven cleanup racing a
    /// transport-driven one is harmless. The registry is reconciled on every
    /// call: the client's reader may still process events after an earlier
    /// cleanup already unregistered the handle, and whatever subscriptions
    /// that creates must not outlive the final disconnect.
    pub fn on_disconnect(&self, client_id: &ClientId) {
        match self.clients.unregister(client_id) {
            Some(client) => info!(
                "client disconnected: {} ({}), cleaning up subscriptions",
                client.id, client.addr
            ),
            None => debug!("{} already unregistered, reconciling subscriptions", client_id),
        }
        let topics = self.subscriptions.remove_client(client_id);
        for topic in &topics {
            debug!("removed {} from topic '{}'", client_id, topic);
        }
        debug!(
            "current active topics: {:?}",
            self.subscriptions.active_topics()
        );
    }
}
