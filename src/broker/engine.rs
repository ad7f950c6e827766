use std::sync::Arc;

use crate::broker::dispatcher::BroadcastDispatcher;
use crate::broker::lifecycle::ConnectionLifecycle;
use crate::broker::registry::SubscriptionRegistry;
use crate::broker::router::MessageRouter;
use crate::client::{ClientHandle, ClientId, ClientRegistry};
use crate::transport::message::InboundEvent;

/// The relay core: subscription registry, connection lifecycle tracking,
/// message routing and broadcast dispatch wired together behind the entry
/// points the transport layer invokes as connection events occur.
pub struct Broker {
    subscriptions: Arc<SubscriptionRegistry>,
    clients: Arc<ClientRegistry>,
    lifecycle: Arc<ConnectionLifecycle>,
    router: MessageRouter,
}

impl Broker {
    pub fn new() -> Self {
        let subscriptions = Arc::new(SubscriptionRegistry::new());
        let clients = Arc::new(ClientRegistry::new());
        let lifecycle = Arc::new(ConnectionLifecycle::new(
            Arc::clone(&clients),
            Arc::clone(&subscriptions),
        ));
        let dispatcher = BroadcastDispatcher::new(
            Arc::clone(&subscriptions),
            Arc::clone(&clients),
            Arc::clone(&lifecycle),
        );
        let router = MessageRouter::new(
            Arc::clone(&subscriptions),
            Arc::clone(&clients),
            dispatcher,
        );
        Self {
            subscriptions,
            clients,
            lifecycle,
            router,
        }
    }

    /// Called by the transport once a connection has completed its
    /// handshake.
    pub fn on_connect(&self, client: ClientHandle) {
        self.lifecycle.on_connect(client);
    }

    /// Called by the transport for each decoded inbound event, in the order
    /// received on that client's connection.
    pub async fn on_event(&self, client_id: &ClientId, event: InboundEvent) {
        self.router.route(client_id, event).await;
    }

    /// Called by the transport when an inbound frame fails to decode.
    pub fn on_decode_failure(&self, client_id: &ClientId) {
        self.router.on_decode_failure(client_id);
    }

    /// Called by the transport when a connection ends. Idempotent.
    pub fn on_disconnect(&self, client_id: &ClientId) {
        self.lifecycle.on_disconnect(client_id);
    }

    pub fn subscriptions(&self) -> &SubscriptionRegistry {
        &self.subscriptions
    }

    pub fn clients(&self) -> &ClientRegistry {
        &self.clients
    }
}

impl Default for Broker {
    fn default() -> Self {
        Self::new()
    }
}
