use std::sync::Arc;

use futures_util::future::join_all;
use tracing::{debug, info, warn};
use tungstenite::protocol::Message as WsMessage;

use crate::broker::lifecycle::ConnectionLifecycle;
use crate::broker::registry::SubscriptionRegistry;
use crate::client::{ClientRegistry, Delivery};

/// Fans a payload out to every subscriber of a topic.
///
/// Delivery runs from a snapshot of the subscriber set, one task per
/// subscriber, so one slow or dead client cannot delay or fail the others;
/// the call returns once every attempt has settled. A failed attempt
/// triggers the same cleanup as a transport-driven disconnect.
pub struct BroadcastDispatcher {
    subscriptions: Arc<SubscriptionRegistry>,
    clients: Arc<ClientRegistry>,
    lifecycle: Arc<ConnectionLifecycle>,
}

impl BroadcastDispatcher {
    pub fn new(
        subscriptions: Arc<SubscriptionRegistry>,
        clients: Arc<ClientRegistry>,
        lifecycle: Arc<ConnectionLifecycle>,
    ) -> Self {
        Self {
            subscriptions,
            clients,
            lifecycle,
        }
    }

    /// Sends a payload to all clients subscribed to a topic. A topic with no
    /// subscribers is not an error; the message is dropped silently.
    pub async fn publish(&self, topic: &str, payload: String) {
        let subscribers = self.subscriptions.subscribers_of(topic);
        if subscribers.is_empty() {
            debug!("no subscribers for '{}', dropping message", topic);
            return;
        }

        let total = subscribers.len();
        let message = WsMessage::text(payload);
        let mut attempts = Vec::with_capacity(total);
        for client_id in subscribers {
            let clients = Arc::clone(&self.clients);
            let lifecycle = Arc::clone(&self.lifecycle);
            let message = message.clone();
            let topic = topic.to_string();
            attempts.push(tokio::spawn(async move {
                match clients.deliver(&client_id, message) {
                    Delivery::Delivered => true,
                    Delivery::PeerGone => {
                        info!(
                            "{} was gone during send to topic '{}', cleaning up",
                            client_id, topic
                        );
                        lifecycle.on_disconnect(&client_id);
                        false
                    }
                    Delivery::SendFailed => {
                        warn!(
                            "send to {} failed for topic '{}', cleaning up",
                            client_id, topic
                        );
                        lifecycle.on_disconnect(&client_id);
                        false
                    }
                }
            }));
        }

        let delivered = join_all(attempts)
            .await
            .into_iter()
            .filter(|outcome| matches!(outcome, Ok(true)))
            .count();
        debug!(
            "delivered to {}/{} subscribers of '{}'",
            delivered, total, topic
        );
    }
}
