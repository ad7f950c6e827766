use std::sync::Arc;

use tracing::{debug, error, info};

use crate::broker::dispatcher::BroadcastDispatcher;
use crate::broker::registry::SubscriptionRegistry;
use crate::client::{ClientId, ClientRegistry, Delivery};
use crate::transport::message::{InboundEvent, ServerMessage};

const MALFORMED_HINT: &str = "Malformed message or unknown type. Expected {'type': 'subscribe/unsubscribe', 'topic': '...'} or {'topic': '...', 'data': {...}}";

/// Classifies each decoded inbound event and drives the registry or the
/// dispatcher accordingly, acknowledging back to the originating client.
pub struct MessageRouter {
    subscriptions: Arc<SubscriptionRegistry>,
    clients: Arc<ClientRegistry>,
    dispatcher: BroadcastDispatcher,
}

impl MessageRouter {
    pub fn new(
        subscriptions: Arc<SubscriptionRegistry>,
        clients: Arc<ClientRegistry>,
        dispatcher: BroadcastDispatcher,
    ) -> Self {
        Self {
            subscriptions,
            clients,
            dispatcher,
        }
    }

    /// Handles one event. Commands take priority over publishes: an event
    /// with `type: "subscribe"` and a topic is a subscription even if it
    /// also carries a data field.
    pub async fn route(&self, client_id: &ClientId, event: InboundEvent) {
        let InboundEvent { kind, topic, data } = event;
        let topic = topic.filter(|topic| !topic.is_empty());
        match (kind.as_deref(), topic.as_deref(), data) {
            (Some("subscribe"), Some(topic), _) => {
                self.subscriptions.subscribe(client_id, topic);
                info!("{} subscribed to topic '{}'", client_id, topic);
                self.reply(client_id, ServerMessage::ack_subscribe(topic));
            }
            (Some("unsubscribe"), Some(topic), _) => {
                if self.subscriptions.unsubscribe(client_id, topic) {
                    info!("{} unsubscribed from topic '{}'", client_id, topic);
                    self.reply(client_id, ServerMessage::ack_unsubscribe(topic));
                } else {
                    info!(
                        "{} tried to unsubscribe from '{}' but was not subscribed",
                        client_id, topic
                    );
                    self.reply(
                        client_id,
                        ServerMessage::error(format!("Not subscribed to {topic}")),
                    );
                }
            }
            (_, Some(topic), Some(data)) => match serde_json::to_string(&data) {
                Ok(payload) => {
                    debug!("relaying data for topic '{}' from {}", topic, client_id);
                    self.dispatcher.publish(topic, payload).await;
                }
                Err(e) => {
                    error!("failed to serialize payload from {}: {}", client_id, e);
                    self.reply(
                        client_id,
                        ServerMessage::error("Server error processing message."),
                    );
                }
            },
            _ => {
                debug!("unknown or malformed message from {}", client_id);
                self.reply(client_id, ServerMessage::error(MALFORMED_HINT));
            }
        }
    }

    /// Reports a boundary decode failure back to the sender. No state
    /// changes and no other client is affected.
    pub fn on_decode_failure(&self, client_id: &ClientId) {
        self.reply(
            client_id,
            ServerMessage::error("Message must be valid JSON."),
        );
    }

    fn reply(&self, client_id: &ClientId, message: ServerMessage) {
        if self.clients.deliver(client_id, message.to_ws()) != Delivery::Delivered {
            debug!("could not deliver reply to {}", client_id);
        }
    }
}
