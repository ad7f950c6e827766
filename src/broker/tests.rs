use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::sync::mpsc::UnboundedReceiver;
use tungstenite::protocol::Message as WsMessage;

use super::dispatcher::BroadcastDispatcher;
use super::lifecycle::ConnectionLifecycle;
use super::registry::SubscriptionRegistry;
use crate::client::{ClientHandle, ClientId, ClientRegistry};

fn test_addr() -> std::net::SocketAddr {
    "127.0.0.1:0".parse().unwrap()
}

fn test_client() -> (ClientHandle, UnboundedReceiver<WsMessage>) {
    let (tx, rx) = mpsc::unbounded_channel::<WsMessage>();
    (ClientHandle::new(test_addr(), tx), rx)
}

struct TestCore {
    subscriptions: Arc<SubscriptionRegistry>,
    clients: Arc<ClientRegistry>,
    lifecycle: Arc<ConnectionLifecycle>,
    dispatcher: BroadcastDispatcher,
}

fn test_core() -> TestCore {
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
    TestCore {
        subscriptions,
        clients,
        lifecycle,
        dispatcher,
    }
}

#[test]
fn test_subscribe_is_idempotent() {
    let registry = SubscriptionRegistry::new();
    let client: ClientId = "client-a".to_string();

    registry.subscribe(&client, "news");
    registry.subscribe(&client, "news");

    assert_eq!(registry.subscriber_count("news"), 1);
    assert_eq!(registry.topics_of(&client).len(), 1);
}

#[test]
fn test_registry_mappings_stay_symmetric() {
    let registry = SubscriptionRegistry::new();
    let a: ClientId = "client-a".to_string();
    let b: ClientId = "client-b".to_string();

    registry.subscribe(&a, "news");
    registry.subscribe(&a, "stock:AAPL");
    registry.subscribe(&b, "news");
    registry.unsubscribe(&a, "news");
    registry.remove_client(&b);

    for topic in registry.active_topics() {
        for client in registry.subscribers_of(&topic) {
            assert!(registry.topics_of(&client).contains(&topic));
        }
    }
    assert!(registry.is_subscribed(&a, "stock:AAPL"));
    assert!(!registry.is_subscribed(&a, "news"));
    assert_eq!(registry.topic_count(), 1);
    assert!(registry.topics_of(&b).is_empty());
}

#[test]
fn test_unsubscribe_when_not_subscribed_reports_not_present() {
    let registry = SubscriptionRegistry::new();
    let client: ClientId = "client-a".to_string();
    registry.subscribe(&client, "news");

    assert!(!registry.unsubscribe(&client, "alerts"));

    assert_eq!(registry.subscriber_count("news"), 1);
    assert_eq!(registry.topic_count(), 1);
    assert_eq!(registry.topics_of(&client).len(), 1);
}

#[test]
fn test_last_unsubscriber_removes_topic() {
    let registry = SubscriptionRegistry::new();
    let client: ClientId = "client-a".to_string();
    registry.subscribe(&client, "alerts");

    assert!(registry.unsubscribe(&client, "alerts"));

    assert_eq!(registry.topic_count(), 0);
    assert!(registry.topics_of(&client).is_empty());
}

#[test]
fn test_remove_client_returns_topics_and_cleans_up() {
    let registry = SubscriptionRegistry::new();
    let a: ClientId = "client-a".to_string();
    let b: ClientId = "client-b".to_string();
    registry.subscribe(&a, "news");
    registry.subscribe(&a, "alerts");
    registry.subscribe(&b, "news");

    let topics = registry.remove_client(&a);

    assert_eq!(topics.len(), 2);
    assert!(topics.contains("news"));
    assert!(topics.contains("alerts"));
    // "news" survives with b, "alerts" had no other subscriber
    assert_eq!(registry.subscriber_count("news"), 1);
    assert_eq!(registry.topic_count(), 1);
    assert!(registry.topics_of(&a).is_empty());
}

#[test]
fn test_remove_client_without_subscriptions_is_a_noop() {
    let registry = SubscriptionRegistry::new();
    registry.subscribe(&"client-a".to_string(), "news");

    let topics = registry.remove_client(&"client-b".to_string());

    assert!(topics.is_empty());
    assert_eq!(registry.topic_count(), 1);
}

#[test]
fn test_on_connect_sends_greeting() {
    let core = test_core();
    let (client, mut rx) = test_client();
    let id = client.id.clone();

    core.lifecycle.on_connect(client);

    assert!(core.clients.contains(&id));
    let greeting = rx.try_recv().unwrap();
    let value: serde_json::Value = serde_json::from_str(greeting.to_text().unwrap()).unwrap();
    assert_eq!(value["type"], "info");
}

#[test]
fn test_on_disconnect_twice_is_a_noop() {
    let core = test_core();
    let (client, _rx) = test_client();
    let id = client.id.clone();
    core.lifecycle.on_connect(client);
    core.subscriptions.subscribe(&id, "news");

    core.lifecycle.on_disconnect(&id);
    assert_eq!(core.subscriptions.topic_count(), 0);
    assert!(!core.clients.contains(&id));

    // second call must not panic or change anything
    core.lifecycle.on_disconnect(&id);
    assert_eq!(core.subscriptions.topic_count(), 0);
    assert!(core.clients.is_empty());
}

#[test]
fn test_subscribe_after_cleanup_is_reconciled_by_final_disconnect() {
    // A dispatch-driven cleanup can fire while the connection's reader is
    // still alive; a subscribe processed afterwards must not outlive the
    // reader's own disconnect.
    let core = test_core();
    let (client, _rx) = test_client();
    let id = client.id.clone();
    core.lifecycle.on_connect(client);
    core.subscriptions.subscribe(&id, "news");

    core.lifecycle.on_disconnect(&id);
    core.subscriptions.subscribe(&id, "news");

    core.lifecycle.on_disconnect(&id);
    assert_eq!(core.subscriptions.topic_count(), 0);
    assert!(core.subscriptions.topics_of(&id).is_empty());
    assert!(core.clients.is_empty());
}

#[tokio::test]
async fn test_publish_reaches_subscriber_with_raw_payload() {
    let core = test_core();
    let (client, mut rx) = test_client();
    let id = client.id.clone();
    core.clients.register(client);
    core.subscriptions.subscribe(&id, "stock:AAPL");

    core.dispatcher
        .publish("stock:AAPL", "{\"price\":150}".to_string())
        .await;

    let received = rx.try_recv().unwrap();
    assert_eq!(received.to_text().unwrap(), "{\"price\":150}");
    assert_eq!(core.subscriptions.subscriber_count("stock:AAPL"), 1);
}

#[tokio::test]
async fn test_publish_without_subscribers_is_silent() {
    let core = test_core();

    core.dispatcher.publish("alerts", "{}".to_string()).await;

    assert_eq!(core.subscriptions.topic_count(), 0);
}

#[tokio::test]
async fn test_publish_skips_disconnected_subscriber() {
    let core = test_core();
    let (a, _rx_a) = test_client();
    let (b, mut rx_b) = test_client();
    let id_a = a.id.clone();
    let id_b = b.id.clone();
    core.clients.register(a);
    core.clients.register(b);
    core.subscriptions.subscribe(&id_a, "news");
    core.subscriptions.subscribe(&id_b, "news");

    core.lifecycle.on_disconnect(&id_a);
    core.dispatcher
        .publish("news", "\"breaking\"".to_string())
        .await;

    assert!(rx_b.try_recv().is_ok());
    assert_eq!(core.subscriptions.subscriber_count("news"), 1);
    assert!(core.subscriptions.is_subscribed(&id_b, "news"));
}

#[tokio::test]
async fn test_publish_cleans_up_dead_subscribers() {
    // 100 subscribers, 3 of them silently dead at the transport level:
    // 97 deliveries, 3 cleanups, and the call settles all attempts.
    let core = test_core();
    let mut receivers = Vec::new();
    let mut dead = Vec::new();
    for i in 0..100 {
        let (client, rx) = test_client();
        let id = client.id.clone();
        core.clients.register(client);
        core.subscriptions.subscribe(&id, "load");
        if i < 3 {
            drop(rx);
            dead.push(id);
        } else {
            receivers.push(rx);
        }
    }

    core.dispatcher.publish("load", "\"tick\"".to_string()).await;

    for rx in receivers.iter_mut() {
        assert!(rx.try_recv().is_ok());
    }
    assert_eq!(core.subscriptions.subscriber_count("load"), 97);
    assert_eq!(core.clients.len(), 97);
    for id in &dead {
        assert!(!core.clients.contains(id));
        assert!(core.subscriptions.topics_of(id).is_empty());
    }
}

#[tokio::test]
async fn test_publish_after_topic_removed_delivers_to_nobody() {
    let core = test_core();
    let (client, mut rx) = test_client();
    let id = client.id.clone();
    core.clients.register(client);
    core.subscriptions.subscribe(&id, "alerts");

    assert!(core.subscriptions.unsubscribe(&id, "alerts"));
    assert_eq!(core.subscriptions.topic_count(), 0);

    core.dispatcher
        .publish("alerts", "\"ignored\"".to_string())
        .await;

    assert!(rx.try_recv().is_err());
    assert!(core.clients.contains(&id));
}
