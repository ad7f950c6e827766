use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use tracing::debug;

use crate::client::ClientId;

/// Opaque string key partitioning publish/subscribe traffic.
pub type Topic = String;

#[derive(Debug, Default)]
struct RegistryState {
    topic_subscribers: HashMap<Topic, HashSet<ClientId>>,
    client_topics: HashMap<ClientId, HashSet<Topic>>,
}

/// The bidirectional topic/client mapping at the heart of the relay.
///
/// Both maps are kept in lockstep under a single mutex: a client appears in
/// a topic's subscriber set exactly when the topic appears in the client's
/// topic set, a topic key exists only while its subscriber set is non-empty,
/// and a client key only while its topic set is non-empty. Every operation
/// below is atomic with respect to the others, and the lock is never held
/// across an await point.
#[derive(Debug, Default)]
pub struct SubscriptionRegistry {
    state: Mutex<RegistryState>,
}

impl SubscriptionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribes a client to a topic. Subscribing twice to the same topic
    /// is a no-op, not an error.
    pub fn subscribe(&self, client_id: &ClientId, topic: &str) {
        let mut state = self.state.lock().unwrap();
        let subscribers = state
            .topic_subscribers
            .entry(topic.to_string())
            .or_default();
        subscribers.insert(client_id.clone());
        let count = subscribers.len();
        state
            .client_topics
            .entry(client_id.clone())
            .or_default()
            .insert(topic.to_string());
        debug!("subscribers for '{}': {}", topic, count);
    }

    /// Removes the client/topic association if present and reports whether
    /// it was. An absent association leaves the registry untouched; the
    /// caller decides how to surface that.
    pub fn unsubscribe(&self, client_id: &ClientId, topic: &str) -> bool {
        let mut state = self.state.lock().unwrap();
        let remaining = match state.topic_subscribers.get_mut(topic) {
            Some(subscribers) => {
                if !subscribers.remove(client_id) {
                    return false;
                }
                subscribers.len()
            }
            None => return false,
        };
        if remaining == 0 {
            state.topic_subscribers.remove(topic);
            debug!("topic '{}' has no more subscribers and was removed", topic);
        }
        if let Some(topics) = state.client_topics.get_mut(client_id) {
            topics.remove(topic);
            if topics.is_empty() {
                state.client_topics.remove(client_id);
            }
        }
        true
    }

    /// Detaches a client from every topic it was subscribed to, returning
    /// the topics it held. Topics left without subscribers cease to exist.
    /// Safe to call for a client with no subscriptions.
    pub fn remove_client(&self, client_id: &ClientId) -> HashSet<Topic> {
        let mut state = self.state.lock().unwrap();
        let topics = state.client_topics.remove(client_id).unwrap_or_default();
        for topic in &topics {
            let now_empty = match state.topic_subscribers.get_mut(topic) {
                Some(subscribers) => {
                    subscribers.remove(client_id);
                    subscribers.is_empty()
                }
                None => false,
            };
            if now_empty {
                state.topic_subscribers.remove(topic);
                debug!("topic '{}' has no more subscribers and was removed", topic);
            }
        }
        topics
    }

    /// Returns a point-in-time copy of a topic's subscribers, taken under
    /// the registry lock so concurrent mutations cannot show through while
    /// a caller iterates it.
    pub fn subscribers_of(&self, topic: &str) -> Vec<ClientId> {
        let state = self.state.lock().unwrap();
        state
            .topic_subscribers
            .get(topic)
            .map(|subscribers| subscribers.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn subscriber_count(&self, topic: &str) -> usize {
        let state = self.state.lock().unwrap();
        state
            .topic_subscribers
            .get(topic)
            .map_or(0, |subscribers| subscribers.len())
    }

    pub fn is_subscribed(&self, client_id: &ClientId, topic: &str) -> bool {
        let state = self.state.lock().unwrap();
        state
            .topic_subscribers
            .get(topic)
            .is_some_and(|subscribers| subscribers.contains(client_id))
    }

    /// Topics the client currently holds, seen from the client-side map.
    pub fn topics_of(&self, client_id: &ClientId) -> HashSet<Topic> {
        let state = self.state.lock().unwrap();
        state
            .client_topics
            .get(client_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Topics that currently have at least one subscriber.
    pub fn active_topics(&self) -> Vec<Topic> {
        let state = self.state.lock().unwrap();
        state.topic_subscribers.keys().cloned().collect()
    }

    pub fn topic_count(&self) -> usize {
        self.state.lock().unwrap().topic_subscribers.len()
    }
}
