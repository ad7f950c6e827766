//! The `broker` module is the core of the relay: the bidirectional
//! subscription registry, connection lifecycle tracking, inbound message
//! routing and broadcast dispatch.

pub mod dispatcher;
pub mod engine;
pub mod lifecycle;
pub mod registry;
pub mod router;

pub use engine::Broker;
pub use registry::{SubscriptionRegistry, Topic};

#[cfg(test)]
mod tests;
