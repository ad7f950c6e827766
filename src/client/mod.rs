//! The `client` module defines the representation of a client in the relay.
//!
//! It provides the `ClientHandle` struct, which encapsulates the state of a
//! single connected client (its identifier, peer address and the channel for
//! sending messages to it), and the `ClientRegistry` that tracks every
//! connected client and delivers messages to them.

pub mod handle;
pub mod registry;

pub use handle::{ClientHandle, ClientId, Delivery};
pub use registry::ClientRegistry;
