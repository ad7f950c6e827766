//! # hermes
//!
//! `hermes` is an in-memory, topic-based publish/subscribe relay built with
//! Rust. Clients connect over WebSockets, subscribe to named topics, and
//! every message published to a topic is fanned out to the clients
//! subscribed at that moment.
//!
//! ## Core Modules
//!
//! The library is structured into several modules, each with a distinct
//! responsibility:
//!
//! - `broker`: the relay core - subscription registry, connection lifecycle,
//!   message routing and broadcast dispatch.
//! - `client`: represents a connected WebSocket client and tracks the full
//!   set of connected clients.
//! - `config`: handles loading and merging server configuration.
//! - `transport`: manages the WebSocket server and the wire message shapes.
//! - `utils`: contains shared utilities, such as logging setup and error
//!   types.

pub mod broker;
pub mod client;
pub mod config;
pub mod transport;
pub mod utils;
