//! The `transport` module is responsible for handling network communication
//! with clients over WebSockets.
//!
//! It defines the messaging protocol used between clients and the server,
//! and implements the WebSocket server itself, managing connections,
//! message decoding, and forwarding client events to the broker.

pub mod message;
pub mod websocket;
