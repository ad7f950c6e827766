use serde::{Deserialize, Serialize};
use tracing::error;
use tungstenite::protocol::Message as WsMessage;

/// One decoded inbound frame, before classification.
///
/// The shape is deliberately permissive: a publish may carry any `type` (or
/// none) as long as `topic` and `data` are both present, so the router, not
/// the decoder, decides what an event means.
#[derive(Debug, Deserialize)]
pub struct InboundEvent {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub topic: Option<String>,
    pub data: Option<serde_json::Value>,
}

/// Structured replies sent back to the client that triggered them.
///
/// Broadcast frames are not wrapped in this type; subscribers receive the
/// published `data` value serialized as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ServerMessage {
    #[serde(rename = "info")]
    Info { message: String },

    #[serde(rename = "ack_subscribe")]
    AckSubscribe { topic: String, message: String },

    #[serde(rename = "ack_unsubscribe")]
    AckUnsubscribe { topic: String, message: String },

    #[serde(rename = "error")]
    Error { message: String },
}

impl ServerMessage {
    pub fn greeting() -> Self {
        Self::Info {
            message: "Connected to hermes. Send {'type': 'subscribe', 'topic': 'stock:TICKER'} to subscribe.".to_string(),
        }
    }

    pub fn ack_subscribe(topic: &str) -> Self {
        Self::AckSubscribe {
            topic: topic.to_string(),
            message: format!("Successfully subscribed to {topic}"),
        }
    }

    pub fn ack_unsubscribe(topic: &str) -> Self {
        Self::AckUnsubscribe {
            topic: topic.to_string(),
            message: format!("Successfully unsubscribed from {topic}"),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    /// Encodes the reply as a WebSocket text frame.
    pub fn to_ws(&self) -> WsMessage {
        match serde_json::to_string(self) {
            Ok(json) => WsMessage::text(json),
            Err(e) => {
                error!("failed to encode outbound message: {}", e);
                WsMessage::text(r#"{"type":"error","message":"internal encoding error"}"#)
            }
        }
    }
}
