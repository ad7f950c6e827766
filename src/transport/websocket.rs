use std::net::SocketAddr;
use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_tungstenite::accept_async;
use tracing::{debug, info, warn};
use tungstenite::Error as WsError;
use tungstenite::protocol::Message as WsMessage;

use crate::broker::Broker;
use crate::client::ClientHandle;
use crate::transport::message::InboundEvent;
use crate::utils::error::ServerError;

/// Binds the listener and accepts connections until the process exits.
pub async fn start_websocket_server(addr: &str, broker: Arc<Broker>) -> Result<(), ServerError> {
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| ServerError::Bind {
            addr: addr.to_string(),
            source,
        })?;

    info!("websocket server listening on ws://{}", addr);

    loop {
        match listener.accept().await {
            Ok((stream, peer_addr)) => {
                let broker = Arc::clone(&broker);
                tokio::spawn(handle_connection(stream, peer_addr, broker));
            }
            Err(e) => warn!("failed to accept connection: {}", e),
        }
    }
}

async fn handle_connection(stream: TcpStream, peer_addr: SocketAddr, broker: Arc<Broker>) {
    let ws_stream = match accept_async(stream).await {
        Ok(ws) => ws,
        Err(e) => {
            warn!("websocket handshake failed for {}: {}", peer_addr, e);
            return;
        }
    };

    let (mut ws_sender, mut ws_receiver) = ws_stream.split();

    // Outbound messages are queued on this channel; the writer task below
    // owns the socket sink. The broker only ever observes the channel.
    let (tx, mut rx) = mpsc::unbounded_channel::<WsMessage>();

    let client = ClientHandle::new(peer_addr, tx);
    let client_id = client.id.clone();
    broker.on_connect(client);

    // Writer: drains the queue into the socket. Ends when every sender is
    // dropped (the client was unregistered) or the socket rejects a frame.
    let writer_id = client_id.clone();
    let writer_broker = Arc::clone(&broker);
    tokio::spawn(async move {
        while let Some(message) = rx.recv().await {
            if let Err(e) = ws_sender.send(message).await {
                match e {
                    WsError::ConnectionClosed | WsError::AlreadyClosed => {
                        info!("{} closed connection during send", writer_id);
                    }
                    e => warn!("send to {} failed: {}", writer_id, e),
                }
                break;
            }
        }
        writer_broker.on_disconnect(&writer_id);
    });

    // Reader: one event at a time, in connection order.
    while let Some(incoming) = ws_receiver.next().await {
        match incoming {
            Ok(WsMessage::Text(text)) => {
                debug!("raw message from {}: {:.100}", client_id, text.as_str());
                match serde_json::from_str::<InboundEvent>(&text) {
                    Ok(event) => broker.on_event(&client_id, event).await,
                    Err(e) => {
                        debug!("non-JSON message from {}: {}", client_id, e);
                        broker.on_decode_failure(&client_id);
                    }
                }
            }
            Ok(WsMessage::Close(_)) => {
                info!("connection closed cleanly by {}", client_id);
                break;
            }
            // Binary frames and pings carry no relay semantics.
            Ok(_) => {}
            Err(e) => {
                info!("connection error from {}: {}", client_id, e);
                break;
            }
        }
    }

    broker.on_disconnect(&client_id);
}
