//! The `error` module defines error types that are fatal to the server
//! process. Per-connection failures (handshake, decode, send) are logged and
//! contained at the connection that caused them instead.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to bind websocket listener on {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },
}
