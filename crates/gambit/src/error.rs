//! Unified error type for the Gambit server crate.

use gambit_protocol::ProtocolError;
use gambit_room::RoomError;

/// Top-level error for server setup and per-connection handling.
///
/// None of these ever take the process down: setup errors surface from
/// the builder, and connection errors end only the affected connection.
#[derive(Debug, thiserror::Error)]
pub enum GambitError {
    /// Encoding or decoding a wire message failed.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A room-level rejection (seat conflict).
    #[error(transparent)]
    Room(#[from] RoomError),

    /// Binding the listen address failed.
    #[error("bind failed: {0}")]
    Bind(#[source] std::io::Error),

    /// The WebSocket layer failed (upgrade, send, receive).
    #[error("websocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),
}
