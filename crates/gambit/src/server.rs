//! `GambitServer` builder, accept loop, and per-connection handler.
//!
//! Each accepted socket is upgraded to WebSocket, assigned a
//! `ConnectionId`, and given two tasks' worth of work: a reader loop
//! that decodes intents and runs them through the coordinator, and a
//! writer task that drains the connection's gateway channel into the
//! socket.
//!
//! The coordinator lives behind a single `tokio::sync::Mutex`. Every
//! intent holds the lock for its whole read-validate-apply-broadcast
//! sequence; gateway sends are channel pushes, so nothing under the
//! lock ever waits on network I/O.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use gambit_protocol::{ClientMessage, Codec, ConnectionId, JsonCodec};
use gambit_rules::Rules;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;
use tokio_tungstenite::tungstenite::Message;

use crate::{ChannelGateway, Coordinator, GambitError};

/// Counter for generating unique connection IDs.
static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

/// Shared server state passed to each connection handler task.
struct ServerState<R: Rules> {
    coordinator: Mutex<Coordinator<R, ChannelGateway>>,
    codec: JsonCodec,
}

/// Builder for configuring and starting a Gambit server.
///
/// # Example
///
/// ```rust,ignore
/// let server = GambitServerBuilder::new()
///     .bind("0.0.0.0:8080")
///     .build(StandardChess)
///     .await?;
/// server.run().await
/// ```
pub struct GambitServerBuilder {
    bind_addr: String,
}

impl GambitServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Binds the listener and builds the server with the given rules
    /// engine.
    pub async fn build<R: Rules>(
        self,
        rules: R,
    ) -> Result<GambitServer<R>, GambitError> {
        let listener = TcpListener::bind(&self.bind_addr)
            .await
            .map_err(GambitError::Bind)?;
        tracing::info!(addr = %self.bind_addr, "listening");

        let state = Arc::new(ServerState {
            coordinator: Mutex::new(Coordinator::new(
                rules,
                ChannelGateway::new(),
            )),
            codec: JsonCodec,
        });

        Ok(GambitServer { listener, state })
    }
}

impl Default for GambitServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A running Gambit server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct GambitServer<R: Rules> {
    listener: TcpListener,
    state: Arc<ServerState<R>>,
}

impl<R: Rules> GambitServer<R> {
    /// Creates a new builder.
    pub fn builder() -> GambitServerBuilder {
        GambitServerBuilder::new()
    }

    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.listener.local_addr()
    }

    /// Runs the accept loop until the process is terminated.
    pub async fn run(self) -> Result<(), GambitError> {
        tracing::info!("gambit server running");

        loop {
            match self.listener.accept().await {
                Ok((stream, _addr)) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        if let Err(e) =
                            handle_connection(stream, state).await
                        {
                            tracing::debug!(
                                error = %e,
                                "connection ended with error"
                            );
                        }
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}

/// Handles a single connection from upgrade to close.
async fn handle_connection<R: Rules>(
    stream: TcpStream,
    state: Arc<ServerState<R>>,
) -> Result<(), GambitError> {
    let ws = tokio_tungstenite::accept_async(stream).await?;
    let conn = ConnectionId::new(
        NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed),
    );
    tracing::debug!(%conn, "accepted WebSocket connection");

    let (mut sink, mut source) = ws.split();

    // Register the outbound channel before any intent can fire, so a
    // join's own notifications have somewhere to go.
    let mut outbound = {
        let mut coordinator = state.coordinator.lock().await;
        coordinator.gateway_mut().register(conn)
    };

    let codec = state.codec;
    let writer = tokio::spawn(async move {
        while let Some(msg) = outbound.recv().await {
            let bytes = match codec.encode(&msg) {
                Ok(bytes) => bytes,
                Err(e) => {
                    tracing::error!(%conn, error = %e, "encode failed");
                    continue;
                }
            };
            if sink.send(Message::Binary(bytes.into())).await.is_err() {
                break;
            }
        }
    });

    while let Some(frame) = source.next().await {
        let data: Vec<u8> = match frame {
            Ok(Message::Binary(data)) => data.into(),
            Ok(Message::Text(text)) => text.as_bytes().to_vec(),
            Ok(Message::Close(_)) => break,
            Ok(_) => continue, // ping/pong/frame
            Err(e) => {
                tracing::debug!(%conn, error = %e, "recv error");
                break;
            }
        };

        let msg: ClientMessage = match state.codec.decode(&data) {
            Ok(msg) => msg,
            Err(e) => {
                tracing::debug!(%conn, error = %e, "failed to decode intent");
                continue;
            }
        };

        let mut coordinator = state.coordinator.lock().await;
        dispatch(&mut coordinator, conn, msg);
    }

    // Socket gone: vacate any held seats and drop the channel. The
    // writer task ends on its own once the channel sender is removed.
    {
        let mut coordinator = state.coordinator.lock().await;
        coordinator.disconnect(conn);
    }
    let _ = writer.await;

    tracing::info!(%conn, "connection closed");
    Ok(())
}

/// Routes one decoded intent into the coordinator. Outcomes are
/// deliberately discarded here: rejected moves and unknown rooms are
/// silent on the wire, and a seat conflict already sent its `joinError`.
fn dispatch<R: Rules>(
    coordinator: &mut Coordinator<R, ChannelGateway>,
    conn: ConnectionId,
    msg: ClientMessage,
) {
    match msg {
        ClientMessage::Join { room, seat } => {
            let _ = coordinator.join(conn, &room, seat);
        }
        ClientMessage::Move {
            room,
            from,
            to,
            promotion,
        } => {
            let _ =
                coordinator.submit_move(conn, &room, &from, &to, promotion);
        }
        ClientMessage::Reset { room } => {
            let _ = coordinator.reset(&room);
        }
        ClientMessage::LeaveRoom { room } => {
            coordinator.leave_room(conn, &room);
        }
    }
}
