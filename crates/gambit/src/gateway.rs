//! Broadcast gateway: fan-out of notifications to room members.
//!
//! The coordinator never touches sockets. It hands [`ServerMessage`]s to
//! a [`Gateway`], which knows which connections are subscribed to which
//! room. The one real implementation, [`ChannelGateway`], pushes
//! messages into per-connection unbounded channels; the per-connection
//! writer task drains its channel into the socket. Tests read the
//! channels directly.

use std::collections::{HashMap, HashSet};

use gambit_protocol::{ConnectionId, RoomId, ServerMessage};
use tokio::sync::mpsc;

/// Delivery capability used by the coordinator.
///
/// Best-effort, at-most-once, ordered per connection. Sends to a
/// connection that is gone are silently dropped.
pub trait Gateway: Send + 'static {
    /// Sends a message to a single connection.
    fn unicast(&self, conn: ConnectionId, msg: ServerMessage);

    /// Sends a message to every connection subscribed to the room.
    fn broadcast(&self, room: &RoomId, msg: ServerMessage);

    /// Adds a connection to the room's broadcast group.
    fn subscribe(&mut self, room: &RoomId, conn: ConnectionId);

    /// Removes a connection from the room's broadcast group.
    fn unsubscribe(&mut self, room: &RoomId, conn: ConnectionId);

    /// Forgets a connection entirely: every subscription plus its
    /// delivery channel.
    fn drop_connection(&mut self, conn: ConnectionId);
}

/// Channel-backed [`Gateway`].
#[derive(Debug, Default)]
pub struct ChannelGateway {
    /// Per-connection outbound channels.
    senders: HashMap<ConnectionId, mpsc::UnboundedSender<ServerMessage>>,
    /// Broadcast group membership per room.
    members: HashMap<RoomId, HashSet<ConnectionId>>,
}

impl ChannelGateway {
    /// Creates an empty gateway.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a connection and returns the receiving end of its
    /// outbound channel. Must happen before the connection can join a
    /// room, or its notifications have nowhere to go.
    pub fn register(
        &mut self,
        conn: ConnectionId,
    ) -> mpsc::UnboundedReceiver<ServerMessage> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.senders.insert(conn, tx);
        rx
    }

    fn send_to(&self, conn: ConnectionId, msg: ServerMessage) {
        if let Some(sender) = self.senders.get(&conn) {
            let _ = sender.send(msg);
        }
    }
}

impl Gateway for ChannelGateway {
    fn unicast(&self, conn: ConnectionId, msg: ServerMessage) {
        self.send_to(conn, msg);
    }

    fn broadcast(&self, room: &RoomId, msg: ServerMessage) {
        if let Some(members) = self.members.get(room) {
            for conn in members {
                self.send_to(*conn, msg.clone());
            }
        }
    }

    fn subscribe(&mut self, room: &RoomId, conn: ConnectionId) {
        self.members.entry(room.clone()).or_default().insert(conn);
    }

    fn unsubscribe(&mut self, room: &RoomId, conn: ConnectionId) {
        if let Some(members) = self.members.get_mut(room) {
            members.remove(&conn);
        }
    }

    fn drop_connection(&mut self, conn: ConnectionId) {
        self.senders.remove(&conn);
        for members in self.members.values_mut() {
            members.remove(&conn);
        }
    }
}
