//! # Gambit
//!
//! A WebSocket chess room server. Clients join named rooms, claim a seat
//! (white or black) or spectate, and the server arbitrates whose turn it
//! is, applies moves through a rules engine, and broadcasts consistent
//! state snapshots to every room member.
//!
//! The layers, bottom up:
//!
//! ```text
//! gambit-protocol   wire message shapes
//! gambit-rules      move legality (the Rules trait + standard chess)
//! gambit-room       room state and the room directory
//! gambit            coordinator, broadcast gateway, WebSocket server
//! ```
//!
//! The [`Coordinator`] is the heart: every intent — join, move, reset,
//! leave, disconnect — runs through it while the caller holds its lock,
//! which is what makes each read-validate-apply-broadcast sequence
//! atomic per room.

mod coordinator;
mod error;
mod gateway;
mod server;

pub use coordinator::{Coordinator, MoveOutcome};
pub use error::GambitError;
pub use gateway::{ChannelGateway, Gateway};
pub use server::{GambitServer, GambitServerBuilder};

/// Convenient glob import for binaries and tests.
pub mod prelude {
    pub use crate::{
        ChannelGateway, Coordinator, GambitError, GambitServer,
        GambitServerBuilder, Gateway, MoveOutcome,
    };
    pub use gambit_protocol::{
        ClientMessage, ConnectionId, LastMove, Promotion, Role, RoomId,
        Seat, SeatChoice, ServerMessage,
    };
    pub use gambit_room::{RoomDirectory, RoomError};
    pub use gambit_rules::{Rules, StandardChess, Verdict};
}
