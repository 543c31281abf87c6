//! Core protocol types for Gambit's wire format.
//!
//! Every inbound intent and outbound notification is one of the enums
//! defined here, serialized as internally-tagged JSON:
//!
//! ```json
//! { "type": "join", "room": "R1", "seat": "auto" }
//! ```
//!
//! The tag names are part of the wire contract — the shape tests at the
//! bottom of this file pin them down.

use serde::{Deserialize, Serialize};

use std::fmt;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A unique identifier for one live connection.
///
/// Assigned by the server when the socket is accepted; never sent to
/// clients. Identity is connection-scoped by design — there is no account
/// or reconnection-token layer behind it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Creates a new `ConnectionId` from a raw `u64`.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the underlying `u64` value.
    pub fn into_inner(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// An opaque, client-chosen room identifier.
///
/// Rooms are keyed by whatever string clients agree on ("R1", a lobby
/// UUID, a friend-link slug). The server attaches no meaning to it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(pub String);

impl RoomId {
    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for RoomId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Seats and roles
// ---------------------------------------------------------------------------

/// One of the two exclusive seats in a room.
///
/// Holding a seat grants move authority on that side's turns. Serialized
/// lowercase ("white"/"black") to match the wire contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Seat {
    White,
    Black,
}

impl Seat {
    /// Returns the opposing seat.
    pub fn opponent(self) -> Self {
        match self {
            Self::White => Self::Black,
            Self::Black => Self::White,
        }
    }
}

impl fmt::Display for Seat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::White => write!(f, "white"),
            Self::Black => write!(f, "black"),
        }
    }
}

/// What a joining client asks for: a concrete seat, or whatever is free.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SeatChoice {
    White,
    Black,
    /// First vacant seat, white preferred; spectator if both are held.
    #[default]
    Auto,
}

/// The role a join request resolved to, echoed back in `colorAssigned`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    White,
    Black,
    Spectator,
}

impl From<Seat> for Role {
    fn from(seat: Seat) -> Self {
        match seat {
            Seat::White => Self::White,
            Seat::Black => Self::Black,
        }
    }
}

impl From<Option<Seat>> for Role {
    fn from(seat: Option<Seat>) -> Self {
        seat.map_or(Self::Spectator, Self::from)
    }
}

// ---------------------------------------------------------------------------
// Moves
// ---------------------------------------------------------------------------

/// The piece a pawn promotes to. Defaults to queen when the client
/// omits it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Promotion {
    #[default]
    Queen,
    Rook,
    Bishop,
    Knight,
}

/// The most recent accepted move in a room, kept for state snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastMove {
    /// Origin square, e.g. "e2".
    pub from: String,
    /// Destination square, e.g. "e4".
    pub to: String,
    /// Standard algebraic notation for the move, e.g. "e4" or "a8=Q".
    pub san: String,
}

// ---------------------------------------------------------------------------
// Client → server intents
// ---------------------------------------------------------------------------

/// Everything a client can ask the server to do.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ClientMessage {
    /// Request membership in a room, optionally claiming a seat.
    Join {
        room: RoomId,
        #[serde(default)]
        seat: SeatChoice,
    },

    /// Attempt a move. Silently dropped if out of turn or illegal.
    Move {
        room: RoomId,
        from: String,
        to: String,
        #[serde(default)]
        promotion: Option<Promotion>,
    },

    /// Restart the room's game. Anyone in the room may ask, spectators
    /// included.
    Reset { room: RoomId },

    /// Voluntarily vacate the room (and any seat held there).
    LeaveRoom { room: RoomId },
}

// ---------------------------------------------------------------------------
// Server → client notifications
// ---------------------------------------------------------------------------

/// Everything the server sends back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ServerMessage {
    /// Unicast confirmation of the role a join resolved to.
    ColorAssigned { seat: Role },

    /// Full snapshot of a room's game. Unicast on join, multicast after
    /// every accepted mutation.
    State {
        /// Canonical position encoding (FEN).
        position: String,
        /// The side currently authorized to move.
        turn: Seat,
        #[serde(rename = "lastMove")]
        last_move: Option<LastMove>,
    },

    /// Seat-occupancy summary, multicast whenever seats change hands.
    Players { white: bool, black: bool },

    /// Terminal outcome, multicast once per game end.
    GameOver {
        checkmate: bool,
        draw: bool,
        stalemate: bool,
        repetition: bool,
        insufficient: bool,
        winner: Option<Seat>,
    },

    /// Unicast rejection of a join that asked for an occupied seat.
    JoinError { message: String },
}

// =========================================================================
// Tests
// =========================================================================
