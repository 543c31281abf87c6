//! A single room: one board, two seats, last-move memory.

use gambit_protocol::{ConnectionId, LastMove, Seat};

use crate::RoomError;

/// The two seats of a room and who holds them.
///
/// Invariants upheld here: a seat holds at most one connection, and a
/// connection holds at most one seat per room (claiming the second seat
/// releases the first).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Seats {
    white: Option<ConnectionId>,
    black: Option<ConnectionId>,
}

impl Seats {
    /// Returns the connection holding the given seat, if any.
    pub fn holder(&self, seat: Seat) -> Option<ConnectionId> {
        match seat {
            Seat::White => self.white,
            Seat::Black => self.black,
        }
    }

    /// Returns the seat held by the given connection, if any.
    pub fn seat_of(&self, conn: ConnectionId) -> Option<Seat> {
        if self.white == Some(conn) {
            Some(Seat::White)
        } else if self.black == Some(conn) {
            Some(Seat::Black)
        } else {
            None
        }
    }

    /// The first vacant seat in claim order: white, then black.
    pub fn first_vacant(&self) -> Option<Seat> {
        if self.white.is_none() {
            Some(Seat::White)
        } else if self.black.is_none() {
            Some(Seat::Black)
        } else {
            None
        }
    }

    /// Occupancy booleans in `(white, black)` order, for the `players`
    /// summary.
    pub fn occupancy(&self) -> (bool, bool) {
        (self.white.is_some(), self.black.is_some())
    }

    fn slot_mut(&mut self, seat: Seat) -> &mut Option<ConnectionId> {
        match seat {
            Seat::White => &mut self.white,
            Seat::Black => &mut self.black,
        }
    }

    /// Claims a seat for a connection.
    ///
    /// Idempotent when the connection already holds that seat. Fails if
    /// a different connection holds it. A connection switching seats
    /// within the room releases its previous one.
    pub fn claim(
        &mut self,
        seat: Seat,
        conn: ConnectionId,
    ) -> Result<(), RoomError> {
        match self.holder(seat) {
            Some(holder) if holder != conn => {
                Err(RoomError::SeatTaken(seat))
            }
            _ => {
                let previous = self.seat_of(conn);
                if let Some(prev) = previous {
                    if prev != seat {
                        *self.slot_mut(prev) = None;
                    }
                }
                *self.slot_mut(seat) = Some(conn);
                Ok(())
            }
        }
    }

    /// Vacates whatever seat the connection holds. Returns the released
    /// seat, if there was one.
    pub fn vacate(&mut self, conn: ConnectionId) -> Option<Seat> {
        let seat = self.seat_of(conn)?;
        *self.slot_mut(seat) = None;
        Some(seat)
    }
}

/// One game instance: board handle, seat assignments, last-move memory.
///
/// The board type is opaque here — rooms never interpret it, they just
/// hand it to the rules engine and store what comes back.
#[derive(Debug, Clone)]
pub struct Room<B> {
    board: B,
    seats: Seats,
    last_move: Option<LastMove>,
}

impl<B> Room<B> {
    /// Creates a room with a fresh board, empty seats, and no last move.
    pub fn new(board: B) -> Self {
        Self {
            board,
            seats: Seats::default(),
            last_move: None,
        }
    }

    /// The current board state.
    pub fn board(&self) -> &B {
        &self.board
    }

    /// The seat assignments.
    pub fn seats(&self) -> &Seats {
        &self.seats
    }

    /// Mutable access to the seat assignments.
    pub fn seats_mut(&mut self) -> &mut Seats {
        &mut self.seats
    }

    /// The last accepted move, if any since the last reset.
    pub fn last_move(&self) -> Option<&LastMove> {
        self.last_move.as_ref()
    }

    /// Commits an accepted move: successor board plus last-move record.
    pub fn record_move(&mut self, board: B, last_move: LastMove) {
        self.board = board;
        self.last_move = Some(last_move);
    }

    /// Replaces the board with a fresh one and clears the last move.
    /// Seats are untouched.
    pub fn reset(&mut self, board: B) {
        self.board = board;
        self.last_move = None;
    }
}
