//! Error types for the room layer.

use gambit_protocol::Seat;

/// Errors that can occur during room operations.
///
/// `SeatTaken` is the only error a client ever hears about (as a
/// `joinError`); everything else the coordinator drops silently.
#[derive(Debug, Clone, thiserror::Error)]
pub enum RoomError {
    /// The requested seat is occupied by a different connection.
    #[error("seat {0} is taken")]
    SeatTaken(Seat),
}
