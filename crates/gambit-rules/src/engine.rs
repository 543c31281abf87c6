//! The `Rules` trait — the contract between the coordinator and
//! whatever decides move legality.
//!
//! The coordinator never inspects a board directly. It creates boards,
//! asks whose turn it is, submits moves, classifies the result, and
//! serializes snapshots — all through this trait. That keeps the
//! coordination core testable with a scripted stand-in and keeps the
//! chess knowledge in one place.

use gambit_protocol::{Promotion, Seat};

/// A proposed move as the client described it: two squares and an
/// optional promotion piece (already defaulted to queen by the caller).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveRequest {
    /// Origin square, e.g. "e2".
    pub from: String,
    /// Destination square, e.g. "e4".
    pub to: String,
    /// Piece to promote to, if the move turns out to be a promotion.
    pub promotion: Promotion,
}

/// The result of an accepted move: the successor board and the move's
/// standard algebraic notation.
#[derive(Debug, Clone)]
pub struct Applied<B> {
    pub board: B,
    pub san: String,
}

/// The engine rejected a move. Carries the squares for logging; the
/// wire surface never distinguishes why a move was dropped.
#[derive(Debug, Clone, thiserror::Error)]
#[error("illegal move {from} -> {to}")]
pub struct IllegalMove {
    pub from: String,
    pub to: String,
}

/// Terminal-state classification of a board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// The game continues.
    Ongoing,
    /// The side that just moved delivered mate.
    Checkmate { winner: Seat },
    Stalemate,
    /// Threefold repetition of the position.
    Repetition,
    InsufficientMaterial,
    /// Any other draw condition (fifty-move rule).
    OtherDraw,
}

impl Verdict {
    /// Returns `true` if the game is over.
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Ongoing)
    }
}

/// The move-legality collaborator.
///
/// Implementations must be pure over in-memory state: `apply` takes the
/// board by reference and returns a successor, so a rejected move can
/// never leave a half-mutated board behind.
pub trait Rules: Send + Sync + 'static {
    /// Opaque board handle owned by the room.
    type Board: Clone + Send + Sync + 'static;

    /// A fresh starting position.
    fn initial(&self) -> Self::Board;

    /// The side currently authorized to move.
    fn turn_side(&self, board: &Self::Board) -> Seat;

    /// Validates and applies a move. The input board is untouched on
    /// rejection.
    fn apply(
        &self,
        board: &Self::Board,
        mv: &MoveRequest,
    ) -> Result<Applied<Self::Board>, IllegalMove>;

    /// Classifies the board as ongoing or terminal.
    fn classify(&self, board: &Self::Board) -> Verdict;

    /// Canonical position encoding for snapshot transmission (FEN for
    /// standard chess).
    fn serialize(&self, board: &Self::Board) -> String;
}
