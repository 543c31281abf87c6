//! Standard chess rules backed by `shakmaty`.
//!
//! [`ChessBoard`] pairs a shakmaty position with the history of position
//! keys seen so far, which is what lets [`StandardChess::classify`]
//! detect threefold repetition — shakmaty validates single positions and
//! does not remember where they came from.

use shakmaty::{
    fen::Fen, san::San, uci::UciMove, CastlingMode, Chess, Color,
    EnPassantMode, Move, Position,
};

use gambit_protocol::{Promotion, Seat};

use crate::{Applied, IllegalMove, MoveRequest, Rules, Verdict};

/// The FEN string could not be parsed into a legal position.
#[derive(Debug, thiserror::Error)]
#[error("invalid FEN: {0}")]
pub struct InvalidFen(String);

/// A chess position plus the repetition history needed to classify it.
#[derive(Debug, Clone)]
pub struct ChessBoard {
    position: Chess,
    /// Repetition keys (piece placement, turn, castling, en passant) of
    /// every position reached so far, this one included.
    seen: Vec<String>,
}

impl ChessBoard {
    fn from_position(position: Chess) -> Self {
        let key = position_key(&position);
        Self {
            position,
            seen: vec![key],
        }
    }

    /// How many times the current position has occurred.
    fn repetitions(&self) -> usize {
        let current = self.seen.last();
        self.seen.iter().filter(|k| Some(*k) == current).count()
    }
}

/// Builds the repetition key for a position: the first four FEN fields,
/// without the move counters.
fn position_key(position: &Chess) -> String {
    let fen =
        Fen::from_position(position.clone(), EnPassantMode::Legal)
            .to_string();
    fen.split_whitespace().take(4).collect::<Vec<_>>().join(" ")
}

/// Standard chess: legality, SAN, FEN, and terminal classification.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardChess;

impl StandardChess {
    /// Builds a board from a FEN string. Used by tests and tooling; the
    /// server itself only ever starts from the initial position.
    pub fn board_from_fen(&self, fen: &str) -> Result<ChessBoard, InvalidFen> {
        let fen: Fen = fen
            .parse()
            .map_err(|e| InvalidFen(format!("{e}")))?;
        let position: Chess = fen
            .into_position(CastlingMode::Standard)
            .map_err(|e| InvalidFen(format!("{e}")))?;
        Ok(ChessBoard::from_position(position))
    }
}

impl Rules for StandardChess {
    type Board = ChessBoard;

    fn initial(&self) -> ChessBoard {
        ChessBoard::from_position(Chess::default())
    }

    fn turn_side(&self, board: &ChessBoard) -> Seat {
        match board.position.turn() {
            Color::White => Seat::White,
            Color::Black => Seat::Black,
        }
    }

    fn apply(
        &self,
        board: &ChessBoard,
        mv: &MoveRequest,
    ) -> Result<Applied<ChessBoard>, IllegalMove> {
        let m = resolve_move(&board.position, mv)?;

        // SAN depends on the position the move is played from.
        let san = San::from_move(&board.position, &m).to_string();

        let next = board
            .position
            .clone()
            .play(&m)
            .map_err(|_| illegal(mv))?;

        let mut seen = board.seen.clone();
        seen.push(position_key(&next));

        Ok(Applied {
            board: ChessBoard {
                position: next,
                seen,
            },
            san,
        })
    }

    fn classify(&self, board: &ChessBoard) -> Verdict {
        if board.position.is_checkmate() {
            // The side to move is mated; the other side won.
            let winner = match board.position.turn() {
                Color::White => Seat::Black,
                Color::Black => Seat::White,
            };
            return Verdict::Checkmate { winner };
        }
        if board.position.is_stalemate() {
            return Verdict::Stalemate;
        }
        if board.position.is_insufficient_material() {
            return Verdict::InsufficientMaterial;
        }
        if board.repetitions() >= 3 {
            return Verdict::Repetition;
        }
        if board.position.halfmoves() >= 100 {
            return Verdict::OtherDraw;
        }
        Verdict::Ongoing
    }

    fn serialize(&self, board: &ChessBoard) -> String {
        Fen::from_position(
            board.position.clone(),
            EnPassantMode::Legal,
        )
        .to_string()
    }
}

/// Resolves a from/to square pair against the position.
///
/// Tries the plain UCI move first; if that fails and the move is a
/// promotion, retries with the requested promotion piece appended.
fn resolve_move(
    position: &Chess,
    mv: &MoveRequest,
) -> Result<Move, IllegalMove> {
    let plain = format!("{}{}", mv.from, mv.to);
    if let Some(m) = to_legal(position, &plain) {
        return Ok(m);
    }

    let promoted = format!("{plain}{}", promotion_char(mv.promotion));
    to_legal(position, &promoted).ok_or_else(|| illegal(mv))
}

fn to_legal(position: &Chess, uci: &str) -> Option<Move> {
    let parsed: UciMove = uci.parse().ok()?;
    let m = parsed.to_move(position).ok()?;
    position.is_legal(&m).then_some(m)
}

fn promotion_char(promotion: Promotion) -> char {
    match promotion {
        Promotion::Queen => 'q',
        Promotion::Rook => 'r',
        Promotion::Bishop => 'b',
        Promotion::Knight => 'n',
    }
}

fn illegal(mv: &MoveRequest) -> IllegalMove {
    IllegalMove {
        from: mv.from.clone(),
        to: mv.to.clone(),
    }
}
