//! The rules-engine seam for Gambit.
//!
//! The coordinator treats move legality as an external collaborator: it
//! hands a board and a proposed move to something implementing [`Rules`]
//! and acts on the verdict. This crate defines that contract and ships
//! the one implementation the server uses, [`StandardChess`] (backed by
//! `shakmaty`).
//!
//! # Key types
//!
//! - [`Rules`] — the collaborator contract
//! - [`Verdict`] — terminal-state classification
//! - [`StandardChess`] / [`ChessBoard`] — standard chess rules

mod engine;
mod standard;

pub use engine::{Applied, IllegalMove, MoveRequest, Rules, Verdict};
pub use standard::{ChessBoard, InvalidFen, StandardChess};
