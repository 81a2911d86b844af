//! Rules-level move value.
//!
//! A move is just its origin, destination, and optional promotion piece.
//! Everything else (capture, castling, en passant, double push) is a function
//! of the position it is played in and is recovered by the oracle.

use std::fmt;

use crate::game_state::chess_types::{PieceKind, Square};
use crate::utils::algebraic::square_to_algebraic;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Move {
    pub from: Square,
    pub to: Square,
    pub promotion: Option<PieceKind>,
}

impl Move {
    #[inline]
    pub const fn new(from: Square, to: Square) -> Self {
        Self {
            from,
            to,
            promotion: None,
        }
    }

    #[inline]
    pub const fn promoting(from: Square, to: Square, piece: PieceKind) -> Self {
        Self {
            from,
            to,
            promotion: Some(piece),
        }
    }

    /// Same origin and destination, ignoring the promotion piece.
    #[inline]
    pub fn same_squares(&self, from: Square, to: Square) -> bool {
        self.from == from && self.to == to
    }
}

/// Formats as coordinate notation (`e2e4`, `e7e8q`).
impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}",
            square_to_algebraic(self.from),
            square_to_algebraic(self.to)
        )?;
        if let Some(piece) = self.promotion {
            write!(f, "{}", piece.letter())?;
        }
        Ok(())
    }
}
