//! Coordinate (long algebraic / UCI) move text.
//!
//! `e2e4`, `e7e8q`. Parsing is purely syntactic; `resolve_long_algebraic`
//! additionally requires the move to be one of the supplied legal moves.

use crate::errors::NotationError;
use crate::game_state::chess_types::PieceKind;
use crate::moves::chess_move::Move;
use crate::utils::algebraic::algebraic_to_square;

#[inline]
pub fn move_to_long_algebraic(mv: &Move) -> String {
    mv.to_string()
}

pub fn long_algebraic_to_move(text: &str) -> Result<Move, NotationError> {
    let err = |reason: &str| NotationError::InvalidMove {
        text: text.to_owned(),
        reason: reason.to_owned(),
    };

    if !text.is_ascii() || !(4..=5).contains(&text.len()) {
        return Err(err("expected 4 or 5 characters"));
    }

    let from = algebraic_to_square(&text[0..2]).map_err(|_| err("invalid origin square"))?;
    let to = algebraic_to_square(&text[2..4]).map_err(|_| err("invalid destination square"))?;

    let promotion = match text[4..].chars().next() {
        None => None,
        Some(ch) => Some(
            PieceKind::from_letter(ch)
                .filter(|kind| kind.is_promotion_target())
                .ok_or_else(|| err("invalid promotion piece"))?,
        ),
    };

    Ok(Move { from, to, promotion })
}

/// Parse `text` and require it to name one of `legal`.
pub fn resolve_long_algebraic(text: &str, legal: &[Move]) -> Result<Move, NotationError> {
    let mv = long_algebraic_to_move(text)?;
    if legal.contains(&mv) {
        Ok(mv)
    } else {
        Err(NotationError::InvalidMove {
            text: text.to_owned(),
            reason: "not a legal move in this position".to_owned(),
        })
    }
}
