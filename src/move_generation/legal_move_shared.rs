use crate::errors::OracleError;
use crate::game_state::chess_rules::{DARK_KING_START, LIGHT_KING_START};
use crate::game_state::{chess_types::*, position::Position};
use crate::moves::chess_move::Move;

/// What a move does on a particular board, recovered from the board itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveTraits {
    pub moved: PieceKind,
    pub captured: Option<PieceKind>,
    pub en_passant: bool,
    pub castling: bool,
    pub double_push: bool,
}

impl MoveTraits {
    #[inline]
    pub fn is_capture(&self) -> bool {
        self.captured.is_some()
    }
}

/// Work out the kind of move `mv` is in `position`.
///
/// Rejects moves that cannot even be pseudo-legal: empty origin, moving an
/// enemy piece, capturing an own piece, or a promotion that does not match a
/// pawn reaching its last rank.
pub fn classify_move(position: &Position, mv: &Move) -> Result<MoveTraits, OracleError> {
    if mv.from > 63 || mv.to > 63 || mv.from == mv.to {
        return Err(illegal(position, mv));
    }

    let mover = position.side_to_move;
    let (color, moved) = position
        .piece_at(mv.from)
        .ok_or_else(|| illegal(position, mv))?;
    if color != mover {
        return Err(illegal(position, mv));
    }

    let target = position.piece_at(mv.to);
    if matches!(target, Some((c, _)) if c == mover) {
        return Err(illegal(position, mv));
    }

    let reaches_last_rank = moved == PieceKind::Pawn && matches!(square_rank(mv.to), 0 | 7);
    match mv.promotion {
        Some(piece) if !reaches_last_rank || !piece.is_promotion_target() => {
            return Err(illegal(position, mv));
        }
        None if reaches_last_rank => return Err(illegal(position, mv)),
        _ => {}
    }

    let en_passant = moved == PieceKind::Pawn
        && target.is_none()
        && square_file(mv.from) != square_file(mv.to)
        && position.en_passant_square == Some(mv.to);

    let king_start = match mover {
        Color::Light => LIGHT_KING_START,
        Color::Dark => DARK_KING_START,
    };
    let castling = moved == PieceKind::King && mv.from == king_start && mv.from.abs_diff(mv.to) == 2;

    Ok(MoveTraits {
        moved,
        captured: if en_passant {
            Some(PieceKind::Pawn)
        } else {
            target.map(|(_, kind)| kind)
        },
        en_passant,
        castling,
        double_push: moved == PieceKind::Pawn && mv.from.abs_diff(mv.to) == 16,
    })
}

/// Push one quiet-or-capture move per set bit of `targets`.
#[inline]
pub fn push_targets(from: Square, mut targets: u64, out: &mut Vec<Move>) {
    while targets != 0 {
        let to = targets.trailing_zeros() as Square;
        out.push(Move::new(from, to));
        targets &= targets - 1;
    }
}

pub(crate) fn illegal(position: &Position, mv: &Move) -> OracleError {
    OracleError::IllegalMove {
        mv: mv.to_string(),
        fen: position.to_fen(),
    }
}
