use crate::errors::OracleError;
use crate::game_state::chess_rules::*;
use crate::game_state::{chess_types::*, position::Position};
use crate::move_generation::legal_move_shared::classify_move;
use crate::moves::chess_move::Move;

/// Play `mv` on a copy of `position`.
///
/// Only the shape of the move is checked here (see `classify_move`); whether
/// it leaves the mover's king in check is the generator's concern.
pub fn apply_move(position: &Position, mv: &Move) -> Result<Position, OracleError> {
    let traits = classify_move(position, mv)?;
    let from_mask = 1u64 << mv.from;
    let to_mask = 1u64 << mv.to;

    let mover = position.side_to_move;
    let enemy = mover.opposite();

    let mut next = position.clone();

    next.pieces[mover.index()][traits.moved.index()] &= !from_mask;

    if traits.en_passant {
        let capture_sq = match mover {
            Color::Light => mv.to - 8,
            Color::Dark => mv.to + 8,
        };
        next.pieces[enemy.index()][PieceKind::Pawn.index()] &= !(1u64 << capture_sq);
    } else if let Some(captured) = traits.captured {
        next.pieces[enemy.index()][captured.index()] &= !to_mask;
    }

    let placed = mv.promotion.unwrap_or(traits.moved);
    next.pieces[mover.index()][placed.index()] |= to_mask;

    if traits.castling {
        if let Some((rook_from, rook_to)) = castle_rook_path(mv.to) {
            let rooks = &mut next.pieces[mover.index()][PieceKind::Rook.index()];
            *rooks &= !(1u64 << rook_from);
            *rooks |= 1u64 << rook_to;
        }
    }

    update_castling_rights(&mut next, mover, mv, traits.moved);

    next.en_passant_square = if traits.double_push {
        Some((mv.from + mv.to) / 2)
    } else {
        None
    };

    if traits.moved == PieceKind::Pawn || traits.is_capture() {
        next.halfmove_clock = 0;
    } else {
        next.halfmove_clock = next.halfmove_clock.saturating_add(1);
    }
    if mover == Color::Dark {
        next.fullmove_number = next.fullmove_number.saturating_add(1);
    }

    next.side_to_move = enemy;
    next.recalc_occupancy();

    Ok(next)
}

fn castle_rook_path(king_to: Square) -> Option<(Square, Square)> {
    match king_to {
        6 => Some((LIGHT_KINGSIDE_ROOK, 5)),
        2 => Some((LIGHT_QUEENSIDE_ROOK, 3)),
        62 => Some((DARK_KINGSIDE_ROOK, 61)),
        58 => Some((DARK_QUEENSIDE_ROOK, 59)),
        _ => None,
    }
}

fn update_castling_rights(next: &mut Position, mover: Color, mv: &Move, moved: PieceKind) {
    if moved == PieceKind::King {
        next.castling_rights &= !(castle_flag(mover, CastleSide::Kingside)
            | castle_flag(mover, CastleSide::Queenside));
    }

    // A rook leaving its corner, or anything landing on a corner, ends that right.
    for square in [mv.from, mv.to] {
        next.castling_rights &= !corner_right(square);
    }
}

fn corner_right(square: Square) -> CastlingRights {
    match square {
        LIGHT_QUEENSIDE_ROOK => CASTLE_LIGHT_QUEENSIDE,
        LIGHT_KINGSIDE_ROOK => CASTLE_LIGHT_KINGSIDE,
        DARK_QUEENSIDE_ROOK => CASTLE_DARK_QUEENSIDE,
        DARK_KINGSIDE_ROOK => CASTLE_DARK_KINGSIDE,
        _ => 0,
    }
}
