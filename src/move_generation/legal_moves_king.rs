use crate::game_state::chess_rules::*;
use crate::game_state::{chess_types::*, position::Position};
use crate::move_generation::legal_move_checks::is_square_attacked;
use crate::move_generation::legal_move_shared::push_targets;
use crate::moves::chess_move::Move;
use crate::moves::step_attacks::king_attacks;

struct CastlePath {
    side: CastleSide,
    king_from: Square,
    king_to: Square,
    rook_from: Square,
    /// Squares that must be empty.
    between: u64,
    /// Squares the king crosses, which must not be attacked.
    transit: [Square; 2],
}

const CASTLE_PATHS: [(Color, CastlePath); 4] = [
    (
        Color::Light,
        CastlePath {
            side: CastleSide::Kingside,
            king_from: LIGHT_KING_START,
            king_to: 6,
            rook_from: LIGHT_KINGSIDE_ROOK,
            between: (1 << 5) | (1 << 6),
            transit: [5, 6],
        },
    ),
    (
        Color::Light,
        CastlePath {
            side: CastleSide::Queenside,
            king_from: LIGHT_KING_START,
            king_to: 2,
            rook_from: LIGHT_QUEENSIDE_ROOK,
            between: (1 << 1) | (1 << 2) | (1 << 3),
            transit: [3, 2],
        },
    ),
    (
        Color::Dark,
        CastlePath {
            side: CastleSide::Kingside,
            king_from: DARK_KING_START,
            king_to: 62,
            rook_from: DARK_KINGSIDE_ROOK,
            between: (1 << 61) | (1 << 62),
            transit: [61, 62],
        },
    ),
    (
        Color::Dark,
        CastlePath {
            side: CastleSide::Queenside,
            king_from: DARK_KING_START,
            king_to: 58,
            rook_from: DARK_QUEENSIDE_ROOK,
            between: (1 << 57) | (1 << 58) | (1 << 59),
            transit: [59, 58],
        },
    ),
];

pub fn generate_king_moves(position: &Position, out: &mut Vec<Move>) {
    let side = position.side_to_move();
    let king_bb = position.bitboard(side, PieceKind::King);
    if king_bb == 0 {
        return;
    }

    let from = king_bb.trailing_zeros() as Square;
    push_targets(from, king_attacks(from) & !position.occupancy(side), out);

    generate_castling_moves(position, from, out);
}

fn generate_castling_moves(position: &Position, king_from: Square, out: &mut Vec<Move>) {
    let side = position.side_to_move();
    let enemy = side.opposite();

    // Cannot castle out of check.
    if is_square_attacked(position, king_from, enemy) {
        return;
    }

    let own_rooks = position.bitboard(side, PieceKind::Rook);
    for (color, path) in &CASTLE_PATHS {
        if *color != side
            || king_from != path.king_from
            || !position.has_castling_right(side, path.side)
            || own_rooks & (1u64 << path.rook_from) == 0
            || position.occupancy_all() & path.between != 0
        {
            continue;
        }

        if path
            .transit
            .iter()
            .any(|sq| is_square_attacked(position, *sq, enemy))
        {
            continue;
        }

        out.push(Move::new(king_from, path.king_to));
    }
}

#[cfg(test)]
mod tests {
    use super::generate_king_moves;
    use crate::game_state::position::Position;
    use crate::moves::chess_move::Move;

    fn king_moves(fen: &str) -> Vec<Move> {
        let position = Position::from_fen(fen).expect("FEN should parse");
        let mut out = Vec::new();
        generate_king_moves(&position, &mut out);
        out
    }

    #[test]
    fn both_castles_available_on_open_back_rank() {
        let moves = king_moves("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1");
        assert!(moves.contains(&Move::new(4, 6)));
        assert!(moves.contains(&Move::new(4, 2)));
    }

    #[test]
    fn castling_needs_the_rook_on_its_corner() {
        // Right is still recorded but the h1 rook is gone.
        let moves = king_moves("4k3/8/8/8/8/8/8/R3K3 w KQ - 0 1");
        assert!(!moves.contains(&Move::new(4, 6)));
        assert!(moves.contains(&Move::new(4, 2)));
    }

    #[test]
    fn castling_blocked_by_attacked_transit_square() {
        // Black rook on f8 covers f1.
        let moves = king_moves("4kr2/8/8/8/8/8/8/R3K2R w KQ - 0 1");
        assert!(!moves.contains(&Move::new(4, 6)));
        assert!(moves.contains(&Move::new(4, 2)));
    }
}
