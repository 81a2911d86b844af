use crate::game_state::{chess_types::*, position::Position};
use crate::moves::slider_attacks::{bishop_attacks, rook_attacks};
use crate::moves::step_attacks::{king_attacks, knight_attacks, pawn_attacks};

#[inline]
pub fn king_square(position: &Position, color: Color) -> Option<Square> {
    let kings = position.bitboard(color, PieceKind::King);
    if kings == 0 {
        None
    } else {
        Some(kings.trailing_zeros() as Square)
    }
}

#[inline]
pub fn is_king_in_check(position: &Position, color: Color) -> bool {
    let Some(king_sq) = king_square(position, color) else {
        return false;
    };
    is_square_attacked(position, king_sq, color.opposite())
}

/// True when any piece of `attacker` attacks `square` on the current board.
///
/// Looks outward from the target square: a pawn of the defending color on
/// `square` would attack exactly the squares an attacking pawn must stand on.
pub fn is_square_attacked(position: &Position, square: Square, attacker: Color) -> bool {
    let occupancy = position.occupancy_all();
    let theirs = |kind| position.bitboard(attacker, kind);

    if pawn_attacks(attacker.opposite(), square) & theirs(PieceKind::Pawn) != 0 {
        return true;
    }
    if knight_attacks(square) & theirs(PieceKind::Knight) != 0 {
        return true;
    }
    if king_attacks(square) & theirs(PieceKind::King) != 0 {
        return true;
    }

    let queens = theirs(PieceKind::Queen);
    if bishop_attacks(square, occupancy) & (theirs(PieceKind::Bishop) | queens) != 0 {
        return true;
    }
    rook_attacks(square, occupancy) & (theirs(PieceKind::Rook) | queens) != 0
}

#[cfg(test)]
mod tests {
    use super::{is_king_in_check, is_square_attacked, king_square};
    use crate::game_state::chess_types::Color;
    use crate::game_state::position::Position;

    #[test]
    fn start_position_has_no_checks() {
        let start = Position::starting();
        assert_eq!(king_square(&start, Color::Light), Some(4));
        assert!(!is_king_in_check(&start, Color::Light));
        assert!(!is_king_in_check(&start, Color::Dark));
        // f3 is covered by the g2 pawn and the g1 knight.
        assert!(is_square_attacked(&start, 21, Color::Light));
        assert!(!is_square_attacked(&start, 28, Color::Light));
    }

    #[test]
    fn sliders_and_pawns_give_check() {
        let rook = Position::from_fen("4k3/8/8/8/8/8/8/4RK2 b - - 0 1").expect("FEN should parse");
        assert!(is_king_in_check(&rook, Color::Dark));

        let blocked = Position::from_fen("4k3/4p3/8/8/8/8/8/4RK2 b - - 0 1").expect("FEN should parse");
        assert!(!is_king_in_check(&blocked, Color::Dark));

        let pawn = Position::from_fen("4k3/3P4/8/8/8/8/8/5K2 b - - 0 1").expect("FEN should parse");
        assert!(is_king_in_check(&pawn, Color::Dark));
    }
}
