//! Full legal move generation pipeline.
//!
//! Runs the piece-wise pseudo-legal generators in a fixed order, plays each
//! candidate on a copy of the board, and drops the ones that leave the
//! mover's king attacked. The resulting order is pawns, knights, bishops,
//! rooks, queens, king, each by ascending origin square, which makes the
//! enumeration a pure function of the position.

use crate::errors::OracleError;
use crate::game_state::chess_rules::SEVENTY_FIVE_MOVE_HALFMOVES;
use crate::game_state::{chess_types::*, position::Position};
use crate::move_generation::legal_move_apply::apply_move;
use crate::move_generation::legal_move_checks::is_king_in_check;
use crate::move_generation::legal_move_shared::illegal;
use crate::move_generation::legal_moves_king::generate_king_moves;
use crate::move_generation::legal_moves_knight::generate_knight_moves;
use crate::move_generation::legal_moves_pawn::generate_pawn_moves;
use crate::move_generation::legal_moves_sliders::{
    generate_bishop_moves, generate_queen_moves, generate_rook_moves,
};
use crate::move_generation::rules_oracle::{OracleResult, RulesOracle, TerminalState};
use crate::moves::chess_move::Move;

const LIGHT_SQUARES: u64 = 0x55AA_55AA_55AA_55AA;

#[derive(Debug, Clone, Copy, Default)]
pub struct LegalMoveGenerator;

impl LegalMoveGenerator {
    pub fn pseudo_legal_moves(&self, position: &Position) -> Vec<Move> {
        let mut pseudo = Vec::<Move>::with_capacity(64);

        generate_pawn_moves(position, &mut pseudo);
        generate_knight_moves(position, &mut pseudo);
        generate_bishop_moves(position, &mut pseudo);
        generate_rook_moves(position, &mut pseudo);
        generate_queen_moves(position, &mut pseudo);
        generate_king_moves(position, &mut pseudo);

        pseudo
    }

    /// Legal moves together with the position each one leads to.
    pub fn legal_moves_with_successors(
        &self,
        position: &Position,
    ) -> OracleResult<Vec<(Move, Position)>> {
        validate_kings(position)?;

        let mover = position.side_to_move();
        let mut legal = Vec::new();
        for mv in self.pseudo_legal_moves(position) {
            let next = apply_move(position, &mv)?;

            // Illegal if own king is in check after move.
            if is_king_in_check(&next, mover) {
                continue;
            }
            legal.push((mv, next));
        }

        Ok(legal)
    }
}

impl RulesOracle for LegalMoveGenerator {
    fn legal_moves(&self, position: &Position) -> OracleResult<Vec<Move>> {
        Ok(self
            .legal_moves_with_successors(position)?
            .into_iter()
            .map(|(mv, _)| mv)
            .collect())
    }

    fn apply(&self, position: &Position, mv: &Move) -> OracleResult<Position> {
        self.legal_moves_with_successors(position)?
            .into_iter()
            .find(|(candidate, _)| candidate == mv)
            .map(|(_, next)| next)
            .ok_or_else(|| illegal(position, mv))
    }

    fn terminal_state(&self, position: &Position) -> OracleResult<Option<TerminalState>> {
        if self.legal_moves_with_successors(position)?.is_empty() {
            return Ok(Some(if self.in_check(position)? {
                TerminalState::Checkmate
            } else {
                TerminalState::Stalemate
            }));
        }
        if position.halfmove_clock() >= SEVENTY_FIVE_MOVE_HALFMOVES {
            return Ok(Some(TerminalState::SeventyFiveMoveRule));
        }
        if has_insufficient_material(position) {
            return Ok(Some(TerminalState::InsufficientMaterial));
        }
        Ok(None)
    }

    fn in_check(&self, position: &Position) -> OracleResult<bool> {
        validate_kings(position)?;
        Ok(is_king_in_check(position, position.side_to_move()))
    }
}

fn validate_kings(position: &Position) -> OracleResult<()> {
    for color in Color::ALL {
        let kings = position.bitboard(color, PieceKind::King).count_ones();
        if kings != 1 {
            return Err(OracleError::InvalidPosition {
                fen: position.to_fen(),
                reason: format!("{} has {kings} kings", color.name()),
            });
        }
    }
    Ok(())
}

/// Neither side can ever mate: bare kings, a single minor piece, or only
/// bishops that all stand on one square color.
fn has_insufficient_material(position: &Position) -> bool {
    let both = |kind| position.bitboard(Color::Light, kind) | position.bitboard(Color::Dark, kind);

    if both(PieceKind::Pawn) | both(PieceKind::Rook) | both(PieceKind::Queen) != 0 {
        return false;
    }

    let knights = both(PieceKind::Knight);
    let bishops = both(PieceKind::Bishop);
    if (knights | bishops).count_ones() <= 1 {
        return true;
    }

    knights == 0 && (bishops & LIGHT_SQUARES == 0 || bishops & !LIGHT_SQUARES == 0)
}

#[cfg(test)]
mod tests {
    use super::LegalMoveGenerator;
    use crate::errors::OracleError;
    use crate::game_state::position::Position;
    use crate::move_generation::rules_oracle::{RulesOracle, TerminalState};
    use crate::moves::chess_move::Move;

    fn fen(text: &str) -> Position {
        Position::from_fen(text).expect("FEN should parse")
    }

    #[test]
    fn start_position_has_twenty_moves_in_stable_order() {
        let start = Position::starting();
        let first = LegalMoveGenerator.legal_moves(&start).expect("moves should generate");
        let second = LegalMoveGenerator.legal_moves(&start).expect("moves should generate");
        assert_eq!(first.len(), 20);
        assert_eq!(first, second);
        assert_eq!(first[0], Move::new(8, 16));
    }

    #[test]
    fn pinned_piece_cannot_leave_the_line() {
        // White knight on e2 is pinned by the e8 rook.
        let position = fen("4r2k/8/8/8/8/8/4N3/4K3 w - - 0 1");
        let moves = LegalMoveGenerator.legal_moves(&position).expect("moves should generate");
        assert!(moves.iter().all(|mv| mv.from != 12));
    }

    #[test]
    fn apply_rejects_moves_that_expose_the_king() {
        let position = fen("4r2k/8/8/8/8/8/4N3/4K3 w - - 0 1");
        let err = LegalMoveGenerator
            .apply(&position, &Move::new(12, 29))
            .expect_err("pinned knight move must be illegal");
        assert!(matches!(err, OracleError::IllegalMove { .. }));
    }

    #[test]
    fn detects_checkmate_and_stalemate() {
        let mate = fen("rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3");
        assert_eq!(
            LegalMoveGenerator.terminal_state(&mate).expect("should evaluate"),
            Some(TerminalState::Checkmate)
        );
        assert!(LegalMoveGenerator.in_check(&mate).expect("should evaluate"));

        let stalemate = fen("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1");
        assert_eq!(
            LegalMoveGenerator.terminal_state(&stalemate).expect("should evaluate"),
            Some(TerminalState::Stalemate)
        );
    }

    #[test]
    fn detects_draw_conditions() {
        let seventy_five = fen("4k3/8/8/8/8/8/4P3/4K3 w - - 150 120");
        assert_eq!(
            LegalMoveGenerator.terminal_state(&seventy_five).expect("should evaluate"),
            Some(TerminalState::SeventyFiveMoveRule)
        );

        let lone_knight = fen("4k3/8/8/8/8/8/8/4KN2 w - - 0 1");
        assert_eq!(
            LegalMoveGenerator.terminal_state(&lone_knight).expect("should evaluate"),
            Some(TerminalState::InsufficientMaterial)
        );

        let same_color_bishops = fen("4kb2/8/8/8/8/8/8/2B1K3 w - - 0 1");
        assert_eq!(
            LegalMoveGenerator.terminal_state(&same_color_bishops).expect("should evaluate"),
            Some(TerminalState::InsufficientMaterial)
        );

        // Bishops on f1 and f8 stand on opposite colors, so mate is possible.
        let opposite_bishops = fen("4kb2/8/8/8/8/8/8/4KB2 w - - 0 1");
        assert!(!LegalMoveGenerator.is_terminal(&opposite_bishops).expect("should evaluate"));
        let start = Position::starting();
        assert!(!LegalMoveGenerator.is_terminal(&start).expect("should evaluate"));
    }

    #[test]
    fn positions_without_both_kings_are_invalid() {
        let err = LegalMoveGenerator
            .legal_moves(&fen("8/8/8/8/8/8/8/4K3 w - - 0 1"))
            .expect_err("missing black king");
        assert!(matches!(err, OracleError::InvalidPosition { .. }));
    }
}
