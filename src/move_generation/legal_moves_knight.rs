use crate::game_state::{chess_types::*, position::Position};
use crate::move_generation::legal_move_shared::push_targets;
use crate::moves::chess_move::Move;
use crate::moves::step_attacks::knight_attacks;

pub fn generate_knight_moves(position: &Position, out: &mut Vec<Move>) {
    let side = position.side_to_move();
    let own_occ = position.occupancy(side);

    let mut knights = position.bitboard(side, PieceKind::Knight);
    while knights != 0 {
        let from = knights.trailing_zeros() as Square;
        push_targets(from, knight_attacks(from) & !own_occ, out);
        knights &= knights - 1;
    }
}
