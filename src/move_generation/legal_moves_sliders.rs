//! Bishop, rook, and queen move generation.

use crate::game_state::{chess_types::*, position::Position};
use crate::move_generation::legal_move_shared::push_targets;
use crate::moves::chess_move::Move;
use crate::moves::slider_attacks::{bishop_attacks, queen_attacks, rook_attacks};

pub fn generate_bishop_moves(position: &Position, out: &mut Vec<Move>) {
    generate_slider_moves(position, PieceKind::Bishop, bishop_attacks, out);
}

pub fn generate_rook_moves(position: &Position, out: &mut Vec<Move>) {
    generate_slider_moves(position, PieceKind::Rook, rook_attacks, out);
}

pub fn generate_queen_moves(position: &Position, out: &mut Vec<Move>) {
    generate_slider_moves(position, PieceKind::Queen, queen_attacks, out);
}

fn generate_slider_moves(
    position: &Position,
    kind: PieceKind,
    attacks: fn(Square, u64) -> u64,
    out: &mut Vec<Move>,
) {
    let side = position.side_to_move();
    let own_occ = position.occupancy(side);
    let occupancy = position.occupancy_all();

    let mut pieces = position.bitboard(side, kind);
    while pieces != 0 {
        let from = pieces.trailing_zeros() as Square;
        push_targets(from, attacks(from, occupancy) & !own_occ, out);
        pieces &= pieces - 1;
    }
}
