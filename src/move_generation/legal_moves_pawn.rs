use crate::game_state::{chess_types::*, position::Position};
use crate::moves::chess_move::Move;
use crate::moves::step_attacks::pawn_attacks;

pub fn generate_pawn_moves(position: &Position, out: &mut Vec<Move>) {
    let side = position.side_to_move();
    let enemy_occ = position.occupancy(side.opposite());
    let empty = !position.occupancy_all();
    let (start_rank, last_rank, ep_rank) = match side {
        Color::Light => (1, 7, 5),
        Color::Dark => (6, 0, 2),
    };
    // An en-passant target on the wrong rank cannot be captured into.
    let ep_mask = position
        .en_passant_square()
        .filter(|sq| square_rank(*sq) == ep_rank)
        .map_or(0, |sq| 1u64 << sq);
    let forward = |sq: Square| match side {
        Color::Light => sq.checked_add(8).filter(|to| *to < 64),
        Color::Dark => sq.checked_sub(8),
    };

    let mut pawns = position.bitboard(side, PieceKind::Pawn);
    while pawns != 0 {
        let from = pawns.trailing_zeros() as Square;
        pawns &= pawns - 1;

        if let Some(one) = forward(from).filter(|to| empty & (1u64 << to) != 0) {
            push_pawn_move(from, one, last_rank, out);

            if square_rank(from) == start_rank {
                if let Some(two) = forward(one).filter(|to| empty & (1u64 << to) != 0) {
                    out.push(Move::new(from, two));
                }
            }
        }

        let mut captures = pawn_attacks(side, from) & (enemy_occ | ep_mask);
        while captures != 0 {
            let to = captures.trailing_zeros() as Square;
            push_pawn_move(from, to, last_rank, out);
            captures &= captures - 1;
        }
    }
}

fn push_pawn_move(from: Square, to: Square, last_rank: u8, out: &mut Vec<Move>) {
    if square_rank(to) == last_rank {
        for piece in PieceKind::PROMOTIONS {
            out.push(Move::promoting(from, to, piece));
        }
    } else {
        out.push(Move::new(from, to));
    }
}
