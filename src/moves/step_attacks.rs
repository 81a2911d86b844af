//! Precomputed attack tables for pieces that move by fixed offsets.
//!
//! Knights, kings, and pawn captures never depend on occupancy, so each is a
//! 64-entry table built at compile time from a list of (file, rank) offsets.

use crate::game_state::chess_types::{Color, Square};

const KNIGHT_OFFSETS: [(i32, i32); 8] = [
    (1, 2),
    (2, 1),
    (2, -1),
    (1, -2),
    (-1, -2),
    (-2, -1),
    (-2, 1),
    (-1, 2),
];

const KING_OFFSETS: [(i32, i32); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

const LIGHT_PAWN_CAPTURE_OFFSETS: [(i32, i32); 2] = [(-1, 1), (1, 1)];
const DARK_PAWN_CAPTURE_OFFSETS: [(i32, i32); 2] = [(-1, -1), (1, -1)];

pub const KNIGHT_ATTACKS: [u64; 64] = build_step_table(&KNIGHT_OFFSETS);
pub const KING_ATTACKS: [u64; 64] = build_step_table(&KING_OFFSETS);
pub const LIGHT_PAWN_ATTACKS: [u64; 64] = build_step_table(&LIGHT_PAWN_CAPTURE_OFFSETS);
pub const DARK_PAWN_ATTACKS: [u64; 64] = build_step_table(&DARK_PAWN_CAPTURE_OFFSETS);

#[inline]
pub const fn knight_attacks(square: Square) -> u64 {
    KNIGHT_ATTACKS[square as usize]
}

#[inline]
pub const fn king_attacks(square: Square) -> u64 {
    KING_ATTACKS[square as usize]
}

/// Squares a pawn of `color` standing on `square` attacks.
#[inline]
pub const fn pawn_attacks(color: Color, square: Square) -> u64 {
    match color {
        Color::Light => LIGHT_PAWN_ATTACKS[square as usize],
        Color::Dark => DARK_PAWN_ATTACKS[square as usize],
    }
}

const fn build_step_table(offsets: &[(i32, i32)]) -> [u64; 64] {
    let mut table = [0u64; 64];
    let mut sq = 0usize;

    while sq < 64 {
        let file = (sq % 8) as i32;
        let rank = (sq / 8) as i32;
        let mut attacks = 0u64;
        let mut i = 0usize;

        while i < offsets.len() {
            let (df, dr) = offsets[i];
            attacks |= bit_if_on_board(file + df, rank + dr);
            i += 1;
        }

        table[sq] = attacks;
        sq += 1;
    }

    table
}

const fn bit_if_on_board(file: i32, rank: i32) -> u64 {
    if file < 0 || file > 7 || rank < 0 || rank > 7 {
        0
    } else {
        1u64 << (rank * 8 + file)
    }
}

#[cfg(test)]
mod tests {
    use super::{king_attacks, knight_attacks, pawn_attacks};
    use crate::game_state::chess_types::Color;

    #[test]
    fn knight_on_d4_has_eight_targets_and_on_a1_two() {
        assert_eq!(knight_attacks(27).count_ones(), 8);
        assert_eq!(knight_attacks(0), (1u64 << 10) | (1u64 << 17));
    }

    #[test]
    fn king_in_corner_has_three_targets() {
        assert_eq!(king_attacks(0).count_ones(), 3);
        assert_eq!(king_attacks(63).count_ones(), 3);
        assert_eq!(king_attacks(27).count_ones(), 8);
    }

    #[test]
    fn pawn_captures_point_toward_the_enemy() {
        let e2 = 12;
        assert_eq!(pawn_attacks(Color::Light, e2), (1u64 << 19) | (1u64 << 21));
        let e7 = 52;
        assert_eq!(pawn_attacks(Color::Dark, e7), (1u64 << 43) | (1u64 << 45));
        // Edge files only attack inward.
        assert_eq!(pawn_attacks(Color::Light, 8), 1u64 << 17);
    }
}
