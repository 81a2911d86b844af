//! Occupancy-aware attacks for bishops, rooks, and queens.
//!
//! Rays are traced square by square and stop on (and include) the first
//! occupied square. The full empty-board rays are also precomputed for quick
//! alignment checks.

use crate::game_state::chess_types::Square;

const DIAGONAL_STEPS: [(i32, i32); 4] = [(1, 1), (-1, 1), (1, -1), (-1, -1)];
const ORTHOGONAL_STEPS: [(i32, i32); 4] = [(0, 1), (0, -1), (1, 0), (-1, 0)];

pub const BISHOP_RAYS: [u64; 64] = build_empty_board_rays(&DIAGONAL_STEPS);
pub const ROOK_RAYS: [u64; 64] = build_empty_board_rays(&ORTHOGONAL_STEPS);

#[inline]
pub fn bishop_attacks(square: Square, occupancy: u64) -> u64 {
    DIAGONAL_STEPS
        .iter()
        .fold(0u64, |acc, &(df, dr)| acc | trace_ray(square, df, dr, occupancy))
}

#[inline]
pub fn rook_attacks(square: Square, occupancy: u64) -> u64 {
    ORTHOGONAL_STEPS
        .iter()
        .fold(0u64, |acc, &(df, dr)| acc | trace_ray(square, df, dr, occupancy))
}

#[inline]
pub fn queen_attacks(square: Square, occupancy: u64) -> u64 {
    bishop_attacks(square, occupancy) | rook_attacks(square, occupancy)
}

fn trace_ray(square: Square, file_step: i32, rank_step: i32, occupancy: u64) -> u64 {
    let mut file = (square % 8) as i32 + file_step;
    let mut rank = (square / 8) as i32 + rank_step;
    let mut attacks = 0u64;

    while (0..8).contains(&file) && (0..8).contains(&rank) {
        let bit = 1u64 << (rank * 8 + file);
        attacks |= bit;
        if occupancy & bit != 0 {
            break;
        }
        file += file_step;
        rank += rank_step;
    }

    attacks
}

const fn build_empty_board_rays(steps: &[(i32, i32); 4]) -> [u64; 64] {
    let mut table = [0u64; 64];
    let mut sq = 0usize;

    while sq < 64 {
        let mut rays = 0u64;
        let mut i = 0usize;
        while i < 4 {
            let (file_step, rank_step) = steps[i];
            let mut file = (sq % 8) as i32 + file_step;
            let mut rank = (sq / 8) as i32 + rank_step;
            while file >= 0 && file < 8 && rank >= 0 && rank < 8 {
                rays |= 1u64 << (rank * 8 + file);
                file += file_step;
                rank += rank_step;
            }
            i += 1;
        }
        table[sq] = rays;
        sq += 1;
    }

    table
}
