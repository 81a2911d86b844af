//! Immutable chess position value.
//!
//! `Position` is the unit exchanged between the rules oracle, the fact codec,
//! and the enumeration bridge. It stores piece bitboards with occupancy caches,
//! side to move, castling rights, the en-passant target, and both clocks.
//! Equality is structural, so two positions are equal exactly when every one of
//! those components matches.

use std::fmt;

use crate::errors::NotationError;
use crate::game_state::chess_types::*;
use crate::utils::fen_generator::generate_fen;
use crate::utils::fen_parser::parse_fen;

const BACK_RANK: [PieceKind; 8] = [
    PieceKind::Rook,
    PieceKind::Knight,
    PieceKind::Bishop,
    PieceKind::Queen,
    PieceKind::King,
    PieceKind::Bishop,
    PieceKind::Knight,
    PieceKind::Rook,
];

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Position {
    // [color][piece_kind]
    pub(crate) pieces: [[u64; 6]; 2],

    // Occupancy caches, always derived from `pieces`.
    pub(crate) occupancy_by_color: [u64; 2],
    pub(crate) occupancy_all: u64,

    pub(crate) side_to_move: Color,
    pub(crate) castling_rights: CastlingRights,
    pub(crate) en_passant_square: Option<Square>,

    pub(crate) halfmove_clock: u16,
    pub(crate) fullmove_number: u16,
}

impl Default for Position {
    fn default() -> Self {
        Self {
            pieces: [[0; 6]; 2],
            occupancy_by_color: [0; 2],
            occupancy_all: 0,
            side_to_move: Color::Light,
            castling_rights: 0,
            en_passant_square: None,
            halfmove_clock: 0,
            fullmove_number: 1,
        }
    }
}

impl Position {
    /// Empty board, white to move, no rights, clocks at their defaults.
    #[inline]
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn starting() -> Self {
        let mut position = Self::empty();
        for (file, kind) in BACK_RANK.into_iter().enumerate() {
            let file = file as Square;
            position.set_piece(file, Color::Light, kind);
            position.set_piece(8 + file, Color::Light, PieceKind::Pawn);
            position.set_piece(48 + file, Color::Dark, PieceKind::Pawn);
            position.set_piece(56 + file, Color::Dark, kind);
        }
        position.castling_rights = CASTLE_LIGHT_KINGSIDE
            | CASTLE_LIGHT_QUEENSIDE
            | CASTLE_DARK_KINGSIDE
            | CASTLE_DARK_QUEENSIDE;
        position.recalc_occupancy();
        position
    }

    #[inline]
    pub fn from_fen(fen: &str) -> Result<Self, NotationError> {
        parse_fen(fen)
    }

    #[inline]
    pub fn to_fen(&self) -> String {
        generate_fen(self)
    }

    #[inline]
    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    #[inline]
    pub fn castling_rights(&self) -> CastlingRights {
        self.castling_rights
    }

    #[inline]
    pub fn has_castling_right(&self, color: Color, side: CastleSide) -> bool {
        self.castling_rights & castle_flag(color, side) != 0
    }

    #[inline]
    pub fn en_passant_square(&self) -> Option<Square> {
        self.en_passant_square
    }

    #[inline]
    pub fn halfmove_clock(&self) -> u16 {
        self.halfmove_clock
    }

    #[inline]
    pub fn fullmove_number(&self) -> u16 {
        self.fullmove_number
    }

    #[inline]
    pub fn bitboard(&self, color: Color, kind: PieceKind) -> u64 {
        self.pieces[color.index()][kind.index()]
    }

    #[inline]
    pub fn occupancy(&self, color: Color) -> u64 {
        self.occupancy_by_color[color.index()]
    }

    #[inline]
    pub fn occupancy_all(&self) -> u64 {
        self.occupancy_all
    }

    pub fn piece_at(&self, square: Square) -> Option<(Color, PieceKind)> {
        let mask = 1u64 << square;
        if self.occupancy_all & mask == 0 {
            return None;
        }
        for color in Color::ALL {
            for kind in PieceKind::ALL {
                if self.pieces[color.index()][kind.index()] & mask != 0 {
                    return Some((color, kind));
                }
            }
        }
        None
    }

    /// Occupied squares in ascending index order (a1, b1, ..., h8).
    pub fn occupied_squares(&self) -> impl Iterator<Item = (Square, Color, PieceKind)> + '_ {
        (0..64u8).filter_map(move |square| {
            self.piece_at(square)
                .map(|(color, kind)| (square, color, kind))
        })
    }

    pub fn piece_count(&self) -> u32 {
        self.occupancy_all.count_ones()
    }

    /// Places a piece without touching the occupancy caches; callers finish
    /// with `recalc_occupancy`.
    #[inline]
    pub(crate) fn set_piece(&mut self, square: Square, color: Color, kind: PieceKind) {
        self.pieces[color.index()][kind.index()] |= 1u64 << square;
    }

    pub(crate) fn recalc_occupancy(&mut self) {
        for color in Color::ALL {
            self.occupancy_by_color[color.index()] = self.pieces[color.index()]
                .iter()
                .copied()
                .fold(0u64, |acc, bb| acc | bb);
        }
        self.occupancy_all = self.occupancy_by_color[Color::Light.index()]
            | self.occupancy_by_color[Color::Dark.index()];
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_fen())
    }
}
