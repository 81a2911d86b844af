//! Primitive chess vocabulary shared by the rules oracle and the fact codec.
//!
//! Colors and piece kinds carry both a dense index (for bitboard tables) and
//! the canonical lowercase name used by the logic-term representation.

pub use crate::game_state::position::Position;

/// Side to move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Color {
    Light,
    Dark,
}

impl Color {
    pub const ALL: [Color; 2] = [Color::Light, Color::Dark];

    #[inline]
    pub const fn index(self) -> usize {
        match self {
            Color::Light => 0,
            Color::Dark => 1,
        }
    }

    #[inline]
    pub const fn opposite(self) -> Self {
        match self {
            Color::Light => Color::Dark,
            Color::Dark => Color::Light,
        }
    }

    /// Name used in fact terms (`white` / `black`).
    pub const fn name(self) -> &'static str {
        match self {
            Color::Light => "white",
            Color::Dark => "black",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "white" => Some(Color::Light),
            "black" => Some(Color::Dark),
            _ => None,
        }
    }
}

/// Piece kind (color is represented separately for cache-friendly layouts).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PieceKind {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

impl PieceKind {
    pub const ALL: [PieceKind; 6] = [
        PieceKind::Pawn,
        PieceKind::Knight,
        PieceKind::Bishop,
        PieceKind::Rook,
        PieceKind::Queen,
        PieceKind::King,
    ];

    pub const PROMOTIONS: [PieceKind; 4] = [
        PieceKind::Knight,
        PieceKind::Bishop,
        PieceKind::Rook,
        PieceKind::Queen,
    ];

    #[inline]
    pub const fn index(self) -> usize {
        match self {
            PieceKind::Pawn => 0,
            PieceKind::Knight => 1,
            PieceKind::Bishop => 2,
            PieceKind::Rook => 3,
            PieceKind::Queen => 4,
            PieceKind::King => 5,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            PieceKind::Pawn => "pawn",
            PieceKind::Knight => "knight",
            PieceKind::Bishop => "bishop",
            PieceKind::Rook => "rook",
            PieceKind::Queen => "queen",
            PieceKind::King => "king",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        PieceKind::ALL.into_iter().find(|kind| kind.name() == name)
    }

    /// Lowercase FEN / UCI letter.
    pub const fn letter(self) -> char {
        match self {
            PieceKind::Pawn => 'p',
            PieceKind::Knight => 'n',
            PieceKind::Bishop => 'b',
            PieceKind::Rook => 'r',
            PieceKind::Queen => 'q',
            PieceKind::King => 'k',
        }
    }

    pub fn from_letter(letter: char) -> Option<Self> {
        let lower = letter.to_ascii_lowercase();
        PieceKind::ALL.into_iter().find(|kind| kind.letter() == lower)
    }

    #[inline]
    pub const fn is_promotion_target(self) -> bool {
        matches!(
            self,
            PieceKind::Knight | PieceKind::Bishop | PieceKind::Rook | PieceKind::Queen
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CastleSide {
    Kingside,
    Queenside,
}

pub const CASTLE_LIGHT_KINGSIDE: CastlingRights = 1 << 0;
pub const CASTLE_LIGHT_QUEENSIDE: CastlingRights = 1 << 1;
pub const CASTLE_DARK_KINGSIDE: CastlingRights = 1 << 2;
pub const CASTLE_DARK_QUEENSIDE: CastlingRights = 1 << 3;

/// Compact castling rights bitmask.
pub type CastlingRights = u8;

#[inline]
pub const fn castle_flag(color: Color, side: CastleSide) -> CastlingRights {
    match (color, side) {
        (Color::Light, CastleSide::Kingside) => CASTLE_LIGHT_KINGSIDE,
        (Color::Light, CastleSide::Queenside) => CASTLE_LIGHT_QUEENSIDE,
        (Color::Dark, CastleSide::Kingside) => CASTLE_DARK_KINGSIDE,
        (Color::Dark, CastleSide::Queenside) => CASTLE_DARK_QUEENSIDE,
    }
}

/// Board square index (`0..=63`, `0 == a1`, `63 == h8`).
pub type Square = u8;

#[inline]
pub const fn square_file(square: Square) -> u8 {
    square % 8
}

#[inline]
pub const fn square_rank(square: Square) -> u8 {
    square / 8
}

#[cfg(test)]
mod tests {
    use super::{castle_flag, CastleSide, Color, PieceKind, CASTLE_DARK_QUEENSIDE};

    #[test]
    fn names_round_trip() {
        for kind in PieceKind::ALL {
            assert_eq!(PieceKind::from_name(kind.name()), Some(kind));
            assert_eq!(PieceKind::from_letter(kind.letter()), Some(kind));
        }
        assert_eq!(Color::from_name("white"), Some(Color::Light));
        assert_eq!(Color::from_name("black"), Some(Color::Dark));
        assert_eq!(Color::from_name("red"), None);
    }

    #[test]
    fn only_minor_and_major_pieces_are_promotion_targets() {
        assert!(!PieceKind::Pawn.is_promotion_target());
        assert!(!PieceKind::King.is_promotion_target());
        assert!(PieceKind::Knight.is_promotion_target());
        assert_eq!(castle_flag(Color::Dark, CastleSide::Queenside), CASTLE_DARK_QUEENSIDE);
    }
}
