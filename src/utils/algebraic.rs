//! Square conversions for algebraic coordinates.
//!
//! Converts between human-readable coordinates (e.g., `e4`) and internal
//! square indices. Reused by FEN, coordinate-move, SAN, and fact-term codecs.

use crate::errors::NotationError;
use crate::game_state::chess_types::Square;

/// Convert algebraic notation (for example: "e4") to a square index.
#[inline]
pub fn algebraic_to_square(square: &str) -> Result<Square, NotationError> {
    let bytes = square.as_bytes();
    if bytes.len() != 2 {
        return Err(invalid(square));
    }

    let file = bytes[0];
    let rank = bytes[1];

    if !(b'a'..=b'h').contains(&file) || !(b'1'..=b'8').contains(&rank) {
        return Err(invalid(square));
    }

    Ok((rank - b'1') * 8 + (file - b'a'))
}

/// Convert a square index (`0..=63`) to algebraic notation (for example: "e4").
///
/// Indices above 63 are a caller bug; they are masked into range rather than
/// panicking.
#[inline]
pub fn square_to_algebraic(square: Square) -> String {
    let square = square & 63;
    let file_char = char::from(b'a' + square % 8);
    let rank_char = char::from(b'1' + square / 8);
    format!("{file_char}{rank_char}")
}

fn invalid(text: &str) -> NotationError {
    NotationError::InvalidSquare {
        text: text.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::{algebraic_to_square, square_to_algebraic};

    #[test]
    fn round_trip_square_conversions() {
        assert_eq!(algebraic_to_square("a1").expect("a1 should parse"), 0);
        assert_eq!(algebraic_to_square("h8").expect("h8 should parse"), 63);
        assert_eq!(algebraic_to_square("e4").expect("e4 should parse"), 28);
        assert_eq!(square_to_algebraic(0), "a1");
        assert_eq!(square_to_algebraic(63), "h8");
        for sq in 0..64u8 {
            assert_eq!(algebraic_to_square(&square_to_algebraic(sq)).expect("should parse"), sq);
        }
    }

    #[test]
    fn rejects_off_board_names() {
        assert!(algebraic_to_square("i1").is_err());
        assert!(algebraic_to_square("a9").is_err());
        assert!(algebraic_to_square("a").is_err());
        assert!(algebraic_to_square("a10").is_err());
    }
}
