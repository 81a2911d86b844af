//! FEN output for `Position`.

use std::fmt::Write as _;

use crate::game_state::{chess_types::*, position::Position};
use crate::utils::algebraic::square_to_algebraic;

const CASTLING_LETTERS: [(CastlingRights, char); 4] = [
    (CASTLE_LIGHT_KINGSIDE, 'K'),
    (CASTLE_LIGHT_QUEENSIDE, 'Q'),
    (CASTLE_DARK_KINGSIDE, 'k'),
    (CASTLE_DARK_QUEENSIDE, 'q'),
];

pub fn generate_fen(position: &Position) -> String {
    let mut fen = String::with_capacity(90);
    write_placement(&mut fen, position);

    fen.push(' ');
    fen.push(match position.side_to_move() {
        Color::Light => 'w',
        Color::Dark => 'b',
    });

    fen.push(' ');
    let rights = position.castling_rights();
    let before = fen.len();
    fen.extend(
        CASTLING_LETTERS
            .iter()
            .filter(|(flag, _)| rights & flag != 0)
            .map(|&(_, letter)| letter),
    );
    if fen.len() == before {
        fen.push('-');
    }

    fen.push(' ');
    match position.en_passant_square() {
        Some(square) => fen.push_str(&square_to_algebraic(square)),
        None => fen.push('-'),
    }

    let _ = write!(
        fen,
        " {} {}",
        position.halfmove_clock(),
        position.fullmove_number()
    );
    fen
}

/// Ranks 8 down to 1, runs of empty squares as digits.
fn write_placement(fen: &mut String, position: &Position) {
    for rank in (0..8u8).rev() {
        let mut gap = 0u8;
        for square in rank * 8..rank * 8 + 8 {
            let Some((color, kind)) = position.piece_at(square) else {
                gap += 1;
                continue;
            };
            if gap > 0 {
                fen.push(char::from(b'0' + gap));
                gap = 0;
            }
            fen.push(match color {
                Color::Light => kind.letter().to_ascii_uppercase(),
                Color::Dark => kind.letter(),
            });
        }
        if gap > 0 {
            fen.push(char::from(b'0' + gap));
        }
        if rank > 0 {
            fen.push('/');
        }
    }
}
