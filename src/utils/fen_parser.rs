//! FEN-to-Position parser.
//!
//! Builds a fully-populated position from a Forsyth-Edwards Notation string,
//! including piece bitboards, rights, clocks, and occupancies. The clock
//! fields may be omitted (EPD-style), in which case they default to `0 1`.

use crate::errors::NotationError;
use crate::game_state::{chess_types::*, position::Position};
use crate::utils::algebraic::algebraic_to_square;

pub fn parse_fen(fen: &str) -> Result<Position, NotationError> {
    let err = |reason: &str| NotationError::InvalidFen {
        fen: fen.to_owned(),
        reason: reason.to_owned(),
    };

    let mut parts = fen.split_whitespace();

    let board_part = parts.next().ok_or_else(|| err("missing board layout"))?;
    let side_part = parts.next().ok_or_else(|| err("missing side to move"))?;
    let castling_part = parts.next().ok_or_else(|| err("missing castling rights"))?;
    let en_passant_part = parts.next().ok_or_else(|| err("missing en-passant square"))?;
    let halfmove_part = parts.next().unwrap_or("0");
    let fullmove_part = parts.next().unwrap_or("1");

    if parts.next().is_some() {
        return Err(err("extra trailing fields"));
    }

    let mut position = Position::empty();

    parse_board(board_part, &mut position).map_err(|reason| err(&reason))?;
    position.side_to_move = match side_part {
        "w" => Color::Light,
        "b" => Color::Dark,
        _ => return Err(err("side to move must be `w` or `b`")),
    };
    position.castling_rights = parse_castling_rights(castling_part).map_err(|reason| err(&reason))?;
    position.en_passant_square = if en_passant_part == "-" {
        None
    } else {
        Some(algebraic_to_square(en_passant_part).map_err(|_| err("invalid en-passant square"))?)
    };
    position.halfmove_clock = halfmove_part
        .parse::<u16>()
        .map_err(|_| err("invalid halfmove clock"))?;
    position.fullmove_number = fullmove_part
        .parse::<u16>()
        .ok()
        .filter(|n| *n > 0)
        .ok_or_else(|| err("invalid fullmove number"))?;

    position.recalc_occupancy();
    Ok(position)
}

fn parse_board(board_part: &str, position: &mut Position) -> Result<(), String> {
    let ranks: Vec<&str> = board_part.split('/').collect();
    if ranks.len() != 8 {
        return Err("board layout must contain 8 ranks".to_owned());
    }

    for (fen_rank_idx, rank_str) in ranks.iter().enumerate() {
        let board_rank = 7 - fen_rank_idx;
        let mut file = 0usize;

        for ch in rank_str.chars() {
            if let Some(empty_count) = ch.to_digit(10) {
                if !(1..=8).contains(&empty_count) {
                    return Err(format!("invalid empty-square count '{ch}'"));
                }
                file += empty_count as usize;
                continue;
            }

            let kind = PieceKind::from_letter(ch)
                .ok_or_else(|| format!("invalid piece character '{ch}'"))?;
            let color = if ch.is_ascii_uppercase() {
                Color::Light
            } else {
                Color::Dark
            };

            if file >= 8 {
                return Err("board rank has too many files".to_owned());
            }

            position.set_piece((board_rank * 8 + file) as Square, color, kind);
            file += 1;
        }

        if file != 8 {
            return Err("board rank does not sum to 8 files".to_owned());
        }
    }

    Ok(())
}

fn parse_castling_rights(castling_part: &str) -> Result<CastlingRights, String> {
    if castling_part == "-" {
        return Ok(0);
    }

    let mut rights: CastlingRights = 0;
    for ch in castling_part.chars() {
        rights |= match ch {
            'K' => CASTLE_LIGHT_KINGSIDE,
            'Q' => CASTLE_LIGHT_QUEENSIDE,
            'k' => CASTLE_DARK_KINGSIDE,
            'q' => CASTLE_DARK_QUEENSIDE,
            _ => return Err(format!("invalid castling rights character: {ch}")),
        };
    }

    Ok(rights)
}

#[cfg(test)]
mod tests {
    use super::parse_fen;
    use crate::game_state::chess_rules::STARTING_POSITION_FEN;
    use crate::game_state::chess_types::{Color, PieceKind};
    use crate::utils::render_position::render_position;

    #[test]
    fn parse_starting_fen_and_render_board() {
        let position = parse_fen(STARTING_POSITION_FEN).expect("starting FEN should parse");

        println!("\n{}", render_position(&position));

        assert_eq!(position.side_to_move(), Color::Light);
        assert_eq!(position.fullmove_number(), 1);
        assert_eq!(position.halfmove_clock(), 0);
        assert_eq!(position.piece_at(3), Some((Color::Light, PieceKind::Queen)));
    }

    #[test]
    fn clocks_default_when_omitted() {
        let position = parse_fen("4k3/8/8/8/8/8/8/4K3 b - -").expect("EPD-style FEN should parse");
        assert_eq!(position.side_to_move(), Color::Dark);
        assert_eq!(position.halfmove_clock(), 0);
        assert_eq!(position.fullmove_number(), 1);
    }

    #[test]
    fn rejects_malformed_fields() {
        assert!(parse_fen("8/8/8/8/8/8/8 w - - 0 1").is_err());
        assert!(parse_fen("8/8/8/8/8/8/8/8 x - - 0 1").is_err());
        assert!(parse_fen("8/8/8/8/8/8/8/8 w KX - 0 1").is_err());
        assert!(parse_fen("8/8/8/8/8/8/8/8 w - - 0 0").is_err());
        assert!(parse_fen("9/8/8/8/8/8/8/8 w - - 0 1").is_err());
    }
}
