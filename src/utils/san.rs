//! Standard algebraic notation (SAN) resolution.
//!
//! SAN only makes sense against a position: `Nbd7` names whichever legal
//! knight move lands on d7 from the b-file. Resolution filters the legal move
//! list and demands exactly one survivor.

use crate::errors::NotationError;
use crate::game_state::chess_types::*;
use crate::game_state::position::Position;
use crate::moves::chess_move::Move;
use crate::utils::algebraic::algebraic_to_square;

#[derive(Debug, Default)]
struct SanPattern {
    piece: Option<PieceKind>,
    from_file: Option<u8>,
    from_rank: Option<u8>,
    to: Square,
    promotion: Option<PieceKind>,
}

pub fn resolve_san(san: &str, position: &Position, legal: &[Move]) -> Result<Move, NotationError> {
    let err = |reason: &str| NotationError::InvalidMove {
        text: san.to_owned(),
        reason: reason.to_owned(),
    };

    let text = san.trim_end_matches(['+', '#', '!', '?']);
    if !text.is_ascii() || text.is_empty() {
        return Err(err("empty or non-ASCII move"));
    }

    if let Some(side) = castle_side(text) {
        let king_from = king_start(position.side_to_move());
        let king_to = match side {
            CastleSide::Kingside => king_from + 2,
            CastleSide::Queenside => king_from - 2,
        };
        let castle = Move::new(king_from, king_to);
        let is_king = position.piece_at(king_from).map(|(_, kind)| kind) == Some(PieceKind::King);
        return if is_king && legal.contains(&castle) {
            Ok(castle)
        } else {
            Err(err("castling is not legal here"))
        };
    }

    let pattern = parse_pattern(text).ok_or_else(|| err("unrecognised SAN shape"))?;
    let moving = pattern.piece.unwrap_or(PieceKind::Pawn);

    let mut matches = legal.iter().filter(|mv| {
        mv.to == pattern.to
            && mv.promotion == pattern.promotion
            && position.piece_at(mv.from).map(|(_, kind)| kind) == Some(moving)
            && pattern.from_file.map_or(true, |f| square_file(mv.from) == f)
            && pattern.from_rank.map_or(true, |r| square_rank(mv.from) == r)
    });

    match (matches.next(), matches.next()) {
        (Some(mv), None) => Ok(*mv),
        (None, _) => Err(err("no legal move matches")),
        (Some(_), Some(_)) => Err(err("ambiguous move")),
    }
}

fn castle_side(text: &str) -> Option<CastleSide> {
    match text {
        "O-O" | "0-0" => Some(CastleSide::Kingside),
        "O-O-O" | "0-0-0" => Some(CastleSide::Queenside),
        _ => None,
    }
}

fn king_start(color: Color) -> Square {
    match color {
        Color::Light => crate::game_state::chess_rules::LIGHT_KING_START,
        Color::Dark => crate::game_state::chess_rules::DARK_KING_START,
    }
}

fn parse_pattern(text: &str) -> Option<SanPattern> {
    let mut body = text;
    let mut pattern = SanPattern::default();

    // Promotion suffix: `e8=Q` or the older `e8Q`.
    if let Some((head, promo)) = body.split_once('=') {
        pattern.promotion = Some(promotion_piece(promo)?);
        body = head;
    } else if let Some(last) = body.chars().last().filter(|c| c.is_ascii_uppercase()) {
        if body.len() > 2 {
            pattern.promotion = Some(promotion_piece(&last.to_string())?);
            body = &body[..body.len() - 1];
        }
    }

    if body.len() < 2 {
        return None;
    }
    let (prefix, dest) = body.split_at(body.len() - 2);
    pattern.to = algebraic_to_square(dest).ok()?;

    let mut chars = prefix.chars().peekable();
    if let Some(first) = chars.peek().copied().filter(|c| c.is_ascii_uppercase()) {
        let piece = PieceKind::from_letter(first).filter(|kind| *kind != PieceKind::Pawn)?;
        pattern.piece = Some(piece);
        chars.next();
    }

    for ch in chars {
        match ch {
            'a'..='h' if pattern.from_file.is_none() => pattern.from_file = Some(ch as u8 - b'a'),
            '1'..='8' if pattern.from_rank.is_none() => pattern.from_rank = Some(ch as u8 - b'1'),
            'x' => {}
            _ => return None,
        }
    }

    Some(pattern)
}

fn promotion_piece(text: &str) -> Option<PieceKind> {
    let mut chars = text.chars();
    let piece = chars
        .next()
        .and_then(PieceKind::from_letter)
        .filter(|kind| kind.is_promotion_target())?;
    chars.next().is_none().then_some(piece)
}
