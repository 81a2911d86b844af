//! Position <-> fact list.
//!
//! Encoding emits facts in a canonical order: occupied squares a1..h8, the
//! side to move, the castling rights (white kingside, white queenside, black
//! kingside, black queenside), the two clocks, and finally the en-passant
//! square when there is one. Decoding accepts any order and fills in the
//! defaults for missing kinds: white to move, no castling, no en passant,
//! halfmove clock 0, fullmove 1.
//!
//! Repeating a fact is harmless. Two facts that disagree (two turns, two
//! pieces on one square) are rejected so the result never depends on order.

use crate::errors::FactError;
use crate::facts::fact::{facts_from_term, facts_to_term, Fact, UnknownFactPolicy};
use crate::game_state::chess_types::*;
use crate::game_state::position::Position;
use crate::logic::term::Term;

pub fn encode_position(position: &Position) -> Vec<Fact> {
    let mut facts = Vec::with_capacity(position.piece_count() as usize + 8);

    facts.extend(
        position
            .occupied_squares()
            .map(|(square, color, piece)| Fact::Contents {
                piece,
                color,
                square,
            }),
    );

    facts.push(Fact::Turn(position.side_to_move()));

    for color in Color::ALL {
        if position.has_castling_right(color, CastleSide::Kingside) {
            facts.push(Fact::KingsideCastle(color));
        }
        if position.has_castling_right(color, CastleSide::Queenside) {
            facts.push(Fact::QueensideCastle(color));
        }
    }

    facts.push(Fact::HalfmoveClock(position.halfmove_clock()));
    facts.push(Fact::Fullmove(position.fullmove_number()));

    if let Some(square) = position.en_passant_square() {
        facts.push(Fact::EnPassant(square));
    }

    facts
}

pub fn decode_position(facts: &[Fact]) -> Result<Position, FactError> {
    let mut board: [Option<(Fact, Color, PieceKind)>; 64] = [None; 64];
    let mut turn: Option<Fact> = None;
    let mut halfmove: Option<Fact> = None;
    let mut fullmove: Option<Fact> = None;
    let mut en_passant: Option<Fact> = None;
    let mut castling: CastlingRights = 0;

    for fact in facts {
        match *fact {
            Fact::Contents {
                piece,
                color,
                square,
            } => {
                if let Some((existing, _, _)) = &board[square as usize] {
                    ensure_same(existing, fact)?;
                } else {
                    board[square as usize] = Some((*fact, color, piece));
                }
            }
            Fact::Turn(_) => set_once(&mut turn, fact)?,
            Fact::HalfmoveClock(_) => set_once(&mut halfmove, fact)?,
            Fact::Fullmove(_) => set_once(&mut fullmove, fact)?,
            Fact::EnPassant(_) => set_once(&mut en_passant, fact)?,
            Fact::KingsideCastle(color) => castling |= castle_flag(color, CastleSide::Kingside),
            Fact::QueensideCastle(color) => castling |= castle_flag(color, CastleSide::Queenside),
        }
    }

    let mut position = Position::empty();
    for (square, slot) in board.iter().enumerate() {
        if let Some((_, color, piece)) = slot {
            position.set_piece(square as Square, *color, *piece);
        }
    }

    if let Some(Fact::Turn(color)) = turn {
        position.side_to_move = color;
    }
    if let Some(Fact::HalfmoveClock(n)) = halfmove {
        position.halfmove_clock = n;
    }
    if let Some(Fact::Fullmove(n)) = fullmove {
        position.fullmove_number = n;
    }
    if let Some(Fact::EnPassant(square)) = en_passant {
        position.en_passant_square = Some(square);
    }
    position.castling_rights = castling;
    position.recalc_occupancy();

    Ok(position)
}

fn set_once(slot: &mut Option<Fact>, fact: &Fact) -> Result<(), FactError> {
    if let Some(existing) = slot {
        return ensure_same(existing, fact);
    }
    *slot = Some(*fact);
    Ok(())
}

fn ensure_same(existing: &Fact, fact: &Fact) -> Result<(), FactError> {
    if existing == fact {
        Ok(())
    } else {
        Err(FactError::ConflictingFacts {
            first: existing.to_string(),
            second: fact.to_string(),
        })
    }
}

/// The fact list as a single list term.
pub fn position_to_term(position: &Position) -> Term {
    facts_to_term(&encode_position(position))
}

pub fn position_from_term(term: &Term, policy: UnknownFactPolicy) -> Result<Position, FactError> {
    decode_position(&facts_from_term(term, policy)?)
}
