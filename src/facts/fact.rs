//! The closed set of fact kinds that describe a position.
//!
//! Grammar (one term per fact):
//!
//! ```text
//! contents(piece(<piece_name>, <color>), square(<square>))
//! turn(<color>)
//! kingside_castle(<color>)
//! queenside_castle(<color>)
//! halfmove_clock(<n>)
//! fullmove(<n>)
//! en_passant(<square>)
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::FactError;
use crate::game_state::chess_types::{Color, PieceKind, Square};
use crate::logic::term::Term;
use crate::utils::algebraic::{algebraic_to_square, square_to_algebraic};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Fact {
    Contents {
        piece: PieceKind,
        color: Color,
        square: Square,
    },
    Turn(Color),
    KingsideCastle(Color),
    QueensideCastle(Color),
    HalfmoveClock(u16),
    Fullmove(u16),
    EnPassant(Square),
}

/// What to do with a term whose functor is not a known fact kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownFactPolicy {
    /// Skip it (logged at debug level).
    #[default]
    Ignore,
    /// Reject it with `FactError::UnknownFact`.
    Strict,
}

const KNOWN_FUNCTORS: [(&str, usize); 7] = [
    ("contents", 2),
    ("turn", 1),
    ("kingside_castle", 1),
    ("queenside_castle", 1),
    ("halfmove_clock", 1),
    ("fullmove", 1),
    ("en_passant", 1),
];

impl Fact {
    pub fn to_term(&self) -> Term {
        match *self {
            Fact::Contents {
                piece,
                color,
                square,
            } => Term::compound(
                "contents",
                vec![
                    Term::compound(
                        "piece",
                        vec![Term::atom(piece.name()), Term::atom(color.name())],
                    ),
                    Term::compound("square", vec![square_term(square)]),
                ],
            ),
            Fact::Turn(color) => Term::compound("turn", vec![Term::atom(color.name())]),
            Fact::KingsideCastle(color) => {
                Term::compound("kingside_castle", vec![Term::atom(color.name())])
            }
            Fact::QueensideCastle(color) => {
                Term::compound("queenside_castle", vec![Term::atom(color.name())])
            }
            Fact::HalfmoveClock(n) => Term::compound("halfmove_clock", vec![Term::Int(n.into())]),
            Fact::Fullmove(n) => Term::compound("fullmove", vec![Term::Int(n.into())]),
            Fact::EnPassant(square) => Term::compound("en_passant", vec![square_term(square)]),
        }
    }

    /// Interpret one term as a fact.
    ///
    /// `Ok(None)` means the functor is not a fact kind at all; a known functor
    /// with the wrong arguments is always an error.
    pub fn from_term(term: &Term) -> Result<Option<Fact>, FactError> {
        let malformed = |reason: &str| FactError::MalformedFact {
            fact: term.to_string(),
            reason: reason.to_owned(),
        };

        let Some((name, arity)) = term.name_arity() else {
            return Err(malformed("not a fact term"));
        };
        if !KNOWN_FUNCTORS.iter().any(|(known, _)| *known == name) {
            return Ok(None);
        }
        if !KNOWN_FUNCTORS.iter().any(|&(known, n)| known == name && n == arity) {
            return Err(malformed("wrong number of arguments"));
        }

        let args = term.args();
        let color_arg = || {
            args[0]
                .as_atom()
                .and_then(Color::from_name)
                .ok_or_else(|| malformed("expected `white` or `black`"))
        };

        let fact = match name {
            "contents" => {
                let piece_term = &args[0];
                let square_wrapper = &args[1];
                let (piece, color) = match (piece_term.name_arity(), piece_term.args()) {
                    (Some(("piece", 2)), [kind, color]) => (
                        kind.as_atom()
                            .and_then(PieceKind::from_name)
                            .ok_or_else(|| malformed("unknown piece name"))?,
                        color
                            .as_atom()
                            .and_then(Color::from_name)
                            .ok_or_else(|| malformed("unknown color"))?,
                    ),
                    _ => return Err(malformed("expected piece(<piece>, <color>)")),
                };
                let square = match (square_wrapper.name_arity(), square_wrapper.args()) {
                    (Some(("square", 1)), [sq]) => {
                        square_from_term(sq).ok_or_else(|| malformed("invalid square"))?
                    }
                    _ => return Err(malformed("expected square(<square>)")),
                };
                Fact::Contents {
                    piece,
                    color,
                    square,
                }
            }
            "turn" => Fact::Turn(color_arg()?),
            "kingside_castle" => Fact::KingsideCastle(color_arg()?),
            "queenside_castle" => Fact::QueensideCastle(color_arg()?),
            "halfmove_clock" => Fact::HalfmoveClock(
                counter_arg(&args[0], 0).ok_or_else(|| malformed("expected a non-negative integer"))?,
            ),
            "fullmove" => Fact::Fullmove(
                counter_arg(&args[0], 1).ok_or_else(|| malformed("expected a positive integer"))?,
            ),
            "en_passant" => {
                Fact::EnPassant(square_from_term(&args[0]).ok_or_else(|| malformed("invalid square"))?)
            }
            _ => return Ok(None),
        };

        Ok(Some(fact))
    }
}

impl fmt::Display for Fact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_term())
    }
}

pub fn square_term(square: Square) -> Term {
    Term::atom(&square_to_algebraic(square))
}

pub fn square_from_term(term: &Term) -> Option<Square> {
    term.as_atom().and_then(|name| algebraic_to_square(name).ok())
}

fn counter_arg(term: &Term, min: i64) -> Option<u16> {
    term.as_int()
        .filter(|n| *n >= min)
        .and_then(|n| u16::try_from(n).ok())
}

pub fn facts_to_term(facts: &[Fact]) -> Term {
    Term::list(facts.iter().map(Fact::to_term).collect::<Vec<_>>())
}

/// Read a list term of facts, applying `policy` to unknown kinds.
pub fn facts_from_term(term: &Term, policy: UnknownFactPolicy) -> Result<Vec<Fact>, FactError> {
    let items = term.list_items().ok_or_else(|| FactError::NotAFactList {
        term: term.to_string(),
    })?;

    let mut facts = Vec::with_capacity(items.len());
    for item in items {
        match Fact::from_term(item)? {
            Some(fact) => facts.push(fact),
            None => match policy {
                UnknownFactPolicy::Ignore => {
                    debug!(fact = %item, "ignoring unknown fact kind");
                }
                UnknownFactPolicy::Strict => {
                    let (functor, arity) = item.name_arity().unwrap_or(("", 0));
                    return Err(FactError::UnknownFact {
                        functor: functor.to_owned(),
                        arity,
                    });
                }
            },
        }
    }

    Ok(facts)
}
