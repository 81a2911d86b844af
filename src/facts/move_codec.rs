//! Move <-> move term.
//!
//! A move is a list of two or three atoms: `[e2, e4]`, or `[e7, e8, queen]`
//! when a pawn promotes.

use crate::errors::FactError;
use crate::facts::fact::{square_from_term, square_term};
use crate::game_state::chess_types::PieceKind;
use crate::logic::term::Term;
use crate::moves::chess_move::Move;

pub fn encode_move(mv: &Move) -> Vec<Term> {
    let mut items = Vec::with_capacity(3);
    items.push(square_term(mv.from));
    items.push(square_term(mv.to));
    if let Some(piece) = mv.promotion {
        items.push(Term::atom(piece.name()));
    }
    items
}

pub fn decode_move(items: &[Term]) -> Result<Move, FactError> {
    let malformed = |reason: String| FactError::MalformedMove {
        term: Term::list(items.to_vec()).to_string(),
        reason,
    };

    if !(2..=3).contains(&items.len()) {
        return Err(malformed(format!(
            "expected 2 or 3 elements, found {}",
            items.len()
        )));
    }

    let from = square_from_term(&items[0])
        .ok_or_else(|| malformed(format!("`{}` is not a square", items[0])))?;
    let to = square_from_term(&items[1])
        .ok_or_else(|| malformed(format!("`{}` is not a square", items[1])))?;

    let promotion = match items.get(2) {
        None => None,
        Some(piece) => {
            let kind = piece
                .as_atom()
                .and_then(PieceKind::from_name)
                .filter(|kind| kind.is_promotion_target())
                .ok_or_else(|| malformed(format!("`{piece}` is not a promotion piece")))?;
            Some(kind)
        }
    };

    Ok(Move {
        from,
        to,
        promotion,
    })
}

pub fn move_to_term(mv: &Move) -> Term {
    Term::list(encode_move(mv))
}

pub fn move_from_term(term: &Term) -> Result<Move, FactError> {
    let items = term.list_items().ok_or_else(|| FactError::MalformedMove {
        term: term.to_string(),
        reason: "not a proper list".to_owned(),
    })?;
    let owned: Vec<Term> = items.into_iter().cloned().collect();
    decode_move(&owned)
}

#[cfg(test)]
mod tests {
    use super::{decode_move, encode_move, move_from_term, move_to_term};
    use crate::errors::FactError;
    use crate::game_state::chess_types::PieceKind;
    use crate::logic::parser::parse_term;
    use crate::logic::term::Term;
    use crate::moves::chess_move::Move;

    #[test]
    fn quiet_and_promotion_moves_encode() {
        let push = Move::new(12, 28);
        assert_eq!(move_to_term(&push).to_string(), "[e2,e4]");

        let promote = Move::promoting(52, 60, PieceKind::Queen);
        let items = encode_move(&promote);
        assert_eq!(items.len(), 3);
        assert_eq!(items[2].as_atom(), Some("queen"));
        assert_eq!(decode_move(&items).expect("should decode"), promote);
    }

    #[test]
    fn parsed_move_terms_decode() {
        let term = parse_term("[g7, g8, knight]").expect("term should parse").term;
        assert_eq!(
            move_from_term(&term).expect("should decode"),
            Move::promoting(54, 62, PieceKind::Knight)
        );
    }

    #[test]
    fn wrong_arity_is_malformed() {
        let err = decode_move(&[Term::atom("e2")]).expect_err("one element");
        assert_eq!(
            err,
            FactError::MalformedMove {
                term: "[e2]".to_owned(),
                reason: "expected 2 or 3 elements, found 1".to_owned(),
            }
        );

        let four = [
            Term::atom("e7"),
            Term::atom("e8"),
            Term::atom("queen"),
            Term::atom("check"),
        ];
        assert!(matches!(
            decode_move(&four),
            Err(FactError::MalformedMove { .. })
        ));
    }

    #[test]
    fn bad_squares_and_promotion_pieces_are_rejected() {
        for text in [
            "[e2, e9]",
            "[E2, e4]",
            "[e7, e8, king]",
            "[e7, e8, pawn]",
            "[e7, e8, 5]",
            "[e2|T]",
        ] {
            let term = parse_term(text).expect("term should parse").term;
            assert!(
                matches!(move_from_term(&term), Err(FactError::MalformedMove { .. })),
                "{text}"
            );
        }
    }
}
