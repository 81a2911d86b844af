//! Background predicates every tactic can rely on.
//!
//! Positions reach the engine as fact lists, so the board accessors here are
//! plain list lookups over `contents/2` and `turn/1` facts.

use crate::errors::EngineFault;
use crate::logic::engine::LogicEngine;
use crate::logic::parser::parse_program;

pub const PRELUDE: &str = r"
% member(?Elem, ?List)
member(X, [X|_]).
member(X, [_|T]) :- member(X, T).

different(X, Y) :- X \= Y.

other_color(white, black).
other_color(black, white).

% piece_at(+Pos, ?Square, ?Piece, ?Color)
piece_at(Pos, Square, Piece, Color) :-
    member(contents(piece(Piece, Color), square(Square)), Pos).

% turn(+Pos, ?Color)
turn(Pos, Color) :- member(turn(Color), Pos).
";

pub fn load_prelude<E: LogicEngine + ?Sized>(engine: &mut E) -> Result<usize, EngineFault> {
    let clauses = parse_program(PRELUDE)?;
    let count = clauses.len();
    for clause in clauses {
        engine.assert_clause(clause)?;
    }
    Ok(count)
}

#[cfg(test)]
mod tests {
    use crate::facts::position_codec::position_to_term;
    use crate::game_state::position::Position;
    use crate::logic::engine::{LogicEngine, Query, QueryOptions, QueryOutcome};
    use crate::logic::interpreter::Interpreter;
    use crate::logic::term::Term;

    fn solutions(engine: &mut Interpreter, query: Query) -> Vec<String> {
        match engine.query(&query, &QueryOptions::default()).expect("should run") {
            QueryOutcome::Solutions(solutions) => solutions
                .into_iter()
                .flat_map(|bindings| bindings.into_values())
                .map(|value| value.to_string())
                .collect(),
            other => panic!("unexpected {other:?}"),
        }
    }

    fn with_position(text: &str, position: &Position) -> Query {
        let mut query = Query::parse(text).expect("should parse");
        // `Pos` is the first variable in every query below.
        query.goal = substitute_first_var(&query.goal, &position_to_term(position));
        query.var_names[0] = "_".to_owned();
        query
    }

    fn substitute_first_var(term: &Term, value: &Term) -> Term {
        match term {
            Term::Var(0) => value.clone(),
            Term::Compound(name, args) => Term::Compound(
                name.clone(),
                args.iter().map(|arg| substitute_first_var(arg, value)).collect(),
            ),
            other => other.clone(),
        }
    }

    #[test]
    fn board_accessors_read_the_fact_list() {
        let mut engine = Interpreter::with_prelude().expect("prelude should load");
        let position = Position::starting();

        let query = with_position("turn(Pos, Color)", &position);
        assert_eq!(solutions(&mut engine, query), vec!["white"]);

        let query = with_position("piece_at(Pos, e1, Piece, Color)", &position);
        assert_eq!(solutions(&mut engine, query), vec!["white", "king"]);

        let query = with_position("piece_at(Pos, Square, queen, black)", &position);
        assert_eq!(solutions(&mut engine, query), vec!["d8"]);
    }

    #[test]
    fn color_helpers() {
        let mut engine = Interpreter::with_prelude().expect("prelude should load");
        let query = Query::parse("other_color(white, C), different(C, white)").expect("should parse");
        assert_eq!(solutions(&mut engine, query), vec!["black"]);
    }
}
