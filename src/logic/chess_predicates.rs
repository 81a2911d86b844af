//! Chess rules as foreign predicates.
//!
//! - `legal_move(From, To, Pos)` and `legal_move(Pos, Move)`: verification
//!   when the move is fully bound, otherwise resumable enumeration through a
//!   `MoveEnumerationBridge`.
//! - `make_move(Pos, Move, NewPos)`: fails for illegal moves.
//! - `in_check(Pos)`: the side to move is in check.
//!
//! Positions are fact lists and must be ground.

use tracing::debug;

use crate::bridge::enumeration_cursor::CursorId;
use crate::bridge::move_enumeration::{Enumeration, MoveEnumerationBridge};
use crate::errors::{EngineFault, OracleError};
use crate::facts::fact::{square_from_term, square_term, UnknownFactPolicy};
use crate::facts::move_codec::{move_from_term, move_to_term};
use crate::facts::position_codec::{position_from_term, position_to_term};
use crate::game_state::position::Position;
use crate::logic::engine::LogicEngine;
use crate::logic::foreign::{ForeignContext, ForeignControl, ForeignPredicate, ForeignReply};
use crate::logic::term::Term;
use crate::move_generation::rules_oracle::RulesOracle;
use crate::moves::chess_move::Move;

/// Register every chess predicate on `engine`, each with its own copy of
/// `oracle`.
pub fn register_chess_predicates<E, O>(
    engine: &mut E,
    oracle: O,
    policy: UnknownFactPolicy,
) -> Result<(), EngineFault>
where
    E: LogicEngine + ?Sized,
    O: RulesOracle + Clone + Send + 'static,
{
    register_legal_move_predicates(engine, oracle.clone(), policy)?;
    register_position_predicates(engine, oracle, policy)
}

/// `legal_move/3` and `legal_move/2` only.
pub fn register_legal_move_predicates<E, O>(
    engine: &mut E,
    oracle: O,
    policy: UnknownFactPolicy,
) -> Result<(), EngineFault>
where
    E: LogicEngine + ?Sized,
    O: RulesOracle + Clone + Send + 'static,
{
    engine.register_foreign(
        "legal_move",
        3,
        Box::new(LegalMovePredicate::new(oracle.clone(), MoveShape::Squares, policy)),
    )?;
    engine.register_foreign(
        "legal_move",
        2,
        Box::new(LegalMovePredicate::new(oracle, MoveShape::List, policy)),
    )
}

/// `make_move/3` and `in_check/1`.
pub fn register_position_predicates<E, O>(
    engine: &mut E,
    oracle: O,
    policy: UnknownFactPolicy,
) -> Result<(), EngineFault>
where
    E: LogicEngine + ?Sized,
    O: RulesOracle + Clone + Send + 'static,
{
    engine.register_foreign(
        "make_move",
        3,
        Box::new(MakeMovePredicate {
            oracle: oracle.clone(),
            policy,
        }),
    )?;
    engine.register_foreign("in_check", 1, Box::new(InCheckPredicate { oracle, policy }))
}

/// Argument layout of a `legal_move` predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveShape {
    /// `legal_move(From, To, Pos)`
    Squares,
    /// `legal_move(Pos, Move)`
    List,
}

impl MoveShape {
    fn name(self) -> &'static str {
        match self {
            MoveShape::Squares => "legal_move/3",
            MoveShape::List => "legal_move/2",
        }
    }

    fn position_arg(self, args: &[Term]) -> &Term {
        match self {
            MoveShape::Squares => &args[2],
            MoveShape::List => &args[0],
        }
    }

    fn reply(self, mv: &Move, position: &Term) -> Vec<Term> {
        match self {
            MoveShape::Squares => vec![square_term(mv.from), square_term(mv.to), position.clone()],
            MoveShape::List => vec![position.clone(), move_to_term(mv)],
        }
    }
}

pub struct LegalMovePredicate<O> {
    bridge: MoveEnumerationBridge<O>,
    shape: MoveShape,
    policy: UnknownFactPolicy,
}

impl<O: RulesOracle> LegalMovePredicate<O> {
    pub fn new(oracle: O, shape: MoveShape, policy: UnknownFactPolicy) -> Self {
        Self {
            bridge: MoveEnumerationBridge::new(oracle),
            shape,
            policy,
        }
    }

    pub fn live_cursors(&self) -> usize {
        self.bridge.live_cursors()
    }

    fn bridge_fault(&self, err: impl std::fmt::Display) -> EngineFault {
        EngineFault::Foreign {
            predicate: self.shape.name().to_owned(),
            reason: err.to_string(),
        }
    }

    fn yield_reply(&self, step: Enumeration, position: &Term) -> ForeignReply {
        match step {
            Enumeration::Yield { mv, handle, index } => ForeignReply::Retry(
                self.shape.reply(&mv, position),
                ForeignContext {
                    handle: handle.to_handle(),
                    index,
                },
            ),
            Enumeration::Exhausted => ForeignReply::Fail,
        }
    }

    /// The fully bound move in `args`, or `None` when it should be enumerated.
    fn bound_move(&self, args: &[Term]) -> Result<Option<BoundMove>, EngineFault> {
        match self.shape {
            MoveShape::Squares => {
                if !(args[0].is_ground() && args[1].is_ground()) {
                    return Ok(None);
                }
                let from = square_arg(self.shape, &args[0])?;
                let to = square_arg(self.shape, &args[1])?;
                Ok(Some(BoundMove::Squares(from, to)))
            }
            MoveShape::List => {
                if !args[1].is_ground() {
                    return Ok(None);
                }
                let mv = move_from_term(&args[1]).map_err(|err| EngineFault::TypeError {
                    expected: "move term".to_owned(),
                    found: err.to_string(),
                })?;
                Ok(Some(BoundMove::Exact(mv)))
            }
        }
    }
}

enum BoundMove {
    Squares(u8, u8),
    Exact(Move),
}

impl<O: RulesOracle + Send> ForeignPredicate for LegalMovePredicate<O> {
    fn call(&mut self, args: &[Term], control: ForeignControl) -> Result<ForeignReply, EngineFault> {
        let position_term = self.shape.position_arg(args);
        match control {
            ForeignControl::FirstCall => {
                let position = position_arg(self.shape.name(), position_term, self.policy)?;
                match self.bound_move(args)? {
                    Some(BoundMove::Squares(from, to)) => {
                        let legal = self
                            .bridge
                            .verify(from, to, &position)
                            .map_err(|err| self.bridge_fault(err))?;
                        Ok(exit_if(legal, args))
                    }
                    Some(BoundMove::Exact(mv)) => {
                        let legal = self
                            .bridge
                            .verify_move(&mv, &position)
                            .map_err(|err| self.bridge_fault(err))?;
                        Ok(exit_if(legal, args))
                    }
                    None => {
                        let step = self
                            .bridge
                            .first_call(&position)
                            .map_err(|err| self.bridge_fault(err))?;
                        Ok(self.yield_reply(step, position_term))
                    }
                }
            }
            ForeignControl::Redo(context) => {
                let step = self
                    .bridge
                    .redo(CursorId::from_handle(context.handle), context.index)
                    .map_err(|err| self.bridge_fault(err))?;
                Ok(self.yield_reply(step, position_term))
            }
            ForeignControl::Pruned(context) => {
                self.bridge
                    .pruned(CursorId::from_handle(context.handle))
                    .map_err(|err| self.bridge_fault(err))?;
                Ok(ForeignReply::Fail)
            }
        }
    }
}

pub struct MakeMovePredicate<O> {
    oracle: O,
    policy: UnknownFactPolicy,
}

impl<O: RulesOracle + Send> ForeignPredicate for MakeMovePredicate<O> {
    fn call(&mut self, args: &[Term], control: ForeignControl) -> Result<ForeignReply, EngineFault> {
        if !matches!(control, ForeignControl::FirstCall) {
            return Ok(ForeignReply::Fail);
        }
        let position = position_arg("make_move/3", &args[0], self.policy)?;
        if !args[1].is_ground() {
            return Err(EngineFault::Instantiation {
                predicate: "make_move/3".to_owned(),
            });
        }
        let mv = move_from_term(&args[1]).map_err(|err| EngineFault::TypeError {
            expected: "move term".to_owned(),
            found: err.to_string(),
        })?;

        match self.oracle.apply(&position, &mv) {
            Ok(next) => Ok(ForeignReply::Exit(vec![
                args[0].clone(),
                args[1].clone(),
                position_to_term(&next),
            ])),
            Err(OracleError::IllegalMove { .. }) => {
                debug!(%mv, "make_move/3 rejected an illegal move");
                Ok(ForeignReply::Fail)
            }
            Err(err) => Err(EngineFault::Foreign {
                predicate: "make_move/3".to_owned(),
                reason: err.to_string(),
            }),
        }
    }
}

pub struct InCheckPredicate<O> {
    oracle: O,
    policy: UnknownFactPolicy,
}

impl<O: RulesOracle + Send> ForeignPredicate for InCheckPredicate<O> {
    fn call(&mut self, args: &[Term], control: ForeignControl) -> Result<ForeignReply, EngineFault> {
        if !matches!(control, ForeignControl::FirstCall) {
            return Ok(ForeignReply::Fail);
        }
        let position = position_arg("in_check/1", &args[0], self.policy)?;
        let checked = self
            .oracle
            .in_check(&position)
            .map_err(|err| EngineFault::Foreign {
                predicate: "in_check/1".to_owned(),
                reason: err.to_string(),
            })?;
        Ok(exit_if(checked, args))
    }
}

fn exit_if(success: bool, args: &[Term]) -> ForeignReply {
    if success {
        ForeignReply::Exit(args.to_vec())
    } else {
        ForeignReply::Fail
    }
}

fn position_arg(predicate: &str, term: &Term, policy: UnknownFactPolicy) -> Result<Position, EngineFault> {
    if !term.is_ground() {
        return Err(EngineFault::Instantiation {
            predicate: predicate.to_owned(),
        });
    }
    position_from_term(term, policy).map_err(|err| EngineFault::Foreign {
        predicate: predicate.to_owned(),
        reason: err.to_string(),
    })
}

fn square_arg(shape: MoveShape, term: &Term) -> Result<u8, EngineFault> {
    square_from_term(term).ok_or_else(|| EngineFault::TypeError {
        expected: format!("square in {}", shape.name()),
        found: term.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::{register_chess_predicates, LegalMovePredicate, MoveShape};
    use crate::facts::fact::UnknownFactPolicy;
    use crate::facts::position_codec::position_to_term;
    use crate::game_state::position::Position;
    use crate::logic::engine::{Bindings, LogicEngine, Query, QueryOptions, QueryOutcome};
    use crate::logic::foreign::{ForeignControl, ForeignPredicate, ForeignReply};
    use crate::logic::interpreter::Interpreter;
    use crate::logic::term::Term;
    use crate::move_generation::legal_move_generator::LegalMoveGenerator;

    fn engine() -> Interpreter {
        let mut engine = Interpreter::with_prelude().expect("prelude should load");
        register_chess_predicates(&mut engine, LegalMoveGenerator, UnknownFactPolicy::Ignore)
            .expect("predicates should register");
        engine
    }

    fn solve(engine: &mut Interpreter, goal: Term, names: &[&str]) -> Vec<Bindings> {
        let query = Query::new(goal, names.iter().map(|name| (*name).to_owned()).collect());
        match engine.query(&query, &QueryOptions::default()).expect("query should run") {
            QueryOutcome::Solutions(solutions) => solutions,
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn enumerates_and_verifies_through_the_engine() {
        let mut engine = engine();
        let start = position_to_term(&Position::starting());

        let all = solve(
            &mut engine,
            Term::compound("legal_move", vec![Term::Var(0), Term::Var(1), start.clone()]),
            &["From", "To"],
        );
        assert_eq!(all.len(), 20);

        let from_g1 = solve(
            &mut engine,
            Term::compound("legal_move", vec![Term::atom("g1"), Term::Var(0), start.clone()]),
            &["To"],
        );
        let targets: Vec<String> = from_g1.iter().map(|b| b["To"].to_string()).collect();
        assert_eq!(targets, vec!["f3", "h3"]);

        let verified = solve(
            &mut engine,
            Term::compound("legal_move", vec![Term::atom("e2"), Term::atom("e4"), start.clone()]),
            &[],
        );
        assert_eq!(verified.len(), 1);
        let rejected = solve(
            &mut engine,
            Term::compound("legal_move", vec![Term::atom("e2"), Term::atom("e5"), start]),
            &[],
        );
        assert!(rejected.is_empty());
    }

    #[test]
    fn make_move_and_in_check() {
        let mut engine = engine();
        let position = Position::from_fen("rnbqkbnr/pppp1ppp/8/4p3/6P1/5P2/PPPPP2P/RNBQKBNR b KQkq - 0 2")
            .expect("FEN should parse");
        let mv = Term::list(vec![Term::atom("d8"), Term::atom("h4")]);
        let goal = Term::compound(
            ",",
            vec![
                Term::compound("make_move", vec![position_to_term(&position), mv, Term::Var(0)]),
                Term::compound("in_check", vec![Term::Var(0)]),
            ],
        );
        let solutions = solve(&mut engine, goal, &["Next"]);
        assert_eq!(solutions.len(), 1);

        let illegal = Term::compound(
            "make_move",
            vec![
                position_to_term(&position),
                Term::list(vec![Term::atom("d8"), Term::atom("d4")]),
                Term::Var(0),
            ],
        );
        assert!(solve(&mut engine, illegal, &["Next"]).is_empty());
    }

    #[test]
    fn list_shape_keeps_promotion_pieces() {
        let mut engine = engine();
        let position = Position::from_fen("4k3/P7/8/8/8/8/8/4K3 w - - 0 1").expect("FEN should parse");
        let goal = Term::compound(
            "legal_move",
            vec![
                position_to_term(&position),
                Term::list(vec![Term::atom("a7"), Term::atom("a8"), Term::Var(0)]),
            ],
        );
        let pieces: Vec<String> = solve(&mut engine, goal, &["Piece"])
            .iter()
            .map(|b| b["Piece"].to_string())
            .collect();
        assert_eq!(pieces.len(), 4);
        for piece in ["knight", "bishop", "rook", "queen"] {
            assert!(pieces.iter().any(|p| p == piece), "{piece}");
        }
    }

    #[test]
    fn pruning_releases_the_cursor() {
        let mut predicate =
            LegalMovePredicate::new(LegalMoveGenerator, MoveShape::Squares, UnknownFactPolicy::Ignore);
        let args = vec![Term::Var(0), Term::Var(1), position_to_term(&Position::starting())];
        let ForeignReply::Retry(_, context) = predicate
            .call(&args, ForeignControl::FirstCall)
            .expect("first call")
        else {
            panic!("start position has moves");
        };
        assert_eq!(predicate.live_cursors(), 1);
        predicate
            .call(&args, ForeignControl::Pruned(context))
            .expect("prune");
        assert_eq!(predicate.live_cursors(), 0);
        assert!(predicate.call(&args, ForeignControl::Redo(context)).is_err());
    }

    #[test]
    fn unbound_positions_are_instantiation_errors() {
        let mut engine = engine();
        let query = Query::parse("legal_move(From, To, Pos)").expect("should parse");
        assert!(engine.query(&query, &QueryOptions::default()).is_err());
    }
}
