//! Ways of playing chess that the equivalence harness can compare.
//!
//! `OraclePath` calls the rules oracle directly and serves as the reference.
//! `FactBridgePath` pushes every position and move through the fact codecs
//! and the enumeration bridge before and after the oracle does its work.
//! `LogicEnginePath` goes one step further and asks the reference logic
//! engine, through the `legal_move/2` and `make_move/3` predicates.

use std::time::Duration;

use crate::bridge::move_enumeration::{Enumeration, MoveEnumerationBridge};
use crate::errors::{FactError, OracleError};
use crate::facts::fact::UnknownFactPolicy;
use crate::facts::move_codec::{decode_move, encode_move, move_from_term, move_to_term};
use crate::facts::position_codec::{decode_position, encode_position, position_from_term, position_to_term};
use crate::game_state::position::Position;
use crate::harness::equivalence::HarnessError;
use crate::logic::chess_predicates::register_chess_predicates;
use crate::logic::engine::{Bindings, LogicEngine, Query, QueryOptions, QueryOutcome};
use crate::logic::interpreter::Interpreter;
use crate::logic::term::Term;
use crate::move_generation::rules_oracle::RulesOracle;
use crate::moves::chess_move::Move;

/// Result of asking a path to play one move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Applied {
    Accepted(Position),
    Rejected,
}

pub trait RulesPath {
    /// Short label used in divergence reports.
    fn name(&self) -> &'static str;

    fn apply(&mut self, position: &Position, mv: &Move) -> Result<Applied, HarnessError>;

    /// Legal moves in any order.
    fn legal_moves(&mut self, position: &Position) -> Result<Vec<Move>, HarnessError>;
}

impl<P: RulesPath + ?Sized> RulesPath for &mut P {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn apply(&mut self, position: &Position, mv: &Move) -> Result<Applied, HarnessError> {
        (**self).apply(position, mv)
    }

    fn legal_moves(&mut self, position: &Position) -> Result<Vec<Move>, HarnessError> {
        (**self).legal_moves(position)
    }
}

pub struct OraclePath<O> {
    oracle: O,
}

impl<O: RulesOracle> OraclePath<O> {
    pub fn new(oracle: O) -> Self {
        Self { oracle }
    }
}

impl<O: RulesOracle> RulesPath for OraclePath<O> {
    fn name(&self) -> &'static str {
        "oracle"
    }

    fn apply(&mut self, position: &Position, mv: &Move) -> Result<Applied, HarnessError> {
        match self.oracle.apply(position, mv) {
            Ok(next) => Ok(Applied::Accepted(next)),
            Err(OracleError::IllegalMove { .. }) => Ok(Applied::Rejected),
            Err(err) => Err(err.into()),
        }
    }

    fn legal_moves(&mut self, position: &Position) -> Result<Vec<Move>, HarnessError> {
        Ok(self.oracle.legal_moves(position)?)
    }
}

pub struct FactBridgePath<O> {
    bridge: MoveEnumerationBridge<O>,
}

impl<O: RulesOracle> FactBridgePath<O> {
    pub fn new(oracle: O) -> Self {
        Self {
            bridge: MoveEnumerationBridge::new(oracle),
        }
    }
}

fn through_position_codec(position: &Position) -> Result<Position, FactError> {
    decode_position(&encode_position(position))
}

fn through_move_codec(mv: &Move) -> Result<Move, FactError> {
    decode_move(&encode_move(mv))
}

impl<O: RulesOracle> RulesPath for FactBridgePath<O> {
    fn name(&self) -> &'static str {
        "fact-bridge"
    }

    fn apply(&mut self, position: &Position, mv: &Move) -> Result<Applied, HarnessError> {
        let position = through_position_codec(position)?;
        let mv = through_move_codec(mv)?;
        if !self.bridge.verify_move(&mv, &position)? {
            return Ok(Applied::Rejected);
        }
        let next = self.bridge.oracle().apply(&position, &mv)?;
        Ok(Applied::Accepted(through_position_codec(&next)?))
    }

    fn legal_moves(&mut self, position: &Position) -> Result<Vec<Move>, HarnessError> {
        let position = through_position_codec(position)?;
        let mut moves = Vec::new();
        let mut step = self.bridge.first_call(&position)?;
        while let Enumeration::Yield { mv, handle, index } = step {
            moves.push(through_move_codec(&mv)?);
            step = self.bridge.redo(handle, index)?;
        }
        Ok(moves)
    }
}

/// Default wall-clock budget for one engine query on this path.
pub const LOGIC_PATH_BUDGET: Duration = Duration::from_secs(10);

pub struct LogicEnginePath {
    engine: Interpreter,
    options: QueryOptions,
    policy: UnknownFactPolicy,
}

impl LogicEnginePath {
    /// An interpreter with the prelude and the chess predicates over `oracle`.
    pub fn new<O>(oracle: O, policy: UnknownFactPolicy) -> Result<Self, HarnessError>
    where
        O: RulesOracle + Clone + Send + 'static,
    {
        let mut engine = Interpreter::with_prelude()?;
        register_chess_predicates(&mut engine, oracle, policy)?;
        Ok(Self {
            engine,
            options: QueryOptions {
                budget: Some(LOGIC_PATH_BUDGET),
                max_solutions: None,
            },
            policy,
        })
    }

    fn solve(&mut self, query: &Query, max_solutions: Option<usize>) -> Result<Vec<Bindings>, HarnessError> {
        let options = QueryOptions {
            max_solutions,
            ..self.options
        };
        match self.engine.query(query, &options)? {
            QueryOutcome::Solutions(solutions) => Ok(solutions),
            QueryOutcome::Timeout { .. } => Err(HarnessError::Timeout {
                path: self.name(),
                goal: query.goal.to_string(),
            }),
        }
    }
}

impl RulesPath for LogicEnginePath {
    fn name(&self) -> &'static str {
        "logic-engine"
    }

    /// `legal_move(Pos, Move), make_move(Pos, Move, Next)`.
    fn apply(&mut self, position: &Position, mv: &Move) -> Result<Applied, HarnessError> {
        let position_term = position_to_term(position);
        let move_term = move_to_term(mv);
        let goal = Term::compound(
            ",",
            vec![
                Term::compound("legal_move", vec![position_term.clone(), move_term.clone()]),
                Term::compound("make_move", vec![position_term, move_term, Term::Var(0)]),
            ],
        );
        let query = Query::new(goal, vec!["Next".to_owned()]);

        let solutions = self.solve(&query, Some(1))?;
        let Some(next) = solutions.first().and_then(|bindings| bindings.get("Next")) else {
            return Ok(Applied::Rejected);
        };
        Ok(Applied::Accepted(position_from_term(next, self.policy)?))
    }

    fn legal_moves(&mut self, position: &Position) -> Result<Vec<Move>, HarnessError> {
        let goal = Term::compound("legal_move", vec![position_to_term(position), Term::Var(0)]);
        let query = Query::new(goal, vec!["Move".to_owned()]);

        self.solve(&query, None)?
            .iter()
            .filter_map(|bindings| bindings.get("Move"))
            .map(|term| move_from_term(term).map_err(HarnessError::from))
            .collect()
    }
}
