//! Evaluating a tactic clause against a position.
//!
//! A tactic is a clause whose head is either `f(Pos, From, To)` or
//! `f(Pos, Move)`. Evaluation installs the clause for the duration of one
//! bounded query, asks for the moves it suggests (or whether it accepts a
//! given move), and removes the clause again however the query ended.

use std::time::Duration;

use derive_more::{Display, Error, From};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::errors::{EngineFault, FactError, OracleError};
use crate::facts::fact::{square_from_term, square_term};
use crate::facts::move_codec::{move_from_term, move_to_term};
use crate::facts::position_codec::position_to_term;
use crate::game_state::chess_types::PieceKind;
use crate::game_state::position::Position;
use crate::logic::clause::Clause;
use crate::logic::engine::{Bindings, LogicEngine, Query, QueryOptions, QueryOutcome};
use crate::logic::term::Term;
use crate::move_generation::rules_oracle::RulesOracle;
use crate::moves::chess_move::Move;
use crate::tactics::scoped_clause::ScopedClause;
use crate::utils::example_records::ExampleRecord;

/// Where `legal_move/3` comes from while a tactic runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LegalMoveSource {
    /// The engine already has the enumeration bridge registered as a
    /// foreign predicate.
    #[default]
    ForeignPredicate,
    /// One `legal_move(From, To, Pos)` fact per legal move is asserted for
    /// the duration of the query. The engine must not have `legal_move/3`
    /// registered as a foreign predicate.
    AssertedFacts,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TacticConfig {
    /// `None` runs the query without a deadline.
    pub time_budget: Option<Duration>,
    /// Upper bound on suggestions collected per query; `None` for all.
    pub max_suggestions: Option<usize>,
    pub legal_moves: LegalMoveSource,
}

impl Default for TacticConfig {
    fn default() -> Self {
        Self {
            time_budget: Some(Duration::from_secs(1)),
            max_suggestions: None,
            legal_moves: LegalMoveSource::ForeignPredicate,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TacticOutcome {
    /// The tactic fired; the suggested (or verified) moves, without repeats.
    Match(Vec<Move>),
    NoMatch,
    /// The time budget ran out before the query finished.
    Timeout,
}

#[derive(Debug, Display, Error, From)]
pub enum TacticError {
    #[from]
    #[display("engine fault: {_0}")]
    Engine(EngineFault),

    #[display("unsupported tactic head `{head}`: expected f(Pos, From, To) or f(Pos, Move)")]
    UnsupportedHead { head: String },

    /// The query succeeded but none of its answers named a move.
    #[display("tactic {tactic} matched without binding a move")]
    EmptyMatch { tactic: String },

    #[from]
    #[display("{_0}")]
    Fact(FactError),

    #[from]
    #[display("{_0}")]
    Oracle(OracleError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HeadShape {
    Squares,
    List,
}

/// Outcome of one labelled example.
#[derive(Debug)]
pub struct ExampleEvaluation {
    pub index: usize,
    pub label: bool,
    pub outcome: Result<TacticOutcome, TacticError>,
}

pub struct TacticQueryExecutor<O> {
    oracle: O,
    config: TacticConfig,
}

impl<O: RulesOracle> TacticQueryExecutor<O> {
    pub fn new(oracle: O, config: TacticConfig) -> Self {
        Self { oracle, config }
    }

    pub fn config(&self) -> &TacticConfig {
        &self.config
    }

    /// Run `tactic` on `position`.
    ///
    /// With `mv` the question is whether the tactic accepts that move (the
    /// match, if any, is exactly `[mv]`); without it, the tactic's
    /// suggestions are collected.
    #[instrument(level = "debug", skip_all, fields(tactic = %tactic.key(), fen = %position))]
    pub fn evaluate<E: LogicEngine + ?Sized>(
        &self,
        engine: &mut E,
        tactic: &Clause,
        position: &Position,
        mv: Option<&Move>,
    ) -> Result<TacticOutcome, TacticError> {
        let shape = head_shape(tactic)?;
        let legal_facts = match self.config.legal_moves {
            LegalMoveSource::ForeignPredicate => Vec::new(),
            LegalMoveSource::AssertedFacts => self.legal_move_facts(position)?,
        };

        let mut installed = ScopedClause::assert(engine, tactic.clone())?;
        let mut scope = ScopedClause::assert_all(installed.engine(), legal_facts)?;

        let query = build_query(tactic, shape, position, mv);
        let options = QueryOptions {
            budget: self.config.time_budget,
            max_solutions: if mv.is_some() {
                Some(1)
            } else {
                self.config.max_suggestions
            },
        };
        let answer = scope.engine().query(&query, &options);
        drop(scope);
        drop(installed);

        let solutions = match answer {
            Ok(QueryOutcome::Solutions(solutions)) => solutions,
            Ok(QueryOutcome::Timeout { partial }) => {
                warn!(
                    budget = ?self.config.time_budget,
                    partial = partial.len(),
                    "tactic query timed out"
                );
                return Ok(TacticOutcome::Timeout);
            }
            Err(fault) => {
                warn!(%fault, "tactic query faulted");
                return Err(fault.into());
            }
        };

        if solutions.is_empty() {
            debug!("no match");
            return Ok(TacticOutcome::NoMatch);
        }
        if let Some(mv) = mv {
            return Ok(TacticOutcome::Match(vec![*mv]));
        }

        let legal = self.oracle.legal_moves(position)?;
        let mut moves = Vec::new();
        for bindings in &solutions {
            if let Some(suggestion) = decode_suggestion(shape, bindings, &legal) {
                if !moves.contains(&suggestion) {
                    moves.push(suggestion);
                }
            }
        }
        if moves.is_empty() {
            return Err(TacticError::EmptyMatch {
                tactic: tactic.key().to_string(),
            });
        }
        debug!(suggestions = moves.len(), "match");
        Ok(TacticOutcome::Match(moves))
    }

    /// Run `tactic` on every record, checking whether it accepts the
    /// record's move.
    pub fn evaluate_examples<E: LogicEngine + ?Sized>(
        &self,
        engine: &mut E,
        tactic: &Clause,
        records: &[ExampleRecord],
    ) -> Vec<ExampleEvaluation> {
        records
            .iter()
            .enumerate()
            .map(|(index, record)| ExampleEvaluation {
                index,
                label: record.label,
                outcome: self.evaluate(engine, tactic, &record.position, Some(&record.mv)),
            })
            .collect()
    }

    fn legal_move_facts(&self, position: &Position) -> Result<Vec<Clause>, TacticError> {
        let position_term = position_to_term(position);
        let mut facts: Vec<Clause> = Vec::new();
        for mv in self.oracle.legal_moves(position)? {
            let fact = Clause::fact(Term::compound(
                "legal_move",
                vec![
                    square_term(mv.from),
                    square_term(mv.to),
                    position_term.clone(),
                ],
            ))?;
            if !facts.contains(&fact) {
                facts.push(fact);
            }
        }
        Ok(facts)
    }
}

fn head_shape(tactic: &Clause) -> Result<HeadShape, TacticError> {
    match tactic.head.name_arity() {
        Some((_, 3)) => Ok(HeadShape::Squares),
        Some((_, 2)) => Ok(HeadShape::List),
        _ => Err(TacticError::UnsupportedHead {
            head: tactic.head.to_string(),
        }),
    }
}

fn build_query(tactic: &Clause, shape: HeadShape, position: &Position, mv: Option<&Move>) -> Query {
    let name = tactic.key().name;
    let position_term = position_to_term(position);
    match (shape, mv) {
        (HeadShape::Squares, Some(mv)) => Query::new(
            Term::compound(
                &name,
                vec![
                    position_term,
                    square_term(mv.from),
                    square_term(mv.to),
                ],
            ),
            Vec::new(),
        ),
        (HeadShape::Squares, None) => Query::new(
            Term::compound(&name, vec![position_term, Term::Var(0), Term::Var(1)]),
            vec!["From".to_owned(), "To".to_owned()],
        ),
        (HeadShape::List, Some(mv)) => Query::new(
            Term::compound(&name, vec![position_term, move_to_term(mv)]),
            Vec::new(),
        ),
        (HeadShape::List, None) => Query::new(
            Term::compound(&name, vec![position_term, Term::Var(0)]),
            vec!["Move".to_owned()],
        ),
    }
}

/// Turn one answer into a move.
///
/// Square pairs are matched against the legal moves so promotions come back
/// complete (the queen when several pieces share the squares); a pair that
/// is not legal is kept as a plain move.
fn decode_suggestion(shape: HeadShape, bindings: &Bindings, legal: &[Move]) -> Option<Move> {
    match shape {
        HeadShape::List => move_from_term(bindings.get("Move")?).ok(),
        HeadShape::Squares => {
            let from = square_from_term(bindings.get("From")?)?;
            let to = square_from_term(bindings.get("To")?)?;
            let mut candidates = legal.iter().filter(|mv| mv.same_squares(from, to));
            let first = candidates.next().copied();
            let queen = legal
                .iter()
                .find(|mv| mv.same_squares(from, to) && mv.promotion == Some(PieceKind::Queen))
                .copied();
            Some(queen.or(first).unwrap_or(Move::new(from, to)))
        }
    }
}
