//! The logic engine abstraction.
//!
//! The tactic executor and the harness only need a handful of operations from
//! a logic engine: mutate the clause database, register host predicates, and
//! run a goal under a wall-clock budget. `Interpreter` is the in-crate
//! implementation; anything else that can honour this contract (including
//! the first-call / redo / pruned protocol for foreign predicates) can be
//! dropped in.

use std::collections::BTreeMap;
use std::time::Duration;

use crate::errors::{EngineFault, ParseError};
use crate::logic::clause::{Clause, PredicateKey};
use crate::logic::foreign::ForeignPredicate;
use crate::logic::parser::parse_term;
use crate::logic::term::Term;

/// Variable name -> value, for the named variables of a query.
pub type Bindings = BTreeMap<String, Term>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub goal: Term,
    /// `var_names[i]` names `Term::Var(i)` in `goal`.
    pub var_names: Vec<String>,
}

impl Query {
    pub fn new(goal: Term, var_names: Vec<String>) -> Self {
        Self { goal, var_names }
    }

    pub fn parse(text: &str) -> Result<Self, ParseError> {
        let parsed = parse_term(text)?;
        Ok(Self::new(parsed.term, parsed.var_names))
    }

    /// Variables reported in solutions: named, and not `_`-prefixed.
    pub fn reported_vars(&self) -> impl Iterator<Item = (usize, &str)> {
        self.var_names
            .iter()
            .enumerate()
            .filter(|(_, name)| !name.starts_with('_'))
            .map(|(id, name)| (id, name.as_str()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryOptions {
    /// Wall-clock limit; `None` lets the query run until it finishes.
    pub budget: Option<Duration>,
    /// Stop after this many solutions; `None` collects all of them.
    pub max_solutions: Option<usize>,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            budget: Some(Duration::from_secs(1)),
            max_solutions: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryOutcome {
    /// The search finished (or hit `max_solutions`). Empty means failure.
    Solutions(Vec<Bindings>),
    /// The budget ran out; `partial` holds what was found before that.
    Timeout { partial: Vec<Bindings> },
}

impl QueryOutcome {
    pub fn is_timeout(&self) -> bool {
        matches!(self, QueryOutcome::Timeout { .. })
    }
}

pub trait LogicEngine {
    fn assert_clause(&mut self, clause: Clause) -> Result<(), EngineFault>;

    /// Remove the first clause equal to `clause`. `Ok(false)` if none was found.
    fn retract_clause(&mut self, clause: &Clause) -> Result<bool, EngineFault>;

    /// Remove every clause of a predicate; returns how many were removed.
    fn retract_all(&mut self, key: &PredicateKey) -> Result<usize, EngineFault>;

    fn clause_count(&self, key: &PredicateKey) -> usize;

    fn query(&mut self, query: &Query, options: &QueryOptions) -> Result<QueryOutcome, EngineFault>;

    fn register_foreign(
        &mut self,
        name: &str,
        arity: usize,
        predicate: Box<dyn ForeignPredicate>,
    ) -> Result<(), EngineFault>;
}

impl<E: LogicEngine + ?Sized> LogicEngine for &mut E {
    fn assert_clause(&mut self, clause: Clause) -> Result<(), EngineFault> {
        (**self).assert_clause(clause)
    }

    fn retract_clause(&mut self, clause: &Clause) -> Result<bool, EngineFault> {
        (**self).retract_clause(clause)
    }

    fn retract_all(&mut self, key: &PredicateKey) -> Result<usize, EngineFault> {
        (**self).retract_all(key)
    }

    fn clause_count(&self, key: &PredicateKey) -> usize {
        (**self).clause_count(key)
    }

    fn query(&mut self, query: &Query, options: &QueryOptions) -> Result<QueryOutcome, EngineFault> {
        (**self).query(query, options)
    }

    fn register_foreign(
        &mut self,
        name: &str,
        arity: usize,
        predicate: Box<dyn ForeignPredicate>,
    ) -> Result<(), EngineFault> {
        (**self).register_foreign(name, arity, predicate)
    }
}
