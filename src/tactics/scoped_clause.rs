//! Clauses that exist for exactly one scope.
//!
//! `ScopedClause` asserts its clauses on construction and retracts them when
//! dropped, so every exit path (including `?` and unwinding) leaves the
//! engine's database as it found it. Guards nest: a second guard can borrow
//! the engine through the first and is dropped before it.

use tracing::warn;

use crate::errors::EngineFault;
use crate::logic::clause::Clause;
use crate::logic::engine::LogicEngine;

pub struct ScopedClause<'e, E: LogicEngine + ?Sized> {
    engine: &'e mut E,
    clauses: Vec<Clause>,
}

impl<'e, E: LogicEngine + ?Sized> ScopedClause<'e, E> {
    pub fn assert(engine: &'e mut E, clause: Clause) -> Result<Self, EngineFault> {
        Self::assert_all(engine, vec![clause])
    }

    /// Assert `clauses` in order. If one is rejected, the ones already
    /// asserted are retracted before the error is returned.
    pub fn assert_all(engine: &'e mut E, clauses: Vec<Clause>) -> Result<Self, EngineFault> {
        let mut scope = Self {
            engine,
            clauses: Vec::with_capacity(clauses.len()),
        };
        for clause in clauses {
            scope.engine.assert_clause(clause.clone())?;
            scope.clauses.push(clause);
        }
        Ok(scope)
    }

    pub fn engine(&mut self) -> &mut E {
        &mut *self.engine
    }

    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }
}

impl<E: LogicEngine + ?Sized> Drop for ScopedClause<'_, E> {
    fn drop(&mut self) {
        while let Some(clause) = self.clauses.pop() {
            match self.engine.retract_clause(&clause) {
                Ok(true) => {}
                Ok(false) => warn!(%clause, "scoped clause was already gone"),
                Err(fault) => warn!(%clause, %fault, "failed to retract scoped clause"),
            }
        }
    }
}
