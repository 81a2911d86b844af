//! Host-implemented predicates.
//!
//! A foreign predicate is driven through three control states, mirroring how
//! a native nondeterministic predicate behaves:
//!
//! - `FirstCall`: a fresh call. The predicate may fail, succeed once (`Exit`),
//!   or succeed and leave a choice point behind (`Retry`) carrying an opaque
//!   context of its own choosing.
//! - `Redo(ctx)`: the solver backtracked into that choice point. The context
//!   is the one returned by the previous `Retry`.
//! - `Pruned(ctx)`: the choice point was discarded (cut, timeout, or the
//!   query finished). Nothing will ever resume it again; release its state.
//!
//! The solver passes the call's arguments with every current binding
//! substituted, and unifies the returned terms positionally with them.

use crate::errors::EngineFault;
use crate::logic::term::Term;

/// Opaque resume state handed back to the predicate on redo/prune.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ForeignContext {
    pub handle: u64,
    pub index: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForeignControl {
    FirstCall,
    Redo(ForeignContext),
    Pruned(ForeignContext),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ForeignReply {
    Fail,
    /// Succeed deterministically; one term per argument.
    Exit(Vec<Term>),
    /// Succeed and keep a choice point; one term per argument.
    Retry(Vec<Term>, ForeignContext),
}

pub trait ForeignPredicate: Send {
    /// The reply to a `Pruned` call is ignored.
    fn call(&mut self, args: &[Term], control: ForeignControl)
        -> Result<ForeignReply, EngineFault>;
}

/// Adapter so simple deterministic predicates can be registered as closures.
pub struct Deterministic<F>(pub F);

impl<F> ForeignPredicate for Deterministic<F>
where
    F: FnMut(&[Term]) -> Result<Option<Vec<Term>>, EngineFault> + Send,
{
    fn call(
        &mut self,
        args: &[Term],
        control: ForeignControl,
    ) -> Result<ForeignReply, EngineFault> {
        match control {
            ForeignControl::FirstCall => Ok(match (self.0)(args)? {
                Some(values) => ForeignReply::Exit(values),
                None => ForeignReply::Fail,
            }),
            ForeignControl::Redo(_) | ForeignControl::Pruned(_) => Ok(ForeignReply::Fail),
        }
    }
}
