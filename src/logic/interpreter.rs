//! Reference logic engine.
//!
//! Depth-first SLD resolution over an explicit choice-point stack. Goals are
//! kept in a shared linked continuation so pushing a choice point is O(1);
//! variables live in one binding vector per query with a trail for undo.
//!
//! Supported control: `true`, `fail`/`false`, `!`, `,`, `;`, `\+`, `call/1`,
//! `=`, `\=`, `==`, `\==`, `var/1`, `nonvar/1`, and `sleep/1` (whole seconds,
//! interrupted by the query deadline). Everything else is either a foreign
//! predicate or a user predicate in the clause database.
//!
//! Each call sees the clause list as it was when the call started, so
//! retracting a clause never disturbs a running enumeration.

use std::collections::HashMap;
use std::rc::Rc;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, trace, warn};

use crate::errors::EngineFault;
use crate::logic::clause::{Clause, PredicateKey};
use crate::logic::engine::{Bindings, LogicEngine, Query, QueryOptions, QueryOutcome};
use crate::logic::foreign::{ForeignContext, ForeignControl, ForeignPredicate, ForeignReply};
use crate::logic::parser::parse_program;
use crate::logic::term::{Term, VarId};

/// Goals between two wall-clock checks.
const DEADLINE_CHECK_INTERVAL: u64 = 64;

const BUILTINS: [(&str, usize); 15] = [
    ("true", 0),
    ("fail", 0),
    ("false", 0),
    ("!", 0),
    (",", 2),
    (";", 2),
    ("\\+", 1),
    ("call", 1),
    ("=", 2),
    ("\\=", 2),
    ("==", 2),
    ("\\==", 2),
    ("var", 1),
    ("nonvar", 1),
    ("sleep", 1),
];

fn is_builtin(key: &PredicateKey) -> bool {
    BUILTINS
        .iter()
        .any(|&(name, arity)| key.name == name && key.arity == arity)
}

type ClauseList = Arc<Vec<Arc<Clause>>>;

#[derive(Default)]
pub struct Interpreter {
    database: HashMap<PredicateKey, ClauseList>,
    foreign: HashMap<PredicateKey, Box<dyn ForeignPredicate>>,
}

impl Interpreter {
    pub fn new() -> Self {
        Self::default()
    }

    /// An interpreter with the chess prelude already loaded.
    pub fn with_prelude() -> Result<Self, EngineFault> {
        let mut interpreter = Self::new();
        crate::logic::prelude::load_prelude(&mut interpreter)?;
        Ok(interpreter)
    }

    /// Assert every clause in `program`, in order.
    pub fn consult(&mut self, program: &str) -> Result<usize, EngineFault> {
        let clauses = parse_program(program)?;
        let count = clauses.len();
        for clause in clauses {
            self.assert_clause(clause)?;
        }
        Ok(count)
    }

    pub fn clauses(&self, key: &PredicateKey) -> Vec<Arc<Clause>> {
        self.database
            .get(key)
            .map(|clauses| clauses.iter().cloned().collect())
            .unwrap_or_default()
    }

    fn check_modifiable(&self, key: &PredicateKey) -> Result<(), EngineFault> {
        let reason = if is_builtin(key) {
            "control construct"
        } else if self.foreign.contains_key(key) {
            "foreign predicate"
        } else {
            return Ok(());
        };
        Err(EngineFault::PermissionError {
            name: key.name.clone(),
            arity: key.arity,
            reason: reason.to_owned(),
        })
    }
}

impl LogicEngine for Interpreter {
    fn assert_clause(&mut self, clause: Clause) -> Result<(), EngineFault> {
        let key = clause.key();
        self.check_modifiable(&key)?;
        trace!(%clause, "assert");
        Arc::make_mut(self.database.entry(key).or_default()).push(Arc::new(clause));
        Ok(())
    }

    fn retract_clause(&mut self, clause: &Clause) -> Result<bool, EngineFault> {
        let key = clause.key();
        self.check_modifiable(&key)?;
        let Some(clauses) = self.database.get_mut(&key) else {
            return Ok(false);
        };
        match clauses.iter().position(|existing| **existing == *clause) {
            Some(index) => {
                Arc::make_mut(clauses).remove(index);
                trace!(%clause, "retract");
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn retract_all(&mut self, key: &PredicateKey) -> Result<usize, EngineFault> {
        self.check_modifiable(key)?;
        Ok(match self.database.get_mut(key) {
            Some(clauses) => {
                let removed = clauses.len();
                *clauses = Arc::default();
                removed
            }
            None => 0,
        })
    }

    fn clause_count(&self, key: &PredicateKey) -> usize {
        self.database.get(key).map_or(0, |clauses| clauses.len())
    }

    fn query(&mut self, query: &Query, options: &QueryOptions) -> Result<QueryOutcome, EngineFault> {
        let var_count = query.var_names.len().max(query.goal.var_span());
        let mut machine = Machine {
            database: &self.database,
            foreign: &mut self.foreign,
            bindings: vec![None; var_count],
            trail: Vec::new(),
            choices: Vec::new(),
            deadline: options.budget.and_then(|budget| Instant::now().checked_add(budget)),
            steps: 0,
        };

        let started = Instant::now();
        let result = machine.solve(query, options.max_solutions);
        match &result {
            Ok(QueryOutcome::Solutions(solutions)) => debug!(
                goal = %query.goal,
                solutions = solutions.len(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "query finished"
            ),
            Ok(QueryOutcome::Timeout { partial }) => debug!(
                goal = %query.goal,
                partial = partial.len(),
                "query ran out of time"
            ),
            Err(fault) => debug!(goal = %query.goal, %fault, "query faulted"),
        }
        result
    }

    fn register_foreign(
        &mut self,
        name: &str,
        arity: usize,
        predicate: Box<dyn ForeignPredicate>,
    ) -> Result<(), EngineFault> {
        let key = PredicateKey::new(name, arity);
        if is_builtin(&key) || self.clause_count(&key) > 0 {
            return Err(EngineFault::PermissionError {
                name: key.name,
                arity,
                reason: "already defined".to_owned(),
            });
        }
        self.database.remove(&key);
        self.foreign.insert(key, predicate);
        Ok(())
    }
}

enum Goal {
    Call(Term),
    /// Discard every choice point above this height.
    CutTo(usize),
}

struct Frame {
    goal: Goal,
    /// Height `!` cuts back to.
    barrier: usize,
}

struct GoalNode {
    frame: Frame,
    next: Continuation,
}

type Continuation = Option<Rc<GoalNode>>;

/// Unlinks the tail one node at a time; left recursion can leave chains far
/// deeper than the call stack.
impl Drop for GoalNode {
    fn drop(&mut self) {
        let mut next = self.next.take();
        while let Some(node) = next {
            match Rc::try_unwrap(node) {
                Ok(mut node) => next = node.next.take(),
                Err(_) => break,
            }
        }
    }
}

fn push_goal(next: &Continuation, goal: Goal, barrier: usize) -> Continuation {
    Some(Rc::new(GoalNode {
        frame: Frame { goal, barrier },
        next: next.clone(),
    }))
}

enum Alternative {
    Clauses {
        goal: Term,
        clauses: ClauseList,
        next: usize,
    },
    Foreign {
        key: PredicateKey,
        args: Vec<Term>,
        context: ForeignContext,
    },
    Resume {
        goal: Term,
        barrier: usize,
    },
}

struct ChoicePoint {
    alternative: Alternative,
    continuation: Continuation,
    trail_mark: usize,
    var_top: usize,
}

enum Step {
    Continue(Continuation),
    Fail,
    Timeout,
}

struct Machine<'a> {
    database: &'a HashMap<PredicateKey, ClauseList>,
    foreign: &'a mut HashMap<PredicateKey, Box<dyn ForeignPredicate>>,
    bindings: Vec<Option<Term>>,
    trail: Vec<VarId>,
    choices: Vec<ChoicePoint>,
    deadline: Option<Instant>,
    steps: u64,
}

impl Machine<'_> {
    fn solve(&mut self, query: &Query, max_solutions: Option<usize>) -> Result<QueryOutcome, EngineFault> {
        let mut solutions = Vec::new();
        if max_solutions == Some(0) {
            return Ok(QueryOutcome::Solutions(solutions));
        }

        let mut continuation = push_goal(&None, Goal::Call(query.goal.clone()), 0);
        loop {
            let step = match self.next_step(continuation) {
                Ok(step) => step,
                Err(fault) => {
                    self.prune_to(0);
                    return Err(fault);
                }
            };

            let step = match step {
                Some(step) => step,
                None => {
                    solutions.push(self.solution(query));
                    if max_solutions.is_some_and(|max| solutions.len() >= max) {
                        self.prune_to(0);
                        return Ok(QueryOutcome::Solutions(solutions));
                    }
                    Step::Fail
                }
            };

            let step = match step {
                Step::Fail => match self.backtrack() {
                    Ok(step) => step,
                    Err(fault) => {
                        self.prune_to(0);
                        return Err(fault);
                    }
                },
                other => other,
            };

            match step {
                Step::Continue(next) => continuation = next,
                Step::Fail => return Ok(QueryOutcome::Solutions(solutions)),
                Step::Timeout => {
                    self.prune_to(0);
                    return Ok(QueryOutcome::Timeout { partial: solutions });
                }
            }
        }
    }

    /// Run the first goal of `continuation`; `None` means it was empty (a
    /// solution).
    fn next_step(&mut self, continuation: Continuation) -> Result<Option<Step>, EngineFault> {
        let Some(node) = continuation else {
            return Ok(None);
        };

        self.steps += 1;
        if self.steps % DEADLINE_CHECK_INTERVAL == 0 && self.expired() {
            return Ok(Some(Step::Timeout));
        }

        let rest = &node.next;
        match &node.frame.goal {
            Goal::CutTo(height) => {
                self.prune_to(*height);
                Ok(Some(Step::Continue(rest.clone())))
            }
            Goal::Call(term) => self.call(term, node.frame.barrier, rest).map(Some),
        }
    }

    fn expired(&self) -> bool {
        self.deadline.is_some_and(|deadline| Instant::now() >= deadline)
    }

    fn call(&mut self, term: &Term, barrier: usize, rest: &Continuation) -> Result<Step, EngineFault> {
        let goal = self.deref(term);
        let (name, arity) = match &goal {
            Term::Var(_) => {
                return Err(EngineFault::Instantiation {
                    predicate: "call/1".to_owned(),
                })
            }
            Term::Int(_) => {
                return Err(EngineFault::TypeError {
                    expected: "callable".to_owned(),
                    found: goal.to_string(),
                })
            }
            Term::Atom(_) | Term::Compound(..) => goal.name_arity().unwrap_or(("", 0)),
        };
        let args = goal.args();

        let proceed = |ok: bool| if ok { Step::Continue(rest.clone()) } else { Step::Fail };

        Ok(match (name, arity) {
            ("true", 0) => Step::Continue(rest.clone()),
            ("fail", 0) | ("false", 0) => Step::Fail,
            ("!", 0) => {
                self.prune_to(barrier);
                Step::Continue(rest.clone())
            }
            (",", 2) => {
                let after = push_goal(rest, Goal::Call(args[1].clone()), barrier);
                Step::Continue(push_goal(&after, Goal::Call(args[0].clone()), barrier))
            }
            (";", 2) => {
                self.push_choice(
                    Alternative::Resume {
                        goal: args[1].clone(),
                        barrier,
                    },
                    rest.clone(),
                );
                Step::Continue(push_goal(rest, Goal::Call(args[0].clone()), barrier))
            }
            ("\\+", 1) => {
                // (G, !, fail ; true) with the cut local to the negation.
                let height = self.choices.len();
                self.push_choice(
                    Alternative::Resume {
                        goal: Term::atom("true"),
                        barrier,
                    },
                    rest.clone(),
                );
                let fail = push_goal(&None, Goal::Call(Term::atom("fail")), 0);
                let cut = push_goal(&fail, Goal::CutTo(height), 0);
                Step::Continue(push_goal(&cut, Goal::Call(args[0].clone()), height + 1))
            }
            ("call", 1) => {
                let height = self.choices.len();
                Step::Continue(push_goal(rest, Goal::Call(args[0].clone()), height))
            }
            ("=", 2) => proceed(self.unify(&args[0], &args[1])),
            ("\\=", 2) => {
                let mark = self.trail.len();
                let unifiable = self.unify(&args[0], &args[1]);
                self.undo_to(mark);
                proceed(!unifiable)
            }
            ("==", 2) => proceed(self.resolve(&args[0]) == self.resolve(&args[1])),
            ("\\==", 2) => proceed(self.resolve(&args[0]) != self.resolve(&args[1])),
            ("var", 1) => proceed(matches!(self.deref(&args[0]), Term::Var(_))),
            ("nonvar", 1) => proceed(!matches!(self.deref(&args[0]), Term::Var(_))),
            ("sleep", 1) => self.sleep(&args[0], rest)?,
            _ => {
                let key = PredicateKey::new(name, arity);
                if self.foreign.contains_key(&key) {
                    self.call_foreign(key, args, rest)?
                } else if let Some(clauses) = self.database.get(&key) {
                    let clauses = Arc::clone(clauses);
                    let height = self.choices.len();
                    self.try_clauses(goal.clone(), clauses, 0, rest, height)
                } else {
                    return Err(EngineFault::UnknownPredicate {
                        name: key.name,
                        arity,
                    });
                }
            }
        })
    }

    fn sleep(&mut self, seconds: &Term, rest: &Continuation) -> Result<Step, EngineFault> {
        let seconds = match self.deref(seconds) {
            Term::Int(n) if n >= 0 => n as u64,
            Term::Var(_) => {
                return Err(EngineFault::Instantiation {
                    predicate: "sleep/1".to_owned(),
                })
            }
            other => {
                return Err(EngineFault::TypeError {
                    expected: "non-negative integer".to_owned(),
                    found: other.to_string(),
                })
            }
        };

        let wanted = Duration::from_secs(seconds);
        let now = Instant::now();
        let end = now.checked_add(wanted);
        match self.deadline {
            Some(deadline) if end.map_or(true, |end| end >= deadline) => {
                std::thread::sleep(deadline.saturating_duration_since(now));
                Ok(Step::Timeout)
            }
            Some(_) => {
                std::thread::sleep(wanted);
                Ok(Step::Continue(rest.clone()))
            }
            None if end.is_none() => Err(EngineFault::TypeError {
                expected: "sleep duration within the clock range".to_owned(),
                found: seconds.to_string(),
            }),
            None => {
                std::thread::sleep(wanted);
                Ok(Step::Continue(rest.clone()))
            }
        }
    }

    fn try_clauses(
        &mut self,
        goal: Term,
        clauses: ClauseList,
        start: usize,
        rest: &Continuation,
        barrier: usize,
    ) -> Step {
        for index in start..clauses.len() {
            let clause = &clauses[index];
            let trail_mark = self.trail.len();
            let var_top = self.bindings.len();
            let (head, body) = clause.renamed(var_top);
            self.bindings.resize(var_top + clause.var_count, None);

            if self.unify(&head, &goal) {
                if index + 1 < clauses.len() {
                    self.choices.push(ChoicePoint {
                        alternative: Alternative::Clauses {
                            goal,
                            clauses: Arc::clone(&clauses),
                            next: index + 1,
                        },
                        continuation: rest.clone(),
                        trail_mark,
                        var_top,
                    });
                }
                return Step::Continue(push_goal(rest, Goal::Call(body), barrier));
            }

            self.undo_to(trail_mark);
            self.bindings.truncate(var_top);
        }
        Step::Fail
    }

    fn call_foreign(
        &mut self,
        key: PredicateKey,
        args: &[Term],
        rest: &Continuation,
    ) -> Result<Step, EngineFault> {
        let args: Vec<Term> = args.iter().map(|arg| self.resolve(arg)).collect();
        let reply = self.invoke_foreign(&key, &args, ForeignControl::FirstCall)?;
        self.foreign_reply(key, args, reply, rest)
    }

    fn invoke_foreign(
        &mut self,
        key: &PredicateKey,
        args: &[Term],
        control: ForeignControl,
    ) -> Result<ForeignReply, EngineFault> {
        match self.foreign.get_mut(key) {
            Some(predicate) => predicate.call(args, control),
            None => Err(EngineFault::UnknownPredicate {
                name: key.name.clone(),
                arity: key.arity,
            }),
        }
    }

    fn foreign_reply(
        &mut self,
        key: PredicateKey,
        args: Vec<Term>,
        reply: ForeignReply,
        rest: &Continuation,
    ) -> Result<Step, EngineFault> {
        let values = match reply {
            ForeignReply::Fail => return Ok(Step::Fail),
            ForeignReply::Exit(values) => values,
            ForeignReply::Retry(values, context) => {
                // Registered before unifying so a mismatch backtracks into the redo.
                self.push_choice(
                    Alternative::Foreign {
                        key: key.clone(),
                        args: args.clone(),
                        context,
                    },
                    rest.clone(),
                );
                values
            }
        };

        if values.len() != args.len() {
            return Err(EngineFault::Foreign {
                predicate: key.to_string(),
                reason: format!("returned {} values for {} arguments", values.len(), args.len()),
            });
        }
        let unified = args
            .iter()
            .zip(values.iter())
            .all(|(arg, value)| self.unify(arg, value));
        Ok(if unified {
            Step::Continue(rest.clone())
        } else {
            Step::Fail
        })
    }

    fn push_choice(&mut self, alternative: Alternative, continuation: Continuation) {
        self.choices.push(ChoicePoint {
            alternative,
            continuation,
            trail_mark: self.trail.len(),
            var_top: self.bindings.len(),
        });
    }

    /// Resume the most recent choice point that still has an alternative.
    fn backtrack(&mut self) -> Result<Step, EngineFault> {
        while let Some(choice) = self.choices.pop() {
            if self.expired() {
                // Put it back so the caller's prune reaches it.
                self.choices.push(choice);
                return Ok(Step::Timeout);
            }

            self.undo_to(choice.trail_mark);
            self.bindings.truncate(choice.var_top);
            let rest = choice.continuation;

            let step = match choice.alternative {
                Alternative::Resume { goal, barrier } => {
                    Step::Continue(push_goal(&rest, Goal::Call(goal), barrier))
                }
                Alternative::Clauses {
                    goal,
                    clauses,
                    next,
                } => {
                    let height = self.choices.len();
                    self.try_clauses(goal, clauses, next, &rest, height)
                }
                Alternative::Foreign { key, args, context } => {
                    let reply = self.invoke_foreign(&key, &args, ForeignControl::Redo(context))?;
                    self.foreign_reply(key, args, reply, &rest)?
                }
            };

            if let Step::Fail = step {
                continue;
            }
            return Ok(step);
        }
        Ok(Step::Fail)
    }

    /// Drop choice points above `height`, telling foreign ones they are gone.
    fn prune_to(&mut self, height: usize) {
        while self.choices.len() > height {
            let Some(choice) = self.choices.pop() else {
                break;
            };
            if let Alternative::Foreign { key, args, context } = choice.alternative {
                if let Err(fault) = self.invoke_foreign(&key, &args, ForeignControl::Pruned(context)) {
                    warn!(predicate = %key, %fault, "foreign predicate failed to release its choice point");
                }
            }
        }
    }

    fn solution(&self, query: &Query) -> Bindings {
        query
            .reported_vars()
            .map(|(id, name)| (name.to_owned(), self.resolve(&Term::Var(id))))
            .collect()
    }

    fn deref(&self, term: &Term) -> Term {
        let mut current = term.clone();
        while let Term::Var(id) = &current {
            let id = *id;
            match self.bindings.get(id) {
                Some(Some(value)) => current = value.clone(),
                _ => break,
            }
        }
        current
    }

    fn resolve(&self, term: &Term) -> Term {
        match self.deref(term) {
            Term::Compound(name, args) => {
                Term::Compound(name, args.iter().map(|arg| self.resolve(arg)).collect())
            }
            other => other,
        }
    }

    fn bind(&mut self, var: VarId, value: Term) {
        if var >= self.bindings.len() {
            self.bindings.resize(var + 1, None);
        }
        self.bindings[var] = Some(value);
        self.trail.push(var);
    }

    fn undo_to(&mut self, mark: usize) {
        while self.trail.len() > mark {
            if let Some(var) = self.trail.pop() {
                if let Some(slot) = self.bindings.get_mut(var) {
                    *slot = None;
                }
            }
        }
    }

    fn unify(&mut self, left: &Term, right: &Term) -> bool {
        let left = self.deref(left);
        let right = self.deref(right);
        match (&left, &right) {
            (Term::Var(a), Term::Var(b)) if a == b => true,
            // Younger variable points at the older one.
            (Term::Var(a), Term::Var(b)) if a < b => {
                self.bind(*b, left.clone());
                true
            }
            (Term::Var(a), _) => {
                self.bind(*a, right.clone());
                true
            }
            (_, Term::Var(b)) => {
                self.bind(*b, left.clone());
                true
            }
            (Term::Int(a), Term::Int(b)) => a == b,
            (Term::Atom(a), Term::Atom(b)) => a == b,
            (Term::Compound(f, xs), Term::Compound(g, ys)) => {
                f == g
                    && xs.len() == ys.len()
                    && xs.iter().zip(ys.iter()).all(|(x, y)| self.unify(x, y))
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    use super::Interpreter;
    use crate::errors::EngineFault;
    use crate::logic::clause::{Clause, PredicateKey};
    use crate::logic::engine::{LogicEngine, Query, QueryOptions, QueryOutcome};
    use crate::logic::foreign::{
        Deterministic, ForeignContext, ForeignControl, ForeignPredicate, ForeignReply,
    };
    use crate::logic::term::Term;

    fn run(engine: &mut Interpreter, text: &str) -> Vec<String> {
        let query = Query::parse(text).expect("query should parse");
        match engine.query(&query, &QueryOptions::default()).expect("query should run") {
            QueryOutcome::Solutions(solutions) => solutions
                .iter()
                .map(|bindings| {
                    bindings
                        .iter()
                        .map(|(name, value)| format!("{name}={value}"))
                        .collect::<Vec<_>>()
                        .join(" ")
                })
                .collect(),
            QueryOutcome::Timeout { .. } => panic!("unexpected timeout for {text}"),
        }
    }

    #[test]
    fn resolution_backtracks_through_clauses_in_order() {
        let mut engine = Interpreter::with_prelude().expect("prelude should load");
        engine
            .consult("edge(a, b). edge(b, c). edge(a, d).\npath(X, Y) :- edge(X, Y).\npath(X, Y) :- edge(X, Z), path(Z, Y).")
            .expect("program should load");
        assert_eq!(run(&mut engine, "path(a, Y)"), vec!["Y=b", "Y=d", "Y=c"]);
        assert_eq!(run(&mut engine, "member(X, [1, 2])"), vec!["X=1", "X=2"]);
    }

    #[test]
    fn cut_negation_and_disjunction() {
        let mut engine = Interpreter::with_prelude().expect("prelude should load");
        engine
            .consult("first(X, L) :- member(X, L), !.\nnot_member(X, L) :- \\+ member(X, L).")
            .expect("program should load");
        assert_eq!(run(&mut engine, "first(X, [p, q, r])"), vec!["X=p"]);
        assert_eq!(run(&mut engine, "not_member(z, [p, q])"), vec![""]);
        assert!(run(&mut engine, "not_member(p, [p, q])").is_empty());
        assert_eq!(run(&mut engine, "(X = 1 ; X = 2)"), vec!["X=1", "X=2"]);
        assert!(run(&mut engine, "X = f(Y), X \\= f(1)").is_empty());
        assert_eq!(run(&mut engine, "X == X, X \\== Y"), vec!["X=_G0 Y=_G1"]);
    }

    #[test]
    fn max_solutions_stops_early() {
        let mut engine = Interpreter::with_prelude().expect("prelude should load");
        let query = Query::parse("member(X, [a, b, c])").expect("should parse");
        let options = QueryOptions {
            max_solutions: Some(2),
            ..QueryOptions::default()
        };
        match engine.query(&query, &options).expect("should run") {
            QueryOutcome::Solutions(solutions) => assert_eq!(solutions.len(), 2),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn unknown_predicates_and_protected_keys_fault() {
        let mut engine = Interpreter::new();
        let query = Query::parse("missing(1)").expect("should parse");
        assert_eq!(
            engine.query(&query, &QueryOptions::default()),
            Err(EngineFault::UnknownPredicate {
                name: "missing".to_owned(),
                arity: 1
            })
        );

        let clause = Clause::parse("true.").expect("should parse");
        assert!(matches!(
            engine.assert_clause(clause),
            Err(EngineFault::PermissionError { .. })
        ));
    }

    #[test]
    fn retracted_predicates_fail_instead_of_faulting() {
        let mut engine = Interpreter::new();
        let clause = Clause::parse("tactic(x).").expect("should parse");
        engine.assert_clause(clause.clone()).expect("assert");
        assert_eq!(run(&mut engine, "tactic(X)"), vec!["X=x"]);
        assert!(engine.retract_clause(&clause).expect("retract"));
        assert!(!engine.retract_clause(&clause).expect("second retract"));
        assert_eq!(engine.clause_count(&PredicateKey::new("tactic", 1)), 0);
        assert!(run(&mut engine, "tactic(X)").is_empty());
    }

    #[test]
    fn busy_loops_and_sleeps_time_out() {
        let mut engine = Interpreter::new();
        engine.consult("spin :- spin.").expect("program should load");
        let options = QueryOptions {
            budget: Some(Duration::from_millis(50)),
            max_solutions: None,
        };

        for text in ["spin", "sleep(5)"] {
            let started = Instant::now();
            let outcome = engine
                .query(&Query::parse(text).expect("should parse"), &options)
                .expect("should run");
            assert!(outcome.is_timeout(), "{text}");
            assert!(started.elapsed() < Duration::from_secs(2), "{text}");
        }
    }

    #[test]
    fn deep_left_recursion_times_out_cleanly() {
        let mut engine = Interpreter::new();
        engine.consult("grow :- grow, true.").expect("program should load");
        let options = QueryOptions {
            budget: Some(Duration::from_millis(300)),
            max_solutions: None,
        };
        let outcome = engine
            .query(&Query::parse("grow").expect("should parse"), &options)
            .expect("should run");
        assert!(outcome.is_timeout());
        assert_eq!(run(&mut engine, "X = 1"), vec!["X=1"]);
    }

    #[test]
    fn oversized_sleeps_stop_at_the_deadline_or_fault() {
        let mut engine = Interpreter::new();
        let query = Query::parse("sleep(9223372036854775807)").expect("should parse");

        let bounded = QueryOptions {
            budget: Some(Duration::from_millis(50)),
            max_solutions: None,
        };
        let started = Instant::now();
        assert!(engine.query(&query, &bounded).expect("should run").is_timeout());
        assert!(started.elapsed() < Duration::from_secs(2));

        let unbounded = QueryOptions {
            budget: None,
            max_solutions: None,
        };
        assert!(matches!(
            engine.query(&query, &unbounded),
            Err(EngineFault::TypeError { .. })
        ));
    }

    #[test]
    fn no_budget_runs_to_completion() {
        let mut engine = Interpreter::new();
        engine
            .consult("count(0). count(s(N)) :- count(N).")
            .expect("program should load");
        let options = QueryOptions {
            budget: None,
            max_solutions: Some(3),
        };
        match engine
            .query(&Query::parse("count(N)").expect("should parse"), &options)
            .expect("should run")
        {
            QueryOutcome::Solutions(solutions) => assert_eq!(solutions.len(), 3),
            other => panic!("unexpected {other:?}"),
        }
    }

    /// Yields 0..limit and records how its choice point ended.
    struct Counter {
        limit: i64,
        pruned: Arc<AtomicUsize>,
    }

    impl ForeignPredicate for Counter {
        fn call(
            &mut self,
            _args: &[Term],
            control: ForeignControl,
        ) -> Result<ForeignReply, EngineFault> {
            let index = match control {
                ForeignControl::FirstCall => 0,
                ForeignControl::Redo(context) => context.index + 1,
                ForeignControl::Pruned(_) => {
                    self.pruned.fetch_add(1, Ordering::SeqCst);
                    return Ok(ForeignReply::Fail);
                }
            };
            if index as i64 >= self.limit {
                return Ok(ForeignReply::Fail);
            }
            Ok(ForeignReply::Retry(
                vec![Term::Int(index as i64)],
                ForeignContext { handle: 7, index },
            ))
        }
    }

    #[test]
    fn foreign_choice_points_redo_and_are_pruned_by_cut() {
        let pruned = Arc::new(AtomicUsize::new(0));
        let mut engine = Interpreter::new();
        engine
            .register_foreign(
                "count",
                1,
                Box::new(Counter {
                    limit: 3,
                    pruned: Arc::clone(&pruned),
                }),
            )
            .expect("register");
        engine.consult("first_count(N) :- count(N), !.").expect("program should load");

        assert_eq!(run(&mut engine, "count(N)"), vec!["N=0", "N=1", "N=2"]);
        assert_eq!(pruned.load(Ordering::SeqCst), 0);

        assert_eq!(run(&mut engine, "count(1)"), vec![""]);
        assert_eq!(pruned.load(Ordering::SeqCst), 0);

        assert_eq!(run(&mut engine, "first_count(N)"), vec!["N=0"]);
        assert_eq!(pruned.load(Ordering::SeqCst), 1);

        let clause = Clause::parse("count(9).").expect("should parse");
        assert!(matches!(
            engine.assert_clause(clause),
            Err(EngineFault::PermissionError { .. })
        ));
    }

    #[test]
    fn deterministic_adapter() {
        let mut engine = Interpreter::new();
        engine
            .register_foreign(
                "double",
                2,
                Box::new(Deterministic(
                    |args: &[Term]| -> Result<Option<Vec<Term>>, EngineFault> {
                        Ok(args[0].as_int().map(|n| vec![Term::Int(n), Term::Int(n * 2)]))
                    },
                )),
            )
            .expect("register");
        assert_eq!(run(&mut engine, "double(21, X)"), vec!["X=42"]);
        assert!(run(&mut engine, "double(a, X)").is_empty());
    }

    #[test]
    fn interpreter_is_send() {
        fn assert_send<T: Send>() {}
        assert_send::<Interpreter>();
    }
}
