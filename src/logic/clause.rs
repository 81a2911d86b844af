use std::fmt;

use crate::errors::{EngineFault, ParseError};
use crate::logic::parser::parse_clause;
use crate::logic::term::Term;

/// Predicate indicator: `name/arity`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PredicateKey {
    pub name: String,
    pub arity: usize,
}

impl PredicateKey {
    pub fn new(name: impl Into<String>, arity: usize) -> Self {
        Self {
            name: name.into(),
            arity,
        }
    }

    /// Key of a callable term, `None` for variables and integers.
    pub fn of(term: &Term) -> Option<Self> {
        term.name_arity().map(|(name, arity)| Self::new(name, arity))
    }
}

impl fmt::Display for PredicateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.name, self.arity)
    }
}

/// `Head :- Body`, with variables numbered `0..var_count`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clause {
    pub head: Term,
    pub body: Term,
    pub var_count: usize,
}

impl Clause {
    pub fn new(head: Term, body: Term) -> Result<Self, EngineFault> {
        let var_count = head.var_span().max(body.var_span());
        Self::with_var_count(head, body, var_count)
    }

    pub fn fact(head: Term) -> Result<Self, EngineFault> {
        Self::new(head, Term::atom("true"))
    }

    pub fn parse(text: &str) -> Result<Self, ParseError> {
        parse_clause(text)
    }

    /// Split a parsed `:-` term into head and body.
    pub fn from_term(term: Term, var_count: usize) -> Result<Self, EngineFault> {
        match term.name_arity() {
            Some((":-", 2)) => {
                let args = term.args();
                Self::with_var_count(args[0].clone(), args[1].clone(), var_count)
            }
            _ => Self::with_var_count(term, Term::atom("true"), var_count),
        }
    }

    fn with_var_count(head: Term, body: Term, var_count: usize) -> Result<Self, EngineFault> {
        if !head.is_callable() {
            return Err(EngineFault::TypeError {
                expected: "callable clause head".to_owned(),
                found: head.to_string(),
            });
        }
        if !matches!(body, Term::Var(_)) && !body.is_callable() {
            return Err(EngineFault::TypeError {
                expected: "callable clause body".to_owned(),
                found: body.to_string(),
            });
        }
        Ok(Self {
            head,
            body,
            var_count,
        })
    }

    pub fn key(&self) -> PredicateKey {
        // Heads are checked to be callable on construction.
        PredicateKey::of(&self.head).unwrap_or_else(|| PredicateKey::new("", 0))
    }

    pub fn is_fact(&self) -> bool {
        self.body == Term::atom("true")
    }

    /// Head and body with every variable shifted past `offset`.
    pub fn renamed(&self, offset: usize) -> (Term, Term) {
        (self.head.offset_vars(offset), self.body.offset_vars(offset))
    }
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_fact() {
            write!(f, "{}.", self.head)
        } else {
            write!(f, "{} :- {}.", self.head, self.body)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Clause, PredicateKey};
    use crate::logic::term::Term;

    #[test]
    fn display_round_trips_through_the_parser() {
        let clause = Clause::parse("pin(Pos, F, T) :- legal_move(F, T, Pos), \\+ F == T.")
            .expect("clause should parse");
        assert_eq!(clause.key(), PredicateKey::new("pin", 3));
        let reparsed = Clause::parse(&clause.to_string()).expect("printed clause should parse");
        assert_eq!(reparsed, clause);
    }

    #[test]
    fn heads_must_be_callable() {
        assert!(Clause::fact(Term::Int(3)).is_err());
        assert!(Clause::fact(Term::Var(0)).is_err());
        let fact = Clause::fact(Term::compound("turn", vec![Term::atom("white")]))
            .expect("fact should build");
        assert!(fact.is_fact());
        assert_eq!(fact.to_string(), "turn(white).");
    }
}
