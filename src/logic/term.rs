//! Logic terms.
//!
//! Terms are immutable and cheap to clone: names are shared `Arc<str>` and
//! compound arguments a shared slice. Variables are plain indices into the
//! binding store of whichever interpreter owns them. Lists are the usual
//! `'.'(Head, Tail)` chains ending in `[]`.

use std::fmt;
use std::sync::Arc;

pub type VarId = usize;

pub const NIL: &str = "[]";
pub const CONS: &str = ".";

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Term {
    Var(VarId),
    Int(i64),
    Atom(Arc<str>),
    Compound(Arc<str>, Arc<[Term]>),
}

impl Term {
    #[inline]
    pub fn atom(name: &str) -> Self {
        Term::Atom(Arc::from(name))
    }

    #[inline]
    pub fn int(value: i64) -> Self {
        Term::Int(value)
    }

    /// A compound term; zero arguments collapse to an atom.
    pub fn compound(name: &str, args: Vec<Term>) -> Self {
        if args.is_empty() {
            Term::atom(name)
        } else {
            Term::Compound(Arc::from(name), Arc::from(args))
        }
    }

    #[inline]
    pub fn nil() -> Self {
        Term::atom(NIL)
    }

    pub fn cons(head: Term, tail: Term) -> Self {
        Term::Compound(Arc::from(CONS), Arc::from(vec![head, tail]))
    }

    pub fn list<I>(items: I) -> Self
    where
        I: IntoIterator<Item = Term>,
        I::IntoIter: DoubleEndedIterator,
    {
        items
            .into_iter()
            .rev()
            .fold(Term::nil(), |tail, head| Term::cons(head, tail))
    }

    /// Elements of a proper list, or `None` for anything else (including
    /// partial lists ending in a variable).
    pub fn list_items(&self) -> Option<Vec<&Term>> {
        let mut items = Vec::new();
        let mut cursor = self;
        loop {
            match cursor {
                Term::Atom(name) if &**name == NIL => return Some(items),
                Term::Compound(name, args) if &**name == CONS && args.len() == 2 => {
                    items.push(&args[0]);
                    cursor = &args[1];
                }
                _ => return None,
            }
        }
    }

    /// Name and arity of an atom (arity 0) or compound.
    pub fn name_arity(&self) -> Option<(&str, usize)> {
        match self {
            Term::Atom(name) => Some((&**name, 0)),
            Term::Compound(name, args) => Some((&**name, args.len())),
            _ => None,
        }
    }

    pub fn args(&self) -> &[Term] {
        match self {
            Term::Compound(_, args) => &args[..],
            _ => &[],
        }
    }

    pub fn as_atom(&self) -> Option<&str> {
        match self {
            Term::Atom(name) => Some(&**name),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Term::Int(value) => Some(*value),
            _ => None,
        }
    }

    pub fn is_callable(&self) -> bool {
        matches!(self, Term::Atom(_) | Term::Compound(..))
    }

    pub fn is_ground(&self) -> bool {
        match self {
            Term::Var(_) => false,
            Term::Int(_) | Term::Atom(_) => true,
            Term::Compound(_, args) => args.iter().all(Term::is_ground),
        }
    }

    /// One past the highest variable index, or 0 for ground terms.
    pub fn var_span(&self) -> usize {
        match self {
            Term::Var(id) => id + 1,
            Term::Int(_) | Term::Atom(_) => 0,
            Term::Compound(_, args) => args.iter().map(Term::var_span).max().unwrap_or(0),
        }
    }

    /// Shift every variable index by `offset` (clause renaming).
    pub fn offset_vars(&self, offset: VarId) -> Term {
        match self {
            Term::Var(id) => Term::Var(id + offset),
            Term::Int(_) | Term::Atom(_) => self.clone(),
            Term::Compound(name, args) => Term::Compound(
                Arc::clone(name),
                args.iter().map(|arg| arg.offset_vars(offset)).collect(),
            ),
        }
    }
}

impl From<&str> for Term {
    fn from(name: &str) -> Self {
        Term::atom(name)
    }
}

impl From<i64> for Term {
    fn from(value: i64) -> Self {
        Term::Int(value)
    }
}

const INFIX_OPERATORS: [&str; 7] = [":-", ";", ",", "=", "\\=", "==", "\\=="];

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Var(id) => write!(f, "_G{id}"),
            Term::Int(value) => write!(f, "{value}"),
            Term::Atom(name) => write_atom(f, name),
            Term::Compound(name, args) => {
                if let Some(items) = self.list_items() {
                    f.write_str("[")?;
                    for (i, item) in items.iter().enumerate() {
                        if i > 0 {
                            f.write_str(",")?;
                        }
                        write!(f, "{item}")?;
                    }
                    return f.write_str("]");
                }
                if args.len() == 2 && INFIX_OPERATORS.contains(&&**name) {
                    let sep = if &**name == "," { "," } else { " " };
                    return write!(f, "({}{sep}{name}{sep}{})", args[0], args[1]);
                }
                write_atom(f, name)?;
                f.write_str("(")?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{arg}")?;
                }
                f.write_str(")")
            }
        }
    }
}

pub(crate) fn is_symbol_char(ch: char) -> bool {
    "+-*/\\^<>=~:.?@#&$".contains(ch)
}

fn write_atom(f: &mut fmt::Formatter<'_>, name: &str) -> fmt::Result {
    let plain = name
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_lowercase())
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    let symbolic = !name.is_empty() && name.chars().all(is_symbol_char);
    if plain || symbolic || matches!(name, "[]" | "!" | ";") {
        f.write_str(name)
    } else {
        write!(f, "'{}'", name.replace('\'', "\\'"))
    }
}

#[cfg(test)]
mod tests {
    use super::Term;

    #[test]
    fn lists_build_and_destructure() {
        let list = Term::list(vec![Term::atom("e2"), Term::atom("e4")]);
        let items = list.list_items().expect("proper list");
        assert_eq!(items.len(), 2);
        assert_eq!(items[1].as_atom(), Some("e4"));
        assert_eq!(list.to_string(), "[e2,e4]");

        let partial = Term::cons(Term::atom("a"), Term::Var(0));
        assert!(partial.list_items().is_none());
        assert!(!partial.is_ground());
    }

    #[test]
    fn display_quotes_only_when_needed() {
        let fact = Term::compound(
            "contents",
            vec![
                Term::compound("piece", vec![Term::atom("rook"), Term::atom("white")]),
                Term::compound("square", vec![Term::atom("a1")]),
            ],
        );
        assert_eq!(fact.to_string(), "contents(piece(rook,white),square(a1))");
        assert_eq!(Term::atom("Hello world").to_string(), "'Hello world'");
        assert_eq!(Term::compound("\\+", vec![Term::atom("x")]).to_string(), "\\+(x)");
        assert_eq!(
            Term::compound(",", vec![Term::atom("a"), Term::Var(3)]).to_string(),
            "(a,_G3)"
        );
    }

    #[test]
    fn renaming_shifts_every_variable() {
        let term = Term::compound("f", vec![Term::Var(0), Term::list(vec![Term::Var(2)])]);
        assert_eq!(term.var_span(), 3);
        let shifted = term.offset_vars(10);
        assert_eq!(shifted.var_span(), 13);
        assert_eq!(shifted.args()[0], Term::Var(10));
    }
}
