//! Error types used throughout the tactic tooling.
//!
//! Each subsystem owns one error enum so callers can match on the failure
//! modes that subsystem actually produces:
//! - `NotationError` for FEN, coordinate moves, SAN, PGN, and example records.
//! - `FactError` for the fact / move-term codec. These are never repaired
//!   silently; a term that does not follow the grammar is reported.
//! - `OracleError` for rules-level failures (illegal move, broken position).
//! - `BridgeError` for misuse of the enumeration cursor protocol.
//! - `ParseError` for clause and term text.
//! - `EngineFault` for logic-engine failures that are not timeouts.
//! - `ConfigError` for configuration loading.
//!
//! `TacticsError` wraps all of them for binaries and other top-level callers.
//! Timeouts are deliberately absent: a bounded query that runs out of time is
//! an outcome (`QueryOutcome::Timeout`, `TacticOutcome::Timeout`), not an
//! error, so it can never be confused with a failed match.

use derive_more::{Display, Error, From};

/// Failure to interpret chess notation text.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum NotationError {
    /// Payload: the offending FEN and what was wrong with it.
    #[display("invalid FEN `{fen}`: {reason}")]
    InvalidFen { fen: String, reason: String },

    /// A square name outside `a1..h8`.
    #[display("invalid square `{text}`")]
    InvalidSquare { text: String },

    /// Coordinate or SAN move text that does not name a move in the position.
    #[display("invalid move `{text}`: {reason}")]
    InvalidMove { text: String, reason: String },

    #[display("invalid PGN: {reason}")]
    InvalidPgn { reason: String },

    /// A `fen,uci,label` example row that could not be read.
    ///
    /// Payload: one-based line number within the CSV text.
    #[display("invalid example record on line {line}: {reason}")]
    InvalidRecord { line: usize, reason: String },
}

/// Failure to map between logic terms and chess values.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum FactError {
    /// A known fact kind whose arguments do not follow the grammar.
    #[display("malformed fact `{fact}`: {reason}")]
    MalformedFact { fact: String, reason: String },

    /// A move term that is not `[From, To]` or `[From, To, Piece]`.
    #[display("malformed move `{term}`: {reason}")]
    MalformedMove { term: String, reason: String },

    /// An unrecognised fact kind, reported only under the strict policy.
    #[display("unknown fact kind {functor}/{arity}")]
    UnknownFact { functor: String, arity: usize },

    /// Two facts that cannot both describe one position (two side-to-move
    /// facts, two pieces on one square, ...).
    #[display("conflicting facts `{first}` and `{second}`")]
    ConflictingFacts { first: String, second: String },

    /// A position term that is not a proper list of facts.
    #[display("expected a list of facts, found `{term}`")]
    NotAFactList { term: String },
}

/// Rules-level failure reported by the oracle.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum OracleError {
    #[display("move {mv} is not legal in {fen}")]
    IllegalMove { mv: String, fen: String },

    /// The position cannot be played from (for example the side to move has
    /// no king).
    #[display("invalid position {fen}: {reason}")]
    InvalidPosition { fen: String, reason: String },
}

/// Misuse of the enumeration cursor protocol.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error, From)]
pub enum BridgeError {
    /// The cursor was pruned, exhausted, or never existed. Resuming it is
    /// rejected rather than silently restarting the enumeration.
    #[display("cursor {cursor:#x} is no longer live")]
    StaleCursor { cursor: u64 },

    /// A redo that does not continue from the cursor's current index.
    #[display("cursor {cursor:#x} is at index {expected}, redo asked to resume from {got}")]
    OutOfOrderRedo {
        cursor: u64,
        expected: usize,
        got: usize,
    },

    #[from]
    #[display("oracle: {_0}")]
    Oracle(OracleError),

    #[from]
    #[display("{_0}")]
    Fact(FactError),
}

/// Syntax error in clause or term text.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
#[display("syntax error at offset {offset}: {reason}")]
pub struct ParseError {
    pub offset: usize,
    pub reason: String,
}

impl ParseError {
    pub fn new(offset: usize, reason: impl Into<String>) -> Self {
        Self {
            offset,
            reason: reason.into(),
        }
    }
}

/// Logic-engine failure unrelated to running out of time.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error, From)]
pub enum EngineFault {
    /// Call to a predicate with no clauses and no foreign implementation.
    #[display("unknown procedure {name}/{arity}")]
    UnknownPredicate { name: String, arity: usize },

    #[display("type error: expected {expected}, found `{found}`")]
    TypeError { expected: String, found: String },

    /// Arguments were not bound enough for the predicate to run.
    #[display("arguments are not sufficiently instantiated in {predicate}")]
    Instantiation { predicate: String },

    /// Attempt to modify a procedure the engine does not allow to change
    /// (foreign predicates, control constructs).
    #[display("no permission to modify {name}/{arity}: {reason}")]
    PermissionError {
        name: String,
        arity: usize,
        reason: String,
    },

    /// A foreign predicate failed with an error of its own.
    #[display("foreign predicate {predicate} failed: {reason}")]
    Foreign { predicate: String, reason: String },

    #[from]
    #[display("{_0}")]
    Syntax(ParseError),
}

/// Failure to load configuration.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum ConfigError {
    #[display("cannot read config `{path}`: {reason}")]
    Io { path: String, reason: String },

    #[display("invalid config: {reason}")]
    Toml { reason: String },
}

/// Umbrella error for binaries and high-level entry points.
#[derive(Debug, Display, Error, From)]
pub enum TacticsError {
    #[display("{_0}")]
    Notation(NotationError),
    #[display("{_0}")]
    Fact(FactError),
    #[display("{_0}")]
    Oracle(OracleError),
    #[display("{_0}")]
    Bridge(BridgeError),
    #[display("{_0}")]
    Engine(EngineFault),
    #[display("{_0}")]
    Config(ConfigError),
    #[display("{_0}")]
    Tactic(crate::tactics::tactic_query::TacticError),
    #[display("{_0}")]
    Harness(crate::harness::equivalence::HarnessError),
}
