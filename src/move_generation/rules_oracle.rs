//! The rules oracle abstraction.
//!
//! Everything above the move generator (the enumeration bridge, the tactic
//! executor, the equivalence harness) talks to chess rules only through this
//! trait, so an alternative rules implementation can be swapped in for
//! cross-checking.

use crate::errors::OracleError;
use crate::game_state::position::Position;
use crate::moves::chess_move::Move;

pub type OracleResult<T> = Result<T, OracleError>;

/// Why a position has no continuation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TerminalState {
    Checkmate,
    Stalemate,
    SeventyFiveMoveRule,
    InsufficientMaterial,
}

pub trait RulesOracle {
    /// All legal moves for the side to move.
    ///
    /// The order is deterministic: it depends on the position alone, so two
    /// calls on equal positions return identical sequences.
    fn legal_moves(&self, position: &Position) -> OracleResult<Vec<Move>>;

    /// Play a legal move. Illegal moves are rejected, never repaired.
    fn apply(&self, position: &Position, mv: &Move) -> OracleResult<Position>;

    fn terminal_state(&self, position: &Position) -> OracleResult<Option<TerminalState>>;

    fn in_check(&self, position: &Position) -> OracleResult<bool>;

    fn is_terminal(&self, position: &Position) -> OracleResult<bool> {
        Ok(self.terminal_state(position)?.is_some())
    }
}

impl<O: RulesOracle + ?Sized> RulesOracle for &O {
    fn legal_moves(&self, position: &Position) -> OracleResult<Vec<Move>> {
        (**self).legal_moves(position)
    }

    fn apply(&self, position: &Position, mv: &Move) -> OracleResult<Position> {
        (**self).apply(position, mv)
    }

    fn terminal_state(&self, position: &Position) -> OracleResult<Option<TerminalState>> {
        (**self).terminal_state(position)
    }

    fn in_check(&self, position: &Position) -> OracleResult<bool> {
        (**self).in_check(position)
    }
}
