//! Legal-move enumeration with the shape of a nondeterministic predicate.
//!
//! `first_call` computes the legal moves once and yields the first,
//! `redo` yields the next one, and `pruned` drops the session early. Every
//! yield carries the cursor id and the index it produced, and a redo must
//! name exactly that index, so a session can only ever move forward one step
//! at a time.
//!
//! Point verification (`verify`, `verify_move`) answers "is this move legal
//! here" without creating any session state.

use tracing::{debug, instrument};

use crate::bridge::enumeration_cursor::{CursorArena, CursorId, EnumerationCursor};
use crate::errors::BridgeError;
use crate::game_state::chess_types::Square;
use crate::game_state::position::Position;
use crate::move_generation::rules_oracle::RulesOracle;
use crate::moves::chess_move::Move;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Enumeration {
    /// A move, with more possibly to follow via `redo(handle, index)`.
    Yield {
        mv: Move,
        handle: CursorId,
        index: usize,
    },
    /// No (more) moves; the cursor, if there was one, is gone.
    Exhausted,
}

pub struct MoveEnumerationBridge<O> {
    oracle: O,
    cursors: CursorArena,
}

impl<O: RulesOracle> MoveEnumerationBridge<O> {
    pub fn new(oracle: O) -> Self {
        Self {
            oracle,
            cursors: CursorArena::new(),
        }
    }

    pub fn oracle(&self) -> &O {
        &self.oracle
    }

    pub fn live_cursors(&self) -> usize {
        self.cursors.live()
    }

    #[instrument(level = "trace", skip_all, fields(fen = %position))]
    pub fn first_call(&mut self, position: &Position) -> Result<Enumeration, BridgeError> {
        let moves = self.oracle.legal_moves(position)?;
        let Some(&first) = moves.first() else {
            debug!("no legal moves, nothing to enumerate");
            return Ok(Enumeration::Exhausted);
        };

        let count = moves.len();
        let handle = self
            .cursors
            .insert(EnumerationCursor::new(position.clone(), moves));
        debug!(cursor = handle.to_handle(), moves = count, "cursor opened");
        Ok(Enumeration::Yield {
            mv: first,
            handle,
            index: 0,
        })
    }

    pub fn redo(&mut self, handle: CursorId, previous_index: usize) -> Result<Enumeration, BridgeError> {
        let cursor = self
            .cursors
            .get_mut(handle)
            .ok_or(BridgeError::StaleCursor {
                cursor: handle.to_handle(),
            })?;

        if cursor.index() != previous_index {
            return Err(BridgeError::OutOfOrderRedo {
                cursor: handle.to_handle(),
                expected: cursor.index(),
                got: previous_index,
            });
        }

        match cursor.advance() {
            Some(mv) => Ok(Enumeration::Yield {
                mv,
                handle,
                index: cursor.index(),
            }),
            None => {
                self.cursors.release(handle);
                debug!(cursor = handle.to_handle(), "cursor exhausted");
                Ok(Enumeration::Exhausted)
            }
        }
    }

    pub fn pruned(&mut self, handle: CursorId) -> Result<(), BridgeError> {
        match self.cursors.release(handle) {
            Some(cursor) => {
                debug!(
                    cursor = handle.to_handle(),
                    index = cursor.index(),
                    remaining = cursor.len() - cursor.index() - 1,
                    "cursor pruned"
                );
                Ok(())
            }
            None => Err(BridgeError::StaleCursor {
                cursor: handle.to_handle(),
            }),
        }
    }

    /// Whether some legal move goes `from` -> `to`, whatever it promotes to.
    pub fn verify(&self, from: Square, to: Square, position: &Position) -> Result<bool, BridgeError> {
        Ok(self
            .oracle
            .legal_moves(position)?
            .iter()
            .any(|mv| mv.same_squares(from, to)))
    }

    /// Exact membership, promotion piece included.
    pub fn verify_move(&self, mv: &Move, position: &Position) -> Result<bool, BridgeError> {
        Ok(self.oracle.legal_moves(position)?.contains(mv))
    }
}
