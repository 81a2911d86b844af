//! Cursor state for resumable legal-move enumeration.
//!
//! Cursors live in a slot arena addressed by generational ids. Releasing a
//! cursor bumps its slot's generation, so an id handed out earlier can never
//! reach whatever cursor reuses the slot.

use crate::game_state::position::Position;
use crate::moves::chess_move::Move;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CursorId {
    slot: u32,
    generation: u32,
}

impl CursorId {
    /// Packed form used as a foreign-predicate context handle.
    #[inline]
    pub fn to_handle(self) -> u64 {
        (u64::from(self.generation) << 32) | u64::from(self.slot)
    }

    #[inline]
    pub fn from_handle(handle: u64) -> Self {
        Self {
            slot: (handle & 0xFFFF_FFFF) as u32,
            generation: (handle >> 32) as u32,
        }
    }
}

/// One enumeration session: the position and the moves computed for it.
///
/// The move list is fixed at creation; only the index advances.
#[derive(Debug, Clone)]
pub struct EnumerationCursor {
    position: Position,
    moves: Vec<Move>,
    index: usize,
}

impl EnumerationCursor {
    pub fn new(position: Position, moves: Vec<Move>) -> Self {
        Self {
            position,
            moves,
            index: 0,
        }
    }

    #[inline]
    pub fn position(&self) -> &Position {
        &self.position
    }

    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.moves.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    pub fn current(&self) -> Option<Move> {
        self.moves.get(self.index).copied()
    }

    /// Step to the next move; `None` once past the end.
    pub fn advance(&mut self) -> Option<Move> {
        self.index += 1;
        self.current()
    }
}

#[derive(Debug, Default)]
struct Slot {
    generation: u32,
    cursor: Option<EnumerationCursor>,
}

#[derive(Debug, Default)]
pub struct CursorArena {
    slots: Vec<Slot>,
    free: Vec<u32>,
}

impl CursorArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, cursor: EnumerationCursor) -> CursorId {
        let slot = match self.free.pop() {
            Some(slot) => slot,
            None => {
                self.slots.push(Slot::default());
                (self.slots.len() - 1) as u32
            }
        };
        let entry = &mut self.slots[slot as usize];
        entry.cursor = Some(cursor);
        CursorId {
            slot,
            generation: entry.generation,
        }
    }

    pub fn get(&self, id: CursorId) -> Option<&EnumerationCursor> {
        self.slots
            .get(id.slot as usize)
            .filter(|entry| entry.generation == id.generation)
            .and_then(|entry| entry.cursor.as_ref())
    }

    pub fn get_mut(&mut self, id: CursorId) -> Option<&mut EnumerationCursor> {
        self.slots
            .get_mut(id.slot as usize)
            .filter(|entry| entry.generation == id.generation)
            .and_then(|entry| entry.cursor.as_mut())
    }

    /// Remove a cursor. Stale or unknown ids return `None` and change nothing.
    pub fn release(&mut self, id: CursorId) -> Option<EnumerationCursor> {
        let entry = self.slots.get_mut(id.slot as usize)?;
        if entry.generation != id.generation {
            return None;
        }
        let cursor = entry.cursor.take()?;
        entry.generation = entry.generation.wrapping_add(1);
        self.free.push(id.slot);
        Some(cursor)
    }

    /// Number of cursors currently alive.
    pub fn live(&self) -> usize {
        self.slots.len() - self.free.len()
    }
}

#[cfg(test)]
mod tests {
    use super::{CursorArena, CursorId, EnumerationCursor};
    use crate::game_state::position::Position;
    use crate::moves::chess_move::Move;

    fn cursor() -> EnumerationCursor {
        EnumerationCursor::new(Position::starting(), vec![Move::new(12, 28), Move::new(6, 21)])
    }

    #[test]
    fn cursor_walks_its_moves_once() {
        let mut cursor = cursor();
        assert_eq!(cursor.current(), Some(Move::new(12, 28)));
        assert_eq!(cursor.advance(), Some(Move::new(6, 21)));
        assert_eq!(cursor.advance(), None);
        assert_eq!(cursor.index(), 2);
    }

    #[test]
    fn released_ids_stay_dead_after_slot_reuse() {
        let mut arena = CursorArena::new();
        let first = arena.insert(cursor());
        assert_eq!(arena.live(), 1);
        assert!(arena.release(first).is_some());
        assert!(arena.release(first).is_none());
        assert_eq!(arena.live(), 0);

        let second = arena.insert(cursor());
        assert_ne!(first, second);
        assert!(arena.get(first).is_none());
        assert!(arena.get_mut(second).is_some());
        assert_eq!(CursorId::from_handle(second.to_handle()), second);
    }
}
