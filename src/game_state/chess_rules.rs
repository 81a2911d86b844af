//! Canonical chess-rule constants.
//!
//! Static rule literals shared by position setup, castling bookkeeping, and
//! terminal-state detection.

use crate::game_state::chess_types::Square;

/// Standard chess starting position in Forsyth-Edwards Notation (FEN).
pub const STARTING_POSITION_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

pub const LIGHT_KING_START: Square = 4;
pub const DARK_KING_START: Square = 60;

pub const LIGHT_QUEENSIDE_ROOK: Square = 0;
pub const LIGHT_KINGSIDE_ROOK: Square = 7;
pub const DARK_QUEENSIDE_ROOK: Square = 56;
pub const DARK_KINGSIDE_ROOK: Square = 63;

/// Halfmove count at which the 75-move rule ends the game.
pub const SEVENTY_FIVE_MOVE_HALFMOVES: u16 = 150;
