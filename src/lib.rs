//! Crate root module declarations for the Plum Tactics project.
//!
//! This file exposes the chess rules oracle (position model, move
//! generation, notation helpers), the fact codecs that turn positions and
//! moves into logic terms, the reference logic engine, the enumeration
//! bridge, the tactic executor, and the equivalence harness so binaries,
//! benches, and tests can import stable module paths.

pub mod config;
pub mod errors;

pub mod game_state {
    pub mod chess_rules;
    pub mod chess_types;
    pub mod position;
}

pub mod moves {
    pub mod chess_move;
    pub mod slider_attacks;
    pub mod step_attacks;
}

pub mod move_generation {
    pub mod legal_move_apply;
    pub mod legal_move_checks;
    pub mod legal_move_generator;
    pub mod legal_move_shared;
    pub mod legal_moves_king;
    pub mod legal_moves_knight;
    pub mod legal_moves_pawn;
    pub mod legal_moves_sliders;
    pub mod perft;
    pub mod rules_oracle;
}

pub mod facts {
    pub mod fact;
    pub mod move_codec;
    pub mod position_codec;
}

pub mod logic {
    pub mod chess_predicates;
    pub mod clause;
    pub mod engine;
    pub mod foreign;
    pub mod interpreter;
    pub mod parser;
    pub mod prelude;
    pub mod term;
}

pub mod bridge {
    pub mod enumeration_cursor;
    pub mod move_enumeration;
}

pub mod tactics {
    pub mod scoped_clause;
    pub mod tactic_query;
}

pub mod harness {
    pub mod equivalence;
    pub mod rules_path;
}

pub mod utils {
    pub mod algebraic;
    pub mod example_records;
    pub mod fen_generator;
    pub mod fen_parser;
    pub mod long_algebraic;
    pub mod pgn;
    pub mod render_position;
    pub mod sampling;
    pub mod san;
}
