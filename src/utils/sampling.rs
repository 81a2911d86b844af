//! Seeded sampling of training examples from game corpora.
//!
//! Games are filtered by their `Termination` header, a subset of games is
//! drawn, and from each game a handful of (position, move) pairs played after
//! the opening. The same seed over the same corpus always yields the same
//! examples. Positions can also come from a plain list, one FEN per line.

use rand::{rngs::StdRng, seq::index, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::errors::NotationError;
use crate::game_state::position::Position;
use crate::moves::chess_move::Move;
use crate::utils::example_records::ExampleRecord;
use crate::utils::fen_parser::parse_fen;
use crate::utils::pgn::PgnGame;

/// Full moves skipped at the start of every game.
pub const DEFAULT_OPENING_CUTOFF: usize = 7;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingConfig {
    pub num_games: usize,
    pub positions_per_game: usize,
    pub opening_cutoff: usize,
    pub seed: u64,
    /// Games whose `Termination` header is not listed are skipped. Empty
    /// accepts every game.
    pub accepted_terminations: Vec<String>,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            num_games: 10,
            positions_per_game: 10,
            opening_cutoff: DEFAULT_OPENING_CUTOFF,
            seed: 1,
            accepted_terminations: vec!["Normal".to_owned(), "Time forfeit".to_owned()],
        }
    }
}

/// The plies of `game` after the first `opening_cutoff` full moves.
pub fn game_examples(game: &PgnGame, opening_cutoff: usize) -> &[(Position, Move)] {
    let skip = opening_cutoff.saturating_mul(2).min(game.plies.len());
    &game.plies[skip..]
}

fn accepted(game: &PgnGame, config: &SamplingConfig) -> bool {
    config.accepted_terminations.is_empty()
        || game
            .headers
            .get("Termination")
            .is_some_and(|termination| config.accepted_terminations.contains(termination))
}

/// Positive examples: the move actually played in each sampled position.
pub fn sample_examples(games: &[PgnGame], config: &SamplingConfig) -> Vec<ExampleRecord> {
    let mut rng = StdRng::seed_from_u64(config.seed);

    let candidates: Vec<&PgnGame> = games.iter().filter(|game| accepted(game, config)).collect();
    let picked = index::sample(&mut rng, candidates.len(), config.num_games.min(candidates.len()));
    info!(
        games = candidates.len(),
        sampled = picked.len(),
        "sampling example positions"
    );

    let mut records = Vec::new();
    for game_index in picked.iter() {
        let game = candidates[game_index];
        let plies = game_examples(game, config.opening_cutoff);
        debug!(
            site = game.headers.get("Site").map_or("?", String::as_str),
            plies = plies.len(),
            "sampling game"
        );
        let amount = config.positions_per_game.min(plies.len());
        for ply_index in index::sample(&mut rng, plies.len(), amount).iter() {
            let (position, mv) = &plies[ply_index];
            records.push(ExampleRecord::new(position.clone(), *mv, true));
        }
    }
    records
}

/// One position per non-blank line. A line holding only the piece placement
/// gets white to move, no castling rights and no en-passant square.
pub fn read_position_list(text: &str) -> Result<Vec<Position>, NotationError> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| {
            if line.contains(' ') {
                parse_fen(line)
            } else {
                parse_fen(&format!("{line} w - - 0 1"))
            }
        })
        .collect()
}
