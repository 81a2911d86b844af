//! PGN reading for game corpora.
//!
//! Parses one or more games into `(prior position, move)` histories that the
//! equivalence harness and the example sampler consume. Movetext may be SAN
//! (the usual PGN form) or coordinate notation; each token is tried as
//! coordinate text first and then resolved as SAN against the legal moves.

use std::collections::BTreeMap;

use crate::errors::NotationError;
use crate::game_state::position::Position;
use crate::move_generation::rules_oracle::RulesOracle;
use crate::moves::chess_move::Move;
use crate::utils::long_algebraic::resolve_long_algebraic;
use crate::utils::san::resolve_san;

#[derive(Debug, Clone)]
pub struct PgnGame {
    pub headers: BTreeMap<String, String>,
    pub initial_position: Position,
    /// Each move paired with the position it was played from.
    pub plies: Vec<(Position, Move)>,
    pub final_position: Position,
    pub result: String,
}

impl PgnGame {
    pub fn moves(&self) -> impl Iterator<Item = &Move> + '_ {
        self.plies.iter().map(|(_, mv)| mv)
    }
}

/// Read every game in `pgn`, replaying the moves through `oracle`.
pub fn read_pgn<O: RulesOracle>(oracle: &O, pgn: &str) -> Result<Vec<PgnGame>, NotationError> {
    split_games(pgn)?
        .into_iter()
        .map(|(headers, movetext)| replay_game(oracle, headers, &movetext))
        .collect()
}

type RawGame = (BTreeMap<String, String>, String);

fn split_games(pgn: &str) -> Result<Vec<RawGame>, NotationError> {
    let mut games = Vec::<RawGame>::new();
    let mut headers = BTreeMap::<String, String>::new();
    let mut movetext = String::new();

    for line in pgn.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('%') {
            continue;
        }
        if trimmed.starts_with('[') {
            // A header after movetext opens the next game.
            if !movetext.trim().is_empty() {
                games.push((std::mem::take(&mut headers), std::mem::take(&mut movetext)));
            }
            let (key, value) = parse_header_line(trimmed)?;
            headers.insert(key, value);
        } else {
            movetext.push_str(trimmed);
            movetext.push(' ');
        }
    }

    if !movetext.trim().is_empty() || !headers.is_empty() {
        games.push((headers, movetext));
    }

    Ok(games)
}

fn replay_game<O: RulesOracle>(
    oracle: &O,
    headers: BTreeMap<String, String>,
    movetext: &str,
) -> Result<PgnGame, NotationError> {
    let initial_position = match headers.get("FEN") {
        Some(fen) => Position::from_fen(fen)?,
        None => Position::starting(),
    };

    let mut position = initial_position.clone();
    let mut plies = Vec::<(Position, Move)>::new();
    let mut result = "*".to_owned();

    let cleaned = strip_comments_and_variations(movetext);
    for token in cleaned.split_whitespace() {
        let token = strip_move_number(token);
        if token.is_empty() || token.starts_with('$') {
            continue;
        }
        if is_result_token(token) {
            result = token.to_owned();
            break;
        }

        let legal = oracle.legal_moves(&position).map_err(oracle_failure)?;
        let mv = resolve_long_algebraic(token, &legal)
            .or_else(|_| resolve_san(token, &position, &legal))?;
        let next = oracle.apply(&position, &mv).map_err(oracle_failure)?;
        plies.push((std::mem::replace(&mut position, next), mv));
    }

    if let Some(header_result) = headers.get("Result").filter(|r| is_result_token(r)) {
        result = header_result.clone();
    }

    Ok(PgnGame {
        headers,
        initial_position,
        plies,
        final_position: position,
        result,
    })
}

fn oracle_failure(err: crate::errors::OracleError) -> NotationError {
    NotationError::InvalidPgn {
        reason: err.to_string(),
    }
}

fn parse_header_line(line: &str) -> Result<(String, String), NotationError> {
    let invalid = || NotationError::InvalidPgn {
        reason: format!("invalid header line `{line}`"),
    };

    let inner = line
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
        .ok_or_else(invalid)?;
    let (key, value_raw) = inner.split_once(' ').ok_or_else(invalid)?;
    let value = value_raw
        .trim()
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .ok_or_else(invalid)?;

    Ok((key.trim().to_owned(), value.replace("\\\"", "\"")))
}

fn strip_comments_and_variations(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut brace_depth = 0usize;
    let mut paren_depth = 0usize;

    for ch in text.chars() {
        match ch {
            '{' => brace_depth += 1,
            '}' => brace_depth = brace_depth.saturating_sub(1),
            '(' if brace_depth == 0 => paren_depth += 1,
            ')' if brace_depth == 0 => paren_depth = paren_depth.saturating_sub(1),
            _ if brace_depth == 0 && paren_depth == 0 => out.push(ch),
            _ => {}
        }
        // Keep tokens separated when a comment sat between them.
        if matches!(ch, '}' | ')') {
            out.push(' ');
        }
    }

    out
}

/// `12.`, `12...`, and `12.e4` all lose their move number.
fn strip_move_number(token: &str) -> &str {
    let digits = token.len() - token.trim_start_matches(|c: char| c.is_ascii_digit()).len();
    if digits > 0 && token[digits..].starts_with('.') {
        token[digits..].trim_start_matches('.')
    } else {
        token
    }
}

fn is_result_token(token: &str) -> bool {
    matches!(token, "1-0" | "0-1" | "1/2-1/2" | "*")
}

#[cfg(test)]
mod tests {
    use super::read_pgn;
    use crate::game_state::position::Position;
    use crate::move_generation::legal_move_generator::LegalMoveGenerator;
    use crate::moves::chess_move::Move;

    const TWO_GAMES: &str = r#"
[Event "First"]
[Result "1-0"]

1. e4 e5 2. Bc4 Nc6 3. Qh5 Nf6?? {blunder} 4. Qxf7# 1-0

[Event "Second"]
[SetUp "1"]
[FEN "4k3/8/8/8/8/8/4P3/4K3 w - - 0 1"]
[Result "*"]

1. e2e4 (1. e3) Kd7 *
"#;

    #[test]
    fn reads_multiple_games_with_san_and_coordinates() {
        let games = read_pgn(&LegalMoveGenerator, TWO_GAMES).expect("PGN should parse");
        assert_eq!(games.len(), 2);

        let first = &games[0];
        assert_eq!(first.headers.get("Event").map(String::as_str), Some("First"));
        assert_eq!(first.plies.len(), 7);
        assert_eq!(first.plies[0].0, Position::starting());
        assert_eq!(first.plies[0].1, Move::new(12, 28));
        assert_eq!(first.result, "1-0");
        assert_eq!(
            first.final_position.to_fen(),
            "r1bqkb1r/pppp1Qpp/2n2n2/4p3/2B1P3/8/PPPP1PPP/RNB1K1NR b KQkq - 0 4"
        );

        let second = &games[1];
        assert_eq!(second.initial_position.to_fen(), "4k3/8/8/8/8/8/4P3/4K3 w - - 0 1");
        assert_eq!(second.plies.len(), 2);
        assert_eq!(second.result, "*");
    }

    #[test]
    fn each_ply_starts_where_the_previous_one_ended() {
        let games = read_pgn(&LegalMoveGenerator, TWO_GAMES).expect("PGN should parse");
        let plies = &games[0].plies;
        for pair in plies.windows(2) {
            let (prior, mv) = &pair[0];
            let next = crate::move_generation::legal_move_apply::apply_move(prior, mv)
                .expect("move should apply");
            assert_eq!(next, pair[1].0);
        }
    }

    #[test]
    fn illegal_movetext_is_reported() {
        let err = read_pgn(&LegalMoveGenerator, "1. e4 e4 *").expect_err("second e4 is illegal");
        assert!(err.to_string().contains("e4"));
    }
}
