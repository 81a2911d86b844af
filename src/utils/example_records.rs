//! Labelled (position, move) examples.
//!
//! The CSV form has a `fen,uci,label` header and one example per line, with
//! the label written `1` (positive) or `0` (negative). Examples can also be
//! rendered as `pos(f(<facts>, <move>)).` / `neg(...)` clauses for a clause
//! learner.

use std::fmt::Write as _;

use crate::errors::NotationError;
use crate::facts::move_codec::move_to_term;
use crate::facts::position_codec::position_to_term;
use crate::game_state::position::Position;
use crate::logic::term::Term;
use crate::moves::chess_move::Move;
use crate::utils::long_algebraic::{long_algebraic_to_move, move_to_long_algebraic};

pub const CSV_HEADER: &str = "fen,uci,label";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExampleRecord {
    pub position: Position,
    pub mv: Move,
    /// `true` for a positive example.
    pub label: bool,
}

impl ExampleRecord {
    pub fn new(position: Position, mv: Move, label: bool) -> Self {
        Self {
            position,
            mv,
            label,
        }
    }

    pub fn to_csv_row(&self) -> String {
        format!(
            "{},{},{}",
            self.position.to_fen(),
            move_to_long_algebraic(&self.mv),
            u8::from(self.label)
        )
    }

    /// `pos(f(Facts, Move))` or `neg(f(Facts, Move))`.
    pub fn to_example_term(&self) -> Term {
        let example = Term::compound(
            "f",
            vec![position_to_term(&self.position), move_to_term(&self.mv)],
        );
        Term::compound(if self.label { "pos" } else { "neg" }, vec![example])
    }
}

/// Parse CSV text. The header line is required; blank lines are skipped.
pub fn read_example_records(text: &str) -> Result<Vec<ExampleRecord>, NotationError> {
    let mut lines = text.lines().enumerate();
    match lines.next() {
        Some((_, header)) if header.trim() == CSV_HEADER => {}
        Some((_, header)) => {
            return Err(NotationError::InvalidRecord {
                line: 1,
                reason: format!("expected header `{CSV_HEADER}`, found `{}`", header.trim()),
            })
        }
        None => {
            return Err(NotationError::InvalidRecord {
                line: 1,
                reason: "empty input".to_owned(),
            })
        }
    }

    let mut records = Vec::new();
    for (index, line) in lines {
        let line_no = index + 1;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let invalid = |reason: String| NotationError::InvalidRecord {
            line: line_no,
            reason,
        };

        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        let [fen, uci, label] = fields.as_slice() else {
            return Err(invalid(format!("expected 3 fields, found {}", fields.len())));
        };
        let position = Position::from_fen(fen).map_err(|err| invalid(err.to_string()))?;
        let mv = long_algebraic_to_move(uci).map_err(|err| invalid(err.to_string()))?;
        let label = match *label {
            "1" => true,
            "0" => false,
            other => return Err(invalid(format!("label must be 0 or 1, found `{other}`"))),
        };
        records.push(ExampleRecord::new(position, mv, label));
    }

    Ok(records)
}

pub fn write_example_records(records: &[ExampleRecord]) -> String {
    let mut out = String::with_capacity(64 * (records.len() + 1));
    out.push_str(CSV_HEADER);
    out.push('\n');
    for record in records {
        out.push_str(&record.to_csv_row());
        out.push('\n');
    }
    out
}

/// One example clause per line.
pub fn render_example_clauses(records: &[ExampleRecord]) -> String {
    let mut out = String::new();
    for record in records {
        let _ = writeln!(out, "{}.", record.to_example_term());
    }
    out
}
