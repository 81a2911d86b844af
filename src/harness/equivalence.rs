//! Replaying game histories through two rules paths in lock step.
//!
//! Both paths play every ply from the same prior position. The resulting
//! positions must be equal, and (when enabled) so must the legal move sets
//! of those positions. The first disagreement stops the run.

use std::collections::BTreeSet;

use derive_more::{Display, Error, From};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument};

use crate::errors::{BridgeError, EngineFault, FactError, OracleError};
use crate::game_state::position::Position;
use crate::harness::rules_path::{Applied, RulesPath};
use crate::moves::chess_move::Move;
use crate::utils::pgn::PgnGame;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    pub compare_legal_moves: bool,
    /// Stop after this many plies in total; `None` replays everything.
    pub max_plies: Option<usize>,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            compare_legal_moves: true,
            max_plies: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum DivergenceKind {
    #[display("{path} rejected the move")]
    MoveRejected { path: &'static str },

    #[display("resulting positions differ: reference {reference}, candidate {candidate}")]
    PositionMismatch {
        reference: Position,
        candidate: Position,
    },

    /// Moves from the resulting position, compared as sets.
    #[display(
        "legal move sets differ: missing [{}], extra [{}]",
        join_moves(missing),
        join_moves(extra)
    )]
    MoveSetMismatch { missing: Vec<Move>, extra: Vec<Move> },
}

fn join_moves(moves: &[Move]) -> String {
    moves.iter().map(Move::to_string).collect::<Vec<_>>().join(" ")
}

#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
#[display("ply {ply}: {mv} from {prior}: {kind}")]
pub struct Divergence {
    pub ply: usize,
    pub prior: Position,
    pub mv: Move,
    pub kind: DivergenceKind,
}

#[derive(Debug, Display, Error, From)]
pub enum HarnessError {
    #[from]
    #[display("divergence at {_0}")]
    Divergence(Box<Divergence>),

    /// Both paths refused a move taken from the history itself.
    #[display("history move {mv} is illegal in {prior}")]
    IllegalHistory { prior: Position, mv: Move },

    #[display("{path} ran out of time on `{goal}`")]
    Timeout { path: &'static str, goal: String },

    #[from]
    #[display("{_0}")]
    Oracle(OracleError),

    #[from]
    #[display("{_0}")]
    Bridge(BridgeError),

    #[from]
    #[display("{_0}")]
    Engine(EngineFault),

    #[from]
    #[display("{_0}")]
    Fact(FactError),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HarnessReport {
    pub games: usize,
    pub plies: usize,
    pub move_sets_compared: usize,
    /// Times the running positions were reset to a history prior.
    pub resyncs: usize,
}

impl HarnessReport {
    fn absorb(&mut self, other: HarnessReport) {
        self.games += other.games;
        self.plies += other.plies;
        self.move_sets_compared += other.move_sets_compared;
        self.resyncs += other.resyncs;
    }
}

pub struct EquivalenceHarness<R, C> {
    reference: R,
    candidate: C,
    config: HarnessConfig,
    plies_replayed: usize,
}

impl<R: RulesPath, C: RulesPath> EquivalenceHarness<R, C> {
    pub fn new(reference: R, candidate: C, config: HarnessConfig) -> Self {
        Self {
            reference,
            candidate,
            config,
            plies_replayed: 0,
        }
    }

    fn budget_left(&self) -> bool {
        self.config
            .max_plies
            .map_or(true, |max| self.plies_replayed < max)
    }

    /// Replay `(prior, move)` pairs. A prior that does not continue the
    /// running position starts over from that prior.
    #[instrument(skip_all, fields(
        reference = self.reference.name(),
        candidate = self.candidate.name(),
        plies = history.len()
    ))]
    pub fn replay(&mut self, history: &[(Position, Move)]) -> Result<HarnessReport, HarnessError> {
        let mut report = HarnessReport::default();
        let mut running: Option<Position> = None;

        for (ply, (prior, mv)) in history.iter().enumerate() {
            if !self.budget_left() {
                debug!(ply, "ply limit reached");
                break;
            }
            if running.as_ref().is_some_and(|current| current != prior) {
                debug!(ply, fen = %prior, "history does not continue, resynchronising");
                report.resyncs += 1;
            }

            let diverged = |kind: DivergenceKind| {
                let divergence = Divergence {
                    ply,
                    prior: prior.clone(),
                    mv: *mv,
                    kind,
                };
                error!(%divergence, "paths diverged");
                HarnessError::from(Box::new(divergence))
            };

            let reference = self.reference.apply(prior, mv)?;
            let candidate = self.candidate.apply(prior, mv)?;
            let next = match (reference, candidate) {
                (Applied::Accepted(reference), Applied::Accepted(candidate)) => {
                    if reference != candidate {
                        return Err(diverged(DivergenceKind::PositionMismatch { reference, candidate }));
                    }
                    reference
                }
                (Applied::Accepted(_), Applied::Rejected) => {
                    return Err(diverged(DivergenceKind::MoveRejected {
                        path: self.candidate.name(),
                    }))
                }
                (Applied::Rejected, Applied::Accepted(_)) => {
                    return Err(diverged(DivergenceKind::MoveRejected {
                        path: self.reference.name(),
                    }))
                }
                (Applied::Rejected, Applied::Rejected) => {
                    return Err(HarnessError::IllegalHistory {
                        prior: prior.clone(),
                        mv: *mv,
                    })
                }
            };

            if self.config.compare_legal_moves {
                let expected: BTreeSet<Move> = self.reference.legal_moves(&next)?.into_iter().collect();
                let actual: BTreeSet<Move> = self.candidate.legal_moves(&next)?.into_iter().collect();
                if expected != actual {
                    return Err(diverged(DivergenceKind::MoveSetMismatch {
                        missing: expected.difference(&actual).copied().collect(),
                        extra: actual.difference(&expected).copied().collect(),
                    }));
                }
                report.move_sets_compared += 1;
            }

            running = Some(next);
            report.plies += 1;
            self.plies_replayed += 1;
        }

        Ok(report)
    }

    /// Replay every game in turn; the first divergence ends the run.
    #[instrument(skip_all, fields(games = games.len()))]
    pub fn replay_games(&mut self, games: &[PgnGame]) -> Result<HarnessReport, HarnessError> {
        let mut report = HarnessReport::default();
        for game in games {
            if !self.budget_left() {
                break;
            }
            let mut game_report = self.replay(&game.plies)?;
            game_report.games = 1;
            report.absorb(game_report);
        }
        info!(
            games = report.games,
            plies = report.plies,
            move_sets = report.move_sets_compared,
            "corpus replayed without divergence"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, Rng, SeedableRng};

    use super::{DivergenceKind, EquivalenceHarness, HarnessConfig, HarnessError};
    use crate::facts::fact::UnknownFactPolicy;
    use crate::game_state::chess_types::PieceKind;
    use crate::game_state::position::Position;
    use crate::harness::rules_path::{Applied, FactBridgePath, LogicEnginePath, OraclePath, RulesPath};
    use crate::move_generation::legal_move_generator::LegalMoveGenerator;
    use crate::move_generation::rules_oracle::RulesOracle;
    use crate::moves::chess_move::Move;
    use crate::utils::pgn::read_pgn;

    const GAME: &str = r#"
[Event "castles both ways"]
[Termination "Normal"]

1. e4 e5 2. Nf3 Nc6 3. Bb5 a6 4. Ba4 Nf6 5. O-O Be7 6. Re1 b5 7. Bb3 d6
8. c3 O-O 9. h3 Nb8 10. d4 Nbd7 1-0
"#;

    /// Random legal games from `start`, long enough to hit castling,
    /// en passant, and the odd promotion.
    fn random_history(seed: u64, start: &Position, plies: usize) -> Vec<(Position, Move)> {
        let oracle = LegalMoveGenerator;
        let mut rng = StdRng::seed_from_u64(seed);
        let mut position = start.clone();
        let mut history = Vec::new();
        for _ in 0..plies {
            let moves = oracle.legal_moves(&position).expect("legal moves");
            if moves.is_empty() {
                break;
            }
            let mv = moves[rng.random_range(0..moves.len())];
            let next = oracle.apply(&position, &mv).expect("legal move applies");
            history.push((position, mv));
            position = next;
        }
        history
    }

    fn harness<C: RulesPath>(candidate: C) -> EquivalenceHarness<OraclePath<LegalMoveGenerator>, C> {
        EquivalenceHarness::new(
            OraclePath::new(LegalMoveGenerator),
            candidate,
            HarnessConfig::default(),
        )
    }

    #[test]
    fn fact_bridge_path_matches_the_oracle_on_random_games() {
        let starts = [
            Position::starting(),
            Position::from_fen("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1")
                .expect("valid FEN"),
            Position::from_fen("8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1").expect("valid FEN"),
        ];
        let mut harness = harness(FactBridgePath::new(LegalMoveGenerator));
        for (seed, start) in starts.iter().enumerate() {
            let history = random_history(seed as u64, start, 60);
            let report = harness.replay(&history).expect("paths should agree");
            assert_eq!(report.plies, history.len());
            assert_eq!(report.move_sets_compared, history.len());
            assert_eq!(report.resyncs, 0);
        }
    }

    #[test]
    fn logic_engine_path_matches_the_oracle_on_a_real_game() {
        let games = read_pgn(&LegalMoveGenerator, GAME).expect("PGN should parse");
        let candidate = LogicEnginePath::new(LegalMoveGenerator, UnknownFactPolicy::Strict)
            .expect("engine should build");
        let report = harness(candidate).replay_games(&games).expect("paths should agree");
        assert_eq!(report.games, 1);
        assert_eq!(report.plies, 20);
        assert_eq!(report.move_sets_compared, 20);
    }

    #[test]
    fn discontinuous_history_resynchronises() {
        let mut history = random_history(7, &Position::starting(), 4);
        history.extend(random_history(8, &Position::starting(), 4));
        let report = harness(FactBridgePath::new(LegalMoveGenerator))
            .replay(&history)
            .expect("paths should agree");
        assert_eq!(report.plies, 8);
        assert_eq!(report.resyncs, 1);
    }

    #[test]
    fn ply_limit_stops_early() {
        let history = random_history(3, &Position::starting(), 30);
        let mut harness = EquivalenceHarness::new(
            OraclePath::new(LegalMoveGenerator),
            FactBridgePath::new(LegalMoveGenerator),
            HarnessConfig {
                compare_legal_moves: false,
                max_plies: Some(5),
            },
        );
        let report = harness.replay(&history).expect("paths should agree");
        assert_eq!(report.plies, 5);
        assert_eq!(report.move_sets_compared, 0);
    }

    /// Plays correctly but forgets castling rights afterwards.
    struct ForgetsCastling(OraclePath<LegalMoveGenerator>);

    impl RulesPath for ForgetsCastling {
        fn name(&self) -> &'static str {
            "forgets-castling"
        }

        fn apply(&mut self, position: &Position, mv: &Move) -> Result<Applied, HarnessError> {
            Ok(match self.0.apply(position, mv)? {
                Applied::Accepted(mut next) => {
                    next.castling_rights = 0;
                    Applied::Accepted(next)
                }
                Applied::Rejected => Applied::Rejected,
            })
        }

        fn legal_moves(&mut self, position: &Position) -> Result<Vec<Move>, HarnessError> {
            self.0.legal_moves(position)
        }
    }

    /// Never offers or accepts knight moves.
    struct NoKnights(OraclePath<LegalMoveGenerator>);

    impl NoKnights {
        fn is_knight_move(position: &Position, mv: &Move) -> bool {
            position
                .piece_at(mv.from)
                .is_some_and(|(_, kind)| kind == PieceKind::Knight)
        }
    }

    impl RulesPath for NoKnights {
        fn name(&self) -> &'static str {
            "no-knights"
        }

        fn apply(&mut self, position: &Position, mv: &Move) -> Result<Applied, HarnessError> {
            if Self::is_knight_move(position, mv) {
                return Ok(Applied::Rejected);
            }
            self.0.apply(position, mv)
        }

        fn legal_moves(&mut self, position: &Position) -> Result<Vec<Move>, HarnessError> {
            let mut moves = self.0.legal_moves(position)?;
            moves.retain(|mv| !Self::is_knight_move(position, mv));
            Ok(moves)
        }
    }

    #[test]
    fn position_mismatch_is_reported_with_both_positions() {
        let history = random_history(1, &Position::starting(), 4);
        let err = harness(ForgetsCastling(OraclePath::new(LegalMoveGenerator)))
            .replay(&history)
            .expect_err("castling rights differ after the first ply");
        let HarnessError::Divergence(divergence) = err else {
            panic!("expected a divergence, got {err}");
        };
        assert_eq!(divergence.ply, 0);
        assert_eq!(divergence.prior, history[0].0);
        let DivergenceKind::PositionMismatch { reference, candidate } = &divergence.kind else {
            panic!("expected a position mismatch, got {}", divergence.kind);
        };
        assert_ne!(reference.castling_rights(), 0);
        assert_eq!(candidate.castling_rights(), 0);
    }

    #[test]
    fn move_set_mismatch_lists_missing_moves() {
        // 1. e4 leaves black with its knight moves available.
        let history = vec![(Position::starting(), Move::new(12, 28))];
        let err = harness(NoKnights(OraclePath::new(LegalMoveGenerator)))
            .replay(&history)
            .expect_err("knight moves are missing");
        let HarnessError::Divergence(divergence) = err else {
            panic!("expected a divergence, got {err}");
        };
        let DivergenceKind::MoveSetMismatch { missing, extra } = &divergence.kind else {
            panic!("expected a move-set mismatch, got {}", divergence.kind);
        };
        assert_eq!(missing.len(), 4);
        assert!(extra.is_empty());
        assert!(divergence.to_string().contains("missing [b8a6 b8c6 g8f6 g8h6]"));
    }

    #[test]
    fn rejection_by_one_path_names_that_path() {
        let history = vec![(Position::starting(), Move::new(6, 21))];
        let err = harness(NoKnights(OraclePath::new(LegalMoveGenerator)))
            .replay(&history)
            .expect_err("candidate rejects Nf3");
        let HarnessError::Divergence(divergence) = err else {
            panic!("expected a divergence, got {err}");
        };
        assert_eq!(
            divergence.kind,
            DivergenceKind::MoveRejected { path: "no-knights" }
        );
    }

    #[test]
    fn illegal_history_is_not_a_divergence() {
        let history = vec![(Position::starting(), Move::new(12, 36))];
        let err = harness(FactBridgePath::new(LegalMoveGenerator))
            .replay(&history)
            .expect_err("e2e5 is illegal");
        assert!(matches!(err, HarnessError::IllegalHistory { .. }));
    }
}
