//! Replay a PGN corpus through the equivalence harness.
//!
//! Run with:
//! `cargo run --release --bin verify_corpus -- games.pgn`
//! `cargo run --release --bin verify_corpus -- games.pgn --engine-path --config tactics.toml`
//! `cargo run --release --bin verify_corpus -- games.pgn --sample-examples examples.csv`

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use plum_tactics::config::TacticsConfig;
use plum_tactics::harness::equivalence::{EquivalenceHarness, HarnessError, HarnessReport};
use plum_tactics::harness::rules_path::{FactBridgePath, LogicEnginePath, OraclePath, RulesPath};
use plum_tactics::move_generation::legal_move_generator::LegalMoveGenerator;
use plum_tactics::utils::example_records::write_example_records;
use plum_tactics::utils::pgn::{read_pgn, PgnGame};
use plum_tactics::utils::render_position::render_position;
use plum_tactics::utils::sampling::sample_examples;

#[derive(Debug, Parser)]
#[command(about = "Check that the fact bridge plays chess exactly like the rules oracle")]
struct Args {
    /// PGN file with one or more games.
    pgn: PathBuf,

    /// TOML configuration; defaults are used when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Replay through the logic engine's chess predicates instead of the
    /// bridge directly.
    #[arg(long)]
    engine_path: bool,

    /// Also write seeded `fen,uci,label` examples sampled from the corpus.
    #[arg(long, value_name = "CSV")]
    sample_examples: Option<PathBuf>,
}

fn replay<C: RulesPath>(candidate: C, config: &TacticsConfig, games: &[PgnGame]) -> Result<HarnessReport> {
    let mut harness = EquivalenceHarness::new(OraclePath::new(LegalMoveGenerator), candidate, config.harness);
    match harness.replay_games(games) {
        Ok(report) => Ok(report),
        Err(HarnessError::Divergence(divergence)) => {
            eprintln!("{}", render_position(&divergence.prior));
            Err(HarnessError::Divergence(divergence).into())
        }
        Err(err) => Err(err.into()),
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => TacticsConfig::from_path(path)?,
        None => TacticsConfig::default(),
    };

    let text = std::fs::read_to_string(&args.pgn)
        .with_context(|| format!("reading {}", args.pgn.display()))?;
    let games = read_pgn(&LegalMoveGenerator, &text)?;
    info!(games = games.len(), path = %args.pgn.display(), "corpus loaded");

    let report = if args.engine_path {
        let candidate = LogicEnginePath::new(LegalMoveGenerator, config.facts.unknown_facts)?;
        replay(candidate, &config, &games)?
    } else {
        replay(FactBridgePath::new(LegalMoveGenerator), &config, &games)?
    };

    println!(
        "games: {}  plies: {}  move sets compared: {}  resyncs: {}",
        report.games, report.plies, report.move_sets_compared, report.resyncs
    );

    if let Some(path) = &args.sample_examples {
        let records = sample_examples(&games, &config.sampling);
        std::fs::write(path, write_example_records(&records))
            .with_context(|| format!("writing {}", path.display()))?;
        println!("wrote {} examples to {}", records.len(), path.display());
    }

    Ok(())
}
