//! TOML configuration for the tactic tooling.
//!
//! ```toml
//! [tactic]
//! time_budget_ms = 1000                # 0 runs tactic queries without a deadline
//! max_suggestions = 8
//! legal_moves = "foreign_predicate"   # or "asserted_facts"
//!
//! [facts]
//! unknown_facts = "ignore"            # or "strict"
//!
//! [harness]
//! compare_legal_moves = true
//! max_plies = 5000
//!
//! [sampling]
//! num_games = 10
//! positions_per_game = 10
//! opening_cutoff = 7
//! seed = 1
//! ```
//!
//! Every section and key is optional; missing values take their defaults.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;
use crate::facts::fact::UnknownFactPolicy;
use crate::harness::equivalence::HarnessConfig;
use crate::tactics::tactic_query::{LegalMoveSource, TacticConfig};
use crate::utils::sampling::SamplingConfig;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TacticsConfig {
    pub tactic: TacticSection,
    pub facts: FactsSection,
    pub harness: HarnessConfig,
    pub sampling: SamplingConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TacticSection {
    pub time_budget_ms: Option<u64>,
    pub max_suggestions: Option<usize>,
    pub legal_moves: LegalMoveSource,
}

impl Default for TacticSection {
    fn default() -> Self {
        let defaults = TacticConfig::default();
        Self {
            time_budget_ms: defaults
                .time_budget
                .map(|budget| u64::try_from(budget.as_millis()).unwrap_or(u64::MAX)),
            max_suggestions: defaults.max_suggestions,
            legal_moves: defaults.legal_moves,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FactsSection {
    pub unknown_facts: UnknownFactPolicy,
}

impl TacticsConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|err| ConfigError::Toml {
            reason: err.to_string(),
        })
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|err| ConfigError::Io {
            path: path.display().to_string(),
            reason: err.to_string(),
        })?;
        Self::from_toml_str(&text)
    }

    pub fn tactic_config(&self) -> TacticConfig {
        TacticConfig {
            time_budget: self
                .tactic
                .time_budget_ms
                .filter(|&ms| ms > 0)
                .map(Duration::from_millis),
            max_suggestions: self.tactic.max_suggestions,
            legal_moves: self.tactic.legal_moves,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::TacticsConfig;
    use crate::errors::ConfigError;
    use crate::facts::fact::UnknownFactPolicy;
    use crate::tactics::tactic_query::{LegalMoveSource, TacticConfig};

    #[test]
    fn empty_document_is_all_defaults() {
        let config = TacticsConfig::from_toml_str("").expect("empty config is valid");
        assert_eq!(config, TacticsConfig::default());
        assert_eq!(config.tactic_config(), TacticConfig::default());
        assert!(config.harness.compare_legal_moves);
        assert_eq!(config.sampling.opening_cutoff, 7);
    }

    #[test]
    fn sections_override_defaults() {
        let config = TacticsConfig::from_toml_str(
            r#"
[tactic]
time_budget_ms = 250
max_suggestions = 3
legal_moves = "asserted_facts"

[facts]
unknown_facts = "strict"

[harness]
max_plies = 40

[sampling]
seed = 99
accepted_terminations = []
"#,
        )
        .expect("config should parse");

        let tactic = config.tactic_config();
        assert_eq!(tactic.time_budget, Some(Duration::from_millis(250)));
        assert_eq!(tactic.max_suggestions, Some(3));
        assert_eq!(tactic.legal_moves, LegalMoveSource::AssertedFacts);
        assert_eq!(config.facts.unknown_facts, UnknownFactPolicy::Strict);
        assert_eq!(config.harness.max_plies, Some(40));
        assert!(config.harness.compare_legal_moves);
        assert_eq!(config.sampling.seed, 99);
        assert!(config.sampling.accepted_terminations.is_empty());
        assert_eq!(config.sampling.num_games, 10);
    }

    #[test]
    fn zero_budget_means_no_deadline() {
        let config = TacticsConfig::from_toml_str("[tactic]\ntime_budget_ms = 0\n")
            .expect("config should parse");
        assert_eq!(config.tactic_config().time_budget, None);
        assert_eq!(TacticsConfig::default().tactic.time_budget_ms, Some(1000));
    }

    #[test]
    fn typos_and_bad_values_are_rejected() {
        assert!(matches!(
            TacticsConfig::from_toml_str("[tactic]\ntime_budget = 5\n"),
            Err(ConfigError::Toml { .. })
        ));
        assert!(matches!(
            TacticsConfig::from_toml_str("[facts]\nunknown_facts = \"sometimes\"\n"),
            Err(ConfigError::Toml { .. })
        ));
        assert!(matches!(
            TacticsConfig::from_path("/definitely/not/here.toml"),
            Err(ConfigError::Io { .. })
        ));
    }
}
