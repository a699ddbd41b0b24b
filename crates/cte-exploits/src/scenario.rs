//! Deploy, attack, report.

use std::path::Path;

use anyhow::Context;
use tracing::{info, warn};

use cte_challenges::catalogue::{ChallengeId, Variant};
use cte_challenges::config::ChallengeConfig;
use cte_core::types::Hash256;

use crate::error::ExploitError;
use crate::report::ScenarioReport;
use crate::session::{Session, World};
use crate::strategies;

/// Default seed for block hashes and owner secrets.
pub const DEFAULT_SEED: Hash256 = Hash256([0x5e; 32]);

/// One challenge's exploit, runnable against either variant.
#[derive(Clone, Debug)]
pub struct Scenario {
    id: ChallengeId,
    config: ChallengeConfig,
    seed: Hash256,
}

impl Scenario {
    pub fn new(id: ChallengeId) -> Self {
        Self { id, config: ChallengeConfig::default(), seed: DEFAULT_SEED }
    }

    pub fn with_config(mut self, config: ChallengeConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_seed(mut self, seed: Hash256) -> Self {
        self.seed = seed;
        self
    }

    pub fn id(&self) -> ChallengeId {
        self.id
    }

    /// Deploy a fresh instance of `variant` and run the exploit against it.
    pub fn run(&self, variant: Variant) -> ScenarioReport {
        info!(challenge = %self.id, %variant, "running scenario");
        let mut world = World::new(self.config.clone(), self.seed);
        let mut session = Session::new();

        let outcome = if self.id.variants().contains(&variant) {
            strategies::run(self.id, variant, &mut world, &mut session)
        } else {
            Err(ExploitError::UnsupportedVariant { challenge: self.id, variant })
        };

        let completed = session.completed();
        match (&outcome, variant) {
            (_, Variant::Vulnerable) if !completed => {
                warn!(challenge = %self.id, error = ?outcome.as_ref().err(), "exploit did not complete the challenge");
            }
            (_, Variant::Fixed) if completed => {
                warn!(challenge = %self.id, "fixed variant was completed");
            }
            _ => info!(challenge = %self.id, %variant, completed, "scenario finished"),
        }

        ScenarioReport {
            challenge: self.id,
            variant,
            completed,
            balance: session.balance(),
            error: outcome.err().map(|e| e.to_string()),
            steps: session.into_steps(),
        }
    }

    /// Run every variant the challenge ships.
    pub fn run_all(&self) -> Vec<ScenarioReport> {
        self.id.variants().iter().map(|v| self.run(*v)).collect()
    }
}

/// Run `variants` of every challenge in catalogue order, skipping variants
/// a challenge does not ship.
pub fn run_suite(config: &ChallengeConfig, variants: &[Variant]) -> Vec<ScenarioReport> {
    ChallengeId::ALL
        .iter()
        .flat_map(|id| {
            let scenario = Scenario::new(*id).with_config(config.clone());
            variants
                .iter()
                .filter(|v| id.variants().contains(*v))
                .map(move |v| scenario.run(*v))
                .collect::<Vec<_>>()
        })
        .collect()
}

/// Read a [`ChallengeConfig`] from a JSON file.
///
/// # Errors
///
/// Fails if the file cannot be read or does not hold a valid config.
pub fn load_config(path: &Path) -> anyhow::Result<ChallengeConfig> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    ChallengeConfig::from_json(&json).with_context(|| format!("invalid config in {}", path.display()))
}
