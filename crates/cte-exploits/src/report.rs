//! Scenario results.

use serde::{Deserialize, Serialize};

use cte_challenges::catalogue::{ChallengeId, Variant};
use cte_core::U256;

/// One call the scenario made against the challenge.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Step {
    pub action: String,
    pub ok: bool,
    /// Return value on success, revert reason on failure.
    pub detail: String,
}

/// Result of running one scenario against one variant.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ScenarioReport {
    pub challenge: ChallengeId,
    pub variant: Variant,
    pub completed: bool,
    /// Contract ether left at the end, in wei.
    pub balance: U256,
    pub steps: Vec<Step>,
    /// The failure that stopped the scenario, if any.
    pub error: Option<String>,
}

impl ScenarioReport {
    /// Pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Propagates serializer failures.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Number of steps that reverted.
    pub fn failed_steps(&self) -> usize {
        self.steps.iter().filter(|s| !s.ok).count()
    }
}
