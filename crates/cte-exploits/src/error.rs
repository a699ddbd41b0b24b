use thiserror::Error;

use cte_challenges::catalogue::{ChallengeId, Variant};
use cte_core::error::{ChallengeError, ClockError};

/// Why an exploit step did not go through.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExploitError {
    /// The attacker reverted its own call because it would not win.
    #[error("aborted: outcome would not complete the challenge")] Aborted,
    #[error("gave up after {tries} attempts")] Exhausted { tries: u64 },
    #[error("no preimage found in the searched space")] NoPreimage,
    #[error("{challenge} has no {variant} variant")] UnsupportedVariant { challenge: ChallengeId, variant: Variant },
    #[error("invalid scenario parameters: {0}")] InvalidParameters(String),
    #[error(transparent)] Challenge(#[from] ChallengeError),
}

impl From<ClockError> for ExploitError {
    fn from(err: ClockError) -> Self {
        Self::Challenge(err.into())
    }
}
