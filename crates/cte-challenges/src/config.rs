//! Tunable challenge parameters.
//!
//! Provides [`ChallengeConfig`] with defaults taken from
//! [`cte_core::constants`]. Any subset of fields can be overridden from a
//! JSON document; missing fields keep their defaults.

use cte_core::constants::*;
use cte_core::U256;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid config: {0}")] Parse(String),
    #[error("early_withdraw_keep_percent must be at most 100, got {0}")] KeepPercent(u64),
    #[error("max_guess_attempts must be positive")] ZeroAttempts,
    #[error("max_withdraw_batch must be positive")] ZeroBatch,
    #[error("token_price must be positive")] ZeroPrice,
}

/// Parameters shared by every challenge constructor.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ChallengeConfig {
    /// Initial funding of every ether-holding challenge, in wei.
    pub funding: U256,
    /// Seconds between commit and the earliest reveal.
    pub reveal_delay_secs: u64,
    /// Per-address spacing between guesses in the rate-limited lottery.
    pub guess_cooldown_secs: u64,
    /// Guesses allowed per address in the rate-limited lottery.
    pub max_guess_attempts: u32,
    /// Stake per lottery guess, in wei.
    pub guess_stake: U256,
    /// Stake per guess in the rate-limited lottery, in wei.
    pub secret_guess_stake: U256,
    /// Token sale price per token, in wei.
    pub token_price: U256,
    pub whale_initial_supply: u64,
    pub whale_target_balance: u64,
    pub retirement_lock_secs: u64,
    /// Percentage of the fund the owner keeps on early withdrawal.
    pub early_withdraw_keep_percent: u64,
    pub fifty_years_lock_secs: u64,
    /// Minimum spacing between consecutive contribution unlock times.
    pub contribution_spacing_secs: u64,
    /// Furthest a new contribution may unlock, relative to now.
    pub max_unlock_horizon_secs: u64,
    pub max_withdraw_batch: u64,
}

impl Default for ChallengeConfig {
    fn default() -> Self {
        Self {
            funding: CHALLENGE_FUNDING,
            reveal_delay_secs: REVEAL_DELAY_SECS,
            guess_cooldown_secs: GUESS_COOLDOWN_SECS,
            max_guess_attempts: MAX_GUESS_ATTEMPTS,
            guess_stake: GUESS_STAKE,
            secret_guess_stake: SECRET_GUESS_STAKE,
            token_price: TOKEN_PRICE,
            whale_initial_supply: WHALE_INITIAL_SUPPLY,
            whale_target_balance: WHALE_TARGET_BALANCE,
            retirement_lock_secs: RETIREMENT_LOCK_SECS,
            early_withdraw_keep_percent: EARLY_WITHDRAW_KEEP_PERCENT,
            fifty_years_lock_secs: FIFTY_YEARS_LOCK_SECS,
            contribution_spacing_secs: CONTRIBUTION_SPACING_SECS,
            max_unlock_horizon_secs: MAX_UNLOCK_HORIZON_SECS,
            max_withdraw_batch: MAX_WITHDRAW_BATCH,
        }
    }
}

impl ChallengeConfig {
    /// Parse a JSON document over the defaults and validate it.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let cfg: Self = serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject parameter combinations no challenge can run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.early_withdraw_keep_percent > 100 {
            return Err(ConfigError::KeepPercent(self.early_withdraw_keep_percent));
        }
        if self.max_guess_attempts == 0 {
            return Err(ConfigError::ZeroAttempts);
        }
        if self.max_withdraw_batch == 0 {
            return Err(ConfigError::ZeroBatch);
        }
        if self.token_price.is_zero() {
            return Err(ConfigError::ZeroPrice);
        }
        Ok(())
    }

    /// Prize for a correct stake-and-guess: twice the stake.
    pub fn guess_prize(&self) -> U256 {
        self.guess_stake.saturating_mul(U256::from(2u8))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_constants() {
        let cfg = ChallengeConfig::default();
        assert_eq!(cfg.reveal_delay_secs, 86_400);
        assert_eq!(cfg.guess_cooldown_secs, 3_600);
        assert_eq!(cfg.max_guess_attempts, 10);
        assert_eq!(cfg.token_price, ETHER);
        assert_eq!(cfg.guess_prize(), ETHER * 2);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg = ChallengeConfig::from_json(r#"{ "max_guess_attempts": 3 }"#).unwrap();
        assert_eq!(cfg.max_guess_attempts, 3);
        assert_eq!(cfg.reveal_delay_secs, REVEAL_DELAY_SECS);
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert_eq!(
            ChallengeConfig::from_json(r#"{ "early_withdraw_keep_percent": 101 }"#),
            Err(ConfigError::KeepPercent(101))
        );
        assert_eq!(
            ChallengeConfig::from_json(r#"{ "max_guess_attempts": 0 }"#),
            Err(ConfigError::ZeroAttempts)
        );
        assert_eq!(
            ChallengeConfig::from_json(r#"{ "token_price": "0x0" }"#),
            Err(ConfigError::ZeroPrice)
        );
        assert!(matches!(ChallengeConfig::from_json("{"), Err(ConfigError::Parse(_))));
    }
}
