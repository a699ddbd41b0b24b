//! Identifiers for every challenge and its variants.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Challenge family.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Warmup,
    Lottery,
    Math,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            Self::Warmup => "warmup",
            Self::Lottery => "lottery",
            Self::Math => "math",
        })
    }
}

/// Which implementation of a challenge to deploy.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    /// The contract as originally published, bug included.
    #[default]
    Vulnerable,
    /// The remediated contract.
    Fixed,
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            Self::Vulnerable => "vulnerable",
            Self::Fixed => "fixed",
        })
    }
}

impl FromStr for Variant {
    type Err = UnknownName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "vulnerable" => Ok(Self::Vulnerable),
            "fixed" => Ok(Self::Fixed),
            other => Err(UnknownName(other.to_string())),
        }
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown name: {0}")]
pub struct UnknownName(pub String);

/// Every challenge in the suite, in puzzle order.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "kebab-case")]
pub enum ChallengeId {
    Deploy,
    CallMe,
    Nickname,
    GuessTheNumber,
    GuessTheSecretNumber,
    GuessTheRandomNumber,
    GuessTheNewNumber,
    PredictTheFuture,
    PredictTheBlockHash,
    TokenSale,
    TokenWhale,
    RetirementFund,
    Mapping,
    Donation,
    FiftyYears,
}

impl ChallengeId {
    pub const ALL: [Self; 15] = [
        Self::Deploy,
        Self::CallMe,
        Self::Nickname,
        Self::GuessTheNumber,
        Self::GuessTheSecretNumber,
        Self::GuessTheRandomNumber,
        Self::GuessTheNewNumber,
        Self::PredictTheFuture,
        Self::PredictTheBlockHash,
        Self::TokenSale,
        Self::TokenWhale,
        Self::RetirementFund,
        Self::Mapping,
        Self::Donation,
        Self::FiftyYears,
    ];

    /// Kebab-case name used on the command line and in reports.
    pub fn slug(&self) -> &'static str {
        match self {
            Self::Deploy => "deploy",
            Self::CallMe => "call-me",
            Self::Nickname => "nickname",
            Self::GuessTheNumber => "guess-the-number",
            Self::GuessTheSecretNumber => "guess-the-secret-number",
            Self::GuessTheRandomNumber => "guess-the-random-number",
            Self::GuessTheNewNumber => "guess-the-new-number",
            Self::PredictTheFuture => "predict-the-future",
            Self::PredictTheBlockHash => "predict-the-block-hash",
            Self::TokenSale => "token-sale",
            Self::TokenWhale => "token-whale",
            Self::RetirementFund => "retirement-fund",
            Self::Mapping => "mapping",
            Self::Donation => "donation",
            Self::FiftyYears => "fifty-years",
        }
    }

    pub fn category(&self) -> Category {
        match self {
            Self::Deploy | Self::CallMe | Self::Nickname => Category::Warmup,
            Self::GuessTheNumber
            | Self::GuessTheSecretNumber
            | Self::GuessTheRandomNumber
            | Self::GuessTheNewNumber
            | Self::PredictTheFuture
            | Self::PredictTheBlockHash => Category::Lottery,
            Self::TokenSale
            | Self::TokenWhale
            | Self::RetirementFund
            | Self::Mapping
            | Self::Donation
            | Self::FiftyYears => Category::Math,
        }
    }

    /// Variants this challenge ships. Warmups have nothing to fix.
    pub fn variants(&self) -> &'static [Variant] {
        match self.category() {
            Category::Warmup => &[Variant::Vulnerable],
            _ => &[Variant::Vulnerable, Variant::Fixed],
        }
    }

    /// The bug class the vulnerable variant demonstrates.
    pub fn weakness(&self) -> &'static str {
        match self {
            Self::Deploy => "none (deployment warmup)",
            Self::CallMe => "none (call warmup)",
            Self::Nickname => "none (registry warmup)",
            Self::GuessTheNumber => "answer readable from storage",
            Self::GuessTheSecretNumber => "8-bit preimage space",
            Self::GuessTheRandomNumber => "randomness from public block data",
            Self::GuessTheNewNumber => "randomness computable in the same block",
            Self::PredictTheFuture => "settlement can be retried until it wins",
            Self::PredictTheBlockHash => "blockhash reads zero after 256 blocks",
            Self::TokenSale => "multiplication overflow in price check",
            Self::TokenWhale => "transferFrom debits the spender",
            Self::RetirementFund => "subtraction underflow on forced ether",
            Self::Mapping => "array index wraps onto declared slots",
            Self::Donation => "uninitialised storage pointer overwrites owner",
            Self::FiftyYears => "storage aliasing plus timestamp overflow",
        }
    }
}

impl fmt::Display for ChallengeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.slug())
    }
}

impl FromStr for ChallengeId {
    type Err = UnknownName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|id| id.slug() == s)
            .ok_or_else(|| UnknownName(s.to_string()))
    }
}
