//! # cte-challenges
//! The Capture the Ether challenges, each in a vulnerable and (where the
//! puzzle has one) a fixed variant, driven through the transactional
//! [`machine::Machine`].
//!
//! Every operation takes its caller, attached value and, when time or
//! block data matter, a [`cte_core::clock::Clock`] explicitly.

pub mod catalogue;
pub mod config;
pub mod lottery;
pub mod machine;
pub mod math;
pub mod purse;
pub mod warmup;

pub use catalogue::{Category, ChallengeId, Variant};
pub use config::ChallengeConfig;
pub use machine::{Challenge, ChallengeState, Machine, SharedMachine};
