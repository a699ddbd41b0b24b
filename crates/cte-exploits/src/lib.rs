//! # cte-exploits
//! Attacks on the Capture the Ether challenges and a runner that reports
//! what they achieved.
//!
//! An attack sees only what a real player sees: public and raw storage,
//! the block data exposed by the clock, and its own accounts. Attacks that
//! need an attacker contract to revert a losing outcome run that check
//! inside the same [`Machine::execute`](cte_challenges::machine::Machine::execute)
//! call, so the losing attempt rolls back as a revert would.
//!
//! Every scenario emits `tracing` events; install a subscriber to see them.

pub mod error;
pub mod report;
pub mod scenario;
pub mod session;
mod strategies;

pub use error::ExploitError;
pub use report::{ScenarioReport, Step};
pub use scenario::{load_config, run_suite, Scenario};
