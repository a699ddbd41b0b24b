//! Adversarial test suite for the Capture the Ether challenges.
//!
//! The integration tests in `tests/` drive the challenges from an
//! attacker's perspective: property tests over the arithmetic, ledger and
//! storage primitives, end-to-end lifecycles, and every exploit run against
//! both variants.

pub mod helpers;
