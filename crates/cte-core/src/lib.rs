//! # cte-core
//! Primitives for the Capture the Ether execution model: fixed-width
//! arithmetic, keccak commitments, slot-addressed storage, the token ledger
//! and the injected clock.
//!
//! Nothing in this crate performs I/O or logs. Every fallible operation
//! returns a typed error from [`error`] and leaves its receiver unchanged
//! on failure.

pub mod arith;
pub mod clock;
pub mod commitment;
pub mod constants;
pub mod error;
pub mod ledger;
pub mod storage;
pub mod types;

pub use primitive_types::U256;
