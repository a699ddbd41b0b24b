//! Injected block/time source.
//!
//! Challenges never read ambient time. Every time- or block-gated
//! operation takes a [`Clock`], which tests and the exploit harness drive
//! deterministically through [`SimClock`].

use primitive_types::U256;
use serde::{Deserialize, Serialize};

use crate::commitment::{keccak256, pack, Token};
use crate::constants::BLOCK_HASH_HISTORY;
use crate::error::ClockError;
use crate::types::Hash256;

/// Read-only view of the chain the current transaction executes in.
pub trait Clock {
    /// Timestamp of the current block, in seconds.
    fn timestamp(&self) -> u64;

    /// Number of the current block.
    fn block_number(&self) -> u64;

    /// Hash of block `number`, or `None` unless it is one of the
    /// [`BLOCK_HASH_HISTORY`] blocks preceding the current one.
    fn block_hash(&self, number: u64) -> Option<Hash256>;

    /// `blockhash` as contracts see it: zero whenever the hash is
    /// unavailable.
    fn blockhash_or_zero(&self, number: u64) -> Hash256 {
        self.block_hash(number).unwrap_or(Hash256::ZERO)
    }
}

/// Whether block `number` is retrievable from block `current`.
pub fn within_history(number: u64, current: u64) -> bool {
    number < current && current - number <= BLOCK_HASH_HISTORY
}

/// Deterministic simulated chain.
///
/// Block hashes are derived from a seed and the block number, so two
/// clocks with the same seed agree on every hash.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct SimClock {
    timestamp: u64,
    block_number: u64,
    block_interval: u64,
    seed: Hash256,
}

impl SimClock {
    /// Default seconds between mined blocks.
    pub const DEFAULT_BLOCK_INTERVAL: u64 = 12;

    /// A chain at block 1 with the given genesis timestamp.
    pub fn new(timestamp: u64) -> Self {
        Self {
            timestamp,
            block_number: 1,
            block_interval: Self::DEFAULT_BLOCK_INTERVAL,
            seed: Hash256::ZERO,
        }
    }

    /// Use `seed` to derive block hashes.
    pub fn with_seed(mut self, seed: Hash256) -> Self {
        self.seed = seed;
        self
    }

    /// Seconds each mined block advances the timestamp.
    pub fn with_block_interval(mut self, secs: u64) -> Self {
        self.block_interval = secs;
        self
    }

    /// Move the timestamp forward by `secs` without mining.
    pub fn advance_time(&mut self, secs: u64) {
        self.timestamp = self.timestamp.saturating_add(secs);
    }

    /// Jump to timestamp `to`.
    ///
    /// # Errors
    ///
    /// - [`ClockError::TimeWentBackwards`] if `to` precedes the current timestamp
    pub fn set_timestamp(&mut self, to: u64) -> Result<(), ClockError> {
        if to < self.timestamp {
            return Err(ClockError::TimeWentBackwards { previous: self.timestamp, now: to });
        }
        self.timestamp = to;
        Ok(())
    }

    /// Mine `blocks` blocks.
    ///
    /// # Errors
    ///
    /// - [`ClockError::HeightOverflow`] if the block number would overflow
    pub fn mine(&mut self, blocks: u64) -> Result<(), ClockError> {
        self.block_number = self
            .block_number
            .checked_add(blocks)
            .ok_or(ClockError::HeightOverflow)?;
        self.advance_time(blocks.saturating_mul(self.block_interval));
        Ok(())
    }

    /// Hash of any block, ignoring the history window.
    pub fn hash_of(&self, number: u64) -> Hash256 {
        keccak256(pack(&[
            Token::Bytes32(self.seed),
            Token::Uint256(U256::from(number)),
        ]))
    }
}

impl Default for SimClock {
    fn default() -> Self {
        Self::new(1_700_000_000)
    }
}

impl Clock for SimClock {
    fn timestamp(&self) -> u64 {
        self.timestamp
    }

    fn block_number(&self) -> u64 {
        self.block_number
    }

    fn block_hash(&self, number: u64) -> Option<Hash256> {
        within_history(number, self.block_number).then(|| self.hash_of(number))
    }
}
