//! Lottery challenges: guess or predict a number the contract picks.
//!
//! The vulnerable variants pick their answer from data a player can read
//! or compute (storage, block hashes, timestamps). The fixed variants use
//! the owner's commit-reveal [`CommitRevealLottery`] or rate limiting.

mod commit_reveal;
mod guess_number;
mod new_number;
mod predict_block_hash;
mod predict_future;
mod random_number;
mod secret_number;

pub use commit_reveal::CommitRevealLottery;
pub use guess_number::GuessTheNumber;
pub use new_number::GuessTheNewNumber;
pub use predict_block_hash::{PredictTheBlockHash, PredictTheBlockHashFixed};
pub use predict_future::{PredictTheFuture, PredictTheFutureFixed};
pub use random_number::GuessTheRandomNumber;
pub use secret_number::{GuessTheSecretNumber, GuessTheSecretNumberFixed, PlayerInfo};

use cte_core::clock::Clock;
use cte_core::commitment::{keccak256, pack, Token};
use cte_core::types::Hash256;
use cte_core::U256;

/// Fixed variants of the number, random-number and new-number lotteries
/// are all the same commit-reveal contract.
pub type GuessTheNumberFixed = CommitRevealLottery;
pub type GuessTheRandomNumberFixed = CommitRevealLottery;
pub type GuessTheNewNumberFixed = CommitRevealLottery;

/// `uint8(keccak256(parent_hash, timestamp))`: the low byte of the hash of
/// the packed parent block hash and the 256-bit timestamp.
pub fn block_derived_answer(parent_hash: Hash256, timestamp: u64) -> u8 {
    let digest = keccak256(pack(&[
        Token::Bytes32(parent_hash),
        Token::Uint256(U256::from(timestamp)),
    ]));
    digest.0[31]
}

/// [`block_derived_answer`] for the block `clock` is currently executing.
pub fn current_block_answer(clock: &dyn Clock) -> u8 {
    let parent = clock.blockhash_or_zero(clock.block_number().saturating_sub(1));
    block_derived_answer(parent, clock.timestamp())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cte_core::clock::SimClock;

    #[test]
    fn answer_is_low_byte_of_digest() {
        let parent = Hash256([3; 32]);
        let digest = keccak256(pack(&[
            Token::Bytes32(parent),
            Token::Uint256(U256::from(1_000u64)),
        ]));
        assert_eq!(block_derived_answer(parent, 1_000), digest.0[31]);
    }

    #[test]
    fn current_answer_tracks_the_clock() {
        let mut clock = SimClock::default();
        clock.mine(5).unwrap();
        let expected = block_derived_answer(clock.hash_of(clock.block_number() - 1), clock.timestamp());
        assert_eq!(current_block_answer(&clock), expected);
    }
}
